//! Derived city view: filter by search term, then sort by name.
//!
//! The view is a list of indices into `ListState::items`. It is recomputed
//! from `(items, search_term, sort_order)` and never written back into state.

use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;

use crate::state::{CityRow, ListState, SortOrder};

/// Filter and sort `items`, returning indices into `items`.
///
/// Ascending order is collation key first, then raw name, then fetch
/// position. Descending is the exact reverse.
pub fn derive_view(items: &[CityRow], search_term: &str, order: SortOrder) -> Vec<usize> {
    let needle = search_term.to_lowercase();
    let mut indices: Vec<usize> = items
        .iter()
        .enumerate()
        .filter(|(_, row)| matches_search(row, &needle))
        .map(|(idx, _)| idx)
        .collect();

    indices.sort_by_cached_key(move |&idx| {
        let row = &items[idx];
        (collation_key(&row.record.name), row.record.name.as_str(), row.key)
    });
    if order == SortOrder::Descending {
        indices.reverse();
    }
    indices
}

/// Number of rows in the derived view. Sorting never changes the count.
pub fn filtered_len(items: &[CityRow], search_term: &str) -> usize {
    if search_term.is_empty() {
        return items.len();
    }
    let needle = search_term.to_lowercase();
    items.iter().filter(|row| matches_search(row, &needle)).count()
}

fn matches_search(row: &CityRow, needle: &str) -> bool {
    row.record.name.to_lowercase().contains(needle)
}

/// Primary sort key: canonical decomposition with combining marks dropped,
/// lowercased, so `São`, `Sa\u{303}o` and `sao` compare equal.
pub fn collation_key(name: &str) -> String {
    let mut key = String::with_capacity(name.len());
    for c in name.nfd().filter(|c| !is_combining_mark(*c)) {
        for lower in c.to_lowercase() {
            push_base_letters(&mut key, lower);
        }
    }
    key
}

/// Latin letters with no canonical decomposition sort as their base letters.
fn push_base_letters(key: &mut String, c: char) {
    match c {
        'æ' => key.push_str("ae"),
        'œ' => key.push_str("oe"),
        'ß' => key.push_str("ss"),
        'þ' => key.push_str("th"),
        'ø' => key.push('o'),
        'đ' | 'ð' => key.push('d'),
        'ł' => key.push('l'),
        'ħ' => key.push('h'),
        'ı' => key.push('i'),
        other => key.push(other),
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
struct ViewKey {
    mount: u64,
    len: usize,
    search_term: String,
    order: SortOrder,
}

/// Memoized [`derive_view`].
///
/// `items` is append-only within one mount, so `(mount, len)` identifies its
/// contents.
#[derive(Debug, Default)]
pub struct DerivedView {
    key: Option<ViewKey>,
    indices: Vec<usize>,
}

impl DerivedView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&mut self, mount: u64, list: &ListState) -> &[usize] {
        let key = ViewKey {
            mount,
            len: list.items.len(),
            search_term: list.search_term.clone(),
            order: list.sort_order,
        };
        if self.key.as_ref() != Some(&key) {
            self.indices = derive_view(&list.items, &list.search_term, list.sort_order);
            self.key = Some(key);
        }
        &self.indices
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::CityRecord;
    use pretty_assertions::assert_eq;

    fn list_of(names: &[&str]) -> ListState {
        let mut list = ListState::default();
        list.append(names.iter().map(|name| CityRecord::new(*name, "")).collect());
        list
    }

    fn names(list: &ListState, indices: &[usize]) -> Vec<String> {
        indices
            .iter()
            .map(|&idx| list.items[idx].record.name.clone())
            .collect()
    }

    #[test]
    fn test_search_is_case_insensitive_substring() {
        let list = list_of(&["London", "Paris", "Londrina", "Barcelona"]);
        let view = derive_view(&list.items, "lon", SortOrder::Ascending);
        assert_eq!(names(&list, &view), vec!["Barcelona", "London", "Londrina"]);

        let view = derive_view(&list.items, "LON", SortOrder::Ascending);
        assert_eq!(view.len(), 3);
    }

    #[test]
    fn test_empty_search_keeps_everything() {
        let list = list_of(&["b", "a", "c"]);
        let view = derive_view(&list.items, "", SortOrder::Ascending);
        assert_eq!(names(&list, &view), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_descending_is_exact_reverse() {
        let list = list_of(&["Zagreb", "aachen", "Ålesund", "Berlin", "berlin", "Berlin"]);
        let asc = derive_view(&list.items, "", SortOrder::Ascending);
        let mut desc = derive_view(&list.items, "", SortOrder::Descending);
        desc.reverse();
        assert_eq!(asc, desc);
    }

    #[test]
    fn test_accents_and_case_sort_with_base_letters() {
        let list = list_of(&["Zürich", "Ávila", "berlin", "Cádiz"]);
        let view = derive_view(&list.items, "", SortOrder::Ascending);
        assert_eq!(names(&list, &view), vec!["Ávila", "berlin", "Cádiz", "Zürich"]);
    }

    #[test]
    fn test_ligatures_sort_among_base_letters() {
        let list = list_of(&["Zagreb", "Ærøskøbing", "Berlin"]);
        let view = derive_view(&list.items, "", SortOrder::Ascending);
        assert_eq!(names(&list, &view), vec!["Ærøskøbing", "Berlin", "Zagreb"]);

        let list = list_of(&["Zug", "Œuilly", "Straße", "Strasbourg", "Stuttgart"]);
        let view = derive_view(&list.items, "", SortOrder::Ascending);
        assert_eq!(
            names(&list, &view),
            vec!["Œuilly", "Strasbourg", "Straße", "Stuttgart", "Zug"]
        );
    }

    #[test]
    fn test_decomposed_names_sort_like_precomposed() {
        let decomposed = "Sa\u{303}o Paulo";
        let list = list_of(&["Sapporo", decomposed]);
        let view = derive_view(&list.items, "", SortOrder::Ascending);
        assert_eq!(names(&list, &view), vec![decomposed, "Sapporo"]);

        assert_eq!(collation_key(decomposed), collation_key("São Paulo"));
        assert_eq!(collation_key("São Paulo"), "sao paulo");
    }

    #[test]
    fn test_filtered_len_matches_derived_view() {
        let list = list_of(&["London", "Paris", "Londrina", "Barcelona"]);
        for term in ["", "lon", "LON", "x"] {
            assert_eq!(
                filtered_len(&list.items, term),
                derive_view(&list.items, term, SortOrder::Descending).len()
            );
        }
    }

    #[test]
    fn test_view_does_not_touch_items() {
        let list = list_of(&["c", "a", "b"]);
        let before = list.items.clone();
        let _ = derive_view(&list.items, "a", SortOrder::Descending);
        assert_eq!(list.items, before);
    }

    #[test]
    fn test_memo_recomputes_on_input_change() {
        let mut list = list_of(&["Lima", "Lagos"]);
        let mut memo = DerivedView::new();

        assert_eq!(memo.get(1, &list).to_vec(), vec![1, 0]);

        list.sort_order = SortOrder::Descending;
        assert_eq!(memo.get(1, &list).to_vec(), vec![0, 1]);

        list.append(vec![CityRecord::new("Luanda", "Angola")]);
        assert_eq!(memo.get(1, &list).to_vec(), vec![2, 0, 1]);

        list.search_term = "ag".into();
        assert_eq!(memo.get(1, &list).to_vec(), vec![1]);
    }
}
