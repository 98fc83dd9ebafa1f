use crossterm::event::KeyCode;
use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style, Stylize},
    text::{Line, Span},
    widgets::{Paragraph, Row, Table},
};
use tui_dispatch::EventKind;
use tui_dispatch_components::{
    StatusBar, StatusBarHint, StatusBarProps, StatusBarSection, StatusBarStyle,
};

use super::{Component, SearchBar, SearchBarProps};
use crate::action::Action;
use crate::route::Route;
use crate::state::ListState;
use crate::view::DerivedView;

/// Rows moved per mouse wheel notch
const WHEEL_ROWS: i16 = 3;

/// Props for CityTable - read-only view of the mounted list
pub struct CityTableProps<'a> {
    pub list: &'a ListState,
    /// Mount generation of `list`, keys the derived-view memo
    pub mount: u64,
    /// Table body rows that fit on screen
    pub viewport_rows: usize,
    pub is_focused: bool,
}

/// The City List Screen: search box, sort toggle, city table.
pub struct CityTable {
    view: DerivedView,
    search: SearchBar,
}

impl Default for CityTable {
    fn default() -> Self {
        Self {
            view: DerivedView::new(),
            search: SearchBar::new(),
        }
    }
}

impl CityTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// City name under the cursor, if any
    fn selected_city(&mut self, props: &CityTableProps<'_>) -> Option<String> {
        let indices = self.view.get(props.mount, props.list);
        let idx = *indices.get(props.list.selected)?;
        props.list.items.get(idx).map(|row| row.record.name.clone())
    }
}

impl Component<Action> for CityTable {
    type Props<'a> = CityTableProps<'a>;

    fn handle_event(
        &mut self,
        event: &EventKind,
        props: Self::Props<'_>,
    ) -> impl IntoIterator<Item = Action> {
        if !props.is_focused {
            return Vec::new();
        }

        if props.list.search_focused {
            let search_props = SearchBarProps {
                value: &props.list.search_term,
                is_focused: true,
                on_change: Action::SearchTermChange,
            };
            return self
                .search
                .handle_event(event, search_props)
                .into_iter()
                .collect();
        }

        let page = props.viewport_rows.min(i16::MAX as usize) as i16;
        match event {
            EventKind::Key(key) => match key.code {
                KeyCode::Down | KeyCode::Char('j') => vec![Action::ListMove(1)],
                KeyCode::Up | KeyCode::Char('k') => vec![Action::ListMove(-1)],
                KeyCode::PageDown => vec![Action::ListMove(page)],
                KeyCode::PageUp => vec![Action::ListMove(-page)],
                KeyCode::Home | KeyCode::Char('g') => vec![Action::ListTop],
                KeyCode::End | KeyCode::Char('G') => vec![Action::ListBottom],
                KeyCode::Char('/') => vec![Action::SearchFocus],
                KeyCode::Char('s') => vec![Action::UiToggleSort],
                KeyCode::Enter => self
                    .selected_city(&props)
                    .map(|city| Action::Navigate(Route::weather(city)))
                    .into_iter()
                    .collect(),
                KeyCode::Char('q') | KeyCode::Esc => vec![Action::Quit],
                _ => Vec::new(),
            },
            EventKind::Scroll { delta, .. } => vec![Action::ListMove((*delta as i16) * WHEEL_ROWS)],
            _ => Vec::new(),
        }
    }

    fn render(&mut self, frame: &mut Frame, area: Rect, props: Self::Props<'_>) {
        let chunks = Layout::vertical([
            Constraint::Length(1), // Title
            Constraint::Length(3), // Search
            Constraint::Length(1), // Sort toggle
            Constraint::Min(2),    // Table
            Constraint::Length(1), // Loading indicator
            Constraint::Length(1), // Help bar
        ])
        .split(area);

        let list = props.list;

        frame.render_widget(
            Paragraph::new(Line::from("Cities List".bold())),
            chunks[0],
        );

        self.search.render(
            frame,
            chunks[1],
            SearchBarProps {
                value: &list.search_term,
                is_focused: props.is_focused && list.search_focused,
                on_change: Action::SearchTermChange,
            },
        );

        let sort_line = Line::from(vec![
            Span::raw(format!("Sort by Name: {}", list.sort_order.label())),
            Span::styled("  (s)", Style::default().fg(Color::DarkGray)),
        ]);
        frame.render_widget(Paragraph::new(sort_line), chunks[2]);

        let cursor_visible = props.is_focused && !list.search_focused;
        let body_rows = chunks[3].height.saturating_sub(1) as usize;
        let indices = self.view.get(props.mount, list);
        let rows: Vec<Row> = indices
            .iter()
            .enumerate()
            .skip(list.scroll_top)
            .take(body_rows)
            .filter_map(|(pos, &idx)| {
                let row = list.items.get(idx)?;
                let style = if cursor_visible && pos == list.selected {
                    Style::default().add_modifier(Modifier::REVERSED)
                } else {
                    Style::default()
                };
                Some(
                    Row::new(vec![row.record.name.clone(), row.record.country.clone()])
                        .style(style),
                )
            })
            .collect();

        let header = Row::new(vec!["City Name", "Country"])
            .style(Style::default().add_modifier(Modifier::BOLD));
        let table = Table::new(rows, [Constraint::Percentage(60), Constraint::Percentage(40)])
            .header(header);
        frame.render_widget(table, chunks[3]);

        if list.loading {
            frame.render_widget(
                Paragraph::new(Line::from(Span::styled(
                    "Loading...",
                    Style::default().fg(Color::DarkGray),
                ))),
                chunks[4],
            );
        }

        let hints = if list.search_focused {
            vec![StatusBarHint::new("enter", "done")]
        } else {
            vec![
                StatusBarHint::new("↑↓", "scroll"),
                StatusBarHint::new("/", "search"),
                StatusBarHint::new("s", "sort"),
                StatusBarHint::new("enter", "weather"),
                StatusBarHint::new("q", "quit"),
            ]
        };
        let mut status_bar = StatusBar::new();
        <StatusBar as Component<Action>>::render(
            &mut status_bar,
            frame,
            chunks[5],
            StatusBarProps {
                left: StatusBarSection::empty(),
                center: StatusBarSection::hints(&hints),
                right: StatusBarSection::empty(),
                style: StatusBarStyle::default(),
                is_focused: false,
            },
        );
    }
}
