//! Reducer - pure function: (state, action) -> DispatchResult

use tui_dispatch::{DataResource, DispatchResult};

use crate::action::Action;
use crate::effect::Effect;
use crate::route::Route;
use crate::state::{AppState, ListState, SCROLL_THRESHOLD_ROWS, Screen};
use crate::view::filtered_len;

/// The reducer handles all state transitions
pub fn reducer(state: &mut AppState, action: Action) -> DispatchResult<Effect> {
    match action {
        // ===== Navigation =====
        Action::Navigate(route) => {
            state.mount = state.mount.wrapping_add(1);
            state.screen = Screen::mount(&route);
            let mount = state.mount;
            tracing::debug!(%route, mount, "mounting screen");
            match route {
                Route::CityList => match &mut state.screen {
                    Screen::CityList(list) => DispatchResult::changed_with(start_fetch(list, mount)),
                    Screen::Weather(_) => DispatchResult::changed(),
                },
                Route::Weather { city } => {
                    DispatchResult::changed_with(Effect::FetchWeather { mount, city })
                }
            }
        }

        // ===== List actions =====
        Action::ListMove(delta) => {
            let viewport = state.viewport_rows();
            let mount = state.mount;
            let Screen::CityList(list) = &mut state.screen else {
                return DispatchResult::unchanged();
            };
            let len = filtered_len(&list.items, &list.search_term);
            let target = (list.selected as i64 + i64::from(delta)).clamp(0, len.saturating_sub(1) as i64);
            scroll_to(list, target as usize, len, viewport, mount)
        }

        Action::ListTop => {
            let viewport = state.viewport_rows();
            let mount = state.mount;
            let Screen::CityList(list) = &mut state.screen else {
                return DispatchResult::unchanged();
            };
            let len = filtered_len(&list.items, &list.search_term);
            scroll_to(list, 0, len, viewport, mount)
        }

        Action::ListBottom => {
            let viewport = state.viewport_rows();
            let mount = state.mount;
            let Screen::CityList(list) = &mut state.screen else {
                return DispatchResult::unchanged();
            };
            let len = filtered_len(&list.items, &list.search_term);
            scroll_to(list, len.saturating_sub(1), len, viewport, mount)
        }

        Action::ListDidLoad {
            mount,
            page,
            records,
        } => {
            let current = state.mount;
            let Some(list) = mounted_list(state, mount) else {
                tracing::debug!(mount, current, page, "dropping city page for unmounted list");
                return DispatchResult::unchanged();
            };
            list.append(records);
            list.loading = false;
            DispatchResult::changed()
        }

        Action::ListDidError { mount, page, error } => {
            let current = state.mount;
            let Some(list) = mounted_list(state, mount) else {
                tracing::debug!(mount, current, page, %error, "dropping city error for unmounted list");
                return DispatchResult::unchanged();
            };
            list.loading = false;
            DispatchResult::changed()
        }

        // ===== Search actions =====
        Action::SearchFocus => match &mut state.screen {
            Screen::CityList(list) if !list.search_focused => {
                list.search_focused = true;
                DispatchResult::changed()
            }
            _ => DispatchResult::unchanged(),
        },

        Action::SearchBlur => match &mut state.screen {
            Screen::CityList(list) if list.search_focused => {
                list.search_focused = false;
                DispatchResult::changed()
            }
            _ => DispatchResult::unchanged(),
        },

        Action::SearchTermChange(term) => match &mut state.screen {
            Screen::CityList(list) => {
                list.search_term = term;
                list.selected = 0;
                list.scroll_top = 0;
                DispatchResult::changed()
            }
            Screen::Weather(_) => DispatchResult::unchanged(),
        },

        // ===== Weather actions =====
        Action::WeatherDidLoad { mount, reading } => {
            let current = state.mount;
            match &mut state.screen {
                Screen::Weather(screen)
                    if mount == current && reading.city_name == screen.city_name =>
                {
                    screen.reading = DataResource::Loaded(reading);
                    DispatchResult::changed()
                }
                _ => {
                    tracing::debug!(mount, current, city = %reading.city_name, "dropping stale weather reading");
                    DispatchResult::unchanged()
                }
            }
        }

        // The screen stays in Loading; the failure was logged where it happened.
        Action::WeatherDidError { .. } => DispatchResult::unchanged(),

        // ===== UI actions =====
        Action::UiToggleSort => match &mut state.screen {
            Screen::CityList(list) => {
                list.sort_order = list.sort_order.toggle();
                list.selected = 0;
                list.scroll_top = 0;
                DispatchResult::changed()
            }
            Screen::Weather(_) => DispatchResult::unchanged(),
        },

        Action::UiResize(width, height) => {
            if state.terminal_size == (width, height) {
                return DispatchResult::unchanged();
            }
            state.terminal_size = (width, height);
            let viewport = state.viewport_rows();
            if let Screen::CityList(list) = &mut state.screen {
                keep_cursor_visible(list, viewport);
            }
            DispatchResult::changed()
        }

        Action::Render => DispatchResult::changed(),

        // ===== Global actions =====
        Action::Quit => DispatchResult::unchanged(),
    }
}

/// The list mounted as `mount`, if it is still the mounted screen.
fn mounted_list(state: &mut AppState, mount: u64) -> Option<&mut ListState> {
    if mount != state.mount {
        return None;
    }
    match &mut state.screen {
        Screen::CityList(list) => Some(list),
        Screen::Weather(_) => None,
    }
}

/// Start loading `list.page`.
fn start_fetch(list: &mut ListState, mount: u64) -> Effect {
    list.loading = true;
    Effect::FetchCities {
        mount,
        page: list.page,
    }
}

/// Move the cursor, then treat the move as a scroll event.
///
/// A scroll event that ends inside the trailing threshold bumps the page by
/// one and requests it, unless a page is already loading.
fn scroll_to(
    list: &mut ListState,
    target: usize,
    len: usize,
    viewport: usize,
    mount: u64,
) -> DispatchResult<Effect> {
    let before = (list.selected, list.scroll_top);
    list.selected = target;
    keep_cursor_visible(list, viewport);
    if (list.selected, list.scroll_top) == before {
        return DispatchResult::unchanged();
    }

    if !list.loading && viewport + list.scroll_top + SCROLL_THRESHOLD_ROWS >= len {
        list.page += 1;
        return DispatchResult::changed_with(start_fetch(list, mount));
    }
    DispatchResult::changed()
}

fn keep_cursor_visible(list: &mut ListState, viewport: usize) {
    if list.selected < list.scroll_top {
        list.scroll_top = list.selected;
    } else if list.selected >= list.scroll_top + viewport {
        list.scroll_top = list.selected + 1 - viewport;
    }
}
