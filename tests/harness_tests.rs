//! Store, component and render flows with EffectStoreTestHarness

use citywatch::{
    action::Action,
    components::{CityTable, CityTableProps, Component},
    effect::Effect,
    reducer::reducer,
    route::Route,
    state::{AppState, CityRecord, SortOrder},
};
use tui_dispatch::NumericComponentId;
use tui_dispatch::testing::*;

/// `count` records named City000, City001, ...
fn records(count: usize) -> Vec<CityRecord> {
    (0..count)
        .map(|i| CityRecord::new(format!("City{i:03}"), "Testland"))
        .collect()
}

/// A 24-row terminal (16 body rows) with one loaded page of `count` rows
fn loaded_state(count: usize) -> AppState {
    let mut state = AppState::new((80, 24));
    reducer(&mut state, Action::Navigate(Route::CityList));
    reducer(
        &mut state,
        Action::ListDidLoad {
            mount: 1,
            page: 1,
            records: records(count),
        },
    );
    state
}

// ============================================================================
// Infinite scroll
// ============================================================================

#[test]
fn test_crossing_threshold_requests_next_page() {
    let mut harness = EffectStoreTestHarness::new(loaded_state(40), reducer);

    // Row 33 leaves more than five rows below the viewport
    harness.dispatch_collect(Action::ListMove(33));
    harness.drain_effects().effects_empty();

    harness.dispatch_collect(Action::ListMove(1));
    harness.assert_state(|s| s.list().unwrap().page == 2);
    harness.assert_state(|s| s.list().unwrap().loading);

    let effects = harness.drain_effects();
    effects.effects_count(1);
    effects.effects_first_matches(|e| matches!(e, Effect::FetchCities { mount: 1, page: 2 }));
}

#[test]
fn test_no_second_request_while_loading() {
    let mut harness = EffectStoreTestHarness::new(loaded_state(40), reducer);

    harness.dispatch_collect(Action::ListMove(34));
    harness.drain_effects().effects_count(1);

    harness.dispatch_collect(Action::ListMove(3));
    harness.drain_effects().effects_empty();
    harness.assert_state(|s| s.list().unwrap().page == 2);
}

#[test]
fn test_each_crossing_advances_one_page() {
    let mut harness = EffectStoreTestHarness::new(loaded_state(40), reducer);

    harness.dispatch_collect(Action::ListBottom);
    harness.drain_effects().effects_count(1);

    harness.complete_action(Action::ListDidLoad {
        mount: 1,
        page: 2,
        records: records(20),
    });
    harness.process_emitted();
    harness.assert_state(|s| s.list().unwrap().items.len() == 60);

    harness.dispatch_collect(Action::ListBottom);
    let effects = harness.drain_effects();
    effects.effects_first_matches(|e| matches!(e, Effect::FetchCities { page: 3, .. }));
}

#[test]
fn test_short_list_without_movement_does_not_fetch() {
    let mut harness = EffectStoreTestHarness::new(loaded_state(3), reducer);

    // Cursor already at the top: nothing scrolled
    harness.dispatch_collect(Action::ListTop);
    harness.drain_effects().effects_empty();
    harness.assert_state(|s| s.list().unwrap().page == 1);
}

// ============================================================================
// Component + store
// ============================================================================

#[test]
fn test_keys_drive_cursor_and_sort() {
    let mut harness = EffectStoreTestHarness::new(loaded_state(5), reducer);
    let mut component = CityTable::new();

    let actions = harness.send_keys::<NumericComponentId, _, _>("j j s", |state, event| {
        let props = CityTableProps {
            list: state.list().unwrap(),
            mount: state.mount,
            viewport_rows: state.viewport_rows(),
            is_focused: true,
        };
        component
            .handle_event(&event.kind, props)
            .into_iter()
            .collect::<Vec<_>>()
    });

    actions.assert_count(3);
    actions.assert_first(Action::ListMove(1));

    for action in actions {
        harness.dispatch_collect(action);
    }

    // Toggling the sort puts the cursor back on the first row
    harness.assert_state(|s| s.list().unwrap().selected == 0);
    harness.assert_state(|s| s.list().unwrap().sort_order == SortOrder::Descending);
}

#[test]
fn test_opening_weather_fetches_for_city() {
    let mut harness = EffectStoreTestHarness::new(loaded_state(5), reducer);

    harness.dispatch_collect(Action::Navigate(Route::weather("City000")));

    harness.assert_state(|s| s.weather().is_some_and(|w| w.city_name == "City000"));
    harness.drain_effects().effects_first_matches(
        |e| matches!(e, Effect::FetchWeather { city, .. } if city == "City000"),
    );
}

#[test]
fn test_returning_to_list_remounts_from_page_one() {
    let mut harness = EffectStoreTestHarness::new(loaded_state(40), reducer);
    harness.dispatch_collect(Action::ListBottom);
    harness.dispatch_collect(Action::Navigate(Route::weather("City000")));
    harness.dispatch_collect(Action::Navigate(Route::CityList));

    harness.assert_state(|s| s.mount == 3);
    harness.assert_state(|s| s.list().is_some_and(|l| l.items.is_empty() && l.page == 1));

    // The page-2 fetch from the first mount arrives late
    harness.complete_action(Action::ListDidLoad {
        mount: 1,
        page: 2,
        records: records(20),
    });
    let (changed, total) = harness.process_emitted();
    assert_eq!((changed, total), (0, 1));
}

// ============================================================================
// Rendering
// ============================================================================

#[test]
fn test_render_list_rows_and_loading() {
    let mut harness = EffectStoreTestHarness::new(loaded_state(3), reducer);
    let mut component = CityTable::new();

    let output = harness.render_plain(60, 20, |frame, area, state| {
        let props = CityTableProps {
            list: state.list().unwrap(),
            mount: state.mount,
            viewport_rows: state.viewport_rows(),
            is_focused: true,
        };
        component.render(frame, area, props);
    });

    assert!(output.contains("Cities List"), "title missing:\n{output}");
    assert!(output.contains("City Name"), "header missing:\n{output}");
    assert!(output.contains("City002"), "row missing:\n{output}");
    assert!(!output.contains("Loading..."), "idle list shows loading:\n{output}");

    harness.dispatch_collect(Action::ListBottom);
    let output = harness.render_plain(60, 20, |frame, area, state| {
        let props = CityTableProps {
            list: state.list().unwrap(),
            mount: state.mount,
            viewport_rows: state.viewport_rows(),
            is_focused: true,
        };
        component.render(frame, area, props);
    });
    assert!(output.contains("Loading..."), "loading indicator missing:\n{output}");
}
