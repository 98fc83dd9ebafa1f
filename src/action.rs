//! Actions: user intents and async results

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::route::Route;
use crate::state::{CityRecord, WeatherReading};

/// Application actions with automatic category inference.
///
/// Async results carry the `mount` generation of the screen that asked for
/// them so late arrivals can be dropped.
#[derive(tui_dispatch::Action, Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
#[action(infer_categories)]
pub enum Action {
    // ===== Navigation =====
    /// Mount the screen behind a route (also the startup action)
    Navigate(Route),

    // ===== List category =====
    /// Move the table cursor by a signed number of rows (scroll event)
    ListMove(i16),

    /// Jump the table cursor to the first row
    ListTop,

    /// Jump the table cursor to the last row
    ListBottom,

    /// Result: a page of cities arrived
    ListDidLoad {
        mount: u64,
        page: u32,
        records: Vec<CityRecord>,
    },

    /// Result: a page fetch failed
    ListDidError { mount: u64, page: u32, error: String },

    // ===== Search category =====
    /// Give keyboard focus to the search input
    SearchFocus,

    /// Return keyboard focus to the table
    SearchBlur,

    /// Search text changed
    SearchTermChange(String),

    // ===== Weather category =====
    /// Result: weather for the mounted city arrived
    WeatherDidLoad { mount: u64, reading: WeatherReading },

    /// Result: weather fetch failed
    WeatherDidError { mount: u64, error: String },

    // ===== UI category =====
    /// Flip the sort order of the name column
    UiToggleSort,

    /// Terminal was resized to (width, height)
    UiResize(u16, u16),

    /// Force a re-render (for cursor movement, etc.)
    Render,

    // ===== Uncategorized (global) =====
    /// Exit the application
    Quit,
}
