//! Application state - single source of truth

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tui_dispatch::DataResource;

use crate::route::Route;

/// A city from the dataset (only the fields the list shows)
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct CityRecord {
    pub name: String,
    pub country: String,
}

impl CityRecord {
    pub fn new(name: impl Into<String>, country: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            country: country.into(),
        }
    }
}

/// An accumulated row. `key` is the position in the fetch sequence.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct CityRow {
    pub key: usize,
    pub record: CityRecord,
}

/// Sort direction for the city name column
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize, JsonSchema)]
pub enum SortOrder {
    #[default]
    Ascending,
    Descending,
}

impl SortOrder {
    pub fn toggle(&self) -> Self {
        match self {
            SortOrder::Ascending => SortOrder::Descending,
            SortOrder::Descending => SortOrder::Ascending,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            SortOrder::Ascending => "Ascending",
            SortOrder::Descending => "Descending",
        }
    }
}

/// Rows kept below the viewport before the next page is requested.
pub const SCROLL_THRESHOLD_ROWS: usize = 5;

/// Rows of the list screen not used by table body rows:
/// title, search box (3), sort line, table header, loading line, status bar.
pub const LIST_CHROME_ROWS: u16 = 8;

/// City List Screen state
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ListState {
    /// Every record fetched so far, in fetch order. Append-only.
    pub items: Vec<CityRow>,
    /// Page cursor passed to the dataset API (starts at 1)
    pub page: u32,
    pub loading: bool,
    pub search_term: String,
    pub sort_order: SortOrder,
    /// Whether keystrokes go to the search input
    pub search_focused: bool,
    /// Cursor into the derived view
    pub selected: usize,
    /// First visible row of the derived view
    pub scroll_top: usize,
}

impl Default for ListState {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            page: 1,
            loading: false,
            search_term: String::new(),
            sort_order: SortOrder::default(),
            search_focused: false,
            selected: 0,
            scroll_top: 0,
        }
    }
}

impl ListState {
    /// Append a fetched page, keeping the raw fetch order.
    pub fn append(&mut self, records: Vec<CityRecord>) {
        let start = self.items.len();
        self.items.extend(
            records
                .into_iter()
                .enumerate()
                .map(|(offset, record)| CityRow {
                    key: start + offset,
                    record,
                }),
        );
    }
}

/// Current weather for one city.
///
/// `temperature` is the raw value returned by the API; no unit conversion is
/// applied before display.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct WeatherReading {
    pub city_name: String,
    pub temperature: f64,
    pub humidity: f64,
    pub wind_speed: f64,
}

/// Weather Detail Screen state: Loading -> Loaded, never back.
#[derive(Clone, Debug, Serialize, Deserialize, JsonSchema)]
pub struct WeatherScreen {
    pub city_name: String,
    pub reading: DataResource<WeatherReading>,
}

impl WeatherScreen {
    pub fn new(city_name: impl Into<String>) -> Self {
        Self {
            city_name: city_name.into(),
            reading: DataResource::Loading,
        }
    }
}

/// The mounted screen. Exactly one is alive at a time.
#[derive(Clone, Debug, Serialize, Deserialize, JsonSchema)]
pub enum Screen {
    CityList(ListState),
    Weather(WeatherScreen),
}

impl Screen {
    /// Fresh state for the screen behind `route`
    pub fn mount(route: &Route) -> Self {
        match route {
            Route::CityList => Screen::CityList(ListState::default()),
            Route::Weather { city } => Screen::Weather(WeatherScreen::new(city.clone())),
        }
    }

    pub fn route(&self) -> Route {
        match self {
            Screen::CityList(_) => Route::CityList,
            Screen::Weather(screen) => Route::weather(screen.city_name.clone()),
        }
    }
}

/// Application state - everything the UI needs to render
#[derive(Clone, Debug, tui_dispatch::DebugState, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct AppState {
    /// Mounted screen and its private state
    #[debug(section = "Screen", label = "Screen", debug_fmt)]
    pub screen: Screen,

    /// Mount generation; bumped on every navigation
    #[debug(section = "Screen", label = "Mount")]
    pub mount: u64,

    /// Terminal size as (width, height)
    #[debug(skip)]
    pub terminal_size: (u16, u16),
}

impl AppState {
    pub fn new(terminal_size: (u16, u16)) -> Self {
        Self {
            screen: Screen::CityList(ListState::default()),
            mount: 0,
            terminal_size,
        }
    }

    pub fn route(&self) -> Route {
        self.screen.route()
    }

    pub fn list(&self) -> Option<&ListState> {
        match &self.screen {
            Screen::CityList(list) => Some(list),
            Screen::Weather(_) => None,
        }
    }

    pub fn weather(&self) -> Option<&WeatherScreen> {
        match &self.screen {
            Screen::Weather(screen) => Some(screen),
            Screen::CityList(_) => None,
        }
    }

    /// Number of table body rows that fit on screen
    pub fn viewport_rows(&self) -> usize {
        self.terminal_size.1.saturating_sub(LIST_CHROME_ROWS).max(1) as usize
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new((80, 24))
    }
}
