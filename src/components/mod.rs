pub mod city_table;
pub mod city_weather;
pub mod search_bar;

// Re-export core Component trait
pub use tui_dispatch::Component;

pub use city_table::{CityTable, CityTableProps};
pub use city_weather::{CityWeather, CityWeatherProps, reading_lines};
pub use search_bar::{SEARCH_PLACEHOLDER, SearchBar, SearchBarProps};
