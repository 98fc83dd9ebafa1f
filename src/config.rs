//! Startup configuration, assembled once from command-line flags and the
//! environment and then handed to the clients that need it.

use url::Url;

use crate::route::{Route, RouteError};

pub const DEFAULT_DATASET_URL: &str = "https://public.opendatasoft.com/api/records/1.0/search/";
pub const DEFAULT_WEATHER_URL: &str = "https://api.openweathermap.org/data/2.5/weather";
pub const DATASET_NAME: &str = "geonames-all-cities-with-a-population-1000";
pub const PAGE_SIZE: u32 = 20;

/// Environment variable holding the weather API key
pub const API_KEY_ENV: &str = "WEATHER_API_KEY";

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("missing weather API key (set WEATHER_API_KEY or pass --api-key)")]
    MissingApiKey,
    #[error("invalid {name} URL {url:?}: {source}")]
    InvalidUrl {
        name: &'static str,
        url: String,
        source: url::ParseError,
    },
    #[error("invalid --open route: {0}")]
    InvalidRoute(#[from] RouteError),
}

/// City dataset endpoint settings
#[derive(Clone, Debug, PartialEq)]
pub struct DatasetConfig {
    pub endpoint: Url,
    pub dataset: String,
    pub page_size: u32,
}

/// Weather endpoint settings, including the API key
#[derive(Clone, PartialEq)]
pub struct WeatherConfig {
    pub endpoint: Url,
    pub api_key: String,
}

impl std::fmt::Debug for WeatherConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WeatherConfig")
            .field("endpoint", &self.endpoint.as_str())
            .field("api_key", &"<redacted>")
            .finish()
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct AppConfig {
    pub dataset: DatasetConfig,
    pub weather: WeatherConfig,
    pub initial_route: Route,
}

impl DatasetConfig {
    pub fn new(endpoint: &str) -> Result<Self, ConfigError> {
        Ok(Self {
            endpoint: parse_url("dataset", endpoint)?,
            dataset: DATASET_NAME.to_string(),
            page_size: PAGE_SIZE,
        })
    }
}

impl WeatherConfig {
    pub fn new(endpoint: &str, api_key: &str) -> Result<Self, ConfigError> {
        let api_key = api_key.trim();
        if api_key.is_empty() {
            return Err(ConfigError::MissingApiKey);
        }
        Ok(Self {
            endpoint: parse_url("weather", endpoint)?,
            api_key: api_key.to_string(),
        })
    }
}

impl AppConfig {
    pub fn new(
        dataset_url: &str,
        weather_url: &str,
        api_key: &str,
        initial_route: &str,
    ) -> Result<Self, ConfigError> {
        Ok(Self {
            dataset: DatasetConfig::new(dataset_url)?,
            weather: WeatherConfig::new(weather_url, api_key)?,
            initial_route: initial_route.parse()?,
        })
    }
}

fn parse_url(name: &'static str, url: &str) -> Result<Url, ConfigError> {
    Url::parse(url).map_err(|source| ConfigError::InvalidUrl {
        name,
        url: url.to_string(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_parse() {
        let config =
            AppConfig::new(DEFAULT_DATASET_URL, DEFAULT_WEATHER_URL, "secret", "/").unwrap();
        assert_eq!(config.dataset.page_size, 20);
        assert_eq!(config.dataset.dataset, DATASET_NAME);
        assert_eq!(config.weather.api_key, "secret");
        assert_eq!(config.initial_route, Route::CityList);
    }

    #[test]
    fn test_blank_api_key_is_rejected() {
        let err = WeatherConfig::new(DEFAULT_WEATHER_URL, "  ").unwrap_err();
        assert!(matches!(err, ConfigError::MissingApiKey));
    }

    #[test]
    fn test_bad_url_and_route() {
        let err = DatasetConfig::new("not a url").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidUrl { name: "dataset", .. }));

        let err = AppConfig::new(DEFAULT_DATASET_URL, DEFAULT_WEATHER_URL, "k", "/nope")
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidRoute(_)));
    }

    #[test]
    fn test_debug_hides_api_key() {
        let config = WeatherConfig::new(DEFAULT_WEATHER_URL, "secret").unwrap();
        let printed = format!("{config:?}");
        assert!(!printed.contains("secret"));
    }
}
