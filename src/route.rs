//! Path routes: `/` for the city list, `/weather/<city>` for the detail screen

use std::fmt;
use std::str::FromStr;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

const WEATHER_PREFIX: &str = "/weather/";

#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub enum Route {
    #[default]
    CityList,
    Weather {
        city: String,
    },
}

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum RouteError {
    #[error("unknown route: {0}")]
    Unknown(String),
    #[error("missing city name in route: {0}")]
    MissingCity(String),
    #[error("city name is not valid UTF-8 after decoding: {0}")]
    Encoding(String),
}

impl Route {
    pub fn weather(city: impl Into<String>) -> Self {
        Route::Weather { city: city.into() }
    }

    /// Path form with the city segment percent-encoded
    pub fn path(&self) -> String {
        match self {
            Route::CityList => "/".to_string(),
            Route::Weather { city } => format!("{WEATHER_PREFIX}{}", urlencoding::encode(city)),
        }
    }
}

impl FromStr for Route {
    type Err = RouteError;

    fn from_str(path: &str) -> Result<Self, Self::Err> {
        let path = path.trim();
        if path.is_empty() || path == "/" {
            return Ok(Route::CityList);
        }

        let Some(segment) = path.strip_prefix(WEATHER_PREFIX) else {
            return Err(RouteError::Unknown(path.to_string()));
        };
        let segment = segment.trim_end_matches('/');
        if segment.is_empty() || segment.contains('/') {
            return Err(RouteError::MissingCity(path.to_string()));
        }

        let city = urlencoding::decode(segment)
            .map_err(|_| RouteError::Encoding(path.to_string()))?
            .into_owned();
        Ok(Route::Weather { city })
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}
