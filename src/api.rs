//! HTTP clients for the city dataset and the weather API

use std::time::Duration;

use serde::Deserialize;

use crate::config::{DatasetConfig, WeatherConfig};
use crate::state::{CityRecord, WeatherReading};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Errors from either client
#[derive(thiserror::Error, Debug)]
pub enum ApiError {
    #[error("request failed: {0}")]
    Request(#[source] reqwest::Error),
    #[error("unexpected status {status} from {endpoint}")]
    Status {
        status: reqwest::StatusCode,
        endpoint: String,
    },
    #[error("response parse error: {0}")]
    Decode(#[source] reqwest::Error),
}

fn http_client() -> Result<reqwest::Client, ApiError> {
    reqwest::Client::builder()
        .timeout(REQUEST_TIMEOUT)
        .build()
        .map_err(ApiError::Request)
}

async fn get_json<T: serde::de::DeserializeOwned>(
    request: reqwest::RequestBuilder,
) -> Result<T, ApiError> {
    let response = request.send().await.map_err(ApiError::Request)?;
    let status = response.status();
    if !status.is_success() {
        let mut endpoint = response.url().clone();
        endpoint.set_query(None);
        return Err(ApiError::Status {
            status,
            endpoint: endpoint.to_string(),
        });
    }
    response.json().await.map_err(ApiError::Decode)
}

// ============================================================================
// City dataset
// ============================================================================

#[derive(Debug, Deserialize)]
struct DatasetResponse {
    records: Vec<DatasetRecord>,
}

#[derive(Debug, Deserialize)]
struct DatasetRecord {
    fields: DatasetFields,
}

#[derive(Debug, Deserialize)]
struct DatasetFields {
    name: String,
    #[serde(default)]
    country: String,
}

/// Paged reader over the public cities dataset
#[derive(Clone, Debug)]
pub struct CitiesClient {
    client: reqwest::Client,
    config: DatasetConfig,
}

impl CitiesClient {
    pub fn new(config: DatasetConfig) -> Result<Self, ApiError> {
        Ok(Self {
            client: http_client()?,
            config,
        })
    }

    /// Fetch one page. `page` is sent as the dataset's `start` parameter.
    pub async fn fetch_page(&self, page: u32) -> Result<Vec<CityRecord>, ApiError> {
        let query = [
            ("dataset", self.config.dataset.clone()),
            ("q", String::new()),
            ("rows", self.config.page_size.to_string()),
            ("start", page.to_string()),
        ];
        tracing::debug!(page, "fetching city page");

        let request = self
            .client
            .get(self.config.endpoint.clone())
            .query(&query);
        let data: DatasetResponse = get_json(request).await?;

        Ok(data
            .records
            .into_iter()
            .map(|record| CityRecord {
                name: record.fields.name,
                country: record.fields.country,
            })
            .collect())
    }
}

// ============================================================================
// Weather
// ============================================================================

#[derive(Debug, Deserialize)]
struct WeatherResponse {
    main: MainReadings,
    wind: Wind,
}

#[derive(Debug, Deserialize)]
struct MainReadings {
    temp: f64,
    humidity: f64,
}

#[derive(Debug, Deserialize)]
struct Wind {
    speed: f64,
}

/// Current-weather lookup by city name, authenticated with the configured key
#[derive(Clone, Debug)]
pub struct WeatherClient {
    client: reqwest::Client,
    config: WeatherConfig,
}

impl WeatherClient {
    pub fn new(config: WeatherConfig) -> Result<Self, ApiError> {
        Ok(Self {
            client: http_client()?,
            config,
        })
    }

    /// Fetch current weather for `city`. Values are passed through untouched.
    pub async fn fetch_current(&self, city: &str) -> Result<WeatherReading, ApiError> {
        tracing::debug!(city, "fetching weather");

        let request = self
            .client
            .get(self.config.endpoint.clone())
            .query(&[("q", city), ("appid", self.config.api_key.as_str())]);
        let data: WeatherResponse = get_json(request).await?;

        Ok(WeatherReading {
            city_name: city.to_string(),
            temperature: data.main.temp,
            humidity: data.main.humidity,
            wind_speed: data.wind.speed,
        })
    }
}
