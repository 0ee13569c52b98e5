use async_trait::async_trait;
use chrono::DateTime;
use reqwest::Client;
use serde::{Deserialize, de::DeserializeOwned};
use std::fmt;
use tracing::instrument;

use crate::{
    config::DEFAULT_BASE_URL,
    error::{Endpoint, FetchError},
    model::{City, Condition, Coordinates, CurrentWeather, Lang, Sample},
};

use super::WeatherProvider;

const CURRENT_PATH: &str = "/data/2.5/weather";
const FORECAST_PATH: &str = "/data/2.5/forecast";
const REVERSE_GEOCODE_PATH: &str = "/geo/1.0/reverse";
const DIRECT_GEOCODE_PATH: &str = "/geo/1.0/direct";

#[derive(Clone)]
pub struct OpenWeatherClient {
    api_key: String,
    base_url: String,
    lang: Lang,
    http: Client,
}

impl fmt::Debug for OpenWeatherClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OpenWeatherClient")
            .field("base_url", &self.base_url)
            .field("lang", &self.lang)
            .finish_non_exhaustive()
    }
}

impl OpenWeatherClient {
    pub fn new(api_key: String) -> Self {
        Self::with_base_url(api_key, DEFAULT_BASE_URL)
    }

    pub fn with_base_url(api_key: String, base_url: impl Into<String>) -> Self {
        Self {
            api_key,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            lang: Lang::default(),
            http: Client::new(),
        }
    }

    pub fn with_lang(mut self, lang: Lang) -> Self {
        self.lang = lang;
        self
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        endpoint: Endpoint,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, FetchError> {
        let url = format!("{}{}", self.base_url, path);
        tracing::debug!(%endpoint, %url, "Sending OpenWeather request");

        let res = self
            .http
            .get(&url)
            .query(query)
            .query(&[("appid", self.api_key.as_str())])
            .send()
            .await
            .map_err(|source| FetchError::Network { endpoint, source })?;

        let status = res.status();
        let body = res
            .text()
            .await
            .map_err(|source| FetchError::Network { endpoint, source })?;

        tracing::debug!(%endpoint, %status, "Received OpenWeather response");

        if !status.is_success() {
            return Err(FetchError::Status {
                endpoint,
                status: status.as_u16(),
                body: truncate_body(&body),
            });
        }

        serde_json::from_str(&body).map_err(|e| FetchError::Malformed {
            endpoint,
            message: e.to_string(),
        })
    }

    fn weather_query(&self, at: Coordinates) -> Vec<(&'static str, String)> {
        vec![
            ("lat", at.latitude.to_string()),
            ("lon", at.longitude.to_string()),
            ("units", "metric".to_string()),
            ("lang", self.lang.as_str().to_string()),
        ]
    }
}

#[derive(Debug, Deserialize)]
struct OwCondition {
    id: i32,
    description: String,
}

impl From<OwCondition> for Condition {
    fn from(w: OwCondition) -> Self {
        Condition { code: w.id, description: w.description }
    }
}

#[derive(Debug, Deserialize)]
struct OwMain {
    temp: f64,
    temp_min: f64,
    temp_max: f64,
    feels_like: f64,
    humidity: u8,
    pressure: u32,
}

#[derive(Debug, Deserialize)]
struct OwWind {
    speed: f64,
}

#[derive(Debug, Deserialize)]
struct OwCurrentResponse {
    name: String,
    main: OwMain,
    weather: Vec<OwCondition>,
    wind: OwWind,
}

#[derive(Debug, Deserialize)]
struct OwForecastMain {
    temp: f64,
}

#[derive(Debug, Deserialize)]
struct OwForecastEntry {
    dt: i64,
    main: OwForecastMain,
    weather: Vec<OwCondition>,
}

#[derive(Debug, Deserialize)]
struct OwForecastResponse {
    list: Vec<OwForecastEntry>,
}

#[derive(Debug, Deserialize)]
struct OwReverseEntry {
    name: String,
    #[serde(default)]
    country: String,
    state: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OwDirectEntry {
    name: String,
    #[serde(default)]
    country: String,
    state: Option<String>,
    lat: f64,
    lon: f64,
}

fn first_condition(endpoint: Endpoint, weather: Vec<OwCondition>) -> Result<Condition, FetchError> {
    weather.into_iter().next().map(Condition::from).ok_or_else(|| FetchError::Malformed {
        endpoint,
        message: "missing weather condition".to_string(),
    })
}

#[async_trait]
impl WeatherProvider for OpenWeatherClient {
    #[instrument(skip(self), level = "debug")]
    async fn fetch_current(&self, at: Coordinates) -> Result<CurrentWeather, FetchError> {
        let endpoint = Endpoint::CurrentWeather;
        let parsed: OwCurrentResponse =
            self.get_json(endpoint, CURRENT_PATH, &self.weather_query(at)).await?;

        Ok(CurrentWeather {
            name: parsed.name,
            temperature: parsed.main.temp,
            temp_min: parsed.main.temp_min,
            temp_max: parsed.main.temp_max,
            feels_like: parsed.main.feels_like,
            humidity: parsed.main.humidity,
            pressure: parsed.main.pressure,
            wind_speed: parsed.wind.speed,
            condition: first_condition(endpoint, parsed.weather)?,
        })
    }

    #[instrument(skip(self), level = "debug")]
    async fn fetch_forecast(&self, at: Coordinates) -> Result<Vec<Sample>, FetchError> {
        let endpoint = Endpoint::Forecast;
        let parsed: OwForecastResponse =
            self.get_json(endpoint, FORECAST_PATH, &self.weather_query(at)).await?;

        parsed
            .list
            .into_iter()
            .map(|entry| -> Result<Sample, FetchError> {
                let timestamp = DateTime::from_timestamp(entry.dt, 0).ok_or_else(|| {
                    FetchError::Malformed {
                        endpoint,
                        message: format!("timestamp {} out of range", entry.dt),
                    }
                })?;

                Ok(Sample {
                    timestamp,
                    temperature: entry.main.temp,
                    condition: first_condition(endpoint, entry.weather)?,
                })
            })
            .collect()
    }

    #[instrument(skip(self), level = "debug")]
    async fn reverse_geocode(&self, at: Coordinates) -> Result<Option<City>, FetchError> {
        let query = [
            ("lat", at.latitude.to_string()),
            ("lon", at.longitude.to_string()),
            ("limit", "1".to_string()),
        ];
        let places: Vec<OwReverseEntry> =
            self.get_json(Endpoint::ReverseGeocode, REVERSE_GEOCODE_PATH, &query).await?;

        Ok(places.into_iter().next().map(|place| City {
            name: place.name,
            country: place.country,
            state: place.state,
            latitude: at.latitude,
            longitude: at.longitude,
        }))
    }

    #[instrument(skip(self), level = "debug")]
    async fn search_cities(&self, query: &str, limit: usize) -> Result<Vec<City>, FetchError> {
        let params = [("q", query.to_string()), ("limit", limit.to_string())];
        let places: Vec<OwDirectEntry> =
            self.get_json(Endpoint::DirectGeocode, DIRECT_GEOCODE_PATH, &params).await?;

        Ok(places
            .into_iter()
            .map(|place| City {
                name: place.name,
                country: place.country,
                state: place.state,
                latitude: place.lat,
                longitude: place.lon,
            })
            .collect())
    }
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}
