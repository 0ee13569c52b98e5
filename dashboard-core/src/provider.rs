use crate::{
    Config,
    error::FetchError,
    model::{City, Coordinates, CurrentWeather, Sample},
    provider::openweather::OpenWeatherClient,
};
use async_trait::async_trait;
use std::{fmt::Debug, sync::Arc};

pub mod openweather;

/// Read-only access to the upstream weather and geocoding endpoints.
#[async_trait]
pub trait WeatherProvider: Send + Sync + Debug {
    async fn fetch_current(&self, at: Coordinates) -> Result<CurrentWeather, FetchError>;

    /// 5-day forecast at 3-hour steps, in the order the API returns it.
    async fn fetch_forecast(&self, at: Coordinates) -> Result<Vec<Sample>, FetchError>;

    /// `Ok(None)` when the provider knows no place at these coordinates.
    async fn reverse_geocode(&self, at: Coordinates) -> Result<Option<City>, FetchError>;

    async fn search_cities(&self, query: &str, limit: usize) -> Result<Vec<City>, FetchError>;
}

/// Construct the OpenWeather client from config.
pub fn provider_from_config(config: &Config) -> anyhow::Result<Arc<dyn WeatherProvider>> {
    let api_key = config.resolve_api_key()?;

    let client = OpenWeatherClient::with_base_url(api_key, config.base_url.clone())
        .with_lang(config.lang);

    Ok(Arc::new(client))
}
