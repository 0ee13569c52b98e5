//! Test doubles shared by the unit tests.

use async_trait::async_trait;
use chrono::{DateTime, Duration as ChronoDuration, Utc};
use std::{
    sync::{
        Mutex,
        atomic::{AtomicBool, AtomicUsize, Ordering},
    },
    time::Duration,
};

use crate::{
    app::DashboardView,
    error::{Endpoint, FetchError},
    model::{City, Condition, Coordinates, CurrentWeather, Sample},
    provider::WeatherProvider,
    render::{DashboardSnapshot, SearchResultsView},
};

fn upstream_error(endpoint: Endpoint) -> FetchError {
    FetchError::Status { endpoint, status: 500, body: "boom".to_string() }
}

#[derive(Debug, Default)]
pub struct FakeProvider {
    searches: Mutex<Vec<String>>,
    search_results: Mutex<Vec<City>>,
    reverse: Mutex<Option<City>>,
    delays: Mutex<Vec<(f64, Duration)>>,
    fail_search: AtomicBool,
    fail_reverse: AtomicBool,
    fail_current: AtomicBool,
    fail_forecast: AtomicBool,
    weather_calls: AtomicUsize,
}

impl FakeProvider {
    pub fn searches(&self) -> Vec<String> {
        self.searches.lock().unwrap().clone()
    }

    pub fn set_search_results(&self, cities: Vec<City>) {
        *self.search_results.lock().unwrap() = cities;
    }

    pub fn set_reverse(&self, city: Option<City>) {
        *self.reverse.lock().unwrap() = city;
    }

    /// Delay weather responses for the city at `latitude`.
    pub fn delay_weather(&self, latitude: f64, delay: Duration) {
        self.delays.lock().unwrap().push((latitude, delay));
    }

    pub fn fail_search(&self) {
        self.fail_search.store(true, Ordering::SeqCst);
    }

    pub fn fail_reverse(&self) {
        self.fail_reverse.store(true, Ordering::SeqCst);
    }

    pub fn fail_current(&self) {
        self.fail_current.store(true, Ordering::SeqCst);
    }

    pub fn fail_forecast(&self) {
        self.fail_forecast.store(true, Ordering::SeqCst);
    }

    pub fn weather_calls(&self) -> usize {
        self.weather_calls.load(Ordering::SeqCst)
    }

    async fn maybe_delay(&self, at: Coordinates) {
        let delay = self
            .delays
            .lock()
            .unwrap()
            .iter()
            .find(|(lat, _)| *lat == at.latitude)
            .map(|(_, d)| *d);

        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
    }
}

pub fn forecast_samples(count: usize) -> Vec<Sample> {
    let start = DateTime::parse_from_rfc3339("2024-06-03T00:00:00Z")
        .unwrap()
        .with_timezone(&Utc);

    (0..count)
        .map(|i| Sample {
            timestamp: start + ChronoDuration::hours(3 * i as i64),
            temperature: 15.0 + i as f64,
            condition: Condition { code: 800, description: "cielo claro".into() },
        })
        .collect()
}

#[async_trait]
impl WeatherProvider for FakeProvider {
    async fn fetch_current(&self, at: Coordinates) -> Result<CurrentWeather, FetchError> {
        self.weather_calls.fetch_add(1, Ordering::SeqCst);
        self.maybe_delay(at).await;

        if self.fail_current.load(Ordering::SeqCst) {
            return Err(upstream_error(Endpoint::CurrentWeather));
        }

        Ok(CurrentWeather {
            name: format!("{:.2}", at.latitude),
            temperature: 20.0,
            temp_min: 17.0,
            temp_max: 24.0,
            feels_like: 19.5,
            humidity: 40,
            pressure: 1015,
            wind_speed: 2.5,
            condition: Condition { code: 800, description: "cielo claro".into() },
        })
    }

    async fn fetch_forecast(&self, at: Coordinates) -> Result<Vec<Sample>, FetchError> {
        self.maybe_delay(at).await;

        if self.fail_forecast.load(Ordering::SeqCst) {
            return Err(upstream_error(Endpoint::Forecast));
        }
        Ok(forecast_samples(16))
    }

    async fn reverse_geocode(&self, _at: Coordinates) -> Result<Option<City>, FetchError> {
        if self.fail_reverse.load(Ordering::SeqCst) {
            return Err(upstream_error(Endpoint::ReverseGeocode));
        }
        Ok(self.reverse.lock().unwrap().clone())
    }

    async fn search_cities(&self, query: &str, limit: usize) -> Result<Vec<City>, FetchError> {
        self.searches.lock().unwrap().push(query.to_string());

        if self.fail_search.load(Ordering::SeqCst) {
            return Err(upstream_error(Endpoint::DirectGeocode));
        }

        let mut cities = self.search_results.lock().unwrap().clone();
        cities.truncate(limit);
        Ok(cities)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ViewCall {
    Loading(bool),
    Results(SearchResultsView),
    HideResults,
    SearchError(String),
    SearchText(String),
    Paint(DashboardSnapshot),
    Error(String),
}

#[derive(Debug, Default)]
pub struct RecordingView {
    pub calls: Vec<ViewCall>,
}

impl RecordingView {
    pub fn painted_cities(&self) -> Vec<String> {
        self.calls
            .iter()
            .filter_map(|call| match call {
                ViewCall::Paint(snapshot) => Some(snapshot.city.name.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn errors(&self) -> Vec<String> {
        self.calls
            .iter()
            .filter_map(|call| match call {
                ViewCall::Error(message) => Some(message.clone()),
                _ => None,
            })
            .collect()
    }
}

impl DashboardView for RecordingView {
    fn set_loading(&mut self, visible: bool) {
        self.calls.push(ViewCall::Loading(visible));
    }

    fn show_search_results(&mut self, results: &SearchResultsView) {
        self.calls.push(ViewCall::Results(results.clone()));
    }

    fn hide_search_results(&mut self) {
        self.calls.push(ViewCall::HideResults);
    }

    fn show_search_error(&mut self, message: &str) {
        self.calls.push(ViewCall::SearchError(message.to_string()));
    }

    fn set_search_text(&mut self, text: &str) {
        self.calls.push(ViewCall::SearchText(text.to_string()));
    }

    fn paint(&mut self, snapshot: &DashboardSnapshot) {
        self.calls.push(ViewCall::Paint(snapshot.clone()));
    }

    fn show_error(&mut self, message: &str) {
        self.calls.push(ViewCall::Error(message.to_string()));
    }
}
