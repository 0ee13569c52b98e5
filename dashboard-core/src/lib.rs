//! Core library for the `weather-dash` dashboard.
//!
//! This crate defines:
//! - Forecast aggregation (daily min/max/average)
//! - The OpenWeather client behind the `WeatherProvider` trait
//! - Debounced city search
//! - View models for the current, hourly, weekly and details panels
//! - The `App` orchestrator that wires them together
//!
//! It is used by `dashboard-cli`, but any front-end implementing
//! `DashboardView` can drive it.

pub mod aggregate;
pub mod app;
pub mod config;
pub mod error;
pub mod geolocation;
pub mod icon;
pub mod model;
pub mod provider;
pub mod render;
pub mod search;

#[cfg(test)]
mod testing;

pub use app::{App, DashboardView, Message, UiEvent, UiState, load_dashboard, resolve_start_city};
pub use config::{Config, DashboardSettings};
pub use error::{Endpoint, FetchError, GeolocationError};
pub use geolocation::{FixedPosition, Geolocator, NoGeolocation};
pub use icon::{Icon, weather_icon};
pub use model::{City, Condition, Coordinates, CurrentWeather, DaySummary, Lang, Sample};
pub use provider::{WeatherProvider, provider_from_config};
pub use render::{DashboardSnapshot, SearchResultsView};
