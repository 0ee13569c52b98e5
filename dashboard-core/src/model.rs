use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A latitude/longitude pair in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }
}

/// The location driving every weather query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct City {
    pub name: String,
    pub country: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
}

impl City {
    pub fn madrid() -> Self {
        Self {
            name: "Madrid".to_string(),
            country: "ES".to_string(),
            state: None,
            latitude: 40.4165,
            longitude: -3.7026,
        }
    }

    /// A city with no known name, labelled by its coordinates.
    pub fn from_coordinates(at: Coordinates) -> Self {
        Self {
            name: format!("{:.2}°, {:.2}°", at.latitude, at.longitude),
            country: String::new(),
            state: None,
            latitude: at.latitude,
            longitude: at.longitude,
        }
    }

    pub fn coordinates(&self) -> Coordinates {
        Coordinates::new(self.latitude, self.longitude)
    }

    /// "Name, CC" as written back into the search input after a selection.
    pub fn short_label(&self) -> String {
        if self.country.is_empty() {
            self.name.clone()
        } else {
            format!("{}, {}", self.name, self.country)
        }
    }
}

impl fmt::Display for City {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)?;
        if let Some(state) = self.state.as_deref().filter(|s| !s.is_empty()) {
            write!(f, ", {state}")?;
        }
        if !self.country.is_empty() {
            write!(f, ", {}", self.country)?;
        }
        Ok(())
    }
}

/// Upstream weather condition: numeric code plus localized description.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Condition {
    pub code: i32,
    pub description: String,
}

/// One 3-hour forecast data point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    pub timestamp: DateTime<Utc>,
    pub temperature: f64,
    pub condition: Condition,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentWeather {
    pub name: String,
    pub temperature: f64,
    pub temp_min: f64,
    pub temp_max: f64,
    pub feels_like: f64,
    pub humidity: u8,
    pub pressure: u32,
    /// Metres per second.
    pub wind_speed: f64,
    pub condition: Condition,
}

/// Aggregated view of all samples sharing one local calendar date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DaySummary {
    pub date: NaiveDate,
    pub min_temperature: f64,
    pub max_temperature: f64,
    pub average_temperature: Option<f64>,
    /// Taken from the first sample seen for this date, never recomputed.
    pub condition: Condition,
}

/// Display language, also sent upstream as the `lang` query parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Lang {
    #[default]
    Es,
    En,
}

impl Lang {
    pub fn as_str(&self) -> &'static str {
        match self {
            Lang::Es => "es",
            Lang::En => "en",
        }
    }
}

impl fmt::Display for Lang {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for Lang {
    type Error = anyhow::Error;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.to_lowercase().as_str() {
            "es" => Ok(Lang::Es),
            "en" => Ok(Lang::En),
            _ => Err(anyhow::anyhow!("Unknown language '{value}'. Supported languages: es, en.")),
        }
    }
}
