use serde::{Deserialize, Serialize};

/// Icon family for an OpenWeather condition code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Icon {
    Thunderstorm,
    Drizzle,
    Rain,
    Snow,
    Atmosphere,
    Clear,
    FewClouds,
    Clouds,
}

impl Icon {
    /// Map a condition code using OpenWeather's code groups.
    ///
    /// See: https://openweathermap.org/weather-conditions
    pub fn from_condition_code(code: i32) -> Self {
        match code {
            200..=299 => Self::Thunderstorm,
            300..=499 => Self::Drizzle,
            500..=599 => Self::Rain,
            600..=699 => Self::Snow,
            700..=799 => Self::Atmosphere,
            800 => Self::Clear,
            801 => Self::FewClouds,
            802..=804 => Self::Clouds,
            _ => Self::Clear,
        }
    }

    /// Font Awesome class names.
    pub fn identifier(&self) -> &'static str {
        match self {
            Self::Thunderstorm => "fas fa-bolt",
            Self::Drizzle => "fas fa-cloud-rain",
            Self::Rain => "fas fa-cloud-showers-heavy",
            Self::Snow => "fas fa-snowflake",
            Self::Atmosphere => "fas fa-smog",
            Self::Clear => "fas fa-sun",
            Self::FewClouds => "fas fa-cloud-sun",
            Self::Clouds => "fas fa-cloud",
        }
    }
}

pub fn weather_icon(code: i32) -> Icon {
    Icon::from_condition_code(code)
}
