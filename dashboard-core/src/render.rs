//! Pure mapping from weather data to view models.
//!
//! Nothing here touches the network or aggregates; the front-end decides how
//! a view model ends up on screen.

use chrono::{Datelike, NaiveDate, TimeZone, Timelike, Weekday};
use serde::Serialize;

use crate::{
    aggregate,
    config::DashboardSettings,
    icon::{Icon, weather_icon},
    model::{City, CurrentWeather, DaySummary, Lang, Sample},
};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CurrentView {
    pub city: String,
    pub temperature: i64,
    pub description: String,
    pub icon: Icon,
    pub temp_min: i64,
    pub temp_max: i64,
    pub feels_like: i64,
    pub humidity: u8,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HourlyItem {
    /// Local hour, e.g. "15:00".
    pub label: String,
    pub icon: Icon,
    pub temperature: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeeklyDay {
    pub date: NaiveDate,
    pub weekday: String,
    pub description: String,
    pub icon: Icon,
    pub max: i64,
    pub min: i64,
}

/// Individual stat containers of the details panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum StatField {
    WindSpeed,
    Humidity,
    Pressure,
    MinTemperature,
    MaxTemperature,
    AverageTemperature,
}

impl StatField {
    pub fn container_id(&self) -> &'static str {
        match self {
            StatField::WindSpeed => "windSpeed",
            StatField::Humidity => "humidity",
            StatField::Pressure => "pressure",
            StatField::MinTemperature => "min",
            StatField::MaxTemperature => "max",
            StatField::AverageTemperature => "average",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DetailsView {
    pub fields: Vec<(StatField, String)>,
}

impl DetailsView {
    pub fn get(&self, field: StatField) -> Option<&str> {
        self.fields.iter().find(|(f, _)| *f == field).map(|(_, v)| v.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchResultItem {
    pub label: String,
    pub coordinates: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum SearchResultsView {
    /// Placeholder shown instead of an empty list.
    NoResults,
    Cities(Vec<SearchResultItem>),
}

/// Everything needed to paint the four dashboard views at once.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardSnapshot {
    pub city: City,
    pub current: CurrentView,
    pub hourly: Vec<HourlyItem>,
    pub weekly: Vec<WeeklyDay>,
    pub details: DetailsView,
}

/// Rounds half away from zero.
pub fn round_temp(value: f64) -> i64 {
    value.round() as i64
}

pub fn capitalize_first(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

pub fn weekday_name(weekday: Weekday, lang: Lang) -> &'static str {
    match lang {
        Lang::Es => match weekday {
            Weekday::Mon => "lunes",
            Weekday::Tue => "martes",
            Weekday::Wed => "miércoles",
            Weekday::Thu => "jueves",
            Weekday::Fri => "viernes",
            Weekday::Sat => "sábado",
            Weekday::Sun => "domingo",
        },
        Lang::En => match weekday {
            Weekday::Mon => "monday",
            Weekday::Tue => "tuesday",
            Weekday::Wed => "wednesday",
            Weekday::Thu => "thursday",
            Weekday::Fri => "friday",
            Weekday::Sat => "saturday",
            Weekday::Sun => "sunday",
        },
    }
}

pub fn no_results_message(lang: Lang) -> &'static str {
    match lang {
        Lang::Es => "No se encontraron resultados",
        Lang::En => "No results found",
    }
}

pub fn render_current(current: &CurrentWeather) -> CurrentView {
    CurrentView {
        city: current.name.clone(),
        temperature: round_temp(current.temperature),
        description: capitalize_first(&current.condition.description),
        icon: weather_icon(current.condition.code),
        temp_min: round_temp(current.temp_min),
        temp_max: round_temp(current.temp_max),
        feels_like: round_temp(current.feels_like),
        humidity: current.humidity,
    }
}

/// The first `count` samples verbatim, labelled with their local hour.
pub fn render_hourly<Tz: TimeZone>(samples: &[Sample], count: usize, tz: &Tz) -> Vec<HourlyItem> {
    samples
        .iter()
        .take(count)
        .map(|sample| HourlyItem {
            label: format!("{}:00", sample.timestamp.with_timezone(tz).hour()),
            icon: weather_icon(sample.condition.code),
            temperature: round_temp(sample.temperature),
        })
        .collect()
}

pub fn render_weekly<'a>(
    days: impl IntoIterator<Item = &'a DaySummary>,
    lang: Lang,
) -> Vec<WeeklyDay> {
    days.into_iter()
        .map(|day| WeeklyDay {
            date: day.date,
            weekday: capitalize_first(weekday_name(day.date.weekday(), lang)),
            description: capitalize_first(&day.condition.description),
            icon: weather_icon(day.condition.code),
            max: round_temp(day.max_temperature),
            min: round_temp(day.min_temperature),
        })
        .collect()
}

pub fn render_details(current: &CurrentWeather, today_average: Option<f64>) -> DetailsView {
    let mut fields = vec![
        (StatField::WindSpeed, format!("{} km/h", round_temp(current.wind_speed * 3.6))),
        (StatField::Humidity, format!("{}%", current.humidity)),
        (StatField::Pressure, format!("{} hPa", current.pressure)),
        (StatField::MinTemperature, format!("{} °C", current.temp_min)),
        (StatField::MaxTemperature, format!("{} °C", current.temp_max)),
    ];

    if let Some(avg) = today_average {
        fields.push((StatField::AverageTemperature, format!("{avg:.1} °C")));
    }

    DetailsView { fields }
}

/// Display name for the ISO 3166 codes the geocoder returns most often.
pub fn country_name(code: &str, lang: Lang) -> Option<&'static str> {
    let (es, en) = match code.to_ascii_uppercase().as_str() {
        "ES" => ("España", "Spain"),
        "PT" => ("Portugal", "Portugal"),
        "FR" => ("Francia", "France"),
        "IT" => ("Italia", "Italy"),
        "DE" => ("Alemania", "Germany"),
        "GB" => ("Reino Unido", "United Kingdom"),
        "IE" => ("Irlanda", "Ireland"),
        "NL" => ("Países Bajos", "Netherlands"),
        "BE" => ("Bélgica", "Belgium"),
        "CH" => ("Suiza", "Switzerland"),
        "US" => ("Estados Unidos", "United States"),
        "CA" => ("Canadá", "Canada"),
        "MX" => ("México", "Mexico"),
        "AR" => ("Argentina", "Argentina"),
        "CL" => ("Chile", "Chile"),
        "CO" => ("Colombia", "Colombia"),
        "PE" => ("Perú", "Peru"),
        "VE" => ("Venezuela", "Venezuela"),
        "BR" => ("Brasil", "Brazil"),
        _ => return None,
    };

    Some(match lang {
        Lang::Es => es,
        Lang::En => en,
    })
}

fn result_label(city: &City, lang: Lang) -> String {
    let mut label = city.name.clone();
    if let Some(state) = city.state.as_deref().filter(|s| !s.is_empty()) {
        label.push_str(", ");
        label.push_str(state);
    }
    if !city.country.is_empty() {
        label.push_str(", ");
        match country_name(&city.country, lang) {
            Some(name) => label.push_str(name),
            None => label.push_str(&city.country),
        }
    }
    label
}

pub fn render_search_results(cities: &[City], lang: Lang) -> SearchResultsView {
    if cities.is_empty() {
        return SearchResultsView::NoResults;
    }

    SearchResultsView::Cities(
        cities
            .iter()
            .map(|city| SearchResultItem {
                label: result_label(city, lang),
                coordinates: format!("{:.2}°, {:.2}°", city.latitude, city.longitude),
            })
            .collect(),
    )
}

/// Aggregate the forecast and build all four views for one city.
pub fn render_dashboard<Tz: TimeZone>(
    city: &City,
    current: &CurrentWeather,
    samples: &[Sample],
    settings: &DashboardSettings,
    tz: &Tz,
    today: NaiveDate,
) -> DashboardSnapshot {
    let days = aggregate::summarize(samples, tz, today);
    let today_average = days
        .iter()
        .find(|d| d.date == today)
        .and_then(|d| d.average_temperature);

    DashboardSnapshot {
        city: city.clone(),
        current: render_current(current),
        hourly: render_hourly(samples, settings.hourly_count, tz),
        weekly: render_weekly(&days, settings.lang),
        details: render_details(current, today_average),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Condition;
    use chrono::{DateTime, Duration, FixedOffset, Utc};

    fn condition(code: i32, description: &str) -> Condition {
        Condition { code, description: description.to_string() }
    }

    fn current() -> CurrentWeather {
        CurrentWeather {
            name: "Madrid".into(),
            temperature: 21.5,
            temp_min: 18.94,
            temp_max: 23.0,
            feels_like: -0.4,
            humidity: 41,
            pressure: 1017,
            wind_speed: 3.6,
            condition: condition(801, "algo de nubes"),
        }
    }

    /// Madrid forecast at 3-hour steps starting 00:00 UTC on 2024-06-03 (a Monday).
    fn madrid_samples(count: usize) -> Vec<Sample> {
        let start = DateTime::parse_from_rfc3339("2024-06-03T00:00:00Z").unwrap().with_timezone(&Utc);
        (0..count)
            .map(|i| Sample {
                timestamp: start + Duration::hours(3 * i as i64),
                temperature: 15.0 + i as f64,
                condition: condition(if i < 4 { 500 } else { 800 }, "lluvia ligera"),
            })
            .collect()
    }

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn current_view_rounds_and_capitalizes() {
        let view = render_current(&current());

        assert_eq!(view.city, "Madrid");
        assert_eq!(view.temperature, 22);
        assert_eq!(view.temp_min, 19);
        assert_eq!(view.feels_like, 0);
        assert_eq!(view.description, "Algo de nubes");
        assert_eq!(view.icon, Icon::FewClouds);
    }

    #[test]
    fn round_temp_half_away_from_zero() {
        assert_eq!(round_temp(2.5), 3);
        assert_eq!(round_temp(-2.5), -3);
        assert_eq!(round_temp(-0.4), 0);
    }

    #[test]
    fn capitalize_first_handles_unicode_and_empty() {
        assert_eq!(capitalize_first("éxito"), "Éxito");
        assert_eq!(capitalize_first(""), "");
        assert_eq!(capitalize_first("cielo claro"), "Cielo claro");
    }

    #[test]
    fn hourly_takes_first_n_samples_in_order() {
        let samples = madrid_samples(16);
        let hourly = render_hourly(&samples, 8, &Utc);

        let labels: Vec<_> = hourly.iter().map(|h| h.label.as_str()).collect();
        assert_eq!(labels, ["0:00", "3:00", "6:00", "9:00", "12:00", "15:00", "18:00", "21:00"]);
        assert_eq!(hourly[0].temperature, 15);
        assert_eq!(hourly[0].icon, Icon::Rain);
        assert_eq!(hourly[7].icon, Icon::Clear);
    }

    #[test]
    fn hourly_labels_use_local_time() {
        let samples = madrid_samples(2);
        let cest = FixedOffset::east_opt(2 * 3600).unwrap();
        let hourly = render_hourly(&samples, 10, &cest);

        assert_eq!(hourly.len(), 2);
        assert_eq!(hourly[0].label, "2:00");
        assert_eq!(hourly[1].label, "5:00");
    }

    #[test]
    fn weekly_has_one_entry_per_day_with_min_max() {
        let samples = madrid_samples(16);
        let days = aggregate::summarize(&samples, &Utc, date("2024-06-03"));
        let weekly = render_weekly(&days, Lang::Es);

        assert_eq!(weekly.len(), 2);
        assert_eq!(weekly[0].weekday, "Lunes");
        assert_eq!(weekly[0].min, 15);
        assert_eq!(weekly[0].max, 22);
        assert_eq!(weekly[0].description, "Lluvia ligera");
        assert_eq!(weekly[0].icon, Icon::Rain);
        assert_eq!(weekly[1].weekday, "Martes");
        assert_eq!(weekly[1].min, 23);
        assert_eq!(weekly[1].max, 30);
        assert_eq!(weekly[1].icon, Icon::Clear);
    }

    #[test]
    fn weekly_in_english() {
        let days = aggregate::summarize(&madrid_samples(1), &Utc, date("2024-06-03"));
        assert_eq!(render_weekly(&days, Lang::En)[0].weekday, "Monday");
    }

    #[test]
    fn details_format_units() {
        let details = render_details(&current(), Some(18.3));

        assert_eq!(details.get(StatField::WindSpeed), Some("13 km/h"));
        assert_eq!(details.get(StatField::Humidity), Some("41%"));
        assert_eq!(details.get(StatField::Pressure), Some("1017 hPa"));
        assert_eq!(details.get(StatField::MinTemperature), Some("18.94 °C"));
        assert_eq!(details.get(StatField::MaxTemperature), Some("23 °C"));
        assert_eq!(details.get(StatField::AverageTemperature), Some("18.3 °C"));
    }

    #[test]
    fn details_without_average_omit_the_field() {
        let details = render_details(&current(), None);
        assert_eq!(details.get(StatField::AverageTemperature), None);
        assert_eq!(details.fields.len(), 5);
    }

    #[test]
    fn search_results_placeholder_when_empty() {
        assert_eq!(render_search_results(&[], Lang::Es), SearchResultsView::NoResults);
    }

    #[test]
    fn search_results_format_each_city() {
        let cities = vec![
            City {
                name: "Santiago de Compostela".into(),
                country: "ES".into(),
                state: Some("Galicia".into()),
                latitude: 42.8805,
                longitude: -8.5457,
            },
            City::madrid(),
        ];

        let SearchResultsView::Cities(items) = render_search_results(&cities, Lang::Es) else {
            panic!("expected cities");
        };

        assert_eq!(items.len(), 2);
        assert_eq!(items[0].label, "Santiago de Compostela, Galicia, España");
        assert_eq!(items[0].coordinates, "42.88°, -8.55°");
        assert_eq!(items[1].label, "Madrid, España");
        assert_eq!(items[1].coordinates, "40.42°, -3.70°");
    }

    #[test]
    fn search_results_name_countries_in_display_language() {
        let london = City {
            name: "London".into(),
            country: "GB".into(),
            state: Some("England".into()),
            latitude: 51.5073,
            longitude: -0.1276,
        };
        let tbilisi = City {
            name: "Tbilisi".into(),
            country: "GE".into(),
            state: None,
            latitude: 41.6941,
            longitude: 44.8337,
        };

        let SearchResultsView::Cities(en) = render_search_results(&[london.clone()], Lang::En) else {
            panic!("expected cities");
        };
        assert_eq!(en[0].label, "London, England, United Kingdom");

        let SearchResultsView::Cities(es) = render_search_results(&[london, tbilisi], Lang::Es) else {
            panic!("expected cities");
        };
        assert_eq!(es[0].label, "London, England, Reino Unido");
        // Unknown codes are shown as-is.
        assert_eq!(es[1].label, "Tbilisi, GE");
    }

    #[test]
    fn country_lookup_ignores_case() {
        assert_eq!(country_name("es", Lang::Es), Some("España"));
        assert_eq!(country_name("US", Lang::En), Some("United States"));
        assert_eq!(country_name("ZZ", Lang::En), None);
    }

    #[test]
    fn dashboard_snapshot_combines_all_views() {
        let samples = madrid_samples(16);
        let settings = DashboardSettings::default();
        let snapshot = render_dashboard(
            &City::madrid(),
            &current(),
            &samples,
            &settings,
            &Utc,
            date("2024-06-03"),
        );

        assert_eq!(snapshot.city.name, "Madrid");
        assert_eq!(snapshot.hourly.len(), 8);
        assert_eq!(snapshot.weekly.len(), 2);
        // Mean of 15..=22 is 18.5.
        assert_eq!(snapshot.details.get(StatField::AverageTemperature), Some("18.5 °C"));
    }
}
