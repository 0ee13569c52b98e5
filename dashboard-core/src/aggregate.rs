//! Turns the flat list of 3-hour samples into per-day summaries.
//!
//! Days are keyed by the local calendar date of each sample and kept in the
//! order they are first seen, so a chronologically ordered forecast yields
//! chronologically ordered days.

use chrono::{NaiveDate, TimeZone};
use indexmap::IndexMap;

use crate::model::{DaySummary, Sample};

fn local_date<Tz: TimeZone>(sample: &Sample, tz: &Tz) -> NaiveDate {
    sample.timestamp.with_timezone(tz).date_naive()
}

/// Rounds to one decimal place, halves away from zero.
pub fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Groups samples by local date with running min/max.
///
/// The condition of each day is the condition of the first sample seen for
/// that date in input order. A morning storm followed by afternoon sun is
/// reported as a storm.
pub fn group_by_day<Tz: TimeZone>(samples: &[Sample], tz: &Tz) -> IndexMap<NaiveDate, DaySummary> {
    let mut days: IndexMap<NaiveDate, DaySummary> = IndexMap::new();

    for sample in samples {
        let date = local_date(sample, tz);
        let temp = sample.temperature;

        days.entry(date)
            .and_modify(|day| {
                day.min_temperature = day.min_temperature.min(temp);
                day.max_temperature = day.max_temperature.max(temp);
            })
            .or_insert_with(|| DaySummary {
                date,
                min_temperature: temp,
                max_temperature: temp,
                average_temperature: None,
                condition: sample.condition.clone(),
            });
    }

    days
}

/// Mean temperature per local date, rounded to one decimal.
pub fn daily_averages<Tz: TimeZone>(samples: &[Sample], tz: &Tz) -> IndexMap<NaiveDate, f64> {
    let mut sums: IndexMap<NaiveDate, (f64, usize)> = IndexMap::new();

    for sample in samples {
        let entry = sums.entry(local_date(sample, tz)).or_insert((0.0, 0));
        entry.0 += sample.temperature;
        entry.1 += 1;
    }

    sums.into_iter()
        .map(|(date, (sum, count))| (date, round1(sum / count as f64)))
        .collect()
}

/// Day summaries in first-seen order, with the average filled in for `today` only.
pub fn summarize<Tz: TimeZone>(samples: &[Sample], tz: &Tz, today: NaiveDate) -> Vec<DaySummary> {
    let mut days = group_by_day(samples, tz);

    if let Some(day) = days.get_mut(&today) {
        day.average_temperature = daily_averages(samples, tz).get(&today).copied();
    }

    days.into_values().collect()
}
