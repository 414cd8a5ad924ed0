//! Daily and weekly trend aggregation, plus a weekday profile.
//!
//! Weekly points aggregate daily means (not raw entries), so a day with five
//! entries weighs the same as a day with one.

use std::collections::BTreeMap;

use chrono::{Datelike, Duration, NaiveDate, Weekday};

use super::stats::{mean, summarize};
use super::types::{CleanRecord, TrendPoint, WeekdayPoint};

pub fn daily_points(records: &[CleanRecord]) -> Vec<TrendPoint> {
    let mut by_day: BTreeMap<NaiveDate, Vec<f64>> = BTreeMap::new();
    for record in records {
        by_day.entry(record.day).or_default().push(record.pain());
    }
    bucket_points(by_day)
}

/// Weeks start on Monday; `date` is that Monday.
pub fn weekly_points(daily: &[TrendPoint]) -> Vec<TrendPoint> {
    let mut by_week: BTreeMap<NaiveDate, Vec<f64>> = BTreeMap::new();
    for point in daily {
        by_week.entry(week_start(point.date)).or_default().push(point.mean);
    }
    bucket_points(by_week)
}

pub fn week_start(date: NaiveDate) -> NaiveDate {
    date - Duration::days(i64::from(date.weekday().num_days_from_monday()))
}

/// Mean of daily means per weekday, Monday first. Weekdays with no data are omitted.
pub fn weekday_profile(daily: &[TrendPoint]) -> Vec<WeekdayPoint> {
    let mut by_weekday: BTreeMap<u32, (Weekday, Vec<f64>)> = BTreeMap::new();
    for point in daily {
        let weekday = point.date.weekday();
        by_weekday
            .entry(weekday.num_days_from_monday())
            .or_insert_with(|| (weekday, Vec::new()))
            .1
            .push(point.mean);
    }

    by_weekday
        .into_values()
        .filter_map(|(weekday, means)| {
            Some(WeekdayPoint {
                weekday,
                mean: mean(&means)?,
                day_count: means.len(),
            })
        })
        .collect()
}

fn bucket_points(buckets: BTreeMap<NaiveDate, Vec<f64>>) -> Vec<TrendPoint> {
    buckets
        .into_iter()
        .filter_map(|(date, values)| {
            let s = summarize(&values)?;
            Some(TrendPoint {
                date,
                mean: s.mean,
                std_dev: s.std_dev,
                min: s.min,
                max: s.max,
                count: s.count,
            })
        })
        .collect()
}
