//! Baseline estimation: the median pain level over a trailing window.
//!
//! The window is anchored on the latest record, never on the wall clock.

use chrono::Duration;

use super::stats::median;
use super::types::{Baseline, CleanRecord, Confidence};

pub const HIGH_CONFIDENCE_MIN_RECORDS: usize = 30;
pub const MEDIUM_CONFIDENCE_MIN_RECORDS: usize = 14;

pub fn estimate_baseline(records: &[CleanRecord], window_days: u32) -> Baseline {
    let Some(latest) = records.last() else {
        return Baseline {
            value: 0.0,
            confidence: Confidence::Low,
            sample_count: 0,
            window_days,
        };
    };

    // Half-open: a record exactly `window_days` old falls outside.
    let cutoff = latest.at - Duration::days(i64::from(window_days));
    let levels: Vec<f64> = records
        .iter()
        .filter(|r| r.at > cutoff)
        .map(CleanRecord::pain)
        .collect();

    Baseline {
        value: median(&levels).unwrap_or(0.0),
        confidence: confidence_for(levels.len()),
        sample_count: levels.len(),
        window_days,
    }
}

pub fn confidence_for(count: usize) -> Confidence {
    if count >= HIGH_CONFIDENCE_MIN_RECORDS {
        Confidence::High
    } else if count >= MEDIUM_CONFIDENCE_MIN_RECORDS {
        Confidence::Medium
    } else {
        Confidence::Low
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::validate::clean_records;
    use crate::analysis::types::PainRecord;

    fn daily_series(levels: &[u8]) -> Vec<CleanRecord> {
        let raw: Vec<PainRecord> = levels
            .iter()
            .enumerate()
            .map(|(i, &level)| PainRecord {
                timestamp: Some(format!("2025-03-{:02}T09:00:00Z", i + 1)),
                pain_level: Some(f64::from(level)),
                ..Default::default()
            })
            .collect();
        clean_records(&raw).records
    }

    #[test]
    fn empty_window_is_zero_with_low_confidence() {
        let baseline = estimate_baseline(&[], 30);
        assert_eq!(baseline.value, 0.0);
        assert_eq!(baseline.confidence, Confidence::Low);
        assert_eq!(baseline.sample_count, 0);
    }

    #[test]
    fn uses_median_not_mean() {
        let mut levels = vec![3u8; 19];
        levels.push(10);
        let baseline = estimate_baseline(&daily_series(&levels), 30);
        assert_eq!(baseline.value, 3.0);
    }

    #[test]
    fn confidence_follows_record_count() {
        assert_eq!(confidence_for(0), Confidence::Low);
        assert_eq!(confidence_for(13), Confidence::Low);
        assert_eq!(confidence_for(14), Confidence::Medium);
        assert_eq!(confidence_for(29), Confidence::Medium);
        assert_eq!(confidence_for(30), Confidence::High);
    }

    #[test]
    fn window_trails_latest_record() {
        // Ten early days at 8, then ten days at 2; a 5-day window sees only the 2s.
        let mut levels = vec![8u8; 10];
        levels.extend(vec![2u8; 10]);
        let baseline = estimate_baseline(&daily_series(&levels), 5);
        assert_eq!(baseline.value, 2.0);
        assert_eq!(baseline.sample_count, 5);
    }

    #[test]
    fn thirty_day_window_holds_thirty_daily_entries() {
        // The first of 31 daily entries is exactly 30 days old.
        let mut levels = vec![9u8];
        levels.extend(vec![1u8; 30]);
        let baseline = estimate_baseline(&daily_series(&levels), 30);
        assert_eq!(baseline.sample_count, 30);
        assert_eq!(baseline.value, 1.0);
    }

    #[test]
    fn identical_input_gives_identical_output() {
        let records = daily_series(&[1, 4, 6, 2, 9, 3]);
        assert_eq!(estimate_baseline(&records, 30), estimate_baseline(&records, 30));
    }
}
