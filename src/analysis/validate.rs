//! Record validation: turns loosely-shaped diary entries into [`CleanRecord`]s.
//!
//! Invalid entries are dropped and counted, never reported as errors.

use std::collections::BTreeSet;

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime};

use super::config::PAIN_SCALE_MAX;
use super::types::{CleanRecord, PainRecord, QolScores, QualityOfLife};

const NAIVE_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// Chronologically sorted valid records plus the number that were dropped.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CleanedSeries {
    pub records: Vec<CleanRecord>,
    pub excluded: usize,
}

impl CleanedSeries {
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }
}

/// Filter and sort. Ties on timestamp keep their input order.
pub fn clean_records(raw: &[PainRecord]) -> CleanedSeries {
    let mut records: Vec<CleanRecord> = raw.iter().filter_map(validate_record).collect();
    records.sort_by_key(|r| r.at);

    CleanedSeries {
        excluded: raw.len() - records.len(),
        records,
    }
}

/// Validate a single record. `None` means the record is excluded.
pub fn validate_record(raw: &PainRecord) -> Option<CleanRecord> {
    let at = parse_timestamp(raw.timestamp.as_deref()?)?;
    let pain_level = parse_pain_level(raw.pain_level?)?;

    Some(CleanRecord {
        at,
        day: at.date_naive(),
        pain_level,
        triggers: label_set(&raw.triggers),
        symptoms: label_set(&raw.symptoms),
        medications: label_set(&raw.medications),
        locations: label_set(&raw.locations),
        qol: qol_scores(raw.quality_of_life.as_ref()),
    })
}

/// Accepts RFC 3339, naive date-times (read as UTC) and bare dates (midnight UTC).
pub fn parse_timestamp(value: &str) -> Option<DateTime<FixedOffset>> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt);
    }

    for format in NAIVE_DATETIME_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(value, format) {
            return Some(naive.and_utc().into());
        }
    }

    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc().into())
}

/// Whole numbers on the 0-10 scale only.
pub fn parse_pain_level(value: f64) -> Option<u8> {
    if !value.is_finite() || value.fract() != 0.0 || !(0.0..=PAIN_SCALE_MAX).contains(&value) {
        return None;
    }
    Some(value as u8)
}

fn label_set(labels: &[String]) -> BTreeSet<String> {
    labels
        .iter()
        .map(|l| l.trim())
        .filter(|l| !l.is_empty())
        .map(str::to_string)
        .collect()
}

fn qol_scores(qol: Option<&QualityOfLife>) -> QolScores {
    let Some(qol) = qol else {
        return QolScores::default();
    };
    let finite = |v: Option<f64>| v.filter(|x| x.is_finite());
    QolScores {
        sleep: finite(qol.sleep_quality),
        mood: finite(qol.mood_impact),
        activity: finite(qol.activity_level),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;

    fn make_record(timestamp: &str, pain: f64) -> PainRecord {
        PainRecord {
            timestamp: Some(timestamp.into()),
            pain_level: Some(pain),
            ..Default::default()
        }
    }

    #[test]
    fn empty_input_yields_empty_series() {
        let series = clean_records(&[]);
        assert!(series.is_empty());
        assert_eq!(series.excluded, 0);
    }

    #[test]
    fn sorts_chronologically() {
        let raw = vec![
            make_record("2025-01-03T08:00:00Z", 5.0),
            make_record("2025-01-01T08:00:00Z", 3.0),
            make_record("2025-01-02T08:00:00Z", 4.0),
        ];
        let series = clean_records(&raw);
        let levels: Vec<u8> = series.records.iter().map(|r| r.pain_level).collect();
        assert_eq!(levels, vec![3, 4, 5]);
    }

    #[test]
    fn ties_keep_input_order() {
        let mut first = make_record("2025-01-01T08:00:00Z", 2.0);
        first.triggers = vec!["first".into()];
        let mut second = make_record("2025-01-01T08:00:00Z", 2.0);
        second.triggers = vec!["second".into()];

        let series = clean_records(&[first, second]);
        assert!(series.records[0].triggers.contains("first"));
        assert!(series.records[1].triggers.contains("second"));
    }

    #[test]
    fn drops_out_of_range_pain() {
        let raw = vec![
            make_record("2025-01-01T08:00:00Z", -1.0),
            make_record("2025-01-01T09:00:00Z", 11.0),
            make_record("2025-01-01T10:00:00Z", 10.0),
            make_record("2025-01-01T11:00:00Z", 0.0),
        ];
        let series = clean_records(&raw);
        assert_eq!(series.len(), 2);
        assert_eq!(series.excluded, 2);
    }

    #[test]
    fn drops_fractional_and_non_finite_pain() {
        assert!(parse_pain_level(3.5).is_none());
        assert!(parse_pain_level(f64::NAN).is_none());
        assert!(parse_pain_level(f64::INFINITY).is_none());
        assert_eq!(parse_pain_level(3.0), Some(3));
    }

    #[test]
    fn drops_missing_fields() {
        let no_time = PainRecord {
            pain_level: Some(4.0),
            ..Default::default()
        };
        let no_pain = PainRecord {
            timestamp: Some("2025-01-01".into()),
            ..Default::default()
        };
        let series = clean_records(&[no_time, no_pain]);
        assert!(series.is_empty());
        assert_eq!(series.excluded, 2);
    }

    #[test]
    fn drops_unparseable_timestamp() {
        let series = clean_records(&[
            make_record("yesterday", 4.0),
            make_record("2025-13-45", 4.0),
            make_record("", 4.0),
        ]);
        assert!(series.is_empty());
        assert_eq!(series.excluded, 3);
    }

    #[test]
    fn parses_supported_timestamp_shapes() {
        assert!(parse_timestamp("2025-01-15T08:30:00+01:00").is_some());
        assert!(parse_timestamp("2025-01-15T08:30:00Z").is_some());
        assert!(parse_timestamp("2025-01-15 08:30:00").is_some());
        assert!(parse_timestamp("2025-01-15T08:30:00.250").is_some());
        assert!(parse_timestamp("2025-01-15T08:30").is_some());

        let bare = parse_timestamp("2025-01-15").unwrap();
        assert_eq!(bare.hour(), 0);
        assert_eq!(bare.date_naive(), NaiveDate::from_ymd_opt(2025, 1, 15).unwrap());
    }

    #[test]
    fn calendar_day_follows_record_offset() {
        let record = validate_record(&make_record("2025-01-15T23:30:00-05:00", 4.0)).unwrap();
        assert_eq!(record.day, NaiveDate::from_ymd_opt(2025, 1, 15).unwrap());
    }

    #[test]
    fn labels_are_trimmed_and_deduplicated() {
        let mut raw = make_record("2025-01-01", 4.0);
        raw.triggers = vec![" stress ".into(), "stress".into(), "".into(), "   ".into()];
        let record = validate_record(&raw).unwrap();
        assert_eq!(record.triggers.len(), 1);
        assert!(record.triggers.contains("stress"));
    }

    #[test]
    fn non_finite_qol_is_treated_as_absent() {
        let mut raw = make_record("2025-01-01", 4.0);
        raw.quality_of_life = Some(QualityOfLife {
            sleep_quality: Some(f64::NAN),
            mood_impact: Some(6.0),
            activity_level: None,
        });
        let record = validate_record(&raw).unwrap();
        assert!(record.qol.sleep.is_none());
        assert_eq!(record.qol.mood, Some(6.0));
    }

    #[test]
    fn input_is_not_mutated() {
        let raw = vec![
            make_record("2025-01-02", 5.0),
            make_record("2025-01-01", 3.0),
        ];
        let before = raw[0].timestamp.clone();
        let _ = clean_records(&raw);
        assert_eq!(raw[0].timestamp, before);
    }
}
