use std::time::Instant;

use serde_json::Value;
use thiserror::Error;

use super::baseline::estimate_baseline;
use super::bundles::detect_bundles;
use super::config::{AnalysisConfig, ConfigOverrides};
use super::correlations::analyze_correlations;
use super::episodes::{detect_episodes, resolve_threshold};
use super::messages::Cautions;
use super::qol::{analyze_qol_patterns, detect_dissonance};
use super::trends::{daily_points, weekday_profile, weekly_points};
use super::types::{
    AnalysisMetadata, AnalysisResult, Confidence, DataQuality, DateRange, PainRecord, Trends,
};
use super::validate::clean_records;

/// Below this many records the data is too thin for any pattern.
const INSUFFICIENT_DATA_RECORDS: usize = 7;
/// Records needed before data quality is reported as good.
const GOOD_DATA_RECORDS: usize = 30;

// ---------------------------------------------------------------------------
// EngineError
// ---------------------------------------------------------------------------

/// Broken caller contracts on the JSON entry point. Data-quality problems
/// never surface here; they become cautions in the result.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Malformed JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Records payload must be a JSON array, found {0}")]
    RecordsNotArray(&'static str),

    #[error("Record at index {0} is not a JSON object")]
    RecordNotObject(usize),

    #[error("Configuration overrides must be a JSON object, found {0}")]
    OverridesNotObject(&'static str),
}

// ---------------------------------------------------------------------------
// Entry points
// ---------------------------------------------------------------------------

/// Run every stage over `records` and assemble the result.
///
/// Pure: the same records and configuration always give the same result.
/// The configuration is clamped before use.
pub fn analyze(records: &[PainRecord], config: &AnalysisConfig) -> AnalysisResult {
    run(records, 0, config)
}

/// Same as [`analyze`], merging sparse overrides onto the defaults first.
pub fn analyze_with_overrides(records: &[PainRecord], overrides: &ConfigOverrides) -> AnalysisResult {
    analyze(records, &AnalysisConfig::from_overrides(overrides))
}

/// Analyze serialized input.
///
/// `records_json` must be an array of objects and `overrides_json`, when
/// given, an object. Anything else is a caller error. An object that does not
/// fit the record shape (e.g. a text pain level) is excluded like any other
/// invalid record.
pub fn analyze_json(
    records_json: &str,
    overrides_json: Option<&str>,
) -> Result<AnalysisResult, EngineError> {
    let records = parse_records(records_json)?;
    let overrides = match overrides_json {
        Some(raw) => parse_overrides(raw)?,
        None => ConfigOverrides::default(),
    };

    let malformed = records.iter().filter(|r| r.is_none()).count();
    let records: Vec<PainRecord> = records.into_iter().flatten().collect();

    Ok(run(&records, malformed, &AnalysisConfig::from_overrides(&overrides)))
}

fn parse_records(raw: &str) -> Result<Vec<Option<PainRecord>>, EngineError> {
    let value: Value = serde_json::from_str(raw)?;
    let Value::Array(items) = value else {
        return Err(EngineError::RecordsNotArray(json_kind(&value)));
    };

    items
        .into_iter()
        .enumerate()
        .map(|(index, item)| {
            if !item.is_object() {
                return Err(EngineError::RecordNotObject(index));
            }
            Ok(serde_json::from_value::<PainRecord>(item).ok())
        })
        .collect()
}

fn parse_overrides(raw: &str) -> Result<ConfigOverrides, EngineError> {
    let value: Value = serde_json::from_str(raw)?;
    if !value.is_object() {
        return Err(EngineError::OverridesNotObject(json_kind(&value)));
    }
    Ok(serde_json::from_value(value)?)
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

// ---------------------------------------------------------------------------
// Pipeline
// ---------------------------------------------------------------------------

fn run(records: &[PainRecord], malformed: usize, config: &AnalysisConfig) -> AnalysisResult {
    let config = config.clamped();
    let _span = tracing::info_span!("pain_analysis", input = records.len() + malformed).entered();
    let start = Instant::now();
    let mut cautions = Vec::new();

    // [1] Validate
    let series = clean_records(records);
    let excluded = series.excluded + malformed;
    if series.is_empty() {
        cautions.push(Cautions::no_records());
    }
    if excluded > 0 {
        cautions.push(Cautions::records_excluded(excluded));
    }
    tracing::debug!(used = series.len(), excluded, "Records validated");

    // [2] Baseline
    let baseline = estimate_baseline(&series.records, config.baseline_window_days);
    if !series.is_empty() && baseline.confidence == Confidence::Low {
        cautions.push(Cautions::baseline_low_confidence(
            baseline.sample_count,
            config.baseline_window_days,
        ));
    }
    tracing::debug!(
        value = baseline.value,
        confidence = baseline.confidence.as_str(),
        "Baseline estimated"
    );

    // [3] Trends
    let daily = daily_points(&series.records);
    let weekly = if series.len() >= config.min_entries_for_trend {
        weekly_points(&daily)
    } else {
        if !series.is_empty() {
            cautions.push(Cautions::too_few_for_trend(
                series.len(),
                config.min_entries_for_trend,
            ));
        }
        Vec::new()
    };
    let trends = Trends {
        weekday_profile: weekday_profile(&daily),
        daily,
        weekly,
    };
    tracing::debug!(
        daily = trends.daily.len(),
        weekly = trends.weekly.len(),
        "Trends aggregated"
    );

    // [4] Episodes
    let threshold = resolve_threshold(&config, baseline.value);
    let episodes = detect_episodes(&trends.daily, threshold, baseline.value, &config);
    if let Some(open) = episodes.iter().find(|e| !e.recovered) {
        cautions.push(Cautions::episode_ongoing(open.start_date));
    }
    tracing::debug!(threshold, episodes = episodes.len(), "Episodes detected");

    // [5] Correlations
    let correlations = analyze_correlations(&series.records, &config);
    if correlations.is_empty() && !series.is_empty() {
        cautions.push(Cautions::no_factor_support(config.min_support_for_correlation));
    }
    tracing::debug!(correlations = correlations.len(), "Correlations computed");

    // [6] Bundles
    let trigger_bundles = if config.enable_trigger_bundles {
        detect_bundles(&series.records, &config)
    } else {
        Vec::new()
    };
    tracing::debug!(bundles = trigger_bundles.len(), "Trigger bundles counted");

    // [7] QoL patterns
    let qol_patterns = if config.enable_qol_patterns {
        let (patterns, qol_cautions) = analyze_qol_patterns(&series.records, &config);
        cautions.extend(qol_cautions);
        patterns
    } else {
        Vec::new()
    };

    // [8] QoL dissonance
    let qol_dissonance = if config.enable_qol_dissonance {
        let (found, caution) = detect_dissonance(&series.records, &config);
        cautions.extend(caution);
        found
    } else {
        Vec::new()
    };
    tracing::debug!(
        patterns = qol_patterns.len(),
        dissonance = qol_dissonance.len(),
        "Quality-of-life analysis complete"
    );

    let metadata = AnalysisMetadata {
        record_count_used: series.len(),
        records_excluded: excluded,
        date_range: DateRange {
            first: series.records.iter().map(|r| r.day).min(),
            last: series.records.iter().map(|r| r.day).max(),
        },
        data_quality: data_quality(series.len(), &config),
        cautions,
        config_snapshot: config,
    };

    tracing::info!(
        used = metadata.record_count_used,
        excluded = metadata.records_excluded,
        episodes = episodes.len(),
        correlations = correlations.len(),
        cautions = metadata.cautions.len(),
        processing_ms = start.elapsed().as_millis() as u64,
        "Pain pattern analysis complete"
    );

    AnalysisResult {
        baseline,
        trends,
        episodes,
        correlations,
        trigger_bundles,
        qol_patterns,
        qol_dissonance,
        metadata,
    }
}

pub fn data_quality(record_count: usize, config: &AnalysisConfig) -> DataQuality {
    if record_count < INSUFFICIENT_DATA_RECORDS {
        DataQuality::Insufficient
    } else if record_count < config.min_entries_for_trend.max(GOOD_DATA_RECORDS) {
        DataQuality::Limited
    } else {
        DataQuality::Good
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
