use std::collections::BTreeSet;

use chrono::{DateTime, FixedOffset, NaiveDate, Weekday};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use super::config::AnalysisConfig;

// ---------------------------------------------------------------------------
// Input records
// ---------------------------------------------------------------------------

/// One diary entry as handed over by the storage layer.
///
/// Fields are deliberately loose: a missing or wrong-typed value never fails
/// deserialization. A bad timestamp or pain level makes the record invalid
/// and the validator drops it; a bad label list or QoL score reads as absent.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PainRecord {
    #[serde(default, deserialize_with = "lenient")]
    pub timestamp: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub pain_level: Option<f64>,
    #[serde(default, deserialize_with = "lenient_labels")]
    pub triggers: Vec<String>,
    #[serde(default, deserialize_with = "lenient_labels")]
    pub symptoms: Vec<String>,
    #[serde(default, deserialize_with = "lenient_labels")]
    pub medications: Vec<String>,
    #[serde(default, deserialize_with = "lenient_labels")]
    pub locations: Vec<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub quality_of_life: Option<QualityOfLife>,
}

/// Optional quality-of-life sub-scores. The scale is defined by the caller;
/// higher always reads as better.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QualityOfLife {
    #[serde(default, deserialize_with = "lenient")]
    pub sleep_quality: Option<f64>,
    #[serde(default, deserialize_with = "lenient")]
    pub mood_impact: Option<f64>,
    #[serde(default, deserialize_with = "lenient")]
    pub activity_level: Option<f64>,
}

/// Any value that does not fit `T` (null included) reads as `None`.
fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).ok())
}

/// Keeps the string items of an array. Anything else reads as no labels.
fn lenient_labels<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let labels = match Value::deserialize(deserializer)? {
        Value::Array(items) => items
            .into_iter()
            .filter_map(|item| match item {
                Value::String(label) => Some(label),
                _ => None,
            })
            .collect(),
        _ => Vec::new(),
    };
    Ok(labels)
}

// ---------------------------------------------------------------------------
// Validated records
// ---------------------------------------------------------------------------

/// A record that passed validation. Every later stage works on these only.
#[derive(Debug, Clone, PartialEq)]
pub struct CleanRecord {
    pub at: DateTime<FixedOffset>,
    /// Calendar day in the record's own offset.
    pub day: NaiveDate,
    pub pain_level: u8,
    pub triggers: BTreeSet<String>,
    pub symptoms: BTreeSet<String>,
    pub medications: BTreeSet<String>,
    pub locations: BTreeSet<String>,
    pub qol: QolScores,
}

impl CleanRecord {
    pub fn pain(&self) -> f64 {
        f64::from(self.pain_level)
    }

    pub fn factors(&self, category: FactorCategory) -> &BTreeSet<String> {
        match category {
            FactorCategory::Trigger => &self.triggers,
            FactorCategory::Symptom => &self.symptoms,
            FactorCategory::Medication => &self.medications,
            FactorCategory::Location => &self.locations,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct QolScores {
    pub sleep: Option<f64>,
    pub mood: Option<f64>,
    pub activity: Option<f64>,
}

impl QolScores {
    pub fn get(&self, dimension: QolDimension) -> Option<f64> {
        match dimension {
            QolDimension::Sleep => self.sleep,
            QolDimension::Mood => self.mood,
            QolDimension::Activity => self.activity,
        }
    }
}

// ---------------------------------------------------------------------------
// Categories and labels
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FactorCategory {
    Trigger,
    Symptom,
    Medication,
    Location,
}

impl FactorCategory {
    pub const ALL: [FactorCategory; 4] = [
        Self::Trigger,
        Self::Symptom,
        Self::Medication,
        Self::Location,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Trigger => "trigger",
            Self::Symptom => "symptom",
            Self::Medication => "medication",
            Self::Location => "location",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QolDimension {
    Sleep,
    Mood,
    Activity,
}

impl QolDimension {
    pub const ALL: [QolDimension; 3] = [Self::Sleep, Self::Mood, Self::Activity];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sleep => "sleep",
            Self::Mood => "mood",
            Self::Activity => "activity",
        }
    }
}

/// Qualitative label derived from the amount of data only, never its spread.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Confidence {
    Low,
    Medium,
    High,
}

impl Confidence {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EpisodeSeverity {
    Mild,
    Moderate,
    Severe,
}

impl EpisodeSeverity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Mild => "mild",
            Self::Moderate => "moderate",
            Self::Severe => "severe",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CorrelationStrength {
    /// No comparison group exists (the factor is present in every record).
    None,
    Weak,
    Moderate,
    Strong,
}

impl CorrelationStrength {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Weak => "weak",
            Self::Moderate => "moderate",
            Self::Strong => "strong",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Increases,
    Decreases,
    Neutral,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Increases => "increases",
            Self::Decreases => "decreases",
            Self::Neutral => "neutral",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DissonanceType {
    /// Pain holds steady while a quality-of-life score drops.
    PainStableQolDeclining,
    /// Pain climbs while a quality-of-life score holds steady.
    PainRisingQolStable,
}

impl DissonanceType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PainStableQolDeclining => "painStableQolDeclining",
            Self::PainRisingQolStable => "painRisingQolStable",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataQuality {
    Insufficient,
    Limited,
    Good,
}

// ---------------------------------------------------------------------------
// Stage outputs
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Baseline {
    pub value: f64,
    pub confidence: Confidence,
    pub sample_count: usize,
    pub window_days: u32,
}

/// One aggregation bucket. For weekly points `count` is days-with-data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendPoint {
    pub date: NaiveDate,
    pub mean: f64,
    pub std_dev: f64,
    pub min: f64,
    pub max: f64,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeekdayPoint {
    pub weekday: Weekday,
    pub mean: f64,
    pub day_count: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Trends {
    pub daily: Vec<TrendPoint>,
    pub weekly: Vec<TrendPoint>,
    pub weekday_profile: Vec<WeekdayPoint>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Episode {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub length_days: usize,
    pub peak_pain: f64,
    pub severity: EpisodeSeverity,
    pub recovered: bool,
    /// Days from the last elevated day until pain settled back near baseline.
    pub recovery_days: Option<i64>,
    /// Always empty: episodes are not linked back to coinciding factors.
    pub triggers: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CorrelationResult {
    pub factor: String,
    pub category: FactorCategory,
    pub mean_with_factor: f64,
    pub mean_without_factor: f64,
    pub delta: f64,
    pub strength: CorrelationStrength,
    pub direction: Direction,
    pub support_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TriggerBundle {
    pub factors: BTreeSet<String>,
    pub co_occurrence_count: usize,
    pub mean_pain: f64,
}

/// Pain compared between records below and at/above the dimension's median.
/// `correlation_delta` is mean pain below minus mean pain at/above, so a
/// positive delta means pain runs higher when the score is low.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QoLPattern {
    pub dimension: QolDimension,
    pub median: f64,
    pub correlation_delta: f64,
    pub strength: CorrelationStrength,
    pub direction: Direction,
    pub support_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QoLDissonance {
    #[serde(rename = "type")]
    pub dissonance_type: DissonanceType,
    pub dimension: QolDimension,
    pub description: String,
    pub pain_trend_delta: f64,
    pub qol_trend_delta: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DateRange {
    pub first: Option<NaiveDate>,
    pub last: Option<NaiveDate>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisMetadata {
    pub record_count_used: usize,
    pub records_excluded: usize,
    pub date_range: DateRange,
    pub data_quality: DataQuality,
    pub cautions: Vec<String>,
    pub config_snapshot: AnalysisConfig,
}

/// Everything the engine produces for one invocation. Plain data only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    pub baseline: Baseline,
    pub trends: Trends,
    pub episodes: Vec<Episode>,
    pub correlations: Vec<CorrelationResult>,
    pub trigger_bundles: Vec<TriggerBundle>,
    pub qol_patterns: Vec<QoLPattern>,
    pub qol_dissonance: Vec<QoLDissonance>,
    pub metadata: AnalysisMetadata,
}
