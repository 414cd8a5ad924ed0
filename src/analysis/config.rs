//! Analysis configuration.
//!
//! Callers hand over a sparse [`ConfigOverrides`]; [`AnalysisConfig::from_overrides`]
//! fills the gaps from the documented defaults and clamps every value into its
//! valid range. Malformed values are never rejected.

use serde::{Deserialize, Serialize};

pub const DEFAULT_MIN_ENTRIES_FOR_TREND: usize = 14;
pub const DEFAULT_MIN_SUPPORT_FOR_CORRELATION: usize = 5;
pub const DEFAULT_BASELINE_WINDOW_DAYS: u32 = 30;
pub const DEFAULT_EPISODE_THRESHOLD_OFFSET: f64 = 2.0;
pub const DEFAULT_EPISODE_MIN_LENGTH_DAYS: usize = 3;
pub const DEFAULT_SEVERITY_MODERATE_PEAK: f64 = 7.0;
pub const DEFAULT_SEVERITY_SEVERE_PEAK: f64 = 9.0;
pub const DEFAULT_WEAK_DELTA_THRESHOLD: f64 = 0.7;
pub const DEFAULT_STRONG_DELTA_THRESHOLD: f64 = 1.5;
pub const DEFAULT_MIN_SUPPORT_FOR_BUNDLE: usize = 3;
pub const DEFAULT_MAX_BUNDLE_SIZE: usize = 2;
pub const DEFAULT_DISSONANCE_WINDOW_DAYS: u32 = 7;
pub const DEFAULT_PAIN_STABLE_BAND: f64 = 0.5;
pub const DEFAULT_QOL_DECLINE_THRESHOLD: f64 = 1.5;
pub const DEFAULT_PAIN_RISE_THRESHOLD: f64 = 1.5;
pub const DEFAULT_RECOVERY_TOLERANCE: f64 = 0.5;

pub const PAIN_SCALE_MAX: f64 = 10.0;
const MAX_BUNDLE_SIZE_LIMIT: usize = 4;
/// Upper bound for any day-count window (ten years).
const MAX_WINDOW_DAYS: i64 = 3650;

/// Immutable, fully-resolved configuration. Copied into the result metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisConfig {
    pub min_entries_for_trend: usize,
    pub min_support_for_correlation: usize,
    pub baseline_window_days: u32,
    /// Explicit flare threshold. `None` means baseline + `episode_threshold_offset`.
    pub episode_pain_threshold: Option<f64>,
    pub episode_threshold_offset: f64,
    pub episode_min_length_days: usize,
    pub severity_moderate_peak: f64,
    pub severity_severe_peak: f64,
    pub weak_delta_threshold: f64,
    pub strong_delta_threshold: f64,
    pub min_support_for_bundle: usize,
    pub max_bundle_size: usize,
    pub dissonance_window_days: u32,
    pub pain_stable_band: f64,
    pub qol_decline_threshold: f64,
    pub pain_rise_threshold: f64,
    pub recovery_tolerance: f64,
    pub enable_trigger_bundles: bool,
    pub enable_qol_patterns: bool,
    pub enable_qol_dissonance: bool,
    pub enable_recovery_tracking: bool,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            min_entries_for_trend: DEFAULT_MIN_ENTRIES_FOR_TREND,
            min_support_for_correlation: DEFAULT_MIN_SUPPORT_FOR_CORRELATION,
            baseline_window_days: DEFAULT_BASELINE_WINDOW_DAYS,
            episode_pain_threshold: None,
            episode_threshold_offset: DEFAULT_EPISODE_THRESHOLD_OFFSET,
            episode_min_length_days: DEFAULT_EPISODE_MIN_LENGTH_DAYS,
            severity_moderate_peak: DEFAULT_SEVERITY_MODERATE_PEAK,
            severity_severe_peak: DEFAULT_SEVERITY_SEVERE_PEAK,
            weak_delta_threshold: DEFAULT_WEAK_DELTA_THRESHOLD,
            strong_delta_threshold: DEFAULT_STRONG_DELTA_THRESHOLD,
            min_support_for_bundle: DEFAULT_MIN_SUPPORT_FOR_BUNDLE,
            max_bundle_size: DEFAULT_MAX_BUNDLE_SIZE,
            dissonance_window_days: DEFAULT_DISSONANCE_WINDOW_DAYS,
            pain_stable_band: DEFAULT_PAIN_STABLE_BAND,
            qol_decline_threshold: DEFAULT_QOL_DECLINE_THRESHOLD,
            pain_rise_threshold: DEFAULT_PAIN_RISE_THRESHOLD,
            recovery_tolerance: DEFAULT_RECOVERY_TOLERANCE,
            enable_trigger_bundles: true,
            enable_qol_patterns: true,
            enable_qol_dissonance: true,
            enable_recovery_tracking: true,
        }
    }
}

/// Sparse caller-supplied settings. Every number is read as `f64` so that
/// fractional, negative or huge input survives deserialization and gets
/// rounded and clamped instead.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ConfigOverrides {
    pub min_entries_for_trend: Option<f64>,
    pub min_support_for_correlation: Option<f64>,
    pub baseline_window_days: Option<f64>,
    pub episode_pain_threshold: Option<f64>,
    pub episode_threshold_offset: Option<f64>,
    pub episode_min_length_days: Option<f64>,
    pub severity_moderate_peak: Option<f64>,
    pub severity_severe_peak: Option<f64>,
    pub weak_delta_threshold: Option<f64>,
    pub strong_delta_threshold: Option<f64>,
    pub min_support_for_bundle: Option<f64>,
    pub max_bundle_size: Option<f64>,
    pub dissonance_window_days: Option<f64>,
    pub pain_stable_band: Option<f64>,
    pub qol_decline_threshold: Option<f64>,
    pub pain_rise_threshold: Option<f64>,
    pub recovery_tolerance: Option<f64>,
    pub enable_trigger_bundles: Option<bool>,
    pub enable_qol_patterns: Option<bool>,
    pub enable_qol_dissonance: Option<bool>,
    pub enable_recovery_tracking: Option<bool>,
}

impl AnalysisConfig {
    /// Merge overrides onto the defaults, then clamp.
    pub fn from_overrides(overrides: &ConfigOverrides) -> Self {
        let d = Self::default();
        let float = |v: Option<f64>, default: f64| v.filter(|x| x.is_finite()).unwrap_or(default);

        Self {
            min_entries_for_trend: count(overrides.min_entries_for_trend, d.min_entries_for_trend),
            min_support_for_correlation: count(
                overrides.min_support_for_correlation,
                d.min_support_for_correlation,
            ),
            baseline_window_days: days(overrides.baseline_window_days, d.baseline_window_days),
            episode_pain_threshold: overrides.episode_pain_threshold.filter(|x| x.is_finite()),
            episode_threshold_offset: float(
                overrides.episode_threshold_offset,
                d.episode_threshold_offset,
            ),
            episode_min_length_days: count(
                overrides.episode_min_length_days,
                d.episode_min_length_days,
            ),
            severity_moderate_peak: float(overrides.severity_moderate_peak, d.severity_moderate_peak),
            severity_severe_peak: float(overrides.severity_severe_peak, d.severity_severe_peak),
            weak_delta_threshold: float(overrides.weak_delta_threshold, d.weak_delta_threshold),
            strong_delta_threshold: float(overrides.strong_delta_threshold, d.strong_delta_threshold),
            min_support_for_bundle: count(overrides.min_support_for_bundle, d.min_support_for_bundle),
            max_bundle_size: count(overrides.max_bundle_size, d.max_bundle_size),
            dissonance_window_days: days(overrides.dissonance_window_days, d.dissonance_window_days),
            pain_stable_band: float(overrides.pain_stable_band, d.pain_stable_band),
            qol_decline_threshold: float(overrides.qol_decline_threshold, d.qol_decline_threshold),
            pain_rise_threshold: float(overrides.pain_rise_threshold, d.pain_rise_threshold),
            recovery_tolerance: float(overrides.recovery_tolerance, d.recovery_tolerance),
            enable_trigger_bundles: overrides
                .enable_trigger_bundles
                .unwrap_or(d.enable_trigger_bundles),
            enable_qol_patterns: overrides.enable_qol_patterns.unwrap_or(d.enable_qol_patterns),
            enable_qol_dissonance: overrides
                .enable_qol_dissonance
                .unwrap_or(d.enable_qol_dissonance),
            enable_recovery_tracking: overrides
                .enable_recovery_tracking
                .unwrap_or(d.enable_recovery_tracking),
        }
        .clamped()
    }

    /// Pull every field into its valid range. Idempotent.
    pub fn clamped(&self) -> Self {
        let d = Self::default();
        let unit = |v: f64, default: f64| if v.is_finite() { v } else { default };

        let severity_moderate_peak =
            unit(self.severity_moderate_peak, d.severity_moderate_peak).clamp(0.0, PAIN_SCALE_MAX);
        let severity_severe_peak = unit(self.severity_severe_peak, d.severity_severe_peak)
            .clamp(severity_moderate_peak, PAIN_SCALE_MAX);
        let weak_delta_threshold = unit(self.weak_delta_threshold, d.weak_delta_threshold).max(0.0);
        let strong_delta_threshold =
            unit(self.strong_delta_threshold, d.strong_delta_threshold).max(weak_delta_threshold);

        Self {
            min_entries_for_trend: self.min_entries_for_trend.max(1),
            min_support_for_correlation: self.min_support_for_correlation.max(1),
            baseline_window_days: self.baseline_window_days.clamp(1, MAX_WINDOW_DAYS as u32),
            episode_pain_threshold: self
                .episode_pain_threshold
                .filter(|x| x.is_finite())
                .map(|x| x.clamp(0.0, PAIN_SCALE_MAX)),
            episode_threshold_offset: unit(self.episode_threshold_offset, d.episode_threshold_offset)
                .clamp(0.0, PAIN_SCALE_MAX),
            episode_min_length_days: self.episode_min_length_days.max(1),
            severity_moderate_peak,
            severity_severe_peak,
            weak_delta_threshold,
            strong_delta_threshold,
            min_support_for_bundle: self.min_support_for_bundle.max(1),
            max_bundle_size: self.max_bundle_size.clamp(2, MAX_BUNDLE_SIZE_LIMIT),
            dissonance_window_days: self.dissonance_window_days.clamp(1, MAX_WINDOW_DAYS as u32),
            pain_stable_band: unit(self.pain_stable_band, d.pain_stable_band).max(0.0),
            qol_decline_threshold: unit(self.qol_decline_threshold, d.qol_decline_threshold).max(0.0),
            pain_rise_threshold: unit(self.pain_rise_threshold, d.pain_rise_threshold).max(0.0),
            recovery_tolerance: unit(self.recovery_tolerance, d.recovery_tolerance)
                .clamp(0.0, PAIN_SCALE_MAX),
            ..self.clone()
        }
    }
}

fn count(value: Option<f64>, default: usize) -> usize {
    match value.filter(|v| v.is_finite()).map(f64::round) {
        Some(v) if v < 1.0 => 1,
        // `as` saturates at usize::MAX.
        Some(v) => v as usize,
        None => default,
    }
}

fn days(value: Option<f64>, default: u32) -> u32 {
    match value.filter(|v| v.is_finite()).map(f64::round) {
        Some(v) => v.clamp(1.0, MAX_WINDOW_DAYS as f64) as u32,
        None => default,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_overrides_yield_defaults() {
        let config = AnalysisConfig::from_overrides(&ConfigOverrides::default());
        assert_eq!(config, AnalysisConfig::default());
        assert_eq!(config.min_entries_for_trend, 14);
        assert_eq!(config.min_support_for_correlation, 5);
        assert_eq!(config.baseline_window_days, 30);
        assert_eq!(config.episode_min_length_days, 3);
        assert!(config.episode_pain_threshold.is_none());
        assert!(config.enable_qol_dissonance);
    }

    #[test]
    fn overrides_replace_individual_keys() {
        let overrides = ConfigOverrides {
            min_support_for_correlation: Some(3.0),
            episode_pain_threshold: Some(6.0),
            enable_qol_dissonance: Some(false),
            ..Default::default()
        };
        let config = AnalysisConfig::from_overrides(&overrides);
        assert_eq!(config.min_support_for_correlation, 3);
        assert_eq!(config.episode_pain_threshold, Some(6.0));
        assert!(!config.enable_qol_dissonance);
        assert_eq!(config.min_entries_for_trend, 14);
    }

    #[test]
    fn negative_values_are_clamped() {
        let overrides = ConfigOverrides {
            min_entries_for_trend: Some(-4.0),
            baseline_window_days: Some(-30.0),
            episode_pain_threshold: Some(-2.0),
            weak_delta_threshold: Some(-1.0),
            qol_decline_threshold: Some(-0.5),
            ..Default::default()
        };
        let config = AnalysisConfig::from_overrides(&overrides);
        assert_eq!(config.min_entries_for_trend, 1);
        assert_eq!(config.baseline_window_days, 1);
        assert_eq!(config.episode_pain_threshold, Some(0.0));
        assert_eq!(config.weak_delta_threshold, 0.0);
        assert_eq!(config.qol_decline_threshold, 0.0);
    }

    #[test]
    fn threshold_above_scale_is_clamped() {
        let overrides = ConfigOverrides {
            episode_pain_threshold: Some(42.0),
            severity_moderate_peak: Some(12.0),
            ..Default::default()
        };
        let config = AnalysisConfig::from_overrides(&overrides);
        assert_eq!(config.episode_pain_threshold, Some(10.0));
        assert_eq!(config.severity_moderate_peak, 10.0);
        assert_eq!(config.severity_severe_peak, 10.0);
    }

    #[test]
    fn inverted_cutoffs_are_reordered() {
        let overrides = ConfigOverrides {
            severity_moderate_peak: Some(8.0),
            severity_severe_peak: Some(5.0),
            weak_delta_threshold: Some(2.0),
            strong_delta_threshold: Some(1.0),
            ..Default::default()
        };
        let config = AnalysisConfig::from_overrides(&overrides);
        assert_eq!(config.severity_severe_peak, 8.0);
        assert_eq!(config.strong_delta_threshold, 2.0);
    }

    #[test]
    fn bundle_size_is_bounded() {
        let big = AnalysisConfig::from_overrides(&ConfigOverrides {
            max_bundle_size: Some(50.0),
            ..Default::default()
        });
        assert_eq!(big.max_bundle_size, 4);

        let small = AnalysisConfig::from_overrides(&ConfigOverrides {
            max_bundle_size: Some(1.0),
            ..Default::default()
        });
        assert_eq!(small.max_bundle_size, 2);
    }

    #[test]
    fn non_finite_floats_fall_back_to_defaults() {
        let overrides = ConfigOverrides {
            episode_pain_threshold: Some(f64::NAN),
            pain_stable_band: Some(f64::INFINITY),
            ..Default::default()
        };
        let config = AnalysisConfig::from_overrides(&overrides);
        assert!(config.episode_pain_threshold.is_none());
        assert_eq!(config.pain_stable_band, DEFAULT_PAIN_STABLE_BAND);
    }

    #[test]
    fn clamping_is_idempotent() {
        let config = AnalysisConfig {
            min_support_for_correlation: 0,
            max_bundle_size: 9,
            ..Default::default()
        };
        let once = config.clamped();
        assert_eq!(once, once.clamped());
        assert_eq!(once.min_support_for_correlation, 1);
    }

    #[test]
    fn overrides_deserialize_from_camel_case() {
        let json = r#"{"minSupportForCorrelation": 2, "enableTriggerBundles": false, "unknownKey": 1}"#;
        let overrides: ConfigOverrides = serde_json::from_str(json).unwrap();
        assert_eq!(overrides.min_support_for_correlation, Some(2.0));
        assert_eq!(overrides.enable_trigger_bundles, Some(false));
        assert!(overrides.baseline_window_days.is_none());
    }

    #[test]
    fn whole_number_floats_are_accepted_for_counts() {
        let json = r#"{"minSupportForCorrelation": 5.0, "episodeMinLengthDays": 2.6}"#;
        let overrides: ConfigOverrides = serde_json::from_str(json).unwrap();
        let config = AnalysisConfig::from_overrides(&overrides);
        assert_eq!(config.min_support_for_correlation, 5);
        assert_eq!(config.episode_min_length_days, 3);
    }

    #[test]
    fn huge_numbers_are_clamped_not_rejected() {
        let json = r#"{"baselineWindowDays": 1e20, "maxBundleSize": 1e20, "minEntriesForTrend": -1e20}"#;
        let overrides: ConfigOverrides = serde_json::from_str(json).unwrap();
        let config = AnalysisConfig::from_overrides(&overrides);
        assert_eq!(config.baseline_window_days, 3650);
        assert_eq!(config.max_bundle_size, 4);
        assert_eq!(config.min_entries_for_trend, 1);
    }

    #[test]
    fn config_snapshot_serializes() {
        let json = serde_json::to_string(&AnalysisConfig::default()).unwrap();
        assert!(json.contains("\"minEntriesForTrend\":14"));
        assert!(json.contains("\"episodePainThreshold\":null"));
    }
}
