//! Quality-of-life patterns and pain/QoL dissonance.
//!
//! Patterns reuse the correlation mechanics: each dimension is split at its
//! median and mean pain is compared between the two halves.
//!
//! Dissonance compares the latest window with the one before it, separately
//! for pain and for each dimension, and flags trends that move apart. It is a
//! prompt for a closer look, not a prediction.

use super::config::AnalysisConfig;
use super::correlations::{classify_direction, classify_strength};
use super::messages::Cautions;
use super::stats::{mean, median, EPSILON};
use super::types::{
    CleanRecord, CorrelationStrength, DissonanceType, QoLDissonance, QoLPattern, QolDimension,
};

pub fn analyze_qol_patterns(
    records: &[CleanRecord],
    config: &AnalysisConfig,
) -> (Vec<QoLPattern>, Vec<String>) {
    let mut patterns = Vec::new();
    let mut cautions = Vec::new();

    for dimension in QolDimension::ALL {
        let observations: Vec<(f64, f64)> = records
            .iter()
            .filter_map(|r| r.qol.get(dimension).map(|score| (score, r.pain())))
            .collect();

        if observations.is_empty() {
            continue;
        }
        if observations.len() < config.min_support_for_correlation {
            cautions.push(Cautions::qol_dimension_sparse(
                dimension,
                observations.len(),
                config.min_support_for_correlation,
            ));
            continue;
        }

        let scores: Vec<f64> = observations.iter().map(|(score, _)| *score).collect();
        let Some(split) = median(&scores) else {
            continue;
        };

        let (below, at_or_above): (Vec<(f64, f64)>, Vec<(f64, f64)>) =
            observations.iter().copied().partition(|(score, _)| *score < split);
        let pain_below: Vec<f64> = below.iter().map(|(_, pain)| *pain).collect();
        let pain_above: Vec<f64> = at_or_above.iter().map(|(_, pain)| *pain).collect();

        let (delta, strength) = match (mean(&pain_below), mean(&pain_above)) {
            (Some(low), Some(high)) => {
                let delta = low - high;
                (delta, classify_strength(delta, config))
            }
            // Every score sits on the median: no split to compare.
            _ => (0.0, CorrelationStrength::None),
        };

        patterns.push(QoLPattern {
            dimension,
            median: split,
            correlation_delta: delta,
            strength,
            direction: classify_direction(delta),
            support_count: observations.len(),
        });
    }

    (patterns, cautions)
}

/// Window-over-window change of a value, anchored on the latest calendar day.
struct WindowDelta {
    recent: Option<f64>,
    prior: Option<f64>,
}

impl WindowDelta {
    fn delta(&self) -> Option<f64> {
        Some(self.recent? - self.prior?)
    }
}

fn window_delta<F>(records: &[CleanRecord], window_days: i64, value: F) -> WindowDelta
where
    F: Fn(&CleanRecord) -> Option<f64>,
{
    let Some(anchor) = records.iter().map(|r| r.day).max() else {
        return WindowDelta {
            recent: None,
            prior: None,
        };
    };

    let mut recent = Vec::new();
    let mut prior = Vec::new();
    for record in records {
        let Some(v) = value(record) else { continue };
        let age = (anchor - record.day).num_days();
        if (0..window_days).contains(&age) {
            recent.push(v);
        } else if (window_days..window_days * 2).contains(&age) {
            prior.push(v);
        }
    }

    WindowDelta {
        recent: mean(&recent),
        prior: mean(&prior),
    }
}

pub fn detect_dissonance(
    records: &[CleanRecord],
    config: &AnalysisConfig,
) -> (Vec<QoLDissonance>, Option<String>) {
    if records.is_empty() {
        return (Vec::new(), None);
    }

    let window = i64::from(config.dissonance_window_days);
    let Some(pain_delta) = window_delta(records, window, |r| Some(r.pain())).delta() else {
        return (
            Vec::new(),
            Some(Cautions::dissonance_windows_incomplete(config.dissonance_window_days)),
        );
    };

    let mut found = Vec::new();
    for dimension in QolDimension::ALL {
        let Some(qol_delta) = window_delta(records, window, |r| r.qol.get(dimension)).delta() else {
            continue;
        };

        let pain_stable = pain_delta.abs() <= config.pain_stable_band + EPSILON;
        let qol_declining = qol_delta <= -config.qol_decline_threshold + EPSILON;
        let qol_stable = qol_delta.abs() + EPSILON < config.qol_decline_threshold;
        let pain_rising = pain_delta + EPSILON >= config.pain_rise_threshold;

        let (dissonance_type, description) = if pain_stable && qol_declining {
            (
                DissonanceType::PainStableQolDeclining,
                Cautions::pain_stable_qol_declining(dimension, qol_delta),
            )
        } else if pain_rising && qol_stable {
            (
                DissonanceType::PainRisingQolStable,
                Cautions::pain_rising_qol_stable(dimension, pain_delta),
            )
        } else {
            continue;
        };

        found.push(QoLDissonance {
            dissonance_type,
            dimension,
            description,
            pain_trend_delta: pain_delta,
            qol_trend_delta: qol_delta,
        });
    }

    (found, None)
}
