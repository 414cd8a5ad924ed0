//! Factor/pain association by mean difference.
//!
//! For each factor label seen in at least `min_support_for_correlation`
//! records, the series is split into records with and without the label and
//! the mean pain of each side is compared. This is a heuristic, not a
//! significance test. Factors below the support floor are left out entirely.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use super::config::AnalysisConfig;
use super::stats::mean;
use super::types::{CleanRecord, CorrelationResult, CorrelationStrength, Direction, FactorCategory};

pub fn analyze_correlations(records: &[CleanRecord], config: &AnalysisConfig) -> Vec<CorrelationResult> {
    let mut results: Vec<CorrelationResult> = FactorCategory::ALL
        .iter()
        .flat_map(|&category| correlate_category(records, category, config))
        .collect();

    results.sort_by(compare_results);
    results
}

fn correlate_category(
    records: &[CleanRecord],
    category: FactorCategory,
    config: &AnalysisConfig,
) -> Vec<CorrelationResult> {
    let mut support: BTreeMap<&str, usize> = BTreeMap::new();
    for record in records {
        for label in record.factors(category) {
            *support.entry(label.as_str()).or_default() += 1;
        }
    }

    support
        .into_iter()
        .filter(|(_, count)| *count >= config.min_support_for_correlation)
        .filter_map(|(factor, support_count)| {
            let (with, without): (Vec<&CleanRecord>, Vec<&CleanRecord>) = records
                .iter()
                .partition(|r| r.factors(category).contains(factor));

            let with_levels: Vec<f64> = with.iter().map(|r| r.pain()).collect();
            let without_levels: Vec<f64> = without.iter().map(|r| r.pain()).collect();
            let mean_with = mean(&with_levels)?;

            let (mean_without, delta, strength) = match mean(&without_levels) {
                Some(mean_without) => {
                    let delta = mean_with - mean_without;
                    (mean_without, delta, classify_strength(delta, config))
                }
                // Present in every record: nothing to compare against.
                None => (mean_with, 0.0, CorrelationStrength::None),
            };

            Some(CorrelationResult {
                factor: factor.to_string(),
                category,
                mean_with_factor: mean_with,
                mean_without_factor: mean_without,
                delta,
                strength,
                direction: classify_direction(delta),
                support_count,
            })
        })
        .collect()
}

/// `|delta| < weak → weak`, `< strong → moderate`, otherwise `strong`.
pub fn classify_strength(delta: f64, config: &AnalysisConfig) -> CorrelationStrength {
    let magnitude = delta.abs();
    if magnitude < config.weak_delta_threshold {
        CorrelationStrength::Weak
    } else if magnitude < config.strong_delta_threshold {
        CorrelationStrength::Moderate
    } else {
        CorrelationStrength::Strong
    }
}

pub fn classify_direction(delta: f64) -> Direction {
    if delta > 0.0 {
        Direction::Increases
    } else if delta < 0.0 {
        Direction::Decreases
    } else {
        Direction::Neutral
    }
}

/// Largest effect first, then category, then label.
fn compare_results(a: &CorrelationResult, b: &CorrelationResult) -> Ordering {
    b.delta
        .abs()
        .total_cmp(&a.delta.abs())
        .then(a.category.cmp(&b.category))
        .then_with(|| a.factor.cmp(&b.factor))
}
