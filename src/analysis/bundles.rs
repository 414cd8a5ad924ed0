//! Co-occurring trigger bundles.
//!
//! A plain co-occurrence count over trigger labels recorded together in the
//! same entry. No lift or confidence metric: the output only says "these
//! showed up together this often".

use std::cmp::Ordering;
use std::collections::BTreeMap;

use super::config::AnalysisConfig;
use super::types::{CleanRecord, TriggerBundle};

#[derive(Default)]
struct Tally {
    count: usize,
    pain_sum: f64,
}

pub fn detect_bundles(records: &[CleanRecord], config: &AnalysisConfig) -> Vec<TriggerBundle> {
    let mut tallies: BTreeMap<Vec<&str>, Tally> = BTreeMap::new();

    for record in records {
        let labels: Vec<&str> = record.triggers.iter().map(String::as_str).collect();
        let max_size = config.max_bundle_size.min(labels.len());
        for size in 2..=max_size {
            for combo in combinations(&labels, size) {
                let tally = tallies.entry(combo).or_default();
                tally.count += 1;
                tally.pain_sum += record.pain();
            }
        }
    }

    let mut bundles: Vec<TriggerBundle> = tallies
        .into_iter()
        .filter(|(_, tally)| tally.count >= config.min_support_for_bundle)
        .map(|(factors, tally)| TriggerBundle {
            factors: factors.into_iter().map(str::to_string).collect(),
            co_occurrence_count: tally.count,
            mean_pain: tally.pain_sum / tally.count as f64,
        })
        .collect();

    bundles.sort_by(compare_bundles);
    bundles
}

/// All `size`-element combinations of `items`, preserving input order.
fn combinations<'a>(items: &[&'a str], size: usize) -> Vec<Vec<&'a str>> {
    let mut out = Vec::new();
    if size == 0 || items.len() < size {
        return out;
    }
    let mut current = Vec::with_capacity(size);
    collect_combinations(items, size, 0, &mut current, &mut out);
    out
}

fn collect_combinations<'a>(
    items: &[&'a str],
    size: usize,
    start: usize,
    current: &mut Vec<&'a str>,
    out: &mut Vec<Vec<&'a str>>,
) {
    if current.len() == size {
        out.push(current.clone());
        return;
    }
    let remaining = size - current.len();
    for idx in start..=items.len().saturating_sub(remaining) {
        current.push(items[idx]);
        collect_combinations(items, size, idx + 1, current, out);
        current.pop();
    }
}

/// Most frequent first, then smaller bundles, then alphabetical.
fn compare_bundles(a: &TriggerBundle, b: &TriggerBundle) -> Ordering {
    b.co_occurrence_count
        .cmp(&a.co_occurrence_count)
        .then(a.factors.len().cmp(&b.factors.len()))
        .then_with(|| a.factors.cmp(&b.factors))
}
