use chrono::NaiveDate;

use super::types::QolDimension;

/// Caution and description templates.
/// Calm, observational wording only: these surface patterns for the person
/// and their clinician to look at, they never raise alarms.
pub struct Cautions;

impl Cautions {
    pub fn no_records() -> String {
        "There are no readable diary entries yet. Patterns will appear as entries are added."
            .into()
    }

    pub fn records_excluded(count: usize) -> String {
        format!(
            "{} {} could not be read (missing time or a pain level outside 0-10) \
             and {} left out of this summary.",
            count,
            plural(count, "entry", "entries"),
            plural(count, "was", "were"),
        )
    }

    pub fn too_few_for_trend(count: usize, minimum: usize) -> String {
        format!(
            "Weekly trends start after {} entries. There {} {} so far.",
            minimum,
            plural(count, "is", "are"),
            count,
        )
    }

    pub fn baseline_low_confidence(count: usize, window_days: u32) -> String {
        format!(
            "Your usual pain level is based on {} {} from the last {} days, \
             so it is a rough guide for now.",
            count,
            plural(count, "entry", "entries"),
            window_days,
        )
    }

    pub fn no_factor_support(minimum: usize) -> String {
        format!(
            "No trigger, symptom, medication or location has been noted in {} entries yet, \
             so no factor patterns are shown.",
            minimum,
        )
    }

    pub fn qol_dimension_sparse(dimension: QolDimension, count: usize, minimum: usize) -> String {
        format!(
            "{} has been noted {} {}; patterns for it start after {}.",
            capitalize(dimension_label(dimension)),
            count,
            plural(count, "time", "times"),
            minimum,
        )
    }

    pub fn dissonance_windows_incomplete(window_days: u32) -> String {
        format!(
            "Comparing the last {} days with the {} days before needs entries in both periods.",
            window_days, window_days,
        )
    }

    pub fn episode_ongoing(start: NaiveDate) -> String {
        format!(
            "A higher-pain stretch that began on {} continues in the latest entries.",
            start.format("%B %d"),
        )
    }

    pub fn pain_stable_qol_declining(dimension: QolDimension, qol_delta: f64) -> String {
        format!(
            "Pain has stayed about the same over the last week, while {} dropped by {:.1} \
             compared with the week before. This might be worth noting at your next visit.",
            dimension_label(dimension),
            qol_delta.abs(),
        )
    }

    pub fn pain_rising_qol_stable(dimension: QolDimension, pain_delta: f64) -> String {
        format!(
            "Pain rose by {:.1} over the last week while {} stayed about the same. \
             This might be worth noting at your next visit.",
            pain_delta,
            dimension_label(dimension),
        )
    }
}

pub fn dimension_label(dimension: QolDimension) -> &'static str {
    match dimension {
        QolDimension::Sleep => "sleep quality",
        QolDimension::Mood => "mood",
        QolDimension::Activity => "activity level",
    }
}

fn plural<'a>(count: usize, one: &'a str, many: &'a str) -> &'a str {
    if count == 1 {
        one
    } else {
        many
    }
}

fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
