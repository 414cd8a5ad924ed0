//! Pain pattern analysis: turns a diary of pain records into baselines,
//! trends, flare episodes, factor correlations, trigger bundles and
//! quality-of-life signals.
//!
//! Stages run in a fixed order, each a pure function of the previous stage's
//! output and the shared [`AnalysisConfig`]:
//!
//! 1. validate: drop invalid records, sort the rest
//! 2. baseline: median pain over a trailing window
//! 3. trends: daily and weekly aggregation
//! 4. episodes: sustained runs at or above the flare threshold
//! 5. correlations: per-factor mean difference
//! 6. bundles: co-occurring triggers
//! 7. qol: quality-of-life patterns and dissonance
//!
//! [`analyze`] is the single entry point. Nothing is stored between calls;
//! re-running on the full diary after every new entry is the intended use.

mod baseline;
mod bundles;
mod config;
mod correlations;
mod engine;
mod episodes;
mod messages;
mod qol;
mod stats;
mod trends;
mod types;
mod validate;

pub use baseline::estimate_baseline;
pub use bundles::detect_bundles;
pub use config::*;
pub use correlations::{analyze_correlations, classify_direction, classify_strength};
pub use engine::{analyze, analyze_json, analyze_with_overrides, EngineError};
pub use episodes::{classify_severity, detect_episodes, resolve_threshold};
pub use qol::{analyze_qol_patterns, detect_dissonance};
pub use trends::{daily_points, weekday_profile, weekly_points};
pub use types::*;
pub use validate::{clean_records, CleanedSeries};
