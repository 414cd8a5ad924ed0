//! Flare-episode detection over the daily trend series.
//!
//! A two-state scan: `NoEpisode` until a day's mean reaches the threshold,
//! `InEpisode` while it stays there. Closing a run emits an [`Episode`] only
//! when the run is long enough; shorter runs are discarded.

use super::config::AnalysisConfig;
use super::stats::EPSILON;
use super::types::{Episode, EpisodeSeverity, TrendPoint};

#[derive(Debug, Clone, Copy, PartialEq)]
enum ScanState {
    NoEpisode,
    InEpisode { start: usize, peak: f64 },
}

/// Threshold used when none is configured: baseline plus the configured offset.
pub fn resolve_threshold(config: &AnalysisConfig, baseline: f64) -> f64 {
    config
        .episode_pain_threshold
        .unwrap_or(baseline + config.episode_threshold_offset)
        .min(super::config::PAIN_SCALE_MAX)
}

pub fn detect_episodes(
    daily: &[TrendPoint],
    threshold: f64,
    baseline: f64,
    config: &AnalysisConfig,
) -> Vec<Episode> {
    let mut episodes = Vec::new();
    let mut state = ScanState::NoEpisode;

    for (idx, point) in daily.iter().enumerate() {
        let elevated = point.mean + EPSILON >= threshold;
        state = match (state, elevated) {
            (ScanState::NoEpisode, false) => ScanState::NoEpisode,
            (ScanState::NoEpisode, true) => ScanState::InEpisode {
                start: idx,
                peak: point.mean,
            },
            (ScanState::InEpisode { start, peak }, true) => ScanState::InEpisode {
                start,
                peak: peak.max(point.mean),
            },
            (ScanState::InEpisode { start, peak }, false) => {
                if let Some(episode) = close_run(daily, start, idx - 1, peak, true, config) {
                    episodes.push(episode);
                }
                ScanState::NoEpisode
            }
        };
    }

    // A run still open at the end of the series qualifies but has not recovered.
    if let ScanState::InEpisode { start, peak } = state {
        if let Some(episode) = close_run(daily, start, daily.len() - 1, peak, false, config) {
            episodes.push(episode);
        }
    }

    if config.enable_recovery_tracking {
        for episode in &mut episodes {
            episode.recovery_days = recovery_days(daily, episode, baseline, config.recovery_tolerance);
        }
    }

    episodes
}

pub fn classify_severity(peak: f64, config: &AnalysisConfig) -> EpisodeSeverity {
    if peak + EPSILON >= config.severity_severe_peak {
        EpisodeSeverity::Severe
    } else if peak + EPSILON >= config.severity_moderate_peak {
        EpisodeSeverity::Moderate
    } else {
        EpisodeSeverity::Mild
    }
}

fn close_run(
    daily: &[TrendPoint],
    start: usize,
    end: usize,
    peak: f64,
    recovered: bool,
    config: &AnalysisConfig,
) -> Option<Episode> {
    let length_days = end - start + 1;
    if length_days < config.episode_min_length_days {
        return None;
    }

    Some(Episode {
        start_date: daily[start].date,
        end_date: daily[end].date,
        length_days,
        peak_pain: peak,
        severity: classify_severity(peak, config),
        recovered,
        recovery_days: None,
        triggers: Vec::new(),
    })
}

/// Days from the episode's last elevated day to the first later day back
/// within `tolerance` of the baseline.
fn recovery_days(
    daily: &[TrendPoint],
    episode: &Episode,
    baseline: f64,
    tolerance: f64,
) -> Option<i64> {
    if !episode.recovered {
        return None;
    }
    daily
        .iter()
        .filter(|p| p.date > episode.end_date)
        .find(|p| p.mean <= baseline + tolerance + EPSILON)
        .map(|p| (p.date - episode.end_date).num_days())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveDate};

    fn series(means: &[f64]) -> Vec<TrendPoint> {
        let start = NaiveDate::from_ymd_opt(2025, 2, 1).unwrap();
        means
            .iter()
            .enumerate()
            .map(|(i, &mean)| TrendPoint {
                date: start + Duration::days(i as i64),
                mean,
                std_dev: 0.0,
                min: mean,
                max: mean,
                count: 1,
            })
            .collect()
    }

    fn config_with(threshold: f64, min_len: usize) -> AnalysisConfig {
        AnalysisConfig {
            episode_pain_threshold: Some(threshold),
            episode_min_length_days: min_len,
            ..Default::default()
        }
    }

    #[test]
    fn single_qualifying_run() {
        let daily = series(&[3.0, 3.0, 7.0, 7.0, 7.0, 3.0]);
        let episodes = detect_episodes(&daily, 6.0, 3.0, &config_with(6.0, 3));
        assert_eq!(episodes.len(), 1);
        let ep = &episodes[0];
        assert_eq!(ep.start_date, daily[2].date);
        assert_eq!(ep.end_date, daily[4].date);
        assert_eq!(ep.length_days, 3);
        assert_eq!(ep.peak_pain, 7.0);
        assert!(ep.recovered);
        assert!(ep.triggers.is_empty());
    }

    #[test]
    fn short_run_is_discarded() {
        let daily = series(&[3.0, 7.0, 7.0, 3.0, 3.0]);
        let episodes = detect_episodes(&daily, 6.0, 3.0, &config_with(6.0, 3));
        assert!(episodes.is_empty());
    }

    #[test]
    fn open_run_at_end_is_unrecovered() {
        let daily = series(&[2.0, 8.0, 8.0, 9.0]);
        let episodes = detect_episodes(&daily, 6.0, 2.0, &config_with(6.0, 3));
        assert_eq!(episodes.len(), 1);
        assert!(!episodes[0].recovered);
        assert!(episodes[0].recovery_days.is_none());
        assert_eq!(episodes[0].peak_pain, 9.0);
    }

    #[test]
    fn short_open_run_is_discarded() {
        let daily = series(&[2.0, 2.0, 8.0, 8.0]);
        assert!(detect_episodes(&daily, 6.0, 2.0, &config_with(6.0, 3)).is_empty());
    }

    #[test]
    fn reaching_threshold_exactly_counts() {
        let daily = series(&[6.0, 6.0, 6.0, 1.0]);
        assert_eq!(detect_episodes(&daily, 6.0, 1.0, &config_with(6.0, 3)).len(), 1);
    }

    #[test]
    fn separate_runs_produce_separate_episodes() {
        let daily = series(&[7.0, 7.0, 7.0, 2.0, 8.0, 8.0, 8.0, 8.0, 2.0]);
        let episodes = detect_episodes(&daily, 6.0, 2.0, &config_with(6.0, 3));
        assert_eq!(episodes.len(), 2);
        assert_eq!(episodes[0].length_days, 3);
        assert_eq!(episodes[1].length_days, 4);
    }

    #[test]
    fn severity_buckets_by_peak() {
        let config = AnalysisConfig::default();
        assert_eq!(classify_severity(6.5, &config), EpisodeSeverity::Mild);
        assert_eq!(classify_severity(7.0, &config), EpisodeSeverity::Moderate);
        assert_eq!(classify_severity(8.9, &config), EpisodeSeverity::Moderate);
        assert_eq!(classify_severity(9.0, &config), EpisodeSeverity::Severe);
    }

    #[test]
    fn recovery_days_counts_until_near_baseline() {
        // Falls below threshold at 5 (not yet near baseline 2), settles at 2 two days later.
        let daily = series(&[2.0, 8.0, 8.0, 8.0, 5.0, 4.0, 2.0]);
        let episodes = detect_episodes(&daily, 6.0, 2.0, &config_with(6.0, 3));
        assert_eq!(episodes[0].recovery_days, Some(3));
    }

    #[test]
    fn recovery_tracking_can_be_disabled() {
        let daily = series(&[2.0, 8.0, 8.0, 8.0, 2.0]);
        let config = AnalysisConfig {
            enable_recovery_tracking: false,
            ..config_with(6.0, 3)
        };
        let episodes = detect_episodes(&daily, 6.0, 2.0, &config);
        assert!(episodes[0].recovered);
        assert!(episodes[0].recovery_days.is_none());
    }

    #[test]
    fn default_threshold_is_baseline_plus_offset() {
        let config = AnalysisConfig::default();
        assert_eq!(resolve_threshold(&config, 3.0), 5.0);
        assert_eq!(resolve_threshold(&config, 9.5), 10.0);
        assert_eq!(resolve_threshold(&config_with(6.0, 3), 3.0), 6.0);
    }

    #[test]
    fn empty_series_has_no_episodes() {
        assert!(detect_episodes(&[], 6.0, 0.0, &AnalysisConfig::default()).is_empty());
    }
}
