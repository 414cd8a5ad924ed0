use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::Parser;
use thiserror::Error;

use pain_patterns::analysis::{analyze_json, AnalysisResult, EngineError};
use pain_patterns::config;

/// Summarize pain patterns from a diary export.
#[derive(Parser, Debug)]
#[command(name = "pain-analyze", version, about)]
struct Cli {
    /// JSON array of pain records
    records: PathBuf,

    /// JSON object with configuration overrides
    #[arg(long)]
    config: Option<PathBuf>,

    /// Pretty-print the JSON result
    #[arg(long)]
    pretty: bool,

    /// Print a short plain-text summary instead of JSON
    #[arg(long, conflicts_with = "pretty")]
    summary: bool,
}

#[derive(Error, Debug)]
enum CliError {
    #[error("Cannot read {}: {}", .path.display(), .source)]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error("Cannot serialize result: {0}")]
    Serialize(#[from] serde_json::Error),
}

fn main() -> ExitCode {
    pain_patterns::init_tracing();
    let cli = Cli::parse();
    tracing::debug!("{} v{}", config::APP_NAME, config::APP_VERSION);

    match run(&cli) {
        Ok(output) => {
            println!("{output}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("pain-analyze: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<String, CliError> {
    let records = read_file(&cli.records)?;
    let overrides = cli.config.as_deref().map(read_file).transpose()?;

    let result = analyze_json(&records, overrides.as_deref())?;

    if cli.summary {
        Ok(render_summary(&result))
    } else if cli.pretty {
        Ok(serde_json::to_string_pretty(&result)?)
    } else {
        Ok(serde_json::to_string(&result)?)
    }
}

fn read_file(path: &Path) -> Result<String, CliError> {
    fs::read_to_string(path).map_err(|source| CliError::Read {
        path: path.to_path_buf(),
        source,
    })
}

fn render_summary(result: &AnalysisResult) -> String {
    let meta = &result.metadata;
    let mut lines = vec![
        format!(
            "Entries used: {} ({} left out)",
            meta.record_count_used, meta.records_excluded
        ),
        format!(
            "Baseline: {:.1} ({} confidence)",
            result.baseline.value,
            result.baseline.confidence.as_str()
        ),
    ];

    lines.extend(result.episodes.iter().map(|episode| {
        format!(
            "Episode: {} to {}, {} days, peak {:.1}, {}{}",
            episode.start_date,
            episode.end_date,
            episode.length_days,
            episode.peak_pain,
            episode.severity.as_str(),
            if episode.recovered { "" } else { ", ongoing" },
        )
    }));

    lines.extend(result.correlations.iter().map(|c| {
        format!(
            "Factor: {} [{}] {} pain by {:.1} ({})",
            c.factor,
            c.category.as_str(),
            c.direction.as_str(),
            c.delta.abs(),
            c.strength.as_str(),
        )
    }));

    lines.extend(result.trigger_bundles.iter().map(|bundle| {
        let names: Vec<&str> = bundle.factors.iter().map(String::as_str).collect();
        format!(
            "Together: {} ({} times)",
            names.join(" + "),
            bundle.co_occurrence_count
        )
    }));

    lines.extend(result.qol_patterns.iter().map(|pattern| {
        format!(
            "QoL: {} {} ({})",
            pattern.dimension.as_str(),
            pattern.direction.as_str(),
            pattern.strength.as_str(),
        )
    }));

    lines.extend(
        result
            .qol_dissonance
            .iter()
            .map(|d| format!("Note [{}]: {}", d.dissonance_type.as_str(), d.description)),
    );

    lines.extend(meta.cautions.iter().map(|caution| format!("Caution: {caution}")));

    lines.join("\n")
}
