//! lamco-motion-predict - Motion prediction trace replay
//!
//! Entry point for the replay binary.

use anyhow::{Context, Result};
use clap::Parser;
use std::io::Write;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use lamco_motion_predict::config::Config;
use lamco_motion_predict::predictor::{MotionEventPredictor, PredictorStrategy};
use lamco_motion_predict::replay::{load_trace, replay};
use lamco_motion_predict::utils::format_user_error;

/// Command-line arguments for lamco-motion-predict
#[derive(Parser, Debug)]
#[command(name = "lamco-motion-predict")]
#[command(version, about = "Replay a pointer trace through a motion predictor", long_about = None)]
pub struct Args {
    /// Trace file (JSON array of motion events)
    #[arg(short, long)]
    pub trace: String,

    /// Configuration file path
    #[arg(short, long, env = "LAMCO_PREDICT_CONFIG")]
    pub config: Option<String>,

    /// Prediction target (ms)
    #[arg(long)]
    pub target: Option<i32>,

    /// Explicit report rate (ms)
    #[arg(long, allow_negative_numbers = true)]
    pub report_rate: Option<i32>,

    /// Prediction strategy (kalman|linear)
    #[arg(long)]
    pub strategy: Option<PredictorStrategy>,

    /// Verbose logging (can be specified multiple times)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Log format (json|pretty|compact)
    #[arg(long)]
    pub log_format: Option<String>,

    /// Write logs to file (in addition to stderr)
    #[arg(long)]
    pub log_file: Option<String>,

    /// Print only the replay summary
    #[arg(long)]
    pub summary_only: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Configuration first: it carries the logging defaults
    let config = match load_config(&args) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("{}", format_user_error(&e));
            return Err(e);
        }
    };

    init_logging(&args, &config)?;

    info!("════════════════════════════════════════════════════════");
    info!("  {}", build_info());
    info!("════════════════════════════════════════════════════════");

    info!(
        "Strategy: {} ({})",
        config.predictor.strategy,
        config.predictor.strategy.description()
    );
    tracing::debug!("Config: {:?}", config);

    if let Err(e) = run(&args, &config) {
        eprintln!("{}", format_user_error(&e));
        return Err(e);
    }

    Ok(())
}

/// One-line build identification for the startup banner
fn build_info() -> String {
    format!(
        "lamco-motion-predict v{} ({} {}, commit {})",
        env!("CARGO_PKG_VERSION"),
        env!("PREDICT_BUILD_TARGET"),
        env!("PREDICT_BUILD_PROFILE"),
        env!("PREDICT_GIT_COMMIT")
    )
}

fn load_config(args: &Args) -> Result<Config> {
    let config = match &args.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };

    // Override config with CLI args
    let mut config = config.with_overrides(args.target, args.report_rate, args.strategy);
    if let Some(format) = &args.log_format {
        config.logging.format = format.clone();
    }
    if let Some(log_file) = &args.log_file {
        config.logging.log_file = Some(log_file.into());
    }

    config.validate()?;
    Ok(config)
}

fn run(args: &Args, config: &Config) -> Result<()> {
    let events = load_trace(&args.trace)?;
    let mut predictor = MotionEventPredictor::new(&config.predictor)?;

    let report = replay(&mut predictor, &events);

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    if !args.summary_only {
        for frame in &report.frames {
            serde_json::to_writer(&mut out, frame).context("Failed to write frame")?;
            writeln!(out)?;
        }
    }
    serde_json::to_writer(&mut out, &report.summary).context("Failed to write summary")?;
    writeln!(out)?;

    info!(
        "Replayed {} events ({} predicted samples)",
        report.summary.events, report.summary.predicted_samples
    );
    Ok(())
}

fn init_logging(args: &Args, config: &Config) -> Result<()> {
    use std::fs::File;

    let log_level = match args.verbose {
        0 => config.logging.level.as_str(),
        1 => "debug",
        _ => "trace",
    };

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        tracing_subscriber::EnvFilter::new(format!(
            "lamco_motion_predict={level},warn",
            level = log_level
        ))
    });

    // Stdout carries the replay output, logs go to stderr
    if let Some(log_file_path) = &config.logging.log_file {
        let file = File::create(log_file_path)
            .with_context(|| format!("Failed to create log file: {}", log_file_path.display()))?;

        match config.logging.format.as_str() {
            "json" => {
                tracing_subscriber::registry()
                    .with(env_filter)
                    .with(
                        tracing_subscriber::fmt::layer()
                            .json()
                            .with_writer(std::io::stderr),
                    )
                    .with(
                        tracing_subscriber::fmt::layer()
                            .json()
                            .with_writer(file)
                            .with_ansi(false),
                    )
                    .init();
            }
            "compact" => {
                tracing_subscriber::registry()
                    .with(env_filter)
                    .with(
                        tracing_subscriber::fmt::layer()
                            .compact()
                            .with_writer(std::io::stderr),
                    )
                    .with(
                        tracing_subscriber::fmt::layer()
                            .compact()
                            .with_writer(file)
                            .with_ansi(false),
                    )
                    .init();
            }
            _ => {
                tracing_subscriber::registry()
                    .with(env_filter)
                    .with(
                        tracing_subscriber::fmt::layer()
                            .pretty()
                            .with_writer(std::io::stderr),
                    )
                    .with(
                        tracing_subscriber::fmt::layer()
                            .with_writer(file)
                            .with_ansi(false),
                    )
                    .init();
            }
        }
        info!("Logging to file: {}", log_file_path.display());
    } else {
        match config.logging.format.as_str() {
            "json" => {
                tracing_subscriber::registry()
                    .with(env_filter)
                    .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
                    .init();
            }
            "compact" => {
                tracing_subscriber::registry()
                    .with(env_filter)
                    .with(
                        tracing_subscriber::fmt::layer()
                            .compact()
                            .with_writer(std::io::stderr),
                    )
                    .init();
            }
            _ => {
                tracing_subscriber::registry()
                    .with(env_filter)
                    .with(
                        tracing_subscriber::fmt::layer()
                            .pretty()
                            .with_writer(std::io::stderr),
                    )
                    .init();
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_info_identifies_build() {
        let info = build_info();
        let expected = format!("lamco-motion-predict v{}", env!("CARGO_PKG_VERSION"));
        assert!(info.starts_with(&expected));
        assert!(info.contains(env!("PREDICT_BUILD_TARGET")));
        assert!(info.contains("commit "));
    }

    #[test]
    fn test_cli_overrides_reach_config() {
        let args = Args::parse_from([
            "lamco-motion-predict",
            "--trace",
            "stroke.json",
            "--target",
            "32",
            "--strategy",
            "linear",
            "--log-format",
            "compact",
        ]);
        let config = load_config(&args).unwrap();
        assert_eq!(config.predictor.prediction_target_ms, 32);
        assert_eq!(config.predictor.strategy, PredictorStrategy::Linear);
        assert_eq!(config.logging.format, "compact");
    }
}
