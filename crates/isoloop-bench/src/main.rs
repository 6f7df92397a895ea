//! isoloop-bench: CLI tool for loop reconstruction experiments and diagnostics.
//!
//! Runs loop reconstruction over a segment file (or generated input) with
//! configurable parameters, printing per-stage diagnostics. Useful for:
//!
//! - Tuning the merge tolerance against real kernel output
//! - Measuring index build and traversal time at a given segment count
//! - Inspecting how many chains are discarded as open
//! - Dumping loops to SVG for a visual check
//!
//! # Usage
//!
//! ```text
//! cargo run --release --bin isoloop-bench -- [OPTIONS] [SEGMENTS_PATH]
//! ```

#![allow(clippy::print_stdout, clippy::print_stderr)]

mod input;

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::{Duration, Instant};

use clap::{Parser, ValueEnum};
use isoloop_core::diagnostics::{Clock, ReconstructDiagnostics, reconstruct_with_diagnostics};
use isoloop_core::{LoopWinding, ReconstructConfig, Segment, readback};

/// Per-axis endpoint jitter for `--synthetic-squares`, well inside the
/// default tolerance.
const SYNTHETIC_JITTER: f64 = 0.002;

/// Loop reconstruction experiments and diagnostics for isoloop.
///
/// Reads unordered contour segments, reconstructs closed loops, and
/// prints per-stage timing and count diagnostics.
#[derive(Parser)]
#[command(name = "isoloop-bench", version)]
struct Cli {
    /// Path to the input segments (JSON array, or a raw dump with `--raw`).
    #[arg(required_unless_present = "synthetic_squares")]
    segments_path: Option<PathBuf>,

    /// Treat the input as a little-endian float4 readback dump.
    #[arg(long)]
    raw: bool,

    /// Generate a grid of N jittered unit squares instead of reading a file.
    #[arg(long, conflicts_with = "segments_path")]
    synthetic_squares: Option<usize>,

    /// Vertex merge distance.
    #[arg(long, default_value_t = ReconstructConfig::DEFAULT_TOLERANCE)]
    tolerance: f64,

    /// Minimum distinct points in an accepted loop.
    #[arg(long, default_value_t = ReconstructConfig::MIN_LOOP_POINTS)]
    min_loop_points: usize,

    /// Orientation applied to accepted loops.
    #[arg(long, value_enum, default_value_t = Winding::Preserve)]
    winding: Winding,

    /// Reject inputs with more segments than this.
    #[arg(long, default_value_t = ReconstructConfig::DEFAULT_MAX_SEGMENTS)]
    max_segments: usize,

    /// Write SVG output to file.
    #[arg(long)]
    svg: Option<PathBuf>,

    /// Write the input segments as a raw float4 dump (for `--raw` replays).
    #[arg(long)]
    save_raw: Option<PathBuf>,

    /// Number of runs for averaging.
    #[arg(long, default_value_t = 1, value_parser = clap::builder::RangedU64ValueParser::<usize>::new().range(1..))]
    runs: usize,

    /// Output diagnostics as JSON instead of human-readable report.
    #[arg(long)]
    json: bool,

    /// Full reconstruction config as a JSON string.
    ///
    /// When provided, the individual parameter flags are ignored.
    /// The JSON must be a valid `ReconstructConfig` serialization.
    #[arg(long)]
    config_json: Option<String>,
}

/// Loop orientation selection.
#[derive(Clone, Copy, ValueEnum)]
enum Winding {
    /// Keep traversal order.
    Preserve,
    /// Counter-clockwise (positive signed area).
    Ccw,
    /// Clockwise (negative signed area).
    Cw,
}

impl From<Winding> for LoopWinding {
    fn from(w: Winding) -> Self {
        match w {
            Winding::Preserve => Self::Preserve,
            Winding::Ccw => Self::CounterClockwise,
            Winding::Cw => Self::Clockwise,
        }
    }
}

/// Build a [`ReconstructConfig`] from CLI arguments.
///
/// If `--config-json` is provided, the JSON is parsed directly and the
/// individual parameter flags are ignored.
fn config_from_cli(cli: &Cli) -> Result<ReconstructConfig, String> {
    let config = if let Some(ref json) = cli.config_json {
        serde_json::from_str(json).map_err(|e| format!("Error parsing --config-json: {e}"))?
    } else {
        ReconstructConfig {
            tolerance: cli.tolerance,
            min_loop_points: cli.min_loop_points,
            winding: cli.winding.into(),
            max_segments: cli.max_segments,
        }
    };
    config.validate().map_err(|e| e.to_string())?;
    Ok(config)
}

/// Load segments from whichever source the CLI names.
fn segments_from_cli(cli: &Cli, config: &ReconstructConfig) -> Result<Vec<Segment>, String> {
    if let Some(count) = cli.synthetic_squares {
        eprintln!("Input: {count} synthetic squares");
        return Ok(input::synthetic_squares(count, SYNTHETIC_JITTER));
    }
    let Some(ref path) = cli.segments_path else {
        return Err("no input: pass SEGMENTS_PATH or --synthetic-squares".to_owned());
    };
    eprintln!("Input: {}", path.display());
    if cli.raw {
        input::load_raw(path, config.max_segments)
    } else {
        input::load_json(path)
    }
}

fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();

    let config = match config_from_cli(&cli) {
        Ok(c) => c,
        Err(msg) => {
            eprintln!("{msg}");
            return ExitCode::FAILURE;
        }
    };

    let segments = match segments_from_cli(&cli, &config) {
        Ok(s) => s,
        Err(msg) => {
            eprintln!("{msg}");
            return ExitCode::FAILURE;
        }
    };

    if let Some(ref raw_path) = cli.save_raw {
        let bytes = readback::encode_le_bytes(&segments);
        if let Err(e) = std::fs::write(raw_path, &bytes) {
            eprintln!("Error writing {}: {e}", raw_path.display());
            return ExitCode::FAILURE;
        }
        eprintln!("Raw dump written to {} ({} bytes)", raw_path.display(), bytes.len());
    }

    eprintln!("Segments: {}", segments.len());
    eprintln!("Config: {config:#?}");
    eprintln!("Runs: {}", cli.runs);
    eprintln!();

    let mut all_diagnostics = Vec::with_capacity(cli.runs);

    for run in 0..cli.runs {
        if cli.runs > 1 {
            eprintln!("--- Run {}/{} ---", run + 1, cli.runs);
        }

        match reconstruct_with_diagnostics(&segments, &config, &StdClock) {
            Ok((reconstruction, diagnostics)) => {
                if cli.json {
                    match serde_json::to_string_pretty(&diagnostics) {
                        Ok(json) => println!("{json}"),
                        Err(e) => {
                            eprintln!("Error serializing diagnostics: {e}");
                            return ExitCode::FAILURE;
                        }
                    }
                } else {
                    println!("{}", diagnostics.report());
                }

                // Write SVG on the first run only.
                if run == 0
                    && let Some(ref svg_path) = cli.svg
                {
                    let title = cli
                        .segments_path
                        .as_ref()
                        .and_then(|p| p.file_stem())
                        .and_then(|s| s.to_str())
                        .unwrap_or("synthetic");
                    let desc = format!(
                        "{} loops from {} segments, tolerance={}",
                        reconstruction.loops.len(),
                        segments.len(),
                        config.tolerance,
                    );
                    let config_json = serde_json::to_string(&config).ok();
                    let metadata = isoloop_export::SvgMetadata {
                        title: Some(title),
                        description: Some(&desc),
                        config_json: config_json.as_deref(),
                    };
                    let svg = isoloop_export::to_svg(&reconstruction.loops, &metadata);
                    match std::fs::write(svg_path, &svg) {
                        Ok(()) => {
                            eprintln!(
                                "SVG written to {} ({} bytes)",
                                svg_path.display(),
                                svg.len(),
                            );
                        }
                        Err(e) => {
                            eprintln!("Error writing SVG to {}: {e}", svg_path.display());
                        }
                    }
                }

                all_diagnostics.push(diagnostics);
            }
            Err(e) => {
                eprintln!("Reconstruction error: {e}");
                return ExitCode::FAILURE;
            }
        }

        if cli.runs > 1 {
            eprintln!();
        }
    }

    if cli.runs > 1 {
        print_multi_run_summary(&all_diagnostics);
    }

    ExitCode::SUCCESS
}

/// [`Clock`] implementation backed by [`std::time::Instant`].
struct StdClock;

impl Clock for StdClock {
    type Instant = Instant;

    fn now(&self) -> Instant {
        Instant::now()
    }

    fn elapsed(&self, since: &Instant) -> Duration {
        since.elapsed()
    }
}

/// Function pointer type for extracting a stage duration from diagnostics.
type StageExtractor = fn(&ReconstructDiagnostics) -> Option<Duration>;

/// Print aggregated statistics across multiple runs.
#[allow(clippy::cast_precision_loss)]
fn print_multi_run_summary(all_diagnostics: &[ReconstructDiagnostics]) {
    println!();
    println!(
        "Summary ({} runs)\n{}",
        all_diagnostics.len(),
        "=".repeat(60),
    );

    if all_diagnostics.is_empty() {
        println!("Warning: no diagnostics to summarize");
        return;
    }

    let durations: Vec<f64> = all_diagnostics
        .iter()
        .map(|d| d.total_duration.as_secs_f64() * 1000.0)
        .collect();

    let min = durations.iter().copied().reduce(f64::min).unwrap_or(0.0);
    let max = durations.iter().copied().reduce(f64::max).unwrap_or(0.0);
    let mean = durations.iter().sum::<f64>() / durations.len() as f64;

    println!("Total duration: min={min:.3}ms  mean={mean:.3}ms  max={max:.3}ms");

    println!();
    println!("{:<24} {:>12}", "Stage", "Mean (ms)");
    println!("{}", "-".repeat(40));

    let stage_extractors: &[(&str, StageExtractor)] = &[
        ("Index Build", |d| Some(d.index_build.duration)),
        ("Traversal", |d| Some(d.traversal.duration)),
        ("Winding", |d| d.winding.as_ref().map(|s| s.duration)),
    ];

    for (name, extractor) in stage_extractors {
        let stage_durations: Vec<f64> = all_diagnostics
            .iter()
            .filter_map(extractor)
            .map(|dur| dur.as_secs_f64() * 1000.0)
            .collect();

        if stage_durations.is_empty() {
            continue;
        }

        let stage_mean = stage_durations.iter().sum::<f64>() / stage_durations.len() as f64;
        println!("{name:<24} {stage_mean:>10.3}ms");
    }
}
