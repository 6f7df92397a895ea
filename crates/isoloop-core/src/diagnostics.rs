//! Reconstruction diagnostics: timing and counts for each stage.
//!
//! [`reconstruct_with_diagnostics`] runs the same stages as
//! [`reconstruct_traced`](crate::reconstruct_traced) while timing each one
//! through a caller-supplied [`Clock`]. [`SystemClock`] captures
//! timestamps via the `web-time` crate, which uses `performance.now()` on
//! WASM and `std::time::Instant` on native.
//!
//! Durations are serialized as fractional seconds (`f64`) for JSON
//! compatibility, since `std::time::Duration` does not implement serde
//! traits.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::index::AdjacencyIndex;
use crate::reconstruct::{self, Reconstruction};
use crate::types::{LoopWinding, Polyline, ReconstructConfig, ReconstructError, Segment};
use crate::winding;

/// Serde support for `std::time::Duration` as fractional seconds.
mod duration_serde {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    /// Serialize a `Duration` as fractional seconds (`f64`).
    pub fn serialize<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        duration.as_secs_f64().serialize(serializer)
    }

    /// Deserialize a `Duration` from fractional seconds (`f64`).
    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let secs = f64::deserialize(deserializer)?;
        Duration::try_from_secs_f64(secs).map_err(|_| {
            serde::de::Error::custom(
                "duration seconds must be finite, non-negative, and representable as a Duration",
            )
        })
    }
}

/// Source of timestamps for stage timing.
pub trait Clock {
    /// Opaque timestamp type.
    type Instant;

    /// Current timestamp.
    fn now(&self) -> Self::Instant;

    /// Time elapsed since `since`.
    fn elapsed(&self, since: &Self::Instant) -> Duration;
}

/// [`Clock`] backed by `web_time::Instant`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    type Instant = web_time::Instant;

    fn now(&self) -> web_time::Instant {
        web_time::Instant::now()
    }

    fn elapsed(&self, since: &web_time::Instant) -> Duration {
        since.elapsed()
    }
}

/// Diagnostics collected from a single reconstruction call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReconstructDiagnostics {
    /// Stage 1: adjacency index construction.
    pub index_build: StageDiagnostics,
    /// Stage 2: path traversal and loop acceptance.
    pub traversal: StageDiagnostics,
    /// Stage 3: loop reorientation (only when winding is not `Preserve`).
    pub winding: Option<StageDiagnostics>,
    /// Total wall-clock duration of the call (seconds).
    #[serde(with = "duration_serde")]
    pub total_duration: Duration,
    /// Summary counts.
    pub summary: ReconstructSummary,
}

/// Diagnostics for a single stage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StageDiagnostics {
    /// Wall-clock duration of this stage (seconds).
    #[serde(with = "duration_serde")]
    pub duration: Duration,
    /// Stage-specific metrics.
    pub metrics: StageMetrics,
}

/// Stage-specific metrics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum StageMetrics {
    /// Adjacency index metrics.
    IndexBuild {
        /// Tolerance (and grid cell size).
        tolerance: f64,
        /// Endpoints stored in the index.
        indexed_endpoints: usize,
        /// Segments left out for non-finite coordinates.
        excluded_segments: usize,
        /// Occupied grid cells.
        cell_count: usize,
        /// Largest number of endpoints in one cell.
        max_cell_occupancy: usize,
    },
    /// Traversal metrics.
    Traversal {
        /// Paths started (closed + discarded).
        path_count: usize,
        /// Paths accepted as loops.
        closed_loops: usize,
        /// Paths discarded as open chains.
        open_chains: usize,
        /// Index entries inspected across all tail lookups.
        candidates_examined: usize,
    },
    /// Winding normalization metrics.
    Winding {
        /// Requested orientation.
        orientation: LoopWinding,
        /// Loops processed.
        loop_count: usize,
    },
}

/// High-level summary counts for the call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReconstructSummary {
    /// Input segment count.
    pub segment_count: usize,
    /// Loops returned.
    pub loop_count: usize,
    /// Points across all returned loops.
    pub loop_point_count: usize,
    /// Fewest points in any returned loop.
    pub min_loop_points: usize,
    /// Most points in any returned loop.
    pub max_loop_points: usize,
}

impl ReconstructDiagnostics {
    /// Format diagnostics as a human-readable report.
    #[must_use]
    pub fn report(&self) -> String {
        let mut lines = Vec::new();

        lines.push(format!("Reconstruction Diagnostics Report\n{}", "=".repeat(60)));
        lines.push(format!("Segments: {}", self.summary.segment_count));
        lines.push(format!(
            "Total duration: {:.3}ms",
            duration_ms(self.total_duration),
        ));
        lines.push(String::new());

        lines.push(format!(
            "{:<24} {:>10} {:>10}  {}",
            "Stage", "Duration", "% Total", "Details"
        ));
        lines.push("-".repeat(80));

        let total_ms = duration_ms(self.total_duration);

        let mut stages = vec![
            ("Index Build", &self.index_build),
            ("Traversal", &self.traversal),
        ];
        if let Some(ref w) = self.winding {
            stages.push(("Winding", w));
        }

        for (name, diag) in &stages {
            let ms = duration_ms(diag.duration);
            let pct = if total_ms > 0.0 {
                ms / total_ms * 100.0
            } else {
                0.0
            };
            let details = format_metrics(&diag.metrics);
            lines.push(format!("{name:<24} {ms:>8.3}ms {pct:>9.1}%  {details}"));
        }

        lines.push(String::new());
        lines.push(format!(
            "Loops: {}  |  Loop points: {} (min={} max={})",
            self.summary.loop_count,
            self.summary.loop_point_count,
            self.summary.min_loop_points,
            self.summary.max_loop_points,
        ));

        lines.join("\n")
    }
}

/// Convert a `Duration` to milliseconds as `f64`.
fn duration_ms(d: Duration) -> f64 {
    d.as_secs_f64() * 1000.0
}

/// Format stage metrics into a compact detail string.
fn format_metrics(metrics: &StageMetrics) -> String {
    match metrics {
        StageMetrics::IndexBuild {
            tolerance,
            indexed_endpoints,
            excluded_segments,
            cell_count,
            max_cell_occupancy,
        } => format!(
            "tol={tolerance} endpoints={indexed_endpoints} cells={cell_count} \
             max_occupancy={max_cell_occupancy} excluded={excluded_segments}",
        ),
        StageMetrics::Traversal {
            path_count,
            closed_loops,
            open_chains,
            candidates_examined,
        } => format!(
            "{path_count} paths: {closed_loops} closed, {open_chains} open, \
             {candidates_examined} candidates",
        ),
        StageMetrics::Winding {
            orientation,
            loop_count,
        } => format!("{orientation:?} x{loop_count}"),
    }
}

/// Summary counts over the returned loops.
fn summarize(segment_count: usize, loops: &[Polyline]) -> ReconstructSummary {
    ReconstructSummary {
        segment_count,
        loop_count: loops.len(),
        loop_point_count: loops.iter().map(Polyline::len).sum(),
        min_loop_points: loops.iter().map(Polyline::len).min().unwrap_or(0),
        max_loop_points: loops.iter().map(Polyline::len).max().unwrap_or(0),
    }
}

/// Reconstruct loops while timing each stage.
///
/// Produces the same [`Reconstruction`] as
/// [`reconstruct_traced`](crate::reconstruct_traced).
///
/// # Errors
///
/// Same as [`reconstruct`](crate::reconstruct).
pub fn reconstruct_with_diagnostics<C: Clock>(
    segments: &[Segment],
    config: &ReconstructConfig,
    clock: &C,
) -> Result<(Reconstruction, ReconstructDiagnostics), ReconstructError> {
    let total_start = clock.now();
    config.validate()?;
    reconstruct::check_segment_count(segments, config)?;

    let start = clock.now();
    let index = AdjacencyIndex::build(segments, config.tolerance)?;
    let index_build = StageDiagnostics {
        duration: clock.elapsed(&start),
        metrics: StageMetrics::IndexBuild {
            tolerance: config.tolerance,
            indexed_endpoints: index.endpoint_count(),
            excluded_segments: index.excluded_count(),
            cell_count: index.cell_count(),
            max_cell_occupancy: index.max_cell_occupancy(),
        },
    };

    let start = clock.now();
    let mut reconstruction = reconstruct::traverse(&index, config.min_loop_points);
    let traversal = StageDiagnostics {
        duration: clock.elapsed(&start),
        metrics: StageMetrics::Traversal {
            path_count: reconstruction.paths.len(),
            closed_loops: reconstruction.stats.closed_loops,
            open_chains: reconstruction.stats.open_chains,
            candidates_examined: reconstruction.stats.candidates_examined,
        },
    };

    let winding = if config.winding == LoopWinding::Preserve {
        None
    } else {
        let start = clock.now();
        winding::normalize_all(&mut reconstruction.loops, config.winding);
        Some(StageDiagnostics {
            duration: clock.elapsed(&start),
            metrics: StageMetrics::Winding {
                orientation: config.winding,
                loop_count: reconstruction.loops.len(),
            },
        })
    };

    reconstruct::log_summary(segments.len(), &reconstruction);

    let diagnostics = ReconstructDiagnostics {
        index_build,
        traversal,
        winding,
        total_duration: clock.elapsed(&total_start),
        summary: summarize(segments.len(), &reconstruction.loops),
    };
    Ok((reconstruction, diagnostics))
}
