//! Loop reconstruction: group unordered segments into closed polygon loops.
//!
//! # Algorithm
//!
//! 1. Build an [`AdjacencyIndex`] over all segments.
//! 2. Walk the segments in input order. Every segment not yet consumed
//!    seeds a new path holding both of its endpoints.
//! 3. Grow the path from its tail: take the earliest unvisited segment
//!    with an endpoint at the tail and append its opposite endpoint.
//!    Repeat until the tail has no unvisited incident segment.
//! 4. Accept the path as a loop if its tail returned to its first point
//!    and enough distinct points remain once the closing duplicate is
//!    dropped. Everything else is an open chain and is discarded.
//!
//! Every segment is consumed by exactly one path, so the traversal does
//! `O(n)` lookups in total, each touching a constant number of grid cells
//! on average.
//!
//! # Junctions
//!
//! When more than two segments meet at a vertex (degenerate kernel
//! cells) the continuation is simply the earliest unvisited segment in
//! input order. This is deterministic but makes no attempt to pick the
//! geometrically plausible branch, so loops through a T-junction may
//! take a shortcut. That is a known limitation of the policy.

use serde::{Deserialize, Serialize};

use crate::index::AdjacencyIndex;
use crate::types::{Point, Polyline, ReconstructConfig, ReconstructError, Segment};
use crate::winding;

/// Lifecycle of a single path.
///
/// `Seeded -> Growing -> (Closed | OpenDiscarded)`. Both terminal states
/// are final.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PathState {
    /// Holds only its seed segment.
    Seeded,
    /// At least one segment has been appended to the seed.
    Growing,
    /// Returned to its start and was accepted as a loop.
    Closed,
    /// Ended without closing (or too short) and was dropped.
    OpenDiscarded,
}

impl PathState {
    /// Returns `true` for [`Closed`](Self::Closed) and
    /// [`OpenDiscarded`](Self::OpenDiscarded).
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Closed | Self::OpenDiscarded)
    }
}

/// Record of one path produced during traversal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathTrace {
    /// Index of the segment that seeded the path.
    pub seed: usize,
    /// Indices of every segment consumed by the path, seed first, in
    /// traversal order.
    pub segments: Vec<usize>,
    /// Terminal state of the path.
    pub state: PathState,
}

/// Counters gathered while traversing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraversalStats {
    /// Index bucket entries inspected across all tail lookups.
    pub candidates_examined: usize,
    /// Paths accepted as loops.
    pub closed_loops: usize,
    /// Paths discarded as open chains.
    pub open_chains: usize,
    /// Segments skipped for non-finite coordinates (each one is also
    /// counted as an open chain).
    pub excluded_segments: usize,
}

/// Full result of a reconstruction call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reconstruction {
    /// Accepted loops in the order their seed segments appear in the input.
    pub loops: Vec<Polyline>,
    /// Every path, accepted or discarded, in seed order.
    pub paths: Vec<PathTrace>,
    /// Traversal counters.
    pub stats: TraversalStats,
}

/// Reconstructs closed loops with a fixed, validated configuration.
///
/// Holds no state between calls; the same reconstructor can be reused
/// for every frame.
#[derive(Debug, Clone, PartialEq)]
pub struct PathReconstructor {
    config: ReconstructConfig,
}

impl PathReconstructor {
    /// Create a reconstructor after validating `config`.
    ///
    /// # Errors
    ///
    /// Returns [`ReconstructError::InvalidConfig`] if the configuration
    /// is invalid.
    pub fn new(config: ReconstructConfig) -> Result<Self, ReconstructError> {
        config.validate()?;
        Ok(Self { config })
    }

    /// The configuration in use.
    #[must_use]
    pub const fn config(&self) -> &ReconstructConfig {
        &self.config
    }

    /// Reconstruct closed loops from `segments`.
    ///
    /// # Errors
    ///
    /// Returns [`ReconstructError::TooManySegments`] if `segments` exceeds
    /// the configured cap.
    pub fn reconstruct(&self, segments: &[Segment]) -> Result<Vec<Polyline>, ReconstructError> {
        self.reconstruct_traced(segments).map(|r| r.loops)
    }

    /// Reconstruct closed loops and keep a trace of every path.
    ///
    /// # Errors
    ///
    /// Returns [`ReconstructError::TooManySegments`] if `segments` exceeds
    /// the configured cap.
    pub fn reconstruct_traced(
        &self,
        segments: &[Segment],
    ) -> Result<Reconstruction, ReconstructError> {
        check_segment_count(segments, &self.config)?;
        let index = AdjacencyIndex::build(segments, self.config.tolerance)?;
        let mut reconstruction = traverse(&index, self.config.min_loop_points);
        winding::normalize_all(&mut reconstruction.loops, self.config.winding);
        log_summary(segments.len(), &reconstruction);
        Ok(reconstruction)
    }
}

/// Reconstruct closed loops from an unordered set of segments.
///
/// Loops are returned in the order their seed segments appear in
/// `segments`; each holds at least `config.min_loop_points` points and
/// does not repeat its first point at the end. Open chains are dropped
/// silently. Empty input yields an empty list.
///
/// # Errors
///
/// Returns [`ReconstructError::InvalidConfig`] if `config` is invalid and
/// [`ReconstructError::TooManySegments`] if `segments` exceeds
/// `config.max_segments`.
///
/// # Examples
///
/// ```
/// use isoloop_core::{Point, ReconstructConfig, Segment, reconstruct};
///
/// let p = [
///     Point::new(0.0, 0.0),
///     Point::new(1.0, 0.0),
///     Point::new(1.0, 1.0),
///     Point::new(0.0, 1.0),
/// ];
/// let segments: Vec<Segment> = (0..4).map(|i| Segment::new(p[i], p[(i + 1) % 4])).collect();
///
/// let loops = reconstruct(&segments, &ReconstructConfig::with_tolerance(0.01)).unwrap();
/// assert_eq!(loops.len(), 1);
/// assert_eq!(loops[0].len(), 4);
/// ```
pub fn reconstruct(
    segments: &[Segment],
    config: &ReconstructConfig,
) -> Result<Vec<Polyline>, ReconstructError> {
    reconstruct_traced(segments, config).map(|r| r.loops)
}

/// Like [`reconstruct`], but also returns a [`PathTrace`] for every path
/// and the traversal counters.
///
/// # Errors
///
/// Same as [`reconstruct`].
pub fn reconstruct_traced(
    segments: &[Segment],
    config: &ReconstructConfig,
) -> Result<Reconstruction, ReconstructError> {
    PathReconstructor::new(config.clone())?.reconstruct_traced(segments)
}

/// Fail the whole call when the input exceeds the configured cap.
pub(crate) fn check_segment_count(
    segments: &[Segment],
    config: &ReconstructConfig,
) -> Result<(), ReconstructError> {
    if segments.len() > config.max_segments {
        return Err(ReconstructError::TooManySegments {
            count: segments.len(),
            max: config.max_segments,
        });
    }
    Ok(())
}

/// Depth-first tail-growth traversal over an index.
///
/// Loops are returned in traversal orientation; winding is applied by
/// the caller.
pub(crate) fn traverse(index: &AdjacencyIndex<'_>, min_loop_points: usize) -> Reconstruction {
    let segments = index.segments();
    let tolerance = index.tolerance();
    let mut visited = vec![false; segments.len()];
    let mut loops = Vec::new();
    let mut paths = Vec::new();
    let mut stats = TraversalStats::default();

    for (seed, segment) in segments.iter().enumerate() {
        if visited[seed] {
            continue;
        }
        visited[seed] = true;

        if !segment.is_finite() {
            stats.excluded_segments += 1;
            stats.open_chains += 1;
            log::trace!("segment {seed} has non-finite coordinates, discarded");
            paths.push(PathTrace {
                seed,
                segments: vec![seed],
                state: PathState::OpenDiscarded,
            });
            continue;
        }

        let mut path = PathBuilder::seed(seed, segment, tolerance);
        while let Some(inc) =
            index.first_unvisited(path.tail(), &visited, &mut stats.candidates_examined)
        {
            visited[inc.segment] = true;
            path.extend(inc.segment, segments[inc.segment].endpoint(inc.end.other()));
        }

        let (trace, polyline) = path.finish(min_loop_points);
        if let Some(polyline) = polyline {
            stats.closed_loops += 1;
            loops.push(polyline);
        } else {
            stats.open_chains += 1;
            log::trace!(
                "open chain seeded by segment {seed} discarded ({} segments)",
                trace.segments.len(),
            );
        }
        paths.push(trace);
    }

    Reconstruction {
        loops,
        paths,
        stats,
    }
}

/// Emit the per-call summary at debug level.
pub(crate) fn log_summary(segment_count: usize, reconstruction: &Reconstruction) {
    let stats = &reconstruction.stats;
    log::debug!(
        "reconstructed {} loops from {segment_count} segments \
         ({} open chains discarded, {} non-finite segments, {} candidates examined)",
        stats.closed_loops,
        stats.open_chains,
        stats.excluded_segments,
        stats.candidates_examined,
    );
}

/// A path under construction.
struct PathBuilder {
    points: Vec<Point>,
    segments: Vec<usize>,
    seed: usize,
    state: PathState,
    tolerance: f64,
}

impl PathBuilder {
    /// Start a path from its seed segment.
    ///
    /// A degenerate seed whose endpoints coincide contributes one point.
    fn seed(index: usize, segment: &Segment, tolerance: f64) -> Self {
        let mut points = Vec::with_capacity(4);
        points.push(segment.a);
        if !segment.b.coincides(segment.a, tolerance) {
            points.push(segment.b);
        }
        Self {
            points,
            segments: vec![index],
            seed: index,
            state: PathState::Seeded,
            tolerance,
        }
    }

    /// Current growth end.
    fn tail(&self) -> Point {
        // A builder always holds at least the seed's first endpoint.
        self.points.last().copied().unwrap_or(Point::new(f64::NAN, f64::NAN))
    }

    /// Consume `segment`, moving the tail to `next`.
    ///
    /// `next` is not stored when it coincides with the current tail, so
    /// adjacent points stay distinct.
    fn extend(&mut self, segment: usize, next: Point) {
        debug_assert!(!self.state.is_terminal(), "extending a finished path");
        self.state = PathState::Growing;
        self.segments.push(segment);
        if !next.coincides(self.tail(), self.tolerance) {
            self.points.push(next);
        }
    }

    /// Decide the terminal state and produce the loop if accepted.
    fn finish(mut self, min_loop_points: usize) -> (PathTrace, Option<Polyline>) {
        let closed = self.points.len() > 1
            && self.points[0].coincides(self.tail(), self.tolerance);

        let polyline = if closed {
            // Drop the closing point(s) that duplicate the start.
            while self.points.len() > 1 && self.points[0].coincides(self.tail(), self.tolerance) {
                self.points.pop();
            }
            (self.points.len() >= min_loop_points).then(|| Polyline::new(self.points))
        } else {
            None
        };

        self.state = if polyline.is_some() {
            PathState::Closed
        } else {
            PathState::OpenDiscarded
        };

        let trace = PathTrace {
            seed: self.seed,
            segments: self.segments,
            state: self.state,
        };
        (trace, polyline)
    }
}
