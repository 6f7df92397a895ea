//! Shared types for the isoloop reconstruction core.

use serde::{Deserialize, Serialize};

/// A 2D point in field coordinates.
///
/// `PartialEq` is exact and only meant for assertions. Vertex identity
/// during reconstruction is always decided by [`Point::coincides`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    /// Horizontal position.
    pub x: f64,
    /// Vertical position.
    pub y: f64,
}

impl Point {
    /// Create a new point.
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Squared Euclidean distance to another point.
    ///
    /// Avoids the square root for comparison purposes.
    #[must_use]
    pub fn distance_squared(self, other: Self) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        dx.mul_add(dx, dy * dy)
    }

    /// Euclidean distance to another point.
    #[must_use]
    pub fn distance(self, other: Self) -> f64 {
        self.distance_squared(other).sqrt()
    }

    /// Returns `true` if both coordinates are finite.
    #[must_use]
    pub const fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }

    /// Returns `true` if `other` is the same vertex as `self`, i.e. lies
    /// within `tolerance` (inclusive).
    #[must_use]
    pub fn coincides(self, other: Self, tolerance: f64) -> bool {
        self.distance_squared(other) <= tolerance * tolerance
    }
}

/// An undirected line segment as emitted by the contour kernel.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    /// First endpoint.
    pub a: Point,
    /// Second endpoint.
    pub b: Point,
}

impl Segment {
    /// Create a new segment.
    #[must_use]
    pub const fn new(a: Point, b: Point) -> Self {
        Self { a, b }
    }

    /// Returns `true` if both endpoints have finite coordinates.
    #[must_use]
    pub const fn is_finite(&self) -> bool {
        self.a.is_finite() && self.b.is_finite()
    }

    /// Returns the requested endpoint.
    #[must_use]
    pub const fn endpoint(&self, end: End) -> Point {
        match end {
            End::A => self.a,
            End::B => self.b,
        }
    }

    /// Euclidean length.
    #[must_use]
    pub fn length(&self) -> f64 {
        self.a.distance(self.b)
    }
}

/// Which endpoint of a [`Segment`] is meant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum End {
    /// [`Segment::a`].
    A,
    /// [`Segment::b`].
    B,
}

impl End {
    /// The opposite endpoint.
    #[must_use]
    pub const fn other(self) -> Self {
        match self {
            Self::A => Self::B,
            Self::B => Self::A,
        }
    }
}

/// A sequence of connected points.
///
/// Reconstructed loops are stored without a repeated closing point; the
/// edge from the last point back to the first is implicit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Polyline(Vec<Point>);

impl Polyline {
    /// Create a new polyline from a vector of points.
    #[must_use]
    pub const fn new(points: Vec<Point>) -> Self {
        Self(points)
    }

    /// Returns `true` if the polyline has no points.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the number of points in the polyline.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns the first point, if any.
    #[must_use]
    pub fn first(&self) -> Option<&Point> {
        self.0.first()
    }

    /// Returns the last point, if any.
    #[must_use]
    pub fn last(&self) -> Option<&Point> {
        self.0.last()
    }

    /// Returns a slice of all points.
    #[must_use]
    pub fn points(&self) -> &[Point] {
        &self.0
    }

    /// Consumes the polyline and returns the underlying vector of points.
    #[must_use]
    pub fn into_points(self) -> Vec<Point> {
        self.0
    }
}

/// Axis-aligned bounding box `(min_x, min_y, max_x, max_y)` over all
/// points of the given polylines.
///
/// Returns `None` when there are no points.
#[must_use]
pub fn bounding_box(polylines: &[Polyline]) -> Option<(f64, f64, f64, f64)> {
    let mut points = polylines.iter().flat_map(Polyline::points);
    let first = points.next()?;
    Some(points.fold(
        (first.x, first.y, first.x, first.y),
        |(min_x, min_y, max_x, max_y), p| {
            (min_x.min(p.x), min_y.min(p.y), max_x.max(p.x), max_y.max(p.y))
        },
    ))
}

/// Orientation applied to accepted loops before they are returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum LoopWinding {
    /// Keep traversal order.
    #[default]
    Preserve,
    /// Reorient every loop counter-clockwise (positive signed area).
    CounterClockwise,
    /// Reorient every loop clockwise.
    Clockwise,
}

/// Configuration for loop reconstruction.
///
/// Fields are public; every entry point calls [`validate`](Self::validate)
/// and rejects invalid values instead of clamping them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReconstructConfig {
    /// Two endpoints at or below this distance are the same vertex.
    /// Must be finite and strictly positive.
    pub tolerance: f64,

    /// Minimum number of distinct points an accepted loop must have.
    /// Must be at least [`MIN_LOOP_POINTS`](Self::MIN_LOOP_POINTS).
    pub min_loop_points: usize,

    /// Orientation applied to accepted loops.
    pub winding: LoopWinding,

    /// Upper bound on the number of input segments accepted per call.
    pub max_segments: usize,
}

impl ReconstructConfig {
    /// Default vertex merge distance.
    pub const DEFAULT_TOLERANCE: f64 = 0.01;

    /// Smallest loop that encloses area.
    pub const MIN_LOOP_POINTS: usize = 3;

    /// Default segment cap, equal to the kernel's append-buffer capacity.
    pub const DEFAULT_MAX_SEGMENTS: usize = 1_000_000;

    /// Configuration with the given tolerance and defaults elsewhere.
    #[must_use]
    pub fn with_tolerance(tolerance: f64) -> Self {
        Self {
            tolerance,
            ..Self::default()
        }
    }

    /// Check the configuration invariants.
    ///
    /// # Errors
    ///
    /// Returns [`ReconstructError::InvalidConfig`] if `tolerance` is not
    /// finite and positive, if `min_loop_points` is below
    /// [`MIN_LOOP_POINTS`](Self::MIN_LOOP_POINTS), or if `max_segments`
    /// is zero.
    pub fn validate(&self) -> Result<(), ReconstructError> {
        validate_tolerance(self.tolerance)?;
        if self.min_loop_points < Self::MIN_LOOP_POINTS {
            return Err(ReconstructError::InvalidConfig(format!(
                "min_loop_points must be at least {}, got {}",
                Self::MIN_LOOP_POINTS,
                self.min_loop_points,
            )));
        }
        if self.max_segments == 0 {
            return Err(ReconstructError::InvalidConfig(
                "max_segments must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for ReconstructConfig {
    fn default() -> Self {
        Self {
            tolerance: Self::DEFAULT_TOLERANCE,
            min_loop_points: Self::MIN_LOOP_POINTS,
            winding: LoopWinding::default(),
            max_segments: Self::DEFAULT_MAX_SEGMENTS,
        }
    }
}

/// Reject a tolerance that is not finite and strictly positive.
pub(crate) fn validate_tolerance(tolerance: f64) -> Result<(), ReconstructError> {
    if tolerance.is_finite() && tolerance > 0.0 {
        Ok(())
    } else {
        Err(ReconstructError::InvalidConfig(format!(
            "tolerance must be finite and greater than zero, got {tolerance}"
        )))
    }
}

/// Errors that can occur during reconstruction.
#[derive(Debug, Clone, PartialEq, thiserror::Error, Serialize, Deserialize)]
pub enum ReconstructError {
    /// Reconstruction configuration is invalid.
    #[error("invalid reconstruction configuration: {0}")]
    InvalidConfig(String),

    /// More segments were supplied than the configured cap allows.
    #[error("too many segments: {count} exceeds the limit of {max}")]
    TooManySegments {
        /// Number of segments supplied.
        count: usize,
        /// Configured cap.
        max: usize,
    },

    /// A segment readback buffer could not be decoded.
    #[error("malformed segment readback: {0}")]
    MalformedReadback(String),
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    // --- Point tests ---

    #[test]
    fn point_distance() {
        let a = Point::new(0.0, 0.0);
        let b = Point::new(3.0, 4.0);
        assert!((a.distance(b) - 5.0).abs() < f64::EPSILON);
        assert!((a.distance_squared(b) - 25.0).abs() < f64::EPSILON);
    }

    #[test]
    fn coincides_is_inclusive_at_tolerance() {
        let a = Point::new(0.0, 0.0);
        assert!(a.coincides(Point::new(0.5, 0.0), 0.5));
        assert!(!a.coincides(Point::new(0.500_001, 0.0), 0.5));
    }

    #[test]
    fn non_finite_points_never_coincide() {
        let nan = Point::new(f64::NAN, 0.0);
        assert!(!nan.is_finite());
        assert!(!nan.coincides(nan, 1.0));
        assert!(!Point::new(f64::INFINITY, 0.0).is_finite());
    }

    // --- Segment tests ---

    #[test]
    fn segment_endpoints() {
        let s = Segment::new(Point::new(1.0, 2.0), Point::new(3.0, 4.0));
        assert_eq!(s.endpoint(End::A), Point::new(1.0, 2.0));
        assert_eq!(s.endpoint(End::B), Point::new(3.0, 4.0));
        assert_eq!(End::A.other(), End::B);
        assert_eq!(End::B.other(), End::A);
    }

    #[test]
    fn segment_with_nan_is_not_finite() {
        let s = Segment::new(Point::new(0.0, 0.0), Point::new(f64::NAN, 1.0));
        assert!(!s.is_finite());
    }

    // --- Polyline tests ---

    #[test]
    fn polyline_empty() {
        let pl = Polyline::new(vec![]);
        assert!(pl.is_empty());
        assert_eq!(pl.len(), 0);
        assert!(pl.first().is_none());
        assert!(pl.last().is_none());
    }

    #[test]
    fn polyline_first_and_last() {
        let pl = Polyline::new(vec![
            Point::new(1.0, 2.0),
            Point::new(3.0, 4.0),
            Point::new(5.0, 6.0),
        ]);
        assert_eq!(pl.first(), Some(&Point::new(1.0, 2.0)));
        assert_eq!(pl.last(), Some(&Point::new(5.0, 6.0)));
        assert_eq!(pl.clone().into_points(), pl.points());
    }

    #[test]
    fn bounding_box_spans_all_polylines() {
        let polylines = [
            Polyline::new(vec![Point::new(1.0, 5.0), Point::new(2.0, -1.0)]),
            Polyline::new(vec![Point::new(-3.0, 0.0)]),
        ];
        assert_eq!(bounding_box(&polylines), Some((-3.0, -1.0, 2.0, 5.0)));
        assert_eq!(bounding_box(&[]), None);
    }

    // --- ReconstructConfig tests ---

    #[test]
    fn config_defaults() {
        let config = ReconstructConfig::default();
        assert!((config.tolerance - 0.01).abs() < f64::EPSILON);
        assert_eq!(config.min_loop_points, 3);
        assert_eq!(config.winding, LoopWinding::Preserve);
        assert_eq!(config.max_segments, 1_000_000);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn config_rejects_non_positive_tolerance() {
        for tolerance in [0.0, -0.5, f64::NAN, f64::INFINITY] {
            let result = ReconstructConfig::with_tolerance(tolerance).validate();
            assert!(
                matches!(result, Err(ReconstructError::InvalidConfig(_))),
                "tolerance {tolerance} should be rejected",
            );
        }
    }

    #[test]
    fn config_rejects_small_min_loop_points() {
        let config = ReconstructConfig {
            min_loop_points: 2,
            ..ReconstructConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ReconstructError::InvalidConfig(_))
        ));
    }

    #[test]
    fn config_rejects_zero_max_segments() {
        let config = ReconstructConfig {
            max_segments: 0,
            ..ReconstructConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn config_missing_fields_take_defaults() {
        let config: ReconstructConfig = serde_json::from_str(r#"{"tolerance":0.25}"#).unwrap();
        assert!((config.tolerance - 0.25).abs() < f64::EPSILON);
        assert_eq!(config.min_loop_points, ReconstructConfig::MIN_LOOP_POINTS);
    }

    #[test]
    fn config_serde_round_trip() {
        let config = ReconstructConfig {
            tolerance: 0.5,
            min_loop_points: 5,
            winding: LoopWinding::Clockwise,
            max_segments: 42,
        };
        let json = serde_json::to_string(&config).unwrap();
        let deserialized: ReconstructConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(config, deserialized);
    }

    // --- ReconstructError tests ---

    #[test]
    fn error_display() {
        let err = ReconstructError::InvalidConfig("tolerance must be positive".to_string());
        assert_eq!(
            err.to_string(),
            "invalid reconstruction configuration: tolerance must be positive",
        );
        let err = ReconstructError::TooManySegments { count: 10, max: 5 };
        assert_eq!(err.to_string(), "too many segments: 10 exceeds the limit of 5");
    }

    #[test]
    fn error_serde_round_trip() {
        let err = ReconstructError::TooManySegments { count: 7, max: 3 };
        let json = serde_json::to_string(&err).unwrap();
        let deserialized: ReconstructError = serde_json::from_str(&json).unwrap();
        assert_eq!(err, deserialized);
    }
}
