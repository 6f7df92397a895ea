//! Adjacency index: approximate vertex position -> incident segment endpoints.
//!
//! Endpoints are bucketed into a uniform grid whose cells are `tolerance`
//! wide. Two endpoints within `tolerance` of each other are then at most
//! one cell apart on each axis, so a lookup probes the 3x3 block of cells
//! around the query point and filters the candidates by true distance.
//! Probing only the query's own cell would drop matches that straddle a
//! cell boundary.
//!
//! Coordinates are never hashed exactly: numerically perturbed endpoints
//! from neighbouring kernel cells must still meet.

use std::collections::HashMap;

use crate::types::{End, Point, ReconstructError, Segment, validate_tolerance};

/// One endpoint of one input segment.
///
/// Ordered by segment index first, so the minimum of a candidate set is
/// the earliest segment in input order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Incidence {
    /// Index of the segment in the input slice.
    pub segment: usize,
    /// Which endpoint of that segment lies at the queried vertex.
    pub end: End,
}

/// Integer grid cell containing a point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct CellKey {
    col: i64,
    row: i64,
}

impl CellKey {
    /// Cell of side `cell_size` containing `p`.
    ///
    /// The float-to-int cast saturates for coordinates far outside the
    /// `i64` cell range; such points share edge cells and are still
    /// separated by the distance filter.
    #[allow(clippy::cast_possible_truncation)]
    fn containing(p: Point, cell_size: f64) -> Self {
        Self {
            col: (p.x / cell_size).floor() as i64,
            row: (p.y / cell_size).floor() as i64,
        }
    }

    /// The cell itself and its eight neighbours.
    fn neighborhood(self) -> impl Iterator<Item = Self> {
        (-1_i64..=1).flat_map(move |dr| {
            (-1_i64..=1).map(move |dc| Self {
                col: self.col.saturating_add(dc),
                row: self.row.saturating_add(dr),
            })
        })
    }
}

/// Tolerance-aware map from vertex position to the segment endpoints
/// located there.
///
/// Built once per reconstruction call over a borrowed segment slice.
/// Segments with a non-finite coordinate are left out entirely and can
/// never be returned by a lookup.
#[derive(Debug)]
pub struct AdjacencyIndex<'a> {
    segments: &'a [Segment],
    tolerance: f64,
    buckets: HashMap<CellKey, Vec<Incidence>>,
    excluded: usize,
}

impl<'a> AdjacencyIndex<'a> {
    /// Index both endpoints of every finite segment.
    ///
    /// Buckets are filled in input order, so each bucket lists its
    /// incidences sorted by segment index.
    ///
    /// # Errors
    ///
    /// Returns [`ReconstructError::InvalidConfig`] if `tolerance` is not
    /// finite and strictly positive.
    pub fn build(segments: &'a [Segment], tolerance: f64) -> Result<Self, ReconstructError> {
        validate_tolerance(tolerance)?;

        let mut buckets: HashMap<CellKey, Vec<Incidence>> =
            HashMap::with_capacity(segments.len());
        let mut excluded = 0;

        for (segment, s) in segments.iter().enumerate() {
            if !s.is_finite() {
                excluded += 1;
                continue;
            }
            for end in [End::A, End::B] {
                buckets
                    .entry(CellKey::containing(s.endpoint(end), tolerance))
                    .or_default()
                    .push(Incidence { segment, end });
            }
        }

        Ok(Self {
            segments,
            tolerance,
            buckets,
            excluded,
        })
    }

    /// The tolerance this index was built with.
    #[must_use]
    pub const fn tolerance(&self) -> f64 {
        self.tolerance
    }

    /// The indexed segment slice.
    #[must_use]
    pub const fn segments(&self) -> &'a [Segment] {
        self.segments
    }

    /// All endpoints within `tolerance` of `point`, sorted by segment
    /// index and then endpoint.
    #[must_use]
    pub fn lookup(&self, point: Point) -> Vec<Incidence> {
        let mut found: Vec<Incidence> = CellKey::containing(point, self.tolerance)
            .neighborhood()
            .filter_map(|key| self.buckets.get(&key))
            .flatten()
            .copied()
            .filter(|inc| self.coincides(*inc, point))
            .collect();
        found.sort_unstable();
        // Saturated neighbourhoods can probe the same edge cell twice.
        found.dedup();
        found
    }

    /// The earliest (by input order) endpoint within `tolerance` of
    /// `point` whose segment has not been visited yet.
    ///
    /// `examined` is incremented once per bucket entry inspected, which
    /// makes the lookup cost observable.
    pub(crate) fn first_unvisited(
        &self,
        point: Point,
        visited: &[bool],
        examined: &mut usize,
    ) -> Option<Incidence> {
        let mut best: Option<Incidence> = None;
        for key in CellKey::containing(point, self.tolerance).neighborhood() {
            let Some(bucket) = self.buckets.get(&key) else {
                continue;
            };
            for &inc in bucket {
                *examined += 1;
                if visited[inc.segment] || best.is_some_and(|b| b <= inc) {
                    continue;
                }
                if self.coincides(inc, point) {
                    best = Some(inc);
                }
            }
        }
        best
    }

    /// Number of endpoints stored (two per finite segment).
    #[must_use]
    pub fn endpoint_count(&self) -> usize {
        self.buckets.values().map(Vec::len).sum()
    }

    /// Number of occupied grid cells.
    #[must_use]
    pub fn cell_count(&self) -> usize {
        self.buckets.len()
    }

    /// Largest number of endpoints sharing one grid cell.
    #[must_use]
    pub fn max_cell_occupancy(&self) -> usize {
        self.buckets.values().map(Vec::len).max().unwrap_or(0)
    }

    /// Number of segments left out because of non-finite coordinates.
    #[must_use]
    pub const fn excluded_count(&self) -> usize {
        self.excluded
    }

    fn coincides(&self, inc: Incidence, point: Point) -> bool {
        self.segments[inc.segment]
            .endpoint(inc.end)
            .coincides(point, self.tolerance)
    }
}
