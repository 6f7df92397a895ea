//! Per-frame context: segments and configuration in, loops out.
//!
//! The host refreshes its contour once per frame. Everything needed for
//! one refresh travels in a [`FrameInput`] and everything produced comes
//! back in a [`FrameOutput`]; nothing survives between frames.

use serde::{Deserialize, Serialize};

use crate::readback;
use crate::reconstruct::PathReconstructor;
use crate::types::{Point, Polyline, ReconstructConfig, ReconstructError, Segment};

/// Inputs for one refresh.
#[derive(Debug, Clone, Copy)]
pub struct FrameInput<'a> {
    /// Segments in kernel emission order.
    pub segments: &'a [Segment],
    /// Reconstruction settings for this frame.
    pub config: &'a ReconstructConfig,
}

/// Loops produced by one refresh.
///
/// Shaped after a multi-path polygon collider: one path per loop,
/// `path_count() == loops.len()`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FrameOutput {
    /// Closed loops, in seed order.
    pub loops: Vec<Polyline>,
}

impl FrameOutput {
    /// Number of polygon paths.
    #[must_use]
    pub fn path_count(&self) -> usize {
        self.loops.len()
    }

    /// Points of path `i`, if it exists.
    #[must_use]
    pub fn path(&self, i: usize) -> Option<&[Point]> {
        self.loops.get(i).map(Polyline::points)
    }

    /// Total number of stored points across all paths.
    #[must_use]
    pub fn point_count(&self) -> usize {
        self.loops.iter().map(Polyline::len).sum()
    }
}

/// Run one refresh over already-decoded segments.
///
/// # Errors
///
/// Propagates any [`ReconstructError`] from validation or reconstruction;
/// no partial output is produced.
pub fn process_frame(input: FrameInput<'_>) -> Result<FrameOutput, ReconstructError> {
    let loops = PathReconstructor::new(input.config.clone())?.reconstruct(input.segments)?;
    Ok(FrameOutput { loops })
}

/// Decode a float readback buffer and run one refresh over it.
///
/// The kernel's reported count is clamped to `config.max_segments` and to
/// the records present in `raw`.
///
/// # Errors
///
/// Same as [`process_frame`].
pub fn process_readback(
    raw: &[f32],
    reported_count: i64,
    config: &ReconstructConfig,
) -> Result<FrameOutput, ReconstructError> {
    config.validate()?;
    let segments = readback::decode_segments(raw, reported_count, config.max_segments);
    process_frame(FrameInput {
        segments: &segments,
        config,
    })
}
