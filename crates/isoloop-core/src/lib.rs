//! isoloop-core: closed-loop reconstruction from iso-contour segments (sans-IO).
//!
//! A marching-squares kernel emits one short line segment per grid cell
//! the contour crosses, in no particular order and with slightly jittered
//! endpoints. This crate stitches those segments back into closed polygon
//! loops:
//!
//! segments -> adjacency index -> tail-growth traversal ->
//! closed-loop filter -> optional winding normalization.
//!
//! This crate has **no I/O dependencies**. It operates on in-memory
//! segment slices (or raw readback buffers) and returns structured data.

pub mod diagnostics;
pub mod frame;
pub mod index;
pub mod readback;
pub mod reconstruct;
pub mod types;
pub mod winding;

pub use frame::{FrameInput, FrameOutput, process_frame, process_readback};
pub use index::{AdjacencyIndex, Incidence};
pub use reconstruct::{
    PathReconstructor, PathState, PathTrace, Reconstruction, TraversalStats, reconstruct,
    reconstruct_traced,
};
pub use types::{
    End, LoopWinding, Point, Polyline, ReconstructConfig, ReconstructError, Segment, bounding_box,
};
