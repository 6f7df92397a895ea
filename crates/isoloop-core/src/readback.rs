//! Decoding of the contour kernel's segment readback buffer.
//!
//! The kernel appends one record per emitted segment into a fixed-capacity
//! buffer and bumps a separate counter. Each record is four 32-bit floats:
//! `start.x, start.y, end.x, end.y`. The counter is read back separately
//! and may exceed the buffer capacity (appends past the end are dropped by
//! the device), so it is clamped before the records are read.

use crate::types::{Point, ReconstructError, Segment};

/// Floats per segment record.
pub const RECORD_FLOATS: usize = 4;

/// Bytes per segment record.
pub const RECORD_BYTES: usize = RECORD_FLOATS * std::mem::size_of::<f32>();

fn record_to_segment(record: &[f32]) -> Segment {
    Segment::new(
        Point::new(f64::from(record[0]), f64::from(record[1])),
        Point::new(f64::from(record[2]), f64::from(record[3])),
    )
}

/// Clamp the kernel's reported segment count to `[0, capacity]` and to
/// the number of complete records actually present.
#[must_use]
pub fn clamp_count(reported_count: i64, capacity: usize, available: usize) -> usize {
    let limit = capacity.min(available);
    let clamped = usize::try_from(reported_count.max(0)).map_or(limit, |n| n.min(limit));
    if i64::try_from(clamped).ok() != Some(reported_count) {
        log::warn!(
            "segment counter {reported_count} clamped to {clamped} \
             (capacity {capacity}, {available} records available)"
        );
    }
    clamped
}

/// Decode the first `reported_count` records of a float readback buffer.
///
/// Trailing floats that do not form a whole record are ignored.
#[must_use]
pub fn decode_segments(raw: &[f32], reported_count: i64, capacity: usize) -> Vec<Segment> {
    let count = clamp_count(reported_count, capacity, raw.len() / RECORD_FLOATS);
    raw.chunks_exact(RECORD_FLOATS)
        .take(count)
        .map(record_to_segment)
        .collect()
}

/// Decode a little-endian byte dump of segment records.
///
/// At most `capacity` records are decoded.
///
/// # Errors
///
/// Returns [`ReconstructError::MalformedReadback`] if the byte length is
/// not a whole number of records.
pub fn decode_le_bytes(bytes: &[u8], capacity: usize) -> Result<Vec<Segment>, ReconstructError> {
    if bytes.len() % RECORD_BYTES != 0 {
        return Err(ReconstructError::MalformedReadback(format!(
            "{} bytes is not a multiple of the {RECORD_BYTES}-byte segment record",
            bytes.len(),
        )));
    }

    let floats: Vec<f32> = bytes
        .chunks_exact(std::mem::size_of::<f32>())
        .map(|chunk| {
            let mut buf = [0_u8; 4];
            buf.copy_from_slice(chunk);
            f32::from_le_bytes(buf)
        })
        .collect();

    let available = floats.len() / RECORD_FLOATS;
    let reported = i64::try_from(available).unwrap_or(i64::MAX);
    Ok(decode_segments(&floats, reported, capacity))
}

/// Encode segments as a little-endian byte dump (the inverse of
/// [`decode_le_bytes`], narrowing coordinates to `f32`).
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn encode_le_bytes(segments: &[Segment]) -> Vec<u8> {
    let mut out = Vec::with_capacity(segments.len() * RECORD_BYTES);
    for s in segments {
        for v in [s.a.x, s.a.y, s.b.x, s.b.y] {
            out.extend_from_slice(&(v as f32).to_le_bytes());
        }
    }
    out
}
