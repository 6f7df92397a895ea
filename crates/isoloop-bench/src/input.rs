//! Segment sources for the bench: JSON files, raw readback dumps, and a
//! synthetic grid of jittered squares.

use std::path::Path;

use isoloop_core::{Point, Segment, readback};

/// Read a JSON array of segments (`[{"a":{"x":..,"y":..},"b":{..}}, ..]`).
pub fn load_json(path: &Path) -> Result<Vec<Segment>, String> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| format!("Error reading {}: {e}", path.display()))?;
    serde_json::from_str(&text).map_err(|e| format!("Error parsing {}: {e}", path.display()))
}

/// Read a little-endian `float4` readback dump, keeping at most `capacity`
/// records.
pub fn load_raw(path: &Path, capacity: usize) -> Result<Vec<Segment>, String> {
    let bytes =
        std::fs::read(path).map_err(|e| format!("Error reading {}: {e}", path.display()))?;
    readback::decode_le_bytes(&bytes, capacity).map_err(|e| format!("{}: {e}", path.display()))
}

/// SplitMix64 step, mapped to `[-1, 1)`.
fn jitter(state: &mut u64) -> f64 {
    *state = state.wrapping_add(0x9E37_79B9_7F4A_7C15);
    let mut z = *state;
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^= z >> 31;
    #[allow(clippy::cast_precision_loss)]
    let unit = (z >> 11) as f64 / (1_u64 << 53) as f64;
    unit.mul_add(2.0, -1.0)
}

/// `count` unit squares on a grid with spacing 2, every endpoint moved by
/// up to `max_offset` per axis, emitted edge-major so the four edges of a
/// square are far apart in the output.
#[allow(clippy::cast_precision_loss)]
pub fn synthetic_squares(count: usize, max_offset: f64) -> Vec<Segment> {
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let side = (count as f64).sqrt().ceil() as usize;
    let mut state = 0x1505_u64;
    let mut nudge = |p: Point| {
        Point::new(
            jitter(&mut state).mul_add(max_offset, p.x),
            jitter(&mut state).mul_add(max_offset, p.y),
        )
    };

    let mut edges = vec![Vec::with_capacity(count); 4];
    for i in 0..count {
        let x = (i % side) as f64 * 2.0;
        let y = (i / side) as f64 * 2.0;
        let corners = [
            Point::new(x, y),
            Point::new(x + 1.0, y),
            Point::new(x + 1.0, y + 1.0),
            Point::new(x, y + 1.0),
        ];
        for (k, bucket) in edges.iter_mut().enumerate() {
            bucket.push(Segment::new(nudge(corners[k]), nudge(corners[(k + 1) % 4])));
        }
    }

    edges.into_iter().flatten().collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use isoloop_core::{ReconstructConfig, reconstruct};

    use super::*;

    #[test]
    fn synthetic_squares_reconstruct_fully() {
        let segments = synthetic_squares(50, 0.002);
        assert_eq!(segments.len(), 200);
        let loops = reconstruct(&segments, &ReconstructConfig::default()).unwrap();
        assert_eq!(loops.len(), 50);
    }

    #[test]
    fn synthetic_squares_are_reproducible() {
        assert_eq!(synthetic_squares(10, 0.003), synthetic_squares(10, 0.003));
    }

    #[test]
    fn jitter_stays_in_range() {
        let mut state = 7;
        for _ in 0..1_000 {
            let v = jitter(&mut state);
            assert!((-1.0..1.0).contains(&v));
        }
    }

    #[test]
    fn missing_file_reports_path() {
        let err = load_json(Path::new("/nonexistent/segments.json")).unwrap_err();
        assert!(err.contains("/nonexistent/segments.json"));
    }
}
