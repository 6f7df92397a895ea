//! Segment generators shared by the integration tests.

#![allow(dead_code)]

use isoloop_core::{Point, Segment};

/// The four edges of an axis-aligned square, walked counter-clockwise.
pub fn square(x: f64, y: f64, size: f64) -> Vec<Segment> {
    let p = [
        Point::new(x, y),
        Point::new(x + size, y),
        Point::new(x + size, y + size),
        Point::new(x, y + size),
    ];
    (0..4).map(|i| Segment::new(p[i], p[(i + 1) % 4])).collect()
}

/// Deterministic pseudo-random value in `[-1, 1)` derived from `seed`.
pub fn jitter(seed: u64) -> f64 {
    // SplitMix64 finalizer.
    let mut z = seed.wrapping_add(0x9E37_79B9_7F4A_7C15);
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^= z >> 31;
    #[allow(clippy::cast_precision_loss)]
    let unit = (z >> 11) as f64 / (1_u64 << 53) as f64;
    unit.mul_add(2.0, -1.0)
}

/// A grid of `count` disjoint unit squares, every endpoint independently
/// jittered by up to `max_offset` on each axis, with the segment order
/// interleaved across squares so neighbours in the input are unrelated.
pub fn jittered_squares(count: usize, max_offset: f64) -> Vec<Segment> {
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let side = (count as f64).sqrt().ceil() as usize;
    let mut per_square: Vec<Vec<Segment>> = Vec::with_capacity(count);
    let mut seed = 0_u64;
    let mut nudge = |p: Point| {
        seed += 2;
        Point::new(
            jitter(seed).mul_add(max_offset, p.x),
            jitter(seed + 1).mul_add(max_offset, p.y),
        )
    };

    for i in 0..count {
        #[allow(clippy::cast_precision_loss)]
        let (x, y) = ((i % side) as f64 * 2.0, (i / side) as f64 * 2.0);
        let edges = square(x, y, 1.0)
            .into_iter()
            .map(|s| Segment::new(nudge(s.a), nudge(s.b)))
            .collect();
        per_square.push(edges);
    }

    // Edge k of every square, then edge k+1 of every square, ...
    (0..4)
        .flat_map(|k| per_square.iter().map(move |edges| edges[k]))
        .collect()
}
