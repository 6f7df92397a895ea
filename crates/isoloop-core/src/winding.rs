//! Loop orientation via `geo`'s winding-order algorithm.
//!
//! Reconstructed loops come out in whatever direction the traversal
//! happened to walk them. Consumers that care (e.g. collision geometry
//! expecting counter-clockwise outer boundaries) can request a fixed
//! orientation through [`LoopWinding`].

use geo::{Area, Coord, LineString, Polygon, Winding};

use crate::types::{LoopWinding, Point, Polyline};

/// Convert a loop into a closed `geo::LineString`.
fn to_ring(polyline: &Polyline) -> LineString<f64> {
    let mut ring: LineString<f64> = polyline
        .points()
        .iter()
        .map(|p| Coord { x: p.x, y: p.y })
        .collect();
    ring.close();
    ring
}

/// Reorient a single loop.
///
/// The first point is kept in place; reversing walks the remaining
/// points backwards. Loops with fewer than three points, or without a
/// defined orientation (all points collinear), are returned unchanged.
#[must_use = "returns the reoriented loop"]
pub fn normalize(polyline: Polyline, winding: LoopWinding) -> Polyline {
    if winding == LoopWinding::Preserve || polyline.len() < 3 {
        return polyline;
    }

    let mut ring = to_ring(&polyline);
    match winding {
        LoopWinding::CounterClockwise => ring.make_ccw_winding(),
        LoopWinding::Clockwise => ring.make_cw_winding(),
        LoopWinding::Preserve => {}
    }

    // Drop the closing coordinate added by `to_ring`.
    ring.0.pop();
    Polyline::new(ring.0.into_iter().map(|c| Point::new(c.x, c.y)).collect())
}

/// Reorient every loop in place.
pub fn normalize_all(loops: &mut [Polyline], winding: LoopWinding) {
    if winding == LoopWinding::Preserve {
        return;
    }
    for polyline in loops.iter_mut() {
        let taken = std::mem::replace(polyline, Polyline::new(Vec::new()));
        *polyline = normalize(taken, winding);
    }
}

/// Signed area enclosed by a loop: positive for counter-clockwise,
/// negative for clockwise (y axis pointing up).
#[must_use]
pub fn signed_area(polyline: &Polyline) -> f64 {
    Polygon::new(to_ring(polyline), Vec::new()).signed_area()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn clockwise_square() -> Polyline {
        Polyline::new(vec![
            Point::new(0.0, 0.0),
            Point::new(0.0, 1.0),
            Point::new(1.0, 1.0),
            Point::new(1.0, 0.0),
        ])
    }

    #[test]
    fn signed_area_sign_follows_orientation() {
        let cw = clockwise_square();
        assert!((signed_area(&cw) + 1.0).abs() < 1e-12);

        let mut points = cw.into_points();
        points.reverse();
        assert!((signed_area(&Polyline::new(points)) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn preserve_is_identity() {
        let square = clockwise_square();
        assert_eq!(normalize(square.clone(), LoopWinding::Preserve), square);
    }

    #[test]
    fn counter_clockwise_reverses_and_keeps_start() {
        let ccw = normalize(clockwise_square(), LoopWinding::CounterClockwise);
        assert_eq!(
            ccw.points(),
            &[
                Point::new(0.0, 0.0),
                Point::new(1.0, 0.0),
                Point::new(1.0, 1.0),
                Point::new(0.0, 1.0),
            ]
        );
        assert!(signed_area(&ccw) > 0.0);
    }

    #[test]
    fn already_oriented_loop_is_unchanged() {
        let square = clockwise_square();
        assert_eq!(normalize(square.clone(), LoopWinding::Clockwise), square);
    }

    #[test]
    fn normalize_all_touches_every_loop() {
        let mut loops = vec![clockwise_square(), clockwise_square()];
        normalize_all(&mut loops, LoopWinding::CounterClockwise);
        assert!(loops.iter().all(|l| signed_area(l) > 0.0));
        assert!(loops.iter().all(|l| l.len() == 4));
    }

    #[test]
    fn short_loops_are_left_alone() {
        let pair = Polyline::new(vec![Point::new(0.0, 0.0), Point::new(1.0, 0.0)]);
        assert_eq!(normalize(pair.clone(), LoopWinding::CounterClockwise), pair);
    }
}
