//! End-to-end reconstruction scenarios on small hand-built inputs and on
//! large generated grids.

#![allow(clippy::unwrap_used)]

mod common;

use isoloop_core::{
    PathState, Point, ReconstructConfig, Segment, reconstruct, reconstruct_traced,
};

fn seg(ax: f64, ay: f64, bx: f64, by: f64) -> Segment {
    Segment::new(Point::new(ax, ay), Point::new(bx, by))
}

fn config(tolerance: f64) -> ReconstructConfig {
    ReconstructConfig::with_tolerance(tolerance)
}

#[test]
fn unit_square_closes_without_duplicate_point() {
    let segments = [
        seg(0.0, 0.0, 1.0, 0.0),
        seg(1.0, 0.0, 1.0, 1.0),
        seg(1.0, 1.0, 0.0, 1.0),
        seg(0.0, 1.0, 0.0, 0.0),
    ];
    let loops = reconstruct(&segments, &config(0.01)).unwrap();

    assert_eq!(loops.len(), 1);
    let points = loops[0].points();
    assert_eq!(points.len(), 4);
    assert!(points[0].distance(points[3]) > 0.01);
}

#[test]
fn open_chain_yields_no_loops() {
    let segments = [seg(0.0, 0.0, 1.0, 0.0), seg(1.0, 0.0, 2.0, 0.0)];
    let r = reconstruct_traced(&segments, &config(0.01)).unwrap();
    assert!(r.loops.is_empty());
    assert_eq!(r.paths.len(), 1);
    assert_eq!(r.paths[0].state, PathState::OpenDiscarded);
}

#[test]
fn two_disjoint_squares_yield_two_loops() {
    let mut segments = common::square(0.0, 0.0, 1.0);
    segments.extend(common::square(3.0, 0.0, 1.0));
    let loops = reconstruct(&segments, &config(0.01)).unwrap();

    assert_eq!(loops.len(), 2);
    assert!(loops.iter().all(|l| l.len() == 4));
    // Seed order: the first square's loop comes first.
    assert_eq!(loops[0].first(), Some(&Point::new(0.0, 0.0)));
    assert_eq!(loops[1].first(), Some(&Point::new(3.0, 0.0)));
}

#[test]
fn endpoint_offset_inside_tolerance_still_merges() {
    let tol = 0.01;
    let mut segments = common::square(0.0, 0.0, 1.0);
    segments[1].a.x += tol * 0.9;

    let loops = reconstruct(&segments, &config(tol)).unwrap();
    assert_eq!(loops.len(), 1);
    assert_eq!(loops[0].len(), 4);
}

#[test]
fn endpoint_offset_beyond_tolerance_breaks_the_loop() {
    let tol = 0.01;
    let mut segments = common::square(0.0, 0.0, 1.0);
    segments[1].a.x += tol * 1.5;

    let r = reconstruct_traced(&segments, &config(tol)).unwrap();
    assert!(r.loops.is_empty());
    assert_eq!(r.paths.len(), 2);
    assert!(r.paths.iter().all(|p| p.state == PathState::OpenDiscarded));
}

#[test]
fn square_with_perturbed_endpoints_closes() {
    let tol = 0.1;
    // Each copy of a shared corner is moved by less than tol / 2.
    let segments = [
        seg(0.03, -0.02, 1.0, 0.04),
        seg(0.98, -0.03, 1.02, 1.01),
        seg(0.97, 0.99, -0.01, 1.03),
        seg(0.02, 0.97, -0.03, 0.01),
    ];
    let loops = reconstruct(&segments, &config(tol)).unwrap();
    assert_eq!(loops.len(), 1);
    assert_eq!(loops[0].len(), 4);
}

#[test]
fn reconstruction_is_deterministic() {
    let segments = common::jittered_squares(500, 0.002);
    let cfg = config(0.01);
    let first = reconstruct(&segments, &cfg).unwrap();
    let second = reconstruct(&segments, &cfg).unwrap();
    assert_eq!(first, second);
}

#[test]
fn every_segment_is_consumed_exactly_once() {
    let mut segments = common::jittered_squares(200, 0.002);
    // Dangling pieces and a junction spur.
    segments.push(seg(100.0, 100.0, 101.0, 100.0));
    segments.push(seg(f64::NAN, 0.0, 1.0, 1.0));
    segments.push(seg(1.0, 0.0, 1.5, -0.5));

    let r = reconstruct_traced(&segments, &config(0.01)).unwrap();
    let mut seen = vec![0_u32; segments.len()];
    for path in &r.paths {
        for &s in &path.segments {
            seen[s] += 1;
        }
    }
    assert!(seen.iter().all(|&n| n == 1), "coverage violated: {seen:?}");
}

#[test]
fn jittered_grid_recovers_every_square() {
    let segments = common::jittered_squares(1_000, 0.003);
    let loops = reconstruct(&segments, &config(0.01)).unwrap();
    assert_eq!(loops.len(), 1_000);
    assert!(loops.iter().all(|l| l.len() == 4));
}

#[test]
fn lookup_work_grows_linearly() {
    let cfg = config(0.01);
    let small = reconstruct_traced(&common::jittered_squares(2_500, 0.003), &cfg).unwrap();
    let large = reconstruct_traced(&common::jittered_squares(25_000, 0.003), &cfg).unwrap();

    assert_eq!(small.loops.len(), 2_500);
    assert_eq!(large.loops.len(), 25_000);

    #[allow(clippy::cast_precision_loss)]
    let ratio =
        large.stats.candidates_examined as f64 / small.stats.candidates_examined as f64;
    // 10x the segments; a quadratic scan would show ~100x.
    assert!(ratio < 15.0, "candidate ratio {ratio} suggests superlinear lookups");
}
