//! Angular coverage of a sampling disk clipped by a rectangular study area.
//!
//! A disk of radius `r` centered at a vertex is split into four quadrants, one
//! per corner of the study area. For each quadrant the two perpendicular edge
//! distances decide how much of the quarter-disk arc stays inside. Summing the
//! four quadrants gives the coverage `b ∈ [0, 2π]`; `2π` means unclipped.
//!
//! All inputs are in bin units (already discretized), matching the density
//! model that consumes them.

use std::f64::consts::FRAC_PI_2;

/// Angle (radians) of the quarter-disk arc of radius `r` that lies inside the
/// quadrant bounded by edges at distances `dx` and `dy`.
///
/// Result is in `[0, π/2]` for non-negative inputs.
pub fn circle_segment(dx: f64, dy: f64, r: f64) -> f64 {
    if dx >= r && dy >= r {
        FRAC_PI_2
    } else if dx.hypot(dy) <= r {
        0.0
    } else {
        let alpha1 = if dx < r { (dx / r).min(1.0).acos() } else { 0.0 };
        let alpha2 = if dy < r { (dy / r).min(1.0).asin() } else { FRAC_PI_2 };
        (alpha2 - alpha1).abs()
    }
}

/// Total coverage of a disk of radius `r` given the edge distances
/// `[left, right, bottom, top]` of its center.
///
/// Quadrants are visited counterclockwise from the upper right; each call
/// receives its two edges in the orientation that keeps the arc measure
/// consistent across quadrants.
pub fn disk_coverage(edges: [f64; 4], r: f64) -> f64 {
    let [left, right, bottom, top] = edges;
    circle_segment(right, top, r)
        + circle_segment(bottom, right, r)
        + circle_segment(left, bottom, r)
        + circle_segment(top, left, r)
}
