//! Geometry helpers: ellipses, rounded rectangles and elliptical arcs as cubics
//!
//! Everything here works in the node's local user space; no transform is
//! applied yet.

use std::f64::consts::{FRAC_PI_2, TAU};

use glam::{DVec2, dvec2};

use super::defaults::{ARC_EPSILON, KAPPA};
use crate::types::{Path, PathSegment, Point};

/// Axis-aligned rectangle as MoveTo + 3 LineTo + ClosePath.
pub fn rect_path(x: f64, y: f64, width: f64, height: f64) -> Path {
    Path::from_segments(vec![
        PathSegment::MoveTo(dvec2(x, y)),
        PathSegment::LineTo(dvec2(x + width, y)),
        PathSegment::LineTo(dvec2(x + width, y + height)),
        PathSegment::LineTo(dvec2(x, y + height)),
        PathSegment::ClosePath,
    ])
}

/// Rectangle with elliptical corners of radii `rx`, `ry`.
///
/// Radii must already be clamped to half the width and height. Straight
/// edges that collapse to nothing (fully rounded sides) are left out.
pub fn rounded_rect_path(x: f64, y: f64, width: f64, height: f64, rx: f64, ry: f64) -> Path {
    let (right, bottom) = (x + width, y + height);
    // Distance from a corner's tangent point to its control point
    let hx = rx * (1.0 - KAPPA);
    let hy = ry * (1.0 - KAPPA);

    let mut path = Path::new();
    path.push(PathSegment::MoveTo(dvec2(x + rx, y)));
    push_line(&mut path, dvec2(x + rx, y), dvec2(right - rx, y));
    path.push(cubic(dvec2(right - hx, y), dvec2(right, y + hy), dvec2(right, y + ry)));
    push_line(&mut path, dvec2(right, y + ry), dvec2(right, bottom - ry));
    path.push(cubic(
        dvec2(right, bottom - hy),
        dvec2(right - hx, bottom),
        dvec2(right - rx, bottom),
    ));
    push_line(&mut path, dvec2(right - rx, bottom), dvec2(x + rx, bottom));
    path.push(cubic(dvec2(x + hx, bottom), dvec2(x, bottom - hy), dvec2(x, bottom - ry)));
    push_line(&mut path, dvec2(x, bottom - ry), dvec2(x, y + ry));
    path.push(cubic(dvec2(x, y + hy), dvec2(x + hx, y), dvec2(x + rx, y)));
    path.push(PathSegment::ClosePath);
    path
}

fn push_line(path: &mut Path, from: Point, to: Point) {
    if from != to {
        path.push(PathSegment::LineTo(to));
    }
}

fn cubic(ctrl1: Point, ctrl2: Point, end: Point) -> PathSegment {
    PathSegment::CubicTo { ctrl1, ctrl2, end }
}

/// Four-cubic ellipse approximation, starting and ending at the rightmost point.
///
/// Non-positive radii disable rendering and yield an empty path.
pub fn ellipse_path(cx: f64, cy: f64, rx: f64, ry: f64) -> Path {
    if rx <= 0.0 || ry <= 0.0 {
        return Path::new();
    }
    let (kx, ky) = (rx * KAPPA, ry * KAPPA);

    Path::from_segments(vec![
        PathSegment::MoveTo(dvec2(cx + rx, cy)),
        cubic(dvec2(cx + rx, cy + ky), dvec2(cx + kx, cy + ry), dvec2(cx, cy + ry)),
        cubic(dvec2(cx - kx, cy + ry), dvec2(cx - rx, cy + ky), dvec2(cx - rx, cy)),
        cubic(dvec2(cx - rx, cy - ky), dvec2(cx - kx, cy - ry), dvec2(cx, cy - ry)),
        cubic(dvec2(cx + kx, cy - ry), dvec2(cx + rx, cy - ky), dvec2(cx + rx, cy)),
        PathSegment::ClosePath,
    ])
}

/// Convert an SVG endpoint-parameterized elliptical arc into cubic segments.
///
/// Follows the SVG implementation notes (F.6.5 / F.6.6):
/// - coincident endpoints produce no segment at all
/// - a zero radius degrades to a straight line
/// - radii too small to span the endpoints are scaled up uniformly
///
/// The sweep is split into pieces of at most 90 degrees, each approximated
/// with handle length `4/3 * tan(delta / 4)`. The final segment ends exactly
/// on `to`.
pub fn arc_to_cubics(
    from: Point,
    rx: f64,
    ry: f64,
    x_axis_rotation: f64,
    large_arc: bool,
    sweep: bool,
    to: Point,
) -> Vec<PathSegment> {
    if from.abs_diff_eq(to, ARC_EPSILON) {
        return Vec::new();
    }
    let (mut rx, mut ry) = (rx.abs(), ry.abs());
    if rx < ARC_EPSILON || ry < ARC_EPSILON {
        return vec![PathSegment::LineTo(to)];
    }

    let (sin_phi, cos_phi) = x_axis_rotation.to_radians().sin_cos();
    let rotate = |v: DVec2| dvec2(cos_phi * v.x - sin_phi * v.y, sin_phi * v.x + cos_phi * v.y);
    let unrotate = |v: DVec2| dvec2(cos_phi * v.x + sin_phi * v.y, -sin_phi * v.x + cos_phi * v.y);

    // Step 1: midpoint in the ellipse's own axes
    let p1 = unrotate((from - to) / 2.0);

    // Radii correction
    let lambda = (p1.x * p1.x) / (rx * rx) + (p1.y * p1.y) / (ry * ry);
    if lambda > 1.0 {
        let s = lambda.sqrt();
        rx *= s;
        ry *= s;
    }

    // Step 2: center in the rotated frame
    let (rx2, ry2) = (rx * rx, ry * ry);
    let numerator = rx2 * ry2 - rx2 * p1.y * p1.y - ry2 * p1.x * p1.x;
    let denominator = rx2 * p1.y * p1.y + ry2 * p1.x * p1.x;
    let mut coef = (numerator / denominator).max(0.0).sqrt();
    if large_arc == sweep {
        coef = -coef;
    }
    let center_rotated = dvec2(coef * rx * p1.y / ry, -coef * ry * p1.x / rx);

    // Step 3: back to user space
    let center = rotate(center_rotated) + (from + to) / 2.0;

    // Step 4: start angle and sweep
    let u = dvec2((p1.x - center_rotated.x) / rx, (p1.y - center_rotated.y) / ry);
    let v = dvec2((-p1.x - center_rotated.x) / rx, (-p1.y - center_rotated.y) / ry);
    let theta1 = u.y.atan2(u.x);
    let mut delta_theta = v.y.atan2(v.x) - theta1;
    if sweep && delta_theta < 0.0 {
        delta_theta += TAU;
    } else if !sweep && delta_theta > 0.0 {
        delta_theta -= TAU;
    }
    if delta_theta.abs() < ARC_EPSILON {
        return Vec::new();
    }

    let pieces = (delta_theta.abs() / FRAC_PI_2 - ARC_EPSILON).ceil().max(1.0) as usize;
    let delta = delta_theta / pieces as f64;
    let handle = 4.0 / 3.0 * (delta / 4.0).tan();

    let point_at = |angle: f64| center + rotate(dvec2(rx * angle.cos(), ry * angle.sin()));
    let tangent_at = |angle: f64| rotate(dvec2(-rx * angle.sin(), ry * angle.cos()));

    (0..pieces)
        .map(|i| {
            let a1 = theta1 + delta * i as f64;
            let a2 = a1 + delta;
            let start = if i == 0 { from } else { point_at(a1) };
            let end = if i + 1 == pieces { to } else { point_at(a2) };
            cubic(start + tangent_at(a1) * handle, end - tangent_at(a2) * handle, end)
        })
        .collect()
}
