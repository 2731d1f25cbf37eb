//! Geometry primitives shared by the whole pipeline.
//!
//! - `Transform` is a zero-cost newtype over `glam::DAffine2` exposing the
//!   six SVG coefficients `(a, b, c, d, e, f)`.
//! - `Path<S>` carries a coordinate-space marker so that user-space geometry
//!   and output-space geometry cannot be mixed without an explicit mapping.

use std::fmt;
use std::marker::PhantomData;

use glam::{DAffine2, DVec2};

/// A point (or vector) in some 2D coordinate space.
pub type Point = DVec2;

/// Determinants below this magnitude are treated as singular.
const SINGULAR_EPSILON: f64 = 1e-12;

/// Error type for invalid numeric values
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NumericError {
    /// Value is NaN
    NaN,
    /// Value is infinite
    Infinite,
    /// Linear part of a transform has (near) zero determinant
    Singular,
}

impl fmt::Display for NumericError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NumericError::NaN => write!(f, "value is NaN"),
            NumericError::Infinite => write!(f, "value is infinite"),
            NumericError::Singular => write!(f, "transform is singular"),
        }
    }
}

impl std::error::Error for NumericError {}

// ============================================================================
// Transform
// ============================================================================

/// 2D affine transform `[x', y'] = [a c; b d] * [x, y] + [e, f]`.
#[derive(Clone, Copy, Debug, PartialEq)]
#[repr(transparent)]
pub struct Transform(DAffine2);

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Transform {
    pub const IDENTITY: Transform = Transform(DAffine2::IDENTITY);

    /// Build from the SVG `matrix(a b c d e f)` coefficients.
    pub fn new(a: f64, b: f64, c: f64, d: f64, e: f64, f: f64) -> Self {
        Transform(DAffine2::from_cols_array(&[a, b, c, d, e, f]))
    }

    pub fn translate(tx: f64, ty: f64) -> Self {
        Self::new(1.0, 0.0, 0.0, 1.0, tx, ty)
    }

    pub fn scale(sx: f64, sy: f64) -> Self {
        Self::new(sx, 0.0, 0.0, sy, 0.0, 0.0)
    }

    /// Rotation by `degrees`, positive from the x axis toward the y axis.
    pub fn rotate(degrees: f64) -> Self {
        let (sin, cos) = degrees.to_radians().sin_cos();
        Self::new(cos, sin, -sin, cos, 0.0, 0.0)
    }

    /// SVG `rotate(angle cx cy)`.
    pub fn rotate_about(degrees: f64, cx: f64, cy: f64) -> Self {
        Self::translate(cx, cy)
            .pre(Self::rotate(degrees))
            .pre(Self::translate(-cx, -cy))
    }

    pub fn skew_x(degrees: f64) -> Self {
        Self::new(1.0, 0.0, degrees.to_radians().tan(), 1.0, 0.0, 0.0)
    }

    pub fn skew_y(degrees: f64) -> Self {
        Self::new(1.0, degrees.to_radians().tan(), 0.0, 1.0, 0.0, 0.0)
    }

    /// The coefficients in SVG order `[a, b, c, d, e, f]`.
    pub fn coefficients(&self) -> [f64; 6] {
        self.0.to_cols_array()
    }

    /// Transform equivalent to applying `child` first, then `parent`.
    pub fn compose(parent: &Transform, child: &Transform) -> Transform {
        Transform(parent.0 * child.0)
    }

    /// `self` applied after `inner` (i.e. `compose(self, inner)`).
    pub fn pre(self, inner: Transform) -> Transform {
        Transform::compose(&self, &inner)
    }

    pub fn apply(&self, point: Point) -> Point {
        self.0.transform_point2(point)
    }

    /// Map a direction vector (translation ignored).
    pub fn apply_vector(&self, vector: Point) -> Point {
        self.0.transform_vector2(vector)
    }

    /// Map every control and end point of a segment. `ClosePath` is unchanged.
    pub fn apply_to_segment(&self, segment: PathSegment) -> PathSegment {
        match segment {
            PathSegment::MoveTo(p) => PathSegment::MoveTo(self.apply(p)),
            PathSegment::LineTo(p) => PathSegment::LineTo(self.apply(p)),
            PathSegment::CubicTo { ctrl1, ctrl2, end } => PathSegment::CubicTo {
                ctrl1: self.apply(ctrl1),
                ctrl2: self.apply(ctrl2),
                end: self.apply(end),
            },
            PathSegment::ClosePath => PathSegment::ClosePath,
        }
    }

    /// Map a path without changing its coordinate space.
    pub fn apply_to_path<S>(&self, path: &Path<S>) -> Path<S> {
        path.map_segments(|seg| self.apply_to_segment(seg))
    }

    pub fn determinant(&self) -> f64 {
        self.0.matrix2.determinant()
    }

    pub fn is_identity(&self) -> bool {
        self.0 == DAffine2::IDENTITY
    }

    pub fn approx_eq(&self, other: &Transform, max_abs_diff: f64) -> bool {
        self.0.abs_diff_eq(other.0, max_abs_diff)
    }

    /// Effective uniform scale of the linear part: the geometric mean of its
    /// singular values, `sqrt(|det|)`.
    ///
    /// Used to scale stroke widths and dash lengths. Fails with
    /// `NumericError::Singular` when the linear part collapses the plane.
    pub fn decompose_scale(&self) -> Result<f64, NumericError> {
        let det = self.determinant();
        if det.is_nan() {
            return Err(NumericError::NaN);
        }
        if det.is_infinite() {
            return Err(NumericError::Infinite);
        }
        if det.abs() < SINGULAR_EPSILON {
            return Err(NumericError::Singular);
        }
        Ok(det.abs().sqrt())
    }

    /// Angle in degrees of the mapped x axis.
    pub fn rotation_degrees(&self) -> f64 {
        let axis = self.apply_vector(DVec2::X);
        axis.y.atan2(axis.x).to_degrees()
    }
}

impl std::ops::Mul for Transform {
    type Output = Transform;

    fn mul(self, rhs: Transform) -> Transform {
        Transform::compose(&self, &rhs)
    }
}

impl fmt::Display for Transform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [a, b, c, d, e, g] = self.coefficients();
        write!(f, "matrix({a} {b} {c} {d} {e} {g})")
    }
}

// ============================================================================
// Paths
// ============================================================================

/// One normalized drawing instruction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PathSegment {
    MoveTo(Point),
    LineTo(Point),
    CubicTo { ctrl1: Point, ctrl2: Point, end: Point },
    ClosePath,
}

impl PathSegment {
    /// End point of the segment, if it has one.
    pub fn end_point(&self) -> Option<Point> {
        match *self {
            PathSegment::MoveTo(p) | PathSegment::LineTo(p) => Some(p),
            PathSegment::CubicTo { end, .. } => Some(end),
            PathSegment::ClosePath => None,
        }
    }
}

/// Marker for a node's own (local) user coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct UserSpace;

/// Marker for final output coordinates (flipped, in output units, scaled).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct OutputSpace;

/// Ordered sequence of segments. Every subpath starts with `MoveTo`.
#[derive(Debug, Clone, PartialEq)]
pub struct Path<S = UserSpace> {
    segments: Vec<PathSegment>,
    space: PhantomData<S>,
}

impl<S> Default for Path<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S> Path<S> {
    pub fn new() -> Self {
        Self {
            segments: Vec::new(),
            space: PhantomData,
        }
    }

    pub fn from_segments(segments: Vec<PathSegment>) -> Self {
        Self {
            segments,
            space: PhantomData,
        }
    }

    pub fn segments(&self) -> &[PathSegment] {
        &self.segments
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub(crate) fn push(&mut self, segment: PathSegment) {
        self.segments.push(segment);
    }

    /// True if the last segment closes its subpath.
    pub fn is_closed(&self) -> bool {
        matches!(self.segments.last(), Some(PathSegment::ClosePath))
    }

    /// Checks the subpath invariant: the path starts with `MoveTo` and
    /// `ClosePath` never directly follows another `ClosePath`.
    pub fn is_well_formed(&self) -> bool {
        let mut open = false;
        for segment in &self.segments {
            match segment {
                PathSegment::MoveTo(_) => open = true,
                PathSegment::ClosePath if open => open = false,
                _ if open => {}
                _ => return false,
            }
        }
        true
    }

    pub(crate) fn map_segments<T>(&self, f: impl Fn(PathSegment) -> PathSegment) -> Path<T> {
        Path {
            segments: self.segments.iter().map(|seg| f(*seg)).collect(),
            space: PhantomData,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::dvec2;

    /// Small deterministic generator so the property checks are reproducible.
    struct XorShift(u64);

    impl XorShift {
        fn next_f64(&mut self) -> f64 {
            self.0 ^= self.0 << 13;
            self.0 ^= self.0 >> 7;
            self.0 ^= self.0 << 17;
            (self.0 >> 11) as f64 / (1u64 << 53) as f64
        }

        fn range(&mut self, lo: f64, hi: f64) -> f64 {
            lo + (hi - lo) * self.next_f64()
        }

        fn invertible_transform(&mut self) -> Transform {
            loop {
                let t = Transform::new(
                    self.range(-3.0, 3.0),
                    self.range(-3.0, 3.0),
                    self.range(-3.0, 3.0),
                    self.range(-3.0, 3.0),
                    self.range(-50.0, 50.0),
                    self.range(-50.0, 50.0),
                );
                if t.determinant().abs() > 0.1 {
                    return t;
                }
            }
        }
    }

    fn sample_transforms() -> Vec<Transform> {
        vec![
            Transform::IDENTITY,
            Transform::translate(3.0, -7.5),
            Transform::scale(2.0, 0.5),
            Transform::rotate(33.0),
            Transform::rotate_about(90.0, 10.0, 20.0),
            Transform::skew_x(15.0),
            Transform::new(1.5, 0.2, -0.3, 0.8, 12.0, -4.0),
        ]
    }

    #[test]
    fn identity_is_the_unit_of_composition() {
        for t in sample_transforms() {
            assert_eq!(Transform::compose(&Transform::IDENTITY, &t), t);
            assert_eq!(Transform::compose(&t, &Transform::IDENTITY), t);
        }
    }

    #[test]
    fn composition_is_associative() {
        let mut rng = XorShift(0x9E37_79B9_7F4A_7C15);
        for _ in 0..200 {
            let a = rng.invertible_transform();
            let b = rng.invertible_transform();
            let c = rng.invertible_transform();
            let left = Transform::compose(&Transform::compose(&a, &b), &c);
            let right = Transform::compose(&a, &Transform::compose(&b, &c));
            assert!(left.approx_eq(&right, 1e-9), "{left} != {right}");
        }
    }

    #[test]
    fn composition_applies_child_first() {
        let parent = Transform::translate(10.0, 0.0);
        let child = Transform::scale(2.0, 2.0);
        let p = Transform::compose(&parent, &child).apply(dvec2(1.0, 1.0));
        assert_eq!(p, dvec2(12.0, 2.0));

        let p = Transform::compose(&child, &parent).apply(dvec2(1.0, 1.0));
        assert_eq!(p, dvec2(22.0, 2.0));
    }

    #[test]
    fn coefficients_follow_svg_order() {
        let t = Transform::new(1.0, 2.0, 3.0, 4.0, 5.0, 6.0);
        assert_eq!(t.coefficients(), [1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
        // x' = a*x + c*y + e, y' = b*x + d*y + f
        assert_eq!(t.apply(dvec2(1.0, 1.0)), dvec2(9.0, 12.0));
        assert_eq!(t.apply_vector(dvec2(1.0, 1.0)), dvec2(4.0, 6.0));
    }

    #[test]
    fn rotate_about_keeps_the_center_fixed() {
        let t = Transform::rotate_about(90.0, 10.0, 20.0);
        let c = t.apply(dvec2(10.0, 20.0));
        assert!((c - dvec2(10.0, 20.0)).length() < 1e-12);
        let p = t.apply(dvec2(11.0, 20.0));
        assert!((p - dvec2(10.0, 21.0)).length() < 1e-12);
    }

    #[test]
    fn identity_leaves_paths_untouched() {
        let path: Path = Path::from_segments(vec![
            PathSegment::MoveTo(dvec2(0.1, 0.2)),
            PathSegment::LineTo(dvec2(1e-7, -3.25)),
            PathSegment::CubicTo {
                ctrl1: dvec2(1.0 / 3.0, 2.0),
                ctrl2: dvec2(-0.0, 9.75),
                end: dvec2(123456.789, 0.3),
            },
            PathSegment::ClosePath,
        ]);
        assert_eq!(Transform::IDENTITY.apply_to_path(&path), path);
    }

    #[test]
    fn close_path_is_transform_invariant() {
        let t = Transform::new(2.0, 1.0, 0.5, 3.0, 7.0, 8.0);
        assert_eq!(t.apply_to_segment(PathSegment::ClosePath), PathSegment::ClosePath);
    }

    #[test]
    fn decompose_scale_multiplies_through_nesting() {
        let outer = Transform::scale(2.0, 2.0);
        let inner = Transform::scale(3.0, 3.0);
        let scale = Transform::compose(&outer, &inner).decompose_scale().unwrap();
        assert!((scale - 6.0).abs() < 1e-12);

        // Rotation and reflection do not change the effective scale
        let rotated = Transform::compose(&Transform::rotate(37.0), &Transform::scale(4.0, -4.0));
        assert!((rotated.decompose_scale().unwrap() - 4.0).abs() < 1e-12);
    }

    #[test]
    fn decompose_scale_rejects_singular_transforms() {
        let flat = Transform::scale(1.0, 0.0);
        assert_eq!(flat.decompose_scale(), Err(NumericError::Singular));

        let rank_one = Transform::new(1.0, 2.0, 2.0, 4.0, 0.0, 0.0);
        assert_eq!(rank_one.decompose_scale(), Err(NumericError::Singular));

        let nan = Transform::new(f64::NAN, 0.0, 0.0, 1.0, 0.0, 0.0);
        assert_eq!(nan.decompose_scale(), Err(NumericError::NaN));
    }

    #[test]
    fn well_formed_paths() {
        let ok: Path = Path::from_segments(vec![
            PathSegment::MoveTo(dvec2(0.0, 0.0)),
            PathSegment::LineTo(dvec2(1.0, 0.0)),
            PathSegment::ClosePath,
            PathSegment::MoveTo(dvec2(5.0, 5.0)),
            PathSegment::LineTo(dvec2(6.0, 5.0)),
        ]);
        assert!(ok.is_well_formed());
        assert!(!ok.is_closed());

        let bad: Path = Path::from_segments(vec![PathSegment::LineTo(dvec2(1.0, 0.0))]);
        assert!(!bad.is_well_formed());
    }
}
