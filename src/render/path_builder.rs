//! Path builder for SVG path data.
//!
//! A small state machine that resolves parsed path instructions into the
//! canonical segment set (move, line, cubic, close) in absolute coordinates.
//!
//! # Key Concepts
//!
//! - **current point**: where the pen is; relative commands are offsets from it
//! - **subpath start**: where `Z` returns the pen to
//! - **previous control point**: only remembered across like-kind curves, so
//!   `S` reflects a `C`/`S` control point and `T` reflects a `Q`/`T` one
//! - **open subpath**: a drawing command with no open subpath (at the very
//!   start, or right after `Z`) first emits an implicit `MoveTo`

use crate::parse::{PathCommand, PathInstruction};
use crate::types::{Path, PathSegment, Point};

use super::geometry::arc_to_cubics;

/// Control point carried over for the smooth curve variants.
#[derive(Debug, Clone, Copy, PartialEq)]
enum PreviousControl {
    None,
    /// Second control point of the last `C`/`S`
    Cubic(Point),
    /// Control point of the last `Q`/`T`
    Quad(Point),
}

#[derive(Debug)]
pub struct PathBuilder {
    path: Path,
    current: Point,
    subpath_start: Point,
    previous: PreviousControl,
    open: bool,
}

impl Default for PathBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl PathBuilder {
    pub fn new() -> Self {
        Self {
            path: Path::new(),
            current: Point::ZERO,
            subpath_start: Point::ZERO,
            previous: PreviousControl::None,
            open: false,
        }
    }

    /// Build a path from a full instruction list.
    pub fn build(instructions: &[PathInstruction]) -> Path {
        let mut builder = Self::new();
        for instruction in instructions {
            builder.push(*instruction);
        }
        builder.finish()
    }

    pub fn finish(self) -> Path {
        self.path
    }

    fn resolve(&self, point: Point, relative: bool) -> Point {
        if relative { self.current + point } else { point }
    }

    fn ensure_open(&mut self) {
        if !self.open {
            self.path.push(PathSegment::MoveTo(self.current));
            self.subpath_start = self.current;
            self.open = true;
        }
    }

    fn line_to(&mut self, to: Point) {
        self.ensure_open();
        self.path.push(PathSegment::LineTo(to));
        self.current = to;
        self.previous = PreviousControl::None;
    }

    fn cubic_to(&mut self, ctrl1: Point, ctrl2: Point, to: Point) {
        self.ensure_open();
        self.path.push(PathSegment::CubicTo {
            ctrl1,
            ctrl2,
            end: to,
        });
        self.current = to;
        self.previous = PreviousControl::Cubic(ctrl2);
    }

    /// Degree elevation: a quadratic is an exact cubic.
    fn quad_to(&mut self, ctrl: Point, to: Point) {
        let from = self.current;
        let ctrl1 = from + (ctrl - from) * (2.0 / 3.0);
        let ctrl2 = to + (ctrl - to) * (2.0 / 3.0);
        self.cubic_to(ctrl1, ctrl2, to);
        self.previous = PreviousControl::Quad(ctrl);
    }

    /// Reflection of a previous control point about the current point.
    fn reflect(&self, control: Point) -> Point {
        self.current * 2.0 - control
    }

    pub fn push(&mut self, instruction: PathInstruction) {
        let PathInstruction { command, relative } = instruction;
        match command {
            PathCommand::MoveTo { to } => {
                let to = self.resolve(to, relative);
                self.path.push(PathSegment::MoveTo(to));
                self.current = to;
                self.subpath_start = to;
                self.open = true;
                self.previous = PreviousControl::None;
            }
            PathCommand::LineTo { to } => {
                let to = self.resolve(to, relative);
                self.line_to(to);
            }
            PathCommand::Horizontal { x } => {
                let x = if relative { self.current.x + x } else { x };
                self.line_to(Point::new(x, self.current.y));
            }
            PathCommand::Vertical { y } => {
                let y = if relative { self.current.y + y } else { y };
                self.line_to(Point::new(self.current.x, y));
            }
            PathCommand::CurveTo { ctrl1, ctrl2, to } => {
                let ctrl1 = self.resolve(ctrl1, relative);
                let ctrl2 = self.resolve(ctrl2, relative);
                let to = self.resolve(to, relative);
                self.cubic_to(ctrl1, ctrl2, to);
            }
            PathCommand::SmoothCurveTo { ctrl2, to } => {
                let ctrl1 = match self.previous {
                    PreviousControl::Cubic(control) => self.reflect(control),
                    _ => self.current,
                };
                let ctrl2 = self.resolve(ctrl2, relative);
                let to = self.resolve(to, relative);
                self.cubic_to(ctrl1, ctrl2, to);
            }
            PathCommand::QuadTo { ctrl, to } => {
                let ctrl = self.resolve(ctrl, relative);
                let to = self.resolve(to, relative);
                self.quad_to(ctrl, to);
            }
            PathCommand::SmoothQuadTo { to } => {
                let ctrl = match self.previous {
                    PreviousControl::Quad(control) => self.reflect(control),
                    _ => self.current,
                };
                let to = self.resolve(to, relative);
                self.quad_to(ctrl, to);
            }
            PathCommand::ArcTo {
                rx,
                ry,
                x_axis_rotation,
                large_arc,
                sweep,
                to,
            } => {
                let to = self.resolve(to, relative);
                let segments =
                    arc_to_cubics(self.current, rx, ry, x_axis_rotation, large_arc, sweep, to);
                if !segments.is_empty() {
                    self.ensure_open();
                    for segment in segments {
                        self.path.push(segment);
                    }
                }
                self.current = to;
                self.previous = PreviousControl::None;
            }
            PathCommand::ClosePath => {
                if self.open {
                    self.path.push(PathSegment::ClosePath);
                    self.open = false;
                }
                self.current = self.subpath_start;
                self.previous = PreviousControl::None;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::parse_path_data;
    use glam::dvec2;

    fn build(d: &str) -> Path {
        let instructions = parse_path_data("test", d).expect("path data should parse");
        PathBuilder::build(&instructions)
    }

    #[test]
    fn relative_commands_resolve_against_the_pen() {
        let path = build("m10 10 l5 0 h5 v5 z");
        assert_eq!(
            path.segments(),
            &[
                PathSegment::MoveTo(dvec2(10.0, 10.0)),
                PathSegment::LineTo(dvec2(15.0, 10.0)),
                PathSegment::LineTo(dvec2(20.0, 10.0)),
                PathSegment::LineTo(dvec2(20.0, 15.0)),
                PathSegment::ClosePath,
            ]
        );
    }

    #[test]
    fn drawing_after_close_starts_a_new_subpath_at_the_start_point() {
        let path = build("M1 1 L5 1 Z l0 4");
        assert_eq!(
            &path.segments()[3..],
            &[
                PathSegment::MoveTo(dvec2(1.0, 1.0)),
                PathSegment::LineTo(dvec2(1.0, 5.0)),
            ]
        );
        assert!(path.is_well_formed());
    }

    #[test]
    fn relative_moveto_after_close_uses_the_subpath_start() {
        let path = build("M10 10 l5 5 z m1 1");
        assert_eq!(path.segments()[3], PathSegment::MoveTo(dvec2(11.0, 11.0)));
    }

    #[test]
    fn smooth_cubic_reflects_previous_control() {
        let path = build("M0 0 C0 10 10 10 10 0 S20 -10 20 0");
        assert_eq!(
            path.segments()[2],
            PathSegment::CubicTo {
                ctrl1: dvec2(10.0, -10.0),
                ctrl2: dvec2(20.0, -10.0),
                end: dvec2(20.0, 0.0),
            }
        );
    }

    #[test]
    fn smooth_cubic_without_previous_curve_uses_current_point() {
        let path = build("M0 0 L10 0 S20 10 30 0");
        let PathSegment::CubicTo { ctrl1, .. } = path.segments()[2] else {
            panic!("expected cubic");
        };
        assert_eq!(ctrl1, dvec2(10.0, 0.0));
    }

    #[test]
    fn smooth_quad_only_reflects_quads() {
        // After a cubic, T has no control point to reflect
        let path = build("M0 0 C0 10 10 10 10 0 T20 0");
        let PathSegment::CubicTo { ctrl1, ctrl2, end } = path.segments()[2] else {
            panic!("expected cubic");
        };
        // A quad whose control point is the pen is a straight line
        assert_eq!(ctrl1, dvec2(10.0, 0.0));
        assert!(ctrl2.abs_diff_eq(dvec2(40.0 / 3.0, 0.0), 1e-12));
        assert_eq!(end, dvec2(20.0, 0.0));
    }

    #[test]
    fn quadratics_are_elevated_to_cubics() {
        let path = build("M0 0 Q 30 30 60 0 T 120 0");
        assert_eq!(
            path.segments()[1],
            PathSegment::CubicTo {
                ctrl1: dvec2(20.0, 20.0),
                ctrl2: dvec2(40.0, 20.0),
                end: dvec2(60.0, 0.0),
            }
        );
        // Reflected control point is (90, -30)
        assert_eq!(
            path.segments()[2],
            PathSegment::CubicTo {
                ctrl1: dvec2(80.0, -20.0),
                ctrl2: dvec2(100.0, -20.0),
                end: dvec2(120.0, 0.0),
            }
        );
    }

    #[test]
    fn arcs_continue_the_current_subpath() {
        let path = build("M0 0 A10 10 0 0 1 20 0");
        assert_eq!(path.len(), 3);
        let moves = path
            .segments()
            .iter()
            .filter(|s| matches!(s, PathSegment::MoveTo(_)))
            .count();
        assert_eq!(moves, 1);
        assert_eq!(path.segments()[2].end_point(), Some(dvec2(20.0, 0.0)));
    }

    #[test]
    fn zero_length_arc_is_dropped() {
        let path = build("M5 5 A10 10 0 0 1 5 5 L6 6");
        assert_eq!(
            path.segments(),
            &[
                PathSegment::MoveTo(dvec2(5.0, 5.0)),
                PathSegment::LineTo(dvec2(6.0, 6.0)),
            ]
        );
    }

    #[test]
    fn path_without_initial_moveto_starts_at_origin() {
        let path = build("L10 10");
        assert_eq!(path.segments()[0], PathSegment::MoveTo(dvec2(0.0, 0.0)));
        assert!(path.is_well_formed());
    }

    #[test]
    fn repeated_close_is_collapsed() {
        let path = build("M0 0 L1 1 Z Z");
        assert_eq!(path.len(), 3);
        assert!(path.is_well_formed());
    }
}
