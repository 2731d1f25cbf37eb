//! Drawable primitive kinds
//!
//! Each primitive knows how to reduce itself to a canonical `Path` in its
//! own user space. Dispatch over the closed set of kinds goes through
//! `enum_dispatch`, so there is one `outline` per kind and no tag checks.

use enum_dispatch::enum_dispatch;
use glam::dvec2;

use super::geometry::{ellipse_path, rect_path, rounded_rect_path};
use super::path_builder::PathBuilder;
use crate::errors::PathDataError;
use crate::parse::parse_path_data;
use crate::types::{Path, PathSegment, Point};

/// Common behavior for all primitives
#[enum_dispatch]
pub trait Outline {
    /// Canonical segments in local coordinates (no transform applied).
    ///
    /// `node` names the owning node in diagnostics.
    fn outline(&self, node: &str) -> Result<Path, PathDataError>;

    /// SVG element name of the primitive.
    fn tag(&self) -> &'static str;
}

#[enum_dispatch(Outline)]
#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    PathData,
    Rect,
    Circle,
    Ellipse,
    Line,
    Polyline,
    Polygon,
}

/// Raw `d` attribute of a `<path>`, parsed on demand.
#[derive(Debug, Clone, PartialEq)]
pub struct PathData {
    pub d: String,
}

impl PathData {
    pub fn new(d: impl Into<String>) -> Self {
        Self { d: d.into() }
    }
}

impl Outline for PathData {
    fn outline(&self, node: &str) -> Result<Path, PathDataError> {
        let instructions = parse_path_data(node, &self.d)?;
        Ok(PathBuilder::build(&instructions))
    }

    fn tag(&self) -> &'static str {
        "path"
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub rx: Option<f64>,
    pub ry: Option<f64>,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
            rx: None,
            ry: None,
        }
    }

    pub fn with_radii(mut self, rx: Option<f64>, ry: Option<f64>) -> Self {
        self.rx = rx;
        self.ry = ry;
        self
    }

    /// Effective corner radii: a missing one copies the other, both are
    /// clamped to half the corresponding side.
    pub fn corner_radii(&self) -> (f64, f64) {
        let valid = |r: Option<f64>| r.filter(|r| *r > 0.0);
        let (rx, ry) = match (valid(self.rx), valid(self.ry)) {
            (Some(rx), Some(ry)) => (rx, ry),
            (Some(r), None) | (None, Some(r)) => (r, r),
            (None, None) => (0.0, 0.0),
        };
        (rx.min(self.width / 2.0), ry.min(self.height / 2.0))
    }
}

impl Outline for Rect {
    fn outline(&self, _node: &str) -> Result<Path, PathDataError> {
        if self.width <= 0.0 || self.height <= 0.0 {
            return Ok(Path::new());
        }
        let (rx, ry) = self.corner_radii();
        if rx > 0.0 && ry > 0.0 {
            Ok(rounded_rect_path(self.x, self.y, self.width, self.height, rx, ry))
        } else {
            Ok(rect_path(self.x, self.y, self.width, self.height))
        }
    }

    fn tag(&self) -> &'static str {
        "rect"
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Circle {
    pub cx: f64,
    pub cy: f64,
    pub r: f64,
}

impl Outline for Circle {
    fn outline(&self, _node: &str) -> Result<Path, PathDataError> {
        Ok(ellipse_path(self.cx, self.cy, self.r, self.r))
    }

    fn tag(&self) -> &'static str {
        "circle"
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Ellipse {
    pub cx: f64,
    pub cy: f64,
    pub rx: f64,
    pub ry: f64,
}

impl Outline for Ellipse {
    fn outline(&self, _node: &str) -> Result<Path, PathDataError> {
        Ok(ellipse_path(self.cx, self.cy, self.rx, self.ry))
    }

    fn tag(&self) -> &'static str {
        "ellipse"
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Line {
    pub from: Point,
    pub to: Point,
}

impl Line {
    pub fn new(x1: f64, y1: f64, x2: f64, y2: f64) -> Self {
        Self {
            from: dvec2(x1, y1),
            to: dvec2(x2, y2),
        }
    }
}

impl Outline for Line {
    fn outline(&self, _node: &str) -> Result<Path, PathDataError> {
        Ok(Path::from_segments(vec![
            PathSegment::MoveTo(self.from),
            PathSegment::LineTo(self.to),
        ]))
    }

    fn tag(&self) -> &'static str {
        "line"
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Polyline {
    pub points: Vec<Point>,
}

impl Outline for Polyline {
    fn outline(&self, _node: &str) -> Result<Path, PathDataError> {
        Ok(polyline_path(&self.points, false))
    }

    fn tag(&self) -> &'static str {
        "polyline"
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Polygon {
    pub points: Vec<Point>,
}

impl Outline for Polygon {
    fn outline(&self, _node: &str) -> Result<Path, PathDataError> {
        Ok(polyline_path(&self.points, true))
    }

    fn tag(&self) -> &'static str {
        "polygon"
    }
}

fn polyline_path(points: &[Point], close: bool) -> Path {
    let Some((first, rest)) = points.split_first() else {
        return Path::new();
    };
    let mut segments = Vec::with_capacity(points.len() + 1);
    segments.push(PathSegment::MoveTo(*first));
    segments.extend(rest.iter().map(|p| PathSegment::LineTo(*p)));
    if close {
        segments.push(PathSegment::ClosePath);
    }
    Path::from_segments(segments)
}
