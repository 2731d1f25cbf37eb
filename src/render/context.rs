//! Rendering context - the state threaded through the scene walk
//!
//! A `RenderContext` is a small `Copy` value. Every recursion level derives
//! its own from the parent's, so sibling subtrees never observe each other's
//! transform.

use crate::options::ConvertOptions;
use crate::scene::Scene;
use crate::types::{NumericError, OutputSpace, Path, Point, Transform, UserSpace};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderContext {
    /// Cumulative transform from the current node's user space to output space
    pub transform: Transform,
    /// Group nesting depth (0 at the document root)
    pub depth: usize,
    /// Whether the y axis is reflected at the root
    pub flip_y: bool,
    /// Output units per user unit
    pub unit_scale: f64,
    pub global_scale: f64,
    pub precision: usize,
}

impl RenderContext {
    /// Seed context for a document.
    ///
    /// The document-to-output mapping is folded into one transform, applied
    /// to user coordinates in this order: move the view box origin to 0,
    /// reflect about the view box height, convert to output units, apply the
    /// global scale.
    pub fn root(scene: &Scene, options: &ConvertOptions) -> Self {
        let view_box = scene.view_box;
        let unit_scale = scene.px_per_user_unit / options.output_unit.px_per_unit();
        let flip_y = !options.keep_source_origin;

        let mut transform = Transform::scale(options.scale, options.scale)
            .pre(Transform::scale(unit_scale, unit_scale));
        if flip_y {
            transform = transform.pre(Transform::new(1.0, 0.0, 0.0, -1.0, 0.0, view_box.height));
        }
        let transform = transform.pre(Transform::translate(-view_box.min_x, -view_box.min_y));

        Self {
            transform,
            depth: 0,
            flip_y,
            unit_scale,
            global_scale: options.scale,
            precision: options.precision,
        }
    }

    /// Context for a node with the given local transform.
    pub fn child(&self, local: &Transform) -> Self {
        Self {
            transform: Transform::compose(&self.transform, local),
            ..*self
        }
    }

    /// One group level deeper.
    pub fn nested(&self) -> Self {
        Self {
            depth: self.depth + 1,
            ..*self
        }
    }

    pub fn to_output(&self, path: &Path<UserSpace>) -> Path<OutputSpace> {
        path.map_segments(|segment| self.transform.apply_to_segment(segment))
    }

    pub fn point_to_output(&self, point: Point) -> Point {
        self.transform.apply(point)
    }

    /// Factor applied to user-space lengths (stroke widths, dashes, radii).
    ///
    /// Fails when the cumulative transform is degenerate.
    pub fn length_scale(&self) -> Result<f64, NumericError> {
        self.transform.decompose_scale()
    }
}
