//! TikZ rendering of a scene graph
//!
//! This module is organized into submodules:
//! - `defaults`: constants and default settings
//! - `context`: the immutable `RenderContext` threaded through the walk
//! - `shapes`: primitive kinds and their canonical outlines
//! - `geometry`: ellipse, rounded rectangle and arc approximations
//! - `path_builder`: path-data state machine
//! - `style`: style bags to TikZ options, color definitions
//! - `tikz`: number formatting and command emission
//!
//! The walk is depth-first in document order. Every call gets its own
//! context value; the only state shared across calls is the output text and
//! the collected color definitions.

pub mod context;
pub mod defaults;
pub mod geometry;
pub mod path_builder;
pub mod shapes;
pub mod style;
pub mod tikz;

pub use context::RenderContext;
pub use style::{ColorTable, Rgb};

use std::collections::HashSet;
use std::ptr;

use crate::errors::{ConvertError, DocumentError};
use crate::log;
use crate::options::ConvertOptions;
use crate::scene::{Group, Image, NodeKind, Scene, ShapeNode, TextNode};
use glam::DVec2;
use shapes::{Outline, Shape};
use style::{StyleResolver, StyleTarget};
use tikz::TikzWriter;

/// Result of rendering a scene, before templating.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Rendered {
    /// Drawing commands in document order
    pub code: String,
    /// `\definecolor` lines for the custom colors the code uses
    pub color_definitions: String,
}

/// Render a scene with the standard SVG color names.
pub fn render(scene: &Scene, options: &ConvertOptions) -> Result<Rendered, ConvertError> {
    render_with_colors(scene, options, &ColorTable::svg())
}

/// Render a scene resolving color names through `colors`.
pub fn render_with_colors(
    scene: &Scene,
    options: &ConvertOptions,
    colors: &ColorTable,
) -> Result<Rendered, ConvertError> {
    let mut leads_to_selection = HashSet::new();
    if options.selection.is_some() {
        for root in &scene.roots {
            mark_selection_ancestors(root, options, &mut leads_to_selection);
        }
    }
    let mut walker = Walker {
        options,
        leads_to_selection,
        styles: StyleResolver::new(colors, options),
        writer: TikzWriter::new(options),
    };
    let ctx = RenderContext::root(scene, options);
    let code = walker.walk_nodes(&scene.roots, ctx, false)?;
    Ok(Rendered {
        code,
        color_definitions: walker.styles.color_definitions(),
    })
}

struct Walker<'a> {
    options: &'a ConvertOptions,
    /// Unselected groups with a selected node below them
    leads_to_selection: HashSet<*const ShapeNode>,
    styles: StyleResolver<'a>,
    writer: TikzWriter<'a>,
}

impl Walker<'_> {
    /// `in_selection` is true when an ancestor is selected.
    fn walk_nodes(
        &mut self,
        nodes: &[ShapeNode],
        ctx: RenderContext,
        in_selection: bool,
    ) -> Result<String, ConvertError> {
        let mut code = String::new();
        for node in nodes {
            code.push_str(&self.walk_node(node, ctx, in_selection)?);
        }
        Ok(code)
    }

    fn walk_node(
        &mut self,
        node: &ShapeNode,
        ctx: RenderContext,
        in_selection: bool,
    ) -> Result<String, ConvertError> {
        if node.hidden {
            log::debug!(node = node.label(), "skipping hidden node");
            return Ok(String::new());
        }

        let selected = in_selection || self.options.is_selected(node.id.as_deref());
        if !selected && !self.leads_to_selection.contains(&ptr::from_ref(node)) {
            return Ok(String::new());
        }

        let ctx = ctx.child(&node.transform);
        let length_scale = match ctx.length_scale() {
            Ok(scale) => scale,
            Err(err) => {
                log::debug!(node = node.label(), %err, "skipping node with degenerate transform");
                return Ok(String::new());
            }
        };

        match &node.kind {
            NodeKind::Group(group) => self.walk_group(node, group, ctx, length_scale, selected),
            // Only groups can hold selected descendants
            _ if !selected => Ok(String::new()),
            NodeKind::Shape(shape) => self.emit_shape(node, shape, ctx, length_scale),
            NodeKind::Text(text) => Ok(self.emit_text(node, text, ctx)),
            NodeKind::Image(image) => Ok(self.emit_image(node, image, ctx)),
            NodeKind::Unsupported(tag) => {
                log::debug!(node = node.label(), tag = tag.as_str(), "skipping unsupported element");
                Ok(String::new())
            }
        }
    }

    fn walk_group(
        &mut self,
        node: &ShapeNode,
        group: &Group,
        ctx: RenderContext,
        length_scale: f64,
        selected: bool,
    ) -> Result<String, ConvertError> {
        if ctx.depth >= defaults::MAX_DEPTH {
            return Err(DocumentError::NestingTooDeep {
                limit: defaults::MAX_DEPTH,
            }
            .into());
        }

        let body = self.walk_nodes(&group.children, ctx.nested(), selected)?;
        if body.is_empty() {
            return Ok(String::new());
        }

        let mut options = self.styles.resolve(&node.style, StyleTarget::Group, length_scale);
        if options.iter().any(|option| option.contains("opacity")) {
            options.push("transparency group".to_string());
        }
        Ok(self
            .writer
            .scope(ctx.depth, &options, node.id.as_deref(), &body))
    }

    fn emit_shape(
        &mut self,
        node: &ShapeNode,
        shape: &Shape,
        ctx: RenderContext,
        length_scale: f64,
    ) -> Result<String, ConvertError> {
        let outline = shape.outline(node.label())?;
        if outline.is_empty() {
            log::debug!(node = node.label(), "shape has no geometry");
            return Ok(String::new());
        }

        let options = self.styles.resolve(&node.style, StyleTarget::Shape, length_scale);
        let path = ctx.to_output(&outline);
        Ok(self.writer.node_comment(ctx.depth, node.id.as_deref())
            + &self.writer.path(ctx.depth, &options, &path))
    }

    fn emit_text(&mut self, node: &ShapeNode, text: &TextNode, ctx: RenderContext) -> String {
        if self.options.notext || text.content.is_empty() {
            return String::new();
        }

        // Text keeps its size; only the anchor point and the rotation follow
        // the transform
        let mut options = self.styles.resolve(&node.style, StyleTarget::Text, 1.0);
        if !options.iter().any(|option| option.starts_with("anchor=")) {
            options.push("anchor=south west".to_string());
        }
        let rotation = tikz::format_number(ctx.transform.rotation_degrees(), ctx.precision);
        if rotation != "0" {
            options.push(format!("rotate={rotation}"));
        }

        let position = ctx.point_to_output(text.position);
        let texmode = text.texmode.unwrap_or(self.options.texmode);
        self.writer.node_comment(ctx.depth, node.id.as_deref())
            + &self.writer.text_node(
                ctx.depth,
                &options,
                node.id.as_deref(),
                position,
                &text.content,
                texmode,
            )
    }

    fn emit_image(&mut self, node: &ShapeNode, image: &Image, ctx: RenderContext) -> String {
        let comment = self.writer.node_comment(ctx.depth, node.id.as_deref());
        if image.href.starts_with("data:") {
            log::warn!(node = node.label(), "embedded image data is not supported");
            return comment + &self.writer.skipped_image(ctx.depth, node.id.as_deref());
        }

        let href = match &self.options.remove_absolute {
            Some(prefix) => image.href.strip_prefix(prefix.as_str()).unwrap_or(&image.href),
            None => image.href.as_str(),
        };
        let top_left = ctx.point_to_output(DVec2::new(image.x, image.y));
        let size = DVec2::new(
            ctx.transform.apply_vector(DVec2::new(image.width, 0.0)).length(),
            ctx.transform.apply_vector(DVec2::new(0.0, image.height)).length(),
        );
        comment
            + &self
                .writer
                .image_node(ctx.depth, node.id.as_deref(), top_left, size, href)
    }
}

/// Post-order pass recording every visible group that holds a selected
/// node. Returns whether `node` is or holds one.
fn mark_selection_ancestors(
    node: &ShapeNode,
    options: &ConvertOptions,
    marked: &mut HashSet<*const ShapeNode>,
) -> bool {
    if node.hidden {
        return false;
    }
    let mut found = options.is_selected(node.id.as_deref());
    if let NodeKind::Group(group) = &node.kind {
        for child in &group.children {
            found |= mark_selection_ancestors(child, options, marked);
        }
        if found {
            marked.insert(ptr::from_ref(node));
        }
    }
    found
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::shapes::{Circle, Line, PathData, Rect};
    use crate::scene::Group;
    use crate::types::Transform;
    use crate::units::Unit;

    /// Pixel output, no indentation, no color noise.
    fn px_options() -> ConvertOptions {
        ConvertOptions::default()
            .with_output_unit(Unit::Px)
            .with_indent(false)
    }

    fn code(scene: &Scene, options: &ConvertOptions) -> String {
        render(scene, options).expect("render should succeed").code
    }

    fn stroked_line(id: &str) -> ShapeNode {
        ShapeNode::new(Line::new(0.0, 0.0, 10.0, 0.0))
            .with_id(id)
            .with_style("stroke", "black")
            .with_style("stroke-width", "1")
    }

    fn group(id: &str, children: Vec<ShapeNode>) -> ShapeNode {
        ShapeNode::new(Group::new(children)).with_id(id)
    }

    #[test]
    fn renders_a_line_with_flipped_y() {
        let scene = Scene::new(100.0, 100.0, vec![stroked_line("l1")]);
        assert_eq!(
            code(&scene, &px_options()),
            "\\path[draw=black,fill,line width=1px] (0, 100) -- (10, 100);\n"
        );
    }

    #[test]
    fn selection_filters_down_to_the_selected_shape() {
        let scene = Scene::new(
            100.0,
            100.0,
            vec![
                group("groupA", vec![stroked_line("shapeX"), stroked_line("shapeY")]),
                group("groupB", vec![stroked_line("shapeZ")]),
            ],
        );
        let options = px_options().with_selection(["shapeX"]).with_verbose(true);
        let out = code(&scene, &options);
        assert!(out.contains("%shapeX"), "{out}");
        assert!(!out.contains("shapeY"), "{out}");
        assert!(!out.contains("shapeZ"), "{out}");
        assert!(!out.contains("groupB"), "{out}");
        assert_eq!(out.matches("\\path").count(), 1);
        assert_eq!(out.matches("\\begin{scope}").count(), 1);
    }

    #[test]
    fn selection_deep_inside_unselected_groups_keeps_only_its_ancestors() {
        let mut node = stroked_line("target");
        for level in 0..50 {
            node = group(&format!("g{level}"), vec![stroked_line(&format!("other{level}")), node]);
        }
        let scene = Scene::new(100.0, 100.0, vec![node, group("empty", vec![stroked_line("z")])]);
        let out = code(&scene, &px_options().with_selection(["target"]));
        assert_eq!(out.matches("\\path").count(), 1, "{out}");
        assert_eq!(out.matches("\\begin{scope}").count(), 50);
        assert_eq!(out.matches("\\end{scope}").count(), 50);
    }

    #[test]
    fn selecting_a_group_selects_its_descendants() {
        let scene = Scene::new(
            100.0,
            100.0,
            vec![
                group("groupA", vec![stroked_line("shapeX"), stroked_line("shapeY")]),
                stroked_line("shapeZ"),
            ],
        );
        let out = code(&scene, &px_options().with_selection(["groupA"]));
        assert_eq!(out.matches("\\path").count(), 2);
    }

    #[test]
    fn empty_groups_emit_nothing() {
        let scene = Scene::new(
            100.0,
            100.0,
            vec![
                group("g1", vec![stroked_line("hidden").hidden()]),
                group("g2", vec![group("g3", vec![])]),
            ],
        );
        assert_eq!(code(&scene, &px_options()), "");
    }

    #[test]
    fn hidden_nodes_are_skipped_even_when_selected() {
        let scene = Scene::new(100.0, 100.0, vec![stroked_line("a").hidden()]);
        assert_eq!(code(&scene, &px_options().with_selection(["a"])), "");
    }

    #[test]
    fn stroke_width_scales_with_nested_transforms() {
        let nested = stroked_line("inner").with_transform(Transform::scale(3.0, 3.0));
        let scene = Scene::new(
            100.0,
            100.0,
            vec![
                group("outer", vec![nested]).with_transform(Transform::scale(2.0, 2.0)),
                stroked_line("sibling"),
            ],
        );
        let out = code(&scene, &px_options());
        assert!(out.contains("line width=6px"), "{out}");
        assert!(out.contains("line width=1px"), "{out}");
    }

    #[test]
    fn group_scopes_carry_style_and_indent_children() {
        let options = ConvertOptions::default()
            .with_output_unit(Unit::Px)
            .with_indent(true);
        let scene = Scene::new(
            10.0,
            10.0,
            vec![group("g", vec![stroked_line("l")]).with_style("opacity", "0.5")],
        );
        assert_eq!(
            code(&scene, &options),
            "\\begin{scope}[opacity=0.5,transparency group]\n  \\path[draw=black,fill,line width=1px] (0, 10) -- (10, 10);\n\\end{scope}\n"
        );
    }

    #[test]
    fn degenerate_transforms_skip_the_node() {
        let scene = Scene::new(
            100.0,
            100.0,
            vec![
                stroked_line("flat").with_transform(Transform::scale(1.0, 0.0)),
                stroked_line("ok"),
            ],
        );
        let out = code(&scene, &px_options());
        assert_eq!(out.matches("\\path").count(), 1);
    }

    #[test]
    fn unsupported_nodes_are_skipped() {
        let scene = Scene::new(
            100.0,
            100.0,
            vec![
                ShapeNode::new(NodeKind::Unsupported("foreignObject".to_string())),
                stroked_line("ok"),
            ],
        );
        assert_eq!(code(&scene, &px_options()).matches("\\path").count(), 1);
    }

    #[test]
    fn malformed_path_data_fails_the_conversion() {
        let scene = Scene::new(
            100.0,
            100.0,
            vec![ShapeNode::new(PathData::new("M 0 0 L 5 5 X")).with_id("broken")],
        );
        let err = render(&scene, &px_options()).unwrap_err();
        let ConvertError::PathData(err) = err else {
            panic!("expected a path data error, got {err:?}");
        };
        assert_eq!(err.node, "broken");
        assert_eq!(err.token, "X");
    }

    #[test]
    fn custom_colors_are_collected() {
        let scene = Scene::new(
            10.0,
            10.0,
            vec![ShapeNode::new(Rect::new(0.0, 0.0, 5.0, 5.0)).with_style("fill", "#123456")],
        );
        let rendered = render(&scene, &px_options()).unwrap();
        assert!(rendered.code.starts_with("\\path[fill=c123456]"));
        assert_eq!(rendered.color_definitions, "\\definecolor{c123456}{RGB}{18,52,86}\n");
    }

    #[test]
    fn circles_become_four_curves() {
        let scene = Scene::new(
            10.0,
            10.0,
            vec![ShapeNode::new(Circle { cx: 5.0, cy: 5.0, r: 2.0 }).with_style("fill", "none")],
        );
        let out = code(&scene, &px_options());
        assert_eq!(out.matches("controls").count(), 4);
        assert!(out.starts_with("\\path (7, 5) .. controls"), "{out}");
        assert!(out.ends_with("-- cycle;\n"), "{out}");
    }

    #[test]
    fn text_nodes_rotate_with_the_transform() {
        let text = ShapeNode::new(TextNode::new(DVec2::new(10.0, 10.0), "hi"))
            .with_id("t")
            .with_transform(Transform::rotate(30.0));
        let scene = Scene::new(100.0, 100.0, vec![text]);
        let out = code(&scene, &px_options());
        assert!(out.starts_with("\\node[anchor=south west,rotate=-30] (t) at ("), "{out}");
        assert!(out.ends_with("{hi};\n"), "{out}");

        let options = px_options().with_notext(true);
        assert_eq!(code(&scene, &options), "");
    }

    #[test]
    fn images_strip_prefixes_and_skip_embedded_data() {
        let image = |href: &str| {
            ShapeNode::new(Image {
                x: 0.0,
                y: 0.0,
                width: 20.0,
                height: 10.0,
                href: href.to_string(),
            })
            .with_id("img")
        };
        let options = px_options().with_remove_absolute("/home/me/");
        let scene = Scene::new(100.0, 100.0, vec![image("/home/me/pic.png")]);
        assert_eq!(
            code(&scene, &options),
            "\\node[anchor=north west,inner sep=0] (img) at (0, 100) {\\includegraphics[width=20px,height=10px]{pic.png}};\n"
        );

        let scene = Scene::new(100.0, 100.0, vec![image("data:image/png;base64,AAAA")]);
        assert_eq!(
            code(&scene, &options),
            "% Image img not included. Base64 still not supported\n"
        );
    }

    #[test]
    fn nesting_beyond_the_limit_is_an_error() {
        // Debug builds use large frames; give the walk room
        let handle = std::thread::Builder::new()
            .stack_size(32 * 1024 * 1024)
            .spawn(|| {
                let mut node = stroked_line("deep");
                for _ in 0..=defaults::MAX_DEPTH {
                    node = ShapeNode::new(Group::new(vec![node]));
                }
                let scene = Scene::new(10.0, 10.0, vec![node]);
                render(&scene, &px_options()).unwrap_err()
            })
            .unwrap();
        let err = handle.join().unwrap();
        assert!(matches!(
            err,
            ConvertError::Document(DocumentError::NestingTooDeep { .. })
        ));
    }
}
