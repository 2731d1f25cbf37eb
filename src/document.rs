//! SVG front end: XML text to a `Scene`
//!
//! Reads the document with `roxmltree`, resolves presentation attributes and
//! `style` declarations into per-node style bags (with inheritance), expands
//! `<use>` references and maps every element onto a scene node kind.

use std::collections::HashMap;

use roxmltree::{Document, Node, ParsingOptions};

use crate::errors::{ConvertError, DocumentError};
use crate::log;
use crate::options::{ConvertOptions, TexMode};
use crate::parse::{parse_length, parse_number_list, parse_points, parse_transform};
use crate::render::defaults::{MAX_DEPTH, MAX_USE_NODES};
use crate::render::shapes::{Circle, Ellipse, Line, PathData, Polygon, Polyline, Rect};
use crate::scene::{Group, Image, NodeKind, Scene, ShapeNode, Style, TextNode, ViewBox};
use crate::types::Transform;
use crate::units::LengthUnit;

const SVG_NS: &str = "http://www.w3.org/2000/svg";
const XLINK_NS: &str = "http://www.w3.org/1999/xlink";

/// Viewport used when the root element gives no usable size.
const DEFAULT_WIDTH: f64 = 300.0;
const DEFAULT_HEIGHT: f64 = 150.0;

/// Font size assumed for `em`/`ex` lengths
const FONT_SIZE: f64 = 16.0;

/// Elements that never draw anything by themselves.
const NON_RENDERED: &[&str] = &[
    "desc",
    "title",
    "metadata",
    "defs",
    "style",
    "script",
    "symbol",
    "namedview",
    "clipPath",
    "mask",
    "marker",
    "pattern",
    "linearGradient",
    "radialGradient",
    "filter",
];

/// Presentation attributes copied into the style bag.
const PRESENTATION_ATTRIBUTES: &[&str] = &[
    "fill",
    "stroke",
    "stroke-width",
    "opacity",
    "fill-opacity",
    "stroke-opacity",
    "fill-rule",
    "stroke-linecap",
    "stroke-linejoin",
    "stroke-miterlimit",
    "stroke-dashoffset",
    "stroke-dasharray",
    "text-anchor",
    "marker-start",
    "marker-end",
    "display",
    "visibility",
    "color",
];

/// Properties a node inherits from its parent unless it sets them itself.
const INHERITED: &[&str] = &[
    "fill",
    "stroke",
    "stroke-width",
    "fill-opacity",
    "stroke-opacity",
    "fill-rule",
    "stroke-linecap",
    "stroke-linejoin",
    "stroke-miterlimit",
    "stroke-dashoffset",
    "stroke-dasharray",
    "text-anchor",
    "marker-start",
    "marker-end",
    "visibility",
    "color",
];

/// Parse SVG source into a scene graph.
pub fn load(source: &str, options: &ConvertOptions) -> Result<Scene, ConvertError> {
    let parsing = ParsingOptions {
        allow_dtd: true,
        ..ParsingOptions::default()
    };
    let doc = Document::parse_with_options(source, parsing).map_err(DocumentError::from)?;
    let root = doc.root_element();
    if root.tag_name().name() != "svg" {
        return Err(DocumentError::NotSvg {
            tag: root.tag_name().name().to_string(),
        }
        .into());
    }

    let (view_box, px_per_user_unit) = document_geometry(root);
    let mut loader = Loader {
        options,
        ids: doc
            .descendants()
            .filter_map(|node| Some((node.attribute("id")?, node)))
            .collect(),
        viewport: view_box,
        expanding: Vec::new(),
        expanded: 0,
    };
    let root_style = style_of(root, &Style::default());
    let roots = loader.children(root, &root_style, 1)?;
    log::debug!(nodes = roots.len(), ?view_box, px_per_user_unit, "loaded document");

    Ok(Scene {
        view_box,
        px_per_user_unit,
        roots,
    })
}

/// View box of the root element and the size of one user unit in CSS pixels.
///
/// Without a view box, user units are pixels and the viewport comes from
/// `width`/`height`. With one, the scale is the larger of the two axis
/// ratios that are known.
fn document_geometry(root: Node) -> (ViewBox, f64) {
    let size = |name| {
        root.attribute(name)
            .and_then(|value| parse_length(value).ok())
            .and_then(|length| length.to_px())
    };
    let (width_px, height_px) = (size("width"), size("height"));

    let view_box = root
        .attribute("viewBox")
        .and_then(|value| parse_number_list(value).ok())
        .and_then(|numbers| match numbers[..] {
            [min_x, min_y, width, height] if width > 0.0 && height > 0.0 => Some(ViewBox {
                min_x,
                min_y,
                width,
                height,
            }),
            _ => None,
        });

    match view_box {
        Some(view_box) => {
            let ratios = (
                width_px.map(|w| w / view_box.width),
                height_px.map(|h| h / view_box.height),
            );
            let scale = match ratios {
                (Some(sx), Some(sy)) => sx.max(sy),
                (Some(s), None) | (None, Some(s)) => s,
                (None, None) => 1.0,
            };
            (view_box, scale)
        }
        None => (
            ViewBox {
                min_x: 0.0,
                min_y: 0.0,
                width: width_px.unwrap_or(DEFAULT_WIDTH),
                height: height_px.unwrap_or(DEFAULT_HEIGHT),
            },
            1.0,
        ),
    }
}

/// Own style of `element`: inherited properties, then presentation
/// attributes, then `style` declarations.
fn style_of(element: Node, parent: &Style) -> Style {
    let mut style = Style::default();
    for (property, value) in parent.iter() {
        if INHERITED.contains(&property) {
            style.set(property, value);
        }
    }
    for property in PRESENTATION_ATTRIBUTES {
        if let Some(value) = element.attribute(*property) {
            style.set(property, value);
        }
    }
    if let Some(declarations) = element.attribute("style") {
        for declaration in declarations.split(';') {
            let declaration = declaration.trim();
            if declaration.is_empty() {
                continue;
            }
            match declaration.split_once(':') {
                Some((property, value)) => {
                    let property = property.trim().to_ascii_lowercase();
                    let value = value.trim().trim_end_matches("!important").trim();
                    style.set(&property, value);
                }
                None => log::debug!(declaration, "ignoring malformed style declaration"),
            }
        }
    }
    // `inherit` takes the parent's value, or drops the property
    let inherits: Vec<String> = style
        .iter()
        .filter(|(_, value)| *value == "inherit")
        .map(|(property, _)| property.to_string())
        .collect();
    for property in inherits {
        match parent.get(&property) {
            Some(value) => style.set(&property, value),
            None => {
                style.remove(&property);
            }
        }
    }
    style
}

fn is_hidden(style: &Style) -> bool {
    style.get("display") == Some("none")
        || matches!(style.get("visibility"), Some("hidden" | "collapse"))
}

/// Which viewport dimension a percentage refers to.
#[derive(Debug, Clone, Copy)]
enum Axis {
    X,
    Y,
    Diagonal,
}

struct Loader<'a, 'input> {
    options: &'a ConvertOptions,
    ids: HashMap<&'a str, Node<'a, 'input>>,
    viewport: ViewBox,
    /// Ids of the `<use>` targets currently being expanded
    expanding: Vec<&'a str>,
    /// Elements created so far inside `<use>` expansions
    expanded: usize,
}

impl<'a, 'input> Loader<'a, 'input> {
    fn children(
        &mut self,
        parent: Node<'a, 'input>,
        style: &Style,
        depth: usize,
    ) -> Result<Vec<ShapeNode>, ConvertError> {
        if depth > MAX_DEPTH {
            return Err(DocumentError::NestingTooDeep { limit: MAX_DEPTH }.into());
        }
        let mut nodes = Vec::new();
        for child in parent.children().filter(Node::is_element) {
            if let Some(node) = self.element(child, style, depth)? {
                nodes.push(node);
            }
        }
        Ok(nodes)
    }

    fn element(
        &mut self,
        element: Node<'a, 'input>,
        parent_style: &Style,
        depth: usize,
    ) -> Result<Option<ShapeNode>, ConvertError> {
        let tag = element.tag_name();
        if tag.namespace().is_some_and(|ns| ns != SVG_NS) {
            log::debug!(tag = tag.name(), "skipping foreign element");
            return Ok(None);
        }
        let name = tag.name();
        if NON_RENDERED.contains(&name) {
            return Ok(None);
        }

        if !self.expanding.is_empty() {
            self.expanded += 1;
            if self.expanded > MAX_USE_NODES {
                return Err(DocumentError::UseExpansionTooLarge {
                    limit: MAX_USE_NODES,
                }
                .into());
            }
        }

        let style = style_of(element, parent_style);
        let mut transform = self.transform_of(element);

        let kind: NodeKind = match name {
            "g" | "a" | "switch" => Group::new(self.children(element, &style, depth + 1)?).into(),
            "svg" => {
                transform = transform.pre(self.nested_viewport(element));
                Group::new(self.children(element, &style, depth + 1)?).into()
            }
            "use" => {
                let x = self.length(element, "x", Axis::X);
                let y = self.length(element, "y", Axis::Y);
                transform = transform.pre(Transform::translate(x, y));
                match self.expand_use(element, &style, depth)? {
                    Some(target) => Group::new(vec![target]).into(),
                    None => return Ok(None),
                }
            }
            "path" => PathData::new(element.attribute("d").unwrap_or_default()).into(),
            "rect" => Rect::new(
                self.length(element, "x", Axis::X),
                self.length(element, "y", Axis::Y),
                self.length(element, "width", Axis::X),
                self.length(element, "height", Axis::Y),
            )
            .with_radii(
                self.optional_length(element, "rx", Axis::X),
                self.optional_length(element, "ry", Axis::Y),
            )
            .into(),
            "circle" => Circle {
                cx: self.length(element, "cx", Axis::X),
                cy: self.length(element, "cy", Axis::Y),
                r: self.length(element, "r", Axis::Diagonal),
            }
            .into(),
            "ellipse" => Ellipse {
                cx: self.length(element, "cx", Axis::X),
                cy: self.length(element, "cy", Axis::Y),
                rx: self.length(element, "rx", Axis::X),
                ry: self.length(element, "ry", Axis::Y),
            }
            .into(),
            "line" => Line::new(
                self.length(element, "x1", Axis::X),
                self.length(element, "y1", Axis::Y),
                self.length(element, "x2", Axis::X),
                self.length(element, "y2", Axis::Y),
            )
            .into(),
            "polyline" => Polyline {
                points: points_of(element),
            }
            .into(),
            "polygon" => Polygon {
                points: points_of(element),
            }
            .into(),
            "image" => Image {
                x: self.length(element, "x", Axis::X),
                y: self.length(element, "y", Axis::Y),
                width: self.length(element, "width", Axis::X),
                height: self.length(element, "height", Axis::Y),
                href: href_of(element).unwrap_or_default().to_string(),
            }
            .into(),
            "text" => self.text(element).into(),
            other => NodeKind::Unsupported(other.to_string()),
        };

        Ok(Some(ShapeNode {
            id: element.attribute("id").map(str::to_string),
            transform,
            hidden: is_hidden(&style),
            style,
            kind,
        }))
    }

    fn transform_of(&self, element: Node) -> Transform {
        let Some(value) = element.attribute("transform") else {
            return Transform::IDENTITY;
        };
        parse_transform(value).unwrap_or_else(|err| {
            log::warn!(value, %err, "invalid transform attribute, using identity");
            Transform::IDENTITY
        })
    }

    /// Placement of a nested `<svg>`: its position plus its own view box.
    fn nested_viewport(&self, element: Node) -> Transform {
        let x = self.length(element, "x", Axis::X);
        let y = self.length(element, "y", Axis::Y);
        let placement = Transform::translate(x, y);

        let view_box = element
            .attribute("viewBox")
            .and_then(|value| parse_number_list(value).ok());
        let width = self.optional_length(element, "width", Axis::X);
        let height = self.optional_length(element, "height", Axis::Y);
        match (view_box.as_deref(), width, height) {
            (Some(&[min_x, min_y, vb_width, vb_height]), Some(width), Some(height))
                if vb_width > 0.0 && vb_height > 0.0 =>
            {
                let scale = (width / vb_width).min(height / vb_height);
                placement
                    .pre(Transform::scale(scale, scale))
                    .pre(Transform::translate(-min_x, -min_y))
            }
            _ => placement,
        }
    }

    /// The element a `<use>` points at, built as a child of the `<use>`.
    fn expand_use(
        &mut self,
        element: Node<'a, 'input>,
        style: &Style,
        depth: usize,
    ) -> Result<Option<ShapeNode>, ConvertError> {
        let Some(id) = href_of(element).and_then(|href| href.strip_prefix('#')) else {
            log::warn!("use element without a local reference");
            return Ok(None);
        };
        if self.expanding.contains(&id) {
            log::warn!(id, "recursive use reference");
            return Ok(None);
        }
        let Some(target) = self.ids.get(id).copied() else {
            log::warn!(id, "use references an unknown element");
            return Ok(None);
        };
        if depth + 1 > MAX_DEPTH {
            return Err(DocumentError::NestingTooDeep { limit: MAX_DEPTH }.into());
        }

        self.expanding.push(id);
        let node = if target.tag_name().name() == "symbol" {
            let symbol_style = style_of(target, style);
            let children = self.children(target, &symbol_style, depth + 2)?;
            Some(ShapeNode {
                id: Some(id.to_string()),
                transform: Transform::IDENTITY,
                hidden: is_hidden(&symbol_style),
                style: symbol_style,
                kind: Group::new(children).into(),
            })
        } else {
            self.element(target, style, depth + 1)?
        };
        self.expanding.pop();
        Ok(node)
    }

    fn text(&self, element: Node<'a, 'input>) -> TextNode {
        let content = element
            .descendants()
            .filter(Node::is_text)
            .filter(|node| {
                node.parent_element()
                    .is_some_and(|parent| matches!(parent.tag_name().name(), "text" | "tspan"))
            })
            .filter_map(|node| node.text())
            .map(str::trim)
            .filter(|text| !text.is_empty())
            .collect::<Vec<_>>()
            .join(" ");

        // Inkscape puts the position on the first tspan as well
        let first_span = element
            .children()
            .find(|child| child.tag_name().name() == "tspan");
        let coordinate = |name: &str| {
            first_number(element.attribute(name))
                .or_else(|| first_number(first_span.and_then(|span| span.attribute(name))))
                .unwrap_or(0.0)
        };

        TextNode {
            position: glam::dvec2(coordinate("x"), coordinate("y")),
            content,
            texmode: self.texmode_of(element),
        }
    }

    /// Text mode override from the configured attribute on the element or
    /// one of its ancestors.
    fn texmode_of(&self, element: Node) -> Option<TexMode> {
        let attribute = self.options.texmode_attribute.as_deref()?;
        let local = attribute.rsplit(':').next().unwrap_or(attribute);
        let value = element.ancestors().find_map(|node| {
            node.attributes()
                .find(|attr| attr.name() == local)
                .map(|attr| attr.value())
        })?;
        match value.parse() {
            Ok(mode) => Some(mode),
            Err(err) => {
                log::warn!(%err, "ignoring texmode attribute");
                None
            }
        }
    }

    fn optional_length(&self, element: Node, name: &str, axis: Axis) -> Option<f64> {
        let value = element.attribute(name)?;
        let length = match parse_length(value) {
            Ok(length) => length,
            Err(err) => {
                log::debug!(name, value, %err, "ignoring malformed length");
                return None;
            }
        };
        let reference = match axis {
            Axis::X => self.viewport.width,
            Axis::Y => self.viewport.height,
            Axis::Diagonal => self.viewport.width.hypot(self.viewport.height) / 2f64.sqrt(),
        };
        Some(match length.unit {
            LengthUnit::User => length.value,
            LengthUnit::Absolute(unit) => length.value * unit.px_per_unit(),
            LengthUnit::Percent => length.value / 100.0 * reference,
            LengthUnit::Em => length.value * FONT_SIZE,
            LengthUnit::Ex => length.value * FONT_SIZE / 2.0,
        })
    }

    fn length(&self, element: Node, name: &str, axis: Axis) -> f64 {
        self.optional_length(element, name, axis).unwrap_or(0.0)
    }
}

fn href_of<'a>(element: Node<'a, '_>) -> Option<&'a str> {
    element
        .attribute((XLINK_NS, "href"))
        .or_else(|| element.attribute("href"))
}

fn points_of(element: Node) -> Vec<glam::DVec2> {
    let Some(value) = element.attribute("points") else {
        return Vec::new();
    };
    parse_points(value).unwrap_or_else(|err| {
        log::warn!(value, %err, "invalid points attribute");
        Vec::new()
    })
}

fn first_number(value: Option<&str>) -> Option<f64> {
    parse_number_list(value?).ok()?.first().copied()
}
