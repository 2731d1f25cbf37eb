//! The read-only scene graph handed to the renderer.
//!
//! Built once by the document front end (or by hand in tests) and never
//! mutated while rendering.

use std::collections::BTreeMap;

use crate::options::TexMode;
use crate::render::shapes::{self, Outline, Shape};
use crate::types::{Point, Transform};

/// A whole document: its coordinate system plus the top-level nodes.
#[derive(Debug, Clone, PartialEq)]
pub struct Scene {
    pub view_box: ViewBox,
    /// CSS pixels per user unit
    pub px_per_user_unit: f64,
    pub roots: Vec<ShapeNode>,
}

impl Scene {
    /// A scene whose user units are pixels and whose view box starts at the origin.
    pub fn new(width: f64, height: f64, roots: Vec<ShapeNode>) -> Self {
        Self {
            view_box: ViewBox {
                min_x: 0.0,
                min_y: 0.0,
                width,
                height,
            },
            px_per_user_unit: 1.0,
            roots,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewBox {
    pub min_x: f64,
    pub min_y: f64,
    pub width: f64,
    pub height: f64,
}

/// One node of the scene graph.
#[derive(Debug, Clone, PartialEq)]
pub struct ShapeNode {
    pub id: Option<String>,
    /// Local transform (identity when the element has none)
    pub transform: Transform,
    pub style: Style,
    /// `display:none` or `visibility:hidden`
    pub hidden: bool,
    pub kind: NodeKind,
}

impl ShapeNode {
    pub fn new(kind: impl Into<NodeKind>) -> Self {
        Self {
            id: None,
            transform: Transform::IDENTITY,
            style: Style::default(),
            hidden: false,
            kind: kind.into(),
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_transform(mut self, transform: Transform) -> Self {
        self.transform = transform;
        self
    }

    pub fn with_style(mut self, property: &str, value: &str) -> Self {
        self.style.set(property, value);
        self
    }

    pub fn hidden(mut self) -> Self {
        self.hidden = true;
        self
    }

    /// Label used in diagnostics: the id, or the element kind.
    pub fn label(&self) -> &str {
        match &self.id {
            Some(id) => id,
            None => self.kind.tag(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    Shape(Shape),
    Image(Image),
    Text(TextNode),
    Group(Group),
    /// An element the converter does not draw; skipped with a diagnostic
    Unsupported(String),
}

impl NodeKind {
    pub fn tag(&self) -> &str {
        match self {
            NodeKind::Shape(shape) => shape.tag(),
            NodeKind::Image(_) => "image",
            NodeKind::Text(_) => "text",
            NodeKind::Group(_) => "g",
            NodeKind::Unsupported(tag) => tag,
        }
    }
}

impl From<Shape> for NodeKind {
    fn from(shape: Shape) -> Self {
        NodeKind::Shape(shape)
    }
}

macro_rules! shape_into_node_kind {
    ($($ty:ident),* $(,)?) => {
        $(
            impl From<shapes::$ty> for NodeKind {
                fn from(shape: shapes::$ty) -> Self {
                    NodeKind::Shape(Shape::from(shape))
                }
            }
        )*
    };
}

shape_into_node_kind!(PathData, Rect, Circle, Ellipse, Line, Polyline, Polygon);

impl From<Group> for NodeKind {
    fn from(group: Group) -> Self {
        NodeKind::Group(group)
    }
}

impl From<Image> for NodeKind {
    fn from(image: Image) -> Self {
        NodeKind::Image(image)
    }
}

impl From<TextNode> for NodeKind {
    fn from(text: TextNode) -> Self {
        NodeKind::Text(text)
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Group {
    pub children: Vec<ShapeNode>,
}

impl Group {
    pub fn new(children: Vec<ShapeNode>) -> Self {
        Self { children }
    }
}

/// A raster (or external) image placed in a box.
#[derive(Debug, Clone, PartialEq)]
pub struct Image {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub href: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TextNode {
    /// Anchor position (the baseline start of the first line)
    pub position: Point,
    pub content: String,
    /// Per-node override picked up from the configured texmode attribute
    pub texmode: Option<TexMode>,
}

impl TextNode {
    pub fn new(position: Point, content: impl Into<String>) -> Self {
        Self {
            position,
            content: content.into(),
            texmode: None,
        }
    }
}

/// Resolved presentation properties of a node, keyed by SVG property name.
///
/// Values are kept verbatim; interpreting them is the style resolver's job.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Style {
    properties: BTreeMap<String, String>,
}

impl Style {
    pub fn get(&self, property: &str) -> Option<&str> {
        self.properties.get(property).map(String::as_str)
    }

    pub fn set(&mut self, property: &str, value: &str) {
        self.properties
            .insert(property.to_string(), value.trim().to_string());
    }

    pub fn remove(&mut self, property: &str) -> Option<String> {
        self.properties.remove(property)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.properties
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }
}
