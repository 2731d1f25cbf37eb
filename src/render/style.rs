//! Style resolution: SVG presentation properties to TikZ options
//!
//! The color table is plain data injected into the resolver; the resolver
//! collects the `\definecolor` lines for every non-base color it hands out.

use std::collections::HashMap;

use super::tikz::format_number;
use crate::log;
use crate::options::{ArrowTip, ConvertOptions, Markings};
use crate::parse::parse_length;
use crate::scene::Style;
use crate::units::LengthUnit;

/// Colors TikZ (xcolor) knows by name without a definition, with xcolor's
/// values. SVG's `green` is darker than xcolor's and does not qualify.
pub const TIKZ_BASE_COLORS: [(&str, Rgb); 9] = [
    ("black", Rgb::new(0, 0, 0)),
    ("red", Rgb::new(255, 0, 0)),
    ("green", Rgb::new(0, 255, 0)),
    ("blue", Rgb::new(0, 0, 255)),
    ("cyan", Rgb::new(0, 255, 255)),
    ("yellow", Rgb::new(255, 255, 0)),
    ("magenta", Rgb::new(255, 0, 255)),
    ("white", Rgb::new(255, 255, 255)),
    ("gray", Rgb::new(128, 128, 128)),
];

fn is_base_name(name: &str) -> bool {
    TIKZ_BASE_COLORS.iter().any(|(base, _)| *base == name)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub fn hex(self) -> String {
        format!("{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

/// SVG color keywords.
const SVG_COLORS: [(&str, Rgb); 148] = [
    ("aliceblue", Rgb::new(0xf0, 0xf8, 0xff)),
    ("antiquewhite", Rgb::new(0xfa, 0xeb, 0xd7)),
    ("aqua", Rgb::new(0x00, 0xff, 0xff)),
    ("aquamarine", Rgb::new(0x7f, 0xff, 0xd4)),
    ("azure", Rgb::new(0xf0, 0xff, 0xff)),
    ("beige", Rgb::new(0xf5, 0xf5, 0xdc)),
    ("bisque", Rgb::new(0xff, 0xe4, 0xc4)),
    ("black", Rgb::new(0x00, 0x00, 0x00)),
    ("blanchedalmond", Rgb::new(0xff, 0xeb, 0xcd)),
    ("blue", Rgb::new(0x00, 0x00, 0xff)),
    ("blueviolet", Rgb::new(0x8a, 0x2b, 0xe2)),
    ("brown", Rgb::new(0xa5, 0x2a, 0x2a)),
    ("burlywood", Rgb::new(0xde, 0xb8, 0x87)),
    ("cadetblue", Rgb::new(0x5f, 0x9e, 0xa0)),
    ("chartreuse", Rgb::new(0x7f, 0xff, 0x00)),
    ("chocolate", Rgb::new(0xd2, 0x69, 0x1e)),
    ("coral", Rgb::new(0xff, 0x7f, 0x50)),
    ("cornflowerblue", Rgb::new(0x64, 0x95, 0xed)),
    ("cornsilk", Rgb::new(0xff, 0xf8, 0xdc)),
    ("crimson", Rgb::new(0xdc, 0x14, 0x3c)),
    ("cyan", Rgb::new(0x00, 0xff, 0xff)),
    ("darkblue", Rgb::new(0x00, 0x00, 0x8b)),
    ("darkcyan", Rgb::new(0x00, 0x8b, 0x8b)),
    ("darkgoldenrod", Rgb::new(0xb8, 0x86, 0x0b)),
    ("darkgray", Rgb::new(0xa9, 0xa9, 0xa9)),
    ("darkgreen", Rgb::new(0x00, 0x64, 0x00)),
    ("darkgrey", Rgb::new(0xa9, 0xa9, 0xa9)),
    ("darkkhaki", Rgb::new(0xbd, 0xb7, 0x6b)),
    ("darkmagenta", Rgb::new(0x8b, 0x00, 0x8b)),
    ("darkolivegreen", Rgb::new(0x55, 0x6b, 0x2f)),
    ("darkorange", Rgb::new(0xff, 0x8c, 0x00)),
    ("darkorchid", Rgb::new(0x99, 0x32, 0xcc)),
    ("darkred", Rgb::new(0x8b, 0x00, 0x00)),
    ("darksalmon", Rgb::new(0xe9, 0x96, 0x7a)),
    ("darkseagreen", Rgb::new(0x8f, 0xbc, 0x8f)),
    ("darkslateblue", Rgb::new(0x48, 0x3d, 0x8b)),
    ("darkslategray", Rgb::new(0x2f, 0x4f, 0x4f)),
    ("darkslategrey", Rgb::new(0x2f, 0x4f, 0x4f)),
    ("darkturquoise", Rgb::new(0x00, 0xce, 0xd1)),
    ("darkviolet", Rgb::new(0x94, 0x00, 0xd3)),
    ("deeppink", Rgb::new(0xff, 0x14, 0x93)),
    ("deepskyblue", Rgb::new(0x00, 0xbf, 0xff)),
    ("dimgray", Rgb::new(0x69, 0x69, 0x69)),
    ("dimgrey", Rgb::new(0x69, 0x69, 0x69)),
    ("dodgerblue", Rgb::new(0x1e, 0x90, 0xff)),
    ("firebrick", Rgb::new(0xb2, 0x22, 0x22)),
    ("floralwhite", Rgb::new(0xff, 0xfa, 0xf0)),
    ("forestgreen", Rgb::new(0x22, 0x8b, 0x22)),
    ("fuchsia", Rgb::new(0xff, 0x00, 0xff)),
    ("gainsboro", Rgb::new(0xdc, 0xdc, 0xdc)),
    ("ghostwhite", Rgb::new(0xf8, 0xf8, 0xff)),
    ("gold", Rgb::new(0xff, 0xd7, 0x00)),
    ("goldenrod", Rgb::new(0xda, 0xa5, 0x20)),
    ("gray", Rgb::new(0x80, 0x80, 0x80)),
    ("grey", Rgb::new(0x80, 0x80, 0x80)),
    ("green", Rgb::new(0x00, 0x80, 0x00)),
    ("greenyellow", Rgb::new(0xad, 0xff, 0x2f)),
    ("honeydew", Rgb::new(0xf0, 0xff, 0xf0)),
    ("hotpink", Rgb::new(0xff, 0x69, 0xb4)),
    ("indianred", Rgb::new(0xcd, 0x5c, 0x5c)),
    ("indigo", Rgb::new(0x4b, 0x00, 0x82)),
    ("ivory", Rgb::new(0xff, 0xff, 0xf0)),
    ("khaki", Rgb::new(0xf0, 0xe6, 0x8c)),
    ("lavender", Rgb::new(0xe6, 0xe6, 0xfa)),
    ("lavenderblush", Rgb::new(0xff, 0xf0, 0xf5)),
    ("lawngreen", Rgb::new(0x7c, 0xfc, 0x00)),
    ("lemonchiffon", Rgb::new(0xff, 0xfa, 0xcd)),
    ("lightblue", Rgb::new(0xad, 0xd8, 0xe6)),
    ("lightcoral", Rgb::new(0xf0, 0x80, 0x80)),
    ("lightcyan", Rgb::new(0xe0, 0xff, 0xff)),
    ("lightgoldenrodyellow", Rgb::new(0xfa, 0xfa, 0xd2)),
    ("lightgray", Rgb::new(0xd3, 0xd3, 0xd3)),
    ("lightgreen", Rgb::new(0x90, 0xee, 0x90)),
    ("lightgrey", Rgb::new(0xd3, 0xd3, 0xd3)),
    ("lightpink", Rgb::new(0xff, 0xb6, 0xc1)),
    ("lightsalmon", Rgb::new(0xff, 0xa0, 0x7a)),
    ("lightseagreen", Rgb::new(0x20, 0xb2, 0xaa)),
    ("lightskyblue", Rgb::new(0x87, 0xce, 0xfa)),
    ("lightslategray", Rgb::new(0x77, 0x88, 0x99)),
    ("lightslategrey", Rgb::new(0x77, 0x88, 0x99)),
    ("lightsteelblue", Rgb::new(0xb0, 0xc4, 0xde)),
    ("lightyellow", Rgb::new(0xff, 0xff, 0xe0)),
    ("lime", Rgb::new(0x00, 0xff, 0x00)),
    ("limegreen", Rgb::new(0x32, 0xcd, 0x32)),
    ("linen", Rgb::new(0xfa, 0xf0, 0xe6)),
    ("magenta", Rgb::new(0xff, 0x00, 0xff)),
    ("maroon", Rgb::new(0x80, 0x00, 0x00)),
    ("mediumaquamarine", Rgb::new(0x66, 0xcd, 0xaa)),
    ("mediumblue", Rgb::new(0x00, 0x00, 0xcd)),
    ("mediumorchid", Rgb::new(0xba, 0x55, 0xd3)),
    ("mediumpurple", Rgb::new(0x93, 0x70, 0xdb)),
    ("mediumseagreen", Rgb::new(0x3c, 0xb3, 0x71)),
    ("mediumslateblue", Rgb::new(0x7b, 0x68, 0xee)),
    ("mediumspringgreen", Rgb::new(0x00, 0xfa, 0x9a)),
    ("mediumturquoise", Rgb::new(0x48, 0xd1, 0xcc)),
    ("mediumvioletred", Rgb::new(0xc7, 0x15, 0x85)),
    ("midnightblue", Rgb::new(0x19, 0x19, 0x70)),
    ("mintcream", Rgb::new(0xf5, 0xff, 0xfa)),
    ("mistyrose", Rgb::new(0xff, 0xe4, 0xe1)),
    ("moccasin", Rgb::new(0xff, 0xe4, 0xb5)),
    ("navajowhite", Rgb::new(0xff, 0xde, 0xad)),
    ("navy", Rgb::new(0x00, 0x00, 0x80)),
    ("oldlace", Rgb::new(0xfd, 0xf5, 0xe6)),
    ("olive", Rgb::new(0x80, 0x80, 0x00)),
    ("olivedrab", Rgb::new(0x6b, 0x8e, 0x23)),
    ("orange", Rgb::new(0xff, 0xa5, 0x00)),
    ("orangered", Rgb::new(0xff, 0x45, 0x00)),
    ("orchid", Rgb::new(0xda, 0x70, 0xd6)),
    ("palegoldenrod", Rgb::new(0xee, 0xe8, 0xaa)),
    ("palegreen", Rgb::new(0x98, 0xfb, 0x98)),
    ("paleturquoise", Rgb::new(0xaf, 0xee, 0xee)),
    ("palevioletred", Rgb::new(0xdb, 0x70, 0x93)),
    ("papayawhip", Rgb::new(0xff, 0xef, 0xd5)),
    ("peachpuff", Rgb::new(0xff, 0xda, 0xb9)),
    ("peru", Rgb::new(0xcd, 0x85, 0x3f)),
    ("pink", Rgb::new(0xff, 0xc0, 0xcb)),
    ("plum", Rgb::new(0xdd, 0xa0, 0xdd)),
    ("powderblue", Rgb::new(0xb0, 0xe0, 0xe6)),
    ("purple", Rgb::new(0x80, 0x00, 0x80)),
    ("rebeccapurple", Rgb::new(0x66, 0x33, 0x99)),
    ("red", Rgb::new(0xff, 0x00, 0x00)),
    ("rosybrown", Rgb::new(0xbc, 0x8f, 0x8f)),
    ("royalblue", Rgb::new(0x41, 0x69, 0xe1)),
    ("saddlebrown", Rgb::new(0x8b, 0x45, 0x13)),
    ("salmon", Rgb::new(0xfa, 0x80, 0x72)),
    ("sandybrown", Rgb::new(0xf4, 0xa4, 0x60)),
    ("seagreen", Rgb::new(0x2e, 0x8b, 0x57)),
    ("seashell", Rgb::new(0xff, 0xf5, 0xee)),
    ("sienna", Rgb::new(0xa0, 0x52, 0x2d)),
    ("silver", Rgb::new(0xc0, 0xc0, 0xc0)),
    ("skyblue", Rgb::new(0x87, 0xce, 0xeb)),
    ("slateblue", Rgb::new(0x6a, 0x5a, 0xcd)),
    ("slategray", Rgb::new(0x70, 0x80, 0x90)),
    ("slategrey", Rgb::new(0x70, 0x80, 0x90)),
    ("snow", Rgb::new(0xff, 0xfa, 0xfa)),
    ("springgreen", Rgb::new(0x00, 0xff, 0x7f)),
    ("steelblue", Rgb::new(0x46, 0x82, 0xb4)),
    ("tan", Rgb::new(0xd2, 0xb4, 0x8c)),
    ("teal", Rgb::new(0x00, 0x80, 0x80)),
    ("thistle", Rgb::new(0xd8, 0xbf, 0xd8)),
    ("tomato", Rgb::new(0xff, 0x63, 0x47)),
    ("turquoise", Rgb::new(0x40, 0xe0, 0xd0)),
    ("violet", Rgb::new(0xee, 0x82, 0xee)),
    ("wheat", Rgb::new(0xf5, 0xde, 0xb3)),
    ("white", Rgb::new(0xff, 0xff, 0xff)),
    ("whitesmoke", Rgb::new(0xf5, 0xf5, 0xf5)),
    ("yellow", Rgb::new(0xff, 0xff, 0x00)),
    ("yellowgreen", Rgb::new(0x9a, 0xcd, 0x32)),
];

/// Named colors available to documents.
#[derive(Debug, Clone)]
pub struct ColorTable {
    by_name: HashMap<String, Rgb>,
    by_value: HashMap<Rgb, String>,
}

impl Default for ColorTable {
    fn default() -> Self {
        Self::svg()
    }
}

impl ColorTable {
    pub fn empty() -> Self {
        Self {
            by_name: HashMap::new(),
            by_value: HashMap::new(),
        }
    }

    /// The 148 SVG color keywords.
    pub fn svg() -> Self {
        SVG_COLORS
            .iter()
            .fold(Self::empty(), |table, (name, rgb)| table.with_color(name, *rgb))
    }

    /// Add (or replace) a named color.
    ///
    /// When several names share a value the reverse lookup keeps the last
    /// one added, unless a TikZ base color already claims it.
    pub fn with_color(mut self, name: &str, rgb: Rgb) -> Self {
        let name = name.to_ascii_lowercase();
        let base_owned = self
            .by_value
            .get(&rgb)
            .is_some_and(|existing| is_base_name(existing));
        if !base_owned {
            self.by_value.insert(rgb, name.clone());
        }
        self.by_name.insert(name, rgb);
        self
    }

    pub fn lookup(&self, name: &str) -> Option<Rgb> {
        self.by_name.get(&name.to_ascii_lowercase()).copied()
    }

    pub fn name_of(&self, rgb: Rgb) -> Option<&str> {
        self.by_value.get(&rgb).map(String::as_str)
    }
}

/// Parsed `fill` / `stroke` value.
#[derive(Debug, Clone, PartialEq)]
pub enum Paint {
    None,
    Color(Rgb),
}

/// Parse a paint value: `none`, `#rgb`, `#rrggbb`, `rgb(...)` or a color name.
///
/// Returns `None` for anything unresolvable (gradients, patterns, typos).
pub fn parse_paint(value: &str, colors: &ColorTable) -> Option<Paint> {
    let value = value.trim();
    if value.eq_ignore_ascii_case("none") || value.eq_ignore_ascii_case("transparent") {
        return Some(Paint::None);
    }
    if let Some(hex) = value.strip_prefix('#') {
        return parse_hex(hex).map(Paint::Color);
    }
    if let Some(inner) = value
        .strip_prefix("rgb(")
        .and_then(|rest| rest.strip_suffix(')'))
    {
        return parse_rgb_function(inner).map(Paint::Color);
    }
    colors.lookup(value).map(Paint::Color)
}

fn parse_hex(hex: &str) -> Option<Rgb> {
    if !hex.is_ascii() {
        return None;
    }
    let channel = |s: &str| u8::from_str_radix(s, 16).ok();
    match hex.len() {
        3 => {
            let r = channel(&hex[0..1])?;
            let g = channel(&hex[1..2])?;
            let b = channel(&hex[2..3])?;
            // Expand 3-digit hex: #abc -> #aabbcc
            Some(Rgb::new(r * 17, g * 17, b * 17))
        }
        6 => Some(Rgb::new(
            channel(&hex[0..2])?,
            channel(&hex[2..4])?,
            channel(&hex[4..6])?,
        )),
        _ => None,
    }
}

fn parse_rgb_function(inner: &str) -> Option<Rgb> {
    let parts: Vec<&str> = inner.split(',').map(str::trim).collect();
    let [r, g, b] = parts.as_slice() else {
        return None;
    };
    let channel = |s: &str| -> Option<u8> {
        let value = match s.strip_suffix('%') {
            Some(pct) => pct.trim().parse::<f64>().ok()? / 100.0 * 255.0,
            None => s.parse::<f64>().ok()?,
        };
        Some(value.round().clamp(0.0, 255.0) as u8)
    };
    Some(Rgb::new(channel(r)?, channel(g)?, channel(b)?))
}

/// What kind of TikZ construct the options are for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StyleTarget {
    /// `\path[...]` for a drawable shape
    Shape,
    /// `\begin{scope}[...]`
    Group,
    /// `\node[...]` holding text
    Text,
}

#[derive(Debug, Clone, Copy)]
enum ValueKind {
    /// Plain number, emitted when not 1
    Scale,
    /// Number >= 1, emitted when not 1
    Factor,
    /// Length scaled into output units, emitted when not equal to the default
    Dimension(&'static str),
    /// Keyword lookup
    Keyword(&'static [(&'static str, &'static str)]),
}

/// SVG properties translated one-to-one into TikZ options, in output order.
/// An empty TikZ name means the keyword value is the whole option.
const PROPERTIES: &[(&str, &str, ValueKind)] = &[
    (
        "text-anchor",
        "anchor",
        ValueKind::Keyword(&[("start", "south west"), ("middle", "south"), ("end", "south east")]),
    ),
    ("opacity", "opacity", ValueKind::Scale),
    ("fill-opacity", "fill opacity", ValueKind::Scale),
    (
        "fill-rule",
        "",
        ValueKind::Keyword(&[("nonzero", "nonzero rule"), ("evenodd", "even odd rule")]),
    ),
    ("stroke-opacity", "draw opacity", ValueKind::Scale),
    (
        "stroke-linecap",
        "line cap",
        ValueKind::Keyword(&[("butt", "butt"), ("round", "round"), ("square", "rect")]),
    ),
    (
        "stroke-linejoin",
        "line join",
        ValueKind::Keyword(&[("miter", "miter"), ("round", "round"), ("bevel", "bevel")]),
    ),
    ("stroke-width", "line width", ValueKind::Dimension("")),
    ("stroke-miterlimit", "miter limit", ValueKind::Factor),
    ("stroke-dashoffset", "dash phase", ValueKind::Dimension("0")),
];

/// Turns style bags into TikZ option lists.
#[derive(Debug)]
pub struct StyleResolver<'a> {
    colors: &'a ColorTable,
    options: &'a ConvertOptions,
    /// `(name, rgb)` in first-use order
    definitions: Vec<(String, Rgb)>,
}

impl<'a> StyleResolver<'a> {
    pub fn new(colors: &'a ColorTable, options: &'a ConvertOptions) -> Self {
        Self {
            colors,
            options,
            definitions: Vec::new(),
        }
    }

    /// `\definecolor` lines for every custom color handed out so far.
    pub fn color_definitions(&self) -> String {
        self.definitions
            .iter()
            .map(|(name, rgb)| format!("\\definecolor{{{name}}}{{RGB}}{{{},{},{}}}\n", rgb.r, rgb.g, rgb.b))
            .collect()
    }

    /// TikZ name for a color, registering a definition when needed.
    pub fn color_name(&mut self, rgb: Rgb) -> String {
        if let Some((base, _)) = TIKZ_BASE_COLORS.iter().find(|(_, value)| *value == rgb) {
            return base.to_string();
        }
        // A base name with another value would redefine the base color
        let name = match self.colors.name_of(rgb) {
            Some(name) if !is_base_name(name) => name.to_string(),
            _ => format!("c{}", rgb.hex()),
        };
        if !self.definitions.iter().any(|(known, _)| *known == name) {
            self.definitions.push((name.clone(), rgb));
        }
        name
    }

    /// Options for a node with the given style.
    ///
    /// `length_scale` converts user-space lengths into output units (the
    /// decomposed scale of the node's cumulative transform).
    pub fn resolve(&mut self, style: &Style, target: StyleTarget, length_scale: f64) -> Vec<String> {
        let mut options = Vec::new();

        let paints: &[(&str, &str)] = match target {
            StyleTarget::Text => &[("fill", "text")],
            StyleTarget::Shape | StyleTarget::Group => &[("stroke", "draw"), ("fill", "fill")],
        };
        for &(property, key) in paints {
            match style.get(property) {
                Some(value) => {
                    if let Some(name) = self.paint_option(style, property, value) {
                        options.push(format!("{key}={name}"));
                    }
                }
                // SVG fills shapes black by default
                None if property == "fill" && target == StyleTarget::Shape => {
                    options.push("fill".to_string());
                }
                None => {}
            }
        }

        for &(property, tikz_name, kind) in PROPERTIES {
            let Some(value) = style.get(property) else {
                continue;
            };
            if value == "none" || (property == "text-anchor" && target != StyleTarget::Text) {
                continue;
            }
            options.extend(self.property_option(tikz_name, kind, value, length_scale));
        }

        if target != StyleTarget::Text {
            options.extend(self.markers(style));
            options.extend(self.dash_pattern(style, length_scale));
        }
        options
    }

    fn paint_option(&mut self, style: &Style, property: &str, value: &str) -> Option<String> {
        let value = if value.eq_ignore_ascii_case("currentcolor") {
            style.get("color").unwrap_or("black")
        } else {
            value
        };
        match parse_paint(value, self.colors) {
            Some(Paint::None) => None,
            Some(Paint::Color(rgb)) => Some(self.color_name(rgb)),
            None => {
                log::warn!(property, value, "unresolvable paint, leaving it out");
                None
            }
        }
    }

    fn property_option(
        &self,
        tikz_name: &str,
        kind: ValueKind,
        value: &str,
        length_scale: f64,
    ) -> Option<String> {
        let precision = self.options.precision;
        match kind {
            ValueKind::Scale | ValueKind::Factor => {
                let Ok(number) = value.parse::<f64>() else {
                    log::debug!(tikz_name, value, "ignoring non-numeric style value");
                    return None;
                };
                let out_of_range = matches!(kind, ValueKind::Factor) && number < 1.0;
                (!out_of_range && number != 1.0)
                    .then(|| format!("{tikz_name}={}", format_number(number, precision)))
            }
            ValueKind::Keyword(table) => {
                let (_, keyword) = table.iter().find(|(svg, _)| *svg == value)?;
                if tikz_name.is_empty() {
                    Some(keyword.to_string())
                } else {
                    Some(format!("{tikz_name}={keyword}"))
                }
            }
            ValueKind::Dimension(default) => {
                if value == default {
                    return None;
                }
                let Some(length) = self.output_length(value, length_scale) else {
                    log::debug!(tikz_name, value, "ignoring relative or malformed length");
                    return None;
                };
                Some(format!("{tikz_name}={length}"))
            }
        }
    }

    /// A user-space length formatted in output units, e.g. `0.0265cm`.
    ///
    /// Absolute units count CSS pixels, which are user units in the node's
    /// own coordinate system.
    fn output_length(&self, value: &str, length_scale: f64) -> Option<String> {
        let length = parse_length(value).ok()?;
        let user = match length.unit {
            LengthUnit::User => length.value,
            LengthUnit::Absolute(unit) => length.value * unit.px_per_unit(),
            LengthUnit::Percent | LengthUnit::Em | LengthUnit::Ex => return None,
        };
        Some(format!(
            "{}{}",
            format_number(user * length_scale, self.options.precision),
            self.options.output_unit
        ))
    }

    fn dash_pattern(&self, style: &Style, length_scale: f64) -> Option<String> {
        let value = style.get("stroke-dasharray")?;
        if value == "none" {
            return None;
        }
        let mut lengths: Vec<String> = value
            .split(|c: char| c == ',' || c.is_whitespace())
            .filter(|s| !s.is_empty())
            .map(|s| self.output_length(s, length_scale))
            .collect::<Option<_>>()?;
        if lengths.is_empty() {
            return None;
        }
        // An odd list is repeated to make it even
        if lengths.len() % 2 == 1 {
            lengths.extend_from_within(..);
        }
        let dashes: Vec<String> = lengths
            .chunks_exact(2)
            .map(|pair| format!("on {} off {}", pair[0], pair[1]))
            .collect();
        Some(format!("dash pattern={}", dashes.join(" ")))
    }

    fn markers(&self, style: &Style) -> Option<String> {
        let start = style.get("marker-start").filter(|m| *m != "none");
        let end = style.get("marker-end").filter(|m| *m != "none");
        if start.is_none() && end.is_none() {
            return None;
        }
        match self.options.markings {
            Markings::Ignore | Markings::Include => None,
            Markings::Interpret => Some(format!(
                "{}-{}",
                interpret_marker(start),
                interpret_marker(end)
            )),
            Markings::Arrows => Some(arrows_option(self.options.arrow, start, end)),
        }
    }
}

/// Guess an arrow tip from a marker reference such as `url(#Arrow2Lend)`.
fn interpret_marker(marker: Option<&str>) -> String {
    let Some(marker) = marker else {
        return String::new();
    };
    let id = marker
        .trim()
        .strip_prefix("url(")
        .and_then(|rest| rest.strip_suffix(')'))
        .map(|inner| inner.trim().trim_start_matches('#'))
        .unwrap_or(marker);

    let tip = if id.contains("Arrow1") {
        "latex"
    } else if id.contains("Arrow2") {
        "stealth"
    } else if id.contains("Stop") {
        "|"
    } else {
        "latex"
    };
    if marker.contains("end") {
        format!("{tip} reversed")
    } else {
        tip.to_string()
    }
}

/// Arrow option built from the configured tip.
///
/// The tip is written as `<`/`>` shorthand unless a marker id asks for the
/// opposite direction, in which case the explicit `reversed` form is kept.
fn arrows_option(tip: ArrowTip, start: Option<&str>, end: Option<&str>) -> String {
    let tip = tip.as_str();

    let mut start_arrow = match start {
        Some(marker) if marker.contains("end") => format!("{tip} reversed"),
        Some(_) => tip.to_string(),
        None => String::new(),
    };
    if start_arrow == tip {
        start_arrow = if end.is_some_and(|m| m.contains("end")) { ">" } else { "<" }.to_string();
    }

    let mut end_arrow = match end {
        Some(marker) if marker.contains("start") => format!("{tip} reversed"),
        Some(_) => tip.to_string(),
        None => String::new(),
    };
    if end_arrow == tip {
        end_arrow = ">".to_string();
    }

    format!("{start_arrow}-{end_arrow}")
}
