//! Conversion options

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use crate::units::Unit;

/// How much of a LaTeX document wraps the generated drawing code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CodeOutput {
    /// A complete compilable document
    #[default]
    Standalone,
    /// Color definitions plus the `tikzpicture` environment
    FigOnly,
    /// Drawing commands only
    CodeOnly,
}

/// How text content is handed to TeX.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TexMode {
    /// Escape TeX special characters
    #[default]
    Escape,
    /// Wrap the text in `$...$`
    Math,
    /// Pass the text through untouched
    Raw,
}

/// What to do with `marker-start` / `marker-end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Markings {
    #[default]
    Ignore,
    Include,
    /// Guess the arrow tip from the marker's id
    Interpret,
    /// Every marker becomes the configured arrow tip
    Arrows,
}

/// Arrow tip used by `Markings::Arrows`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ArrowTip {
    #[default]
    Latex,
    Stealth,
    To,
    Gt,
}

macro_rules! keyword_enum {
    ($ty:ident { $($variant:ident => $name:literal),* $(,)? }) => {
        impl $ty {
            pub fn as_str(self) -> &'static str {
                match self {
                    $($ty::$variant => $name,)*
                }
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $ty {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($name => Ok($ty::$variant),)*
                    other => Err(format!(
                        "unknown {} `{other}` (expected one of: {})",
                        stringify!($ty),
                        [$($name),*].join(", ")
                    )),
                }
            }
        }
    };
}

keyword_enum!(CodeOutput { Standalone => "standalone", FigOnly => "figonly", CodeOnly => "codeonly" });
keyword_enum!(TexMode { Escape => "escape", Math => "math", Raw => "raw" });
keyword_enum!(Markings {
    Ignore => "ignore",
    Include => "include",
    Interpret => "interpret",
    Arrows => "arrows",
});
keyword_enum!(ArrowTip { Latex => "latex", Stealth => "stealth", To => "to", Gt => ">" });

/// Everything that influences a conversion.
#[derive(Debug, Clone, PartialEq)]
pub struct ConvertOptions {
    pub output: CodeOutput,
    /// Add the `preview` package so the page is cropped to the picture
    pub crop: bool,
    /// Break long drawing commands at 80 columns
    pub wrap: bool,
    /// Indent nested scopes
    pub indent: bool,
    /// Decimal places kept in coordinates and lengths
    pub precision: usize,
    /// Global scale applied to every coordinate
    pub scale: f64,
    pub output_unit: Unit,
    /// Keep the SVG y-down origin instead of flipping to TikZ's y-up
    pub keep_source_origin: bool,
    /// Skip all text nodes
    pub notext: bool,
    pub texmode: TexMode,
    /// Attribute whose value (on a text node or an ancestor) overrides `texmode`
    pub texmode_attribute: Option<String>,
    pub markings: Markings,
    pub arrow: ArrowTip,
    /// Prefix stripped from image references
    pub remove_absolute: Option<String>,
    /// Only emit these ids (and their descendants)
    pub selection: Option<HashSet<String>>,
    /// Emit a `%id` comment before every node
    pub verbose: bool,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            output: CodeOutput::Standalone,
            crop: false,
            wrap: false,
            indent: true,
            precision: crate::render::defaults::PRECISION,
            scale: 1.0,
            output_unit: Unit::Cm,
            keep_source_origin: false,
            notext: false,
            texmode: TexMode::Escape,
            texmode_attribute: None,
            markings: Markings::Ignore,
            arrow: ArrowTip::Latex,
            remove_absolute: None,
            selection: None,
            verbose: false,
        }
    }
}

impl ConvertOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_output(mut self, output: CodeOutput) -> Self {
        self.output = output;
        self
    }

    pub fn with_crop(mut self, crop: bool) -> Self {
        self.crop = crop;
        self
    }

    pub fn with_wrap(mut self, wrap: bool) -> Self {
        self.wrap = wrap;
        self
    }

    pub fn with_indent(mut self, indent: bool) -> Self {
        self.indent = indent;
        self
    }

    pub fn with_precision(mut self, precision: usize) -> Self {
        self.precision = precision;
        self
    }

    pub fn with_scale(mut self, scale: f64) -> Self {
        self.scale = scale;
        self
    }

    pub fn with_output_unit(mut self, unit: Unit) -> Self {
        self.output_unit = unit;
        self
    }

    pub fn with_keep_source_origin(mut self, keep: bool) -> Self {
        self.keep_source_origin = keep;
        self
    }

    pub fn with_notext(mut self, notext: bool) -> Self {
        self.notext = notext;
        self
    }

    pub fn with_texmode(mut self, texmode: TexMode) -> Self {
        self.texmode = texmode;
        self
    }

    pub fn with_texmode_attribute(mut self, attribute: impl Into<String>) -> Self {
        self.texmode_attribute = Some(attribute.into());
        self
    }

    pub fn with_markings(mut self, markings: Markings) -> Self {
        self.markings = markings;
        self
    }

    pub fn with_arrow(mut self, arrow: ArrowTip) -> Self {
        self.arrow = arrow;
        self
    }

    pub fn with_remove_absolute(mut self, prefix: impl Into<String>) -> Self {
        self.remove_absolute = Some(prefix.into());
        self
    }

    pub fn with_selection<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.selection = Some(ids.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Whether `id` is part of the selection (always true without one).
    pub fn is_selected(&self, id: Option<&str>) -> bool {
        match (&self.selection, id) {
            (None, _) => true,
            (Some(ids), Some(id)) => ids.contains(id),
            (Some(_), None) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_documented_values() {
        let options = ConvertOptions::default();
        assert_eq!(options.output, CodeOutput::Standalone);
        assert!(options.indent);
        assert!(!options.wrap);
        assert_eq!(options.precision, 4);
        assert_eq!(options.output_unit, Unit::Cm);
        assert_eq!(options.markings, Markings::Ignore);
        assert!(options.is_selected(None));
    }

    #[test]
    fn keywords_parse_and_print() {
        assert_eq!("figonly".parse::<CodeOutput>(), Ok(CodeOutput::FigOnly));
        assert_eq!("math".parse::<TexMode>(), Ok(TexMode::Math));
        assert_eq!(">".parse::<ArrowTip>(), Ok(ArrowTip::Gt));
        assert_eq!(Markings::Interpret.to_string(), "interpret");
        let err = "fancy".parse::<TexMode>().unwrap_err();
        assert!(err.contains("escape, math, raw"), "{err}");
    }

    #[test]
    fn selection_matches_ids_only() {
        let options = ConvertOptions::new().with_selection(["a", "b"]);
        assert!(options.is_selected(Some("a")));
        assert!(!options.is_selected(Some("c")));
        assert!(!options.is_selected(None));
    }
}
