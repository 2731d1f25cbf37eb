//! Error types with rich diagnostics using miette
//!
//! Grammar errors carry source spans into the offending attribute value so
//! the report points at the exact character that broke the parse.

use miette::{Diagnostic, NamedSource, SourceSpan};
use thiserror::Error;

/// Source context for error reporting
#[derive(Debug, Clone)]
pub struct SourceContext {
    /// Name of the source (node identifier or attribute name)
    pub name: String,
    /// The full attribute text
    pub source: String,
}

impl SourceContext {
    /// Create a new source context
    pub fn new(name: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            source: source.into(),
        }
    }

    /// Create a NamedSource for miette
    pub fn named_source(&self) -> NamedSource<String> {
        NamedSource::new(&self.name, self.source.clone())
    }

    /// Span of the token starting at `offset` (runs of non-separator chars).
    pub fn token_span(&self, offset: usize) -> (String, SourceSpan) {
        let offset = offset.min(self.source.len());
        let rest = &self.source[offset..];
        let len = rest
            .find(|c: char| c.is_whitespace() || c == ',')
            .unwrap_or(rest.len())
            .max(rest.chars().next().map_or(0, char::len_utf8));
        (rest[..len].to_string(), (offset, len).into())
    }
}

// ============================================================================
// Grammar Errors
// ============================================================================

/// Path data (`d` attribute) that does not follow the SVG path grammar.
#[derive(Error, Diagnostic, Debug)]
#[error("invalid path data in `{node}`: unexpected {}", describe_token(.token))]
#[diagnostic(code(svg2tikz::parse::path_data))]
pub struct PathDataError {
    /// Identifier of the node owning the path data
    pub node: String,
    /// The raw offending token (empty at end of input)
    pub token: String,
    /// What the grammar would have accepted
    #[help]
    pub expected: String,
    #[source_code]
    pub src: NamedSource<String>,
    #[label("here")]
    pub span: SourceSpan,
}

fn describe_token(token: &str) -> String {
    if token.is_empty() {
        "end of input".to_string()
    } else {
        format!("`{token}`")
    }
}

/// Errors from the smaller attribute grammars (transform lists, lengths).
///
/// These are recovered by the document loader; they only surface through
/// the diagnostic channel.
#[derive(Error, Diagnostic, Debug)]
pub enum AttributeError {
    #[error("invalid transform list")]
    #[diagnostic(code(svg2tikz::parse::transform))]
    Transform {
        #[source_code]
        src: NamedSource<String>,
        #[label("unexpected input")]
        span: SourceSpan,
    },

    #[error("invalid number list")]
    #[diagnostic(code(svg2tikz::parse::number_list))]
    NumberList {
        #[source_code]
        src: NamedSource<String>,
        #[label("unexpected input")]
        span: SourceSpan,
    },

    #[error("invalid length: {value}")]
    #[diagnostic(code(svg2tikz::parse::length))]
    Length { value: String },
}

// ============================================================================
// Document Errors
// ============================================================================

/// Errors that occur while turning SVG source into a scene graph
#[derive(Error, Diagnostic, Debug)]
pub enum DocumentError {
    #[error("document is not well-formed XML")]
    #[diagnostic(code(svg2tikz::document::xml))]
    Xml(#[from] roxmltree::Error),

    #[error("root element is <{tag}>, expected <svg>")]
    #[diagnostic(code(svg2tikz::document::not_svg))]
    NotSvg { tag: String },

    #[error("element nesting deeper than {limit} levels")]
    #[diagnostic(
        code(svg2tikz::document::too_deep),
        help("flatten the document or check for recursive <use> references")
    )]
    NestingTooDeep { limit: usize },

    #[error("<use> references expand to more than {limit} elements")]
    #[diagnostic(
        code(svg2tikz::document::use_expansion),
        help("the document repeats nested <use> references too many times")
    )]
    UseExpansionTooLarge { limit: usize },
}

// ============================================================================
// Conversion Errors
// ============================================================================

/// Anything that aborts a whole conversion.
#[derive(Error, Diagnostic, Debug)]
pub enum ConvertError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    PathData(#[from] PathDataError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Document(#[from] DocumentError),
}
