//! Convert SVG drawings into TikZ code for LaTeX documents.
//!
//! The pipeline runs in three stages:
//! - [`document::load`] reads SVG source into a read-only [`scene::Scene`]
//! - [`render::render`] walks the scene and emits TikZ drawing commands
//! - [`template::wrap`] places the commands in the requested output wrapper
//!
//! ```
//! use svg2tikz::{CodeOutput, ConvertOptions, convert};
//!
//! let svg = r#"<svg xmlns="http://www.w3.org/2000/svg" width="10" height="10">
//!   <line x1="0" y1="0" x2="10" y2="10" stroke="black" fill="none"/>
//! </svg>"#;
//! let options = ConvertOptions::default().with_output(CodeOutput::CodeOnly);
//! let tikz = convert(svg, &options).unwrap();
//! assert!(tikz.starts_with("\\path[draw=black] "));
//! ```

use pest_derive::Parser;

pub mod document;
pub mod errors;
pub mod log;
pub mod options;
pub mod parse;
pub mod render;
pub mod scene;
pub mod template;
pub mod types;
pub mod units;

pub use errors::{ConvertError, DocumentError, PathDataError};
pub use options::{ArrowTip, CodeOutput, ConvertOptions, Markings, TexMode};
pub use units::Unit;

#[derive(Parser)]
#[grammar = "svg.pest"]
pub struct SvgParser;

/// Convert SVG source text to TikZ, wrapped as `options.output` asks.
pub fn convert(source: &str, options: &ConvertOptions) -> Result<String, ConvertError> {
    let scene = document::load(source, options)?;
    let rendered = render::render(&scene, options)?;
    Ok(template::wrap(&rendered, options))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn code_only() -> ConvertOptions {
        ConvertOptions::default()
            .with_output(CodeOutput::CodeOnly)
            .with_output_unit(Unit::Px)
    }

    #[test]
    fn converts_a_line() {
        let svg = r#"<svg xmlns="http://www.w3.org/2000/svg" width="10" height="10">
            <line x1="0" y1="0" x2="10" y2="5" stroke="black"/>
        </svg>"#;
        let out = convert(svg, &code_only()).unwrap();
        assert_eq!(out, "\\path[draw=black,fill] (0, 10) -- (10, 5);\n");
    }

    #[test]
    fn malformed_path_data_aborts() {
        let svg = r#"<svg xmlns="http://www.w3.org/2000/svg"><path id="p" d="M 0 0 L 1 #"/></svg>"#;
        let err = convert(svg, &code_only()).unwrap_err();
        assert!(matches!(err, ConvertError::PathData(ref e) if e.node == "p"));
    }

    #[test]
    fn standalone_output_is_a_document() {
        let svg = r#"<svg xmlns="http://www.w3.org/2000/svg"/>"#;
        let out = convert(svg, &ConvertOptions::default()).unwrap();
        assert!(out.contains("\\begin{document}"));
        assert!(out.contains("\\begin{tikzpicture}"));
    }
}
