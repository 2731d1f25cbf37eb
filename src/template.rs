//! Output wrappers around the rendered drawing commands.

use crate::options::{CodeOutput, ConvertOptions};
use crate::render::Rendered;
use crate::render::tikz::format_number;

const CROP_PREAMBLE: &str = "\\usepackage[active,tightpage]{preview}\n\\PreviewEnvironment{tikzpicture}\n";

/// Wrap `rendered` according to `options.output`.
pub fn wrap(rendered: &Rendered, options: &ConvertOptions) -> String {
    match options.output {
        CodeOutput::Standalone => standalone(rendered, options),
        CodeOutput::FigOnly => figure(rendered, options),
        CodeOutput::CodeOnly => rendered.code.clone(),
    }
}

fn standalone(rendered: &Rendered, options: &ConvertOptions) -> String {
    let mut out = String::from("\\documentclass{article}\n\\usepackage[utf8]{inputenc}\n\\usepackage{tikz}\n");
    if options.crop {
        out.push_str(CROP_PREAMBLE);
    }
    out.push_str("\\begin{document}\n");
    out.push_str(&figure(rendered, options));
    out.push_str("\\end{document}\n");
    out
}

/// Color definitions followed by the `tikzpicture` environment.
fn figure(rendered: &Rendered, options: &ConvertOptions) -> String {
    let unit = options.output_unit.suffix();
    let mut out = rendered.color_definitions.clone();
    // Coordinates already carry the global scale; only nodes need it
    out.push_str(&format!(
        "\\def \\globalscale {{{}}}\n",
        format_number(options.scale, 6)
    ));
    out.push_str(&format!("\\begin{{tikzpicture}}[y=1{unit}, x=1{unit}, "));
    if options.keep_source_origin {
        out.push_str("yscale=-1, ");
    }
    out.push_str(
        "every node/.append style={scale=\\globalscale}, inner sep=0pt, outer sep=0pt]\n",
    );
    out.push_str(&rendered.code);
    out.push_str("\\end{tikzpicture}\n");
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::units::Unit;

    fn rendered() -> Rendered {
        Rendered {
            code: "\\path[draw] (0, 0) -- (1, 1);\n".to_string(),
            color_definitions: "\\definecolor{c123456}{RGB}{18,52,86}\n".to_string(),
        }
    }

    #[test]
    fn code_only_is_just_the_commands() {
        let options = ConvertOptions::default().with_output(CodeOutput::CodeOnly);
        assert_eq!(wrap(&rendered(), &options), rendered().code);
    }

    #[test]
    fn figure_has_colors_and_picture() {
        let options = ConvertOptions::default()
            .with_output(CodeOutput::FigOnly)
            .with_output_unit(Unit::Mm)
            .with_scale(0.8);
        insta::assert_snapshot!(wrap(&rendered(), &options), @r"
        \definecolor{c123456}{RGB}{18,52,86}
        \def \globalscale {0.8}
        \begin{tikzpicture}[y=1mm, x=1mm, every node/.append style={scale=\globalscale}, inner sep=0pt, outer sep=0pt]
        \path[draw] (0, 0) -- (1, 1);
        \end{tikzpicture}
        ");
    }

    #[test]
    fn standalone_wraps_a_document() {
        let options = ConvertOptions::default().with_crop(true).with_keep_source_origin(true);
        let out = wrap(&rendered(), &options);
        assert!(out.starts_with("\\documentclass{article}\n"));
        assert!(out.contains("\\usepackage[active,tightpage]{preview}\n\\PreviewEnvironment{tikzpicture}\n\\begin{document}\n"));
        assert!(out.contains("[y=1cm, x=1cm, yscale=-1, every node"));
        assert!(out.ends_with("\\end{tikzpicture}\n\\end{document}\n"));
    }

    #[test]
    fn crop_is_off_by_default() {
        let out = wrap(&rendered(), &ConvertOptions::default());
        assert!(!out.contains("preview"));
        assert!(!out.contains("yscale"));
    }
}
