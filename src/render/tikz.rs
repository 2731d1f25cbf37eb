//! TikZ code emitter
//!
//! Formats numbers, coordinates and whole commands. All geometry handed to
//! the emitter is already in output space.

use super::defaults::{INDENT, WRAP_WIDTH};
use crate::options::{ConvertOptions, TexMode};
use crate::types::{OutputSpace, Path, PathSegment, Point};

/// Round to `precision` decimals (half away from zero) and print without
/// trailing zeros, a trailing point or a negative zero.
pub fn format_number(value: f64, precision: usize) -> String {
    if !value.is_finite() {
        return "0".to_string();
    }
    let factor = 10f64.powi(precision.min(15) as i32);
    let rounded = (value * factor).round() / factor;
    let mut text = format!("{rounded:.precision$}");
    if text.contains('.') {
        let trimmed = text.trim_end_matches('0').trim_end_matches('.').len();
        text.truncate(trimmed);
    }
    if text == "-0" {
        text = "0".to_string();
    }
    text
}

/// `(x, y)` with both coordinates formatted.
pub fn format_point(point: Point, precision: usize) -> String {
    format!(
        "({}, {})",
        format_number(point.x, precision),
        format_number(point.y, precision)
    )
}

/// `[a,b,c]`, or nothing for an empty list.
pub fn options_to_str(options: &[String]) -> String {
    if options.is_empty() {
        String::new()
    } else {
        format!("[{}]", options.join(","))
    }
}

/// Escape the characters TeX treats specially.
pub fn escape_tex(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '$' => escaped.push_str(r"\$"),
            '\\' => escaped.push_str(r"$\backslash$"),
            '%' => escaped.push_str(r"\%"),
            '_' => escaped.push_str(r"\_"),
            '#' => escaped.push_str(r"\#"),
            '{' => escaped.push_str(r"\{"),
            '}' => escaped.push_str(r"\}"),
            '^' => escaped.push_str(r"\^{}"),
            '&' => escaped.push_str(r"\&"),
            other => escaped.push(other),
        }
    }
    escaped
}

/// Path operations as atomic tokens; a coordinate is a single token.
pub fn path_tokens(path: &Path<OutputSpace>, precision: usize) -> Vec<String> {
    let point = |p: Point| format_point(p, precision);
    let mut tokens = Vec::new();
    for segment in path.segments() {
        match *segment {
            PathSegment::MoveTo(p) => tokens.push(point(p)),
            PathSegment::LineTo(p) => {
                tokens.push("--".to_string());
                tokens.push(point(p));
            }
            PathSegment::CubicTo { ctrl1, ctrl2, end } => {
                tokens.extend([
                    "..".to_string(),
                    "controls".to_string(),
                    point(ctrl1),
                    "and".to_string(),
                    point(ctrl2),
                    "..".to_string(),
                    point(end),
                ]);
            }
            PathSegment::ClosePath => {
                tokens.push("--".to_string());
                tokens.push("cycle".to_string());
            }
        }
    }
    tokens
}

/// Formats commands, scopes and comments for one conversion.
#[derive(Debug, Clone, Copy)]
pub struct TikzWriter<'a> {
    options: &'a ConvertOptions,
}

impl<'a> TikzWriter<'a> {
    pub fn new(options: &'a ConvertOptions) -> Self {
        Self { options }
    }

    pub fn precision(&self) -> usize {
        self.options.precision
    }

    fn indent(&self, depth: usize) -> String {
        if self.options.indent {
            INDENT.repeat(depth)
        } else {
            String::new()
        }
    }

    /// `%id` line announcing a node in verbose mode.
    pub fn node_comment(&self, depth: usize, id: Option<&str>) -> String {
        match id {
            Some(id) if self.options.verbose => format!("{}%{id}\n", self.indent(depth)),
            _ => String::new(),
        }
    }

    /// One command terminated by `;`, wrapped if requested.
    ///
    /// Wrapping is greedy on whole tokens; continuation lines get one extra
    /// indent level. A token longer than the width stays on its own line.
    pub fn command(&self, depth: usize, head: &str, tokens: &[String]) -> String {
        let indent = self.indent(depth);
        let mut line = format!("{indent}{head}");
        if !self.options.wrap {
            for token in tokens {
                line.push(' ');
                line.push_str(token);
            }
            line.push_str(";\n");
            return line;
        }

        let continuation = format!("{indent}{INDENT}");
        let mut out = String::new();
        let last = tokens.len().saturating_sub(1);
        let mut fresh = false;
        for (i, token) in tokens.iter().enumerate() {
            // The terminating `;` sticks to the last token
            let token_len = token.chars().count() + usize::from(i == last);
            if !fresh && line.chars().count() + 1 + token_len > WRAP_WIDTH {
                out.push_str(&line);
                out.push('\n');
                line = continuation.clone();
                fresh = true;
            }
            if !fresh {
                line.push(' ');
            }
            line.push_str(token);
            fresh = false;
        }
        line.push(';');
        out.push_str(&line);
        out.push('\n');
        out
    }

    /// `\path[options] ...;`
    pub fn path(&self, depth: usize, options: &[String], path: &Path<OutputSpace>) -> String {
        let head = format!("\\path{}", options_to_str(options));
        self.command(depth, &head, &path_tokens(path, self.precision()))
    }

    /// `\begin{scope}[options] ... \end{scope}` around already formatted code.
    pub fn scope(&self, depth: usize, options: &[String], id: Option<&str>, body: &str) -> String {
        let indent = self.indent(depth);
        let comment = match id {
            Some(id) if self.options.verbose => format!(" % {id}"),
            _ => String::new(),
        };
        format!(
            "{indent}\\begin{{scope}}{}{comment}\n{body}{indent}\\end{{scope}}\n",
            options_to_str(options)
        )
    }

    /// `\node[options] (id) at (x, y) {text};`
    pub fn text_node(
        &self,
        depth: usize,
        options: &[String],
        id: Option<&str>,
        position: Point,
        content: &str,
        texmode: TexMode,
    ) -> String {
        let text = match texmode {
            TexMode::Escape => escape_tex(content),
            TexMode::Math => format!("${content}$"),
            TexMode::Raw => content.to_string(),
        };
        let mut tokens = Vec::new();
        if let Some(id) = id {
            tokens.push(format!("({id})"));
        }
        tokens.push("at".to_string());
        tokens.push(format_point(position, self.precision()));
        tokens.push(format!("{{{text}}}"));
        let head = format!("\\node{}", options_to_str(options));
        self.command(depth, &head, &tokens)
    }

    /// `\node[anchor=north west,inner sep=0] (id) at (x, y) {\includegraphics[...]{href}};`
    pub fn image_node(
        &self,
        depth: usize,
        id: Option<&str>,
        top_left: Point,
        size: Point,
        href: &str,
    ) -> String {
        let precision = self.precision();
        let unit = self.options.output_unit;
        let mut tokens = Vec::new();
        if let Some(id) = id {
            tokens.push(format!("({id})"));
        }
        tokens.push("at".to_string());
        tokens.push(format_point(top_left, precision));
        tokens.push(format!(
            "{{\\includegraphics[width={}{unit},height={}{unit}]{{{href}}}}}",
            format_number(size.x, precision),
            format_number(size.y, precision),
        ));
        self.command(depth, "\\node[anchor=north west,inner sep=0]", &tokens)
    }

    /// Comment standing in for an image that cannot be referenced.
    pub fn skipped_image(&self, depth: usize, id: Option<&str>) -> String {
        format!(
            "{}% Image {} not included. Base64 still not supported\n",
            self.indent(depth),
            id.unwrap_or("(unnamed)")
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::dvec2;

    fn output_path(segments: Vec<PathSegment>) -> Path<OutputSpace> {
        Path::from_segments(segments)
    }

    #[test]
    fn format_number_rounds_and_trims() {
        assert_eq!(format_number(1.0, 4), "1");
        assert_eq!(format_number(1.5, 4), "1.5");
        assert_eq!(format_number(0.123456, 4), "0.1235");
        assert_eq!(format_number(2.00004, 4), "2");
        assert_eq!(format_number(-0.00001, 4), "0");
        assert_eq!(format_number(-2.5, 0), "-3");
        assert_eq!(format_number(2.5, 0), "3");
        assert_eq!(format_number(100.0, 2), "100");
        assert_eq!(format_number(-12.3, 3), "-12.3");
        assert_eq!(format_number(f64::NAN, 3), "0");
    }

    #[test]
    fn format_number_is_idempotent() {
        let mut state = 0x2545_f491_4f6c_dd1du64;
        for precision in 0..7 {
            for _ in 0..500 {
                state ^= state << 13;
                state ^= state >> 7;
                state ^= state << 17;
                let value = (state as f64 / u64::MAX as f64 - 0.5) * 2000.0;
                let once = format_number(value, precision);
                let reparsed: f64 = once.parse().unwrap();
                assert_eq!(format_number(reparsed, precision), once, "value {value}");
            }
        }
    }

    #[test]
    fn path_tokens_cover_every_segment() {
        let path = output_path(vec![
            PathSegment::MoveTo(dvec2(0.0, 0.0)),
            PathSegment::LineTo(dvec2(1.0, 0.0)),
            PathSegment::CubicTo {
                ctrl1: dvec2(1.0, 1.0),
                ctrl2: dvec2(0.5, 1.5),
                end: dvec2(0.0, 1.0),
            },
            PathSegment::ClosePath,
            PathSegment::MoveTo(dvec2(5.0, 5.0)),
            PathSegment::LineTo(dvec2(6.0, 5.0)),
        ]);
        assert_eq!(
            path_tokens(&path, 4).join(" "),
            "(0, 0) -- (1, 0) .. controls (1, 1) and (0.5, 1.5) .. (0, 1) -- cycle (5, 5) -- (6, 5)"
        );
    }

    #[test]
    fn command_without_wrap_is_one_line() {
        let options = ConvertOptions::default();
        let writer = TikzWriter::new(&options);
        let tokens = vec!["(0, 0)".to_string(), "--".to_string(), "(1, 1)".to_string()];
        assert_eq!(writer.command(2, "\\path[draw=red]", &tokens), "    \\path[draw=red] (0, 0) -- (1, 1);\n");
    }

    #[test]
    fn wrapping_never_splits_coordinates() {
        let options = ConvertOptions::default().with_wrap(true).with_indent(false);
        let writer = TikzWriter::new(&options);
        let mut tokens = vec!["(100.1234, 200.5678)".to_string()];
        for i in 0..12 {
            tokens.push("--".to_string());
            tokens.push(format!("({i}.1234, {i}.5678)"));
        }
        let code = writer.command(0, "\\path[fill]", &tokens);
        assert!(code.lines().count() > 1);
        for line in code.lines() {
            assert!(line.chars().count() <= WRAP_WIDTH, "{line:?} is too long");
            assert_eq!(line.matches('(').count(), line.matches(')').count(), "{line:?}");
        }
        assert!(code.lines().skip(1).all(|line| line.starts_with(INDENT)));
        assert!(code.ends_with(";\n"));
        let rejoined: Vec<&str> = code.split_whitespace().collect();
        let original: Vec<String> = std::iter::once("\\path[fill]".to_string())
            .chain(tokens.iter().cloned())
            .collect::<Vec<_>>()
            .join(" ")
            .split_whitespace()
            .map(str::to_string)
            .collect();
        assert_eq!(rejoined.join(" "), format!("{};", original.join(" ")));
    }

    #[test]
    fn scopes_wrap_their_body() {
        let options = ConvertOptions::default().with_verbose(true);
        let writer = TikzWriter::new(&options);
        let body = "  \\path (0, 0);\n";
        assert_eq!(
            writer.scope(0, &["opacity=0.5".to_string()], Some("g1"), body),
            "\\begin{scope}[opacity=0.5] % g1\n  \\path (0, 0);\n\\end{scope}\n"
        );
    }

    #[test]
    fn text_nodes_escape_by_mode() {
        let options = ConvertOptions::default();
        let writer = TikzWriter::new(&options);
        let opts = vec!["anchor=south west".to_string()];
        assert_eq!(
            writer.text_node(0, &opts, Some("t1"), dvec2(1.0, 2.0), "50% & more", TexMode::Escape),
            "\\node[anchor=south west] (t1) at (1, 2) {50\\% \\& more};\n"
        );
        assert_eq!(
            writer.text_node(0, &opts, None, dvec2(1.0, 2.0), "x^2", TexMode::Math),
            "\\node[anchor=south west] at (1, 2) {$x^2$};\n"
        );
    }

    #[test]
    fn escape_tex_handles_every_special_character() {
        assert_eq!(escape_tex("%{}_^\\$"), r"\%\{\}\_\^{}$\backslash$\$");
        assert_eq!(escape_tex("#&"), r"\#\&");
    }

    #[test]
    fn image_nodes_include_graphics() {
        let options = ConvertOptions::default();
        let writer = TikzWriter::new(&options);
        assert_eq!(
            writer.image_node(0, Some("img"), dvec2(0.0, 2.0), dvec2(3.0, 2.0), "pic.png"),
            "\\node[anchor=north west,inner sep=0] (img) at (0, 2) {\\includegraphics[width=3cm,height=2cm]{pic.png}};\n"
        );
    }
}
