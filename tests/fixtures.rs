use camino::Utf8Path;
use regex_lite::Regex;
use svg2tikz::{CodeOutput, ConvertOptions, convert};

/// Width the wrapping mode aims for
const WRAP_WIDTH: usize = 80;

fn code_only() -> ConvertOptions {
    ConvertOptions::default().with_output(CodeOutput::CodeOnly)
}

/// Every emitted coordinate is `(x, y)` with at most `precision` decimals,
/// no trailing zeros and no negative zero.
fn check_numbers(path: &Utf8Path, code: &str, precision: usize) {
    let coordinate = Regex::new(r"\((-?[0-9.]+), (-?[0-9.]+)\)").unwrap();
    for captures in coordinate.captures_iter(code) {
        for number in [&captures[1], &captures[2]] {
            assert_ne!(number, "-0", "{path}: negative zero in {code}");
            if let Some((_, decimals)) = number.split_once('.') {
                assert!(
                    !decimals.is_empty() && decimals.len() <= precision,
                    "{path}: `{number}` has too many decimals"
                );
                assert!(!decimals.ends_with('0'), "{path}: `{number}` keeps trailing zeros");
            }
            assert!(number.parse::<f64>().is_ok(), "{path}: `{number}` is not a number");
        }
    }
}

/// Scopes open and close in order, and every other line is a command or a
/// comment.
fn check_structure(path: &Utf8Path, code: &str) {
    let mut open_scopes: Vec<usize> = Vec::new();
    for line in code.lines() {
        let indent = line.len() - line.trim_start().len();
        let line = line.trim_start();
        if line.starts_with("\\begin{scope}") {
            open_scopes.push(indent);
        } else if line.starts_with("\\end{scope}") {
            let opened_at = open_scopes.pop();
            assert_eq!(opened_at, Some(indent), "{path}: unbalanced scope in\n{code}");
        } else if line.starts_with("\\path") || line.starts_with("\\node") {
            assert!(line.ends_with(';'), "{path}: unterminated command `{line}`");
        } else {
            assert!(line.starts_with('%'), "{path}: unexpected line `{line}`");
        }
    }
    assert!(open_scopes.is_empty(), "{path}: unclosed scope in\n{code}");
}

fn check_wrapping(path: &Utf8Path, code: &str) {
    for line in code.lines() {
        let trimmed = line.trim();
        let fits = line.chars().count() <= WRAP_WIDTH;
        let single_token = !trimmed.contains(' ');
        let bare_head = trimmed.starts_with('\\') && trimmed.ends_with(']');
        assert!(
            fits || single_token || bare_head,
            "{path}: line exceeds {WRAP_WIDTH} columns: `{line}`"
        );
    }
}

fn convert_fixture(path: &Utf8Path) -> datatest_stable::Result<()> {
    let source = std::fs::read_to_string(path)?;

    let code = convert(&source, &code_only())?;
    assert!(
        code.contains("\\path") || code.contains("\\node"),
        "{path}: nothing was drawn"
    );
    check_structure(path, &code);
    check_numbers(path, &code, 4);

    // Same input, same output
    assert_eq!(code, convert(&source, &code_only())?, "{path}: output is not deterministic");

    let wrapped = convert(&source, &code_only().with_wrap(true))?;
    check_wrapping(path, &wrapped);
    let rejoined: String = wrapped.split_whitespace().collect::<Vec<_>>().join(" ");
    let unwrapped: String = code.split_whitespace().collect::<Vec<_>>().join(" ");
    assert_eq!(rejoined, unwrapped, "{path}: wrapping changed the commands");

    let rounded = convert(&source, &code_only().with_precision(2))?;
    check_numbers(path, &rounded, 2);

    let flat = convert(&source, &code_only().with_indent(false))?;
    assert!(
        flat.lines().all(|line| !line.starts_with(' ')),
        "{path}: indentation leaked into flat output"
    );

    let document = convert(&source, &ConvertOptions::default())?;
    assert!(document.contains(&code), "{path}: standalone output lost the drawing code");
    Ok(())
}

datatest_stable::harness! {
    { test = convert_fixture, root = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures"), pattern = r"\.svg$" },
}
