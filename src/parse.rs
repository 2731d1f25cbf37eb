//! Parse pest pairs into path commands, transforms, number lists and lengths

use crate::errors::{AttributeError, PathDataError, SourceContext};
use crate::log;
use crate::types::{Point, Transform};
use crate::units::{Length, LengthUnit};
use crate::{Rule, SvgParser};
use glam::dvec2;
use pest::Parser;
use pest::error::{Error as PestError, ErrorVariant, InputLocation};
use pest::iterators::Pair;

/// A path-data command with its arguments exactly as written.
///
/// Whether the coordinates are relative is carried by `PathInstruction`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PathCommand {
    MoveTo { to: Point },
    LineTo { to: Point },
    Horizontal { x: f64 },
    Vertical { y: f64 },
    CurveTo { ctrl1: Point, ctrl2: Point, to: Point },
    SmoothCurveTo { ctrl2: Point, to: Point },
    QuadTo { ctrl: Point, to: Point },
    SmoothQuadTo { to: Point },
    ArcTo {
        rx: f64,
        ry: f64,
        x_axis_rotation: f64,
        large_arc: bool,
        sweep: bool,
        to: Point,
    },
    ClosePath,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PathInstruction {
    pub command: PathCommand,
    pub relative: bool,
}

/// Parse a `d` attribute into instructions.
///
/// Implicit repetition is expanded: extra coordinate groups after a command
/// letter become further instructions of the same kind, except after a
/// moveto where they become linetos (SVG rule).
pub fn parse_path_data(node: &str, source: &str) -> Result<Vec<PathInstruction>, PathDataError> {
    let pairs = SvgParser::parse(Rule::path_data, source)
        .map_err(|e| path_data_error(node, source, e))?;

    let mut instructions = Vec::new();
    for pair in pairs.flatten().filter(|p| is_command_rule(p.as_rule())) {
        parse_command(pair, &mut instructions);
    }
    Ok(instructions)
}

fn is_command_rule(rule: Rule) -> bool {
    matches!(
        rule,
        Rule::moveto
            | Rule::lineto
            | Rule::horizontal_lineto
            | Rule::vertical_lineto
            | Rule::curveto
            | Rule::smooth_curveto
            | Rule::quadratic_curveto
            | Rule::smooth_quadratic_curveto
            | Rule::elliptical_arc
            | Rule::closepath
    )
}

fn parse_command(pair: Pair<Rule>, out: &mut Vec<PathInstruction>) {
    let rule = pair.as_rule();
    let mut inner = pair.into_inner();
    let Some(letter) = inner.next() else {
        return;
    };
    let relative = letter.as_str().chars().all(|c| c.is_ascii_lowercase());
    let mut push = |command| out.push(PathInstruction { command, relative });

    match rule {
        Rule::moveto => {
            for (i, arg) in inner.enumerate() {
                let to = parse_pair(arg);
                if i == 0 {
                    push(PathCommand::MoveTo { to });
                } else {
                    push(PathCommand::LineTo { to });
                }
            }
        }
        Rule::lineto => inner.for_each(|arg| push(PathCommand::LineTo { to: parse_pair(arg) })),
        Rule::horizontal_lineto => {
            inner.for_each(|arg| push(PathCommand::Horizontal { x: parse_number(arg) }))
        }
        Rule::vertical_lineto => {
            inner.for_each(|arg| push(PathCommand::Vertical { y: parse_number(arg) }))
        }
        Rule::curveto => {
            for arg in inner {
                let [ctrl1, ctrl2, to] = parse_pairs::<3>(arg);
                push(PathCommand::CurveTo { ctrl1, ctrl2, to });
            }
        }
        Rule::smooth_curveto => {
            for arg in inner {
                let [ctrl2, to] = parse_pairs::<2>(arg);
                push(PathCommand::SmoothCurveTo { ctrl2, to });
            }
        }
        Rule::quadratic_curveto => {
            for arg in inner {
                let [ctrl, to] = parse_pairs::<2>(arg);
                push(PathCommand::QuadTo { ctrl, to });
            }
        }
        Rule::smooth_quadratic_curveto => {
            inner.for_each(|arg| push(PathCommand::SmoothQuadTo { to: parse_pair(arg) }))
        }
        Rule::elliptical_arc => {
            for arg in inner {
                push(parse_arc_argument(arg));
            }
        }
        Rule::closepath => push(PathCommand::ClosePath),
        _ => {}
    }
}

fn parse_arc_argument(pair: Pair<Rule>) -> PathCommand {
    let mut rx = 0.0;
    let mut ry = 0.0;
    let mut x_axis_rotation = 0.0;
    let mut flags = [false; 2];
    let mut to = Point::ZERO;
    let (mut numbers, mut flag_count) = (0, 0);

    for inner in pair.into_inner() {
        match inner.as_rule() {
            Rule::number => {
                let value = parse_number(inner);
                match numbers {
                    0 => rx = value,
                    1 => ry = value,
                    _ => x_axis_rotation = value,
                }
                numbers += 1;
            }
            Rule::flag => {
                if let Some(slot) = flags.get_mut(flag_count) {
                    *slot = inner.as_str() == "1";
                }
                flag_count += 1;
            }
            Rule::coordinate_pair => to = parse_pair(inner),
            _ => {}
        }
    }

    PathCommand::ArcTo {
        rx,
        ry,
        x_axis_rotation,
        large_arc: flags[0],
        sweep: flags[1],
        to,
    }
}

/// Grammar guarantees float syntax, so the fallback is unreachable in practice.
fn parse_number(pair: Pair<Rule>) -> f64 {
    pair.as_str().parse().unwrap_or_default()
}

fn parse_pair(pair: Pair<Rule>) -> Point {
    let mut numbers = pair.into_inner().map(parse_number);
    let x = numbers.next().unwrap_or_default();
    let y = numbers.next().unwrap_or_default();
    dvec2(x, y)
}

fn parse_pairs<const N: usize>(pair: Pair<Rule>) -> [Point; N] {
    let mut points = [Point::ZERO; N];
    for (slot, inner) in points.iter_mut().zip(pair.into_inner()) {
        *slot = parse_pair(inner);
    }
    points
}

fn path_data_error(node: &str, source: &str, err: PestError<Rule>) -> PathDataError {
    let ctx = SourceContext::new(node, source);
    let offset = match err.location {
        InputLocation::Pos(pos) => pos,
        InputLocation::Span((start, _)) => start,
    };
    let (token, span) = ctx.token_span(offset);
    let expected = match &err.variant {
        ErrorVariant::ParsingError { positives, .. } => describe_expected(positives),
        ErrorVariant::CustomError { message } => message.clone(),
    };
    PathDataError {
        node: ctx.name.clone(),
        token,
        expected,
        src: ctx.named_source(),
        span,
    }
}

fn describe_expected(rules: &[Rule]) -> String {
    let mut names: Vec<&str> = Vec::new();
    for rule in rules {
        let name = match rule {
            Rule::number | Rule::coordinate_pair => "a number",
            Rule::flag => "an arc flag (0 or 1)",
            Rule::EOI => "end of path data",
            Rule::moveto | Rule::moveto_cmd => "a moveto command",
            _ => "a path command",
        };
        if !names.contains(&name) {
            names.push(name);
        }
    }
    match names.as_slice() {
        [] => "valid path data".to_string(),
        [only] => format!("expected {only}"),
        [init @ .., last] => format!("expected {} or {last}", init.join(", ")),
    }
}

// ============================================================================
// Transform lists
// ============================================================================

/// Parse a `transform` attribute into a single composed transform.
///
/// `"A B"` maps points through `B` first, then `A`.
pub fn parse_transform(source: &str) -> Result<Transform, AttributeError> {
    let pairs = SvgParser::parse(Rule::transform_list, source).map_err(|e| {
        let ctx = SourceContext::new("transform", source);
        let (_, span) = ctx.token_span(error_offset(&e));
        AttributeError::Transform {
            src: ctx.named_source(),
            span,
        }
    })?;

    let mut transform = Transform::IDENTITY;
    for pair in pairs.flatten() {
        let rule = pair.as_rule();
        if !matches!(
            rule,
            Rule::matrix | Rule::translate | Rule::scale | Rule::rotate | Rule::skew_x | Rule::skew_y
        ) {
            continue;
        }
        let args: Vec<f64> = pair.into_inner().map(parse_number).collect();
        let next = match (rule, args.as_slice()) {
            (Rule::matrix, &[a, b, c, d, e, f]) => Transform::new(a, b, c, d, e, f),
            (Rule::translate, &[tx]) => Transform::translate(tx, 0.0),
            (Rule::translate, &[tx, ty]) => Transform::translate(tx, ty),
            (Rule::scale, &[s]) => Transform::scale(s, s),
            (Rule::scale, &[sx, sy]) => Transform::scale(sx, sy),
            (Rule::rotate, &[angle]) => Transform::rotate(angle),
            (Rule::rotate, &[angle, cx, cy]) => Transform::rotate_about(angle, cx, cy),
            (Rule::skew_x, &[angle]) => Transform::skew_x(angle),
            (Rule::skew_y, &[angle]) => Transform::skew_y(angle),
            _ => {
                log::warn!(?rule, ?args, "transform with unexpected arity");
                continue;
            }
        };
        transform = transform.pre(next);
    }
    Ok(transform)
}

fn error_offset(err: &PestError<Rule>) -> usize {
    match err.location {
        InputLocation::Pos(pos) => pos,
        InputLocation::Span((start, _)) => start,
    }
}

// ============================================================================
// Number lists and lengths
// ============================================================================

/// Parse a whitespace/comma separated list of numbers.
pub fn parse_number_list(source: &str) -> Result<Vec<f64>, AttributeError> {
    let pairs = SvgParser::parse(Rule::number_list, source).map_err(|e| {
        let ctx = SourceContext::new("numbers", source);
        let (_, span) = ctx.token_span(error_offset(&e));
        AttributeError::NumberList {
            src: ctx.named_source(),
            span,
        }
    })?;
    Ok(pairs
        .flatten()
        .filter(|p| p.as_rule() == Rule::number)
        .map(parse_number)
        .collect())
}

/// Parse a `points` attribute. A dangling odd coordinate is dropped.
pub fn parse_points(source: &str) -> Result<Vec<Point>, AttributeError> {
    let numbers = parse_number_list(source)?;
    if numbers.len() % 2 != 0 {
        log::warn!(count = numbers.len(), "odd number of coordinates in points, dropping the last");
    }
    Ok(numbers
        .chunks_exact(2)
        .map(|xy| dvec2(xy[0], xy[1]))
        .collect())
}

/// Parse a length such as `12.5mm`, `100%` or `42`.
pub fn parse_length(source: &str) -> Result<Length, AttributeError> {
    let invalid = || AttributeError::Length {
        value: source.to_string(),
    };
    let pairs = SvgParser::parse(Rule::length, source).map_err(|_| invalid())?;

    let mut value = None;
    let mut unit = LengthUnit::User;
    for pair in pairs.flatten() {
        match pair.as_rule() {
            Rule::number => value = Some(parse_number(pair)),
            Rule::unit => {
                unit = match pair.as_str() {
                    "%" => LengthUnit::Percent,
                    "em" => LengthUnit::Em,
                    "ex" => LengthUnit::Ex,
                    other => LengthUnit::Absolute(other.parse().map_err(|_| invalid())?),
                }
            }
            _ => {}
        }
    }
    let value = value.ok_or_else(invalid)?;
    Ok(Length { value, unit })
}
