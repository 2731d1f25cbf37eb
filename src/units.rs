//! Physical units and document lengths.
//!
//! The factors follow the CSS reference pixel: 96 px per inch.

use std::fmt;
use std::str::FromStr;

/// Absolute units accepted both in documents and as the output unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Unit {
    Px,
    Pt,
    Pc,
    Mm,
    #[default]
    Cm,
    M,
    In,
    Q,
}

impl Unit {
    pub const ALL: [Unit; 8] = [
        Unit::Px,
        Unit::Pt,
        Unit::Pc,
        Unit::Mm,
        Unit::Cm,
        Unit::M,
        Unit::In,
        Unit::Q,
    ];

    /// How many CSS pixels (SVG user units) one of this unit spans.
    pub fn px_per_unit(self) -> f64 {
        match self {
            Unit::Px => 1.0,
            Unit::Pt => 96.0 / 72.0,
            Unit::Pc => 16.0,
            Unit::Mm => 96.0 / 25.4,
            Unit::Cm => 96.0 / 2.54,
            Unit::M => 9600.0 / 2.54,
            Unit::In => 96.0,
            Unit::Q => 96.0 / 101.6,
        }
    }

    pub fn suffix(self) -> &'static str {
        match self {
            Unit::Px => "px",
            Unit::Pt => "pt",
            Unit::Pc => "pc",
            Unit::Mm => "mm",
            Unit::Cm => "cm",
            Unit::M => "m",
            Unit::In => "in",
            Unit::Q => "Q",
        }
    }

    /// Convert `value` expressed in `self` into `target` units.
    pub fn convert(self, value: f64, target: Unit) -> f64 {
        value * self.px_per_unit() / target.px_per_unit()
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.suffix())
    }
}

impl FromStr for Unit {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Unit::ALL
            .into_iter()
            .find(|unit| unit.suffix() == s)
            .ok_or_else(|| format!("unknown unit `{s}`"))
    }
}

/// Unit part of a parsed length.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LengthUnit {
    /// No suffix: SVG user units
    User,
    Absolute(Unit),
    Percent,
    Em,
    Ex,
}

/// A length attribute such as `210mm` or `100%`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Length {
    pub value: f64,
    pub unit: LengthUnit,
}

impl Length {
    /// The length in CSS pixels, when it is absolute.
    pub fn to_px(self) -> Option<f64> {
        match self.unit {
            LengthUnit::User => Some(self.value),
            LengthUnit::Absolute(unit) => Some(self.value * unit.px_per_unit()),
            LengthUnit::Percent | LengthUnit::Em | LengthUnit::Ex => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn conversions_match_the_reference_pixel() {
        assert!((Unit::In.convert(1.0, Unit::Px) - 96.0).abs() < 1e-12);
        assert!((Unit::Cm.convert(2.54, Unit::In) - 1.0).abs() < 1e-12);
        assert!((Unit::Pt.convert(72.0, Unit::In) - 1.0).abs() < 1e-12);
        assert!((Unit::Mm.convert(10.0, Unit::Cm) - 1.0).abs() < 1e-12);
        assert!((Unit::Q.convert(4.0, Unit::Mm) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn parse_round_trips_every_suffix() {
        for unit in Unit::ALL {
            assert_eq!(unit.suffix().parse::<Unit>(), Ok(unit));
        }
        assert!("furlong".parse::<Unit>().is_err());
    }

    #[test]
    fn relative_lengths_have_no_pixel_size() {
        let pct = Length { value: 50.0, unit: LengthUnit::Percent };
        assert_eq!(pct.to_px(), None);
        let mm = Length { value: 25.4, unit: LengthUnit::Absolute(Unit::Mm) };
        assert!((mm.to_px().unwrap() - 96.0).abs() < 1e-12);
    }
}
