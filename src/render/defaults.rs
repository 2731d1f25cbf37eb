//! Default settings and numeric constants used by the renderer

/// Decimal places kept in emitted coordinates and lengths
pub const PRECISION: usize = 4;

/// One indentation level in the emitted code
pub const INDENT: &str = "  ";

/// Column at which wrapped commands break
pub const WRAP_WIDTH: usize = 80;

/// Deepest element nesting accepted by the loader and the walker
pub const MAX_DEPTH: usize = 256;

/// Elements the loader may create by expanding `<use>` references
pub const MAX_USE_NODES: usize = 100_000;

/// Control-point distance for a quarter circle of radius 1: `4/3 * (sqrt(2) - 1)`
pub const KAPPA: f64 = 0.552_284_749_830_793_4;

/// Points closer than this are treated as coincident by the arc converter
pub const ARC_EPSILON: f64 = 1e-9;
