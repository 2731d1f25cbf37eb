//! Diagnostic channel for recovered per-node issues.
//!
//! With the `tracing` feature these are the `tracing` macros. Without it
//! they expand to an empty block that still borrows every field, so call
//! sites build the same way with and without the feature.

#[cfg(feature = "tracing")]
pub use tracing::{debug, warn};

/// Borrows each field of a tracing-style argument list without recording it.
#[cfg(not(feature = "tracing"))]
#[macro_export]
#[doc(hidden)]
macro_rules! __svg2tikz_fields {
    () => {};
    ($message:literal $(, $arg:expr)* $(,)?) => {
        $( let _ = &$arg; )*
    };
    (? $value:expr $(, $($rest:tt)*)?) => {
        let _ = &$value;
        $( $crate::__svg2tikz_fields!($($rest)*); )?
    };
    (% $value:expr $(, $($rest:tt)*)?) => {
        let _ = &$value;
        $( $crate::__svg2tikz_fields!($($rest)*); )?
    };
    ($name:ident = ? $value:expr $(, $($rest:tt)*)?) => {
        let _ = &$value;
        $( $crate::__svg2tikz_fields!($($rest)*); )?
    };
    ($name:ident = % $value:expr $(, $($rest:tt)*)?) => {
        let _ = &$value;
        $( $crate::__svg2tikz_fields!($($rest)*); )?
    };
    ($name:ident = $value:expr $(, $($rest:tt)*)?) => {
        let _ = &$value;
        $( $crate::__svg2tikz_fields!($($rest)*); )?
    };
    ($name:ident $(, $($rest:tt)*)?) => {
        let _ = &$name;
        $( $crate::__svg2tikz_fields!($($rest)*); )?
    };
}

#[cfg(not(feature = "tracing"))]
#[macro_export]
#[doc(hidden)]
macro_rules! __svg2tikz_debug {
    ($($arg:tt)*) => {{
        if false {
            $crate::__svg2tikz_fields!($($arg)*);
        }
    }};
}

#[cfg(not(feature = "tracing"))]
#[macro_export]
#[doc(hidden)]
macro_rules! __svg2tikz_warn {
    ($($arg:tt)*) => {{
        if false {
            $crate::__svg2tikz_fields!($($arg)*);
        }
    }};
}

#[cfg(not(feature = "tracing"))]
pub use crate::{__svg2tikz_debug as debug, __svg2tikz_warn as warn};
