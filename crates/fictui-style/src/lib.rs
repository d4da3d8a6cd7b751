#![forbid(unsafe_code)]

//! Style-hint resolution for the fictui display-composition core.
//!
//! Clients tag output with one of a fixed set of style classes; this
//! crate resolves those classes into concrete rendering attributes. It
//! holds two mutable style tables (one per text-surface kind) plus
//! paired compiled-default tables used for restoration, and publishes
//! the handful of display globals the rendering layer reads (window
//! background, caret and "more"-prompt colors).

pub mod color;
pub mod font;
pub mod table;

pub use color::Rgb;
pub use font::Font;
pub use table::{
    Hint, HintScope, JUSTIFY_LEFT_FLUSH, NUM_STYLE_CLASSES, StyleAttrs, StyleClass, StyleContext,
    StyleRecord, StyleTable, SurfaceKind,
};
