//! Position primitives for pair tracking.
//!
//! Everything here is pure: a [`Position`] is a `(line, character)` point with
//! the character counted in UTF-16 code units, a [`TextReplacement`] describes
//! one edit, and [`shift`] re-maps a point through that edit.

use smartstring::{
  LazyCompact,
  SmartString,
};

pub mod chars;
pub mod position;
pub mod shift;
pub mod text;

pub use position::Position;
pub use shift::{
  ShiftError,
  TextReplacement,
  shift,
};
pub use text::TextSource;

pub type Tendril = SmartString<LazyCompact>;
