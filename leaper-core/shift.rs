//! Mapping points through text replacements.
//!
//! A [`TextReplacement`] replaces the text between `start` and `end`
//! (exclusive) with `text`. [`shift`] re-maps one [`Position`] through one
//! replacement and returns `None` when the point sat inside text that was
//! destroyed.
//!
//! ```
//! use leaper_core::{
//!   Position,
//!   TextReplacement,
//!   shift,
//! };
//!
//! let edit = TextReplacement::new((5, 0).into(), (5, 5).into(), "R").unwrap();
//! assert_eq!(shift(Position::new(5, 10), &edit), Some(Position::new(5, 6)));
//! ```
//!
//! Several replacements reported together always address the pre-edit text.
//! [`shift_all`] applies such a batch from the last replacement in the
//! document to the first, so earlier replacements never see coordinates that
//! a later one already moved.

use std::cmp::Reverse;

use thiserror::Error;

use crate::{
  Position,
  Tendril,
  chars::{
    count_line_breaks,
    tail_len,
    utf16_len,
  },
};

pub type Result<T> = std::result::Result<T, ShiftError>;

#[derive(Debug, Error, PartialEq, Eq)]
#[non_exhaustive]
pub enum ShiftError {
  #[error("invalid replacement range: start {start} is after end {end}")]
  InvertedRange { start: Position, end: Position },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextReplacement {
  start: Position,
  end:   Position,
  text:  Tendril,
}

impl TextReplacement {
  pub fn new(start: Position, end: Position, text: impl Into<Tendril>) -> Result<Self> {
    if start > end {
      return Err(ShiftError::InvertedRange { start, end });
    }
    Ok(Self {
      start,
      end,
      text: text.into(),
    })
  }

  pub fn insert(at: Position, text: impl Into<Tendril>) -> Self {
    Self {
      start: at,
      end:   at,
      text:  text.into(),
    }
  }

  pub fn delete(start: Position, end: Position) -> Result<Self> {
    Self::new(start, end, Tendril::new())
  }

  pub fn start(&self) -> Position {
    self.start
  }

  pub fn end(&self) -> Position {
    self.end
  }

  pub fn text(&self) -> &str {
    &self.text
  }

  /// true if no text is removed
  pub fn is_insertion(&self) -> bool {
    self.start == self.end
  }

  /// Where the inserted text ends once the replacement has been applied.
  pub fn inserted_end(&self) -> Position {
    self.start.traverse(&self.text)
  }
}

/// Re-map `pos` through `edit`.
///
/// Returns `None` when `pos` was strictly inside the replaced range, or at
/// its start when the range is not empty. A pure insertion exactly at `pos`
/// pushes it forward.
pub fn shift(pos: Position, edit: &TextReplacement) -> Option<Position> {
  let TextReplacement { start, end, text } = edit;

  if (*start < pos && pos < *end) || (*start == pos && end > start) {
    return None;
  }

  if *end > pos {
    // entirely after the position
    return Some(pos);
  }

  let breaks = count_line_breaks(text);
  let line = pos.line - (end.line - start.line) + breaks;

  if end.line != pos.line {
    return Some(Position::new(line, pos.character));
  }

  let trailing = pos.character - end.character;
  let character = if breaks == 0 {
    start.character + utf16_len(text) + trailing
  } else {
    tail_len(text) + trailing
  };

  Some(Position::new(line, character))
}

/// Re-map `pos` through a batch of non-overlapping replacements that all
/// address the same pre-edit text.
pub fn shift_all(pos: Position, edits: &[TextReplacement]) -> Option<Position> {
  let mut order: Vec<&TextReplacement> = edits.iter().collect();
  order.sort_by_key(|edit| Reverse((edit.start, edit.end)));
  order.into_iter().try_fold(pos, |pos, edit| shift(pos, edit))
}

/// Sort a batch so it can be applied one replacement at a time: last in the
/// document first.
pub fn application_order(edits: &mut [TextReplacement]) {
  edits.sort_by_key(|edit| Reverse((edit.start, edit.end)));
}
