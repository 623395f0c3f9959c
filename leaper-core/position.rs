use std::fmt;

use crate::chars::{
  count_line_breaks,
  tail_len,
};

/// This is a single point in a text buffer.
/// 0-indexed as all things should be, with `character` counted in UTF-16
/// code units of its line.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Position {
  pub line:      usize,
  pub character: usize,
}

impl Position {
  pub const fn new(line: usize, character: usize) -> Self {
    Self { line, character }
  }

  pub const fn zero() -> Self {
    Self {
      line:      0,
      character: 0,
    }
  }

  /// The same position moved `n` code units to the right on its line.
  #[must_use]
  pub const fn right(self, n: usize) -> Self {
    Self {
      line:      self.line,
      character: self.character + n,
    }
  }

  /// The position reached after writing `text` starting at `self`.
  #[must_use]
  pub fn traverse(self, text: impl AsRef<str>) -> Self {
    let text = text.as_ref();
    let breaks = count_line_breaks(text);
    if breaks == 0 {
      self.right(tail_len(text))
    } else {
      Self::new(self.line + breaks, tail_len(text))
    }
  }
}

impl From<(usize, usize)> for Position {
  fn from(value: (usize, usize)) -> Self {
    Position::new(value.0, value.1)
  }
}

impl fmt::Display for Position {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}:{}", self.line, self.character)
  }
}
