//! Read access to document lines.
//!
//! The tracking engine never owns document text. When it needs to look at
//! characters (line of sight) it goes through [`TextSource`], which the host
//! implements for whatever buffer it has. Ropes and plain strings are
//! supported out of the box.

use std::borrow::Cow;

use ropey::{
  Rope,
  RopeSlice,
};

pub trait TextSource {
  /// The text of line `line`, with or without its line ending, or `None`
  /// if the document has no such line.
  fn line(&self, line: usize) -> Option<Cow<'_, str>>;

  /// The characters of `line` covering UTF-16 columns `from..to`, or `None`
  /// if the line is missing or shorter than `to`.
  fn columns(&self, line: usize, from: usize, to: usize) -> Option<String> {
    let text = self.line(line)?;
    let mut column = 0;
    let mut out = String::new();
    for ch in text.chars() {
      if column >= to {
        break;
      }
      if column >= from {
        out.push(ch);
      }
      column += ch.len_utf16();
    }
    (column >= to).then_some(out)
  }
}

impl TextSource for str {
  fn line(&self, line: usize) -> Option<Cow<'_, str>> {
    self.split('\n').nth(line).map(Cow::Borrowed)
  }
}

impl TextSource for String {
  fn line(&self, line: usize) -> Option<Cow<'_, str>> {
    self.as_str().line(line)
  }
}

impl TextSource for RopeSlice<'_> {
  fn line(&self, line: usize) -> Option<Cow<'_, str>> {
    self.get_line(line).map(Cow::from)
  }
}

impl TextSource for Rope {
  fn line(&self, line: usize) -> Option<Cow<'_, str>> {
    self.get_line(line).map(Cow::from)
  }
}
