//! Character classification and UTF-16 measurement helpers.

/// Whitespace that a leap is allowed to jump over.
///
/// Only spaces and tabs count. Line breaks never do, since a pair always
/// lives on a single line.
#[inline]
pub fn char_is_leap_whitespace(ch: char) -> bool {
  matches!(ch, ' ' | '\t')
}

#[inline]
pub fn char_is_line_break(ch: char) -> bool {
  ch == '\n'
}

/// Length of `text` in UTF-16 code units.
#[inline]
pub fn utf16_len(text: &str) -> usize {
  text.chars().map(char::len_utf16).sum()
}

/// Number of line breaks in `text`.
///
/// A `\r\n` sequence counts once since only the `\n` is counted.
pub fn count_line_breaks(text: &str) -> usize {
  text.chars().filter(|&ch| char_is_line_break(ch)).count()
}

/// UTF-16 length of the text after the last line break, or of the whole text
/// if there is none.
pub fn tail_len(text: &str) -> usize {
  match text.rfind('\n') {
    Some(idx) => utf16_len(&text[idx + 1..]),
    None => utf16_len(text),
  }
}
