//! A tracked opening/closing character pair.
//!
//! A [`Pair`] remembers where its two sides are, nothing about what they
//! contain. Positions are re-mapped through every edit with
//! [`leaper_core::shift`] and never re-derived from the document text.
//!
//! ```text
//! foo(|)     open = 0:3, close = 0:4, cursor = 0:4
//! ```
//!
//! The cursor is inside a pair when it sits on the pair's line strictly after
//! the opening side and at or before the closing side.

use std::{
  num::NonZeroU64,
  sync::atomic::{
    AtomicU64,
    Ordering,
  },
};

use leaper_core::{
  Position,
  TextReplacement,
  shift,
};

use crate::decoration::DecorationId;

/// Stable identity of a pair, kept for as long as the pair is tracked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PairId(NonZeroU64);

impl PairId {
  pub fn new(id: NonZeroU64) -> Self {
    Self(id)
  }

  pub fn fresh() -> Self {
    static NEXT_ID: AtomicU64 = AtomicU64::new(1);
    let id = NEXT_ID.fetch_add(1, Ordering::Relaxed);
    Self(NonZeroU64::new(id).unwrap_or(NonZeroU64::MIN))
  }

  pub fn get(self) -> u64 {
    self.0.get()
  }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pair {
  pub open:              Position,
  pub close:             Position,
  id:                    PairId,
  pub(crate) decoration: Option<DecorationId>,
}

impl Pair {
  pub fn new(open: Position, close: Position) -> Self {
    Self {
      open,
      close,
      id: PairId::fresh(),
      decoration: None,
    }
  }

  pub fn id(&self) -> PairId {
    self.id
  }

  pub fn decoration(&self) -> Option<DecorationId> {
    self.decoration
  }

  pub fn sides(&self) -> (Position, Position) {
    (self.open, self.close)
  }

  /// Open strictly before close, both on the same line.
  pub fn is_well_formed(&self) -> bool {
    self.open < self.close && self.open.line == self.close.line
  }

  /// true if `cursor` is between the two sides: after the opening side, at
  /// or before the closing side.
  pub fn contains(&self, cursor: Position) -> bool {
    cursor.line == self.open.line && self.open < cursor && cursor <= self.close
  }

  /// true if `other` lies within this pair, sides included.
  pub fn encloses(&self, other: &Pair) -> bool {
    self.open <= other.open && other.close <= self.close
  }

  /// Where the cursor lands after leaping over the closing side.
  pub fn leap_target(&self) -> Position {
    self.close.right(1)
  }

  /// Re-map both sides through a batch already sorted last-in-document
  /// first.
  ///
  /// Returns false when the pair must be dropped: a side was overwritten or
  /// the sides ended up on different lines.
  pub(crate) fn shift_through(&mut self, ordered: &[TextReplacement]) -> bool {
    let mapped = ordered.iter().try_fold((self.open, self.close), |(open, close), edit| {
      Some((shift(open, edit)?, shift(close, edit)?))
    });

    let Some((open, close)) = mapped else {
      return false;
    };
    if open.line != close.line {
      return false;
    }

    debug_assert!(open < close, "shift inverted pair {open}..{close}");
    self.open = open;
    self.close = close;
    open < close
  }
}

#[cfg(test)]
mod test {
  use super::*;

  fn pair(open: (usize, usize), close: (usize, usize)) -> Pair {
    Pair::new(open.into(), close.into())
  }

  #[test]
  fn fresh_ids_are_unique() {
    let a = PairId::fresh();
    let b = PairId::fresh();
    assert_ne!(a, b);
    assert!(a.get() > 0);
  }

  #[test]
  fn contains_excludes_open_includes_close() {
    let p = pair((0, 3), (0, 6));
    assert!(!p.contains(Position::new(0, 3)));
    assert!(p.contains(Position::new(0, 4)));
    assert!(p.contains(Position::new(0, 6)));
    assert!(!p.contains(Position::new(0, 7)));
    assert!(!p.contains(Position::new(1, 4)));
  }

  #[test]
  fn encloses_nested_pairs() {
    let outer = pair((0, 1), (0, 6));
    let inner = pair((0, 2), (0, 5));
    assert!(outer.encloses(&inner));
    assert!(!inner.encloses(&outer));
    assert!(outer.encloses(&outer));
  }

  #[test]
  fn typing_inside_moves_close_only() {
    let mut p = pair((0, 3), (0, 4));
    let edits = [TextReplacement::insert(Position::new(0, 4), "abc")];
    assert!(p.shift_through(&edits));
    assert_eq!(p.sides(), (Position::new(0, 3), Position::new(0, 7)));
  }

  #[test]
  fn newline_between_sides_drops_pair() {
    let mut p = pair((0, 3), (0, 4));
    let edits = [TextReplacement::insert(Position::new(0, 4), "\n")];
    assert!(!p.shift_through(&edits));
  }

  #[test]
  fn deleting_a_side_drops_pair() {
    let mut p = pair((0, 3), (0, 4));
    let edits = [TextReplacement::delete(Position::new(0, 3), Position::new(0, 4)).unwrap()];
    assert!(!p.shift_through(&edits));

    let mut p = pair((0, 3), (0, 4));
    let edits = [TextReplacement::delete(Position::new(0, 4), Position::new(0, 5)).unwrap()];
    assert!(!p.shift_through(&edits));
  }

  #[test]
  fn newline_before_pair_moves_it_down() {
    let mut p = pair((2, 3), (2, 4));
    let edits = [TextReplacement::insert(Position::new(2, 0), "  \n")];
    assert!(p.shift_through(&edits));
    assert_eq!(p.sides(), (Position::new(3, 3), Position::new(3, 4)));
  }
}
