//! Leaping over the closing side of the innermost tracked pair.
//!
//! A leap is only allowed when the cursor has *line of sight* to the closing
//! side: nothing but spaces and tabs between the cursor and the closing
//! character.
//!
//! ```text
//! foo(bar|  )   -> leap ->   foo(bar  )|
//! foo(|bar)     -> blocked, `bar` is in the way
//! ```
//!
//! With several cursors every cursor is handled on its own. Cursors with
//! nothing tracked or without line of sight stay where they are; cursor order
//! never changes.

use leaper_core::{
  Position,
  TextSource,
  chars::char_is_leap_whitespace,
};

use crate::{
  cluster::Cluster,
  pair::Pair,
  tracker::{
    Result,
    Tracker,
    TrackerError,
    Update,
  },
};

/// What happened to one cursor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Jump {
  /// The cursor moved from `from` to `to`, one past the closing side of
  /// `pair`, which is no longer tracked.
  Leapt {
    from: Position,
    to:   Position,
    pair: Pair,
  },
  /// Something other than whitespace stands before the closing side.
  Blocked,
  /// Nothing is tracked for this cursor.
  Idle,
}

impl Jump {
  pub fn is_leap(&self) -> bool {
    matches!(self, Jump::Leapt { .. })
  }
}

/// true if only spaces and tabs lie between `cursor` and the closing side of
/// `pair`.
///
/// A cursor outside the pair, or on a line the text does not have, never has
/// line of sight.
pub fn has_line_of_sight<T: TextSource + ?Sized>(text: &T, cursor: Position, pair: &Pair) -> bool {
  if !pair.contains(cursor) {
    return false;
  }
  text
    .columns(cursor.line, cursor.character, pair.close.character)
    .is_some_and(|between| between.chars().all(char_is_leap_whitespace))
}

/// Line of sight from cursor `cursor` to its innermost pair.
pub fn cursor_has_line_of_sight<T: TextSource + ?Sized>(tracker: &Tracker, text: &T, cursor: usize) -> bool {
  let (Some(cluster), Some(position)) = (tracker.cluster(cursor), tracker.cursors().get(cursor)) else {
    return false;
  };
  cluster
    .innermost()
    .is_some_and(|pair| has_line_of_sight(text, *position, pair))
}

/// true if any cursor could leap right now.
pub fn any_line_of_sight<T: TextSource + ?Sized>(tracker: &Tracker, text: &T) -> bool {
  (0..tracker.cursors().len()).any(|cursor| cursor_has_line_of_sight(tracker, text, cursor))
}

/// Leap cursor `cursor` over its innermost pair if it has line of sight.
pub fn leap<T: TextSource + ?Sized>(tracker: &mut Tracker, text: &T, cursor: usize) -> Result<Jump> {
  let Some(from) = tracker.cursors().get(cursor).copied() else {
    return Err(TrackerError::CursorOutOfBounds {
      index: cursor,
      len:   tracker.cursors().len(),
    });
  };
  let Some(innermost) = tracker.cluster(cursor).and_then(Cluster::innermost) else {
    return Ok(Jump::Idle);
  };
  if !has_line_of_sight(text, from, innermost) {
    tracing::trace!(cursor, %from, close = %innermost.close, "leap blocked");
    return Ok(Jump::Blocked);
  }

  let Some(pair) = tracker.leap_over(cursor)? else {
    return Ok(Jump::Idle);
  };
  let to = pair.leap_target();
  tracing::debug!(cursor, %from, %to, "leap");
  Ok(Jump::Leapt { from, to, pair })
}

/// The result of leaping every cursor.
#[derive(Debug, Default)]
pub struct Leaps {
  /// One entry per cursor, in cursor order.
  pub jumps:  Vec<Jump>,
  pub update: Update,
}

impl Leaps {
  pub fn any(&self) -> bool {
    self.jumps.iter().any(Jump::is_leap)
  }
}

/// Leap every cursor that can.
pub fn leap_all<T: TextSource + ?Sized>(tracker: &mut Tracker, text: &T) -> Leaps {
  let mut leaps = Leaps::default();
  for cursor in 0..tracker.cursors().len() {
    // the index is in bounds, so this cannot fail
    let jump = leap(tracker, text, cursor).unwrap_or(Jump::Idle);
    if let Jump::Leapt { pair, .. } = &jump {
      leaps.update.dropped.push(pair.clone());
      leaps.update.changed = true;
    }
    leaps.jumps.push(jump);
  }
  leaps
}
