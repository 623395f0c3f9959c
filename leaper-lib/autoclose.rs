//! Recognizing auto-inserted pairs in a raw edit batch.
//!
//! Hosts that do not report autoclose explicitly still send the replacement
//! that inserted both sides. A replacement counts as an autoclose when:
//!
//! - it is a pure insertion,
//! - its text is one of the detected pairs, and
//! - a cursor sat at its start before the edit.
//!
//! The resulting [`Pair`] is in post-edit coordinates, so it can be tracked
//! right after the batch was applied to the tracker.

use leaper_core::{
  Position,
  TextReplacement,
  shift::shift_all,
};

use crate::{
  config::DetectedPairs,
  pair::Pair,
};

/// A pair to track for cursor `cursor`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Autoclose {
  pub cursor: usize,
  pub pair:   Pair,
}

/// Find autoclosed pairs in `edits`, given the cursor positions from before
/// the edit.
pub fn detect(edits: &[TextReplacement], cursors: &[Position], pairs: &DetectedPairs) -> Vec<Autoclose> {
  let mut found = Vec::new();

  for (index, edit) in edits.iter().enumerate() {
    if !edit.is_insertion() || !pairs.contains(edit.text()) {
      continue;
    }
    let Some(cursor) = cursors.iter().position(|cursor| *cursor == edit.start()) else {
      continue;
    };

    let others: Vec<TextReplacement> = edits
      .iter()
      .enumerate()
      .filter(|(other, _)| *other != index)
      .map(|(_, edit)| edit.clone())
      .collect();
    let Some(open) = shift_all(edit.start(), &others) else {
      continue;
    };

    found.push(Autoclose {
      cursor,
      pair: Pair::new(open, open.right(1)),
    });
  }

  found
}
