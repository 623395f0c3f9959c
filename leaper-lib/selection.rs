//! Cursor input as reported by the host.
//!
//! A [`Selection`] has an `anchor` and an `active` end. Only `active` (where
//! the caret is drawn) matters for pair tracking; the anchor is carried so
//! hosts can pass their selections through unchanged.
//!
//! ```text
//! anchor=0:2, active=0:7: "he[llo w]orld"
//! anchor=0:5, active=0:5: "hello|world"
//! ```

use leaper_core::Position;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Selection {
  pub anchor: Position,
  pub active: Position,
}

impl Selection {
  pub fn new(anchor: Position, active: Position) -> Self {
    Self { anchor, active }
  }

  pub fn point(pos: Position) -> Self {
    Self {
      anchor: pos,
      active: pos,
    }
  }

  pub fn is_empty(&self) -> bool {
    self.anchor == self.active
  }
}

impl From<Position> for Selection {
  fn from(pos: Position) -> Self {
    Self::point(pos)
  }
}

/// The active ends of `selections`, in order.
pub fn cursors(selections: &[Selection]) -> Vec<Position> {
  selections.iter().map(|selection| selection.active).collect()
}
