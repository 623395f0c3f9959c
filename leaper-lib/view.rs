//! Per-view tracking state.

use std::num::NonZeroUsize;

use crate::{
  context::KeybindingContext,
  decoration::DecorationQueue,
  selection::Selection,
  tracker::Tracker,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ViewId(NonZeroUsize);

impl ViewId {
  pub const fn new(id: NonZeroUsize) -> Self {
    Self(id)
  }

  pub const fn get(self) -> NonZeroUsize {
    self.0
  }
}

impl From<NonZeroUsize> for ViewId {
  fn from(value: NonZeroUsize) -> Self {
    Self::new(value)
  }
}

/// Everything the controller keeps for one document view: the clusters, the
/// decorations waiting for the next flush and the keybinding context.
#[derive(Debug)]
pub struct View {
  pub id:          ViewId,
  pub tracker:     Tracker,
  pub decorations: DecorationQueue,
  pub context:     KeybindingContext,
}

impl View {
  pub fn new(id: ViewId, selections: &[Selection]) -> Self {
    Self {
      id,
      tracker: Tracker::new(selections),
      decorations: DecorationQueue::new(id),
      context: KeybindingContext::new(),
    }
  }
}
