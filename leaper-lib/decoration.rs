//! Batched decoration of tracked closing sides.
//!
//! Tracker transitions only say which pairs should carry a decoration. The
//! [`DecorationQueue`] collects those requests while one event is handled and
//! sends them to the host's [`DecorationSink`] in a single [`flush`] at the
//! end, so a pair touched several times by one edit is decorated once, and
//! only if it is not decorated already.
//!
//! Releases go out in the same flush, before any new decoration.
//!
//! [`flush`]: DecorationQueue::flush

use std::{
  num::NonZeroU64,
  sync::atomic::{
    AtomicU64,
    Ordering,
  },
};

use leaper_core::Position;
use smallvec::SmallVec;

use crate::{
  config::DecorationStyle,
  pair::{
    Pair,
    PairId,
  },
  tracker::Tracker,
  view::ViewId,
};

/// Handle of one decoration created by the core.
///
/// The host maps it to whatever its renderer uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DecorationId(NonZeroU64);

impl DecorationId {
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

/// Receives decoration requests. Implemented by the host.
pub trait DecorationSink {
  /// Decorate the closing side at `at`.
  ///
  /// `at` is only sent once. The host keeps the decoration anchored to that
  /// character as the text changes, as editor decorations do; it is never
  /// asked to move it.
  fn decorate(&mut self, view: ViewId, decoration: DecorationId, at: Position, style: &DecorationStyle);

  /// Remove a decoration previously created with [`decorate`].
  ///
  /// [`decorate`]: DecorationSink::decorate
  fn release(&mut self, view: ViewId, decoration: DecorationId);
}

#[derive(Debug)]
pub struct DecorationQueue {
  view:     ViewId,
  pending:  SmallVec<[PairId; 4]>,
  releases: SmallVec<[DecorationId; 4]>,
}

impl DecorationQueue {
  pub fn new(view: ViewId) -> Self {
    Self {
      view,
      pending: SmallVec::new(),
      releases: SmallVec::new(),
    }
  }

  pub fn is_empty(&self) -> bool {
    self.pending.is_empty() && self.releases.is_empty()
  }

  /// Ask for `pair` to be decorated at the next flush.
  pub fn request(&mut self, pair: PairId) {
    if !self.pending.contains(&pair) {
      self.pending.push(pair);
    }
  }

  /// Release the decoration of every pair in `dropped`.
  pub fn release_dropped<'a>(&mut self, dropped: impl IntoIterator<Item = &'a Pair>) {
    for pair in dropped {
      if let Some(decoration) = pair.decoration() {
        self.release(decoration);
      }
      self.pending.retain(|id| *id != pair.id());
    }
  }

  pub fn release(&mut self, decoration: DecorationId) {
    if !self.releases.contains(&decoration) {
      self.releases.push(decoration);
    }
  }

  /// Request every pair that should be decorated: the innermost pair of each
  /// cluster, or every pair when `decorate_all` is set.
  pub fn request_wanted(&mut self, tracker: &Tracker, decorate_all: bool) {
    for cluster in tracker.clusters() {
      if decorate_all {
        for pair in cluster.iter() {
          self.request(pair.id());
        }
      } else if let Some(pair) = cluster.innermost() {
        self.request(pair.id());
      }
    }
  }

  /// Send everything queued to `sink`.
  ///
  /// Without `decorate_all`, decorations on pairs that are no longer the
  /// innermost of their cluster are released as well.
  pub fn flush(
    &mut self,
    tracker: &mut Tracker,
    style: &DecorationStyle,
    decorate_all: bool,
    sink: &mut dyn DecorationSink,
  ) {
    if !decorate_all {
      for cluster in tracker.clusters_mut() {
        let outer = cluster.len().saturating_sub(1);
        for pair in cluster.iter_mut().take(outer) {
          if let Some(decoration) = pair.decoration.take() {
            self.release(decoration);
          }
        }
      }
    }

    for decoration in self.releases.drain(..) {
      tracing::trace!(view = ?self.view, ?decoration, "release decoration");
      sink.release(self.view, decoration);
    }

    for id in self.pending.drain(..) {
      let Some(pair) = tracker.pair_mut(id) else {
        continue;
      };
      if pair.decoration.is_some() {
        continue;
      }
      let decoration = DecorationId::fresh();
      tracing::trace!(view = ?self.view, ?decoration, close = %pair.close, "decorate pair");
      sink.decorate(self.view, decoration, pair.close, style);
      pair.decoration = Some(decoration);
    }
  }

  /// Release every decoration in `tracker` and forget pending requests.
  pub fn release_all(&mut self, tracker: &mut Tracker, sink: &mut dyn DecorationSink) {
    self.pending.clear();
    for cluster in tracker.clusters_mut() {
      for pair in cluster.iter_mut() {
        if let Some(decoration) = pair.decoration.take() {
          self.release(decoration);
        }
      }
    }
    for decoration in self.releases.drain(..) {
      sink.release(self.view, decoration);
    }
  }
}
