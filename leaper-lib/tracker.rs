//! Per-view pair tracking.
//!
//! A [`Tracker`] keeps one [`Cluster`] per cursor, in the same order as the
//! host's cursor list. Every host notification becomes an explicit
//! transition:
//!
//! - [`Tracker::apply_edit`] shifts every pair through a batch of
//!   replacements and drops the pairs the batch broke,
//! - [`Tracker::apply_selection_change`] reconciles clusters with a new cursor
//!   list and drops the pairs the cursors left,
//! - [`Tracker::insert_pair`] starts tracking a freshly auto-closed pair.
//!
//! Each transition returns an [`Update`] carrying the dropped pairs, so the
//! caller can release their decorations. The tracker itself never talks to
//! the host.
//!
//! # Ordering
//!
//! Document changes must be applied before the selection change they cause.
//! A batch of replacements addresses the pre-edit text as a whole; the
//! tracker applies it last-in-document first so no intermediate state is
//! ever visible.

use std::mem;

use leaper_core::{
  Position,
  TextReplacement,
  shift,
  shift::application_order,
};
use thiserror::Error;

use crate::{
  cluster::{
    Cluster,
    ClusterError,
  },
  pair::{
    Pair,
    PairId,
  },
  selection::{
    Selection,
    cursors,
  },
};

pub type Result<T> = std::result::Result<T, TrackerError>;

#[derive(Debug, Error, PartialEq, Eq)]
#[non_exhaustive]
pub enum TrackerError {
  #[error("tracker has {clusters} clusters for {cursors} cursors")]
  NotParallel { clusters: usize, cursors: usize },
  #[error("cursor index {index} out of bounds for {len} cursors")]
  CursorOutOfBounds { index: usize, len: usize },
  #[error("pair {open}..{close} must open before it closes on a single line")]
  InvalidPair { open: Position, close: Position },
  #[error("cluster {index}: {source}")]
  Cluster {
    index:  usize,
    #[source]
    source: ClusterError,
  },
}

/// What a transition did.
#[derive(Debug, Default)]
pub struct Update {
  /// Pairs no longer tracked. Their decorations must be released.
  pub dropped: Vec<Pair>,
  /// Whether tracked positions or cursors may have moved.
  pub changed: bool,
}

impl Update {
  pub fn merge(&mut self, other: Update) {
    self.dropped.extend(other.dropped);
    self.changed |= other.changed;
  }
}

#[derive(Debug, Clone, Default)]
pub struct Tracker {
  cursors:  Vec<Position>,
  clusters: Vec<Cluster>,
}

impl Tracker {
  pub fn new(selections: &[Selection]) -> Self {
    let cursors = cursors(selections);
    let clusters = vec![Cluster::new(); cursors.len()];
    Self { cursors, clusters }
  }

  /// Last known cursor positions, parallel to [`Tracker::clusters`].
  pub fn cursors(&self) -> &[Position] {
    &self.cursors
  }

  pub fn clusters(&self) -> &[Cluster] {
    &self.clusters
  }

  pub(crate) fn clusters_mut(&mut self) -> &mut [Cluster] {
    &mut self.clusters
  }

  pub fn cluster(&self, cursor: usize) -> Option<&Cluster> {
    self.clusters.get(cursor)
  }

  pub fn pair(&self, id: PairId) -> Option<&Pair> {
    self.clusters.iter().find_map(|cluster| cluster.get(id))
  }

  pub(crate) fn pair_mut(&mut self, id: PairId) -> Option<&mut Pair> {
    self.clusters.iter_mut().find_map(|cluster| cluster.get_mut(id))
  }

  /// true if any cursor has a tracked pair.
  pub fn in_leaper_mode(&self) -> bool {
    self.clusters.iter().any(|cluster| !cluster.is_empty())
  }

  /// Shift every pair and cursor through one document change.
  ///
  /// The replacements must not overlap and must all address the text as it
  /// was before the change.
  pub fn apply_edit(&mut self, edits: &[TextReplacement]) -> Update {
    let mut update = Update::default();
    if edits.is_empty() {
      return update;
    }

    let mut ordered = edits.to_vec();
    application_order(&mut ordered);
    tracing::trace!(edits = ordered.len(), clusters = self.clusters.len(), "apply edit");

    for cluster in &mut self.clusters {
      cluster.shift_through(&ordered, &mut update.dropped);
    }
    for cursor in &mut self.cursors {
      *cursor = ordered.iter().fold(*cursor, |pos, edit| {
        shift(pos, edit).unwrap_or_else(|| edit.inserted_end())
      });
    }

    if !update.dropped.is_empty() {
      tracing::debug!(dropped = update.dropped.len(), "edit invalidated pairs");
    }
    update.changed = true;
    self.debug_validate();
    update
  }

  /// Bring the clusters in line with the host's current selections.
  ///
  /// If the cursor count changed, clusters are first matched to the new
  /// cursors. Then every cluster loses the pairs its cursor is no longer
  /// inside.
  pub fn apply_selection_change(&mut self, selections: &[Selection]) -> Update {
    let cursors = cursors(selections);
    let mut update = Update::default();

    if cursors.len() != self.clusters.len() {
      self.reconcile(&cursors, &mut update.dropped);
    }

    for (cluster, cursor) in self.clusters.iter_mut().zip(&cursors) {
      cluster.retain_around(*cursor, &mut update.dropped);
    }

    update.changed = self.cursors != cursors || !update.dropped.is_empty();
    self.cursors = cursors;
    self.debug_validate();
    update
  }

  /// Match existing clusters to a cursor list of a different length.
  ///
  /// A new cursor keeps the cluster of an old cursor at the same position,
  /// otherwise the first unclaimed cluster whose outermost pair contains it,
  /// otherwise it starts empty. Unclaimed clusters are dropped.
  fn reconcile(&mut self, cursors: &[Position], dropped: &mut Vec<Pair>) {
    let old_cursors = mem::take(&mut self.cursors);
    let mut old: Vec<Option<Cluster>> = mem::take(&mut self.clusters)
      .into_iter()
      .map(Some)
      .collect();
    let mut matched: Vec<Option<Cluster>> = vec![None; cursors.len()];

    for (slot, cursor) in matched.iter_mut().zip(cursors) {
      let found = old_cursors
        .iter()
        .zip(&old)
        .position(|(old_cursor, cluster)| old_cursor == cursor && cluster.is_some());
      if let Some(index) = found {
        *slot = old[index].take();
      }
    }

    for (slot, cursor) in matched.iter_mut().zip(cursors) {
      if slot.is_some() {
        continue;
      }
      let found = old.iter().position(|cluster| {
        cluster
          .as_ref()
          .and_then(Cluster::outermost)
          .is_some_and(|pair| pair.contains(*cursor))
      });
      if let Some(index) = found {
        *slot = old[index].take();
      }
    }

    for mut cluster in old.into_iter().flatten() {
      cluster.clear(dropped);
    }

    tracing::trace!(
      before = old_cursors.len(),
      after = cursors.len(),
      "reconciled clusters"
    );
    self.clusters = matched.into_iter().map(Option::unwrap_or_default).collect();
  }

  /// Track `pair` as the new innermost pair of cursor `cursor`.
  pub fn insert_pair(&mut self, cursor: usize, pair: Pair) -> Result<Update> {
    if !pair.is_well_formed() {
      return Err(TrackerError::InvalidPair {
        open:  pair.open,
        close: pair.close,
      });
    }
    let len = self.clusters.len();
    let cluster = self
      .clusters
      .get_mut(cursor)
      .ok_or(TrackerError::CursorOutOfBounds { index: cursor, len })?;

    tracing::debug!(cursor, open = %pair.open, close = %pair.close, "track pair");
    let mut update = Update {
      dropped: Vec::new(),
      changed: true,
    };
    cluster.push(pair, &mut update.dropped);
    self.debug_validate();
    Ok(update)
  }

  /// Stop tracking the innermost pair of cursor `cursor` and move the cursor
  /// past it.
  pub(crate) fn leap_over(&mut self, cursor: usize) -> Result<Option<Pair>> {
    let len = self.clusters.len();
    let (Some(cluster), Some(position)) = (self.clusters.get_mut(cursor), self.cursors.get_mut(cursor))
    else {
      return Err(TrackerError::CursorOutOfBounds { index: cursor, len });
    };

    let pair = cluster.pop();
    if let Some(pair) = &pair {
      *position = pair.leap_target();
    }
    self.debug_validate();
    Ok(pair)
  }

  /// Stop tracking everything without touching the cursors.
  pub fn escape(&mut self) -> Update {
    let mut update = Update::default();
    for cluster in &mut self.clusters {
      cluster.clear(&mut update.dropped);
    }
    update.changed = !update.dropped.is_empty();
    update
  }

  pub fn validate(&self) -> Result<()> {
    if self.clusters.len() != self.cursors.len() {
      return Err(TrackerError::NotParallel {
        clusters: self.clusters.len(),
        cursors:  self.cursors.len(),
      });
    }
    for (index, cluster) in self.clusters.iter().enumerate() {
      cluster
        .validate()
        .map_err(|source| TrackerError::Cluster { index, source })?;
    }
    Ok(())
  }

  /// Broken invariants mean a bug in shifting or reconciliation. Fail loudly
  /// in debug builds.
  fn debug_validate(&self) {
    if cfg!(debug_assertions) {
      if let Err(err) = self.validate() {
        panic!("pair tracker invariant violated: {err}");
      }
    }
  }
}
