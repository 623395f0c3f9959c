//! The nested pairs belonging to one cursor.
//!
//! Pairs are stored outermost first, so the innermost pair (the one a leap
//! targets) is always the last element:
//!
//! ```text
//! f(a, [b, {|}])
//!  ^   ^   ^^
//!  0   1   2     <- index in the cluster, 2 is innermost
//! ```
//!
//! For every adjacent `outer`, `inner`:
//! `outer.open <= inner.open` and `inner.close <= outer.close`.

use leaper_core::{
  Position,
  TextReplacement,
};
use smallvec::SmallVec;
use thiserror::Error;

use crate::pair::{
  Pair,
  PairId,
};

#[derive(Debug, Error, PartialEq, Eq)]
#[non_exhaustive]
pub enum ClusterError {
  #[error("pair {open}..{close} does not open before it closes")]
  InvertedPair { open: Position, close: Position },
  #[error("pair {open}..{close} spans several lines")]
  MultiLinePair { open: Position, close: Position },
  #[error("pair {inner_open}..{inner_close} is not nested in {outer_open}..{outer_close}")]
  BrokenNesting {
    outer_open:  Position,
    outer_close: Position,
    inner_open:  Position,
    inner_close: Position,
  },
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Cluster {
  pairs: SmallVec<[Pair; 4]>,
}

impl Cluster {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn len(&self) -> usize {
    self.pairs.len()
  }

  pub fn is_empty(&self) -> bool {
    self.pairs.is_empty()
  }

  pub fn innermost(&self) -> Option<&Pair> {
    self.pairs.last()
  }

  pub fn outermost(&self) -> Option<&Pair> {
    self.pairs.first()
  }

  /// Pairs from outermost to innermost.
  pub fn iter(&self) -> std::slice::Iter<'_, Pair> {
    self.pairs.iter()
  }

  pub(crate) fn iter_mut(&mut self) -> std::slice::IterMut<'_, Pair> {
    self.pairs.iter_mut()
  }

  pub fn get(&self, id: PairId) -> Option<&Pair> {
    self.pairs.iter().find(|pair| pair.id() == id)
  }

  pub(crate) fn get_mut(&mut self, id: PairId) -> Option<&mut Pair> {
    self.pairs.iter_mut().find(|pair| pair.id() == id)
  }

  /// Push `pair` as the new innermost pair.
  ///
  /// Pairs that do not enclose it are popped into `dropped` first, so the
  /// nesting invariant holds even when the host reports a pair away from
  /// the current innermost one.
  pub(crate) fn push(&mut self, pair: Pair, dropped: &mut Vec<Pair>) {
    while let Some(inner) = self.pairs.last() {
      if inner.encloses(&pair) {
        break;
      }
      dropped.extend(self.pairs.pop());
    }
    self.pairs.push(pair);
  }

  pub(crate) fn pop(&mut self) -> Option<Pair> {
    self.pairs.pop()
  }

  pub(crate) fn clear(&mut self, dropped: &mut Vec<Pair>) {
    dropped.extend(self.pairs.drain(..));
  }

  /// Shift every pair through an edit batch sorted last-in-document first.
  ///
  /// Each pair is judged on its own shifted sides: dropping a pair never
  /// drops its neighbours.
  pub(crate) fn shift_through(&mut self, ordered: &[TextReplacement], dropped: &mut Vec<Pair>) {
    let mut kept = SmallVec::with_capacity(self.pairs.len());
    for mut pair in self.pairs.drain(..) {
      if pair.shift_through(ordered) {
        kept.push(pair);
      } else {
        dropped.push(pair);
      }
    }
    self.pairs = kept;
  }

  /// Pop pairs from the innermost end until one contains `cursor`.
  pub(crate) fn retain_around(&mut self, cursor: Position, dropped: &mut Vec<Pair>) {
    while let Some(inner) = self.pairs.last() {
      if inner.contains(cursor) {
        break;
      }
      dropped.extend(self.pairs.pop());
    }
  }

  pub fn validate(&self) -> Result<(), ClusterError> {
    for pair in &self.pairs {
      if pair.open >= pair.close {
        return Err(ClusterError::InvertedPair {
          open:  pair.open,
          close: pair.close,
        });
      }
      if pair.open.line != pair.close.line {
        return Err(ClusterError::MultiLinePair {
          open:  pair.open,
          close: pair.close,
        });
      }
    }

    for window in self.pairs.windows(2) {
      let [outer, inner] = window else {
        continue;
      };
      if !outer.encloses(inner) {
        return Err(ClusterError::BrokenNesting {
          outer_open:  outer.open,
          outer_close: outer.close,
          inner_open:  inner.open,
          inner_close: inner.close,
        });
      }
    }

    Ok(())
  }
}

impl<'a> IntoIterator for &'a Cluster {
  type IntoIter = std::slice::Iter<'a, Pair>;
  type Item = &'a Pair;

  fn into_iter(self) -> Self::IntoIter {
    self.iter()
  }
}
