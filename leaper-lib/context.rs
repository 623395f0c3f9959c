//! Keybinding context derived from tracker state.
//!
//! The host enables the leap keybinding through two boolean context keys,
//! see [`ContextKey`]. Telling the host that a value *might* have changed
//! must be prompt, while recomputing it (line of sight reads document text)
//! can wait.
//!
//! [`LazyContext`] is a two-state cache: [`mark_stale`] flags the value dirty
//! and notifies subscribers right away, and the value is only recomputed on
//! the next [`get`]. Marking an already stale value stale again notifies
//! nobody.
//!
//! [`mark_stale`]: LazyContext::mark_stale
//! [`get`]: LazyContext::get

use std::fmt;

use leaper_core::TextSource;

use crate::{
  leap::any_line_of_sight,
  tracker::Tracker,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContextKey {
  /// Some cursor has at least one tracked pair.
  InLeaperMode,
  /// Some cursor could leap right now.
  HasLineOfSight,
}

impl ContextKey {
  pub const ALL: [ContextKey; 2] = [ContextKey::InLeaperMode, ContextKey::HasLineOfSight];

  /// The name the host registers the key under.
  pub const fn name(self) -> &'static str {
    match self {
      ContextKey::InLeaperMode => "leaper.inLeaperMode",
      ContextKey::HasLineOfSight => "leaper.hasLineOfSight",
    }
  }

  const fn index(self) -> usize {
    match self {
      ContextKey::InLeaperMode => 0,
      ContextKey::HasLineOfSight => 1,
    }
  }
}

impl fmt::Display for ContextKey {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.name())
  }
}

/// Receives context key values. Implemented by the host.
pub trait KeybindingSink {
  fn set_context(&mut self, key: ContextKey, value: bool);
}

type Subscriber = Box<dyn FnMut(ContextKey)>;

pub struct LazyContext<T> {
  key:         ContextKey,
  value:       Option<T>,
  stale:       bool,
  subscribers: Vec<Subscriber>,
}

impl<T: fmt::Debug> fmt::Debug for LazyContext<T> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("LazyContext")
      .field("key", &self.key)
      .field("value", &self.value)
      .field("stale", &self.stale)
      .field("subscribers", &self.subscribers.len())
      .finish()
  }
}

impl<T: Copy> LazyContext<T> {
  /// A context that has never been computed, so it starts stale.
  pub fn new(key: ContextKey) -> Self {
    Self {
      key,
      value: None,
      stale: true,
      subscribers: Vec::new(),
    }
  }

  pub fn key(&self) -> ContextKey {
    self.key
  }

  pub fn is_stale(&self) -> bool {
    self.stale
  }

  /// The cached value, without recomputing.
  pub fn peek(&self) -> Option<T> {
    self.value
  }

  pub fn subscribe(&mut self, subscriber: impl FnMut(ContextKey) + 'static) {
    self.subscribers.push(Box::new(subscriber));
  }

  pub fn mark_stale(&mut self) {
    if self.stale {
      return;
    }
    self.stale = true;
    for subscriber in &mut self.subscribers {
      subscriber(self.key);
    }
  }

  /// The current value, recomputed with `compute` if stale.
  pub fn get(&mut self, compute: impl FnOnce() -> T) -> T {
    match self.value {
      Some(value) if !self.stale => value,
      _ => {
        let value = compute();
        self.value = Some(value);
        self.stale = false;
        value
      },
    }
  }
}

/// Both context keys of one view, plus the values last sent to the host.
#[derive(Debug)]
pub struct KeybindingContext {
  in_leaper_mode:    LazyContext<bool>,
  has_line_of_sight: LazyContext<bool>,
  published:         [Option<bool>; 2],
}

impl Default for KeybindingContext {
  fn default() -> Self {
    Self::new()
  }
}

impl KeybindingContext {
  pub fn new() -> Self {
    Self {
      in_leaper_mode:    LazyContext::new(ContextKey::InLeaperMode),
      has_line_of_sight: LazyContext::new(ContextKey::HasLineOfSight),
      published:         [None; 2],
    }
  }

  pub fn subscribe(&mut self, subscriber: impl FnMut(ContextKey) + Clone + 'static) {
    self.in_leaper_mode.subscribe(subscriber.clone());
    self.has_line_of_sight.subscribe(subscriber);
  }

  pub fn mark_stale(&mut self) {
    self.in_leaper_mode.mark_stale();
    self.has_line_of_sight.mark_stale();
  }

  pub fn is_stale(&self) -> bool {
    self.in_leaper_mode.is_stale() || self.has_line_of_sight.is_stale()
  }

  pub fn in_leaper_mode(&mut self, tracker: &Tracker) -> bool {
    self.in_leaper_mode.get(|| tracker.in_leaper_mode())
  }

  pub fn has_line_of_sight(&mut self, tracker: &Tracker, text: &dyn TextSource) -> bool {
    self
      .has_line_of_sight
      .get(|| tracker.in_leaper_mode() && any_line_of_sight(tracker, text))
  }

  /// Recompute stale keys and send the ones whose value changed.
  ///
  /// Line of sight needs the document. Without `text` it can only be
  /// settled when nothing is tracked; otherwise it stays stale until a later
  /// call provides the text.
  pub fn publish(&mut self, tracker: &Tracker, text: Option<&dyn TextSource>, sink: &mut dyn KeybindingSink) {
    if self.in_leaper_mode.is_stale() {
      let value = self.in_leaper_mode(tracker);
      self.send(ContextKey::InLeaperMode, value, sink);
    }

    if self.has_line_of_sight.is_stale() {
      let value = match text {
        Some(text) => Some(self.has_line_of_sight(tracker, text)),
        None if !tracker.in_leaper_mode() => Some(self.has_line_of_sight.get(|| false)),
        None => None,
      };
      if let Some(value) = value {
        self.send(ContextKey::HasLineOfSight, value, sink);
      }
    }
  }

  fn send(&mut self, key: ContextKey, value: bool, sink: &mut dyn KeybindingSink) {
    let slot = &mut self.published[key.index()];
    if *slot != Some(value) {
      tracing::trace!(%key, value, "publish context");
      *slot = Some(value);
      sink.set_context(key, value);
    }
  }
}
