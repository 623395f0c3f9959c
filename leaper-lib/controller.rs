//! Host integration.
//!
//! The [`Controller`] owns the tracking state of every open view and turns
//! host events into tracker transitions. Each handler runs the transition,
//! then flushes the view's decoration queue and publishes the keybinding
//! context, so the host sees one consistent batch of side effects per event.
//!
//! Hosts are expected to report a document change before the selection
//! change it causes.

use hashbrown::HashMap;
use leaper_core::{
  Position,
  TextReplacement,
  TextSource,
};
use thiserror::Error;

use crate::{
  autoclose,
  config::{
    Config,
    DetectedPairs,
  },
  context::{
    ContextKey,
    KeybindingSink,
  },
  decoration::DecorationSink,
  leap::leap_all,
  pair::Pair,
  selection::Selection,
  tracker::{
    TrackerError,
    Update,
  },
  view::{
    View,
    ViewId,
  },
};

pub type Result<T> = std::result::Result<T, ControllerError>;

#[derive(Debug, Error, PartialEq, Eq)]
#[non_exhaustive]
pub enum ControllerError {
  #[error("view {0:?} is not open")]
  UnknownView(ViewId),
  #[error(transparent)]
  Tracker(#[from] TrackerError),
}

/// Everything the controller reports back to.
pub trait Host: DecorationSink + KeybindingSink {}

impl<T: DecorationSink + KeybindingSink + ?Sized> Host for T {}

type ViewMap = HashMap<ViewId, View, foldhash::fast::RandomState>;

#[derive(Debug)]
pub struct Controller {
  views:    ViewMap,
  config:   Config,
  detected: DetectedPairs,
}

impl Default for Controller {
  fn default() -> Self {
    Self::new(Config::default())
  }
}

impl Controller {
  pub fn new(config: Config) -> Self {
    let detected = config.detected_pairs();
    Self {
      views: ViewMap::default(),
      config,
      detected,
    }
  }

  pub fn config(&self) -> &Config {
    &self.config
  }

  pub fn view(&self, id: ViewId) -> Option<&View> {
    self.views.get(&id)
  }

  pub fn views(&self) -> impl Iterator<Item = &View> {
    self.views.values()
  }

  /// Start tracking a view. A view that is already open keeps its state.
  pub fn open_view(&mut self, id: ViewId, selections: &[Selection]) -> &View {
    self.views.entry(id).or_insert_with(|| {
      tracing::debug!(?id, cursors = selections.len(), "open view");
      View::new(id, selections)
    })
  }

  /// Stop tracking a view, releasing all of its decorations.
  pub fn close_view<H: Host>(&mut self, id: ViewId, host: &mut H) -> Result<()> {
    let mut view = self.views.remove(&id).ok_or(ControllerError::UnknownView(id))?;
    tracing::debug!(?id, "close view");
    view.decorations.release_all(&mut view.tracker, host);
    Ok(())
  }

  /// Replace the configuration and redecorate every view with it.
  pub fn set_config<H: Host>(&mut self, config: Config, host: &mut H) {
    self.detected = config.detected_pairs();
    self.config = config;
    for view in self.views.values_mut() {
      view.decorations.release_all(&mut view.tracker, host);
      finish(view, &self.config, Update::default(), None, host);
    }
  }

  /// Shift tracked pairs through a document change and track the pairs it
  /// autoclosed.
  pub fn handle_edit<H: Host>(&mut self, id: ViewId, edits: &[TextReplacement], host: &mut H) -> Result<()> {
    let view = self.views.get_mut(&id).ok_or(ControllerError::UnknownView(id))?;

    let before = view.tracker.cursors().to_vec();
    let mut update = view.tracker.apply_edit(edits);
    for found in autoclose::detect(edits, &before, &self.detected) {
      update.merge(view.tracker.insert_pair(found.cursor, found.pair)?);
    }

    finish(view, &self.config, update, None, host);
    Ok(())
  }

  /// Track a pair the host reports as autoclosed at `open`.
  ///
  /// Returns false if `pair` is not one of the detected pairs.
  pub fn handle_autoclose<H: Host>(
    &mut self,
    id: ViewId,
    cursor: usize,
    pair: &str,
    open: Position,
    host: &mut H,
  ) -> Result<bool> {
    let view = self.views.get_mut(&id).ok_or(ControllerError::UnknownView(id))?;
    if !self.detected.contains(pair) {
      tracing::trace!(pair, "not a detected pair");
      return Ok(false);
    }

    let update = view.tracker.insert_pair(cursor, Pair::new(open, open.right(1)))?;
    finish(view, &self.config, update, None, host);
    Ok(true)
  }

  pub fn handle_selection<H: Host>(
    &mut self,
    id: ViewId,
    selections: &[Selection],
    text: &dyn TextSource,
    host: &mut H,
  ) -> Result<()> {
    let view = self.views.get_mut(&id).ok_or(ControllerError::UnknownView(id))?;
    let update = view.tracker.apply_selection_change(selections);
    finish(view, &self.config, update, Some(text), host);
    Ok(())
  }

  /// Leap every cursor with line of sight.
  ///
  /// Returns the cursor positions the host should apply, one per cursor in
  /// the original order. Cursors that could not leap stay where they are.
  pub fn leap<H: Host>(&mut self, id: ViewId, text: &dyn TextSource, host: &mut H) -> Result<Vec<Position>> {
    let view = self.views.get_mut(&id).ok_or(ControllerError::UnknownView(id))?;
    let leaps = leap_all(&mut view.tracker, text);
    if !leaps.any() {
      tracing::trace!(?id, "nothing to leap over");
    }
    finish(view, &self.config, leaps.update, Some(text), host);
    Ok(view.tracker.cursors().to_vec())
  }

  /// Stop tracking every pair of the view without moving any cursor.
  pub fn escape_leaper_mode<H: Host>(&mut self, id: ViewId, host: &mut H) -> Result<()> {
    let view = self.views.get_mut(&id).ok_or(ControllerError::UnknownView(id))?;
    let update = view.tracker.escape();
    tracing::debug!(?id, dropped = update.dropped.len(), "escape leaper mode");
    finish(view, &self.config, update, None, host);
    Ok(())
  }

  pub fn in_leaper_mode(&mut self, id: ViewId) -> Result<bool> {
    let view = self.views.get_mut(&id).ok_or(ControllerError::UnknownView(id))?;
    Ok(view.context.in_leaper_mode(&view.tracker))
  }

  pub fn has_line_of_sight(&mut self, id: ViewId, text: &dyn TextSource) -> Result<bool> {
    let view = self.views.get_mut(&id).ok_or(ControllerError::UnknownView(id))?;
    Ok(view.context.has_line_of_sight(&view.tracker, text))
  }

  /// Be told whenever a context key of the view may have changed.
  pub fn subscribe(
    &mut self,
    id: ViewId,
    subscriber: impl FnMut(ContextKey) + Clone + 'static,
  ) -> Result<()> {
    let view = self.views.get_mut(&id).ok_or(ControllerError::UnknownView(id))?;
    view.context.subscribe(subscriber);
    Ok(())
  }
}

fn finish<H: Host>(view: &mut View, config: &Config, update: Update, text: Option<&dyn TextSource>, host: &mut H) {
  let View {
    tracker,
    decorations,
    context,
    ..
  } = view;

  decorations.release_dropped(&update.dropped);
  decorations.request_wanted(tracker, config.decorate_all);
  decorations.flush(tracker, &config.decoration, config.decorate_all, host);

  if update.changed || !update.dropped.is_empty() {
    context.mark_stale();
  }
  context.publish(tracker, text, host);
}
