use std::num::NonZeroUsize;

use leaper_core::shift::shift_all;
use leaper_lib::{
  Controller,
  Position,
  TextReplacement,
  config::{
    Config,
    DecorationStyle,
  },
  context::{
    ContextKey,
    KeybindingSink,
  },
  decoration::{
    DecorationId,
    DecorationSink,
  },
  selection::Selection,
  view::ViewId,
};
use ropey::Rope;

#[derive(Debug, Default)]
struct Host {
  decorated: Vec<(DecorationId, Position)>,
  released:  Vec<DecorationId>,
  context:   Vec<(ContextKey, bool)>,
}

impl Host {
  fn live(&self) -> Vec<Position> {
    self
      .decorated
      .iter()
      .filter(|(id, _)| !self.released.contains(id))
      .map(|(_, at)| *at)
      .collect()
  }

  fn last_context(&self, key: ContextKey) -> Option<bool> {
    self
      .context
      .iter()
      .rev()
      .find(|(sent, _)| *sent == key)
      .map(|(_, value)| *value)
  }
}

impl DecorationSink for Host {
  fn decorate(&mut self, _view: ViewId, decoration: DecorationId, at: Position, _style: &DecorationStyle) {
    self.decorated.push((decoration, at));
  }

  fn release(&mut self, _view: ViewId, decoration: DecorationId) {
    assert!(
      self.decorated.iter().any(|(id, _)| *id == decoration),
      "released unknown decoration {decoration:?}"
    );
    assert!(!self.released.contains(&decoration), "released {decoration:?} twice");
    self.released.push(decoration);
  }
}

impl KeybindingSink for Host {
  fn set_context(&mut self, key: ContextKey, value: bool) {
    self.context.push((key, value));
  }
}

/// A minimal editor: an ASCII document, some cursors, and a controller it
/// reports every change to.
struct Editor {
  text:       Rope,
  cursors:    Vec<Position>,
  controller: Controller,
  host:       Host,
}

fn view() -> ViewId {
  ViewId::new(NonZeroUsize::MIN)
}

fn pos(line: usize, character: usize) -> Position {
  Position::new(line, character)
}

impl Editor {
  fn new(text: &str, cursors: &[Position]) -> Self {
    Self::with_config(text, cursors, Config::default())
  }

  fn with_config(text: &str, cursors: &[Position], config: Config) -> Self {
    let mut controller = Controller::new(config);
    let selections: Vec<Selection> = cursors.iter().copied().map(Selection::from).collect();
    controller.open_view(view(), &selections);
    Self {
      text: Rope::from(text),
      cursors: cursors.to_vec(),
      controller,
      host: Host::default(),
    }
  }

  fn char_idx(&self, at: Position) -> usize {
    self.text.line_to_char(at.line) + at.character
  }

  fn edit(&mut self, edits: Vec<TextReplacement>) {
    let mut ordered = edits.clone();
    ordered.sort_by_key(|edit| std::cmp::Reverse(edit.start()));
    for edit in &ordered {
      let start = self.char_idx(edit.start());
      let end = self.char_idx(edit.end());
      self.text.remove(start..end);
      self.text.insert(start, edit.text());
    }
    self
      .controller
      .handle_edit(view(), &edits, &mut self.host)
      .unwrap();
  }

  fn select(&mut self, cursors: Vec<Position>) {
    self.cursors = cursors;
    let selections: Vec<Selection> = self.cursors.iter().copied().map(Selection::from).collect();
    self
      .controller
      .handle_selection(view(), &selections, &self.text, &mut self.host)
      .unwrap();
  }

  /// Insert `text` at every cursor and put each cursor after `caret` chars of
  /// it.
  fn insert(&mut self, text: &str, caret: usize) {
    let edits: Vec<TextReplacement> = self
      .cursors
      .iter()
      .map(|cursor| TextReplacement::insert(*cursor, text))
      .collect();
    let cursors = (0..edits.len())
      .map(|index| {
        let others: Vec<TextReplacement> = edits
          .iter()
          .enumerate()
          .filter(|(other, _)| *other != index)
          .map(|(_, edit)| edit.clone())
          .collect();
        let start = shift_all(edits[index].start(), &others).unwrap();
        let prefix: String = text.chars().take(caret).collect();
        start.traverse(prefix)
      })
      .collect();
    self.edit(edits);
    self.select(cursors);
  }

  /// Delete the char before every cursor. A cursor whose char went with
  /// another cursor's deletion lands where that deletion started.
  fn backspace(&mut self) {
    let edits: Vec<TextReplacement> = self
      .cursors
      .iter()
      .filter(|cursor| cursor.character > 0)
      .map(|cursor| TextReplacement::delete(pos(cursor.line, cursor.character - 1), *cursor).unwrap())
      .collect();
    let cursors = self
      .cursors
      .iter()
      .map(|cursor| {
        shift_all(*cursor, &edits).unwrap_or_else(|| {
          let removed = edits
            .iter()
            .find(|edit| edit.start() <= *cursor && *cursor < edit.end())
            .unwrap();
          let others: Vec<TextReplacement> = edits
            .iter()
            .filter(|edit| *edit != removed)
            .cloned()
            .collect();
          shift_all(removed.start(), &others).unwrap()
        })
      })
      .collect();
    self.edit(edits);
    self.select(cursors);
  }

  fn type_pair(&mut self, pair: &str) {
    self.insert(pair, 1);
  }

  fn type_text(&mut self, text: &str) {
    self.insert(text, text.chars().count());
  }

  fn leap(&mut self) -> Vec<Position> {
    let cursors = self
      .controller
      .leap(view(), &self.text, &mut self.host)
      .unwrap();
    self.select(cursors.clone());
    cursors
  }

  fn cluster_sides(&self, cursor: usize) -> Vec<(Position, Position)> {
    self
      .controller
      .view(view())
      .unwrap()
      .tracker
      .cluster(cursor)
      .unwrap()
      .iter()
      .map(|pair| pair.sides())
      .collect()
  }

  fn in_leaper_mode(&mut self) -> bool {
    self.controller.in_leaper_mode(view()).unwrap()
  }

  fn has_line_of_sight(&mut self) -> bool {
    self
      .controller
      .has_line_of_sight(view(), &self.text)
      .unwrap()
  }
}

#[test]
fn typing_an_opening_bracket_starts_tracking() {
  let mut editor = Editor::new("foo", &[pos(0, 3)]);
  editor.type_pair("()");

  assert_eq!(editor.text.to_string(), "foo()");
  assert_eq!(editor.cursors, vec![pos(0, 4)]);
  assert_eq!(editor.cluster_sides(0), vec![(pos(0, 3), pos(0, 4))]);
  assert!(editor.in_leaper_mode());
  assert!(editor.has_line_of_sight());
  assert_eq!(editor.host.live(), vec![pos(0, 4)]);
  assert_eq!(editor.host.last_context(ContextKey::InLeaperMode), Some(true));
  assert_eq!(editor.host.last_context(ContextKey::HasLineOfSight), Some(true));
}

#[test]
fn obstacle_blocks_leap_until_deleted() {
  let mut editor = Editor::new("foo", &[pos(0, 3)]);
  editor.type_pair("()");
  editor.type_text("bar");
  assert_eq!(editor.text.to_string(), "foo(bar)");
  assert_eq!(editor.cluster_sides(0), vec![(pos(0, 3), pos(0, 7))]);

  editor.select(vec![pos(0, 4)]);
  assert!(!editor.has_line_of_sight());
  assert_eq!(editor.host.last_context(ContextKey::HasLineOfSight), Some(false));
  assert_eq!(editor.leap(), vec![pos(0, 4)]);
  assert_eq!(editor.cluster_sides(0).len(), 1);

  editor.edit(vec![TextReplacement::delete(pos(0, 4), pos(0, 7)).unwrap()]);
  editor.select(vec![pos(0, 4)]);
  assert_eq!(editor.text.to_string(), "foo()");
  assert!(editor.has_line_of_sight());

  assert_eq!(editor.leap(), vec![pos(0, 5)]);
  assert!(editor.cluster_sides(0).is_empty());
  assert!(!editor.in_leaper_mode());
  assert!(editor.host.live().is_empty());
  assert_eq!(editor.host.last_context(ContextKey::InLeaperMode), Some(false));
}

#[test]
fn trailing_whitespace_does_not_block() {
  let mut editor = Editor::new("", &[pos(0, 0)]);
  editor.type_pair("[]");
  editor.type_text("a \t");
  editor.select(vec![pos(0, 2)]);
  assert!(editor.has_line_of_sight());
  assert_eq!(editor.leap(), vec![pos(0, 5)]);
}

#[test]
fn newline_between_sides_invalidates_pair() {
  let mut editor = Editor::new("foo", &[pos(0, 3)]);
  editor.type_pair("()");
  editor.type_text("\n");

  assert_eq!(editor.cursors, vec![pos(1, 0)]);
  assert!(editor.cluster_sides(0).is_empty());
  assert!(!editor.in_leaper_mode());
  assert!(editor.host.live().is_empty());
}

#[test]
fn moving_out_of_a_pair_stops_tracking_it() {
  let mut editor = Editor::new("x", &[pos(0, 1)]);
  editor.type_pair("\"\"");
  editor.select(vec![pos(0, 0)]);
  assert!(!editor.in_leaper_mode());
  assert!(editor.host.live().is_empty());
}

#[test]
fn nested_pairs_leap_innermost_first() {
  let mut editor = Editor::new("", &[pos(0, 0)]);
  editor.type_pair("()");
  editor.type_pair("[]");
  editor.type_pair("{}");
  assert_eq!(editor.text.to_string(), "([{}])");
  assert_eq!(editor.cluster_sides(0), vec![
    (pos(0, 0), pos(0, 5)),
    (pos(0, 1), pos(0, 4)),
    (pos(0, 2), pos(0, 3)),
  ]);
  // only the innermost closing side is decorated
  assert_eq!(editor.host.live(), vec![pos(0, 3)]);

  assert_eq!(editor.leap(), vec![pos(0, 4)]);
  assert_eq!(editor.host.live(), vec![pos(0, 4)]);
  assert_eq!(editor.leap(), vec![pos(0, 5)]);
  assert_eq!(editor.leap(), vec![pos(0, 6)]);
  assert!(!editor.in_leaper_mode());
  assert!(editor.host.live().is_empty());

  // nothing left: leaping again changes nothing
  assert_eq!(editor.leap(), vec![pos(0, 6)]);
}

#[test]
fn decorate_all_decorates_every_closing_side() {
  let config = Config {
    decorate_all: true,
    ..Config::default()
  };
  let mut editor = Editor::with_config("", &[pos(0, 0)], config);
  editor.type_pair("()");
  editor.type_pair("()");
  assert_eq!(editor.host.live().len(), 2);
}

#[test]
fn every_cursor_leaps_on_its_own() {
  let mut editor = Editor::new("a\nbb\nc", &[pos(0, 1), pos(1, 2), pos(2, 1)]);
  editor.type_pair("()");
  assert_eq!(editor.text.to_string(), "a()\nbb()\nc()");
  assert_eq!(editor.cursors, vec![pos(0, 2), pos(1, 3), pos(2, 2)]);

  // block the middle cursor
  editor.select(vec![pos(0, 2), pos(1, 3), pos(2, 2)]);
  editor.edit(vec![TextReplacement::insert(pos(1, 3), "x")]);
  editor.select(vec![pos(0, 2), pos(1, 3), pos(2, 2)]);
  assert_eq!(editor.text.to_string(), "a()\nbb(x)\nc()");

  assert_eq!(editor.leap(), vec![pos(0, 3), pos(1, 3), pos(2, 3)]);
  assert!(editor.cluster_sides(0).is_empty());
  assert_eq!(editor.cluster_sides(1), vec![(pos(1, 2), pos(1, 4))]);
  assert!(editor.cluster_sides(2).is_empty());
}

#[test]
fn removed_cursor_releases_its_cluster() {
  let mut editor = Editor::new("a\nb", &[pos(0, 1), pos(1, 1)]);
  editor.type_pair("()");
  assert_eq!(editor.host.live().len(), 2);

  editor.select(vec![pos(1, 2)]);
  assert_eq!(editor.cluster_sides(0), vec![(pos(1, 1), pos(1, 2))]);
  assert_eq!(editor.host.live(), vec![pos(1, 2)]);
}

#[test]
fn escape_clears_everything_in_place() {
  let mut editor = Editor::new("", &[pos(0, 0)]);
  editor.type_pair("()");
  editor.type_pair("()");
  editor
    .controller
    .escape_leaper_mode(view(), &mut editor.host)
    .unwrap();

  assert!(!editor.in_leaper_mode());
  assert!(editor.host.live().is_empty());
  assert_eq!(editor.controller.view(view()).unwrap().tracker.cursors(), &[pos(0, 2)]);
  assert_eq!(editor.host.last_context(ContextKey::HasLineOfSight), Some(false));
}

#[test]
fn adjacent_cursors_backspace_into_a_pair() {
  let mut editor = Editor::new("", &[pos(0, 0)]);
  editor.type_pair("()");
  editor.type_text("ab");
  assert_eq!(editor.text.to_string(), "(ab)");

  editor.select(vec![pos(0, 2), pos(0, 3)]);
  assert!(editor.cluster_sides(0).is_empty());
  assert_eq!(editor.cluster_sides(1), vec![(pos(0, 0), pos(0, 3))]);

  editor.backspace();
  assert_eq!(editor.text.to_string(), "()");
  assert_eq!(editor.cursors, vec![pos(0, 1), pos(0, 1)]);
  assert_eq!(editor.cluster_sides(1), vec![(pos(0, 0), pos(0, 1))]);
  assert_eq!(editor.controller.view(view()).unwrap().tracker.validate(), Ok(()));
  assert_eq!(editor.host.live().len(), 1);
  assert!(editor.has_line_of_sight());

  assert_eq!(editor.leap(), vec![pos(0, 1), pos(0, 2)]);
  assert!(!editor.in_leaper_mode());
  assert!(editor.host.live().is_empty());
}
