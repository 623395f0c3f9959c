use std::num::NonZeroUsize;

use leaper_core::shift::shift_all;
use leaper_lib::{
  Controller,
  Position,
  TextReplacement,
  config::DecorationStyle,
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

const MAX_INITIAL_LINES: usize = 8;
const MAX_OPS: usize = 128;
const MAX_CURSORS: usize = 8;

pub const OPENING: &[char] = &['(', '[', '{', '"'];
pub const CLOSING: &[char] = &[')', ']', '}', '"'];
const PAIRS: &[&str] = &["()", "[]", "{}", "\"\""];
const PLAIN: &[&str] = &["a", "b", " ", "\t", "\n", "ab"];

#[derive(Debug, Clone, Copy)]
pub enum Op {
  TypePair(u8),
  TypeText(u8),
  Backspace,
  Move { cursor: u8, line: u8, column: u8 },
  AddCursor { line: u8, column: u8 },
  RemoveCursor(u8),
  Leap,
  Escape,
}

/// Counts decorations so the target can check none leak or are released
/// twice.
#[derive(Debug, Default)]
pub struct CountingHost {
  pub live: Vec<DecorationId>,
}

impl DecorationSink for CountingHost {
  fn decorate(&mut self, _view: ViewId, decoration: DecorationId, _at: Position, _style: &DecorationStyle) {
    assert!(!self.live.contains(&decoration));
    self.live.push(decoration);
  }

  fn release(&mut self, _view: ViewId, decoration: DecorationId) {
    let index = self.live.iter().position(|id| *id == decoration);
    assert!(index.is_some(), "released {decoration:?} which is not live");
    if let Some(index) = index {
      self.live.swap_remove(index);
    }
  }
}

impl KeybindingSink for CountingHost {
  fn set_context(&mut self, _key: ContextKey, _value: bool) {}
}

pub struct FuzzSession {
  pub text:       Rope,
  pub cursors:    Vec<Position>,
  pub controller: Controller,
  pub host:       CountingHost,
  pub ops:        Vec<Op>,
}

pub fn view() -> ViewId {
  ViewId::new(NonZeroUsize::MIN)
}

pub fn session_from_bytes(data: &[u8]) -> Option<FuzzSession> {
  let mut bytes = ByteCursor::new(data);

  let lines = bytes.next_usize(MAX_INITIAL_LINES);
  let initial: String = (0..lines)
    .map(|line| format!("{}\n", "x".repeat(line % 5)))
    .collect();
  let text = Rope::from(initial.as_str());

  let cursors = vec![Position::zero()];
  let mut controller = Controller::default();
  controller.open_view(view(), &[Selection::point(Position::zero())]);

  let op_count = bytes.next_usize(MAX_OPS);
  let ops = (0..op_count).map(|_| decode_op(&mut bytes)).collect();

  Some(FuzzSession {
    text,
    cursors,
    controller,
    host: CountingHost::default(),
    ops,
  })
}

impl FuzzSession {
  fn line_len(&self, line: usize) -> usize {
    let slice = self.text.line(line);
    let len = slice.len_chars();
    if len > 0 && slice.char(len - 1) == '\n' {
      len - 1
    } else {
      len
    }
  }

  pub fn clamp(&self, line: usize, column: usize) -> Position {
    let line = line % self.text.len_lines();
    Position::new(line, column % (self.line_len(line) + 1))
  }

  fn char_idx(&self, at: Position) -> usize {
    self.text.line_to_char(at.line) + at.character
  }

  pub fn apply(&mut self, op: Op) {
    match op {
      Op::TypePair(which) => {
        let pair = PAIRS[which as usize % PAIRS.len()];
        self.insert_at_cursors(pair, 1);
      },
      Op::TypeText(which) => {
        let text = PLAIN[which as usize % PLAIN.len()];
        self.insert_at_cursors(text, text.chars().count());
      },
      Op::Backspace => self.backspace(),
      Op::Move { cursor, line, column } => {
        let index = cursor as usize % self.cursors.len();
        self.cursors[index] = self.clamp(line as usize, column as usize);
        self.select();
      },
      Op::AddCursor { line, column } => {
        if self.cursors.len() < MAX_CURSORS {
          let cursor = self.clamp(line as usize, column as usize);
          self.cursors.push(cursor);
          self.select();
        }
      },
      Op::RemoveCursor(cursor) => {
        if self.cursors.len() > 1 {
          self.cursors.remove(cursor as usize % self.cursors.len());
          self.select();
        }
      },
      Op::Leap => {
        if let Ok(cursors) = self.controller.leap(view(), &self.text, &mut self.host) {
          self.cursors = cursors;
          self.select();
        }
      },
      Op::Escape => {
        let _ = self.controller.escape_leaper_mode(view(), &mut self.host);
      },
    }
  }

  /// Drop duplicate cursors, keeping the order the tracker's clusters
  /// follow.
  fn unique_cursors(&mut self) {
    let mut seen = Vec::with_capacity(self.cursors.len());
    self.cursors.retain(|cursor| {
      if seen.contains(cursor) {
        return false;
      }
      seen.push(*cursor);
      true
    });
  }

  fn insert_at_cursors(&mut self, text: &str, caret: usize) {
    self.unique_cursors();
    self.select();
    let edits: Vec<TextReplacement> = self
      .cursors
      .iter()
      .map(|cursor| TextReplacement::insert(*cursor, text))
      .collect();
    let prefix: String = text.chars().take(caret).collect();
    let cursors = (0..edits.len())
      .map(|index| {
        shift_all(edits[index].start(), &without(&edits, index))
          .unwrap_or(edits[index].start())
          .traverse(&prefix)
      })
      .collect();
    self.edit(edits);
    self.cursors = cursors;
    self.select();
  }

  fn backspace(&mut self) {
    self.unique_cursors();
    self.select();
    let edits: Vec<TextReplacement> = self
      .cursors
      .iter()
      .filter(|cursor| cursor.character > 0)
      .filter_map(|cursor| {
        TextReplacement::delete(Position::new(cursor.line, cursor.character - 1), *cursor).ok()
      })
      .collect();
    let cursors = self
      .cursors
      .iter()
      .map(|cursor| map_cursor(*cursor, &edits))
      .collect();
    self.edit(edits);
    self.cursors = cursors;
    self.select();
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
    let _ = self.controller.handle_edit(view(), &edits, &mut self.host);
  }

  fn select(&mut self) {
    let selections: Vec<Selection> = self.cursors.iter().copied().map(Selection::from).collect();
    let _ = self
      .controller
      .handle_selection(view(), &selections, &self.text, &mut self.host);
  }

  /// Every tracked pair still points at an opening and a closing character.
  pub fn check(&self) {
    let Some(view) = self.controller.view(view()) else {
      return;
    };
    assert_eq!(view.tracker.validate(), Ok(()));

    for cluster in view.tracker.clusters() {
      for pair in cluster {
        let open = self.text.char(self.char_idx(pair.open));
        let close = self.text.char(self.char_idx(pair.close));
        assert!(OPENING.contains(&open), "{open:?} at {} is not an opening side", pair.open);
        assert!(CLOSING.contains(&close), "{close:?} at {} is not a closing side", pair.close);
      }
    }

    let decorated = view
      .tracker
      .clusters()
      .iter()
      .flat_map(|cluster| cluster.iter())
      .filter(|pair| pair.decoration().is_some())
      .count();
    assert_eq!(decorated, self.host.live.len());
  }
}

fn without(edits: &[TextReplacement], index: usize) -> Vec<TextReplacement> {
  edits
    .iter()
    .enumerate()
    .filter(|(other, _)| *other != index)
    .map(|(_, edit)| edit.clone())
    .collect()
}

/// Where a cursor ends up after `edits`. A cursor removed by a deletion moves
/// to where that deletion started.
fn map_cursor(cursor: Position, edits: &[TextReplacement]) -> Position {
  if let Some(mapped) = shift_all(cursor, edits) {
    return mapped;
  }
  let Some(index) = edits
    .iter()
    .position(|edit| edit.start() <= cursor && cursor < edit.end())
  else {
    return cursor;
  };
  let start = edits[index].start();
  shift_all(start, &without(edits, index)).unwrap_or(start)
}

fn decode_op(bytes: &mut ByteCursor<'_>) -> Op {
  let tag = bytes.next_u8();
  let a = bytes.next_u8();
  let b = bytes.next_u8();
  let c = bytes.next_u8();
  match tag % 8 {
    0 => Op::TypePair(a),
    1 => Op::TypeText(a),
    2 => Op::Backspace,
    3 => Op::Move {
      cursor: a,
      line:   b,
      column: c,
    },
    4 => Op::AddCursor { line: a, column: b },
    5 => Op::RemoveCursor(a),
    6 => Op::Leap,
    _ => Op::Escape,
  }
}

struct ByteCursor<'a> {
  data: &'a [u8],
  pos:  usize,
}

impl<'a> ByteCursor<'a> {
  fn new(data: &'a [u8]) -> Self {
    Self { data, pos: 0 }
  }

  fn next_u8(&mut self) -> u8 {
    let value = self.data.get(self.pos).copied().unwrap_or(0);
    self.pos = self.pos.saturating_add(1);
    value
  }

  fn next_u16(&mut self) -> u16 {
    let lo = self.next_u8() as u16;
    let hi = self.next_u8() as u16;
    lo | (hi << 8)
  }

  fn next_usize(&mut self, max: usize) -> usize {
    if max == 0 {
      return 0;
    }
    (self.next_u16() as usize) % (max + 1)
  }
}
