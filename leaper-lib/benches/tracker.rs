//! Benchmarks for tracker transitions in leaper-lib.
//!
//! Run with: `cargo bench -p leaper-lib --bench tracker`

use divan::{
  Bencher,
  black_box,
};
use leaper_lib::{
  Position,
  TextReplacement,
  leap::leap_all,
  pair::Pair,
  selection::Selection,
  tracker::Tracker,
};
use ropey::Rope;

fn main() {
  divan::main();
}

const DEPTH: usize = 4;

/// One cursor per line, each inside `DEPTH` nested pairs: `(((( ))))`.
fn make_tracker(cursors: usize) -> Tracker {
  let selections: Vec<Selection> = (0..cursors)
    .map(|line| Selection::point(Position::new(line, DEPTH)))
    .collect();
  let mut tracker = Tracker::new(&selections);
  for cursor in 0..cursors {
    for depth in 0..DEPTH {
      let pair = Pair::new(
        Position::new(cursor, depth),
        Position::new(cursor, 2 * DEPTH - depth),
      );
      let _ = tracker.insert_pair(cursor, pair);
    }
  }
  tracker
}

fn make_text(cursors: usize) -> Rope {
  let line = format!("{} {}\n", "(".repeat(DEPTH), ")".repeat(DEPTH));
  Rope::from(line.repeat(cursors))
}

#[divan::bench(args = [1, 16, 256])]
fn typing_at_every_cursor(bencher: Bencher, cursors: usize) {
  let edits: Vec<TextReplacement> = (0..cursors)
    .map(|line| TextReplacement::insert(Position::new(line, DEPTH), "x"))
    .collect();
  bencher
    .with_inputs(|| make_tracker(cursors))
    .bench_local_values(|mut tracker| {
      let update = tracker.apply_edit(black_box(&edits));
      (tracker, update)
    });
}

#[divan::bench(args = [1, 16, 256])]
fn selection_change(bencher: Bencher, cursors: usize) {
  let selections: Vec<Selection> = (0..cursors)
    .map(|line| Selection::point(Position::new(line, DEPTH + 1)))
    .collect();
  bencher
    .with_inputs(|| make_tracker(cursors))
    .bench_local_values(|mut tracker| {
      let update = tracker.apply_selection_change(black_box(&selections));
      (tracker, update)
    });
}

#[divan::bench(args = [16, 256])]
fn cursor_count_change(bencher: Bencher, cursors: usize) {
  let selections: Vec<Selection> = (0..cursors / 2)
    .map(|line| Selection::point(Position::new(line * 2, DEPTH)))
    .collect();
  bencher
    .with_inputs(|| make_tracker(cursors))
    .bench_local_values(|mut tracker| {
      let update = tracker.apply_selection_change(black_box(&selections));
      (tracker, update)
    });
}

#[divan::bench(args = [1, 16, 256])]
fn leap_every_cursor(bencher: Bencher, cursors: usize) {
  let text = make_text(cursors);
  bencher
    .with_inputs(|| make_tracker(cursors))
    .bench_local_values(|mut tracker| {
      let leaps = leap_all(&mut tracker, black_box(&text));
      (tracker, leaps)
    });
}
