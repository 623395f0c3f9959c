#![no_main]

mod common;

use std::mem;

use libfuzzer_sys::fuzz_target;

use crate::common::session_from_bytes;

fuzz_target!(|data: &[u8]| {
  let Some(mut session) = session_from_bytes(data) else {
    return;
  };

  for op in mem::take(&mut session.ops) {
    session.apply(op);
    session.check();
  }
});
