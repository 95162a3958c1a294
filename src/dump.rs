//! Diagnostic pretty-printer for a pool's contents.
//!
//! This module is a consumer of the pool's introspection surface
//! ([`Pool::chunks`], [`Pool::base`], [`Pool::upper_limit`], [`gap_size`])
//! and nothing more; the allocator does not need it to be correct. The dump
//! shows the descriptor, every live chunk with its header fields and payload
//! bytes, and every non-zero gap in between.

use std::fmt::Write;
use std::slice;

use crate::pool::{ChunkView, POOL_HEADER_SIZE, Pool, gap_size};

const HR: &str = "----------------------------------------------------------------";

fn maybe_null(present: bool) -> &'static str {
  if present { "*" } else { "NULL" }
}

fn push_gap(out: &mut String, gap: usize) {
  if gap != 0 {
    let _ = writeln!(out, "{} byte gap", gap);
  }
}

/// Renders the chunk's payload: printable bytes other than backslash go
/// through as-is, everything else becomes `\xXX`.
fn push_payload(out: &mut String, chunk: &ChunkView) {
  // Safety: the view came from a live traversal, so payload() points at
  // size() readable bytes inside the pool region.
  let bytes = unsafe { slice::from_raw_parts(chunk.payload(), chunk.size()) };

  let _ = write!(out, "{} byte chunk: ", chunk.size());
  for &b in bytes {
    if (0x20..0x80).contains(&b) && b != b'\\' {
      out.push(b as char);
    } else {
      let _ = write!(out, "\\x{:02X}", b);
    }
  }
  out.push('\n');
}

/// Renders the whole pool as human-readable text.
pub fn dump(pool: &Pool) -> String {
  let mut out = String::new();
  let _ = writeln!(out, "{}", HR);
  let _ = writeln!(out, "struct Pool");
  let _ = writeln!(out, "    first: {}", maybe_null(!pool.is_empty()));

  let mem_start = pool.base().wrapping_add(POOL_HEADER_SIZE);

  match pool.chunks().next() {
    // An empty pool reports its single gap even when it is zero.
    None => {
      let _ = writeln!(out, "{} byte gap", gap_size(mem_start, pool.upper_limit()));
    }
    Some(first) => push_gap(&mut out, gap_size(mem_start, first.start())),
  }

  let mut prev_end: Option<*const u8> = None;

  for chunk in pool.chunks() {
    if let Some(end) = prev_end {
      push_gap(&mut out, gap_size(end, chunk.start()));
    }

    let _ = writeln!(out, "struct Chunk");
    let _ = writeln!(out, "    nsize: {}", chunk.size());
    let _ = writeln!(out, "    prev: {}", maybe_null(chunk.has_prev()));
    let _ = writeln!(out, "    next: {}", maybe_null(chunk.has_next()));
    push_payload(&mut out, &chunk);

    prev_end = Some(chunk.end());
  }

  if let Some(end) = prev_end {
    push_gap(&mut out, gap_size(end, pool.upper_limit()));
  }

  let _ = writeln!(out, "{}", HR);
  out
}

/// Writes [`dump`] output to stdout.
pub fn print_dump(pool: &Pool) {
  print!("{}", dump(pool));
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::pool::free;

  #[test]
  fn empty_pool_reports_full_gap() {
    let pool = Pool::create(256).unwrap();

    unsafe {
      let text = dump(pool.as_ref());

      assert!(text.contains("first: NULL"));
      assert!(text.contains(&format!("{} byte gap", 256 - POOL_HEADER_SIZE)));
      assert!(!text.contains("struct Chunk"));

      Pool::destroy(pool.as_ptr());
    }
  }

  #[test]
  fn written_payload_appears_verbatim() {
    let pool = Pool::create(256).unwrap();

    unsafe {
      let p = (*pool.as_ptr()).allocate(4).unwrap().as_ptr();
      p.copy_from_nonoverlapping(b"abcd".as_ptr(), 4);

      let text = dump(pool.as_ref());

      assert!(text.contains("first: *"));
      assert!(text.contains("nsize: 4"));
      assert!(text.contains("4 byte chunk: abcd"));

      Pool::destroy(pool.as_ptr());
    }
  }

  #[test]
  fn unprintable_bytes_are_escaped() {
    let pool = Pool::create(256).unwrap();

    unsafe {
      let p = (*pool.as_ptr()).allocate(3).unwrap().as_ptr();
      p.copy_from_nonoverlapping([0x01, b'Z', b'\\'].as_ptr(), 3);

      let text = dump(pool.as_ref());
      assert!(text.contains("3 byte chunk: \\x01Z\\x5C"));

      Pool::destroy(pool.as_ptr());
    }
  }

  #[test]
  fn untouched_payload_shows_sentinel_dollars() {
    let pool = Pool::create(256).unwrap();

    unsafe {
      let _p = (*pool.as_ptr()).allocate(6).unwrap();

      let text = dump(pool.as_ref());
      assert!(text.contains("6 byte chunk: $$$$$$"));

      Pool::destroy(pool.as_ptr());
    }
  }

  #[test]
  fn gap_between_chunks_shows_after_free() {
    let pool = Pool::create(512).unwrap();

    unsafe {
      let _a = (*pool.as_ptr()).allocate(8).unwrap();
      let b = (*pool.as_ptr()).allocate(8).unwrap().as_ptr();
      let _c = (*pool.as_ptr()).allocate(8).unwrap();

      free(b);

      let text = dump(pool.as_ref());

      // b's header plus payload turned into one implicit gap.
      assert!(text.contains(&format!("{} byte gap", crate::CHUNK_HEADER_SIZE + 8)));
      assert_eq!(text.matches("struct Chunk").count(), 2);

      Pool::destroy(pool.as_ptr());
    }
  }

  #[test]
  fn chunk_link_fields_reflect_position() {
    let pool = Pool::create(512).unwrap();

    unsafe {
      let _a = (*pool.as_ptr()).allocate(4).unwrap();
      let _b = (*pool.as_ptr()).allocate(4).unwrap();

      let text = dump(pool.as_ref());

      assert!(text.contains("    prev: NULL\n    next: *\n"));
      assert!(text.contains("    prev: *\n    next: NULL\n"));

      Pool::destroy(pool.as_ptr());
    }
  }
}
