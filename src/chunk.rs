use std::mem;

use crate::pool::Pool;

/// Size in bytes of the header that precedes every payload.
///
/// Every allocation costs `CHUNK_HEADER_SIZE` bytes on top of the requested
/// payload size, so a pool of capacity `C` can hold at most
/// `(C - POOL_HEADER_SIZE) / CHUNK_HEADER_SIZE` zero-sized chunks.
pub const CHUNK_HEADER_SIZE: usize = mem::size_of::<Chunk>();

/// Metadata header for one live allocation.
///
/// A `Chunk` is never constructed as a normal Rust value by callers: it is
/// written into the pool region at the start of the gap chosen for the
/// allocation, and the payload bytes follow it immediately. It exists only
/// while the allocation is live; `free` unlinks it and the bytes it occupied
/// become part of an implicit gap.
///
/// Chunks land at whatever byte address their gap starts at, which in general
/// is not aligned for this struct. All access therefore goes through the
/// unaligned [`Chunk::read`]/[`Chunk::write`] helpers; taking a `&Chunk` or
/// `&mut Chunk` into the region would be unsound.
#[repr(C)]
#[derive(Clone, Copy)]
pub struct Chunk {
  /// Payload size in bytes, exactly as the caller requested (may be zero).
  pub nsize: usize,
  /// Previous chunk in address order, or null if this is the first.
  pub prev: *mut Chunk,
  /// Next chunk in address order, or null if this is the last.
  pub next: *mut Chunk,
  /// The pool this chunk lives in; lets `free` reach `Pool::first` without
  /// being handed the pool.
  pub pool: *mut Pool,
}

impl Chunk {
  /// Reads the header stored at `at`.
  ///
  /// # Safety
  ///
  /// `at` must point at a chunk header currently linked into a live pool.
  pub(crate) unsafe fn read(at: *const Chunk) -> Chunk {
    unsafe { at.read_unaligned() }
  }

  /// Stores `header` at `at`.
  ///
  /// # Safety
  ///
  /// `at` must point at `CHUNK_HEADER_SIZE` writable bytes inside a pool
  /// region that no live chunk overlaps.
  pub(crate) unsafe fn write(at: *mut Chunk, header: Chunk) {
    unsafe { at.write_unaligned(header) }
  }
}
