use std::marker::PhantomData;
use std::{fmt, mem, ptr};
use std::ptr::NonNull;

use libc::c_void;

use crate::chunk::{CHUNK_HEADER_SIZE, Chunk};

/// Size in bytes of the [`Pool`] descriptor stored at the base of the region.
pub const POOL_HEADER_SIZE: usize = mem::size_of::<Pool>();

/// Byte written over the whole payload region when a pool is created (`$`).
///
/// Memory that was never handed out, or handed out and never written, shows
/// up as runs of `$` in [`crate::dump::dump`] output.
pub const SENTINEL_BYTE: u8 = 0x24;

/// Failures the pool can report. Every other misuse (freeing a foreign or
/// stale pointer, using a destroyed pool) is undefined behavior by contract
/// and is not detected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PoolError {
  /// The backing region could not be reserved at creation.
  AllocationFailure,
  /// No gap in the pool is large enough for the requested allocation.
  OutOfSpace,
}

impl fmt::Display for PoolError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      PoolError::AllocationFailure => write!(f, "backing region could not be reserved"),
      PoolError::OutOfSpace => write!(f, "no gap large enough for the requested size"),
    }
  }
}

impl std::error::Error for PoolError {}

/// Descriptor for one fixed-size contiguous region of memory.
///
/// The descriptor itself lives at the base of the region it manages, so a
/// `*mut Pool` is also the base address of the whole block. Everything after
/// the descriptor, up to `upper_limit`, is carved into chunks on demand.
///
/// List invariant: the chunks reachable from `first` via `next` are in
/// strictly increasing address order, `prev` is the exact inverse of `next`,
/// no two chunk ranges overlap, and every range lies inside
/// `[base + POOL_HEADER_SIZE, upper_limit)`. Free space is never tracked;
/// a gap is simply the distance between two adjacent occupied structures.
#[repr(C)]
pub struct Pool {
  first: *mut Chunk,
  upper_limit: *mut u8,
}

impl Pool {
  /// Reserves `size` bytes and sets up an empty pool in them.
  ///
  /// The descriptor occupies the first `POOL_HEADER_SIZE` bytes; the rest is
  /// filled with [`SENTINEL_BYTE`] and becomes one big gap. Fails with
  /// [`PoolError::AllocationFailure`] when the region cannot be reserved or
  /// when `size` cannot even hold the descriptor; no partial pool exists in
  /// either case.
  pub fn create(size: usize) -> Result<NonNull<Pool>, PoolError> {
    if size < POOL_HEADER_SIZE {
      return Err(PoolError::AllocationFailure);
    }

    // Safety: malloc returns null or `size` writable bytes, aligned well
    // enough for the descriptor.
    unsafe {
      let base = libc::malloc(size) as *mut u8;

      if base.is_null() {
        return Err(PoolError::AllocationFailure);
      }

      let pool = base as *mut Pool;
      (*pool).first = ptr::null_mut();
      (*pool).upper_limit = base.add(size);

      ptr::write_bytes(base.add(POOL_HEADER_SIZE), SENTINEL_BYTE, size - POOL_HEADER_SIZE);

      Ok(NonNull::new_unchecked(pool))
    }
  }

  /// Releases the pool's backing region.
  ///
  /// Destroying a pool that still holds live chunks is permitted; it prints
  /// a warning and proceeds. Every pointer into the region, including `pool`
  /// itself, is dangling afterward.
  ///
  /// # Safety
  ///
  /// `pool` must come from [`Pool::create`] and must not have been destroyed
  /// already.
  pub unsafe fn destroy(pool: *mut Pool) {
    unsafe {
      if !(*pool).first.is_null() {
        println!("Destroying non-empty pool!");
      }
      libc::free(pool as *mut c_void);
    }
  }

  /// Allocates `size` bytes out of the pool.
  ///
  /// The gaps between occupied structures are scanned in ascending address
  /// order and the first one that can hold a chunk header plus `size` bytes
  /// wins; this lowest-address-first policy is part of the API, not an
  /// implementation accident. `size == 0` is valid and yields a fresh
  /// header-only chunk on every call. On [`PoolError::OutOfSpace`] the pool
  /// is left exactly as it was.
  ///
  /// The returned pointer stays valid until it is passed to [`free`] or the
  /// pool is destroyed, whichever comes first.
  ///
  /// # Safety
  ///
  /// The pool must not have been destroyed, and no other reference into its
  /// chunk list may be live across this call.
  pub unsafe fn allocate(&mut self, size: usize) -> Result<NonNull<u8>, PoolError> {
    let total = CHUNK_HEADER_SIZE.checked_add(size).ok_or(PoolError::OutOfSpace)?;

    unsafe {
      let gap_start = self.find_gap(total).ok_or(PoolError::OutOfSpace)?;

      let node = gap_start as *mut Chunk;
      Chunk::write(
        node,
        Chunk {
          nsize: size,
          prev: ptr::null_mut(),
          next: ptr::null_mut(),
          pool: self as *mut Pool,
        },
      );
      self.link(node);

      Ok(NonNull::new_unchecked(gap_start.add(CHUNK_HEADER_SIZE)))
    }
  }

  /// Finds the lowest-address gap of at least `total` bytes.
  ///
  /// Candidates are generated in strictly increasing address order (the gap
  /// after the descriptor, then the gap after each chunk), so the first hit
  /// is the final answer and the scan stops there.
  unsafe fn find_gap(&mut self, total: usize) -> Option<*mut u8> {
    unsafe {
      let mem_start = (self as *mut Pool as *mut u8).add(POOL_HEADER_SIZE);

      let leading = if self.first.is_null() {
        self.upper_limit as usize - mem_start as usize
      } else {
        self.first as usize - mem_start as usize
      };

      if leading >= total {
        return Some(mem_start);
      }

      let mut curr = self.first;

      while !curr.is_null() {
        let header = Chunk::read(curr);
        let chunk_end = (curr as *mut u8).add(CHUNK_HEADER_SIZE + header.nsize);

        let gap = if header.next.is_null() {
          self.upper_limit as usize - chunk_end as usize
        } else {
          header.next as usize - chunk_end as usize
        };

        if gap >= total {
          return Some(chunk_end);
        }

        curr = header.next;
      }

      None
    }
  }

  /// Links `node` into the doubly linked list at its address-sorted spot.
  unsafe fn link(&mut self, node: *mut Chunk) {
    unsafe {
      if self.first.is_null() || node < self.first {
        let mut header = Chunk::read(node);
        header.next = self.first;
        Chunk::write(node, header);

        if !self.first.is_null() {
          let mut old_first = Chunk::read(self.first);
          old_first.prev = node;
          Chunk::write(self.first, old_first);
        }

        self.first = node;
        return;
      }

      let mut after = self.first;
      loop {
        let next = Chunk::read(after).next;
        if next.is_null() || next > node {
          break;
        }
        after = next;
      }

      let mut after_header = Chunk::read(after);

      let mut header = Chunk::read(node);
      header.prev = after;
      header.next = after_header.next;
      Chunk::write(node, header);

      if !after_header.next.is_null() {
        let mut successor = Chunk::read(after_header.next);
        successor.prev = node;
        Chunk::write(after_header.next, successor);
      }

      after_header.next = node;
      Chunk::write(after, after_header);
    }
  }

  /// Base address of the region (which is also the descriptor's address).
  pub fn base(&self) -> *const u8 {
    self as *const Pool as *const u8
  }

  /// One past the last byte of the region.
  pub fn upper_limit(&self) -> *const u8 {
    self.upper_limit
  }

  /// Whether the pool currently holds no live chunks.
  pub fn is_empty(&self) -> bool {
    self.first.is_null()
  }

  /// Iterates over the live chunks in ascending address order.
  pub fn chunks(&self) -> Chunks<'_> {
    Chunks {
      curr: self.first,
      _pool: PhantomData,
    }
  }
}

/// Releases the chunk whose payload starts at `p`; no-op when `p` is null.
///
/// The chunk header sits exactly [`CHUNK_HEADER_SIZE`] bytes before `p`.
/// Unlinking is all that happens: nothing is cleared, the former range just
/// becomes part of an adjacent gap the next time the pool is scanned.
///
/// No validation is performed. With the `checked-free` feature enabled the
/// call additionally asserts that `p` belongs to a currently live chunk of
/// its pool, at the cost of a list scan.
///
/// # Safety
///
/// `p` must be null or a pointer previously returned by [`Pool::allocate`]
/// on a still-live pool, not yet freed. Anything else is undefined behavior.
pub unsafe fn free(p: *mut u8) {
  if p.is_null() {
    return;
  }

  unsafe {
    let node = p.sub(CHUNK_HEADER_SIZE) as *mut Chunk;
    let header = Chunk::read(node);

    #[cfg(feature = "checked-free")]
    {
      let live = (*header.pool)
        .chunks()
        .any(|chunk| chunk.start() == node as *const u8);
      assert!(live, "free: {:?} is not the payload of a live chunk", p);
    }

    if header.prev.is_null() {
      (*header.pool).first = header.next;
    } else {
      let mut predecessor = Chunk::read(header.prev);
      predecessor.next = header.next;
      Chunk::write(header.prev, predecessor);
    }

    if !header.next.is_null() {
      let mut successor = Chunk::read(header.next);
      successor.prev = header.prev;
      Chunk::write(header.next, successor);
    }
  }
}

/// Free bytes between the end of one occupied structure and the start of the
/// next. Gaps are never stored anywhere; this is how they are computed, from
/// addresses alone.
pub fn gap_size(end: *const u8, start: *const u8) -> usize {
  start as usize - end as usize
}

/// Read-only snapshot of one live chunk, for diagnostics.
#[derive(Debug, Clone, Copy)]
pub struct ChunkView {
  start: *const u8,
  size: usize,
  has_prev: bool,
  has_next: bool,
}

impl ChunkView {
  /// Address of the chunk header.
  pub fn start(&self) -> *const u8 {
    self.start
  }

  /// Payload size in bytes, as the caller requested it.
  pub fn size(&self) -> usize {
    self.size
  }

  /// Address of the first payload byte.
  pub fn payload(&self) -> *const u8 {
    self.start.wrapping_add(CHUNK_HEADER_SIZE)
  }

  /// One past the last payload byte.
  pub fn end(&self) -> *const u8 {
    self.start.wrapping_add(CHUNK_HEADER_SIZE + self.size)
  }

  pub fn has_prev(&self) -> bool {
    self.has_prev
  }

  pub fn has_next(&self) -> bool {
    self.has_next
  }
}

/// Iterator over a pool's live chunks in ascending address order.
pub struct Chunks<'a> {
  curr: *const Chunk,
  _pool: PhantomData<&'a Pool>,
}

impl Iterator for Chunks<'_> {
  type Item = ChunkView;

  fn next(&mut self) -> Option<ChunkView> {
    if self.curr.is_null() {
      return None;
    }

    // Safety: curr came from the pool's chunk list, whose nodes stay valid
    // for as long as the borrow on the pool lives.
    let header = unsafe { Chunk::read(self.curr) };

    let view = ChunkView {
      start: self.curr as *const u8,
      size: header.nsize,
      has_prev: !header.prev.is_null(),
      has_next: !header.next.is_null(),
    };

    self.curr = header.next;
    Some(view)
  }
}
