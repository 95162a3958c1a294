//! # rpool - A Fixed-Size Memory Pool Allocator
//!
//! This crate manages allocation and release of variable-sized byte regions
//! ("chunks") carved out of **one pre-allocated contiguous block**, without
//! touching the general-purpose heap for individual allocations.
//!
//! ## Overview
//!
//! ```text
//!   Pool Layout:
//!
//!   ┌──────────────────────────────────────────────────────────────────────┐
//!   │                     ONE CONTIGUOUS REGION                            │
//!   │                                                                      │
//!   │   ┌────────┬────────┬─────────┬───────┬────────┬─────────┬────────┐  │
//!   │   │  Pool  │ Chunk  │ payload │  gap  │ Chunk  │ payload │  gap   │  │
//!   │   │ header │ header │         │       │ header │         │        │  │
//!   │   └────────┴────────┴─────────┴───────┴────────┴─────────┴────────┘  │
//!   │   ▲        ▲                          ▲                         ▲    │
//!   │   │        │                          │                         │    │
//!   │  base     first ──────── next ──────► second chunk       upper limit │
//!   │                                                                      │
//!   └──────────────────────────────────────────────────────────────────────┘
//!
//!   Occupied chunks form a doubly linked list in strictly ascending
//!   address order. Free space is never tracked: a gap is just the
//!   distance between two adjacent occupied structures, computed on
//!   demand from their addresses.
//! ```
//!
//! ## Crate Structure
//!
//! ```text
//!   rpool
//!   ├── chunk      - Chunk header layout and unaligned access
//!   ├── pool       - Pool creation, first-fit allocation, free
//!   └── dump       - Human-readable diagnostics over the introspection API
//! ```
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use rpool::{Pool, free};
//!
//! fn main() {
//!     let pool = Pool::create(1024).unwrap();
//!
//!     unsafe {
//!         let ptr = (*pool.as_ptr()).allocate(64).unwrap().as_ptr();
//!
//!         // Use the memory
//!         ptr.write(42);
//!
//!         // Inspect the pool at any time
//!         rpool::dump::print_dump(pool.as_ref());
//!
//!         free(ptr);
//!         Pool::destroy(pool.as_ptr());
//!     }
//! }
//! ```
//!
//! ## How It Works
//!
//! `allocate` walks the gaps in ascending address order and takes the first
//! one large enough for a chunk header plus the requested payload:
//!
//! ```text
//!   First-fit by address:
//!
//!   request: 24 bytes payload (+ header)
//!
//!   ┌────────┬─────────┬──────┬─────────┬─────────────┬──────────────────┐
//!   │  Pool  │ chunk A │ gap  │ chunk B │     gap     │    free space    │
//!   │ header │         │ 8 B  │         │    40 B     │                  │
//!   └────────┴─────────┴──────┴─────────┴─────────────┴──────────────────┘
//!                        too              first fit:
//!                       small             chunk goes here
//! ```
//!
//! The lowest-address gap that fits always wins; this tie-break is part of
//! the API contract, not an accident of the scan. `free` unlinks the chunk's
//! header from the list and nothing else: its bytes simply become part of
//! an adjacent gap.
//!
//! ## Features
//!
//! - **Self-contained**: one `malloc` at creation, one `free` at destruction
//! - **Inspectable**: chunk iteration, gap computation, and a full dump
//! - **Deterministic placement**: documented first-fit-by-address policy
//! - **Sentinel fill**: fresh payload memory reads as `$` (0x24)
//!
//! ## Limitations
//!
//! - **Single-threaded only**: no synchronization; callers must serialize
//! - **Fixed capacity**: the region never grows or shrinks
//! - **No coalescing**: gaps are implicit, never merged into a free list
//! - **No alignment guarantees**: chunks land wherever their gap starts
//! - **Trusting `free`**: pointers are not validated (see `checked-free`)
//!
//! ## Safety
//!
//! This crate is inherently unsafe as it deals with raw memory management.
//! `allocate`, `free`, and `destroy` require `unsafe` blocks, and freeing a
//! foreign, stale, or double-freed pointer is undefined behavior by design,
//! mirroring manual-allocator semantics. The optional `checked-free` cargo
//! feature adds an opt-in assertion that a freed pointer belongs to a live
//! chunk, without changing the default contract.

mod chunk;
pub mod dump;
mod pool;

pub use chunk::CHUNK_HEADER_SIZE;
pub use pool::{
  ChunkView, Chunks, POOL_HEADER_SIZE, Pool, PoolError, SENTINEL_BYTE, free, gap_size,
};
