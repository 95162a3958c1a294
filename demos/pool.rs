use rpool::{CHUNK_HEADER_SIZE, POOL_HEADER_SIZE, Pool, PoolError, dump::print_dump, free};

fn main() {
  // A pool large enough for a handful of chunks. The descriptor lives at
  // the base of the region; everything after it starts out as one gap
  // filled with '$' sentinel bytes.
  let pool = match Pool::create(256) {
    Ok(pool) => pool,
    Err(err) => {
      eprintln!("failed to create pool: {}", err);
      return;
    }
  };

  println!(
    "Pool header = {} bytes, chunk header = {} bytes",
    POOL_HEADER_SIZE, CHUNK_HEADER_SIZE
  );

  unsafe {
    // --------------------------------------------------------------------
    // 1) Fresh pool: no chunks, one big gap.
    // --------------------------------------------------------------------
    println!("\n[1] Fresh pool");
    print_dump(pool.as_ref());

    // --------------------------------------------------------------------
    // 2) Allocate three chunks and write recognizable patterns into two
    //    of them. The middle one stays untouched so the dump still shows
    //    the sentinel fill.
    // --------------------------------------------------------------------
    let first = (*pool.as_ptr()).allocate(12).unwrap().as_ptr();
    first.copy_from_nonoverlapping(b"hello, pool!".as_ptr(), 12);

    let second = (*pool.as_ptr()).allocate(8).unwrap().as_ptr();

    let third = (*pool.as_ptr()).allocate(6).unwrap().as_ptr();
    third.copy_from_nonoverlapping(b"abc\x01\x02\x03".as_ptr(), 6);

    println!("\n[2] Three chunks (middle one never written)");
    print_dump(pool.as_ref());

    // --------------------------------------------------------------------
    // 3) Free the middle chunk. Nothing is cleared; its header and payload
    //    simply become a gap between the first and third chunks.
    // --------------------------------------------------------------------
    free(second);
    println!("\n[3] Middle chunk freed -> implicit gap");
    print_dump(pool.as_ref());

    // --------------------------------------------------------------------
    // 4) Allocate into the gap. First-fit-by-address guarantees the new
    //    chunk reuses the freed address, not the free space at the end.
    // --------------------------------------------------------------------
    let reused = (*pool.as_ptr()).allocate(4).unwrap().as_ptr();
    println!(
      "\n[4] allocate(4) reused the freed address? {}",
      if reused == second { "yes" } else { "no" }
    );
    print_dump(pool.as_ref());

    // --------------------------------------------------------------------
    // 5) Ask for more than any gap can hold.
    // --------------------------------------------------------------------
    match (*pool.as_ptr()).allocate(1024) {
      Err(PoolError::OutOfSpace) => println!("\n[5] allocate(1024) -> OutOfSpace, pool untouched"),
      other => println!("\n[5] unexpected result: {:?}", other),
    }

    // --------------------------------------------------------------------
    // 6) Destroy the pool with chunks still live. This is allowed; it
    //    warns and releases the whole region in one go.
    // --------------------------------------------------------------------
    println!("\n[6] Destroying the pool with live chunks:");
    Pool::destroy(pool.as_ptr());
  }
}
