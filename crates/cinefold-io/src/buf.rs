//! Bounded buffered reader that also counts consumed bytes.
//!
//! The capacity bounds in-flight bytes per source; the shared counter lets the
//! runtime report progress on a source while another thread reads it.

use std::fs::File;
use std::io::{self, BufRead, BufReader, Read};
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

pub struct BoundedBufReader<R: Read> {
    inner: BufReader<R>,
    consumed: Arc<AtomicU64>,
}

impl<R: Read> BoundedBufReader<R> {
    pub fn with_capacity(capacity: usize, reader: R) -> Self {
        Self {
            inner: BufReader::with_capacity(capacity.max(1), reader),
            consumed: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Bytes currently buffered but not yet consumed.
    pub fn buffer_len(&self) -> usize {
        self.inner.buffer().len()
    }

    /// Shared handle to the consumed-bytes counter.
    pub fn progress(&self) -> Arc<AtomicU64> {
        Arc::clone(&self.consumed)
    }
}

impl<R: Read> Read for BoundedBufReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.inner.read(buf)?;
        self.consumed.fetch_add(n as u64, Ordering::Relaxed);
        Ok(n)
    }
}

impl<R: Read> BufRead for BoundedBufReader<R> {
    fn fill_buf(&mut self) -> io::Result<&[u8]> {
        self.inner.fill_buf()
    }
    fn consume(&mut self, amt: usize) {
        self.consumed.fetch_add(amt as u64, Ordering::Relaxed);
        self.inner.consume(amt)
    }
}

pub fn bounded_from_path<P: AsRef<Path>>(
    path: P,
    cap: usize,
) -> io::Result<BoundedBufReader<File>> {
    let file = File::open(path)?;
    Ok(BoundedBufReader::with_capacity(cap, file))
}
