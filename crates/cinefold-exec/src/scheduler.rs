//! Chunk feed with optional read-ahead.
//!
//! With `prefetch > 0` a named reader thread pulls chunks from the source
//! into a bounded channel while the consumer folds the previous chunk. Chunks
//! arrive in file order; the consumer sees channel closure once the reader is
//! done, which is the barrier before the aggregate is finalized. A read error
//! is sent through the channel and ends the feed.

use std::thread::{self, JoinHandle};

use crossbeam_channel::{bounded, Receiver};

use cinefold_core::types::RowBatch;
use cinefold_io::error::Result as IoResult;
use cinefold_io::DelimitedSource;

type ChunkResult = IoResult<RowBatch>;

pub enum ChunkFeed {
    /// Chunks are read on the consuming thread.
    Inline(cinefold_io::Chunks),
    Prefetched(Prefetcher),
}

impl ChunkFeed {
    pub fn new(source: DelimitedSource, chunk_rows: usize, prefetch: usize) -> std::io::Result<Self> {
        let chunks = source.chunks(chunk_rows);
        if prefetch == 0 {
            Ok(ChunkFeed::Inline(chunks))
        } else {
            Ok(ChunkFeed::Prefetched(Prefetcher::spawn(chunks, prefetch)?))
        }
    }
}

impl Iterator for ChunkFeed {
    type Item = ChunkResult;

    fn next(&mut self) -> Option<Self::Item> {
        match self {
            ChunkFeed::Inline(chunks) => chunks.next(),
            ChunkFeed::Prefetched(p) => p.next(),
        }
    }
}

pub struct Prefetcher {
    rx: Option<Receiver<ChunkResult>>,
    reader: Option<JoinHandle<()>>,
}

impl Prefetcher {
    fn spawn(chunks: cinefold_io::Chunks, capacity: usize) -> std::io::Result<Self> {
        let (tx, rx) = bounded(capacity);
        let reader = thread::Builder::new()
            .name("cinefold-reader".to_string())
            .spawn(move || {
                for chunk in chunks {
                    // the consumer hung up
                    if tx.send(chunk).is_err() {
                        break;
                    }
                }
            })?;
        Ok(Self {
            rx: Some(rx),
            reader: Some(reader),
        })
    }
}

impl Iterator for Prefetcher {
    type Item = ChunkResult;

    fn next(&mut self) -> Option<Self::Item> {
        self.rx.as_ref()?.recv().ok()
    }
}

impl Drop for Prefetcher {
    fn drop(&mut self) {
        // Closing the receiver unblocks a reader stuck on a full channel.
        drop(self.rx.take());
        if let Some(handle) = self.reader.take() {
            let _ = handle.join();
        }
    }
}
