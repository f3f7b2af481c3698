//! Reusable encode buffers.

use std::ops::{Deref, DerefMut};
use std::sync::Arc;

use parking_lot::Mutex;

use clientmetric_proto::RecordWriter;

/// Initial capacity of a freshly allocated buffer.
const INITIAL_BUFFER_CAPACITY: usize = 256;

/// A pool of frame writers.
///
/// Checked-out writers return to the pool when dropped. At most `capacity`
/// idle writers are kept; extras are freed.
#[derive(Debug)]
pub struct BufferPool {
    free: Mutex<Vec<RecordWriter>>,
    capacity: usize,
}

impl BufferPool {
    /// Create a pool keeping up to `capacity` idle writers.
    pub fn new(capacity: usize) -> Self {
        Self {
            free: Mutex::new(Vec::with_capacity(capacity)),
            capacity,
        }
    }

    /// Check out an empty writer.
    pub fn get(self: &Arc<Self>) -> PooledWriter {
        let writer = self
            .free
            .lock()
            .pop()
            .unwrap_or_else(|| RecordWriter::with_capacity(INITIAL_BUFFER_CAPACITY));
        PooledWriter {
            writer,
            pool: Arc::clone(self),
        }
    }

    /// Number of idle writers.
    pub fn idle(&self) -> usize {
        self.free.lock().len()
    }

    fn put(&self, mut writer: RecordWriter) {
        writer.clear();
        let mut free = self.free.lock();
        if free.len() < self.capacity {
            free.push(writer);
        }
    }
}

/// A writer checked out of a [`BufferPool`].
#[derive(Debug)]
pub struct PooledWriter {
    writer: RecordWriter,
    pool: Arc<BufferPool>,
}

impl Deref for PooledWriter {
    type Target = RecordWriter;

    fn deref(&self) -> &RecordWriter {
        &self.writer
    }
}

impl DerefMut for PooledWriter {
    fn deref_mut(&mut self) -> &mut RecordWriter {
        &mut self.writer
    }
}

impl Drop for PooledWriter {
    fn drop(&mut self) {
        self.pool.put(std::mem::take(&mut self.writer));
    }
}
