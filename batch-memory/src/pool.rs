use parking_lot::Mutex;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info};

use crate::buffer::Buffer;

/// Smallest size class handed out by the pool.
pub const MIN_CLASS_BYTES: usize = 64;

#[derive(Debug, Error)]
pub enum MemoryError {
    #[error("out of memory: requested {requested} bytes, {available} of {capacity} available")]
    OutOfMemory {
        requested: usize,
        available: usize,
        capacity: usize,
    },
}

#[derive(Debug, Clone)]
pub struct PoolConfig {
    /// Maximum outstanding bytes across all live buffers.
    pub capacity: usize,
    /// Free buffers retained per size class; beyond this, memory is freed.
    pub max_pooled_per_class: usize,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            capacity: 1024 * 1024 * 1024, // 1 GiB
            max_pooled_per_class: 16,
        }
    }
}

struct ClassState {
    size: usize,
    free: Mutex<Vec<Vec<u64>>>,
}

pub(crate) struct PoolShared {
    config: PoolConfig,
    outstanding: Mutex<usize>,
    classes: Vec<ClassState>,
}

/// Pool of reusable, aligned, zero-initialized buffers.
///
/// Cloning is cheap; clones share one accounting scope. Backing stores are
/// `u64` words, which guarantees 8-byte alignment for every buffer.
#[derive(Clone)]
pub struct MemoryPool {
    shared: Arc<PoolShared>,
}

impl MemoryPool {
    pub fn new(config: PoolConfig) -> Self {
        info!(
            capacity = config.capacity,
            max_pooled_per_class = config.max_pooled_per_class,
            "initializing memory pool"
        );

        let mut classes = Vec::new();
        let mut size = MIN_CLASS_BYTES;
        loop {
            classes.push(ClassState {
                size,
                free: Mutex::new(Vec::new()),
            });
            if size >= config.capacity {
                break;
            }
            size *= 2;
        }

        Self {
            shared: Arc::new(PoolShared {
                config,
                outstanding: Mutex::new(0),
                classes,
            }),
        }
    }

    /// Allocate a zero-initialized buffer of `byte_len` logical bytes.
    ///
    /// The backing store is rounded up to the containing size class; the
    /// extra capacity is available to the caller via [`Buffer::set_len`].
    pub fn allocate(&self, byte_len: usize) -> Result<Buffer, MemoryError> {
        let shared = &self.shared;

        let class_idx = match shared.class_index(byte_len) {
            Some(idx) => idx,
            None => {
                return Err(MemoryError::OutOfMemory {
                    requested: byte_len,
                    available: shared.config.capacity - *shared.outstanding.lock(),
                    capacity: shared.config.capacity,
                })
            }
        };
        let class = &shared.classes[class_idx];

        {
            let mut outstanding = shared.outstanding.lock();
            if *outstanding + class.size > shared.config.capacity {
                return Err(MemoryError::OutOfMemory {
                    requested: byte_len,
                    available: shared.config.capacity - *outstanding,
                    capacity: shared.config.capacity,
                });
            }
            *outstanding += class.size;
        }

        let words = match class.free.lock().pop() {
            Some(mut words) => {
                debug!(class = class.size, "reusing pooled buffer");
                words.fill(0);
                words
            }
            None => {
                debug!(class = class.size, "allocating new buffer");
                vec![0u64; class.size / 8]
            }
        };

        Ok(Buffer::new(words, byte_len, class_idx, Arc::clone(shared)))
    }

    /// Bytes currently held by live buffers, in size-class units.
    pub fn allocated_bytes(&self) -> usize {
        *self.shared.outstanding.lock()
    }
}

impl Default for MemoryPool {
    fn default() -> Self {
        Self::new(PoolConfig::default())
    }
}

impl PoolShared {
    fn class_index(&self, byte_len: usize) -> Option<usize> {
        self.classes.iter().position(|c| c.size >= byte_len)
    }

    pub(crate) fn recycle(&self, class_idx: usize, words: Vec<u64>) {
        let class = &self.classes[class_idx];
        *self.outstanding.lock() -= class.size;

        let mut free = class.free.lock();
        if free.len() < self.config.max_pooled_per_class {
            debug!(class = class.size, "returning buffer to pool");
            free.push(words);
        } else {
            debug!(class = class.size, "pool full, freeing buffer");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allocations_are_aligned_and_zeroed() {
        let pool = MemoryPool::default();
        let buf = pool.allocate(100).unwrap();

        assert_eq!(buf.as_ptr() as usize % 8, 0);
        assert_eq!(buf.len(), 100);
        assert!(buf.capacity() >= 100);
        assert!(buf.as_slice().iter().all(|&b| b == 0));
    }

    #[test]
    fn capacity_rounds_to_size_class() {
        let pool = MemoryPool::default();

        let small = pool.allocate(1).unwrap();
        assert_eq!(small.capacity(), MIN_CLASS_BYTES);

        let mid = pool.allocate(65).unwrap();
        assert_eq!(mid.capacity(), 128);
    }

    #[test]
    fn out_of_memory_when_capacity_exceeded() {
        let pool = MemoryPool::new(PoolConfig {
            capacity: 256,
            max_pooled_per_class: 4,
        });

        let _held = pool.allocate(200).unwrap();
        let err = pool.allocate(200).unwrap_err();
        match err {
            MemoryError::OutOfMemory {
                requested,
                capacity,
                ..
            } => {
                assert_eq!(requested, 200);
                assert_eq!(capacity, 256);
            }
        }
    }

    #[test]
    fn oversized_request_fails() {
        let pool = MemoryPool::new(PoolConfig {
            capacity: 1024,
            max_pooled_per_class: 4,
        });
        assert!(pool.allocate(1 << 20).is_err());
    }

    #[test]
    fn drop_releases_accounting() {
        let pool = MemoryPool::default();
        assert_eq!(pool.allocated_bytes(), 0);

        let buf = pool.allocate(100).unwrap();
        assert_eq!(pool.allocated_bytes(), 128);

        drop(buf);
        assert_eq!(pool.allocated_bytes(), 0);
    }

    #[test]
    fn reused_buffers_are_rezeroed() {
        let pool = MemoryPool::default();

        let mut buf = pool.allocate(64).unwrap();
        buf.as_mut_slice().fill(0xAB);
        drop(buf);

        // Same class, so the pooled store is reused.
        let again = pool.allocate(64).unwrap();
        assert!(again.as_slice().iter().all(|&b| b == 0));
    }

    #[test]
    fn zero_length_allocation() {
        let pool = MemoryPool::default();
        let buf = pool.allocate(0).unwrap();
        assert_eq!(buf.len(), 0);
        assert!(buf.is_empty());
    }

    #[test]
    fn buffers_outlive_the_pool_handle() {
        let pool = MemoryPool::default();
        let mut buf = pool.allocate(32).unwrap();
        drop(pool);

        // The shared state is kept alive by the buffer itself.
        buf.as_mut_slice()[0] = 7;
        assert_eq!(buf.as_slice()[0], 7);
    }
}
