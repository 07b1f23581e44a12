//! An owned, aligned byte buffer backed by pool memory.

use std::fmt;
use std::sync::Arc;

use crate::pool::PoolShared;

/// A region of pool memory with a logical byte length.
///
/// The backing store is a `u64` word vector, so the start address is always
/// 8-byte aligned and typed views over 4-byte elements are valid. Dropping a
/// buffer returns its store to the owning pool's free list.
pub struct Buffer {
    words: Vec<u64>,
    len: usize,
    class_idx: usize,
    pool: Arc<PoolShared>,
}

impl Buffer {
    pub(crate) fn new(
        words: Vec<u64>,
        len: usize,
        class_idx: usize,
        pool: Arc<PoolShared>,
    ) -> Self {
        debug_assert!(len <= words.len() * 8);
        Self {
            words,
            len,
            class_idx,
            pool,
        }
    }

    /// Logical length in bytes.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Size-class capacity in bytes. Always `>= len()`.
    pub fn capacity(&self) -> usize {
        self.words.len() * 8
    }

    /// Adjust the logical length within the existing capacity.
    ///
    /// Bytes between the old and new length that were never written through
    /// [`as_mut_slice`](Self::as_mut_slice) are zero.
    pub fn set_len(&mut self, len: usize) {
        assert!(
            len <= self.capacity(),
            "length {} exceeds buffer capacity {}",
            len,
            self.capacity()
        );
        self.len = len;
    }

    pub fn as_ptr(&self) -> *const u8 {
        self.words.as_ptr().cast()
    }

    pub fn as_slice(&self) -> &[u8] {
        // Words are live for the lifetime of self and len <= capacity.
        unsafe { std::slice::from_raw_parts(self.words.as_ptr().cast(), self.len) }
    }

    pub fn as_mut_slice(&mut self) -> &mut [u8] {
        unsafe { std::slice::from_raw_parts_mut(self.words.as_mut_ptr().cast(), self.len) }
    }

    /// View the buffer as `i32` values. Requires `len()` to be a multiple of 4.
    pub fn as_i32s(&self) -> &[i32] {
        debug_assert_eq!(self.len % 4, 0);
        unsafe { std::slice::from_raw_parts(self.words.as_ptr().cast(), self.len / 4) }
    }

    pub fn as_i32s_mut(&mut self) -> &mut [i32] {
        debug_assert_eq!(self.len % 4, 0);
        unsafe { std::slice::from_raw_parts_mut(self.words.as_mut_ptr().cast(), self.len / 4) }
    }

    /// View the buffer as `u32` values. Requires `len()` to be a multiple of 4.
    pub fn as_u32s(&self) -> &[u32] {
        debug_assert_eq!(self.len % 4, 0);
        unsafe { std::slice::from_raw_parts(self.words.as_ptr().cast(), self.len / 4) }
    }

    pub fn as_u32s_mut(&mut self) -> &mut [u32] {
        debug_assert_eq!(self.len % 4, 0);
        unsafe { std::slice::from_raw_parts_mut(self.words.as_mut_ptr().cast(), self.len / 4) }
    }
}

impl Drop for Buffer {
    fn drop(&mut self) {
        let words = std::mem::take(&mut self.words);
        self.pool.recycle(self.class_idx, words);
    }
}

impl fmt::Debug for Buffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Buffer")
            .field("len", &self.len)
            .field("capacity", &self.capacity())
            .finish()
    }
}
