//! Packed validity bitmap over pool memory.

use batch_memory::{Buffer, MemoryError, MemoryPool};

/// One bit per row, LSB-first within each byte; 1 = non-null.
#[derive(Debug)]
pub struct ValidityBitmap {
    buf: Buffer,
    bit_len: usize,
}

impl ValidityBitmap {
    /// Bytes needed to hold `bits` validity bits.
    pub const fn bytes_for(bits: usize) -> usize {
        (bits + 7) / 8
    }

    /// All-zero (all-null) bitmap for `bit_len` rows.
    pub fn with_capacity(pool: &MemoryPool, bit_len: usize) -> Result<Self, MemoryError> {
        let buf = pool.allocate(Self::bytes_for(bit_len))?;
        Ok(Self { buf, bit_len })
    }

    /// Bitmap from raw bytes, e.g. a decoded stream. `bytes.len()` must be
    /// exactly `bytes_for(bit_len)`.
    pub fn from_bytes(
        pool: &MemoryPool,
        bytes: &[u8],
        bit_len: usize,
    ) -> Result<Self, MemoryError> {
        assert_eq!(bytes.len(), Self::bytes_for(bit_len));
        let mut buf = pool.allocate(bytes.len())?;
        buf.as_mut_slice().copy_from_slice(bytes);
        Ok(Self { buf, bit_len })
    }

    pub fn bit_len(&self) -> usize {
        self.bit_len
    }

    pub fn get(&self, index: usize) -> bool {
        assert!(index < self.bit_len, "bit {} out of range", index);
        (self.buf.as_slice()[index / 8] >> (index % 8)) & 1 != 0
    }

    pub fn set(&mut self, index: usize) {
        assert!(index < self.bit_len, "bit {} out of range", index);
        self.buf.as_mut_slice()[index / 8] |= 1 << (index % 8);
    }

    pub fn clear(&mut self, index: usize) {
        assert!(index < self.bit_len, "bit {} out of range", index);
        self.buf.as_mut_slice()[index / 8] &= !(1 << (index % 8));
    }

    /// Number of set (non-null) bits. Bits beyond `bit_len` in the last byte
    /// are ignored, so bitmaps decoded from foreign bytes count correctly.
    pub fn count_set(&self) -> usize {
        let bytes = self.buf.as_slice();
        let full = self.bit_len / 8;
        let mut count: usize = bytes[..full].iter().map(|b| b.count_ones() as usize).sum();

        let tail_bits = self.bit_len % 8;
        if tail_bits > 0 {
            let mask = (1u8 << tail_bits) - 1;
            count += (bytes[full] & mask).count_ones() as usize;
        }
        count
    }

    pub fn null_count(&self) -> usize {
        self.bit_len - self.count_set()
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.buf.as_slice()
    }

    pub fn as_ptr(&self) -> *const u8 {
        self.buf.as_ptr()
    }

    /// Reallocate for `new_bit_len` rows, preserving existing bits.
    pub(crate) fn grow(
        &mut self,
        pool: &MemoryPool,
        new_bit_len: usize,
    ) -> Result<(), MemoryError> {
        debug_assert!(new_bit_len >= self.bit_len);
        let mut grown = pool.allocate(Self::bytes_for(new_bit_len))?;
        grown.as_mut_slice()[..self.buf.len()].copy_from_slice(self.buf.as_slice());
        self.buf = grown;
        self.bit_len = new_bit_len;
        Ok(())
    }

    /// Shrink the logical length to `new_bit_len`, zeroing dropped bits so
    /// the byte representation stays canonical.
    pub(crate) fn truncate(&mut self, new_bit_len: usize) {
        assert!(new_bit_len <= self.bit_len);
        for i in new_bit_len..self.bit_len.min(Self::bytes_for(new_bit_len) * 8) {
            self.clear(i);
        }
        self.bit_len = new_bit_len;
        self.buf.set_len(Self::bytes_for(new_bit_len));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_get_clear_across_byte_boundaries() {
        let pool = MemoryPool::default();
        let mut bm = ValidityBitmap::with_capacity(&pool, 20).unwrap();

        for i in [0, 7, 8, 15, 19] {
            assert!(!bm.get(i));
            bm.set(i);
            assert!(bm.get(i));
        }
        assert_eq!(bm.count_set(), 5);
        assert_eq!(bm.null_count(), 15);

        bm.clear(8);
        assert!(!bm.get(8));
        assert_eq!(bm.count_set(), 4);
    }

    #[test]
    fn from_bytes_masks_tail_bits() {
        let pool = MemoryPool::default();
        // 10 bits, but the source byte pair has garbage in the unused tail.
        let bm = ValidityBitmap::from_bytes(&pool, &[0xFF, 0xFF], 10).unwrap();
        assert_eq!(bm.count_set(), 10);
        assert_eq!(bm.null_count(), 0);
    }

    #[test]
    fn grow_preserves_bits() {
        let pool = MemoryPool::default();
        let mut bm = ValidityBitmap::with_capacity(&pool, 9).unwrap();
        bm.set(0);
        bm.set(8);

        bm.grow(&pool, 40).unwrap();
        assert_eq!(bm.bit_len(), 40);
        assert!(bm.get(0));
        assert!(bm.get(8));
        assert!(!bm.get(9));
        assert_eq!(bm.count_set(), 2);
    }

    #[test]
    fn truncate_zeroes_dropped_bits() {
        let pool = MemoryPool::default();
        let mut bm = ValidityBitmap::with_capacity(&pool, 16).unwrap();
        for i in 0..16 {
            bm.set(i);
        }

        bm.truncate(5);
        assert_eq!(bm.bit_len(), 5);
        assert_eq!(bm.count_set(), 5);
        assert_eq!(bm.as_bytes(), &[0b0001_1111]);
    }

    #[test]
    #[should_panic(expected = "out of range")]
    fn get_out_of_range_panics() {
        let pool = MemoryPool::default();
        let bm = ValidityBitmap::with_capacity(&pool, 8).unwrap();
        bm.get(8);
    }
}
