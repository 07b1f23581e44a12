//! Column builders and their finalized, immutable columns.
//!
//! A vector accumulates values with explicit null tracking; calling
//! `set_value_count` consumes it and fixes the logical length, producing a
//! column that can only be read. `set` is strict about capacity; `set_safe`
//! grows the backing buffers (doubling, preserving written data) instead.

use batch_memory::{Buffer, MemoryError, MemoryPool};
use tracing::debug;

use crate::bitmap::ValidityBitmap;
use crate::error::ColumnarError;
use crate::schema::LogicalType;

// ---------------------------------------------------------------------------
// Int32
// ---------------------------------------------------------------------------

/// Builder for a nullable 4-byte integer column. Writes may arrive in any
/// index order.
pub struct Int32Vector {
    pool: MemoryPool,
    validity: ValidityBitmap,
    values: Buffer,
    capacity: usize,
}

impl Int32Vector {
    /// Pre-size backing buffers for `capacity` rows. All slots start as null
    /// with a zero value slot.
    pub fn allocate_new(pool: &MemoryPool, capacity: usize) -> Result<Self, MemoryError> {
        let values = pool.allocate(capacity * 4)?;
        let validity = ValidityBitmap::with_capacity(pool, capacity)?;
        Ok(Self {
            pool: pool.clone(),
            validity,
            values,
            capacity,
        })
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Write `value` at `index` and mark it valid. Strict: writing past the
    /// current capacity fails rather than reallocating.
    pub fn set(&mut self, index: usize, value: i32) -> Result<(), ColumnarError> {
        if index >= self.capacity {
            return Err(ColumnarError::IndexOutOfRange {
                index,
                capacity: self.capacity,
            });
        }
        self.values.as_i32s_mut()[index] = value;
        self.validity.set(index);
        Ok(())
    }

    /// Like [`set`](Self::set), but grows the buffers when `index` is past
    /// capacity.
    pub fn set_safe(&mut self, index: usize, value: i32) -> Result<(), ColumnarError> {
        if index >= self.capacity {
            self.grow(index + 1)?;
        }
        self.set(index, value)
    }

    /// Mark `index` null without touching its value slot.
    pub fn set_null(&mut self, index: usize) -> Result<(), ColumnarError> {
        if index >= self.capacity {
            return Err(ColumnarError::IndexOutOfRange {
                index,
                capacity: self.capacity,
            });
        }
        self.validity.clear(index);
        Ok(())
    }

    /// Fix the logical length to `value_count` and finalize. Consumes the
    /// vector; the returned column is immutable.
    pub fn set_value_count(mut self, value_count: usize) -> Result<Int32Column, ColumnarError> {
        if value_count > self.capacity {
            return Err(ColumnarError::IndexOutOfRange {
                index: value_count,
                capacity: self.capacity,
            });
        }
        self.values.set_len(value_count * 4);
        self.validity.truncate(value_count);
        Ok(Int32Column {
            validity: self.validity,
            values: self.values,
            len: value_count,
        })
    }

    fn grow(&mut self, min_capacity: usize) -> Result<(), MemoryError> {
        let new_capacity = (self.capacity * 2).max(min_capacity);
        debug!(
            old = self.capacity,
            new = new_capacity,
            "growing int32 vector"
        );

        let mut values = self.pool.allocate(new_capacity * 4)?;
        values.as_mut_slice()[..self.values.len()].copy_from_slice(self.values.as_slice());
        self.values = values;

        self.validity.grow(&self.pool, new_capacity)?;
        self.capacity = new_capacity;
        Ok(())
    }
}

/// Immutable 4-byte integer column. Null slots hold an unspecified value
/// (zero unless overwritten before `set_null`); do not interpret them.
#[derive(Debug)]
pub struct Int32Column {
    validity: ValidityBitmap,
    values: Buffer,
    len: usize,
}

impl Int32Column {
    /// Assemble a column from already-filled buffers (the decode path).
    /// The buffers must satisfy the layout contract; violations are
    /// programming errors, not recoverable conditions.
    pub fn from_raw_parts(validity: ValidityBitmap, values: Buffer, len: usize) -> Self {
        assert_eq!(validity.bit_len(), len, "validity length must equal row count");
        assert_eq!(values.len(), len * 4, "value buffer must hold len i32 slots");
        Self {
            validity,
            values,
            len,
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn null_count(&self) -> usize {
        self.validity.null_count()
    }

    pub fn is_valid(&self, index: usize) -> bool {
        self.validity.get(index)
    }

    pub fn value(&self, index: usize) -> Option<i32> {
        if self.validity.get(index) {
            Some(self.values.as_i32s()[index])
        } else {
            None
        }
    }

    /// Raw value slots, including the unspecified slots of null entries.
    pub fn values(&self) -> &[i32] {
        self.values.as_i32s()
    }

    pub fn values_bytes(&self) -> &[u8] {
        self.values.as_slice()
    }

    pub fn validity(&self) -> &ValidityBitmap {
        &self.validity
    }
}

impl PartialEq for Int32Column {
    fn eq(&self, other: &Self) -> bool {
        if self.len != other.len {
            return false;
        }
        (0..self.len).all(|i| self.value(i) == other.value(i))
    }
}

// ---------------------------------------------------------------------------
// Utf8
// ---------------------------------------------------------------------------

/// Builder for a nullable UTF-8 column.
///
/// Offsets are computed incrementally from a single data cursor, so writes
/// must not go backwards: a `set`/`set_null` at an index behind the cursor
/// fails with `UnorderedWrite`. Skipped indices are backfilled as null with
/// an empty byte range.
pub struct Utf8Vector {
    pool: MemoryPool,
    validity: ValidityBitmap,
    offsets: Buffer,
    data: Buffer,
    capacity: usize,
    cursor: usize,
    next_index: usize,
}

impl Utf8Vector {
    /// Pre-size for `capacity` rows and roughly `data_capacity` payload
    /// bytes. Both are hints; the data buffer grows as needed and `set_safe`
    /// grows the row capacity.
    pub fn allocate_new(
        pool: &MemoryPool,
        data_capacity: usize,
        capacity: usize,
    ) -> Result<Self, MemoryError> {
        let offsets = pool.allocate((capacity + 1) * 4)?;
        let data = pool.allocate(data_capacity)?;
        let validity = ValidityBitmap::with_capacity(pool, capacity)?;
        Ok(Self {
            pool: pool.clone(),
            validity,
            offsets,
            data,
            capacity,
            cursor: 0,
            next_index: 0,
        })
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Append `value` at `index`, marking it valid. Strict about row
    /// capacity; the data buffer itself grows freely.
    pub fn set(&mut self, index: usize, value: &str) -> Result<(), ColumnarError> {
        self.write(index, Some(value.as_bytes()), false)
    }

    /// Like [`set`](Self::set), but grows the row capacity when needed.
    pub fn set_safe(&mut self, index: usize, value: &str) -> Result<(), ColumnarError> {
        self.write(index, Some(value.as_bytes()), true)
    }

    /// Mark `index` null; its byte range stays empty.
    pub fn set_null(&mut self, index: usize) -> Result<(), ColumnarError> {
        self.write(index, None, false)
    }

    fn write(
        &mut self,
        index: usize,
        payload: Option<&[u8]>,
        grow_rows: bool,
    ) -> Result<(), ColumnarError> {
        if index >= self.capacity {
            if !grow_rows {
                return Err(ColumnarError::IndexOutOfRange {
                    index,
                    capacity: self.capacity,
                });
            }
            self.grow_rows(index + 1)?;
        }
        if index < self.next_index {
            return Err(ColumnarError::UnorderedWrite {
                index,
                next: self.next_index,
            });
        }

        // Skipped entries end where they start: empty and null.
        for i in self.next_index..index {
            self.offsets.as_u32s_mut()[i + 1] = self.cursor as u32;
        }

        if let Some(bytes) = payload {
            if self.cursor + bytes.len() > self.data.len() {
                self.grow_data(self.cursor + bytes.len())?;
            }
            self.data.as_mut_slice()[self.cursor..self.cursor + bytes.len()]
                .copy_from_slice(bytes);
            self.cursor += bytes.len();
            self.validity.set(index);
        }

        self.offsets.as_u32s_mut()[index + 1] = self.cursor as u32;
        self.next_index = index + 1;
        Ok(())
    }

    /// Fix the logical length to `value_count`: pins `offsets[value_count]`
    /// to the write cursor and finalizes. Consumes the vector.
    pub fn set_value_count(mut self, value_count: usize) -> Result<Utf8Column, ColumnarError> {
        if value_count > self.capacity {
            return Err(ColumnarError::IndexOutOfRange {
                index: value_count,
                capacity: self.capacity,
            });
        }

        for i in self.next_index..value_count {
            self.offsets.as_u32s_mut()[i + 1] = self.cursor as u32;
        }

        let data_len = self.offsets.as_u32s()[value_count] as usize;
        self.offsets.set_len((value_count + 1) * 4);
        self.data.set_len(data_len);
        self.validity.truncate(value_count);

        Ok(Utf8Column {
            validity: self.validity,
            offsets: self.offsets,
            data: self.data,
            len: value_count,
        })
    }

    fn grow_rows(&mut self, min_capacity: usize) -> Result<(), MemoryError> {
        let new_capacity = (self.capacity * 2).max(min_capacity);
        debug!(
            old = self.capacity,
            new = new_capacity,
            "growing utf8 vector rows"
        );

        let mut offsets = self.pool.allocate((new_capacity + 1) * 4)?;
        offsets.as_mut_slice()[..self.offsets.len()].copy_from_slice(self.offsets.as_slice());
        self.offsets = offsets;

        self.validity.grow(&self.pool, new_capacity)?;
        self.capacity = new_capacity;
        Ok(())
    }

    fn grow_data(&mut self, min_len: usize) -> Result<(), MemoryError> {
        let new_len = (self.data.len() * 2).max(min_len).max(64);
        debug!(old = self.data.len(), new = new_len, "growing utf8 data buffer");

        let mut data = self.pool.allocate(new_len)?;
        data.as_mut_slice()[..self.cursor].copy_from_slice(&self.data.as_slice()[..self.cursor]);
        self.data = data;
        Ok(())
    }
}

/// Immutable UTF-8 column: validity bits, `len + 1` byte offsets, and a
/// shared data buffer. A non-null empty string and a null are distinguished
/// only by the validity bit; both have an empty byte range.
#[derive(Debug)]
pub struct Utf8Column {
    validity: ValidityBitmap,
    offsets: Buffer,
    data: Buffer,
    len: usize,
}

impl Utf8Column {
    /// Assemble a column from already-filled buffers (the decode path).
    /// The buffers must satisfy the layout contract, including per-value
    /// UTF-8 validity; violations are programming errors.
    pub fn from_raw_parts(
        validity: ValidityBitmap,
        offsets: Buffer,
        data: Buffer,
        len: usize,
    ) -> Self {
        assert_eq!(validity.bit_len(), len, "validity length must equal row count");
        assert_eq!(offsets.len(), (len + 1) * 4, "offsets must hold len + 1 entries");

        let offs = offsets.as_u32s();
        assert_eq!(offs[0], 0, "offsets must start at zero");
        assert!(
            offs.windows(2).all(|w| w[0] <= w[1]),
            "offsets must be non-decreasing"
        );
        assert_eq!(
            offs[len] as usize,
            data.len(),
            "terminal offset must equal data length"
        );
        for w in offs.windows(2) {
            assert!(
                std::str::from_utf8(&data.as_slice()[w[0] as usize..w[1] as usize]).is_ok(),
                "string data must be valid UTF-8"
            );
        }

        Self {
            validity,
            offsets,
            data,
            len,
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn null_count(&self) -> usize {
        self.validity.null_count()
    }

    pub fn is_valid(&self, index: usize) -> bool {
        self.validity.get(index)
    }

    pub fn value(&self, index: usize) -> Option<&str> {
        if !self.validity.get(index) {
            return None;
        }
        let offs = self.offsets.as_u32s();
        let bytes = &self.data.as_slice()[offs[index] as usize..offs[index + 1] as usize];
        // UTF-8 is checked at construction (builder input is &str; raw parts
        // are validated above).
        Some(unsafe { std::str::from_utf8_unchecked(bytes) })
    }

    pub fn offsets(&self) -> &[u32] {
        self.offsets.as_u32s()
    }

    pub fn data(&self) -> &[u8] {
        self.data.as_slice()
    }

    pub fn validity(&self) -> &ValidityBitmap {
        &self.validity
    }
}

impl PartialEq for Utf8Column {
    fn eq(&self, other: &Self) -> bool {
        if self.len != other.len {
            return false;
        }
        (0..self.len).all(|i| self.value(i) == other.value(i))
    }
}

// ---------------------------------------------------------------------------
// Column
// ---------------------------------------------------------------------------

/// A finalized column of either supported type.
#[derive(Debug, PartialEq)]
pub enum Column {
    Int32(Int32Column),
    Utf8(Utf8Column),
}

impl Column {
    pub fn data_type(&self) -> LogicalType {
        match self {
            Column::Int32(_) => LogicalType::Int32,
            Column::Utf8(_) => LogicalType::Utf8,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Column::Int32(c) => c.len(),
            Column::Utf8(c) => c.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn null_count(&self) -> usize {
        match self {
            Column::Int32(c) => c.null_count(),
            Column::Utf8(c) => c.null_count(),
        }
    }

    pub fn as_int32(&self) -> Option<&Int32Column> {
        match self {
            Column::Int32(c) => Some(c),
            _ => None,
        }
    }

    pub fn as_utf8(&self) -> Option<&Utf8Column> {
        match self {
            Column::Utf8(c) => Some(c),
            _ => None,
        }
    }
}
