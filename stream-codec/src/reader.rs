//! Bytes → batch. Every length field is checked against the remaining
//! input before it is honored; a malformed stream aborts the whole decode.

use std::sync::Arc;

use batch_memory::MemoryPool;
use columnar_core::{
    Column, Field, Int32Column, LogicalType, RecordBatch, Schema, Utf8Column, ValidityBitmap,
};
use tracing::debug;

use crate::{CodecError, MAGIC};

struct Reader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    fn take(&mut self, n: usize) -> Result<&'a [u8], CodecError> {
        if self.buf.len() - self.pos < n {
            return Err(CodecError::MalformedStream("truncated input"));
        }
        let bytes = &self.buf[self.pos..self.pos + n];
        self.pos += n;
        Ok(bytes)
    }

    fn u8(&mut self) -> Result<u8, CodecError> {
        Ok(self.take(1)?[0])
    }

    fn u32(&mut self) -> Result<u32, CodecError> {
        let bytes = self.take(4)?;
        Ok(u32::from_le_bytes(bytes.try_into().unwrap()))
    }

    fn exhausted(&self) -> bool {
        self.pos == self.buf.len()
    }
}

/// Deserialize a stream produced by [`encode`](crate::encode). Column
/// buffers are allocated from `pool`; the returned batch follows the same
/// lifecycle as one built directly.
pub fn decode(bytes: &[u8], pool: &MemoryPool) -> Result<RecordBatch, CodecError> {
    let mut r = Reader::new(bytes);

    if r.take(4)? != MAGIC {
        return Err(CodecError::MalformedStream("bad magic"));
    }

    let field_count = r.u32()? as usize;
    let mut fields = Vec::new();
    for _ in 0..field_count {
        let name_len = r.u32()? as usize;
        let name = std::str::from_utf8(r.take(name_len)?)
            .map_err(|_| CodecError::MalformedStream("field name not utf-8"))?;
        let data_type = LogicalType::from_type_tag(r.u8()?)
            .ok_or(CodecError::MalformedStream("unknown type tag"))?;
        let nullable = match r.u8()? {
            0 => false,
            1 => true,
            _ => return Err(CodecError::MalformedStream("invalid nullable flag")),
        };
        let field = Field::new(name, data_type, nullable)
            .map_err(|_| CodecError::MalformedStream("empty field name"))?;
        fields.push(field);
    }

    let row_count = r.u32()? as usize;
    let validity_bytes_expected = ValidityBitmap::bytes_for(row_count);

    let mut columns = Vec::with_capacity(fields.len());
    for field in &fields {
        let validity_len = r.u32()? as usize;
        if validity_len != validity_bytes_expected {
            return Err(CodecError::MalformedStream("validity length mismatch"));
        }
        let validity = ValidityBitmap::from_bytes(pool, r.take(validity_len)?, row_count)?;

        let column = match field.data_type() {
            LogicalType::Int32 => {
                let data_len = r.u32()? as usize;
                if data_len != row_count * 4 {
                    return Err(CodecError::MalformedStream("int32 data length mismatch"));
                }
                let mut values = pool.allocate(data_len)?;
                values.as_mut_slice().copy_from_slice(r.take(data_len)?);
                Column::Int32(Int32Column::from_raw_parts(validity, values, row_count))
            }
            LogicalType::Utf8 => {
                let offsets_len = r.u32()? as usize;
                if offsets_len != (row_count + 1) * 4 {
                    return Err(CodecError::MalformedStream("offsets length mismatch"));
                }
                let offsets_bytes = r.take(offsets_len)?;
                let mut offsets = pool.allocate(offsets_len)?;
                for (slot, chunk) in offsets
                    .as_u32s_mut()
                    .iter_mut()
                    .zip(offsets_bytes.chunks_exact(4))
                {
                    *slot = u32::from_le_bytes(chunk.try_into().unwrap());
                }

                let offs = offsets.as_u32s();
                if offs[0] != 0 {
                    return Err(CodecError::MalformedStream("offsets must start at zero"));
                }
                if offs.windows(2).any(|w| w[0] > w[1]) {
                    return Err(CodecError::MalformedStream("offsets not monotonic"));
                }

                let data_len = r.u32()? as usize;
                if offs[row_count] as usize != data_len {
                    return Err(CodecError::MalformedStream("terminal offset mismatch"));
                }
                let data_bytes = r.take(data_len)?;
                for w in offs.windows(2) {
                    if std::str::from_utf8(&data_bytes[w[0] as usize..w[1] as usize]).is_err() {
                        return Err(CodecError::MalformedStream("invalid utf-8 in string data"));
                    }
                }

                let mut data = pool.allocate(data_len)?;
                data.as_mut_slice().copy_from_slice(data_bytes);
                Column::Utf8(Utf8Column::from_raw_parts(validity, offsets, data, row_count))
            }
        };
        columns.push(column);
    }

    if !r.exhausted() {
        return Err(CodecError::MalformedStream("trailing bytes after batch"));
    }

    debug!(rows = row_count, columns = fields.len(), "decoded batch");
    let batch = RecordBatch::try_new(Arc::new(Schema::new(fields)), columns)?;
    Ok(batch)
}
