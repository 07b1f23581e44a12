use thiserror::Error;

#[derive(Debug, Error)]
pub enum ColumnarError {
    #[error("field name must not be empty")]
    EmptyFieldName,

    #[error("index {index} out of range for capacity {capacity}")]
    IndexOutOfRange { index: usize, capacity: usize },

    #[error("unordered write: index {index} is behind the write cursor at {next}")]
    UnorderedWrite { index: usize, next: usize },

    #[error("schema mismatch: {0}")]
    SchemaMismatch(String),

    #[error("row count mismatch: column {column} has {actual} rows, expected {expected}")]
    RowCountMismatch {
        column: usize,
        expected: usize,
        actual: usize,
    },

    #[error(transparent)]
    Memory(#[from] batch_memory::MemoryError),
}
