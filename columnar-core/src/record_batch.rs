//! Immutable aggregate of same-length columns conforming to a schema.

use std::sync::Arc;

use crate::error::ColumnarError;
use crate::schema::Schema;
use crate::vector::Column;

/// The unit exchanged across the native boundary: a schema, one finalized
/// column per field, and a shared row count. Validated eagerly at
/// construction and immutable afterwards; columns are aggregated by move,
/// never copied.
#[derive(Debug, PartialEq)]
pub struct RecordBatch {
    schema: Arc<Schema>,
    columns: Vec<Column>,
    row_count: usize,
}

impl RecordBatch {
    pub fn try_new(schema: Arc<Schema>, columns: Vec<Column>) -> Result<Self, ColumnarError> {
        if schema.num_fields() != columns.len() {
            return Err(ColumnarError::SchemaMismatch(format!(
                "schema has {} fields but {} columns were provided",
                schema.num_fields(),
                columns.len()
            )));
        }

        for (i, (field, column)) in schema.fields().iter().zip(&columns).enumerate() {
            if field.data_type() != column.data_type() {
                return Err(ColumnarError::SchemaMismatch(format!(
                    "column {} ('{}') is {:?} but the schema declares {:?}",
                    i,
                    field.name(),
                    column.data_type(),
                    field.data_type()
                )));
            }
        }

        let row_count = columns.first().map(Column::len).unwrap_or(0);
        for (i, column) in columns.iter().enumerate() {
            if column.len() != row_count {
                return Err(ColumnarError::RowCountMismatch {
                    column: i,
                    expected: row_count,
                    actual: column.len(),
                });
            }
        }

        Ok(Self {
            schema,
            columns,
            row_count,
        })
    }

    pub fn row_count(&self) -> usize {
        self.row_count
    }

    pub fn num_columns(&self) -> usize {
        self.columns.len()
    }

    pub fn column(&self, index: usize) -> &Column {
        &self.columns[index]
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn schema(&self) -> &Arc<Schema> {
        &self.schema
    }
}
