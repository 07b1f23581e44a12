//! Field and schema model. Immutable once constructed.

use crate::error::ColumnarError;

/// Closed set of column types understood by this core.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogicalType {
    Int32,
    Utf8,
}

impl LogicalType {
    /// Wire/export tag for this type.
    pub const fn type_tag(self) -> u8 {
        match self {
            LogicalType::Int32 => 0,
            LogicalType::Utf8 => 1,
        }
    }

    pub fn from_type_tag(tag: u8) -> Option<Self> {
        match tag {
            0 => Some(LogicalType::Int32),
            1 => Some(LogicalType::Utf8),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    name: String,
    data_type: LogicalType,
    nullable: bool,
}

impl Field {
    pub fn new(
        name: impl Into<String>,
        data_type: LogicalType,
        nullable: bool,
    ) -> Result<Self, ColumnarError> {
        let name = name.into();
        if name.is_empty() {
            return Err(ColumnarError::EmptyFieldName);
        }
        Ok(Self {
            name,
            data_type,
            nullable,
        })
    }

    /// Shorthand for the common nullable case.
    pub fn nullable(name: impl Into<String>, data_type: LogicalType) -> Result<Self, ColumnarError> {
        Self::new(name, data_type, true)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn data_type(&self) -> LogicalType {
        self.data_type
    }

    pub fn is_nullable(&self) -> bool {
        self.nullable
    }
}

/// Ordered field list. Snapshots its input; later changes to the source
/// collection do not affect a constructed schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schema {
    fields: Vec<Field>,
}

impl Schema {
    pub fn new(fields: Vec<Field>) -> Self {
        Self { fields }
    }

    pub fn empty() -> Self {
        Self { fields: Vec::new() }
    }

    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    pub fn field(&self, index: usize) -> &Field {
        &self.fields[index]
    }

    pub fn num_fields(&self) -> usize {
        self.fields.len()
    }

    /// Index of the first field with this name. Names need not be unique.
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|f| f.name() == name)
    }
}
