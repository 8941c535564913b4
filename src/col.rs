use crate::constant::ColumnType;

/// Per-column catalog entry extracted from result metadata after statement
/// preparation. Immutable once extracted; order-significant.
#[derive(Debug, Clone)]
pub struct FieldDescriptor {
    pub name: String,
    pub column_type: ColumnType,
    pub charset: u16,
    /// Declared maximum length; receive-buffer capacity for variable-width
    /// types.
    pub column_length: u32,
}

impl FieldDescriptor {
    pub fn new(
        name: impl Into<String>,
        column_type: ColumnType,
        charset: u16,
        column_length: u32,
    ) -> Self {
        Self {
            name: name.into(),
            column_type,
            charset,
            column_length,
        }
    }
}
