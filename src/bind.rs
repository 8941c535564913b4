//! Receive-buffer allocation for bound result columns.

use crate::col::FieldDescriptor;
use crate::constant::ColumnType;
use crate::value::TemporalBuffer;

/// One bound receive record: an owned fixed-capacity buffer plus the output
/// cells the native layer writes per fetch (actual length, null flag,
/// truncation flag).
///
/// Exclusively owned by its fetcher from allocation until release; the
/// buffer is never resized.
#[derive(Debug)]
pub struct BindDescriptor {
    column_type: ColumnType,
    buffer: Box<[u8]>,
    length: usize,
    is_null: bool,
    truncated: bool,
}

impl BindDescriptor {
    /// Allocate a zero-initialized receive buffer sized for the field's wire
    /// type.
    pub fn for_field(field: &FieldDescriptor) -> Self {
        #[cfg(test)]
        alloc_count::on_alloc();

        Self {
            column_type: field.column_type,
            buffer: vec![0u8; receive_capacity(field)].into_boxed_slice(),
            length: 0,
            is_null: false,
            truncated: false,
        }
    }

    pub fn column_type(&self) -> ColumnType {
        self.column_type
    }

    pub fn capacity(&self) -> usize {
        self.buffer.len()
    }

    /// Full fixed-capacity buffer; fixed-width numeric and temporal decodes
    /// read from here regardless of the reported length.
    pub fn buffer(&self) -> &[u8] {
        &self.buffer
    }

    /// Where the native layer writes the fetched column bytes.
    pub fn buffer_mut(&mut self) -> &mut [u8] {
        &mut self.buffer
    }

    /// Record the native layer's per-fetch output cells. `length` is the
    /// actual value length, which may exceed the capacity when the value was
    /// clipped.
    pub fn set_written(&mut self, length: usize, is_null: bool, truncated: bool) {
        self.length = length;
        self.is_null = is_null;
        self.truncated = truncated;
    }

    pub fn is_null(&self) -> bool {
        self.is_null
    }

    pub fn is_truncated(&self) -> bool {
        self.truncated
    }

    /// The written bytes, clipped to `min(reported length, capacity)`. A
    /// reported length beyond capacity clips rather than overruns.
    pub fn written(&self) -> &[u8] {
        &self.buffer[..self.length.min(self.buffer.len())]
    }
}

#[cfg(test)]
impl Drop for BindDescriptor {
    fn drop(&mut self) {
        alloc_count::on_free();
    }
}

/// The contiguous record set attached to a statement before execution.
/// Exactly one descriptor per field, same index.
#[derive(Debug)]
pub struct BindArray {
    binds: Box<[BindDescriptor]>,
}

impl BindArray {
    pub fn for_fields(fields: &[FieldDescriptor]) -> Self {
        Self {
            binds: fields.iter().map(BindDescriptor::for_field).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.binds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.binds.is_empty()
    }

    pub fn as_slice(&self) -> &[BindDescriptor] {
        &self.binds
    }

    pub fn as_mut_slice(&mut self) -> &mut [BindDescriptor] {
        &mut self.binds
    }
}

/// Receive-buffer capacity per wire type: the fixed width for numeric and
/// temporal types, the declared maximum length for everything else.
fn receive_capacity(field: &FieldDescriptor) -> usize {
    match field.column_type {
        ColumnType::MYSQL_TYPE_TINY => std::mem::size_of::<i8>(),
        ColumnType::MYSQL_TYPE_SHORT => std::mem::size_of::<i16>(),
        ColumnType::MYSQL_TYPE_INT24 | ColumnType::MYSQL_TYPE_LONG => std::mem::size_of::<i32>(),
        ColumnType::MYSQL_TYPE_LONGLONG => std::mem::size_of::<i64>(),
        ColumnType::MYSQL_TYPE_FLOAT => std::mem::size_of::<f32>(),
        ColumnType::MYSQL_TYPE_DOUBLE => std::mem::size_of::<f64>(),
        ColumnType::MYSQL_TYPE_TIME
        | ColumnType::MYSQL_TYPE_DATE
        | ColumnType::MYSQL_TYPE_DATETIME
        | ColumnType::MYSQL_TYPE_TIMESTAMP => TemporalBuffer::SIZE,
        _ => field.column_length as usize,
    }
}
