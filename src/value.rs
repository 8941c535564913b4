//! Typed row values and the per-column decode table.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use zerocopy::byteorder::little_endian::U32 as U32LE;
use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout};

use crate::bind::BindDescriptor;
use crate::constant::{BINARY_CHARSET, ColumnType};

/// Fixed formats used to render and re-parse temporal buffers. Stateless and
/// shared; chrono parsing carries no mutable state.
pub const DATE_FORMAT: &str = "%Y-%m-%d";
pub const TIME_FORMAT: &str = "%H:%M:%S";
pub const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// A decoded column value, owned by the caller.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// NULL value, or a value whose payload failed to decode
    Null,
    /// Signed integer (TINYINT, SMALLINT, MEDIUMINT, INT, BIGINT)
    Int(i64),
    /// FLOAT - 4-byte floating point
    Float(f32),
    /// DOUBLE - 8-byte floating point
    Double(f64),
    /// DECIMAL, CHAR, VARCHAR, and text-charset BLOB content
    Text(String),
    /// Binary BLOB content and BIT fields
    Bytes(Vec<u8>),
    /// DATE
    Date(NaiveDate),
    /// TIME
    Time(NaiveTime),
    /// DATETIME/TIMESTAMP
    DateTime(NaiveDateTime),
}

impl Value {
    /// Decode one column from its receive buffer per the wire type dispatch
    /// table.
    ///
    /// Decoding never fails: an unrecognized type degrades to best-effort
    /// text, and a malformed payload (bad UTF-8, out-of-range temporal)
    /// yields `Null`.
    pub fn decode(bind: &BindDescriptor, charset: u16) -> Value {
        if bind.is_null() {
            return Value::Null;
        }

        match bind.column_type() {
            // Fixed-width numeric types: reinterpret the full fixed buffer.
            ColumnType::MYSQL_TYPE_TINY => read_int::<1>(bind.buffer(), |b| b[0] as i8 as i64),
            ColumnType::MYSQL_TYPE_SHORT => {
                read_int::<2>(bind.buffer(), |b| i16::from_le_bytes(b) as i64)
            }
            ColumnType::MYSQL_TYPE_INT24 | ColumnType::MYSQL_TYPE_LONG => {
                read_int::<4>(bind.buffer(), |b| i32::from_le_bytes(b) as i64)
            }
            ColumnType::MYSQL_TYPE_LONGLONG => {
                read_int::<8>(bind.buffer(), i64::from_le_bytes)
            }
            ColumnType::MYSQL_TYPE_FLOAT => match first_chunk::<4>(bind.buffer()) {
                Some(b) => Value::Float(f32::from_le_bytes(b)),
                None => Value::Null,
            },
            ColumnType::MYSQL_TYPE_DOUBLE => match first_chunk::<8>(bind.buffer()) {
                Some(b) => Value::Double(f64::from_le_bytes(b)),
                None => Value::Null,
            },

            ColumnType::MYSQL_TYPE_DECIMAL
            | ColumnType::MYSQL_TYPE_NEWDECIMAL
            | ColumnType::MYSQL_TYPE_VARCHAR
            | ColumnType::MYSQL_TYPE_VAR_STRING
            | ColumnType::MYSQL_TYPE_STRING => decode_text(bind.written()),

            ColumnType::MYSQL_TYPE_TINY_BLOB
            | ColumnType::MYSQL_TYPE_BLOB
            | ColumnType::MYSQL_TYPE_MEDIUM_BLOB
            | ColumnType::MYSQL_TYPE_LONG_BLOB => {
                if charset == BINARY_CHARSET {
                    Value::Bytes(bind.written().to_vec())
                } else {
                    decode_text(bind.written())
                }
            }

            ColumnType::MYSQL_TYPE_BIT => Value::Bytes(bind.written().to_vec()),

            ColumnType::MYSQL_TYPE_TIME => match TemporalBuffer::load(bind.buffer()) {
                Some(t) => t.to_time(),
                None => Value::Null,
            },
            ColumnType::MYSQL_TYPE_DATE => match TemporalBuffer::load(bind.buffer()) {
                Some(t) => t.to_date(),
                None => Value::Null,
            },
            ColumnType::MYSQL_TYPE_DATETIME | ColumnType::MYSQL_TYPE_TIMESTAMP => {
                match TemporalBuffer::load(bind.buffer()) {
                    Some(t) => t.to_datetime(),
                    None => Value::Null,
                }
            }

            other => {
                tracing::warn!(column_type = ?other, "no decoder for column type, decoding as text");
                decode_text(bind.written())
            }
        }
    }
}

fn read_int<const N: usize>(buffer: &[u8], convert: impl FnOnce([u8; N]) -> i64) -> Value {
    match first_chunk::<N>(buffer) {
        Some(bytes) => Value::Int(convert(bytes)),
        None => Value::Null,
    }
}

fn first_chunk<const N: usize>(buffer: &[u8]) -> Option<[u8; N]> {
    buffer.get(..N)?.try_into().ok()
}

/// The returned data is assumed to be encoded in UTF-8; anything else decodes
/// to `Null`, matching a failed text conversion.
fn decode_text(bytes: &[u8]) -> Value {
    match simdutf8::basic::from_utf8(bytes) {
        Ok(text) => Value::Text(text.to_owned()),
        Err(_) => Value::Null,
    }
}

/// Fixed temporal receive layout the native layer writes for
/// TIME/DATE/DATETIME/TIMESTAMP columns (the `MYSQL_TIME` record).
#[repr(C, packed)]
#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, KnownLayout, Immutable)]
pub struct TemporalBuffer {
    pub year: U32LE,
    pub month: U32LE,
    pub day: U32LE,
    pub hour: U32LE,
    pub minute: U32LE,
    pub second: U32LE,
    pub microsecond: U32LE,
    /// Negative TIME marker; ignored by the decoder, which renders the
    /// clock-face fields only.
    pub is_negative: u8,
}

impl TemporalBuffer {
    pub const SIZE: usize = std::mem::size_of::<Self>();

    fn load(buffer: &[u8]) -> Option<Self> {
        Self::read_from_bytes(buffer.get(..Self::SIZE)?).ok()
    }

    /// Render `HH:MM:SS` and re-parse through the fixed time format. An
    /// out-of-range field (MySQL TIME spans more than a day) yields `Null`.
    fn to_time(self) -> Value {
        let rendered = format!(
            "{:02}:{:02}:{:02}",
            self.hour.get(),
            self.minute.get(),
            self.second.get()
        );
        match NaiveTime::parse_from_str(&rendered, TIME_FORMAT) {
            Ok(time) => Value::Time(time),
            Err(_) => Value::Null,
        }
    }

    /// Render `YYYY-MM-DD` and re-parse. The all-zero date decodes to `Null`.
    fn to_date(self) -> Value {
        let rendered = format!(
            "{:04}-{:02}-{:02}",
            self.year.get(),
            self.month.get(),
            self.day.get()
        );
        match NaiveDate::parse_from_str(&rendered, DATE_FORMAT) {
            Ok(date) => Value::Date(date),
            Err(_) => Value::Null,
        }
    }

    /// Render `YYYY-MM-DD HH:MM:SS` and re-parse through the fixed datetime
    /// formatter; a payload that fails to parse yields `Null` silently.
    fn to_datetime(self) -> Value {
        let rendered = format!(
            "{:04}-{:02}-{:02} {:02}:{:02}:{:02}",
            self.year.get(),
            self.month.get(),
            self.day.get(),
            self.hour.get(),
            self.minute.get(),
            self.second.get()
        );
        match NaiveDateTime::parse_from_str(&rendered, DATETIME_FORMAT) {
            Ok(datetime) => Value::DateTime(datetime),
            Err(_) => Value::Null,
        }
    }
}
