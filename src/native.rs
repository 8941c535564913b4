//! Binding surface of the native client library.
//!
//! The connection/pool layer hands this crate a prepared, not-yet-executed
//! statement. Everything the fetcher needs from it goes through
//! [`NativeStatement`]; the wire protocol itself stays behind this seam.

use crate::bind::BindDescriptor;
use crate::col::FieldDescriptor;
use crate::error::NativeError;

/// Outcome of a single native row fetch.
///
/// `Error` is kept distinguishable from `NoData` at this seam even though the
/// fetcher folds the two together (a native fetch failure presents to callers
/// as ordinary stream exhaustion).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchStatus {
    /// One row was written into the bound buffers.
    Row,
    /// One row was written but at least one column was clipped to its buffer
    /// capacity (C API status `MYSQL_DATA_TRUNCATED`).
    Truncated,
    /// End of data (C API status `MYSQL_NO_DATA`).
    NoData,
    /// The native layer reported a fetch failure.
    Error,
}

impl FetchStatus {
    /// Map a raw `mysql_stmt_fetch` return code.
    pub fn from_code(code: i32) -> Self {
        match code {
            0 => Self::Row,
            100 => Self::NoData,
            101 => Self::Truncated,
            _ => Self::Error,
        }
    }
}

/// An executed-or-executable prepared statement handle bound to a live
/// connection, together with its result metadata.
///
/// Implementations wrap the native client's statement object. The fetcher
/// calls `free_result_metadata` and `release` at most once each; `release`
/// signals the owning connection that the statement may be reclaimed or
/// returned to its pool.
pub trait NativeStatement: Send {
    /// Read the column catalog from the result metadata. `None` when the
    /// metadata cannot be resolved; initialization then fails without
    /// allocating anything.
    fn result_fields(&mut self) -> Option<Vec<FieldDescriptor>>;

    /// Attach the contiguous bind record set to the statement.
    fn bind_result(&mut self, binds: &mut [BindDescriptor]) -> Result<(), NativeError>;

    /// Execute the bound statement.
    fn execute(&mut self) -> Result<(), NativeError>;

    /// Fetch the next row into the bound buffers, updating each descriptor's
    /// length/null/truncation cells.
    fn fetch(&mut self, binds: &mut [BindDescriptor]) -> FetchStatus;

    /// Diagnostic text for the most recent failure, used for logging only.
    fn last_error(&self) -> String;

    /// Free the result metadata handle.
    fn free_result_metadata(&mut self);

    /// Signal that no further fetches will touch this statement.
    fn release(&mut self);

    /// Thread-scoped registration required by the native client around each
    /// blocking call. Per-call, not per-object.
    fn thread_init(&mut self) {}

    fn thread_end(&mut self) {}
}
