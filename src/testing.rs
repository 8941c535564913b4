//! Scripted stand-in for the native binding surface, used by unit tests.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use zerocopy::IntoBytes;

use crate::bind::BindDescriptor;
use crate::col::FieldDescriptor;
use crate::constant::ColumnType;
use crate::error::NativeError;
use crate::native::{FetchStatus, NativeStatement};
use crate::value::TemporalBuffer;

/// One scripted column cell. `length` is the length the native layer reports,
/// which may exceed what fits in the receive buffer.
#[derive(Debug, Clone)]
pub(crate) enum MockCell {
    Null,
    Bytes(Vec<u8>),
    /// Bytes with an inflated reported length, for clip tests.
    Overlong { bytes: Vec<u8>, reported: usize },
}

impl MockCell {
    pub(crate) fn bytes(bytes: impl Into<Vec<u8>>) -> Self {
        Self::Bytes(bytes.into())
    }

    pub(crate) fn temporal(
        year: u32,
        month: u32,
        day: u32,
        hour: u32,
        minute: u32,
        second: u32,
    ) -> Self {
        let buffer = TemporalBuffer {
            year: year.into(),
            month: month.into(),
            day: day.into(),
            hour: hour.into(),
            minute: minute.into(),
            second: second.into(),
            microsecond: 0.into(),
            is_negative: 0,
        };
        Self::Bytes(buffer.as_bytes().to_vec())
    }
}

/// Shared observation counters, kept alive independently of the statement so
/// tests can assert after the fetcher (and statement) dropped.
#[derive(Debug, Default)]
pub(crate) struct MockCounters {
    pub(crate) fetch_calls: AtomicUsize,
    pub(crate) releases: AtomicUsize,
    pub(crate) metadata_frees: AtomicUsize,
    pub(crate) thread_inits: AtomicUsize,
    pub(crate) thread_ends: AtomicUsize,
}

impl MockCounters {
    pub(crate) fn fetch_calls(&self) -> usize {
        self.fetch_calls.load(Ordering::SeqCst)
    }

    pub(crate) fn releases(&self) -> usize {
        self.releases.load(Ordering::SeqCst)
    }

    pub(crate) fn metadata_frees(&self) -> usize {
        self.metadata_frees.load(Ordering::SeqCst)
    }
}

pub(crate) struct MockStatement {
    fields: Option<Vec<FieldDescriptor>>,
    rows: Vec<Vec<MockCell>>,
    cursor: usize,
    /// Report a fetch error instead of end-of-data once the script runs out.
    pub(crate) error_at_end: bool,
    pub(crate) fail_bind: bool,
    pub(crate) fail_execute: bool,
    /// Hold each fetch for this long, for overlap tests.
    pub(crate) fetch_delay: Option<Duration>,
    pub(crate) counters: Arc<MockCounters>,
}

impl MockStatement {
    pub(crate) fn new(fields: Vec<FieldDescriptor>, rows: Vec<Vec<MockCell>>) -> Self {
        Self {
            fields: Some(fields),
            rows,
            cursor: 0,
            error_at_end: false,
            fail_bind: false,
            fail_execute: false,
            fetch_delay: None,
            counters: Arc::default(),
        }
    }

    pub(crate) fn without_metadata() -> Self {
        let mut mock = Self::new(Vec::new(), Vec::new());
        mock.fields = None;
        mock
    }

    pub(crate) fn counters(&self) -> Arc<MockCounters> {
        Arc::clone(&self.counters)
    }
}

impl NativeStatement for MockStatement {
    fn result_fields(&mut self) -> Option<Vec<FieldDescriptor>> {
        self.fields.clone()
    }

    fn bind_result(&mut self, _binds: &mut [BindDescriptor]) -> Result<(), NativeError> {
        if self.fail_bind {
            return Err(NativeError::new("bind rejected"));
        }
        Ok(())
    }

    fn execute(&mut self) -> Result<(), NativeError> {
        if self.fail_execute {
            return Err(NativeError::new("execute rejected"));
        }
        Ok(())
    }

    fn fetch(&mut self, binds: &mut [BindDescriptor]) -> FetchStatus {
        self.counters.fetch_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.fetch_delay {
            std::thread::sleep(delay);
        }

        let Some(row) = self.rows.get(self.cursor) else {
            return if self.error_at_end {
                FetchStatus::Error
            } else {
                FetchStatus::NoData
            };
        };
        self.cursor += 1;

        let mut truncated = false;
        for (bind, cell) in binds.iter_mut().zip(row) {
            match cell {
                MockCell::Null => bind.set_written(0, true, false),
                MockCell::Bytes(bytes) => {
                    let n = bytes.len().min(bind.capacity());
                    bind.buffer_mut()[..n].copy_from_slice(&bytes[..n]);
                    truncated |= n < bytes.len();
                    bind.set_written(bytes.len(), false, n < bytes.len());
                }
                MockCell::Overlong { bytes, reported } => {
                    let n = bytes.len().min(bind.capacity());
                    bind.buffer_mut()[..n].copy_from_slice(&bytes[..n]);
                    truncated = true;
                    bind.set_written(*reported, false, true);
                }
            }
        }

        if truncated {
            FetchStatus::Truncated
        } else {
            FetchStatus::Row
        }
    }

    fn last_error(&self) -> String {
        "scripted fetch failure".to_owned()
    }

    fn free_result_metadata(&mut self) {
        self.counters.metadata_frees.fetch_add(1, Ordering::SeqCst);
    }

    fn release(&mut self) {
        self.counters.releases.fetch_add(1, Ordering::SeqCst);
    }

    fn thread_init(&mut self) {
        self.counters.thread_inits.fetch_add(1, Ordering::SeqCst);
    }

    fn thread_end(&mut self) {
        self.counters.thread_ends.fetch_add(1, Ordering::SeqCst);
    }
}

pub(crate) fn field(
    name: &str,
    column_type: ColumnType,
    charset: u16,
    column_length: u32,
) -> FieldDescriptor {
    FieldDescriptor::new(name, column_type, charset, column_length)
}
