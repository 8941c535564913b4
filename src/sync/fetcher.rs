use crate::bind::BindArray;
use crate::col::FieldDescriptor;
use crate::error::{Error, Result};
use crate::native::{FetchStatus, NativeStatement};
use crate::row::Row;
use crate::value::Value;

/// Fetch-state of a [`ResultFetcher`]. `Exhausted` and `Closed` are terminal;
/// the transition out of `Fetching` happens exactly once.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FetchState {
    Initialized,
    Fetching,
    Exhausted,
    Closed,
}

/// Blocking prepared-statement result fetcher.
///
/// Owns the ordered field catalog, the contiguous bind array, and the
/// statement handle. Created once per query execution; torn down on explicit
/// [`done`](Self::done), natural exhaustion, or drop, whichever comes first,
/// idempotently.
pub struct ResultFetcher<S: NativeStatement> {
    statement: S,
    binds: Option<BindArray>,
    fields: Vec<FieldDescriptor>,
    state: FetchState,
}

impl<S: NativeStatement> ResultFetcher<S> {
    /// Extract the field catalog, allocate and bind the receive buffers, and
    /// execute the statement.
    ///
    /// On any failure nothing stays allocated: a metadata failure allocates
    /// no descriptors at all, and a bind or execute failure drops the
    /// just-allocated array before returning. A failed initialization never
    /// yields a fetcher, so it cannot be queried afterward.
    pub fn initialize(mut statement: S) -> Result<Self> {
        let fields = statement
            .result_fields()
            .ok_or(Error::MetadataUnresolved)?;

        let mut binds = BindArray::for_fields(&fields);

        statement
            .bind_result(binds.as_mut_slice())
            .map_err(Error::Bind)?;
        statement.execute().map_err(Error::Execute)?;

        Ok(Self {
            statement,
            binds: Some(binds),
            fields,
            state: FetchState::Initialized,
        })
    }

    /// Column names in catalog order. Computed once at initialization;
    /// identical before and after fetching, and still available after close.
    pub fn field_names(&self) -> Vec<String> {
        self.fields.iter().map(|f| f.name.clone()).collect()
    }

    pub fn num_fields(&self) -> usize {
        self.fields.len()
    }

    /// Fetch and decode the next row.
    ///
    /// Returns `None` on end of data. A native fetch failure is logged and
    /// presented as end of data as well; callers cannot distinguish the two.
    /// After exhaustion or close this returns `None` immediately without
    /// touching the native layer.
    #[tracing::instrument(skip_all)]
    pub fn fetch_next(&mut self) -> Option<Row> {
        match self.state {
            FetchState::Exhausted | FetchState::Closed => return None,
            FetchState::Initialized | FetchState::Fetching => self.state = FetchState::Fetching,
        }

        // The native client requires thread-scoped registration around each
        // blocking call.
        self.statement.thread_init();
        let row = self.fetch_row();
        if row.is_none() {
            // Auto-close on exhaustion, still inside the registered scope.
            self.state = FetchState::Exhausted;
            self.release_resources();
        }
        self.statement.thread_end();
        row
    }

    fn fetch_row(&mut self) -> Option<Row> {
        let binds = self.binds.as_mut()?;

        match self.statement.fetch(binds.as_mut_slice()) {
            FetchStatus::NoData => None,
            FetchStatus::Error => {
                tracing::warn!(
                    error = %self.statement.last_error(),
                    "row fetch failed, ending the stream"
                );
                None
            }
            // A truncated row still carries data; each column was clipped to
            // its buffer capacity.
            FetchStatus::Row | FetchStatus::Truncated => {
                let values = binds
                    .as_slice()
                    .iter()
                    .zip(&self.fields)
                    .map(|(bind, field)| Value::decode(bind, field.charset))
                    .collect();
                Some(Row::new(values))
            }
        }
    }

    /// Signal that no further fetches will be made, releasing all resources.
    /// Idempotent: repeated calls, calls after natural exhaustion, and the
    /// drop-time call are all no-ops after the first release.
    pub fn done(&mut self) {
        self.release_resources();
        self.state = FetchState::Closed;
    }

    /// Exactly-once teardown. The owning handle to the bind array is taken
    /// first, so any re-entry (explicit `done`, auto-close on exhaustion,
    /// drop) finds nothing left to free.
    fn release_resources(&mut self) {
        let Some(binds) = self.binds.take() else {
            return;
        };
        drop(binds);

        self.statement.free_result_metadata();
        self.statement.release();
    }
}

impl<S: NativeStatement> Drop for ResultFetcher<S> {
    fn drop(&mut self) {
        self.release_resources();
    }
}
