use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::Mutex;

use crate::error::{Error, Result};
use crate::native::NativeStatement;
use crate::row::Row;
use crate::sync::ResultFetcher;

/// Async façade over the blocking [`ResultFetcher`].
///
/// Each call independently enters and leaves the runtime's blocking worker
/// pool via `spawn_blocking`; no dedicated thread is held across calls, and
/// the join handle delivers each completion exactly once. There is no
/// cancellation path: once dispatched, a fetch runs to completion.
///
/// Calls are single-flight per fetcher. Overlapping a `fetch_next` or `done`
/// with one still in flight is rejected with [`Error::FetchInFlight`] instead
/// of leaving the underlying row cursor in an undefined state.
pub struct Fetcher<S: NativeStatement + 'static> {
    inner: Arc<Mutex<ResultFetcher<S>>>,
    titles: Arc<[String]>,
    in_flight: AtomicBool,
}

impl<S: NativeStatement + 'static> Fetcher<S> {
    /// Build buffers, bind, and execute. Runs on the caller's thread; called
    /// exactly once, before any fetch.
    pub fn initialize(statement: S) -> Result<Self> {
        let fetcher = ResultFetcher::initialize(statement)?;
        let titles: Arc<[String]> = fetcher.field_names().into();
        Ok(Self {
            inner: Arc::new(Mutex::new(fetcher)),
            titles,
            in_flight: AtomicBool::new(false),
        })
    }

    /// Fetch and decode the next row on the blocking worker pool.
    ///
    /// `Ok(None)` signals end of data; native fetch failures present the
    /// same way and never surface as errors.
    pub async fn fetch_next(&self) -> Result<Option<Row>> {
        let _guard = FlightGuard::acquire(&self.in_flight)?;

        let inner = Arc::clone(&self.inner);
        let row = tokio::task::spawn_blocking(move || inner.blocking_lock().fetch_next()).await?;
        Ok(row)
    }

    /// The immutable column-name list, computed once at initialization.
    /// No offload required.
    pub fn titles(&self) -> Arc<[String]> {
        Arc::clone(&self.titles)
    }

    /// Signal that no further fetches will be made. Teardown performs
    /// blocking native frees, so it is offloaded as well. Idempotent.
    pub async fn done(&self) -> Result<()> {
        let _guard = FlightGuard::acquire(&self.in_flight)?;

        let inner = Arc::clone(&self.inner);
        tokio::task::spawn_blocking(move || inner.blocking_lock().done()).await?;
        Ok(())
    }
}

/// Clears the in-flight flag when the call completes, including on join
/// failure.
struct FlightGuard<'a> {
    flag: &'a AtomicBool,
}

impl<'a> FlightGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Result<Self> {
        if flag.swap(true, Ordering::AcqRel) {
            return Err(Error::FetchInFlight);
        }
        Ok(Self { flag })
    }
}

impl Drop for FlightGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}
