use cinelist_api::CatalogError;
use tokio::sync::watch;

/// Observable state of a fetch-on-change controller.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchState<T> {
    pub value: T,
    pub loading: bool,
    /// User-facing failure message. Cancellation never lands here.
    pub error: Option<String>,
    /// Bumped every time a new request supersedes the previous one.
    revision: u64,
}

/// Holds a [`FetchState`] behind a watch channel and fences writes by
/// revision, so a superseded request can never overwrite newer state.
pub(crate) struct StateCell<T> {
    tx: watch::Sender<FetchState<T>>,
}

impl<T> StateCell<T> {
    pub(crate) fn new(value: T) -> Self {
        let (tx, _rx) = watch::channel(FetchState {
            value,
            loading: false,
            error: None,
            revision: 0,
        });
        Self { tx }
    }

    pub(crate) fn subscribe(&self) -> watch::Receiver<FetchState<T>> {
        self.tx.subscribe()
    }

    pub(crate) fn snapshot(&self) -> FetchState<T>
    where
        T: Clone,
    {
        self.tx.borrow().clone()
    }

    /// Supersede any request in flight and go idle with `value`.
    pub(crate) fn reset(&self, value: T) {
        self.tx.send_modify(|s| {
            s.revision += 1;
            s.value = value;
            s.loading = false;
            s.error = None;
        });
    }

    /// Supersede any request in flight and mark a new one as loading.
    /// `clear` replaces the current value when given.
    ///
    /// Returns the revision the new request must present to [`complete`].
    ///
    /// [`complete`]: StateCell::complete
    pub(crate) fn start(&self, clear: Option<T>) -> u64 {
        let mut revision = 0;
        self.tx.send_modify(|s| {
            s.revision += 1;
            s.loading = true;
            s.error = None;
            if let Some(value) = clear {
                s.value = value;
            }
            revision = s.revision;
        });
        revision
    }

    /// Apply the outcome of the request started at `revision`.
    ///
    /// Returns `false` (and changes nothing) when the request was cancelled
    /// or has been superseded.
    pub(crate) fn complete(&self, revision: u64, result: Result<T, CatalogError>) -> bool {
        if result.as_ref().is_err_and(CatalogError::is_cancelled) {
            return false;
        }
        self.tx.send_if_modified(|s| {
            if s.revision != revision {
                return false;
            }
            match result {
                Ok(value) => s.value = value,
                Err(e) => s.error = Some(e.to_string()),
            }
            s.loading = false;
            true
        })
    }
}
