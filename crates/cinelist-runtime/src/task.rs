use std::future::Future;

use cinelist_api::CancelToken;
use tokio::task::JoinHandle;

/// A spawned task paired with the token that asks it to stop.
///
/// Dropping the handle cancels a task that is still running.
pub struct TaskHandle<T> {
    token: CancelToken,
    handle: Option<JoinHandle<T>>,
}

impl<T: Send + 'static> TaskHandle<T> {
    /// Spawn `f(token)` on the current tokio runtime.
    pub fn spawn<F, Fut>(f: F) -> Self
    where
        F: FnOnce(CancelToken) -> Fut,
        Fut: Future<Output = T> + Send + 'static,
    {
        let token = CancelToken::new();
        let handle = tokio::spawn(f(token.clone()));
        Self {
            token,
            handle: Some(handle),
        }
    }
}

impl<T> TaskHandle<T> {
    pub fn cancel(&self) {
        self.token.cancel();
    }

    /// Wait for the task's output. `None` if it panicked or was aborted.
    pub async fn join(mut self) -> Option<T> {
        let handle = self.handle.take()?;
        match handle.await {
            Ok(value) => Some(value),
            Err(e) => {
                if e.is_panic() {
                    tracing::error!("background task panicked: {e}");
                }
                None
            }
        }
    }
}

impl<T> Drop for TaskHandle<T> {
    fn drop(&mut self) {
        if self.handle.as_ref().is_some_and(|h| !h.is_finished()) {
            self.token.cancel();
        }
    }
}
