use domain::Todo;
use tokio::sync::mpsc;

/// A full result set as pushed by the store. Every change replaces the
/// whole list; there is no diff or patch form.
pub type Snapshot = Vec<Todo>;

type Canceller = Box<dyn FnOnce() + Send>;

/// Handle to a standing store subscription. Snapshots are received with
/// [`Subscription::next`]; [`Subscription::stop`] (or dropping the handle)
/// deregisters at the store eagerly, so an abandoned view never leaks a
/// listener.
pub struct Subscription {
    rx: mpsc::UnboundedReceiver<Snapshot>,
    cancel: Option<Canceller>,
}

impl Subscription {
    pub fn new(
        rx: mpsc::UnboundedReceiver<Snapshot>,
        cancel: impl FnOnce() + Send + 'static,
    ) -> Self {
        Self {
            rx,
            cancel: Some(Box::new(cancel)),
        }
    }

    /// Waits for the next pushed snapshot. Returns `None` once the store
    /// side has gone away.
    ///
    /// Cancel safe: a snapshot is either returned or stays queued.
    pub async fn next(&mut self) -> Option<Snapshot> {
        self.rx.recv().await
    }

    /// Stops the subscription and deregisters it at the store.
    pub fn stop(mut self) {
        self.cancel_now();
    }

    fn cancel_now(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.cancel_now();
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("cancelled", &self.cancel.is_none())
            .finish()
    }
}
