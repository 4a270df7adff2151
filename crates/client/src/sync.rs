use std::sync::Arc;

use domain::{Todo, UserId};
use infrastructure::{DocumentStore, Snapshot, StoreError, Subscription};
use tracing::{debug, info};

/// Visible list state. `Loading` covers the window between identity becoming
/// present and the first pushed snapshot; every later snapshot replaces the
/// whole list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListState {
    NoUser,
    Loading,
    Ready(Snapshot),
}

/// Keeps one user's todo list continuously in sync with the store. Owns at
/// most one live subscription; changing identity stops the previous one
/// before opening the next.
pub struct ListSynchronizer {
    store: Arc<dyn DocumentStore>,
    identity: Option<UserId>,
    subscription: Option<Subscription>,
    state: ListState,
}

impl ListSynchronizer {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            store,
            identity: None,
            subscription: None,
            state: ListState::NoUser,
        }
    }

    /// Reacts to the identity provider: a present identity opens a
    /// subscription and enters `Loading`; an absent one tears down and
    /// returns to `NoUser`. Re-setting the current identity is a no-op.
    /// If subscribing fails, the synchronizer is left in `NoUser` rather
    /// than reporting the previous user against a dead subscription.
    pub async fn set_identity(&mut self, user: Option<UserId>) -> Result<(), StoreError> {
        if self.identity == user {
            return Ok(());
        }

        if let Some(prev) = self.subscription.take() {
            debug!("Stopping previous subscription");
            prev.stop();
        }
        // The previous subscription is gone; nothing is visible until a
        // new one is in hand.
        self.identity = None;
        self.state = ListState::NoUser;

        let Some(user) = user else {
            info!("Identity absent, list cleared");
            return Ok(());
        };

        info!("Identity present, subscribing for user {user}");
        self.subscription = Some(self.store.subscribe(&user).await?);
        self.state = ListState::Loading;
        self.identity = Some(user);
        Ok(())
    }

    /// Waits for the next pushed snapshot and installs it as the visible
    /// list. `None` when no subscription is active or the store side closed.
    ///
    /// Cancel safe, so it can sit in a `select!` arm.
    pub async fn next_change(&mut self) -> Option<Snapshot> {
        let sub = self.subscription.as_mut()?;
        let snapshot = sub.next().await?;
        debug!("Snapshot received: {} todos", snapshot.len());
        self.state = ListState::Ready(snapshot.clone());
        Some(snapshot)
    }

    pub fn state(&self) -> &ListState {
        &self.state
    }

    pub fn identity(&self) -> Option<&UserId> {
        self.identity.as_ref()
    }

    /// The currently visible todos; empty unless `Ready`.
    pub fn todos(&self) -> &[Todo] {
        match &self.state {
            ListState::Ready(todos) => todos,
            _ => &[],
        }
    }

    /// View teardown. Stops the subscription; dropping the synchronizer has
    /// the same effect through the handle's `Drop`.
    pub fn shutdown(&mut self) {
        if let Some(sub) = self.subscription.take() {
            sub.stop();
        }
    }
}
