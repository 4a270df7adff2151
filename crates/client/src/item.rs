use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use domain::{Todo, TodoId};
use infrastructure::{DocumentStore, StoreError};
use tracing::{debug, error, info};

use crate::notify::{Notice, Notifier};

/// The user-facing "are you sure" step that guards a hard delete. Resolved
/// by the embedding view; the mutator only consults the verdict.
pub trait DeleteConfirmation {
    fn confirm(&self, todo: &Todo) -> bool;
}

/// A confirmation already resolved by the caller.
pub struct Decision(pub bool);

impl DeleteConfirmation for Decision {
    fn confirm(&self, _todo: &Todo) -> bool {
        self.0
    }
}

/// Toggle and delete: direct, unvalidated writes keyed by id, each guarded
/// only by a per-item busy flag for the duration of its request.
pub struct ItemMutator {
    store: Arc<dyn DocumentStore>,
    notifier: Arc<dyn Notifier>,
    busy: Mutex<HashSet<TodoId>>,
}

impl ItemMutator {
    pub fn new(store: Arc<dyn DocumentStore>, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            store,
            notifier,
            busy: Mutex::new(HashSet::new()),
        }
    }

    pub fn is_busy(&self, id: &TodoId) -> bool {
        self.busy.lock().unwrap().contains(id)
    }

    /// Flips the completion flag. Ignored while the item is busy; on
    /// failure the flag clears and the item stays interactive.
    pub async fn toggle(&self, todo: &Todo) -> Result<(), StoreError> {
        if !self.mark_busy(&todo.id) {
            debug!("Ignoring toggle for busy todo {}", todo.id);
            return Ok(());
        }

        let target = !todo.completed;
        let result = self.store.set_completed(&todo.id, target).await;
        self.clear_busy(&todo.id);

        match &result {
            Ok(()) => {
                let state = if target { "completed" } else { "incomplete" };
                self.notifier
                    .notify(Notice::info("Updated!", format!("Todo marked as {state}")));
            }
            Err(e) => {
                error!("Failed to update todo {}: {e}", todo.id);
                self.notifier
                    .notify(Notice::destructive("Error", "Failed to update todo"));
            }
        }
        result
    }

    /// Hard delete behind the confirmation step. Returns whether a delete
    /// was actually performed. On success the busy flag stays set until the
    /// item disappears from a later snapshot (see [`ItemMutator::retain_busy`]);
    /// on failure it clears.
    pub async fn delete(
        &self,
        todo: &Todo,
        confirmation: &dyn DeleteConfirmation,
    ) -> Result<bool, StoreError> {
        if !confirmation.confirm(todo) {
            debug!("Delete of todo {} declined", todo.id);
            return Ok(false);
        }
        if !self.mark_busy(&todo.id) {
            debug!("Ignoring delete for busy todo {}", todo.id);
            return Ok(false);
        }

        match self.store.delete_todo(&todo.id).await {
            Ok(()) => {
                info!("Todo {} deleted", todo.id);
                self.notifier
                    .notify(Notice::info("Deleted!", "Todo removed successfully"));
                Ok(true)
            }
            Err(e) => {
                self.clear_busy(&todo.id);
                error!("Failed to delete todo {}: {e}", todo.id);
                self.notifier
                    .notify(Notice::destructive("Error", "Failed to delete todo"));
                Err(e)
            }
        }
    }

    /// Called by the view on every snapshot: a busy id that is no longer
    /// present has finished deleting, which implicitly ends its busy state.
    pub fn retain_busy(&self, snapshot: &[Todo]) {
        self.busy
            .lock()
            .unwrap()
            .retain(|id| snapshot.iter().any(|t| &t.id == id));
    }

    fn mark_busy(&self, id: &TodoId) -> bool {
        self.busy.lock().unwrap().insert(id.clone())
    }

    fn clear_busy(&self, id: &TodoId) {
        self.busy.lock().unwrap().remove(id);
    }
}
