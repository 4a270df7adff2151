use async_trait::async_trait;
use domain::{NewTodo, Todo, TodoId, UserId};
use thiserror::Error;

use crate::subscription::Subscription;

/// Unexpected transport or permission failures from the document store.
/// These are surfaced to the user generically and never propagate past the
/// operation that hit them.
#[derive(Debug, Clone, Error)]
pub enum StoreError {
    #[error("Store backend error: {0}")]
    Backend(String),

    #[error("Permission denied: {0}")]
    PermissionDenied(String),
}

/// The document store the client delegates all durability and querying to.
/// Injected explicitly wherever it is needed; never a process-wide global.
///
/// Mutating a missing id is a no-op, not an error, so independent mutators
/// may race a delete without failing.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Inserts a todo. The store assigns the id and both timestamps and
    /// starts the todo uncompleted.
    async fn insert_todo(&self, new: NewTodo) -> Result<Todo, StoreError>;

    /// Sets the completion flag and refreshes `updated_at` with the store
    /// clock.
    async fn set_completed(&self, id: &TodoId, completed: bool) -> Result<(), StoreError>;

    /// Hard delete. No history is retained.
    async fn delete_todo(&self, id: &TodoId) -> Result<(), StoreError>;

    /// One-shot duplicate query: does this user hold an uncompleted todo
    /// with exactly this (trimmed) title?
    async fn has_active_with_title(&self, user: &UserId, title: &str)
        -> Result<bool, StoreError>;

    /// Standing push subscription over one user's todos, ordered by
    /// `created_at` descending. The current result set is delivered
    /// immediately as the first snapshot; every later mutation affecting
    /// the user pushes a fresh full snapshot.
    async fn subscribe(&self, user: &UserId) -> Result<Subscription, StoreError>;
}
