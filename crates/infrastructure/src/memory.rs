use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::Utc;
use domain::{NewTodo, Todo, TodoId, UserId};
use tokio::sync::mpsc;
use tracing::debug;

use crate::store::{DocumentStore, StoreError};
use crate::subscription::{Snapshot, Subscription};

/// In-process document store. Backs the test suites and the CLI with the
/// same contract a remote store provides: assigned ids, store-clock
/// timestamps, and push subscriptions that replay the full per-user result
/// set on every change.
#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Arc<Mutex<Inner>>,
}

#[derive(Default)]
struct Inner {
    /// Insertion order; snapshots are sorted per query on the way out.
    todos: Vec<Todo>,
    watchers: Vec<Watcher>,
    next_watcher: u64,
}

struct Watcher {
    id: u64,
    user_id: UserId,
    tx: mpsc::UnboundedSender<Snapshot>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live subscriptions, across all users.
    pub fn subscriber_count(&self) -> usize {
        self.inner.lock().unwrap().watchers.len()
    }
}

/// Ordered by `created_at` descending; inserts within the same instant
/// come out newest-first (reverse insertion order plus a stable sort).
fn snapshot_for(inner: &Inner, user: &UserId) -> Snapshot {
    let mut todos: Vec<Todo> = inner
        .todos
        .iter()
        .rev()
        .filter(|t| &t.user_id == user)
        .cloned()
        .collect();
    todos.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    todos
}

/// Pushes a fresh snapshot to every watcher of `user`, dropping watchers
/// whose receiving side has gone away.
fn push_snapshots(inner: &mut Inner, user: &UserId) {
    let snapshot = snapshot_for(inner, user);
    inner.watchers.retain(|w| {
        if &w.user_id != user {
            return true;
        }
        w.tx.send(snapshot.clone()).is_ok()
    });
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn insert_todo(&self, new: NewTodo) -> Result<Todo, StoreError> {
        let mut inner = self.inner.lock().unwrap();
        let now = Utc::now();
        let todo = Todo {
            id: TodoId::new(),
            user_id: new.user_id,
            title: new.title,
            completed: false,
            created_at: now,
            updated_at: now,
        };
        debug!("Inserting todo {} for user {}", todo.id, todo.user_id);
        inner.todos.push(todo.clone());
        push_snapshots(&mut inner, &todo.user_id);
        Ok(todo)
    }

    async fn set_completed(&self, id: &TodoId, completed: bool) -> Result<(), StoreError> {
        let mut inner = self.inner.lock().unwrap();
        let Some(todo) = inner.todos.iter_mut().find(|t| &t.id == id) else {
            debug!("Ignoring update for missing todo {id}");
            return Ok(());
        };
        todo.completed = completed;
        todo.updated_at = Utc::now();
        let user = todo.user_id.clone();
        push_snapshots(&mut inner, &user);
        Ok(())
    }

    async fn delete_todo(&self, id: &TodoId) -> Result<(), StoreError> {
        let mut inner = self.inner.lock().unwrap();
        let Some(pos) = inner.todos.iter().position(|t| &t.id == id) else {
            debug!("Ignoring delete for missing todo {id}");
            return Ok(());
        };
        let removed = inner.todos.remove(pos);
        push_snapshots(&mut inner, &removed.user_id);
        Ok(())
    }

    async fn has_active_with_title(
        &self,
        user: &UserId,
        title: &str,
    ) -> Result<bool, StoreError> {
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .todos
            .iter()
            .any(|t| &t.user_id == user && t.title == title && !t.completed))
    }

    async fn subscribe(&self, user: &UserId) -> Result<Subscription, StoreError> {
        let mut inner = self.inner.lock().unwrap();
        let watcher_id = inner.next_watcher;
        inner.next_watcher += 1;

        let (tx, rx) = mpsc::unbounded_channel();
        // The current result set is the first snapshot.
        let _ = tx.send(snapshot_for(&inner, user));
        inner.watchers.push(Watcher {
            id: watcher_id,
            user_id: user.clone(),
            tx,
        });
        debug!("Subscription {watcher_id} opened for user {user}");

        let store = Arc::clone(&self.inner);
        Ok(Subscription::new(rx, move || {
            let mut inner = store.lock().unwrap();
            inner.watchers.retain(|w| w.id != watcher_id);
            debug!("Subscription {watcher_id} stopped");
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_todo(user: &UserId, title: &str) -> NewTodo {
        NewTodo {
            user_id: user.clone(),
            title: title.to_string(),
        }
    }

    #[tokio::test]
    async fn insert_assigns_id_timestamps_and_starts_uncompleted() {
        let store = MemoryStore::new();
        let user = UserId::new();

        let a = store.insert_todo(new_todo(&user, "First")).await.unwrap();
        let b = store.insert_todo(new_todo(&user, "Second")).await.unwrap();

        assert_ne!(a.id, b.id);
        assert!(!a.completed);
        assert_eq!(a.created_at, a.updated_at);
        assert_eq!(a.user_id, user);
    }

    #[tokio::test]
    async fn snapshots_are_created_at_descending_newest_first_on_ties() {
        let store = MemoryStore::new();
        let user = UserId::new();

        store.insert_todo(new_todo(&user, "First")).await.unwrap();
        store.insert_todo(new_todo(&user, "Second")).await.unwrap();
        store.insert_todo(new_todo(&user, "Third")).await.unwrap();

        let mut sub = store.subscribe(&user).await.unwrap();
        let snapshot = sub.next().await.unwrap();
        let titles: Vec<&str> = snapshot.iter().map(|t| t.title.as_str()).collect();
        assert_eq!(titles, ["Third", "Second", "First"]);
        for pair in snapshot.windows(2) {
            assert!(pair[0].created_at >= pair[1].created_at);
        }
    }

    #[tokio::test]
    async fn subscribe_delivers_the_current_result_set_immediately() {
        let store = MemoryStore::new();
        let user = UserId::new();
        store.insert_todo(new_todo(&user, "Existing")).await.unwrap();

        let mut sub = store.subscribe(&user).await.unwrap();
        let snapshot = sub.next().await.unwrap();
        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot[0].title, "Existing");
    }

    #[tokio::test]
    async fn subscriptions_only_see_their_own_user() {
        let store = MemoryStore::new();
        let alice = UserId::new();
        let bob = UserId::new();

        let mut sub = store.subscribe(&alice).await.unwrap();
        assert!(sub.next().await.unwrap().is_empty());

        store.insert_todo(new_todo(&bob, "Bob's")).await.unwrap();
        store.insert_todo(new_todo(&alice, "Alice's")).await.unwrap();

        // Only Alice's insert produced a push for this subscription.
        let snapshot = sub.next().await.unwrap();
        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot[0].title, "Alice's");
    }

    #[tokio::test]
    async fn set_completed_flips_flag_and_refreshes_updated_at() {
        let store = MemoryStore::new();
        let user = UserId::new();
        let todo = store.insert_todo(new_todo(&user, "Task")).await.unwrap();

        store.set_completed(&todo.id, true).await.unwrap();

        let mut sub = store.subscribe(&user).await.unwrap();
        let snapshot = sub.next().await.unwrap();
        assert!(snapshot[0].completed);
        assert!(snapshot[0].updated_at >= snapshot[0].created_at);
        assert_eq!(snapshot[0].title, "Task");
    }

    #[tokio::test]
    async fn mutating_a_missing_id_is_a_no_op() {
        let store = MemoryStore::new();
        let ghost = TodoId::new();
        store.set_completed(&ghost, true).await.unwrap();
        store.delete_todo(&ghost).await.unwrap();
    }

    #[tokio::test]
    async fn duplicate_query_matches_active_titles_only() {
        let store = MemoryStore::new();
        let user = UserId::new();
        let todo = store.insert_todo(new_todo(&user, "Buy milk")).await.unwrap();

        assert!(store.has_active_with_title(&user, "Buy milk").await.unwrap());
        assert!(!store.has_active_with_title(&user, "Buy bread").await.unwrap());
        assert!(!store
            .has_active_with_title(&UserId::new(), "Buy milk")
            .await
            .unwrap());

        store.set_completed(&todo.id, true).await.unwrap();
        assert!(!store.has_active_with_title(&user, "Buy milk").await.unwrap());
    }

    #[tokio::test]
    async fn stop_deregisters_the_watcher_eagerly() {
        let store = MemoryStore::new();
        let user = UserId::new();

        let sub = store.subscribe(&user).await.unwrap();
        assert_eq!(store.subscriber_count(), 1);

        sub.stop();
        assert_eq!(store.subscriber_count(), 0);
    }

    #[tokio::test]
    async fn dropping_the_handle_also_deregisters() {
        let store = MemoryStore::new();
        let user = UserId::new();

        let sub = store.subscribe(&user).await.unwrap();
        drop(sub);
        assert_eq!(store.subscriber_count(), 0);
    }
}
