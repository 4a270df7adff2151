use std::sync::Arc;
use std::time::Duration;

use domain::{check_title, NewTodo, Todo, UserId, ValidationError};
use infrastructure::{DocumentStore, StoreError};
use thiserror::Error;
use tokio::time::Instant;
use tracing::{error, info, warn};

use crate::notify::{Notice, Notifier};

/// Minimum interval between accepted submissions.
pub const DEFAULT_RATE_LIMIT: Duration = Duration::from_millis(1000);

#[derive(Debug, Clone, Error)]
pub enum SubmitError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

#[derive(Debug)]
pub enum SubmitOutcome {
    /// Validation passed and the todo was written.
    Created(Todo),
    /// A validation rule rejected the submission; the user resubmits.
    Rejected(ValidationError),
    /// The duplicate query or the write failed at the store.
    Failed(StoreError),
    /// No user present or blank input. Silent no-op, not an error.
    Skipped,
}

/// Guards todo creation: length bounds, a per-instance rate limit, and a
/// duplicate check against the user's uncompleted todos. The rate-limit
/// state is process-local and never shared across instances.
pub struct TodoSubmitter {
    store: Arc<dyn DocumentStore>,
    notifier: Arc<dyn Notifier>,
    rate_limit: Duration,
    last_submission: Option<Instant>,
}

impl TodoSubmitter {
    pub fn new(store: Arc<dyn DocumentStore>, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            store,
            notifier,
            rate_limit: DEFAULT_RATE_LIMIT,
            last_submission: None,
        }
    }

    pub fn with_rate_limit(mut self, rate_limit: Duration) -> Self {
        self.rate_limit = rate_limit;
        self
    }

    /// Runs the validation checks in order; the first failure wins.
    /// Returns the trimmed title that the caller writes.
    pub async fn validate(&self, user: &UserId, raw: &str) -> Result<String, SubmitError> {
        let trimmed = check_title(raw)?;

        if let Some(last) = self.last_submission {
            if last.elapsed() < self.rate_limit {
                return Err(ValidationError::RateLimited.into());
            }
        }

        if self.store.has_active_with_title(user, trimmed).await? {
            return Err(ValidationError::DuplicateActive.into());
        }

        Ok(trimmed.to_string())
    }

    /// Validates and writes a new todo. Every failure is absorbed here:
    /// logged, surfaced as a notification, and reported in the outcome.
    pub async fn submit(&mut self, user: Option<&UserId>, raw: &str) -> SubmitOutcome {
        let Some(user) = user else {
            return SubmitOutcome::Skipped;
        };
        if raw.trim().is_empty() {
            return SubmitOutcome::Skipped;
        }

        let title = match self.validate(user, raw).await {
            Ok(title) => title,
            Err(SubmitError::Validation(e)) => {
                warn!("Rejected todo submission for user {user}: {e}");
                self.notifier.notify(Notice::destructive("Error", e.to_string()));
                return SubmitOutcome::Rejected(e);
            }
            Err(SubmitError::Store(e)) => {
                error!("Duplicate check failed for user {user}: {e}");
                self.notifier
                    .notify(Notice::destructive("Error", "Failed to add todo"));
                return SubmitOutcome::Failed(e);
            }
        };

        let new = NewTodo {
            user_id: user.clone(),
            title,
        };
        match self.store.insert_todo(new).await {
            Ok(todo) => {
                self.last_submission = Some(Instant::now());
                info!("Todo {} created for user {user}", todo.id);
                self.notifier
                    .notify(Notice::info("Success!", "Todo added successfully"));
                SubmitOutcome::Created(todo)
            }
            Err(e) => {
                error!("Failed to insert todo for user {user}: {e}");
                self.notifier
                    .notify(Notice::destructive("Error", "Failed to add todo"));
                SubmitOutcome::Failed(e)
            }
        }
    }
}
