//! Contracts for the interaction surface. The daemon doesn't dictate how a prompt or a
//! notification is rendered, only that a categorization request eventually resolves to a
//! category from the fixed set or an explicit skip.

pub mod terminal;

use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;

use crate::daemon::storage::category::Category;

/// Resolution of one categorization request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PromptOutcome {
    Submitted { category: Category, note: String },
    Skipped,
}

/// Contract a prompt frontend must implement. `deadline` bounds how long the request may stay
/// open; a request that outlives it resolves to [PromptOutcome::Skipped] so a stale answer can
/// never be attributed to a later interval.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait PromptCollaborator: Send + Sync {
    async fn request_categorization(
        &self,
        categories: &[Category],
        deadline: Duration,
    ) -> Result<PromptOutcome>;
}

/// Fire-and-forget notification shown right before a prompt. The scheduler logs failures and
/// moves on, a broken notifier must never stall the prompt loop.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, message: &str) -> Result<()>;
}
