use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::info;

use crate::daemon::storage::{category::Category, error::StoreError};

use super::{Notifier, PromptCollaborator, PromptOutcome};

/// Prompt frontend for running the daemon in a foreground console. A detached daemon has no
/// stdin, so its requests simply time out into skips until a real frontend is attached.
pub struct TerminalPrompt;

#[async_trait]
impl PromptCollaborator for TerminalPrompt {
    async fn request_categorization(
        &self,
        categories: &[Category],
        deadline: Duration,
    ) -> Result<PromptOutcome> {
        println!("What have you been doing for the last 15 minutes?");
        for (index, category) in categories.iter().enumerate() {
            println!("  {}. {category}", index + 1);
        }
        println!("Reply with a number or a name, optionally followed by a note. Empty input skips.");

        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        match tokio::time::timeout(deadline, lines.next_line()).await {
            Ok(Ok(Some(line))) => Ok(parse_submission(&line, categories)?),
            Ok(Ok(None)) => Ok(PromptOutcome::Skipped),
            Ok(Err(e)) => Err(e.into()),
            Err(_) => {
                println!("No answer before the next boundary, skipping this interval.");
                Ok(PromptOutcome::Skipped)
            }
        }
    }
}

/// Turns one reply line into an outcome. The reply is either a 1-based index into the offered
/// categories or a category name, with everything after the first whitespace kept as the note.
pub fn parse_submission(
    line: &str,
    categories: &[Category],
) -> Result<PromptOutcome, StoreError> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(PromptOutcome::Skipped);
    }

    let (head, note) = match line.split_once(char::is_whitespace) {
        Some((head, note)) => (head, note.trim().to_string()),
        None => (line, String::new()),
    };

    let category = match head.parse::<usize>() {
        Ok(index) => categories
            .get(index.wrapping_sub(1))
            .copied()
            .ok_or_else(|| StoreError::Validation(head.to_string()))?,
        Err(_) => head.parse::<Category>()?,
    };

    Ok(PromptOutcome::Submitted { category, note })
}

/// Notifier that records prompt announcements in the daemon log. Desktop frontends substitute
/// their own implementation.
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn notify(&self, message: &str) -> Result<()> {
        info!("{message}");
        Ok(())
    }
}
