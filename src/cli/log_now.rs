use std::time::Duration;

use anyhow::Result;
use chrono::{Local, Utc};
use clap::Parser;

use crate::{
    daemon::storage::{
        category::Category,
        entities::EntryEntity,
        entry_storage::{DayFileHandle, EntryStorage, EntryStorageImpl},
    },
    prompt::{terminal::TerminalPrompt, PromptCollaborator, PromptOutcome},
    utils::{dir::create_application_default_path, time::local_date},
};

/// How long an interactive `log` invocation waits for input before giving up.
const MANUAL_PROMPT_DEADLINE: Duration = Duration::from_secs(120);

#[derive(Debug, Parser)]
pub struct LogCommand {
    #[arg(
        long,
        short,
        value_enum,
        help = "Category to record. Prompts interactively when omitted"
    )]
    category: Option<Category>,
    #[arg(long, short, help = "Free-form note attached to the entry")]
    note: Option<String>,
}

/// Records an entry right now, outside the scheduled prompts. Writes go through the same locked
/// day files the daemon uses, so both can run at the same time.
pub async fn process_log_command(LogCommand { category, note }: LogCommand) -> Result<()> {
    let (category, note) = match category {
        Some(category) => (category, note.unwrap_or_default()),
        None => {
            match TerminalPrompt
                .request_categorization(&Category::ALL, MANUAL_PROMPT_DEADLINE)
                .await?
            {
                PromptOutcome::Submitted {
                    category,
                    note: typed,
                } => (category, note.unwrap_or(typed)),
                PromptOutcome::Skipped => {
                    println!("Nothing recorded");
                    return Ok(());
                }
            }
        }
    };

    let storage = EntryStorageImpl::new(create_application_default_path()?.join("entries"))?;
    let entry = EntryEntity::new(Utc::now(), category, note);
    let mut day = storage
        .create_or_append_day(local_date(entry.timestamp))
        .await?;
    day.append(&entry).await?;

    println!(
        "Recorded {} at {}",
        entry.category,
        entry.timestamp.with_timezone(&Local).format("%H:%M")
    );
    Ok(())
}
