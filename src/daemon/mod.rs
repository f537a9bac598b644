use std::{path::PathBuf, time::Duration};

use anyhow::Result;
use chrono::{DateTime, Utc};
use processing::{local_save::LocalSaver, ProcessingModule};
use scheduling::scheduler::PromptScheduler;
use storage::{
    entry_event::EntryEvent,
    entry_storage::{EntryStorage, EntryStorageImpl},
};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use crate::{
    prompt::{
        terminal::{LogNotifier, TerminalPrompt},
        Notifier, PromptCollaborator,
    },
    utils::{
        clock::{Clock, DefaultClock},
        time::local_date,
    },
};

pub mod args;
pub mod processing;
pub mod scheduling;
pub mod shutdown;
pub mod storage;

const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(5);

/// Represents the starting point for the daemon
pub async fn start_daemon(dir: PathBuf) -> Result<()> {
    std::env::set_current_dir("/")?;

    let (sender, receiver) = mpsc::channel::<EntryEvent>(10);

    let shutdown_token = CancellationToken::new();

    let scheduler = create_scheduler(
        sender,
        Box::new(TerminalPrompt),
        Box::new(LogNotifier),
        &shutdown_token,
        DefaultClock,
    );

    let storage = EntryStorageImpl::new(dir.join("entries"))?;
    report_existing_log(&storage, DefaultClock.time()).await;
    let processor = create_processor(storage, receiver);

    let (_, scheduling_result, processing_result) = tokio::join!(
        shutdown::detect_shutdown(shutdown_token),
        scheduler.run(),
        processor.run(),
    );

    if let Err(scheduling_result) = scheduling_result {
        error!("Scheduling module got an error {:?}", scheduling_result);
    }

    if let Err(processing_result) = processing_result {
        error!("Processing module got an error {:?}", processing_result);
    }

    Ok(())
}

fn create_scheduler(
    sender: mpsc::Sender<EntryEvent>,
    prompter: Box<dyn PromptCollaborator>,
    notifier: Box<dyn Notifier>,
    shutdown_token: &CancellationToken,
    clock: impl Clock,
) -> PromptScheduler {
    PromptScheduler::new(
        sender,
        prompter,
        notifier,
        shutdown_token.clone(),
        DEFAULT_POLL_INTERVAL,
        Box::new(clock),
    )
}

fn create_processor(
    storage: EntryStorageImpl,
    receiver: mpsc::Receiver<EntryEvent>,
) -> ProcessingModule<LocalSaver<EntryStorageImpl>> {
    ProcessingModule::new(receiver, LocalSaver::new(storage))
}

/// Surfaces the state of today's log once at startup. A day file that can't be read leaves the
/// daemon running with an empty view of the day; the file itself stays on disk for inspection.
async fn report_existing_log(storage: &EntryStorageImpl, now: DateTime<Utc>) {
    match storage.load_day(local_date(now)).await {
        Ok(day) => info!("Found {} existing entries for today", day.entries.len()),
        Err(e) => warn!("Continuing with an empty view of today: {e}"),
    }
}
