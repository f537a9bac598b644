use std::time::Duration;

use anyhow::Result;
use chrono::{DateTime, Utc};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::{
    daemon::storage::{
        category::Category,
        entry_event::{EntryEvent, EntryOrigin},
    },
    prompt::{Notifier, PromptCollaborator, PromptOutcome},
    utils::{clock::Clock, time::quarter_key},
};

use super::aligner::next_boundary;

pub const PROMPT_MESSAGE: &str = "What were you doing the last 15 minutes?";

/// Margin subtracted from the time until the next boundary when computing a prompt deadline. An
/// answer arriving after the deadline is a skip, it can't bleed into the following interval.
const PROMPT_DEADLINE_MARGIN: Duration = Duration::from_secs(30);

pub struct PromptScheduler {
    next: mpsc::Sender<EntryEvent>,
    prompter: Box<dyn PromptCollaborator>,
    notifier: Box<dyn Notifier>,
    shutdown: CancellationToken,
    poll_interval: Duration,
    time_provider: Box<dyn Clock>,
    last_fired: Option<String>,
}

impl PromptScheduler {
    pub fn new(
        next: mpsc::Sender<EntryEvent>,
        prompter: Box<dyn PromptCollaborator>,
        notifier: Box<dyn Notifier>,
        shutdown: CancellationToken,
        poll_interval: Duration,
        time_provider: Box<dyn Clock>,
    ) -> Self {
        Self {
            next,
            prompter,
            notifier,
            shutdown,
            poll_interval,
            time_provider,
            last_fired: None,
        }
    }

    /// Executes the scheduler event loop.
    pub async fn run(mut self) -> Result<()> {
        loop {
            let (boundary, _) = next_boundary(&self.time_provider.time());

            // The wall clock is re-read after every sleep and sleeps are capped at the poll
            // interval, so suspend, drift or a DST shift can overshoot a boundary by at most
            // one step. Deduplication below handles the repeat wake-ups this produces.
            loop {
                let Ok(remaining) = (boundary - self.time_provider.time()).to_std() else {
                    break;
                };
                if remaining.is_zero() {
                    break;
                }
                tokio::select! {
                    // Cancelation stops the event loop. Dropping the sender channel in turn
                    // stops the processing module.
                    _ = self.shutdown.cancelled() => {
                        return Ok(())
                    }
                    _ = self.time_provider.sleep(remaining.min(self.poll_interval)) => ()
                }
            }

            // Racing the dispatch against cancellation closes an open prompt on shutdown
            // instead of waiting out its deadline.
            let shutdown = self.shutdown.clone();
            tokio::select! {
                _ = shutdown.cancelled() => {
                    return Ok(())
                }
                result = self.fire(boundary) => result?,
            }
        }
    }

    /// Dispatches the prompt for one boundary. At most one dispatch happens per quarter-hour no
    /// matter how often the surrounding loop reaches this within the same minute.
    async fn fire(&mut self, boundary: DateTime<Utc>) -> Result<()> {
        let key = quarter_key(boundary);
        if self.last_fired.as_deref() == Some(key.as_str()) {
            debug!("Boundary {key} already dispatched, skipping");
            return Ok(());
        }
        self.last_fired = Some(key.clone());

        if let Err(e) = self.notifier.notify(PROMPT_MESSAGE).await {
            warn!("Notification failed {e:?}");
        }

        let (_, until_next) = next_boundary(&self.time_provider.time());
        let deadline = until_next
            .to_std()
            .unwrap_or(Duration::ZERO)
            .saturating_sub(PROMPT_DEADLINE_MARGIN);

        match self
            .prompter
            .request_categorization(&Category::ALL, deadline)
            .await
        {
            Ok(PromptOutcome::Submitted { category, note }) => {
                let event = EntryEvent {
                    timestamp: boundary,
                    category,
                    note,
                    origin: EntryOrigin::Scheduled,
                };
                debug!("Sending message {:?}", event);
                self.next
                    .send(event)
                    .await
                    .inspect_err(|e| error!("Unexpected error during sending {e:?}"))?;
                info!("Recorded an entry for boundary {key}");
            }
            Ok(PromptOutcome::Skipped) => {
                debug!("Boundary {key} skipped");
            }
            Err(e) => {
                error!("Prompt dispatch failed {e:?}");
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use anyhow::{anyhow, Result};
    use chrono::{Local, TimeZone};
    use tokio::sync::mpsc;
    use tokio_util::sync::CancellationToken;

    use crate::{
        daemon::storage::{
            category::Category,
            entry_event::{EntryEvent, EntryOrigin},
        },
        prompt::{MockNotifier, MockPromptCollaborator, PromptOutcome},
        utils::clock::DefaultClock,
    };

    use super::PromptScheduler;

    fn scheduler(
        prompter: MockPromptCollaborator,
        notifier: MockNotifier,
        sender: mpsc::Sender<EntryEvent>,
    ) -> PromptScheduler {
        PromptScheduler::new(
            sender,
            Box::new(prompter),
            Box::new(notifier),
            CancellationToken::new(),
            Duration::from_secs(5),
            Box::new(DefaultClock),
        )
    }

    #[tokio::test]
    async fn test_boundary_fires_at_most_once() -> Result<()> {
        let mut prompter = MockPromptCollaborator::new();
        prompter
            .expect_request_categorization()
            .times(1)
            .returning(|_, _| {
                Ok(PromptOutcome::Submitted {
                    category: Category::Working,
                    note: String::new(),
                })
            });
        let mut notifier = MockNotifier::new();
        notifier.expect_notify().times(1).returning(|_| Ok(()));

        let (sender, mut receiver) = mpsc::channel::<EntryEvent>(10);
        let mut scheduler = scheduler(prompter, notifier, sender);

        let boundary = Local
            .with_ymd_and_hms(2024, 1, 1, 9, 15, 0)
            .single()
            .unwrap()
            .to_utc();

        // A poll loop waking several times within the boundary minute reaches fire repeatedly.
        scheduler.fire(boundary).await?;
        scheduler.fire(boundary).await?;
        scheduler.fire(boundary).await?;

        let event = receiver.try_recv()?;
        assert_eq!(event.timestamp, boundary);
        assert_eq!(event.origin, EntryOrigin::Scheduled);
        assert!(receiver.try_recv().is_err());
        Ok(())
    }

    #[tokio::test]
    async fn test_skip_produces_no_entry() -> Result<()> {
        let mut prompter = MockPromptCollaborator::new();
        prompter
            .expect_request_categorization()
            .times(1)
            .returning(|_, _| Ok(PromptOutcome::Skipped));
        let mut notifier = MockNotifier::new();
        notifier.expect_notify().times(1).returning(|_| Ok(()));

        let (sender, mut receiver) = mpsc::channel::<EntryEvent>(10);
        let mut scheduler = scheduler(prompter, notifier, sender);

        let boundary = Local
            .with_ymd_and_hms(2024, 1, 1, 10, 0, 0)
            .single()
            .unwrap()
            .to_utc();
        scheduler.fire(boundary).await?;

        assert!(receiver.try_recv().is_err());
        Ok(())
    }

    #[tokio::test]
    async fn test_notification_failure_does_not_block_prompt() -> Result<()> {
        let mut prompter = MockPromptCollaborator::new();
        prompter
            .expect_request_categorization()
            .times(1)
            .returning(|_, _| {
                Ok(PromptOutcome::Submitted {
                    category: Category::Chilling,
                    note: "tea".into(),
                })
            });
        let mut notifier = MockNotifier::new();
        notifier
            .expect_notify()
            .times(1)
            .returning(|_| Err(anyhow!("no notification daemon")));

        let (sender, mut receiver) = mpsc::channel::<EntryEvent>(10);
        let mut scheduler = scheduler(prompter, notifier, sender);

        let boundary = Local
            .with_ymd_and_hms(2024, 1, 1, 11, 45, 0)
            .single()
            .unwrap()
            .to_utc();
        scheduler.fire(boundary).await?;

        assert_eq!(receiver.try_recv()?.category, Category::Chilling);
        Ok(())
    }
}
