use anyhow::Result;
use chrono::NaiveDate;
use tracing::{debug, warn};

use crate::{
    daemon::storage::{
        entities::EntryEntity,
        entry_event::{EntryEvent, EntryOrigin},
        entry_storage::{DayFileHandle, EntryStorage},
        error::StoreError,
    },
    utils::time::{local_date, quarter_key},
};

use super::module::EventProcessor;

/// Bridges [ProcessingModule](super::ProcessingModule) and [EntryStorage]. Scheduled
/// submissions pass through a dedup guard first: the day file is consulted so that retries and
/// concurrent writers can't attribute a second entry to a quarter-hour that already has one.
pub struct LocalSaver<S: EntryStorage> {
    entry_storage: S,
    current_handle: Option<S::DayFile>,
}

impl<S: EntryStorage> LocalSaver<S> {
    pub fn new(entry_storage: S) -> Self {
        Self {
            entry_storage,
            current_handle: None,
        }
    }

    async fn day_handle(&mut self, date: NaiveDate) -> Result<&mut S::DayFile, StoreError> {
        match self.current_handle.take() {
            Some(handle) if handle.get_date() == date => Ok(self.current_handle.insert(handle)),
            _ => {
                let handle = self.entry_storage.create_or_append_day(date).await?;
                Ok(self.current_handle.insert(handle))
            }
        }
    }

    async fn quarter_already_recorded(
        &self,
        date: NaiveDate,
        key: &str,
    ) -> Result<bool, StoreError> {
        let day = match self.entry_storage.load_day(date).await {
            Ok(day) => day,
            Err(StoreError::CorruptData { path }) => {
                warn!("Entry log {path:?} is unreadable, recording without a dedup check");
                return Ok(false);
            }
            Err(e) => return Err(e),
        };
        Ok(day.entries.iter().any(|entry| entry.quarter_key() == key))
    }
}

impl<S: EntryStorage> EventProcessor for LocalSaver<S> {
    async fn process_next(&mut self, event: EntryEvent) -> Result<()> {
        let date = local_date(event.timestamp);

        if event.origin == EntryOrigin::Scheduled {
            let key = quarter_key(event.timestamp);
            if self.quarter_already_recorded(date, &key).await? {
                debug!("Quarter {key} already has an entry, dropping duplicate");
                return Ok(());
            }
        }

        let entry = EntryEntity::new(event.timestamp, event.category, event.note);
        self.day_handle(date).await?.append(&entry).await?;
        Ok(())
    }

    async fn finalize(&mut self) -> Result<()> {
        Ok(())
    }
}
