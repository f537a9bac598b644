use std::{
    future::Future,
    io::ErrorKind,
    ops::Deref,
    path::{Path, PathBuf},
    sync::Arc,
};

use chrono::{DateTime, NaiveDate, Utc};
use fs4::tokio::AsyncFileExt;
use futures::{future, stream, Stream, StreamExt};
use tokio::{
    fs::File,
    io::{AsyncBufReadExt, AsyncSeekExt, AsyncWriteExt, BufReader},
};
use tracing::{debug, warn};

use crate::utils::time::{date_to_record_name, local_date};

use super::{entities::EntryEntity, error::StoreError};

/// Interface for abstracting storage of entries.
pub trait EntryStorage {
    type DayFile: DayFileHandle;

    /// Opens or creates the day file new entries get appended to. Data is partitioned into a
    /// file per local calendar day so that date queries stay cheap.
    fn create_or_append_day(
        &self,
        date: NaiveDate,
    ) -> impl Future<Output = Result<Self::DayFile, StoreError>>;

    /// Reads back everything recorded for a day, ordered by timestamp.
    fn load_day(&self, date: NaiveDate)
    -> impl Future<Output = Result<DayLoad, StoreError>> + Send;
}

impl<T: Deref> EntryStorage for T
where
    T::Target: EntryStorage,
{
    type DayFile = <T::Target as EntryStorage>::DayFile;

    fn create_or_append_day(
        &self,
        date: NaiveDate,
    ) -> impl Future<Output = Result<Self::DayFile, StoreError>> {
        self.deref().create_or_append_day(date)
    }

    fn load_day(
        &self,
        date: NaiveDate,
    ) -> impl Future<Output = Result<DayLoad, StoreError>> + Send {
        self.deref().load_day(date)
    }
}

pub trait DayFileHandle {
    /// Persists one entry. The write is flushed to disk before this returns, a crash right
    /// after a successful append never loses the entry.
    fn append(&mut self, entry: &EntryEntity) -> impl Future<Output = Result<(), StoreError>>;

    fn get_date(&self) -> NaiveDate;
}

/// Result of reading a day file. Lines that couldn't be parsed (usually a tail torn by a
/// shutdown) are counted, not silently dropped; the file itself is never repaired in place.
#[derive(Debug, Default)]
pub struct DayLoad {
    pub entries: Vec<EntryEntity>,
    pub corrupt_lines: usize,
}

/// The main realization of [EntryStorage].
pub struct EntryStorageImpl {
    entry_dir: PathBuf,
}

impl EntryStorageImpl {
    pub fn new(entry_dir: PathBuf) -> Result<Self, StoreError> {
        std::fs::create_dir_all(&entry_dir)?;

        Ok(Self { entry_dir })
    }

    fn day_path(&self, date: NaiveDate) -> PathBuf {
        self.entry_dir.join(date_to_record_name(date))
    }

    async fn load_inner(&self, path: &Path) -> Result<DayLoad, StoreError> {
        debug!("Extracting {path:?}");
        let file = match File::open(path).await {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(DayLoad::default()),
            Err(e) => return Err(e.into()),
        };
        file.lock_shared()?;

        // `Split` (unlike `Lines`) exposes no accessor to recover the inner file, so keep a
        // cloned handle to release the shared lock after reading.
        let lock_handle = file.try_clone().await?;
        let mut segments = BufReader::new(file).split(b'\n');
        let mut entries = Vec::new();
        let mut corrupt_lines = 0usize;
        let mut read_error = None;
        loop {
            match segments.next_segment().await {
                Ok(Some(segment)) => {
                    if segment.iter().all(u8::is_ascii_whitespace) {
                        continue;
                    }
                    match serde_json::from_slice::<EntryEntity>(&segment) {
                        Ok(v) => entries.push(v),
                        Err(e) => {
                            // Might happen after shutdowns cut a write short.
                            warn!(
                                "During parsing in path {:?} found illegal entry line: {e}",
                                path
                            );
                            corrupt_lines += 1;
                        }
                    }
                }
                Ok(None) => break,
                Err(e) => {
                    read_error = Some(e);
                    break;
                }
            }
        }

        drop(segments);
        lock_handle.unlock_async().await?;

        if let Some(e) = read_error {
            return Err(e.into());
        }
        if entries.is_empty() && corrupt_lines > 0 {
            return Err(StoreError::CorruptData {
                path: path.to_owned(),
            });
        }

        entries.sort_by_key(|entry| entry.timestamp);
        Ok(DayLoad {
            entries,
            corrupt_lines,
        })
    }
}

impl EntryStorage for EntryStorageImpl {
    type DayFile = EntryDayFile;

    async fn create_or_append_day(&self, date: NaiveDate) -> Result<Self::DayFile, StoreError> {
        let file = File::options()
            .write(true)
            .create(true)
            .read(true)
            .truncate(false)
            .open(self.day_path(date))
            .await?;

        Ok(EntryDayFile { file, date })
    }

    async fn load_day(&self, date: NaiveDate) -> Result<DayLoad, StoreError> {
        self.load_inner(&self.day_path(date)).await
    }
}

pub struct EntryDayFile {
    file: File,
    date: NaiveDate,
}

impl DayFileHandle for EntryDayFile {
    async fn append(&mut self, entry: &EntryEntity) -> Result<(), StoreError> {
        let mut line = serde_json::to_vec(entry)?;
        line.push(b'\n');

        // Semi-safe acquire-release for a file
        self.file.lock_exclusive()?;
        let result = Self::append_with_file(&mut self.file, &line).await;
        self.file.unlock_async().await?;
        result
    }

    fn get_date(&self) -> NaiveDate {
        self.date
    }
}

impl EntryDayFile {
    async fn append_with_file(file: &mut File, line: &[u8]) -> Result<(), StoreError> {
        // Another writer may have extended the file since this handle last touched it.
        file.seek(std::io::SeekFrom::End(0)).await?;
        file.write_all(line).await?;
        file.flush().await?;
        file.sync_all().await?;
        Ok(())
    }
}

/// Extracts entries with timestamps in `[start, end)`, ordered by timestamp. To do it in an
/// efficient manner streams are used.
pub fn query_range(
    storage: impl EntryStorage + Send + Sync + 'static,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
) -> impl Stream<Item = Result<EntryEntity, StoreError>> {
    let storage = Arc::new(storage);

    let date_iteration = date_range(local_date(start), local_date(end));

    let days = date_iteration
        .map(move |day| {
            let storage = storage.clone();
            async move { (day, storage.load_day(day).await) }
        })
        .buffered(4);

    days.flat_map(|(day, data)| match data {
        Ok(data) => stream::iter(data.entries).map(Ok).boxed(),
        Err(e) => {
            warn!("Failed to read day file {day}: {e}");
            stream::once(future::ready(Err(e))).boxed()
        }
    })
    .filter(move |v| {
        future::ready(match v {
            Ok(entry) => entry.timestamp >= start && entry.timestamp < end,
            Err(_) => true,
        })
    })
}

/// Returns a stream of dates between start (inclusive) and end (inclusive).
fn date_range(start: NaiveDate, end: NaiveDate) -> impl Stream<Item = NaiveDate> {
    stream::unfold((start, end), |(mut current, end)| {
        future::ready({
            if current <= end {
                let last_current = current;
                current = current.succ_opt().expect("End of time should never happen");
                Some((last_current, (current, end)))
            } else {
                None
            }
        })
    })
}
