//!  Storage is organized through [entry_storage::EntryStorageImpl].
//!  The basic idea is:
//!   - There is a directory with all the day files.
//!   - Each file holds the entries of one local calendar day, one JSON object per line.
//!   - Appends are flushed to disk before they report success, so a crash can't lose an
//!     acknowledged entry.

pub mod category;
pub mod entities;
pub mod entry_event;
pub mod entry_storage;
pub mod error;
