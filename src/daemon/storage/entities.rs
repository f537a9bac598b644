use chrono::DateTime;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;

use crate::utils::time::quarter_key;

use super::category::Category;

/// Every entry accounts for one quarter-hour interval.
pub const ENTRY_DURATION_MINUTES: u32 = 15;

/// The struct used for storing data on the disk. One entry describes what the user was doing in
/// the quarter-hour that ended at `timestamp`. Entries are immutable once written, the log only
/// ever grows.
#[derive(PartialEq, Eq, Debug, Serialize, Deserialize, Clone)]
pub struct EntryEntity {
    #[serde(with = "chrono::serde::ts_seconds")]
    pub timestamp: DateTime<Utc>,
    pub category: Category,
    #[serde(default)]
    pub note: String,
    #[serde(default = "default_duration")]
    pub duration_minutes: u32,
}

fn default_duration() -> u32 {
    ENTRY_DURATION_MINUTES
}

impl EntryEntity {
    pub fn new(timestamp: DateTime<Utc>, category: Category, note: String) -> Self {
        Self {
            timestamp,
            category,
            note,
            duration_minutes: ENTRY_DURATION_MINUTES,
        }
    }

    /// Dedup key of the quarter-hour this entry is attributed to.
    pub fn quarter_key(&self) -> String {
        quarter_key(self.timestamp)
    }
}
