use chrono::{DateTime, Utc};

use super::category::Category;

/// Where an entry submission came from. Scheduled submissions are deduplicated per quarter-hour,
/// manual ones are recorded as-is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryOrigin {
    Scheduled,
    Manual,
}

/// Represents a categorization submitted for a quarter-hour, on its way to storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryEvent {
    pub timestamp: DateTime<Utc>,
    pub category: Category,
    pub note: String,
    pub origin: EntryOrigin,
}
