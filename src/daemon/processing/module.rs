use anyhow::Result;

use crate::daemon::storage::entry_event::EntryEvent;

/// Represents an event processor. This should realistically be able to abstract over different
/// sinks: local storage, remote server saving.
pub trait EventProcessor {
    fn process_next(
        &mut self,
        message: EntryEvent,
    ) -> impl std::future::Future<Output = Result<()>>;

    fn finalize(&mut self) -> impl std::future::Future<Output = Result<()>>;
}
