//! Quarter-hour scheduling. [aligner] computes boundary instants, [scheduler] drives the prompt
//! loop that wakes on them.

pub mod aligner;
pub mod scheduler;
