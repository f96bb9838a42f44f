//! Background workers.

pub mod compaction_worker;

pub use compaction_worker::{CompactionWorker, WorkerHandle};
