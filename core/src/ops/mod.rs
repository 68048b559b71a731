mod report;
mod sync;

pub use report::{render, SyncOutcome, SyncReport, SyncStatus};
pub use sync::{drive, sync_repos, GitWorker, Worker};
