//! Shared utilities for PCPE
//!
//! Provides the batch worker pool and archive dispatcher, batch reports and
//! progress bars.

pub mod parallel;
pub mod progress;
pub mod report;

// Re-export commonly used types
pub use parallel::{get_available_cores, resolve_thread_count, Dispatcher, WorkerPool};
pub use progress::{create_hidden_progress_bar, create_progress_bar};
pub use report::{ArchiveOutcome, BatchReport};
