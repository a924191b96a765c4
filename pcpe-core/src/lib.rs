//! Core utilities and types shared across all PCPE crates

pub mod config;
pub mod error;
pub mod types;

// Re-export commonly used types
pub use config::{load_config, save_config, Config};
pub use error::{PcpeError, PcpeResult};
pub use types::ArchiveFile;

/// Version information for the PCPE project
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const DESCRIPTION: &str = env!("CARGO_PKG_DESCRIPTION");

/// Archive processed when no paths are given on the command line
pub const DEFAULT_ARCHIVE: &str = "example/influenza.faa";
