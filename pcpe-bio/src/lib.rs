//! FASTA streaming, exact-match deduplication and CSS encoding for PCPE

pub mod dedup;
pub mod formats;
pub mod pipeline;

// Re-export commonly used types
pub use dedup::{deduplicate, Deduplicator, GroupedArchive, SequenceGroup};
pub use formats::fasta::{RawRecord, ReadStats, RecordReader};
pub use pipeline::{process_archive, ArchiveReport};
