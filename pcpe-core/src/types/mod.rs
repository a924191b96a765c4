/// Core types shared across all PCPE crates
pub mod archive;

pub use archive::ArchiveFile;
