pub mod css;
pub mod fasta;

pub use css::{
    read_archive_outputs, read_groups, stage_archive_outputs, write_archive_outputs, write_groups,
    StagedOutputs,
};
pub use fasta::{extract_identifier, FastaFile, FastaReadable, RawRecord, ReadStats, RecordReader};
