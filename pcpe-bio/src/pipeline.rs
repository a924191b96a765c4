//! Single-archive pipeline: read, group, encode

use crate::dedup::Deduplicator;
use crate::formats::css::stage_archive_outputs;
use crate::formats::fasta::RecordReader;
use pcpe_core::{ArchiveFile, Config, PcpeError, PcpeResult};
use std::path::Path;
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// Outcome of processing one archive
#[derive(Debug, Clone)]
pub struct ArchiveReport {
    pub archive: ArchiveFile,
    /// Records grouped into the outputs
    pub records: usize,
    /// Distinct sequences written
    pub groups: usize,
    pub malformed_headers: usize,
    pub incomplete_records: usize,
    pub orphan_lines: usize,
    pub elapsed: Duration,
}

impl ArchiveReport {
    /// Records folded into an earlier group with the same sequence
    pub fn duplicates(&self) -> usize {
        self.records - self.groups
    }

    /// Records that did not make it into the outputs
    pub fn skipped(&self) -> usize {
        self.malformed_headers + self.incomplete_records
    }
}

/// Deduplicate one archive and write its identifier and sequence files
pub fn process_archive<P: AsRef<Path>>(path: P, config: &Config) -> PcpeResult<ArchiveReport> {
    let path = path.as_ref();
    let _span = tracing::info_span!("process_archive", path = %path.display()).entered();
    let start = Instant::now();

    let archive = ArchiveFile::new(path, &config.output);
    if let Some(dir) = &config.output.output_dir {
        std::fs::create_dir_all(dir).map_err(|e| PcpeError::archive(dir, e))?;
    }
    debug!(
        "Writing {} and {}",
        archive.id_path.display(),
        archive.seq_path.display()
    );

    let mut reader = RecordReader::open(path, &config.parsing)?;
    let mut dedup = Deduplicator::new(&config.parsing);
    dedup.extend_from(reader.by_ref())?;
    let stats = reader.stats();
    let grouped = dedup.finish();

    // Destinations are replaced only after the optional verification passes
    let staged = stage_archive_outputs(&archive, &grouped)?;
    if config.output.verify {
        let decoded = staged.decode()?;
        if !decoded.same_grouping(&grouped) {
            return Err(PcpeError::Format(format!(
                "outputs for {} do not match the computed grouping",
                path.display()
            )));
        }
        debug!("Verified {} groups", decoded.len());
    }
    staged.commit()?;

    let report = ArchiveReport {
        records: grouped.record_count(),
        groups: grouped.len(),
        malformed_headers: grouped.malformed_headers(),
        incomplete_records: stats.incomplete,
        orphan_lines: stats.orphan_lines,
        elapsed: start.elapsed(),
        archive,
    };
    info!(
        "{} records, {} distinct sequences, {} skipped",
        report.records,
        report.groups,
        report.skipped()
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_process_archive_writes_pair() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("sample.faa");
        fs::write(&input, ">gi|A1|\nACGT\n>gi|B1|\nACGT\n>gi|C1|\nTTTT\n>gi|D1|\n").unwrap();

        let report = process_archive(&input, &Config::default()).unwrap();

        assert_eq!(report.records, 3);
        assert_eq!(report.groups, 2);
        assert_eq!(report.duplicates(), 1);
        assert_eq!(report.incomplete_records, 1);
        assert_eq!(
            fs::read_to_string(dir.path().join("sample_id_css.txt")).unwrap(),
            "2\n2 A1 B1\n1 C1\n"
        );
        assert_eq!(
            fs::read_to_string(dir.path().join("sample_seq_css.txt")).unwrap(),
            "2\n4 ACGT\n4 TTTT\n"
        );
    }

    #[test]
    fn test_missing_archive_leaves_no_outputs() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("absent.faa");

        match process_archive(&input, &Config::default()) {
            Err(PcpeError::Archive { path, .. }) => assert_eq!(path, input),
            other => panic!("Expected Archive error, got {:?}", other),
        }
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_strict_failure_leaves_no_outputs() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("bad.faa");
        fs::write(&input, ">gi|A1|\nACGT\n>broken\nTT\n").unwrap();

        let mut config = Config::default();
        config.parsing.strict = true;

        assert!(matches!(
            process_archive(&input, &config),
            Err(PcpeError::MalformedHeader { line: 3, .. })
        ));
        assert!(!dir.path().join("bad_id_css.txt").exists());
        assert!(!dir.path().join("bad_seq_css.txt").exists());
    }

    #[test]
    fn test_output_dir_is_created_and_verified() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("flu.fasta");
        fs::write(&input, ">sp|P1|X\nMKV\n>sp|P2|Y\nMKV\n").unwrap();

        let mut config = Config::default();
        config.output.output_dir = Some(dir.path().join("out/nested"));
        config.output.verify = true;

        let report = process_archive(&input, &config).unwrap();
        assert_eq!(report.archive.id_path, dir.path().join("out/nested/flu_id_css.txt"));
        assert_eq!(
            fs::read_to_string(&report.archive.id_path).unwrap(),
            "1\n2 P1 P2\n"
        );
    }

    #[test]
    fn test_failed_verification_leaves_no_outputs() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("sp.faa");
        // The space makes the identifier line undecodable
        fs::write(&input, ">gi|A B|x\nACGT\n").unwrap();

        let mut config = Config::default();
        config.output.verify = true;

        assert!(matches!(
            process_archive(&input, &config),
            Err(PcpeError::Format(_))
        ));
        assert!(!dir.path().join("sp_id_css.txt").exists());
        assert!(!dir.path().join("sp_seq_css.txt").exists());
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);

        // Without verification the identifier is written as-is
        let report = process_archive(&input, &Config::default()).unwrap();
        assert_eq!(fs::read_to_string(&report.archive.id_path).unwrap(), "1\n1 A B\n");
    }
}
