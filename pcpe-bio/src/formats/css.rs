//! Reading and writing of paired CSS (common sequence set) output files.
//!
//! The identifier file holds the group count followed by one
//! `<count> <id_1> ... <id_count>` line per group. The sequence file holds the
//! same count followed by one `<length> <sequence>` line per group. Line `i` of
//! both files always describes the same group.

use crate::dedup::GroupedArchive;
use pcpe_core::{ArchiveFile, PcpeError, PcpeResult};
use std::fs::{self, File};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;
use tempfile::NamedTempFile;

/// Write both CSS streams for a grouped archive
pub fn write_groups<I: Write, S: Write>(
    id_out: &mut I,
    seq_out: &mut S,
    grouped: &GroupedArchive,
) -> std::io::Result<()> {
    writeln!(id_out, "{}", grouped.len())?;
    writeln!(seq_out, "{}", grouped.len())?;

    for (sequence, ids) in grouped.iter() {
        writeln!(id_out, "{} {}", ids.len(), ids.join(" "))?;
        writeln!(seq_out, "{} {}", sequence.len(), sequence)?;
    }
    Ok(())
}

fn temp_beside(path: &Path) -> PcpeResult<NamedTempFile> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    NamedTempFile::new_in(dir).map_err(|e| PcpeError::archive(path, e))
}

/// A CSS pair written to temporaries beside its destinations but not yet in place.
///
/// Dropping it without [`StagedOutputs::commit`] deletes the temporaries and
/// leaves the destinations untouched.
pub struct StagedOutputs<'a> {
    files: &'a ArchiveFile,
    id_tmp: NamedTempFile,
    seq_tmp: NamedTempFile,
}

impl StagedOutputs<'_> {
    /// Decode the staged pair
    pub fn decode(&self) -> PcpeResult<GroupedArchive> {
        let id_in = File::open(self.id_tmp.path())
            .map_err(|e| PcpeError::archive(&self.files.id_path, e))?;
        let seq_in = File::open(self.seq_tmp.path())
            .map_err(|e| PcpeError::archive(&self.files.seq_path, e))?;
        read_groups(BufReader::new(id_in), BufReader::new(seq_in))
    }

    /// Rename both temporaries into place.
    ///
    /// If the sequence file cannot be placed, both destinations are removed so
    /// no mismatched pair survives.
    pub fn commit(self) -> PcpeResult<()> {
        let files = self.files;
        self.id_tmp
            .persist(&files.id_path)
            .map_err(|e| PcpeError::archive(&files.id_path, e.error))?;
        if let Err(e) = self.seq_tmp.persist(&files.seq_path) {
            let _ = fs::remove_file(&files.id_path);
            let _ = fs::remove_file(&files.seq_path);
            return Err(PcpeError::archive(&files.seq_path, e.error));
        }
        Ok(())
    }
}

/// Write both files of an archive to temporaries next to their destinations
pub fn stage_archive_outputs<'a>(
    files: &'a ArchiveFile,
    grouped: &GroupedArchive,
) -> PcpeResult<StagedOutputs<'a>> {
    let mut id_out = BufWriter::new(temp_beside(&files.id_path)?);
    let mut seq_out = BufWriter::new(temp_beside(&files.seq_path)?);

    write_groups(&mut id_out, &mut seq_out, grouped)
        .map_err(|e| PcpeError::archive(&files.id_path, e))?;

    let id_tmp = id_out
        .into_inner()
        .map_err(|e| PcpeError::archive(&files.id_path, e.into_error()))?;
    let seq_tmp = seq_out
        .into_inner()
        .map_err(|e| PcpeError::archive(&files.seq_path, e.into_error()))?;

    Ok(StagedOutputs {
        files,
        id_tmp,
        seq_tmp,
    })
}

/// Write the identifier and sequence files of an archive.
///
/// Both files are staged as temporaries next to their destination and only
/// renamed into place once fully written, so a failure leaves neither a
/// truncated file nor half of the pair behind.
pub fn write_archive_outputs(files: &ArchiveFile, grouped: &GroupedArchive) -> PcpeResult<()> {
    stage_archive_outputs(files, grouped)?.commit()
}

fn parse_count(line: Option<std::io::Result<String>>, what: &str) -> PcpeResult<usize> {
    let line = line.ok_or_else(|| PcpeError::Format(format!("{} file is empty", what)))??;
    line.trim()
        .parse()
        .map_err(|_| PcpeError::Format(format!("{} file has a bad group count: {:?}", what, line)))
}

fn parse_id_line(line: &str, index: usize) -> PcpeResult<Vec<String>> {
    let mut fields = line.split(' ');
    let count: usize = fields
        .next()
        .and_then(|f| f.parse().ok())
        .ok_or_else(|| PcpeError::Format(format!("group {}: bad identifier count", index)))?;
    let ids: Vec<String> = fields.map(str::to_string).collect();
    if count == 0 || ids.len() != count || ids.iter().any(String::is_empty) {
        return Err(PcpeError::Format(format!(
            "group {}: expected {} identifiers in {:?}",
            index, count, line
        )));
    }
    Ok(ids)
}

fn parse_seq_line(line: &str, index: usize) -> PcpeResult<String> {
    let (length, sequence) = line
        .split_once(' ')
        .ok_or_else(|| PcpeError::Format(format!("group {}: missing sequence", index)))?;
    let length: usize = length
        .parse()
        .map_err(|_| PcpeError::Format(format!("group {}: bad sequence length", index)))?;
    if length != sequence.len() {
        return Err(PcpeError::Format(format!(
            "group {}: declared length {} but sequence has {}",
            index,
            length,
            sequence.len()
        )));
    }
    Ok(sequence.to_string())
}

/// Decode a pair of CSS streams back into a [`GroupedArchive`]
pub fn read_groups<I: BufRead, S: BufRead>(id_in: I, seq_in: S) -> PcpeResult<GroupedArchive> {
    let mut id_lines = id_in.lines();
    let mut seq_lines = seq_in.lines();

    let count = parse_count(id_lines.next(), "identifier")?;
    let seq_count = parse_count(seq_lines.next(), "sequence")?;
    if count != seq_count {
        return Err(PcpeError::Format(format!(
            "identifier file lists {} groups but sequence file lists {}",
            count, seq_count
        )));
    }

    let mut grouped = GroupedArchive::default();
    for index in 1..=count {
        let (id_line, seq_line) = match (id_lines.next(), seq_lines.next()) {
            (Some(id_line), Some(seq_line)) => (id_line?, seq_line?),
            _ => {
                return Err(PcpeError::Format(format!(
                    "expected {} groups, files end after {}",
                    count,
                    index - 1
                )))
            }
        };
        let ids = parse_id_line(&id_line, index)?;
        let sequence = parse_seq_line(&seq_line, index)?;
        if !grouped.insert_group(sequence, ids) {
            return Err(PcpeError::Format(format!(
                "group {}: sequence listed more than once",
                index
            )));
        }
    }

    if id_lines.next().is_some() || seq_lines.next().is_some() {
        return Err(PcpeError::Format(format!(
            "trailing lines after {} groups",
            count
        )));
    }
    Ok(grouped)
}

/// Decode the CSS pair written for an archive
pub fn read_archive_outputs(files: &ArchiveFile) -> PcpeResult<GroupedArchive> {
    let id_in = File::open(&files.id_path).map_err(|e| PcpeError::archive(&files.id_path, e))?;
    let seq_in = File::open(&files.seq_path).map_err(|e| PcpeError::archive(&files.seq_path, e))?;
    read_groups(BufReader::new(id_in), BufReader::new(seq_in))
}
