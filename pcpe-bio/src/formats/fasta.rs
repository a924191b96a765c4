use flate2::read::GzDecoder;
use pcpe_core::config::ParsingConfig;
use pcpe_core::{PcpeError, PcpeResult};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use tracing::warn;

/// One header line and the sequence content collected beneath it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawRecord {
    /// Header line including the marker, without its line terminator
    pub header: String,
    pub sequence: String,
    /// 1-based line number of the header
    pub line: usize,
}

impl RawRecord {
    pub fn identifier(&self, options: &ParsingConfig) -> PcpeResult<&str> {
        extract_identifier(&self.header, self.line, options)
    }
}

/// Counters collected while streaming an archive
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReadStats {
    /// Records handed to the caller
    pub records: usize,
    /// Headers dropped because no sequence followed them
    pub incomplete: usize,
    /// Non-empty lines seen before the first header
    pub orphan_lines: usize,
}

/// Extract the record identifier from a header line.
///
/// The marker is stripped and the remainder split on the delimiter;
/// `>gi|12345|ref|XYZ|` yields `12345` with the default options.
pub fn extract_identifier<'a>(
    header: &'a str,
    line: usize,
    options: &ParsingConfig,
) -> PcpeResult<&'a str> {
    let body = header.strip_prefix(options.header_marker).unwrap_or(header);
    match body.split(options.id_delimiter).nth(options.id_field) {
        Some(id) if !id.is_empty() => Ok(id),
        _ => Err(PcpeError::MalformedHeader {
            line,
            header: header.to_string(),
        }),
    }
}

fn strip_terminator(line: &str) -> &str {
    match line.strip_suffix('\n') {
        Some(line) => line.strip_suffix('\r').unwrap_or(line),
        None => line,
    }
}

/// Capability to open FASTA archives with automatic compression detection
pub trait FastaReadable {
    fn open_for_reading<P: AsRef<Path>>(path: P) -> std::io::Result<Box<dyn BufRead + Send>> {
        let path = path.as_ref();
        let file = File::open(path)?;

        if path.extension().and_then(|s| s.to_str()) == Some("gz") {
            Ok(Box::new(BufReader::new(GzDecoder::new(file))))
        } else {
            Ok(Box::new(BufReader::new(file)))
        }
    }
}

/// Zero-sized type that implements FastaReadable
pub struct FastaFile;

impl FastaReadable for FastaFile {}

/// Streaming reader yielding one [`RawRecord`] per complete FASTA entry.
///
/// The reader is single-pass: records are produced as the input is consumed and
/// a record is only emitted once the following header (or end of input) is seen.
/// Headers with no sequence beneath them are never emitted. They are counted in
/// [`ReadStats::incomplete`] and logged, or reported as
/// [`PcpeError::IncompleteRecord`] when `strict` is set. The iterator stops
/// after the first error.
pub struct RecordReader<R> {
    reader: R,
    options: ParsingConfig,
    source: Option<PathBuf>,
    buf: String,
    line_number: usize,
    header: Option<(String, usize)>,
    sequence: String,
    stats: ReadStats,
    done: bool,
}

impl RecordReader<Box<dyn BufRead + Send>> {
    /// Open an archive on disk; `.gz` files are decompressed on the fly
    pub fn open<P: AsRef<Path>>(path: P, options: &ParsingConfig) -> PcpeResult<Self> {
        let path = path.as_ref();
        let reader = FastaFile::open_for_reading(path).map_err(|e| PcpeError::archive(path, e))?;
        let mut records = RecordReader::new(reader, options);
        records.source = Some(path.to_path_buf());
        Ok(records)
    }
}

impl<R: BufRead> RecordReader<R> {
    pub fn new(reader: R, options: &ParsingConfig) -> Self {
        Self {
            reader,
            options: options.clone(),
            source: None,
            buf: String::new(),
            line_number: 0,
            header: None,
            sequence: String::new(),
            stats: ReadStats::default(),
            done: false,
        }
    }

    pub fn stats(&self) -> ReadStats {
        self.stats
    }

    fn io_error(&self, err: std::io::Error) -> PcpeError {
        match &self.source {
            Some(path) => PcpeError::archive(path, err),
            None => PcpeError::Io(err),
        }
    }

    /// Turn a finished header/sequence pair into a record, or account for it as incomplete
    fn complete(
        &mut self,
        header: String,
        line: usize,
        sequence: String,
    ) -> Option<PcpeResult<RawRecord>> {
        if !sequence.is_empty() {
            self.stats.records += 1;
            return Some(Ok(RawRecord {
                header,
                sequence,
                line,
            }));
        }

        self.stats.incomplete += 1;
        if self.options.strict {
            self.done = true;
            return Some(Err(PcpeError::IncompleteRecord { line, header }));
        }
        warn!("Dropping header at line {} with no sequence: {:?}", line, header);
        None
    }

    fn finish(&mut self) -> Option<PcpeResult<RawRecord>> {
        self.done = true;
        if self.stats.orphan_lines > 0 {
            warn!(
                "Skipped {} line(s) before the first header",
                self.stats.orphan_lines
            );
        }
        let (header, line) = self.header.take()?;
        let sequence = std::mem::take(&mut self.sequence);
        self.complete(header, line, sequence)
    }
}

impl<R: BufRead> Iterator for RecordReader<R> {
    type Item = PcpeResult<RawRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        loop {
            self.buf.clear();
            match self.reader.read_line(&mut self.buf) {
                Ok(0) => return self.finish(),
                Ok(_) => {}
                Err(e) => {
                    self.done = true;
                    return Some(Err(self.io_error(e)));
                }
            }
            self.line_number += 1;

            let content = strip_terminator(&self.buf);
            if content.starts_with(self.options.header_marker) {
                let header = content.to_string();
                let previous = self.header.replace((header, self.line_number));
                let sequence = std::mem::take(&mut self.sequence);
                if let Some((previous, line)) = previous {
                    if let Some(item) = self.complete(previous, line, sequence) {
                        return Some(item);
                    }
                }
            } else if self.header.is_some() {
                self.sequence.push_str(content);
            } else if !content.is_empty() {
                self.stats.orphan_lines += 1;
            }
        }
    }
}

impl<R: BufRead> std::iter::FusedIterator for RecordReader<R> {}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn read_all(input: &str, options: &ParsingConfig) -> (Vec<PcpeResult<RawRecord>>, ReadStats) {
        let mut reader = RecordReader::new(Cursor::new(input.as_bytes()), options);
        let records: Vec<_> = reader.by_ref().collect();
        (records, reader.stats())
    }

    fn sequences(input: &str) -> Vec<(String, String)> {
        let (records, _) = read_all(input, &ParsingConfig::default());
        records
            .into_iter()
            .map(|r| {
                let r = r.unwrap();
                (r.header, r.sequence)
            })
            .collect()
    }

    #[test]
    fn test_extract_identifier() {
        let options = ParsingConfig::default();
        assert_eq!(
            extract_identifier(">gi|12345|ref|XYZ|", 1, &options).unwrap(),
            "12345"
        );
        assert_eq!(
            extract_identifier(">sp|P12345|PROTEIN_HUMAN Description", 1, &options).unwrap(),
            "P12345"
        );
    }

    #[test]
    fn test_extract_identifier_malformed() {
        let options = ParsingConfig::default();
        for header in [">no_delimiter", ">gi||rest", ">gi|"] {
            match extract_identifier(header, 9, &options) {
                Err(PcpeError::MalformedHeader { line, header: h }) => {
                    assert_eq!(line, 9);
                    assert_eq!(h, header);
                }
                other => panic!("Expected MalformedHeader for {:?}, got {:?}", header, other),
            }
        }
    }

    #[test]
    fn test_extract_identifier_custom_field() {
        let options = ParsingConfig {
            id_delimiter: ' ',
            id_field: 0,
            ..ParsingConfig::default()
        };
        assert_eq!(extract_identifier(">seq1 some description", 1, &options).unwrap(), "seq1");
    }

    #[test]
    fn test_wrapped_sequences_are_concatenated() {
        let records = sequences(">gi|1|\nACGT\nTTGA\n>gi|2|\nGG\n");
        assert_eq!(
            records,
            vec![
                (">gi|1|".to_string(), "ACGTTTGA".to_string()),
                (">gi|2|".to_string(), "GG".to_string()),
            ]
        );
    }

    #[test]
    fn test_content_is_case_and_whitespace_sensitive() {
        let records = sequences(">gi|1|\nacGT \n>gi|2|\nACGT\n");
        assert_eq!(records[0].1, "acGT ");
        assert_eq!(records[1].1, "ACGT");
    }

    #[test]
    fn test_crlf_and_missing_final_newline() {
        let records = sequences(">gi|1|\r\nAC\r\nGT\r\n>gi|2|\nTTTT");
        assert_eq!(records[0], (">gi|1|".to_string(), "ACGT".to_string()));
        assert_eq!(records[1].1, "TTTT");
    }

    #[test]
    fn test_trailing_header_is_dropped_and_counted() {
        let (records, stats) = read_all(">gi|1|\nACGT\n>gi|2|\n", &ParsingConfig::default());
        assert_eq!(records.len(), 1);
        assert_eq!(stats.records, 1);
        assert_eq!(stats.incomplete, 1);
    }

    #[test]
    fn test_consecutive_headers_lose_the_first() {
        let (records, stats) = read_all(">gi|1|\n>gi|2|\nACGT\n", &ParsingConfig::default());
        let records: Vec<_> = records.into_iter().map(Result::unwrap).collect();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].header, ">gi|2|");
        assert_eq!(records[0].line, 2);
        assert_eq!(stats.incomplete, 1);
    }

    #[test]
    fn test_strict_mode_reports_incomplete_record() {
        let options = ParsingConfig {
            strict: true,
            ..ParsingConfig::default()
        };
        let (records, _) = read_all(">gi|1|\n>gi|2|\nACGT\n>gi|3|\nAA\n", &options);

        // The iterator stops at the first error
        assert_eq!(records.len(), 1);
        match &records[0] {
            Err(PcpeError::IncompleteRecord { line, header }) => {
                assert_eq!(*line, 1);
                assert_eq!(header, ">gi|1|");
            }
            other => panic!("Expected IncompleteRecord, got {:?}", other),
        }
    }

    #[test]
    fn test_lines_before_first_header_are_orphans() {
        let (records, stats) = read_all("ACGT\n\n>gi|1|\nTT\n", &ParsingConfig::default());
        assert_eq!(records.len(), 1);
        assert_eq!(stats.orphan_lines, 1);
    }

    #[test]
    fn test_empty_input() {
        let (records, stats) = read_all("", &ParsingConfig::default());
        assert!(records.is_empty());
        assert_eq!(stats, ReadStats::default());
    }

    #[test]
    fn test_invalid_utf8_is_an_error() {
        let input: &[u8] = b">gi|1|\nAC\xffGT\n";
        let mut reader = RecordReader::new(Cursor::new(input), &ParsingConfig::default());
        match reader.next() {
            Some(Err(PcpeError::Io(e))) => assert_eq!(e.kind(), std::io::ErrorKind::InvalidData),
            other => panic!("Expected InvalidData error, got {:?}", other),
        }
        assert!(reader.next().is_none());
    }
}
