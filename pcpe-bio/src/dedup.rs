//! Exact-match grouping of records by sequence content

use crate::formats::fasta::{extract_identifier, RawRecord};
use indexmap::IndexMap;
use pcpe_core::config::ParsingConfig;
use pcpe_core::PcpeResult;
use tracing::warn;

/// A distinct sequence and the identifiers of every record carrying it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SequenceGroup {
    pub sequence: String,
    pub identifiers: Vec<String>,
}

/// Sequence groups of one archive in first-encounter order
#[derive(Debug, Clone, Default)]
pub struct GroupedArchive {
    groups: IndexMap<String, Vec<String>>,
    records: usize,
    malformed_headers: usize,
}

impl GroupedArchive {
    /// Number of distinct sequences
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Records that landed in a group
    pub fn record_count(&self) -> usize {
        self.records
    }

    /// Records skipped because their header had no identifier
    pub fn malformed_headers(&self) -> usize {
        self.malformed_headers
    }

    /// Groups as (sequence, identifiers) in first-encounter order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> + '_ {
        self.groups
            .iter()
            .map(|(sequence, ids)| (sequence.as_str(), ids.as_slice()))
    }

    pub fn get(&self, sequence: &str) -> Option<&[String]> {
        self.groups.get(sequence).map(Vec::as_slice)
    }

    /// Order-sensitive comparison of the groupings, ignoring counters
    pub fn same_grouping(&self, other: &GroupedArchive) -> bool {
        self.iter().eq(other.iter())
    }

    pub fn into_groups(self) -> Vec<SequenceGroup> {
        self.groups
            .into_iter()
            .map(|(sequence, identifiers)| SequenceGroup {
                sequence,
                identifiers,
            })
            .collect()
    }

    /// Append a whole group; returns false if the sequence is already present
    pub(crate) fn insert_group(&mut self, sequence: String, identifiers: Vec<String>) -> bool {
        if self.groups.contains_key(&sequence) {
            return false;
        }
        self.records += identifiers.len();
        self.groups.insert(sequence, identifiers);
        true
    }
}

/// Builds a [`GroupedArchive`] from a stream of records
#[derive(Debug)]
pub struct Deduplicator {
    options: ParsingConfig,
    grouped: GroupedArchive,
}

impl Deduplicator {
    pub fn new(options: &ParsingConfig) -> Self {
        Self {
            options: options.clone(),
            grouped: GroupedArchive::default(),
        }
    }

    /// Add one record to the group keyed by its exact sequence content.
    ///
    /// A header without an identifier is logged and skipped, or returned as an
    /// error when `strict` is set.
    pub fn push(&mut self, record: RawRecord) -> PcpeResult<()> {
        let id = match extract_identifier(&record.header, record.line, &self.options) {
            Ok(id) => id.to_string(),
            Err(e) if !self.options.strict => {
                warn!("Skipping record: {}", e);
                self.grouped.malformed_headers += 1;
                return Ok(());
            }
            Err(e) => return Err(e),
        };

        self.grouped.records += 1;
        self.grouped
            .groups
            .entry(record.sequence)
            .or_default()
            .push(id);
        Ok(())
    }

    /// Drain a record stream, stopping at the first error it yields
    pub fn extend_from<I>(&mut self, records: I) -> PcpeResult<()>
    where
        I: IntoIterator<Item = PcpeResult<RawRecord>>,
    {
        for record in records {
            self.push(record?)?;
        }
        Ok(())
    }

    pub fn finish(self) -> GroupedArchive {
        self.grouped
    }
}

/// Group a record stream in one call
pub fn deduplicate<I>(records: I, options: &ParsingConfig) -> PcpeResult<GroupedArchive>
where
    I: IntoIterator<Item = PcpeResult<RawRecord>>,
{
    let mut dedup = Deduplicator::new(options);
    dedup.extend_from(records)?;
    Ok(dedup.finish())
}
