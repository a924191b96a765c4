//! Configuration types for PCPE

use crate::PcpeError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub parsing: ParsingConfig,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub performance: PerformanceConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParsingConfig {
    /// Character that starts a header line
    #[serde(default = "default_header_marker")]
    pub header_marker: char,
    /// Delimiter splitting a header into fields
    #[serde(default = "default_id_delimiter")]
    pub id_delimiter: char,
    /// Zero-based field holding the record identifier
    #[serde(default = "default_id_field")]
    pub id_field: usize,
    /// Fail the archive on malformed headers and incomplete records
    #[serde(default)]
    pub strict: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputConfig {
    #[serde(default = "default_id_suffix")]
    pub id_suffix: String,
    #[serde(default = "default_seq_suffix")]
    pub seq_suffix: String,
    /// Write outputs here instead of next to each archive
    #[serde(default)]
    pub output_dir: Option<PathBuf>,
    /// Decode each written pair and check it against the grouping
    #[serde(default)]
    pub verify: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct PerformanceConfig {
    /// Worker threads for multi-archive runs (0 = all available cores)
    #[serde(default)]
    pub threads: usize,
}

fn default_header_marker() -> char { '>' }
fn default_id_delimiter() -> char { '|' }
fn default_id_field() -> usize { 1 }
fn default_id_suffix() -> String { "_id_css.txt".to_string() }
fn default_seq_suffix() -> String { "_seq_css.txt".to_string() }

impl Default for ParsingConfig {
    fn default() -> Self {
        Self {
            header_marker: default_header_marker(),
            id_delimiter: default_id_delimiter(),
            id_field: default_id_field(),
            strict: false,
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            id_suffix: default_id_suffix(),
            seq_suffix: default_seq_suffix(),
            output_dir: None,
            verify: false,
        }
    }
}

impl Config {
    /// Reject settings that would make the two outputs collide or headers unparsable
    pub fn validate(&self) -> Result<(), PcpeError> {
        if self.output.id_suffix.is_empty() || self.output.seq_suffix.is_empty() {
            return Err(PcpeError::Configuration(
                "output suffixes must not be empty".to_string(),
            ));
        }
        if self.output.id_suffix == self.output.seq_suffix {
            return Err(PcpeError::Configuration(format!(
                "identifier and sequence suffixes are both {:?}",
                self.output.id_suffix
            )));
        }
        if self.parsing.header_marker == self.parsing.id_delimiter {
            return Err(PcpeError::Configuration(format!(
                "header marker and identifier delimiter are both {:?}",
                self.parsing.header_marker
            )));
        }
        if self.parsing.header_marker.is_whitespace() {
            return Err(PcpeError::Configuration(
                "header marker must not be whitespace".to_string(),
            ));
        }
        Ok(())
    }
}

pub fn default_config() -> Config {
    Config::default()
}

pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config, PcpeError> {
    let path = path.as_ref();
    let contents = std::fs::read_to_string(path)?;
    let config: Config = toml::from_str(&contents)
        .map_err(|e| PcpeError::Configuration(format!("Failed to parse config: {}", e)))?;
    config.validate()?;
    tracing::debug!("Loaded configuration from {}", path.display());
    Ok(config)
}

pub fn save_config<P: AsRef<Path>>(path: P, config: &Config) -> Result<(), PcpeError> {
    let contents = toml::to_string_pretty(config)
        .map_err(|e| PcpeError::Configuration(format!("Failed to serialize config: {}", e)))?;
    std::fs::write(path, contents)?;
    Ok(())
}
