#![allow(dead_code)]

use anyhow::Result;
use assert_cmd::Command;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Records (A1, ACGT), (B1, ACGT), (C1, TTTT) with the sequence split across lines
pub const SHARED_SEQUENCE_FASTA: &str = ">gi|A1|ref|\nAC\nGT\n>gi|B1|ref|\nACGT\n>gi|C1|ref|\nTTTT\n";

pub const SHARED_SEQUENCE_IDS: &str = "2\n2 A1 B1\n1 C1\n";
pub const SHARED_SEQUENCE_SEQS: &str = "2\n4 ACGT\n4 TTTT\n";

/// Create a test FASTA file with the given content
pub fn create_test_fasta(dir: &Path, name: &str, content: &str) -> Result<PathBuf> {
    let path = dir.join(name);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(&path, content)?;
    Ok(path)
}

/// Create a FASTA with n records cycling through a few distinct sequences
pub fn create_redundant_fasta(n: usize) -> String {
    let motifs = ["MKVLAAG", "MKVLAAGQ", "TTTT"];
    let mut content = String::new();
    for i in 0..n {
        content.push_str(&format!(">gi|seq_{}|ref|XP_{}|\n", i, i));
        content.push_str(motifs[i % motifs.len()]);
        content.push('\n');
    }
    content
}

pub fn pcpe_cmd() -> Command {
    let mut cmd = Command::cargo_bin("pcpe-css").unwrap();
    cmd.env_remove("PCPE_CONFIG").env_remove("RUST_LOG");
    cmd
}

/// Setup test environment with temporary directory
pub struct TestEnvironment {
    pub temp_dir: TempDir,
    pub input_dir: PathBuf,
    pub output_dir: PathBuf,
}

impl TestEnvironment {
    pub fn new() -> Result<Self> {
        let temp_dir = TempDir::new()?;
        let input_dir = temp_dir.path().join("input");
        let output_dir = temp_dir.path().join("output");

        fs::create_dir_all(&input_dir)?;
        fs::create_dir_all(&output_dir)?;

        Ok(Self {
            temp_dir,
            input_dir,
            output_dir,
        })
    }

    pub fn create_input_file(&self, name: &str, content: &str) -> Result<PathBuf> {
        create_test_fasta(&self.input_dir, name, content)
    }

    pub fn input_path(&self, name: &str) -> PathBuf {
        self.input_dir.join(name)
    }

    pub fn output_path(&self, name: &str) -> PathBuf {
        self.output_dir.join(name)
    }
}

/// Read the identifier and sequence files written for `stem` inside `dir`
pub fn read_outputs(dir: &Path, stem: &str) -> Result<(String, String)> {
    let ids = fs::read_to_string(dir.join(format!("{}_id_css.txt", stem)))?;
    let seqs = fs::read_to_string(dir.join(format!("{}_seq_css.txt", stem)))?;
    Ok((ids, seqs))
}
