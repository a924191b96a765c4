pub mod output;

use clap::Parser;
use pcpe_core::{load_config, Config, PcpeResult, DEFAULT_ARCHIVE};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "pcpe-css",
    version,
    about = "Group identical sequences in FASTA archives",
    long_about = "Reads each FASTA archive, groups records whose sequence content is exactly \
                  identical, and writes two line-aligned files next to the archive: \
                  <name>_id_css.txt with the identifiers of every group and \
                  <name>_seq_css.txt with each group's sequence and length. \
                  Several archives are processed in parallel."
)]
pub struct Cli {
    /// FASTA archives to process (.gz is decompressed on the fly)
    #[arg(value_name = "FILES")]
    pub files: Vec<PathBuf>,

    /// Verbosity level (can be repeated)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Number of worker threads (0 = all available)
    #[arg(short = 'j', long)]
    pub threads: Option<usize>,

    /// Configuration file
    #[arg(short = 'c', long, value_name = "FILE", env = "PCPE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Write outputs to this directory instead of next to each archive
    #[arg(short = 'o', long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Fail an archive on malformed headers or headers without sequence
    #[arg(long)]
    pub strict: bool,

    /// Re-read every written pair and check it against the grouping
    #[arg(long)]
    pub verify: bool,
}

impl Cli {
    /// Archives named on the command line, or the built-in default
    pub fn archives(&self) -> Vec<PathBuf> {
        if self.files.is_empty() {
            vec![PathBuf::from(DEFAULT_ARCHIVE)]
        } else {
            self.files.clone()
        }
    }

    /// Load the configuration file, if any, and apply command line overrides
    pub fn resolve_config(&self) -> PcpeResult<Config> {
        let mut config = match &self.config {
            Some(path) => load_config(path)?,
            None => Config::default(),
        };

        if let Some(threads) = self.threads {
            config.performance.threads = threads;
        }
        if let Some(dir) = &self.output_dir {
            config.output.output_dir = Some(dir.clone());
        }
        if self.strict {
            config.parsing.strict = true;
        }
        if self.verify {
            config.output.verify = true;
        }

        config.validate()?;
        Ok(config)
    }
}
