use crate::config::OutputConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// An input archive and the pair of output files derived from it
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ArchiveFile {
    pub input: PathBuf,
    pub id_path: PathBuf,
    pub seq_path: PathBuf,
}

impl ArchiveFile {
    /// Derive output paths by replacing the input's extension with the configured suffixes.
    ///
    /// `data/flu.faa` becomes `data/flu_id_css.txt` and `data/flu_seq_css.txt`.
    /// Only the last extension is replaced, so `flu.faa.gz` maps to `flu.faa_id_css.txt`.
    /// When `output_dir` is set the outputs land there under the input's file name.
    pub fn new<P: AsRef<Path>>(input: P, output: &OutputConfig) -> Self {
        let input = input.as_ref();
        let output_dir = output.output_dir.as_deref();
        Self {
            input: input.to_path_buf(),
            id_path: derive_output(input, &output.id_suffix, output_dir),
            seq_path: derive_output(input, &output.seq_suffix, output_dir),
        }
    }

    /// Archive paired with the default suffixes
    pub fn with_default_outputs<P: AsRef<Path>>(input: P) -> Self {
        Self::new(input, &OutputConfig::default())
    }

    pub fn is_gzipped(&self) -> bool {
        self.input.extension().and_then(|s| s.to_str()) == Some("gz")
    }
}

fn derive_output(input: &Path, suffix: &str, output_dir: Option<&Path>) -> PathBuf {
    let stem = input.with_extension("");
    let mut name = match output_dir {
        Some(dir) => dir
            .join(stem.file_name().unwrap_or_default())
            .into_os_string(),
        None => stem.into_os_string(),
    };
    name.push(suffix);
    PathBuf::from(name)
}
