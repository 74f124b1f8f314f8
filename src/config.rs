#[cfg(feature = "serde1")]
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Which S3 endpoint an upload goes through.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, clap::ValueEnum)]
#[cfg_attr(feature = "serde1", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde1", serde(rename_all = "lowercase"))]
pub enum Mode {
    /// The regular regional endpoint
    Normal,
    /// The S3 Transfer Acceleration endpoint
    Accelerated,
}
impl Mode {
    pub const ALL: [Mode; 2] = [Mode::Normal, Mode::Accelerated];
}
impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Mode::Normal => f.pad("normal"),
            Mode::Accelerated => f.pad("accelerated"),
        }
    }
}

#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde1", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde1", serde(default))]
pub struct Config {
    /// Size of each test file, as `<integer><unit>` with unit one of k, m, g
    pub size: String,
    /// Number of upload iterations. One file is generated per iteration so that
    /// no caching along the way can skew the numbers.
    pub iterations: usize,
    /// Destination bucket
    pub bucket: String,
    /// Upload modes to compare, in the order they are run for each iteration
    pub modes: Vec<Mode>,
    /// Directory in which the test files are generated
    pub work_dir: PathBuf,
    /// File name (and key) of test file `i` is `{file_prefix}{i}`
    pub file_prefix: String,
    /// Delete each uploaded object right after it has been timed
    pub delete_remote: bool,
    /// Print a percentage line for every chunk handed to S3
    pub show_progress: bool,
}
impl Default for Config {
    fn default() -> Self {
        Self {
            size: "1k".to_string(),
            iterations: 1,
            bucket: String::new(),
            modes: Mode::ALL.to_vec(),
            work_dir: PathBuf::from("."),
            file_prefix: "upload_speed_test_".to_string(),
            delete_remote: true,
            show_progress: true,
        }
    }
}
impl Config {
    /// The configured modes in order, with duplicates removed.
    pub fn mode_set(&self) -> Vec<Mode> {
        let mut modes = Vec::with_capacity(self.modes.len());
        for mode in &self.modes {
            if !modes.contains(mode) {
                modes.push(*mode);
            }
        }
        modes
    }
}

/// Parameters for building the S3 clients. Credentials are taken from the default AWS provider
/// chain (environment, profile, ...) unless both keys are given here.
#[derive(Clone, Debug, Default)]
#[cfg_attr(feature = "serde1", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde1", serde(default))]
pub struct StoreConfig {
    pub region: Option<String>,
    /// Custom endpoint, e.g. `http://localhost:9000` for a local minio. Implies path-style
    /// addressing.
    pub endpoint_url: Option<String>,
    pub access_key_id: Option<String>,
    pub secret_access_key: Option<String>,
}
