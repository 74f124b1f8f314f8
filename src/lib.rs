//! # S3 upload speed
//! Measure upload throughput to an S3 bucket, through the regular endpoint and through S3
//! Transfer Acceleration.
//!
//! https://docs.aws.amazon.com/AmazonS3/latest/userguide/transfer-acceleration.html
//!
//! - Generate test files, upload and time them with `UploadSpeed::run`.
//! - Print the means or export every sample with the returned `RunSummary`.
//!
//! One file is generated per iteration so that no cache along the way can skew the numbers.
//! Uploads run one at a time. A failed upload is logged and left out of the statistics; the run
//! carries on, and the local test files are removed in any case.

use std::time::Duration;

mod bench;
mod config;
pub mod err;
pub mod files;
pub mod logging;
pub mod progress;
pub mod report;
pub mod size;
pub mod store;

pub use bench::Stage;
pub use config::*;
pub use err::Error;
pub use report::RunSummary;
pub use store::{ObjectStore, S3Store};

#[cfg(test)]
mod mock;

const BYTES_PER_MB: f64 = (1 << 20) as f64;
const MIN_ELAPSED: Duration = Duration::from_nanos(1);

#[derive(Clone)]
pub struct UploadSpeed<S> {
    store: S,
    config: Config,
}
impl<S> UploadSpeed<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            config: Config::default(),
        }
    }
    pub fn with_config(store: S, config: Config) -> Self {
        Self { store, config }
    }
    pub fn config(&self) -> &Config {
        &self.config
    }
}

/// Result of a single timed upload.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UploadRecord {
    /// Index of the test file
    pub iteration: usize,
    pub mode: Mode,
    /// Wall-clock time of the upload request
    pub elapsed: Duration,
    /// MB/s, with 1 MB = 2^20 bytes
    pub speed_mbps: f64,
}
impl UploadRecord {
    pub fn new(iteration: usize, mode: Mode, elapsed: Duration, bytes: u64) -> Self {
        Self {
            iteration,
            mode,
            elapsed,
            speed_mbps: speed_mbps(bytes, elapsed),
        }
    }
}

/// Throughput in MB/s. An elapsed time below one nanosecond counts as one nanosecond, so the
/// result is always finite.
pub fn speed_mbps(bytes: u64, elapsed: Duration) -> f64 {
    let secs = elapsed.max(MIN_ELAPSED).as_secs_f64();
    bytes as f64 / BYTES_PER_MB / secs
}
