use super::*;
use crate::files::{generate_files, remove_test_files, TestFile};
use crate::report::UploadFailure;
use crate::size::SizeSpec;
use crate::store::timed_upload;
use tracing::{debug, error, info, warn};

/// Stages of a run, in order. Only parameter validation in `Init` and file generation can end a
/// run early; `Done` is reached no matter how many uploads failed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Stage {
    Init,
    FilesGenerated,
    Uploading,
    Cleaning,
    Reporting,
    Done,
}

impl<S: ObjectStore> UploadSpeed<S> {
    /// Check the parameters of the run. Returns the size of one test file in bytes.
    pub fn validate(&self) -> Result<u64, Error> {
        let byte_size = self.config.size.parse::<SizeSpec>()?.byte_size()?;
        if self.config.iterations == 0 {
            return Err(Error::InvalidIterations {
                iterations: self.config.iterations,
            });
        }
        if self.config.bucket.trim().is_empty() {
            return Err(Error::MissingBucket);
        }
        if self.config.modes.is_empty() {
            return Err(Error::NoModes);
        }
        Ok(byte_size)
    }

    /// Run the benchmark.
    ///
    /// For each iteration, the test file is uploaded once per configured mode. After all uploads
    /// have been attempted, every local test file is deleted. With `delete_remote`, each uploaded
    /// object is deleted right after it was timed.
    pub async fn run(&self) -> Result<RunSummary, Error> {
        let cfg = &self.config;
        debug!(stage = ?Stage::Init, size = %cfg.size, iterations = cfg.iterations);
        let byte_size = self.validate()?;
        let modes = cfg.mode_set();

        let mut files = Vec::with_capacity(cfg.iterations);
        if let Err(e) = generate_files(
            &cfg.work_dir,
            &cfg.file_prefix,
            byte_size,
            cfg.iterations,
            &mut files,
        ) {
            // Remove only the files this run created
            remove_test_files(&files);
            return Err(e);
        }
        debug!(stage = ?Stage::FilesGenerated, count = files.len());

        let mut summary = RunSummary {
            byte_size,
            iterations: cfg.iterations,
            modes: modes.clone(),
            records: Vec::with_capacity(files.len() * modes.len()),
            failures: Vec::new(),
        };

        debug!(stage = ?Stage::Uploading);
        for file in &files {
            for &mode in &modes {
                self.upload_one(file, mode, byte_size, &mut summary).await;
            }
        }

        debug!(stage = ?Stage::Cleaning);
        remove_test_files(&files);

        debug!(stage = ?Stage::Reporting);
        info!(
            uploads = summary.records.len(),
            failed = summary.failures.len(),
            "Benchmark finished"
        );
        debug!(stage = ?Stage::Done);
        Ok(summary)
    }

    async fn upload_one(&self, file: &TestFile, mode: Mode, byte_size: u64, summary: &mut RunSummary) {
        let bucket = self.config.bucket.as_str();
        match timed_upload(&self.store, bucket, file, mode, self.config.show_progress).await {
            Ok(elapsed) => {
                let record = UploadRecord::new(file.iteration, mode, elapsed, byte_size);
                info!(
                    iteration = file.iteration,
                    %mode,
                    elapsed_s = elapsed.as_secs_f64(),
                    speed_mbps = record.speed_mbps,
                    "Upload timed"
                );
                summary.records.push(record);

                if self.config.delete_remote {
                    if let Err(e) = self.store.delete(mode, bucket, &file.key).await {
                        warn!(%mode, bucket, key = %file.key, error = %e, "Could not delete uploaded object");
                    }
                }
            }
            Err(e) => {
                error!(
                    iteration = file.iteration,
                    %mode,
                    bucket,
                    key = %file.key,
                    error = %e,
                    "Upload failed, leaving it out of the statistics"
                );
                summary.failures.push(UploadFailure {
                    iteration: file.iteration,
                    mode,
                    message: e.to_string(),
                });
            }
        }
    }
}
