use crate::config::Mode;
use aws_sdk_s3::error::SdkError;
use aws_sdk_s3::operation::delete_object::DeleteObjectError;
use aws_sdk_s3::operation::put_object::PutObjectError;
use snafu::{Backtrace, Snafu};
use std::io;
use std::path::PathBuf;

#[derive(Snafu, Debug)]
#[snafu(visibility = "pub")]
pub enum Error {
    #[snafu(display("Io error: {}: {}", description, source))]
    Io {
        source: io::Error,
        description: String,
        backtrace: Backtrace,
    },
    /// Writing a generated test file failed (disk full, permissions, ...).
    #[snafu(display("Could not write test file {}: {}", path.display(), source))]
    DiskWrite { source: io::Error, path: PathBuf },

    #[snafu(display("Invalid size '{}': expected an integer followed by k, m or g", input))]
    InvalidSizeFormat { input: String },
    #[snafu(display("Unknown size unit '{}': expected one of k, m, g", unit))]
    UnknownUnit { unit: char },
    #[snafu(display("Invalid log level: {}", level))]
    InvalidLogLevel { level: String },
    #[snafu(display("Number of iterations must be at least 1 (got {})", iterations))]
    InvalidIterations { iterations: usize },
    #[snafu(display("No bucket given"))]
    MissingBucket,
    #[snafu(display("No upload mode selected"))]
    NoModes,

    #[snafu(display(
        "S3 'put object' error ({} mode) on s3://{}/{}: {:?}",
        mode,
        bucket,
        key,
        source
    ))]
    PutObject {
        source: SdkError<PutObjectError>,
        bucket: String,
        key: String,
        mode: Mode,
        backtrace: Backtrace,
    },
    #[snafu(display(
        "S3 'delete object' error ({} mode) on s3://{}/{}: {:?}",
        mode,
        bucket,
        key,
        source
    ))]
    DeleteObject {
        source: SdkError<DeleteObjectError>,
        bucket: String,
        key: String,
        mode: Mode,
    },

    /// Averaging requires at least one sample.
    #[snafu(display("Cannot average an empty sample set: {}", what))]
    EmptySampleSet { what: String },
    #[snafu(display("Writing CSV to {}: {}", path.display(), source))]
    Csv { source: csv::Error, path: PathBuf },
}
