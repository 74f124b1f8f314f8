use clap::Parser;
use s3_upload_speed::*;
use std::path::PathBuf;
use tracing::{error, info};

/// Measure upload speed to an S3 bucket, with and without Transfer Acceleration.
///
/// Credentials are taken from the environment (AWS_ACCESS_KEY_ID, AWS_SECRET_ACCESS_KEY, ...) or
/// the shared AWS config files.
#[derive(Parser, Debug)]
#[command(name = "upload_speed", version, about)]
struct Args {
    /// Size of each uploaded file: an integer followed by a single letter indicating the unit,
    /// k = kilo, m = mega, g = giga (powers of 1024)
    #[arg(long, default_value = "1k")]
    size: String,

    /// Number of upload iterations. A separate file is generated for each iteration so that no
    /// caching can impact the metrics; there needs to be enough disk space for all of them, and
    /// many large files take time to generate.
    #[arg(long = "iter", default_value_t = 1)]
    iterations: usize,

    /// Destination bucket
    #[arg(long)]
    bucket: String,

    /// DEBUG, INFO, WARNING, ERROR, CRITICAL
    #[arg(long = "loglevel", default_value = "INFO")]
    log_level: String,

    /// Write every sample to this CSV file
    #[arg(long = "csvfilename")]
    csv_filename: Option<PathBuf>,

    /// Upload mode to run; repeat to run several. Defaults to both.
    #[arg(long = "mode", value_enum)]
    modes: Vec<Mode>,

    /// Leave the uploaded objects in the bucket
    #[arg(long)]
    keep_remote: bool,

    /// Directory in which the test files are generated
    #[arg(long = "workdir", default_value = ".")]
    work_dir: PathBuf,

    #[arg(long)]
    region: Option<String>,

    /// Custom S3 endpoint, e.g. http://localhost:9000
    #[arg(long)]
    endpoint_url: Option<String>,

    /// Do not print a progress line for every chunk sent
    #[arg(long)]
    no_progress: bool,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    let level = match logging::parse_level(&args.log_level) {
        Ok(level) => level,
        Err(e) => {
            eprintln!("{}", e);
            std::process::exit(2);
        }
    };
    if let Err(e) = logging::init(level) {
        eprintln!("Could not set up logging: {}", e);
    }

    if let Err(e) = run(args).await {
        error!("{}", e);
        std::process::exit(1);
    }
}

async fn run(args: Args) -> Result<(), Error> {
    let config = Config {
        size: args.size,
        iterations: args.iterations,
        bucket: args.bucket,
        modes: if args.modes.is_empty() {
            Mode::ALL.to_vec()
        } else {
            args.modes
        },
        work_dir: args.work_dir,
        delete_remote: !args.keep_remote,
        show_progress: !args.no_progress,
        ..Default::default()
    };
    let store_config = StoreConfig {
        region: args.region,
        endpoint_url: args.endpoint_url,
        ..Default::default()
    };

    let store = S3Store::new(&store_config).await;
    let algo = UploadSpeed::with_config(store, config);
    let byte_size = algo.validate()?;
    info!(bytes = byte_size, iterations = algo.config().iterations, "Starting");

    let summary = algo.run().await?;

    if let Some(path) = &args.csv_filename {
        summary.write_csv(path)?;
        info!(path = %path.display(), "Wrote CSV");
    }
    summary.print(&mut std::io::stdout())
}
