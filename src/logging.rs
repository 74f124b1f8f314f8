use crate::err::Error;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::FmtSubscriber;

/// Map a log level name to a filter. Accepts DEBUG, INFO, WARNING, ERROR and CRITICAL in any
/// case, plus the tracing names TRACE and WARN. CRITICAL is the same as ERROR.
pub fn parse_level(level: &str) -> Result<LevelFilter, Error> {
    match level.trim().to_uppercase().as_str() {
        "TRACE" => Ok(LevelFilter::TRACE),
        "DEBUG" => Ok(LevelFilter::DEBUG),
        "INFO" => Ok(LevelFilter::INFO),
        "WARNING" | "WARN" => Ok(LevelFilter::WARN),
        "ERROR" | "CRITICAL" => Ok(LevelFilter::ERROR),
        _ => Err(Error::InvalidLogLevel {
            level: level.to_string(),
        }),
    }
}

/// Install the global subscriber. Logs go to stderr so that they do not interleave with the
/// progress lines and the summary on stdout.
pub fn init(level: LevelFilter) -> Result<(), tracing::subscriber::SetGlobalDefaultError> {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
}
