use crate::err::{self, Error};
use snafu::ResultExt;
use std::io::Write;
use std::path::Path;
use std::sync::{Mutex, PoisonError};

/// Counts the bytes of one in-flight upload and prints how far along it is.
///
/// `record` may be called from any number of threads at once; the running total is kept behind a
/// mutex so every call observes and prints a consistent value.
#[derive(Debug)]
pub struct ProgressObserver {
    label: String,
    total: u64,
    seen: Mutex<u64>,
    render: bool,
}

impl ProgressObserver {
    pub fn new(label: impl Into<String>, total: u64, render: bool) -> Self {
        Self {
            label: label.into(),
            total,
            seen: Mutex::new(0),
            render,
        }
    }

    /// Observer for the upload of `path`; the total is the size of the file on disk right now.
    pub fn for_file(path: &Path, render: bool) -> Result<Self, Error> {
        let total = std::fs::metadata(path)
            .with_context(|| err::Io {
                description: path.display().to_string(),
            })?
            .len();
        Ok(Self::new(path.display().to_string(), total, render))
    }

    /// Add `bytes` to the running total. Returns the new percentage.
    pub fn record(&self, bytes: u64) -> f64 {
        let mut seen = self.seen.lock().unwrap_or_else(PoisonError::into_inner);
        *seen += bytes;
        let pct = percentage(*seen, self.total);
        if self.render {
            let mut out = std::io::stdout().lock();
            let _ = writeln!(
                out,
                "{}  {} / {}  ({:.2}%)",
                self.label, *seen, self.total, pct
            );
        }
        pct
    }

    pub fn seen(&self) -> u64 {
        *self.seen.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn total(&self) -> u64 {
        self.total
    }
}

fn percentage(seen: u64, total: u64) -> f64 {
    if total == 0 {
        100.0
    } else {
        seen as f64 / total as f64 * 100.0
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use std::sync::Arc;
    use tempdir::TempDir;

    #[test]
    fn percentage_of_total() {
        let p = ProgressObserver::new("file", 200, false);
        assert_eq!(p.record(50), 25.0);
        assert_eq!(p.record(150), 100.0);
        assert_eq!(p.seen(), 200);
        assert_eq!(ProgressObserver::new("empty", 0, false).record(0), 100.0);
    }

    #[test]
    fn concurrent_records_all_count() {
        const THREADS: u64 = 8;
        const CALLS: u64 = 1000;
        let p = Arc::new(ProgressObserver::new("file", THREADS * CALLS * 3, false));
        let handles: Vec<_> = (0..THREADS)
            .map(|_| {
                let p = p.clone();
                std::thread::spawn(move || {
                    for _ in 0..CALLS {
                        p.record(3);
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }
        assert_eq!(p.seen(), THREADS * CALLS * 3);
    }

    #[test]
    fn total_comes_from_disk() {
        let tmp_dir = TempDir::new("upload-speed").unwrap();
        let path = tmp_dir.path().join("f");
        std::fs::write(&path, vec![7u8; 321]).unwrap();
        let p = ProgressObserver::for_file(&path, true).unwrap();
        assert_eq!(p.total(), 321);
        assert!(ProgressObserver::for_file(&tmp_dir.path().join("nope"), false).is_err());
    }
}
