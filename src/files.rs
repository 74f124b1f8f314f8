//! Local test files filled with random bytes.
use crate::err::{self, Error};
use rand::RngCore;
use snafu::ResultExt;
use std::fs::File;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

const WRITE_CHUNK: usize = 1 << 20;

/// One generated file. Its key in the bucket is its file name.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TestFile {
    pub iteration: usize,
    pub path: PathBuf,
    pub key: String,
}
impl TestFile {
    pub fn new(dir: &Path, prefix: &str, iteration: usize) -> Self {
        let key = format!("{}{}", prefix, iteration);
        Self {
            iteration,
            path: dir.join(&key),
            key,
        }
    }
}

/// Write `iterations` files of `byte_size` random bytes each into `dir`, one after the other.
///
/// Every file is completely written and synced before the next one is started. Each file is
/// pushed to `written` as soon as it has been created, so on error `written` holds exactly the
/// files this call created, including a partially written last one. Removing them is up to the
/// caller.
pub fn generate_files(
    dir: &Path,
    prefix: &str,
    byte_size: u64,
    iterations: usize,
    written: &mut Vec<TestFile>,
) -> Result<(), Error> {
    info!(count = iterations, bytes = byte_size, dir = %dir.display(), "Generating files");
    for i in 0..iterations {
        let file = TestFile::new(dir, prefix, i);
        let path = file.path.clone();
        let out = File::create(&path).context(err::DiskWrite { path: path.clone() })?;
        written.push(file);
        fill_random(out, byte_size).context(err::DiskWrite { path: path.clone() })?;
        debug!(path = %path.display(), "Generated test file");
    }
    Ok(())
}

fn fill_random(mut out: File, byte_size: u64) -> io::Result<()> {
    let mut rng = rand::thread_rng();
    let mut buf = vec![0u8; WRITE_CHUNK.min(byte_size as usize)];
    let mut remaining = byte_size;
    while remaining > 0 {
        let n = (remaining as usize).min(buf.len());
        rng.fill_bytes(&mut buf[..n]);
        out.write_all(&buf[..n])?;
        remaining -= n as u64;
    }
    out.flush()?;
    out.sync_all()
}

/// Delete each file once. A file that is already gone counts as removed; other failures are
/// logged and skipped. Returns the number of files removed.
pub fn remove_test_files(files: &[TestFile]) -> usize {
    let mut removed = 0;
    for file in files {
        match std::fs::remove_file(&file.path) {
            Ok(()) => removed += 1,
            Err(e) if e.kind() == io::ErrorKind::NotFound => removed += 1,
            Err(e) => warn!(path = %file.path.display(), error = %e, "Could not remove test file"),
        }
    }
    debug!(removed, "Removed local test files");
    removed
}
