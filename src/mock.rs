use crate::progress::ProgressObserver;
use crate::*;
use async_trait::async_trait;
use futures_stopwatch::stopwatch;
use snafu::ResultExt;
use std::collections::{HashMap, HashSet};
use std::io;
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// In-memory object store.
///
/// `put` reads the file in chunks and reports them to the progress observer from several
/// threads at once, like a multipart transfer would. Only that transfer is timed. Uploads of
/// selected (key, mode) pairs can be made to fail, and preparing a put can be slowed down.
#[derive(Clone)]
pub struct MockStore {
    chunk_size: usize,
    threads: usize,
    open_delay: Duration,
    failing: Arc<HashSet<(String, Mode)>>,
    /// Objects currently stored, with their size
    pub objects: Arc<Mutex<HashMap<(Mode, String), usize>>>,
    /// Every successful put, in order
    pub puts: Arc<Mutex<Vec<(Mode, String)>>>,
    /// Every delete, in order
    pub deletes: Arc<Mutex<Vec<(Mode, String)>>>,
    /// (seen, total) of the progress observer at the end of each successful put
    pub progress: Arc<Mutex<Vec<(u64, u64)>>>,
}

impl MockStore {
    pub fn new(chunk_size: usize, threads: usize) -> Self {
        Self {
            chunk_size,
            threads,
            open_delay: Duration::from_secs(0),
            failing: Arc::new(HashSet::new()),
            objects: Default::default(),
            puts: Default::default(),
            deletes: Default::default(),
            progress: Default::default(),
        }
    }

    pub fn failing(mut self, failing: &[(&str, Mode)]) -> Self {
        self.failing = Arc::new(
            failing
                .iter()
                .map(|(key, mode)| (key.to_string(), *mode))
                .collect(),
        );
        self
    }

    /// Sleep this long before the transfer starts
    pub fn open_delay(mut self, delay: Duration) -> Self {
        self.open_delay = delay;
        self
    }
}

#[async_trait]
impl ObjectStore for MockStore {
    async fn put(
        &self,
        mode: Mode,
        _bucket: &str,
        key: &str,
        path: &Path,
        progress: Arc<ProgressObserver>,
    ) -> Result<Duration, Error> {
        if self.failing.contains(&(key.to_string(), mode)) {
            let injected = io::Error::new(
                io::ErrorKind::Other,
                format!("injected failure ({})", mode),
            );
            return Err(injected).context(err::Io { description: key });
        }
        tokio::time::sleep(self.open_delay).await;
        let data = std::fs::read(path).with_context(|| err::Io {
            description: path.display().to_string(),
        })?;

        let chunks: Vec<&[u8]> = data.chunks(self.chunk_size).collect();
        let per_thread = ((chunks.len() + self.threads - 1) / self.threads).max(1);
        let ((), elapsed) = stopwatch(async {
            std::thread::scope(|s| {
                for part in chunks.chunks(per_thread) {
                    let progress = &progress;
                    s.spawn(move || {
                        for chunk in part {
                            progress.record(chunk.len() as u64);
                        }
                    });
                }
            })
        })
        .await;

        self.progress
            .lock()
            .unwrap()
            .push((progress.seen(), progress.total()));
        self.puts.lock().unwrap().push((mode, key.to_string()));
        self.objects
            .lock()
            .unwrap()
            .insert((mode, key.to_string()), data.len());
        Ok(elapsed)
    }

    async fn delete(&self, mode: Mode, _bucket: &str, key: &str) -> Result<(), Error> {
        self.deletes.lock().unwrap().push((mode, key.to_string()));
        self.objects.lock().unwrap().remove(&(mode, key.to_string()));
        Ok(())
    }
}
