#![doc = include_str!("../README.md")]

use parking_lot::Mutex;
use snowbank::{INITIAL_SEED, OptimisticDataStore};
use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::debug;

/// A file-per-scope [`OptimisticDataStore`].
///
/// Each scope's seed lives in `<dir>/<scope>.txt`. A read for a scope with
/// no file creates it with [`INITIAL_SEED`]. Writes are conditional on the
/// file still holding the content this instance last read, checked under an
/// instance-local lock; see the crate docs for the limits of that check.
pub struct FileDataStore {
    dir: PathBuf,
    observed: Mutex<HashMap<String, String>>,
    write_lock: tokio::sync::Mutex<()>,
}

impl FileDataStore {
    /// Creates a store rooted at `dir`. The directory must already exist.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            observed: Mutex::new(HashMap::new()),
            write_lock: tokio::sync::Mutex::new(()),
        }
    }

    /// Returns the path of the seed file backing `scope_name`.
    pub fn seed_path(&self, scope_name: &str) -> PathBuf {
        self.dir.join(format!("{scope_name}.txt"))
    }

    async fn read_or_seed(&self, path: &Path) -> io::Result<String> {
        match fs::read_to_string(path).await {
            Ok(content) => Ok(content),
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                // First use of this scope anywhere: publish the initial
                // seed. create_new loses gracefully to a racing creator.
                let created = fs::OpenOptions::new()
                    .write(true)
                    .create_new(true)
                    .open(path)
                    .await;
                match created {
                    Ok(mut file) => {
                        file.write_all(INITIAL_SEED.as_bytes()).await?;
                        file.flush().await?;
                        debug!(path = %path.display(), "seeded new scope file");
                        Ok(INITIAL_SEED.to_owned())
                    }
                    Err(err) if err.kind() == io::ErrorKind::AlreadyExists => {
                        fs::read_to_string(path).await
                    }
                    Err(err) => Err(err),
                }
            }
            Err(err) => Err(err),
        }
    }
}

impl OptimisticDataStore for FileDataStore {
    type Error = io::Error;

    async fn read_seed(&self, scope_name: &str) -> Result<String, Self::Error> {
        let path = self.seed_path(scope_name);
        let content = self.read_or_seed(&path).await?;
        self.observed
            .lock()
            .insert(scope_name.to_owned(), content.clone());
        Ok(content)
    }

    async fn try_write_seed(&self, scope_name: &str, value: &str) -> Result<bool, Self::Error> {
        let _serialized = self.write_lock.lock().await;

        let path = self.seed_path(scope_name);
        let current = fs::read_to_string(&path).await?;
        let observed = self.observed.lock().get(scope_name).cloned();
        if observed.as_deref() != Some(current.as_str()) {
            debug!(scope = scope_name, "seed file changed since last read");
            return Ok(false);
        }

        fs::write(&path, value).await?;
        // The write is its own observation of the new state.
        self.observed
            .lock()
            .insert(scope_name.to_owned(), value.to_owned());
        Ok(true)
    }
}
