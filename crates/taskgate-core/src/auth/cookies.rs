use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::PathBuf;
use std::sync::PoisonError;

use anyhow::{Context, Result};
use tracing::debug;

/// Cookie store shared by the transport, the credential accessor and persistence.
pub type CookieJar = reqwest_cookie_store::CookieStoreMutex;

/// Cookie file name in cache directory
const COOKIE_FILE: &str = "cookies.json";

/// On-disk copy of the cookie store so the credential outlives the process.
///
/// Only persistent cookies are written, each with its expiry. Cookies that
/// have expired by the time the file is read are not restored.
pub struct CookieFile {
    cache_dir: PathBuf,
}

impl CookieFile {
    pub fn new(cache_dir: PathBuf) -> Self {
        Self { cache_dir }
    }

    /// Replace the contents of `jar` with the saved cookies that are still live.
    /// Returns how many cookies were restored.
    pub fn load_into(&self, jar: &CookieJar) -> Result<usize> {
        let path = self.cookie_path();
        if !path.exists() {
            return Ok(0);
        }

        let file = File::open(&path).context("Failed to open cookie file")?;
        let restored = cookie_store::serde::json::load(BufReader::new(file))
            .map_err(|e| anyhow::anyhow!(e))
            .context("Failed to parse cookie file")?;

        let count = restored.iter_unexpired().count();
        *jar.lock().unwrap_or_else(PoisonError::into_inner) = restored;
        debug!(count, "Cookies restored");
        Ok(count)
    }

    /// Save the live persistent cookies in `jar`; when there are none the file is removed.
    pub fn save_from(&self, jar: &CookieJar) -> Result<()> {
        let store = jar.lock().unwrap_or_else(PoisonError::into_inner);
        if !store.iter_unexpired().any(|cookie| cookie.is_persistent()) {
            return self.clear();
        }

        let path = self.cookie_path();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let mut writer = BufWriter::new(File::create(&path)?);
        cookie_store::serde::json::save(&store, &mut writer)
            .map_err(|e| anyhow::anyhow!(e))
            .context("Failed to write cookie file")?;
        writer.flush()?;
        Ok(())
    }

    pub fn clear(&self) -> Result<()> {
        let path = self.cookie_path();
        if path.exists() {
            std::fs::remove_file(path)?;
        }
        Ok(())
    }

    fn cookie_path(&self) -> PathBuf {
        self.cache_dir.join(COOKIE_FILE)
    }
}
