use color_eyre::Result;
use std::fs;
use std::path::{Path, PathBuf};

/// Log file written while the interactive dashboard owns the terminal
pub const LOG_FILE: &str = "co2dash.log";

/// Manages the cache directory that holds the dashboard's log file
#[derive(Clone)]
pub struct CacheManager {
    pub(crate) cache_dir: PathBuf,
}

impl CacheManager {
    /// Create a new CacheManager for the given app name
    pub fn new(app_name: &str) -> Result<Self> {
        let cache_dir = dirs::cache_dir()
            .ok_or_else(|| color_eyre::eyre::eyre!("Could not determine cache directory"))?
            .join(app_name);

        Ok(Self { cache_dir })
    }

    /// Create a CacheManager rooted at a custom directory (primarily for testing)
    pub fn with_dir(cache_dir: PathBuf) -> Self {
        Self { cache_dir }
    }

    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }

    /// Get path to a specific cache file
    pub fn cache_file(&self, filename: &str) -> PathBuf {
        self.cache_dir.join(filename)
    }

    /// Ensure the cache directory exists
    pub fn ensure_cache_dir(&self) -> Result<()> {
        if !self.cache_dir.exists() {
            fs::create_dir_all(&self.cache_dir)?;
        }
        Ok(())
    }

    /// Create (truncating) the log file for this session.
    pub fn open_log_file(&self) -> Result<fs::File> {
        self.ensure_cache_dir()?;
        Ok(fs::File::create(self.cache_file(LOG_FILE))?)
    }
}
