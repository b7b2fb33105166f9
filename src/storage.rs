//! Storage layer for planviz
//!
//! Manages the data directory holding project documents, configuration, and
//! rendered reports:
//!
//! ```text
//! <data-dir>/
//!   planviz.toml              # Optional configuration
//!   projects/
//!     <uuid>.json             # One fully hydrated project document each
//!   reports/                  # Default output directory for rendered files
//! ```
//!
//! The data directory comes from `--data-dir` / `PLANVIZ_DATA_DIR`, falling
//! back to the platform-local data directory.

use std::fs;
use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use serde::{de::DeserializeOwned, Serialize};
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::lock;

/// Name of the project documents directory
pub const PROJECTS_DIR: &str = "projects";

/// Name of the default report output directory
pub const REPORTS_DIR: &str = "reports";

/// Name of the configuration file
pub const CONFIG_FILE: &str = "planviz.toml";

/// Storage manager for the planviz data directory
#[derive(Debug, Clone)]
pub struct Storage {
    data_dir: PathBuf,
}

impl Storage {
    /// Create a storage manager rooted at the given data directory
    pub fn new(data_dir: PathBuf) -> Self {
        Self { data_dir }
    }

    /// Resolve the data directory: an explicit path wins, otherwise the
    /// platform-local data directory for planviz.
    pub fn resolve(data_dir: Option<PathBuf>) -> Result<Self> {
        if let Some(dir) = data_dir {
            return Ok(Self::new(dir));
        }
        let dirs = ProjectDirs::from("", "", "planviz").ok_or(Error::DataDirUnavailable)?;
        Ok(Self::new(dirs.data_local_dir().to_path_buf()))
    }

    // =========================================================================
    // Path accessors
    // =========================================================================

    /// Root of the data directory
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Path to the project documents directory
    pub fn projects_dir(&self) -> PathBuf {
        self.data_dir.join(PROJECTS_DIR)
    }

    /// Path to the document for a single project
    pub fn project_file(&self, id: Uuid) -> PathBuf {
        self.projects_dir().join(format!("{id}.json"))
    }

    /// Path to the configuration file
    pub fn config_file(&self) -> PathBuf {
        self.data_dir.join(CONFIG_FILE)
    }

    /// Path to the default report output directory
    pub fn reports_dir(&self) -> PathBuf {
        self.data_dir.join(REPORTS_DIR)
    }

    // =========================================================================
    // Directory initialization
    // =========================================================================

    /// Create the data directory structure if missing
    pub fn init(&self) -> Result<()> {
        fs::create_dir_all(&self.data_dir)?;
        fs::create_dir_all(self.projects_dir())?;
        Ok(())
    }

    /// Check whether the data directory has been initialized
    pub fn is_initialized(&self) -> bool {
        self.projects_dir().exists()
    }

    // =========================================================================
    // File I/O helpers (atomic writes for safety)
    // =========================================================================

    /// Write JSON data atomically (write to temp, then rename)
    ///
    /// Readers never observe a partially written document.
    pub fn write_json<T: Serialize>(&self, path: &Path, data: &T) -> Result<()> {
        let json = serde_json::to_string_pretty(data)?;
        lock::replace_file(path, json.as_bytes())
    }

    /// Read JSON data from a file
    pub fn read_json<T: DeserializeOwned>(&self, path: &Path) -> Result<T> {
        let content = fs::read_to_string(path)?;
        let data: T = serde_json::from_str(&content)?;
        Ok(data)
    }
}
