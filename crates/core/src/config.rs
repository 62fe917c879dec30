//! Core runtime configuration.
//!
//! This module defines configuration that should be resolved once at process
//! startup and then passed into core services. The intent is to avoid reading
//! process-wide environment variables during request handling, which can lead
//! to inconsistent behaviour in multi-threaded runtimes and test harnesses.

use std::path::{Path, PathBuf};

use crate::constants::COMMENTS_FILENAME;
use crate::{ReviewError, ReviewResult};

/// Core configuration resolved at startup.
#[derive(Clone, Debug)]
pub struct CoreConfig {
    template_path: PathBuf,
    data_dir: PathBuf,
}

impl CoreConfig {
    /// Create a new `CoreConfig`.
    pub fn new(template_path: PathBuf, data_dir: PathBuf) -> ReviewResult<Self> {
        if template_path.as_os_str().is_empty() {
            return Err(ReviewError::InvalidInput(
                "template_path cannot be empty".into(),
            ));
        }
        if data_dir.as_os_str().is_empty() {
            return Err(ReviewError::InvalidInput("data_dir cannot be empty".into()));
        }

        Ok(Self {
            template_path,
            data_dir,
        })
    }

    /// Path to the Web Template JSON document this process reviews.
    pub fn template_path(&self) -> &Path {
        &self.template_path
    }

    /// Directory holding the process's mutable data (the comment store).
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Path to the comment store document.
    pub fn comments_file(&self) -> PathBuf {
        self.data_dir.join(COMMENTS_FILENAME)
    }
}
