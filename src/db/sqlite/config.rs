use std::path::PathBuf;

use anyhow::{Context, Result};
use log::info;
use serde::{Deserialize, Serialize};

use crate::config::{expandenv, CommonConfig, PathSet};

use super::SqliteConnection;

#[derive(Debug, Default, Serialize, Deserialize, Clone)]
pub struct SqliteConfig {
    #[serde(default)]
    pub memory: bool,

    /// Database file, default is `trivoxel.db` under the data directory.
    #[serde(default)]
    pub path: Option<String>,

    #[serde(skip)]
    file: PathBuf,
}

impl CommonConfig for SqliteConfig {
    fn complete(&mut self, ps: &PathSet) -> Result<()> {
        if self.memory {
            return Ok(());
        }

        self.file = match self.path {
            Some(ref path) => PathBuf::from(expandenv("sqlite.path", path)?),
            None => ps.data_dir.join("trivoxel.db"),
        };

        Ok(())
    }
}

impl SqliteConfig {
    pub fn build(&self) -> Result<SqliteConnection> {
        if self.memory {
            info!("Using in-memory sqlite database, data is lost on exit");
            return SqliteConnection::memory();
        }

        info!("Opening sqlite database {}", self.file.display());
        SqliteConnection::open(&self.file)
            .with_context(|| format!("open sqlite database {}", self.file.display()))
    }
}
