//! Teacher credentials, read from a JSON side file.
//!
//! The file is re-read on every call so edits take effect without a restart.

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::models::TeacherRoster;

#[derive(Error, Debug)]
pub enum CredentialError {
    #[error("failed to read credential file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("malformed credential file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Clone, Debug)]
pub struct CredentialLoader {
    path: PathBuf,
}

impl CredentialLoader {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Username -> plaintext password, fresh from disk
    pub fn load_teachers(&self) -> Result<HashMap<String, String>, CredentialError> {
        let raw = fs::read_to_string(&self.path).map_err(|source| CredentialError::Read {
            path: self.path.clone(),
            source,
        })?;
        let roster: TeacherRoster =
            serde_json::from_str(&raw).map_err(|source| CredentialError::Parse {
                path: self.path.clone(),
                source,
            })?;
        Ok(roster.teachers)
    }
}

/// Writes `contents` to a fresh file under the system temp dir.
#[cfg(test)]
pub(crate) fn write_temp_credentials(name: &str, contents: &str) -> PathBuf {
    let dir = std::env::temp_dir().join("mergington_test_credentials");
    fs::create_dir_all(&dir).expect("create temp credential dir");
    let path = dir.join(format!("{name}.json"));
    fs::write(&path, contents).expect("write temp credential file");
    path
}
