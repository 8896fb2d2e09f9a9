// fwrelease - Firmware Build Hooks
// Copyright (C) 2026 Andrii Shylenko
//
// This software is released under the MIT License.
// See the LICENSE file in the project root for full license information.

//! Best-effort `.env` loading for the pre-build step.

use std::io;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

pub const DEFAULT_ENV_FILE: &str = ".env";

/// Outcome of a successful load. Only keys are recorded, values may be secrets.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct EnvLoaded {
    pub path: PathBuf,
    /// Keys exported into the process environment.
    pub applied: Vec<String>,
    /// Keys left alone because the environment already defined them.
    pub skipped: Vec<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum EnvLoadError {
    #[error("built without .env support, using system environment variables")]
    Unsupported,
    #[error("{0:?} not found")]
    NotFound(PathBuf),
    #[error("failed to parse {path:?} at position {position}: {line}")]
    Parse {
        path: PathBuf,
        line: String,
        position: usize,
    },
    #[error("failed to read {path:?}: {source}")]
    Io { path: PathBuf, source: io::Error },
}

/// Loads `path` into the process environment.
///
/// The whole file is parsed before anything is exported, so a malformed file
/// leaves the environment untouched. Variables that are already set win over
/// the file.
#[cfg(feature = "dotenv")]
pub fn load_env(path: &Path) -> Result<EnvLoaded, EnvLoadError> {
    let iter = dotenvy::from_path_iter(path).map_err(|e| map_dotenv_error(path, e))?;
    let pairs = iter
        .collect::<Result<Vec<(String, String)>, _>>()
        .map_err(|e| map_dotenv_error(path, e))?;

    let mut loaded = EnvLoaded {
        path: path.to_path_buf(),
        ..EnvLoaded::default()
    };
    for (key, value) in pairs {
        if std::env::var_os(&key).is_some() {
            loaded.skipped.push(key);
            continue;
        }
        std::env::set_var(&key, value);
        loaded.applied.push(key);
    }
    Ok(loaded)
}

#[cfg(not(feature = "dotenv"))]
pub fn load_env(_path: &Path) -> Result<EnvLoaded, EnvLoadError> {
    Err(EnvLoadError::Unsupported)
}

#[cfg(feature = "dotenv")]
fn map_dotenv_error(path: &Path, err: dotenvy::Error) -> EnvLoadError {
    match err {
        dotenvy::Error::Io(source) if source.kind() == io::ErrorKind::NotFound => {
            EnvLoadError::NotFound(path.to_path_buf())
        }
        dotenvy::Error::Io(source) => EnvLoadError::Io {
            path: path.to_path_buf(),
            source,
        },
        dotenvy::Error::LineParse(line, position) => EnvLoadError::Parse {
            path: path.to_path_buf(),
            line,
            position,
        },
        other => EnvLoadError::Parse {
            path: path.to_path_buf(),
            line: other.to_string(),
            position: 0,
        },
    }
}

/// Loads `path` (default `.env`) and degrades every failure to a warning.
pub fn load_env_best_effort(path: Option<&Path>) -> Option<EnvLoaded> {
    let path = path.unwrap_or_else(|| Path::new(DEFAULT_ENV_FILE));
    match load_env(path) {
        Ok(loaded) => {
            info!(
                "Loaded {} environment variables from {:?}",
                loaded.applied.len(),
                loaded.path
            );
            Some(loaded)
        }
        Err(EnvLoadError::Unsupported) => {
            warn!("{}", EnvLoadError::Unsupported);
            warn!("Rebuild with the `dotenv` feature to read .env files");
            None
        }
        Err(e) => {
            warn!("Could not load .env file: {}", e);
            None
        }
    }
}
