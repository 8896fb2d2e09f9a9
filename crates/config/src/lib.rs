// fwrelease - Firmware Build Hooks
// Copyright (C) 2026 Andrii Shylenko
//
// This software is released under the MIT License.
// See the LICENSE file in the project root for full license information.

pub mod env;

use anyhow::{Context, Result};
use fwrelease_core::publish::{DEFAULT_ARTIFACTS, DEFAULT_RELEASE_DIR, DEFAULT_VERSION_FILE};
use fwrelease_core::{BuildEnv, Define, PublishOptions, FIRMWARE_VERSION_DEFINE};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::debug;

pub use env::{load_env, load_env_best_effort, EnvLoadError, EnvLoaded, DEFAULT_ENV_FILE};

/// File name looked up in the project root when no config path is given.
pub const RELEASE_CONFIG_FILE: &str = "release.yaml";

/// Default schema version for YAML configs
fn default_schema_version() -> String {
    "1.0".to_string()
}

fn default_release_dir() -> PathBuf {
    PathBuf::from(DEFAULT_RELEASE_DIR)
}

fn default_artifacts() -> Vec<String> {
    DEFAULT_ARTIFACTS.iter().map(|s| s.to_string()).collect()
}

fn default_env_file() -> PathBuf {
    PathBuf::from(DEFAULT_ENV_FILE)
}

fn default_version_define() -> String {
    FIRMWARE_VERSION_DEFINE.to_string()
}

fn default_version_file() -> String {
    DEFAULT_VERSION_FILE.to_string()
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct VersionConfig {
    #[serde(default = "default_version_define")]
    pub define: String,
    #[serde(default = "default_version_file")]
    pub file: String,
    #[serde(default = "default_true")]
    pub enabled: bool,
}

impl Default for VersionConfig {
    fn default() -> Self {
        Self {
            define: default_version_define(),
            file: default_version_file(),
            enabled: true,
        }
    }
}

/// `release.yaml`: where and what to publish.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct ReleaseConfig {
    #[serde(default = "default_schema_version")]
    pub schema_version: String,
    #[serde(default = "default_release_dir")]
    pub release_dir: PathBuf,
    #[serde(default = "default_artifacts")]
    pub artifacts: Vec<String>,
    #[serde(default = "default_env_file")]
    pub env_file: PathBuf,
    #[serde(default)]
    pub version: VersionConfig,
}

impl Default for ReleaseConfig {
    fn default() -> Self {
        Self {
            schema_version: default_schema_version(),
            release_dir: default_release_dir(),
            artifacts: default_artifacts(),
            env_file: default_env_file(),
            version: VersionConfig::default(),
        }
    }
}

impl ReleaseConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let f = std::fs::File::open(path)
            .with_context(|| format!("Failed to open release config {:?}", path))?;
        let config: Self = serde_yaml::from_reader(f)
            .with_context(|| format!("Failed to parse release config {:?}", path))?;
        if config.artifacts.iter().any(|a| a.trim().is_empty()) {
            anyhow::bail!("Release config {:?} lists an empty artifact name", path);
        }
        Ok(config)
    }

    /// Reads `<project_dir>/release.yaml`, falling back to defaults when the
    /// file does not exist.
    pub fn load_for_project(project_dir: &Path) -> Result<Self> {
        let path = project_dir.join(RELEASE_CONFIG_FILE);
        if !path.is_file() {
            debug!("No {:?}, using default release config", path);
            return Ok(Self::default());
        }
        Self::from_file(path)
    }

    pub fn publish_options(&self) -> PublishOptions {
        PublishOptions {
            release_dir: self.release_dir.clone(),
            artifacts: self.artifacts.clone(),
            version_define: self.version.define.clone(),
            version_file: self.version.file.clone(),
            write_version_file: self.version.enabled,
        }
    }
}

/// Build context captured to a YAML file, for running hooks outside the
/// orchestrator.
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct ContextFile {
    #[serde(default)]
    pub project_dir: Option<PathBuf>,
    #[serde(default)]
    pub vars: BTreeMap<String, String>,
    #[serde(default)]
    pub defines: Vec<Define>,
}

impl ContextFile {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read build context {:?}", path))?;
        serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse build context {:?}", path))
    }

    /// Converts into a [`BuildEnv`]. A relative `project_dir` is resolved
    /// against `base_dir` (normally the directory holding the file).
    pub fn into_build_env(self, base_dir: &Path) -> BuildEnv {
        let project_dir = match self.project_dir {
            Some(dir) if dir.is_absolute() => dir,
            Some(dir) => base_dir.join(dir),
            None => base_dir.to_path_buf(),
        };
        let mut env = BuildEnv::new(project_dir).with_defines(self.defines);
        for (name, value) in self.vars {
            env.set_var(name, value);
        }
        env
    }
}

/// Parses a `-D NAME=VALUE` style argument into a raw define.
pub fn parse_define_arg(s: &str) -> std::result::Result<Define, String> {
    let name = Define::raw(s).name().trim().to_string();
    if name.is_empty() {
        return Err(format!("Invalid define '{}': missing name", s));
    }
    Ok(Define::raw(s))
}
