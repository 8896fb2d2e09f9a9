// fwrelease - Firmware Build Hooks
// Copyright (C) 2026 Andrii Shylenko
//
// This software is released under the MIT License.
// See the LICENSE file in the project root for full license information.

//! Post-link artifact publishing.
//!
//! Copies the linked firmware images into `<project>/<release_dir>` and writes
//! a version marker taken from the compiler defines. Existing files in the
//! release directory are overwritten in place and never removed, so the
//! directory always mirrors the most recent successful build.

use crate::artifact::{self, ArtifactKind};
use crate::context::BuildContext;
use crate::define::{self, FIRMWARE_VERSION_DEFINE};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

pub const DEFAULT_RELEASE_DIR: &str = "releases";
pub const DEFAULT_VERSION_FILE: &str = "version.txt";
pub const DEFAULT_ARTIFACTS: [&str; 2] = ["firmware.bin", "firmware.elf"];

#[derive(Debug, thiserror::Error)]
pub enum PublishError {
    #[error("failed to create release directory {path:?}: {source}")]
    ReleaseDir { path: PathBuf, source: io::Error },
    #[error("failed to copy {from:?} to {to:?}: {source}")]
    Copy {
        from: PathBuf,
        to: PathBuf,
        source: io::Error,
    },
    #[error("failed to write {path:?}: {source}")]
    Write { path: PathBuf, source: io::Error },
    #[error("failed to read {path:?}: {source}")]
    Read { path: PathBuf, source: io::Error },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishOptions {
    /// Release directory, relative to the project root unless absolute.
    pub release_dir: PathBuf,
    /// Artifact file names looked up in the build directory.
    pub artifacts: Vec<String>,
    pub version_define: String,
    pub version_file: String,
    pub write_version_file: bool,
}

impl Default for PublishOptions {
    fn default() -> Self {
        Self {
            release_dir: PathBuf::from(DEFAULT_RELEASE_DIR),
            artifacts: DEFAULT_ARTIFACTS.iter().map(|s| s.to_string()).collect(),
            version_define: FIRMWARE_VERSION_DEFINE.to_string(),
            version_file: DEFAULT_VERSION_FILE.to_string(),
            write_version_file: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublishedFile {
    pub path: PathBuf,
    pub kind: ArtifactKind,
    pub size: u64,
    pub sha256: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublishReport {
    pub build_dir: PathBuf,
    pub release_dir: PathBuf,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    pub files: Vec<PublishedFile>,
}

impl PublishReport {
    pub fn copied_artifacts(&self) -> impl Iterator<Item = &PublishedFile> {
        self.files
            .iter()
            .filter(|f| f.kind != ArtifactKind::VersionMarker)
    }

    pub fn version_file(&self) -> Option<&PublishedFile> {
        self.files
            .iter()
            .find(|f| f.kind == ArtifactKind::VersionMarker)
    }

    /// Human-readable summary, one line per entry.
    pub fn summary_lines(&self) -> Vec<String> {
        if self.files.is_empty() {
            return vec![format!(
                "No firmware artifacts found in {}",
                self.build_dir.display()
            )];
        }
        let mut lines = vec!["Copied build artifacts:".to_string()];
        lines.extend(
            self.files
                .iter()
                .map(|f| format!("  - {}", f.path.display())),
        );
        lines
    }
}

pub fn resolve_release_dir(ctx: &dyn BuildContext, opts: &PublishOptions) -> PathBuf {
    if opts.release_dir.is_absolute() {
        opts.release_dir.clone()
    } else {
        ctx.project_dir().join(&opts.release_dir)
    }
}

/// Publishes the build outputs of `ctx` into the release directory.
///
/// Missing artifacts are skipped. A missing version define only produces a
/// warning.
pub fn publish_artifacts(
    ctx: &dyn BuildContext,
    opts: &PublishOptions,
) -> Result<PublishReport, PublishError> {
    let build_dir = ctx.build_dir();
    let release_dir = resolve_release_dir(ctx, opts);

    fs::create_dir_all(&release_dir).map_err(|source| PublishError::ReleaseDir {
        path: release_dir.clone(),
        source,
    })?;

    let mut files = Vec::new();

    for name in &opts.artifacts {
        let src = build_dir.join(name);
        if !src.is_file() {
            debug!("Artifact not present, skipping: {:?}", src);
            continue;
        }
        let dst = release_dir.join(name);
        copy_with_metadata(&src, &dst).map_err(|source| PublishError::Copy {
            from: src.clone(),
            to: dst.clone(),
            source,
        })?;
        files.push(describe(&dst, ArtifactKind::from_file_name(name))?);
    }

    let version = define::extract_version(ctx.defines(), &opts.version_define);

    if opts.write_version_file {
        match &version {
            Some(version) => {
                let path = release_dir.join(&opts.version_file);
                fs::write(&path, version).map_err(|source| PublishError::Write {
                    path: path.clone(),
                    source,
                })?;
                info!("Generated {} with version: {}", opts.version_file, version);
                files.push(describe(&path, ArtifactKind::VersionMarker)?);
            }
            None => warn!(
                "{} not found in build defines. {} not created.",
                opts.version_define, opts.version_file
            ),
        }
    }

    Ok(PublishReport {
        build_dir,
        release_dir,
        version,
        files,
    })
}

/// Copies contents, modification time and permissions, in that order: the
/// times are set through the still-writable handle before a read-only mode
/// is applied.
fn copy_with_metadata(src: &Path, dst: &Path) -> io::Result<u64> {
    let meta = fs::metadata(src)?;
    // A read-only copy left by an earlier publish cannot be truncated.
    if fs::metadata(dst).is_ok_and(|m| m.permissions().readonly()) {
        fs::remove_file(dst)?;
    }

    let mut out = fs::File::create(dst)?;
    let bytes = io::copy(&mut fs::File::open(src)?, &mut out)?;
    out.set_modified(meta.modified()?)?;
    drop(out);

    fs::set_permissions(dst, meta.permissions())?;
    Ok(bytes)
}

fn describe(path: &Path, kind: ArtifactKind) -> Result<PublishedFile, PublishError> {
    let bytes = fs::read(path).map_err(|source| PublishError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    if kind == ArtifactKind::DebugSymbols {
        match artifact::inspect_elf_bytes(&bytes) {
            Ok(elf) => info!(
                "ELF {:?}: {} machine={} entry={:#x}",
                path.file_name().unwrap_or_default(),
                if elf.is_64 { "ELF64" } else { "ELF32" },
                elf.machine,
                elf.entry
            ),
            Err(e) => warn!("Could not parse {:?} as ELF: {}", path, e),
        }
    }

    Ok(PublishedFile {
        path: path.to_path_buf(),
        kind,
        size: bytes.len() as u64,
        sha256: artifact::sha256_hex(&bytes),
    })
}
