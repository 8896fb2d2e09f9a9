// fwrelease - Firmware Build Hooks
// Copyright (C) 2026 Andrii Shylenko
//
// This software is released under the MIT License.
// See the LICENSE file in the project root for full license information.

use goblin::elf::Elf;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactKind {
    /// Flashable image (`.bin`), used for OTA updates.
    Binary,
    /// Linked image with debug symbols (`.elf`).
    DebugSymbols,
    /// Plain-text version marker.
    VersionMarker,
    Other,
}

impl ArtifactKind {
    pub fn from_file_name(name: &str) -> Self {
        match Path::new(name).extension().and_then(|e| e.to_str()) {
            Some("bin") | Some("hex") => ArtifactKind::Binary,
            Some("elf") => ArtifactKind::DebugSymbols,
            Some("txt") => ArtifactKind::VersionMarker,
            _ => ArtifactKind::Other,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElfSummary {
    pub machine: String,
    pub entry: u64,
    pub is_64: bool,
}

pub fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    format!("{:x}", hasher.finalize())
}

/// Parses just enough of an ELF image to report what was linked.
pub fn inspect_elf_bytes(bytes: &[u8]) -> Result<ElfSummary, goblin::error::Error> {
    let elf = Elf::parse(bytes)?;
    Ok(ElfSummary {
        machine: goblin::elf::header::machine_to_str(elf.header.e_machine).to_string(),
        entry: elf.entry,
        is_64: elf.is_64,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_from_name() {
        assert_eq!(ArtifactKind::from_file_name("firmware.bin"), ArtifactKind::Binary);
        assert_eq!(
            ArtifactKind::from_file_name("firmware.elf"),
            ArtifactKind::DebugSymbols
        );
        assert_eq!(
            ArtifactKind::from_file_name("version.txt"),
            ArtifactKind::VersionMarker
        );
        assert_eq!(ArtifactKind::from_file_name("firmware.map"), ArtifactKind::Other);
    }

    #[test]
    fn test_sha256_known_vector() {
        assert_eq!(
            sha256_hex(b"abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn test_inspect_rejects_garbage() {
        assert!(inspect_elf_bytes(b"not an elf").is_err());
    }
}
