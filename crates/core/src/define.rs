// fwrelease - Firmware Build Hooks
// Copyright (C) 2026 Andrii Shylenko
//
// This software is released under the MIT License.
// See the LICENSE file in the project root for full license information.

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Name of the define carrying the firmware version string.
pub const FIRMWARE_VERSION_DEFINE: &str = "FIRMWARE_VERSION";

/// A compile-time preprocessor definition as handed over by the orchestrator.
///
/// Orchestrators report defines either as a `(name, value)` pair or as a raw
/// `NAME=value` (or bare `NAME`) string, so both shapes are kept verbatim.
/// Pair values may be any scalar (`[BOARD_REV, 3]`) and are stored as text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Define {
    Pair(String, #[serde(deserialize_with = "scalar_to_string")] String),
    Raw(String),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Scalar {
    Str(String),
    Bool(bool),
    Int(i64),
    UInt(u64),
    Float(f64),
}

fn scalar_to_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Scalar::deserialize(deserializer)? {
        Scalar::Str(s) => s,
        Scalar::Bool(b) => b.to_string(),
        Scalar::Int(i) => i.to_string(),
        Scalar::UInt(u) => u.to_string(),
        // Debug keeps the fraction of whole numbers: 1.0 stays "1.0".
        Scalar::Float(f) => format!("{:?}", f),
    })
}

impl Define {
    pub fn pair(name: impl Into<String>, value: impl Into<String>) -> Self {
        Define::Pair(name.into(), value.into())
    }

    pub fn raw(s: impl Into<String>) -> Self {
        Define::Raw(s.into())
    }

    pub fn name(&self) -> &str {
        match self {
            Define::Pair(name, _) => name.as_str(),
            Define::Raw(s) => s.split_once('=').map_or(s.as_str(), |(name, _)| name),
        }
    }

    /// Value of the define if it is named `name`.
    ///
    /// A raw string only matches in its `NAME=value` form; a bare `NAME` flag
    /// carries no value.
    pub fn value_of(&self, name: &str) -> Option<&str> {
        match self {
            Define::Pair(n, value) if n == name => Some(value.as_str()),
            Define::Pair(..) => None,
            Define::Raw(s) => s
                .strip_prefix(name)
                .and_then(|rest| rest.strip_prefix('=')),
        }
    }
}

impl fmt::Display for Define {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Define::Pair(name, value) => write!(f, "{}={}", name, value),
            Define::Raw(s) => f.write_str(s),
        }
    }
}

/// Returns the raw value of the first define named `name`, in collection order.
pub fn find_define<'a>(defines: &'a [Define], name: &str) -> Option<&'a str> {
    defines.iter().find_map(|d| d.value_of(name))
}

/// Removes the quoting and escaping the orchestrator adds to string defines,
/// e.g. `\"1.0.0\"` becomes `1.0.0`.
pub fn sanitize_define_value(value: &str) -> String {
    value
        .chars()
        .filter(|c| !matches!(*c, '\\' | '"' | '\''))
        .collect()
}

/// Extracts the plain version string from `defines`.
///
/// Returns `None` when no define named `name` exists or when its value is
/// empty once quotes and escapes are stripped.
pub fn extract_version(defines: &[Define], name: &str) -> Option<String> {
    let version = sanitize_define_value(find_define(defines, name)?);
    if version.is_empty() {
        None
    } else {
        Some(version)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pair_define_is_unquoted() {
        let defines = vec![Define::pair(FIRMWARE_VERSION_DEFINE, "\\\"1.0.0\\\"")];
        assert_eq!(
            extract_version(&defines, FIRMWARE_VERSION_DEFINE).as_deref(),
            Some("1.0.0")
        );
    }

    #[test]
    fn test_raw_define_is_unquoted() {
        let defines = vec![Define::raw("FIRMWARE_VERSION=\"2.1.0-rc1\"")];
        assert_eq!(
            extract_version(&defines, FIRMWARE_VERSION_DEFINE).as_deref(),
            Some("2.1.0-rc1")
        );
    }

    #[test]
    fn test_first_match_wins() {
        let defines = vec![
            Define::raw("BOARD=esp32"),
            Define::raw("FIRMWARE_VERSION=1.0.0"),
            Define::pair("FIRMWARE_VERSION", "9.9.9"),
        ];
        assert_eq!(
            extract_version(&defines, FIRMWARE_VERSION_DEFINE).as_deref(),
            Some("1.0.0")
        );
    }

    #[test]
    fn test_prefix_names_do_not_match() {
        let defines = vec![
            Define::raw("FIRMWARE_VERSION_MAJOR=1"),
            Define::pair("FIRMWARE_VERSIONS", "2"),
            Define::raw("FIRMWARE_VERSION"),
        ];
        assert_eq!(extract_version(&defines, FIRMWARE_VERSION_DEFINE), None);
    }

    #[test]
    fn test_empty_version_counts_as_missing() {
        let defines = vec![Define::pair(FIRMWARE_VERSION_DEFINE, "\\\"\\\"")];
        assert_eq!(extract_version(&defines, FIRMWARE_VERSION_DEFINE), None);
    }

    #[test]
    fn test_define_name_and_display() {
        assert_eq!(Define::raw("DEBUG").name(), "DEBUG");
        assert_eq!(Define::raw("LEVEL=3").name(), "LEVEL");
        assert_eq!(Define::pair("LEVEL", "3").to_string(), "LEVEL=3");
    }

    #[test]
    fn test_sanitize_keeps_inner_characters() {
        assert_eq!(sanitize_define_value("\\\"v1.2 (beta)\\\""), "v1.2 (beta)");
        assert_eq!(sanitize_define_value("'3.0'"), "3.0");
    }
}
