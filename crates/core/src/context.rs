// fwrelease - Firmware Build Hooks
// Copyright (C) 2026 Andrii Shylenko
//
// This software is released under the MIT License.
// See the LICENSE file in the project root for full license information.

use crate::define::Define;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Substitution depth after which nested `$VAR` references are left unexpanded.
const MAX_SUBST_DEPTH: usize = 16;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ContextError {
    #[error("build context unavailable: {0} is not set")]
    Unavailable(&'static str),
}

/// What the build orchestrator exposes to hooks.
pub trait BuildContext {
    /// Root of the firmware project.
    fn project_dir(&self) -> &Path;

    /// Expands `$NAME` and `${NAME}` references the way the orchestrator does.
    fn subst(&self, template: &str) -> String;

    /// Preprocessor definitions passed to the compiler, in command-line order.
    fn defines(&self) -> &[Define];

    /// Build output directory (`$BUILD_DIR`).
    fn build_dir(&self) -> PathBuf {
        PathBuf::from(self.subst("$BUILD_DIR"))
    }
}

/// A self-contained build context: project root, variable table and defines.
#[derive(Debug, Clone, Default)]
pub struct BuildEnv {
    project_dir: PathBuf,
    vars: BTreeMap<String, String>,
    defines: Vec<Define>,
}

impl BuildEnv {
    pub fn new(project_dir: impl Into<PathBuf>) -> Self {
        Self {
            project_dir: project_dir.into(),
            vars: BTreeMap::new(),
            defines: Vec::new(),
        }
    }

    pub fn with_var(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.vars.insert(name.into(), value.into());
        self
    }

    pub fn with_defines(mut self, defines: impl IntoIterator<Item = Define>) -> Self {
        self.defines.extend(defines);
        self
    }

    pub fn set_var(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.vars.insert(name.into(), value.into());
    }

    pub fn var(&self, name: &str) -> Option<&str> {
        if name == "PROJECT_DIR" {
            return self.project_dir.to_str();
        }
        self.vars.get(name).map(String::as_str)
    }

    /// Checks that hooks have enough to work with: a project root and a
    /// build directory that expands to something.
    pub fn validate(&self) -> Result<(), ContextError> {
        if self.project_dir.as_os_str().is_empty() {
            return Err(ContextError::Unavailable("PROJECT_DIR"));
        }
        if self.subst("$BUILD_DIR").trim().is_empty() {
            return Err(ContextError::Unavailable("BUILD_DIR"));
        }
        Ok(())
    }

    fn expand(&self, template: &str, depth: usize) -> String {
        let mut out = String::with_capacity(template.len());
        let mut rest = template;

        while let Some(pos) = rest.find('$') {
            out.push_str(&rest[..pos]);
            let after = &rest[pos + 1..];

            if let Some(tail) = after.strip_prefix('$') {
                out.push('$');
                rest = tail;
                continue;
            }

            let (name, tail) = if let Some(braced) = after.strip_prefix('{') {
                match braced.find('}') {
                    Some(end) => (&braced[..end], &braced[end + 1..]),
                    None => {
                        // Unterminated brace, keep the text as-is.
                        out.push('$');
                        rest = after;
                        continue;
                    }
                }
            } else {
                let end = after
                    .char_indices()
                    .find(|&(i, c)| !is_var_char(i, c))
                    .map_or(after.len(), |(i, _)| i);
                (&after[..end], &after[end..])
            };

            if name.is_empty() {
                out.push('$');
                rest = after;
                continue;
            }

            match self.var(name) {
                Some(value) if depth < MAX_SUBST_DEPTH => {
                    out.push_str(&self.expand(value, depth + 1))
                }
                Some(value) => out.push_str(value),
                None => {}
            }
            rest = tail;
        }

        out.push_str(rest);
        out
    }
}

fn is_var_char(index: usize, c: char) -> bool {
    c == '_' || c.is_ascii_alphabetic() || (index > 0 && c.is_ascii_digit())
}

impl BuildContext for BuildEnv {
    fn project_dir(&self) -> &Path {
        &self.project_dir
    }

    fn subst(&self, template: &str) -> String {
        self.expand(template, 0)
    }

    fn defines(&self) -> &[Define] {
        &self.defines
    }
}
