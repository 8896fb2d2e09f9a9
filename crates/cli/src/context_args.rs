// fwrelease - Firmware Build Hooks
// Copyright (C) 2026 Andrii Shylenko
//
// This software is released under the MIT License.
// See the LICENSE file in the project root for full license information.

use anyhow::Result;
use clap::Args;
use fwrelease_config::{parse_define_arg, ContextFile};
use fwrelease_core::{BuildEnv, Define};
use std::path::{Path, PathBuf};

const DEFAULT_PROGNAME: &str = "firmware";

fn parse_var(s: &str) -> Result<(String, String), String> {
    match s.split_once('=') {
        Some((name, value)) if !name.trim().is_empty() => {
            Ok((name.trim().to_string(), value.to_string()))
        }
        _ => Err(format!("Invalid variable '{}': expected NAME=VALUE", s)),
    }
}

/// Where the build context comes from when not running inside the orchestrator.
#[derive(Args, Debug, Clone, Default)]
pub struct ContextArgs {
    /// Build context captured as YAML (project_dir, vars, defines)
    #[arg(long, conflicts_with = "project_dir")]
    pub context: Option<PathBuf>,

    /// Project root (default: $PROJECT_DIR)
    #[arg(long)]
    pub project_dir: Option<PathBuf>,

    /// Build output directory, may reference other variables (default: $BUILD_DIR)
    #[arg(long)]
    pub build_dir: Option<String>,

    /// Program name used in the link target (default: $PROGNAME or "firmware")
    #[arg(long)]
    pub prog_name: Option<String>,

    /// Extra substitution variable (repeatable)
    #[arg(long = "var", value_name = "NAME=VALUE", value_parser = parse_var)]
    pub vars: Vec<(String, String)>,

    /// Preprocessor define as passed to the compiler (repeatable)
    #[arg(short = 'D', long = "define", value_name = "NAME=VALUE", value_parser = parse_define_arg)]
    pub defines: Vec<Define>,
}

impl ContextArgs {
    /// Assembles the build context. The result may be incomplete; callers
    /// that need a build directory check [`BuildEnv::validate`].
    pub fn build_env(&self) -> Result<BuildEnv> {
        let mut env = match &self.context {
            Some(path) => {
                let base = path
                    .parent()
                    .filter(|p| !p.as_os_str().is_empty())
                    .unwrap_or_else(|| Path::new("."));
                ContextFile::from_file(path)?.into_build_env(base)
            }
            None => {
                let project_dir = self
                    .project_dir
                    .clone()
                    .or_else(|| std::env::var_os("PROJECT_DIR").map(PathBuf::from))
                    .unwrap_or_default();
                let mut env = BuildEnv::new(project_dir);
                for name in ["BUILD_DIR", "PROGNAME"] {
                    if let Ok(value) = std::env::var(name) {
                        env.set_var(name, value);
                    }
                }
                env
            }
        };

        if let Some(dir) = &self.build_dir {
            env.set_var("BUILD_DIR", dir.clone());
        }
        if let Some(name) = &self.prog_name {
            env.set_var("PROGNAME", name.clone());
        }
        for (name, value) in &self.vars {
            env.set_var(name.clone(), value.clone());
        }
        if env.var("PROGNAME").is_none() {
            env.set_var("PROGNAME", DEFAULT_PROGNAME);
        }

        Ok(env.with_defines(self.defines.iter().cloned()))
    }
}
