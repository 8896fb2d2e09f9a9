// fwrelease - Firmware Build Hooks
// Copyright (C) 2026 Andrii Shylenko
//
// This software is released under the MIT License.
// See the LICENSE file in the project root for full license information.

use crate::context_args::ContextArgs;
use crate::{EXIT_CONFIG_ERROR, EXIT_NOT_FOUND, EXIT_OK, EXIT_RUNTIME_ERROR};
use clap::Parser;
use fwrelease_config::ReleaseConfig;
use fwrelease_core::hooks::{self, HookRegistry};
use fwrelease_core::{extract_version, BuildContext, PublishReport, FIRMWARE_VERSION_DEFINE};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{debug, error, warn};

#[derive(Parser, Debug)]
pub struct PublishArgs {
    #[command(flatten)]
    pub context: ContextArgs,

    /// Path to the release config (default: <project>/release.yaml)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Override the release directory
    #[arg(long)]
    pub release_dir: Option<PathBuf>,

    /// Do not write the version marker file
    #[arg(long)]
    pub no_version_file: bool,

    /// Print the publish report as JSON on stdout
    #[arg(long)]
    pub json: bool,

    /// Exit non-zero when publishing fails instead of only logging it
    #[arg(long)]
    pub strict: bool,
}

#[derive(Parser, Debug)]
pub struct VersionArgs {
    #[command(flatten)]
    pub context: ContextArgs,

    /// Name of the define holding the version
    #[arg(long = "version-define", value_name = "NAME", default_value = FIRMWARE_VERSION_DEFINE)]
    pub version_define: String,
}

pub fn run_publish(args: PublishArgs) -> ExitCode {
    let env = match args.context.build_env() {
        Ok(env) => env,
        Err(e) => {
            error!("{:#}", e);
            return ExitCode::from(EXIT_CONFIG_ERROR);
        }
    };

    // Outside of a build there is nothing to hook into.
    if let Err(e) = env.validate() {
        debug!("Skipping publish: {}", e);
        return ExitCode::from(EXIT_OK);
    }

    let config = match &args.config {
        Some(path) => ReleaseConfig::from_file(path),
        None => ReleaseConfig::load_for_project(env.project_dir()),
    };
    let config = match config {
        Ok(config) => config,
        Err(e) => {
            error!("{:#}", e);
            return ExitCode::from(EXIT_CONFIG_ERROR);
        }
    };

    let mut opts = config.publish_options();
    if let Some(dir) = args.release_dir {
        opts.release_dir = dir;
    }
    if args.no_version_file {
        opts.write_version_file = false;
    }

    let mut registry = HookRegistry::new();
    if !hooks::try_register_publisher(Some(&mut registry), opts) {
        return ExitCode::from(EXIT_OK);
    }

    let link_target = PathBuf::from(env.subst(hooks::LINK_TARGET));
    let mut status = EXIT_OK;
    for (name, result) in registry.run_post_actions(&link_target, &env) {
        match result {
            Ok(report) => {
                if args.json {
                    print_json(&report);
                }
            }
            Err(e) if args.strict => {
                error!("Hook '{}' failed: {}", name, e);
                status = EXIT_RUNTIME_ERROR;
            }
            Err(e) => warn!("Hook '{}' failed: {}", name, e),
        }
    }
    ExitCode::from(status)
}

fn print_json(report: &PublishReport) {
    match serde_json::to_string_pretty(report) {
        Ok(json) => println!("{}", json),
        Err(e) => error!("Failed to serialize publish report: {}", e),
    }
}

pub fn run_version(args: VersionArgs) -> ExitCode {
    let env = match args.context.build_env() {
        Ok(env) => env,
        Err(e) => {
            error!("{:#}", e);
            return ExitCode::from(EXIT_CONFIG_ERROR);
        }
    };

    match extract_version(env.defines(), &args.version_define) {
        Some(version) => {
            println!("{}", version);
            ExitCode::from(EXIT_OK)
        }
        None => {
            warn!("{} not found in build defines", args.version_define);
            ExitCode::from(EXIT_NOT_FOUND)
        }
    }
}
