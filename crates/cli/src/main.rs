// fwrelease - Firmware Build Hooks
// Copyright (C) 2026 Andrii Shylenko
//
// This software is released under the MIT License.
// See the LICENSE file in the project root for full license information.

mod context_args;
mod publish;

use clap::{Parser, Subcommand};
use fwrelease_config::{load_env_best_effort, EnvLoaded, ReleaseConfig, DEFAULT_ENV_FILE};
use fwrelease_core::{BuildContext, BuildEnv, HookRegistry};
use std::path::PathBuf;
use std::process::{Command, ExitCode};
use tracing::{error, info, warn};

use crate::publish::{PublishArgs, VersionArgs};

pub(crate) const EXIT_OK: u8 = 0;
pub(crate) const EXIT_NOT_FOUND: u8 = 1;
pub(crate) const EXIT_CONFIG_ERROR: u8 = 2;
pub(crate) const EXIT_RUNTIME_ERROR: u8 = 3;

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Pre-build and post-link hooks for firmware releases",
    long_about = None
)]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Load the project's .env file, then optionally run a build command with it.
    Env(EnvArgs),

    /// Copy linked firmware into the release directory and write version.txt.
    Publish(PublishArgs),

    /// Print the firmware version found in the build defines.
    Version(VersionArgs),
}

#[derive(Parser, Debug)]
struct EnvArgs {
    /// Path to the .env file (default: env_file from release.yaml, or .env)
    #[arg(short, long)]
    file: Option<PathBuf>,

    /// Print the names of the variables that were loaded
    #[arg(long)]
    list: bool,

    /// Build command to run with the loaded environment
    #[arg(last = true)]
    command: Vec<String>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Env(args) => run_env(args),
        Commands::Publish(args) => publish::run_publish(args),
        Commands::Version(args) => publish::run_version(args),
    }
}

fn run_env(args: EnvArgs) -> ExitCode {
    let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    let ctx = BuildEnv::new(&cwd);

    let env_file = match args.file {
        Some(file) => file,
        None => match ReleaseConfig::load_for_project(&cwd) {
            Ok(config) => config.env_file,
            Err(e) => {
                warn!("{:#}", e);
                PathBuf::from(DEFAULT_ENV_FILE)
            }
        },
    };

    let mut registry: HookRegistry<Option<EnvLoaded>> = HookRegistry::new();
    let registered = registry.add_pre_action("load_env", move |ctx| {
        let path = ctx.project_dir().join(&env_file);
        Ok(load_env_best_effort(Some(path.as_path())))
    });
    if let Err(e) = registered {
        warn!("{}", e);
    }

    for (_, result) in registry.run_pre_actions(&ctx) {
        match result {
            Ok(Some(loaded)) if args.list => {
                for key in &loaded.applied {
                    println!("{}", key);
                }
            }
            Ok(_) => {}
            Err(e) => warn!("{}", e),
        }
    }

    let Some((program, rest)) = args.command.split_first() else {
        return ExitCode::from(EXIT_OK);
    };

    info!("Running build command: {}", args.command.join(" "));
    match Command::new(program)
        .args(rest)
        .current_dir(ctx.project_dir())
        .status()
    {
        Ok(status) => {
            let code = status.code().unwrap_or(i32::from(EXIT_RUNTIME_ERROR));
            ExitCode::from(u8::try_from(code).unwrap_or(EXIT_RUNTIME_ERROR))
        }
        Err(e) => {
            error!("Failed to run {:?}: {}", program, e);
            ExitCode::from(EXIT_RUNTIME_ERROR)
        }
    }
}
