// fwrelease - Firmware Build Hooks
// Copyright (C) 2026 Andrii Shylenko
//
// This software is released under the MIT License.
// See the LICENSE file in the project root for full license information.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use std::time::{SystemTime, UNIX_EPOCH};

fn temp_project(prefix: &str) -> PathBuf {
    let nonce = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    let dir = std::env::temp_dir()
        .join("fwrelease-cli-tests")
        .join(format!("{}-{}", prefix, nonce));
    fs::create_dir_all(dir.join(".pio/build/esp32dev")).expect("Failed to create temp project");
    dir
}

fn command(args: &[&str]) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_fwrelease"));
    cmd.args(args)
        .env_remove("PROJECT_DIR")
        .env_remove("BUILD_DIR")
        .env_remove("PROGNAME");
    cmd
}

fn fwrelease(args: &[&str]) -> Output {
    command(args).output().expect("Failed to execute fwrelease")
}

fn publish(project: &Path, extra: &[&str]) -> Output {
    let project_arg = project.to_str().unwrap();
    let mut args = vec![
        "publish",
        "--project-dir",
        project_arg,
        "--build-dir",
        "$PROJECT_DIR/.pio/build/$PIOENV",
        "--var",
        "PIOENV=esp32dev",
    ];
    args.extend_from_slice(extra);
    fwrelease(&args)
}

#[test]
fn test_publish_copies_artifacts_and_version() {
    let project = temp_project("publish");
    let build = project.join(".pio/build/esp32dev");
    fs::write(build.join("firmware.bin"), b"image").unwrap();
    fs::write(build.join("firmware.elf"), b"symbols").unwrap();

    let output = publish(&project, &["-D", "FIRMWARE_VERSION=\\\"1.2.3\\\""]);
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(output.status.success(), "stderr: {}", stderr);
    assert!(stderr.contains("Copied build artifacts:"), "stderr: {}", stderr);

    let releases = project.join("releases");
    assert_eq!(fs::read(releases.join("firmware.bin")).unwrap(), b"image");
    assert_eq!(fs::read(releases.join("firmware.elf")).unwrap(), b"symbols");
    assert_eq!(
        fs::read_to_string(releases.join("version.txt")).unwrap(),
        "1.2.3"
    );

    fs::remove_dir_all(&project).ok();
}

#[test]
fn test_publish_json_report() {
    let project = temp_project("json");
    fs::write(project.join(".pio/build/esp32dev/firmware.bin"), b"abc").unwrap();

    let output = publish(&project, &["--json", "-D", "FIRMWARE_VERSION=2.0.0"]);
    assert!(output.status.success());

    let report: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("stdout is not a JSON report");
    assert_eq!(report["version"], "2.0.0");
    let files = report["files"].as_array().unwrap();
    assert_eq!(files.len(), 2);
    assert_eq!(files[0]["kind"], "binary");
    assert_eq!(
        files[0]["sha256"],
        "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
    );
    assert_eq!(files[1]["kind"], "version_marker");

    fs::remove_dir_all(&project).ok();
}

#[test]
fn test_publish_warns_without_version_define() {
    let project = temp_project("no-version");

    let output = publish(&project, &[]);
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(output.status.success());
    assert!(stderr.contains("version.txt not created"), "stderr: {}", stderr);
    assert!(stderr.contains("No firmware artifacts found"), "stderr: {}", stderr);
    assert!(project.join("releases").is_dir());
    assert!(!project.join("releases/version.txt").exists());

    fs::remove_dir_all(&project).ok();
}

#[test]
fn test_publish_from_context_file_and_release_config() {
    let project = temp_project("context");
    fs::write(project.join(".pio/build/esp32dev/firmware.elf"), b"elf").unwrap();
    fs::write(
        project.join("release.yaml"),
        "release_dir: dist\nversion:\n  file: VERSION\n",
    )
    .unwrap();
    let context = project.join("build.yaml");
    fs::write(
        &context,
        r#"
vars:
  BUILD_DIR: "$PROJECT_DIR/.pio/build/esp32dev"
defines:
  - NDEBUG
  - [FIRMWARE_VERSION, "\"4.5.6\""]
"#,
    )
    .unwrap();

    let output = fwrelease(&["publish", "--context", context.to_str().unwrap()]);
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    assert!(project.join("dist/firmware.elf").is_file());
    assert_eq!(
        fs::read_to_string(project.join("dist/VERSION")).unwrap(),
        "4.5.6"
    );

    fs::remove_dir_all(&project).ok();
}

#[test]
fn test_publish_without_context_is_noop() {
    let output = fwrelease(&["publish"]);
    assert!(output.status.success());
    assert!(output.stdout.is_empty());
}

#[test]
fn test_malformed_release_config_is_config_error() {
    let project = temp_project("bad-config");
    fs::write(project.join("release.yaml"), "artifacts: {not: [a list").unwrap();

    let output = publish(&project, &[]);
    assert_eq!(output.status.code(), Some(2));
    assert!(!project.join("releases").exists());

    fs::remove_dir_all(&project).ok();
}

#[test]
fn test_version_command() {
    let output = fwrelease(&[
        "version",
        "-D",
        "BOARD=esp32",
        "-D",
        "FIRMWARE_VERSION=\"7.0.1\"",
    ]);
    assert!(output.status.success());
    assert_eq!(String::from_utf8_lossy(&output.stdout).trim(), "7.0.1");

    let output = fwrelease(&["version", "-D", "BOARD=esp32"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(output.stdout.is_empty());
}

#[test]
fn test_version_command_with_custom_define_name() {
    let output = fwrelease(&[
        "version",
        "--version-define",
        "APP_VERSION",
        "-D",
        "FIRMWARE_VERSION=1.0.0",
        "--define",
        "APP_VERSION=3.3.3",
    ]);
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    assert_eq!(String::from_utf8_lossy(&output.stdout).trim(), "3.3.3");
}

#[test]
fn test_publish_failure_exit_code_depends_on_strict() {
    let project = temp_project("strict");
    fs::write(project.join(".pio/build/esp32dev/firmware.bin"), b"image").unwrap();
    // A regular file where the release directory should go.
    fs::write(project.join("releases"), b"not a directory").unwrap();

    let output = publish(&project, &["-D", "FIRMWARE_VERSION=1.0.0"]);
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert_eq!(output.status.code(), Some(0), "stderr: {}", stderr);
    assert!(stderr.contains("failed"), "stderr: {}", stderr);

    let output = publish(&project, &["--strict", "-D", "FIRMWARE_VERSION=1.0.0"]);
    assert_eq!(
        output.status.code(),
        Some(3),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    assert!(project.join("releases").is_file());

    fs::remove_dir_all(&project).ok();
}

#[cfg(all(unix, feature = "dotenv"))]
#[test]
fn test_env_runs_command_with_loaded_variables() {
    let project = temp_project("env");
    let env_file = project.join("secrets.env");
    fs::write(&env_file, "FWRELEASE_CLI_TEST_TOKEN=from-dotenv\n").unwrap();

    let output = fwrelease(&[
        "env",
        "--file",
        env_file.to_str().unwrap(),
        "--list",
        "--",
        "sh",
        "-c",
        "echo token=$FWRELEASE_CLI_TEST_TOKEN; exit 4",
    ]);
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(output.status.code(), Some(4));
    assert!(stdout.contains("FWRELEASE_CLI_TEST_TOKEN\n"), "stdout: {}", stdout);
    assert!(stdout.contains("token=from-dotenv"), "stdout: {}", stdout);

    fs::remove_dir_all(&project).ok();
}

#[cfg(feature = "dotenv")]
#[test]
fn test_env_file_from_release_config() {
    let project = temp_project("env-config");
    fs::write(project.join("release.yaml"), "env_file: config/custom.env\n").unwrap();
    fs::create_dir_all(project.join("config")).unwrap();
    fs::write(
        project.join("config/custom.env"),
        "FWRELEASE_CLI_CONFIGURED_ENV=1\n",
    )
    .unwrap();
    fs::write(project.join(".env"), "FWRELEASE_CLI_DEFAULT_ENV=1\n").unwrap();

    let output = command(&["env", "--list"])
        .current_dir(&project)
        .env_remove("FWRELEASE_CLI_CONFIGURED_ENV")
        .output()
        .expect("Failed to execute fwrelease");
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(output.status.success());
    assert_eq!(stdout.trim(), "FWRELEASE_CLI_CONFIGURED_ENV");

    fs::remove_dir_all(&project).ok();
}

#[cfg(feature = "dotenv")]
#[test]
fn test_env_missing_file_is_not_fatal() {
    let output = fwrelease(&["env", "--file", "/nonexistent/fwrelease/.env"]);
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(output.status.success());
    assert!(stderr.contains("Could not load .env file"), "stderr: {}", stderr);
}
