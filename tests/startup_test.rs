//! The binary must refuse to start, without listening, when configuration is
//! incomplete.

use std::path::Path;
use std::process::Command;

use tempfile::TempDir;

fn server(workdir: &Path) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_portal-info"));
    cmd.env_clear().current_dir(workdir);
    cmd
}

#[test]
fn missing_sha256_aborts_startup() {
    let workdir = TempDir::new().unwrap();
    let output = server(workdir.path())
        .envs([
            ("API_KEY", "s3cret"),
            ("PORTAL_VERSION", "1.0.0"),
            ("PORTAL_RELEASE_DATE", "2024-05-01"),
            ("PORTAL_CHANGELOG", "Initial release"),
            ("PORTAL_INSTALLER_TYPE", "inno"),
            ("PORTAL_MANDATORY", "false"),
            ("PORTAL_MIN_SUPPORTED", "1.0.0"),
            ("PORTAL_INSTALLER_PATH", "portal.exe"),
            ("PORT", "0"),
        ])
        .output()
        .expect("server binary should run");

    assert!(!output.status.success());

    let stderr = String::from_utf8_lossy(&output.stderr);
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stderr.contains("PORTAL_SHA256"), "stderr: {stderr}");
    assert!(!stdout.contains("Listening"), "stdout: {stdout}");
}

#[test]
fn missing_installer_location_aborts_startup() {
    let workdir = TempDir::new().unwrap();
    let output = server(workdir.path())
        .envs([
            ("API_KEY", "s3cret"),
            ("PORTAL_VERSION", "1.0.0"),
            ("PORTAL_RELEASE_DATE", "2024-05-01"),
            ("PORTAL_CHANGELOG", "Initial release"),
            ("PORTAL_INSTALLER_TYPE", "inno"),
            ("PORTAL_SHA256", "abcdef"),
            ("PORTAL_MANDATORY", "false"),
            ("PORTAL_MIN_SUPPORTED", "1.0.0"),
            ("PORT", "0"),
        ])
        .output()
        .expect("server binary should run");

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("PORTAL_INSTALLER_PATH"), "stderr: {stderr}");
}

#[test]
fn missing_keys_reported_despite_invalid_log_format() {
    let workdir = TempDir::new().unwrap();
    let output = server(workdir.path())
        .envs([
            ("API_KEY", "s3cret"),
            ("PORTAL_VERSION", "1.0.0"),
            ("PORTAL_RELEASE_DATE", "2024-05-01"),
            ("PORTAL_CHANGELOG", "Initial release"),
            ("PORTAL_INSTALLER_TYPE", "inno"),
            ("PORTAL_MANDATORY", "false"),
            ("PORTAL_MIN_SUPPORTED", "1.0.0"),
            ("PORTAL_INSTALLER_PATH", "portal.exe"),
            ("LOG_FORMAT", "xml"),
            ("PORT", "0"),
        ])
        .output()
        .expect("server binary should run");

    assert!(!output.status.success());

    let stderr = String::from_utf8_lossy(&output.stderr);
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stderr.contains("PORTAL_SHA256"), "stderr: {stderr}");
    assert!(stdout.contains("LOG_FORMAT"), "stdout: {stdout}");
    assert!(!stdout.contains("Listening"), "stdout: {stdout}");
}
