//! Integration tests for core CLI contract behavior.

use {predicates::prelude::*, std::fs, tempfile::tempdir};

fn cli_cmd() -> assert_cmd::Command {
    let mut cmd = assert_cmd::Command::cargo_bin("fwconsole").expect("binary builds");
    // Keep host environment from leaking defaults into the contract tests.
    cmd.env_remove("FWCONSOLE_PORT")
        .env_remove("FWCONSOLE_BAUD")
        .env_remove("FWCONSOLE_NON_INTERACTIVE");
    cmd
}

#[test]
fn help_exits_zero_and_writes_stdout_only() {
    let mut cmd = cli_cmd();
    cmd.arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("fwconsole"))
        .stderr(predicate::str::is_empty());
}

#[test]
fn short_help_exits_zero_and_writes_stdout_only() {
    let mut cmd = cli_cmd();
    cmd.arg("-h")
        .assert()
        .success()
        .stdout(predicate::str::contains("fwconsole"))
        .stderr(predicate::str::is_empty());
}

#[test]
fn version_exits_zero_and_writes_stdout_only() {
    let mut cmd = cli_cmd();
    cmd.arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("fwconsole"))
        .stderr(predicate::str::is_empty());
}

#[test]
fn open_failure_aborts_with_diagnostic() {
    // Startup must never continue into synchronization without a working
    // transport: a bad port is an immediate nonzero exit.
    let mut cmd = cli_cmd();
    cmd.args(["--non-interactive", "/nonexistent/fwconsole-test-port"])
        .assert()
        .failure()
        .code(1)
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("Failed to open serial port"));
}

#[test]
fn list_ports_runs_without_hardware() {
    let mut cmd = cli_cmd();
    cmd.arg("--list-ports").assert().success();
}

#[test]
fn list_ports_json_returns_valid_json() {
    let mut cmd = cli_cmd();
    let output = cmd
        .args(["--list-ports", "--json"])
        .output()
        .expect("command should execute");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    let parsed: serde_json::Value =
        serde_json::from_str(&stdout).expect("--json output parses as JSON");
    assert!(parsed.is_array(), "port list should be a JSON array");
}

#[test]
fn json_flag_requires_list_ports() {
    let mut cmd = cli_cmd();
    cmd.arg("--json").assert().failure().code(2);
}

#[test]
fn exit_code_two_for_unknown_flag() {
    let mut cmd = cli_cmd();
    cmd.arg("--invalid-flag-xyz").assert().failure().code(2);
}

#[test]
fn exit_code_two_for_invalid_baud() {
    let mut cmd = cli_cmd();
    cmd.args(["--baud", "fast", "/dev/null"])
        .assert()
        .failure()
        .code(2);
}

#[test]
fn invalid_local_config_warns_but_continues() {
    let dir = tempdir().expect("tempdir should be created");
    fs::write(dir.path().join("fwconsole.toml"), "invalid toml [[[")
        .expect("write invalid config");

    let mut cmd = cli_cmd();
    let output = cmd
        .current_dir(dir.path())
        .arg("--list-ports")
        .output()
        .expect("command should execute");

    assert!(
        output.status.success(),
        "command should succeed despite config warning"
    );
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("TOML"), "should warn about invalid TOML");
}

#[test]
fn explicit_config_file_is_honored() {
    // A config file naming a bogus port makes the console try (and fail) to
    // open it, proving the file was read.
    let dir = tempdir().expect("tempdir should be created");
    let config_path = dir.path().join("custom.toml");
    fs::write(
        &config_path,
        "[connection]\nserial = \"/nonexistent/from-config\"\n",
    )
    .expect("write config");

    let mut cmd = cli_cmd();
    cmd.arg("--non-interactive")
        .arg("--config")
        .arg(&config_path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("/nonexistent/from-config"));
}

#[test]
fn non_interactive_environment_variable_works() {
    let mut cmd = cli_cmd();
    cmd.env("FWCONSOLE_NON_INTERACTIVE", "true")
        .arg("--version")
        .assert()
        .success();
}

#[test]
fn completions_command_writes_to_stdout() {
    let mut cmd = cli_cmd();
    cmd.args(["--completions", "bash"])
        .assert()
        .success()
        .stderr(predicate::str::is_empty())
        .stdout(predicate::str::contains("_fwconsole"));
}

#[test]
fn colors_disabled_when_not_tty() {
    let mut cmd = cli_cmd();
    let output = cmd
        .arg("--help")
        .assert()
        .success()
        .get_output()
        .clone();

    let stdout = String::from_utf8(output.stdout).expect("stdout should be utf-8");
    assert!(
        !stdout.contains("\x1b["),
        "Colors should be disabled in non-TTY mode"
    );
}
