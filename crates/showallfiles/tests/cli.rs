use std::process::Command;

#[test]
fn help_exits_successfully() {
    // Arrange
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_showallfiles"));
    cmd.arg("--help");

    // Act
    let output = cmd.output().expect("failed to execute showallfiles");

    // Assert
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("hidden files"));
    assert!(stdout.contains("toggle"));
}

#[test]
fn version_exits_successfully() {
    // Arrange
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_showallfiles"));
    cmd.arg("--version");

    // Act
    let output = cmd.output().expect("failed to execute showallfiles");

    // Assert
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("showallfiles"));
}

#[test]
fn run_help_lists_logging_overrides() {
    // Arrange
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_showallfiles"));
    cmd.args(["run", "--help"]);

    // Act
    let output = cmd.output().expect("failed to execute showallfiles");

    // Assert
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("--log-level"));
    assert!(stdout.contains("--log "));
}

#[test]
fn unknown_subcommand_fails() {
    // Arrange
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_showallfiles"));
    cmd.arg("frobnicate");

    // Act
    let output = cmd.output().expect("failed to execute showallfiles");

    // Assert
    assert!(!output.status.success());
}
