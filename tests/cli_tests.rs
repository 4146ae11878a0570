use std::process::Command;

use hueflux::common::constants::EXIT_FAILURE;

#[test]
fn test_fatal_error_reaches_log_file() {
    let dir = tempfile::tempdir().unwrap();
    let log_path = dir.path().join("hueflux.log");
    let missing_config = dir.path().join("missing.toml");

    let output = Command::new(env!("CARGO_BIN_EXE_hueflux"))
        .arg("status")
        .arg("--config")
        .arg(&missing_config)
        .arg("--log")
        .arg(&log_path)
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(EXIT_FAILURE));

    let log = std::fs::read_to_string(&log_path).unwrap();
    assert!(log.contains("┏ hueflux v"), "log was: {log}");
    assert!(
        log.contains("┗[ERROR] Configuration file not found"),
        "log was: {log}"
    );
    assert!(log.trim_end().ends_with('╹'), "log was: {log}");

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(!stdout.contains("Configuration file not found"), "stdout was: {stdout}");
}
