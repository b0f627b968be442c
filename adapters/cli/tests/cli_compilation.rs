use std::process::Command;

#[test]
fn cli_compiles_without_warnings() {
    let status = Command::new(env!("CARGO"))
        .current_dir(env!("CARGO_MANIFEST_DIR"))
        .args(["check", "--quiet", "--bin", "platform-grid"])
        .status()
        .expect("failed to invoke cargo check for platform-grid CLI binary");

    assert!(status.success(), "cargo check --bin platform-grid should succeed");
}

#[test]
fn short_headless_run_succeeds() {
    let status = Command::new(env!("CARGO"))
        .current_dir(env!("CARGO_MANIFEST_DIR"))
        .args([
            "run",
            "--quiet",
            "--bin",
            "platform-grid",
            "--",
            "--duration",
            "12",
            "--step",
            "0.25",
            "--reset-at",
            "6",
            "--quiet-events",
        ])
        .status()
        .expect("failed to invoke platform-grid CLI binary");

    assert!(status.success(), "headless run should exit cleanly");
}
