use std::process::Command;

fn combined_output(output: &std::process::Output) -> String {
    let mut combined = String::new();
    combined.push_str(&String::from_utf8_lossy(&output.stdout));
    combined.push_str(&String::from_utf8_lossy(&output.stderr));
    combined
}

fn keyscribe_bin() -> &'static str {
    env!("CARGO_BIN_EXE_keyscribe")
}

#[test]
fn help_mentions_consent_and_flags() {
    let output = Command::new(keyscribe_bin())
        .arg("--help")
        .output()
        .expect("run keyscribe --help");
    assert!(output.status.success());
    let combined = combined_output(&output);
    assert!(combined.contains("Keyscribe"));
    assert!(combined.contains("--log-file"));
    assert!(combined.contains("--arm"));
}

#[test]
fn version_prints_package_version() {
    let output = Command::new(keyscribe_bin())
        .arg("--version")
        .output()
        .expect("run keyscribe --version");
    assert!(output.status.success());
    assert!(combined_output(&output).contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn directory_log_file_is_rejected_before_the_ui_starts() {
    let dir = tempfile::tempdir().expect("tempdir");
    let output = Command::new(keyscribe_bin())
        .arg("--log-file")
        .arg(dir.path())
        .output()
        .expect("run keyscribe --log-file <dir>");
    assert!(!output.status.success());
    assert!(combined_output(&output).contains("--log-file must name a file"));
}
