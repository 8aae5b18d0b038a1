use std::process::Command;

fn priscope(dir: &std::path::Path, args: &[&str]) -> std::process::Output {
    Command::new(env!("CARGO_BIN_EXE_priscope"))
        .args(args)
        .current_dir(dir)
        .output()
        .unwrap()
}

#[test]
fn invalid_since_token_fails_before_retrieval() {
    let dir = tempfile::tempdir().unwrap();

    let output = priscope(
        dir.path(),
        &["scan", "https://github.com/acme/widget", "--since", "2x"],
    );

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("'2x'"),
        "expected a time-window error naming the token, got: {stderr}"
    );
}

#[test]
fn number_and_since_are_mutually_exclusive() {
    let dir = tempfile::tempdir().unwrap();

    let output = priscope(
        dir.path(),
        &[
            "scan",
            "https://github.com/acme/widget",
            "-n",
            "5",
            "--since",
            "2d",
        ],
    );

    assert!(!output.status.success());
}

#[test]
fn malformed_repo_url_fails_fast() {
    let dir = tempfile::tempdir().unwrap();

    let output = priscope(dir.path(), &["scan", "widget"]);

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("'widget'"),
        "expected an error naming the bad URL, got: {stderr}"
    );
}
