use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

fn direhose() -> Command {
    Command::new(env!("CARGO_BIN_EXE_direhose"))
}

fn write_config(dir: &TempDir, body: &str) -> std::path::PathBuf {
    let path = dir.path().join("direhose.conf");
    fs::write(&path, body).unwrap();
    path
}

#[test]
fn shows_help() {
    direhose()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Usage"))
        .stdout(predicate::str::contains("CONFIG_FILE"));

    direhose().arg("-h").assert().success();
}

#[test]
fn rejects_unknown_flag() {
    direhose()
        .arg("--frobnicate")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Usage"));
}

#[test]
fn streams_metadata_from_config() {
    let tree = TempDir::new().unwrap();
    fs::create_dir(tree.path().join("a")).unwrap();
    fs::write(tree.path().join("a/f.txt"), "test").unwrap();

    let conf_dir = TempDir::new().unwrap();
    let config = write_config(
        &conf_dir,
        &format!("# test\nstart_dir={}\nsource_mode=metadata\n", tree.path().display()),
    );

    let output = direhose().arg(&config).output().unwrap();
    assert!(output.status.success());

    let stdout = String::from_utf8(output.stdout).unwrap();
    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(lines.len(), 4);
    for line in &lines[..3] {
        let json: serde_json::Value = serde_json::from_str(line).unwrap();
        assert!(json.get("package_ts").is_some());
        assert!(json.get("last_modification").is_some());
    }
    assert_eq!(lines[3], "EOS");
}

#[test]
fn streams_content_in_data_mode() {
    let tree = TempDir::new().unwrap();
    fs::write(tree.path().join("f.txt"), "test").unwrap();

    let conf_dir = TempDir::new().unwrap();
    let config = write_config(
        &conf_dir,
        &format!("start_dir={}\nsource_mode=data\n", tree.path().display()),
    );

    direhose()
        .arg(&config)
        .assert()
        .success()
        .stdout("test\nEOS\n");
}

#[test]
fn uses_default_config_in_working_directory() {
    let tree = TempDir::new().unwrap();
    fs::write(tree.path().join("direhose.conf"), "source_mode=quiet\n").unwrap();

    direhose()
        .current_dir(tree.path())
        .assert()
        .success()
        .stdout("EOS\n");
}

#[test]
fn missing_config_file_means_defaults() {
    let tree = TempDir::new().unwrap();
    fs::write(tree.path().join("only.txt"), "x").unwrap();

    let output = direhose()
        .current_dir(tree.path())
        .arg("does-not-exist.conf")
        .output()
        .unwrap();
    assert!(output.status.success());

    let stdout = String::from_utf8(output.stdout).unwrap();
    // The working directory and its single file.
    assert_eq!(stdout.lines().filter(|l| l.starts_with('{')).count(), 2);
    assert!(stdout.ends_with("EOS\n"));
}

#[test]
fn invalid_port_fails_before_walking() {
    let conf_dir = TempDir::new().unwrap();
    let config = write_config(&conf_dir, "network_port=not-a-port\n");

    direhose()
        .arg(&config)
        .assert()
        .failure()
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("network_port"));
}

#[test]
fn malformed_lines_are_skipped() {
    let tree = TempDir::new().unwrap();
    let conf_dir = TempDir::new().unwrap();
    let config = write_config(
        &conf_dir,
        &format!("garbage line\nstart_dir={}\n", tree.path().display()),
    );

    direhose()
        .arg(&config)
        .assert()
        .success()
        .stderr(predicate::str::contains("Skipping malformed config"))
        .stdout(predicate::str::ends_with("EOS\n"));
}
