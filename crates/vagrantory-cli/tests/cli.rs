use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;

fn vagrantory() -> assert_cmd::Command {
    cargo_bin_cmd!("vagrantory").into()
}

#[test]
fn help_works() {
    vagrantory()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Dynamic Ansible inventory"));
}

#[test]
fn rejects_unrecognized_file_name() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("hosts.yml");
    std::fs::write(&path, "plugin: vagrant\nproject_path: .\n").unwrap();

    vagrantory()
        .args(["--inventory", path.to_str().unwrap(), "--list"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not a vagrant inventory source"));
}

#[test]
fn missing_config_file_fails() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("vagrant.yml");

    vagrantory()
        .args(["-i", path.to_str().unwrap()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to load"));
}

#[test]
fn missing_project_path_fails() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("lab.vagrant.yaml");
    std::fs::write(&path, "plugin: vagrant\n").unwrap();

    vagrantory()
        .args(["-i", path.to_str().unwrap()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("project_path"));
}

#[test]
fn missing_vagrant_binary_fails() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("vagrant.yml");
    std::fs::write(
        &path,
        "plugin: vagrant\nproject_path: .\nvagrant_binary: vagrantory-test-no-such-binary\n",
    )
    .unwrap();

    vagrantory()
        .args(["-i", path.to_str().unwrap()])
        .assert()
        .failure()
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("failed to invoke vagrant"));
}

#[test]
fn list_and_host_conflict() {
    vagrantory()
        .args(["--list", "--host", "default"])
        .assert()
        .failure();
}
