//! End-to-end tests driving the `cmdcase` binary against real test-case
//! files, the way `spec.md` §8 describes: one test case per invocation,
//! exit code and report line asserted together.

use std::io::Write;

use assert_cmd::Command;
use predicates::prelude::*;

fn write_case(dir: &std::path::Path, file_name: &str, contents: &str) -> std::path::PathBuf {
    let path = dir.join(file_name);
    let mut file = std::fs::File::create(&path).unwrap();
    write!(file, "{}", contents).unwrap();
    path
}

#[test]
fn passing_case_exits_zero_and_reports_pass() {
    let dir = tempfile::tempdir().unwrap();
    write_case(
        dir.path(),
        "echo.test",
        "program /bin/echo\nargs hello world\nreturn 0\nstdout hello world\n",
    );

    Command::cargo_bin("cmdcase")
        .unwrap()
        .current_dir(dir.path())
        .arg("-v")
        .arg("echo.test")
        .assert()
        .code(0)
        .stdout(predicate::str::contains("PASS"));
}

#[test]
fn mismatched_output_exits_one_and_reports_diff() {
    let dir = tempfile::tempdir().unwrap();
    write_case(
        dir.path(),
        "echo.test",
        "program /bin/echo\nargs hello\nreturn 0\nstdout goodbye\n",
    );

    Command::cargo_bin("cmdcase")
        .unwrap()
        .current_dir(dir.path())
        .arg("-v")
        .arg("echo.test")
        .assert()
        .code(1)
        .stdout(
            predicate::str::contains("FAIL")
                .and(predicate::str::contains("-goodbye"))
                .and(predicate::str::contains("+hello")),
        );
}

#[test]
fn missing_program_exits_three_with_error() {
    let dir = tempfile::tempdir().unwrap();
    write_case(
        dir.path(),
        "missing.test",
        "program /no/such/program\nreturn 0\n",
    );

    Command::cargo_bin("cmdcase")
        .unwrap()
        .current_dir(dir.path())
        .arg("-v")
        .arg("missing.test")
        .assert()
        .code(3)
        .stderr(predicate::str::contains("ERROR"));
}

#[test]
fn malformed_test_case_exits_three_with_parse_error() {
    let dir = tempfile::tempdir().unwrap();
    write_case(dir.path(), "bad.test", "bogus-directive 1\nreturn 0\n");

    Command::cargo_bin("cmdcase")
        .unwrap()
        .current_dir(dir.path())
        .arg("bad.test")
        .assert()
        .code(3)
        .stderr(predicate::str::contains("unknown directive"));
}

#[test]
fn stdin_is_forwarded_to_the_program_under_test() {
    let dir = tempfile::tempdir().unwrap();
    write_case(
        dir.path(),
        "cat.test",
        "program /bin/cat\nreturn 0\nstdin roundtrip\nstdout roundtrip\n",
    );

    Command::cargo_bin("cmdcase")
        .unwrap()
        .current_dir(dir.path())
        .arg("-v")
        .arg("cat.test")
        .assert()
        .code(0)
        .stdout(predicate::str::contains("PASS"));
}

#[test]
fn quiet_suppresses_passing_report() {
    let dir = tempfile::tempdir().unwrap();
    write_case(
        dir.path(),
        "echo.test",
        "program /bin/echo\nargs hi\nreturn 0\nstdout hi\n",
    );

    Command::cargo_bin("cmdcase")
        .unwrap()
        .current_dir(dir.path())
        .arg("-q")
        .arg("echo.test")
        .assert()
        .code(0)
        .stdout(predicate::str::is_empty());
}

#[test]
fn setup_only_stages_files_without_running() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("greeting-in.txt"), b"hi").unwrap();
    write_case(
        dir.path(),
        "setup.test",
        "program /bin/echo\nreturn 0\nfile greeting.txt greeting-in.txt\n",
    );

    Command::cargo_bin("cmdcase")
        .unwrap()
        .current_dir(dir.path())
        .arg("--setup-only")
        .arg("setup.test")
        .assert()
        .code(0);

    let sandbox = std::fs::read_dir(dir.path())
        .unwrap()
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .find(|path| {
            path.is_dir()
                && path
                    .file_name()
                    .and_then(|n| n.to_str())
                    .is_some_and(|n| n.starts_with("sandbox_setup."))
        })
        .expect("--setup-only should leave its sandbox on disk");

    let staged = sandbox.join("greeting.txt");
    assert!(staged.exists(), "expected {} to be staged", staged.display());
    assert_eq!(std::fs::read_to_string(&staged).unwrap(), "hi");
}
