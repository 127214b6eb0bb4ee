use assert_cmd::Command;
use predicates::prelude::*;
use std::io::Write;

fn cargo_bin() -> Command {
    let mut cmd = Command::cargo_bin("rbf").unwrap();
    cmd.env_remove("RBF_DEBUG").env_remove("RBF_MAX_TAPE_CELLS").env_remove("RUST_LOG");
    cmd
}

fn write_tempfile(content: &[u8]) -> tempfile::NamedTempFile {
    let mut tf = tempfile::NamedTempFile::new().expect("tempfile");
    tf.write_all(content).unwrap();
    tf
}

const BANG: &str = "+++++++++++++++++++++++++++++++++."; // prints '!'

#[test]
fn run_positional_code_success() {
    cargo_bin()
        .args(["run", BANG])
        .assert()
        .success()
        .stdout("!")
        .stderr(predicate::str::is_empty());
}

#[test]
fn run_concatenates_code_parts() {
    cargo_bin()
        .args(["run", "++++++++++++++++", "+++++++++++++++++."])
        .assert()
        .success()
        .stdout("!");
}

#[test]
fn run_file_success() {
    let tf = write_tempfile(b"A comment, then code:\n++++++++[>++++[>++>+++>+++>+<<<<-]>+>+>->>+[<]<-]>>.>---.+++++++..+++.>>.<-.<.+++.------.--------.>>+.>++.\n");
    cargo_bin()
        .arg("run").arg("--file").arg(tf.path())
        .assert()
        .success()
        .stdout("Hello World!\n")
        .stderr(predicate::str::is_empty());
}

#[test]
fn run_reads_input_from_stdin() {
    cargo_bin()
        .args(["run", ",.,.,,.>,."])
        .write_stdin("Y\n&?.")
        .assert()
        .success()
        .stdout("Y\n?.");
}

#[test]
fn run_reads_input_and_writes_output_files() {
    let input = write_tempfile(b"abc");
    let out_dir = tempfile::tempdir().unwrap();
    let out_path = out_dir.path().join("out.bin");
    cargo_bin()
        .args(["run", "--input"])
        .arg(input.path())
        .arg("--output")
        .arg(&out_path)
        .arg(">,[>,]<[.<]")
        .assert()
        .success()
        .stdout(predicate::str::is_empty());
    assert_eq!(std::fs::read(out_path).unwrap(), b"cba");
}

#[test]
fn run_missing_code_prints_usage() {
    cargo_bin()
        .arg("run")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Usage:"));
}

#[test]
fn run_code_and_file_conflict() {
    let tf = write_tempfile(b"+");
    cargo_bin()
        .args(["run", "--file"])
        .arg(tf.path())
        .arg("+")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("cannot use positional code together with --file"));
}

#[test]
fn run_missing_file_fails() {
    cargo_bin()
        .args(["run", "--file", "/definitely/not/here.bf"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("failed to read code file"));
}

#[test]
fn no_subcommand_prints_usage() {
    cargo_bin()
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Usage:"));
}

#[test]
fn help_flag_exits_zero() {
    cargo_bin()
        .args(["run", "--help"])
        .assert()
        .success()
        .stderr(predicate::str::contains("--max-tape-cells"));
}

#[test]
fn run_code_may_start_with_minus() {
    cargo_bin()
        .args(["run", "-."])
        .assert()
        .success()
        .stdout(b"\xff" as &[u8]);
}

#[test]
fn run_code_starting_with_minus_after_flag() {
    cargo_bin()
        .args(["run", "-d", "-+", BANG])
        .assert()
        .success()
        .stdout("!");
}

#[test]
fn run_with_ceiling_below_initial_tape() {
    cargo_bin()
        .args(["run", "--max-tape-cells", "500", BANG])
        .assert()
        .success()
        .stdout("!")
        .stderr(predicate::str::is_empty());
}
