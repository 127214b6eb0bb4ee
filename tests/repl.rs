use assert_cmd::Command;
use predicates::prelude::*;

fn make_cmd() -> Command {
    let mut cmd = Command::cargo_bin("rbf").expect("rbf binary");
    cmd.arg("repl").env_remove("RBF_REPL_MODE").env_remove("RBF_DEBUG").env_remove("RUST_LOG");
    cmd
}

#[test]
fn bare_empty_input_exits_clean_and_quiet() {
    make_cmd()
        .write_stdin("")
        .assert()
        .success()
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::is_empty());
}

#[test]
fn bare_valid_program_outputs_and_exits() {
    // 65 '+' then '.' prints 'A'
    let program = format!("{}.", "+".repeat(65));
    make_cmd()
        .write_stdin(program)
        .assert()
        .success()
        .stdout("A\n")
        .stderr(predicate::str::is_empty());
}

#[test]
fn bare_multiline_program_with_comments() {
    make_cmd()
        .write_stdin("set cell to 33\n+++++++++++++++++++++++++++++++++\nprint it .\n")
        .assert()
        .success()
        .stdout("!\n");
}

#[test]
fn bare_invalid_program_reports_error_and_exits_clean() {
    make_cmd()
        .write_stdin("]")
        .assert()
        .success()
        .stderr(predicate::str::contains("Parse error: unmatched bracket"))
        .stdout("\n");
}

#[test]
fn comment_only_submission_is_skipped() {
    make_cmd()
        .write_stdin("nothing to run here")
        .assert()
        .success()
        .stdout(predicate::str::is_empty());
}

#[test]
fn editor_on_non_tty_is_error_exit_1() {
    make_cmd()
        .arg("--editor")
        .write_stdin("")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("stdin is not a TTY"));
}

#[test]
fn env_mode_respected_flags_override() {
    make_cmd()
        .env("RBF_REPL_MODE", "editor")
        .arg("--bare")
        .write_stdin("+++.")
        .assert()
        .success()
        .stdout(predicate::str::contains("\u{3}"));
}

#[test]
fn invalid_env_mode_is_error() {
    make_cmd()
        .env("RBF_REPL_MODE", "fancy")
        .write_stdin("+")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("invalid RBF_REPL_MODE"));
}
