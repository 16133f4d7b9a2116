use assert_cmd::cargo::cargo_bin_cmd;
use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::{tempdir, TempDir};

const DICT: &str = "FILETYPE: C; .c\nint\nreturn\n\nNATURAL:\nhello\nthis\nword\nworld\n";

fn workspace() -> TempDir {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("dictionary.txt"), DICT).unwrap();
    dir
}

fn scspell(dir: &TempDir) -> Command {
    let mut cmd = cargo_bin_cmd!("scspell");
    cmd.current_dir(dir.path())
        .env("HOME", dir.path())
        .env("XDG_CONFIG_HOME", dir.path().join("config"))
        .env("XDG_DATA_HOME", dir.path().join("data"))
        .env_remove("RUST_LOG")
        .arg("--no-color")
        .arg("--override-dictionary")
        .arg("dictionary.txt");
    cmd
}

#[test]
fn report_only_lists_unknown_words() {
    let dir = workspace();
    fs::write(dir.path().join("a.txt"), "This is blabbb.\n").unwrap();

    scspell(&dir)
        .arg("--report-only")
        .arg("a.txt")
        .assert()
        .code(1)
        .stderr(predicate::str::contains(
            "a.txt:1: 'blabbb' not found in dictionary (from token 'blabbb')",
        ));
}

#[test]
fn report_only_clean_run_succeeds() {
    let dir = workspace();
    fs::write(dir.path().join("a.c"), "int hello_world(int x) { return 0x7f; }\n").unwrap();

    scspell(&dir)
        .arg("--report-only")
        .arg("a.c")
        .assert()
        .success()
        .stderr(predicate::str::is_empty());
}

#[test]
fn missing_file_is_skipped_but_fails() {
    let dir = workspace();
    fs::write(dir.path().join("a.c"), "int hello;\n").unwrap();

    scspell(&dir)
        .arg("--report-only")
        .arg("nope.c")
        .arg("a.c")
        .assert()
        .code(1)
        .stderr(predicate::str::contains(
            "Error: can't read source file 'nope.c'; skipping",
        ));
}

#[test]
fn interactive_replace_all_from_piped_input() {
    let dir = workspace();
    let src = dir.path().join("a.c");
    fs::write(&src, "int wrod;\nreturn wrod;\n").unwrap();

    scspell(&dir)
        .arg("a.c")
        .write_stdin("R\nword\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Unmatched 'wrod' -> {wrod}"));

    assert_eq!(fs::read_to_string(&src).unwrap(), "int word;\nreturn word;\n");
}

#[test]
fn interactive_end_of_input_aborts() {
    let dir = workspace();
    let src = dir.path().join("a.c");
    fs::write(&src, "int wrod;\n").unwrap();

    scspell(&dir)
        .arg("a.c")
        .write_stdin("")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("User abort."));

    assert_eq!(fs::read_to_string(&src).unwrap(), "int wrod;\n");
}

#[test]
fn dict_gen_id_prints_marker() {
    let dir = workspace();
    scspell(&dir)
        .args(["dict", "gen-id"])
        .assert()
        .success()
        .stdout(predicate::str::is_match(r"^scspell-id: [0-9a-f-]{36}\n$").unwrap());
}

#[test]
fn dict_add_then_check() {
    let dir = workspace();
    fs::write(dir.path().join("a.txt"), "frobnicate\n").unwrap();

    scspell(&dir)
        .args(["dict", "add", "natural", "frobnicate"])
        .assert()
        .success();
    assert!(fs::read_to_string(dir.path().join("dictionary.txt"))
        .unwrap()
        .contains("frobnicate"));

    scspell(&dir)
        .arg("--report-only")
        .arg("a.txt")
        .assert()
        .success();
}

#[test]
fn dict_export_refused_with_base_dictionary() {
    let dir = workspace();
    scspell(&dir)
        .arg("--use-builtin-base-dict")
        .args(["dict", "export", "out.txt"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("base dictionaries"));
}
