use assert_cmd::Command;
use predicates::prelude::*;

fn bookshelf() -> Command {
    Command::cargo_bin("bookshelf").expect("bookshelf binary")
}

#[test]
fn help_lists_server_flags() {
    bookshelf()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--addr"))
        .stdout(predicate::str::contains("--cors-origin"));
}

#[test]
fn invalid_addr_flag_is_rejected() {
    bookshelf()
        .args(["--addr", "not-an-addr"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--addr"));
}

#[test]
fn invalid_addr_env_fails_startup() {
    bookshelf()
        .env("BOOKSHELF_ADDR", "nowhere")
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid BOOKSHELF_ADDR"));
}

#[test]
fn invalid_cors_origin_fails_startup() {
    bookshelf()
        .args(["--addr", "127.0.0.1:0", "--cors-origin", "bad\norigin"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid cors origin"));
}
