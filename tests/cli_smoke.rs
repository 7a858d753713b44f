use assert_cmd::Command;
use predicates::str::contains;

#[test]
fn orgtask_help_works() {
    Command::cargo_bin("orgtask")
        .expect("binary")
        .arg("--help")
        .assert()
        .success()
        .stdout(contains("Organization-scoped task tracking"));
}

#[test]
fn subcommand_help_works() {
    let subcommands = [
        "init", "seed", "login", "whoami", "register", "org", "task", "audit",
    ];

    for cmd in subcommands {
        Command::cargo_bin("orgtask")
            .expect("binary")
            .arg(cmd)
            .arg("--help")
            .assert()
            .success();
    }
}
