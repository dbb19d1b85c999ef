use assert_cmd::Command;

const SECRET: &str = "cli-test-secret";

/// The binary with configuration taken from the environment only.
fn cli() -> Command {
    let mut cmd = Command::cargo_bin("bookshelf-cli").unwrap();
    cmd.env("BOOKSHELF_CONFIG_DIR", env!("CARGO_TARGET_TMPDIR"))
        .env_remove("BOOKSHELF_ENV")
        .env_remove("BOOKSHELF_CONFIG_ATTEMPTS")
        .env("BOOKSHELF__AUTH__JWT_SECRET", SECRET)
        .arg("--config-attempts")
        .arg("1");
    cmd
}

#[test]
fn help_lists_commands() {
    let output = Command::cargo_bin("bookshelf-cli")
        .unwrap()
        .arg("--help")
        .output()
        .unwrap();
    assert!(output.status.success());

    let stdout = String::from_utf8(output.stdout).unwrap();
    for command in ["serve", "token", "config"] {
        assert!(stdout.contains(command), "{command} missing from help");
    }
}

#[test]
fn issued_token_verifies_to_its_subject() {
    let output = cli()
        .args(["token", "issue", "--subject", "42"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let token = String::from_utf8(output.stdout).unwrap();

    let output = cli()
        .args(["token", "verify", token.trim()])
        .output()
        .unwrap();
    assert!(output.status.success());
    assert_eq!(String::from_utf8(output.stdout).unwrap().trim(), "42");
}

#[test]
fn garbage_token_is_rejected() {
    let output = cli().args(["token", "verify", "garbage"]).output().unwrap();
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("token rejected"));
}

#[test]
fn config_check_requires_a_secret() {
    let output = cli()
        .env("BOOKSHELF__AUTH__JWT_SECRET", "")
        .args(["config", "check"])
        .output()
        .unwrap();
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("jwt_secret"));

    let output = cli().args(["config", "check"]).output().unwrap();
    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.contains("cache: in-process"));
    assert!(stdout.contains("login path: /login"));
}
