mod support;

use predicates::str::contains;

use support::{texts, TestEnv};

#[test]
fn users_have_separate_lists() -> Result<(), Box<dyn std::error::Error>> {
    let env = TestEnv::new()?;
    env.add(&["anonymous task"])?;

    env.tt().args(["user", "sign-in", "alice"]).assert().success();
    assert!(texts(&env.json(&["list"])?["tasks"]).is_empty());
    env.add(&["alice task"])?;

    env.tt().args(["user", "sign-out"]).assert().success();
    assert_eq!(texts(&env.json(&["list"])?["tasks"]), vec!["anonymous task"]);

    env.tt().args(["user", "sign-in", "alice"]).assert().success();
    assert_eq!(texts(&env.json(&["list"])?["tasks"]), vec!["alice task"]);

    assert!(env.data_dir().join("todos.json").exists());
    assert!(env.data_dir().join("todos_alice.json").exists());
    Ok(())
}

#[test]
fn user_flag_and_env_override_sign_in() -> Result<(), Box<dyn std::error::Error>> {
    let env = TestEnv::new()?;
    env.tt().args(["user", "sign-in", "alice"]).assert().success();

    env.tt()
        .args(["--user", "bob", "add", "bob task"])
        .assert()
        .success();
    env.tt()
        .env("TT_USER", "bob")
        .args(["user", "show"])
        .assert()
        .success()
        .stdout(contains("tt user: bob"));

    let shown = env.json(&["user", "show"])?;
    assert_eq!(shown["user"], "alice");
    assert_eq!(shown["signed_in"], "alice");

    let output = env.tt().env("TT_USER", "bob").args(["--json", "list"]).output()?;
    let payload: serde_json::Value = serde_json::from_slice(&output.stdout)?;
    assert_eq!(texts(&payload["data"]["tasks"]), vec!["bob task"]);
    Ok(())
}

#[test]
fn anonymous_show_suggests_sign_in() -> Result<(), Box<dyn std::error::Error>> {
    let env = TestEnv::new()?;

    env.tt()
        .args(["user", "show"])
        .assert()
        .success()
        .stdout(contains("tt user: anonymous"))
        .stdout(contains("tt user sign-in <id>"));

    env.tt().args(["user", "sign-in", "  "]).assert().code(2);
    Ok(())
}
