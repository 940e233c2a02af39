use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn rebump(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("rebump").unwrap();
    cmd.current_dir(dir.path()).env("REBUMP_ROOT", dir.path());
    cmd
}

// ---------------------------------------------------------------------------
// rebump selftest
// ---------------------------------------------------------------------------

#[test]
fn selftest_parses_builtin_sample() {
    let dir = TempDir::new().unwrap();
    rebump(&dir)
        .args(["--json", "selftest"])
        .assert()
        .success()
        .stdout(predicate::str::contains("1515"))
        .stdout(predicate::str::contains("9395"))
        .stdout(predicate::str::contains("13152"))
        .stdout(predicate::str::contains("\"success\": true"));
}

#[test]
fn selftest_fails_on_unparseable_text() {
    let dir = TempDir::new().unwrap();
    rebump(&dir)
        .args(["selftest", "--text", "nothing bump-shaped"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("no cooldowns parsed"));
}

// ---------------------------------------------------------------------------
// rebump schedule
// ---------------------------------------------------------------------------

#[test]
fn schedule_add_and_list() {
    let dir = TempDir::new().unwrap();
    rebump(&dir)
        .args(["schedule", "add", "/up", "--delay", "120"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Scheduled '/up' in 2m"));

    assert!(dir.path().join(".rebump/schedule.json").exists());

    rebump(&dir)
        .args(["schedule", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("/up"))
        .stdout(predicate::str::contains("pending"));
}

#[test]
fn schedule_add_rejects_empty_command() {
    let dir = TempDir::new().unwrap();
    rebump(&dir)
        .args(["schedule", "add", ""])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid command text"));
}

#[test]
fn schedule_cancel_removes_entry() {
    let dir = TempDir::new().unwrap();
    let output = rebump(&dir)
        .args(["--json", "schedule", "add", "/bump", "--delay", "600"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let id = value["id"].as_str().unwrap().to_string();

    rebump(&dir)
        .args(["schedule", "cancel", &id])
        .assert()
        .success();
    rebump(&dir)
        .args(["schedule", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No scheduled commands."));
}

#[test]
fn schedule_survives_across_invocations() {
    let dir = TempDir::new().unwrap();
    rebump(&dir)
        .args(["schedule", "add", "/like", "--delay", "3600"])
        .assert()
        .success();

    let output = rebump(&dir)
        .args(["--json", "schedule", "list"])
        .output()
        .unwrap();
    let records: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(records.as_array().unwrap().len(), 1);
    assert_eq!(records[0]["command"], "/like");
}

// ---------------------------------------------------------------------------
// rebump run
// ---------------------------------------------------------------------------

#[test]
fn run_until_idle_executes_due_commands() {
    let dir = TempDir::new().unwrap();
    rebump(&dir)
        .args(["schedule", "add", "/up", "--delay", "0"])
        .assert()
        .success();

    rebump(&dir)
        .args(["run", "--until-idle", "--interval-ms", "50"])
        .assert()
        .success();

    // The due command fired and was retired; the outbox holds the send.
    rebump(&dir)
        .args(["schedule", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No scheduled commands."));
    let outbox = std::fs::read_to_string(dir.path().join(".rebump/outbox.txt")).unwrap();
    assert_eq!(outbox, "/up\n");
}

#[test]
fn run_until_idle_with_empty_schedule_exits_immediately() {
    let dir = TempDir::new().unwrap();
    rebump(&dir)
        .args(["run", "--until-idle", "--dry-run"])
        .assert()
        .success();
}

// ---------------------------------------------------------------------------
// rebump bump (full cycle over the file bridge)
// ---------------------------------------------------------------------------

#[test]
fn bump_cycle_schedules_followups_from_inbox() {
    let dir = TempDir::new().unwrap();
    std::fs::create_dir_all(dir.path().join(".rebump")).unwrap();
    std::fs::write(
        dir.path().join(".rebump/inbox.txt"),
        "/up: 30 минут, 17:00:00\n/bump: 2 часа 5 минут, 19:00:00\n",
    )
    .unwrap();

    rebump(&dir)
        .args([
            "--json",
            "bump",
            "--delay",
            "0",
            "--interval-ms",
            "100",
            "--targets",
            "up,bump",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"status\": \"completed\""))
        .stdout(predicate::str::contains("\"spawned\": 2"));

    let outbox = std::fs::read_to_string(dir.path().join(".rebump/outbox.txt")).unwrap();
    assert_eq!(outbox, "/getbump\n");

    rebump(&dir)
        .args(["schedule", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("/up"))
        .stdout(predicate::str::contains("/bump"));
}

#[test]
fn bump_cycle_fails_without_inbox_text() {
    let dir = TempDir::new().unwrap();
    rebump(&dir)
        .args(["bump", "--delay", "0", "--interval-ms", "100", "--dry-run"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("bump workflow failed"));
}

#[test]
fn bump_rejects_unknown_target() {
    let dir = TempDir::new().unwrap();
    rebump(&dir)
        .args(["bump", "--targets", "up,nudge"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown target 'nudge'"));
}

// ---------------------------------------------------------------------------
// rebump response
// ---------------------------------------------------------------------------

#[test]
fn response_templates_roundtrip() {
    let dir = TempDir::new().unwrap();
    rebump(&dir)
        .args(["response", "set", "/up", "thanks", "for", "the", "bump"])
        .assert()
        .success();

    rebump(&dir)
        .args(["response", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("/up"))
        .stdout(predicate::str::contains("thanks for the bump"));
}
