#![cfg(unix)]

use hwwatch::{CommandRunner, Config, Engine, Environment, RegisterSource, SysfsBus};
use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::Path;
use std::time::Duration;

/// Write an executable (or not) shell script.
fn write_script(path: &Path, body: &str, executable: bool) {
    fs::write(path, format!("#!/bin/sh\n{}\n", body)).expect("write script");
    let mode = if executable { 0o755 } else { 0o644 };
    fs::set_permissions(path, fs::Permissions::from_mode(mode)).expect("chmod");
}

/// Write register files for a sysfs-backed source.
fn write_registers(dir: &Path, extin: u16, pushsw: u16, rail1_mv: u16, rail2_mv: u16) {
    fs::write(dir.join("extin"), format!("{}\n", extin)).unwrap();
    fs::write(dir.join("pushsw"), format!("{}\n", pushsw)).unwrap();
    fs::write(dir.join("voltage1"), format!("{}\n", rail1_mv)).unwrap();
    fs::write(dir.join("voltage2"), format!("{}\n", rail2_mv)).unwrap();
}

/// Minimal environment for actions that run through the shell.
fn action_env() -> Environment {
    [("PATH", "/usr/local/bin:/usr/bin:/bin")].into_iter().collect()
}

fn lines(path: &Path) -> Vec<String> {
    fs::read_to_string(path)
        .unwrap_or_default()
        .lines()
        .map(str::to_string)
        .collect()
}

#[test]
fn test_directory_action_runs_only_executables_in_order() {
    let work = tempfile::tempdir().expect("create temp dir");
    let actions = work.path().join("low-voltage.d");
    fs::create_dir(&actions).unwrap();
    let log = work.path().join("calls.log");

    write_script(
        &actions.join("20-second"),
        &format!("echo \"second $THRESHOLD\" >> {}", log.display()),
        true,
    );
    write_script(
        &actions.join("10-first"),
        &format!("echo \"first $VOLTAGE1_HISTORY\" >> {}", log.display()),
        true,
    );
    write_script(
        &actions.join("15-disabled"),
        &format!("echo disabled >> {}", log.display()),
        false,
    );

    let registers = work.path().join("regs");
    fs::create_dir(&registers).unwrap();
    write_registers(&registers, 0, 0, 11_800, 12_000);

    let config = Config::from_json_str(&format!(
        r#"{{ "interval": 1,
             "voltage": {{ "history_size": 2, "commands": [
                 {{ "action": "{}", "condition": "under", "threshold": 12.0, "channel": 1 }} ] }} }}"#,
        actions.display()
    ))
    .unwrap();

    let source = RegisterSource::new(SysfsBus::new(&registers));
    let mut engine = Engine::from_config(&config, action_env(), source, CommandRunner::new());

    let summary = engine.run_pass().unwrap();
    assert_eq!(summary.fired, 1);
    assert_eq!(summary.invoked, 2);
    assert_eq!(summary.failed, 0);
    assert_eq!(lines(&log), vec!["first 11.8", "second 12"]);
}

#[test]
fn test_oneshot_shell_action_with_changing_registers() {
    let work = tempfile::tempdir().expect("create temp dir");
    let log = work.path().join("extin.log");
    let registers = work.path().join("regs");
    fs::create_dir(&registers).unwrap();

    let config = Config::from_json_str(&format!(
        r#"{{ "interval": 1,
             "extin": {{ "history_size": 3, "commands": [
                 {{ "action": "echo \"$EXTIN_HISTORY\" >> {}", "condition": "over",
                    "threshold": 4, "oneshot": true }} ] }} }}"#,
        log.display()
    ))
    .unwrap();

    let source = RegisterSource::new(SysfsBus::new(&registers));
    let mut engine = Engine::from_config(&config, action_env(), source, CommandRunner::new());

    for extin in [3, 5, 5, 8, 1, 9] {
        write_registers(&registers, extin, 0, 12_000, 12_000);
        engine.run_pass().unwrap();
    }

    assert_eq!(lines(&log), vec!["5, 3", "9, 1, 8"]);
}

#[test]
fn test_missing_action_program_does_not_stop_the_pass() {
    let work = tempfile::tempdir().expect("create temp dir");
    let log = work.path().join("after.log");
    let registers = work.path().join("regs");
    fs::create_dir(&registers).unwrap();
    write_registers(&registers, 1, 1, 12_000, 12_000);

    let config = Config::from_json_str(&format!(
        r#"{{ "interval": 1,
             "pushsw": {{ "history_size": 1, "commands": [
                 {{ "action": "exit 7", "condition": "any" }} ] }},
             "extin": {{ "history_size": 1, "commands": [
                 {{ "action": "echo ok > {}", "condition": "any" }} ] }} }}"#,
        log.display()
    ))
    .unwrap();

    let source = RegisterSource::new(SysfsBus::new(&registers));
    // A shell that does not exist makes every invocation fail to spawn.
    let broken = CommandRunner::new().with_shell("/nonexistent/sh");
    let mut engine = Engine::from_config(&config, action_env(), source, broken);

    let summary = engine.run_pass().unwrap();
    assert_eq!(summary.fired, 2);
    assert_eq!(summary.failed, 2);
    assert!(lines(&log).is_empty());
    assert_eq!(engine.environment().get("EXTIN_HISTORY"), Some("1"));
}

#[test]
fn test_missing_register_file_fails_the_pass() {
    let work = tempfile::tempdir().expect("create temp dir");
    let config = Config::from_json_str(r#"{ "interval": 1, "voltage": { "history_size": 1 } }"#)
        .unwrap();

    let source = RegisterSource::new(SysfsBus::new(work.path()));
    let mut engine = Engine::from_config(&config, Environment::new(), source, CommandRunner::new());

    let err = engine.run_pass().unwrap_err();
    assert!(err.to_string().contains("voltage"));
}

#[tokio::test]
async fn test_daemon_loop_stops_on_shutdown() {
    let work = tempfile::tempdir().expect("create temp dir");
    write_registers(work.path(), 2, 0, 12_000, 12_000);
    let config = Config::from_json_str(r#"{ "interval": 0.01, "extin": { "history_size": 100 } }"#)
        .unwrap();

    let source = RegisterSource::new(SysfsBus::new(work.path()));
    let mut engine = Engine::from_config(&config, Environment::new(), source, CommandRunner::new());

    engine
        .run_until(config.interval(), tokio::time::sleep(Duration::from_millis(100)))
        .await
        .unwrap();

    assert!(engine.pass_count() >= 2, "only {} passes", engine.pass_count());
    assert_eq!(
        engine.monitors()[0].history().len() as u64,
        engine.pass_count()
    );
}

#[tokio::test]
async fn test_daemon_loop_returns_read_errors() {
    let work = tempfile::tempdir().expect("create temp dir");
    let config = Config::from_json_str(r#"{ "interval": 0.01, "pushsw": { "history_size": 1 } }"#)
        .unwrap();

    let source = RegisterSource::new(SysfsBus::new(work.path()));
    let mut engine = Engine::from_config(&config, Environment::new(), source, CommandRunner::new());

    let result = engine
        .run_until(config.interval(), std::future::pending())
        .await;
    assert!(result.is_err());
    assert_eq!(engine.pass_count(), 1);
}
