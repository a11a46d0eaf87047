use super::{init_logging, log_debug, log_debug_content, log_file_path, set_logging_for_tests};
use super::{App, Prompt, Purpose};
use crate::config::AppConfig;
use crate::transcript::LineKind;
use clap::Parser;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use std::fs;
use std::path::Path;
use std::sync::{Mutex, OnceLock};

static LOG_TEST_LOCK: OnceLock<Mutex<()>> = OnceLock::new();

fn with_log_lock(action: impl FnOnce()) {
    let _guard = LOG_TEST_LOCK
        .get_or_init(|| Mutex::new(()))
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner());
    action();
}

fn test_app(documents: &Path, extra: &[&str]) -> App {
    let mut args = vec![
        "keyscribe-tests",
        "--documents-dir",
        documents.to_str().expect("utf8 path"),
    ];
    args.extend_from_slice(extra);
    let mut config = AppConfig::parse_from(args);
    config.validate().expect("valid config");
    App::new(&config)
}

fn press(app: &mut App, code: KeyCode) {
    app.handle_key(KeyEvent::new(code, KeyModifiers::empty()));
}

fn type_text(app: &mut App, text: &str) {
    for ch in text.chars() {
        press(app, KeyCode::Char(ch));
    }
}

fn event_lines(app: &App) -> Vec<String> {
    app.transcript()
        .lines()
        .iter()
        .filter(|line| line.kind == LineKind::Event)
        .map(|line| line.text.clone())
        .collect()
}

#[test]
fn start_asks_before_creating_default_file() {
    let dir = tempfile::tempdir().expect("tempdir");
    let mut app = test_app(dir.path(), &[]);
    press(&mut app, KeyCode::F(2));
    assert_eq!(
        app.prompt(),
        Some(&Prompt::ConfirmDefault {
            purpose: Purpose::Arm
        })
    );
    assert!(!app.recorder().is_active());

    press(&mut app, KeyCode::Char('y'));
    assert!(app.prompt().is_none());
    assert!(app.recorder().is_active());
    let path = app
        .recorder()
        .destination()
        .map(|d| d.path().to_path_buf())
        .expect("destination");
    assert!(path.starts_with(dir.path().join("keylogs")));

    type_text(&mut app, "a");
    let content = fs::read_to_string(&path).expect("read log");
    let rows: Vec<_> = content.lines().collect();
    assert_eq!(rows[0], "timestamp,key");
    assert!(rows[1].ends_with(",CHAR('a') keysym=a"));
}

#[test]
fn declining_default_and_cancelling_leaves_no_destination() {
    let dir = tempfile::tempdir().expect("tempdir");
    let mut app = test_app(dir.path(), &[]);
    press(&mut app, KeyCode::F(2));
    press(&mut app, KeyCode::Char('n'));
    assert!(matches!(
        app.prompt(),
        Some(Prompt::PathEntry {
            purpose: Purpose::Arm,
            ..
        })
    ));
    press(&mut app, KeyCode::Esc);
    assert!(app.prompt().is_none());
    assert!(!app.recorder().is_active());
    assert!(app.status_text().contains("Choose a file first"));
}

#[test]
fn typed_path_becomes_destination_and_prompt_keys_are_not_captured() {
    let dir = tempfile::tempdir().expect("tempdir");
    let target = dir.path().join("picked").join("mine.csv");
    let mut app = test_app(dir.path(), &[]);
    let before = app.transcript().len();

    press(&mut app, KeyCode::F(4));
    type_text(&mut app, target.to_str().expect("utf8 path"));
    press(&mut app, KeyCode::Enter);

    assert!(app.prompt().is_none());
    assert_eq!(app.transcript().len(), before);
    assert_eq!(
        app.recorder().destination().map(|d| d.path()),
        Some(target.as_path())
    );
    assert_eq!(fs::read_to_string(&target).expect("read"), "timestamp,key\r\n");
    assert!(app.status_text().starts_with("Log file set to"));
}

#[test]
fn keys_are_mirrored_while_unarmed() {
    let dir = tempfile::tempdir().expect("tempdir");
    let mut app = test_app(dir.path(), &[]);
    type_text(&mut app, "hi");
    press(&mut app, KeyCode::Enter);
    let lines = event_lines(&app);
    assert_eq!(lines.len(), 3);
    assert!(lines[2].ends_with("\tKEY(Return)"));
    assert!(app.recorder().destination().is_none());
}

#[test]
fn quitting_while_active_needs_confirmation() {
    let dir = tempfile::tempdir().expect("tempdir");
    let target = dir.path().join("q.csv");
    let mut app = test_app(
        dir.path(),
        &["--log-file", target.to_str().expect("utf8 path"), "--arm"],
    );
    assert!(app.recorder().is_active());

    press(&mut app, KeyCode::F(10));
    assert_eq!(app.prompt(), Some(&Prompt::ConfirmQuit));
    press(&mut app, KeyCode::Char('n'));
    assert!(!app.should_quit());
    assert!(app.recorder().is_active());

    press(&mut app, KeyCode::F(10));
    press(&mut app, KeyCode::Char('y'));
    assert!(app.should_quit());
    assert!(!app.recorder().is_active());
    let last = app.transcript().lines().last().expect("line");
    assert_eq!(last.kind, LineKind::Marker);
    assert!(last.text.starts_with("--- Logging stopped at"));
}

#[test]
fn rejected_log_file_with_arm_stays_unarmed_and_creates_no_default() {
    let dir = tempfile::tempdir().expect("tempdir");
    let blocker = dir.path().join("blocker");
    fs::write(&blocker, "x").expect("seed");
    let target = blocker.join("log.csv");
    let app = test_app(
        dir.path(),
        &["--log-file", target.to_str().expect("utf8 path"), "--arm"],
    );
    assert!(!app.recorder().is_active());
    assert!(app.recorder().destination().is_none());
    assert!(!dir.path().join("keylogs").exists());
    assert!(app.status_text().ends_with("Logging not started."));
}

#[test]
fn arm_flag_without_log_file_uses_generated_default() {
    let dir = tempfile::tempdir().expect("tempdir");
    let app = test_app(dir.path(), &["--arm"]);
    assert!(app.recorder().is_active());
    let path = app
        .recorder()
        .destination()
        .map(|d| d.path().to_path_buf())
        .expect("destination");
    assert!(path.starts_with(dir.path().join("keylogs")));
}

#[test]
fn quitting_while_idle_exits_immediately() {
    let dir = tempfile::tempdir().expect("tempdir");
    let mut app = test_app(dir.path(), &[]);
    app.handle_key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL));
    assert!(app.should_quit());
    assert!(app.prompt().is_none());
}

#[test]
fn save_preview_appends_block_and_clear_resets() {
    let dir = tempfile::tempdir().expect("tempdir");
    let target = dir.path().join("s.csv");
    let mut app = test_app(
        dir.path(),
        &["--log-file", target.to_str().expect("utf8 path")],
    );
    type_text(&mut app, "ok");
    press(&mut app, KeyCode::F(5));
    let content = fs::read_to_string(&target).expect("read");
    assert!(content.contains("--- Manual save at,"));
    assert_eq!(content.lines().count(), 1 + 1 + 3);
    assert!(!app.recorder().is_active());

    press(&mut app, KeyCode::F(6));
    assert_eq!(app.transcript().len(), 1);
    assert_eq!(app.status_text(), "Preview cleared.");
}

#[test]
fn stop_when_idle_reports_and_adds_nothing() {
    let dir = tempfile::tempdir().expect("tempdir");
    let mut app = test_app(dir.path(), &[]);
    press(&mut app, KeyCode::F(3));
    assert_eq!(app.transcript().len(), 1);
    assert_eq!(app.status_text(), "Logging is not running.");
}

#[test]
fn focus_changes_request_redraw() {
    let dir = tempfile::tempdir().expect("tempdir");
    let mut app = test_app(dir.path(), &[]);
    assert!(app.take_redraw_request());
    app.set_focus(false);
    assert!(!app.is_focused());
    assert!(app.take_redraw_request());
    app.set_focus(false);
    assert!(!app.take_redraw_request());
}

#[test]
fn logging_disabled_by_default() {
    with_log_lock(|| {
        let dir = tempfile::tempdir().expect("tempdir");
        let _ = fs::remove_file(log_file_path());
        let config = AppConfig::parse_from([
            "keyscribe-tests",
            "--no-logs",
            "--documents-dir",
            dir.path().to_str().expect("utf8 path"),
        ]);
        init_logging(&config);
        log_debug("should not appear");
        assert!(!log_file_path().exists());
    });
}

#[test]
fn logging_enabled_writes_log_and_content_needs_flag() {
    with_log_lock(|| {
        let _ = fs::remove_file(log_file_path());
        set_logging_for_tests(true, false);
        log_debug("plain line");
        log_debug_content("secret keystroke");
        let content = fs::read_to_string(log_file_path()).unwrap_or_default();
        assert!(content.contains("plain line"));
        assert!(!content.contains("secret keystroke"));

        set_logging_for_tests(true, true);
        log_debug_content("visible keystroke");
        let content = fs::read_to_string(log_file_path()).unwrap_or_default();
        assert!(content.contains("visible keystroke"));
        set_logging_for_tests(false, false);
    });
}
