//! Whole-session flows: save on exit, persist to disk, restore on the next
//! start, and the diagnostics emitted along the way.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use chatui_harness::fixtures;
use chatui_harness::{MemoryHost, Skeleton};
use chatui_layout::{
    BufferKey, LayoutConfig, LayoutSnapshot, LayoutState, SaveLayoutOnExit,
};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::registry::LookupSpan;

// Tracing capture

#[derive(Debug, Clone)]
struct CapturedEvent {
    target: String,
    fields: HashMap<String, String>,
}

#[derive(Default)]
struct Captured {
    spans: Vec<String>,
    events: Vec<CapturedEvent>,
}

struct LayoutCapture(Arc<Mutex<Captured>>);

struct FieldVisitor(Vec<(String, String)>);

impl tracing::field::Visit for FieldVisitor {
    fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
        self.0.push((field.name().to_string(), format!("{value:?}")));
    }
    fn record_u64(&mut self, field: &tracing::field::Field, value: u64) {
        self.0.push((field.name().to_string(), value.to_string()));
    }
    fn record_str(&mut self, field: &tracing::field::Field, value: &str) {
        self.0.push((field.name().to_string(), value.to_string()));
    }
    fn record_bool(&mut self, field: &tracing::field::Field, value: bool) {
        self.0.push((field.name().to_string(), value.to_string()));
    }
}

impl<S> tracing_subscriber::Layer<S> for LayoutCapture
where
    S: tracing::Subscriber + for<'a> LookupSpan<'a>,
{
    fn on_new_span(
        &self,
        attrs: &tracing::span::Attributes<'_>,
        _id: &tracing::span::Id,
        _ctx: tracing_subscriber::layer::Context<'_, S>,
    ) {
        self.0
            .lock()
            .unwrap()
            .spans
            .push(attrs.metadata().name().to_string());
    }

    fn on_event(&self, event: &tracing::Event<'_>, _ctx: tracing_subscriber::layer::Context<'_, S>) {
        let mut visitor = FieldVisitor(Vec::new());
        event.record(&mut visitor);
        self.0.lock().unwrap().events.push(CapturedEvent {
            target: event.metadata().target().to_string(),
            fields: visitor.0.into_iter().collect(),
        });
    }
}

fn with_captured_tracing<F: FnOnce()>(f: F) -> Captured {
    let captured = Arc::new(Mutex::new(Captured::default()));
    let subscriber = tracing_subscriber::registry().with(LayoutCapture(captured.clone()));
    tracing::subscriber::with_default(subscriber, f);
    let mut guard = captured.lock().unwrap();
    std::mem::take(&mut *guard)
}

fn key(plugin: &str, name: &str) -> BufferKey {
    BufferKey::new(plugin, name)
}

// Save on exit

#[test]
fn save_on_exit_follows_policy() {
    let (host, _) = fixtures::status_and_channels();

    let mut state = LayoutState::new();
    state.save_on_exit(&host, SaveLayoutOnExit::None);
    assert!(state.buffers().is_empty());
    assert!(state.windows().is_empty());

    state.save_on_exit(&host, SaveLayoutOnExit::Buffers);
    assert_eq!(state.buffers().len(), 4);
    assert!(state.windows().is_empty());

    let mut state = LayoutState::new();
    state.save_on_exit(&host, SaveLayoutOnExit::Windows);
    assert!(state.buffers().is_empty());
    assert_eq!(state.windows().len(), 5);

    let mut state = LayoutState::new();
    state.save_on_exit(&host, SaveLayoutOnExit::All);
    assert_eq!(state.buffers().len(), 4);
    assert_eq!(state.windows().len(), 5);
    assert_eq!(state.current_window().map(|id| id.get()), Some(5));
}

#[test]
fn config_file_drives_exit_policy() {
    let config = LayoutConfig::from_toml_str(r#"save_layout_on_exit = "windows""#)
        .expect("valid config");
    let (host, _) = fixtures::status_and_channels();
    let mut state = LayoutState::new();
    state.save_on_exit(&host, config.save_layout_on_exit);
    assert!(state.buffers().is_empty());
    assert_eq!(state.windows().leaf_count(), 3);
}

// Restart

#[test]
fn layout_survives_restart_through_snapshot_file() {
    let (host, _) = fixtures::status_and_channels();
    let mut state = LayoutState::new();
    state.save_on_exit(&host, SaveLayoutOnExit::All);

    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("layout.json");
    state.to_snapshot().write_to_file(&path).expect("write snapshot");

    // Next start: buffers reopen in a different order, one window.
    let snapshot = LayoutSnapshot::read_from_file(&path).expect("read snapshot");
    let restored = LayoutState::from_snapshot(&snapshot).expect("valid snapshot");
    assert_eq!(restored, state);

    let mut next = MemoryHost::new();
    next.add_buffer("irc", "#b");
    next.add_buffer("irc", "#a");
    next.add_buffer("core", "status");

    restored.apply_buffers(&mut next);
    assert_eq!(next.buffer_names(), vec!["weechat", "status", "#a", "#b"]);

    let report = restored.apply_windows(&mut next);
    assert!(report.focus_matched);
    let leaf = || Box::new(Skeleton::Leaf);
    assert_eq!(
        next.shape().skeleton(),
        Skeleton::Split(50, true, leaf(), Box::new(Skeleton::Split(30, false, leaf(), leaf())))
    );
    assert_eq!(
        next.window_buffer_key(next.current()),
        Some(key("irc", "#b"))
    );
}

#[test]
fn corrupt_snapshot_file_is_rejected() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("layout.json");
    std::fs::write(&path, "{ \"windows\": [ { \"id\": 0 } ] }").expect("write");
    assert!(LayoutSnapshot::read_from_file(&path).is_err());
    assert!(LayoutSnapshot::read_from_file(dir.path().join("missing.json")).is_err());
}

// Diagnostics

#[test]
fn dump_log_emits_on_dump_target() {
    let (host, _) = fixtures::status_and_channels();
    let mut state = LayoutState::new();
    state.save_on_exit(&host, SaveLayoutOnExit::All);

    let captured = with_captured_tracing(|| state.dump_log());

    let lines: Vec<&str> = captured
        .events
        .iter()
        .filter(|event| event.target == "chatui.layout.dump")
        .filter_map(|event| event.fields.get("message").map(String::as_str))
        .collect();
    assert_eq!(lines.len(), state.dump().lines().count());
    assert_eq!(
        lines.first().copied(),
        Some("[layout] buffers: 4, windows: 5, current window: 5")
    );
    assert!(lines.iter().any(|line| line.contains("'#b'")));
}

#[test]
fn apply_runs_inside_named_spans() {
    let (host, _) = fixtures::status_and_channels();
    let mut state = LayoutState::new();
    state.save_on_exit(&host, SaveLayoutOnExit::All);
    let mut next = MemoryHost::new();
    next.add_buffer("irc", "#a");

    let captured = with_captured_tracing(|| {
        state.apply_buffers(&mut next);
        state.apply_windows(&mut next);
    });

    assert!(captured.spans.iter().any(|name| name == "layout.apply_buffers"));
    assert!(captured.spans.iter().any(|name| name == "layout.apply_windows"));
    let applied = captured
        .events
        .iter()
        .find(|event| {
            event.target == "chatui.layout"
                && event.fields.get("message").map(String::as_str) == Some("window layout applied")
        })
        .expect("apply summary event");
    assert_eq!(applied.fields.get("splits").map(String::as_str), Some("2"));
    assert_eq!(applied.fields.get("bound").map(String::as_str), Some("1"));
}
