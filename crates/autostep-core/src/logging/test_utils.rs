//! In-memory capture of tracing events for assertions.
//!
//! Used by the build pipeline's tests to check which diagnostics were
//! reported and at which level.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::field::{Field, Visit};
use tracing::level_filters::LevelFilter;
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::Layer;
use tracing_subscriber::layer::{Context, SubscriberExt};
use tracing_subscriber::util::SubscriberInitExt;

/// One recorded event.
#[derive(Clone, Debug)]
pub struct CapturedEvent {
    /// Event level.
    pub level: Level,
    /// Rendered message.
    pub message: String,
    /// Structured fields other than the message.
    pub fields: BTreeMap<String, String>,
}

impl CapturedEvent {
    /// Value of a structured field.
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }
}

/// Events recorded by [`capture_logs`], shared with the capturing layer.
#[derive(Clone, Default)]
pub struct CapturedLogs {
    events: Arc<Mutex<Vec<CapturedEvent>>>,
}

impl CapturedLogs {
    /// Snapshot of every recorded event.
    pub fn events(&self) -> Vec<CapturedEvent> {
        self.events.lock().clone()
    }

    /// Messages recorded at `level`, in order.
    pub fn messages_at(&self, level: Level) -> Vec<String> {
        self.events
            .lock()
            .iter()
            .filter(|e| e.level == level)
            .map(|e| e.message.clone())
            .collect()
    }

    /// Whether any message contains `needle`.
    pub fn has_message(&self, needle: &str) -> bool {
        self.events.lock().iter().any(|e| e.message.contains(needle))
    }

    /// Whether a message at `level` contains `needle`.
    pub fn has_event(&self, level: Level, needle: &str) -> bool {
        self.messages_at(level).iter().any(|m| m.contains(needle))
    }

    /// Number of events at `level`.
    pub fn count_at_level(&self, level: Level) -> usize {
        self.messages_at(level).len()
    }

    /// Forget everything recorded so far.
    pub fn clear(&self) {
        self.events.lock().clear();
    }
}

#[derive(Default)]
struct EventRecorder {
    message: String,
    fields: BTreeMap<String, String>,
}

impl EventRecorder {
    fn record(&mut self, field: &Field, value: String) {
        if field.name() == "message" {
            self.message = value;
        } else {
            let _ = self.fields.insert(field.name().to_owned(), value);
        }
    }
}

impl Visit for EventRecorder {
    fn record_str(&mut self, field: &Field, value: &str) {
        self.record(field, value.to_owned());
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        self.record(field, format!("{value:?}"));
    }
}

struct CaptureLayer(CapturedLogs);

impl<S: Subscriber> Layer<S> for CaptureLayer {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let mut recorder = EventRecorder::default();
        event.record(&mut recorder);
        self.0.events.lock().push(CapturedEvent {
            level: *event.metadata().level(),
            message: recorder.message,
            fields: recorder.fields,
        });
    }
}

/// Install a thread-local subscriber that records every event.
///
/// Keep the guard alive for the whole test. `#[tokio::test]` runs on a
/// current-thread runtime, so async code is captured too.
pub fn capture_logs() -> (CapturedLogs, tracing::subscriber::DefaultGuard) {
    let logs = CapturedLogs::default();
    let guard = tracing_subscriber::registry()
        .with(CaptureLayer(logs.clone()))
        .with(LevelFilter::TRACE)
        .set_default();
    (logs, guard)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_levels_in_order() {
        let (logs, _guard) = capture_logs();
        tracing::info!("compiled");
        tracing::error!("link failed");
        tracing::error!("second failure");
        assert!(logs.has_event(Level::INFO, "compiled"));
        assert!(!logs.has_event(Level::INFO, "link failed"));
        assert_eq!(logs.messages_at(Level::ERROR), vec!["link failed", "second failure"]);
        assert_eq!(logs.count_at_level(Level::ERROR), 2);
    }

    #[test]
    fn records_fields() {
        let (logs, _guard) = capture_logs();
        tracing::info!(file = "a.as", count = 3, "scanned");
        let events = logs.events();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].field("file"), Some("a.as"));
        assert_eq!(events[0].field("count"), Some("3"));
        assert_eq!(events[0].message, "scanned");
    }

    #[test]
    fn clear_forgets_events() {
        let (logs, _guard) = capture_logs();
        tracing::info!("event");
        logs.clear();
        assert!(logs.events().is_empty());
        assert!(!logs.has_message("event"));
    }
}
