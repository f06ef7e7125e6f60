mod common;

use std::fmt;
use std::sync::{Arc, Mutex};

use common::*;
use core_revisions::Msg;
use tracing::Subscriber;
use tracing::field::{Field, Visit};
use tracing_subscriber::layer::{Context, Layer, SubscriberExt};
use tracing_subscriber::registry::Registry;

#[derive(Clone, Default)]
struct Capture {
    events: Arc<Mutex<Vec<CapturedEvent>>>,
}

#[derive(Clone, Debug)]
struct CapturedEvent {
    target: String,
    fields: Vec<(String, String)>,
}

impl CapturedEvent {
    fn field(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    fn message(&self) -> Option<&str> {
        self.field("message")
    }
}

#[derive(Default)]
struct FieldCollector {
    fields: Vec<(String, String)>,
}

impl Visit for FieldCollector {
    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        self.fields
            .push((field.name().to_string(), format!("{:?}", value)));
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        self.fields.push((field.name().to_string(), value.to_string()));
    }
}

impl<S> Layer<S> for Capture
where
    S: Subscriber,
{
    fn on_event(&self, event: &tracing::Event<'_>, _ctx: Context<'_, S>) {
        let mut collector = FieldCollector::default();
        event.record(&mut collector);
        self.events.lock().unwrap().push(CapturedEvent {
            target: event.metadata().target().to_string(),
            fields: collector.fields,
        });
    }
}

fn captured<F: FnOnce()>(f: F) -> Vec<CapturedEvent> {
    let capture = Capture::default();
    let events = capture.events.clone();
    let subscriber = Registry::default().with(capture);
    tracing::subscriber::with_default(subscriber, f);
    let events = events.lock().unwrap().clone();
    events
}

#[test]
fn stale_batch_logs_its_tag() {
    let events = captured(|| {
        let mut h = Harness::new(rows(40, Some(0)), 10);
        h.model.set_viewport_height(5);
        let open = single_job(h.model.init());
        let pull = single_job(h.model.update(open()));
        let _reopen = h.model.update(Msg::Refresh {
            keep_selections: false,
            selected_revision: None,
        });
        h.model.update(pull());
    });

    let stale = events
        .iter()
        .find(|e| e.target == "revisions.load" && e.message() == Some("stale_batch_dropped"))
        .expect("stale batch event");
    assert_eq!(stale.field("tag"), Some("1"));
    assert_eq!(stale.field("current"), Some("2"));
}

#[test]
fn refresh_logs_revset_and_rows() {
    let events = captured(|| {
        let mut h = Harness::with_settings(
            rows(3, Some(0)),
            10,
            core_revisions::Settings::default(),
            "mine()",
        );
        h.model.set_viewport_height(10);
        let tasks = h.model.init();
        h.drain(tasks);
    });

    let refresh = events
        .iter()
        .find(|e| e.message() == Some("refresh"))
        .expect("refresh event");
    assert_eq!(refresh.field("revset"), Some("mine()"));
    let updated = events
        .iter()
        .find(|e| e.message() == Some("rows_updated"))
        .expect("rows_updated event");
    assert_eq!(updated.field("rows"), Some("3"));
}
