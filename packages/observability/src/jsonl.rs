//! `tracing` layer that renders each event as one line of JSON.

use crate::redact::{sanitize_fields, METADATA_FIELDS};
use crate::ObservabilityMode;
use chrono::{SecondsFormat, Utc};
use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::io::Write;
use tracing::field::{Field, Visit};
use tracing::{Event, Subscriber};
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::layer::Context;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::Layer;

/// One line of the log file.
#[derive(Debug, Clone, Serialize)]
pub struct LogRecord {
    /// RFC 3339, microsecond precision, UTC.
    pub ts: String,
    pub level: &'static str,
    pub service: String,
    pub pid: u32,
    pub target: String,
    pub msg: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub span: Option<String>,
    #[serde(skip_serializing_if = "HashMap::is_empty")]
    pub fields: HashMap<String, Value>,
}

#[derive(Default)]
struct Collected {
    msg: String,
    fields: HashMap<String, Value>,
}

impl Collected {
    fn put(&mut self, field: &Field, value: Value) {
        match (field.name(), value) {
            ("message", Value::String(text)) => self.msg = text,
            (name, value) => {
                self.fields.insert(name.to_string(), value);
            }
        }
    }
}

impl Visit for Collected {
    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        self.put(field, Value::String(format!("{value:?}")));
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        self.put(field, Value::from(value));
    }

    fn record_i64(&mut self, field: &Field, value: i64) {
        self.put(field, Value::from(value));
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        self.put(field, Value::from(value));
    }

    fn record_bool(&mut self, field: &Field, value: bool) {
        self.put(field, Value::from(value));
    }

    // NaN and infinities become null.
    fn record_f64(&mut self, field: &Field, value: f64) {
        self.put(field, Value::from(value));
    }

    fn record_error(&mut self, field: &Field, value: &(dyn std::error::Error + 'static)) {
        self.put(field, Value::String(value.to_string()));
    }
}

pub struct JsonlLayer<W> {
    service: String,
    pid: u32,
    mode: ObservabilityMode,
    writer: W,
}

impl<W> JsonlLayer<W> {
    pub fn new(service: impl Into<String>, writer: W, mode: ObservabilityMode) -> Self {
        Self {
            service: service.into(),
            pid: std::process::id(),
            mode,
            writer,
        }
    }

    fn keep(&self, fields: HashMap<String, Value>) -> HashMap<String, Value> {
        let mut fields = sanitize_fields(&fields);
        if self.mode == ObservabilityMode::MetadataOnly {
            fields.retain(|name, _| METADATA_FIELDS.contains(&name.as_str()));
        }
        fields
    }

    fn record(&self, event: &Event<'_>, span: Option<String>) -> LogRecord {
        let mut collected = Collected::default();
        event.record(&mut collected);
        let meta = event.metadata();
        LogRecord {
            ts: Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true),
            level: meta.level().as_str(),
            service: self.service.clone(),
            pid: self.pid,
            target: meta.target().to_string(),
            msg: collected.msg,
            span,
            fields: self.keep(collected.fields),
        }
    }
}

impl<S, W> Layer<S> for JsonlLayer<W>
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    W: for<'w> MakeWriter<'w> + 'static,
{
    fn on_event(&self, event: &Event<'_>, ctx: Context<'_, S>) {
        let span = ctx.event_span(event).map(|span| span.name().to_string());
        let record = self.record(event, span);
        let Ok(mut line) = serde_json::to_vec(&record) else {
            return;
        };
        line.push(b'\n');
        let _ = self.writer.make_writer().write_all(&line);
    }
}
