//! Tracing subscriber integration.
//!
//! Provides a tracing `Layer` that turns events into inspectlog messages.
//! Structured fields are kept as values, so they are described and laid out
//! like any other logged value instead of being pre-rendered to strings.

use std::fmt;

use inspectlog_core::logging::targets;
use inspectlog_core::{ColorName, IntoValue, Value};
use tracing::field::{Field, Visit};
use tracing::{Event, Subscriber};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::layer::{Context, Layer};
use tracing_subscriber::prelude::*;
use tracing_subscriber::registry::LookupSpan;

use crate::level::LogLevel;
use crate::logger::Logger;
use crate::message::Tag;
use crate::template::Template;

/// A tracing layer that dispatches events through a [`Logger`].
///
/// The event's `message` becomes the text; any other fields, plus the span
/// path under `span`, become one record value after it. Events from
/// inspectlog's own targets are dropped.
#[derive(Debug)]
pub struct InspectLayer {
    logger: Logger,
    show_targets: bool,
}

impl InspectLayer {
    #[must_use]
    pub fn new(logger: Logger) -> Self {
        Self {
            logger,
            show_targets: true,
        }
    }

    /// Set whether event targets become prefix tags.
    #[must_use]
    pub fn with_targets(mut self, show: bool) -> Self {
        self.show_targets = show;
        self
    }
}

#[derive(Default)]
struct FieldCollector {
    message: Option<String>,
    fields: Vec<(String, Value)>,
}

impl FieldCollector {
    fn record_value(&mut self, field: &Field, value: Value) {
        if field.name() == "message" {
            if self.message.is_none() {
                if let Value::String(text) = value {
                    self.message = Some(text);
                    return;
                }
            } else {
                return;
            }
        }
        self.fields.push((field.name().to_string(), value));
    }
}

impl Visit for FieldCollector {
    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        self.record_value(field, Value::String(format!("{value:?}")));
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        self.record_value(field, value.into_value());
    }

    fn record_bool(&mut self, field: &Field, value: bool) {
        self.record_value(field, value.into_value());
    }

    fn record_i64(&mut self, field: &Field, value: i64) {
        self.record_value(field, value.into_value());
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        self.record_value(field, value.into_value());
    }

    fn record_i128(&mut self, field: &Field, value: i128) {
        self.record_value(field, value.into_value());
    }

    fn record_f64(&mut self, field: &Field, value: f64) {
        self.record_value(field, value.into_value());
    }

    fn record_error(&mut self, field: &Field, value: &(dyn std::error::Error + 'static)) {
        self.record_value(field, Value::error(value));
    }
}

impl<S> Layer<S> for InspectLayer
where
    S: Subscriber + for<'lookup> LookupSpan<'lookup>,
{
    fn on_event(&self, event: &Event<'_>, ctx: Context<'_, S>) {
        let metadata = event.metadata();
        let level = LogLevel::from(*metadata.level());
        if metadata.target().starts_with(targets::INSPECTLOG) || !self.logger.threshold().allows(level) {
            return;
        }

        let mut collector = FieldCollector::default();
        event.record(&mut collector);

        if let Some(scope) = ctx.event_scope(event) {
            let spans: Vec<String> = scope.from_root().map(|span| span.name().to_string()).collect();
            if !spans.is_empty() {
                collector
                    .fields
                    .push(("span".to_string(), spans.join("::").into_value()));
            }
        }

        let message = collector
            .message
            .unwrap_or_else(|| metadata.name().to_string());
        let mut template = Template::new().text(message);
        if !collector.fields.is_empty() {
            template = template.text(" ").value(Value::object(collector.fields));
        }

        let logger = if self.show_targets {
            self.logger.prefix(Tag::new(metadata.target(), ColorName::Gray))
        } else {
            self.logger.clone()
        };
        logger.log(level, template);
    }
}

/// Builder for a tracing subscriber that logs through inspectlog.
#[derive(Debug)]
pub struct InspectSubscriberBuilder {
    logger: Logger,
    show_targets: bool,
    level_filter: LevelFilter,
}

impl InspectSubscriberBuilder {
    /// Create a new builder with defaults.
    #[must_use]
    pub fn new(logger: Logger) -> Self {
        Self {
            logger,
            show_targets: true,
            level_filter: LevelFilter::INFO,
        }
    }

    /// Toggle target rendering.
    #[must_use]
    pub fn with_targets(mut self, show: bool) -> Self {
        self.show_targets = show;
        self
    }

    /// Set the minimum tracing level.
    #[must_use]
    pub fn with_level_filter(mut self, filter: LevelFilter) -> Self {
        self.level_filter = filter;
        self
    }

    /// Build the subscriber without installing it.
    #[must_use]
    pub fn build(self) -> impl Subscriber {
        let layer = InspectLayer::new(self.logger).with_targets(self.show_targets);
        tracing_subscriber::registry()
            .with(self.level_filter)
            .with(layer)
    }

    /// Build and install as the global subscriber.
    pub fn init(self) -> Result<(), tracing::subscriber::SetGlobalDefaultError> {
        let subscriber = self.build();
        tracing::subscriber::set_global_default(subscriber)
    }
}
