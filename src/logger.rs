// src/logger.rs
//! The logging facade: named logger handles, the event builder for the
//! structured call path, and the bridge that feeds `log` crate records into
//! the same pipeline.

use crate::config;
use crate::error::PipelineError;
use crate::event::{
    EventRecord, FieldMap, FieldValue, EVENT_KEY, EXCEPTION_KEY, EXTRA_KEY, FROM_STRUCTLOG_KEY,
    FUNC_NAME_KEY, LEVEL_KEY, LINENO_KEY, LOGGER_KEY, PATHNAME_KEY, RECORD_KEY,
};
use crate::exception::ExceptionInfo;
use log::Level;
use std::panic::Location;

pub(crate) fn level_label(level: Level) -> &'static str {
    match level {
        Level::Error => "error",
        Level::Warn => "warn",
        Level::Info => "info",
        Level::Debug => "debug",
        Level::Trace => "trace",
    }
}

/// A named logger handle. Cheap to create and clone; all state lives in the
/// process-wide configuration.
#[derive(Debug, Clone)]
pub struct Logger {
    name: String,
}

/// Return a named logger.
pub fn get_logger(name: impl Into<String>) -> Logger {
    Logger { name: name.into() }
}

/// Return a logger named after the calling file, dotted like a module path
/// (`src/api/users.rs` becomes `api.users`).
#[track_caller]
pub fn get_logger_auto() -> Logger {
    Logger {
        name: logger_name_from_path(Location::caller().file()),
    }
}

fn logger_name_from_path(file: &str) -> String {
    let trimmed = file.trim_start_matches("./").trim_start_matches('/');
    let stem = trimmed.strip_suffix(".rs").unwrap_or(trimmed);
    let mut name = stem.replace(['/', '\\'], ".");

    // Strip common source-layout prefixes.
    loop {
        let mut stripped = false;
        for prefix in ["src.", "code.", "app.", "tests."] {
            if let Some(rest) = name.strip_prefix(prefix) {
                name = rest.to_string();
                stripped = true;
            }
        }
        if !stripped {
            break;
        }
    }
    name.trim_matches('.').to_string()
}

impl Logger {
    pub fn name(&self) -> &str {
        &self.name
    }

    #[track_caller]
    pub fn trace(&self, message: impl Into<String>) -> EventBuilder {
        self.event(Level::Trace, message)
    }

    #[track_caller]
    pub fn debug(&self, message: impl Into<String>) -> EventBuilder {
        self.event(Level::Debug, message)
    }

    #[track_caller]
    pub fn info(&self, message: impl Into<String>) -> EventBuilder {
        self.event(Level::Info, message)
    }

    #[track_caller]
    pub fn warn(&self, message: impl Into<String>) -> EventBuilder {
        self.event(Level::Warn, message)
    }

    #[track_caller]
    pub fn error(&self, message: impl Into<String>) -> EventBuilder {
        self.event(Level::Error, message)
    }

    #[track_caller]
    fn event(&self, level: Level, message: impl Into<String>) -> EventBuilder {
        EventBuilder {
            logger: self.name.clone(),
            level,
            message: message.into(),
            extra: FieldMap::new(),
            exception: None,
            location: Location::caller(),
        }
    }
}

/// One in-flight log call on the structured path. Attach fields, then
/// [`send`](EventBuilder::send) it through the pipeline.
#[must_use = "an event does nothing until sent"]
pub struct EventBuilder {
    logger: String,
    level: Level,
    message: String,
    extra: FieldMap,
    exception: Option<ExceptionInfo>,
    location: &'static Location<'static>,
}

impl EventBuilder {
    /// Attach a key/value field to the event.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }

    /// Attach structured exception data captured from an error value.
    pub fn err<E>(self, err: &E) -> Self
    where
        E: std::error::Error + ?Sized,
    {
        self.exception(ExceptionInfo::capture(err))
    }

    pub fn exception(mut self, info: ExceptionInfo) -> Self {
        self.exception = Some(info);
        self
    }

    /// Run the event through the pipeline and write it to every admitting
    /// sink. Processor defects and sink write failures propagate here; they
    /// are never silently dropped.
    pub fn send(self) -> Result<(), PipelineError> {
        let Some(runtime) = config::runtime() else {
            // Not configured: nothing to do, mirroring an unconfigured
            // logging facility.
            return Ok(());
        };
        if !runtime.enabled(&self.logger, self.level) {
            return Ok(());
        }

        let mut event = EventRecord::new();
        event.insert(EVENT_KEY, self.message);
        event.insert(LEVEL_KEY, level_label(self.level));
        event.insert(LOGGER_KEY, self.logger.clone());
        event.insert(FROM_STRUCTLOG_KEY, true);
        event.insert(EXTRA_KEY, FieldValue::Map(self.extra));
        if let Some(info) = self.exception {
            event.insert(EXCEPTION_KEY, info.to_field_value());
        }
        if runtime.include_source_location() {
            event.insert(PATHNAME_KEY, self.location.file());
            event.insert(LINENO_KEY, self.location.line());
            // Function names are not capturable at runtime; the logger name
            // stands in for the function slot of the merged location.
            event.insert(FUNC_NAME_KEY, self.logger);
        }

        runtime.dispatch(event, self.level)
    }

    /// Like [`send`](EventBuilder::send), for call sites that cannot handle
    /// the error: failures are reported on stderr instead of propagating.
    pub fn log(self) {
        if let Err(e) = self.send() {
            eprintln!("structlog: {}", e);
        }
    }
}

/// `log::Log` implementation feeding standard-facade records through the
/// pipeline. Installed once by `setup`; reads the current runtime on every
/// call.
pub(crate) struct LogBridge;

impl log::Log for LogBridge {
    fn enabled(&self, metadata: &log::Metadata) -> bool {
        config::runtime().is_some_and(|rt| rt.enabled(metadata.target(), metadata.level()))
    }

    fn log(&self, record: &log::Record) {
        let Some(runtime) = config::runtime() else {
            return;
        };
        if !runtime.enabled(record.target(), record.level()) {
            return;
        }

        // The raw record rides along under `_record`; FlattenExtra merges
        // only its non-standard attributes to the top level.
        let mut raw = FieldMap::new();
        raw.insert("message".to_string(), record.args().to_string().into());
        raw.insert("level".to_string(), level_label(record.level()).into());
        raw.insert("target".to_string(), record.target().into());
        if let Some(module_path) = record.module_path() {
            raw.insert("module_path".to_string(), module_path.into());
        }
        if let Some(file) = record.file() {
            raw.insert("file".to_string(), file.into());
        }
        if let Some(line) = record.line() {
            raw.insert("line".to_string(), line.into());
        }
        let mut collector = KvCollector { fields: &mut raw };
        let _ = record.key_values().visit(&mut collector);

        let mut event = EventRecord::new();
        event.insert(EVENT_KEY, record.args().to_string());
        event.insert(LEVEL_KEY, level_label(record.level()));
        event.insert(LOGGER_KEY, record.target());
        event.insert(RECORD_KEY, FieldValue::Map(raw));

        // The log facade offers no error channel; report instead of dropping
        // silently.
        if let Err(e) = runtime.dispatch(event, record.level()) {
            eprintln!("structlog: {}", e);
        }
    }

    fn flush(&self) {}
}

struct KvCollector<'a> {
    fields: &'a mut FieldMap,
}

impl<'a, 'kv> log::kv::VisitSource<'kv> for KvCollector<'a> {
    fn visit_pair(
        &mut self,
        key: log::kv::Key<'kv>,
        value: log::kv::Value<'kv>,
    ) -> Result<(), log::kv::Error> {
        let converted = if let Some(s) = value.to_borrowed_str() {
            FieldValue::from(s)
        } else if let Some(n) = value.to_i64() {
            FieldValue::from(n)
        } else if let Some(n) = value.to_u64() {
            FieldValue::from(n)
        } else if let Some(n) = value.to_f64() {
            FieldValue::from(n)
        } else if let Some(b) = value.to_bool() {
            FieldValue::from(b)
        } else {
            FieldValue::from(value.to_string())
        };
        self.fields.insert(key.as_str().to_string(), converted);
        Ok(())
    }
}
