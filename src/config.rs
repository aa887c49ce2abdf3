// src/config.rs
//! Process-wide setup: assembles the processor chain and sinks from a
//! `Settings` value and installs them as the global logging configuration.

use crate::error::{ConfigError, PipelineError};
use crate::event::EventRecord;
use crate::formatters::console::ConsoleRenderer;
use crate::formatters::json::JsonRenderer;
use crate::formatters::{OutputFormat, Renderer};
use crate::pipeline::processors::{
    AddTimestamp, CapExceptionFrames, CapTimestampToMillis, EventRenamer, FlattenExtra,
    MergeCallsiteLocation, MergeContextFields, RemoveInternalMeta,
};
use crate::pipeline::{Pipeline, Processor};
use crate::sink::Sink;
use is_terminal::IsTerminal;
use log::{Level, LevelFilter};
use once_cell::sync::Lazy;
use std::path::PathBuf;
use std::sync::{Arc, Once, RwLock};

/// Environment variable consulted for the console format (`console` or
/// `json`) when `Settings.format` is unset. An unparsable value is a setup
/// error, not a silent fallback.
pub const FORMAT_ENV_VAR: &str = "STRUCTLOG_FORMAT";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimestampPrecision {
    /// Six fractional digits (the raw stamp).
    Micros,
    /// Three fractional digits, truncated.
    Millis,
}

/// Per-logger level override merged into the base configuration.
#[derive(Debug, Clone)]
pub struct LoggerConfig {
    pub name: String,
    pub level: LevelFilter,
}

/// Level filter for one named logger. Use this to silence a chatty logger by
/// passing the result to [`setup`].
pub fn filter_named_logger(name: impl Into<String>, level: LevelFilter) -> LoggerConfig {
    LoggerConfig {
        name: name.into(),
        level,
    }
}

/// Setup options. All fields are optional in the sense that the default
/// value is a working configuration.
pub struct Settings {
    /// Output format for the console sink. Default: the `STRUCTLOG_FORMAT`
    /// environment variable if set, else console when stdout is an
    /// interactive terminal, JSON otherwise.
    pub format: Option<OutputFormat>,
    /// Force colors on or off; default follows terminal detection.
    pub colors: Option<bool>,
    /// Capture call-site fields and merge them into a `location` field.
    pub include_source_location: bool,
    /// Minimum severity processed anywhere; unset means no global filtering.
    pub global_filter_level: Option<LevelFilter>,
    /// Additional file sink; parent directories are created if missing.
    pub log_file: Option<PathBuf>,
    /// Format for the file sink, defaulting like `format`.
    pub log_file_format: Option<OutputFormat>,
    /// Upper bound on rendered traceback frames. Must be positive.
    pub max_frames: usize,
    /// Per-logger level overrides. Reserved names are rejected.
    pub logger_configs: Vec<LoggerConfig>,
    /// User-supplied processors appended to the shared chain.
    pub extra_processors: Vec<Box<dyn Processor>>,
    pub timestamps: TimestampPrecision,
    /// Allow repeated reconfiguration (tests only).
    pub testing_mode: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            format: None,
            colors: None,
            include_source_location: false,
            global_filter_level: None,
            log_file: None,
            log_file_format: None,
            max_frames: 100,
            logger_configs: Vec::new(),
            extra_processors: Vec::new(),
            timestamps: TimestampPrecision::Micros,
            testing_mode: false,
        }
    }
}

/// The immutable, installed configuration: shared processor chain plus sinks.
pub(crate) struct Runtime {
    shared: Pipeline,
    sinks: Vec<Sink>,
    global_level: LevelFilter,
    logger_levels: Vec<(String, LevelFilter)>,
    include_source_location: bool,
}

impl Runtime {
    pub(crate) fn include_source_location(&self) -> bool {
        self.include_source_location
    }

    /// Effective filter for a logger name: the longest matching per-logger
    /// override, else the global level.
    pub(crate) fn effective_level(&self, logger: &str) -> LevelFilter {
        let mut best: Option<(&str, LevelFilter)> = None;
        for (name, level) in &self.logger_levels {
            let matches = logger == name
                || (logger.starts_with(name.as_str())
                    && matches!(logger.as_bytes().get(name.len()), Some(b'.') | Some(b':')));
            if matches && best.map_or(true, |(b, _)| name.len() > b.len()) {
                best = Some((name, *level));
            }
        }
        best.map_or(self.global_level, |(_, level)| level)
    }

    pub(crate) fn enabled(&self, logger: &str, level: Level) -> bool {
        level <= self.effective_level(logger)
    }

    /// Run the shared chain once, then hand the result to every sink whose
    /// level admits the event.
    pub(crate) fn dispatch(&self, event: EventRecord, level: Level) -> Result<(), PipelineError> {
        let processed = self.shared.run(event)?;
        for sink in &self.sinks {
            if level <= sink.level() {
                sink.write(processed.clone())?;
            }
        }
        Ok(())
    }
}

static RUNTIME: Lazy<RwLock<Option<Arc<Runtime>>>> = Lazy::new(|| RwLock::new(None));
static BRIDGE: Once = Once::new();

pub(crate) fn runtime() -> Option<Arc<Runtime>> {
    RUNTIME.read().unwrap_or_else(|e| e.into_inner()).clone()
}

/// Whether [`setup`] has installed a configuration in this process.
pub fn is_configured() -> bool {
    runtime().is_some()
}

/// Configure structured logging for the whole process.
///
/// Outside testing mode this is a one-time guarded operation: the first
/// caller wins, and later attempts are a no-op that emits a single warning
/// through the existing pipeline. A failed setup leaves any previously
/// working configuration untouched.
pub fn setup(settings: Settings) -> Result<(), ConfigError> {
    if is_configured() && !settings.testing_mode {
        crate::logger::get_logger("structlog")
            .warn("logging was already configured, so setup() did nothing")
            .log();
        return Ok(());
    }

    if settings.max_frames == 0 {
        return Err(ConfigError::NonPositiveMaxFrames);
    }
    for logger_config in &settings.logger_configs {
        if logger_config.name.is_empty() || logger_config.name == "root" {
            return Err(ConfigError::ReservedLoggerName(logger_config.name.clone()));
        }
    }

    let stdout_tty = std::io::stdout().is_terminal();
    let default_format = if stdout_tty {
        OutputFormat::Console
    } else {
        OutputFormat::Json
    };
    let stdout_format = match settings.format {
        Some(format) => format,
        None => match std::env::var(FORMAT_ENV_VAR) {
            Ok(value) => value.parse::<OutputFormat>()?,
            Err(_) => default_format,
        },
    };
    let use_colors = settings.colors.unwrap_or(stdout_tty);
    let global_level = settings.global_filter_level.unwrap_or(LevelFilter::Trace);

    // Shared chain, applied once per event before any sink-specific tail.
    let mut shared = Pipeline::new();
    shared.push(Box::new(AddTimestamp));
    shared.push(Box::new(MergeContextFields));
    if settings.timestamps == TimestampPrecision::Millis {
        shared.push(Box::new(CapTimestampToMillis));
    }
    if settings.include_source_location {
        shared.push(Box::new(MergeCallsiteLocation));
    }
    shared.extend(settings.extra_processors);

    let mut sinks = Vec::new();
    let (tail, renderer) = formatter_chain(stdout_format, use_colors, settings.max_frames)?;
    sinks.push(Sink::console(tail, renderer, global_level));

    if let Some(path) = &settings.log_file {
        let file_format = settings.log_file_format.unwrap_or(default_format);
        // Files never get ANSI colors, whatever the console does.
        let (tail, renderer) = formatter_chain(file_format, false, settings.max_frames)?;
        sinks.push(Sink::file(path, tail, renderer, global_level)?);
    }

    let runtime = Runtime {
        shared,
        sinks,
        global_level,
        logger_levels: settings
            .logger_configs
            .into_iter()
            .map(|lc| (lc.name, lc.level))
            .collect(),
        include_source_location: settings.include_source_location,
    };

    *RUNTIME.write().unwrap_or_else(|e| e.into_inner()) = Some(Arc::new(runtime));

    // The log facade accepts a logger exactly once per process; the bridge
    // reads the current runtime on every call, so reconfiguration in testing
    // mode works without reinstalling it.
    BRIDGE.call_once(|| {
        let _ = log::set_boxed_logger(Box::new(crate::logger::LogBridge));
    });
    log::set_max_level(global_level);

    Ok(())
}

/// Per-sink formatter chain: flatten extras, strip internal meta, normalize
/// the message key, then the renderer. JSON sinks additionally cap structured
/// tracebacks at twice the rendered-frame budget.
fn formatter_chain(
    format: OutputFormat,
    use_colors: bool,
    max_frames: usize,
) -> Result<(Pipeline, Box<dyn Renderer>), ConfigError> {
    let mut tail = Pipeline::new();
    tail.push(Box::new(FlattenExtra));
    tail.push(Box::new(RemoveInternalMeta));
    tail.push(Box::new(EventRenamer::default()));

    let renderer: Box<dyn Renderer> = match format {
        OutputFormat::Console => {
            Box::new(ConsoleRenderer::new(use_colors).max_frames(max_frames))
        }
        OutputFormat::Json => {
            tail.push(Box::new(CapExceptionFrames::new(2 * max_frames)?));
            Box::new(JsonRenderer)
        }
    };
    Ok((tail, renderer))
}
