// src/lib.rs
//! Drop-in structured logging.
//!
//! Events logged through [`get_logger`] (or through the standard `log`
//! facade) flow as ordered field maps through a configurable chain of
//! processors, then through a per-sink formatter chain, and finally to a
//! console or JSON renderer.
//!
//! ```no_run
//! use structlog::{get_logger, setup, Settings};
//!
//! setup(Settings::default()).unwrap();
//! get_logger("app")
//!     .info("user login")
//!     .with("user", "bob")
//!     .log();
//! ```

pub mod colors;
pub mod config;
pub mod context;
pub mod error;
pub mod event;
pub mod exception;
pub mod formatters;
pub mod logger;
pub mod pipeline;
pub mod sink;

pub use config::{
    filter_named_logger, is_configured, setup, LoggerConfig, Settings, TimestampPrecision,
    FORMAT_ENV_VAR,
};
pub use context::{bind_context, clear_context, unbind_context, ScopedContext};
pub use error::{ConfigError, PipelineError};
pub use event::{EventRecord, FieldMap, FieldValue, Loggable};
pub use exception::{ExceptionInfo, Frame};
pub use formatters::{OutputFormat, Renderer};
pub use logger::{get_logger, get_logger_auto, EventBuilder, Logger};
pub use pipeline::processors::{
    AddTimestamp, CapExceptionFrames, CapTimestampToMillis, EventRenamer, FieldDropper,
    FieldRenamer, FieldTransformer, FieldsAdder, FlattenExtra, MergeCallsiteLocation,
    MergeContextFields, ObjectToDictTransformer, RemoveInternalMeta,
};
pub use pipeline::{Pipeline, Processor};

pub use log::{Level, LevelFilter};
