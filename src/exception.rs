//! Structured exception data attached to events under the `exception` field.

use crate::event::{FieldMap, FieldValue};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::backtrace::{Backtrace, BacktraceStatus};
use std::error::Error;

/// One call-site entry of a captured stack. Frames are stored outermost
/// first, so the most recent frame is the last element.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Frame {
    pub function: String,
    pub file: String,
    pub line: u32,
}

/// Structured exception information: error kind, flattened message chain and
/// an optional stack.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExceptionInfo {
    pub kind: String,
    pub message: String,
    #[serde(default)]
    pub frames: Vec<Frame>,
}

impl ExceptionInfo {
    pub fn new(kind: impl Into<String>, message: impl Into<String>) -> Self {
        ExceptionInfo {
            kind: kind.into(),
            message: message.into(),
            frames: Vec::new(),
        }
    }

    /// Build from an error value, flattening its source chain into the
    /// message. No stack is captured.
    pub fn from_error<E>(err: &E) -> Self
    where
        E: Error + ?Sized,
    {
        let kind = short_type_name(std::any::type_name::<E>());
        let mut message = err.to_string();
        let mut source = err.source();
        while let Some(cause) = source {
            message.push_str(": ");
            message.push_str(&cause.to_string());
            source = cause.source();
        }
        ExceptionInfo::new(kind, message)
    }

    /// Like [`ExceptionInfo::from_error`] but also captures the current
    /// stack. Frames are empty when backtraces are disabled (`RUST_BACKTRACE`
    /// unset).
    pub fn capture<E>(err: &E) -> Self
    where
        E: Error + ?Sized,
    {
        let mut info = Self::from_error(err);
        info.frames = frames_from_backtrace(&Backtrace::capture());
        info
    }

    /// Event-field representation consumed by `CapExceptionFrames` and the
    /// renderers: a nested map with a `frames` sequence.
    pub fn to_field_value(&self) -> FieldValue {
        let mut map = FieldMap::new();
        map.insert("kind".to_string(), FieldValue::from(self.kind.as_str()));
        map.insert(
            "message".to_string(),
            FieldValue::from(self.message.as_str()),
        );
        let frames: Vec<FieldValue> = self
            .frames
            .iter()
            .map(|frame| {
                let mut entry = FieldMap::new();
                entry.insert(
                    "function".to_string(),
                    FieldValue::from(frame.function.as_str()),
                );
                entry.insert("file".to_string(), FieldValue::from(frame.file.as_str()));
                entry.insert("line".to_string(), FieldValue::from(frame.line as u64));
                FieldValue::Map(entry)
            })
            .collect();
        map.insert("frames".to_string(), FieldValue::Seq(frames));
        FieldValue::Map(map)
    }
}

fn short_type_name(name: &str) -> String {
    name.rsplit("::").next().unwrap_or(name).to_string()
}

static FRAME_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\s*\d+:\s+(.+?)\s*$").unwrap());
static LOCATION_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s+at\s+(.+?):(\d+)(?::\d+)?\s*$").unwrap());

/// Parse the display output of a captured backtrace into frames, dropping
/// runtime and internal plumbing. Output is outermost first.
fn frames_from_backtrace(backtrace: &Backtrace) -> Vec<Frame> {
    if backtrace.status() != BacktraceStatus::Captured {
        return Vec::new();
    }

    let rendered = backtrace.to_string();
    let mut frames = Vec::new();
    let mut pending: Option<String> = None;

    for line in rendered.lines() {
        if let Some(caps) = FRAME_RE.captures(line) {
            pending = Some(caps[1].to_string());
        } else if let Some(caps) = LOCATION_RE.captures(line) {
            if let Some(function) = pending.take() {
                if is_internal_frame(&function) {
                    continue;
                }
                let line_no = caps[2].parse().unwrap_or(0);
                frames.push(Frame {
                    function,
                    file: caps[1].to_string(),
                    line: line_no,
                });
            }
        }
    }

    // The raw backtrace is most-recent first; event frames read oldest first.
    frames.reverse();
    frames
}

fn is_internal_frame(function: &str) -> bool {
    function.starts_with("std::")
        || function.starts_with("core::")
        || function.starts_with("backtrace::")
        || function.starts_with("__rust")
        || function.contains("structlog::exception")
}
