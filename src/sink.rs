//! Output sinks: a renderer plus a writable destination.
//!
//! Each sink carries its own formatter chain (the per-format tail of the
//! pipeline) so that a file sink can use a different format than the console.
//! A write is a single atomic operation from the core's point of view: render,
//! one write of the line plus newline, flush. Failures propagate to the log
//! call site; there is no retry or buffering fallback.

use crate::error::PipelineError;
use crate::event::EventRecord;
use crate::formatters::Renderer;
use crate::pipeline::Pipeline;
use log::LevelFilter;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::Path;
use std::sync::Mutex;

enum SinkTarget {
    Stdout,
    File(Mutex<File>),
}

pub struct Sink {
    tail: Pipeline,
    renderer: Box<dyn Renderer>,
    level: LevelFilter,
    target: SinkTarget,
}

impl Sink {
    pub fn console(tail: Pipeline, renderer: Box<dyn Renderer>, level: LevelFilter) -> Self {
        Sink {
            tail,
            renderer,
            level,
            target: SinkTarget::Stdout,
        }
    }

    /// File sink in append mode; missing parent directories are created.
    pub fn file(
        path: &Path,
        tail: Pipeline,
        renderer: Box<dyn Renderer>,
        level: LevelFilter,
    ) -> Result<Self, std::io::Error> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Sink {
            tail,
            renderer,
            level,
            target: SinkTarget::File(Mutex::new(file)),
        })
    }

    pub fn level(&self) -> LevelFilter {
        self.level
    }

    /// Run the sink's formatter chain, render, and write one line.
    pub fn write(&self, event: EventRecord) -> Result<(), PipelineError> {
        let formatted = self.tail.run(event)?;
        let mut line = self.renderer.render(&formatted)?;
        line.push('\n');

        match &self.target {
            SinkTarget::Stdout => {
                let mut out = std::io::stdout().lock();
                out.write_all(line.as_bytes())?;
                out.flush()?;
            }
            SinkTarget::File(file) => {
                let mut file = file.lock().unwrap_or_else(|e| e.into_inner());
                file.write_all(line.as_bytes())?;
                file.flush()?;
            }
        }
        Ok(())
    }
}
