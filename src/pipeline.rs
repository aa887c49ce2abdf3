// src/pipeline.rs
pub mod processors;

use crate::error::PipelineError;
use crate::event::EventRecord;

/// One field-transformation step applied to an in-flight event.
///
/// Processors are pure apart from construction-time configuration: they take
/// the current record and return the next one. Missing optional fields are a
/// no-op by each processor's own contract, never a failure.
pub trait Processor: Send + Sync {
    fn name(&self) -> &str;
    fn process(&self, event: EventRecord) -> Result<EventRecord, PipelineError>;
}

/// Ordered processor chain. Order is declared by the caller and never
/// inferred; the runner applies every processor exactly once in sequence.
#[derive(Default)]
pub struct Pipeline {
    processors: Vec<Box<dyn Processor>>,
}

impl Pipeline {
    pub fn new() -> Self {
        Pipeline {
            processors: Vec::new(),
        }
    }

    pub fn with_processors(processors: Vec<Box<dyn Processor>>) -> Self {
        Pipeline { processors }
    }

    pub fn push(&mut self, processor: Box<dyn Processor>) {
        self.processors.push(processor);
    }

    pub fn extend(&mut self, processors: impl IntoIterator<Item = Box<dyn Processor>>) {
        self.processors.extend(processors);
    }

    pub fn len(&self) -> usize {
        self.processors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.processors.is_empty()
    }

    /// Feed the record through every processor in order. The first error
    /// aborts the run and propagates to the log call site; nothing is
    /// retried or suppressed.
    pub fn run(&self, event: EventRecord) -> Result<EventRecord, PipelineError> {
        let mut current = event;
        for processor in &self.processors {
            current = processor.process(current)?;
        }
        Ok(current)
    }
}
