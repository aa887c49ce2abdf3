/// Errors raised while a log call runs through the pipeline, a renderer, or a
/// sink. These propagate to the call site; the pipeline never suppresses them.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("Processor '{processor}' failed: {source}")]
    ProcessorFailed {
        processor: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("Render error: {0}")]
    RenderError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Errors raised at setup time. A failed setup leaves any previously working
/// configuration untouched.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Unknown logging format requested: '{0}'")]
    UnknownFormat(String),

    #[error("max_frames should be a positive integer")]
    NonPositiveMaxFrames,

    #[error("It is not allowed to configure the logger '{0}', since setup() configures that one")]
    ReservedLoggerName(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}
