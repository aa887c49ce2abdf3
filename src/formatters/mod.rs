use crate::error::{ConfigError, PipelineError};
use crate::event::EventRecord;

/// Trait for turning a final event record into one output line.
///
/// Renderers are deterministic for identical input records; all variation
/// (colors, padding, frame limits) is fixed at construction time.
pub trait Renderer: Send + Sync {
    fn render(&self, event: &EventRecord) -> Result<String, PipelineError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable console text, optionally colorized
    Console,
    /// One compact JSON object per line
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "console" => Ok(OutputFormat::Console),
            "json" => Ok(OutputFormat::Json),
            _ => Err(ConfigError::UnknownFormat(s.to_string())),
        }
    }
}

pub mod console;
pub mod json;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_format_parsing() {
        assert_eq!("console".parse::<OutputFormat>().unwrap(), OutputFormat::Console);
        assert_eq!("JSON".parse::<OutputFormat>().unwrap(), OutputFormat::Json);
        assert!(matches!(
            "yaml".parse::<OutputFormat>(),
            Err(ConfigError::UnknownFormat(_))
        ));
    }
}
