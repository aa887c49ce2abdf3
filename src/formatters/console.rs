use crate::colors::ColorScheme;
use crate::error::PipelineError;
use crate::event::{
    EventRecord, FieldValue, EVENT_KEY, EXCEPTION_KEY, LEVEL_KEY, LOGGER_KEY, MESSAGE_KEY,
    TIMESTAMP_KEY,
};
use crate::formatters::Renderer;

/// Width of the bracketed level column: the longest level label ("error",
/// "debug", "trace") is five characters.
const LEVEL_WIDTH: usize = 5;

/// Human-readable one-line renderer: timestamp, bracketed level, padded
/// message, bracketed logger name, then remaining fields as sorted
/// `key=value` pairs. Exception data renders as an indented multi-line block
/// after the main line.
///
/// No-color mode produces byte-identical text modulo the escape sequences.
pub struct ConsoleRenderer {
    colors: ColorScheme,
    pad_event: usize,
    max_frames: usize,
}

impl ConsoleRenderer {
    pub fn new(use_colors: bool) -> Self {
        ConsoleRenderer {
            colors: ColorScheme::new(use_colors),
            pad_event: 80,
            max_frames: 100,
        }
    }

    /// Column width the message is padded to (default 80).
    pub fn pad_event(mut self, width: usize) -> Self {
        self.pad_event = width;
        self
    }

    /// Upper bound on rendered traceback frames (default 100).
    pub fn max_frames(mut self, max_frames: usize) -> Self {
        self.max_frames = max_frames;
        self
    }

    fn format_pair(&self, key: &str, value: &FieldValue) -> String {
        let rendered = value.display();
        let quoted = if needs_quoting(&rendered) {
            format!("\"{}\"", rendered.replace('"', "\\\""))
        } else {
            rendered
        };
        format!("{}={}", self.colors.paint(self.colors.key, key), quoted)
    }

    fn format_exception(&self, value: &FieldValue, out: &mut String) {
        let Some(exception) = value.as_map() else {
            out.push('\n');
            out.push_str(&self.colors.paint(self.colors.exception, &value.display()));
            return;
        };

        let kind = exception
            .get("kind")
            .map_or_else(|| "Error".to_string(), FieldValue::display);
        let message = exception
            .get("message")
            .map_or_else(String::new, FieldValue::display);
        out.push('\n');
        out.push_str(
            &self
                .colors
                .paint(self.colors.exception, &format!("{}: {}", kind, message)),
        );

        if let Some(FieldValue::Seq(frames)) = exception.get("frames") {
            let start = frames.len().saturating_sub(self.max_frames);
            for frame in &frames[start..] {
                let Some(entry) = frame.as_map() else {
                    continue;
                };
                let function = entry
                    .get("function")
                    .map_or_else(|| "?".to_string(), FieldValue::display);
                let file = entry
                    .get("file")
                    .map_or_else(|| "?".to_string(), FieldValue::display);
                let line = entry
                    .get("line")
                    .map_or_else(|| "?".to_string(), FieldValue::display);
                out.push_str(&format!("\n    at {}:{} in {}", file, line, function));
            }
        }
    }
}

impl Renderer for ConsoleRenderer {
    fn render(&self, event: &EventRecord) -> Result<String, PipelineError> {
        let mut line = String::new();

        if let Some(timestamp) = event.get(TIMESTAMP_KEY) {
            line.push_str(
                &self
                    .colors
                    .paint(self.colors.timestamp, &timestamp.display()),
            );
            line.push(' ');
        }

        if let Some(level) = event.get(LEVEL_KEY) {
            let label = level.display();
            let padded = format!("{:<width$}", label, width = LEVEL_WIDTH);
            let color = self.colors.level_color(&label);
            line.push('[');
            line.push_str(&self.colors.paint(color, &padded));
            line.push_str("] ");
        }

        // EventRenamer normalizes to `message`; tolerate pipelines that left
        // the builder-side key in place.
        let message = event
            .get(MESSAGE_KEY)
            .or_else(|| event.get(EVENT_KEY))
            .map_or_else(String::new, FieldValue::display);
        let padded = format!("{:<width$}", message, width = self.pad_event);
        line.push_str(&self.colors.paint(self.colors.message, &padded));

        if let Some(logger) = event.get(LOGGER_KEY) {
            line.push_str(" [");
            line.push_str(&self.colors.paint(self.colors.logger, &logger.display()));
            line.push(']');
        }

        // Remaining fields in deterministic key order.
        let mut extras: Vec<(&String, &FieldValue)> = event
            .iter()
            .filter(|(k, _)| {
                !matches!(
                    k.as_str(),
                    TIMESTAMP_KEY | LEVEL_KEY | MESSAGE_KEY | EVENT_KEY | LOGGER_KEY
                        | EXCEPTION_KEY
                )
            })
            .collect();
        extras.sort_by(|a, b| a.0.cmp(b.0));
        for (key, value) in extras {
            line.push(' ');
            line.push_str(&self.format_pair(key, value));
        }

        if let Some(exception) = event.get(EXCEPTION_KEY) {
            self.format_exception(exception, &mut line);
        }

        Ok(line)
    }
}

fn needs_quoting(value: &str) -> bool {
    value.is_empty()
        || value.contains(' ')
        || value.contains('\t')
        || value.contains('\n')
        || value.contains('"')
        || value.contains('=')
}
