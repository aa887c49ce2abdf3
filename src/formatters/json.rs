use crate::error::PipelineError;
use crate::event::EventRecord;
use crate::formatters::Renderer;

/// Renders the full event record as one compact JSON object.
///
/// Key order is insertion order, not sorted: the record's field order is the
/// output order. Opaque values that escaped `ObjectToDictTransformer` fall
/// back to their debug string instead of failing serialization.
pub struct JsonRenderer;

impl Renderer for JsonRenderer {
    fn render(&self, event: &EventRecord) -> Result<String, PipelineError> {
        serde_json::to_string(&event.to_json_lossy())
            .map_err(|e| PipelineError::RenderError(format!("JSON encoding error: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_single_line_insertion_order() {
        let mut event = EventRecord::new();
        event.insert("message", "hello");
        event.insert("level", "info");
        event.insert("n", 1i64);

        let line = JsonRenderer.render(&event).unwrap();
        assert!(!line.contains('\n'));
        assert_eq!(line, r#"{"message":"hello","level":"info","n":1}"#);
    }

    #[test]
    fn test_round_trip_for_primitive_records() {
        let mut event = EventRecord::new();
        event.insert("message", "hello");
        event.insert("count", 42i64);
        event.insert("ok", true);

        let line = JsonRenderer.render(&event).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&line).unwrap();
        assert_eq!(parsed, json!({"message": "hello", "count": 42, "ok": true}));
    }
}
