// src/pipeline/processors.rs
//! Field processors: independent, composable record transformations.
//!
//! Every processor passes unmentioned fields through unchanged and treats a
//! missing optional field as a no-op, so chains compose safely regardless of
//! which fields are present.

use crate::context;
use crate::error::{ConfigError, PipelineError};
use crate::event::{
    EventRecord, FieldMap, FieldValue, EVENT_KEY, EXCEPTION_KEY, EXTRA_KEY, FROM_STRUCTLOG_KEY,
    FUNC_NAME_KEY, LINENO_KEY, LOCATION_KEY, MESSAGE_KEY, PATHNAME_KEY, RECORD_KEY, TIMESTAMP_KEY,
};
use crate::pipeline::Processor;
use chrono::Utc;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;

/// Fixed attributes of a record entering through the `log` facade. Anything
/// else on the nested `_record` map is caller-supplied "extra" data.
pub const STANDARD_RECORD_KEYS: &[&str] =
    &["message", "level", "target", "module_path", "file", "line"];

/// Removes each named field if present; absent fields are a no-op.
pub struct FieldDropper {
    fields: HashSet<String>,
}

impl FieldDropper {
    pub fn new<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        FieldDropper {
            fields: fields.into_iter().map(Into::into).collect(),
        }
    }
}

impl Processor for FieldDropper {
    fn name(&self) -> &str {
        "field_dropper"
    }

    fn process(&self, mut event: EventRecord) -> Result<EventRecord, PipelineError> {
        for field in &self.fields {
            event.remove(field);
        }
        Ok(event)
    }
}

/// Moves a field's value to a new name, overwriting any existing target.
/// Disabled or source-less records pass through unchanged.
pub struct FieldRenamer {
    enable: bool,
    name_from: String,
    name_to: String,
}

impl FieldRenamer {
    pub fn new(enable: bool, name_from: impl Into<String>, name_to: impl Into<String>) -> Self {
        FieldRenamer {
            enable,
            name_from: name_from.into(),
            name_to: name_to.into(),
        }
    }
}

impl Processor for FieldRenamer {
    fn name(&self) -> &str {
        "field_renamer"
    }

    fn process(&self, mut event: EventRecord) -> Result<EventRecord, PipelineError> {
        if !self.enable {
            return Ok(event);
        }
        if let Some(value) = event.remove(&self.name_from) {
            event.insert(self.name_to.clone(), value);
        }
        Ok(event)
    }
}

/// Merges a fixed set of static key/value pairs into the record, overwriting
/// same-named keys. Intended for constant metadata (service name, environment).
pub struct FieldsAdder {
    data: FieldMap,
}

impl FieldsAdder {
    pub fn new(data: FieldMap) -> Self {
        FieldsAdder { data }
    }
}

impl Processor for FieldsAdder {
    fn name(&self) -> &str {
        "fields_adder"
    }

    fn process(&self, mut event: EventRecord) -> Result<EventRecord, PipelineError> {
        for (key, value) in &self.data {
            event.insert(key.clone(), value.clone());
        }
        Ok(event)
    }
}

/// Replaces a field's value with the output of a caller-supplied transform.
/// The transform must be total over the field's expected value domain.
pub struct FieldTransformer {
    enable: bool,
    field_name: String,
    transform: Box<dyn Fn(FieldValue) -> FieldValue + Send + Sync>,
}

impl FieldTransformer {
    pub fn new<F>(enable: bool, field_name: impl Into<String>, transform: F) -> Self
    where
        F: Fn(FieldValue) -> FieldValue + Send + Sync + 'static,
    {
        FieldTransformer {
            enable,
            field_name: field_name.into(),
            transform: Box::new(transform),
        }
    }
}

impl Processor for FieldTransformer {
    fn name(&self) -> &str {
        "field_transformer"
    }

    fn process(&self, mut event: EventRecord) -> Result<EventRecord, PipelineError> {
        if !self.enable {
            return Ok(event);
        }
        if let Some(value) = event.remove(&self.field_name) {
            event.insert(self.field_name.clone(), (self.transform)(value));
        }
        Ok(event)
    }
}

/// Converts opaque objects to plain mappings by probing their capabilities:
/// defined-schema description, mapping-like entries, then plain named fields.
/// Values answering none of the probes pass through unchanged.
pub struct ObjectToDictTransformer;

impl ObjectToDictTransformer {
    pub fn new() -> Self {
        ObjectToDictTransformer
    }

    fn convert(value: FieldValue) -> FieldValue {
        match value {
            FieldValue::Object(obj) => {
                if let Some(schema) = obj.schema() {
                    FieldValue::Map(Self::convert_map(schema))
                } else if let Some(entries) = obj.entries() {
                    FieldValue::Map(
                        entries
                            .into_iter()
                            .map(|(k, v)| (k, Self::convert(v)))
                            .collect(),
                    )
                } else if let Some(fields) = obj.field_list() {
                    FieldValue::Map(
                        fields
                            .into_iter()
                            .map(|(k, v)| (k.to_string(), Self::convert(v)))
                            .collect(),
                    )
                } else {
                    FieldValue::Object(obj)
                }
            }
            FieldValue::Map(map) => FieldValue::Map(Self::convert_map(map)),
            FieldValue::Seq(items) => {
                FieldValue::Seq(items.into_iter().map(Self::convert).collect())
            }
            primitive => primitive,
        }
    }

    fn convert_map(map: FieldMap) -> FieldMap {
        map.into_iter()
            .map(|(k, v)| (k, Self::convert(v)))
            .collect()
    }
}

impl Default for ObjectToDictTransformer {
    fn default() -> Self {
        Self::new()
    }
}

impl Processor for ObjectToDictTransformer {
    fn name(&self) -> &str {
        "object_to_dict"
    }

    fn process(&self, event: EventRecord) -> Result<EventRecord, PipelineError> {
        Ok(event
            .into_fields()
            .into_iter()
            .map(|(k, v)| (k, Self::convert(v)))
            .collect())
    }
}

/// Flattens caller-supplied extra fields to the top level.
///
/// Events from the structured call path carry the `_from_structlog` marker
/// and a nested `extra` map, which is popped and merged. Events from the
/// `log` facade carry a nested `_record` map instead; only its non-standard
/// attributes are merged, and the map itself is left for `RemoveInternalMeta`.
pub struct FlattenExtra;

impl Processor for FlattenExtra {
    fn name(&self) -> &str {
        "add_flattened_extra"
    }

    fn process(&self, mut event: EventRecord) -> Result<EventRecord, PipelineError> {
        let from_builder = event
            .get(FROM_STRUCTLOG_KEY)
            .and_then(FieldValue::as_bool)
            .unwrap_or(false);

        if from_builder {
            // Pop only a well-formed map; a malformed `extra` stays visible
            // in the output instead of vanishing.
            if matches!(event.get(EXTRA_KEY), Some(FieldValue::Map(_))) {
                if let Some(FieldValue::Map(extra)) = event.remove(EXTRA_KEY) {
                    for (key, value) in extra {
                        event.insert(key, value);
                    }
                }
            }
        } else if let Some(FieldValue::Map(record)) = event.get(RECORD_KEY).cloned() {
            for (key, value) in record {
                if !STANDARD_RECORD_KEYS.contains(&key.as_str()) {
                    event.insert(key, value);
                }
            }
        }
        Ok(event)
    }
}

static MICRO_TS_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\d{4}-\d{2}-\d{2}T\d{2}:\d{2}:\d{2}\.\d{3})\d+Z$").unwrap()
});

/// Truncates an ISO-8601 timestamp's fractional seconds to millisecond
/// precision (truncation, not rounding). Non-matching or absent timestamps
/// pass through unchanged.
pub struct CapTimestampToMillis;

impl Processor for CapTimestampToMillis {
    fn name(&self) -> &str {
        "cap_timestamp_to_ms_precision"
    }

    fn process(&self, mut event: EventRecord) -> Result<EventRecord, PipelineError> {
        if let Some(current) = event.get(TIMESTAMP_KEY).and_then(FieldValue::as_str) {
            if let Some(caps) = MICRO_TS_RE.captures(current) {
                let capped = format!("{}Z", &caps[1]);
                event.insert(TIMESTAMP_KEY, capped);
            }
        }
        Ok(event)
    }
}

/// Limits the number of frames kept in structured exception tracebacks,
/// keeping the most recent ones.
pub struct CapExceptionFrames {
    max_frames: usize,
}

impl CapExceptionFrames {
    /// `max_frames` must be positive; zero is a configuration error raised at
    /// setup time, not at call time.
    pub fn new(max_frames: usize) -> Result<Self, ConfigError> {
        if max_frames == 0 {
            return Err(ConfigError::NonPositiveMaxFrames);
        }
        Ok(CapExceptionFrames { max_frames })
    }
}

impl Processor for CapExceptionFrames {
    fn name(&self) -> &str {
        "cap_exception_frames"
    }

    fn process(&self, mut event: EventRecord) -> Result<EventRecord, PipelineError> {
        if let Some(exception) = event.get_mut(EXCEPTION_KEY).and_then(FieldValue::as_map_mut) {
            if let Some(FieldValue::Seq(frames)) = exception.get_mut("frames") {
                if frames.len() > self.max_frames {
                    let excess = frames.len() - self.max_frames;
                    frames.drain(..excess);
                }
            }
        }
        Ok(event)
    }
}

/// Collapses the three call-site fields into a single `location` field
/// formatted as `path:line(function)`. No-op when none are present.
pub struct MergeCallsiteLocation;

impl Processor for MergeCallsiteLocation {
    fn name(&self) -> &str {
        "merge_pathname_lineno_function_to_location"
    }

    fn process(&self, mut event: EventRecord) -> Result<EventRecord, PipelineError> {
        if !event.contains_key(PATHNAME_KEY)
            && !event.contains_key(LINENO_KEY)
            && !event.contains_key(FUNC_NAME_KEY)
        {
            return Ok(event);
        }

        let part = |value: Option<FieldValue>| {
            value.map_or_else(|| "?".to_string(), |v| v.display())
        };
        let pathname = part(event.remove(PATHNAME_KEY));
        let lineno = part(event.remove(LINENO_KEY));
        let func_name = part(event.remove(FUNC_NAME_KEY));

        event.insert(
            LOCATION_KEY,
            format!("{}:{}({})", pathname, lineno, func_name),
        );
        Ok(event)
    }
}

/// Stamps `timestamp` with the current ISO-8601 UTC time at microsecond
/// precision (trailing `Z`). `CapTimestampToMillis` downstream reduces this
/// to milliseconds when configured.
pub struct AddTimestamp;

impl Processor for AddTimestamp {
    fn name(&self) -> &str {
        "add_timestamp"
    }

    fn process(&self, mut event: EventRecord) -> Result<EventRecord, PipelineError> {
        let stamp = Utc::now().format("%Y-%m-%dT%H:%M:%S%.6fZ").to_string();
        event.insert(TIMESTAMP_KEY, stamp);
        Ok(event)
    }
}

/// Merges thread-bound context fields into the record. Fields already on the
/// event win over bound ones.
pub struct MergeContextFields;

impl Processor for MergeContextFields {
    fn name(&self) -> &str {
        "merge_context_fields"
    }

    fn process(&self, mut event: EventRecord) -> Result<EventRecord, PipelineError> {
        for (key, value) in context::bound_fields() {
            if !event.contains_key(&key) {
                event.insert(key, value);
            }
        }
        Ok(event)
    }
}

/// Drops the internal bookkeeping fields before rendering.
pub struct RemoveInternalMeta;

impl Processor for RemoveInternalMeta {
    fn name(&self) -> &str {
        "remove_internal_meta"
    }

    fn process(&self, mut event: EventRecord) -> Result<EventRecord, PipelineError> {
        event.remove(FROM_STRUCTLOG_KEY);
        event.remove(RECORD_KEY);
        Ok(event)
    }
}

/// Canonicalizes the message key: moves `event` to the configured name
/// (overwriting it) so that exactly one message key exists by render time.
pub struct EventRenamer {
    to: String,
}

impl EventRenamer {
    pub fn new(to: impl Into<String>) -> Self {
        EventRenamer { to: to.into() }
    }
}

impl Default for EventRenamer {
    fn default() -> Self {
        EventRenamer::new(MESSAGE_KEY)
    }
}

impl Processor for EventRenamer {
    fn name(&self) -> &str {
        "event_renamer"
    }

    fn process(&self, mut event: EventRecord) -> Result<EventRecord, PipelineError> {
        if let Some(value) = event.remove(EVENT_KEY) {
            event.insert(self.to.clone(), value);
        }
        Ok(event)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::Loggable;
    use serde_json::json;
    use std::sync::Arc;

    fn record(pairs: &[(&str, FieldValue)]) -> EventRecord {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn test_field_dropper_removes_only_named_fields() {
        let dropper = FieldDropper::new(["password", "secret"]);
        let event = record(&[
            ("event", "user login".into()),
            ("user", "alice".into()),
            ("password", "mypassword".into()),
            ("secret", "topsecret".into()),
        ]);

        let result = dropper.process(event).unwrap();

        assert_eq!(
            result,
            record(&[("event", "user login".into()), ("user", "alice".into())])
        );
    }

    #[test]
    fn test_field_dropper_missing_fields_noop() {
        let dropper = FieldDropper::new(["absent"]);
        let event = record(&[("event", "x".into())]);
        assert_eq!(dropper.process(event.clone()).unwrap(), event);
    }

    #[test]
    fn test_field_renamer_disabled_is_identity() {
        let renamer = FieldRenamer::new(false, "old_name", "new_name");
        let event = record(&[("old_name", "value1".into())]);
        assert_eq!(renamer.process(event.clone()).unwrap(), event);
    }

    #[test]
    fn test_field_renamer_moves_and_overwrites() {
        let renamer = FieldRenamer::new(true, "old_name", "new_name");
        let event = record(&[
            ("event", "data update".into()),
            ("old_name", "value1".into()),
            ("new_name", "stale".into()),
        ]);

        let result = renamer.process(event).unwrap();

        assert!(!result.contains_key("old_name"));
        assert_eq!(result.get("new_name").unwrap().as_str(), Some("value1"));
    }

    #[test]
    fn test_field_renamer_missing_source_is_identity() {
        let renamer = FieldRenamer::new(true, "old_name", "new_name");
        let event = record(&[("event", "x".into())]);
        assert_eq!(renamer.process(event.clone()).unwrap(), event);
    }

    #[test]
    fn test_fields_adder_idempotent_and_overwrites() {
        let mut data = FieldMap::new();
        data.insert("service".to_string(), "my-service".into());
        data.insert("env".to_string(), "production".into());
        let adder = FieldsAdder::new(data);

        let event = record(&[("event", "startup".into()), ("env", "dev".into())]);
        let once = adder.process(event).unwrap();
        let twice = adder.process(once.clone()).unwrap();

        assert_eq!(once, twice);
        assert_eq!(once.get("env").unwrap().as_str(), Some("production"));
        assert_eq!(once.get("service").unwrap().as_str(), Some("my-service"));
    }

    #[test]
    fn test_field_transformer_replaces_value() {
        let transformer = FieldTransformer::new(true, "level", |value| {
            FieldValue::from(value.display().to_uppercase())
        });
        let event = record(&[("event", "system alert".into()), ("level", "warning".into())]);

        let result = transformer.process(event).unwrap();
        assert_eq!(result.get("level").unwrap().as_str(), Some("WARNING"));
    }

    #[test]
    fn test_field_transformer_absent_field_noop() {
        let transformer = FieldTransformer::new(true, "level", |v| v);
        let event = record(&[("event", "x".into())]);
        assert_eq!(transformer.process(event.clone()).unwrap(), event);
    }

    #[derive(Debug)]
    struct User {
        id: i64,
        name: &'static str,
    }

    impl Loggable for User {
        fn field_list(&self) -> Option<Vec<(&'static str, FieldValue)>> {
            Some(vec![("id", self.id.into()), ("name", self.name.into())])
        }
    }

    #[test]
    fn test_object_to_dict_named_aggregate() {
        let transformer = ObjectToDictTransformer::new();
        let event = record(&[
            ("event", "user data".into()),
            (
                "obj",
                FieldValue::Object(Arc::new(User {
                    id: 123,
                    name: "alice",
                })),
            ),
        ]);

        let result = transformer.process(event).unwrap();
        assert_eq!(
            result.get("obj").unwrap().to_json_lossy(),
            json!({"id": 123, "name": "alice"})
        );
    }

    #[test]
    fn test_object_to_dict_schema_probe_wins() {
        #[derive(Debug)]
        struct Model;
        impl Loggable for Model {
            fn schema(&self) -> Option<FieldMap> {
                let mut map = FieldMap::new();
                map.insert("id".to_string(), 1i64.into());
                Some(map)
            }
            fn field_list(&self) -> Option<Vec<(&'static str, FieldValue)>> {
                Some(vec![("wrong", "probe".into())])
            }
        }

        let transformer = ObjectToDictTransformer::new();
        let event = record(&[("obj", FieldValue::Object(Arc::new(Model)))]);
        let result = transformer.process(event).unwrap();
        assert_eq!(result.get("obj").unwrap().to_json_lossy(), json!({"id": 1}));
    }

    #[test]
    fn test_object_to_dict_mapping_like() {
        #[derive(Debug)]
        struct Headers;
        impl Loggable for Headers {
            fn entries(&self) -> Option<Vec<(String, FieldValue)>> {
                Some(vec![
                    ("content-type".to_string(), "text/plain".into()),
                    ("retries".to_string(), 2i64.into()),
                ])
            }
        }

        let transformer = ObjectToDictTransformer::new();
        let event = record(&[("obj", FieldValue::Object(Arc::new(Headers)))]);
        let result = transformer.process(event).unwrap();
        assert_eq!(
            result.get("obj").unwrap().to_json_lossy(),
            json!({"content-type": "text/plain", "retries": 2})
        );
    }

    #[test]
    fn test_object_to_dict_entries_probe_order() {
        // entries() loses to schema() but beats field_list().
        #[derive(Debug)]
        struct SchemaAndEntries;
        impl Loggable for SchemaAndEntries {
            fn schema(&self) -> Option<FieldMap> {
                let mut map = FieldMap::new();
                map.insert("via".to_string(), "schema".into());
                Some(map)
            }
            fn entries(&self) -> Option<Vec<(String, FieldValue)>> {
                Some(vec![("via".to_string(), "entries".into())])
            }
        }

        #[derive(Debug)]
        struct EntriesAndFields;
        impl Loggable for EntriesAndFields {
            fn entries(&self) -> Option<Vec<(String, FieldValue)>> {
                Some(vec![("via".to_string(), "entries".into())])
            }
            fn field_list(&self) -> Option<Vec<(&'static str, FieldValue)>> {
                Some(vec![("via", "field_list".into())])
            }
        }

        let transformer = ObjectToDictTransformer::new();

        let event = record(&[("obj", FieldValue::Object(Arc::new(SchemaAndEntries)))]);
        let result = transformer.process(event).unwrap();
        assert_eq!(
            result.get("obj").unwrap().to_json_lossy(),
            json!({"via": "schema"})
        );

        let event = record(&[("obj", FieldValue::Object(Arc::new(EntriesAndFields)))]);
        let result = transformer.process(event).unwrap();
        assert_eq!(
            result.get("obj").unwrap().to_json_lossy(),
            json!({"via": "entries"})
        );
    }

    #[test]
    fn test_object_to_dict_primitives_identity() {
        let transformer = ObjectToDictTransformer::new();
        let event = record(&[("event", "x".into()), ("n", 1i64.into())]);
        assert_eq!(transformer.process(event.clone()).unwrap(), event);
    }

    #[test]
    fn test_object_to_dict_unrecognized_passes_through() {
        #[derive(Debug)]
        struct Opaque;
        impl Loggable for Opaque {}

        let transformer = ObjectToDictTransformer::new();
        let event = record(&[("obj", FieldValue::Object(Arc::new(Opaque)))]);
        let result = transformer.process(event).unwrap();
        assert!(result.get("obj").unwrap().is_object());
    }

    #[test]
    fn test_flatten_extra_structured_path() {
        let mut extra = FieldMap::new();
        extra.insert("user_id".to_string(), 123i64.into());
        extra.insert("session_id".to_string(), "abc".into());

        let event = record(&[
            (FROM_STRUCTLOG_KEY, true.into()),
            ("event", "test event".into()),
            (EXTRA_KEY, FieldValue::Map(extra)),
        ]);

        let result = FlattenExtra.process(event).unwrap();

        assert!(!result.contains_key(EXTRA_KEY));
        assert_eq!(result.get("user_id").unwrap().to_json_lossy(), json!(123));
        assert_eq!(result.get("session_id").unwrap().as_str(), Some("abc"));
        // The marker itself stays for RemoveInternalMeta.
        assert_eq!(result.get(FROM_STRUCTLOG_KEY).unwrap().as_bool(), Some(true));
    }

    #[test]
    fn test_flatten_extra_malformed_extra_survives() {
        let event = record(&[
            (FROM_STRUCTLOG_KEY, true.into()),
            ("event", "test event".into()),
            (EXTRA_KEY, "not a map".into()),
        ]);

        let result = FlattenExtra.process(event.clone()).unwrap();
        assert_eq!(result, event);
    }

    #[test]
    fn test_flatten_extra_log_facade_path() {
        let mut raw = FieldMap::new();
        raw.insert("message".to_string(), "test log".into());
        raw.insert("level".to_string(), "info".into());
        raw.insert("user_id".to_string(), 456i64.into());
        raw.insert("session_id".to_string(), "def".into());

        let event = record(&[(RECORD_KEY, FieldValue::Map(raw))]);
        let result = FlattenExtra.process(event).unwrap();

        assert_eq!(result.get("user_id").unwrap().to_json_lossy(), json!(456));
        assert_eq!(result.get("session_id").unwrap().as_str(), Some("def"));
        // Standard attributes are not merged to the top level.
        assert!(!result.contains_key("message"));
        assert!(!result.contains_key("level"));
        assert!(result.contains_key(RECORD_KEY));
    }

    #[test]
    fn test_cap_timestamp_truncates_not_rounds() {
        let event = record(&[
            ("event", "test event".into()),
            (TIMESTAMP_KEY, "2024-06-01T12:34:56.789123Z".into()),
        ]);

        let result = CapTimestampToMillis.process(event).unwrap();
        assert_eq!(
            result.get(TIMESTAMP_KEY).unwrap().as_str(),
            Some("2024-06-01T12:34:56.789Z")
        );
    }

    #[test]
    fn test_cap_timestamp_non_iso_passes_through() {
        let event = record(&[(TIMESTAMP_KEY, "yesterday".into())]);
        assert_eq!(CapTimestampToMillis.process(event.clone()).unwrap(), event);

        let absent = record(&[("event", "x".into())]);
        assert_eq!(CapTimestampToMillis.process(absent.clone()).unwrap(), absent);
    }

    #[test]
    fn test_cap_timestamp_millis_already_capped() {
        let event = record(&[(TIMESTAMP_KEY, "2024-06-01T12:34:56.789Z".into())]);
        assert_eq!(CapTimestampToMillis.process(event.clone()).unwrap(), event);
    }

    fn exception_with_frames(count: usize) -> FieldValue {
        let frames: Vec<FieldValue> = (0..count)
            .map(|i| {
                let mut frame = FieldMap::new();
                frame.insert("function".to_string(), format!("f{}", i).into());
                FieldValue::Map(frame)
            })
            .collect();
        let mut exception = FieldMap::new();
        exception.insert("kind".to_string(), "Error".into());
        exception.insert("frames".to_string(), FieldValue::Seq(frames));
        FieldValue::Map(exception)
    }

    #[test]
    fn test_cap_exception_frames_keeps_most_recent() {
        let cap = CapExceptionFrames::new(2).unwrap();
        let event = record(&[(EXCEPTION_KEY, exception_with_frames(5))]);

        let result = cap.process(event).unwrap();
        let exception = result.get(EXCEPTION_KEY).unwrap().as_map().unwrap();
        match exception.get("frames").unwrap() {
            FieldValue::Seq(frames) => {
                assert_eq!(frames.len(), 2);
                // The last two frames survive in original relative order.
                assert_eq!(
                    frames[0].as_map().unwrap().get("function").unwrap().as_str(),
                    Some("f3")
                );
                assert_eq!(
                    frames[1].as_map().unwrap().get("function").unwrap().as_str(),
                    Some("f4")
                );
            }
            other => panic!("expected frames sequence, got {:?}", other),
        }
    }

    #[test]
    fn test_cap_exception_frames_zero_is_config_error() {
        assert!(matches!(
            CapExceptionFrames::new(0),
            Err(ConfigError::NonPositiveMaxFrames)
        ));
    }

    #[test]
    fn test_cap_exception_frames_no_exception_noop() {
        let cap = CapExceptionFrames::new(2).unwrap();
        let event = record(&[("event", "x".into())]);
        assert_eq!(cap.process(event.clone()).unwrap(), event);
    }

    #[test]
    fn test_merge_callsite_location() {
        let event = record(&[
            ("event", "x".into()),
            (PATHNAME_KEY, "src/app.rs".into()),
            (LINENO_KEY, 42i64.into()),
            (FUNC_NAME_KEY, "app".into()),
        ]);

        let result = MergeCallsiteLocation.process(event).unwrap();

        assert!(!result.contains_key(PATHNAME_KEY));
        assert!(!result.contains_key(LINENO_KEY));
        assert!(!result.contains_key(FUNC_NAME_KEY));
        assert_eq!(
            result.get(LOCATION_KEY).unwrap().as_str(),
            Some("src/app.rs:42(app)")
        );
    }

    #[test]
    fn test_merge_callsite_location_absent_noop() {
        let event = record(&[("event", "x".into())]);
        assert_eq!(MergeCallsiteLocation.process(event.clone()).unwrap(), event);
    }

    #[test]
    fn test_add_timestamp_iso_utc() {
        let result = AddTimestamp.process(EventRecord::new()).unwrap();
        let stamp = result.get(TIMESTAMP_KEY).unwrap().as_str().unwrap();
        assert!(stamp.ends_with('Z'));
        // Microsecond precision: 6 fractional digits.
        let fraction = stamp.split('.').nth(1).unwrap();
        assert_eq!(fraction.len(), 7); // 6 digits plus the Z
    }

    #[test]
    fn test_merge_context_fields_event_wins() {
        crate::context::clear_context();
        crate::context::bind_context("request_id", "ctx");
        crate::context::bind_context("tenant", "acme");

        let event = record(&[("request_id", "explicit".into())]);
        let result = MergeContextFields.process(event).unwrap();
        crate::context::clear_context();

        assert_eq!(result.get("request_id").unwrap().as_str(), Some("explicit"));
        assert_eq!(result.get("tenant").unwrap().as_str(), Some("acme"));
    }

    #[test]
    fn test_remove_internal_meta() {
        let event = record(&[
            (FROM_STRUCTLOG_KEY, true.into()),
            (RECORD_KEY, FieldValue::Map(FieldMap::new())),
            ("event", "x".into()),
        ]);

        let result = RemoveInternalMeta.process(event).unwrap();
        assert_eq!(result, record(&[("event", "x".into())]));
    }

    #[test]
    fn test_event_renamer_moves_event_to_message() {
        let renamer = EventRenamer::default();
        let event = record(&[("event", "hello".into()), ("message", "stale".into())]);

        let result = renamer.process(event).unwrap();
        assert!(!result.contains_key("event"));
        assert_eq!(result.get("message").unwrap().as_str(), Some("hello"));
    }
}
