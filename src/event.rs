// src/event.rs
use indexmap::IndexMap;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

/// Ordered field-name → value mapping (insertion order is observable in JSON output).
pub type FieldMap = IndexMap<String, FieldValue>;

/// Canonical message key after `EventRenamer` has run.
pub const MESSAGE_KEY: &str = "message";
/// Message key as produced by the event builder, before renaming.
pub const EVENT_KEY: &str = "event";
pub const LEVEL_KEY: &str = "level";
pub const LOGGER_KEY: &str = "logger";
pub const TIMESTAMP_KEY: &str = "timestamp";
pub const EXCEPTION_KEY: &str = "exception";
pub const LOCATION_KEY: &str = "location";

/// Marker set on events built through the structured call path.
pub const FROM_STRUCTLOG_KEY: &str = "_from_structlog";
/// Nested raw-record map attached to events entering through the `log` facade.
pub const RECORD_KEY: &str = "_record";
/// Nested map of caller-supplied fields on the structured call path.
pub const EXTRA_KEY: &str = "extra";

/// Call-site fields stamped when source-location capture is enabled.
pub const PATHNAME_KEY: &str = "pathname";
pub const LINENO_KEY: &str = "lineno";
pub const FUNC_NAME_KEY: &str = "func_name";

/// A rich domain value logged directly by application code.
///
/// `ObjectToDictTransformer` probes the capabilities in order: defined-schema
/// description first, then mapping-like entries, then the plain named-field
/// list. All default to `None`; a value answering none of the probes passes
/// through unchanged and renderers fall back to its `Debug` representation.
pub trait Loggable: fmt::Debug + Send + Sync {
    /// Defined-field description for model-like objects.
    fn schema(&self) -> Option<FieldMap> {
        None
    }

    /// Key/value entries for mapping-like objects.
    fn entries(&self) -> Option<Vec<(String, FieldValue)>> {
        None
    }

    /// Named fields of a plain aggregate.
    fn field_list(&self) -> Option<Vec<(&'static str, FieldValue)>> {
        None
    }
}

/// A single field value flowing through the pipeline.
#[derive(Clone)]
pub enum FieldValue {
    /// Primitive or already-plain JSON data.
    Json(Value),
    /// Ordered sequence of values.
    Seq(Vec<FieldValue>),
    /// Nested ordered mapping.
    Map(FieldMap),
    /// Opaque object awaiting conversion by `ObjectToDictTransformer`.
    Object(Arc<dyn Loggable>),
}

impl fmt::Debug for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Json(v) => write!(f, "{}", v),
            FieldValue::Seq(items) => f.debug_list().entries(items).finish(),
            FieldValue::Map(map) => f.debug_map().entries(map.iter()).finish(),
            FieldValue::Object(obj) => write!(f, "{:?}", obj),
        }
    }
}

impl PartialEq for FieldValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (FieldValue::Json(a), FieldValue::Json(b)) => a == b,
            (FieldValue::Seq(a), FieldValue::Seq(b)) => a == b,
            (FieldValue::Map(a), FieldValue::Map(b)) => a == b,
            // Opaque objects compare by their debug representation.
            (FieldValue::Object(a), FieldValue::Object(b)) => {
                format!("{:?}", a) == format!("{:?}", b)
            }
            _ => false,
        }
    }
}

impl FieldValue {
    /// String slice if this holds a JSON string.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            FieldValue::Json(Value::String(s)) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            FieldValue::Json(Value::Bool(b)) => Some(*b),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&FieldMap> {
        match self {
            FieldValue::Map(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_map_mut(&mut self) -> Option<&mut FieldMap> {
        match self {
            FieldValue::Map(m) => Some(m),
            _ => None,
        }
    }

    pub fn is_object(&self) -> bool {
        matches!(self, FieldValue::Object(_))
    }

    /// Human-readable rendition for console output: bare strings stay
    /// unquoted, everything else serializes compactly.
    pub fn display(&self) -> String {
        match self {
            FieldValue::Json(Value::String(s)) => s.clone(),
            FieldValue::Json(v) => v.to_string(),
            FieldValue::Object(obj) => format!("{:?}", obj),
            other => serde_json::to_string(&other.to_json_lossy())
                .unwrap_or_else(|_| "null".to_string()),
        }
    }

    /// Convert to plain JSON. Opaque objects that escaped conversion fall
    /// back to their debug string rather than failing serialization.
    pub fn to_json_lossy(&self) -> Value {
        match self {
            FieldValue::Json(v) => v.clone(),
            FieldValue::Seq(items) => {
                Value::Array(items.iter().map(FieldValue::to_json_lossy).collect())
            }
            FieldValue::Map(map) => Value::Object(
                map.iter()
                    .map(|(k, v)| (k.clone(), v.to_json_lossy()))
                    .collect(),
            ),
            FieldValue::Object(obj) => Value::String(format!("{:?}", obj)),
        }
    }
}

impl From<Value> for FieldValue {
    fn from(v: Value) -> Self {
        FieldValue::Json(v)
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        FieldValue::Json(Value::String(s.to_string()))
    }
}

impl From<String> for FieldValue {
    fn from(s: String) -> Self {
        FieldValue::Json(Value::String(s))
    }
}

impl From<bool> for FieldValue {
    fn from(b: bool) -> Self {
        FieldValue::Json(Value::Bool(b))
    }
}

impl From<i32> for FieldValue {
    fn from(n: i32) -> Self {
        FieldValue::Json(Value::from(n))
    }
}

impl From<i64> for FieldValue {
    fn from(n: i64) -> Self {
        FieldValue::Json(Value::from(n))
    }
}

impl From<u32> for FieldValue {
    fn from(n: u32) -> Self {
        FieldValue::Json(Value::from(n))
    }
}

impl From<u64> for FieldValue {
    fn from(n: u64) -> Self {
        FieldValue::Json(Value::from(n))
    }
}

impl From<f64> for FieldValue {
    fn from(n: f64) -> Self {
        FieldValue::Json(Value::from(n))
    }
}

impl From<FieldMap> for FieldValue {
    fn from(m: FieldMap) -> Self {
        FieldValue::Map(m)
    }
}

impl From<Vec<FieldValue>> for FieldValue {
    fn from(items: Vec<FieldValue>) -> Self {
        FieldValue::Seq(items)
    }
}

impl From<Arc<dyn Loggable>> for FieldValue {
    fn from(obj: Arc<dyn Loggable>) -> Self {
        FieldValue::Object(obj)
    }
}

/// The per-call event record that flows through the pipeline.
///
/// A value type: each processor consumes the current state and returns the
/// next one. Keys are unique; inserting an existing key overwrites its value
/// in place (last write wins) without changing its position.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EventRecord {
    fields: FieldMap,
}

impl EventRecord {
    pub fn new() -> Self {
        EventRecord {
            fields: FieldMap::new(),
        }
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<FieldValue>) {
        self.fields.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&FieldValue> {
        self.fields.get(key)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut FieldValue> {
        self.fields.get_mut(key)
    }

    /// Remove a field, preserving the order of the remaining ones.
    pub fn remove(&mut self, key: &str) -> Option<FieldValue> {
        self.fields.shift_remove(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.fields.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn iter(&self) -> indexmap::map::Iter<'_, String, FieldValue> {
        self.fields.iter()
    }

    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.fields.keys()
    }

    pub fn fields(&self) -> &FieldMap {
        &self.fields
    }

    pub fn into_fields(self) -> FieldMap {
        self.fields
    }

    /// Whole-record JSON view, insertion order preserved.
    pub fn to_json_lossy(&self) -> Value {
        Value::Object(
            self.fields
                .iter()
                .map(|(k, v)| (k.clone(), v.to_json_lossy()))
                .collect(),
        )
    }
}

impl From<FieldMap> for EventRecord {
    fn from(fields: FieldMap) -> Self {
        EventRecord { fields }
    }
}

impl FromIterator<(String, FieldValue)> for EventRecord {
    fn from_iter<I: IntoIterator<Item = (String, FieldValue)>>(iter: I) -> Self {
        EventRecord {
            fields: iter.into_iter().collect(),
        }
    }
}
