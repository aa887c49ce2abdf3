//! Thread-bound context fields merged into every event on the same thread.
//!
//! `MergeContextFields` consumes this store; explicit event fields always win
//! over bound ones.

use crate::event::{FieldMap, FieldValue};
use std::cell::RefCell;

thread_local! {
    static CONTEXT: RefCell<FieldMap> = RefCell::new(FieldMap::new());
}

/// Bind a field to every subsequent event logged on this thread.
pub fn bind_context(key: impl Into<String>, value: impl Into<FieldValue>) {
    CONTEXT.with(|cell| {
        cell.borrow_mut().insert(key.into(), value.into());
    });
}

/// Remove a previously bound field; absent keys are a no-op.
pub fn unbind_context(key: &str) {
    CONTEXT.with(|cell| {
        cell.borrow_mut().shift_remove(key);
    });
}

/// Drop all bound fields on this thread.
pub fn clear_context() {
    CONTEXT.with(|cell| {
        cell.borrow_mut().clear();
    });
}

/// Snapshot of the currently bound fields.
pub(crate) fn bound_fields() -> FieldMap {
    CONTEXT.with(|cell| cell.borrow().clone())
}

/// Guard that binds a field for the current scope and unbinds it on drop.
pub struct ScopedContext {
    key: String,
}

impl ScopedContext {
    pub fn bind(key: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        let key = key.into();
        bind_context(key.clone(), value);
        ScopedContext { key }
    }
}

impl Drop for ScopedContext {
    fn drop(&mut self) {
        unbind_context(&self.key);
    }
}
