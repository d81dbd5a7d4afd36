//! Core identifiers and the dynamically typed value carried through a context.

use serde::{Deserialize, Serialize};
use std::any::Any;
use std::borrow::Cow;
use std::fmt;
use std::sync::Arc;

/// Opaque identifier of the action being dispatched. Used for routing and diagnostics only.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActionId(String);

impl ActionId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ActionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ActionId {
    fn from(value: &str) -> Self {
        ActionId(value.to_string())
    }
}

impl From<String> for ActionId {
    fn from(value: String) -> Self {
        ActionId(value)
    }
}

/// Name of a requested datum. Carries no type; the resolved value is a [`DataValue`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DataKey(Cow<'static, str>);

impl DataKey {
    pub const fn from_static(name: &'static str) -> Self {
        DataKey(Cow::Borrowed(name))
    }

    pub fn name(&self) -> &str {
        &self.0
    }

    /// True when `other` names the same key.
    pub fn is(&self, other: &DataKey) -> bool {
        self == other
    }
}

impl fmt::Display for DataKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for DataKey {
    fn from(value: &str) -> Self {
        DataKey(Cow::Owned(value.to_string()))
    }
}

impl From<String> for DataKey {
    fn from(value: String) -> Self {
        DataKey(Cow::Owned(value))
    }
}

/// Keys the engine itself interprets.
pub mod keys {
    use super::DataKey;

    /// Identifies the client control the action was invoked from; anchors the context.
    pub const CONTROL_ID: DataKey = DataKey::from_static("control.id");
    /// The anchor component itself.
    pub const CONTEXT_COMPONENT: DataKey = DataKey::from_static("context.component");
    pub const EDITOR: DataKey = DataKey::from_static("editor");
    pub const HOST_EDITOR: DataKey = DataKey::from_static("host.editor");
    pub const INJECTED_EDITOR: DataKey = DataKey::from_static("injected.editor");
}

/// Dynamically typed, cheaply cloneable value produced by a resolution.
#[derive(Clone)]
pub struct DataValue {
    inner: Arc<dyn Any + Send + Sync>,
    type_name: &'static str,
}

impl DataValue {
    pub fn new<T: Any + Send + Sync>(value: T) -> Self {
        Self::from_arc(Arc::new(value))
    }

    pub fn from_arc<T: Any + Send + Sync>(value: Arc<T>) -> Self {
        Self {
            inner: value,
            type_name: std::any::type_name::<T>(),
        }
    }

    /// Shorthand for a string value.
    pub fn text(value: impl Into<String>) -> Self {
        Self::new(value.into())
    }

    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.inner.downcast_ref::<T>()
    }

    pub fn downcast_arc<T: Any + Send + Sync>(&self) -> Option<Arc<T>> {
        Arc::clone(&self.inner).downcast::<T>().ok()
    }

    pub fn is<T: Any>(&self) -> bool {
        self.inner.is::<T>()
    }

    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Identity comparison: both values share the same allocation.
    pub fn ptr_eq(&self, other: &DataValue) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    /// Human readable rendering for diagnostics; falls back to the type name.
    pub fn describe(&self) -> String {
        if let Some(s) = self.downcast_ref::<String>() {
            return s.clone();
        }
        if let Some(s) = self.downcast_ref::<&'static str>() {
            return (*s).to_string();
        }
        if let Some(v) = self.downcast_ref::<serde_json::Value>() {
            return v.to_string();
        }
        if let Some(n) = self.downcast_ref::<i64>() {
            return n.to_string();
        }
        if let Some(n) = self.downcast_ref::<i32>() {
            return n.to_string();
        }
        if let Some(b) = self.downcast_ref::<bool>() {
            return b.to_string();
        }
        format!("<{}>", self.type_name)
    }
}

impl fmt::Debug for DataValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("DataValue").field(&self.describe()).finish()
    }
}

/// Id of a text control hosted in a remote editor.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TextControlId(pub String);

impl fmt::Display for TextControlId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Value stored under [`keys::CONTROL_ID`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum ControlId {
    Editor(TextControlId),
    ToolWindow(String),
}
