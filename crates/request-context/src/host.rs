//! The reflection seam between guards and host-runtime objects.
//!
//! Guards never see concrete host types. They read named properties from a
//! [`HostObject`], the way an agent would call getters reflectively on an
//! object whose class it cannot link against.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;

/// A host-runtime object observed at a join point.
pub trait HostObject: Send + Sync + fmt::Debug {
    /// Fully-qualified runtime type name of the object.
    fn type_name(&self) -> &str;

    /// Read a named property. `None` when the object has no such property or
    /// reading it failed.
    fn property(&self, name: &str) -> Option<Value>;
}

/// Shared handle to a host object.
pub type ObjectRef = Arc<dyn HostObject>;

/// Read a property as a string.
///
/// Non-string scalars are rendered with their JSON text; `null` reads as
/// absent.
pub fn string_property(object: &dyn HostObject, name: &str) -> Option<String> {
    match object.property(name)? {
        Value::Null => None,
        Value::String(s) => Some(s),
        other => Some(other.to_string()),
    }
}

// ---------------------------------------------------------------------------
// ObjectSnapshot
// ---------------------------------------------------------------------------

/// An in-memory [`HostObject`] holding a fixed set of properties.
///
/// Hosts that bridge foreign objects into the engine can copy the few
/// properties guards read into a snapshot instead of implementing the trait.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ObjectSnapshot {
    type_name: String,
    properties: BTreeMap<String, Value>,
}

impl ObjectSnapshot {
    pub fn new(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            properties: BTreeMap::new(),
        }
    }

    /// Builder-style property setter.
    pub fn with_property(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.properties.insert(name.into(), value.into());
        self
    }

    pub fn into_ref(self) -> ObjectRef {
        Arc::new(self)
    }
}

impl HostObject for ObjectSnapshot {
    fn type_name(&self) -> &str {
        &self.type_name
    }

    fn property(&self, name: &str) -> Option<Value> {
        self.properties.get(name).cloned()
    }
}

// ---------------------------------------------------------------------------
// RequestSummary
// ---------------------------------------------------------------------------

/// Method, path and parameters of an inbound request, for block diagnostics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RequestSummary {
    pub method: String,
    pub path: String,
    pub params: BTreeMap<String, Vec<String>>,
}

impl RequestSummary {
    /// Extract a summary from the `method`, `requestURI` and `parameterMap`
    /// properties of a request object.
    ///
    /// Returns `None` when method or path cannot be read. A missing parameter
    /// map yields no parameters; parameters without values are skipped.
    pub fn extract(request: &dyn HostObject) -> Option<Self> {
        let method = match request.property("method")? {
            Value::String(s) => s,
            _ => return None,
        };
        let path = match request.property("requestURI")? {
            Value::String(s) => s,
            _ => return None,
        };

        let mut params = BTreeMap::new();
        if let Some(Value::Object(map)) = request.property("parameterMap") {
            for (key, value) in map {
                let values: Vec<String> = match value {
                    Value::Array(items) => items
                        .into_iter()
                        .map(|v| match v {
                            Value::String(s) => s,
                            other => other.to_string(),
                        })
                        .collect(),
                    Value::String(s) => vec![s],
                    Value::Null => Vec::new(),
                    other => vec![other.to_string()],
                };
                if !values.is_empty() {
                    params.insert(key, values);
                }
            }
        }

        Some(Self {
            method,
            path,
            params,
        })
    }
}

impl fmt::Display for RequestSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.method, self.path)?;
        if self.params.is_empty() {
            return write!(f, " params=(none)");
        }
        write!(f, " params=")?;
        for (i, (key, values)) in self.params.iter().enumerate() {
            if i > 0 {
                write!(f, "&")?;
            }
            write!(f, "{key}=[{}]", values.join(", "))?;
        }
        Ok(())
    }
}
