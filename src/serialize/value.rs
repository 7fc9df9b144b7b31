//! The dynamic value type fed to the safe serializer.

use std::fmt;
use std::sync::{Arc, RwLock};

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use thiserror::Error;
use uuid::Uuid;

/// Failure to read a single field off an entity.
///
/// Degrades to a placeholder string for that field only; it never aborts
/// serialization of the containing record.
#[derive(Error, Debug, Clone)]
#[error("{message}")]
pub struct FieldError {
    pub message: String,
}

impl FieldError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Field-enumeration capability for domain entities.
///
/// The audit layer never introspects entities itself; an adapter per
/// entity type declares the field set and supplies field values. A failed
/// field read is reported per field, not raised.
pub trait FieldSource: Send + Sync {
    /// Entity type name (e.g., "User").
    fn type_name(&self) -> &str;

    /// Declared fields in order, each value or a per-field failure.
    fn fields(&self) -> Vec<(String, Result<RawValue, FieldError>)>;
}

/// A runtime value on its way into an audit record.
///
/// Covers JSON primitives, the date/time and identifier types that show
/// up on entity fields, byte payloads, order-preserving maps, sequences,
/// entities behind the [`FieldSource`] capability, shared (aliasable,
/// possibly cyclic) nodes, and an opaque fallback that reduces to its
/// display form.
#[derive(Clone)]
pub enum RawValue {
    Null,
    Bool(bool),
    Int(i64),
    UInt(u64),
    Float(f64),
    Str(String),
    Bytes(Vec<u8>),
    DateTime(DateTime<Utc>),
    Date(NaiveDate),
    Time(NaiveTime),
    Uuid(Uuid),
    /// Key order is preserved through serialization.
    Map(Vec<(String, RawValue)>),
    Seq(Vec<RawValue>),
    /// A domain entity reduced via its field-enumeration capability.
    Entity(Arc<dyn FieldSource>),
    /// An aliasable node; the one way a value graph can contain a cycle.
    Shared(Arc<RwLock<RawValue>>),
    /// No known shape; serializes to its display form.
    Opaque(Arc<dyn fmt::Display + Send + Sync>),
}

impl RawValue {
    /// Wrap a byte payload.
    pub fn bytes(bytes: impl Into<Vec<u8>>) -> Self {
        RawValue::Bytes(bytes.into())
    }

    /// Wrap an entity adapter.
    pub fn entity(source: impl FieldSource + 'static) -> Self {
        RawValue::Entity(Arc::new(source))
    }

    /// Create an aliasable node that can appear at several points of a
    /// value graph (including cyclically).
    pub fn shared(value: RawValue) -> Arc<RwLock<RawValue>> {
        Arc::new(RwLock::new(value))
    }

    /// Wrap a value with no known shape; it serializes to `value.to_string()`.
    pub fn opaque(value: impl fmt::Display + Send + Sync + 'static) -> Self {
        RawValue::Opaque(Arc::new(value))
    }
}

impl fmt::Debug for RawValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RawValue::Null => f.write_str("Null"),
            RawValue::Bool(v) => write!(f, "Bool({v})"),
            RawValue::Int(v) => write!(f, "Int({v})"),
            RawValue::UInt(v) => write!(f, "UInt({v})"),
            RawValue::Float(v) => write!(f, "Float({v})"),
            RawValue::Str(v) => write!(f, "Str({v:?})"),
            RawValue::Bytes(v) => write!(f, "Bytes({} bytes)", v.len()),
            RawValue::DateTime(v) => write!(f, "DateTime({v})"),
            RawValue::Date(v) => write!(f, "Date({v})"),
            RawValue::Time(v) => write!(f, "Time({v})"),
            RawValue::Uuid(v) => write!(f, "Uuid({v})"),
            RawValue::Map(entries) => f.debug_map().entries(entries.iter().map(|(k, v)| (k, v))).finish(),
            RawValue::Seq(items) => f.debug_list().entries(items).finish(),
            RawValue::Entity(source) => write!(f, "Entity({})", source.type_name()),
            RawValue::Shared(_) => f.write_str("Shared(..)"),
            RawValue::Opaque(_) => f.write_str("Opaque(..)"),
        }
    }
}

impl From<bool> for RawValue {
    fn from(v: bool) -> Self {
        RawValue::Bool(v)
    }
}

impl From<i32> for RawValue {
    fn from(v: i32) -> Self {
        RawValue::Int(v.into())
    }
}

impl From<i64> for RawValue {
    fn from(v: i64) -> Self {
        RawValue::Int(v)
    }
}

impl From<u32> for RawValue {
    fn from(v: u32) -> Self {
        RawValue::UInt(v.into())
    }
}

impl From<u64> for RawValue {
    fn from(v: u64) -> Self {
        RawValue::UInt(v)
    }
}

impl From<f64> for RawValue {
    fn from(v: f64) -> Self {
        RawValue::Float(v)
    }
}

impl From<&str> for RawValue {
    fn from(v: &str) -> Self {
        RawValue::Str(v.to_string())
    }
}

impl From<String> for RawValue {
    fn from(v: String) -> Self {
        RawValue::Str(v)
    }
}

impl From<DateTime<Utc>> for RawValue {
    fn from(v: DateTime<Utc>) -> Self {
        RawValue::DateTime(v)
    }
}

impl From<NaiveDate> for RawValue {
    fn from(v: NaiveDate) -> Self {
        RawValue::Date(v)
    }
}

impl From<NaiveTime> for RawValue {
    fn from(v: NaiveTime) -> Self {
        RawValue::Time(v)
    }
}

impl From<Uuid> for RawValue {
    fn from(v: Uuid) -> Self {
        RawValue::Uuid(v)
    }
}

impl From<Arc<RwLock<RawValue>>> for RawValue {
    fn from(v: Arc<RwLock<RawValue>>) -> Self {
        RawValue::Shared(v)
    }
}

impl<T: Into<RawValue>> From<Option<T>> for RawValue {
    fn from(v: Option<T>) -> Self {
        match v {
            Some(inner) => inner.into(),
            None => RawValue::Null,
        }
    }
}

impl<T: Into<RawValue>> From<Vec<T>> for RawValue {
    fn from(items: Vec<T>) -> Self {
        RawValue::Seq(items.into_iter().map(Into::into).collect())
    }
}

impl From<serde_json::Value> for RawValue {
    fn from(v: serde_json::Value) -> Self {
        match v {
            serde_json::Value::Null => RawValue::Null,
            serde_json::Value::Bool(b) => RawValue::Bool(b),
            serde_json::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    RawValue::Int(i)
                } else if let Some(u) = n.as_u64() {
                    RawValue::UInt(u)
                } else {
                    RawValue::Float(n.as_f64().unwrap_or(f64::NAN))
                }
            }
            serde_json::Value::String(s) => RawValue::Str(s),
            serde_json::Value::Array(items) => {
                RawValue::Seq(items.into_iter().map(Into::into).collect())
            }
            serde_json::Value::Object(map) => {
                RawValue::Map(map.into_iter().map(|(k, v)| (k, v.into())).collect())
            }
        }
    }
}
