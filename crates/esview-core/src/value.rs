//! Raw evaluation results as observed from the page

use serde_json::Value;
use std::fmt;

/// The dynamic kind of a raw value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    Undefined,
    Null,
    Boolean,
    Number,
    String,
    Array,
    Object,
}

impl ValueKind {
    /// Name as JavaScript's `typeof` would describe it, except `null` and arrays
    pub fn name(self) -> &'static str {
        match self {
            Self::Undefined => "undefined",
            Self::Null => "null",
            Self::Boolean => "boolean",
            Self::Number => "number",
            Self::String => "string",
            Self::Array => "array",
            Self::Object => "object",
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A value produced by evaluating source in the page
///
/// `Undefined` is kept apart from every JSON value, `null` included, so the
/// decoder can tell "evaluated to nothing" from "evaluated to null".
#[derive(Debug, Clone, Default, PartialEq)]
pub enum RawValue {
    #[default]
    Undefined,
    Json(Value),
}

impl RawValue {
    pub fn null() -> Self {
        Self::Json(Value::Null)
    }

    pub fn is_undefined(&self) -> bool {
        matches!(self, Self::Undefined)
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Json(Value::Null))
    }

    /// `null` or `undefined`
    pub fn is_nullish(&self) -> bool {
        self.is_undefined() || self.is_null()
    }

    pub fn kind(&self) -> ValueKind {
        match self {
            Self::Undefined => ValueKind::Undefined,
            Self::Json(value) => kind_of(value),
        }
    }

    pub fn as_json(&self) -> Option<&Value> {
        match self {
            Self::Undefined => None,
            Self::Json(value) => Some(value),
        }
    }

    pub fn into_json(self) -> Option<Value> {
        match self {
            Self::Undefined => None,
            Self::Json(value) => Some(value),
        }
    }
}

impl From<Value> for RawValue {
    fn from(value: Value) -> Self {
        Self::Json(value)
    }
}

impl From<Option<Value>> for RawValue {
    fn from(value: Option<Value>) -> Self {
        value.map_or(Self::Undefined, Self::Json)
    }
}

impl fmt::Display for RawValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Undefined => f.write_str("undefined"),
            Self::Json(value) => write!(f, "{}", value),
        }
    }
}

/// Kind of a JSON value
pub fn kind_of(value: &Value) -> ValueKind {
    match value {
        Value::Null => ValueKind::Null,
        Value::Bool(_) => ValueKind::Boolean,
        Value::Number(_) => ValueKind::Number,
        Value::String(_) => ValueKind::String,
        Value::Array(_) => ValueKind::Array,
        Value::Object(_) => ValueKind::Object,
    }
}
