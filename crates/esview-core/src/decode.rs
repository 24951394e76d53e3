//! Decoding raw evaluation results into typed host values
//!
//! Every decodable type reports a [`TargetType`] tag. Decoding first checks
//! the raw value against that tag (optional handling, exact scalar kinds,
//! byte serialization) and only then hands the checked value to the type to
//! build itself.
//!
//! # Optional targets
//!
//! For `Option<T>` both `null` and `undefined` decode to `None`. For any other
//! target both are decoding errors; a default value is never substituted.
//!
//! ```
//! use esview_core::{RawValue, decode};
//!
//! assert_eq!(decode::<Option<String>>(RawValue::null()).unwrap(), None);
//! assert_eq!(decode::<Option<String>>(RawValue::Undefined).unwrap(), None);
//! assert!(decode::<String>(RawValue::Undefined).is_err());
//! ```

use crate::error::{EsError, EsResult};
use crate::value::{RawValue, kind_of};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::fmt;

/// The shape a caller expects an evaluation result to have
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TargetType {
    String,
    Integer,
    Float,
    Boolean,
    /// Homogeneous array of a scalar kind
    Array(Box<TargetType>),
    /// Any structure decoded through JSON, named for error messages
    Record(&'static str),
    /// The JSON serialization of the value
    Bytes,
    Optional(Box<TargetType>),
}

impl TargetType {
    /// String, number or boolean
    pub fn is_scalar(&self) -> bool {
        matches!(
            self,
            Self::String | Self::Integer | Self::Float | Self::Boolean
        )
    }

    pub fn is_optional(&self) -> bool {
        matches!(self, Self::Optional(_))
    }
}

impl fmt::Display for TargetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::String => f.write_str("String"),
            Self::Integer => f.write_str("Integer"),
            Self::Float => f.write_str("Float"),
            Self::Boolean => f.write_str("Boolean"),
            Self::Array(element) => write!(f, "[{}]", element),
            Self::Record(name) => f.write_str(name),
            Self::Bytes => f.write_str("Bytes"),
            Self::Optional(inner) => write!(f, "Optional<{}>", inner),
        }
    }
}

/// A raw value that passed the checks for its target
#[derive(Debug, Clone, PartialEq)]
pub enum Checked {
    /// `null` or `undefined` for an optional target
    Absent,
    Json(Value),
    Bytes(Vec<u8>),
}

/// A host type an evaluation result can be decoded into
pub trait JsDecode: Sized {
    /// The tag the decoder dispatches on
    fn target_type() -> TargetType;

    /// Build the value from a checked raw value
    fn from_checked(checked: Checked) -> EsResult<Self>;
}

/// Decode a raw value into `T`
pub fn decode<T: JsDecode>(raw: RawValue) -> EsResult<T> {
    let checked = check(raw, &T::target_type())?;
    T::from_checked(checked)
}

/// Check a raw value against a target type
pub fn check(raw: RawValue, target: &TargetType) -> EsResult<Checked> {
    if let TargetType::Optional(inner) = target {
        if raw.is_nullish() {
            return Ok(Checked::Absent);
        }
        return check(raw, inner);
    }

    match raw {
        RawValue::Undefined => Err(EsError::decoding(format!(
            "expected value of type {}, received nothing",
            target
        ))),
        RawValue::Json(Value::Null) => Err(EsError::decoding(format!(
            "expected value of type {}, received null",
            target
        ))),
        RawValue::Json(value) => check_present(value, target),
    }
}

fn check_present(value: Value, target: &TargetType) -> EsResult<Checked> {
    match target {
        TargetType::String | TargetType::Integer | TargetType::Float | TargetType::Boolean => {
            if !scalar_matches(&value, target) {
                return Err(mismatch(target, &value));
            }
            Ok(Checked::Json(value))
        }
        TargetType::Array(element) => {
            let homogeneous = match &value {
                Value::Array(items) => items.iter().all(|item| scalar_matches(item, element)),
                _ => false,
            };
            if !homogeneous {
                return Err(mismatch(target, &value));
            }
            Ok(Checked::Json(value))
        }
        TargetType::Bytes => serde_json::to_vec(&value)
            .map(Checked::Bytes)
            .map_err(|e| EsError::decoding(format!("could not serialize value: {}", e))),
        TargetType::Record(_) => Ok(Checked::Json(value)),
        TargetType::Optional(inner) => check_present(value, inner),
    }
}

fn scalar_matches(value: &Value, target: &TargetType) -> bool {
    match target {
        TargetType::String => value.is_string(),
        TargetType::Boolean => value.is_boolean(),
        TargetType::Float => value.is_number(),
        TargetType::Integer => integral(value).is_some(),
        _ => false,
    }
}

fn mismatch(target: &TargetType, value: &Value) -> EsError {
    EsError::decoding(format!(
        "value is not {}: received {}",
        target,
        kind_of(value)
    ))
}

/// An integral number, whether the engine reported it as an integer or a float
fn integral(value: &Value) -> Option<i128> {
    let Value::Number(number) = value else {
        return None;
    };
    if let Some(n) = number.as_i64() {
        return Some(i128::from(n));
    }
    if let Some(n) = number.as_u64() {
        return Some(i128::from(n));
    }
    number
        .as_f64()
        .filter(|f| f.is_finite() && f.fract() == 0.0)
        .map(|f| f as i128)
}

fn expect_json(checked: Checked, target: &TargetType) -> EsResult<Value> {
    match checked {
        Checked::Json(value) => Ok(value),
        Checked::Absent => Err(EsError::decoding(format!(
            "expected value of type {}, received nothing",
            target
        ))),
        Checked::Bytes(bytes) => serde_json::from_slice(&bytes)
            .map_err(|e| EsError::decoding(format!("could not read bytes as {}: {}", target, e))),
    }
}

/// Deserialize a record from a checked value
pub fn deserialize_record<T: JsDecode + DeserializeOwned>(checked: Checked) -> EsResult<T> {
    let target = T::target_type();
    let value = expect_json(checked, &target)?;
    serde_json::from_value(value)
        .map_err(|e| EsError::decoding(format!("could not decode {}: {}", target, e)))
}

impl JsDecode for String {
    fn target_type() -> TargetType {
        TargetType::String
    }

    fn from_checked(checked: Checked) -> EsResult<Self> {
        match expect_json(checked, &TargetType::String)? {
            Value::String(s) => Ok(s),
            other => Err(mismatch(&TargetType::String, &other)),
        }
    }
}

impl JsDecode for bool {
    fn target_type() -> TargetType {
        TargetType::Boolean
    }

    fn from_checked(checked: Checked) -> EsResult<Self> {
        match expect_json(checked, &TargetType::Boolean)? {
            Value::Bool(b) => Ok(b),
            other => Err(mismatch(&TargetType::Boolean, &other)),
        }
    }
}

macro_rules! decode_integer {
    ($($ty:ty),+) => {
        $(
            impl JsDecode for $ty {
                fn target_type() -> TargetType {
                    TargetType::Integer
                }

                fn from_checked(checked: Checked) -> EsResult<Self> {
                    let value = expect_json(checked, &TargetType::Integer)?;
                    let n = integral(&value).ok_or_else(|| mismatch(&TargetType::Integer, &value))?;
                    <$ty>::try_from(n).map_err(|_| {
                        EsError::decoding(format!(
                            "value {} is out of range for {}",
                            n,
                            stringify!($ty)
                        ))
                    })
                }
            }
        )+
    };
}

decode_integer!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize);

impl JsDecode for f64 {
    fn target_type() -> TargetType {
        TargetType::Float
    }

    fn from_checked(checked: Checked) -> EsResult<Self> {
        let value = expect_json(checked, &TargetType::Float)?;
        value
            .as_f64()
            .ok_or_else(|| mismatch(&TargetType::Float, &value))
    }
}

impl JsDecode for f32 {
    fn target_type() -> TargetType {
        TargetType::Float
    }

    fn from_checked(checked: Checked) -> EsResult<Self> {
        f64::from_checked(checked).map(|f| f as f32)
    }
}

impl<T: JsDecode> JsDecode for Option<T> {
    fn target_type() -> TargetType {
        TargetType::Optional(Box::new(T::target_type()))
    }

    fn from_checked(checked: Checked) -> EsResult<Self> {
        match checked {
            Checked::Absent | Checked::Json(Value::Null) => Ok(None),
            other => T::from_checked(other).map(Some),
        }
    }
}

impl<T: JsDecode> JsDecode for Vec<T> {
    fn target_type() -> TargetType {
        let element = T::target_type();
        if element.is_scalar() {
            TargetType::Array(Box::new(element))
        } else {
            TargetType::Record(std::any::type_name::<Self>())
        }
    }

    fn from_checked(checked: Checked) -> EsResult<Self> {
        let target = Self::target_type();
        match expect_json(checked, &target)? {
            Value::Array(items) => items
                .into_iter()
                .map(|item| T::from_checked(Checked::Json(item)))
                .collect(),
            other => Err(mismatch(&target, &other)),
        }
    }
}

impl JsDecode for Value {
    fn target_type() -> TargetType {
        TargetType::Record("JSON value")
    }

    fn from_checked(checked: Checked) -> EsResult<Self> {
        expect_json(checked, &Self::target_type())
    }
}

/// The JSON serialization of an evaluation result
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct JsonBytes(pub Vec<u8>);

impl JsonBytes {
    pub fn as_slice(&self) -> &[u8] {
        &self.0
    }

    pub fn into_inner(self) -> Vec<u8> {
        self.0
    }

    /// Deserialize the bytes into a host type
    pub fn deserialize<T: DeserializeOwned>(&self) -> EsResult<T> {
        serde_json::from_slice(&self.0).map_err(|e| EsError::decoding(e.to_string()))
    }
}

impl JsDecode for JsonBytes {
    fn target_type() -> TargetType {
        TargetType::Bytes
    }

    fn from_checked(checked: Checked) -> EsResult<Self> {
        match checked {
            Checked::Bytes(bytes) => Ok(Self(bytes)),
            Checked::Json(value) => serde_json::to_vec(&value)
                .map(Self)
                .map_err(|e| EsError::decoding(format!("could not serialize value: {}", e))),
            Checked::Absent => Err(EsError::decoding(
                "expected value of type Bytes, received nothing",
            )),
        }
    }
}

impl<T: DeserializeOwned> JsDecode for crate::encode::Json<T> {
    fn target_type() -> TargetType {
        TargetType::Record(std::any::type_name::<T>())
    }

    fn from_checked(checked: Checked) -> EsResult<Self> {
        let target = Self::target_type();
        let value = expect_json(checked, &target)?;
        serde_json::from_value(value)
            .map(crate::encode::Json)
            .map_err(|e| EsError::decoding(format!("could not decode {}: {}", target, e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encode::Json;
    use serde::Deserialize;
    use serde_json::json;

    fn raw(value: Value) -> RawValue {
        RawValue::from(value)
    }

    #[derive(Debug, PartialEq, Deserialize)]
    struct Person {
        name: String,
        age: u32,
    }

    #[test]
    fn test_scalars() {
        assert_eq!(decode::<String>(raw(json!("taylor"))).unwrap(), "taylor");
        assert_eq!(decode::<i64>(raw(json!(27))).unwrap(), 27);
        assert_eq!(decode::<f64>(raw(json!(10.5))).unwrap(), 10.5);
        assert!(decode::<bool>(raw(json!(true))).unwrap());
    }

    #[test]
    fn test_integer_reported_as_float() {
        assert_eq!(decode::<i32>(raw(json!(37.0))).unwrap(), 37);
        assert_eq!(decode::<f64>(raw(json!(27))).unwrap(), 27.0);
    }

    #[test]
    fn test_integer_rejects_fraction() {
        let err = decode::<i32>(raw(json!(10.5))).unwrap_err();
        assert_eq!(err.error_kind(), "DecodingError");
    }

    #[test]
    fn test_integer_out_of_range() {
        let err = decode::<u8>(raw(json!(300))).unwrap_err();
        assert!(err.to_string().contains("out of range"));
        assert!(decode::<u32>(raw(json!(-1))).is_err());
    }

    #[test]
    fn test_kind_mismatch_names_expected_type() {
        let err = decode::<String>(raw(json!(27))).unwrap_err();
        assert_eq!(
            err,
            EsError::decoding("value is not String: received number")
        );
        assert!(decode::<bool>(raw(json!(1))).is_err());
        assert!(decode::<i64>(raw(json!(true))).is_err());
    }

    #[test]
    fn test_optional_null_and_undefined() {
        assert_eq!(decode::<Option<String>>(RawValue::null()).unwrap(), None);
        assert_eq!(decode::<Option<String>>(RawValue::Undefined).unwrap(), None);
        assert_eq!(
            decode::<Option<String>>(raw(json!("taylor"))).unwrap(),
            Some("taylor".to_string())
        );
    }

    #[test]
    fn test_optional_still_checks_kind() {
        assert!(decode::<Option<i64>>(raw(json!("27"))).is_err());
    }

    #[test]
    fn test_non_optional_null_and_undefined_fail() {
        let err = decode::<String>(RawValue::Undefined).unwrap_err();
        assert_eq!(
            err,
            EsError::decoding("expected value of type String, received nothing")
        );
        let err = decode::<String>(RawValue::null()).unwrap_err();
        assert_eq!(err.error_kind(), "DecodingError");
        assert!(decode::<Json<Person>>(RawValue::null()).is_err());
        assert!(decode::<JsonBytes>(RawValue::Undefined).is_err());
    }

    #[test]
    fn test_scalar_array() {
        assert_eq!(
            decode::<Vec<i64>>(raw(json!([1, 2, 3, 4]))).unwrap(),
            vec![1, 2, 3, 4]
        );
        assert_eq!(
            Vec::<i64>::target_type(),
            TargetType::Array(Box::new(TargetType::Integer))
        );
    }

    #[test]
    fn test_scalar_array_must_be_homogeneous() {
        let err = decode::<Vec<i64>>(raw(json!([1, "2"]))).unwrap_err();
        assert_eq!(
            err,
            EsError::decoding("value is not [Integer]: received array")
        );
        assert!(decode::<Vec<String>>(raw(json!("abc"))).is_err());
    }

    #[test]
    fn test_optional_array() {
        assert_eq!(
            decode::<Option<Vec<i64>>>(raw(json!([5, 6]))).unwrap(),
            Some(vec![5, 6])
        );
        assert_eq!(decode::<Option<Vec<i64>>>(RawValue::null()).unwrap(), None);
    }

    #[test]
    fn test_record() {
        let person = decode::<Json<Person>>(raw(json!({"name": "tmac", "age": 27})))
            .unwrap()
            .0;
        assert_eq!(
            person,
            Person {
                name: "tmac".into(),
                age: 27
            }
        );
    }

    #[test]
    fn test_record_missing_field() {
        let err = decode::<Json<Person>>(raw(json!({"name": "tmac"}))).unwrap_err();
        assert_eq!(err.error_kind(), "DecodingError");
        assert!(err.to_string().contains("age"));
    }

    #[test]
    fn test_array_of_records() {
        let people = decode::<Vec<Json<Person>>>(raw(json!([
            {"name": "Taylor", "age": 27},
            {"name": "Connor", "age": 24}
        ])))
        .unwrap();
        assert_eq!(people.len(), 2);
        assert_eq!(people[1].0.name, "Connor");
    }

    #[test]
    fn test_bytes() {
        let bytes = decode::<JsonBytes>(raw(json!({"name": "tmac", "age": 27}))).unwrap();
        let person: Person = bytes.deserialize().unwrap();
        assert_eq!(person.age, 27);
        assert_eq!(
            decode::<Option<JsonBytes>>(RawValue::Undefined).unwrap(),
            None
        );
    }

    #[test]
    fn test_json_value_target() {
        assert_eq!(
            decode::<Value>(raw(json!({"a": [1]}))).unwrap(),
            json!({"a": [1]})
        );
        assert!(decode::<Value>(RawValue::null()).is_err());
        assert_eq!(
            decode::<Option<Value>>(RawValue::null()).unwrap(),
            None
        );
    }

    #[test]
    fn test_target_type_display() {
        assert_eq!(Option::<Vec<bool>>::target_type().to_string(), "Optional<[Boolean]>");
        assert!(Option::<String>::target_type().is_optional());
    }
}
