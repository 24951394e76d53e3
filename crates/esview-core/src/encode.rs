//! Rendering host values as JavaScript literal source
//!
//! Every encoding is a side-effect-free literal: strings are quoted and
//! escaped, numbers are plain decimal text, records become JSON object text
//! in field declaration order, and sequences become `[a, b, c]`.
//!
//! 64-bit integers beyond [`MAX_SAFE_INTEGER`] are rejected, since the page
//! would read them back as a different number.
//!
//! Only types that implement [`JsEncode`] are quoted. Text spliced into a
//! [`ScriptSource`](crate::ScriptSource) with `raw` is taken as source code.

use crate::error::{EsError, EsResult};
use serde::Serialize;

/// A host value that can be rendered as JavaScript source
pub trait JsEncode {
    /// Render `self` as a JavaScript literal
    fn js_encode(&self) -> EsResult<String>;
}

impl<T: JsEncode + ?Sized> JsEncode for &T {
    fn js_encode(&self) -> EsResult<String> {
        (**self).js_encode()
    }
}

impl JsEncode for str {
    fn js_encode(&self) -> EsResult<String> {
        Ok(quote(self))
    }
}

impl JsEncode for String {
    fn js_encode(&self) -> EsResult<String> {
        Ok(quote(self))
    }
}

impl JsEncode for bool {
    fn js_encode(&self) -> EsResult<String> {
        Ok(if *self { "true" } else { "false" }.to_string())
    }
}

macro_rules! encode_integer {
    ($($ty:ty),+) => {
        $(
            impl JsEncode for $ty {
                fn js_encode(&self) -> EsResult<String> {
                    Ok(self.to_string())
                }
            }
        )+
    };
}

encode_integer!(i8, i16, i32, u8, u16, u32);

/// Largest integer a JavaScript number holds exactly (2^53 - 1)
pub const MAX_SAFE_INTEGER: u64 = 9_007_199_254_740_991;

macro_rules! encode_wide_integer {
    ($($ty:ty),+) => {
        $(
            impl JsEncode for $ty {
                fn js_encode(&self) -> EsResult<String> {
                    if (*self as i128).unsigned_abs() > u128::from(MAX_SAFE_INTEGER) {
                        return Err(EsError::encoding(format!(
                            "integer {} is outside the range a JavaScript number holds exactly",
                            self
                        )));
                    }
                    Ok(self.to_string())
                }
            }
        )+
    };
}

encode_wide_integer!(i64, isize, u64, usize);

impl JsEncode for f64 {
    fn js_encode(&self) -> EsResult<String> {
        Ok(encode_float(*self))
    }
}

impl JsEncode for f32 {
    fn js_encode(&self) -> EsResult<String> {
        // f32 Display keeps the shortest f32 form ("0.1", not "0.10000000149011612")
        if self.is_finite() {
            Ok(self.to_string())
        } else {
            Ok(encode_float(f64::from(*self)))
        }
    }
}

impl<T: JsEncode> JsEncode for Option<T> {
    fn js_encode(&self) -> EsResult<String> {
        match self {
            Some(value) => value.js_encode(),
            None => Ok("null".to_string()),
        }
    }
}

impl<T: JsEncode> JsEncode for [T] {
    fn js_encode(&self) -> EsResult<String> {
        let parts = self
            .iter()
            .map(JsEncode::js_encode)
            .collect::<EsResult<Vec<_>>>()?;
        Ok(format!("[{}]", parts.join(", ")))
    }
}

impl<T: JsEncode> JsEncode for Vec<T> {
    fn js_encode(&self) -> EsResult<String> {
        self.as_slice().js_encode()
    }
}

impl<T: JsEncode, const N: usize> JsEncode for [T; N] {
    fn js_encode(&self) -> EsResult<String> {
        self.as_slice().js_encode()
    }
}

impl JsEncode for serde_json::Value {
    fn js_encode(&self) -> EsResult<String> {
        to_json_text(self)
    }
}

/// Encode any serializable value as a JSON record literal
///
/// ```
/// use esview_core::{Json, JsEncode};
///
/// #[derive(serde::Serialize)]
/// struct Person {
///     name: String,
///     age: u32,
/// }
///
/// let person = Json(Person { name: "taylor".into(), age: 28 });
/// assert_eq!(person.js_encode().unwrap(), r#"{"name":"taylor","age":28}"#);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Json<T>(pub T);

impl<T: Serialize> JsEncode for Json<T> {
    fn js_encode(&self) -> EsResult<String> {
        to_json_text(&self.0)
    }
}

/// Serialize a value to JSON text usable as a JavaScript literal
pub fn to_json_text<T: Serialize + ?Sized>(value: &T) -> EsResult<String> {
    let text = serde_json::to_string(value)
        .map_err(|e| EsError::encoding(format!("could not encode value: {}", e)))?;
    // Line and paragraph separators can only occur inside JSON strings here
    if text.contains(['\u{2028}', '\u{2029}']) {
        Ok(text.replace('\u{2028}', "\\u2028").replace('\u{2029}', "\\u2029"))
    } else {
        Ok(text)
    }
}

/// Encode a list of arguments as a comma separated argument list (no parentheses)
///
/// Fails on the first argument that cannot be encoded.
pub fn encode_args(args: &[&dyn JsEncode]) -> EsResult<String> {
    let parts = args
        .iter()
        .map(|arg| arg.js_encode())
        .collect::<EsResult<Vec<_>>>()?;
    Ok(parts.join(", "))
}

fn quote(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\u{8}' => out.push_str("\\b"),
            '\u{c}' => out.push_str("\\f"),
            '\u{2028}' => out.push_str("\\u2028"),
            '\u{2029}' => out.push_str("\\u2029"),
            c if (c as u32) < 0x20 => out.push_str(&format!("\\u{:04x}", c as u32)),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

fn encode_float(value: f64) -> String {
    if value.is_nan() {
        "NaN".to_string()
    } else if value.is_infinite() {
        if value > 0.0 { "Infinity" } else { "-Infinity" }.to_string()
    } else {
        // Display is the shortest text that round-trips and never uses an exponent
        value.to_string()
    }
}

/// Implement [`JsEncode`](crate::JsEncode) and [`JsDecode`](crate::JsDecode)
/// for serde record types
///
/// Records encode as JSON object literals and decode through JSON
/// deserialization, with fields matched by name.
///
/// ```
/// use esview_core::{JsEncode, RawValue, decode, js_record};
/// use serde::{Deserialize, Serialize};
///
/// #[derive(Debug, PartialEq, Serialize, Deserialize)]
/// struct Person {
///     name: String,
///     age: u32,
/// }
///
/// js_record!(Person);
///
/// let person = Person { name: "tmac".into(), age: 27 };
/// assert_eq!(person.js_encode().unwrap(), r#"{"name":"tmac","age":27}"#);
///
/// let raw = RawValue::from(serde_json::json!({"name": "tmac", "age": 27}));
/// assert_eq!(decode::<Person>(raw).unwrap(), person);
/// ```
#[macro_export]
macro_rules! js_record {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl $crate::JsEncode for $ty {
                fn js_encode(&self) -> $crate::EsResult<::std::string::String> {
                    $crate::encode::to_json_text(self)
                }
            }

            impl $crate::JsDecode for $ty {
                fn target_type() -> $crate::TargetType {
                    $crate::TargetType::Record(::std::any::type_name::<$ty>())
                }

                fn from_checked(checked: $crate::Checked) -> $crate::EsResult<Self> {
                    $crate::decode::deserialize_record(checked)
                }
            }
        )+
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Serialize;

    #[test]
    fn test_string() {
        assert_eq!("hello".js_encode().unwrap(), r#""hello""#);
        assert_eq!(String::from("hello!").js_encode().unwrap(), r#""hello!""#);
    }

    #[test]
    fn test_string_escaping() {
        assert_eq!(
            r#"say "hi" \ bye"#.js_encode().unwrap(),
            r#""say \"hi\" \\ bye""#
        );
        assert_eq!("a\nb\tc".js_encode().unwrap(), r#""a\nb\tc""#);
        assert_eq!("\u{1}".js_encode().unwrap(), r#""\u0001""#);
        assert_eq!("\u{2028}".js_encode().unwrap(), r#""\u2028""#);
    }

    #[test]
    fn test_numbers() {
        assert_eq!(8i32.js_encode().unwrap(), "8");
        assert_eq!(1u64.js_encode().unwrap(), "1");
        assert_eq!((-37i32).js_encode().unwrap(), "-37");
        assert_eq!(2.5f64.js_encode().unwrap(), "2.5");
        assert_eq!(26.6f64.js_encode().unwrap(), "26.6");
        assert_eq!(10.0f64.js_encode().unwrap(), "10");
        assert_eq!(0.1f32.js_encode().unwrap(), "0.1");
    }

    #[test]
    fn test_wide_integer_range() {
        assert_eq!(
            9_007_199_254_740_991i64.js_encode().unwrap(),
            "9007199254740991"
        );
        assert_eq!(
            (-9_007_199_254_740_991i64).js_encode().unwrap(),
            "-9007199254740991"
        );
        assert_eq!(MAX_SAFE_INTEGER.js_encode().unwrap(), "9007199254740991");

        let err = 9_007_199_254_740_992i64.js_encode().unwrap_err();
        assert_eq!(err.error_kind(), "EncodingError");
        assert!((-9_007_199_254_740_992i64).js_encode().is_err());
        assert!(i64::MAX.js_encode().is_err());
        assert!(i64::MIN.js_encode().is_err());
        assert!(u64::MAX.js_encode().is_err());
        assert!(usize::MAX.js_encode().is_err());
    }

    #[test]
    fn test_non_finite_numbers() {
        assert_eq!(f64::NAN.js_encode().unwrap(), "NaN");
        assert_eq!(f64::INFINITY.js_encode().unwrap(), "Infinity");
        assert_eq!(f32::NEG_INFINITY.js_encode().unwrap(), "-Infinity");
    }

    #[test]
    fn test_bool() {
        assert_eq!(true.js_encode().unwrap(), "true");
        assert_eq!(false.js_encode().unwrap(), "false");
    }

    #[test]
    fn test_sequences() {
        assert_eq!(vec![5i32, 6, 7, 8].js_encode().unwrap(), "[5, 6, 7, 8]");
        assert_eq!(["a", "b"].js_encode().unwrap(), r#"["a", "b"]"#);
        assert_eq!(Vec::<i32>::new().js_encode().unwrap(), "[]");
        assert_eq!(
            vec![vec![1i64, 2], vec![3]].js_encode().unwrap(),
            "[[1, 2], [3]]"
        );
    }

    #[test]
    fn test_option() {
        assert_eq!(Some(3u8).js_encode().unwrap(), "3");
        assert_eq!(None::<String>.js_encode().unwrap(), "null");
    }

    #[test]
    fn test_record_field_order() {
        #[derive(Serialize)]
        struct Test {
            name: String,
            age: u32,
        }

        let encoded = Json(Test {
            name: "taylor".into(),
            age: 28,
        })
        .js_encode()
        .unwrap();
        assert_eq!(encoded, r#"{"name":"taylor","age":28}"#);
    }

    #[test]
    fn test_record_encoding_failure() {
        use std::collections::HashMap;

        let mut map = HashMap::new();
        map.insert(vec![1u8], 1);
        let err = Json(map).js_encode().unwrap_err();
        assert_eq!(err.error_kind(), "EncodingError");
    }

    #[test]
    fn test_encode_args() {
        let name = "taylor";
        let args: [&dyn JsEncode; 3] = [&name, &27i32, &true];
        assert_eq!(encode_args(&args).unwrap(), r#""taylor", 27, true"#);
        assert_eq!(encode_args(&[]).unwrap(), "");
    }

    #[test]
    fn test_encode_args_stops_on_failure() {
        use std::collections::HashMap;

        let mut bad = HashMap::new();
        bad.insert((1, 2), "x");
        let bad = Json(bad);
        let args: [&dyn JsEncode; 2] = [&1i32, &bad];
        assert!(encode_args(&args).is_err());
    }
}
