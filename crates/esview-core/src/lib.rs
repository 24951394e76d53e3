//! Value marshalling for embedded web view scripting.
//!
//! This crate holds the engine-independent half of `esview`: turning host
//! values into JavaScript source, turning evaluation results back into typed
//! host values, and normalizing engine failures into one error taxonomy.
//!
//! # Example
//!
//! ```
//! use esview_core::{RawValue, ScriptSource, decode};
//! use serde_json::json;
//!
//! let source = ScriptSource::assign("int", &37).unwrap();
//! assert_eq!(source.as_str(), "int = 37;");
//!
//! let result: Vec<i64> = decode(RawValue::from(json!([1, 2, 3, 4]))).unwrap();
//! assert_eq!(result, vec![1, 2, 3, 4]);
//! ```
//!
//! # Null and undefined
//!
//! [`RawValue`] keeps `undefined` apart from JSON `null`. Both decode to
//! `None` for an `Option<T>` target and both are decoding errors for any
//! other target.

pub mod decode;
pub mod encode;
mod error;
pub mod native;
mod source;
mod value;

pub use decode::{Checked, JsDecode, JsonBytes, TargetType, decode};
pub use encode::{JsEncode, Json, encode_args};
pub use error::{EsError, EsResult};
pub use native::{EvaluationOutcome, NativeError, classify};
pub use source::{Encoded, ScriptSource};
pub use value::{RawValue, ValueKind};
