//! Native evaluation failures and their classification
//!
//! Engines report failures as a [`NativeError`]: an error domain, a numeric
//! code and a free-form user-info map. [`classify`] recognizes the
//! "JavaScript exception occurred" code and lifts the exception message and
//! source location out of the user info; every other failure passes through
//! as a host error.

use crate::error::{EsError, EsResult};
use crate::value::RawValue;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

/// Native code signalling that the evaluated script threw
pub const JAVASCRIPT_EXCEPTION_CODE: i64 = 4;
/// Native code signalling that the result could not be bridged to the host
pub const UNSUPPORTED_RESULT_CODE: i64 = 5;

/// User-info key holding the exception message
pub const EXCEPTION_MESSAGE_KEY: &str = "WKJavaScriptExceptionMessage";
/// User-info key holding the 1-based exception line
pub const EXCEPTION_LINE_KEY: &str = "WKJavaScriptExceptionLineNumber";
/// User-info key holding the exception column
pub const EXCEPTION_COLUMN_KEY: &str = "WKJavaScriptExceptionColumnNumber";

const DEFAULT_EXCEPTION_MESSAGE: &str = "message";
const DEFAULT_DOMAIN: &str = "WKErrorDomain";

/// A failure reported by the embedded engine
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, Error)]
#[error("{domain} ({code}): {message}")]
pub struct NativeError {
    pub domain: String,
    pub code: i64,
    pub message: String,
    #[serde(default)]
    pub user_info: Map<String, Value>,
}

impl NativeError {
    pub fn new(domain: impl Into<String>, code: i64, message: impl Into<String>) -> Self {
        Self {
            domain: domain.into(),
            code,
            message: message.into(),
            user_info: Map::new(),
        }
    }

    /// A thrown exception with its message and location in the user info
    pub fn javascript_exception(message: impl Into<String>, line: u32, column: u32) -> Self {
        let message = message.into();
        Self::new(
            DEFAULT_DOMAIN,
            JAVASCRIPT_EXCEPTION_CODE,
            "A JavaScript exception occurred",
        )
        .with_info(EXCEPTION_MESSAGE_KEY, message)
        .with_info(EXCEPTION_LINE_KEY, line)
        .with_info(EXCEPTION_COLUMN_KEY, column)
    }

    /// A host failure unrelated to the script itself
    pub fn host(message: impl Into<String>) -> Self {
        Self::new(DEFAULT_DOMAIN, 1, message)
    }

    /// Add a user-info entry
    pub fn with_info(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.user_info.insert(key.into(), value.into());
        self
    }

    pub fn is_javascript_exception(&self) -> bool {
        self.code == JAVASCRIPT_EXCEPTION_CODE
    }
}

/// The normalized result of one evaluation
#[derive(Debug, Clone, PartialEq)]
pub enum EvaluationOutcome {
    Success(RawValue),
    JsException {
        message: String,
        line: u32,
        column: u32,
    },
    HostError(String),
}

impl EvaluationOutcome {
    /// Normalize an engine result, classifying any failure
    pub fn from_native(result: Result<RawValue, NativeError>) -> Self {
        match result {
            Ok(value) => Self::Success(value),
            Err(error) => classify(error),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    pub fn into_result(self) -> EsResult<RawValue> {
        match self {
            Self::Success(value) => Ok(value),
            Self::JsException {
                message,
                line,
                column,
            } => Err(EsError::javascript_exception(message, line, column)),
            Self::HostError(message) => Err(EsError::unknown_host(message)),
        }
    }
}

/// Classify a native failure
///
/// Exceptions missing a message or location default to `"message"`, line `0`
/// and column `0`.
pub fn classify(error: NativeError) -> EvaluationOutcome {
    if !error.is_javascript_exception() {
        return EvaluationOutcome::HostError(error.to_string());
    }

    let message = error
        .user_info
        .get(EXCEPTION_MESSAGE_KEY)
        .and_then(Value::as_str)
        .unwrap_or(DEFAULT_EXCEPTION_MESSAGE)
        .to_string();
    let line = info_number(&error.user_info, EXCEPTION_LINE_KEY);
    let column = info_number(&error.user_info, EXCEPTION_COLUMN_KEY);

    EvaluationOutcome::JsException {
        message,
        line,
        column,
    }
}

fn info_number(info: &Map<String, Value>, key: &str) -> u32 {
    info.get(key)
        .and_then(|value| {
            value
                .as_u64()
                .or_else(|| value.as_f64().filter(|f| *f >= 0.0).map(|f| f as u64))
        })
        .and_then(|n| u32::try_from(n).ok())
        .unwrap_or(0)
}
