//! Core error types for page scripting
//!
//! A closed taxonomy: every failure a caller can observe while encoding
//! arguments, evaluating source, decoding results or waiting on page events
//! is one of these variants.

use thiserror::Error;

/// Result type alias for core operations
pub type EsResult<T> = Result<T, EsError>;

/// Structured error types for page scripting
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EsError {
    /// A host value could not be rendered as JavaScript source
    #[error("Encoding error: {message}")]
    Encoding { message: String },

    /// An evaluation result could not be interpreted as the requested type
    #[error("Decoding error: {message}")]
    Decoding { message: String },

    /// A void call produced a value, or a value was required and none came back
    #[error("Invalid calling convention: {message}")]
    InvalidCallingConvention { message: String },

    /// The script threw while being evaluated
    #[error("JavaScript exception: {message} (line: {line}, column: {column})")]
    JavaScriptException {
        message: String,
        line: u32,
        column: u32,
    },

    /// A page event arrived on `channel` with a missing or malformed payload
    #[error("Bridge payload error on {channel}: {message}")]
    BridgePayload { channel: String, message: String },

    /// The page reported a failure while a wait was outstanding
    #[error("Bridge error while attempting {attempting}: {message}")]
    BridgeBroadcast { attempting: String, message: String },

    /// Any other host-side failure, passed through unclassified
    #[error("Unknown host error: {0}")]
    UnknownHost(String),
}

impl EsError {
    /// Create an encoding error
    pub fn encoding(message: impl Into<String>) -> Self {
        Self::Encoding {
            message: message.into(),
        }
    }

    /// Create a decoding error
    pub fn decoding(message: impl Into<String>) -> Self {
        Self::Decoding {
            message: message.into(),
        }
    }

    /// Create a calling convention error
    pub fn calling_convention(message: impl Into<String>) -> Self {
        Self::InvalidCallingConvention {
            message: message.into(),
        }
    }

    /// Create a JavaScript exception at a source location
    pub fn javascript_exception(message: impl Into<String>, line: u32, column: u32) -> Self {
        Self::JavaScriptException {
            message: message.into(),
            line,
            column,
        }
    }

    /// Create a payload error for an inbound page channel
    pub fn bridge_payload(channel: impl Into<String>, message: impl Into<String>) -> Self {
        Self::BridgePayload {
            channel: channel.into(),
            message: message.into(),
        }
    }

    /// Create a broadcast error
    pub fn bridge_broadcast(attempting: impl Into<String>, message: impl Into<String>) -> Self {
        Self::BridgeBroadcast {
            attempting: attempting.into(),
            message: message.into(),
        }
    }

    /// Create an unclassified host error
    pub fn unknown_host(message: impl Into<String>) -> Self {
        Self::UnknownHost(message.into())
    }

    /// Check if this error came from a JavaScript `throw`
    pub fn is_javascript_exception(&self) -> bool {
        matches!(self, Self::JavaScriptException { .. })
    }

    /// Check if this error was raised on the host side before or after evaluation
    pub fn is_marshalling_error(&self) -> bool {
        matches!(self, Self::Encoding { .. } | Self::Decoding { .. })
    }

    /// Get the source location of a JavaScript exception
    pub fn location(&self) -> Option<(u32, u32)> {
        match self {
            Self::JavaScriptException { line, column, .. } => Some((*line, *column)),
            _ => None,
        }
    }

    /// Get a stable name for the error kind
    pub fn error_kind(&self) -> &'static str {
        match self {
            Self::Encoding { .. } => "EncodingError",
            Self::Decoding { .. } => "DecodingError",
            Self::InvalidCallingConvention { .. } => "InvalidCallingConvention",
            Self::JavaScriptException { .. } => "JavaScriptException",
            Self::BridgePayload { .. } => "BridgePayloadError",
            Self::BridgeBroadcast { .. } => "BridgeBroadcastError",
            Self::UnknownHost(_) => "UnknownHostError",
        }
    }
}
