//! Building evaluation source from raw fragments and encoded values

use crate::encode::{JsEncode, encode_args};
use crate::error::EsResult;
use std::fmt;

/// A value that already went through [`JsEncode`]
///
/// The only way to splice a quoted literal into a [`ScriptSource`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Encoded(String);

impl Encoded {
    pub fn new<T: JsEncode + ?Sized>(value: &T) -> EsResult<Self> {
        value.js_encode().map(Self)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Encoded {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// JavaScript source text assembled for one evaluation
///
/// Raw fragments are spliced verbatim; values are only quoted when they are
/// passed through [`value`](Self::value) or [`encoded`](Self::encoded).
///
/// ```
/// use esview_core::ScriptSource;
///
/// let source = ScriptSource::new()
///     .raw("var cool = ")
///     .value("hello")
///     .unwrap()
///     .raw(";");
/// assert_eq!(source.as_str(), r#"var cool = "hello";"#);
///
/// let spliced = ScriptSource::new().raw("var cool = ").raw("hello").raw(";");
/// assert_eq!(spliced.as_str(), "var cool = hello;");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct ScriptSource {
    text: String,
}

impl ScriptSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// `<name>;`
    pub fn read(name: &str) -> Self {
        Self::new().raw(name).raw(";")
    }

    /// `<name> = <encoded value>;`
    pub fn assign<T: JsEncode + ?Sized>(name: &str, value: &T) -> EsResult<Self> {
        Ok(Self::new().raw(name).raw(" = ").value(value)?.raw(";"))
    }

    /// `<name>(<encoded args>);`
    ///
    /// Every argument is encoded before anything is built.
    pub fn call(name: &str, args: &[&dyn JsEncode]) -> EsResult<Self> {
        let args = encode_args(args)?;
        Ok(Self::new().raw(name).raw("(").raw(&args).raw(");"))
    }

    /// Append source text verbatim
    pub fn raw(mut self, fragment: &str) -> Self {
        self.text.push_str(fragment);
        self
    }

    /// Append an already encoded value
    pub fn encoded(mut self, value: &Encoded) -> Self {
        self.text.push_str(value.as_str());
        self
    }

    /// Encode a value and append it
    pub fn value<T: JsEncode + ?Sized>(self, value: &T) -> EsResult<Self> {
        let encoded = Encoded::new(value)?;
        Ok(self.encoded(&encoded))
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn into_string(self) -> String {
        self.text
    }

    pub fn is_empty(&self) -> bool {
        self.text.trim().is_empty()
    }
}

impl From<&str> for ScriptSource {
    fn from(text: &str) -> Self {
        Self::new().raw(text)
    }
}

impl From<String> for ScriptSource {
    fn from(text: String) -> Self {
        Self { text }
    }
}

impl fmt::Display for ScriptSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}
