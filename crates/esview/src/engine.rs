//! The boundary to the embedded script engine
//!
//! A view talks to its page through exactly one operation: evaluate a source
//! string and eventually deliver either a value (possibly `undefined`) or a
//! [`NativeError`]. Platform glue implements [`ScriptEngine`] directly, or
//! wraps an existing evaluator with one of the adapters here.
//!
//! # Example
//!
//! ```
//! use esview::{CallbackEngine, ScriptEngine};
//! use serde_json::json;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! // A platform evaluator that reports through a completion callback
//! let engine = CallbackEngine::new(|source: String, completion| {
//!     if source == "answer;" {
//!         completion.complete(Some(json!(42)), None);
//!     } else {
//!         completion.complete(None, None);
//!     }
//! });
//!
//! let value = engine.evaluate("answer;".into()).await.unwrap();
//! assert_eq!(value.as_json(), Some(&json!(42)));
//! # }
//! ```

use esview_core::{NativeError, RawValue};
use serde_json::Value;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use tokio::sync::oneshot;

/// What an engine reports for one evaluation
pub type NativeResult = Result<RawValue, NativeError>;
/// Boxed future returned by [`ScriptEngine::evaluate`]
pub type EvalFuture = Pin<Box<dyn Future<Output = NativeResult> + Send + 'static>>;

/// An embedded JavaScript engine that evaluates source in the page's global scope
pub trait ScriptEngine: Send + Sync + 'static {
    /// Evaluate `source` and resolve with its completion value
    ///
    /// A script that completes with `undefined` must resolve with
    /// [`RawValue::Undefined`], never with JSON `null`.
    fn evaluate(&self, source: String) -> EvalFuture;
}

impl<E: ScriptEngine + ?Sized> ScriptEngine for Arc<E> {
    fn evaluate(&self, source: String) -> EvalFuture {
        (**self).evaluate(source)
    }
}

impl<E: ScriptEngine + ?Sized> ScriptEngine for Box<E> {
    fn evaluate(&self, source: String) -> EvalFuture {
        (**self).evaluate(source)
    }
}

/// An engine backed by an async closure
pub struct FnEngine<F> {
    evaluate: F,
}

impl<F, Fut> FnEngine<F>
where
    F: Fn(String) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = NativeResult> + Send + 'static,
{
    pub fn new(evaluate: F) -> Self {
        Self { evaluate }
    }
}

impl<F, Fut> ScriptEngine for FnEngine<F>
where
    F: Fn(String) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = NativeResult> + Send + 'static,
{
    fn evaluate(&self, source: String) -> EvalFuture {
        Box::pin((self.evaluate)(source))
    }
}

/// One-shot completion handed to a callback-style evaluator
///
/// Dropping it without calling [`complete`](Self::complete) resolves the
/// evaluation with a host error.
#[derive(Debug)]
pub struct Completion {
    tx: oneshot::Sender<NativeResult>,
}

impl Completion {
    /// Deliver the platform's `(value, error)` pair
    ///
    /// An error wins over a value. No value and no error means `undefined`.
    pub fn complete(self, value: Option<Value>, error: Option<NativeError>) {
        let result = match error {
            Some(error) => Err(error),
            None => Ok(RawValue::from(value)),
        };
        // The evaluation future may already be gone; nothing to report then.
        let _ = self.tx.send(result);
    }

    pub fn succeed(self, value: RawValue) {
        let _ = self.tx.send(Ok(value));
    }

    pub fn fail(self, error: NativeError) {
        let _ = self.tx.send(Err(error));
    }
}

/// An engine backed by a callback-style platform evaluator
///
/// The closure receives the source and a [`Completion`]; it may complete
/// synchronously or hand the completion to another thread.
pub struct CallbackEngine<F> {
    dispatch: F,
}

impl<F> CallbackEngine<F>
where
    F: Fn(String, Completion) + Send + Sync + 'static,
{
    pub fn new(dispatch: F) -> Self {
        Self { dispatch }
    }
}

impl<F> ScriptEngine for CallbackEngine<F>
where
    F: Fn(String, Completion) + Send + Sync + 'static,
{
    fn evaluate(&self, source: String) -> EvalFuture {
        let (tx, rx) = oneshot::channel();
        (self.dispatch)(source, Completion { tx });
        Box::pin(async move {
            rx.await
                .unwrap_or_else(|_| Err(NativeError::host("evaluation completion dropped")))
        })
    }
}
