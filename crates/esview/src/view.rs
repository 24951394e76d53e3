//! The host-facing view
//!
//! [`EsView`] reads and writes page globals, calls page functions, waits for
//! events the page posts, and answers page dialogs. Every scripted operation
//! is a single evaluation through the view's [`EvaluationChannel`].
//!
//! # Example
//!
//! ```
//! use esview::{EsView, FnEngine, RawValue};
//! use serde_json::json;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), esview::CoreError> {
//! let view = EsView::new(FnEngine::new(|source: String| async move {
//!     Ok(match source.as_str() {
//!         "arrayResponse();" => RawValue::from(json!([1, 2, 3, 4])),
//!         _ => RawValue::Undefined,
//!     })
//! }));
//!
//! let array: Vec<i64> = view.call_returning("arrayResponse", &[]).await?;
//! assert_eq!(array, vec![1, 2, 3, 4]);
//! view.call_void("noResponse", &[]).await?;
//! # Ok(())
//! # }
//! ```

use crate::bridge::{BusEvent, EventBus, Message, PendingEvent, Prompt, Request};
use crate::channel::{EvaluationChannel, EvaluationStats};
use crate::config::ViewConfig;
use crate::dialog::DialogHooks;
use crate::engine::ScriptEngine;
use crate::error::{ViewError, ViewResult};
use crate::script::{InjectionTime, UserScript};
use esview_core::{EsResult, JsDecode, JsEncode, RawValue, ScriptSource};
use parking_lot::RwLock;
use serde_json::Value;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::debug;

/// Boxed future returned by the view's scripted operations
///
/// Owns everything it needs, so it can be spawned.
pub type ViewFuture<T> = Pin<Box<dyn Future<Output = EsResult<T>> + Send + 'static>>;

struct ViewInner {
    channel: EvaluationChannel,
    bus: EventBus,
    dialogs: RwLock<DialogHooks>,
    scripts: Vec<UserScript>,
    config: ViewConfig,
}

/// A scripted web view
///
/// Cheap to clone; clones share the engine, event bus and dialog hooks.
#[derive(Clone)]
pub struct EsView {
    inner: Arc<ViewInner>,
}

impl EsView {
    /// Create a view with default configuration
    pub fn new(engine: impl ScriptEngine) -> Self {
        Self::from_parts(
            Arc::new(engine),
            ViewConfig::default(),
            DialogHooks::default(),
            Vec::new(),
        )
    }

    pub fn builder() -> EsViewBuilder {
        EsViewBuilder::default()
    }

    fn from_parts(
        engine: Arc<dyn ScriptEngine>,
        config: ViewConfig,
        dialogs: DialogHooks,
        scripts: Vec<UserScript>,
    ) -> Self {
        let channel = EvaluationChannel::new(engine).log_sources(config.logging.log_sources);
        let bus = EventBus::new(
            config.channels.clone(),
            config.bridge.subscription_capacity,
        );
        Self {
            inner: Arc::new(ViewInner {
                channel,
                bus,
                dialogs: RwLock::new(dialogs),
                scripts,
                config,
            }),
        }
    }

    /// Read a global variable
    ///
    /// An undeclared-but-`undefined` or `null` variable decodes to `None`
    /// when `T` is an `Option`, and is a decoding error otherwise.
    pub fn get_variable<T: JsDecode + Send + 'static>(&self, name: &str) -> ViewFuture<T> {
        let source = ScriptSource::read(name);
        let channel = self.inner.channel.clone();
        Box::pin(async move { channel.evaluate_as(source).await })
    }

    /// Assign a global variable
    ///
    /// The value is encoded immediately; an encoding failure resolves the
    /// returned future without evaluating anything.
    pub fn set_variable(&self, name: &str, value: &dyn JsEncode) -> ViewFuture<()> {
        let source = ScriptSource::assign(name, value);
        let channel = self.inner.channel.clone();
        Box::pin(async move {
            // an assignment evaluates to the assigned value; that is not a result
            channel.evaluate_raw(source?).await.map(|_| ())
        })
    }

    /// Call a global function that must not return a value
    pub fn call_void(&self, name: &str, args: &[&dyn JsEncode]) -> ViewFuture<()> {
        let source = ScriptSource::call(name, args);
        let channel = self.inner.channel.clone();
        Box::pin(async move { channel.evaluate_void(source?).await })
    }

    /// Call a global function and decode its return value
    pub fn call_returning<T: JsDecode + Send + 'static>(
        &self,
        name: &str,
        args: &[&dyn JsEncode],
    ) -> ViewFuture<T> {
        let source = ScriptSource::call(name, args);
        let channel = self.inner.channel.clone();
        Box::pin(async move { channel.evaluate_as(source?).await })
    }

    /// Evaluate arbitrary source and decode its completion value
    pub fn evaluate<T: JsDecode + Send + 'static>(
        &self,
        source: impl Into<ScriptSource>,
    ) -> ViewFuture<T> {
        let source = source.into();
        let channel = self.inner.channel.clone();
        Box::pin(async move { channel.evaluate_as(source).await })
    }

    /// Evaluate arbitrary source that must not produce a value
    pub fn evaluate_void(&self, source: impl Into<ScriptSource>) -> ViewFuture<()> {
        let source = source.into();
        let channel = self.inner.channel.clone();
        Box::pin(async move { channel.evaluate_void(source).await })
    }

    /// Evaluate arbitrary source and keep the raw completion value
    pub fn evaluate_raw(&self, source: impl Into<ScriptSource>) -> ViewFuture<RawValue> {
        let source = source.into();
        let channel = self.inner.channel.clone();
        Box::pin(async move { channel.evaluate_raw(source).await })
    }

    /// Evaluate a document with the registered user scripts around it
    ///
    /// Document-start scripts run first and document-end scripts last, each
    /// group in registration order. Stops at the first failure.
    pub fn load_document(&self, document: impl Into<ScriptSource>) -> ViewFuture<()> {
        let document = document.into();
        let inner = self.inner.clone();
        Box::pin(async move {
            let start = user_scripts(&inner.scripts, InjectionTime::DocumentStart);
            let end = user_scripts(&inner.scripts, InjectionTime::DocumentEnd);
            debug!(
                target: "esview",
                start = start.clone().count(),
                end = end.clone().count(),
                "loading document"
            );

            for script in start {
                inner.channel.evaluate_raw(script.source().clone()).await?;
            }
            inner.channel.evaluate_raw(document).await?;
            for script in end {
                inner.channel.evaluate_raw(script.source().clone()).await?;
            }
            Ok(())
        })
    }

    /// User scripts registered for one injection time, in registration order
    pub fn user_scripts(&self, injection: InjectionTime) -> impl Iterator<Item = &UserScript> {
        user_scripts(&self.inner.scripts, injection)
    }

    pub fn wait_for_message(&self) -> PendingEvent<Message> {
        self.inner.bus.wait_for_message()
    }

    pub fn wait_for_prompt(&self) -> PendingEvent<Prompt> {
        self.inner.bus.wait_for_prompt()
    }

    pub fn wait_for_request(&self) -> PendingEvent<Request> {
        self.inner.bus.wait_for_request()
    }

    /// Subscribe to all bridge traffic
    pub fn subscribe(&self) -> broadcast::Receiver<BusEvent> {
        self.inner.bus.subscribe()
    }

    /// Hand a body the page posted on `channel` to the event bus
    pub fn receive(&self, channel: &str, body: Value) {
        self.inner.bus.receive(channel, body);
    }

    /// Replace the dialog hooks
    pub fn set_dialog_hooks(&self, hooks: DialogHooks) {
        *self.inner.dialogs.write() = hooks;
    }

    /// Current dialog hooks
    pub fn dialogs(&self) -> DialogHooks {
        self.inner.dialogs.read().clone()
    }

    /// Page called `alert(message)`
    pub async fn run_alert_panel(&self, message: &str) {
        let hooks = self.dialogs();
        hooks.run_alert(message).await;
    }

    /// Page called `confirm(message)`
    pub async fn run_confirm_panel(&self, message: &str) -> bool {
        let hooks = self.dialogs();
        hooks.run_confirm(message).await
    }

    /// Page called `prompt(message, default_text)`
    pub async fn run_text_input_panel(
        &self,
        message: &str,
        default_text: Option<&str>,
    ) -> Option<String> {
        let hooks = self.dialogs();
        hooks.run_prompt(message, default_text).await
    }

    pub fn bus(&self) -> &EventBus {
        &self.inner.bus
    }

    pub fn channel(&self) -> &EvaluationChannel {
        &self.inner.channel
    }

    pub fn stats(&self) -> &EvaluationStats {
        self.inner.channel.stats()
    }

    pub fn config(&self) -> &ViewConfig {
        &self.inner.config
    }
}

fn user_scripts(
    scripts: &[UserScript],
    injection: InjectionTime,
) -> impl Iterator<Item = &UserScript> + Clone {
    scripts
        .iter()
        .filter(move |script| script.injection() == injection)
}

impl std::fmt::Debug for EsView {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EsView")
            .field("channel", &self.inner.channel)
            .field("bus", &self.inner.bus)
            .field("user_scripts", &self.inner.scripts.len())
            .finish()
    }
}

/// Builder for an [`EsView`]
#[derive(Default)]
pub struct EsViewBuilder {
    engine: Option<Arc<dyn ScriptEngine>>,
    config: ViewConfig,
    dialogs: DialogHooks,
    scripts: Vec<UserScript>,
}

impl EsViewBuilder {
    /// Set the engine the view evaluates against (required)
    pub fn engine(mut self, engine: impl ScriptEngine) -> Self {
        self.engine = Some(Arc::new(engine));
        self
    }

    /// Use an engine shared with other views
    pub fn shared_engine(mut self, engine: Arc<dyn ScriptEngine>) -> Self {
        self.engine = Some(engine);
        self
    }

    pub fn config(mut self, config: ViewConfig) -> Self {
        self.config = config;
        self
    }

    pub fn dialogs(mut self, dialogs: DialogHooks) -> Self {
        self.dialogs = dialogs;
        self
    }

    /// Register a user script; scripts keep registration order
    pub fn user_script(mut self, script: UserScript) -> Self {
        self.scripts.push(script);
        self
    }

    pub fn build(self) -> ViewResult<EsView> {
        let engine = self
            .engine
            .ok_or_else(|| ViewError::config("no script engine configured"))?;
        self.config.validate()?;
        Ok(EsView::from_parts(
            engine,
            self.config,
            self.dialogs,
            self.scripts,
        ))
    }
}

impl std::fmt::Debug for EsViewBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EsViewBuilder")
            .field("engine", &self.engine.is_some())
            .field("config", &self.config)
            .field("dialogs", &self.dialogs)
            .field("user_scripts", &self.scripts.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::FnEngine;
    use esview_core::EsError;
    use parking_lot::Mutex;
    use serde_json::json;

    fn recording_view() -> (EsView, Arc<Mutex<Vec<String>>>) {
        let log = Arc::new(Mutex::new(Vec::new()));
        let seen = log.clone();
        let view = EsView::new(FnEngine::new(move |source: String| {
            seen.lock().push(source.clone());
            async move {
                Ok(match source.as_str() {
                    "int;" => RawValue::from(json!(27)),
                    "returnContents(\"hi\");" => RawValue::from(json!("hi")),
                    _ => RawValue::Undefined,
                })
            }
        }));
        (view, log)
    }

    #[tokio::test]
    async fn test_facade_sources() {
        let (view, log) = recording_view();

        assert_eq!(view.get_variable::<i64>("int").await.unwrap(), 27);
        view.set_variable("int", &37i64).await.unwrap();
        view.call_void("setJobs", &[&"a", &2i32]).await.unwrap();
        let echoed: String = view.call_returning("returnContents", &[&"hi"]).await.unwrap();
        assert_eq!(echoed, "hi");

        assert_eq!(
            *log.lock(),
            vec![
                "int;".to_string(),
                "int = 37;".to_string(),
                "setJobs(\"a\", 2);".to_string(),
                "returnContents(\"hi\");".to_string(),
            ]
        );
    }

    #[tokio::test]
    async fn test_encoding_failure_skips_evaluation() {
        let (view, log) = recording_view();
        let err = view
            .call_void("fn", &[&esview_core::Json(Unserializable)])
            .await
            .unwrap_err();
        assert!(matches!(err, EsError::Encoding { .. }));
        assert!(log.lock().is_empty());
    }

    #[tokio::test]
    async fn test_set_variable_encoding_failure() {
        let (view, log) = recording_view();
        let err = view
            .set_variable("x", &esview_core::Json(Unserializable))
            .await
            .unwrap_err();
        assert!(matches!(err, EsError::Encoding { .. }));

        let err = view
            .set_variable("x", &9_007_199_254_740_993i64)
            .await
            .unwrap_err();
        assert!(matches!(err, EsError::Encoding { .. }));
        assert!(log.lock().is_empty());
    }

    #[tokio::test]
    async fn test_call_returning_encoding_failure() {
        let (view, log) = recording_view();
        let err = view
            .call_returning::<i64>("f", &[&esview_core::Json(Unserializable)])
            .await
            .unwrap_err();
        assert!(matches!(err, EsError::Encoding { .. }));
        assert!(log.lock().is_empty());
    }

    struct Unserializable;

    impl serde::Serialize for Unserializable {
        fn serialize<S: serde::Serializer>(&self, _serializer: S) -> Result<S::Ok, S::Error> {
            Err(serde::ser::Error::custom("cannot serialize"))
        }
    }

    #[tokio::test]
    async fn test_future_is_spawnable() {
        let (view, _log) = recording_view();
        let handle = tokio::spawn(view.get_variable::<i64>("int"));
        assert_eq!(handle.await.unwrap().unwrap(), 27);
    }

    #[tokio::test]
    async fn test_builder_requires_engine() {
        let err = EsView::builder().build().unwrap_err();
        assert_eq!(err.to_string(), "Configuration error: no script engine configured");
    }

    #[tokio::test]
    async fn test_builder_applies_config() {
        let config = ViewConfig::new().log_sources(true);
        let view = EsView::builder()
            .engine(FnEngine::new(|_source: String| async { Ok(RawValue::Undefined) }))
            .config(config.clone())
            .user_script(UserScript::at_document_end("b;"))
            .user_script(UserScript::at_document_start("a;"))
            .build()
            .unwrap();

        assert_eq!(view.config(), &config);
        let start: Vec<_> = view
            .user_scripts(InjectionTime::DocumentStart)
            .map(|script| script.source().as_str().to_string())
            .collect();
        assert_eq!(start, vec!["a;".to_string()]);
    }

    #[tokio::test]
    async fn test_dialog_hooks_replaceable() {
        let (view, _log) = recording_view();
        assert!(!view.run_confirm_panel("sure?").await);

        view.set_dialog_hooks(DialogHooks::new().on_confirm(|_, responder| responder.respond(true)));
        assert!(view.run_confirm_panel("sure?").await);
    }
}
