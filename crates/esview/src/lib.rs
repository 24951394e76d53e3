//! esview - scripting bridge for an embedded web view.
//!
//! This crate lets a host evaluate JavaScript inside a web view's page,
//! exchange typed values with it, and receive the messages, prompts and
//! requests the page posts on its own.
//!
//! # Features
//!
//! - **Typed façade**: read and assign globals, call page functions
//! - **Null vs undefined**: kept apart until decoding into an `Option`
//! - **Message bridge**: one-shot waits and ongoing subscriptions per view
//! - **Dialogs**: `alert`, `confirm` and `prompt` delegated to host hooks
//!
//! # Example
//!
//! ```
//! use esview::prelude::*;
//! use serde_json::json;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), CoreError> {
//! let view = EsView::new(FnEngine::new(|source: String| async move {
//!     Ok(match source.as_str() {
//!         "int;" => RawValue::from(json!(27)),
//!         _ => RawValue::Undefined,
//!     })
//! }));
//!
//! let int: i64 = view.get_variable("int").await?;
//! assert_eq!(int, 27);
//!
//! let pending = view.wait_for_message();
//! view.receive("esviewMessage", json!({"message": "hello!"}));
//! assert_eq!(pending.await?.message, "hello!");
//! # Ok(())
//! # }
//! ```
//!
//! # Architecture
//!
//! ```text
//! ┌────────────────────────────────────────────┐
//! │                  EsView                     │
//! │  get/set variable, call, evaluate           │
//! │         │                    ▲              │
//! │         ↓                    │ receive()    │
//! │  EvaluationChannel        EventBus          │
//! └─────────┼────────────────────┼──────────────┘
//!           ↓                    │
//! ┌────────────────────────────────────────────┐
//! │    ScriptEngine (platform web view)         │
//! └────────────────────────────────────────────┘
//! ```

pub mod bridge;
pub mod channel;
pub mod config;
pub mod dialog;
pub mod engine;
pub mod error;
pub mod script;
pub mod view;

pub use bridge::{
    BridgeEvent, BridgeFault, BusEvent, EventBus, EventCategory, HandlerKind, Message,
    PendingEvent, Prompt, Request,
};
pub use channel::{EvaluationChannel, EvaluationStats, EvaluationStatsSnapshot};
pub use config::{ChannelNames, ViewConfig};
pub use dialog::{AlertResponder, ConfirmResponder, DialogHooks, PromptResponder};
pub use engine::{CallbackEngine, Completion, EvalFuture, FnEngine, NativeResult, ScriptEngine};
pub use error::{CoreError, CoreResult, ViewError, ViewResult};
pub use script::{InjectionTime, UserScript};
pub use view::{EsView, EsViewBuilder, ViewFuture};

// Re-export the marshalling layer
pub use esview_core::{
    EvaluationOutcome, JsDecode, JsEncode, Json, JsonBytes, NativeError, RawValue, ScriptSource,
    TargetType, ValueKind, decode, js_record,
};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::bridge::{HandlerKind, Message, Prompt, Request};
    pub use crate::config::ViewConfig;
    pub use crate::dialog::DialogHooks;
    pub use crate::engine::{CallbackEngine, FnEngine, ScriptEngine};
    pub use crate::error::{CoreError, CoreResult, ViewError, ViewResult};
    pub use crate::script::UserScript;
    pub use crate::view::EsView;
    pub use esview_core::{JsDecode, JsEncode, Json, RawValue, ScriptSource, js_record};
}
