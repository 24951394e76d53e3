//! Delegation of page dialogs to the host
//!
//! `alert`, `confirm` and `prompt` in the page block on the host. Each hook
//! receives the dialog text and a responder; the page resumes when the
//! responder is answered. A missing hook, or a responder dropped without an
//! answer, resumes the page with the default: acknowledged, `false`, `None`.

use std::sync::Arc;
use tokio::sync::oneshot;
use tracing::debug;

type AlertHook = Arc<dyn Fn(String, AlertResponder) + Send + Sync>;
type ConfirmHook = Arc<dyn Fn(String, ConfirmResponder) + Send + Sync>;
type PromptHook = Arc<dyn Fn(String, Option<String>, PromptResponder) + Send + Sync>;

/// Acknowledges an alert
#[derive(Debug)]
pub struct AlertResponder {
    tx: oneshot::Sender<()>,
}

impl AlertResponder {
    pub fn acknowledge(self) {
        let _ = self.tx.send(());
    }
}

/// Answers a confirm dialog
#[derive(Debug)]
pub struct ConfirmResponder {
    tx: oneshot::Sender<bool>,
}

impl ConfirmResponder {
    pub fn respond(self, confirmed: bool) {
        let _ = self.tx.send(confirmed);
    }
}

/// Answers a text input dialog; `None` means cancelled
#[derive(Debug)]
pub struct PromptResponder {
    tx: oneshot::Sender<Option<String>>,
}

impl PromptResponder {
    pub fn respond(self, text: Option<String>) {
        let _ = self.tx.send(text);
    }
}

/// Host handlers for page dialogs
#[derive(Clone, Default)]
pub struct DialogHooks {
    alert: Option<AlertHook>,
    confirm: Option<ConfirmHook>,
    prompt: Option<PromptHook>,
}

impl DialogHooks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_alert<F>(mut self, hook: F) -> Self
    where
        F: Fn(String, AlertResponder) + Send + Sync + 'static,
    {
        self.alert = Some(Arc::new(hook));
        self
    }

    pub fn on_confirm<F>(mut self, hook: F) -> Self
    where
        F: Fn(String, ConfirmResponder) + Send + Sync + 'static,
    {
        self.confirm = Some(Arc::new(hook));
        self
    }

    /// The hook also receives the page's default text
    pub fn on_prompt<F>(mut self, hook: F) -> Self
    where
        F: Fn(String, Option<String>, PromptResponder) + Send + Sync + 'static,
    {
        self.prompt = Some(Arc::new(hook));
        self
    }

    /// Show an alert and wait for it to be acknowledged
    pub async fn run_alert(&self, message: &str) {
        let Some(hook) = &self.alert else {
            debug!(target: "esview", "no alert hook, acknowledging");
            return;
        };
        let (tx, rx) = oneshot::channel();
        hook(message.to_string(), AlertResponder { tx });
        let _ = rx.await;
    }

    /// Show a confirm dialog and wait for the answer
    pub async fn run_confirm(&self, message: &str) -> bool {
        let Some(hook) = &self.confirm else {
            debug!(target: "esview", "no confirm hook, answering false");
            return false;
        };
        let (tx, rx) = oneshot::channel();
        hook(message.to_string(), ConfirmResponder { tx });
        rx.await.unwrap_or(false)
    }

    /// Show a text input dialog and wait for the answer
    pub async fn run_prompt(&self, message: &str, default_text: Option<&str>) -> Option<String> {
        let Some(hook) = &self.prompt else {
            debug!(target: "esview", "no prompt hook, cancelling");
            return None;
        };
        let (tx, rx) = oneshot::channel();
        hook(
            message.to_string(),
            default_text.map(str::to_string),
            PromptResponder { tx },
        );
        rx.await.unwrap_or(None)
    }
}

impl std::fmt::Debug for DialogHooks {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DialogHooks")
            .field("alert", &self.alert.is_some())
            .field("confirm", &self.confirm.is_some())
            .field("prompt", &self.prompt.is_some())
            .finish()
    }
}
