//! Fixture page shared by the integration tests
//!
//! `FixturePage` is a tiny script engine that understands the statement
//! forms a view emits (`name;`, `name = <json>;`, `name(<json>, ...);`) plus
//! `var|let|const name = <json>;` declarations. Loading [`APP_DOCUMENT`]
//! installs the sample page's globals.

#![allow(dead_code)]

use esview::{
    EsView, EsViewBuilder, EvalFuture, EventBus, NativeError, NativeResult, RawValue, ScriptEngine,
};
use parking_lot::Mutex;
use serde_json::{Value, json};
use std::collections::HashMap;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

/// Document source that installs the sample page
pub const APP_DOCUMENT: &str = "/* app.js */";

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

#[derive(Default)]
pub struct FixturePage {
    globals: Mutex<HashMap<String, RawValue>>,
    bus: Mutex<Option<EventBus>>,
    evaluated: Mutex<Vec<String>>,
}

impl FixturePage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Route the page's posts to a view's bus
    pub fn attach(&self, bus: EventBus) {
        *self.bus.lock() = Some(bus);
    }

    /// Every source evaluated so far, in order
    pub fn evaluated(&self) -> Vec<String> {
        self.evaluated.lock().clone()
    }

    pub fn global(&self, name: &str) -> Option<RawValue> {
        self.globals.lock().get(name).cloned()
    }

    fn install_app(&self) {
        let mut globals = self.globals.lock();
        globals.insert("undefinable".into(), RawValue::Undefined);
        globals.insert("nullable".into(), RawValue::null());
        globals.insert("string".into(), json!("taylor").into());
        globals.insert("int".into(), json!(27).into());
        globals.insert("double".into(), json!(10.5).into());
        globals.insert("bool".into(), json!(true).into());
        globals.insert("array".into(), json!([1, 2, 3, 4]).into());
        globals.insert("json".into(), json!({"name": "tmac", "age": 27}).into());
    }

    fn post(&self, pick: fn(&esview::ChannelNames) -> &str, body: Value) {
        if let Some(bus) = self.bus.lock().clone() {
            let channel = pick(bus.channels()).to_string();
            bus.receive(&channel, body);
        }
    }

    fn run(&self, source: &str) -> NativeResult {
        self.evaluated.lock().push(source.to_string());
        let statement = source.trim().trim_end_matches(';').trim();

        if statement == APP_DOCUMENT {
            self.install_app();
            return Ok(RawValue::Undefined);
        }

        for keyword in ["var ", "let ", "const "] {
            if let Some(declaration) = statement.strip_prefix(keyword) {
                let (name, value) = split_assignment(declaration)?;
                self.globals.lock().insert(name.to_string(), value);
                return Ok(RawValue::Undefined);
            }
        }

        if let Some((name, args)) = split_call(statement) {
            let args = parse_args(args)?;
            return self.call(name, &args);
        }

        if statement.contains('=') {
            let (name, value) = split_assignment(statement)?;
            self.globals.lock().insert(name.to_string(), value.clone());
            return Ok(value);
        }

        if statement == "undefined" {
            return Ok(RawValue::Undefined);
        }
        if let Ok(literal) = serde_json::from_str::<Value>(statement) {
            return Ok(literal.into());
        }
        self.global(statement)
            .ok_or_else(|| reference_error(statement))
    }

    fn call(&self, name: &str, args: &[Value]) -> NativeResult {
        let arg = |index: usize| -> RawValue {
            args.get(index).cloned().map(RawValue::from).unwrap_or_default()
        };

        let value = match name {
            "stringResponse" => json!("taylor").into(),
            "intResponse" => json!(27).into(),
            "doubleResponse" => json!(10.5).into(),
            "boolResponse" => json!(true).into(),
            "arrayResponse" => json!([1, 2, 3, 4]).into(),
            "jsonResponse" => json!({"name": "tmac", "age": 27}).into(),
            "noResponse" => RawValue::Undefined,
            "returnContents" => arg(0),
            "nullableResponse" => {
                if truthy(&arg(1)) {
                    arg(0)
                } else {
                    RawValue::null()
                }
            }
            "undefinedResponse" => {
                if truthy(&arg(1)) {
                    arg(0)
                } else {
                    RawValue::Undefined
                }
            }
            "fails" => {
                return Err(NativeError::javascript_exception(
                    "Error: this function fails",
                    1,
                    24,
                ));
            }
            "triggerMessage" => {
                self.post(|c| &c.message, json!({"message": "hello!"}));
                RawValue::Undefined
            }
            "triggerRequestVoid" => {
                self.post(
                    |c| &c.request,
                    json!({"object": "Jobs", "toHandler": "setJobs", "type": "function"}),
                );
                RawValue::Undefined
            }
            "triggerRequestReturn" => {
                self.post(
                    |c| &c.request,
                    json!({"object": "Person", "toHandler": "returnContents", "type": "function"}),
                );
                RawValue::Undefined
            }
            "triggerPromptVariable" => {
                self.post(|c| &c.prompt, json!({"name": "json", "type": "variable"}));
                RawValue::Undefined
            }
            "triggerPromptFunction" => {
                self.post(
                    |c| &c.prompt,
                    json!({"name": "jsonResponse", "type": "function"}),
                );
                RawValue::Undefined
            }
            "triggerMalformedPrompt" => {
                self.post(|c| &c.prompt, json!({"name": "json"}));
                RawValue::Undefined
            }
            other if self.global(other).is_some() => {
                return Err(NativeError::javascript_exception(
                    format!("TypeError: {other} is not a function"),
                    1,
                    1,
                ));
            }
            other => return Err(reference_error(other)),
        };
        Ok(value)
    }
}

impl ScriptEngine for FixturePage {
    fn evaluate(&self, source: String) -> EvalFuture {
        let result = self.run(&source);
        Box::pin(async move {
            // engines complete on a later turn of the loop
            tokio::task::yield_now().await;
            result
        })
    }
}

fn reference_error(name: &str) -> NativeError {
    NativeError::javascript_exception(format!("ReferenceError: Can't find variable: {name}"), 1, 1)
}

fn syntax_error(source: &str) -> NativeError {
    NativeError::javascript_exception(format!("SyntaxError: Unexpected token in {source}"), 1, 1)
}

fn is_identifier(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
}

fn split_assignment(statement: &str) -> Result<(&str, RawValue), NativeError> {
    let (name, value) = statement
        .split_once('=')
        .ok_or_else(|| syntax_error(statement))?;
    let name = name.trim();
    if !is_identifier(name) {
        return Err(syntax_error(statement));
    }
    let value: Value = serde_json::from_str(value.trim()).map_err(|_| syntax_error(statement))?;
    Ok((name, value.into()))
}

fn split_call(statement: &str) -> Option<(&str, &str)> {
    let (name, rest) = statement.split_once('(')?;
    let args = rest.strip_suffix(')')?;
    is_identifier(name.trim()).then(|| (name.trim(), args))
}

fn parse_args(args: &str) -> Result<Vec<Value>, NativeError> {
    serde_json::from_str(&format!("[{args}]")).map_err(|_| syntax_error(args))
}

fn truthy(value: &RawValue) -> bool {
    match value.as_json() {
        None | Some(Value::Null) => false,
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_f64().is_some_and(|n| n != 0.0),
        Some(Value::String(s)) => !s.is_empty(),
        Some(_) => true,
    }
}

/// A view backed by a blank fixture page
pub fn blank_view_with(builder: EsViewBuilder) -> (EsView, Arc<FixturePage>) {
    init_tracing();
    let page = Arc::new(FixturePage::new());
    let view = builder
        .shared_engine(page.clone())
        .build()
        .expect("fixture view should build");
    page.attach(view.bus().clone());
    (view, page)
}

/// A view with the sample page already loaded
pub async fn app_view() -> (EsView, Arc<FixturePage>) {
    let (view, page) = blank_view_with(EsView::builder());
    view.load_document(APP_DOCUMENT)
        .await
        .expect("sample page should load");
    (view, page)
}
