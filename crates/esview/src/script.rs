//! User scripts injected around a document

use esview_core::ScriptSource;
use serde::{Deserialize, Serialize};

/// When a user script runs relative to the document source
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InjectionTime {
    DocumentStart,
    DocumentEnd,
}

/// A script the view evaluates every time a document loads
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserScript {
    source: ScriptSource,
    injection: InjectionTime,
}

impl UserScript {
    pub fn new(source: impl Into<ScriptSource>, injection: InjectionTime) -> Self {
        Self {
            source: source.into(),
            injection,
        }
    }

    pub fn at_document_start(source: impl Into<ScriptSource>) -> Self {
        Self::new(source, InjectionTime::DocumentStart)
    }

    pub fn at_document_end(source: impl Into<ScriptSource>) -> Self {
        Self::new(source, InjectionTime::DocumentEnd)
    }

    pub fn source(&self) -> &ScriptSource {
        &self.source
    }

    pub fn injection(&self) -> InjectionTime {
        self.injection
    }
}
