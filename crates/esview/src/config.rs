//! View configuration
//!
//! Loaded from a TOML file (every key optional) or built in code:
//!
//! ```toml
//! [channels]
//! message = "esviewMessage"
//! prompt = "esviewPrompt"
//! request = "esviewRequest"
//!
//! [bridge]
//! subscription_capacity = 64
//!
//! [logging]
//! log_sources = false
//! ```

use crate::bridge::EventCategory;
use crate::error::{ViewError, ViewResult};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Configuration for an [`EsView`](crate::EsView)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewConfig {
    /// Names of the page's posting channels
    #[serde(default)]
    pub channels: ChannelNames,

    /// Event bus settings
    #[serde(default)]
    pub bridge: BridgeConfig,

    /// Logging settings
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl ViewConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse configuration from TOML text
    pub fn from_toml_str(text: &str) -> ViewResult<Self> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file
    pub fn from_file(path: impl AsRef<Path>) -> ViewResult<Self> {
        let text = std::fs::read_to_string(path.as_ref()).map_err(|e| {
            ViewError::config(format!("failed to read {}: {e}", path.as_ref().display()))
        })?;
        Self::from_toml_str(&text)
    }

    /// Set the channel names
    pub fn channels(mut self, channels: ChannelNames) -> Self {
        self.channels = channels;
        self
    }

    /// Set the broadcast buffer for ongoing subscribers
    pub fn subscription_capacity(mut self, capacity: usize) -> Self {
        self.bridge.subscription_capacity = capacity.max(1);
        self
    }

    /// Include evaluated source text in trace logs
    pub fn log_sources(mut self, enabled: bool) -> Self {
        self.logging.log_sources = enabled;
        self
    }

    /// Check that channel names are usable
    pub fn validate(&self) -> ViewResult<()> {
        let ChannelNames {
            message,
            prompt,
            request,
        } = &self.channels;

        if message.is_empty() || prompt.is_empty() || request.is_empty() {
            return Err(ViewError::config("channel names must not be empty"));
        }
        if message == prompt || message == request || prompt == request {
            return Err(ViewError::config("channel names must be distinct"));
        }
        if self.bridge.subscription_capacity == 0 {
            return Err(ViewError::config("subscription_capacity must be at least 1"));
        }
        Ok(())
    }
}

/// Channel names the page posts on, one per event category
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChannelNames {
    pub message: String,
    pub prompt: String,
    pub request: String,
}

impl Default for ChannelNames {
    fn default() -> Self {
        Self {
            message: "esviewMessage".to_string(),
            prompt: "esviewPrompt".to_string(),
            request: "esviewRequest".to_string(),
        }
    }
}

impl ChannelNames {
    /// Map a channel name to its category
    pub fn category_of(&self, channel: &str) -> Option<EventCategory> {
        if channel == self.message {
            Some(EventCategory::Message)
        } else if channel == self.prompt {
            Some(EventCategory::Prompt)
        } else if channel == self.request {
            Some(EventCategory::Request)
        } else {
            None
        }
    }

    /// Get the channel name for a category
    pub fn name_for(&self, category: EventCategory) -> &str {
        match category {
            EventCategory::Message => &self.message,
            EventCategory::Prompt => &self.prompt,
            EventCategory::Request => &self.request,
        }
    }
}

/// Event bus configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BridgeConfig {
    /// Broadcast buffer for ongoing subscribers; slow subscribers lag past it
    #[serde(default = "default_subscription_capacity")]
    pub subscription_capacity: usize,
}

fn default_subscription_capacity() -> usize {
    64
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            subscription_capacity: default_subscription_capacity(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Include evaluated source text in trace logs
    #[serde(default)]
    pub log_sources: bool,
}
