//! Resolved server settings.
//!
//! `main.rs` fills these from CLI flags and environment variables; the
//! library only ever sees the resolved values.

use std::net::SocketAddr;
use std::time::Duration;

use crate::consts::{
    ANTHROPIC_URL, DEFAULT_BIND, DEFAULT_MAX_MODEL_STEPS, DEFAULT_REQUEST_TIMEOUT_SECS,
    DEFAULT_STEP_DELAY_MS, OPENAI_URL,
};
use crate::provider::Endpoints;
use crate::reasoning::ReasoningConfig;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub bind: SocketAddr,
    pub step_delay: Duration,
    pub max_model_steps: usize,
    pub request_timeout: Duration,
    pub openai_url: String,
    pub anthropic_url: String,
    /// Open the UI in a browser once the listener is up.
    pub open_browser: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            bind: DEFAULT_BIND
                .parse()
                .unwrap_or_else(|_| SocketAddr::from(([127, 0, 0, 1], 3000))),
            step_delay: Duration::from_millis(DEFAULT_STEP_DELAY_MS),
            max_model_steps: DEFAULT_MAX_MODEL_STEPS,
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            openai_url: OPENAI_URL.to_string(),
            anthropic_url: ANTHROPIC_URL.to_string(),
            open_browser: false,
        }
    }
}

impl Settings {
    pub fn reasoning(&self) -> ReasoningConfig {
        ReasoningConfig {
            step_delay: self.step_delay,
            max_model_steps: self.max_model_steps,
        }
    }

    pub fn endpoints(&self) -> Endpoints {
        Endpoints {
            openai: self.openai_url.clone(),
            anthropic: self.anthropic_url.clone(),
        }
    }

    /// The URL a browser should open. Wildcard binds are shown as localhost.
    pub fn ui_url(&self) -> String {
        let host = if self.bind.ip().is_unspecified() {
            "localhost".to_string()
        } else {
            self.bind.ip().to_string()
        };
        format!("http://{}:{}/", host, self.bind.port())
    }
}
