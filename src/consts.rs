//! Project-wide constants.

pub const AUTHOR: &str = env!("CARGO_PKG_AUTHORS");
pub const HOMEPAGE: &str = env!("CARGO_PKG_HOMEPAGE");
pub const REPO: &str = env!("CARGO_PKG_REPOSITORY");

/// Default listen address for the HTTP server.
pub const DEFAULT_BIND: &str = "127.0.0.1:3000";

/// Hosted OpenAI chat completions endpoint.
pub const OPENAI_URL: &str = "https://api.openai.com/v1/chat/completions";

/// Hosted Anthropic messages endpoint.
pub const ANTHROPIC_URL: &str = "https://api.anthropic.com/v1/messages";

/// Value sent in the `anthropic-version` header.
pub const ANTHROPIC_VERSION: &str = "2023-06-01";

/// Model used for OpenAI-shaped providers (openai, custom) when none is set.
pub const DEFAULT_OPENAI_MODEL: &str = "gpt-3.5-turbo";

/// Model used for Anthropic when none is set.
pub const DEFAULT_ANTHROPIC_MODEL: &str = "claude-3-sonnet-20240229";

/// Token ceiling for reasoning and final-answer calls.
pub const REASONING_MAX_TOKENS: u32 = 1000;

/// Sampling temperature for OpenAI-shaped reasoning calls.
pub const REASONING_TEMPERATURE: f64 = 0.7;

/// Token ceiling for the connection test sent before saving a credential.
pub const PROBE_MAX_TOKENS: u32 = 5;

/// Prompt used for the connection test.
pub const PROBE_PROMPT: &str = "Hello";

/// Pause between streamed reasoning steps, in milliseconds.
pub const DEFAULT_STEP_DELAY_MS: u64 = 1500;

/// Maximum number of model-derived steps appended after the two fixed ones.
pub const DEFAULT_MAX_MODEL_STEPS: usize = 4;

/// Timeout for a single provider HTTP call, in seconds.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 120;

/// Masked key prefix shown in place of the secret part of an API key.
pub const KEY_MASK: &str = "****";
