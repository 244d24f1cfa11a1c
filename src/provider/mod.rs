pub mod http;
pub mod mock;

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::consts::{
    ANTHROPIC_URL, ANTHROPIC_VERSION, DEFAULT_ANTHROPIC_MODEL, DEFAULT_OPENAI_MODEL, OPENAI_URL,
    PROBE_MAX_TOKENS, PROBE_PROMPT, REASONING_MAX_TOKENS, REASONING_TEMPERATURE,
};
use crate::credentials::Credential;

/// The fixed set of LLM APIs a credential can point at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    /// OpenAI chat completions.
    OpenAi,
    /// Anthropic messages.
    Anthropic,
    /// Any OpenAI-compatible endpoint supplied by the user.
    Custom,
}

impl Provider {
    pub fn as_str(&self) -> &'static str {
        match self {
            Provider::OpenAi => "openai",
            Provider::Anthropic => "anthropic",
            Provider::Custom => "custom",
        }
    }

    /// Model used when neither the request nor the credential names one.
    pub fn default_model(&self) -> &'static str {
        match self {
            Provider::Anthropic => DEFAULT_ANTHROPIC_MODEL,
            Provider::OpenAi | Provider::Custom => DEFAULT_OPENAI_MODEL,
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Provider {
    type Err = ProviderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "openai" => Ok(Provider::OpenAi),
            "anthropic" => Ok(Provider::Anthropic),
            "custom" => Ok(Provider::Custom),
            other => Err(ProviderError::Unsupported(other.to_string())),
        }
    }
}

/// Failures the gateway can name precisely. Anything else (DNS, TLS,
/// timeouts) surfaces as a plain transport error.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("Unsupported provider: {0}")]
    Unsupported(String),
    #[error("API URL is required for custom provider")]
    MissingUrl,
    #[error("API call failed: {body}")]
    Status { status: u16, body: String },
}

/// Where the hosted providers live. Custom providers carry their own URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    pub openai: String,
    pub anthropic: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            openai: OPENAI_URL.to_string(),
            anthropic: ANTHROPIC_URL.to_string(),
        }
    }
}

/// One prompt sent to a model.
#[derive(Debug, Clone, PartialEq)]
pub struct Completion {
    pub prompt: String,
    /// Explicit model override; falls back to the credential, then the provider default.
    pub model: Option<String>,
    pub max_tokens: u32,
    /// Only sent to OpenAI-shaped providers.
    pub temperature: Option<f64>,
}

impl Completion {
    /// A full-size reasoning or final-answer call.
    pub fn reasoning(prompt: impl Into<String>, model: Option<String>) -> Self {
        Self {
            prompt: prompt.into(),
            model,
            max_tokens: REASONING_MAX_TOKENS,
            temperature: Some(REASONING_TEMPERATURE),
        }
    }

    /// The tiny call used to check a credential before it is saved.
    pub fn probe() -> Self {
        Self {
            prompt: PROBE_PROMPT.to_string(),
            model: None,
            max_tokens: PROBE_MAX_TOKENS,
            temperature: None,
        }
    }
}

/// A single chat message in a provider request body.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Message {
    pub role: String,
    pub content: String,
}

/// JSON body shared by every provider: both APIs accept the same shape.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RequestBody {
    pub model: String,
    pub messages: Vec<Message>,
    pub max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
}

/// A fully resolved provider call, ready to hand to an HTTP client.
#[derive(Debug, Clone, PartialEq)]
pub struct ProviderRequest {
    pub url: String,
    pub headers: Vec<(&'static str, String)>,
    pub body: RequestBody,
}

impl ProviderRequest {
    /// Look up a header value by (lowercase) name.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

/// Pick the model for a call: request, then credential, then provider default.
pub fn resolve_model<'a>(credential: &'a Credential, requested: Option<&'a str>) -> &'a str {
    requested
        .filter(|m| !m.trim().is_empty())
        .or_else(|| {
            credential
                .model_name
                .as_deref()
                .filter(|m| !m.trim().is_empty())
        })
        .unwrap_or_else(|| credential.provider.default_model())
}

/// The endpoint of a custom credential; it has no default.
fn custom_url(credential: &Credential) -> Result<&str, ProviderError> {
    credential
        .api_url
        .as_deref()
        .map(str::trim)
        .filter(|u| !u.is_empty())
        .ok_or(ProviderError::MissingUrl)
}

/// Map a credential and a completion onto the provider's URL, headers and body.
pub fn build_request(
    endpoints: &Endpoints,
    credential: &Credential,
    completion: &Completion,
) -> Result<ProviderRequest, ProviderError> {
    let bearer = format!("Bearer {}", credential.api_key);
    let mut headers = vec![("content-type", "application/json".to_string())];

    let url = match credential.provider {
        Provider::OpenAi => {
            headers.push(("authorization", bearer));
            endpoints.openai.clone()
        }
        Provider::Anthropic => {
            headers.push(("x-api-key", credential.api_key.clone()));
            headers.push(("anthropic-version", ANTHROPIC_VERSION.to_string()));
            endpoints.anthropic.clone()
        }
        Provider::Custom => {
            let url = custom_url(credential)?;
            headers.push(("authorization", bearer));
            url.to_string()
        }
    };

    let temperature = match credential.provider {
        Provider::Anthropic => None,
        Provider::OpenAi | Provider::Custom => completion.temperature,
    };

    Ok(ProviderRequest {
        url,
        headers,
        body: RequestBody {
            model: resolve_model(credential, completion.model.as_deref()).to_string(),
            messages: vec![Message {
                role: "user".to_string(),
                content: completion.prompt.clone(),
            }],
            max_tokens: completion.max_tokens,
            temperature,
        },
    })
}

/// Pull the generated text out of a provider's JSON reply.
/// Missing fields yield an empty string; only invalid JSON is an error.
pub fn extract_text(provider: Provider, raw: &str) -> Result<String> {
    match provider {
        Provider::Anthropic => {
            let reply: AnthropicReply =
                serde_json::from_str(raw).context("provider returned invalid JSON")?;
            Ok(reply
                .content
                .unwrap_or_default()
                .into_iter()
                .filter(|block| block.content_type.as_deref() == Some("text"))
                .filter_map(|block| block.text)
                .collect::<String>())
        }
        Provider::OpenAi | Provider::Custom => {
            let reply: ChatReply =
                serde_json::from_str(raw).context("provider returned invalid JSON")?;
            Ok(reply
                .choices
                .unwrap_or_default()
                .into_iter()
                .next()
                .and_then(|choice| choice.message)
                .and_then(|message| message.content)
                .unwrap_or_default())
        }
    }
}

#[derive(Deserialize)]
struct AnthropicReply {
    content: Option<Vec<ContentBlock>>,
}

#[derive(Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    content_type: Option<String>,
    text: Option<String>,
}

#[derive(Deserialize)]
struct ChatReply {
    choices: Option<Vec<Choice>>,
}

#[derive(Deserialize)]
struct Choice {
    message: Option<ChoiceMessage>,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

/// Sends completions to an LLM provider. Could be HTTP, or a script in tests.
#[async_trait]
pub trait Gateway: Send + Sync {
    async fn complete(&self, credential: &Credential, completion: &Completion) -> Result<String>;

    /// Check that the credential is accepted. Only success matters, not the text.
    async fn probe(&self, credential: &Credential) -> Result<()> {
        self.complete(credential, &Completion::probe()).await?;
        Ok(())
    }
}

/// Probe a credential and turn any failure into the message shown to the user.
pub async fn test_connection(
    gateway: &dyn Gateway,
    credential: &Credential,
) -> std::result::Result<(), String> {
    if credential.provider == Provider::Custom {
        custom_url(credential).map_err(|err| err.to_string())?;
    }
    match gateway.probe(credential).await {
        Ok(()) => Ok(()),
        Err(err) => Err(match err.downcast_ref::<ProviderError>() {
            Some(ProviderError::Status { body, .. }) => format!("API test failed: {body}"),
            Some(other) => other.to_string(),
            None => format!("Connection test failed: {err:#}"),
        }),
    }
}
