pub mod store;

pub use store::CredentialStore;

use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::consts::KEY_MASK;
use crate::provider::Provider;

/// An API credential for one provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Credential {
    pub id: String,
    pub provider: Provider,
    pub api_key: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model_name: Option<String>,
    pub is_active: bool,
    pub created_at: String,
    pub updated_at: String,
}

impl Credential {
    /// Build a fresh, active credential stamped with the current time.
    pub fn new(
        provider: Provider,
        api_key: String,
        api_url: Option<String>,
        model_name: Option<String>,
    ) -> Self {
        let now = Utc::now();
        let stamp = now.to_rfc3339_opts(SecondsFormat::Millis, true);
        Self {
            id: now.timestamp_millis().to_string(),
            provider,
            api_key,
            api_url,
            model_name,
            is_active: true,
            created_at: stamp.clone(),
            updated_at: stamp,
        }
    }

    /// A copy safe to hand to clients: the key keeps only its last four characters.
    pub fn mask(&self) -> Self {
        Self {
            api_key: mask_key(&self.api_key),
            ..self.clone()
        }
    }
}

/// `"****"` followed by the last four characters of the key.
pub fn mask_key(key: &str) -> String {
    let count = key.chars().count();
    let tail: String = key.chars().skip(count.saturating_sub(4)).collect();
    format!("{KEY_MASK}{tail}")
}
