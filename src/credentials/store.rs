use tokio::sync::RwLock;

use super::Credential;
use crate::provider::Provider;

/// In-memory credential list, at most one record per provider.
///
/// Insertion order is kept: replacing a provider's record moves it to the end.
#[derive(Debug, Default)]
pub struct CredentialStore {
    credentials: RwLock<Vec<Credential>>,
}

impl CredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a credential, dropping any earlier one for the same provider.
    pub async fn add(&self, credential: Credential) {
        let mut credentials = self.credentials.write().await;
        credentials.retain(|existing| existing.provider != credential.provider);
        credentials.push(credential);
    }

    /// Every credential with its raw key. Internal use only.
    pub async fn full(&self) -> Vec<Credential> {
        self.credentials.read().await.clone()
    }

    /// Every credential with the key masked, safe to return to clients.
    pub async fn masked(&self) -> Vec<Credential> {
        self.credentials
            .read()
            .await
            .iter()
            .map(Credential::mask)
            .collect()
    }

    /// The credential stored for a provider, if any.
    pub async fn find(&self, provider: Provider) -> Option<Credential> {
        self.credentials
            .read()
            .await
            .iter()
            .find(|c| c.provider == provider)
            .cloned()
    }

    pub async fn len(&self) -> usize {
        self.credentials.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.credentials.read().await.is_empty()
    }
}
