use anyhow::{Context, Result};
use async_trait::async_trait;
use std::time::Duration;
use tracing::{debug, warn};

use crate::credentials::Credential;

use super::{Completion, Endpoints, Gateway, ProviderError, build_request, extract_text};

/// A gateway that calls the real provider APIs over HTTPS.
pub struct HttpGateway {
    client: reqwest::Client,
    endpoints: Endpoints,
}

impl HttpGateway {
    pub fn new(endpoints: Endpoints, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("failed to build HTTP client")?;
        Ok(Self { client, endpoints })
    }

    /// POST the completion and fail on any non-2xx status.
    async fn send(
        &self,
        credential: &Credential,
        completion: &Completion,
    ) -> Result<reqwest::Response> {
        let request = build_request(&self.endpoints, credential, completion)?;
        debug!(
            provider = %credential.provider,
            url = %request.url,
            model = %request.body.model,
            max_tokens = request.body.max_tokens,
            "calling provider"
        );

        let mut req = self.client.post(&request.url);
        for (name, value) in &request.headers {
            req = req.header(*name, value);
        }

        let resp = req.json(&request.body).send().await?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = match resp.text().await {
                Ok(body) => body,
                Err(e) => {
                    debug!(provider = %credential.provider, "could not read error body: {e}");
                    format!("HTTP {status}")
                }
            };
            warn!(
                provider = %credential.provider,
                status = status.as_u16(),
                "provider rejected the call"
            );
            return Err(ProviderError::Status {
                status: status.as_u16(),
                body,
            }
            .into());
        }

        Ok(resp)
    }
}

#[async_trait]
impl Gateway for HttpGateway {
    async fn complete(&self, credential: &Credential, completion: &Completion) -> Result<String> {
        let resp = self.send(credential, completion).await?;
        let raw = resp
            .text()
            .await
            .context("failed to read provider response")?;
        extract_text(credential.provider, &raw)
    }

    // The body of a probe reply is never read, so a 2xx is enough.
    async fn probe(&self, credential: &Credential) -> Result<()> {
        self.send(credential, &Completion::probe()).await?;
        Ok(())
    }
}
