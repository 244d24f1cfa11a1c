use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::header;
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::response::{Html, IntoResponse};
use futures::StreamExt;
use serde::{Deserialize, Serialize};
use tokio_stream::wrappers::ReceiverStream;
use tracing::{info, warn};

use super::AppState;
use super::error::ApiError;
use crate::credentials::Credential;
use crate::provider::{Provider, test_connection};
use crate::reasoning::Query;

const INDEX_HTML: &str = include_str!("index.html");

/// `{"success": true, "data": ...}`
#[derive(Debug, Serialize)]
pub struct Envelope<T> {
    pub success: bool,
    pub data: T,
}

fn ok<T: Serialize>(data: T) -> Json<Envelope<T>> {
    Json(Envelope {
        success: true,
        data,
    })
}

/// Treat missing and blank strings alike.
fn present(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveCredentialRequest {
    pub provider: Option<String>,
    pub api_key: Option<String>,
    pub api_url: Option<String>,
    pub model_name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ChainOfThoughtRequest {
    pub query: Option<String>,
    pub signature: Option<String>,
    pub provider: Option<String>,
    pub model: Option<String>,
}

pub async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

pub async fn list_credentials(State(state): State<AppState>) -> Json<Envelope<Vec<Credential>>> {
    ok(state.credentials.masked().await)
}

/// Validate, test against the provider, then store. Replies with the masked record.
pub async fn save_credential(
    State(state): State<AppState>,
    payload: Result<Json<SaveCredentialRequest>, JsonRejection>,
) -> Result<Json<Envelope<Credential>>, ApiError> {
    let Json(body) = payload?;

    let (Some(provider), Some(api_key)) = (present(body.provider), present(body.api_key)) else {
        return Err(ApiError::bad_request("Provider and API key are required"));
    };
    let provider: Provider = provider
        .parse()
        .map_err(|err: crate::provider::ProviderError| ApiError::bad_request(err.to_string()))?;

    let credential = Credential::new(
        provider,
        api_key,
        present(body.api_url),
        present(body.model_name),
    );

    if let Err(message) = test_connection(state.gateway.as_ref(), &credential).await {
        warn!(%provider, "connection test failed: {message}");
        return Err(ApiError::bad_request(message));
    }

    let masked = credential.mask();
    state.credentials.add(credential).await;
    info!(%provider, "credential saved");

    Ok(ok(masked))
}

/// Start a reasoning run and stream its events as `data: {json}` frames.
pub async fn chain_of_thought(
    State(state): State<AppState>,
    payload: Result<Json<ChainOfThoughtRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(body) = payload?;

    let (Some(query), Some(signature), Some(provider)) = (
        present(body.query),
        present(body.signature),
        present(body.provider),
    ) else {
        return Err(ApiError::bad_request(
            "Query, signature, and provider are required",
        ));
    };

    let credential = match provider.parse::<Provider>() {
        Ok(parsed) => state.credentials.find(parsed).await,
        Err(_) => None,
    }
    .ok_or_else(|| {
        ApiError::bad_request(format!(
            "No active credentials found for provider: {provider}"
        ))
    })?;

    info!(provider = %credential.provider, "chain of thought started");

    let query = Query {
        query,
        signature,
        model: present(body.model),
    };
    let events = Arc::clone(&state.reasoner).stream(credential, query);
    let frames = ReceiverStream::new(events).map(|event| Event::default().json_data(event));

    Ok((
        [(header::CACHE_CONTROL, "no-cache")],
        Sse::new(frames).keep_alive(KeepAlive::default()),
    ))
}
