//! The staged chain-of-thought pipeline.
//!
//! One provider call drafts the reasoning text, which is split into
//! pseudo-steps and paced out to the client. A second call turns those
//! steps into the final answer.

pub mod signature;

pub use signature::Signature;

use anyhow::{Result, anyhow, bail};
use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinError;
use tracing::{debug, error, info, warn};

use crate::consts::{DEFAULT_MAX_MODEL_STEPS, DEFAULT_STEP_DELAY_MS};
use crate::credentials::Credential;
use crate::prompts::chain_of_thought::{build_answer_prompt, build_reasoning_prompt};
use crate::provider::{Completion, Gateway};

/// Events buffered between the pipeline and a slow client.
const EVENT_BUFFER: usize = 16;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReasoningConfig {
    /// Pause after each emitted step.
    pub step_delay: Duration,
    /// Cap on steps taken from the model's reply.
    pub max_model_steps: usize,
}

impl Default for ReasoningConfig {
    fn default() -> Self {
        Self {
            step_delay: Duration::from_millis(DEFAULT_STEP_DELAY_MS),
            max_model_steps: DEFAULT_MAX_MODEL_STEPS,
        }
    }
}

/// What the user asked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    pub query: String,
    pub signature: String,
    /// Overrides the credential's model for this run.
    pub model: Option<String>,
}

/// A step before it is numbered and stamped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DraftStep {
    pub title: String,
    pub content: String,
}

impl DraftStep {
    fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
        }
    }
}

/// A step as the client sees it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReasoningStep {
    /// 1-based position in the trace.
    pub step: usize,
    pub title: String,
    pub content: String,
    pub timestamp: String,
}

/// One frame of the reasoning stream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum ReasoningEvent {
    Processing {
        step: ReasoningStep,
    },
    Completed {
        #[serde(rename = "finalAnswer")]
        final_answer: String,
    },
    Failed {
        error: String,
    },
}

/// Drives the gateway through the draft and answer calls.
pub struct Reasoner {
    gateway: Arc<dyn Gateway>,
    config: ReasoningConfig,
}

impl Reasoner {
    pub fn new(gateway: Arc<dyn Gateway>, config: ReasoningConfig) -> Self {
        Self { gateway, config }
    }

    /// Two fixed framing steps, then up to `max_model_steps` lines of the
    /// model's reasoning. A failed provider call collapses everything into a
    /// single error step.
    pub async fn draft_steps(&self, credential: &Credential, query: &Query) -> Vec<DraftStep> {
        let signature = Signature::parse(&query.signature);

        let mut steps = vec![
            DraftStep::new(
                "Problem Understanding",
                format!(
                    "Analyzing the query: \"{}\" using signature pattern: {}. The task requires {} output(s): {}.",
                    query.query,
                    query.signature,
                    signature.outputs.len(),
                    signature.outputs_label(),
                ),
            ),
            DraftStep::new(
                "Information Gathering",
                format!(
                    "Breaking down the input components and identifying key information needed to address: {}.",
                    signature.inputs_label(),
                ),
            ),
        ];

        let prompt = build_reasoning_prompt(&query.query, &query.signature);
        let completion = Completion::reasoning(prompt, query.model.clone());

        match self.gateway.complete(credential, &completion).await {
            Ok(text) => {
                steps.extend(split_steps(&text, self.config.max_model_steps));
                steps
            }
            Err(err) => {
                warn!(provider = %credential.provider, "reasoning call failed: {err:#}");
                vec![DraftStep::new(
                    "Error in Processing",
                    format!("Failed to generate reasoning steps: {err:#}"),
                )]
            }
        }
    }

    /// Ask for the final answer. Never fails: problems become the answer text.
    pub async fn final_answer(
        &self,
        credential: &Credential,
        query: &Query,
        steps: &[DraftStep],
    ) -> String {
        let prompt = build_answer_prompt(&query.query, &query.signature, steps);
        let completion = Completion::reasoning(prompt, query.model.clone());

        match self.gateway.complete(credential, &completion).await {
            Ok(text) if !text.trim().is_empty() => text,
            Ok(_) => "Unable to generate final answer".to_string(),
            Err(err) => {
                warn!(provider = %credential.provider, "final answer call failed: {err:#}");
                format!("Error generating final answer: {err:#}")
            }
        }
    }

    /// Run the whole pipeline, pushing events into `sink`.
    ///
    /// Returns an error as soon as the receiver is gone, even mid-pause.
    /// An abandoned stream makes no further provider calls.
    pub async fn run(
        &self,
        credential: &Credential,
        query: &Query,
        sink: &mpsc::Sender<ReasoningEvent>,
    ) -> Result<()> {
        let steps = self.draft_steps(credential, query).await;
        debug!(provider = %credential.provider, steps = steps.len(), "steps drafted");

        for (i, draft) in steps.iter().enumerate() {
            let step = ReasoningStep {
                step: i + 1,
                title: draft.title.clone(),
                content: draft.content.clone(),
                timestamp: now(),
            };
            emit(sink, ReasoningEvent::Processing { step }).await?;

            if !self.config.step_delay.is_zero() {
                tokio::select! {
                    _ = tokio::time::sleep(self.config.step_delay) => {}
                    _ = sink.closed() => bail!("event receiver dropped"),
                }
            }
        }

        if sink.is_closed() {
            bail!("event receiver dropped");
        }
        let final_answer = self.final_answer(credential, query, &steps).await;
        emit(sink, ReasoningEvent::Completed { final_answer }).await?;

        info!(provider = %credential.provider, steps = steps.len(), "reasoning completed");
        Ok(())
    }

    /// Spawn [`Reasoner::run`] and hand back the receiving end. If the run
    /// task dies, a `failed` event takes the place of the remaining frames.
    pub fn stream(
        self: Arc<Self>,
        credential: Credential,
        query: Query,
    ) -> mpsc::Receiver<ReasoningEvent> {
        let (tx, rx) = mpsc::channel(EVENT_BUFFER);

        tokio::spawn(async move {
            let worker_tx = tx.clone();
            let worker =
                tokio::spawn(async move { self.run(&credential, &query, &worker_tx).await });

            match worker.await {
                Ok(Ok(())) => {}
                Ok(Err(err)) => debug!("reasoning stopped early: {err:#}"),
                Err(join_err) => {
                    let reason = failure_reason(join_err);
                    error!("reasoning task died: {reason}");
                    let _ = tx.send(ReasoningEvent::Failed { error: reason }).await;
                }
            }
        });

        rx
    }
}

/// Non-blank, trimmed lines of the model's reply, capped at `limit`.
pub fn split_steps(text: &str, limit: usize) -> Vec<DraftStep> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .take(limit)
        .enumerate()
        .map(|(i, line)| DraftStep::new(format!("Reasoning Step {}", i + 1), line))
        .collect()
}

async fn emit(sink: &mpsc::Sender<ReasoningEvent>, event: ReasoningEvent) -> Result<()> {
    sink.send(event)
        .await
        .map_err(|_| anyhow!("event receiver dropped"))
}

fn now() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn failure_reason(err: JoinError) -> String {
    if err.is_panic() {
        let payload = err.into_panic();
        if let Some(msg) = payload.downcast_ref::<&str>() {
            return (*msg).to_string();
        }
        if let Some(msg) = payload.downcast_ref::<String>() {
            return msg.clone();
        }
    }
    "Processing failed".to_string()
}
