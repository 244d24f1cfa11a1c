use anyhow::{Result, bail};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;

use crate::credentials::Credential;

use super::{Completion, Gateway, ProviderError};

/// What the mock does on its next call.
#[derive(Debug, Clone)]
pub enum Reply {
    Text(String),
    /// A provider-side rejection (non-2xx).
    Rejected(String),
    /// A transport-level failure.
    Fail(String),
    /// Panic inside the call, as a buggy gateway would.
    Panic,
}

/// A scripted gateway for tests. Returns pre-defined replies in order and
/// records every completion it was asked for.
pub struct MockGateway {
    replies: Mutex<VecDeque<Reply>>,
    seen: Mutex<Vec<Completion>>,
}

impl MockGateway {
    pub fn new(replies: Vec<Reply>) -> Self {
        Self {
            replies: Mutex::new(replies.into()),
            seen: Mutex::new(Vec::new()),
        }
    }

    /// Convenience for the common case of plain text replies.
    pub fn texts<I, S>(texts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(texts.into_iter().map(|t| Reply::Text(t.into())).collect())
    }

    /// Every completion received so far, in call order.
    pub fn completions(&self) -> Vec<Completion> {
        self.seen.lock().unwrap().clone()
    }

    pub fn calls(&self) -> usize {
        self.seen.lock().unwrap().len()
    }
}

#[async_trait]
impl Gateway for MockGateway {
    async fn complete(&self, _credential: &Credential, completion: &Completion) -> Result<String> {
        let call = {
            let mut seen = self.seen.lock().unwrap();
            seen.push(completion.clone());
            seen.len()
        };
        let reply = self.replies.lock().unwrap().pop_front();
        match reply {
            Some(Reply::Text(text)) => Ok(text),
            Some(Reply::Rejected(body)) => Err(ProviderError::Status { status: 401, body }.into()),
            Some(Reply::Fail(message)) => bail!(message),
            Some(Reply::Panic) => panic!("MockGateway: scripted panic"),
            None => bail!("MockGateway: no more replies (called {} times)", call),
        }
    }
}
