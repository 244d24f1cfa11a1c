//! Cogito: store LLM provider credentials, then stream a staged
//! chain-of-thought trace and a final answer over HTTP.
//!
//! - [`credentials`] keeps the in-memory, per-provider credential list.
//! - [`provider`] turns a completion into one provider HTTP call.
//! - [`reasoning`] drafts steps, paces them out, and asks for the answer.
//! - [`prompts`] holds the fixed prompt templates.
//! - [`server`] exposes the JSON and event-stream routes plus the UI page.

pub mod banner;
pub mod config;
pub mod consts;
pub mod credentials;
pub mod prompts;
pub mod provider;
pub mod reasoning;
pub mod server;
