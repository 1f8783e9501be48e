//! Generative-language client for boardmate.
//!
//! This crate owns the single outbound seam to a language-model backend:
//!
//! - **[`client`]** -- Multi-provider [`client::LlmClient`] supporting the
//!   Anthropic Messages API and OpenAI-compatible Chat Completions
//!   endpoints, non-streaming only.
//! - **[`types`]** -- Provider-agnostic message and request types.
//! - **[`error`]** -- Unified error types via [`thiserror`].
//!
//! Consumers that only need one-shot text completion should depend on the
//! [`TextCompleter`] trait rather than the concrete client.

pub mod client;
pub mod error;
pub mod types;

pub use client::{LlmClient, LlmClientConfig, LlmProvider, TextCompleter};
pub use error::{LlmError, Result};
pub use types::{ChatRequest, Message, Role};
