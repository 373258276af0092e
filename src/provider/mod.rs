//! LLM Provider layer
//!
//! Builds clients for any API implementing the OpenAI chat completions spec.
//! Azure-hosted deployments get their base URL rewritten and an `api-key`
//! header; everything else passes through untouched.

mod client;
mod default;
mod endpoint;
mod headers;

pub use client::*;
pub use default::*;
pub use endpoint::*;
pub use headers::*;

use crate::error::Result;
use async_openai::types::CreateChatCompletionRequest;

/// Capabilities shared by every OpenAI-compatible provider
///
/// Callers hold a provider behind this trait so vendor-specific
/// implementations can be swapped in without touching call sites.
pub trait OpenAICompatibleProvider: Send + Sync {
    /// Headers sent with every request
    fn build_headers(&self) -> HeaderSet;

    /// Build a fresh client; the caller owns it
    fn build_client(&self) -> Result<CompatibleClient>;

    /// Adjust a request before it is sent
    ///
    /// `prompt_id` correlates the request with the user prompt that caused it.
    fn build_request(
        &self,
        request: &CreateChatCompletionRequest,
        prompt_id: &str,
    ) -> CreateChatCompletionRequest;
}
