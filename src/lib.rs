//! OpenAI-compatible provider
//!
//! This crate turns a static generator configuration into a ready-to-use
//! chat-completions client:
//! - Request headers (`User-Agent`, plus `api-key` for Azure deployments)
//! - Endpoint normalization for Azure-hosted deployments
//! - A pass-through request hook that vendor providers can override

pub mod config;
pub mod error;
pub mod provider;
pub mod telemetry;

pub use config::{ContentGeneratorConfig, HostContext};
pub use error::ProviderError;
pub use provider::{
    ClientOptions, CompatibleClient, CompatibleConfig, DefaultProvider, HeaderSet,
    OpenAICompatibleProvider, VendorKind,
};
