//! Vendor detection and base URL normalization

use serde::{Deserialize, Serialize};

/// Host fragment that marks an Azure-hosted deployment
pub const AZURE_HOST_MARKER: &str = ".azure.com";

/// Path segment Azure deployments are addressed under
pub const DEPLOYMENTS_SEGMENT: &str = "/openai/deployments/";

/// Which flavour of OpenAI-compatible endpoint a base URL points at
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VendorKind {
    #[default]
    Default,
    AzureCompatible,
}

impl VendorKind {
    pub fn detect(base_url: Option<&str>) -> Self {
        match base_url {
            Some(url) if !url.is_empty() && url.contains(AZURE_HOST_MARKER) => {
                VendorKind::AzureCompatible
            }
            _ => VendorKind::Default,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            VendorKind::Default => "default",
            VendorKind::AzureCompatible => "azure_compatible",
        }
    }
}

/// Base URL the client should talk to
///
/// Azure base URLs without a deployment path get
/// `/openai/deployments/<model>` appended after dropping one trailing slash.
/// A missing model yields an empty deployment name; it is not validated.
pub fn effective_base_url(vendor: VendorKind, base_url: &str, model: Option<&str>) -> String {
    match vendor {
        VendorKind::AzureCompatible if !base_url.contains(DEPLOYMENTS_SEGMENT) => {
            let trimmed = base_url.strip_suffix('/').unwrap_or(base_url);
            format!("{}{}{}", trimmed, DEPLOYMENTS_SEGMENT, model.unwrap_or_default())
        }
        _ => base_url.to_string(),
    }
}
