//! Default provider for standard OpenAI-compatible APIs

use super::{
    effective_base_url, ClientOptions, CompatibleClient, HeaderSet, OpenAICompatibleProvider,
    VendorKind, API_KEY_HEADER, USER_AGENT_HEADER,
};
use crate::config::{ContentGeneratorConfig, HostContext, PRODUCT_NAME};
use crate::error::Result;
use async_openai::types::CreateChatCompletionRequest;
use indexmap::IndexMap;

const API_VERSION_QUERY: &str = "api-version";

/// Provider for OpenAI-compatible endpoints, with Azure deployment support
#[derive(Debug, Clone)]
pub struct DefaultProvider {
    config: ContentGeneratorConfig,
    host: HostContext,
}

impl DefaultProvider {
    pub fn new(config: ContentGeneratorConfig, host: HostContext) -> Self {
        Self { config, host }
    }

    pub fn config(&self) -> &ContentGeneratorConfig {
        &self.config
    }

    pub fn host(&self) -> &HostContext {
        &self.host
    }

    /// Resolve everything `build_client` passes to the client
    pub fn client_options(&self) -> ClientOptions {
        let api_key = self.config.api_key.clone();
        let base_url = self.config.base_url.as_deref().unwrap_or_default();
        let vendor = VendorKind::detect(Some(base_url));

        let base_url = effective_base_url(vendor, base_url, self.config.model.as_deref());

        let mut headers = self.build_headers();
        let mut default_query = None;

        if vendor == VendorKind::AzureCompatible {
            // Bearer auth is still sent; Azure reads `api-key`
            headers.insert(API_KEY_HEADER, api_key.clone());

            if let Some(api_version) = &self.host.api_version {
                default_query = Some(IndexMap::from([(
                    API_VERSION_QUERY.to_string(),
                    api_version.clone(),
                )]));
            }
        }

        tracing::debug!(
            vendor = vendor.as_str(),
            base_url = %base_url,
            has_default_query = default_query.is_some(),
            "resolved client options"
        );

        ClientOptions {
            vendor,
            api_key,
            base_url: (!base_url.is_empty()).then_some(base_url),
            timeout_ms: self.config.timeout_or_default(),
            max_retries: self.config.max_retries_or_default(),
            headers,
            default_query,
        }
    }
}

impl OpenAICompatibleProvider for DefaultProvider {
    fn build_headers(&self) -> HeaderSet {
        let version = self
            .host
            .version
            .as_deref()
            .filter(|v| !v.is_empty())
            .unwrap_or("unknown");
        let user_agent = format!(
            "{}/{} ({}; {})",
            PRODUCT_NAME, version, self.host.platform, self.host.arch
        );

        HeaderSet::new().with(USER_AGENT_HEADER, Some(user_agent))
    }

    fn build_client(&self) -> Result<CompatibleClient> {
        CompatibleClient::new(self.client_options())
    }

    fn build_request(
        &self,
        request: &CreateChatCompletionRequest,
        _prompt_id: &str,
    ) -> CreateChatCompletionRequest {
        request.clone()
    }
}
