//! Configuration for the OpenAI-compatible provider

use crate::error::{ProviderError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Product name used in the `User-Agent` header
pub const PRODUCT_NAME: &str = "QwenCode";

/// Request timeout applied when the config does not set one (milliseconds)
pub const DEFAULT_TIMEOUT_MS: u64 = 120_000;

/// Retry count applied when the config does not set one
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// Environment variable holding the Azure `api-version` query value
pub const API_VERSION_ENV: &str = "OPENAI_API_VERSION";

const API_KEY_ENV: &str = "OPENAI_API_KEY";
const BASE_URL_ENV: &str = "OPENAI_BASE_URL";
const MODEL_ENV: &str = "OPENAI_MODEL";

/// Settings for one content generator
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentGeneratorConfig {
    /// API key (sent as Bearer token, and as `api-key` for Azure)
    #[serde(default, alias = "apiKey")]
    pub api_key: Option<String>,

    /// Base URL for the API (e.g. "https://api.openai.com/v1")
    #[serde(default, alias = "baseUrl")]
    pub base_url: Option<String>,

    /// Model name; doubles as the deployment name for Azure
    #[serde(default)]
    pub model: Option<String>,

    /// Request timeout in milliseconds
    #[serde(default)]
    pub timeout: Option<u64>,

    /// Maximum retries for transient failures
    #[serde(default, alias = "maxRetries")]
    pub max_retries: Option<u32>,
}

impl ContentGeneratorConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load config from the environment (and a `.env` file, if present)
    pub fn from_env() -> Self {
        let _ = dotenvy::dotenv();

        Self {
            api_key: non_empty_var(API_KEY_ENV),
            base_url: non_empty_var(BASE_URL_ENV),
            model: non_empty_var(MODEL_ENV),
            timeout: None,
            max_retries: None,
        }
    }

    /// Load config from a JSON file
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            ProviderError::Config(format!("Failed to read {}: {}", path.display(), e))
        })?;

        serde_json::from_str(&content).map_err(|e| {
            ProviderError::Config(format!("Failed to parse {}: {}", path.display(), e))
        })
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn with_timeout(mut self, timeout_ms: u64) -> Self {
        self.timeout = Some(timeout_ms);
        self
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = Some(max_retries);
        self
    }

    /// Effective timeout in milliseconds
    pub fn timeout_or_default(&self) -> u64 {
        self.timeout.unwrap_or(DEFAULT_TIMEOUT_MS)
    }

    /// Effective retry count
    pub fn max_retries_or_default(&self) -> u32 {
        self.max_retries.unwrap_or(DEFAULT_MAX_RETRIES)
    }
}

/// Facts about the host process that end up on the wire
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostContext {
    /// Version of the calling tool, if known
    pub version: Option<String>,
    /// Platform identifier ("linux", "darwin", "win32", ...)
    pub platform: String,
    /// Architecture identifier ("x64", "arm64", ...)
    pub arch: String,
    /// Value of `OPENAI_API_VERSION`, if set
    pub api_version: Option<String>,
}

impl HostContext {
    /// Describe the running process
    ///
    /// Reads `OPENAI_API_VERSION` once; later changes to the environment are
    /// not observed.
    pub fn detect(version: Option<String>) -> Self {
        Self {
            version,
            platform: platform_id(std::env::consts::OS).to_string(),
            arch: arch_id(std::env::consts::ARCH).to_string(),
            api_version: non_empty_var(API_VERSION_ENV),
        }
    }

    pub fn with_api_version(mut self, api_version: impl Into<String>) -> Self {
        self.api_version = Some(api_version.into());
        self
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.is_empty())
}

// Identifiers follow the Node.js `process.platform` / `process.arch` names so
// the User-Agent matches other clients of the same product.
fn platform_id(os: &str) -> &str {
    match os {
        "macos" => "darwin",
        "windows" => "win32",
        other => other,
    }
}

fn arch_id(arch: &str) -> &str {
    match arch {
        "x86_64" => "x64",
        "aarch64" => "arm64",
        "x86" => "ia32",
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use tempfile::TempDir;

    // Tests run concurrently; anything touching process env takes this lock
    static ENV_LOCK: Mutex<()> = Mutex::new(());

    /// Sets or removes a variable, restoring the previous value on drop
    struct EnvGuard {
        key: &'static str,
        previous: Option<String>,
    }

    impl EnvGuard {
        fn set(key: &'static str, value: &str) -> Self {
            let previous = std::env::var(key).ok();
            std::env::set_var(key, value);
            Self { key, previous }
        }

        fn remove(key: &'static str) -> Self {
            let previous = std::env::var(key).ok();
            std::env::remove_var(key);
            Self { key, previous }
        }
    }

    impl Drop for EnvGuard {
        fn drop(&mut self) {
            match &self.previous {
                Some(v) => std::env::set_var(self.key, v),
                None => std::env::remove_var(self.key),
            }
        }
    }

    #[test]
    fn test_defaults_apply_when_unset() {
        let config = ContentGeneratorConfig::new();
        assert_eq!(config.timeout_or_default(), DEFAULT_TIMEOUT_MS);
        assert_eq!(config.max_retries_or_default(), DEFAULT_MAX_RETRIES);

        let config = config.with_timeout(5_000).with_max_retries(0);
        assert_eq!(config.timeout_or_default(), 5_000);
        assert_eq!(config.max_retries_or_default(), 0);
    }

    #[test]
    fn test_load_json_with_camel_case_keys() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("generator.json");
        std::fs::write(
            &path,
            r#"{
                "apiKey": "sk-test",
                "baseUrl": "https://foo.azure.com",
                "model": "gpt-4",
                "maxRetries": 1
            }"#,
        )
        .unwrap();

        let config = ContentGeneratorConfig::from_json_file(&path).unwrap();
        assert_eq!(config.api_key.as_deref(), Some("sk-test"));
        assert_eq!(config.base_url.as_deref(), Some("https://foo.azure.com"));
        assert_eq!(config.model.as_deref(), Some("gpt-4"));
        assert_eq!(config.timeout, None);
        assert_eq!(config.max_retries, Some(1));
    }

    #[test]
    fn test_load_missing_file_is_config_error() {
        let temp = TempDir::new().unwrap();
        let err =
            ContentGeneratorConfig::from_json_file(&temp.path().join("nope.json")).unwrap_err();
        assert!(matches!(err, ProviderError::Config(_)));
    }

    #[test]
    fn test_platform_and_arch_ids() {
        assert_eq!(platform_id("macos"), "darwin");
        assert_eq!(platform_id("windows"), "win32");
        assert_eq!(platform_id("linux"), "linux");
        assert_eq!(arch_id("x86_64"), "x64");
        assert_eq!(arch_id("aarch64"), "arm64");
        assert_eq!(arch_id("riscv64"), "riscv64");
    }

    #[test]
    fn test_detect_fills_platform_and_arch() {
        let _lock = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        let host = HostContext::detect(Some("1.2.3".to_string()));
        assert_eq!(host.version.as_deref(), Some("1.2.3"));
        assert!(!host.platform.is_empty());
        assert!(!host.arch.is_empty());
    }

    #[test]
    fn test_detect_reads_api_version_env() {
        let _lock = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        let _env = EnvGuard::set(API_VERSION_ENV, "2024-05-01");

        let host = HostContext::detect(None);
        assert_eq!(host.api_version.as_deref(), Some("2024-05-01"));
    }

    #[test]
    fn test_detect_treats_empty_api_version_as_unset() {
        let _lock = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());

        let empty = EnvGuard::set(API_VERSION_ENV, "");
        assert_eq!(HostContext::detect(None).api_version, None);
        drop(empty);

        let _unset = EnvGuard::remove(API_VERSION_ENV);
        assert_eq!(HostContext::detect(None).api_version, None);
    }
}
