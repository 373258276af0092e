//! Provider inspection CLI
//!
//! Shows the resolved client options for a configuration, or sends a single
//! prompt through the built client.
//!
//! Run with: cargo run --bin provider-info -- --base-url https://foo.azure.com --model gpt-4

use anyhow::{Context, Result};
use async_openai::types::{
    ChatCompletionRequestMessage, ChatCompletionRequestUserMessageArgs,
    CreateChatCompletionRequestArgs,
};
use clap::Parser;
use openai_compat_provider::{
    telemetry, ContentGeneratorConfig, DefaultProvider, HostContext, OpenAICompatibleProvider,
};
use std::path::PathBuf;
use uuid::Uuid;

#[derive(Parser)]
#[command(name = "provider-info")]
#[command(about = "Inspect or exercise an OpenAI-compatible provider", long_about = None)]
struct Cli {
    /// JSON config file (apiKey, baseUrl, model, timeout, maxRetries)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// API key (overrides config and OPENAI_API_KEY)
    #[arg(long)]
    api_key: Option<String>,

    /// Base URL (overrides config and OPENAI_BASE_URL)
    #[arg(long)]
    base_url: Option<String>,

    /// Model or Azure deployment name
    #[arg(short, long)]
    model: Option<String>,

    /// Request timeout in milliseconds
    #[arg(long)]
    timeout: Option<u64>,

    /// Retries for transient failures
    #[arg(long)]
    max_retries: Option<u32>,

    /// Send this prompt and print the reply
    #[arg(short, long)]
    prompt: Option<String>,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Emit logs as JSON
    #[arg(long)]
    json_logs: bool,
}

/// Priority: CLI flags > config file > environment variables
fn build_config(cli: &Cli) -> Result<ContentGeneratorConfig> {
    let mut config = match &cli.config {
        Some(path) => ContentGeneratorConfig::from_json_file(path)?,
        None => ContentGeneratorConfig::from_env(),
    };

    if let Some(key) = &cli.api_key {
        config.api_key = Some(key.clone());
    }
    if let Some(url) = &cli.base_url {
        config.base_url = Some(url.clone());
    }
    if let Some(model) = &cli.model {
        config.model = Some(model.clone());
    }
    if cli.timeout.is_some() {
        config.timeout = cli.timeout;
    }
    if cli.max_retries.is_some() {
        config.max_retries = cli.max_retries;
    }

    Ok(config)
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    telemetry::init(cli.verbose, cli.json_logs);

    let config = build_config(&cli)?;
    let model = config.model.clone().unwrap_or_default();
    let host = HostContext::detect(Some(env!("CARGO_PKG_VERSION").to_string()));
    let provider = DefaultProvider::new(config, host);

    let Some(prompt) = cli.prompt else {
        let options = provider.client_options().redacted();
        println!("{}", serde_json::to_string_pretty(&options)?);
        return Ok(());
    };

    let client = provider.build_client()?;
    let message: ChatCompletionRequestMessage = ChatCompletionRequestUserMessageArgs::default()
        .content(prompt)
        .build()?
        .into();
    let request = CreateChatCompletionRequestArgs::default()
        .model(model)
        .messages(vec![message])
        .build()?;
    let request = provider.build_request(&request, &Uuid::new_v4().to_string());

    let response = client
        .create_chat_completion(request)
        .await
        .context("chat completion failed")?;

    match response.choices.first().and_then(|c| c.message.content.as_deref()) {
        Some(text) => println!("{}", text),
        None => tracing::warn!("response contained no text content"),
    }

    Ok(())
}
