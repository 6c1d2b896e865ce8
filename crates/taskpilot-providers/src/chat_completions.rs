use std::time::Instant;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{Value, json};

use taskpilot_core::{
    Context, Error, ModelProvider, ProviderConfig, ProviderKind, Query, Response, Result,
    TokenUsage,
};

/// Maximum completion length requested from the service.
const MAX_TOKENS: u32 = 2048;

/// Provider for OpenAI-compatible chat-completions endpoints.
///
/// Covers OpenAI, GitHub Models, and Azure AI Inference, which share the
/// request and response shape but differ in URL and auth header.
pub struct ChatCompletionsProvider {
    /// HTTP client for API requests.
    client: Client,
    /// Which service this talks to.
    kind: ProviderKind,
    /// Chat-completions URL.
    endpoint: String,
    /// API key or token.
    api_key: String,
    /// Model name to use.
    model: String,
}

impl ChatCompletionsProvider {
    /// Creates a provider for `kind` with the given API key and the service defaults.
    ///
    /// # Errors
    /// Returns an error if the API key is empty or the kind has no built-in endpoint.
    pub fn new(kind: ProviderKind, api_key: String) -> Result<Self> {
        if api_key.is_empty() {
            return Err(Error::MissingApiKey(kind.env_var().to_owned()));
        }
        let endpoint = kind
            .default_endpoint()
            .ok_or_else(|| Error::Config(format!("provider '{kind}' requires an endpoint")))?
            .to_owned();

        Ok(Self {
            client: Client::default(),
            kind,
            endpoint,
            api_key,
            model: kind.default_model().to_owned(),
        })
    }

    /// Creates a provider from configuration, reading the key from config or environment.
    ///
    /// # Errors
    /// Returns an error if no API key is available or the endpoint is missing.
    pub fn from_config(config: &ProviderConfig) -> Result<Self> {
        let api_key = config.resolve_api_key().ok_or_else(|| {
            Error::MissingApiKey(format!(
                "{} or [provider].api_key in config.toml",
                config.kind.env_var()
            ))
        })?;
        let endpoint = config.endpoint_url()?;
        let client = Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(Error::Request)?;

        Ok(Self {
            client,
            kind: config.kind,
            endpoint,
            api_key,
            model: config.model_name(),
        })
    }

    /// Builds the message list: optional system persona, then the prompt.
    fn build_messages(context: &Context, query: &Query) -> Vec<Value> {
        let mut messages = Vec::with_capacity(2);
        if !context.system_prompt.is_empty() {
            messages.push(json!({
                "role": "system",
                "content": context.system_prompt
            }));
        }
        messages.push(json!({
            "role": "user",
            "content": query.text
        }));
        messages
    }

    /// Name and value of the header carrying the credential.
    fn auth_header(&self) -> (&'static str, String) {
        match self.kind {
            ProviderKind::AzureInference => ("api-key", self.api_key.clone()),
            ProviderKind::OpenAi | ProviderKind::GithubModels => {
                ("Authorization", format!("Bearer {}", self.api_key))
            }
        }
    }
}

/// Response payload returned by a chat-completions endpoint.
#[derive(Deserialize)]
struct ChatResponse {
    /// List of generated choices.
    choices: Vec<Choice>,
    /// Optional token usage statistics returned by the service.
    usage: Option<Usage>,
}

/// Individual completion choice.
#[derive(Deserialize)]
struct Choice {
    /// Message payload representing the completion text.
    message: Message,
}

/// Message structure containing generated content.
#[derive(Deserialize)]
struct Message {
    /// Text content produced by the model.
    #[serde(default)]
    content: Option<String>,
}

/// Token accounting information for a response.
#[derive(Deserialize)]
struct Usage {
    /// Number of prompt tokens billed for the request.
    prompt_tokens: u64,
    /// Number of completion tokens returned by the model.
    completion_tokens: u64,
}

#[async_trait]
impl ModelProvider for ChatCompletionsProvider {
    fn name(&self) -> &'static str {
        match self.kind {
            ProviderKind::OpenAi => "openai",
            ProviderKind::GithubModels => "github_models",
            ProviderKind::AzureInference => "azure_inference",
        }
    }

    async fn is_available(&self) -> bool {
        !self.api_key.is_empty()
    }

    async fn generate(&self, query: &Query, context: &Context) -> Result<Response> {
        let start = Instant::now();

        let request_body = json!({
            "model": self.model,
            "messages": Self::build_messages(context, query),
            "max_tokens": MAX_TOKENS,
            "temperature": 0.2,
        });

        let (header_name, header_value) = self.auth_header();
        tracing::debug!(
            "Sending {} byte prompt to {} ({})",
            query.text.len(),
            self.name(),
            self.model
        );

        let response = self
            .client
            .post(&self.endpoint)
            .header(header_name, header_value)
            .header("Content-Type", "application/json")
            .json(&request_body)
            .send()
            .await
            .map_err(|err| Error::Provider(format!("Request failed: {err}")))?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(Error::ProviderStatus {
                provider: self.name().to_owned(),
                status: status.as_u16(),
                message,
            });
        }

        let api_response: ChatResponse = response
            .json()
            .await
            .map_err(|err| Error::Provider(format!("Failed to parse response: {err}")))?;

        let text = api_response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| Error::Provider(format!("No completion from {}", self.name())))?;

        let tokens_used = api_response
            .usage
            .map(|usage| TokenUsage {
                input: usage.prompt_tokens,
                output: usage.completion_tokens,
            })
            .unwrap_or_default();

        Ok(Response {
            text,
            tokens_used,
            provider: self.name().to_owned(),
            latency_ms: start.elapsed().as_millis() as u64,
        })
    }
}
