use super::{ChatMessage, GenerationRequest, LLMConfig, LLMProvider, LLMResponse, LLM};
use crate::error::LlmError;
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

const OPENAI_CHAT_URL: &str = "https://api.openai.com/v1/chat/completions";
const OPENAI_MODELS_URL: &str = "https://api.openai.com/v1/models";
const LMSTUDIO_CHAT_URL: &str = "http://localhost:1234/v1/chat/completions";
const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/models";

fn build_client(config: &LLMConfig, provider: &'static str) -> Result<Client, LlmError> {
    Client::builder()
        .timeout(Duration::from_secs(config.timeout_seconds))
        .build()
        .map_err(|e| transport(provider, e))
}

fn transport(provider: &'static str, error: reqwest::Error) -> LlmError {
    LlmError::Transport {
        provider,
        message: error.to_string(),
    }
}

/// Request body shared by the OpenAI-compatible chat completion endpoints
#[derive(Debug, Serialize)]
struct ChatCompletionRequest {
    model: String,
    messages: Vec<ChatMessage>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatCompletionChoice>,
    usage: Option<ChatCompletionUsage>,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionChoice {
    message: ChatCompletionMessage,
}

/// Reply message; `content` is null for refusals and tool calls
#[derive(Debug, Deserialize)]
struct ChatCompletionMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionUsage {
    total_tokens: u32,
}

/// Send a chat completion and extract the first choice
async fn send_chat_completion(
    provider: &'static str,
    builder: RequestBuilder,
    model: &str,
    request: GenerationRequest,
) -> Result<LLMResponse, LlmError> {
    let body = ChatCompletionRequest {
        model: model.to_string(),
        messages: request.messages,
        max_tokens: request.max_tokens,
        temperature: request.temperature,
    };

    let response = builder
        .json(&body)
        .send()
        .await
        .map_err(|e| transport(provider, e))?;

    if !response.status().is_success() {
        let status = response.status().as_u16();
        let text = response.text().await.unwrap_or_default();
        return Err(LlmError::Status {
            provider,
            status,
            body: text,
        });
    }

    let completion: ChatCompletionResponse =
        response.json().await.map_err(|e| transport(provider, e))?;

    let content = completion
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .ok_or(LlmError::EmptyResponse(provider))?;

    Ok(LLMResponse {
        content,
        tokens_used: completion.usage.map(|u| u.total_tokens),
    })
}

/// LMStudio provider implementation
pub struct LMStudioProvider {
    config: LLMConfig,
    client: Client,
}

impl LMStudioProvider {
    pub fn new(config: LLMConfig) -> Result<Self, LlmError> {
        let client = build_client(&config, "LMStudio")?;
        Ok(Self { config, client })
    }

    fn endpoint(&self) -> &str {
        self.config.endpoint.as_deref().unwrap_or(LMSTUDIO_CHAT_URL)
    }
}

#[async_trait]
impl LLM for LMStudioProvider {
    async fn generate(&self, request: GenerationRequest) -> Result<LLMResponse, LlmError> {
        let endpoint = self.endpoint();
        debug!("Sending request to LMStudio at {}", endpoint);

        send_chat_completion(
            "LMStudio",
            self.client.post(endpoint),
            &self.config.model,
            request,
        )
        .await
    }

    async fn is_available(&self) -> bool {
        let health_endpoint = self.endpoint().replace("/v1/chat/completions", "/health");

        match self.client.get(&health_endpoint).send().await {
            Ok(response) => response.status().is_success(),
            Err(_) => false,
        }
    }

    fn provider_type(&self) -> LLMProvider {
        LLMProvider::LMStudio
    }
}

/// OpenAI provider implementation
pub struct OpenAIProvider {
    config: LLMConfig,
    client: Client,
    api_key: String,
}

impl OpenAIProvider {
    pub fn new(config: LLMConfig) -> Result<Self, LlmError> {
        let api_key = config
            .api_key
            .clone()
            .ok_or_else(|| LlmError::NotConfigured("OpenAI API key required".to_string()))?;

        let client = build_client(&config, "OpenAI")?;
        Ok(Self {
            config,
            client,
            api_key,
        })
    }
}

#[async_trait]
impl LLM for OpenAIProvider {
    async fn generate(&self, request: GenerationRequest) -> Result<LLMResponse, LlmError> {
        let url = self.config.endpoint.as_deref().unwrap_or(OPENAI_CHAT_URL);
        debug!("Sending request to OpenAI API at {}", url);

        let builder = self.client.post(url).bearer_auth(&self.api_key);
        send_chat_completion("OpenAI", builder, &self.config.model, request).await
    }

    async fn is_available(&self) -> bool {
        match self
            .client
            .get(OPENAI_MODELS_URL)
            .bearer_auth(&self.api_key)
            .send()
            .await
        {
            Ok(response) => response.status().is_success(),
            Err(_) => false,
        }
    }

    fn provider_type(&self) -> LLMProvider {
        LLMProvider::OpenAI
    }
}

/// Gemini provider implementation
pub struct GeminiProvider {
    config: LLMConfig,
    client: Client,
    api_key: String,
}

#[derive(Debug, Serialize)]
struct GeminiRequest {
    contents: Vec<GeminiContent>,
    #[serde(rename = "generationConfig")]
    generation_config: GeminiGenerationConfig,
}

#[derive(Debug, Serialize, Deserialize)]
struct GeminiContent {
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Serialize, Deserialize)]
struct GeminiPart {
    text: String,
}

#[derive(Debug, Serialize)]
struct GeminiGenerationConfig {
    #[serde(rename = "maxOutputTokens")]
    max_output_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
    #[serde(rename = "usageMetadata")]
    usage_metadata: Option<GeminiUsage>,
}

#[derive(Debug, Deserialize)]
struct GeminiCandidate {
    content: GeminiContent,
}

#[derive(Debug, Deserialize)]
struct GeminiUsage {
    #[serde(rename = "totalTokenCount")]
    total_token_count: u32,
}

impl GeminiProvider {
    pub fn new(config: LLMConfig) -> Result<Self, LlmError> {
        let api_key = config
            .api_key
            .clone()
            .ok_or_else(|| LlmError::NotConfigured("Gemini API key required".to_string()))?;

        let client = build_client(&config, "Gemini")?;
        Ok(Self {
            config,
            client,
            api_key,
        })
    }

    fn base_url(&self) -> &str {
        self.config.endpoint.as_deref().unwrap_or(GEMINI_BASE_URL)
    }
}

#[async_trait]
impl LLM for GeminiProvider {
    async fn generate(&self, request: GenerationRequest) -> Result<LLMResponse, LlmError> {
        // Gemini has no chat roles here; fold the conversation into one prompt
        let content = request
            .messages
            .iter()
            .map(|msg| format!("{}: {}", msg.role, msg.content))
            .collect::<Vec<_>>()
            .join("\n");

        let body = GeminiRequest {
            contents: vec![GeminiContent {
                parts: vec![GeminiPart { text: content }],
            }],
            generation_config: GeminiGenerationConfig {
                max_output_tokens: request.max_tokens,
                temperature: request.temperature,
            },
        };

        let url = format!("{}/{}:generateContent", self.base_url(), self.config.model);
        debug!("Sending request to Gemini API");

        let response = self
            .client
            .post(&url)
            .query(&[("key", self.api_key.as_str())])
            .json(&body)
            .send()
            .await
            .map_err(|e| transport("Gemini", e))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let text = response.text().await.unwrap_or_default();
            return Err(LlmError::Status {
                provider: "Gemini",
                status,
                body: text,
            });
        }

        let gemini_response: GeminiResponse =
            response.json().await.map_err(|e| transport("Gemini", e))?;

        let content = gemini_response
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content.parts.into_iter().next())
            .map(|p| p.text)
            .ok_or(LlmError::EmptyResponse("Gemini"))?;

        Ok(LLMResponse {
            content,
            tokens_used: gemini_response.usage_metadata.map(|u| u.total_token_count),
        })
    }

    async fn is_available(&self) -> bool {
        match self
            .client
            .get(self.base_url())
            .query(&[("key", self.api_key.as_str())])
            .send()
            .await
        {
            Ok(response) => response.status().is_success(),
            Err(_) => false,
        }
    }

    fn provider_type(&self) -> LLMProvider {
        LLMProvider::Gemini
    }
}
