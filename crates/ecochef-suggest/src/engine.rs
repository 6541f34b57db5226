use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use llm::builder::{LLMBackend, LLMBuilder};
use llm::chat::{ChatMessage, StructuredOutputFormat};
use thiserror::Error;

use ecochef_core::AiSettings;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("unknown provider: {0}")]
    UnknownProvider(String),

    #[error("invalid response schema: {0}")]
    Schema(String),

    #[error("build LLM: {0}")]
    Build(String),

    #[error("chat: {0}")]
    Request(String),
}

/// Structured output declaration in both dialects the backends understand.
#[derive(Debug, Clone, PartialEq)]
pub struct ResponseSchema {
    /// Name the structured output is declared under.
    pub name: String,
    /// Gemini `responseSchema`: uppercase type names, any root type.
    pub gemini: serde_json::Value,
    /// Plain JSON Schema with an object root, for OpenAI-compatible and
    /// Ollama backends.
    pub json_schema: serde_json::Value,
}

/// One call to the external text-generation API.
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    pub prompt: String,
    pub system: String,
    pub schema: ResponseSchema,
}

/// Seam over the hosted model. Implementations make at most one external
/// call per `complete` and keep no state between calls.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Returns the raw text payload, `None` when the API produced no text.
    async fn complete(&self, request: &GenerationRequest) -> Result<Option<String>, EngineError>;
}

fn map_backend(provider: &str) -> Result<LLMBackend, EngineError> {
    match provider {
        "openai" => Ok(LLMBackend::OpenAI),
        "anthropic" => Ok(LLMBackend::Anthropic),
        "google" => Ok(LLMBackend::Google),
        "ollama" => Ok(LLMBackend::Ollama),
        "groq" => Ok(LLMBackend::Groq),
        "mistral" => Ok(LLMBackend::Mistral),
        "deepseek" => Ok(LLMBackend::DeepSeek),
        other => Err(EngineError::UnknownProvider(other.to_string())),
    }
}

/// `TextGenerator` backed by the `llm` crate.
///
/// Settings are shared so they can be swapped at runtime; each call builds a
/// fresh client from the settings current at call time.
#[derive(Debug, Clone)]
pub struct LlmEngine {
    settings: Arc<RwLock<AiSettings>>,
}

impl LlmEngine {
    pub fn new(settings: AiSettings) -> Self {
        Self::shared(Arc::new(RwLock::new(settings)))
    }

    pub fn shared(settings: Arc<RwLock<AiSettings>>) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> AiSettings {
        match self.settings.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

/// Pick the schema dialect `backend` accepts.
fn declaration_for<'a>(backend: &LLMBackend, schema: &'a ResponseSchema) -> &'a serde_json::Value {
    match backend {
        LLMBackend::Google => &schema.gemini,
        _ => &schema.json_schema,
    }
}

fn structured_output(
    backend: &LLMBackend,
    schema: &ResponseSchema,
) -> Result<StructuredOutputFormat, EngineError> {
    serde_json::from_value(serde_json::json!({
        "name": schema.name,
        "schema": declaration_for(backend, schema),
    }))
    .map_err(|e| EngineError::Schema(e.to_string()))
}

#[async_trait]
impl TextGenerator for LlmEngine {
    async fn complete(&self, request: &GenerationRequest) -> Result<Option<String>, EngineError> {
        let settings = self.settings();
        let backend = map_backend(&settings.provider)?;

        let format = structured_output(&backend, &request.schema)?;

        let mut builder = LLMBuilder::new()
            .backend(backend)
            .model(&settings.model)
            .system(&request.system)
            .schema(format);

        if !settings.api_key.is_empty() {
            builder = builder.api_key(&settings.api_key);
        }

        let llm = builder.build().map_err(|e| EngineError::Build(e.to_string()))?;

        let messages = vec![ChatMessage::user().content(&request.prompt).build()];

        tracing::debug!(
            provider = %settings.provider,
            model = %settings.model,
            "sending generation request"
        );

        let response = llm
            .chat(&messages)
            .await
            .map_err(|e| EngineError::Request(e.to_string()))?;

        Ok(response.text())
    }
}
