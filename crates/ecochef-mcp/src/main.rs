use rmcp::{
    handler::server::{router::tool::ToolRouter, wrapper::Parameters},
    model::{CallToolResult, Content, ServerCapabilities, ServerInfo},
    schemars, tool, tool_handler, tool_router, ErrorData as McpError, ServerHandler, ServiceExt,
};
use ecochef_app::{AppController, AppState, GenerationOutcome};
use ecochef_core::{AiSettings, IngredientId};
use ecochef_suggest::{LlmEngine, RecipeService};
use serde::Deserialize;
use std::sync::{Arc, RwLock};
use tracing_subscriber::EnvFilter;

// --- Request types ---

#[derive(Debug, Deserialize, schemars::JsonSchema)]
struct AddIngredientRequest {
    /// Ingredient name, e.g. "eggs". Surrounding whitespace is trimmed. Empty names and names already listed (ignoring case) are ignored.
    name: String,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
struct RemoveIngredientRequest {
    /// ID of the ingredient to remove, as returned by get_state or add_ingredient
    id: String,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
struct SaveAiSettingsRequest {
    /// Provider: "google", "openai", "anthropic", "ollama", "groq", "mistral", or "deepseek"
    provider: Option<String>,
    /// API key. Omit or pass an empty string to keep the existing key.
    api_key: Option<String>,
    /// Model name, e.g. "gemini-2.5-flash"
    model: Option<String>,
}

// --- Server ---

#[derive(Clone)]
pub struct EcoChefServer {
    app: AppController,
    settings: Arc<RwLock<AiSettings>>,
    tool_router: ToolRouter<Self>,
}

#[tool_router]
impl EcoChefServer {
    pub fn new(app: AppController, settings: Arc<RwLock<AiSettings>>) -> Self {
        Self {
            app,
            settings,
            tool_router: Self::tool_router(),
        }
    }

    #[tool(
        description = "Get the current kitchen state as JSON: {ingredients: [{id, name}], recipes: [{title, description, cookingTime, difficulty, ingredients, instructions, calories?}], isLoading, error}"
    )]
    fn get_state(&self) -> Result<CallToolResult, McpError> {
        Ok(state_result(&self.app.state()))
    }

    #[tool(description = "Add an ingredient to the kitchen")]
    fn add_ingredient(
        &self,
        Parameters(req): Parameters<AddIngredientRequest>,
    ) -> Result<CallToolResult, McpError> {
        let text = match self.app.add_ingredient(&req.name) {
            Some(ingredient) => format!("Added '{}' ({})", ingredient.name, ingredient.id),
            None => format!(
                "Ignored '{}': empty or already listed",
                req.name.trim()
            ),
        };
        Ok(CallToolResult::success(vec![Content::text(text)]))
    }

    #[tool(description = "Remove an ingredient by ID. Unknown IDs are ignored.")]
    fn remove_ingredient(
        &self,
        Parameters(req): Parameters<RemoveIngredientRequest>,
    ) -> Result<CallToolResult, McpError> {
        let removed = parse_id(&req.id).is_some_and(|id| self.app.remove_ingredient(id));
        let text = if removed {
            format!("Removed {}", req.id.trim())
        } else {
            format!("No ingredient with ID '{}'", req.id.trim())
        };
        Ok(CallToolResult::success(vec![Content::text(text)]))
    }

    #[tool(description = "Remove all ingredients and discard any recipes or error")]
    fn clear_ingredients(&self) -> Result<CallToolResult, McpError> {
        self.app.clear_ingredients();
        Ok(CallToolResult::success(vec![Content::text(
            "Kitchen cleared.",
        )]))
    }

    #[tool(
        description = "Ask the model for 3 recipes using the current ingredients. Waits for the result and returns the new state (same shape as get_state). A failed generation is reported in the state's `error` field. Does nothing when no ingredients are listed."
    )]
    async fn generate_recipes(&self) -> Result<CallToolResult, McpError> {
        let outcome = self.app.generate_recipes().await;
        if outcome == GenerationOutcome::Skipped {
            return Ok(CallToolResult::success(vec![Content::text(
                "No ingredients listed. Use add_ingredient first.",
            )]));
        }
        Ok(state_result(&self.app.state()))
    }

    #[tool(description = "Get the AI provider settings (the API key is never returned)")]
    fn get_ai_settings(&self) -> Result<CallToolResult, McpError> {
        let summary = settings_summary(&read_shared(&self.settings));
        Ok(CallToolResult::success(vec![Content::text(
            summary.to_string(),
        )]))
    }

    #[tool(description = "Update the AI provider settings and save them to ~/.ecochef/settings.json")]
    fn save_ai_settings(
        &self,
        Parameters(req): Parameters<SaveAiSettingsRequest>,
    ) -> Result<CallToolResult, McpError> {
        let updated = merge_settings(read_shared(&self.settings), req);
        if let Err(e) = ecochef_core::write_settings(&updated) {
            return Ok(CallToolResult::error(vec![Content::text(format!(
                "Failed to save settings: {}",
                e
            ))]));
        }
        match self.settings.write() {
            Ok(mut guard) => *guard = updated.clone(),
            Err(poisoned) => *poisoned.into_inner() = updated.clone(),
        }
        tracing::info!(provider = %updated.provider, model = %updated.model, "AI settings updated");
        Ok(CallToolResult::success(vec![Content::text(
            settings_summary(&updated).to_string(),
        )]))
    }
}

#[tool_handler]
impl ServerHandler for EcoChefServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some(INSTRUCTIONS.into()),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            ..Default::default()
        }
    }
}

// --- Helpers ---

fn state_json(state: &AppState) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(state)
}

fn state_result(state: &AppState) -> CallToolResult {
    match state_json(state) {
        Ok(json) => CallToolResult::success(vec![Content::text(json)]),
        Err(e) => CallToolResult::error(vec![Content::text(format!(
            "Serialization error: {}",
            e
        ))]),
    }
}

/// Malformed IDs can't match anything, so they're treated as unknown.
fn parse_id(raw: &str) -> Option<IngredientId> {
    raw.parse().ok()
}

fn read_shared(settings: &RwLock<AiSettings>) -> AiSettings {
    match settings.read() {
        Ok(guard) => guard.clone(),
        Err(poisoned) => poisoned.into_inner().clone(),
    }
}

/// Mask the API key — only report whether it's set.
fn settings_summary(settings: &AiSettings) -> serde_json::Value {
    serde_json::json!({
        "provider": settings.provider,
        "model": settings.model,
        "hasKey": !settings.api_key.is_empty(),
        "configured": ecochef_core::ai_configured(settings),
    })
}

fn merge_settings(mut current: AiSettings, req: SaveAiSettingsRequest) -> AiSettings {
    let non_empty = |v: Option<String>| v.map(|s| s.trim().to_string()).filter(|s| !s.is_empty());
    if let Some(provider) = non_empty(req.provider) {
        current.provider = provider;
    }
    if let Some(model) = non_empty(req.model) {
        current.model = model;
    }
    // Empty key means "keep existing"
    if let Some(key) = non_empty(req.api_key) {
        current.api_key = key;
    }
    current
}

const INSTRUCTIONS: &str = r#"EcoChef suggests recipes from the ingredients you have on hand.

## Workflow
1. Call `add_ingredient` once per ingredient. Duplicates (ignoring case) and blank names are ignored.
2. Call `generate_recipes`. It returns the kitchen state with up to 3 recipes, or an `error` message if generation failed. Common pantry staples (salt, pepper, oil, water, flour, sugar) are assumed and need not be added.
3. Use `remove_ingredient` or `clear_ingredients` to adjust, then generate again. Each generation replaces the previous recipes.

`get_state` returns the current ingredients, recipes, loading flag, and error at any time.
If generation keeps failing, check `get_ai_settings`: a missing API key shows up as a failed generation."#;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // stdout carries the protocol
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();

    let settings = Arc::new(RwLock::new(ecochef_core::load_settings()));
    {
        let current = read_shared(&settings);
        tracing::info!(
            provider = %current.provider,
            model = %current.model,
            configured = ecochef_core::ai_configured(&current),
            "starting ecochef-mcp"
        );
    }

    let engine = LlmEngine::shared(settings.clone());
    let app = AppController::new(Arc::new(RecipeService::new(Arc::new(engine))));

    let service = EcoChefServer::new(app, settings)
        .serve(rmcp::transport::io::stdio())
        .await
        .inspect_err(|e| tracing::error!(error = %e, "MCP server error"))?;
    service.waiting().await?;
    Ok(())
}
