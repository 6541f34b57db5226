pub mod engine;
#[cfg(any(test, feature = "test-util"))]
mod fake;
mod parse;
mod prompt;

use std::sync::Arc;

use async_trait::async_trait;
use ecochef_core::Recipe;
use thiserror::Error;

use engine::{EngineError, GenerationRequest, TextGenerator};

pub use engine::LlmEngine;
#[cfg(any(test, feature = "test-util"))]
pub use fake::{FakeGenerator, FakeReply};
pub use parse::{parse_recipes, strip_code_fence, ParseError};
pub use prompt::{recipe_response_schema, system_prompt, user_message};

/// Message shown to the user for any failed generation.
pub const GENERATION_FAILED: &str = "Failed to generate recipes. Please try again.";

/// Underlying reason a generation failed. Kept for diagnostics only.
#[derive(Debug, Error)]
pub enum FailureCause {
    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error(transparent)]
    Parse(#[from] ParseError),
}

/// The single failure callers see. Displays [`GENERATION_FAILED`]; the
/// technical cause stays reachable through `source()` and [`Self::cause`].
#[derive(Debug, Error)]
#[error("{}", GENERATION_FAILED)]
pub struct GenerationError {
    #[source]
    cause: FailureCause,
}

impl GenerationError {
    pub fn cause(&self) -> &FailureCause {
        &self.cause
    }
}

impl From<FailureCause> for GenerationError {
    fn from(cause: FailureCause) -> Self {
        Self { cause }
    }
}

/// Anything that turns ingredient names into a recipe batch.
#[async_trait]
pub trait RecipeSource: Send + Sync {
    async fn generate(&self, ingredient_names: &[String]) -> Result<Vec<Recipe>, GenerationError>;
}

/// Stateless recipe request service over a [`TextGenerator`].
///
/// One external call per non-empty `generate`, no retries, no caching.
#[derive(Clone)]
pub struct RecipeService {
    generator: Arc<dyn TextGenerator>,
}

impl RecipeService {
    pub fn new(generator: Arc<dyn TextGenerator>) -> Self {
        Self { generator }
    }

    pub fn request_for(ingredient_names: &[String]) -> GenerationRequest {
        GenerationRequest {
            prompt: user_message(ingredient_names),
            system: system_prompt(),
            schema: recipe_response_schema(),
        }
    }

    async fn try_generate(&self, ingredient_names: &[String]) -> Result<Vec<Recipe>, FailureCause> {
        let request = Self::request_for(ingredient_names);

        let Some(raw) = self.generator.complete(&request).await? else {
            tracing::debug!("generator returned no text");
            return Ok(vec![]);
        };
        tracing::trace!(raw = %raw, "raw generator output");

        Ok(parse_recipes(strip_code_fence(&raw))?)
    }
}

#[async_trait]
impl RecipeSource for RecipeService {
    async fn generate(&self, ingredient_names: &[String]) -> Result<Vec<Recipe>, GenerationError> {
        if ingredient_names.is_empty() {
            return Ok(vec![]);
        }

        match self.try_generate(ingredient_names).await {
            Ok(recipes) => {
                tracing::info!(
                    ingredients = ingredient_names.len(),
                    recipes = recipes.len(),
                    "generated recipes"
                );
                Ok(recipes)
            }
            Err(cause) => {
                tracing::error!(error = %cause, "recipe generation failed");
                Err(cause.into())
            }
        }
    }
}
