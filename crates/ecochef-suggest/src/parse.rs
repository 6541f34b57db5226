use ecochef_core::Recipe;
use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("response is not a recipe array: {0}")]
    Json(#[from] serde_json::Error),

    #[error("recipe {index} has an empty title")]
    EmptyTitle { index: usize },
}

/// Strip a markdown code fence wrapped around a model payload.
///
/// Removes a leading "```json" or "```" opener with the whitespace after it,
/// and a trailing "```" closer with the whitespace before it. Text without an
/// opening fence is only trimmed.
pub fn strip_code_fence(raw: &str) -> &str {
    let text = raw.trim();
    let body = match text
        .strip_prefix("```json")
        .or_else(|| text.strip_prefix("```"))
    {
        Some(rest) => rest,
        None => return text,
    };
    let body = body.trim_start();
    body.strip_suffix("```").unwrap_or(body).trim_end()
}

/// Recipe batch as returned by the backends: a bare array (Gemini) or an
/// array under `recipes` (object-rooted JSON Schema backends).
#[derive(Deserialize)]
#[serde(untagged)]
enum Payload {
    Bare(Vec<Recipe>),
    Wrapped { recipes: Vec<Recipe> },
}

/// Parse an already unwrapped payload (see [`strip_code_fence`]) into a
/// recipe batch.
///
/// An empty payload is an empty batch. Any invalid recipe fails the whole
/// batch.
pub fn parse_recipes(json_str: &str) -> Result<Vec<Recipe>, ParseError> {
    let json_str = json_str.trim();
    if json_str.is_empty() {
        return Ok(vec![]);
    }

    let recipes = match serde_json::from_str::<Payload>(json_str)? {
        Payload::Bare(recipes) | Payload::Wrapped { recipes } => recipes,
    };

    if let Some(index) = recipes.iter().position(|r| r.title.trim().is_empty()) {
        return Err(ParseError::EmptyTitle { index });
    }

    Ok(recipes)
}
