use ecochef_core::{IngredientRegistry, Recipe};
use serde::Serialize;

/// Snapshot of everything the presentation layer reads.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AppState {
    pub ingredients: IngredientRegistry,
    pub recipes: Vec<Recipe>,
    pub is_loading: bool,
    pub error: Option<String>,
    /// Ticket of the most recently started generation.
    #[serde(skip)]
    pub(crate) generation: u64,
}

impl AppState {
    /// Idle means nothing shown: not loading, no recipes, no error.
    pub fn is_idle(&self) -> bool {
        !self.is_loading && self.recipes.is_empty() && self.error.is_none()
    }
}
