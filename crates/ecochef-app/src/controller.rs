use std::fmt;
use std::sync::Arc;

use ecochef_core::{Ingredient, IngredientId};
use ecochef_suggest::RecipeSource;
use tokio::sync::watch;

use crate::state::AppState;

/// Shown when a failure carries no message of its own.
pub const FALLBACK_ERROR: &str = "Something went wrong. Please try again.";

/// How a call to [`AppController::generate_recipes`] ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenerationOutcome {
    /// Registry was empty; nothing changed.
    Skipped,
    /// Recipes stored. Carries the batch size.
    Succeeded(usize),
    /// Error message stored.
    Failed,
    /// A newer generation started before this one resolved; result dropped.
    Superseded,
}

fn failure_message(err: &impl fmt::Display) -> String {
    let msg = err.to_string();
    if msg.trim().is_empty() {
        FALLBACK_ERROR.to_string()
    } else {
        msg
    }
}

/// Owns application state and the request lifecycle.
///
/// Every mutation is a single `send_modify` on the watch channel, so
/// subscribers never observe a half-applied transition. No lock is held
/// while a request is in flight.
#[derive(Clone)]
pub struct AppController {
    state: Arc<watch::Sender<AppState>>,
    source: Arc<dyn RecipeSource>,
}

impl AppController {
    pub fn new(source: Arc<dyn RecipeSource>) -> Self {
        let (tx, _rx) = watch::channel(AppState::default());
        Self {
            state: Arc::new(tx),
            source,
        }
    }

    pub fn state(&self) -> AppState {
        self.state.borrow().clone()
    }

    /// Receive a fresh snapshot after every transition.
    pub fn subscribe(&self) -> watch::Receiver<AppState> {
        self.state.subscribe()
    }

    /// Add an ingredient. Empty or duplicate names are ignored.
    pub fn add_ingredient(&self, name: &str) -> Option<Ingredient> {
        let mut added = None;
        self.state.send_if_modified(|s| {
            added = s.ingredients.add(name).cloned();
            added.is_some()
        });
        added
    }

    /// Remove an ingredient by id. Returns whether anything was removed.
    pub fn remove_ingredient(&self, id: IngredientId) -> bool {
        self.state
            .send_if_modified(|s| s.ingredients.remove(id).is_some())
    }

    /// Full reset: ingredients, recipes and error.
    ///
    /// Does not touch the loading flag; an in-flight generation still
    /// resolves normally.
    pub fn clear_ingredients(&self) {
        self.state.send_modify(|s| {
            s.ingredients.clear();
            s.recipes.clear();
            s.error = None;
        });
    }

    /// Run one generation for the current ingredients.
    pub async fn generate_recipes(&self) -> GenerationOutcome {
        let mut started = None;
        self.state.send_if_modified(|s| {
            if s.ingredients.is_empty() {
                return false;
            }
            s.generation += 1;
            s.is_loading = true;
            s.error = None;
            s.recipes.clear();
            started = Some((s.generation, s.ingredients.names()));
            true
        });

        let Some((ticket, names)) = started else {
            tracing::debug!("no ingredients, skipping generation");
            return GenerationOutcome::Skipped;
        };

        tracing::debug!(ticket, ingredients = names.len(), "generation started");
        let result = self.source.generate(&names).await;

        let mut outcome = GenerationOutcome::Superseded;
        self.state.send_if_modified(|s| {
            if s.generation != ticket {
                return false;
            }
            match result {
                Ok(recipes) => {
                    outcome = GenerationOutcome::Succeeded(recipes.len());
                    s.recipes = recipes;
                    s.error = None;
                }
                Err(e) => {
                    outcome = GenerationOutcome::Failed;
                    s.recipes.clear();
                    s.error = Some(failure_message(&e));
                }
            }
            s.is_loading = false;
            true
        });

        match outcome {
            GenerationOutcome::Superseded => {
                tracing::debug!(ticket, "dropping response from superseded generation")
            }
            GenerationOutcome::Failed => tracing::warn!(ticket, "generation failed"),
            _ => tracing::debug!(ticket, ?outcome, "generation finished"),
        }
        outcome
    }
}
