//! Application state for EcoChef.
//!
//! [`AppController`] owns the ingredient registry, the last recipe batch, the
//! loading flag and the error message, and drives one generation at a time
//! through a [`RecipeSource`](ecochef_suggest::RecipeSource).
//!
//! Transitions:
//! - `generate_recipes` on an empty registry does nothing.
//! - Entering loading clears recipes and error in the same step.
//! - Resolution stores recipes or an error, then clears the loading flag.
//! - Only the most recently started generation may resolve; older responses
//!   are dropped.

mod controller;
mod state;

pub use controller::{AppController, GenerationOutcome, FALLBACK_ERROR};
pub use state::AppState;
