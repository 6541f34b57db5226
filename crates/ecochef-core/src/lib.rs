pub mod registry;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::PathBuf;
use std::str::FromStr;
use thiserror::Error;
use uuid::Uuid;

pub use registry::IngredientRegistry;

// --- Types ---

/// Opaque identifier of an ingredient. Generated once, never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IngredientId(Uuid);

impl IngredientId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for IngredientId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for IngredientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl FromStr for IngredientId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s.trim()).map(Self)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ingredient {
    pub id: IngredientId,
    pub name: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    pub const ALL: [Difficulty; 3] = [Difficulty::Easy, Difficulty::Medium, Difficulty::Hard];

    pub fn as_str(self) -> &'static str {
        match self {
            Difficulty::Easy => "Easy",
            Difficulty::Medium => "Medium",
            Difficulty::Hard => "Hard",
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One suggested recipe. Every field except `calories` is required on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recipe {
    pub title: String,
    pub description: String,
    /// Free-form, e.g. "30 mins". Never parsed.
    pub cooking_time: String,
    pub difficulty: Difficulty,
    pub ingredients: Vec<String>,
    /// Steps in execution order.
    pub instructions: Vec<String>,
    /// Approximate calories per serving. `None` means unknown, not zero.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub calories: Option<f64>,
}

// --- AI Settings ---

pub const DEFAULT_PROVIDER: &str = "google";
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("settings io: {0}")]
    Io(#[from] std::io::Error),

    #[error("settings json: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AiSettings {
    #[serde(default)]
    pub provider: String,
    #[serde(default)]
    pub api_key: String,
    #[serde(default)]
    pub model: String,
}

impl AiSettings {
    /// Fill empty provider/model with the defaults.
    pub fn with_defaults(mut self) -> Self {
        if self.provider.trim().is_empty() {
            self.provider = DEFAULT_PROVIDER.to_string();
        }
        if self.model.trim().is_empty() {
            self.model = DEFAULT_MODEL.to_string();
        }
        self
    }

    /// Apply environment overrides on top of these settings.
    ///
    /// `ECOCHEF_API_KEY` wins over the bare `API_KEY`.
    pub fn apply_env<F>(mut self, var: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |name: &str| var(name).filter(|v| !v.trim().is_empty());

        if let Some(provider) = non_empty("ECOCHEF_PROVIDER") {
            self.provider = provider;
        }
        if let Some(model) = non_empty("ECOCHEF_MODEL") {
            self.model = model;
        }
        if let Some(key) = non_empty("ECOCHEF_API_KEY").or_else(|| non_empty("API_KEY")) {
            self.api_key = key;
        }
        self
    }
}

/// Resolve the config directory (~/.ecochef/).
pub fn config_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".ecochef")
}

fn settings_path() -> PathBuf {
    config_dir().join("settings.json")
}

/// Read the settings file. A missing or unreadable file yields defaults.
pub fn read_settings() -> AiSettings {
    let path = settings_path();
    if !path.exists() {
        return AiSettings::default();
    }
    match fs::read_to_string(&path)
        .map_err(SettingsError::from)
        .and_then(|s| serde_json::from_str(&s).map_err(SettingsError::from))
    {
        Ok(settings) => settings,
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "ignoring unreadable settings file");
            AiSettings::default()
        }
    }
}

pub fn write_settings(settings: &AiSettings) -> Result<(), SettingsError> {
    fs::create_dir_all(config_dir())?;
    let json = serde_json::to_string_pretty(settings)?;
    fs::write(settings_path(), json)?;
    Ok(())
}

/// Settings file, then defaults, then process environment.
pub fn load_settings() -> AiSettings {
    read_settings()
        .with_defaults()
        .apply_env(|name| std::env::var(name).ok())
}

pub fn ai_configured(settings: &AiSettings) -> bool {
    !settings.provider.is_empty()
        && !settings.model.is_empty()
        && (settings.provider == "ollama" || !settings.api_key.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn recipe_uses_camel_case_and_optional_calories() {
        let raw = r#"{
            "title": "Shakshuka",
            "description": "Eggs poached in spiced tomato sauce",
            "cookingTime": "25 mins",
            "difficulty": "Easy",
            "ingredients": ["4 eggs", "1 can tomatoes"],
            "instructions": ["Simmer the sauce", "Crack in the eggs"]
        }"#;
        let recipe: Recipe = serde_json::from_str(raw).unwrap();
        assert_eq!(recipe.cooking_time, "25 mins");
        assert_eq!(recipe.difficulty, Difficulty::Easy);
        assert_eq!(recipe.calories, None);

        let json = serde_json::to_value(&recipe).unwrap();
        assert!(json.get("cookingTime").is_some());
        assert!(json.get("calories").is_none());
    }

    #[test]
    fn recipe_missing_required_field_is_rejected() {
        let raw = r#"{
            "title": "Toast",
            "description": "",
            "difficulty": "Easy",
            "ingredients": [],
            "instructions": []
        }"#;
        assert!(serde_json::from_str::<Recipe>(raw).is_err());
    }

    #[test]
    fn difficulty_outside_enumeration_is_rejected() {
        assert!(serde_json::from_str::<Difficulty>("\"Expert\"").is_err());
        assert_eq!(
            serde_json::from_str::<Difficulty>("\"Hard\"").unwrap(),
            Difficulty::Hard
        );
    }

    #[test]
    fn difficulty_displays_its_wire_name() {
        let shown: Vec<String> = Difficulty::ALL.iter().map(|d| d.to_string()).collect();
        assert_eq!(shown, vec!["Easy", "Medium", "Hard"]);
    }

    #[test]
    fn ingredient_id_round_trips_through_display() {
        let id = IngredientId::new();
        let parsed: IngredientId = id.to_string().parse().unwrap();
        assert_eq!(parsed, id);
        assert!("not-a-uuid".parse::<IngredientId>().is_err());
    }

    #[test]
    fn defaults_fill_empty_fields_only() {
        let settings = AiSettings {
            provider: String::new(),
            api_key: "k".to_string(),
            model: "gemini-2.0-flash".to_string(),
        }
        .with_defaults();
        assert_eq!(settings.provider, DEFAULT_PROVIDER);
        assert_eq!(settings.model, "gemini-2.0-flash");
    }

    #[test]
    fn env_overrides_settings_file() {
        let settings = AiSettings::default()
            .with_defaults()
            .apply_env(env(&[("ECOCHEF_MODEL", "gemini-2.5-pro"), ("API_KEY", "abc")]));
        assert_eq!(settings.model, "gemini-2.5-pro");
        assert_eq!(settings.api_key, "abc");
        assert_eq!(settings.provider, DEFAULT_PROVIDER);
    }

    #[test]
    fn prefixed_key_wins_over_bare_key() {
        let settings = AiSettings::default()
            .apply_env(env(&[("API_KEY", "bare"), ("ECOCHEF_API_KEY", "prefixed")]));
        assert_eq!(settings.api_key, "prefixed");
    }

    #[test]
    fn blank_env_values_are_ignored() {
        let settings = AiSettings {
            provider: "openai".to_string(),
            api_key: "file-key".to_string(),
            model: "gpt-4o-mini".to_string(),
        }
        .apply_env(env(&[("ECOCHEF_PROVIDER", "  "), ("API_KEY", "")]));
        assert_eq!(settings.provider, "openai");
        assert_eq!(settings.api_key, "file-key");
    }

    #[test]
    fn configured_requires_key_unless_ollama() {
        let mut settings = AiSettings::default().with_defaults();
        assert!(!ai_configured(&settings));
        settings.api_key = "k".to_string();
        assert!(ai_configured(&settings));

        let local = AiSettings {
            provider: "ollama".to_string(),
            api_key: String::new(),
            model: "llama3".to_string(),
        };
        assert!(ai_configured(&local));
    }
}
