use ecochef_core::Difficulty;
use serde_json::{json, Value};

use crate::engine::ResponseSchema;

/// Name the response schema is declared under.
pub const SCHEMA_NAME: &str = "recipes";

/// Number of recipes requested per generation.
pub const RECIPE_COUNT: usize = 3;

pub fn system_prompt() -> String {
    "You are a world-class chef focused on sustainable, home-style cooking. \
Your recipes are clear, accurate, and optimized for minimizing food waste. \
Return the response as a JSON array."
        .to_string()
}

pub fn user_message(ingredient_names: &[String]) -> String {
    let mut out = String::with_capacity(768);

    out.push_str("I have the following ingredients in my kitchen: ");
    out.push_str(&ingredient_names.join(", "));
    out.push_str(".\n");
    out.push_str(&format!(
        "Please suggest {RECIPE_COUNT} distinct and delicious recipes I can make.\n"
    ));
    out.push_str(
        "You can assume I have basic pantry staples like salt, pepper, oil, water, flour, \
and sugar, even if they are not listed.\n\n",
    );

    out.push_str("For each recipe, provide:\n");
    let fields = [
        "A creative title.".to_string(),
        "A brief, appetizing description.".to_string(),
        "Estimated cooking time (e.g., \"30 mins\").".to_string(),
        format!(
            "Difficulty level ({}).",
            Difficulty::ALL.map(|d| d.to_string()).join(", ")
        ),
        "A specific list of ingredients (including quantities if possible).".to_string(),
        "Step-by-step cooking instructions.".to_string(),
        "Approximate calories per serving.".to_string(),
    ];
    for (i, field) in fields.iter().enumerate() {
        out.push_str(&format!("{}. {}\n", i + 1, field));
    }

    out
}

const RECIPE_FIELDS: [&str; 7] = [
    "title",
    "description",
    "cookingTime",
    "difficulty",
    "ingredients",
    "instructions",
    "calories",
];

/// Structured output declaration for a recipe batch.
///
/// Gemini takes the array directly. The JSON Schema dialect wraps it as
/// `{"recipes": [...]}` because OpenAI-style backends need an object root;
/// there `calories` is nullable rather than optional so strict mode accepts it.
pub fn recipe_response_schema() -> ResponseSchema {
    ResponseSchema {
        name: SCHEMA_NAME.to_string(),
        gemini: gemini_schema(),
        json_schema: json_schema(),
    }
}

fn difficulties() -> Vec<&'static str> {
    Difficulty::ALL.iter().map(|d| d.as_str()).collect()
}

fn gemini_schema() -> Value {
    json!({
        "type": "ARRAY",
        "items": {
            "type": "OBJECT",
            "properties": {
                "title": { "type": "STRING" },
                "description": { "type": "STRING" },
                "cookingTime": { "type": "STRING" },
                "difficulty": { "type": "STRING", "enum": difficulties() },
                "ingredients": { "type": "ARRAY", "items": { "type": "STRING" } },
                "instructions": { "type": "ARRAY", "items": { "type": "STRING" } },
                "calories": { "type": "NUMBER" },
            },
            "required": &RECIPE_FIELDS[..6],
        },
    })
}

fn json_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "recipes": {
                "type": "array",
                "items": {
                    "type": "object",
                    "properties": {
                        "title": { "type": "string" },
                        "description": { "type": "string" },
                        "cookingTime": { "type": "string" },
                        "difficulty": { "type": "string", "enum": difficulties() },
                        "ingredients": { "type": "array", "items": { "type": "string" } },
                        "instructions": { "type": "array", "items": { "type": "string" } },
                        "calories": { "type": ["number", "null"] },
                    },
                    "required": RECIPE_FIELDS,
                    "additionalProperties": false,
                },
            },
        },
        "required": ["recipes"],
        "additionalProperties": false,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn user_message_comma_joins_ingredients() {
        let msg = user_message(&names(&["egg", "flour", "spring onion"]));
        assert!(msg.starts_with("I have the following ingredients in my kitchen: egg, flour, spring onion."));
        assert!(msg.contains("suggest 3 distinct"));
        assert!(msg.contains("pantry staples"));
    }

    #[test]
    fn user_message_lists_every_field() {
        let msg = user_message(&names(&["rice"]));
        assert!(msg.contains("1. A creative title."));
        assert!(msg.contains("4. Difficulty level (Easy, Medium, Hard)."));
        assert!(msg.contains("7. Approximate calories per serving."));
    }

    fn required(schema: &Value) -> Vec<&str> {
        schema["required"]
            .as_array()
            .unwrap()
            .iter()
            .map(|v| v.as_str().unwrap())
            .collect()
    }

    #[test]
    fn gemini_schema_requires_everything_but_calories() {
        let schema = recipe_response_schema().gemini;
        assert_eq!(schema["type"], "ARRAY");

        let required = required(&schema["items"]);
        assert_eq!(required.len(), 6);
        assert!(!required.contains(&"calories"));
        assert_eq!(schema["items"]["properties"]["calories"]["type"], "NUMBER");
    }

    #[test]
    fn json_schema_wraps_the_array_in_an_object() {
        let schema = recipe_response_schema().json_schema;
        assert_eq!(schema["type"], "object");
        assert_eq!(required(&schema), vec!["recipes"]);
        assert_eq!(schema["additionalProperties"], false);

        let items = &schema["properties"]["recipes"]["items"];
        assert_eq!(schema["properties"]["recipes"]["type"], "array");
        assert_eq!(items["type"], "object");
        assert_eq!(required(items).len(), 7);
        assert_eq!(items["properties"]["calories"]["type"], json!(["number", "null"]));
    }

    #[test]
    fn json_schema_uses_lowercase_types_only() {
        fn walk(v: &Value) {
            match v {
                Value::Object(map) => {
                    if let Some(Value::String(t)) = map.get("type") {
                        assert_eq!(t, &t.to_lowercase());
                    }
                    map.values().for_each(walk);
                }
                Value::Array(arr) => arr.iter().for_each(walk),
                _ => {}
            }
        }
        walk(&recipe_response_schema().json_schema);
    }

    #[test]
    fn both_dialects_constrain_difficulty() {
        let schema = recipe_response_schema();
        let expected = json!(["Easy", "Medium", "Hard"]);
        assert_eq!(schema.gemini["items"]["properties"]["difficulty"]["enum"], expected);
        assert_eq!(
            schema.json_schema["properties"]["recipes"]["items"]["properties"]["difficulty"]["enum"],
            expected
        );
    }

    #[test]
    fn system_prompt_asks_for_json_array() {
        assert!(system_prompt().contains("JSON array"));
    }
}
