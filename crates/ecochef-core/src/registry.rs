//! Ordered, case-insensitively unique collection of ingredients.
//!
//! Insertion order is display order. No operation reorders existing entries.

use serde::Serialize;

use crate::{Ingredient, IngredientId};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct IngredientRegistry {
    items: Vec<Ingredient>,
}

impl IngredientRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a trimmed `name` under a fresh id.
    ///
    /// Returns `None` without touching the registry when the trimmed name is
    /// empty or already present under case-insensitive comparison.
    pub fn add(&mut self, name: &str) -> Option<&Ingredient> {
        let name = name.trim();
        if name.is_empty() || self.contains_name(name) {
            return None;
        }
        self.items.push(Ingredient {
            id: IngredientId::new(),
            name: name.to_string(),
        });
        self.items.last()
    }

    /// Remove the ingredient with `id`. Unknown ids are ignored.
    pub fn remove(&mut self, id: IngredientId) -> Option<Ingredient> {
        let pos = self.items.iter().position(|i| i.id == id)?;
        Some(self.items.remove(pos))
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    pub fn contains_name(&self, name: &str) -> bool {
        let lower = name.trim().to_lowercase();
        self.items.iter().any(|i| i.name.to_lowercase() == lower)
    }

    pub fn names(&self) -> Vec<String> {
        self.items.iter().map(|i| i.name.clone()).collect()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Ingredient> {
        self.items.iter()
    }

    pub fn as_slice(&self) -> &[Ingredient] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry(names: &[&str]) -> IngredientRegistry {
        let mut reg = IngredientRegistry::new();
        for name in names {
            reg.add(name);
        }
        reg
    }

    #[test]
    fn add_trims_and_appends_in_order() {
        let reg = registry(&["  egg ", "flour", "milk"]);
        assert_eq!(reg.names(), vec!["egg", "flour", "milk"]);
    }

    #[test]
    fn add_ignores_empty_and_whitespace() {
        let mut reg = registry(&["egg"]);
        let before = reg.clone();
        assert!(reg.add("").is_none());
        assert!(reg.add("   ").is_none());
        assert!(reg.add("\t\n").is_none());
        assert_eq!(reg, before);
    }

    #[test]
    fn add_ignores_case_insensitive_duplicates() {
        let mut reg = registry(&["Tomato"]);
        let before = reg.clone();
        assert!(reg.add("tomato").is_none());
        assert!(reg.add(" TOMATO ").is_none());
        assert_eq!(reg, before);
    }

    #[test]
    fn no_two_names_match_case_insensitively() {
        let reg = registry(&["Basil", "basil", "BASIL", "Oregano", "oregano ", "Thyme"]);
        let lowered: Vec<String> = reg.iter().map(|i| i.name.to_lowercase()).collect();
        for (i, a) in lowered.iter().enumerate() {
            for b in &lowered[i + 1..] {
                assert_ne!(a, b);
            }
        }
        assert_eq!(reg.names(), vec!["Basil", "Oregano", "Thyme"]);
    }

    #[test]
    fn ids_are_unique() {
        let reg = registry(&["a", "b", "c", "d"]);
        let ids: std::collections::HashSet<_> = reg.iter().map(|i| i.id).collect();
        assert_eq!(ids.len(), 4);
    }

    #[test]
    fn remove_is_idempotent_and_keeps_order() {
        let mut reg = registry(&["egg", "flour", "milk"]);
        let id = reg.as_slice()[1].id;

        assert_eq!(reg.remove(id).map(|i| i.name), Some("flour".to_string()));
        let after_first = reg.clone();
        assert!(reg.remove(id).is_none());
        assert_eq!(reg, after_first);
        assert_eq!(reg.names(), vec!["egg", "milk"]);
    }

    #[test]
    fn removed_name_can_be_added_again_with_new_id() {
        let mut reg = registry(&["egg"]);
        let old = reg.as_slice()[0].id;
        reg.remove(old);
        let new = reg.add("Egg").map(|i| i.id).unwrap();
        assert_ne!(old, new);
    }

    #[test]
    fn clear_empties_everything() {
        let mut reg = registry(&["egg", "flour"]);
        reg.clear();
        assert!(reg.is_empty());
        assert_eq!(reg.len(), 0);
    }
}
