use std::collections::HashMap;

use strsim::jaro_winkler;

use crate::costing::constants::SUGGESTION_THRESHOLD;
use crate::error::{CostError, Result};
use crate::models::{Ingredient, ingredient_key, title_case};

/// Ordered ingredient store with case-insensitive lookup by name.
#[derive(Debug, Clone, Default)]
pub struct IngredientCatalog {
    items: Vec<Ingredient>,
    /// Position in `items`, keyed by trimmed lowercase name.
    index: HashMap<String, usize>,
}

impl IngredientCatalog {
    /// Build a catalog from records in order.
    ///
    /// Duplicate names keep the first position with the last record's values.
    pub fn new(ingredients: Vec<Ingredient>) -> Self {
        let mut catalog = Self::default();
        for ingredient in ingredients {
            catalog.insert(ingredient);
        }
        catalog
    }

    fn insert(&mut self, mut ingredient: Ingredient) -> bool {
        ingredient.name = title_case(&ingredient.name);
        let key = ingredient.key();
        match self.index.get(&key) {
            Some(&pos) => {
                self.items[pos] = ingredient;
                false
            }
            None => {
                self.index.insert(key, self.items.len());
                self.items.push(ingredient);
                true
            }
        }
    }

    /// Get an ingredient by name (case-insensitive, whitespace-trimmed).
    pub fn get(&self, name: &str) -> Option<&Ingredient> {
        self.index
            .get(&ingredient_key(name))
            .map(|&pos| &self.items[pos])
    }

    /// Like [`get`](Self::get) but reports a missing ingredient as an error.
    pub fn find(&self, name: &str) -> Result<&Ingredient> {
        self.get(name)
            .ok_or_else(|| CostError::IngredientNotFound(name.trim().to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(&ingredient_key(name))
    }

    /// Add or replace an ingredient after validating it.
    ///
    /// Returns true when the ingredient is new.
    pub fn upsert(&mut self, ingredient: Ingredient) -> Result<bool> {
        if !ingredient.is_valid() {
            return Err(CostError::InvalidInput(format!(
                "Ingredient '{}' needs a name, a purchase size above 0 and a non-negative cost",
                ingredient.name.trim()
            )));
        }
        Ok(self.insert(ingredient))
    }

    /// Remove an ingredient by name, returning it.
    pub fn remove(&mut self, name: &str) -> Result<Ingredient> {
        let pos = self
            .index
            .remove(&ingredient_key(name))
            .ok_or_else(|| CostError::IngredientNotFound(name.trim().to_string()))?;

        let removed = self.items.remove(pos);
        for slot in self.index.values_mut() {
            if *slot > pos {
                *slot -= 1;
            }
        }
        Ok(removed)
    }

    /// Ingredients similar to `name`, best match first.
    ///
    /// Only Jaro-Winkler scores above the suggestion threshold are kept.
    pub fn candidates(&self, name: &str) -> Vec<(&Ingredient, f64)> {
        let wanted = ingredient_key(name);
        let mut scored: Vec<(&Ingredient, f64)> = self
            .items
            .iter()
            .map(|i| (i, jaro_winkler(&i.key(), &wanted)))
            .filter(|(_, score)| *score > SUGGESTION_THRESHOLD)
            .collect();

        scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
        scored
    }

    /// Closest known ingredient name, if any is similar enough.
    pub fn suggest(&self, name: &str) -> Option<&str> {
        self.candidates(name)
            .first()
            .map(|(i, _)| i.name.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = &Ingredient> {
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
    use crate::models::UnitType;

    fn sample() -> IngredientCatalog {
        IngredientCatalog::new(vec![
            Ingredient::new("Flour", UnitType::MassKg, 10.0, 20.0),
            Ingredient::new("Milk", UnitType::VolumeL, 2.0, 3.0),
            Ingredient::new("Egg", UnitType::Count, 12.0, 6.0),
        ])
    }

    #[test]
    fn test_find_case_insensitive() {
        let catalog = sample();
        assert!(catalog.find("flour").is_ok());
        assert!(catalog.find("  FLOUR ").is_ok());
        let err = catalog.find("sugar").unwrap_err();
        assert!(matches!(err, CostError::IngredientNotFound(ref n) if n == "sugar"));
    }

    #[test]
    fn test_duplicates_keep_position_last_values_win() {
        let catalog = IngredientCatalog::new(vec![
            Ingredient::new("Flour", UnitType::MassKg, 10.0, 20.0),
            Ingredient::new("Milk", UnitType::VolumeL, 2.0, 3.0),
            Ingredient::new("FLOUR", UnitType::MassKg, 5.0, 20.0),
        ]);
        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.as_slice()[0].purchase_size, 5.0);
        assert_eq!(catalog.as_slice()[0].name, "Flour");
    }

    #[test]
    fn test_upsert_validates() {
        let mut catalog = sample();
        let err = catalog
            .upsert(Ingredient::new("Salt", UnitType::MassKg, 0.0, 1.0))
            .unwrap_err();
        assert!(matches!(err, CostError::InvalidInput(_)));
        assert!(!catalog.contains("salt"));

        assert!(catalog.upsert(Ingredient::new("salt", UnitType::MassKg, 1.0, 1.0)).unwrap());
        assert!(!catalog.upsert(Ingredient::new("SALT", UnitType::MassKg, 2.0, 1.0)).unwrap());
        assert_eq!(catalog.find("salt").unwrap().purchase_size, 2.0);
    }

    #[test]
    fn test_remove_reindexes() {
        let mut catalog = sample();
        let removed = catalog.remove("milk").unwrap();
        assert_eq!(removed.name, "Milk");
        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.find("egg").unwrap().name, "Egg");
        assert!(catalog.remove("milk").is_err());
    }

    #[test]
    fn test_suggest() {
        let catalog = sample();
        assert_eq!(catalog.suggest("flor"), Some("Flour"));
        assert_eq!(catalog.suggest("zzzz"), None);
    }

    #[test]
    fn test_candidates_best_first() {
        let catalog = IngredientCatalog::new(vec![
            Ingredient::new("Rice", UnitType::MassKg, 10.0, 18.0),
            Ingredient::new("Rice Flour", UnitType::MassKg, 1.0, 4.0),
            Ingredient::new("Milk", UnitType::VolumeL, 2.0, 3.0),
        ]);
        let names: Vec<&str> = catalog
            .candidates("rce")
            .iter()
            .map(|(i, _)| i.name.as_str())
            .collect();
        assert_eq!(names.first(), Some(&"Rice"));
        assert!(!names.contains(&"Milk"));
        assert!(catalog.candidates("zzzz").is_empty());
    }
}
