use tracing::{info, warn};

use crate::costing::composition;
use crate::costing::dashboard::{Dashboard, compute_dashboard};
use crate::costing::overhead::AllocationContext;
use crate::error::{CostError, Result};
use crate::models::{
    Ingredient, IngredientCatalog, LineItem, Meal, OverheadChanges, OverheadLine, UnitType,
    ingredient_key,
};

/// All costing records of one business: the state a session edits and saves.
///
/// Mutations validate first and leave the book untouched on error.
#[derive(Debug, Clone, Default)]
pub struct CostingBook {
    pub settings: AllocationContext,
    ingredients: IngredientCatalog,
    meals: Vec<Meal>,
    overheads: Vec<OverheadLine>,
}

impl CostingBook {
    pub fn new(
        settings: AllocationContext,
        ingredients: Vec<Ingredient>,
        meals: Vec<Meal>,
        overheads: Vec<OverheadLine>,
    ) -> Self {
        Self {
            settings,
            ingredients: IngredientCatalog::new(ingredients),
            meals,
            overheads,
        }
    }

    // ── Ingredients ─────────────────────────────────────────────────────────

    pub fn ingredients(&self) -> &IngredientCatalog {
        &self.ingredients
    }

    /// Add or replace an ingredient. Returns true when it is new.
    pub fn upsert_ingredient(
        &mut self,
        name: &str,
        unit_type: UnitType,
        purchase_size: f64,
        purchase_cost: f64,
    ) -> Result<bool> {
        let ingredient = Ingredient::new(name, unit_type, purchase_size, purchase_cost);
        let display_name = ingredient.name.clone();
        let created = self.ingredients.upsert(ingredient)?;
        info!(
            ingredient = %display_name,
            created, "Saved ingredient"
        );
        Ok(created)
    }

    /// Remove an ingredient. Meals that use it keep their lines.
    pub fn remove_ingredient(&mut self, name: &str) -> Result<Ingredient> {
        let removed = self.ingredients.remove(name)?;
        let users = self.meals_using(&removed.name);
        if !users.is_empty() {
            warn!(
                ingredient = %removed.name,
                meals = ?users,
                "Removed ingredient is still used by meals"
            );
        }
        Ok(removed)
    }

    /// Names of meals with a line referencing `ingredient_name`.
    pub fn meals_using(&self, ingredient_name: &str) -> Vec<String> {
        let key = ingredient_key(ingredient_name);
        self.meals
            .iter()
            .filter(|m| {
                m.line_items
                    .iter()
                    .any(|l| ingredient_key(&l.ingredient_name) == key)
            })
            .map(|m| m.name.clone())
            .collect()
    }

    // ── Meals ───────────────────────────────────────────────────────────────

    pub fn meals(&self) -> &[Meal] {
        &self.meals
    }

    fn meal_index(&self, name: &str) -> Option<usize> {
        let key = name.trim().to_lowercase();
        self.meals.iter().position(|m| m.key() == key)
    }

    fn meal_index_or_err(&self, name: &str) -> Result<usize> {
        self.meal_index(name)
            .ok_or_else(|| CostError::MealNotFound(name.trim().to_string()))
    }

    pub fn meal(&self, name: &str) -> Result<&Meal> {
        let idx = self.meal_index_or_err(name)?;
        Ok(&self.meals[idx])
    }

    /// Create an empty meal.
    pub fn create_meal(&mut self, name: &str, sell_price: f64) -> Result<()> {
        if self.meal_index(name).is_some() {
            return Err(CostError::DuplicateMeal(name.trim().to_string()));
        }
        let mut meal = Meal::new(name, 0.0);
        composition::rename_meal(&mut meal, name)?;
        composition::set_sell_price(&mut meal, sell_price)?;
        info!(meal = %meal.name, "Created meal");
        self.meals.push(meal);
        Ok(())
    }

    /// Store a fully built meal, replacing any meal with the same name.
    pub fn save_meal(&mut self, meal: Meal) -> Result<()> {
        composition::validate_meal(&meal, &self.ingredients)?;
        let mut checked = meal;
        checked.name = checked.name.trim().to_string();

        if checked.is_empty() {
            warn!(meal = %checked.name, "Saving meal with no ingredients; its cost will be overhead only");
        }

        match self.meal_index(&checked.name) {
            Some(idx) => self.meals[idx] = checked,
            None => self.meals.push(checked),
        }
        Ok(())
    }

    pub fn delete_meal(&mut self, name: &str) -> Result<Meal> {
        let idx = self.meal_index_or_err(name)?;
        let meal = self.meals.remove(idx);
        info!(meal = %meal.name, "Deleted meal");
        Ok(meal)
    }

    pub fn rename_meal(&mut self, name: &str, new_name: &str) -> Result<()> {
        let idx = self.meal_index_or_err(name)?;
        if let Some(other) = self.meal_index(new_name) {
            if other != idx {
                return Err(CostError::DuplicateMeal(new_name.trim().to_string()));
            }
        }
        composition::rename_meal(&mut self.meals[idx], new_name)
    }

    pub fn set_sell_price(&mut self, name: &str, sell_price: f64) -> Result<()> {
        let idx = self.meal_index_or_err(name)?;
        composition::set_sell_price(&mut self.meals[idx], sell_price)
    }

    pub fn add_line_item(
        &mut self,
        meal_name: &str,
        ingredient_name: &str,
        quantity: f64,
        unit: &str,
    ) -> Result<LineItem> {
        let idx = self.meal_index_or_err(meal_name)?;
        composition::add_line_item(
            &mut self.meals[idx],
            &self.ingredients,
            ingredient_name,
            quantity,
            unit,
        )
    }

    pub fn remove_line_item(&mut self, meal_name: &str, index: usize) -> Result<LineItem> {
        let idx = self.meal_index_or_err(meal_name)?;
        composition::remove_line_item(&mut self.meals[idx], index)
    }

    pub fn edit_line_quantity(&mut self, meal_name: &str, index: usize, quantity: f64) -> Result<()> {
        let idx = self.meal_index_or_err(meal_name)?;
        composition::edit_line_quantity(&mut self.meals[idx], &self.ingredients, index, quantity)
    }

    /// Re-snapshot a meal's line costs from current ingredient prices.
    pub fn refresh_meal(&mut self, meal_name: &str) -> Result<usize> {
        let idx = self.meal_index_or_err(meal_name)?;
        let changed = composition::refresh_costs(&mut self.meals[idx], &self.ingredients)?;
        info!(meal = %self.meals[idx].name, changed, "Refreshed meal costs");
        Ok(changed)
    }

    // ── Overheads ───────────────────────────────────────────────────────────

    pub fn overheads(&self) -> &[OverheadLine] {
        &self.overheads
    }

    fn check_overhead_index(&self, index: usize) -> Result<()> {
        if index < self.overheads.len() {
            Ok(())
        } else {
            Err(CostError::IndexOutOfRange {
                index,
                len: self.overheads.len(),
            })
        }
    }

    pub fn add_overhead(&mut self, line: OverheadLine) -> Result<()> {
        line.validate()?;
        info!(name = %line.name, unit = %line.unit, amount = line.amount, "Added overhead cost");
        self.overheads.push(line);
        Ok(())
    }

    pub fn update_overhead(&mut self, index: usize, line: OverheadLine) -> Result<()> {
        self.check_overhead_index(index)?;
        line.validate()?;
        self.overheads[index] = line;
        Ok(())
    }

    /// Apply `changes` to the overhead line at `index`, keeping its position.
    pub fn edit_overhead(&mut self, index: usize, changes: &OverheadChanges) -> Result<&OverheadLine> {
        self.check_overhead_index(index)?;
        let edited = changes.apply_to(&self.overheads[index]);
        self.update_overhead(index, edited)?;
        info!(name = %self.overheads[index].name, index, "Edited overhead cost");
        Ok(&self.overheads[index])
    }

    pub fn remove_overhead(&mut self, index: usize) -> Result<OverheadLine> {
        self.check_overhead_index(index)?;
        Ok(self.overheads.remove(index))
    }

    /// Remove the first overhead line called `name` (case-insensitive).
    pub fn remove_overhead_named(&mut self, name: &str) -> Result<OverheadLine> {
        let key = name.trim().to_lowercase();
        let idx = self
            .overheads
            .iter()
            .position(|o| o.name.trim().to_lowercase() == key)
            .ok_or_else(|| CostError::OverheadNotFound(name.trim().to_string()))?;
        self.remove_overhead(idx)
    }

    // ── Costing ─────────────────────────────────────────────────────────────

    /// Full recompute of the costing dashboard from current records.
    pub fn dashboard(&self) -> Dashboard {
        compute_dashboard(
            &self.meals,
            &self.ingredients,
            &self.overheads,
            &self.settings,
        )
    }
}
