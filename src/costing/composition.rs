use tracing::debug;

use crate::costing::constants::INTERNAL_DECIMALS;
use crate::costing::round_to;
use crate::costing::units::{is_known_unit, to_base, units_per_base};
use crate::error::{CostError, Result};
use crate::models::{Ingredient, IngredientCatalog, LineItem, Meal, UnitType};

/// Cost of one base unit given a purchase.
///
/// A zero (or otherwise non-positive) purchase size means the cost is unknown
/// and yields 0 rather than dividing by zero.
pub fn cost_per_base_unit(purchase_size: f64, purchase_cost: f64) -> f64 {
    if purchase_size > 0.0 {
        purchase_cost / purchase_size
    } else {
        0.0
    }
}

fn check_quantity(quantity: f64) -> Result<()> {
    // Also rejects NaN and infinity.
    if quantity > 0.0 && quantity.is_finite() {
        Ok(())
    } else {
        Err(CostError::InvalidQuantity(quantity))
    }
}

/// Build a line item for `ingredient`, snapshotting its current cost per unit.
pub fn build_line_item(ingredient: &Ingredient, quantity: f64, unit: &str) -> Result<LineItem> {
    check_quantity(quantity)?;
    let base_quantity = to_base(quantity, unit, ingredient.unit_type)?;

    Ok(LineItem {
        ingredient_name: ingredient.name.clone(),
        quantity,
        unit: unit.trim().to_string(),
        base_quantity,
        cost_per_unit: ingredient.cost_per_base_unit(),
    })
}

/// Append a line item to `meal`.
///
/// The meal is left untouched if the quantity, ingredient or unit is invalid.
pub fn add_line_item(
    meal: &mut Meal,
    catalog: &IngredientCatalog,
    ingredient_name: &str,
    quantity: f64,
    unit: &str,
) -> Result<LineItem> {
    check_quantity(quantity)?;
    let ingredient = catalog.find(ingredient_name)?;
    let line = build_line_item(ingredient, quantity, unit)?;

    debug!(
        meal = %meal.name,
        ingredient = %line.ingredient_name,
        base_quantity = line.base_quantity,
        cost = line.total_cost(),
        "Added line item"
    );

    meal.line_items.push(line.clone());
    Ok(line)
}

/// Remove the line item at `index`, returning it.
pub fn remove_line_item(meal: &mut Meal, index: usize) -> Result<LineItem> {
    if index >= meal.line_items.len() {
        return Err(CostError::IndexOutOfRange {
            index,
            len: meal.line_items.len(),
        });
    }
    Ok(meal.line_items.remove(index))
}

/// Change the quantity of an existing line.
///
/// Editing a line re-snapshots its cost from the current ingredient price.
pub fn edit_line_quantity(
    meal: &mut Meal,
    catalog: &IngredientCatalog,
    index: usize,
    quantity: f64,
) -> Result<()> {
    let len = meal.line_items.len();
    let line = meal
        .line_items
        .get(index)
        .ok_or(CostError::IndexOutOfRange { index, len })?;

    let ingredient = catalog.find(&line.ingredient_name)?;
    let updated = build_line_item(ingredient, quantity, &line.unit)?;
    meal.line_items[index] = updated;
    Ok(())
}

/// Re-snapshot every line's cost per unit from current ingredient prices.
///
/// Fails without changing anything if any line's ingredient no longer exists.
/// Returns how many lines changed cost.
pub fn refresh_costs(meal: &mut Meal, catalog: &IngredientCatalog) -> Result<usize> {
    let refreshed = meal
        .line_items
        .iter()
        .map(|line| {
            let ingredient = catalog.find(&line.ingredient_name)?;
            build_line_item(ingredient, line.quantity, &line.unit)
        })
        .collect::<Result<Vec<_>>>()?;

    let changed = meal
        .line_items
        .iter()
        .zip(&refreshed)
        .filter(|(old, new)| old.cost_per_unit != new.cost_per_unit)
        .count();

    meal.line_items = refreshed;
    Ok(changed)
}

/// Sum of all line costs. Zero for a meal with no lines.
pub fn ingredient_cost(meal: &Meal) -> f64 {
    let total: f64 = meal.line_items.iter().map(LineItem::total_cost).sum();
    round_to(total, INTERNAL_DECIMALS)
}

pub fn rename_meal(meal: &mut Meal, new_name: &str) -> Result<()> {
    let new_name = new_name.trim();
    if new_name.is_empty() {
        return Err(CostError::InvalidInput(
            "Meal name must not be empty".to_string(),
        ));
    }
    meal.name = new_name.to_string();
    Ok(())
}

pub fn set_sell_price(meal: &mut Meal, sell_price: f64) -> Result<()> {
    if !(sell_price >= 0.0) || !sell_price.is_finite() {
        return Err(CostError::InvalidInput(format!(
            "Sell price must be non-negative, got {}",
            sell_price
        )));
    }
    meal.sell_price = sell_price;
    Ok(())
}

/// Check a stored meal against the rules every edit enforces.
///
/// Line units are checked against the ingredient's family when it is still in
/// the catalog, and against every family otherwise.
pub fn validate_meal(meal: &Meal, catalog: &IngredientCatalog) -> Result<()> {
    let mut checked = Meal::new("", 0.0);
    rename_meal(&mut checked, &meal.name)?;
    set_sell_price(&mut checked, meal.sell_price)?;

    for line in &meal.line_items {
        check_quantity(line.quantity)?;
        match catalog.get(&line.ingredient_name) {
            Some(ingredient) => {
                units_per_base(&line.unit, ingredient.unit_type)?;
            }
            None if UnitType::ALL.iter().any(|t| is_known_unit(&line.unit, *t)) => {}
            None => {
                return Err(CostError::InvalidInput(format!(
                    "{}: unknown unit '{}' for {}",
                    meal.name, line.unit, line.ingredient_name
                )));
            }
        }
        if !(line.base_quantity > 0.0 && line.base_quantity.is_finite())
            || !(line.cost_per_unit >= 0.0 && line.cost_per_unit.is_finite())
        {
            return Err(CostError::InvalidInput(format!(
                "{}: line for {} has an invalid base quantity or cost",
                meal.name, line.ingredient_name
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::UnitType;

    fn catalog() -> IngredientCatalog {
        IngredientCatalog::new(vec![
            Ingredient::new("Flour", UnitType::MassKg, 10.0, 20.0),
            Ingredient::new("Milk", UnitType::VolumeL, 2.0, 3.0),
            Ingredient::new("Egg", UnitType::Count, 12.0, 6.0),
        ])
    }

    #[test]
    fn test_cost_per_base_unit_guard() {
        assert_eq!(cost_per_base_unit(10.0, 20.0), 2.0);
        assert_eq!(cost_per_base_unit(0.0, 20.0), 0.0);
    }

    #[test]
    fn test_add_line_item() {
        let catalog = catalog();
        let mut meal = Meal::new("Pancakes", 12.0);

        let line = add_line_item(&mut meal, &catalog, "flour", 500.0, "g").unwrap();
        assert_eq!(line.ingredient_name, "Flour");
        assert!((line.base_quantity - 0.5).abs() < 1e-12);
        assert!((line.total_cost() - 1.0).abs() < 1e-9);

        add_line_item(&mut meal, &catalog, " MILK ", 250.0, "ml").unwrap();
        add_line_item(&mut meal, &catalog, "egg", 2.0, "unit").unwrap();

        assert_eq!(meal.len(), 3);
        // 1.0 + 0.375 + 1.0
        assert!((ingredient_cost(&meal) - 2.375).abs() < 1e-9);
    }

    #[test]
    fn test_add_rejects_bad_input_without_mutation() {
        let catalog = catalog();
        let mut meal = Meal::new("Pancakes", 12.0);

        let err = add_line_item(&mut meal, &catalog, "flour", 0.0, "g").unwrap_err();
        assert!(matches!(err, CostError::InvalidQuantity(_)));

        let err = add_line_item(&mut meal, &catalog, "sugar", 1.0, "kg").unwrap_err();
        assert!(matches!(err, CostError::IngredientNotFound(_)));

        let err = add_line_item(&mut meal, &catalog, "flour", 1.0, "cup").unwrap_err();
        assert!(matches!(err, CostError::UnrecognizedUnit { .. }));

        assert!(meal.is_empty());
    }

    #[test]
    fn test_infinite_quantity_rejected() {
        let catalog = catalog();
        let mut meal = Meal::new("Pancakes", 12.0);

        let err = add_line_item(&mut meal, &catalog, "flour", f64::INFINITY, "g").unwrap_err();
        assert!(matches!(err, CostError::InvalidQuantity(_)));
        assert!(add_line_item(&mut meal, &catalog, "flour", f64::NAN, "g").is_err());
        assert!(meal.is_empty());

        add_line_item(&mut meal, &catalog, "flour", 500.0, "g").unwrap();
        let err = edit_line_quantity(&mut meal, &catalog, 0, f64::INFINITY).unwrap_err();
        assert!(matches!(err, CostError::InvalidQuantity(_)));
        assert!((ingredient_cost(&meal) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_validate_meal() {
        let catalog = catalog();
        let mut meal = Meal::new("Pancakes", 12.0);
        add_line_item(&mut meal, &catalog, "flour", 500.0, "g").unwrap();
        assert!(validate_meal(&meal, &catalog).is_ok());

        let mut negative_price = meal.clone();
        negative_price.sell_price = -5.0;
        assert!(validate_meal(&negative_price, &catalog).is_err());

        let mut negative_line = meal.clone();
        negative_line.line_items[0].quantity = -500.0;
        assert!(matches!(
            validate_meal(&negative_line, &catalog),
            Err(CostError::InvalidQuantity(_))
        ));

        let mut wrong_unit = meal.clone();
        wrong_unit.line_items[0].unit = "ml".to_string();
        assert!(validate_meal(&wrong_unit, &catalog).is_err());

        // A deleted ingredient keeps its line as long as the unit is real.
        let mut orphan = meal.clone();
        orphan.line_items[0].ingredient_name = "Spelt".to_string();
        assert!(validate_meal(&orphan, &catalog).is_ok());
        orphan.line_items[0].unit = "cups".to_string();
        assert!(validate_meal(&orphan, &catalog).is_err());

        let mut unnamed = meal;
        unnamed.name = " ".to_string();
        assert!(validate_meal(&unnamed, &catalog).is_err());
    }

    #[test]
    fn test_remove_line_item() {
        let catalog = catalog();
        let mut meal = Meal::new("Pancakes", 12.0);
        add_line_item(&mut meal, &catalog, "flour", 1.0, "kg").unwrap();

        let err = remove_line_item(&mut meal, 3).unwrap_err();
        assert!(matches!(err, CostError::IndexOutOfRange { index: 3, len: 1 }));

        let removed = remove_line_item(&mut meal, 0).unwrap();
        assert_eq!(removed.ingredient_name, "Flour");
        assert_eq!(ingredient_cost(&meal), 0.0);
    }

    #[test]
    fn test_snapshot_survives_price_change_until_refresh() {
        let mut catalog = catalog();
        let mut meal = Meal::new("Bread", 5.0);
        add_line_item(&mut meal, &catalog, "flour", 1.0, "kg").unwrap();

        catalog
            .upsert(Ingredient::new("Flour", UnitType::MassKg, 10.0, 40.0))
            .unwrap();
        assert!((ingredient_cost(&meal) - 2.0).abs() < 1e-9);

        let changed = refresh_costs(&mut meal, &catalog).unwrap();
        assert_eq!(changed, 1);
        assert!((ingredient_cost(&meal) - 4.0).abs() < 1e-9);
    }

    #[test]
    fn test_refresh_fails_atomically_on_missing_ingredient() {
        let mut catalog = catalog();
        let mut meal = Meal::new("Bread", 5.0);
        add_line_item(&mut meal, &catalog, "flour", 1.0, "kg").unwrap();
        add_line_item(&mut meal, &catalog, "egg", 1.0, "unit").unwrap();
        let before = meal.clone();

        catalog.remove("egg").unwrap();
        let err = refresh_costs(&mut meal, &catalog).unwrap_err();
        assert!(matches!(err, CostError::IngredientNotFound(_)));
        assert_eq!(meal, before);
    }

    #[test]
    fn test_edit_line_quantity() {
        let catalog = catalog();
        let mut meal = Meal::new("Bread", 5.0);
        add_line_item(&mut meal, &catalog, "flour", 500.0, "g").unwrap();

        edit_line_quantity(&mut meal, &catalog, 0, 750.0).unwrap();
        assert!((ingredient_cost(&meal) - 1.5).abs() < 1e-9);
        assert_eq!(meal.line_items[0].unit, "g");

        assert!(edit_line_quantity(&mut meal, &catalog, 0, -1.0).is_err());
        assert!(edit_line_quantity(&mut meal, &catalog, 5, 1.0).is_err());
        assert!((ingredient_cost(&meal) - 1.5).abs() < 1e-9);
    }

    #[test]
    fn test_rename_and_price() {
        let mut meal = Meal::new("Bread", 5.0);
        assert!(rename_meal(&mut meal, "   ").is_err());
        rename_meal(&mut meal, " Sourdough ").unwrap();
        assert_eq!(meal.name, "Sourdough");

        assert!(set_sell_price(&mut meal, -1.0).is_err());
        assert!(set_sell_price(&mut meal, f64::NAN).is_err());
        set_sell_price(&mut meal, 0.0).unwrap();
        assert_eq!(meal.sell_price, 0.0);
    }
}
