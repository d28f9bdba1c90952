use dialoguer::{Confirm, Input, Select};

use crate::costing::composition::{add_line_item, ingredient_cost};
use crate::costing::units::display_unit_options;
use crate::error::{CostError, Result};
use crate::models::{Ingredient, IngredientCatalog, Meal};

fn parse_number(input: &str) -> Result<f64> {
    let value: f64 = input
        .trim()
        .parse()
        .map_err(|_| CostError::InvalidInput(format!("Invalid number: {}", input.trim())))?;
    if !value.is_finite() {
        return Err(CostError::InvalidInput(format!("Invalid number: {}", input.trim())));
    }
    Ok(value)
}

/// Prompt for a meal name.
pub fn prompt_meal_name(default: Option<&str>) -> Result<String> {
    let mut input = Input::<String>::new().with_prompt("Meal name");
    if let Some(name) = default {
        input = input.default(name.to_string());
    }
    let name = input.interact_text()?;

    let name = name.trim();
    if name.is_empty() {
        return Err(CostError::InvalidInput(
            "Meal name must not be empty".to_string(),
        ));
    }
    Ok(name.to_string())
}

/// Prompt for a sell price.
pub fn prompt_sell_price(default: f64) -> Result<f64> {
    let input: String = Input::new()
        .with_prompt("Sell price")
        .default(format!("{:.2}", default))
        .interact_text()?;

    let price = parse_number(&input)?;
    if price < 0.0 {
        return Err(CostError::InvalidInput(
            "Sell price must be non-negative".to_string(),
        ));
    }
    Ok(price)
}

/// Prompt for an ingredient with fuzzy matching. `None` finishes the meal.
pub fn prompt_ingredient<'a>(catalog: &'a IngredientCatalog) -> Result<Option<&'a Ingredient>> {
    loop {
        let input: String = Input::new()
            .with_prompt("Add ingredient (or press Enter to finish)")
            .allow_empty(true)
            .interact_text()?;

        let input = input.trim();
        if input.is_empty() {
            return Ok(None);
        }

        // Try exact match first (case-insensitive)
        if let Some(ingredient) = catalog.get(input) {
            return Ok(Some(ingredient));
        }

        let candidates = catalog.candidates(input);
        if candidates.is_empty() {
            println!("No matching ingredient found for '{}'", input);
            continue;
        }

        if candidates.len() == 1 {
            let ingredient = candidates[0].0;
            let confirm = Confirm::new()
                .with_prompt(format!("Did you mean '{}'?", ingredient.name))
                .default(true)
                .interact()?;

            if confirm {
                return Ok(Some(ingredient));
            }
            continue;
        }

        let options: Vec<&Ingredient> = candidates.iter().take(5).map(|(i, _)| *i).collect();
        let mut labels: Vec<String> = options.iter().map(|i| i.name.clone()).collect();
        labels.push("None of these".to_string());

        let selection = Select::new()
            .with_prompt("Which did you mean?")
            .items(&labels)
            .default(0)
            .interact()?;

        if selection < options.len() {
            return Ok(Some(options[selection]));
        }
    }
}

/// Prompt for a display unit valid for the ingredient.
pub fn prompt_unit(ingredient: &Ingredient) -> Result<&'static str> {
    let options = display_unit_options(ingredient.unit_type);
    if options.len() == 1 {
        return Ok(options[0]);
    }

    let selection = Select::new()
        .with_prompt(format!("Unit for {}", ingredient.name))
        .items(options)
        .default(0)
        .interact()?;

    Ok(options[selection])
}

/// Prompt for a quantity in `unit`.
pub fn prompt_quantity(unit: &str) -> Result<f64> {
    let input: String = Input::new()
        .with_prompt(format!("Quantity per meal ({})", unit))
        .interact_text()?;

    parse_number(&input)
}

/// Prompt for yes/no confirmation.
pub fn prompt_yes_no(prompt: &str, default: bool) -> Result<bool> {
    Ok(Confirm::new()
        .with_prompt(prompt)
        .default(default)
        .interact()?)
}

/// Build or rebuild a meal interactively.
///
/// Starts from `existing` when editing. Rejected lines are reported and the
/// builder keeps going.
pub fn build_meal_interactive(catalog: &IngredientCatalog, existing: Option<&Meal>) -> Result<Meal> {
    if catalog.is_empty() {
        return Err(CostError::InvalidInput(
            "Add ingredients before building meals".to_string(),
        ));
    }

    let name = prompt_meal_name(existing.map(|m| m.name.as_str()))?;
    let mut meal = match existing {
        Some(m) => {
            let mut meal = m.clone();
            meal.name = name;
            meal
        }
        None => Meal::new(&name, 0.0),
    };

    while let Some(ingredient) = prompt_ingredient(catalog)? {
        let unit = prompt_unit(ingredient)?;
        let quantity = match prompt_quantity(unit) {
            Ok(q) => q,
            Err(e) => {
                println!("{}", e);
                continue;
            }
        };

        match add_line_item(&mut meal, catalog, &ingredient.name, quantity, unit) {
            Ok(line) => println!(
                "Added: {} {} {} = ${:.2}  (meal ingredients ${:.2})",
                line.quantity,
                line.unit,
                line.ingredient_name,
                line.total_cost(),
                ingredient_cost(&meal)
            ),
            Err(e) => println!("{}", e),
        }
    }

    meal.sell_price = prompt_sell_price(meal.sell_price)?;
    Ok(meal)
}
