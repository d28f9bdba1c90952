use std::path::Path;

use clap::Parser;
use tracing::info;

use meal_costing_rs::cli::{Cli, Command, IngredientAction, MealAction, OverheadAction};
use meal_costing_rs::costing::{
    AllocationContext, BUSINESS_COST_TYPES, compute_dashboard, display_unit_options,
    per_meal_allocation,
};
use meal_costing_rs::error::{CostError, Result};
use meal_costing_rs::interface::{
    build_meal_interactive, display_dashboard, display_ingredients, display_meal,
    display_meal_list, display_overheads, prompt_yes_no,
};
use meal_costing_rs::logging;
use meal_costing_rs::models::{AllocationUnit, OverheadChanges, OverheadLine};
use meal_costing_rs::state::{
    CostingBook, export_tables, load_book, save_book, write_dashboard_csv,
    write_overhead_breakdown_csv,
};

fn main() {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let path = cli.file.as_path();
    let mut book = load_book(path)?;
    let ctx = allocation_context(&book, cli.meals_per_month)?;

    match cli.command.unwrap_or_default() {
        Command::Dashboard { csv } => cmd_dashboard(&book, &ctx, csv.as_deref()),
        Command::Ingredient { action } => cmd_ingredient(path, &mut book, action),
        Command::Meal { action } => cmd_meal(path, &mut book, action),
        Command::Overhead { action } => cmd_overhead(path, &mut book, &ctx, action),
        Command::Settings {
            meals_per_month,
            carton_size,
        } => cmd_settings(path, &mut book, meals_per_month, carton_size),
        Command::Export { dir } => {
            export_tables(&dir, &book)?;
            let dashboard = compute_dashboard(book.meals(), book.ingredients(), book.overheads(), &ctx);
            write_dashboard_csv(dir.join("dashboard.csv"), &dashboard)?;
            write_overhead_breakdown_csv(dir.join("overhead_breakdown.csv"), &dashboard)?;
            println!("Exported tables to {}", dir.display());
            Ok(())
        }
        Command::Units { unit_type } => {
            println!("{}: {}", unit_type, display_unit_options(unit_type).join(", "));
            Ok(())
        }
    }
}

/// Stored settings, with the meal volume optionally overridden for this run.
fn allocation_context(book: &CostingBook, meals_per_month: Option<u32>) -> Result<AllocationContext> {
    let mut ctx = book.settings;
    if let Some(meals) = meals_per_month {
        ctx.meals_per_month = meals;
        ctx.validate()?;
    }
    Ok(ctx)
}

fn save(path: &Path, book: &CostingBook) -> Result<()> {
    save_book(path, book)?;
    info!(path = %path.display(), "State saved");
    Ok(())
}

/// Attach a "did you mean" hint to unknown ingredient errors.
fn with_suggestion(book: &CostingBook, err: CostError) -> CostError {
    match err {
        CostError::IngredientNotFound(name) => match book.ingredients().suggest(&name) {
            Some(hint) => CostError::IngredientNotFound(format!("{} (did you mean '{}'?)", name, hint)),
            None => CostError::IngredientNotFound(name),
        },
        other => other,
    }
}

fn cmd_dashboard(book: &CostingBook, ctx: &AllocationContext, csv: Option<&Path>) -> Result<()> {
    let dashboard = compute_dashboard(book.meals(), book.ingredients(), book.overheads(), ctx);
    display_dashboard(&dashboard);

    if let Some(csv_path) = csv {
        write_dashboard_csv(csv_path, &dashboard)?;
        println!("Dashboard written to {}", csv_path.display());
    }
    Ok(())
}

fn cmd_ingredient(path: &Path, book: &mut CostingBook, action: IngredientAction) -> Result<()> {
    match action {
        IngredientAction::Add {
            name,
            unit_type,
            size,
            cost,
        } => {
            let created = book.upsert_ingredient(&name, unit_type, size, cost)?;
            let ingredient = book.ingredients().find(&name)?;
            println!(
                "{} {}: $ {:.4} / {}",
                if created { "Added" } else { "Updated" },
                ingredient.name,
                ingredient.cost_per_unit_display(),
                ingredient.unit_type
            );
            let users = book.meals_using(&name);
            if !created && !users.is_empty() {
                println!(
                    "Meals keep their saved costs until refreshed: {}",
                    users.join(", ")
                );
            }
            save(path, book)
        }
        IngredientAction::List => {
            display_ingredients(book.ingredients().as_slice());
            Ok(())
        }
        IngredientAction::Remove { name } => {
            let removed = book.remove_ingredient(&name)?;
            println!("Removed {}", removed.name);
            save(path, book)
        }
    }
}

fn cmd_meal(path: &Path, book: &mut CostingBook, action: MealAction) -> Result<()> {
    match action {
        MealAction::Create { name, price } => {
            book.create_meal(&name, price)?;
            println!("Created meal '{}'", name.trim());
            save(path, book)
        }
        MealAction::AddLine {
            meal,
            ingredient,
            quantity,
            unit,
        } => {
            let unit = match unit {
                Some(u) => u,
                None => match book.ingredients().find(&ingredient) {
                    Ok(ing) => display_unit_options(ing.unit_type)[0].to_string(),
                    Err(e) => return Err(with_suggestion(book, e)),
                },
            };
            let line = match book.add_line_item(&meal, &ingredient, quantity, &unit) {
                Ok(line) => line,
                Err(e) => return Err(with_suggestion(book, e)),
            };
            println!(
                "Added {} {} {} (${:.2})",
                line.quantity,
                line.unit,
                line.ingredient_name,
                line.total_cost()
            );
            save(path, book)
        }
        MealAction::RemoveLine { meal, index } => {
            let line = book.remove_line_item(&meal, index)?;
            println!("Removed {} from {}", line.ingredient_name, meal.trim());
            save(path, book)
        }
        MealAction::EditLine {
            meal,
            index,
            quantity,
        } => {
            book.edit_line_quantity(&meal, index, quantity)?;
            display_meal(book.meal(&meal)?, book.ingredients());
            save(path, book)
        }
        MealAction::Rename { meal, new_name } => {
            book.rename_meal(&meal, &new_name)?;
            println!("Renamed '{}' to '{}'", meal.trim(), new_name.trim());
            save(path, book)
        }
        MealAction::Price { meal, price } => {
            book.set_sell_price(&meal, price)?;
            println!("{} now sells for $ {:.2}", meal.trim(), price);
            save(path, book)
        }
        MealAction::Delete { meal } => {
            let removed = book.delete_meal(&meal)?;
            println!("Deleted '{}'", removed.name);
            save(path, book)
        }
        MealAction::Refresh { meal } => {
            let names: Vec<String> = match meal {
                Some(name) => vec![name],
                None => book.meals().iter().map(|m| m.name.clone()).collect(),
            };

            let mut failures = 0;
            for name in &names {
                match book.refresh_meal(name) {
                    Ok(changed) => println!("{}: {} line(s) repriced", name, changed),
                    Err(e) => {
                        failures += 1;
                        println!("{}: not refreshed ({})", name, e);
                    }
                }
            }
            save(path, book)?;

            if failures > 0 && names.len() == 1 {
                return Err(CostError::InvalidInput(format!(
                    "Could not refresh '{}'",
                    names[0]
                )));
            }
            Ok(())
        }
        MealAction::Show { meal } => {
            display_meal(book.meal(&meal)?, book.ingredients());
            Ok(())
        }
        MealAction::List => {
            display_meal_list(book.meals());
            Ok(())
        }
        MealAction::Build { meal } => {
            let existing = match &meal {
                Some(name) => Some(book.meal(name)?.clone()),
                None => None,
            };

            let built = build_meal_interactive(book.ingredients(), existing.as_ref())?;
            display_meal(&built, book.ingredients());

            let renamed_from = existing
                .as_ref()
                .filter(|old| old.key() != built.key())
                .map(|old| old.name.clone());
            let clashes = book.meal(&built.name).is_ok()
                && (existing.is_none() || renamed_from.is_some());
            if clashes {
                let overwrite = prompt_yes_no(
                    &format!("A meal named '{}' exists. Overwrite it?", built.name),
                    false,
                )?;
                if !overwrite {
                    println!("Meal not saved.");
                    return Ok(());
                }
            }

            if !prompt_yes_no("Save meal?", true)? {
                println!("Meal not saved.");
                return Ok(());
            }

            if let Some(old_name) = renamed_from {
                book.delete_meal(&old_name)?;
            }
            book.save_meal(built)?;
            println!("Meal saved.");
            save(path, book)
        }
    }
}

fn cmd_overhead(
    path: &Path,
    book: &mut CostingBook,
    ctx: &AllocationContext,
    action: OverheadAction,
) -> Result<()> {
    match action {
        OverheadAction::Add {
            name,
            amount,
            unit,
            cost_type,
            usage,
            from,
            to,
        } => {
            let mut line = OverheadLine::new(&name, &cost_type, amount, unit)
                .with_effective_range(from, to);
            if let Some(factor) = usage {
                line = line.with_usage_factor(factor);
            }
            let share = per_meal_allocation(&line, ctx);
            book.add_overhead(line)?;
            println!("Added {} ($ {:.4} per meal)", name.trim(), share);
            save(path, book)
        }
        OverheadAction::List => {
            display_overheads(book.overheads());
            for line in book.overheads() {
                println!("  {} -> $ {:.4} per meal", line.name, per_meal_allocation(line, ctx));
            }
            Ok(())
        }
        OverheadAction::Edit {
            index,
            name,
            amount,
            unit,
            cost_type,
            usage,
            from,
            to,
        } => {
            let changes = OverheadChanges {
                name,
                cost_type,
                amount,
                unit,
                usage_factor: usage,
                effective_from: from,
                effective_to: to,
            };
            if changes.is_empty() {
                return Err(CostError::InvalidInput(
                    "Nothing to change: pass at least one field".to_string(),
                ));
            }
            let line = book.edit_overhead(index, &changes)?;
            println!(
                "Updated {} ($ {:.4} per meal)",
                line.name,
                per_meal_allocation(line, ctx)
            );
            save(path, book)
        }
        OverheadAction::Remove { target } => {
            let removed = match target.trim().parse::<usize>() {
                Ok(index) => book.remove_overhead(index)?,
                Err(_) => book.remove_overhead_named(&target)?,
            };
            println!("Removed {}", removed.name);
            save(path, book)
        }
        OverheadAction::Types => {
            println!("Cost types: {}", BUSINESS_COST_TYPES.join(", "));
            let units: Vec<String> = AllocationUnit::ALL
                .iter()
                .map(|u| format!("{} ({})", u.as_str(), u.label()))
                .collect();
            println!("Allocation units: {}", units.join(", "));
            Ok(())
        }
    }
}

fn cmd_settings(
    path: &Path,
    book: &mut CostingBook,
    meals_per_month: Option<u32>,
    carton_size: Option<u32>,
) -> Result<()> {
    let mut settings = book.settings;
    if let Some(meals) = meals_per_month {
        settings.meals_per_month = meals;
        settings.validate()?;
    }
    if let Some(size) = carton_size {
        settings = settings.with_carton_size(size)?;
    }

    book.settings = settings;
    println!(
        "Meals per month: {} | Carton size: {} | Weeks per month: {}",
        settings.meals_per_month, settings.carton_size, settings.weeks_per_month
    );
    save(path, book)
}
