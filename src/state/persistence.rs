use std::collections::HashSet;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::costing::composition::validate_meal;
use crate::costing::constants::{MARGIN_DISPLAY_DECIMALS, MONEY_DISPLAY_DECIMALS};
use crate::costing::dashboard::Dashboard;
use crate::costing::overhead::AllocationContext;
use crate::error::{CostError, Result};
use crate::models::{Ingredient, IngredientCatalog, Meal, OverheadLine};
use crate::state::CostingBook;

/// On-disk layout of the state file.
#[derive(Debug, Default, Serialize, Deserialize)]
struct BookFile {
    #[serde(default)]
    settings: AllocationContext,

    #[serde(default)]
    ingredients: Vec<Ingredient>,

    #[serde(default)]
    meals: Vec<Meal>,

    #[serde(default)]
    overheads: Vec<OverheadLine>,
}

impl BookFile {
    /// Apply the same rules as interactive edits to every stored record.
    fn check(&self) -> Result<()> {
        self.settings.validate()?;

        for ingredient in &self.ingredients {
            if !ingredient.is_valid() {
                return Err(CostError::InvalidInput(format!(
                    "ingredient '{}' needs a name, a purchase size above 0 and a non-negative cost",
                    ingredient.name.trim()
                )));
            }
        }

        let catalog = IngredientCatalog::new(self.ingredients.clone());
        let mut seen = HashSet::new();
        for meal in &self.meals {
            validate_meal(meal, &catalog)?;
            if !seen.insert(meal.key()) {
                return Err(CostError::DuplicateMeal(meal.name.trim().to_string()));
            }
        }

        for line in &self.overheads {
            line.validate()?;
        }
        Ok(())
    }
}

/// Load a costing book from a JSON state file.
///
/// A missing file yields an empty book. Ingredients are deduplicated by
/// lowercase name (last occurrence wins). Records that an edit would refuse
/// (bad numbers, unknown units, duplicate meal names) fail the whole load.
pub fn load_book<P: AsRef<Path>>(path: P) -> Result<CostingBook> {
    let path = path.as_ref();
    if !path.exists() {
        info!(path = %path.display(), "State file not found, starting empty");
        return Ok(CostingBook::default());
    }

    let content = fs::read_to_string(path)?;
    let file: BookFile = serde_json::from_str(&content)?;
    file.check().map_err(|e| {
        CostError::InvalidInput(format!("{}: {}", path.display(), e))
    })?;

    debug!(
        ingredients = file.ingredients.len(),
        meals = file.meals.len(),
        overheads = file.overheads.len(),
        "Loaded state file"
    );

    Ok(CostingBook::new(
        file.settings,
        file.ingredients,
        file.meals,
        file.overheads,
    ))
}

/// Save a costing book as pretty-printed JSON.
pub fn save_book<P: AsRef<Path>>(path: P, book: &CostingBook) -> Result<()> {
    let file = BookFile {
        settings: book.settings,
        ingredients: book.ingredients().as_slice().to_vec(),
        meals: book.meals().to_vec(),
        overheads: book.overheads().to_vec(),
    };

    let json = serde_json::to_string_pretty(&file)?;
    fs::write(path.as_ref(), json)?;
    debug!(path = %path.as_ref().display(), "Saved state file");
    Ok(())
}

fn money(value: f64) -> String {
    format!("{:.*}", MONEY_DISPLAY_DECIMALS as usize, value)
}

/// Write the dashboard as one CSV row per meal.
pub fn write_dashboard_csv<P: AsRef<Path>>(path: P, dashboard: &Dashboard) -> Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;

    wtr.write_record([
        "Meal",
        "Ingredients",
        "Other Costs",
        "Total Cost",
        "Sell Price",
        "Profit Margin",
        "Margin %",
        "Missing Ingredients",
    ])?;

    for row in &dashboard.rows {
        wtr.write_record([
            row.meal.clone(),
            money(row.ingredient_cost),
            money(row.overhead_cost),
            money(row.combined_cost),
            money(row.sell_price),
            money(row.profit),
            format!("{:.*}", MARGIN_DISPLAY_DECIMALS as usize, row.margin_percent),
            row.missing_ingredients.join("; "),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}

/// Write each overhead line's share of one meal.
pub fn write_overhead_breakdown_csv<P: AsRef<Path>>(path: P, dashboard: &Dashboard) -> Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;
    wtr.write_record(["Name", "Type", "Amount", "Unit", "Per Meal"])?;
    for line in &dashboard.overhead {
        wtr.write_record([
            line.name.clone(),
            line.cost_type.clone(),
            line.amount.to_string(),
            line.unit.as_str().to_string(),
            line.per_meal.to_string(),
        ])?;
    }
    wtr.flush()?;
    Ok(())
}

/// Export the book as flat tables: one row per ingredient, per meal line
/// item and per overhead line.
pub fn export_tables<P: AsRef<Path>>(dir: P, book: &CostingBook) -> Result<()> {
    let dir = dir.as_ref();
    fs::create_dir_all(dir)?;

    let mut wtr = csv::Writer::from_path(dir.join("ingredients.csv"))?;
    wtr.write_record(["Ingredient", "Unit Type", "Purchase Size", "Cost", "Cost per Unit"])?;
    for ing in book.ingredients().iter() {
        wtr.write_record([
            ing.name.clone(),
            ing.unit_type.label().to_string(),
            ing.purchase_size.to_string(),
            ing.purchase_cost.to_string(),
            ing.cost_per_unit_display().to_string(),
        ])?;
    }
    wtr.flush()?;

    let mut wtr = csv::Writer::from_path(dir.join("meal_lines.csv"))?;
    wtr.write_record([
        "Meal",
        "Sell Price",
        "Ingredient",
        "Quantity",
        "Unit",
        "Base Quantity",
        "Cost per Unit",
        "Line Cost",
    ])?;
    for meal in book.meals() {
        for line in &meal.line_items {
            wtr.write_record([
                meal.name.clone(),
                meal.sell_price.to_string(),
                line.ingredient_name.clone(),
                line.quantity.to_string(),
                line.unit.clone(),
                line.base_quantity.to_string(),
                line.cost_per_unit.to_string(),
                line.total_cost().to_string(),
            ])?;
        }
    }
    wtr.flush()?;

    let mut wtr = csv::Writer::from_path(dir.join("overheads.csv"))?;
    wtr.write_record(["Name", "Type", "Amount", "Unit", "Usage Factor", "From", "To"])?;
    for line in book.overheads() {
        wtr.write_record([
            line.name.clone(),
            line.cost_type.clone(),
            line.amount.to_string(),
            line.unit.as_str().to_string(),
            line.usage_factor.map(|f| f.to_string()).unwrap_or_default(),
            line.effective_from.map(|d| d.to_string()).unwrap_or_default(),
            line.effective_to.map(|d| d.to_string()).unwrap_or_default(),
        ])?;
    }
    wtr.flush()?;

    info!(dir = %dir.display(), "Exported tables");
    Ok(())
}
