use serde::Serialize;
use tracing::{debug, warn};

use crate::costing::constants::INTERNAL_DECIMALS;
use crate::costing::overhead::{AllocationContext, per_meal_allocation};
use crate::costing::round_to;
use crate::models::{AllocationUnit, IngredientCatalog, Meal, OverheadLine};

/// Computed profitability of one meal.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CostingSnapshot {
    pub meal: String,
    pub ingredient_cost: f64,
    pub overhead_cost: f64,
    pub combined_cost: f64,
    pub sell_price: f64,
    pub profit: f64,
    pub margin_percent: f64,

    /// Ingredients referenced by the meal that no longer exist. Their lines
    /// contribute nothing to `ingredient_cost`.
    pub missing_ingredients: Vec<String>,
}

impl CostingSnapshot {
    /// True when the ingredient cost is incomplete.
    pub fn is_degraded(&self) -> bool {
        !self.missing_ingredients.is_empty()
    }
}

/// Per-meal share of a single overhead line.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OverheadBreakdown {
    pub name: String,
    pub cost_type: String,
    pub amount: f64,
    pub unit: AllocationUnit,
    pub per_meal: f64,
}

/// Portfolio-level sums and means across all meals.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PortfolioSummary {
    pub meal_count: usize,
    pub degraded_meals: usize,

    pub total_ingredient_cost: f64,
    pub total_overhead_cost: f64,
    pub total_combined_cost: f64,
    pub total_sell_price: f64,
    pub total_profit: f64,

    pub mean_ingredient_cost: f64,
    pub mean_overhead_cost: f64,
    pub mean_combined_cost: f64,
    pub mean_sell_price: f64,
    pub mean_profit: f64,
    pub mean_margin_percent: f64,
}

/// Full costing view, regenerated from scratch on every call.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dashboard {
    pub rows: Vec<CostingSnapshot>,
    pub overhead: Vec<OverheadBreakdown>,
    pub total_overhead: f64,
    pub summary: PortfolioSummary,
}

/// Profit as a percentage of sell price. Zero when the sell price is zero.
#[inline]
pub fn margin_percent(profit: f64, sell_price: f64) -> f64 {
    if sell_price != 0.0 {
        profit / sell_price * 100.0
    } else {
        0.0
    }
}

/// Cost one meal against the shared per-meal overhead.
pub fn snapshot_meal(meal: &Meal, catalog: &IngredientCatalog, overhead: f64) -> CostingSnapshot {
    let mut ingredient_cost = 0.0;
    let mut missing_ingredients = Vec::new();

    for line in &meal.line_items {
        if catalog.contains(&line.ingredient_name) {
            ingredient_cost += line.total_cost();
        } else if !missing_ingredients.contains(&line.ingredient_name) {
            missing_ingredients.push(line.ingredient_name.clone());
        }
    }

    let ingredient_cost = round_to(ingredient_cost, INTERNAL_DECIMALS);
    let combined_cost = round_to(ingredient_cost + overhead, INTERNAL_DECIMALS);
    let profit = round_to(meal.sell_price - combined_cost, INTERNAL_DECIMALS);

    CostingSnapshot {
        meal: meal.name.clone(),
        ingredient_cost,
        overhead_cost: overhead,
        combined_cost,
        sell_price: meal.sell_price,
        profit,
        margin_percent: margin_percent(profit, meal.sell_price),
        missing_ingredients,
    }
}

/// Sums and means over a set of snapshots. Means are zero when empty.
pub fn summarize(rows: &[CostingSnapshot]) -> PortfolioSummary {
    if rows.is_empty() {
        return PortfolioSummary::default();
    }

    let n = rows.len() as f64;
    let sum = |f: fn(&CostingSnapshot) -> f64| round_to(rows.iter().map(f).sum(), INTERNAL_DECIMALS);

    let total_ingredient_cost = sum(|r| r.ingredient_cost);
    let total_overhead_cost = sum(|r| r.overhead_cost);
    let total_combined_cost = sum(|r| r.combined_cost);
    let total_sell_price = sum(|r| r.sell_price);
    let total_profit = sum(|r| r.profit);
    let total_margin = sum(|r| r.margin_percent);

    PortfolioSummary {
        meal_count: rows.len(),
        degraded_meals: rows.iter().filter(|r| r.is_degraded()).count(),
        total_ingredient_cost,
        total_overhead_cost,
        total_combined_cost,
        total_sell_price,
        total_profit,
        mean_ingredient_cost: total_ingredient_cost / n,
        mean_overhead_cost: total_overhead_cost / n,
        mean_combined_cost: total_combined_cost / n,
        mean_sell_price: total_sell_price / n,
        mean_profit: total_profit / n,
        mean_margin_percent: total_margin / n,
    }
}

/// Join meal ingredient costs with the shared overhead pool and sell prices.
///
/// Every meal absorbs the same total per-meal overhead. Meals referencing
/// deleted ingredients are costed without those lines and flagged, rather than
/// failing the whole dashboard.
pub fn compute_dashboard(
    meals: &[Meal],
    catalog: &IngredientCatalog,
    overheads: &[OverheadLine],
    ctx: &AllocationContext,
) -> Dashboard {
    let overhead: Vec<OverheadBreakdown> = overheads
        .iter()
        .map(|line| OverheadBreakdown {
            name: line.name.clone(),
            cost_type: line.cost_type.clone(),
            amount: line.amount,
            unit: line.unit,
            per_meal: per_meal_allocation(line, ctx),
        })
        .collect();

    let total_overhead = round_to(
        overhead.iter().map(|o| o.per_meal).sum(),
        INTERNAL_DECIMALS,
    );

    let rows: Vec<CostingSnapshot> = meals
        .iter()
        .map(|meal| snapshot_meal(meal, catalog, total_overhead))
        .collect();

    for row in rows.iter().filter(|r| r.is_degraded()) {
        warn!(
            meal = %row.meal,
            missing = ?row.missing_ingredients,
            "Meal references missing ingredients; cost is incomplete"
        );
    }

    let summary = summarize(&rows);
    debug!(
        meals = summary.meal_count,
        total_overhead, "Computed costing dashboard"
    );

    Dashboard {
        rows,
        overhead,
        total_overhead,
        summary,
    }
}
