use serde::{Deserialize, Serialize};

use crate::costing::constants::INTERNAL_DECIMALS;
use crate::costing::round_to;

/// One ingredient-quantity pairing within a meal.
///
/// `cost_per_unit` is a snapshot of the ingredient's cost per base unit taken
/// when the line was added or last edited. Later price changes do not reach it
/// until the meal's costs are explicitly refreshed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    #[serde(rename = "Ingredient")]
    pub ingredient_name: String,

    /// Quantity as entered, in `unit`.
    #[serde(rename = "Quantity")]
    pub quantity: f64,

    #[serde(rename = "Unit")]
    pub unit: String,

    /// Quantity converted to the ingredient's base unit.
    #[serde(rename = "Base Quantity")]
    pub base_quantity: f64,

    #[serde(rename = "Cost per Unit")]
    pub cost_per_unit: f64,
}

impl LineItem {
    /// Line cost: base quantity times the snapshotted cost per unit.
    #[inline]
    pub fn total_cost(&self) -> f64 {
        round_to(self.base_quantity * self.cost_per_unit, INTERNAL_DECIMALS)
    }
}

/// A sellable meal composed of ingredient line items.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Meal {
    #[serde(rename = "Meal")]
    pub name: String,

    #[serde(rename = "Sell Price")]
    pub sell_price: f64,

    #[serde(rename = "Lines", default)]
    pub line_items: Vec<LineItem>,
}

impl Meal {
    pub fn new(name: &str, sell_price: f64) -> Self {
        Self {
            name: name.trim().to_string(),
            sell_price,
            line_items: Vec::new(),
        }
    }

    /// Canonical key for lookups (trimmed, lowercase name).
    pub fn key(&self) -> String {
        self.name.trim().to_lowercase()
    }

    pub fn len(&self) -> usize {
        self.line_items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.line_items.is_empty()
    }
}
