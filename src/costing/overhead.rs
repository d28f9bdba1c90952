use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::costing::constants::{
    CARTON_SIZE, CENTS_PER_UNIT, DEFAULT_ITEMS_PER_MEAL, DEFAULT_MEALS_PER_MONTH,
    INTERNAL_DECIMALS, WEEKS_PER_MONTH,
};
use crate::costing::round_to;
use crate::error::{CostError, Result};
use crate::models::{AllocationUnit, OverheadLine};

/// Production assumptions used to spread periodic costs across meals.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AllocationContext {
    pub meals_per_month: u32,

    #[serde(default = "default_carton_size")]
    pub carton_size: u32,

    #[serde(default = "default_weeks_per_month")]
    pub weeks_per_month: f64,
}

fn default_carton_size() -> u32 {
    CARTON_SIZE
}

fn default_weeks_per_month() -> f64 {
    WEEKS_PER_MONTH
}

impl Default for AllocationContext {
    fn default() -> Self {
        Self {
            meals_per_month: DEFAULT_MEALS_PER_MONTH,
            carton_size: CARTON_SIZE,
            weeks_per_month: WEEKS_PER_MONTH,
        }
    }
}

impl AllocationContext {
    pub fn new(meals_per_month: u32) -> Result<Self> {
        let ctx = Self {
            meals_per_month,
            ..Default::default()
        };
        ctx.validate()?;
        Ok(ctx)
    }

    pub fn with_carton_size(mut self, carton_size: u32) -> Result<Self> {
        self.carton_size = carton_size;
        self.validate()?;
        Ok(self)
    }

    pub fn validate(&self) -> Result<()> {
        if self.meals_per_month == 0 {
            return Err(CostError::InvalidInput(
                "Meals per month must be at least 1".to_string(),
            ));
        }
        if self.carton_size == 0 {
            return Err(CostError::InvalidInput(
                "Carton size must be at least 1".to_string(),
            ));
        }
        if !(self.weeks_per_month > 0.0) {
            return Err(CostError::InvalidInput(
                "Weeks per month must be positive".to_string(),
            ));
        }
        Ok(())
    }

    /// Meals produced in an average week.
    pub fn meals_per_week(&self) -> f64 {
        self.meals_per_month as f64 / self.weeks_per_month
    }
}

/// `numerator / denominator`, or 0 when the denominator is not positive.
fn guarded_div(numerator: f64, denominator: f64) -> f64 {
    if denominator > 0.0 {
        numerator / denominator
    } else {
        0.0
    }
}

/// Share of one overhead line carried by a single meal.
///
/// Never fails: any division by zero resolves to 0.
pub fn per_meal_allocation(line: &OverheadLine, ctx: &AllocationContext) -> f64 {
    let amount = line.amount;
    let allocation = match line.unit {
        AllocationUnit::PerItem => amount * line.usage_factor.unwrap_or(DEFAULT_ITEMS_PER_MEAL),
        AllocationUnit::PerMeal => amount,
        AllocationUnit::PerMealCents => amount / CENTS_PER_UNIT,
        AllocationUnit::PerCarton => guarded_div(amount, ctx.carton_size as f64),
        AllocationUnit::PerMonth => guarded_div(amount, ctx.meals_per_month as f64),
        AllocationUnit::PerWeek => guarded_div(amount, ctx.meals_per_week()),
        AllocationUnit::Other => guarded_div(amount, line.usage_factor.unwrap_or(0.0)),
    };

    trace!(name = %line.name, unit = %line.unit, allocation, "Allocated overhead");
    round_to(allocation, INTERNAL_DECIMALS)
}

/// Total overhead carried by every meal: the sum of each line's allocation.
pub fn total_per_meal_overhead(lines: &[OverheadLine], ctx: &AllocationContext) -> f64 {
    let total: f64 = lines.iter().map(|l| per_meal_allocation(l, ctx)).sum();
    round_to(total, INTERNAL_DECIMALS)
}
