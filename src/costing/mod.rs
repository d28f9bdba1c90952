pub mod composition;
pub mod constants;
pub mod dashboard;
pub mod overhead;
pub mod units;

pub use composition::{
    add_line_item, build_line_item, cost_per_base_unit, edit_line_quantity, ingredient_cost,
    refresh_costs, remove_line_item, rename_meal, set_sell_price, validate_meal,
};
pub use constants::*;
pub use dashboard::{
    CostingSnapshot, Dashboard, OverheadBreakdown, PortfolioSummary, compute_dashboard,
    margin_percent, snapshot_meal, summarize,
};
pub use overhead::{AllocationContext, per_meal_allocation, total_per_meal_overhead};
pub use units::{display_unit_options, to_base, to_display};

/// Round a value to `decimals` decimal places.
pub fn round_to(value: f64, decimals: u32) -> f64 {
    let factor = 10_f64.powi(decimals as i32);
    (value * factor).round() / factor
}
