use crate::costing::composition::ingredient_cost;
use crate::costing::dashboard::Dashboard;
use crate::costing::units::to_display;
use crate::models::{Ingredient, IngredientCatalog, Meal, OverheadLine};

/// Display the costing dashboard in a formatted table.
pub fn display_dashboard(dashboard: &Dashboard) {
    if dashboard.rows.is_empty() {
        println!("No meals yet. Use 'meal create' or 'meal build' to add one.");
        return;
    }

    println!();
    println!("=== Costing Dashboard ===");
    println!();

    let width = dashboard
        .rows
        .iter()
        .map(|r| r.meal.len())
        .max()
        .unwrap_or(10)
        .max(4);

    println!(
        "{:<width$}  {:>11}  {:>11}  {:>11}  {:>11}  {:>11}  {:>8}",
        "Meal",
        "Ingredients",
        "Other Costs",
        "Total Cost",
        "Sell Price",
        "Profit",
        "Margin",
        width = width
    );

    for row in &dashboard.rows {
        let flag = if row.is_degraded() {
            format!("  [missing: {}]", row.missing_ingredients.join(", "))
        } else {
            String::new()
        };

        println!(
            "{:<width$}  $ {:>9.2}  $ {:>9.2}  $ {:>9.2}  $ {:>9.2}  $ {:>9.2}  {:>7.1}%{}",
            row.meal,
            row.ingredient_cost,
            row.overhead_cost,
            row.combined_cost,
            row.sell_price,
            row.profit,
            row.margin_percent,
            flag,
            width = width
        );
    }

    let s = &dashboard.summary;
    println!();
    println!("--- Summary ---");
    println!("Meals: {}", s.meal_count);
    if s.degraded_meals > 0 {
        println!("Meals with missing ingredients: {}", s.degraded_meals);
    }
    println!("Overhead per meal: $ {:.2}", dashboard.total_overhead);
    println!(
        "Mean ingredient cost: $ {:.2} | Mean total cost: $ {:.2} | Mean profit: $ {:.2}",
        s.mean_ingredient_cost, s.mean_combined_cost, s.mean_profit
    );
    println!(
        "Total sell price: $ {:.2} | Total cost: $ {:.2} | Total profit: $ {:.2}",
        s.total_sell_price, s.total_combined_cost, s.total_profit
    );
    println!("Mean margin: {:.1}%", s.mean_margin_percent);

    if !dashboard.overhead.is_empty() {
        println!();
        println!("--- Overhead per meal ---");
        for line in overhead_breakdown_lines(dashboard) {
            println!("{}", line);
        }
    }
    println!();
}

/// One line per overhead cost showing its share of every meal.
pub fn overhead_breakdown_lines(dashboard: &Dashboard) -> Vec<String> {
    let width = dashboard
        .overhead
        .iter()
        .map(|o| o.name.len())
        .max()
        .unwrap_or(4);

    dashboard
        .overhead
        .iter()
        .map(|o| {
            format!(
                "  {:<width$}  $ {:>9.4}  ($ {:.2} {})",
                o.name,
                o.per_meal,
                o.amount,
                o.unit,
                width = width
            )
        })
        .collect()
}

/// Display ingredients with their derived cost per unit.
pub fn display_ingredients(ingredients: &[Ingredient]) {
    if ingredients.is_empty() {
        println!("Ingredients: (none)");
        return;
    }

    println!();
    println!("=== Ingredients ({} items) ===", ingredients.len());
    println!();

    for ing in ingredients {
        let (size, unit) = to_display(ing.purchase_size, ing.unit_type);
        println!(
            "  {} - {} {} for $ {:.2} ($ {:.4} / {})",
            ing.name,
            size,
            unit,
            ing.purchase_cost,
            ing.cost_per_unit_display(),
            ing.unit_type
        );
    }

    println!();
}

/// Display a meal's line items and cost.
pub fn display_meal(meal: &Meal, catalog: &IngredientCatalog) {
    println!();
    println!("=== {} ===", meal.name);
    println!();

    if meal.is_empty() {
        println!("  (no ingredients)");
    }

    for (i, line) in meal.line_items.iter().enumerate() {
        let missing = if catalog.contains(&line.ingredient_name) {
            ""
        } else {
            "  [missing ingredient]"
        };
        println!(
            "{:>3}. {} {} {} @ $ {:.4} = $ {:.2}{}",
            i,
            line.quantity,
            line.unit,
            line.ingredient_name,
            line.cost_per_unit,
            line.total_cost(),
            missing
        );
    }

    println!();
    println!("Ingredient cost: $ {:.2}", ingredient_cost(meal));
    println!("Sell price: $ {:.2}", meal.sell_price);
    println!();
}

/// Display a short list of meals.
pub fn display_meal_list(meals: &[Meal]) {
    if meals.is_empty() {
        println!("Meals: (none)");
        return;
    }

    println!();
    println!("=== Meals ({} items) ===", meals.len());
    println!();
    for meal in meals {
        println!(
            "  {} - {} lines, ingredients $ {:.2}, sells for $ {:.2}",
            meal.name,
            meal.len(),
            ingredient_cost(meal),
            meal.sell_price
        );
    }
    println!();
}

/// Display overhead lines with their index.
pub fn display_overheads(lines: &[OverheadLine]) {
    if lines.is_empty() {
        println!("Business costs: (none)");
        return;
    }

    println!();
    println!("=== Business Costs ({} items) ===", lines.len());
    println!();
    for (i, line) in lines.iter().enumerate() {
        let usage = line
            .usage_factor
            .map(|f| format!(" x{}", f))
            .unwrap_or_default();
        println!(
            "{:>3}. {} [{}] - $ {:.2} {}{}",
            i, line.name, line.cost_type, line.amount, line.unit, usage
        );
    }
    println!();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::costing::{AllocationContext, compute_dashboard};
    use crate::models::{AllocationUnit, OverheadLine};

    #[test]
    fn test_overhead_breakdown_lines() {
        let overheads = vec![
            OverheadLine::new("Rent", "Rent", 3000.0, AllocationUnit::PerMonth),
            OverheadLine::new("Cartons", "Packaging", 240.0, AllocationUnit::PerCarton),
        ];
        let ctx = AllocationContext::new(1000).unwrap();
        let meals = vec![Meal::new("Bread", 20.0)];
        let dashboard = compute_dashboard(&meals, &IngredientCatalog::default(), &overheads, &ctx);

        let lines = overhead_breakdown_lines(&dashboard);
        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains("Rent"));
        assert!(lines[0].contains("3.0000"));
        assert!(lines[1].contains("Cartons"));
        assert!(lines[1].contains("10.0000"));
    }
}
