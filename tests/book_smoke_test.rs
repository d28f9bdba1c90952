use assert_float_eq::assert_float_absolute_eq;
use tempfile::tempdir;

use meal_costing_rs::costing::AllocationContext;
use meal_costing_rs::error::CostError;
use meal_costing_rs::models::{AllocationUnit, OverheadLine, UnitType};
use meal_costing_rs::state::{CostingBook, load_book, save_book};

fn sample_book() -> CostingBook {
    let mut book = CostingBook::default();
    book.settings = AllocationContext::new(2000).unwrap();

    book.upsert_ingredient("Chicken Breast", UnitType::MassKg, 5.0, 45.0)
        .unwrap();
    book.upsert_ingredient("Rice", UnitType::MassKg, 10.0, 18.0)
        .unwrap();
    book.upsert_ingredient("Soy Sauce", UnitType::VolumeL, 1.0, 6.0)
        .unwrap();
    book.upsert_ingredient("Container", UnitType::Count, 100.0, 25.0)
        .unwrap();

    book.create_meal("Teriyaki Chicken", 14.0).unwrap();
    book.add_line_item("teriyaki chicken", "chicken breast", 180.0, "g")
        .unwrap();
    book.add_line_item("teriyaki chicken", "rice", 150.0, "g")
        .unwrap();
    book.add_line_item("teriyaki chicken", "soy sauce", 20.0, "ml")
        .unwrap();
    book.add_line_item("teriyaki chicken", "container", 1.0, "unit")
        .unwrap();

    book.create_meal("Plain Rice", 4.0).unwrap();
    book.add_line_item("plain rice", "rice", 250.0, "g").unwrap();

    book.add_overhead(OverheadLine::new("Kitchen Rent", "Rent", 4000.0, AllocationUnit::PerMonth))
        .unwrap();
    book.add_overhead(
        OverheadLine::new("Labels", "Packaging", 0.05, AllocationUnit::PerItem).with_usage_factor(2.0),
    )
    .unwrap();

    book
}

#[test]
fn test_dashboard_for_sample_menu() {
    let book = sample_book();
    let dashboard = book.dashboard();

    // Rent 4000 / 2000 meals + 2 labels at 0.05
    assert_float_absolute_eq!(dashboard.total_overhead, 2.1, 1e-9);
    assert_eq!(dashboard.rows.len(), 2);

    // 0.18 * 9 + 0.15 * 1.8 + 0.02 * 6 + 0.25
    let teriyaki = &dashboard.rows[0];
    assert_eq!(teriyaki.meal, "Teriyaki Chicken");
    assert_float_absolute_eq!(teriyaki.ingredient_cost, 2.26, 1e-9);
    assert_float_absolute_eq!(teriyaki.combined_cost, 4.36, 1e-9);
    assert_float_absolute_eq!(teriyaki.profit, 9.64, 1e-9);

    let rice = &dashboard.rows[1];
    assert_float_absolute_eq!(rice.ingredient_cost, 0.45, 1e-9);
    assert_float_absolute_eq!(rice.overhead_cost, teriyaki.overhead_cost, 1e-12);

    let summary = &dashboard.summary;
    assert_eq!(summary.meal_count, 2);
    assert_float_absolute_eq!(summary.total_ingredient_cost, 2.71, 1e-9);
    assert_float_absolute_eq!(summary.mean_overhead_cost, 2.1, 1e-9);
    assert_float_absolute_eq!(summary.total_sell_price, 18.0, 1e-9);
}

#[test]
fn test_price_change_needs_refresh() {
    let mut book = sample_book();
    let before = book.dashboard().rows[1].ingredient_cost;

    book.upsert_ingredient("rice", UnitType::MassKg, 10.0, 36.0)
        .unwrap();
    assert_float_absolute_eq!(book.dashboard().rows[1].ingredient_cost, before, 1e-12);

    assert_eq!(book.refresh_meal("plain rice").unwrap(), 1);
    assert_float_absolute_eq!(book.dashboard().rows[1].ingredient_cost, 0.9, 1e-9);
}

#[test]
fn test_deleted_ingredient_degrades_one_meal() {
    let mut book = sample_book();
    book.remove_ingredient("Soy Sauce").unwrap();

    let dashboard = book.dashboard();
    let teriyaki = &dashboard.rows[0];
    assert!(teriyaki.is_degraded());
    assert_eq!(teriyaki.missing_ingredients, vec!["Soy Sauce".to_string()]);
    assert_float_absolute_eq!(teriyaki.ingredient_cost, 2.14, 1e-9);
    assert!(!dashboard.rows[1].is_degraded());
    assert_eq!(dashboard.summary.degraded_meals, 1);

    let err = book.refresh_meal("teriyaki chicken").unwrap_err();
    assert!(matches!(err, CostError::IngredientNotFound(_)));
}

#[test]
fn test_invalid_edits_leave_book_untouched() {
    let mut book = sample_book();
    let before = book.dashboard();

    assert!(matches!(
        book.add_line_item("plain rice", "rice", -5.0, "g"),
        Err(CostError::InvalidQuantity(_))
    ));
    assert!(matches!(
        book.add_line_item("plain rice", "quinoa", 5.0, "g"),
        Err(CostError::IngredientNotFound(_))
    ));
    assert!(matches!(
        book.remove_line_item("plain rice", 9),
        Err(CostError::IndexOutOfRange { .. })
    ));
    assert!(matches!(
        book.set_sell_price("nonexistent", 3.0),
        Err(CostError::MealNotFound(_))
    ));
    assert!(book.upsert_ingredient("", UnitType::Count, 1.0, 1.0).is_err());

    assert_eq!(book.dashboard(), before);
}

#[test]
fn test_save_and_reload_preserves_costing() {
    let book = sample_book();
    let dir = tempdir().unwrap();
    let path = dir.path().join("costing_state.json");

    save_book(&path, &book).unwrap();
    let reloaded = load_book(&path).unwrap();

    assert_eq!(reloaded.settings, book.settings);
    assert_eq!(reloaded.ingredients().len(), 4);
    assert_eq!(reloaded.dashboard(), book.dashboard());
}
