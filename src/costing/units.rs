//! Conversion between display units (g, ml, kg, L, unit) and base units.

use crate::costing::constants::METRIC_SCALE;
use crate::error::{CostError, Result};
use crate::models::UnitType;

/// Display unit labels accepted for each base unit type, with how many of
/// that display unit make up one base unit.
const MASS_UNITS: &[(&str, f64)] = &[
    ("kg", 1.0),
    ("kgs", 1.0),
    ("kilogram", 1.0),
    ("kilograms", 1.0),
    ("g", METRIC_SCALE),
    ("gram", METRIC_SCALE),
    ("grams", METRIC_SCALE),
];

const VOLUME_UNITS: &[(&str, f64)] = &[
    ("l", 1.0),
    ("litre", 1.0),
    ("litres", 1.0),
    ("liter", 1.0),
    ("liters", 1.0),
    ("ml", METRIC_SCALE),
    ("millilitre", METRIC_SCALE),
    ("millilitres", METRIC_SCALE),
    ("milliliter", METRIC_SCALE),
    ("milliliters", METRIC_SCALE),
];

const COUNT_UNITS: &[(&str, f64)] = &[
    ("unit", 1.0),
    ("units", 1.0),
    ("each", 1.0),
    ("ea", 1.0),
    ("pc", 1.0),
    ("pcs", 1.0),
];

fn known_units(unit_type: UnitType) -> &'static [(&'static str, f64)] {
    match unit_type {
        UnitType::MassKg => MASS_UNITS,
        UnitType::VolumeL => VOLUME_UNITS,
        UnitType::Count => COUNT_UNITS,
    }
}

/// How many `display_unit`s make one base unit of `unit_type`.
pub fn units_per_base(display_unit: &str, unit_type: UnitType) -> Result<f64> {
    let wanted = display_unit.trim().to_lowercase();
    known_units(unit_type)
        .iter()
        .find(|(label, _)| *label == wanted)
        .map(|(_, per_base)| *per_base)
        .ok_or_else(|| CostError::UnrecognizedUnit {
            unit: display_unit.to_string(),
            unit_type,
        })
}

/// Whether `display_unit` is valid for ingredients of `unit_type`.
pub fn is_known_unit(display_unit: &str, unit_type: UnitType) -> bool {
    units_per_base(display_unit, unit_type).is_ok()
}

/// Convert a quantity entered in `display_unit` into base units.
///
/// Fails with `UnrecognizedUnit` for labels outside the family of `unit_type`.
pub fn to_base(quantity: f64, display_unit: &str, unit_type: UnitType) -> Result<f64> {
    Ok(quantity / units_per_base(display_unit, unit_type)?)
}

/// Pick a readable display unit for a base quantity.
///
/// Sub-unit mass and volume quantities are shown in g / ml.
pub fn to_display(base_quantity: f64, unit_type: UnitType) -> (f64, &'static str) {
    match unit_type {
        UnitType::MassKg if base_quantity < 1.0 => (base_quantity * METRIC_SCALE, "g"),
        UnitType::MassKg => (base_quantity, "kg"),
        UnitType::VolumeL if base_quantity < 1.0 => (base_quantity * METRIC_SCALE, "ml"),
        UnitType::VolumeL => (base_quantity, "L"),
        UnitType::Count => (base_quantity, "unit"),
    }
}

/// Ordered display units offered for an ingredient of `unit_type`.
pub fn display_unit_options(unit_type: UnitType) -> &'static [&'static str] {
    match unit_type {
        UnitType::MassKg => &["kg", "g"],
        UnitType::VolumeL => &["L", "ml"],
        UnitType::Count => &["unit"],
    }
}
