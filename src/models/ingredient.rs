use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::costing::composition::cost_per_base_unit;
use crate::costing::constants::UNIT_COST_DISPLAY_DECIMALS;
use crate::costing::round_to;
use crate::error::CostError;

/// Canonical base unit family of an ingredient.
///
/// Mass is stored in kilograms, volume in litres and discrete items as a count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UnitType {
    #[serde(rename = "KG", alias = "kg", alias = "mass_kg")]
    MassKg,

    #[serde(rename = "L", alias = "l", alias = "volume_l")]
    VolumeL,

    #[serde(rename = "Unit", alias = "unit", alias = "count")]
    Count,
}

impl UnitType {
    pub const ALL: [UnitType; 3] = [UnitType::MassKg, UnitType::VolumeL, UnitType::Count];

    /// Short label used in tables and stored records.
    pub fn label(&self) -> &'static str {
        match self {
            UnitType::MassKg => "KG",
            UnitType::VolumeL => "L",
            UnitType::Count => "Unit",
        }
    }
}

impl fmt::Display for UnitType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for UnitType {
    type Err = CostError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "kg" | "mass" | "mass_kg" => Ok(UnitType::MassKg),
            "l" | "volume" | "volume_l" => Ok(UnitType::VolumeL),
            "unit" | "units" | "count" => Ok(UnitType::Count),
            other => Err(CostError::UnknownUnitType(other.to_string())),
        }
    }
}

/// A purchasable ingredient.
///
/// `purchase_size` is expressed in the base unit of `unit_type`, `purchase_cost`
/// is the total paid for that size. Cost per base unit is always derived.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ingredient {
    #[serde(rename = "Ingredient")]
    pub name: String,

    #[serde(rename = "Unit Type")]
    pub unit_type: UnitType,

    #[serde(rename = "Purchase Size")]
    pub purchase_size: f64,

    #[serde(rename = "Cost")]
    pub purchase_cost: f64,
}

impl Ingredient {
    pub fn new(name: &str, unit_type: UnitType, purchase_size: f64, purchase_cost: f64) -> Self {
        Self {
            name: title_case(name),
            unit_type,
            purchase_size,
            purchase_cost,
        }
    }

    /// Cost of one base unit (kg, L or unit). Zero when the purchase size is zero.
    #[inline]
    pub fn cost_per_base_unit(&self) -> f64 {
        cost_per_base_unit(self.purchase_size, self.purchase_cost)
    }

    /// Cost per base unit rounded for tables.
    pub fn cost_per_unit_display(&self) -> f64 {
        round_to(self.cost_per_base_unit(), UNIT_COST_DISPLAY_DECIMALS)
    }

    /// Input validation for new or edited records.
    pub fn is_valid(&self) -> bool {
        !self.name.trim().is_empty()
            && self.purchase_size > 0.0
            && self.purchase_size.is_finite()
            && self.purchase_cost >= 0.0
            && self.purchase_cost.is_finite()
    }

    /// Canonical key for lookups.
    pub fn key(&self) -> String {
        ingredient_key(&self.name)
    }
}

impl PartialEq for Ingredient {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl Eq for Ingredient {}

impl std::hash::Hash for Ingredient {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.key().hash(state);
    }
}

/// Lookup key for an ingredient name: trimmed and lowercased.
pub fn ingredient_key(name: &str) -> String {
    name.trim().to_lowercase()
}

/// Title-case each whitespace separated word ("plain flour" -> "Plain Flour").
pub fn title_case(name: &str) -> String {
    name.split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first
                    .to_uppercase()
                    .chain(chars.flat_map(char::to_lowercase))
                    .collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flour() -> Ingredient {
        Ingredient::new("flour", UnitType::MassKg, 10.0, 20.0)
    }

    #[test]
    fn test_cost_per_base_unit() {
        assert!((flour().cost_per_base_unit() - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_zero_purchase_size_costs_nothing() {
        let mut ing = flour();
        ing.purchase_size = 0.0;
        assert_eq!(ing.cost_per_base_unit(), 0.0);
        assert!(!ing.is_valid());
    }

    #[test]
    fn test_infinite_values_are_invalid() {
        let mut ing = flour();
        ing.purchase_cost = f64::INFINITY;
        assert!(!ing.is_valid());

        let mut ing = flour();
        ing.purchase_size = f64::INFINITY;
        assert!(!ing.is_valid());

        let mut ing = flour();
        ing.purchase_cost = f64::NAN;
        assert!(!ing.is_valid());
    }

    #[test]
    fn test_cost_recomputed_after_edit() {
        let mut ing = flour();
        ing.purchase_cost = 30.0;
        assert!((ing.cost_per_base_unit() - 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_display_rounding() {
        let ing = Ingredient::new("Salt", UnitType::MassKg, 3.0, 1.0);
        assert_eq!(ing.cost_per_unit_display(), 0.3333);
    }

    #[test]
    fn test_title_case() {
        assert_eq!(title_case("  plain   FLOUR "), "Plain Flour");
        assert_eq!(flour().name, "Flour");
    }

    #[test]
    fn test_equality_case_insensitive() {
        let mut other = flour();
        other.name = "FLOUR ".to_string();
        assert_eq!(flour(), other);
    }

    #[test]
    fn test_unit_type_parse() {
        assert_eq!("KG".parse::<UnitType>().unwrap(), UnitType::MassKg);
        assert_eq!("l".parse::<UnitType>().unwrap(), UnitType::VolumeL);
        assert_eq!("Unit".parse::<UnitType>().unwrap(), UnitType::Count);
        assert!("stone".parse::<UnitType>().is_err());
    }

    #[test]
    fn test_serde_uses_column_names() {
        let json = r#"{"Ingredient": "Milk", "Unit Type": "L", "Purchase Size": 2, "Cost": 3}"#;
        let ing: Ingredient = serde_json::from_str(json).unwrap();
        assert_eq!(ing.unit_type, UnitType::VolumeL);
        assert!((ing.cost_per_base_unit() - 1.5).abs() < 1e-9);
    }
}
