use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{CostError, Result};

/// Policy governing how an overhead amount is spread across meals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum AllocationUnit {
    /// Amount per consumable item; multiplied by items used per meal.
    PerItem,
    /// Flat amount per meal.
    PerMeal,
    /// Flat amount per meal, entered in cents.
    PerMealCents,
    /// Amount per carton of meals.
    PerCarton,
    /// Amount per month, spread over the month's meal volume.
    PerMonth,
    /// Amount per week, spread over a week's share of the meal volume.
    PerWeek,
    /// Anything else; divided by the usage factor when one is given.
    Other,
}

impl AllocationUnit {
    pub const ALL: [AllocationUnit; 7] = [
        AllocationUnit::PerItem,
        AllocationUnit::PerMeal,
        AllocationUnit::PerMealCents,
        AllocationUnit::PerCarton,
        AllocationUnit::PerMonth,
        AllocationUnit::PerWeek,
        AllocationUnit::Other,
    ];

    /// Canonical identifier, used in stored records.
    pub fn as_str(&self) -> &'static str {
        match self {
            AllocationUnit::PerItem => "per_item",
            AllocationUnit::PerMeal => "per_meal",
            AllocationUnit::PerMealCents => "cents_per_meal",
            AllocationUnit::PerCarton => "per_carton",
            AllocationUnit::PerMonth => "per_month",
            AllocationUnit::PerWeek => "per_week",
            AllocationUnit::Other => "other",
        }
    }

    /// Human-readable label for tables.
    pub fn label(&self) -> &'static str {
        match self {
            AllocationUnit::PerItem => "$ / item",
            AllocationUnit::PerMeal => "$ / meal",
            AllocationUnit::PerMealCents => "¢ / meal",
            AllocationUnit::PerCarton => "$ / carton",
            AllocationUnit::PerMonth => "$ / month",
            AllocationUnit::PerWeek => "$ / week",
            AllocationUnit::Other => "Other",
        }
    }
}

impl fmt::Display for AllocationUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for AllocationUnit {
    type Err = CostError;

    fn from_str(s: &str) -> Result<Self> {
        let normalized: String = s
            .trim()
            .to_lowercase()
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect();

        match normalized.as_str() {
            "per_item" | "peritem" | "item" | "$/item" => Ok(AllocationUnit::PerItem),
            "per_meal" | "permeal" | "meal" | "$/meal" => Ok(AllocationUnit::PerMeal),
            "cents_per_meal" | "¢/meal" | "c/meal" => Ok(AllocationUnit::PerMealCents),
            "per_carton" | "percarton" | "carton" | "$/carton" => Ok(AllocationUnit::PerCarton),
            "per_month" | "permonth" | "month" | "$/month" => Ok(AllocationUnit::PerMonth),
            "per_week" | "perweek" | "week" | "$/week" => Ok(AllocationUnit::PerWeek),
            "other" | "$" => Ok(AllocationUnit::Other),
            _ => Err(CostError::UnknownAllocationUnit(s.to_string())),
        }
    }
}

impl TryFrom<String> for AllocationUnit {
    type Error = CostError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<AllocationUnit> for String {
    fn from(unit: AllocationUnit) -> Self {
        unit.as_str().to_string()
    }
}

/// A recurring or shared business cost (wages, packaging, rent, ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverheadLine {
    #[serde(rename = "Name")]
    pub name: String,

    /// Free-form category tag, informational only.
    #[serde(rename = "Type", default)]
    pub cost_type: String,

    #[serde(rename = "Amount")]
    pub amount: f64,

    #[serde(rename = "Unit")]
    pub unit: AllocationUnit,

    /// Meaning depends on `unit`: items per meal for `PerItem`, divisor for `Other`.
    #[serde(
        rename = "Usage Factor",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub usage_factor: Option<f64>,

    #[serde(rename = "From", default, skip_serializing_if = "Option::is_none")]
    pub effective_from: Option<NaiveDate>,

    #[serde(rename = "To", default, skip_serializing_if = "Option::is_none")]
    pub effective_to: Option<NaiveDate>,
}

impl OverheadLine {
    pub fn new(name: &str, cost_type: &str, amount: f64, unit: AllocationUnit) -> Self {
        Self {
            name: name.trim().to_string(),
            cost_type: cost_type.trim().to_string(),
            amount,
            unit,
            usage_factor: None,
            effective_from: None,
            effective_to: None,
        }
    }

    pub fn with_usage_factor(mut self, usage_factor: f64) -> Self {
        self.usage_factor = Some(usage_factor);
        self
    }

    pub fn with_effective_range(mut self, from: Option<NaiveDate>, to: Option<NaiveDate>) -> Self {
        self.effective_from = from;
        self.effective_to = to;
        self
    }

    /// Reject records that cannot be saved.
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(CostError::InvalidInput(
                "Overhead cost name must not be empty".to_string(),
            ));
        }
        if !(self.amount >= 0.0) || !self.amount.is_finite() {
            return Err(CostError::InvalidInput(format!(
                "{}: amount must be non-negative",
                self.name
            )));
        }
        if let Some(factor) = self.usage_factor {
            if !(factor >= 0.0) || !factor.is_finite() {
                return Err(CostError::InvalidInput(format!(
                    "{}: usage factor must be non-negative",
                    self.name
                )));
            }
        }
        if let (Some(from), Some(to)) = (self.effective_from, self.effective_to) {
            if from > to {
                return Err(CostError::InvalidInput(format!(
                    "{}: effective range ends before it starts",
                    self.name
                )));
            }
        }
        Ok(())
    }
}

/// Field changes for an existing overhead line. `None` keeps the stored value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OverheadChanges {
    pub name: Option<String>,
    pub cost_type: Option<String>,
    pub amount: Option<f64>,
    pub unit: Option<AllocationUnit>,
    pub usage_factor: Option<f64>,
    pub effective_from: Option<NaiveDate>,
    pub effective_to: Option<NaiveDate>,
}

impl OverheadChanges {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// A copy of `line` with these changes applied. Not validated.
    pub fn apply_to(&self, line: &OverheadLine) -> OverheadLine {
        let mut edited = line.clone();
        if let Some(name) = &self.name {
            edited.name = name.trim().to_string();
        }
        if let Some(cost_type) = &self.cost_type {
            edited.cost_type = cost_type.trim().to_string();
        }
        if let Some(amount) = self.amount {
            edited.amount = amount;
        }
        if let Some(unit) = self.unit {
            edited.unit = unit;
        }
        if self.usage_factor.is_some() {
            edited.usage_factor = self.usage_factor;
        }
        if self.effective_from.is_some() {
            edited.effective_from = self.effective_from;
        }
        if self.effective_to.is_some() {
            edited.effective_to = self.effective_to;
        }
        edited
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_legacy_labels() {
        assert_eq!("$ / meal".parse::<AllocationUnit>().unwrap(), AllocationUnit::PerMeal);
        assert_eq!("$ / week".parse::<AllocationUnit>().unwrap(), AllocationUnit::PerWeek);
        assert_eq!("$ / month".parse::<AllocationUnit>().unwrap(), AllocationUnit::PerMonth);
        assert_eq!("¢ / meal".parse::<AllocationUnit>().unwrap(), AllocationUnit::PerMealCents);
        assert_eq!("$".parse::<AllocationUnit>().unwrap(), AllocationUnit::Other);
        assert_eq!("Per_Carton".parse::<AllocationUnit>().unwrap(), AllocationUnit::PerCarton);
    }

    #[test]
    fn test_unknown_unit_is_an_error() {
        let err = "per fortnight".parse::<AllocationUnit>().unwrap_err();
        assert!(matches!(err, CostError::UnknownAllocationUnit(_)));
    }

    #[test]
    fn test_canonical_names_parse_back() {
        for unit in AllocationUnit::ALL {
            assert_eq!(unit.as_str().parse::<AllocationUnit>().unwrap(), unit);
        }
    }

    #[test]
    fn test_validate() {
        let line = OverheadLine::new("Rent", "Rent", 3000.0, AllocationUnit::PerMonth);
        assert!(line.validate().is_ok());

        let negative = OverheadLine::new("Rent", "Rent", -1.0, AllocationUnit::PerMonth);
        assert!(negative.validate().is_err());

        let unnamed = OverheadLine::new("  ", "Rent", 1.0, AllocationUnit::PerMonth);
        assert!(unnamed.validate().is_err());

        let bad_factor = OverheadLine::new("Box", "Packaging", 0.1, AllocationUnit::PerItem)
            .with_usage_factor(-2.0);
        assert!(bad_factor.validate().is_err());

        let endless = OverheadLine::new("Rent", "Rent", f64::INFINITY, AllocationUnit::PerMonth);
        assert!(endless.validate().is_err());

        let endless_factor = OverheadLine::new("Audit", "Admin", 90.0, AllocationUnit::Other)
            .with_usage_factor(f64::INFINITY);
        assert!(endless_factor.validate().is_err());
    }

    #[test]
    fn test_serde_rejects_unknown_unit() {
        let json = r#"{"Name": "Rent", "Type": "Rent", "Amount": 10, "Unit": "per decade"}"#;
        assert!(serde_json::from_str::<OverheadLine>(json).is_err());

        let json = r#"{"Name": "Rent", "Type": "Rent", "Amount": 10, "Unit": "$ / month"}"#;
        let line: OverheadLine = serde_json::from_str(json).unwrap();
        assert_eq!(line.unit, AllocationUnit::PerMonth);
        assert_eq!(line.usage_factor, None);
    }

    #[test]
    fn test_changes_keep_unset_fields() {
        let line = OverheadLine::new("Labels", "Packaging", 0.05, AllocationUnit::PerItem)
            .with_usage_factor(2.0);

        let changes = OverheadChanges {
            amount: Some(0.07),
            ..Default::default()
        };
        let edited = changes.apply_to(&line);
        assert_eq!(edited.amount, 0.07);
        assert_eq!(edited.usage_factor, Some(2.0));
        assert_eq!(edited.cost_type, "Packaging");

        let changes = OverheadChanges {
            unit: Some(AllocationUnit::PerMeal),
            cost_type: Some(" Wages ".to_string()),
            ..Default::default()
        };
        let edited = changes.apply_to(&line);
        assert_eq!(edited.unit, AllocationUnit::PerMeal);
        assert_eq!(edited.cost_type, "Wages");
        assert!(OverheadChanges::default().is_empty());
        assert!(!changes.is_empty());
    }
}
