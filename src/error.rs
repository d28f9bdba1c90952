use thiserror::Error;

use crate::models::UnitType;

#[derive(Debug, Error)]
pub enum CostError {
    #[error("Invalid quantity: {0} (must be greater than 0)")]
    InvalidQuantity(f64),

    #[error("Ingredient not found: {0}")]
    IngredientNotFound(String),

    #[error("Index {index} out of range (have {len} entries)")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("Unrecognized unit '{unit}' for {unit_type} ingredient")]
    UnrecognizedUnit { unit: String, unit_type: UnitType },

    #[error("Unknown allocation unit: {0}")]
    UnknownAllocationUnit(String),

    #[error("Unknown unit type: {0}")]
    UnknownUnitType(String),

    #[error("Meal not found: {0}")]
    MealNotFound(String),

    #[error("A meal named '{0}' already exists")]
    DuplicateMeal(String),

    #[error("Overhead cost not found: {0}")]
    OverheadNotFound(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Prompt error: {0}")]
    Prompt(#[from] dialoguer::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

pub type Result<T> = std::result::Result<T, CostError>;
