pub mod cli;
pub mod costing;
pub mod error;
pub mod interface;
pub mod logging;
pub mod models;
pub mod state;

pub use error::{CostError, Result};
pub use models::{Ingredient, IngredientCatalog, LineItem, Meal, OverheadLine};
pub use state::CostingBook;
