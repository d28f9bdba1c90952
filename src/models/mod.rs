pub mod catalog;
pub mod ingredient;
pub mod meal;
pub mod overhead;

pub use catalog::IngredientCatalog;
pub use ingredient::{Ingredient, UnitType, ingredient_key, title_case};
pub use meal::{LineItem, Meal};
pub use overhead::{AllocationUnit, OverheadChanges, OverheadLine};
