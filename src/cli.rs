use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{ArgAction, Parser, Subcommand};

use crate::models::{AllocationUnit, UnitType};

/// Meal Costing — track ingredient and business costs and see what each meal earns.
#[derive(Parser, Debug)]
#[command(name = "meal_costing")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Path to the costing state JSON file.
    #[arg(
        short,
        long,
        env = "MEAL_COSTING_FILE",
        default_value = "costing_state.json",
        global = true
    )]
    pub file: PathBuf,

    /// Override the monthly meal volume for this run only.
    #[arg(long, global = true)]
    pub meals_per_month: Option<u32>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Show per-meal cost, profit and margin.
    Dashboard {
        /// Also write the dashboard to this CSV file.
        #[arg(long)]
        csv: Option<PathBuf>,
    },

    /// Manage ingredients.
    Ingredient {
        #[command(subcommand)]
        action: IngredientAction,
    },

    /// Manage meals and their line items.
    Meal {
        #[command(subcommand)]
        action: MealAction,
    },

    /// Manage business overhead costs.
    Overhead {
        #[command(subcommand)]
        action: OverheadAction,
    },

    /// Change stored allocation assumptions.
    Settings {
        /// Meals produced per month.
        #[arg(long)]
        meals_per_month: Option<u32>,

        /// Meals per carton.
        #[arg(long)]
        carton_size: Option<u32>,
    },

    /// Export ingredients, meal lines, overheads and dashboard as CSV tables.
    Export {
        /// Output directory.
        #[arg(long, default_value = "export")]
        dir: PathBuf,
    },

    /// List the display units available for a unit type (KG, L, Unit).
    Units { unit_type: UnitType },
}

impl Default for Command {
    fn default() -> Self {
        Command::Dashboard { csv: None }
    }
}

#[derive(Subcommand, Debug)]
pub enum IngredientAction {
    /// Add an ingredient or update an existing one.
    Add {
        name: String,

        /// Base unit type: KG, L or Unit.
        #[arg(long, short = 't')]
        unit_type: UnitType,

        /// Purchase size in the base unit (e.g. 5 for a 5 KG bag).
        #[arg(long)]
        size: f64,

        /// Total cost of the purchase.
        #[arg(long)]
        cost: f64,
    },

    /// List ingredients with cost per unit.
    List,

    /// Remove an ingredient.
    Remove { name: String },
}

#[derive(Subcommand, Debug)]
pub enum MealAction {
    /// Create an empty meal.
    Create {
        name: String,

        #[arg(long, default_value = "0")]
        price: f64,
    },

    /// Add an ingredient line to a meal.
    AddLine {
        meal: String,
        ingredient: String,
        quantity: f64,

        /// Display unit (g, kg, ml, L, unit). Defaults to the ingredient's base unit.
        #[arg(long, short)]
        unit: Option<String>,
    },

    /// Remove a line by its index (see 'meal show').
    RemoveLine { meal: String, index: usize },

    /// Change a line's quantity; its cost is re-read from the ingredient.
    EditLine {
        meal: String,
        index: usize,
        quantity: f64,
    },

    /// Rename a meal.
    Rename { meal: String, new_name: String },

    /// Set a meal's sell price.
    Price { meal: String, price: f64 },

    /// Delete a meal.
    Delete { meal: String },

    /// Re-read line costs from current ingredient prices (all meals if none given).
    Refresh { meal: Option<String> },

    /// Show a meal's lines and cost.
    Show { meal: String },

    /// List meals.
    List,

    /// Build a meal interactively, or edit an existing one.
    Build { meal: Option<String> },
}

#[derive(Subcommand, Debug)]
pub enum OverheadAction {
    /// Add a business cost.
    Add {
        name: String,
        amount: f64,

        /// Allocation unit: per_item, per_meal, per_carton, per_month, per_week, other, or a label like "$ / week".
        #[arg(long, short, default_value = "per_meal")]
        unit: AllocationUnit,

        /// Cost category (Packaging, Wages, Rent, ...).
        #[arg(long = "type", default_value = "Other")]
        cost_type: String,

        /// Items per meal for per_item, divisor for other.
        #[arg(long)]
        usage: Option<f64>,

        /// First day the cost applies (YYYY-MM-DD).
        #[arg(long)]
        from: Option<NaiveDate>,

        /// Last day the cost applies (YYYY-MM-DD).
        #[arg(long)]
        to: Option<NaiveDate>,
    },

    /// List business costs with their per-meal share.
    List,

    /// Change fields of a business cost in place.
    Edit {
        /// Position shown by `overhead list`.
        index: usize,

        #[arg(long)]
        name: Option<String>,

        #[arg(long)]
        amount: Option<f64>,

        #[arg(long, short)]
        unit: Option<AllocationUnit>,

        #[arg(long = "type")]
        cost_type: Option<String>,

        #[arg(long)]
        usage: Option<f64>,

        #[arg(long)]
        from: Option<NaiveDate>,

        #[arg(long)]
        to: Option<NaiveDate>,
    },

    /// Remove a business cost by index or name.
    Remove { target: String },

    /// Show known cost types and allocation units.
    Types,
}
