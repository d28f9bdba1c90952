/// Meals per carton for `PerCarton` overhead allocation.
pub const CARTON_SIZE: u32 = 24;

/// Weeks per month used to turn a monthly meal volume into a weekly one.
pub const WEEKS_PER_MONTH: f64 = 4.0;

/// Assumed meals produced per month when none is configured.
pub const DEFAULT_MEALS_PER_MONTH: u32 = 1000;

/// Items consumed per meal for `PerItem` overhead with no usage factor.
pub const DEFAULT_ITEMS_PER_MEAL: f64 = 1.0;

/// Cents per currency unit, for `PerMealCents` overhead.
pub const CENTS_PER_UNIT: f64 = 100.0;

// ─────────────────────────────────────────────────────────────────────────────
// Precision
// ─────────────────────────────────────────────────────────────────────────────

/// Decimal places kept for money values inside the engine.
pub const INTERNAL_DECIMALS: u32 = 6;

/// Decimal places shown for money values.
pub const MONEY_DISPLAY_DECIMALS: u32 = 2;

/// Decimal places shown for cost per base unit.
pub const UNIT_COST_DISPLAY_DECIMALS: u32 = 4;

/// Decimal places shown for margin percentages.
pub const MARGIN_DISPLAY_DECIMALS: u32 = 1;

/// Base units per kilo- / litre-scale display unit (g per kg, ml per L).
pub const METRIC_SCALE: f64 = 1000.0;

/// Minimum Jaro-Winkler similarity for an ingredient name suggestion.
pub const SUGGESTION_THRESHOLD: f64 = 0.7;

// ─────────────────────────────────────────────────────────────────────────────
// Catalogues
// ─────────────────────────────────────────────────────────────────────────────

/// Known overhead cost categories. Other values are accepted as free text.
pub const BUSINESS_COST_TYPES: [&str; 8] = [
    "Packaging",
    "Wages",
    "Utilities",
    "Rent",
    "Transport",
    "Overheads",
    "Admin",
    "Other",
];
