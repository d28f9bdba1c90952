pub mod prompts;
pub mod render;

pub use prompts::{
    build_meal_interactive, prompt_ingredient, prompt_meal_name, prompt_quantity,
    prompt_sell_price, prompt_unit, prompt_yes_no,
};
pub use render::{
    display_dashboard, display_ingredients, display_meal, display_meal_list, display_overheads,
    overhead_breakdown_lines,
};
