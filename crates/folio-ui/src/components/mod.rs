//! Gallery view components

mod category_pills;
mod project_card;
mod project_grid;
mod search_input;
mod sort_select;
mod view_toggle;

pub use category_pills::*;
pub use project_card::*;
pub use project_grid::*;
pub use search_input::*;
pub use sort_select::*;
pub use view_toggle::*;
