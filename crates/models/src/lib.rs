pub mod errors;
pub mod db;
pub mod validation;
pub mod menu;

pub use menu::Menu;
pub use validation::{ValidationErrors, Validator};
