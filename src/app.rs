pub use crate::features::app::{AppState, ConfigEdit, Focus, edit_seed, parse_edit_command};
