mod parsing;
mod state;

pub use parsing::{ConfigEdit, edit_seed, parse_edit_command};
pub use state::{AppState, Focus};
