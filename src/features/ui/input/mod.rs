mod help;
mod normal;
mod prompt;

pub(super) use help::handle_help_key;
pub(super) use normal::handle_normal_key;
pub(super) use prompt::handle_prompt_key;
