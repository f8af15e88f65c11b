mod format;
mod header;
mod overlays;
mod panes;

pub(super) use header::{draw_footer, draw_header, draw_prompt};
pub(super) use overlays::{draw_help_popup, draw_terminal_too_small};
pub(super) use panes::draw_main;
