/// Minimum terminal width required (columns)
pub(super) const MIN_TERMINAL_WIDTH: u16 = 80;
/// Minimum terminal height required (rows)
pub(super) const MIN_TERMINAL_HEIGHT: u16 = 20;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(super) enum PromptKind {
    Add,
    Delete,
    Search,
    Load,
    Edit,
}

impl PromptKind {
    pub(super) fn label(self) -> &'static str {
        match self {
            PromptKind::Add => " Add: <ip>[,<ip>...] ",
            PromptKind::Delete => " Delete: <ip>[,<ip>...] ",
            PromptKind::Search => " Search: <ip> ",
            PromptKind::Load => " Load: <file>[,<file>...] ",
            PromptKind::Edit => " Edit: ",
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(super) enum InputMode {
    Normal,
    Prompt(PromptKind),
    Help,
}
