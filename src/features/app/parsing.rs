use crate::config::ProbeConfig;

/// Field changes typed into the edit prompt, e.g.
/// `requests=5 timeout=2 size=64 threshold=20 backup=on`.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct ConfigEdit {
    pub requests: Option<u32>,
    pub timeout: Option<u32>,
    pub size: Option<u32>,
    pub threshold: Option<u64>,
    pub backup: Option<bool>,
}

impl ConfigEdit {
    pub fn apply(&self, config: &mut ProbeConfig) {
        if let Some(requests) = self.requests {
            config.requests = requests;
        }
        if let Some(timeout) = self.timeout {
            config.timeout = timeout;
        }
        if let Some(size) = self.size {
            config.size = size;
        }
        if let Some(threshold) = self.threshold {
            config.threshold = threshold;
        }
        if let Some(backup) = self.backup {
            config.backup = backup;
        }
    }
}

/// Returns `None` when no token names a known field with a valid value.
pub fn parse_edit_command(input: &str) -> Option<ConfigEdit> {
    let mut edit = ConfigEdit::default();
    let mut modified = false;
    for token in input.split_whitespace() {
        let Some((key, value)) = token.split_once('=') else {
            continue;
        };
        let applied = match key {
            "requests" => value.parse::<u32>().ok().map(|v| edit.requests = Some(v)),
            "timeout" => value.parse::<u32>().ok().map(|v| edit.timeout = Some(v)),
            "size" => value.parse::<u32>().ok().map(|v| edit.size = Some(v)),
            "threshold" => value.parse::<u64>().ok().map(|v| edit.threshold = Some(v)),
            "backup" => parse_switch(value).map(|v| edit.backup = Some(v)),
            _ => None,
        };
        modified |= applied.is_some();
    }

    if modified { Some(edit) } else { None }
}

fn parse_switch(input: &str) -> Option<bool> {
    match input {
        "on" | "true" | "yes" => Some(true),
        "off" | "false" | "no" => Some(false),
        _ => None,
    }
}

/// Prompt text pre-filled with the current values.
pub fn edit_seed(config: &ProbeConfig) -> String {
    format!(
        "requests={} timeout={} size={} threshold={} backup={}",
        config.requests,
        config.timeout,
        config.size,
        config.threshold,
        if config.backup { "on" } else { "off" }
    )
}
