use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Resolved startup settings: CLI flags over the settings file over
/// built-in defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppSettings {
    pub files: Vec<PathBuf>,
    pub refresh_hz: u16,
    pub log_file: PathBuf,
    pub transcript_dir: PathBuf,
    pub history: usize,
    pub queue_depth: usize,
}
