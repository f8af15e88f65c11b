use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

const APP_DIR: &str = "pingboard";

/// Optional overrides read from `settings.json`. Every field may be left
/// out; names follow the long CLI flags.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileSettings {
    pub refresh_hz: Option<u16>,
    pub log_file: Option<PathBuf>,
    pub transcript_dir: Option<PathBuf>,
    pub history: Option<usize>,
    pub queue_depth: Option<usize>,
}

fn config_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join(APP_DIR))
}

fn data_dir() -> Option<PathBuf> {
    dirs::data_local_dir().map(|p| p.join(APP_DIR))
}

pub fn settings_file_path() -> Option<PathBuf> {
    config_dir().map(|p| p.join("settings.json"))
}

pub fn default_log_file() -> PathBuf {
    data_dir()
        .map(|p| p.join("pingboard.log"))
        .unwrap_or_else(|| PathBuf::from("pingboard.log"))
}

pub fn default_transcript_dir() -> PathBuf {
    data_dir()
        .map(|p| p.join("transcripts"))
        .unwrap_or_else(|| PathBuf::from("transcripts"))
}

pub fn load() -> FileSettings {
    match settings_file_path() {
        Some(path) => load_from(&path),
        None => FileSettings::default(),
    }
}

/// Missing or unparsable files yield the defaults.
pub fn load_from(path: &Path) -> FileSettings {
    if !path.exists() {
        return FileSettings::default();
    }

    match fs::read_to_string(path)
        .map_err(|err| err.to_string())
        .and_then(|content| {
            serde_json::from_str::<FileSettings>(&content).map_err(|err| err.to_string())
        }) {
        Ok(settings) => settings,
        Err(err) => {
            eprintln!(
                "pingboard: ignoring settings file {}: {err}",
                path.display()
            );
            FileSettings::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        assert_eq!(
            load_from(&dir.path().join("settings.json")),
            FileSettings::default()
        );
    }

    #[test]
    fn partial_file_fills_known_fields() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("settings.json");
        fs::write(&path, r#"{ "refresh_hz": 4, "history": 500 }"#).expect("write");

        let settings = load_from(&path);
        assert_eq!(settings.refresh_hz, Some(4));
        assert_eq!(settings.history, Some(500));
        assert_eq!(settings.queue_depth, None);
    }

    #[test]
    fn malformed_file_yields_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("settings.json");
        fs::write(&path, "{ refresh_hz: ").expect("write");

        assert_eq!(load_from(&path), FileSettings::default());
    }

    #[test]
    fn default_paths_end_in_expected_names() {
        assert!(default_log_file().ends_with("pingboard.log"));
        assert!(default_transcript_dir().ends_with("transcripts"));
    }
}
