use crate::bus::DEFAULT_OUTPUT_DEPTH;
use crate::data_model::settings::AppSettings;
use crate::storage::{self, FileSettings};
use clap::Parser;
use std::path::PathBuf;
use thiserror::Error;

const DEFAULT_REFRESH_HZ: u16 = 10;
const DEFAULT_HISTORY: usize = 2000;

#[derive(Parser, Debug, Default)]
#[command(name = "pingboard")]
#[command(about = "Interactive ping and traceroute dashboard", long_about = None)]
pub struct CliArgs {
    /// Address list files, one IP literal per line
    #[arg(value_name = "FILES")]
    files: Vec<PathBuf>,

    /// UI refresh rate (Hz) [default: 10]
    #[arg(long)]
    refresh_hz: Option<u16>,

    /// Log file destination
    #[arg(long, value_name = "PATH")]
    log_file: Option<PathBuf>,

    /// Directory for probe transcripts
    #[arg(long, value_name = "PATH")]
    transcript_dir: Option<PathBuf>,

    /// Output lines kept in the outputs view [default: 2000]
    #[arg(long)]
    history: Option<usize>,

    /// Pending output lines buffered between probe and UI [default: 1024]
    #[arg(long)]
    queue_depth: Option<usize>,
}

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("ui refresh rate must be greater than zero (got {value})")]
    InvalidRefreshHz { value: u16 },
    #[error("output history must be greater than zero (got {value})")]
    InvalidHistory { value: usize },
    #[error("queue depth must be greater than zero (got {value})")]
    InvalidQueueDepth { value: usize },
}

pub fn load_from_cli() -> Result<AppSettings, SettingsError> {
    let args = CliArgs::parse();
    from_args(args, storage::load())
}

pub fn from_args(args: CliArgs, file: FileSettings) -> Result<AppSettings, SettingsError> {
    let refresh_hz = args
        .refresh_hz
        .or(file.refresh_hz)
        .unwrap_or(DEFAULT_REFRESH_HZ);
    if refresh_hz == 0 {
        return Err(SettingsError::InvalidRefreshHz { value: refresh_hz });
    }

    let history = args.history.or(file.history).unwrap_or(DEFAULT_HISTORY);
    if history == 0 {
        return Err(SettingsError::InvalidHistory { value: history });
    }

    let queue_depth = args
        .queue_depth
        .or(file.queue_depth)
        .unwrap_or(DEFAULT_OUTPUT_DEPTH);
    if queue_depth == 0 {
        return Err(SettingsError::InvalidQueueDepth { value: queue_depth });
    }

    Ok(AppSettings {
        files: args.files,
        refresh_hz,
        log_file: args
            .log_file
            .or(file.log_file)
            .unwrap_or_else(storage::default_log_file),
        transcript_dir: args
            .transcript_dir
            .or(file.transcript_dir)
            .unwrap_or_else(storage::default_transcript_dir),
        history,
        queue_depth,
    })
}
