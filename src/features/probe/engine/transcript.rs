use crate::probe::ProbeRequest;
use chrono::{DateTime, Local};
use std::fs::{self, File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::SystemTime;

/// Append-only copy of a session's output lines.
pub struct Transcript {
    path: PathBuf,
    writer: BufWriter<File>,
}

impl Transcript {
    pub fn open(dir: &Path, request: &ProbeRequest, started: SystemTime) -> io::Result<Self> {
        fs::create_dir_all(dir)?;
        let stamp = DateTime::<Local>::from(started).format("%Y%m%d-%H%M%S");
        let path = dir.join(format!(
            "{}_{}_{}.log",
            request.address.file_stem(),
            request.mode.slug(),
            stamp
        ));
        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        Ok(Self {
            path,
            writer: BufWriter::new(file),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn write_line(&mut self, line: &str) -> io::Result<()> {
        writeln!(self.writer, "{line}")?;
        self.writer.flush()
    }
}
