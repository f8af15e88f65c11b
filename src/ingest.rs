use crate::store::AddressStore;
use std::fs::File;
use std::io::{self, BufRead, BufReader, IsTerminal};
use std::path::Path;

/// Adds one address per line. Blank lines, invalid literals and duplicates
/// are skipped. Returns the number of new addresses.
pub fn load_reader(store: &AddressStore, reader: impl BufRead) -> usize {
    let mut added = 0;
    for line in reader.lines() {
        match line {
            Ok(line) => {
                if store.add(&line) {
                    added += 1;
                }
            }
            Err(err) => {
                tracing::warn!(%err, "stopped reading address list");
                break;
            }
        }
    }
    added
}

pub fn load_files<P: AsRef<Path>>(store: &AddressStore, paths: &[P]) -> usize {
    paths
        .iter()
        .map(|path| load_file(store, path.as_ref()))
        .sum()
}

fn load_file(store: &AddressStore, path: &Path) -> usize {
    match File::open(path) {
        Ok(file) => {
            let added = load_reader(store, BufReader::new(file));
            tracing::info!(path = %path.display(), added, "address list loaded");
            added
        }
        Err(err) => {
            tracing::warn!(path = %path.display(), %err, "cannot open address list");
            0
        }
    }
}

/// Reads addresses from standard input when it is a pipe or a file.
pub fn load_piped_stdin(store: &AddressStore) -> usize {
    let stdin = io::stdin();
    if stdin.is_terminal() {
        return 0;
    }
    let added = load_reader(store, stdin.lock());
    tracing::info!(added, "address list read from stdin");
    added
}
