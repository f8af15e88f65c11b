use super::command::CommandFactory;
use super::transcript::Transcript;
use crate::bus::UpdateBus;
use crate::common::cancel::CancelToken;
use crate::common::time::{Clock, SystemClock};
use crate::config::{Address, ProbeMode};
use crate::probe::{Platform, ProbeRequest, SessionId};
use crate::store::{AddressStore, StatsHandle};
use crossbeam_channel::Sender;
use std::io::{BufRead, BufReader, Read};
use std::path::PathBuf;
use std::process::Child;
use std::sync::Arc;
use std::thread::{self, JoinHandle};

#[cfg(test)]
mod tests;

#[derive(Clone)]
pub struct RunnerOptions {
    pub commands: Arc<dyn CommandFactory>,
    pub clock: Arc<dyn Clock>,
    pub transcript_dir: Option<PathBuf>,
}

impl RunnerOptions {
    pub fn new(commands: Arc<dyn CommandFactory>) -> Self {
        Self {
            commands,
            clock: Arc::new(SystemClock),
            transcript_dir: None,
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_transcript_dir(mut self, dir: Option<PathBuf>) -> Self {
        self.transcript_dir = dir;
        self
    }
}

/// Runs one probe process on its own thread until it exits or `cancel`
/// fires. The returned handle completes only after the process is reaped
/// and its reader threads have stopped.
pub fn spawn_runner(
    session: SessionId,
    request: ProbeRequest,
    store: Arc<AddressStore>,
    bus: UpdateBus,
    options: RunnerOptions,
    cancel: CancelToken,
) -> JoinHandle<()> {
    thread::spawn(move || run_probe(session, request, &store, bus, &options, &cancel))
}

enum Step {
    Line(String),
    Cancelled,
    Exhausted,
}

fn run_probe(
    session: SessionId,
    request: ProbeRequest,
    store: &AddressStore,
    bus: UpdateBus,
    options: &RunnerOptions,
    cancel: &CancelToken,
) {
    let address = request.address;
    let Some(config) = store.configuration(&address) else {
        tracing::warn!(%session, %address, "probe target is no longer monitored");
        return;
    };
    let started = options.clock.now();
    let snapshot = {
        let mut config = config.write();
        config.last_started = Some(started);
        config.clone()
    };
    if cancel.is_cancelled() {
        return;
    }

    let command = options.commands.build(&request, &snapshot);
    let mut child = match command.spawn() {
        Ok(child) => child,
        Err(err) => {
            tracing::error!(%session, %command, %err, "failed to start probe");
            return;
        }
    };
    tracing::info!(%session, %command, pid = child.id(), "probe started");

    let (line_tx, line_rx) = crossbeam_channel::unbounded();
    let (stdout, stderr) = (child.stdout.take(), child.stderr.take());
    let mut process = ChildGuard::new(session, child);
    let (Some(stdout), Some(stderr)) = (stdout, stderr) else {
        tracing::error!(%session, "probe output stream unavailable");
        return;
    };
    process.readers = vec![
        spawn_reader(stdout, line_tx.clone()),
        spawn_reader(stderr, line_tx),
    ];

    let transcript = match (&options.transcript_dir, snapshot.backup) {
        (Some(dir), true) => match Transcript::open(dir, &request, started) {
            Ok(transcript) => {
                tracing::info!(%session, path = %transcript.path().display(), "transcript opened");
                Some(transcript)
            }
            Err(err) => {
                tracing::error!(%session, %err, "transcript disabled for this session");
                None
            }
        },
        _ => None,
    };
    let stats = match request.mode {
        ProbeMode::Ping => store.statistics(&address),
        ProbeMode::Traceroute => None,
    };
    let mut sink = LineSink {
        session,
        address,
        bus,
        platform: options.commands.platform(),
        threshold: snapshot.threshold,
        stats,
        transcript,
    };

    let cancelled = loop {
        let step = crossbeam_channel::select! {
            recv(cancel.signal()) -> _ => Step::Cancelled,
            recv(line_rx) -> msg => msg.map_or(Step::Exhausted, Step::Line),
        };
        match step {
            Step::Line(raw) => sink.accept(&raw),
            Step::Cancelled => break true,
            Step::Exhausted => break false,
        }
    };
    let cancelled = cancelled || process.wait_for_exit(cancel);
    process.finish(cancelled);
    tracing::info!(%session, %address, cancelled, "probe finished");
}

struct LineSink {
    session: SessionId,
    address: Address,
    bus: UpdateBus,
    platform: Platform,
    threshold: u64,
    stats: Option<StatsHandle>,
    transcript: Option<Transcript>,
}

impl LineSink {
    fn accept(&mut self, raw: &str) {
        let line = raw.trim();
        if line.is_empty() {
            return;
        }

        if let Some(transcript) = self.transcript.as_mut()
            && let Err(err) = transcript.write_line(line)
        {
            tracing::error!(session = %self.session, %err, "transcript write failed, disabling");
            self.transcript = None;
        }

        self.bus.publish_line(self.session, line);

        if let Some(stats) = &self.stats {
            let class = self.platform.classify(line);
            tracing::debug!(session = %self.session, ?class, line, "classified");
            if stats.lock().record(class, self.threshold) {
                self.bus.publish_stats(self.session, self.address);
            }
        }
    }
}

fn spawn_reader<R>(stream: R, tx: Sender<String>) -> JoinHandle<()>
where
    R: Read + Send + 'static,
{
    thread::spawn(move || {
        let mut reader = BufReader::new(stream);
        let mut buf = Vec::new();
        loop {
            buf.clear();
            match reader.read_until(b'\n', &mut buf) {
                Ok(0) => break,
                Ok(_) => {
                    let line = String::from_utf8_lossy(&buf).into_owned();
                    if tx.send(line).is_err() {
                        break;
                    }
                }
                Err(err) => {
                    tracing::debug!(%err, "probe output closed");
                    break;
                }
            }
        }
    })
}

/// Owns a spawned process until it is reaped. Dropping the guard first,
/// as when the runner unwinds, kills the process group.
struct ChildGuard {
    session: SessionId,
    child: Child,
    readers: Vec<JoinHandle<()>>,
    exit_watcher: Option<JoinHandle<()>>,
    finished: bool,
}

impl ChildGuard {
    fn new(session: SessionId, child: Child) -> Self {
        Self {
            session,
            child,
            readers: Vec::new(),
            exit_watcher: None,
            finished: false,
        }
    }

    /// Output streams can close before the process exits. Blocks until it
    /// exits or `cancel` fires and returns whether cancellation won.
    #[cfg(unix)]
    fn wait_for_exit(&mut self, cancel: &CancelToken) -> bool {
        let (exit_tx, exit_rx) = crossbeam_channel::bounded(1);
        let pid = self.child.id();
        self.exit_watcher = Some(thread::spawn(move || {
            wait_exited(pid);
            let _ = exit_tx.send(());
        }));
        crossbeam_channel::select! {
            recv(cancel.signal()) -> _ => true,
            recv(exit_rx) -> _ => false,
        }
    }

    // No exit notification to wait on next to the cancel signal; a process
    // that closed both streams has nothing left to show and is ended.
    #[cfg(not(unix))]
    fn wait_for_exit(&mut self, _cancel: &CancelToken) -> bool {
        true
    }

    /// Kills the process group when `kill` is set, then reaps the process
    /// and joins every helper thread.
    fn finish(&mut self, kill: bool) {
        if self.finished {
            return;
        }
        self.finished = true;
        if kill {
            terminate(&mut self.child);
        }
        // The watcher waits on this pid, so it is joined before the reap.
        if let Some(watcher) = self.exit_watcher.take()
            && watcher.join().is_err()
        {
            tracing::warn!(session = %self.session, "exit watcher panicked");
        }
        match self.child.wait() {
            Ok(status) => tracing::debug!(session = %self.session, %status, "probe reaped"),
            Err(err) => tracing::warn!(session = %self.session, %err, "failed to reap probe"),
        }
        for reader in self.readers.drain(..) {
            if reader.join().is_err() {
                tracing::warn!(session = %self.session, "output reader panicked");
            }
        }
    }
}

impl Drop for ChildGuard {
    fn drop(&mut self) {
        self.finish(true);
    }
}

/// Blocks until `pid` has exited without reaping it, so `Child::wait`
/// still owns the exit status.
#[cfg(unix)]
fn wait_exited(pid: u32) {
    let id = libc::id_t::from(pid);
    loop {
        // SAFETY: `info` is a valid out-pointer and WNOWAIT leaves the
        // child in a waitable state.
        let rc = unsafe {
            let mut info: libc::siginfo_t = std::mem::zeroed();
            libc::waitid(libc::P_PID, id, &mut info, libc::WEXITED | libc::WNOWAIT)
        };
        if rc == 0 {
            return;
        }
        let err = std::io::Error::last_os_error();
        if err.kind() != std::io::ErrorKind::Interrupted {
            tracing::warn!(pid, %err, "cannot wait for process exit");
            return;
        }
    }
}

fn terminate(child: &mut Child) {
    #[cfg(unix)]
    {
        if let Ok(pgid) = libc::pid_t::try_from(child.id()) {
            // SAFETY: signals the process group created for this child at spawn.
            if unsafe { libc::killpg(pgid, libc::SIGKILL) } == 0 {
                return;
            }
        }
    }
    if let Err(err) = child.kill() {
        tracing::debug!(%err, "probe already exited");
    }
}
