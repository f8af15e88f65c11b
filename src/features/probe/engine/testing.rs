use super::command::{CommandFactory, ProbeCommand};
use crate::config::ProbeConfig;
use crate::probe::{Platform, ProbeRequest};
use std::time::{Duration, Instant};

/// Runs `sh -c <script>` instead of the system probe tools.
pub(crate) struct ScriptCommands<F>(pub(crate) F);

impl<F> CommandFactory for ScriptCommands<F>
where
    F: Fn(&ProbeRequest, &ProbeConfig) -> String + Send + Sync,
{
    fn build(&self, request: &ProbeRequest, config: &ProbeConfig) -> ProbeCommand {
        ProbeCommand::new("sh", vec!["-c".to_string(), (self.0)(request, config)])
    }

    fn platform(&self) -> Platform {
        Platform::Unix
    }
}

pub(crate) fn wait_until(timeout: Duration, mut condition: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + timeout;
    while Instant::now() < deadline {
        if condition() {
            return true;
        }
        std::thread::sleep(Duration::from_millis(10));
    }
    condition()
}

/// Pid written by a script as its first action, once the file is complete.
pub(crate) fn read_pid(path: &std::path::Path) -> Option<i32> {
    std::fs::read_to_string(path)
        .ok()
        .and_then(|text| text.trim().parse().ok())
}

#[cfg(unix)]
pub(crate) fn process_alive(pid: i32) -> bool {
    // SAFETY: signal 0 only checks for existence.
    unsafe { libc::kill(pid, 0) == 0 }
}
