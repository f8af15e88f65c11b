#![cfg(unix)]

use super::{ChildGuard, RunnerOptions, spawn_runner};
use crate::bus::{Update, UpdateBus};
use crate::common::cancel::CancelToken;
use crate::common::time::Clock;
use crate::config::{Address, ProbeConfig, ProbeMode};
use crate::features::probe::engine::command::{CommandFactory, ProbeCommand};
use crate::features::probe::engine::testing::{
    ScriptCommands, process_alive, read_pid, wait_until,
};
use crate::metrics::Statistics;
use crate::probe::{Platform, ProbeRequest, SessionId};
use crate::store::AddressStore;
use std::sync::Arc;
use std::time::{Duration, Instant, SystemTime};

const PING_OUTPUT: &str = r"printf 'PING 192.0.2.1 (192.0.2.1) 56(84) bytes of data.\n64 bytes from 192.0.2.1: icmp_seq=1 ttl=64 time=10.2 ms\n\n64 bytes from 192.0.2.1: icmp_seq=2 ttl=64 time=30.0 ms\nRequest timeout for icmp_seq 3\n64 bytes from 192.0.2.1: icmp_seq=4 ttl=64 time=20 ms\n'";

fn setup(text: &str) -> (Arc<AddressStore>, Address) {
    let store = Arc::new(AddressStore::new());
    store.add(text);
    (store, Address::parse(text).expect("valid address"))
}

fn script(body: impl Into<String>) -> RunnerOptions {
    let body = body.into();
    RunnerOptions::new(Arc::new(ScriptCommands(
        move |_: &ProbeRequest, _: &ProbeConfig| body.clone(),
    )))
}

fn output_lines(updates: &[Update]) -> Vec<String> {
    updates
        .iter()
        .filter_map(|update| match update {
            Update::Line(line) => Some(line.text.clone()),
            _ => None,
        })
        .collect()
}

struct FixedClock(SystemTime);

impl Clock for FixedClock {
    fn now(&self) -> SystemTime {
        self.0
    }
}

struct MissingProgram;

impl CommandFactory for MissingProgram {
    fn build(&self, _request: &ProbeRequest, _config: &ProbeConfig) -> ProbeCommand {
        ProbeCommand::new("/nonexistent/pingboard-probe", Vec::new())
    }

    fn platform(&self) -> Platform {
        Platform::Unix
    }
}

#[test]
fn ping_output_is_published_and_folded_into_statistics() {
    let (store, address) = setup("192.0.2.1");
    store
        .update_configuration(&address, |config| config.threshold = 20)
        .expect("edit");
    let bus = UpdateBus::default();
    let sub = bus.subscriber();

    let handle = spawn_runner(
        SessionId(1),
        ProbeRequest::new(address, ProbeMode::Ping),
        Arc::clone(&store),
        bus,
        script(PING_OUTPUT),
        CancelToken::new(),
    );
    handle.join().expect("runner");

    let updates = sub.drain();
    let lines = output_lines(&updates);
    assert_eq!(lines.len(), 5, "{lines:?}");
    assert!(lines[0].starts_with("PING 192.0.2.1"));
    assert!(updates.iter().any(|update| matches!(
        update,
        Update::Stats { session: SessionId(1), address: a } if *a == address
    )));

    let stats = *store.statistics(&address).expect("stats").lock();
    assert_eq!((stats.min, stats.avg, stats.max), (10, 20, 30));
    assert_eq!(stats.fails, 1);
    assert_eq!((stats.matched, stats.above, stats.under), (1, 1, 1));
}

#[test]
fn stderr_lines_join_the_output_stream() {
    let (store, address) = setup("192.0.2.2");
    let bus = UpdateBus::default();
    let sub = bus.subscriber();

    let handle = spawn_runner(
        SessionId(4),
        ProbeRequest::new(address, ProbeMode::Ping),
        Arc::clone(&store),
        bus,
        script("echo 'ping: sendmsg: Network is unreachable' >&2"),
        CancelToken::new(),
    );
    handle.join().expect("runner");

    let lines = output_lines(&sub.drain());
    assert_eq!(lines, vec!["ping: sendmsg: Network is unreachable"]);
    assert_eq!(store.statistics(&address).expect("stats").lock().fails, 1);
}

#[test]
fn traceroute_output_leaves_statistics_alone() {
    let (store, address) = setup("198.51.100.7");
    let bus = UpdateBus::default();
    let sub = bus.subscriber();

    let handle = spawn_runner(
        SessionId(2),
        ProbeRequest::new(address, ProbeMode::Traceroute),
        Arc::clone(&store),
        bus,
        script(r"printf ' 1  gateway (10.0.0.1)  1.123 ms  time=1 ms\n'"),
        CancelToken::new(),
    );
    handle.join().expect("runner");

    let updates = sub.drain();
    assert_eq!(output_lines(&updates).len(), 1);
    assert!(!updates.iter().any(|u| matches!(u, Update::Stats { .. })));
    assert_eq!(
        *store.statistics(&address).expect("stats").lock(),
        Statistics::default()
    );
}

#[test]
fn launch_records_last_started() {
    let (store, address) = setup("203.0.113.5");
    let started = SystemTime::UNIX_EPOCH + Duration::from_secs(1_700_000_000);
    let options = script("true").with_clock(Arc::new(FixedClock(started)));

    spawn_runner(
        SessionId(1),
        ProbeRequest::new(address, ProbeMode::Ping),
        Arc::clone(&store),
        UpdateBus::default(),
        options,
        CancelToken::new(),
    )
    .join()
    .expect("runner");

    let config = store.configuration(&address).expect("config");
    assert_eq!(config.read().last_started, Some(started));
    assert_ne!(config.read().started_label(), "n/a");
}

#[test]
fn spawn_failure_ends_session_without_output() {
    let (store, address) = setup("203.0.113.9");
    let bus = UpdateBus::default();
    let sub = bus.subscriber();

    let started = Instant::now();
    spawn_runner(
        SessionId(1),
        ProbeRequest::new(address, ProbeMode::Ping),
        Arc::clone(&store),
        bus,
        RunnerOptions::new(Arc::new(MissingProgram)),
        CancelToken::new(),
    )
    .join()
    .expect("runner");

    assert!(started.elapsed() < Duration::from_secs(5));
    assert!(sub.drain().is_empty());
}

#[test]
fn cancellation_kills_and_reaps_the_process() {
    let (store, address) = setup("192.0.2.50");
    let dir = tempfile::tempdir().expect("tempdir");
    let pid_path = dir.path().join("probe.pid");
    let cancel = CancelToken::new();

    let handle = spawn_runner(
        SessionId(1),
        ProbeRequest::new(address, ProbeMode::Ping),
        Arc::clone(&store),
        UpdateBus::default(),
        script(format!("echo $$ > {}; exec sleep 30", pid_path.display())),
        cancel.clone(),
    );
    assert!(wait_until(Duration::from_secs(5), || read_pid(&pid_path).is_some()));
    let pid = read_pid(&pid_path).expect("pid");
    assert!(process_alive(pid));

    let started = Instant::now();
    cancel.cancel();
    handle.join().expect("runner");

    assert!(started.elapsed() < Duration::from_secs(5));
    assert!(!process_alive(pid));
}

#[test]
fn cancellation_reaches_grandchildren() {
    let (store, address) = setup("192.0.2.51");
    let dir = tempfile::tempdir().expect("tempdir");
    let pid_path = dir.path().join("grandchild.pid");
    let cancel = CancelToken::new();

    let body = format!(
        "sh -c 'echo $$ > {}; exec sleep 30' & wait",
        pid_path.display()
    );
    let handle = spawn_runner(
        SessionId(1),
        ProbeRequest::new(address, ProbeMode::Traceroute),
        Arc::clone(&store),
        UpdateBus::default(),
        script(body),
        cancel.clone(),
    );
    assert!(wait_until(Duration::from_secs(5), || read_pid(&pid_path).is_some()));
    let pid = read_pid(&pid_path).expect("pid");

    cancel.cancel();
    handle.join().expect("runner");

    assert!(wait_until(Duration::from_secs(5), || !process_alive(pid)));
}

#[test]
fn backup_flag_writes_a_transcript() {
    let (store, address) = setup("192.0.2.1");
    store
        .update_configuration(&address, |config| config.backup = true)
        .expect("edit");
    let dir = tempfile::tempdir().expect("tempdir");

    spawn_runner(
        SessionId(1),
        ProbeRequest::new(address, ProbeMode::Ping),
        Arc::clone(&store),
        UpdateBus::default(),
        script(PING_OUTPUT).with_transcript_dir(Some(dir.path().to_path_buf())),
        CancelToken::new(),
    )
    .join()
    .expect("runner");

    let files: Vec<_> = std::fs::read_dir(dir.path())
        .expect("read dir")
        .filter_map(Result::ok)
        .collect();
    assert_eq!(files.len(), 1);
    let content = std::fs::read_to_string(files[0].path()).expect("transcript");
    assert_eq!(content.lines().count(), 5);
    assert!(content.contains("Request timeout for icmp_seq 3"));
}

#[test]
fn oversized_round_trip_is_recorded_and_cancellation_still_kills() {
    let (store, address) = setup("192.0.2.60");
    let dir = tempfile::tempdir().expect("tempdir");
    let pid_path = dir.path().join("oversized.pid");
    let cancel = CancelToken::new();

    let body = format!(
        "echo $$ > {}; echo '64 bytes from 192.0.2.60: icmp_seq=1 ttl=64 time=1e30 ms'; \
         exec sleep 30",
        pid_path.display()
    );
    let handle = spawn_runner(
        SessionId(1),
        ProbeRequest::new(address, ProbeMode::Ping),
        Arc::clone(&store),
        UpdateBus::default(),
        script(body),
        cancel.clone(),
    );
    let stats = store.statistics(&address).expect("stats");
    assert!(wait_until(Duration::from_secs(5), || stats.lock().replies == 1));
    let pid = read_pid(&pid_path).expect("pid");

    cancel.cancel();
    handle.join().expect("runner");

    assert!(!process_alive(pid));
    let stats = *stats.lock();
    assert_eq!(stats.max, u64::MAX);
    assert!(stats.avg >= stats.min && stats.avg <= stats.max);
}

#[test]
fn process_outliving_its_output_is_killed_on_cancel() {
    let (store, address) = setup("192.0.2.61");
    let dir = tempfile::tempdir().expect("tempdir");
    let pid_path = dir.path().join("silent.pid");
    let cancel = CancelToken::new();

    let body = format!(
        "exec >/dev/null 2>&1; echo $$ > {}; exec sleep 30",
        pid_path.display()
    );
    let handle = spawn_runner(
        SessionId(1),
        ProbeRequest::new(address, ProbeMode::Ping),
        Arc::clone(&store),
        UpdateBus::default(),
        script(body),
        cancel.clone(),
    );
    assert!(wait_until(Duration::from_secs(5), || read_pid(&pid_path).is_some()));
    let pid = read_pid(&pid_path).expect("pid");
    std::thread::sleep(Duration::from_millis(100));
    assert!(!handle.is_finished());

    let started = Instant::now();
    cancel.cancel();
    handle.join().expect("runner");

    assert!(started.elapsed() < Duration::from_secs(5));
    assert!(!process_alive(pid));
}

#[test]
fn process_outliving_its_output_ends_the_session_when_it_exits() {
    let (store, address) = setup("192.0.2.62");
    let started = Instant::now();

    spawn_runner(
        SessionId(1),
        ProbeRequest::new(address, ProbeMode::Ping),
        Arc::clone(&store),
        UpdateBus::default(),
        script("exec >/dev/null 2>&1; sleep 0.2"),
        CancelToken::new(),
    )
    .join()
    .expect("runner");

    assert!(started.elapsed() >= Duration::from_millis(200));
    assert!(started.elapsed() < Duration::from_secs(5));
}

#[test]
fn unwinding_kills_the_guarded_process() {
    let dir = tempfile::tempdir().expect("tempdir");
    let pid_path = dir.path().join("unwind.pid");
    let command = ProbeCommand::new(
        "sh",
        vec![
            "-c".to_string(),
            format!("echo $$ > {}; exec sleep 30", pid_path.display()),
        ],
    );

    let watched = pid_path.clone();
    let outcome = std::thread::spawn(move || {
        let child = command.spawn().expect("spawn");
        let _process = ChildGuard::new(SessionId(1), child);
        assert!(wait_until(Duration::from_secs(5), || read_pid(&watched).is_some()));
        panic!("runner failed with a live process");
    })
    .join();

    assert!(outcome.is_err());
    let pid = read_pid(&pid_path).expect("pid");
    assert!(!process_alive(pid));
}
