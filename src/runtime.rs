use crate::bus::UpdateBus;
use crate::common::cancel::CancelToken;
use crate::config::{Address, ProbeMode};
use crate::probe::{ProbeRequest, SessionId};
use crate::probe_engine::{RunnerOptions, spawn_runner};
use crate::store::{AddressStore, StoreError};
use crossbeam_channel::{Receiver, Sender};
use parking_lot::Mutex;
use std::sync::Arc;
use std::thread::{self, JoinHandle};


#[derive(Clone, Debug)]
pub enum ControlMessage {
    Start(ProbeRequest),
    Stop,
    Shutdown,
}

/// Owner of the single active probe.
///
/// `start` and `stop` only record the request and hand it to the scheduler
/// thread, which cancels and joins the running probe before it launches the
/// next one.
pub struct ProbeScheduler {
    store: Arc<AddressStore>,
    sender: Sender<ControlMessage>,
    active: Mutex<Option<ProbeRequest>>,
    join: Option<JoinHandle<()>>,
}

impl ProbeScheduler {
    pub fn spawn(store: Arc<AddressStore>, bus: UpdateBus, options: RunnerOptions) -> Self {
        let (tx, rx) = crossbeam_channel::unbounded();
        let worker_store = Arc::clone(&store);
        let join = thread::spawn(move || run_scheduler(worker_store, bus, options, rx));
        Self {
            store,
            sender: tx,
            active: Mutex::new(None),
            join: Some(join),
        }
    }

    /// Requests a probe of `address`, replacing whatever runs now.
    pub fn start(&self, address: Address, mode: ProbeMode) -> Result<(), StoreError> {
        let mut active = self.active.lock();
        if !self.store.claim_probe_target(address) {
            return Err(StoreError::UnknownAddress(address));
        }
        let request = ProbeRequest::new(address, mode);
        *active = Some(request);
        self.send(ControlMessage::Start(request));
        Ok(())
    }

    pub fn stop(&self) {
        let mut active = self.active.lock();
        self.store.release_probe_target();
        if active.take().is_some() {
            self.send(ControlMessage::Stop);
        }
    }

    /// Most recently requested probe, `None` when idle.
    pub fn active(&self) -> Option<ProbeRequest> {
        *self.active.lock()
    }

    /// Cancels the running probe and waits for every unit to finish.
    pub fn shutdown(mut self) {
        self.finish();
    }

    fn send(&self, message: ControlMessage) {
        if self.sender.send(message).is_err() {
            tracing::error!("probe scheduler is gone");
        }
    }

    fn finish(&mut self) {
        let Some(join) = self.join.take() else {
            return;
        };
        self.active.lock().take();
        self.store.release_probe_target();
        self.send(ControlMessage::Shutdown);
        if join.join().is_err() {
            tracing::error!("probe scheduler panicked");
        }
    }
}

impl Drop for ProbeScheduler {
    fn drop(&mut self) {
        self.finish();
    }
}

struct ActiveProbe {
    session: SessionId,
    request: ProbeRequest,
    cancel: CancelToken,
    join: JoinHandle<()>,
}

impl ActiveProbe {
    fn retire(self) {
        self.cancel.cancel();
        if self.join.join().is_err() {
            tracing::error!(session = %self.session, "probe runner panicked");
        }
        tracing::info!(
            session = %self.session,
            address = %self.request.address,
            mode = %self.request.mode,
            "probe session closed"
        );
    }
}

fn run_scheduler(
    store: Arc<AddressStore>,
    bus: UpdateBus,
    options: RunnerOptions,
    control_rx: Receiver<ControlMessage>,
) {
    let root = CancelToken::new();
    let mut session = SessionId::default();
    let mut current: Option<ActiveProbe> = None;

    while let Ok(first) = control_rx.recv() {
        let message = coalesce(first, &control_rx);
        if let Some(probe) = current.take() {
            probe.retire();
        }
        match message {
            ControlMessage::Start(request) => {
                session = session.next();
                current = Some(launch(session, request, &store, &bus, &options, &root));
            }
            ControlMessage::Stop => tracing::info!("probing stopped"),
            ControlMessage::Shutdown => break,
        }
    }

    root.cancel();
    if let Some(probe) = current.take() {
        probe.retire();
    }
    tracing::info!("probe scheduler stopped");
}

/// Folds queued requests into the newest one. A queued shutdown is never
/// overridden.
fn coalesce(first: ControlMessage, control_rx: &Receiver<ControlMessage>) -> ControlMessage {
    let mut latest = first;
    for next in control_rx.try_iter() {
        if !matches!(latest, ControlMessage::Shutdown) {
            latest = next;
        }
    }
    latest
}

fn launch(
    session: SessionId,
    request: ProbeRequest,
    store: &Arc<AddressStore>,
    bus: &UpdateBus,
    options: &RunnerOptions,
    root: &CancelToken,
) -> ActiveProbe {
    bus.publish_clear(session);
    bus.publish_title(request.title());
    if request.mode == ProbeMode::Ping {
        store.reset_statistics(&request.address);
        bus.publish_stats(session, request.address);
    }

    let cancel = root.child();
    let join = spawn_runner(
        session,
        request,
        Arc::clone(store),
        bus.clone(),
        options.clone(),
        cancel.clone(),
    );
    tracing::info!(
        %session,
        address = %request.address,
        mode = %request.mode,
        "probe session opened"
    );
    ActiveProbe {
        session,
        request,
        cancel,
        join,
    }
}
