use crate::config::Address;
use crate::probe::SessionId;
use crossbeam_channel::{Receiver, Sender, TrySendError};
use std::time::Duration;

pub const DEFAULT_OUTPUT_DEPTH: usize = 1024;
const CONTROL_DEPTH: usize = 1;
const STATS_DEPTH: usize = 16;

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct OutputLine {
    pub session: SessionId,
    pub text: String,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Update {
    /// Empty the outputs and statistics views for a new session.
    Clear(SessionId),
    Title(String),
    Stats { session: SessionId, address: Address },
    Line(OutputLine),
}

/// Bounded queue that evicts its oldest entry instead of blocking the
/// producer when the consumer falls behind.
#[derive(Clone)]
struct Lane<T> {
    tx: Sender<T>,
    rx: Receiver<T>,
}

impl<T> Lane<T> {
    fn new(depth: usize) -> Self {
        let (tx, rx) = crossbeam_channel::bounded(depth.max(1));
        Self { tx, rx }
    }

    fn publish(&self, item: T) -> usize {
        let mut evicted = 0;
        let mut item = item;
        loop {
            match self.tx.try_send(item) {
                Ok(()) => return evicted,
                Err(TrySendError::Full(back)) => {
                    if self.rx.try_recv().is_ok() {
                        evicted += 1;
                    }
                    item = back;
                }
                // The lane owns a receiver, so this cannot happen.
                Err(TrySendError::Disconnected(_)) => return evicted,
            }
        }
    }
}

/// Channels from the probing core to the presentation layer.
#[derive(Clone)]
pub struct UpdateBus {
    lines: Lane<OutputLine>,
    clear: Lane<SessionId>,
    title: Lane<String>,
    stats: Lane<(SessionId, Address)>,
}

impl UpdateBus {
    pub fn new(output_depth: usize) -> Self {
        Self {
            lines: Lane::new(output_depth),
            clear: Lane::new(CONTROL_DEPTH),
            title: Lane::new(CONTROL_DEPTH),
            stats: Lane::new(STATS_DEPTH),
        }
    }

    pub fn publish_line(&self, session: SessionId, text: impl Into<String>) {
        let evicted = self.lines.publish(OutputLine {
            session,
            text: text.into(),
        });
        if evicted > 0 {
            tracing::debug!(%session, evicted, "output lane full, dropped oldest lines");
        }
    }

    pub fn publish_clear(&self, session: SessionId) {
        self.clear.publish(session);
    }

    pub fn publish_title(&self, title: impl Into<String>) {
        self.title.publish(title.into());
    }

    pub fn publish_stats(&self, session: SessionId, address: Address) {
        self.stats.publish((session, address));
    }

    /// Consumer side of the bus. Lanes are multi-consumer queues, so a bus
    /// is meant to be drained by a single subscriber.
    pub fn subscriber(&self) -> BusSubscriber {
        BusSubscriber {
            lines: self.lines.rx.clone(),
            clear: self.clear.rx.clone(),
            title: self.title.rx.clone(),
            stats: self.stats.rx.clone(),
        }
    }
}

impl Default for UpdateBus {
    fn default() -> Self {
        Self::new(DEFAULT_OUTPUT_DEPTH)
    }
}

pub struct BusSubscriber {
    lines: Receiver<OutputLine>,
    clear: Receiver<SessionId>,
    title: Receiver<String>,
    stats: Receiver<(SessionId, Address)>,
}

impl BusSubscriber {
    /// Next pending update without blocking. Control lanes are checked
    /// before output so a clear is seen ahead of queued lines.
    pub fn try_next(&self) -> Option<Update> {
        if let Ok(session) = self.clear.try_recv() {
            return Some(Update::Clear(session));
        }
        if let Ok(title) = self.title.try_recv() {
            return Some(Update::Title(title));
        }
        if let Ok((session, address)) = self.stats.try_recv() {
            return Some(Update::Stats { session, address });
        }
        self.lines.try_recv().ok().map(Update::Line)
    }

    /// Blocks until an update arrives or `timeout` passes.
    pub fn next_timeout(&self, timeout: Duration) -> Option<Update> {
        if let Some(update) = self.try_next() {
            return Some(update);
        }
        crossbeam_channel::select! {
            recv(self.clear) -> msg => msg.ok().map(Update::Clear),
            recv(self.title) -> msg => msg.ok().map(Update::Title),
            recv(self.stats) -> msg => msg
                .ok()
                .map(|(session, address)| Update::Stats { session, address }),
            recv(self.lines) -> msg => msg.ok().map(Update::Line),
            default(timeout) => None,
        }
    }

    pub fn drain(&self) -> Vec<Update> {
        std::iter::from_fn(|| self.try_next()).collect()
    }
}
