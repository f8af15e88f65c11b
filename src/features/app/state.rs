use super::parsing::{edit_seed, parse_edit_command};
use crate::bus::{BusSubscriber, Update};
use crate::common::net::split_batch;
use crate::config::{Address, ProbeMode};
use crate::ingest;
use crate::probe::SessionId;
use crate::runtime::ProbeScheduler;
use crate::store::{AddressStore, StoreError};
use std::collections::VecDeque;
use std::path::PathBuf;
use std::sync::Arc;


const DEFAULT_TITLE: &str = " Outputs ";

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum Focus {
    #[default]
    Addresses,
    Outputs,
}

/// Everything the dashboard renders, fed by operator actions and the
/// update bus.
pub struct AppState {
    pub store: Arc<AddressStore>,
    scheduler: ProbeScheduler,
    updates: BusSubscriber,
    pub addresses: Vec<Address>,
    pub selected: usize,
    pub focus: Focus,
    pub outputs: VecDeque<String>,
    /// Lines scrolled back from the newest output line.
    pub output_offset: usize,
    pub title: String,
    pub stats_address: Option<Address>,
    pub notice: Option<String>,
    history: usize,
    view_session: SessionId,
}

impl AppState {
    pub fn new(
        store: Arc<AddressStore>,
        scheduler: ProbeScheduler,
        updates: BusSubscriber,
        history: usize,
    ) -> Self {
        let mut app = Self {
            store,
            scheduler,
            updates,
            addresses: Vec::new(),
            selected: 0,
            focus: Focus::default(),
            outputs: VecDeque::new(),
            output_offset: 0,
            title: DEFAULT_TITLE.to_string(),
            stats_address: None,
            notice: None,
            history: history.max(1),
            view_session: SessionId::default(),
        };
        app.refresh_addresses();
        app
    }

    pub fn refresh_addresses(&mut self) {
        self.addresses = self.store.list();
        if self.selected >= self.addresses.len() {
            self.selected = self.addresses.len().saturating_sub(1);
        }
    }

    pub fn selected_address(&self) -> Option<Address> {
        self.addresses.get(self.selected).copied()
    }

    pub fn active_probe(&self) -> Option<(Address, ProbeMode)> {
        self.scheduler
            .active()
            .map(|request| (request.address, request.mode))
    }

    pub fn select_next(&mut self) {
        if self.selected + 1 < self.addresses.len() {
            self.selected += 1;
        }
    }

    pub fn select_prev(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    pub fn scroll_outputs_up(&mut self) {
        if self.output_offset + 1 < self.outputs.len() {
            self.output_offset += 1;
        }
    }

    pub fn scroll_outputs_down(&mut self) {
        self.output_offset = self.output_offset.saturating_sub(1);
    }

    pub fn toggle_focus(&mut self) {
        self.focus = match self.focus {
            Focus::Addresses => Focus::Outputs,
            Focus::Outputs => Focus::Addresses,
        };
    }

    /// Applies every pending bus update. Returns whether anything changed.
    pub fn drain_updates(&mut self) -> bool {
        let mut changed = false;
        while let Some(update) = self.updates.try_next() {
            self.apply_update(update);
            changed = true;
        }
        changed
    }

    pub fn apply_update(&mut self, update: Update) {
        match update {
            Update::Clear(session) => {
                if session > self.view_session {
                    self.begin_session(session);
                }
            }
            Update::Title(title) => self.title = title,
            Update::Stats { session, address } => {
                if self.admit(session) {
                    self.stats_address = Some(address);
                }
            }
            Update::Line(line) => {
                if self.admit(line.session) {
                    self.push_output(line.text);
                }
            }
        }
    }

    /// Drops updates of superseded sessions; a newer session implies a
    /// clear even when its clear signal was overtaken.
    fn admit(&mut self, session: SessionId) -> bool {
        if session < self.view_session {
            return false;
        }
        if session > self.view_session {
            self.begin_session(session);
        }
        true
    }

    fn begin_session(&mut self, session: SessionId) {
        self.view_session = session;
        self.outputs.clear();
        self.output_offset = 0;
        self.stats_address = None;
    }

    fn push_output(&mut self, line: String) {
        self.outputs.push_back(line);
        while self.outputs.len() > self.history {
            self.outputs.pop_front();
        }
        if self.output_offset > 0 {
            self.output_offset = (self.output_offset + 1).min(self.outputs.len().saturating_sub(1));
        }
    }

    pub fn clear_outputs(&mut self) {
        self.outputs.clear();
        self.output_offset = 0;
    }

    pub fn start_probe(&mut self, mode: ProbeMode) {
        let Some(address) = self.selected_address() else {
            self.notice = Some("no address selected".to_string());
            return;
        };
        match self.scheduler.start(address, mode) {
            Ok(()) => self.notice = None,
            Err(err) => {
                self.notice = Some(err.to_string());
                self.refresh_addresses();
            }
        }
    }

    pub fn stop_probe(&mut self) {
        self.scheduler.stop();
        self.notice = None;
    }

    pub fn add_addresses(&mut self, input: &str) -> usize {
        let added = self.store.add_batch(input);
        self.refresh_addresses();
        if added == 0 && !input.trim().is_empty() {
            self.notice = Some(format!("nothing added from \"{}\"", input.trim()));
        } else {
            self.notice = None;
        }
        added
    }

    pub fn delete_addresses(&mut self, input: &str) -> usize {
        let target = self.store.probe_target();
        let refused = split_batch(input)
            .filter_map(Address::parse)
            .find(|address| Some(*address) == target);
        let removed = self.store.remove_batch(input);
        self.refresh_addresses();
        self.notice = refused.map(|address| StoreError::ProbeActive(address).to_string());
        removed
    }

    /// Moves the selection to an exact address match.
    pub fn search(&mut self, input: &str) -> bool {
        let position = Address::parse(input).and_then(|address| self.store.position(&address));
        match position {
            Some(index) => {
                self.refresh_addresses();
                self.selected = index.min(self.addresses.len().saturating_sub(1));
                self.focus = Focus::Addresses;
                self.notice = None;
                true
            }
            None => {
                self.notice = Some(format!("address not found: {}", input.trim()));
                false
            }
        }
    }

    /// Loads address lists from comma-separated file names.
    pub fn load_files(&mut self, input: &str) -> usize {
        let paths: Vec<PathBuf> = split_batch(input).map(PathBuf::from).collect();
        let added = ingest::load_files(&self.store, &paths);
        self.refresh_addresses();
        self.notice = Some(format!("loaded {added} new addresses"));
        added
    }

    pub fn edit_seed(&self) -> String {
        self.selected_address()
            .and_then(|address| self.store.configuration(&address))
            .map(|config| edit_seed(&config.read()))
            .unwrap_or_default()
    }

    pub fn edit_selected(&mut self, input: &str) -> bool {
        let Some(address) = self.selected_address() else {
            return false;
        };
        let Some(edit) = parse_edit_command(input) else {
            self.notice = Some("no valid settings in input".to_string());
            return false;
        };
        match self
            .store
            .update_configuration(&address, |config| edit.apply(config))
        {
            Ok(()) => {
                self.notice = None;
                true
            }
            Err(err) => {
                self.notice = Some(err.to_string());
                false
            }
        }
    }

    pub fn shutdown(self) {
        self.scheduler.shutdown();
    }
}
