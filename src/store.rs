use crate::common::net::split_batch;
use crate::config::{Address, ProbeConfig, display_order};
use crate::metrics::Statistics;
use parking_lot::{Mutex, RwLock};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use thiserror::Error;


pub type ConfigHandle = Arc<RwLock<ProbeConfig>>;
pub type StatsHandle = Arc<Mutex<Statistics>>;

#[derive(Debug, Error, Eq, PartialEq)]
pub enum StoreError {
    #[error("address {0} is not monitored")]
    UnknownAddress(Address),
    #[error("address {0} is being probed")]
    ProbeActive(Address),
}

/// Registry of monitored addresses with their configuration and statistics.
///
/// Each map has its own lock. Membership changes are serialized by
/// `membership` so that the three maps always hold the same keys: records
/// are inserted before the address becomes visible and the address is
/// hidden before its records are dropped.
#[derive(Default)]
pub struct AddressStore {
    membership: Mutex<()>,
    addresses: RwLock<HashSet<Address>>,
    configs: RwLock<HashMap<Address, ConfigHandle>>,
    stats: RwLock<HashMap<Address, StatsHandle>>,
    probe_target: RwLock<Option<Address>>,
}

impl AddressStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds one IP literal. Invalid or already known input is ignored.
    pub fn add(&self, input: &str) -> bool {
        match Address::parse(input) {
            Some(address) => self.insert(address),
            None => false,
        }
    }

    /// Adds every valid entry of a comma-separated list.
    pub fn add_batch(&self, input: &str) -> usize {
        split_batch(input).filter(|entry| self.add(entry)).count()
    }

    pub fn insert(&self, address: Address) -> bool {
        let _guard = self.membership.lock();
        if self.contains(&address) {
            return false;
        }

        self.configs
            .write()
            .insert(address, Arc::new(RwLock::new(ProbeConfig::default())));
        self.stats
            .write()
            .insert(address, Arc::new(Mutex::new(Statistics::default())));
        self.addresses.write().insert(address);
        tracing::info!(%address, "address added");
        true
    }

    /// Removes one IP literal. Refused for the address under probe.
    pub fn remove(&self, input: &str) -> bool {
        let Some(address) = Address::parse(input) else {
            return false;
        };
        let _guard = self.membership.lock();
        if self.probe_target() == Some(address) {
            tracing::info!(%address, "removal refused, address is being probed");
            return false;
        }
        if !self.addresses.write().remove(&address) {
            return false;
        }
        self.configs.write().remove(&address);
        self.stats.write().remove(&address);
        tracing::info!(%address, "address removed");
        true
    }

    pub fn remove_batch(&self, input: &str) -> usize {
        split_batch(input).filter(|entry| self.remove(entry)).count()
    }

    pub fn contains(&self, address: &Address) -> bool {
        self.addresses.read().contains(address)
    }

    pub fn len(&self) -> usize {
        self.addresses.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.addresses.read().is_empty()
    }

    /// Addresses ordered by text length, then lexicographically.
    pub fn list(&self) -> Vec<Address> {
        let mut addresses: Vec<Address> = self.addresses.read().iter().copied().collect();
        addresses.sort_by(display_order);
        addresses
    }

    pub fn position(&self, address: &Address) -> Option<usize> {
        self.list().iter().position(|candidate| candidate == address)
    }

    /// Live configuration record; other threads may change it concurrently.
    pub fn configuration(&self, address: &Address) -> Option<ConfigHandle> {
        self.configs.read().get(address).cloned()
    }

    /// Live statistics record; the probe runner updates it while reading.
    pub fn statistics(&self, address: &Address) -> Option<StatsHandle> {
        self.stats.read().get(address).cloned()
    }

    pub fn update_configuration<F>(&self, address: &Address, edit: F) -> Result<(), StoreError>
    where
        F: FnOnce(&mut ProbeConfig),
    {
        let _guard = self.membership.lock();
        if self.probe_target() == Some(*address) {
            return Err(StoreError::ProbeActive(*address));
        }
        let handle = self
            .configuration(address)
            .ok_or(StoreError::UnknownAddress(*address))?;
        edit(&mut *handle.write());
        tracing::info!(%address, "configuration updated");
        Ok(())
    }

    pub fn reset_statistics(&self, address: &Address) {
        if let Some(stats) = self.statistics(address) {
            stats.lock().reset();
        }
    }

    pub fn format_configuration(&self, address: &Address) -> Option<String> {
        self.configuration(address)
            .map(|config| config.read().to_string())
    }

    pub fn format_statistics(&self, address: &Address) -> Option<String> {
        self.statistics(address).map(|stats| stats.lock().to_string())
    }

    /// Address of the active probe as last published by the scheduler.
    pub fn probe_target(&self) -> Option<Address> {
        *self.probe_target.read()
    }

    /// Marks a known address as the probe target. Serialized with removal
    /// so the target cannot disappear underneath the probe.
    pub fn claim_probe_target(&self, address: Address) -> bool {
        let _guard = self.membership.lock();
        if !self.contains(&address) {
            return false;
        }
        *self.probe_target.write() = Some(address);
        true
    }

    pub fn release_probe_target(&self) {
        *self.probe_target.write() = None;
    }
}
