mod common;
mod features;

pub mod app;
pub mod bus;
pub mod config;
pub mod data_model;
pub mod ingest;
pub mod logging;
pub mod metrics;
pub mod probe;
pub mod probe_engine;
pub mod runtime;
pub mod settings;
pub mod storage;
pub mod store;
pub mod ui;
