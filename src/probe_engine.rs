pub use crate::features::probe::engine::{
    CommandFactory, ProbeCommand, RunnerOptions, SystemCommands, Transcript, spawn_runner,
};
