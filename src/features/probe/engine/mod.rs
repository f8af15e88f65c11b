mod command;
mod runner;
mod transcript;

pub use command::{CommandFactory, ProbeCommand, SystemCommands};
pub use runner::{RunnerOptions, spawn_runner};
pub use transcript::Transcript;

#[cfg(test)]
pub(crate) mod testing;
