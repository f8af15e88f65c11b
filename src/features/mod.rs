pub mod app;
pub mod probe;
pub mod ui;
