pub mod app;
pub mod cli;
pub mod effects;
pub mod logging;
pub mod persistence;
