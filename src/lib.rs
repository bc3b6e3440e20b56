pub mod attacks;
pub mod cli;
pub mod config;
pub mod core;
pub mod progress;
pub mod sources;
pub mod ui;
