pub mod actions;
pub mod config;
pub mod contracts;
pub mod task;
pub mod utils;
