//! HTTP API handlers

pub mod process;

pub use process::{get_process_status, start_process};
