// docrelay - PDF document translation relay

pub mod cli;
pub mod config;
pub mod engines;
pub mod error;
pub mod metrics;
pub mod models;
pub mod server;
pub mod storage;
pub mod utils;
