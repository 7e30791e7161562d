pub mod app;
pub mod cli;
pub mod config;
pub mod error;
pub mod graphdef;
pub mod logging;
pub mod metrics;
pub mod models;
pub mod monitoring;
pub mod resources;
pub mod runner;

pub use error::{PluginError, Result};
