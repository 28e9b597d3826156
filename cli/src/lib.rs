//! Configuration and output helpers shared by the vocalid command line.

pub mod config;
pub mod output;

pub use config::{Config, load_config};
pub use output::{Output, OutputFormat};
