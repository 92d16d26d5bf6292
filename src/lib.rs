pub mod client;
pub mod commands;
pub mod config;
pub mod error;
pub mod manifest;
pub mod package;
pub mod project;
pub mod runtime;
pub mod sync;

pub use error::{EngineError, Result};
