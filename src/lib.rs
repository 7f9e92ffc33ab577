//! Item API - greeting, health check, item lookup and schema-validated item creation

pub mod config;
pub mod error;
pub mod types;
pub mod validation;

pub mod api;

pub use config::Config;
pub use error::{Error, Result};
pub use types::*;
