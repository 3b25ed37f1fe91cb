//! Common utilities and types shared across hdfstools

pub mod config;
pub mod error;
pub mod utils;

pub use config::{ClientConfig, RetryConfig};
pub use error::{Error, Result, TransportError};
pub use utils::{format_bytes, is_temp_path, join_remote, join_suffix, parse_duration, temp_path};
