//! # hdfstools
//!
//! A WebHDFS client for HA clusters:
//! - finds the active namenode among several candidates and fails over
//!   when it changes
//! - retries requests against the newly active node with a bounded budget
//! - uploads and downloads files and whole trees atomically (temporary
//!   path, then rename)
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │ Transfer engine      upload / download       │
//! │   └─ directory walker (breadth-first)        │
//! ├──────────────────────────────────────────────┤
//! │ Metadata ops         LISTSTATUS / GETFILESTATUS
//! ├──────────────────────────────────────────────┤
//! │ Retry executor       budget + failure hook   │
//! ├──────────────────────────────────────────────┤
//! │ Coordinator locator  active namenode (TTL)   │
//! ├──────────────────────────────────────────────┤
//! │ Transport            blocking HTTP           │
//! └──────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```no_run
//! use hdfstools::{ClientConfig, CoordinatorNode, HdfsClient};
//! use std::path::Path;
//!
//! # fn main() -> hdfstools::Result<()> {
//! let config = ClientConfig::new(vec![
//!     CoordinatorNode::new("nn1.example.com", 9870),
//!     CoordinatorNode::new("nn2.example.com", 9870),
//! ]);
//! let mut client = HdfsClient::connect(&config)?;
//! client.upload(Path::new("./reports"), "/data/reports", true)?;
//! client.download("/data/reports", Path::new("./reports-copy"), false)?;
//! # Ok(())
//! # }
//! ```
//!
//! ### CLI
//! ```bash
//! hdfstools --namenode nn1:9870 --namenode nn2:9870 upload ./reports /data/reports --overwrite
//! hdfstools --config hdfstools.toml ls /data
//! ```

pub mod client;
pub mod common;
pub mod coordinator;
pub mod protocol;
pub mod transport;

// Re-export commonly used types
pub use client::{HdfsClient, Lookup};
pub use common::{ClientConfig, Error, Result};
pub use coordinator::CoordinatorNode;
pub use protocol::{EntryStatus, EntryType, ListResult};

/// Current version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
