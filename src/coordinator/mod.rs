//! Namenode failover
//!
//! A cluster runs several namenodes but only one is active. The locator
//! keeps track of it:
//! - probes candidates in preference order
//! - promotes the active one to the front of the list
//! - re-probes when its answer is older than the staleness window or a
//!   request fails

pub mod locator;
pub mod node;

pub use locator::{probe, ActiveCoordinator, CoordinatorLocator, DEFAULT_STALENESS_WINDOW};
pub use node::{CandidateList, CoordinatorNode};
