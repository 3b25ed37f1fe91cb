//! Namenode identities and the preference-ordered candidate list

use crate::common::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A namenode reachable over HTTP
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CoordinatorNode {
    pub host: String,
    pub port: u16,
}

impl CoordinatorNode {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }

    pub fn base_url(&self) -> String {
        format!("http://{}:{}", self.host, self.port)
    }
}

impl fmt::Display for CoordinatorNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}

impl FromStr for CoordinatorNode {
    type Err = Error;

    /// Parse `host:port`
    fn from_str(s: &str) -> Result<Self> {
        let (host, port) = s
            .trim()
            .rsplit_once(':')
            .ok_or_else(|| Error::InvalidConfig(format!("expected host:port, got {:?}", s)))?;
        if host.is_empty() {
            return Err(Error::InvalidConfig(format!("missing host in {:?}", s)));
        }
        let port = port
            .parse()
            .map_err(|_| Error::InvalidConfig(format!("invalid port in {:?}", s)))?;
        Ok(Self::new(host, port))
    }
}

/// Candidates in order of preference. Never empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateList {
    nodes: Vec<CoordinatorNode>,
}

impl CandidateList {
    pub fn new(nodes: Vec<CoordinatorNode>) -> Result<Self> {
        if nodes.is_empty() {
            return Err(Error::InvalidConfig("at least one namenode is required".into()));
        }
        Ok(Self { nodes })
    }

    /// Move the candidate at `index` to the front by swapping it with the
    /// current first entry.
    pub fn promote(&mut self, index: usize) {
        if index != 0 && index < self.nodes.len() {
            self.nodes.swap(0, index);
        }
    }

    pub fn first(&self) -> &CoordinatorNode {
        &self.nodes[0]
    }

    pub fn iter(&self) -> impl Iterator<Item = &CoordinatorNode> {
        self.nodes.iter()
    }

    pub fn as_slice(&self) -> &[CoordinatorNode] {
        &self.nodes
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}
