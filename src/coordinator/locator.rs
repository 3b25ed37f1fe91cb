//! Active namenode discovery
//!
//! The locator owns the client's only piece of mutable routing state: which
//! candidate is believed active, since when, and the candidate order.

use crate::common::{Error, Result};
use crate::coordinator::node::{CandidateList, CoordinatorNode};
use crate::protocol::{probe_url, JmxReply};
use crate::transport::{Method, Request, Transport};
use std::time::{Duration, Instant};

/// Default time an active-namenode answer is trusted
pub const DEFAULT_STALENESS_WINDOW: Duration = Duration::from_secs(10);

/// The namenode currently believed active
#[derive(Debug, Clone)]
pub struct ActiveCoordinator {
    node: CoordinatorNode,
    refreshed_at: Instant,
}

impl ActiveCoordinator {
    pub fn node(&self) -> &CoordinatorNode {
        &self.node
    }

    pub fn age(&self) -> Duration {
        self.refreshed_at.elapsed()
    }
}

pub struct CoordinatorLocator {
    candidates: CandidateList,
    active: ActiveCoordinator,
    staleness_window: Duration,
}

impl CoordinatorLocator {
    /// Probe the candidates and build a locator around the active one.
    /// Fails if none of them is active.
    pub fn locate(
        candidates: CandidateList,
        staleness_window: Duration,
        transport: &dyn Transport,
    ) -> Result<Self> {
        let mut candidates = candidates;
        let node = find_active(&mut candidates, transport)?;
        tracing::info!(namenode = %node, "Active namenode found");
        Ok(Self {
            candidates,
            active: ActiveCoordinator {
                node,
                refreshed_at: Instant::now(),
            },
            staleness_window,
        })
    }

    pub fn active(&self) -> &CoordinatorNode {
        &self.active.node
    }

    pub fn candidates(&self) -> &CandidateList {
        &self.candidates
    }

    pub fn staleness_window(&self) -> Duration {
        self.staleness_window
    }

    pub fn is_stale(&self) -> bool {
        self.active.age() >= self.staleness_window
    }

    /// Re-probe every candidate in order. On failure the previous belief is
    /// kept and `NoActiveCoordinator` is returned.
    pub fn refresh(&mut self, transport: &dyn Transport) -> Result<&CoordinatorNode> {
        let node = find_active(&mut self.candidates, transport)?;
        if node != self.active.node {
            tracing::info!(
                previous = %self.active.node,
                current = %node,
                "Active namenode changed"
            );
        }
        self.active = ActiveCoordinator {
            node,
            refreshed_at: Instant::now(),
        };
        Ok(&self.active.node)
    }

    /// Refresh if the current answer is older than the staleness window
    pub fn ensure_fresh(&mut self, transport: &dyn Transport) -> Result<&CoordinatorNode> {
        if self.is_stale() {
            tracing::debug!(
                namenode = %self.active.node,
                age_ms = self.active.age().as_millis() as u64,
                "Active namenode answer is stale"
            );
            return self.refresh(transport);
        }
        Ok(&self.active.node)
    }
}

fn find_active(candidates: &mut CandidateList, transport: &dyn Transport) -> Result<CoordinatorNode> {
    let index = candidates
        .iter()
        .position(|node| probe(node, transport))
        .ok_or(Error::NoActiveCoordinator {
            candidates: candidates.len(),
        })?;
    candidates.promote(index);
    Ok(candidates.first().clone())
}

/// Is `node` active? Unreachable or misbehaving nodes simply are not.
pub fn probe(node: &CoordinatorNode, transport: &dyn Transport) -> bool {
    let url = probe_url(node);
    let response = match transport.send(&Request::new(Method::Get, url.as_str())) {
        Ok(response) => response,
        Err(e) => {
            tracing::debug!(namenode = %node, error = %e, "Namenode unreachable");
            return false;
        }
    };
    if !response.is_success() {
        tracing::debug!(namenode = %node, status = response.status(), "Namenode probe rejected");
        return false;
    }
    let body = match response.into_bytes(&url) {
        Ok(body) => body,
        Err(e) => {
            tracing::debug!(namenode = %node, error = %e, "Namenode probe body unreadable");
            return false;
        }
    };
    match serde_json::from_slice::<JmxReply>(&body) {
        Ok(reply) => reply.is_active(),
        Err(e) => {
            tracing::debug!(namenode = %node, error = %e, "Namenode probe reply is not JMX");
            false
        }
    }
}
