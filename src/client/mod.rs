//! WebHDFS client
//!
//! [`HdfsClient`] ties the pieces together:
//! - a [`Transport`] that sends requests
//! - a [`CoordinatorLocator`] that knows the active namenode
//! - the retry executor that re-routes failed requests
//!
//! All operations take `&mut self` and run to completion on the calling
//! thread. One client serves one caller at a time; sharing it across
//! threads needs external locking (e.g. a `Mutex`).

pub mod local;
pub mod metadata;
pub mod retry;
pub mod transfer;
pub mod walker;

pub use metadata::Lookup;
pub use retry::{AttemptFailure, FailureHook, LogOnly, RefreshCoordinator, TransferAttempt};
pub use walker::{mirror_tree, TreeMirror};

use crate::common::{ClientConfig, Error, Result, RetryConfig, TransportError};
use crate::coordinator::{CandidateList, CoordinatorLocator, CoordinatorNode};
use crate::protocol::status::BooleanReply;
use crate::protocol::{Operation, RemoteExceptionReply, UrlTemplate};
use crate::transport::{HttpTransport, Method, Request, Response, Transport};
use serde::de::DeserializeOwned;
use std::time::Duration;

pub struct HdfsClient<T: Transport = HttpTransport> {
    transport: T,
    locator: CoordinatorLocator,
    retry: RetryConfig,
    hook: Box<dyn FailureHook>,
}

impl HdfsClient<HttpTransport> {
    /// Build an HTTP client from configuration and locate the active namenode
    pub fn connect(config: &ClientConfig) -> Result<Self> {
        config.validate()?;
        let transport = HttpTransport::new(config.request_timeout())?;
        Self::with_transport(transport, config)
    }
}

impl<T: Transport> HdfsClient<T> {
    /// Construction fails unless some candidate is active
    pub fn with_transport(transport: T, config: &ClientConfig) -> Result<Self> {
        let candidates = CandidateList::new(config.namenodes.clone())?;
        let locator = CoordinatorLocator::locate(candidates, config.staleness_window(), &transport)?;
        Ok(Self {
            transport,
            locator,
            retry: config.retry,
            hook: Box::new(RefreshCoordinator),
        })
    }

    /// Replace the default "log and refresh" reaction to failed requests
    pub fn with_failure_hook(mut self, hook: impl FailureHook + 'static) -> Self {
        self.hook = Box::new(hook);
        self
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn active_namenode(&self) -> &CoordinatorNode {
        self.locator.active()
    }

    pub fn candidates(&self) -> &[CoordinatorNode] {
        self.locator.candidates().as_slice()
    }

    pub fn staleness_window(&self) -> Duration {
        self.locator.staleness_window()
    }

    /// Force a re-probe of all candidates
    pub fn refresh_active(&mut self) -> Result<&CoordinatorNode> {
        self.locator.refresh(&self.transport)
    }

    /// Run `op` for `path` through the retry executor with the client's hook
    pub(crate) fn execute<R, F>(
        &mut self,
        path: &str,
        operation: Operation,
        budget: u32,
        op: F,
    ) -> Result<Option<R>>
    where
        F: FnMut(&dyn Transport, &str, Method) -> Result<R>,
    {
        let mut attempt = TransferAttempt::new(UrlTemplate::new(path, operation), budget);
        retry::execute(
            &mut self.locator,
            &self.transport,
            &mut attempt,
            self.hook.as_ref(),
            op,
        )
    }

    /// Create `path` and any missing parents
    pub fn makedirs(&mut self, path: &str) -> Result<bool> {
        let budget = self.retry.write_attempts;
        self.boolean_call(path, Operation::Mkdirs, budget)
    }

    /// Delete `path`; directories need `recursive` unless empty
    pub fn delete(&mut self, path: &str, recursive: bool) -> Result<bool> {
        let budget = self.retry.delete_attempts;
        self.boolean_call(path, Operation::Delete { recursive }, budget)
    }

    /// Rename `src` to `dst`. The gateway refuses to overwrite an existing `dst`.
    pub fn rename(&mut self, src: &str, dst: &str) -> Result<bool> {
        let budget = self.retry.write_attempts;
        self.boolean_call(
            src,
            Operation::Rename {
                destination: dst.to_string(),
            },
            budget,
        )
    }

    fn boolean_call(&mut self, path: &str, operation: Operation, budget: u32) -> Result<bool> {
        let code = operation.code();
        let result = self.execute(path, operation, budget, |transport, url, method| {
            let response = send_checked(transport, Request::new(method, url))?;
            let reply: BooleanReply = read_json(response, url)?;
            Ok(reply.boolean)
        })?;
        match result {
            Some(true) => Ok(true),
            Some(false) => {
                tracing::warn!(path, op = code, "Namenode refused the operation");
                Ok(false)
            }
            None => Ok(false),
        }
    }
}

/// Send a request and turn any non-success status into a transport error
pub(crate) fn send_checked(transport: &dyn Transport, request: Request) -> Result<Response> {
    let response = transport.send(&request)?;
    if response.is_success() {
        return Ok(response);
    }
    Err(status_error(response, &request.url).into())
}

pub(crate) fn status_error(response: Response, url: &str) -> TransportError {
    let status = response.status();
    let message = response
        .into_bytes(url)
        .map(|body| RemoteExceptionReply::describe(&body))
        .unwrap_or_default();
    TransportError::Status {
        url: url.to_string(),
        status,
        message,
    }
}

/// Decode a JSON body. An unreadable body is a transport failure, an
/// undecodable one is a protocol error.
pub(crate) fn read_json<D: DeserializeOwned>(response: Response, url: &str) -> Result<D> {
    let body = response.into_bytes(url)?;
    serde_json::from_slice(&body)
        .map_err(|e| Error::Protocol(format!("{} from {}", e, url)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_malformed_json_is_protocol_error() {
        let response = Response::from_bytes(200, b"<html>gateway</html>".to_vec());
        let err = read_json::<BooleanReply>(response, "http://nn1:9870/x").unwrap_err();
        assert!(matches!(err, Error::Protocol(_)));
        assert!(!err.is_retryable());
    }

    #[test]
    fn test_status_error_carries_remote_exception() {
        let body = br#"{"RemoteException":{"exception":"StandbyException","message":"standby"}}"#;
        let err = status_error(Response::from_bytes(403, body.to_vec()), "http://nn1:9870/x");
        assert!(matches!(err, TransportError::Status { status: 403, .. }));
        assert!(err.to_string().contains("StandbyException"));
    }
}
