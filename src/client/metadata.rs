//! Read-only namespace queries

use crate::client::{read_json, status_error, HdfsClient};
use crate::common::Result;
use crate::protocol::status::{FileStatusReply, ListStatusReply};
use crate::protocol::{EntryStatus, ListResult, Operation};
use crate::transport::{Request, Transport};

/// Outcome of a namespace query. A missing path is an answer, not an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lookup<T> {
    Found(T),
    NotFound,
    /// Every attempt failed at the transport level
    TransportFailed,
}

impl<T> Lookup<T> {
    pub fn found(self) -> Option<T> {
        match self {
            Lookup::Found(value) => Some(value),
            _ => None,
        }
    }

    pub fn is_found(&self) -> bool {
        matches!(self, Lookup::Found(_))
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Lookup::NotFound)
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Lookup<U> {
        match self {
            Lookup::Found(value) => Lookup::Found(f(value)),
            Lookup::NotFound => Lookup::NotFound,
            Lookup::TransportFailed => Lookup::TransportFailed,
        }
    }
}

impl<T> From<Option<Lookup<T>>> for Lookup<T> {
    /// `None` is what the retry executor returns once the budget is spent
    fn from(result: Option<Lookup<T>>) -> Self {
        result.unwrap_or(Lookup::TransportFailed)
    }
}

impl<T: Transport> HdfsClient<T> {
    /// Immediate children of a remote directory
    pub fn list_directory(&mut self, path: &str) -> Result<Lookup<ListResult>> {
        let budget = self.retry.read_attempts;
        let result = self.execute(path, Operation::ListStatus, budget, |transport, url, method| {
            let response = transport.send(&Request::new(method, url))?;
            if response.is_not_found() {
                return Ok(Lookup::NotFound);
            }
            if !response.is_success() {
                return Err(status_error(response, url).into());
            }
            let reply: ListStatusReply = read_json(response, url)?;
            Ok(Lookup::Found(ListResult::from_wire(
                path,
                reply.file_statuses.file_status,
            )))
        })?;
        Ok(result.into())
    }

    /// Status of a remote path. An entry of unknown type is an error.
    pub fn get_status(&mut self, path: &str) -> Result<Lookup<EntryStatus>> {
        let budget = self.retry.read_attempts;
        let result =
            self.execute(path, Operation::GetFileStatus, budget, |transport, url, method| {
                let response = transport.send(&Request::new(method, url))?;
                if response.is_not_found() {
                    return Ok(Lookup::NotFound);
                }
                if !response.is_success() {
                    return Err(status_error(response, url).into());
                }
                let reply: FileStatusReply = read_json(response, url)?;
                Ok(Lookup::Found(reply.file_status))
            })?;

        match Lookup::from(result) {
            Lookup::Found(wire) => Ok(Lookup::Found(EntryStatus::from_wire(path, wire)?)),
            Lookup::NotFound => Ok(Lookup::NotFound),
            Lookup::TransportFailed => Ok(Lookup::TransportFailed),
        }
    }

    /// Does `path` exist? `None` when the gateway could not be asked.
    pub fn exists(&mut self, path: &str) -> Result<Option<bool>> {
        Ok(match self.get_status(path)? {
            Lookup::Found(_) => Some(true),
            Lookup::NotFound => Some(false),
            Lookup::TransportFailed => None,
        })
    }
}
