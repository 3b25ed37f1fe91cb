//! WebHDFS wire contract
//!
//! URL layout, operation codes and the JSON payloads exchanged with a
//! namenode. Nothing here performs I/O.

pub mod status;

pub use status::{BooleanReply, EntryStatus, EntryType, JmxReply, ListResult, RemoteExceptionReply};

use crate::coordinator::CoordinatorNode;
use crate::transport::Method;
use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};

/// Path prefix of the REST gateway
pub const WEBHDFS_PREFIX: &str = "/webhdfs/v1";

/// JMX bean that reports HA state (`active` / `standby`)
pub const NAMENODE_STATUS_QUERY: &str = "/jmx?qry=Hadoop:service=NameNode,name=NameNodeStatus";

/// Characters escaped inside the path component ('/' stays literal)
const PATH_ENCODE_SET: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

/// Characters escaped inside a query value
const QUERY_ENCODE_SET: &AsciiSet = &PATH_ENCODE_SET.add(b'&').add(b'=').add(b'+');

/// A WebHDFS operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    Mkdirs,
    Delete { recursive: bool },
    Rename { destination: String },
    Create { overwrite: bool },
    ListStatus,
    Open,
    GetFileStatus,
}

impl Operation {
    /// HTTP method the gateway expects for this operation
    pub fn method(&self) -> Method {
        match self {
            Operation::Mkdirs | Operation::Rename { .. } | Operation::Create { .. } => Method::Put,
            Operation::Delete { .. } => Method::Delete,
            Operation::ListStatus | Operation::Open | Operation::GetFileStatus => Method::Get,
        }
    }

    /// The `op=` code
    pub fn code(&self) -> &'static str {
        match self {
            Operation::Mkdirs => "MKDIRS",
            Operation::Delete { .. } => "DELETE",
            Operation::Rename { .. } => "RENAME",
            Operation::Create { .. } => "CREATE",
            Operation::ListStatus => "LISTSTATUS",
            Operation::Open => "OPEN",
            Operation::GetFileStatus => "GETFILESTATUS",
        }
    }

    /// Full query string, without the leading '?'
    pub fn query(&self) -> String {
        match self {
            Operation::Delete { recursive } => format!("op=DELETE&recursive={}", recursive),
            Operation::Rename { destination } => format!(
                "op=RENAME&destination={}",
                utf8_percent_encode(&absolute(destination), QUERY_ENCODE_SET)
            ),
            Operation::Create { overwrite } => format!("op=CREATE&overwrite={}", overwrite),
            other => format!("op={}", other.code()),
        }
    }
}

fn absolute(path: &str) -> String {
    if path.starts_with('/') {
        path.to_string()
    } else {
        format!("/{}", path)
    }
}

/// A request target that still lacks a namenode
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrlTemplate {
    path: String,
    operation: Operation,
}

impl UrlTemplate {
    pub fn new(path: impl Into<String>, operation: Operation) -> Self {
        Self {
            path: path.into(),
            operation,
        }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn operation(&self) -> &Operation {
        &self.operation
    }

    /// Bind the template to a namenode
    pub fn resolve(&self, node: &CoordinatorNode) -> String {
        let path = self.path.trim_start_matches('/');
        format!(
            "{}{}/{}?{}",
            node.base_url(),
            WEBHDFS_PREFIX,
            utf8_percent_encode(path, PATH_ENCODE_SET),
            self.operation.query()
        )
    }
}

/// Liveness probe URL for a candidate namenode
pub fn probe_url(node: &CoordinatorNode) -> String {
    format!("{}{}", node.base_url(), NAMENODE_STATUS_QUERY)
}
