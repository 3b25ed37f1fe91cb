//! JSON payloads returned by the gateway

use crate::common::{Error, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of a remote entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum EntryType {
    File,
    Directory,
}

impl EntryType {
    /// Parse the wire `type` field; anything else is a protocol mismatch
    pub fn parse(kind: &str) -> Option<Self> {
        match kind {
            "FILE" => Some(EntryType::File),
            "DIRECTORY" => Some(EntryType::Directory),
            _ => None,
        }
    }
}

impl fmt::Display for EntryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntryType::File => write!(f, "file"),
            EntryType::Directory => write!(f, "directory"),
        }
    }
}

/// One `FileStatus` object as sent by the gateway
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WireFileStatus {
    #[serde(rename = "type")]
    pub kind: String,
    pub path_suffix: String,
    pub length: u64,
    pub block_size: u64,
    pub access_time: i64,
    pub modification_time: i64,
    pub owner: String,
    pub group: String,
    pub permission: String,
    pub replication: u16,
}

/// Status snapshot of a remote path
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EntryStatus {
    pub entry_type: EntryType,
    pub path_suffix: String,
    pub length: u64,
    pub block_size: u64,
    /// Epoch milliseconds
    pub access_time: i64,
    /// Epoch milliseconds
    pub modification_time: i64,
    pub owner: String,
    pub group: String,
    pub permission: String,
    pub replication: u16,
}

impl EntryStatus {
    /// Validate a wire status for `path`
    pub fn from_wire(path: &str, wire: WireFileStatus) -> Result<Self> {
        let entry_type = EntryType::parse(&wire.kind).ok_or_else(|| Error::UnknownEntryType {
            path: path.to_string(),
            kind: wire.kind.clone(),
        })?;
        Ok(Self {
            entry_type,
            path_suffix: wire.path_suffix,
            length: wire.length,
            block_size: wire.block_size,
            access_time: wire.access_time,
            modification_time: wire.modification_time,
            owner: wire.owner,
            group: wire.group,
            permission: wire.permission,
            replication: wire.replication,
        })
    }

    pub fn is_file(&self) -> bool {
        self.entry_type == EntryType::File
    }

    pub fn is_dir(&self) -> bool {
        self.entry_type == EntryType::Directory
    }

    pub fn modified_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp_millis(self.modification_time)
    }

    pub fn accessed_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp_millis(self.access_time)
    }
}

/// `{"FileStatus": {...}}`
#[derive(Debug, Deserialize)]
pub struct FileStatusReply {
    #[serde(rename = "FileStatus")]
    pub file_status: WireFileStatus,
}

/// `{"FileStatuses": {"FileStatus": [...]}}`
#[derive(Debug, Deserialize)]
pub struct ListStatusReply {
    #[serde(rename = "FileStatuses")]
    pub file_statuses: FileStatuses,
}

#[derive(Debug, Deserialize)]
pub struct FileStatuses {
    #[serde(rename = "FileStatus", default)]
    pub file_status: Vec<WireFileStatus>,
}

/// `{"boolean": true}` from MKDIRS, RENAME and DELETE
#[derive(Debug, Deserialize)]
pub struct BooleanReply {
    pub boolean: bool,
}

/// `{"RemoteException": {...}}` carried by error statuses
#[derive(Debug, Deserialize)]
pub struct RemoteExceptionReply {
    #[serde(rename = "RemoteException")]
    pub remote_exception: RemoteException,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct RemoteException {
    pub exception: String,
    pub message: String,
}

impl RemoteExceptionReply {
    /// Best-effort human description of an error body
    pub fn describe(body: &[u8]) -> String {
        match serde_json::from_slice::<RemoteExceptionReply>(body) {
            Ok(reply) => format!(
                "{}: {}",
                reply.remote_exception.exception, reply.remote_exception.message
            ),
            Err(_) => String::from_utf8_lossy(body).trim().chars().take(200).collect(),
        }
    }
}

/// JMX reply from the namenode status bean
#[derive(Debug, Deserialize)]
pub struct JmxReply {
    #[serde(default)]
    pub beans: Vec<JmxBean>,
}

#[derive(Debug, Deserialize)]
pub struct JmxBean {
    #[serde(rename = "State")]
    pub state: Option<String>,
}

impl JmxReply {
    pub fn is_active(&self) -> bool {
        self.beans.iter().any(|bean| {
            bean.state
                .as_deref()
                .is_some_and(|state| state.eq_ignore_ascii_case("active"))
        })
    }
}

/// Children of one remote directory, split by kind
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListResult {
    pub dirs: Vec<String>,
    pub files: Vec<String>,
}

impl ListResult {
    /// Partition a LISTSTATUS reply. Entries without a name describe the
    /// queried path itself and are dropped; unknown kinds are skipped.
    pub fn from_wire(path: &str, entries: Vec<WireFileStatus>) -> Self {
        let mut result = ListResult::default();
        for entry in entries {
            if entry.path_suffix.is_empty() {
                continue;
            }
            match EntryType::parse(&entry.kind) {
                Some(EntryType::Directory) => result.dirs.push(entry.path_suffix),
                Some(EntryType::File) => result.files.push(entry.path_suffix),
                None => tracing::warn!(
                    path,
                    name = %entry.path_suffix,
                    kind = %entry.kind,
                    "Skipping entry of unknown type"
                ),
            }
        }
        result
    }

    pub fn is_empty(&self) -> bool {
        self.dirs.is_empty() && self.files.is_empty()
    }
}
