//! In-memory WebHDFS gateway shared by the integration tests
//!
//! Models a small HA cluster: each namenode is active, standby or down,
//! and all of them serve the same namespace. Requests can be made to fail
//! by operation and path.

#![allow(dead_code)]

use hdfstools::common::{is_temp_path, TransportError};
use hdfstools::transport::{Payload, Request, Response, Transport};
use hdfstools::{ClientConfig, CoordinatorNode};
use percent_encoding::percent_decode_str;
use serde_json::json;
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

pub const PORT: u16 = 9870;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeState {
    Active,
    Standby,
    Down,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Entry {
    Dir,
    File(Vec<u8>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fault {
    /// No answer at all
    Unreachable,
    /// 200 with `{"boolean": false}`
    Refuse,
    /// Answer with this status
    Status(u16),
}

#[derive(Debug, Clone)]
struct Injection {
    op: String,
    path_contains: String,
    remaining: u32,
    fault: Fault,
}

/// One request the gateway saw
#[derive(Debug, Clone)]
pub struct Seen {
    pub host: String,
    pub op: String,
    pub path: String,
    /// `None` when the request got no answer
    pub status: Option<u16>,
}

#[derive(Default)]
struct State {
    nodes: Vec<(String, NodeState)>,
    entries: BTreeMap<String, Entry>,
    injections: Vec<Injection>,
    seen: Vec<Seen>,
}

#[derive(Clone)]
pub struct FakeGateway {
    state: Rc<RefCell<State>>,
}

impl FakeGateway {
    pub fn new(nodes: &[(&str, NodeState)]) -> Self {
        let mut entries = BTreeMap::new();
        entries.insert("/".to_string(), Entry::Dir);
        let state = State {
            nodes: nodes
                .iter()
                .map(|(host, state)| (host.to_string(), *state))
                .collect(),
            entries,
            ..Default::default()
        };
        Self {
            state: Rc::new(RefCell::new(state)),
        }
    }

    /// Single active namenode
    pub fn single() -> Self {
        Self::new(&[("nn1", NodeState::Active)])
    }

    pub fn config(&self) -> ClientConfig {
        let nodes = self
            .state
            .borrow()
            .nodes
            .iter()
            .map(|(host, _)| CoordinatorNode::new(host.as_str(), PORT))
            .collect();
        ClientConfig::new(nodes)
    }

    pub fn set_node(&self, host: &str, node_state: NodeState) {
        let mut state = self.state.borrow_mut();
        for (name, current) in state.nodes.iter_mut() {
            if *name == host {
                *current = node_state;
            }
        }
    }

    // === namespace setup and inspection ===

    pub fn mkdir(&self, path: &str) {
        let mut state = self.state.borrow_mut();
        make_parents(&mut state.entries, &normalize(path));
        state.entries.insert(normalize(path), Entry::Dir);
    }

    pub fn put(&self, path: &str, data: &[u8]) {
        let path = normalize(path);
        let mut state = self.state.borrow_mut();
        make_parents(&mut state.entries, &path);
        state.entries.insert(path, Entry::File(data.to_vec()));
    }

    pub fn file(&self, path: &str) -> Option<Vec<u8>> {
        match self.state.borrow().entries.get(&normalize(path)) {
            Some(Entry::File(data)) => Some(data.clone()),
            _ => None,
        }
    }

    pub fn is_dir(&self, path: &str) -> bool {
        matches!(self.state.borrow().entries.get(&normalize(path)), Some(Entry::Dir))
    }

    pub fn exists(&self, path: &str) -> bool {
        self.state.borrow().entries.contains_key(&normalize(path))
    }

    /// Every path in the namespace, sorted
    pub fn paths(&self) -> Vec<String> {
        self.state.borrow().entries.keys().cloned().collect()
    }

    /// Paths under `root` (exclusive) mapped to file contents (`None` for dirs)
    pub fn tree(&self, root: &str) -> BTreeMap<String, Option<Vec<u8>>> {
        let root = normalize(root);
        let prefix = format!("{}/", root.trim_end_matches('/'));
        self.state
            .borrow()
            .entries
            .iter()
            .filter_map(|(path, entry)| {
                let rel = path.strip_prefix(&prefix)?;
                let data = match entry {
                    Entry::Dir => None,
                    Entry::File(data) => Some(data.clone()),
                };
                Some((rel.to_string(), data))
            })
            .collect()
    }

    /// Any path component that looks like a temporary name
    pub fn temp_artifacts(&self) -> Vec<String> {
        self.paths()
            .into_iter()
            .filter(|path| path.split('/').any(is_temp_path))
            .collect()
    }

    // === fault injection ===

    /// Apply `fault` to the next `times` requests with this op whose path
    /// contains `path_contains`
    pub fn inject(&self, op: &str, path_contains: &str, times: u32, fault: Fault) {
        self.state.borrow_mut().injections.push(Injection {
            op: op.to_string(),
            path_contains: path_contains.to_string(),
            remaining: times,
            fault,
        });
    }

    pub fn inject_always(&self, op: &str, path_contains: &str, fault: Fault) {
        self.inject(op, path_contains, u32::MAX, fault);
    }

    // === request log ===

    pub fn seen(&self) -> Vec<Seen> {
        self.state.borrow().seen.clone()
    }

    pub fn count(&self, op: &str) -> usize {
        self.state.borrow().seen.iter().filter(|s| s.op == op).count()
    }

    pub fn count_on(&self, op: &str, path: &str) -> usize {
        let path = normalize(path);
        self.state
            .borrow()
            .seen
            .iter()
            .filter(|s| s.op == op && s.path == path)
            .count()
    }

    pub fn clear_log(&self) {
        self.state.borrow_mut().seen.clear();
    }
}

impl Transport for FakeGateway {
    fn send(&self, request: &Request) -> Result<Response, TransportError> {
        let url = reqwest::Url::parse(&request.url).map_err(|e| TransportError::Request {
            url: request.url.clone(),
            reason: e.to_string(),
        })?;
        let host = url.host_str().unwrap_or_default().to_string();
        let mut state = self.state.borrow_mut();

        let node_state = state
            .nodes
            .iter()
            .find(|(name, _)| *name == host)
            .map(|(_, s)| *s)
            .unwrap_or(NodeState::Down);

        if url.path() == "/jmx" {
            if node_state == NodeState::Down {
                state.seen.push(seen(&host, "PROBE", "", None));
                return Err(refused(&request.url));
            }
            let label = if node_state == NodeState::Active { "active" } else { "standby" };
            state.seen.push(seen(&host, "PROBE", "", Some(200)));
            let (status, body) = json_response(
                200,
                json!({"beans": [{"name": "Hadoop:service=NameNode,name=NameNodeStatus", "State": label}]}),
            );
            return Ok(Response::from_bytes(status, body));
        }

        let raw_path = url.path().strip_prefix("/webhdfs/v1").unwrap_or(url.path());
        let path = normalize(&percent_decode_str(raw_path).decode_utf8_lossy());
        let query: BTreeMap<String, String> = url.query_pairs().into_owned().collect();
        let op = query.get("op").cloned().unwrap_or_default();

        if node_state == NodeState::Down {
            state.seen.push(seen(&host, &op, &path, None));
            return Err(refused(&request.url));
        }

        let fault = state
            .injections
            .iter_mut()
            .find(|inj| inj.remaining > 0 && inj.op == op && path.contains(&inj.path_contains))
            .map(|inj| {
                if inj.remaining != u32::MAX {
                    inj.remaining -= 1;
                }
                inj.fault
            });

        let response = match (node_state, fault) {
            (NodeState::Standby, _) => Ok(remote_exception(
                403,
                "StandbyException",
                "Operation category READ is not supported in state standby",
            )),
            (_, Some(Fault::Unreachable)) => Err(refused(&request.url)),
            (_, Some(Fault::Refuse)) => Ok(boolean(false)),
            (_, Some(Fault::Status(code))) => Ok(remote_exception(code, "IOException", "injected")),
            _ => Ok(handle(&mut state.entries, &op, &path, &query, &request.payload)),
        };

        let status = response.as_ref().ok().map(|(status, _)| *status);
        state.seen.push(seen(&host, &op, &path, status));
        response.map(|(status, body)| Response::from_bytes(status, body))
    }
}

type Reply = (u16, Vec<u8>);

fn handle(
    entries: &mut BTreeMap<String, Entry>,
    op: &str,
    path: &str,
    query: &BTreeMap<String, String>,
    payload: &Payload,
) -> Reply {
    let flag = |name: &str| query.get(name).map(|v| v == "true").unwrap_or(false);

    match op {
        "GETFILESTATUS" => match entries.get(path) {
            Some(entry) => json_response(200, json!({"FileStatus": status_json("", entry)})),
            None => not_found(path),
        },

        "LISTSTATUS" => match entries.get(path) {
            Some(Entry::File(data)) => json_response(
                200,
                json!({"FileStatuses": {"FileStatus": [status_json("", &Entry::File(data.clone()))]}}),
            ),
            Some(Entry::Dir) => {
                let statuses: Vec<_> = children(entries, path)
                    .into_iter()
                    .map(|(name, entry)| status_json(&name, &entry))
                    .collect();
                json_response(200, json!({"FileStatuses": {"FileStatus": statuses}}))
            }
            None => not_found(path),
        },

        "OPEN" => match entries.get(path) {
            Some(Entry::File(data)) => (200, data.clone()),
            Some(Entry::Dir) => remote_exception(404, "FileNotFoundException", "Path is not a file"),
            None => not_found(path),
        },

        "MKDIRS" => {
            if ancestors(path).iter().any(|p| matches!(entries.get(p), Some(Entry::File(_))))
                || matches!(entries.get(path), Some(Entry::File(_)))
            {
                return remote_exception(403, "ParentNotDirectoryException", path);
            }
            make_parents(entries, path);
            entries.insert(path.to_string(), Entry::Dir);
            boolean(true)
        }

        "CREATE" => {
            let data = match payload {
                Payload::File(local) => match std::fs::read(local) {
                    Ok(data) => data,
                    Err(e) => return remote_exception(500, "IOException", &e.to_string()),
                },
                Payload::Empty => Vec::new(),
            };
            match entries.get(path) {
                Some(Entry::Dir) => return remote_exception(403, "FileAlreadyExistsException", path),
                Some(Entry::File(_)) if !flag("overwrite") => {
                    return remote_exception(403, "FileAlreadyExistsException", path)
                }
                _ => {}
            }
            make_parents(entries, path);
            entries.insert(path.to_string(), Entry::File(data));
            (201, Vec::new())
        }

        "RENAME" => {
            let Some(destination) = query.get("destination") else {
                return remote_exception(400, "IllegalArgumentException", "destination missing");
            };
            boolean(rename(entries, path, &normalize(destination)))
        }

        "DELETE" => {
            if !entries.contains_key(path) || path == "/" {
                return boolean(false);
            }
            let has_children = !children(entries, path).is_empty();
            if has_children && !flag("recursive") {
                return remote_exception(403, "PathIsNotEmptyDirectoryException", path);
            }
            remove_subtree(entries, path);
            boolean(true)
        }

        other => remote_exception(400, "IllegalArgumentException", &format!("bad op {}", other)),
    }
}

/// HDFS rename: fails if the source is missing or the destination is an
/// existing file; moves *into* an existing directory.
fn rename(entries: &mut BTreeMap<String, Entry>, src: &str, dst: &str) -> bool {
    if !entries.contains_key(src) || src == "/" {
        return false;
    }
    let target = match entries.get(dst) {
        Some(Entry::File(_)) => return false,
        Some(Entry::Dir) => format!("{}/{}", dst.trim_end_matches('/'), basename(src)),
        None => dst.to_string(),
    };
    if entries.contains_key(&target) || target.starts_with(&format!("{}/", src)) {
        return false;
    }
    match parent(&target) {
        Some(p) if matches!(entries.get(&p), Some(Entry::Dir)) => {}
        _ => return false,
    }

    let moved: Vec<(String, Entry)> = entries
        .iter()
        .filter(|(p, _)| *p == src || p.starts_with(&format!("{}/", src)))
        .map(|(p, e)| (p.clone(), e.clone()))
        .collect();
    for (old, entry) in moved {
        entries.remove(&old);
        let new = format!("{}{}", target, &old[src.len()..]);
        entries.insert(new, entry);
    }
    true
}

fn remove_subtree(entries: &mut BTreeMap<String, Entry>, path: &str) {
    let prefix = format!("{}/", path);
    entries.retain(|p, _| p != path && !p.starts_with(&prefix));
}

fn children(entries: &BTreeMap<String, Entry>, dir: &str) -> Vec<(String, Entry)> {
    let prefix = if dir == "/" { "/".to_string() } else { format!("{}/", dir) };
    entries
        .iter()
        .filter_map(|(p, e)| {
            let rest = p.strip_prefix(&prefix)?;
            if rest.is_empty() || rest.contains('/') {
                return None;
            }
            Some((rest.to_string(), e.clone()))
        })
        .collect()
}

fn make_parents(entries: &mut BTreeMap<String, Entry>, path: &str) {
    for ancestor in ancestors(path) {
        entries.entry(ancestor).or_insert(Entry::Dir);
    }
}

/// Proper ancestors, root first
fn ancestors(path: &str) -> Vec<String> {
    let mut result = vec!["/".to_string()];
    let parts: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
    for i in 1..parts.len() {
        result.push(format!("/{}", parts[..i].join("/")));
    }
    if path == "/" {
        result.clear();
    }
    result
}

fn parent(path: &str) -> Option<String> {
    ancestors(path).pop()
}

fn basename(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

pub fn normalize(path: &str) -> String {
    let parts: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
    format!("/{}", parts.join("/"))
}

fn status_json(name: &str, entry: &Entry) -> serde_json::Value {
    let (kind, length) = match entry {
        Entry::Dir => ("DIRECTORY", 0),
        Entry::File(data) => ("FILE", data.len()),
    };
    json!({
        "accessTime": 1_700_000_000_000i64,
        "blockSize": 134_217_728,
        "group": "supergroup",
        "length": length,
        "modificationTime": 1_700_000_000_000i64,
        "owner": "hdfs",
        "pathSuffix": name,
        "permission": "755",
        "replication": 3,
        "type": kind,
    })
}

fn json_response(status: u16, value: serde_json::Value) -> Reply {
    (status, value.to_string().into_bytes())
}

fn boolean(value: bool) -> Reply {
    json_response(200, json!({ "boolean": value }))
}

fn remote_exception(status: u16, exception: &str, message: &str) -> Reply {
    json_response(
        status,
        json!({"RemoteException": {"exception": exception, "javaClassName": format!("org.apache.hadoop.{}", exception), "message": message}}),
    )
}

fn not_found(path: &str) -> Reply {
    remote_exception(404, "FileNotFoundException", &format!("File does not exist: {}", path))
}

fn refused(url: &str) -> TransportError {
    TransportError::Request {
        url: url.to_string(),
        reason: "connection refused".to_string(),
    }
}

fn seen(host: &str, op: &str, path: &str, status: Option<u16>) -> Seen {
    Seen {
        host: host.to_string(),
        op: op.to_string(),
        path: path.to_string(),
        status,
    }
}
