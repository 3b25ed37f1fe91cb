//! Breadth-first directory mirroring
//!
//! The walker only knows relative suffixes; a [`TreeMirror`] maps them onto
//! the source and destination roots and performs the per-level work.

use crate::client::{local, HdfsClient};
use crate::common::{join_remote, join_suffix, Result};
use crate::protocol::ListResult;
use crate::transport::Transport;
use std::collections::VecDeque;
use std::fs;
use std::path::{Path, PathBuf};

/// One direction of a tree copy
pub trait TreeMirror {
    type Source;
    type Dest;

    /// Source root joined with `suffix` (`""` is the root)
    fn source_path(&self, suffix: &str) -> Self::Source;

    /// Destination root joined with `suffix`
    fn dest_path(&self, suffix: &str) -> Self::Dest;

    fn ensure_dir(&mut self, dest: &Self::Dest) -> Result<bool>;

    /// Children of a source directory, `None` if they cannot be listed
    fn list_source(&mut self, source: &Self::Source) -> Result<Option<ListResult>>;

    fn transfer_file(&mut self, source: &Self::Source, dest: &Self::Dest) -> Result<bool>;
}

/// Copy the whole source tree level by level. Stops at the first step that
/// fails and reports `false`.
pub fn mirror_tree<M: TreeMirror>(mirror: &mut M) -> Result<bool> {
    let mut queue: VecDeque<String> = VecDeque::from([String::new()]);

    while let Some(suffix) = queue.pop_front() {
        let source = mirror.source_path(&suffix);
        let dest = mirror.dest_path(&suffix);

        if !mirror.ensure_dir(&dest)? {
            tracing::error!(suffix = %suffix, "Cannot create destination directory");
            return Ok(false);
        }

        let Some(listing) = mirror.list_source(&source)? else {
            tracing::error!(suffix = %suffix, "Cannot list source directory");
            return Ok(false);
        };

        for name in &listing.files {
            let child = join_suffix(&suffix, name);
            let file_source = mirror.source_path(&child);
            let file_dest = mirror.dest_path(&child);
            if !mirror.transfer_file(&file_source, &file_dest)? {
                tracing::error!(file = %child, "File transfer failed");
                return Ok(false);
            }
        }

        queue.extend(listing.dirs.iter().map(|name| join_suffix(&suffix, name)));
    }

    Ok(true)
}

fn join_local(root: &Path, suffix: &str) -> PathBuf {
    if suffix.is_empty() {
        root.to_path_buf()
    } else {
        root.join(suffix)
    }
}

/// Local tree -> remote tree
pub struct UploadMirror<'a, T: Transport> {
    pub client: &'a mut HdfsClient<T>,
    pub local_root: &'a Path,
    pub remote_root: &'a str,
}

impl<T: Transport> TreeMirror for UploadMirror<'_, T> {
    type Source = PathBuf;
    type Dest = String;

    fn source_path(&self, suffix: &str) -> PathBuf {
        join_local(self.local_root, suffix)
    }

    fn dest_path(&self, suffix: &str) -> String {
        join_remote(self.remote_root, suffix)
    }

    fn ensure_dir(&mut self, dest: &String) -> Result<bool> {
        self.client.makedirs(dest)
    }

    fn list_source(&mut self, source: &PathBuf) -> Result<Option<ListResult>> {
        local::list_dir(source).map(Some)
    }

    fn transfer_file(&mut self, source: &PathBuf, dest: &String) -> Result<bool> {
        self.client.put_file(source, dest)
    }
}

/// Remote tree -> local tree
pub struct DownloadMirror<'a, T: Transport> {
    pub client: &'a mut HdfsClient<T>,
    pub remote_root: &'a str,
    pub local_root: &'a Path,
}

impl<T: Transport> TreeMirror for DownloadMirror<'_, T> {
    type Source = String;
    type Dest = PathBuf;

    fn source_path(&self, suffix: &str) -> String {
        join_remote(self.remote_root, suffix)
    }

    fn dest_path(&self, suffix: &str) -> PathBuf {
        join_local(self.local_root, suffix)
    }

    /// Parents already exist: the root's are the caller's business, the
    /// rest were created one level earlier.
    fn ensure_dir(&mut self, dest: &PathBuf) -> Result<bool> {
        fs::create_dir(dest)?;
        Ok(true)
    }

    fn list_source(&mut self, source: &String) -> Result<Option<ListResult>> {
        Ok(self.client.list_directory(source)?.found())
    }

    fn transfer_file(&mut self, source: &String, dest: &PathBuf) -> Result<bool> {
        self.client.fetch_file(source, dest)
    }
}
