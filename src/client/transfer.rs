//! Atomic uploads and downloads
//!
//! Data is first written under a temporary sibling name
//! (`{dest}_{token}_tmp`) and only renamed onto the destination once it is
//! complete, so readers of the destination never see a partial copy.
//!
//! Remote swap sequence:
//! 1. move an existing destination aside (the destination is briefly absent)
//! 2. rename the temporary path onto the destination
//! 3. check the temporary path is gone
//! 4. drop the moved-aside copy, or put it back if 2 or 3 failed

use crate::client::local;
use crate::client::walker::{mirror_tree, DownloadMirror, UploadMirror};
use crate::client::{send_checked, status_error, HdfsClient, Lookup};
use crate::common::utils::temp_local_path;
use crate::common::{temp_path, Result};
use crate::protocol::{EntryType, Operation};
use crate::transport::{Request, Transport};
use std::fs::{self, File};
use std::io::BufWriter;
use std::path::Path;

impl<T: Transport> HdfsClient<T> {
    /// Upload a local file or directory tree to `remote_path`.
    ///
    /// With `overwrite` unset an existing destination is left alone and the
    /// call reports `false`.
    pub fn upload(&mut self, local_path: &Path, remote_path: &str, overwrite: bool) -> Result<bool> {
        if !overwrite {
            match self.get_status(remote_path)? {
                Lookup::Found(_) => {
                    tracing::error!(remote = remote_path, "Upload target already exists");
                    return Ok(false);
                }
                Lookup::NotFound => {}
                Lookup::TransportFailed => {
                    tracing::error!(remote = remote_path, "Cannot check upload target");
                    return Ok(false);
                }
            }
        }

        let Some(kind) = local::entry_type(local_path)? else {
            tracing::error!(local = %local_path.display(), "Cannot identify local data");
            return Ok(false);
        };

        let tmp = temp_path(remote_path);
        tracing::info!(
            local = %local_path.display(),
            remote = remote_path,
            tmp = %tmp,
            kind = %kind,
            "Uploading"
        );

        let written = match kind {
            EntryType::File => self.put_file(local_path, &tmp),
            EntryType::Directory => mirror_tree(&mut UploadMirror {
                client: &mut *self,
                local_root: local_path,
                remote_root: &tmp,
            }),
        };

        match written {
            Ok(true) => self.swap_remote(&tmp, remote_path),
            Ok(false) => {
                tracing::error!(remote = remote_path, "Upload failed");
                self.discard_remote(&tmp);
                Ok(false)
            }
            Err(e) => {
                self.discard_remote(&tmp);
                Err(e)
            }
        }
    }

    /// Download a remote file or directory tree to `local_path`.
    ///
    /// With `overwrite` unset an existing local path is left alone and the
    /// call reports `false`.
    pub fn download(&mut self, remote_path: &str, local_path: &Path, overwrite: bool) -> Result<bool> {
        if !overwrite && local::path_exists(local_path) {
            tracing::error!(local = %local_path.display(), "Download target already exists");
            return Ok(false);
        }

        let status = match self.get_status(remote_path)? {
            Lookup::Found(status) => status,
            Lookup::NotFound => {
                tracing::error!(remote = remote_path, "Download source does not exist");
                return Ok(false);
            }
            Lookup::TransportFailed => {
                tracing::error!(remote = remote_path, "Cannot query download source");
                return Ok(false);
            }
        };

        let tmp = temp_local_path(local_path);
        tracing::info!(
            remote = remote_path,
            local = %local_path.display(),
            tmp = %tmp.display(),
            kind = %status.entry_type,
            "Downloading"
        );

        let fetched = match status.entry_type {
            EntryType::File => self.fetch_file(remote_path, &tmp),
            EntryType::Directory => mirror_tree(&mut DownloadMirror {
                client: &mut *self,
                remote_root: remote_path,
                local_root: &tmp,
            }),
        };

        match fetched {
            Ok(true) => {}
            Ok(false) => {
                tracing::error!(remote = remote_path, "Download failed");
                local::discard(&tmp);
                return Ok(false);
            }
            Err(e) => {
                local::discard(&tmp);
                return Err(e);
            }
        }

        if let Err(e) = swap_local(&tmp, local_path) {
            local::discard(&tmp);
            return Err(e);
        }
        tracing::info!(local = %local_path.display(), "Download complete");
        Ok(true)
    }

    /// Write one local file to `remote` (CREATE, overwriting). No temporary
    /// path is involved: callers that need atomicity go through [`upload`].
    ///
    /// [`upload`]: HdfsClient::upload
    pub fn put_file(&mut self, local_path: &Path, remote: &str) -> Result<bool> {
        // surface a missing or unreadable source as a local error, not a retried request
        File::open(local_path)?;

        let budget = self.retry.write_attempts;
        let result = self.execute(
            remote,
            Operation::Create { overwrite: true },
            budget,
            |transport, url, method| {
                send_checked(transport, Request::new(method, url).with_file(local_path))?;
                Ok(())
            },
        )?;
        Ok(result.is_some())
    }

    /// Read one remote file into `local_path` (OPEN). The local file is
    /// truncated on every attempt.
    pub fn fetch_file(&mut self, remote: &str, local_path: &Path) -> Result<bool> {
        let budget = self.retry.read_attempts;
        let result = self.execute(remote, Operation::Open, budget, |transport, url, method| {
            let response = transport.send(&Request::new(method, url))?;
            if response.is_not_found() {
                return Ok(false);
            }
            if !response.is_success() {
                return Err(status_error(response, url).into());
            }
            let mut writer = BufWriter::new(File::create(local_path)?);
            let bytes = response.copy_to(url, &mut writer)?;
            tracing::debug!(remote, local = %local_path.display(), bytes, "Fetched file");
            Ok(true)
        })?;

        match result {
            Some(true) => Ok(true),
            Some(false) => {
                tracing::error!(remote, "Remote file not found");
                Ok(false)
            }
            None => Ok(false),
        }
    }

    fn swap_remote(&mut self, tmp: &str, dest: &str) -> Result<bool> {
        let backup = match self.get_status(dest)? {
            Lookup::Found(_) => {
                let backup = temp_path(dest);
                if !self.rename_checked(dest, &backup)? {
                    tracing::error!(dest, "Cannot move existing destination aside");
                    self.discard_remote(tmp);
                    return Ok(false);
                }
                Some(backup)
            }
            Lookup::NotFound => None,
            Lookup::TransportFailed => {
                tracing::error!(dest, "Cannot check destination before rename");
                self.discard_remote(tmp);
                return Ok(false);
            }
        };

        let renamed = self.rename_checked(tmp, dest)?;
        let verified = renamed && self.is_gone(tmp)?;
        if verified {
            if let Some(backup) = backup {
                self.discard_remote(&backup);
            }
            tracing::info!(remote = dest, "Upload complete");
            return Ok(true);
        }

        tracing::error!(tmp, dest, renamed, "Rename into place failed");
        self.discard_remote(tmp);
        if renamed {
            self.discard_remote(dest);
        }
        if let Some(backup) = backup {
            self.restore_backup(&backup, dest)?;
        }
        Ok(false)
    }

    /// RENAME, double-checking a refusal against the namespace. A retried
    /// RENAME whose first reply was lost is refused although it took effect.
    fn rename_checked(&mut self, src: &str, dst: &str) -> Result<bool> {
        if self.rename(src, dst)? {
            return Ok(true);
        }
        let applied = self.get_status(src)?.is_not_found() && self.get_status(dst)?.is_found();
        if applied {
            tracing::warn!(src, dst, "Rename was refused but had already been applied");
        }
        Ok(applied)
    }

    /// Put a moved-aside destination back. Only done onto an absent
    /// destination: renaming onto an existing directory would nest the backup.
    fn restore_backup(&mut self, backup: &str, dest: &str) -> Result<()> {
        if !self.get_status(dest)?.is_not_found() {
            tracing::error!(backup, dest, "Destination still occupied, previous copy left at backup");
            return Ok(());
        }
        if !self.rename_checked(backup, dest)? {
            tracing::error!(backup, dest, "Cannot restore previous destination");
        }
        Ok(())
    }

    /// Has `path` really disappeared from the namespace?
    fn is_gone(&mut self, path: &str) -> Result<bool> {
        match self.list_directory(path)? {
            Lookup::NotFound => Ok(true),
            Lookup::Found(_) => {
                tracing::warn!(path, "Path still listable after rename");
                Ok(false)
            }
            Lookup::TransportFailed => Ok(false),
        }
    }

    /// Best-effort recursive delete of temporary data
    fn discard_remote(&mut self, path: &str) {
        match self.delete(path, true) {
            Ok(true) => tracing::debug!(path, "Removed temporary data"),
            Ok(false) => tracing::debug!(path, "Nothing to remove"),
            Err(e) => tracing::warn!(path, error = %e, "Failed to remove temporary data"),
        }
    }
}

fn swap_local(tmp: &Path, dest: &Path) -> Result<()> {
    local::remove_path(dest)?;
    fs::rename(tmp, dest)?;
    Ok(())
}
