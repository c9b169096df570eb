/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at http://mozilla.org/MPL/2.0/. */

//! Vault persistence
//!
//! The vault is a single JSON document which we read in full for every query and rewrite in full
//! for every change, so edits made by hand are picked up by the next call. Nothing is cached.
//!
//! Every change is a read-modify-write done while holding the write lock: an in-process mutex,
//! plus an exclusive OS lock on `<vault>.lock` so another process can't interleave its own
//! read-modify-write with ours. New contents go to a temp file in the same directory which is
//! then renamed over the vault, so readers see either the old or the new file and never half of
//! one.

use crate::config::VaultConfig;
use crate::error::*;
use crate::guid::Guid;
use crate::record::{now, Record, RecordEntry, Settings, Vault};
use parking_lot::{Mutex, MutexGuard};
use std::fs::{self, File, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

enum Backing {
    File { path: PathBuf, lock_path: PathBuf },
    // The serialized document, or `None` before `initialize()`.
    Memory(Mutex<Option<String>>),
}

/// Held for the duration of a read-modify-write.
struct WriteGuard<'a> {
    _writer: MutexGuard<'a, ()>,
    lock_file: Option<File>,
}

impl Drop for WriteGuard<'_> {
    fn drop(&mut self) {
        if let Some(file) = &self.lock_file {
            if let Err(e) = file.unlock() {
                log::warn!("Failed to release the vault lock: {}", e);
            }
        }
    }
}

pub struct VaultStore {
    backing: Backing,
    writer: Mutex<()>,
}

impl VaultStore {
    pub fn new(path: impl AsRef<Path>) -> ApiResult<Self> {
        handle_error(|| {
            let path = path.as_ref();
            if path.file_name().is_none() {
                return Err(Error::InvalidPath(path.as_os_str().to_owned()));
            }
            let mut lock_path = path.as_os_str().to_owned();
            lock_path.push(".lock");
            Ok(Self {
                backing: Backing::File {
                    path: path.to_path_buf(),
                    lock_path: PathBuf::from(lock_path),
                },
                writer: Mutex::new(()),
            })
        })
    }

    pub fn from_config(config: &VaultConfig) -> ApiResult<Self> {
        Self::new(config.path())
    }

    /// A store with no file behind it. Starts out uninitialized, like a fresh path on disk.
    pub fn new_in_memory() -> Self {
        Self {
            backing: Backing::Memory(Mutex::new(None)),
            writer: Mutex::new(()),
        }
    }

    /// The vault file, if this store has one.
    pub fn path(&self) -> Option<&Path> {
        match &self.backing {
            Backing::File { path, .. } => Some(path),
            Backing::Memory(_) => None,
        }
    }

    /// Make sure the vault exists, writing an empty one with default settings if it doesn't.
    ///
    /// If it already exists, records without an id, or with an id an earlier record already
    /// uses, get a fresh one. Calling this more than once is harmless.
    pub fn initialize(&self) -> ApiResult<()> {
        handle_error(|| {
            if let Backing::File { path, .. } = &self.backing {
                fs::create_dir_all(parent_dir(path))?;
            }
            let _guard = self.lock_for_write()?;
            match self.read_raw() {
                Err(Error::VaultMissing(_)) => {
                    log::info!("Creating a new vault");
                    self.write_vault(&Vault::default())
                }
                Err(e) => Err(e),
                Ok(data) => {
                    let mut vault: Vault = serde_json::from_str(&data)?;
                    let fixed = vault.fix_up_ids();
                    if fixed > 0 {
                        log::info!("Assigned ids to {} record(s)", fixed);
                        self.write_vault(&vault)?;
                    }
                    Ok(())
                }
            }
        })
    }

    pub fn get_settings(&self) -> ApiResult<Settings> {
        handle_error(|| Ok(self.read_vault()?.settings))
    }

    /// Replace the settings, keeping every record.
    pub fn set_settings(&self, settings: Settings) -> ApiResult<()> {
        handle_error(|| {
            settings.check_valid()?;
            self.modify(|vault| {
                vault.settings = settings;
                Ok(())
            })
        })
    }

    /// Every record, most recently used first.
    pub fn get_records(&self) -> ApiResult<Vec<Record>> {
        handle_error(|| Ok(self.load()?.records_by_use()))
    }

    pub fn get_record(&self, id: &Guid) -> ApiResult<Option<Record>> {
        handle_error(|| Ok(self.load()?.find(id).cloned()))
    }

    /// Replace every record, keeping the settings.
    pub fn set_records(&self, records: Vec<Record>) -> ApiResult<()> {
        handle_error(|| {
            self.modify(|vault| {
                vault.records = records;
                Ok(())
            })
        })
    }

    /// Append a record. No duplicate check is done, see `find_duplicate`.
    pub fn add_record(&self, record: Record) -> ApiResult<()> {
        handle_error(|| {
            self.modify(|vault| {
                log::debug!("Adding record {}", record.id);
                vault.records.push(record);
                Ok(())
            })
        })
    }

    /// The first record with the same name, login and password as `entry`.
    pub fn find_duplicate(&self, entry: &RecordEntry) -> ApiResult<Option<Record>> {
        handle_error(|| {
            Ok(self
                .load()?
                .records
                .into_iter()
                .find(|r| r.is_duplicate_of(entry)))
        })
    }

    pub fn delete_record(&self, id: &Guid) -> ApiResult<()> {
        handle_error(|| {
            self.modify(|vault| {
                let idx = vault.position(id)?;
                vault.records.remove(idx);
                log::debug!("Deleted record {}", id);
                Ok(())
            })
        })
    }

    /// Mark a record as just used, returning the updated record.
    pub fn touch_record(&self, id: &Guid) -> ApiResult<Record> {
        handle_error(|| {
            self.modify(|vault| {
                let idx = vault.position(id)?;
                let record = &mut vault.records[idx];
                record.last_used = now();
                log::debug!("Touched record {}", id);
                Ok(record.clone())
            })
        })
    }

    fn read_raw(&self) -> Result<String> {
        match &self.backing {
            Backing::File { path, .. } => match fs::read_to_string(path) {
                Ok(data) => Ok(data),
                Err(e) if e.kind() == ErrorKind::NotFound => {
                    Err(Error::VaultMissing(path.clone()))
                }
                Err(e) => Err(e.into()),
            },
            Backing::Memory(data) => data
                .lock()
                .clone()
                .ok_or_else(|| Error::VaultMissing(PathBuf::from(":memory:"))),
        }
    }

    fn write_raw(&self, data: String) -> Result<()> {
        match &self.backing {
            Backing::File { path, .. } => {
                let mut tmp = NamedTempFile::new_in(parent_dir(path))?;
                tmp.write_all(data.as_bytes())?;
                tmp.as_file().sync_all()?;
                tmp.persist(path).map_err(|e| e.error)?;
            }
            Backing::Memory(slot) => *slot.lock() = Some(data),
        }
        Ok(())
    }

    fn read_vault(&self) -> Result<Vault> {
        Ok(serde_json::from_str(&self.read_raw()?)?)
    }

    fn write_vault(&self, vault: &Vault) -> Result<()> {
        self.write_raw(serde_json::to_string_pretty(vault)?)
    }

    /// Read the vault for a query. If the file was edited by hand since `initialize()` and has
    /// records with missing or repeated ids, those get fresh ids written back first, otherwise
    /// the ids we hand out would change on every read.
    fn load(&self) -> Result<Vault> {
        let vault = self.read_vault()?;
        if vault.needs_id_fix_up() {
            return self.modify(|vault| Ok(vault.clone()));
        }
        Ok(vault)
    }

    fn modify<T>(&self, f: impl FnOnce(&mut Vault) -> Result<T>) -> Result<T> {
        if let Backing::File { path, .. } = &self.backing {
            // Without this the lock file would be created in a directory that doesn't exist.
            if !path.exists() {
                return Err(Error::VaultMissing(path.clone()));
            }
        }
        let _guard = self.lock_for_write()?;
        let mut vault = self.read_vault()?;
        vault.fix_up_ids();
        let result = f(&mut vault)?;
        vault.fix_up_ids();
        self.write_vault(&vault)?;
        Ok(result)
    }

    fn lock_for_write(&self) -> Result<WriteGuard<'_>> {
        let writer = self.writer.lock();
        let lock_file = match &self.backing {
            Backing::File { lock_path, .. } => {
                let file = OpenOptions::new()
                    .create(true)
                    .truncate(false)
                    .write(true)
                    .open(lock_path)?;
                file.lock()?;
                Some(file)
            }
            Backing::Memory(_) => None,
        };
        Ok(WriteGuard {
            _writer: writer,
            lock_file,
        })
    }
}

fn parent_dir(path: &Path) -> &Path {
    match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    }
}
