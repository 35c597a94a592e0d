//! Persistent installation ledger.
//!
//! Records, per managed installation, which prerequisites are known to be
//! satisfied and whether the engine prerequisite has been handled. Entries
//! are only ever added; absence means "not attempted yet".

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::{self, File, OpenOptions, TryLockError};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use super::InstallationId;
use crate::error::{PrereqError, Result};
use crate::manifest::PrerequisiteRequest;

const LEDGER_FILE: &str = "ledger.yml";
const LOCK_FILE: &str = "ledger.lock";

/// Persisted prerequisite state for one installation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstallationLedger {
    /// Whether the bundled engine prerequisite installer ran successfully.
    #[serde(rename = "installedUE4Prereq", default)]
    pub installed_ue4_prereq: bool,

    /// Prerequisites recorded as satisfied.
    #[serde(rename = "installedPrereqs", default)]
    pub installed_prereqs: BTreeMap<String, bool>,
}

impl InstallationLedger {
    pub fn is_satisfied(&self, name: &str) -> bool {
        self.installed_prereqs.get(name).copied().unwrap_or(false)
    }

    /// Requests not yet recorded, in request order, without duplicates.
    pub fn pending(&self, requests: &[PrerequisiteRequest]) -> Vec<PrerequisiteRequest> {
        let mut pending: Vec<PrerequisiteRequest> = Vec::new();
        for request in requests {
            if !self.is_satisfied(&request.name) && !pending.contains(request) {
                pending.push(request.clone());
            }
        }
        pending
    }

    /// Mark `names` satisfied. Existing entries are kept.
    pub fn merge<I, S>(&mut self, names: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for name in names {
            self.installed_prereqs.insert(name.into(), true);
        }
    }

    /// Names recorded as satisfied, sorted.
    pub fn satisfied(&self) -> Vec<&str> {
        self.installed_prereqs
            .iter()
            .filter(|(_, ok)| **ok)
            .map(|(name, _)| name.as_str())
            .collect()
    }
}

/// Reads and writes the ledger of one installation.
#[derive(Debug, Clone)]
pub struct LedgerStore {
    id: InstallationId,
    dir: PathBuf,
}

impl LedgerStore {
    /// Ledger for `id` stored under `<state_dir>/installs/<hash>/`.
    pub fn new(state_dir: &Path, id: InstallationId) -> Self {
        let dir = state_dir.join("installs").join(id.hash());
        Self { id, dir }
    }

    pub fn id(&self) -> &InstallationId {
        &self.id
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path(&self) -> PathBuf {
        self.dir.join(LEDGER_FILE)
    }

    /// Load the ledger; a missing file is an empty ledger.
    pub fn load(&self) -> Result<InstallationLedger> {
        let path = self.path();
        if !path.exists() {
            return Ok(InstallationLedger::default());
        }

        let content = fs::read_to_string(&path)?;
        if content.trim().is_empty() {
            return Ok(InstallationLedger::default());
        }

        serde_yaml::from_str(&content).map_err(|e| PrereqError::LedgerParse {
            path,
            message: e.to_string(),
        })
    }

    /// Save the ledger using atomic write.
    ///
    /// The content is written and flushed to a temp file that then replaces
    /// the ledger, so a crash never leaves a partially written ledger.
    pub fn save(&self, ledger: &InstallationLedger) -> Result<()> {
        fs::create_dir_all(&self.dir)?;

        let path = self.path();
        let content = serde_yaml::to_string(ledger).map_err(|e| {
            PrereqError::Other(anyhow::anyhow!("Failed to serialize ledger: {}", e))
        })?;

        let temp_path = path.with_extension("yml.tmp");
        {
            let mut file = fs::File::create(&temp_path)?;
            file.write_all(content.as_bytes())?;
            file.sync_all()?;
        }
        fs::rename(&temp_path, &path)?;

        Ok(())
    }

    /// Requests whose names are not recorded yet.
    pub fn pending(&self, requests: &[PrerequisiteRequest]) -> Result<Vec<PrerequisiteRequest>> {
        Ok(self.load()?.pending(requests))
    }

    /// Merge `names` into the persisted ledger.
    ///
    /// Re-reads the ledger first so entries written since the last load
    /// survive.
    pub fn record_satisfied<I, S>(&self, names: I) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut ledger = self.load()?;
        ledger.merge(names);
        self.save(&ledger)?;
        tracing::debug!("Ledger for {} now has {:?}", self.id, ledger.satisfied());
        Ok(())
    }

    pub fn is_engine_handled(&self) -> Result<bool> {
        Ok(self.load()?.installed_ue4_prereq)
    }

    pub fn mark_engine_handled(&self) -> Result<()> {
        let mut ledger = self.load()?;
        ledger.installed_ue4_prereq = true;
        self.save(&ledger)
    }

    /// Take the exclusive pass lock for this installation.
    ///
    /// The lock is an OS advisory lock on `ledger.lock`, so it is released
    /// when the holding process exits, even if it never drops the guard. A
    /// lock file left behind by a crashed pass is simply reused.
    ///
    /// # Errors
    ///
    /// Returns `LedgerBusy` if another pass holds it.
    pub fn lock(&self) -> Result<PassLock> {
        fs::create_dir_all(&self.dir)?;
        let path = self.dir.join(LOCK_FILE);
        let mut file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&path)?;

        match file.try_lock() {
            Ok(()) => {}
            Err(TryLockError::WouldBlock) => {
                return Err(PrereqError::LedgerBusy {
                    id: self.id.to_string(),
                })
            }
            Err(TryLockError::Error(e)) => return Err(e.into()),
        }

        let mut previous = String::new();
        file.read_to_string(&mut previous)?;
        if let Some(pid) = previous.lines().next().filter(|l| !l.trim().is_empty()) {
            tracing::debug!("Reclaiming pass lock left by process {}", pid.trim());
        }

        file.set_len(0)?;
        file.seek(SeekFrom::Start(0))?;
        writeln!(file, "{}", std::process::id())?;

        Ok(PassLock { path, file })
    }
}

/// Exclusive right to run a pass for one installation. Released on drop or
/// when the process exits.
#[derive(Debug)]
pub struct PassLock {
    path: PathBuf,
    file: File,
}

impl PassLock {
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for PassLock {
    fn drop(&mut self) {
        // The file stays: removing it would let a waiter lock an unlinked inode.
        if let Err(e) = self.file.unlock() {
            tracing::warn!("Could not release {}: {}", self.path.display(), e);
        }
    }
}
