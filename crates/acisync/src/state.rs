//! Local state file.
//!
//! Maps resource addresses to the last-known `FlatState` of the object
//! behind them. The file is JSON and is rewritten whole on every save via a
//! sibling temp file and a rename, so an interrupted write never leaves a
//! truncated state behind.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use acisync_core::{Dn, FlatState};

use crate::error::CliError;
use crate::kind::KindName;

const STATE_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateEntry {
    pub kind: KindName,
    #[serde(flatten)]
    pub state: FlatState,
    pub updated_at: DateTime<Utc>,
}

impl StateEntry {
    pub fn new(kind: KindName, state: FlatState) -> Self {
        Self {
            kind,
            state,
            updated_at: Utc::now(),
        }
    }

    /// Tracked DN, or an empty string for entries without an identity.
    pub fn dn(&self) -> &str {
        self.state.id.as_ref().map_or("", Dn::as_str)
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct StateFile {
    version: u32,
    #[serde(default)]
    resources: BTreeMap<String, StateEntry>,
}

/// In-memory view of a state file.
#[derive(Debug)]
pub struct StateStore {
    path: PathBuf,
    resources: BTreeMap<String, StateEntry>,
}

impl StateStore {
    /// Read `path`. A missing file is an empty state.
    pub fn load(path: &Path) -> Result<Self, CliError> {
        let resources = match std::fs::read_to_string(path) {
            Ok(raw) => {
                let file: StateFile =
                    serde_json::from_str(&raw).map_err(|e| state_error(path, e))?;
                if file.version != STATE_VERSION {
                    return Err(state_error(
                        path,
                        format!("unsupported version {} (expected {STATE_VERSION})", file.version),
                    ));
                }
                file.resources
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => return Err(state_error(path, e)),
        };
        debug!(path = %path.display(), count = resources.len(), "loaded state");
        Ok(Self {
            path: path.to_path_buf(),
            resources,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn get(&self, address: &str) -> Option<&StateEntry> {
        self.resources.get(address)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &StateEntry)> {
        self.resources.iter()
    }

    pub fn addresses(&self) -> Vec<String> {
        self.resources.keys().cloned().collect()
    }

    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }

    /// Address already tracking `dn`, if any.
    pub fn address_of(&self, dn: &str) -> Option<&str> {
        self.resources
            .iter()
            .find(|(_, entry)| entry.dn() == dn)
            .map(|(address, _)| address.as_str())
    }

    /// Record `state` under `address`, or drop the address when the state
    /// carries no identity.
    pub fn track(&mut self, address: &str, kind: KindName, state: FlatState) {
        if state.id.is_some() {
            self.resources
                .insert(address.to_owned(), StateEntry::new(kind, state));
        } else {
            self.resources.remove(address);
        }
    }

    /// Write the state atomically.
    pub fn save(&self) -> Result<(), CliError> {
        let file = StateFile {
            version: STATE_VERSION,
            resources: self.resources.clone(),
        };
        let body = serde_json::to_string_pretty(&file)?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);
        std::fs::write(&tmp, body + "\n")?;
        std::fs::rename(&tmp, &self.path)?;
        debug!(path = %self.path.display(), count = self.resources.len(), "saved state");
        Ok(())
    }
}

fn state_error(path: &Path, reason: impl std::fmt::Display) -> CliError {
    CliError::State {
        path: path.display().to_string(),
        reason: reason.to_string(),
    }
}
