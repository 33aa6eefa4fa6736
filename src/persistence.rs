//! Save/load for trained policies
//!
//! A trained Q-table is persisted as a versioned JSON envelope so stale
//! files from older table layouts are rejected instead of silently
//! misread.

use std::fmt;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::rl::QTable;

/// Current envelope version; bump when the table layout changes
pub const SAVE_VERSION: u32 = 1;

#[derive(Debug, Serialize, Deserialize)]
struct Envelope {
    version: u32,
    table: QTable,
}

/// Everything that can go wrong loading or saving a policy file
#[derive(Debug)]
pub enum PersistError {
    Io(std::io::Error),
    Json(serde_json::Error),
    /// The file was written by an incompatible version of this crate
    Version { found: u32, expected: u32 },
}

impl fmt::Display for PersistError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PersistError::Io(e) => write!(f, "i/o error: {e}"),
            PersistError::Json(e) => write!(f, "malformed policy file: {e}"),
            PersistError::Version { found, expected } => {
                write!(f, "policy file version {found}, expected {expected}")
            }
        }
    }
}

impl std::error::Error for PersistError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            PersistError::Io(e) => Some(e),
            PersistError::Json(e) => Some(e),
            PersistError::Version { .. } => None,
        }
    }
}

impl From<std::io::Error> for PersistError {
    fn from(e: std::io::Error) -> Self {
        PersistError::Io(e)
    }
}

impl From<serde_json::Error> for PersistError {
    fn from(e: serde_json::Error) -> Self {
        PersistError::Json(e)
    }
}

/// Write a Q-table to disk
pub fn save_qtable(path: &Path, table: &QTable) -> Result<(), PersistError> {
    let envelope = Envelope {
        version: SAVE_VERSION,
        table: table.clone(),
    };
    let json = serde_json::to_string(&envelope)?;
    fs::write(path, json)?;
    log::info!("saved policy to {}", path.display());
    Ok(())
}

/// Read a Q-table back, rejecting incompatible versions
pub fn load_qtable(path: &Path) -> Result<QTable, PersistError> {
    let json = fs::read_to_string(path)?;
    let envelope: Envelope = serde_json::from_str(&json)?;
    if envelope.version != SAVE_VERSION {
        return Err(PersistError::Version {
            found: envelope.version,
            expected: SAVE_VERSION,
        });
    }
    log::info!("loaded policy from {}", path.display());
    Ok(envelope.table)
}
