//! Ad hoc JSON dump of the most recent raw result set, for offline
//! inspection.

use std::{fs, io, path::Path};

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

use crate::{table::Record, types::Timeframe};

/// Raw records together with the instant and timeframe they were fetched
/// for.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RawSnapshot {
    pub timestamp: DateTime<Local>,
    pub timeframe: Timeframe,
    pub data: Vec<Record>,
}

impl RawSnapshot {
    /// Snapshot taken now.
    pub fn now(timeframe: Timeframe, data: Vec<Record>) -> Self {
        Self {
            timestamp: Local::now(),
            timeframe,
            data,
        }
    }

    /// Writes pretty-printed JSON, replacing an existing file.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> io::Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> io::Result<Self> {
        let json = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&json)?)
    }
}
