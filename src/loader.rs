use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;

use crate::error::{ChronicleError, Result};
use crate::models::{Connection, EmploymentMilestone, Location};

const CONNECTIONS_FILE: &str = "connections.csv";
const LOCATIONS_FILE: &str = "locations.csv";
const MILESTONES_FILE: &str = "employment_milestones.csv";

/// Locations of the three flat files under one data directory.
#[derive(Debug, Clone)]
pub struct DataFiles {
    pub connections: PathBuf,
    pub locations: PathBuf,
    pub milestones: PathBuf,
}

impl DataFiles {
    pub fn in_dir(dir: &Path) -> Self {
        Self {
            connections: dir.join(CONNECTIONS_FILE),
            locations: dir.join(LOCATIONS_FILE),
            milestones: dir.join(MILESTONES_FILE),
        }
    }

    pub fn load_connections(&self) -> Result<Vec<Connection>> {
        load_records(&self.connections)
    }

    pub fn load_locations(&self) -> Result<Vec<Location>> {
        load_records(&self.locations)
    }

    pub fn load_milestones(&self) -> Result<Vec<EmploymentMilestone>> {
        load_records(&self.milestones)
    }
}

/// Read a headed CSV file into records. Blank lines are skipped and fields
/// are trimmed. Dates stay as written; they are parsed where they are used.
pub fn load_records<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    let csv_error = |source| ChronicleError::Csv {
        path: path.to_path_buf(),
        source,
    };

    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(csv_error)?;

    let mut records = Vec::new();
    for row in reader.deserialize::<T>() {
        records.push(row.map_err(csv_error)?);
    }

    tracing::info!(path = %path.display(), rows = records.len(), "loaded records");
    Ok(records)
}
