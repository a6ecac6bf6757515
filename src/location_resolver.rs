//! Coordinate Resolution Module
//!
//! Best-effort fallback lookup of venue coordinates from a secondary dataset
//! when the recommender output has none. Lookups never fail: anything that
//! goes wrong is logged and reported as "not found".

use std::fs;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::config::ResolverConfig;
use crate::models::Coordinate;

/// Anything that can look up a venue's position by name
pub trait CoordinateLookup: Send + Sync {
    fn resolve(&self, name: &str, address: &str) -> Option<Coordinate>;
}

/// Lookup that never finds anything
pub struct NoLookup;

impl CoordinateLookup for NoLookup {
    fn resolve(&self, _name: &str, _address: &str) -> Option<Coordinate> {
        None
    }
}

/// Scans a directory of JSON-lines venue records
#[derive(Debug, Clone)]
pub struct DatasetResolver {
    dir: PathBuf,
    max_files: usize,
}

#[derive(Debug, Deserialize)]
struct DatasetRecord {
    hotel_name: Option<String>,
    name: Option<String>,
    location: Option<Value>,
}

impl DatasetRecord {
    /// `hotel_name` wins when a record carries both
    fn key(&self) -> Option<&str> {
        self.hotel_name.as_deref().or(self.name.as_deref())
    }
}

impl DatasetResolver {
    pub fn new(dir: impl Into<PathBuf>, max_files: usize) -> Self {
        Self {
            dir: dir.into(),
            max_files,
        }
    }

    #[must_use]
    pub fn from_config(config: &ResolverConfig) -> Self {
        Self::new(&config.dataset_dir, config.max_files)
    }

    /// The first `max_files` `*.json` files in name order
    fn dataset_files(&self) -> Vec<PathBuf> {
        let entries = match fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(e) => {
                debug!("Dataset directory {} unreadable: {}", self.dir.display(), e);
                return Vec::new();
            }
        };

        let mut files: Vec<PathBuf> = entries
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| path.extension().is_some_and(|ext| ext == "json"))
            .collect();
        files.sort();
        files.truncate(self.max_files);
        files
    }

    fn scan_file(path: &Path, name: &str) -> Option<Coordinate> {
        let file = match fs::File::open(path) {
            Ok(file) => file,
            Err(e) => {
                warn!("Skipping dataset file {}: {}", path.display(), e);
                return None;
            }
        };

        // Lines are read as bytes so one badly encoded record does not end the scan
        BufReader::new(file)
            .split(b'\n')
            .map_while(|line| match line {
                Ok(bytes) => Some(bytes),
                Err(e) => {
                    warn!("Stopped reading dataset file {}: {}", path.display(), e);
                    None
                }
            })
            .filter_map(|bytes| serde_json::from_slice::<DatasetRecord>(&bytes).ok())
            .filter(|record| record.key() == Some(name))
            .find_map(|record| record.location.as_ref().and_then(parse_location))
    }
}

impl CoordinateLookup for DatasetResolver {
    fn resolve(&self, name: &str, address: &str) -> Option<Coordinate> {
        if name.is_empty() {
            return None;
        }
        debug!("Resolving coordinates for '{}' ({})", name, address);

        let found = self
            .dataset_files()
            .iter()
            .find_map(|path| Self::scan_file(path, name));

        match &found {
            Some(coordinate) => debug!(
                "Resolved '{}' to ({}, {})",
                name, coordinate.latitude, coordinate.longitude
            ),
            None => debug!("No dataset record for '{}'", name),
        }
        found
    }
}

/// Accepts `[lat, lon]` arrays (numbers or numeric strings) and `"[lat, lon]"` text
fn parse_location(value: &Value) -> Option<Coordinate> {
    match value {
        Value::Array(items) if items.len() >= 2 => {
            let component = |v: &Value| match v {
                Value::Number(n) => n.as_f64(),
                Value::String(s) => s.trim().parse::<f64>().ok(),
                _ => None,
            };
            let latitude = component(&items[0])?;
            let longitude = component(&items[1])?;
            Coordinate::from_raw(latitude, longitude).ok().flatten()
        }
        Value::String(text) => {
            Coordinate::parse_text(text).filter(|c| c.latitude != 0.0 || c.longitude != 0.0)
        }
        _ => None,
    }
}
