//! Persisted alert deduplication log.

use chrono::{DateTime, Duration, Utc};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

use screener_core::error::AlertLogError;
use screener_core::types::Classification;

/// Record of notifications already sent, keyed by `"{symbol}_{SIGNAL}"`.
///
/// A key fires at most once until it is cleared or pruned. The on-disk
/// form is a flat JSON object of key to timestamp string.
///
/// Records that have not reached disk yet survive [`AlertLog::reload`].
#[derive(Debug, Clone, Default)]
pub struct AlertLog {
    path: Option<PathBuf>,
    entries: BTreeMap<String, String>,
    /// Recorded since the last successful save.
    unsaved: BTreeMap<String, String>,
}

impl AlertLog {
    /// Log that is never persisted.
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Load the log at `path`. A missing or empty file is an empty log.
    pub fn load(path: impl Into<PathBuf>) -> Result<Self, AlertLogError> {
        let path = path.into();
        let entries = read_entries(&path)?;
        debug!(path = %path.display(), entries = entries.len(), "Loaded alert log");
        Ok(Self {
            path: Some(path),
            entries,
            unsaved: BTreeMap::new(),
        })
    }

    /// Re-read the backing file, picking up external clears. Unsaved
    /// records are kept on top of the file contents.
    pub fn reload(&mut self) -> Result<(), AlertLogError> {
        if let Some(path) = &self.path {
            let mut entries = read_entries(path)?;
            entries.extend(self.unsaved.clone());
            self.entries = entries;
        }
        Ok(())
    }

    /// True when records exist that the last save did not write.
    pub fn has_unsaved(&self) -> bool {
        self.path.is_some() && !self.unsaved.is_empty()
    }

    /// Write the log to its backing file, if any.
    ///
    /// The file is replaced through a `.tmp` sibling, so a failed save
    /// leaves the previous contents intact.
    pub fn save(&mut self) -> Result<(), AlertLogError> {
        let Some(path) = &self.path else {
            return Ok(());
        };

        let json = serde_json::to_string_pretty(&self.entries)
            .map_err(|e| AlertLogError::Malformed(e.to_string()))?;
        let write_err = |source| AlertLogError::Write {
            path: path.display().to_string(),
            source,
        };

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(write_err)?;
        }
        let tmp = temp_path(path);
        fs::write(&tmp, json).map_err(write_err)?;
        fs::rename(&tmp, path).map_err(write_err)?;

        self.unsaved.clear();
        Ok(())
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Composite dedup key.
    pub fn key(symbol: &str, classification: Classification) -> String {
        format!("{}_{}", symbol, classification.label())
    }

    /// True iff the classification is BUY or SELL and its key is absent.
    pub fn should_notify(&self, symbol: &str, classification: Classification) -> bool {
        classification.is_actionable() && !self.contains(&Self::key(symbol, classification))
    }

    /// Record a notification at the current time.
    pub fn record(&mut self, symbol: &str, classification: Classification) {
        self.record_at(symbol, classification, Utc::now());
    }

    pub fn record_at(&mut self, symbol: &str, classification: Classification, at: DateTime<Utc>) {
        let key = Self::key(symbol, classification);
        let ts = at.to_rfc3339();
        self.unsaved.insert(key.clone(), ts.clone());
        self.entries.insert(key, ts);
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// When `key` last fired, if the stored timestamp parses.
    pub fn fired_at(&self, key: &str) -> Option<DateTime<Utc>> {
        self.entries.get(key).and_then(|ts| parse_timestamp(ts))
    }

    /// Remove every key.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.unsaved.clear();
    }

    /// Remove the keys of one instrument. Returns how many were removed.
    pub fn clear_instrument(&mut self, symbol: &str) -> usize {
        [Classification::Buy, Classification::Sell]
            .into_iter()
            .filter(|c| {
                let key = Self::key(symbol, *c);
                self.unsaved.remove(&key);
                self.entries.remove(&key).is_some()
            })
            .count()
    }

    /// Drop keys older than `max_age`. Keys with unreadable timestamps are
    /// kept. Returns how many were removed.
    pub fn prune(&mut self, max_age: Duration, now: DateTime<Utc>) -> usize {
        let cutoff = now - max_age;
        let before = self.entries.len();
        let keep = |_: &String, ts: &mut String| parse_timestamp(ts).map_or(true, |at| at >= cutoff);
        self.entries.retain(keep);
        self.unsaved.retain(keep);
        before - self.entries.len()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }
}

fn temp_path(path: &Path) -> PathBuf {
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    PathBuf::from(tmp)
}

fn read_entries(path: &Path) -> Result<BTreeMap<String, String>, AlertLogError> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(BTreeMap::new()),
        Err(source) => {
            return Err(AlertLogError::Read {
                path: path.display().to_string(),
                source,
            })
        }
    };

    if content.trim().is_empty() {
        return Ok(BTreeMap::new());
    }
    serde_json::from_str(&content).map_err(|e| AlertLogError::Malformed(e.to_string()))
}

/// RFC 3339, or the naive `YYYY-MM-DD HH:MM:SS[.f]` form taken as UTC.
fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%.f")
        .ok()
        .map(|dt| dt.and_utc())
}
