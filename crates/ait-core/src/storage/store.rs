//! Storage collaborator.
//!
//! Workout settings live in an asynchronous key-value store keyed by uuid.
//! The record shape is the one the settings pages edit; the core only reads
//! it and turns it into a [`SequenceConfig`].

use std::collections::HashMap;
use std::future::Future;

use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use crate::error::StoreError;
use crate::timer::{SequenceConfig, Warnings};

/// Uuid of the interval program seeded on first launch.
pub const DEFAULT_INTERVAL_UUID: &str = "00000000-0000-0000-0000-000000000001";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Limits {
    /// Rest seconds.
    pub lower: u32,
    /// Active seconds.
    pub upper: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CountdownWarnings {
    #[serde(default)]
    pub fivesecond: bool,
    #[serde(default)]
    pub tensecond: bool,
    #[serde(default)]
    pub fifteensecond: bool,
}

impl From<CountdownWarnings> for Warnings {
    fn from(w: CountdownWarnings) -> Self {
        Warnings {
            at_5s: w.fivesecond,
            at_10s: w.tensecond,
            at_15s: w.fifteensecond,
        }
    }
}

impl From<Warnings> for CountdownWarnings {
    fn from(w: Warnings) -> Self {
        CountdownWarnings {
            fivesecond: w.at_5s,
            tensecond: w.at_10s,
            fifteensecond: w.at_15s,
        }
    }
}

/// Stored interval program.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntervalRecord {
    pub uuid: String,
    pub name: String,
    pub activerest: Limits,
    pub intervals: u32,
    #[serde(default)]
    pub countdown: u32,
    #[serde(default)]
    pub warnings: CountdownWarnings,
}

impl IntervalRecord {
    /// A new program with a fresh uuid.
    pub fn new(name: impl Into<String>, config: &SequenceConfig) -> Self {
        Self::from_config(Uuid::new_v4().to_string(), name, config)
    }

    pub fn from_config(uuid: impl Into<String>, name: impl Into<String>, config: &SequenceConfig) -> Self {
        Self {
            uuid: uuid.into(),
            name: name.into(),
            activerest: Limits {
                lower: config.rest_seconds,
                upper: config.active_seconds,
            },
            intervals: config.interval_count,
            countdown: config.countdown_seconds,
            warnings: config.warnings.into(),
        }
    }

    /// Seed record stored under `uuid` when nothing is found there.
    pub fn default_for(uuid: &str) -> Self {
        Self::from_config(uuid, "Program #1", &SequenceConfig::default())
    }

    /// Convert into a validated sequence config at `resolution`.
    pub fn to_sequence_config(&self, resolution: u32) -> Result<SequenceConfig, StoreError> {
        let config = SequenceConfig {
            countdown_seconds: self.countdown,
            interval_count: self.intervals,
            active_seconds: self.activerest.upper,
            rest_seconds: self.activerest.lower,
            warnings: self.warnings.into(),
            resolution,
        };
        config
            .validate()
            .map_err(|source| StoreError::InvalidRecord {
                uuid: self.uuid.clone(),
                source,
            })?;
        Ok(config)
    }
}

/// Asynchronous key-value store for interval programs.
pub trait SequenceStore {
    fn get(&self, uuid: &str) -> impl Future<Output = Result<Option<IntervalRecord>, StoreError>>;

    fn set(&mut self, record: IntervalRecord) -> impl Future<Output = Result<(), StoreError>>;
}

/// Fetch a record, storing and returning the default one on a miss.
pub async fn load_or_default<S: SequenceStore>(
    store: &mut S,
    uuid: &str,
) -> Result<IntervalRecord, StoreError> {
    if let Some(record) = store.get(uuid).await? {
        return Ok(record);
    }
    debug!(uuid, "No stored program, seeding default");
    let record = IntervalRecord::default_for(uuid);
    store.set(record.clone()).await?;
    Ok(record)
}

/// In-process store.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    records: HashMap<String, IntervalRecord>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_records(records: impl IntoIterator<Item = IntervalRecord>) -> Self {
        Self {
            records: records
                .into_iter()
                .map(|r| (r.uuid.clone(), r))
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Records sorted by name.
    pub fn records(&self) -> Vec<&IntervalRecord> {
        let mut records: Vec<_> = self.records.values().collect();
        records.sort_by(|a, b| a.name.cmp(&b.name));
        records
    }
}

impl SequenceStore for MemoryStore {
    async fn get(&self, uuid: &str) -> Result<Option<IntervalRecord>, StoreError> {
        Ok(self.records.get(uuid).cloned())
    }

    async fn set(&mut self, record: IntervalRecord) -> Result<(), StoreError> {
        self.records.insert(record.uuid.clone(), record);
        Ok(())
    }
}
