//! Deposit event history and its on-disk cache.
//!
//! Snapshots are keyed by `(currency, amount)` and only trusted for the
//! canonical network. Loading, merging and persisting are separate steps so a
//! failed flow never writes a half-merged snapshot.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use ark_bn254::Fr;
use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::encoding::fr_hex;

#[derive(Error, Debug)]
pub enum CacheError {
    #[error("Failed to read event cache {}: {reason}", path.display())]
    Read { path: PathBuf, reason: String },
    #[error("Failed to write event cache {}: {reason}", path.display())]
    Write { path: PathBuf, reason: String },
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EventError {
    #[error("Leaf {leaf_index} was reported with two different commitments")]
    ConflictingLeaf { leaf_index: u64 },
    #[error("Missing leaf {expected} (next event has index {found})")]
    LeafGap { expected: u64, found: u64 },
}

/// A `Deposit` event as observed on the ledger.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DepositEvent {
    #[serde(deserialize_with = "number_or_string")]
    pub block_number: u64,
    pub transaction_hash: String,
    #[serde(with = "fr_hex")]
    pub commitment: Fr,
    #[serde(deserialize_with = "number_or_string")]
    pub leaf_index: u64,
    #[serde(deserialize_with = "number_or_string")]
    pub timestamp: u64,
}

/// RPC responses carry integers as decimal strings.
fn number_or_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u64, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(u64),
        String(String),
    }

    match Raw::deserialize(deserializer)? {
        Raw::Number(n) => Ok(n),
        Raw::String(s) => s.parse().map_err(serde::de::Error::custom),
    }
}

/// Cached events plus the highest block already incorporated.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EventCacheSnapshot {
    pub events: Vec<DepositEvent>,
    pub last_block: u64,
}

impl EventCacheSnapshot {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn from_events(events: Vec<DepositEvent>) -> Self {
        let last_block = events.iter().map(|e| e.block_number).max().unwrap_or(0);
        Self { events, last_block }
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Drop repeats of an already seen `(leafIndex, commitment)` pair,
    /// keeping the first occurrence. Conflicting entries are kept.
    pub fn without_duplicates(&self) -> Self {
        let mut seen = HashSet::with_capacity(self.events.len());
        let events = self
            .events
            .iter()
            .filter(|e| seen.insert((e.leaf_index, e.commitment)))
            .cloned()
            .collect();

        Self {
            events,
            last_block: self.last_block,
        }
    }
}

/// File-backed snapshot store for one canonical network.
#[derive(Clone, Debug)]
pub struct EventCache {
    dir: PathBuf,
    canonical_network_id: u64,
}

impl EventCache {
    pub fn new(dir: impl Into<PathBuf>, canonical_network_id: u64) -> Self {
        Self {
            dir: dir.into(),
            canonical_network_id,
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn canonical_network_id(&self) -> u64 {
        self.canonical_network_id
    }

    /// Path of the snapshot for `(currency, amount)`.
    pub fn snapshot_path(&self, currency: &str, amount: &str) -> PathBuf {
        self.dir.join(format!(
            "deposits_{}_{}.json",
            currency.to_lowercase(),
            amount
        ))
    }

    /// Load the persisted snapshot, or an empty one when the network is not
    /// canonical or nothing has been cached yet.
    pub fn load(
        &self,
        network_id: u64,
        currency: &str,
        amount: &str,
    ) -> Result<EventCacheSnapshot, CacheError> {
        if network_id != self.canonical_network_id {
            debug!(network_id, "event cache bypassed for non-canonical network");
            return Ok(EventCacheSnapshot::empty());
        }

        let path = self.snapshot_path(currency, amount);
        if !path.exists() {
            return Ok(EventCacheSnapshot::empty());
        }

        let read_err = |reason: String| CacheError::Read {
            path: path.clone(),
            reason,
        };
        let contents = fs::read_to_string(&path).map_err(|e| read_err(e.to_string()))?;
        let events: Vec<DepositEvent> =
            serde_json::from_str(&contents).map_err(|e| read_err(e.to_string()))?;

        let snapshot = EventCacheSnapshot::from_events(events);
        debug!(
            events = snapshot.len(),
            last_block = snapshot.last_block,
            "loaded cached deposit events"
        );
        Ok(snapshot)
    }

    /// Append freshly fetched events. No deduplication and no sorting.
    pub fn merge(snapshot: EventCacheSnapshot, fresh: Vec<DepositEvent>) -> EventCacheSnapshot {
        let EventCacheSnapshot {
            mut events,
            last_block,
        } = snapshot;

        let fresh_last = fresh.iter().map(|e| e.block_number).max().unwrap_or(0);
        events.extend(fresh);

        EventCacheSnapshot {
            events,
            last_block: last_block.max(fresh_last),
        }
    }

    /// Replace the snapshot file as a whole. Returns `false` without writing
    /// for non-canonical networks.
    pub fn persist(
        &self,
        network_id: u64,
        currency: &str,
        amount: &str,
        snapshot: &EventCacheSnapshot,
    ) -> Result<bool, CacheError> {
        if network_id != self.canonical_network_id {
            return Ok(false);
        }

        let path = self.snapshot_path(currency, amount);
        let write_err = |reason: String| CacheError::Write {
            path: path.clone(),
            reason,
        };

        fs::create_dir_all(&self.dir).map_err(|e| write_err(e.to_string()))?;
        let bytes =
            serde_json::to_vec_pretty(&snapshot.events).map_err(|e| write_err(e.to_string()))?;

        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, bytes).map_err(|e| write_err(e.to_string()))?;
        fs::rename(&tmp, &path).map_err(|e| write_err(e.to_string()))?;

        debug!(events = snapshot.len(), path = %path.display(), "persisted event cache");
        Ok(true)
    }
}

/// Order events by leaf index and map them to tree leaves.
///
/// Re-fetching from the cache's last block returns that block's events a
/// second time; identical `(leafIndex, commitment)` repeats collapse to one
/// leaf. A leaf index reported with two commitments, or a hole in the index
/// sequence, is an error.
pub fn ordered_commitments(events: &[DepositEvent]) -> Result<Vec<Fr>, EventError> {
    let mut sorted: Vec<&DepositEvent> = events.iter().collect();
    sorted.sort_by_key(|e| e.leaf_index);

    let mut leaves: Vec<Fr> = Vec::with_capacity(sorted.len());
    let mut collapsed = 0usize;

    for event in sorted {
        let expected = leaves.len() as u64;
        if event.leaf_index < expected {
            if leaves[event.leaf_index as usize] != event.commitment {
                return Err(EventError::ConflictingLeaf {
                    leaf_index: event.leaf_index,
                });
            }
            collapsed += 1;
            continue;
        }
        if event.leaf_index > expected {
            return Err(EventError::LeafGap {
                expected,
                found: event.leaf_index,
            });
        }
        leaves.push(event.commitment);
    }

    if collapsed > 0 {
        warn!(collapsed, "collapsed duplicate deposit events");
    }
    Ok(leaves)
}
