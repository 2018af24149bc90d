//! The in-memory pipe store: a concurrent registry partitioned by
//! `(account_id, region)`, plus a cross-region tag index.
//!
//! Generalized to a two-level key the way `AccountRegion`-scoped stores are
//! partitioned; `dashmap` backs both maps since pipe lookups happen
//! per-request from many concurrent worker and control-plane tasks.

use crate::model::{PipeEntity, Tags};
use crate::worker::PipeWorker;
use dashmap::DashMap;
use std::sync::Arc;

/// All pipes and their workers for one `(account_id, region)` scope.
#[derive(Default)]
pub struct RegionPartition {
    /// Pipe entities by name.
    pub pipes: DashMap<String, PipeEntity>,
    /// Running (or recently-stopped) workers by pipe name.
    pub workers: DashMap<String, PipeWorker>,
}

/// The full multi-account, multi-region pipe store.
#[derive(Default)]
pub struct PipesRegistry {
    partitions: DashMap<(String, String), Arc<RegionPartition>>,
    /// Tags by resource ARN, mirroring AWS's cross-region Resource Groups
    /// Tagging API semantics (tags outlive nothing but the resource itself).
    tags: DashMap<String, Tags>,
}

impl PipesRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns (creating if necessary) the partition for `(account_id, region)`.
    pub fn partition(&self, account_id: &str, region: &str) -> Arc<RegionPartition> {
        self.partitions
            .entry((account_id.to_string(), region.to_string()))
            .or_insert_with(|| Arc::new(RegionPartition::default()))
            .clone()
    }

    /// Iterates every partition currently in the registry.
    pub fn partitions(&self) -> impl Iterator<Item = (( String, String), Arc<RegionPartition>)> + '_ {
        self.partitions.iter().map(|e| (e.key().clone(), e.value().clone()))
    }

    /// Tags currently attached to `arn`.
    #[must_use]
    pub fn tags_for(&self, arn: &str) -> Tags {
        self.tags.get(arn).map(|t| t.clone()).unwrap_or_default()
    }

    /// Merges `tags` onto `arn`'s tag set.
    pub fn put_tags(&self, arn: &str, tags: Tags) {
        self.tags.entry(arn.to_string()).or_default().extend(tags);
    }

    /// Removes the given tag keys from `arn`.
    pub fn remove_tags(&self, arn: &str, keys: &[String]) {
        if let Some(mut existing) = self.tags.get_mut(arn) {
            for key in keys {
                existing.remove(key);
            }
        }
    }

    /// Drops all tags for `arn` (called when the resource is deleted).
    pub fn clear_tags(&self, arn: &str) {
        self.tags.remove(arn);
    }
}
