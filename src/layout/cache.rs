//! Single-slot layout memo.
//!
//! Re-running a layout for an unchanged group list would re-seed nothing
//! (both strategies are deterministic) but still costs a packing pass per
//! circle on every frame. The cache keeps the last request and hands back
//! the same `Arc` while the groups and strategy stay structurally equal.

use std::sync::Arc;

use super::{groups_fingerprint, ChartLayout, LayoutStrategy};
use crate::story::Group;

struct Entry {
    fingerprint: u64,
    groups: Vec<Group>,
    strategy: LayoutStrategy,
    layout: Arc<ChartLayout>,
}

/// Memoizes the most recent layout.
#[derive(Default)]
pub struct LayoutCache {
    entry: Option<Entry>,
    hits: u64,
    misses: u64,
}

impl LayoutCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Layout for `groups`, recomputed only when the input changed.
    pub fn get_or_compute(&mut self, groups: &[Group], strategy: &LayoutStrategy) -> Arc<ChartLayout> {
        let fingerprint = groups_fingerprint(groups);
        if let Some(ref e) = self.entry {
            // fingerprint first, full comparison to rule out collisions
            if e.fingerprint == fingerprint && e.groups == groups && &e.strategy == strategy {
                self.hits += 1;
                log::debug!("Layout cache HIT ({:016x})", fingerprint);
                return Arc::clone(&e.layout);
            }
        }

        self.misses += 1;
        log::debug!("Layout cache MISS ({:016x})", fingerprint);
        let layout = Arc::new(strategy.compute(groups));
        self.entry = Some(Entry {
            fingerprint,
            groups: groups.to_vec(),
            strategy: strategy.clone(),
            layout: Arc::clone(&layout),
        });
        layout
    }

    pub fn invalidate(&mut self) {
        self.entry = None;
    }

    pub fn hits(&self) -> u64 {
        self.hits
    }

    pub fn misses(&self) -> u64 {
        self.misses
    }
}
