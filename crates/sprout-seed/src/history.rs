//! Per-step run record
//!
//! A [`RunHistory`] holds one [`IterationRecord`] per step, the initial
//! labeling included. Each record keeps the live identity count after the
//! step, the accepted split events and the name of the merged snapshot
//! taken at that step. [`RunHistory::to_table`] flattens it into the
//! delimited history file.

use serde::{Deserialize, Serialize};
use sprout_core::Threshold;
use sprout_io::DelimitedTable;
use std::collections::BTreeMap;
use std::fmt;

/// What identifies a step: its erosion count or its threshold
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum StepKey {
    Erosion(usize),
    Threshold(Threshold),
}

impl fmt::Display for StepKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StepKey::Erosion(i) => write!(f, "{i}"),
            StepKey::Threshold(t) => write!(f, "{}", t.lower()),
        }
    }
}

/// One accepted split of a reference identity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SplitEvent {
    /// Identity that was split
    pub reference: u32,
    /// Identities allocated for the surviving candidates
    pub new_ids: Vec<u32>,
    /// Every intersecting candidate of the fresh labeling
    pub candidate_ids: Vec<u32>,
    /// Candidates above the per-candidate proportion threshold
    pub filtered_ids: Vec<u32>,
    /// Proportion of every intersecting candidate, in percent
    pub proportions: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IterationRecord {
    pub key: StepKey,
    /// Live identities in the merged volume after the step
    pub total_ids: usize,
    pub events: Vec<SplitEvent>,
    /// Name of the component label file produced at this step
    pub snapshot_name: String,
}

impl IterationRecord {
    /// Whether any split was accepted at this step.
    pub fn has_split(&self) -> bool {
        self.events.iter().any(|e| !e.new_ids.is_empty())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunHistory {
    pub records: Vec<IterationRecord>,
}

fn json_map<V: Serialize>(events: &[SplitEvent], f: impl Fn(&SplitEvent) -> V) -> String {
    let map: BTreeMap<u32, V> = events.iter().map(|e| (e.reference, f(e))).collect();
    serde_json::to_string(&map).unwrap_or_default()
}

impl RunHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, record: IterationRecord) {
        self.records.push(record);
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn last(&self) -> Option<&IterationRecord> {
        self.records.last()
    }

    /// All split events in step order.
    pub fn events(&self) -> impl Iterator<Item = &SplitEvent> + '_ {
        self.records.iter().flat_map(|r| r.events.iter())
    }

    /// Flatten into a table; per-reference columns hold a JSON object keyed
    /// by the split identity.
    pub fn to_table(&self) -> DelimitedTable {
        let mut table = DelimitedTable::new([
            "key",
            "total_id",
            "split_id",
            "split_ori_id",
            "split_ori_id_filtered",
            "split_prop",
            "cur_seed_name",
        ]);
        for r in &self.records {
            table.push_row([
                r.key.to_string(),
                r.total_ids.to_string(),
                json_map(&r.events, |e| e.new_ids.clone()),
                json_map(&r.events, |e| e.candidate_ids.clone()),
                json_map(&r.events, |e| e.filtered_ids.clone()),
                json_map(&r.events, |e| e.proportions.clone()),
                r.snapshot_name.clone(),
            ]);
        }
        table
    }
}
