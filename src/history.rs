// ABOUTME: Bounded in-memory log of recent analysis reports
// ABOUTME: Oldest entries are evicted once capacity is reached
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::collections::VecDeque;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::pipeline::AnalysisReport;

/// One stored analysis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    /// Entry identifier
    pub id: Uuid,
    /// When the analysis finished
    pub recorded_at: DateTime<Utc>,
    /// The report returned to the caller
    pub report: AnalysisReport,
}

/// Bounded analysis history, most recent last internally
#[derive(Debug, Clone)]
pub struct HistoryLog {
    entries: VecDeque<HistoryEntry>,
    capacity: usize,
}

impl HistoryLog {
    /// Empty log holding at most `capacity` entries (minimum one)
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Store a report, evicting the oldest entry when full
    pub fn append(&mut self, report: AnalysisReport) -> HistoryEntry {
        while self.entries.len() >= self.capacity {
            self.entries.pop_front();
        }
        let entry = HistoryEntry {
            id: Uuid::new_v4(),
            recorded_at: Utc::now(),
            report,
        };
        self.entries.push_back(entry.clone());
        entry
    }

    /// Entries, most recent first
    #[must_use]
    pub fn list(&self) -> Vec<HistoryEntry> {
        self.entries.iter().rev().cloned().collect()
    }

    /// Entry by id
    #[must_use]
    pub fn get(&self, id: Uuid) -> Option<&HistoryEntry> {
        self.entries.iter().find(|e| e.id == id)
    }

    /// Remove one entry; false when the id is unknown
    pub fn delete(&mut self, id: Uuid) -> bool {
        self.entries
            .iter()
            .position(|e| e.id == id)
            .and_then(|index| self.entries.remove(index))
            .is_some()
    }

    /// Remove everything, returning how many entries were dropped
    pub fn clear(&mut self) -> usize {
        let removed = self.entries.len();
        self.entries.clear();
        removed
    }

    /// Number of stored entries
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when nothing is stored
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Maximum number of entries kept
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }
}
