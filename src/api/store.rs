//! Bounded in-memory store of completed runs
//!
//! Keeps the newest `capacity` runs so results can be downloaded after the
//! page has rendered them. Nothing is persisted.

use chrono::{DateTime, Utc};
use std::collections::VecDeque;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::runs::TaskSummary;

/// A completed run
#[derive(Debug, Clone)]
pub struct RunRecord {
    pub id: Uuid,
    pub goal: String,
    pub result: String,
    pub tasks: Vec<TaskSummary>,
    pub duration_ms: u64,
    pub created_at: DateTime<Utc>,
}

/// Shared run store
#[derive(Debug, Clone)]
pub struct RunStore {
    runs: Arc<RwLock<VecDeque<RunRecord>>>,
    capacity: usize,
}

impl RunStore {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            runs: Arc::new(RwLock::new(VecDeque::with_capacity(capacity))),
            capacity,
        }
    }

    /// Store a run, evicting the oldest when full. Returns the number of
    /// runs held afterwards.
    pub async fn insert(&self, record: RunRecord) -> usize {
        let mut runs = self.runs.write().await;
        while runs.len() >= self.capacity {
            runs.pop_front();
        }
        runs.push_back(record);
        runs.len()
    }

    pub async fn get(&self, id: Uuid) -> Option<RunRecord> {
        self.runs.read().await.iter().find(|r| r.id == id).cloned()
    }
}
