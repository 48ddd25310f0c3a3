//! Batches: contiguous slices of one cell, submitted as a single generation call.

use crate::planning::Plan;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Range;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BatchId {
    /// Submission position across the whole run
    pub sequence: usize,
    pub cell_index: usize,
    /// Position inside the cell
    pub batch_index: usize,
}

impl fmt::Display for BatchId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "#{} (cell {}, batch {})",
            self.sequence, self.cell_index, self.batch_index
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Batch {
    pub id: BatchId,
    /// Item range inside the plan
    pub items: Range<usize>,
    /// Instruction variant shared by the cell
    pub category: usize,
}

impl Batch {
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Split every cell into consecutive batches of at most `max_size` items.
///
/// Cells with zero items produce no batch. `max_size` must be at least 1.
pub fn partition_batches(plan: &Plan, max_size: usize) -> Vec<Batch> {
    debug_assert!(max_size > 0);
    let max_size = max_size.max(1);
    let mut batches = Vec::new();
    for cell in &plan.cells {
        let category = plan
            .cell_items(cell)
            .first()
            .map(|item| item.category)
            .unwrap_or(0);
        let mut start = cell.start;
        let end = cell.start + cell.count;
        let mut batch_index = 0;
        while start < end {
            let stop = (start + max_size).min(end);
            batches.push(Batch {
                id: BatchId {
                    sequence: batches.len(),
                    cell_index: cell.index,
                    batch_index,
                },
                items: start..stop,
                category,
            });
            batch_index += 1;
            start = stop;
        }
    }
    batches
}

/// Lifecycle of one batch inside the executor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BatchState {
    Pending,
    Requesting,
    Retrying,
    /// Received at least the expected count
    Accepted,
    /// Out of attempts with too few results
    Exhausted,
    /// Exhausted, then filled with sentinels
    Padded,
}

impl BatchState {
    pub fn is_terminal(self) -> bool {
        matches!(self, BatchState::Accepted | BatchState::Padded)
    }
}

/// One generated entry, positionally aligned with a work item
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedText {
    pub text: String,
    /// False for padding sentinels
    pub authentic: bool,
}

/// Terminal result of one batch
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchOutcome {
    pub id: BatchId,
    pub texts: Vec<GeneratedText>,
    pub state: BatchState,
    pub attempts: usize,
}

impl BatchOutcome {
    pub fn padded_count(&self) -> usize {
        self.texts.iter().filter(|t| !t.authentic).count()
    }
}
