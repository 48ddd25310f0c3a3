use crate::planning::grid::Cell;
use serde::{Deserialize, Serialize};

/// One fully labeled unit of work. Carries no generated text.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WorkItem {
    pub cell_index: usize,
    pub first: String,
    pub second: String,
    /// One value per secondary axis, in taxonomy order
    pub secondary: Vec<String>,
    /// Instruction variant selector: `cell_index mod K`
    pub category: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanStats {
    /// Items whose initial tuple collided and was fixed by swapping
    pub duplicates_resolved: usize,
    /// Collisions left in place after the attempt cap (accept policy only)
    pub residual_duplicates: usize,
    /// Swaps applied during duplicate resolution
    pub swaps: usize,
}

/// The complete ordered set of work items, grouped by cell in grid order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Plan {
    pub total: usize,
    pub seed: u64,
    pub first_axis: String,
    pub second_axis: String,
    pub secondary_axes: Vec<String>,
    pub cells: Vec<Cell>,
    pub items: Vec<WorkItem>,
    pub stats: PlanStats,
}

impl Plan {
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn cell_items(&self, cell: &Cell) -> &[WorkItem] {
        &self.items[cell.range()]
    }

    pub fn axis_names(&self) -> Vec<&str> {
        let mut names = vec![self.first_axis.as_str(), self.second_axis.as_str()];
        names.extend(self.secondary_axes.iter().map(String::as_str));
        names
    }

    /// `(axis, value)` pairs for an item, primary axes first
    pub fn labels<'a>(&'a self, item: &'a WorkItem) -> Vec<(&'a str, &'a str)> {
        let mut labels = vec![
            (self.first_axis.as_str(), item.first.as_str()),
            (self.second_axis.as_str(), item.second.as_str()),
        ];
        labels.extend(
            self.secondary_axes
                .iter()
                .map(String::as_str)
                .zip(item.secondary.iter().map(String::as_str)),
        );
        labels
    }

    /// Value of `axis` on `item`, if the axis exists
    pub fn value_of<'a>(&self, item: &'a WorkItem, axis: &str) -> Option<&'a str> {
        if axis == self.first_axis {
            return Some(&item.first);
        }
        if axis == self.second_axis {
            return Some(&item.second);
        }
        self.secondary_axes
            .iter()
            .position(|a| a == axis)
            .map(|idx| item.secondary[idx].as_str())
    }
}
