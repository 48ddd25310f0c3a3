//! Grid builder: primary-axis cross product with a target count per cell.

use crate::error::PlanError;
use crate::taxonomy::PrimaryAxes;
use serde::{Deserialize, Serialize};

/// One combination of primary values and the number of items it receives.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cell {
    pub index: usize,
    pub first: String,
    pub second: String,
    pub count: usize,
    /// Offset of the cell's first item inside the plan
    pub start: usize,
}

impl Cell {
    pub fn range(&self) -> std::ops::Range<usize> {
        self.start..self.start + self.count
    }
}

/// Build the ordered grid for `total` items.
///
/// Each cell receives `round_half_even(total * w_first * w_second)`, with `w_second`
/// uniform unless the second axis declares weights. Rounding drift is added to the
/// first largest cell so counts always sum to `total`.
pub fn build_grid(total: usize, primary: &PrimaryAxes) -> Result<Vec<Cell>, PlanError> {
    if total == 0 {
        return Err(PlanError::TotalMismatch {
            expected: 1,
            actual: 0,
        });
    }

    let first = &primary.first;
    let second = &primary.second;
    first.validate_values()?;
    second.validate_values()?;
    first.validate_distribution(true)?;
    second.validate_distribution(false)?;
    let first_weights = first.weights.as_ref().ok_or_else(|| PlanError::InvalidWeights {
        axis: first.name.clone(),
        reason: "first primary axis requires a weight per value".to_string(),
    })?;
    let second_weights: Vec<f64> = match &second.weights {
        Some(weights) => weights.clone(),
        None => vec![1.0 / second.values.len() as f64; second.values.len()],
    };

    let mut counts: Vec<i64> = Vec::with_capacity(first.values.len() * second.values.len());
    let mut allocated: i64 = 0;
    for w_first in first_weights {
        for w_second in &second_weights {
            let count = (total as f64 * w_first * w_second).round_ties_even() as i64;
            counts.push(count);
            allocated += count;
        }
    }

    let drift = total as i64 - allocated;
    if drift != 0 {
        let largest = largest_index(&counts);
        counts[largest] += drift;
        if counts[largest] < 0 {
            return Err(PlanError::InvalidWeights {
                axis: first.name.clone(),
                reason: format!("rounding drift {} cannot be absorbed", drift),
            });
        }
        tracing::debug!(drift, cell = largest, "Absorbed grid rounding drift");
    }

    let mut cells = Vec::with_capacity(counts.len());
    let mut start = 0usize;
    for (index, count) in counts.into_iter().enumerate() {
        let count = usize::try_from(count).map_err(|_| PlanError::InvalidWeights {
            axis: first.name.clone(),
            reason: format!("cell {} received a negative count {}", index, count),
        })?;
        cells.push(Cell {
            index,
            first: first.values[index / second.values.len()].clone(),
            second: second.values[index % second.values.len()].clone(),
            count,
            start,
        });
        start += count;
    }
    Ok(cells)
}

/// Index of the first maximal count
fn largest_index(counts: &[i64]) -> usize {
    let mut best = 0;
    for (idx, count) in counts.iter().enumerate() {
        if *count > counts[best] {
            best = idx;
        }
    }
    best
}

/// Per-value subtotal of one primary axis, in that axis's declaration order
pub fn subtotals<'a>(cells: &[Cell], values: &'a [String], first: bool) -> Vec<(&'a str, usize)> {
    values
        .iter()
        .map(|value| {
            let sum = cells
                .iter()
                .filter(|c| {
                    let cell_value = if first { &c.first } else { &c.second };
                    cell_value == value
                })
                .map(|c| c.count)
                .sum();
            (value.as_str(), sum)
        })
        .collect()
}
