//! Result assembly: batch outcomes back into plan order as numbered records.

use crate::error::ApiError;
use crate::generation::ExecutionReport;
use crate::planning::Plan;
use serde::{Deserialize, Serialize};

/// One row of the final dataset
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    /// 1-based, dense, in plan order
    pub id: usize,
    pub text: String,
    /// True when `text` is the padding sentinel
    pub padded: bool,
    /// `(axis, value)` for every axis, primary first
    pub labels: Vec<(String, String)>,
}

pub fn assemble_records(plan: &Plan, report: &ExecutionReport) -> Result<Vec<Record>, ApiError> {
    if report.batches.len() != report.outcomes.len() {
        return Err(ApiError::AssemblyError(format!(
            "{} batches but {} outcomes",
            report.batches.len(),
            report.outcomes.len()
        )));
    }

    let mut records = Vec::with_capacity(plan.len());
    for (batch, outcome) in report.batches.iter().zip(&report.outcomes) {
        if batch.id != outcome.id || batch.items.start != records.len() {
            return Err(ApiError::AssemblyError(format!(
                "Outcome {} is out of place for batch {}",
                outcome.id, batch.id
            )));
        }
        if outcome.texts.len() != batch.len() {
            return Err(ApiError::AssemblyError(format!(
                "Batch {} has {} texts for {} items",
                batch.id,
                outcome.texts.len(),
                batch.len()
            )));
        }
        for (item, generated) in plan.items[batch.items.clone()].iter().zip(&outcome.texts) {
            records.push(Record {
                id: records.len() + 1,
                text: generated.text.trim().to_string(),
                padded: !generated.authentic,
                labels: plan
                    .labels(item)
                    .into_iter()
                    .map(|(axis, value)| (axis.to_string(), value.to_string()))
                    .collect(),
            });
        }
    }

    if records.len() != plan.len() {
        return Err(ApiError::AssemblyError(format!(
            "Assembled {} records for a plan of {}",
            records.len(),
            plan.len()
        )));
    }
    Ok(records)
}
