//! Plan and run summaries, as comfy-table text or serializable data for JSON output.

use crate::generation::ExecutionSummary;
use crate::planning::{Plan, WorkItem};
use crate::taxonomy::{PrimaryRole, Taxonomy};
use comfy_table::presets::UTF8_BORDERS_ONLY;
use comfy_table::Table;
use owo_colors::OwoColorize;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValueCount {
    pub value: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CellRow {
    pub index: usize,
    pub first: String,
    pub second: String,
    pub count: usize,
    /// Distinct secondary tuples inside the cell
    pub unique_tuples: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AxisCounts {
    pub axis: String,
    /// "global" or the primary value the counts are scoped to
    pub scope: String,
    pub floor: usize,
    pub counts: Vec<ValueCount>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanSummary {
    pub total: usize,
    pub seed: u64,
    pub first_axis: String,
    pub first_distribution: Vec<ValueCount>,
    pub cells: Vec<CellRow>,
    pub axes: Vec<AxisCounts>,
    pub duplicates_resolved: usize,
    pub residual_duplicates: usize,
}

impl PlanSummary {
    pub fn from_plan(plan: &Plan, taxonomy: &Taxonomy) -> Self {
        let first = &taxonomy.primary.first;
        let first_distribution = first
            .values
            .iter()
            .map(|value| ValueCount {
                value: value.clone(),
                count: plan.items.iter().filter(|i| &i.first == value).count(),
            })
            .collect();

        let cells = plan
            .cells
            .iter()
            .map(|cell| {
                let unique: HashSet<&Vec<String>> =
                    plan.cell_items(cell).iter().map(|i| &i.secondary).collect();
                CellRow {
                    index: cell.index,
                    first: cell.first.clone(),
                    second: cell.second.clone(),
                    count: cell.count,
                    unique_tuples: unique.len(),
                }
            })
            .collect();

        let mut axes = Vec::new();
        for (axis_idx, axis) in taxonomy.secondary.iter().enumerate() {
            let role = axis
                .affinity
                .as_ref()
                .and_then(|a| taxonomy.primary.role_of(&a.on));
            match (&axis.affinity, role) {
                (Some(affinity), Some(role)) => {
                    for scope in &taxonomy.primary.axis(role).values {
                        let legal = affinity.legal_for(axis, scope);
                        let (floor, counts) =
                            scoped_counts(plan, axis_idx, &legal, |item| match role {
                                PrimaryRole::First => &item.first == scope,
                                PrimaryRole::Second => &item.second == scope,
                            });
                        axes.push(AxisCounts {
                            axis: axis.name.clone(),
                            scope: scope.clone(),
                            floor,
                            counts,
                        });
                    }
                }
                _ => {
                    let legal: Vec<&str> = axis.values.iter().map(String::as_str).collect();
                    let (floor, counts) = scoped_counts(plan, axis_idx, &legal, |_| true);
                    axes.push(AxisCounts {
                        axis: axis.name.clone(),
                        scope: "global".to_string(),
                        floor,
                        counts,
                    });
                }
            }
        }

        Self {
            total: plan.total,
            seed: plan.seed,
            first_axis: first.name.clone(),
            first_distribution,
            cells,
            axes,
            duplicates_resolved: plan.stats.duplicates_resolved,
            residual_duplicates: plan.stats.residual_duplicates,
        }
    }
}

/// Floor and per-value counts of one secondary axis over the items `in_scope` accepts
fn scoped_counts(
    plan: &Plan,
    axis_idx: usize,
    legal: &[&str],
    in_scope: impl Fn(&WorkItem) -> bool,
) -> (usize, Vec<ValueCount>) {
    let observed: Vec<&str> = plan
        .items
        .iter()
        .filter(|item| in_scope(item))
        .map(|item| item.secondary[axis_idx].as_str())
        .collect();
    let floor = if legal.is_empty() {
        0
    } else {
        observed.len() / legal.len()
    };
    let counts = legal
        .iter()
        .map(|value| ValueCount {
            value: value.to_string(),
            count: observed.iter().filter(|v| *v == value).count(),
        })
        .collect();
    (floor, counts)
}

fn heading(title: &str) -> String {
    format!("{}", title.bold().underline())
}

fn percent(count: usize, total: usize) -> String {
    if total == 0 {
        return "-".to_string();
    }
    format!("{:.1}%", count as f64 * 100.0 / total as f64)
}

pub fn format_plan_summary_text(summary: &PlanSummary) -> String {
    let mut out = String::new();
    out.push_str(&format!("{}\n\n", heading("Plan")));
    out.push_str(&format!("  Total: {}\n  Seed: {}\n", summary.total, summary.seed));
    out.push_str(&format!(
        "  Duplicates resolved: {}\n  Residual duplicates: {}\n\n",
        summary.duplicates_resolved, summary.residual_duplicates
    ));

    out.push_str(&format!(
        "{}\n\n",
        heading(&format!("{} distribution", summary.first_axis))
    ));
    let mut table = Table::new();
    table.load_preset(UTF8_BORDERS_ONLY);
    table.set_header(vec!["Value", "Items", "Share"]);
    for row in &summary.first_distribution {
        table.add_row(vec![
            row.value.clone(),
            row.count.to_string(),
            percent(row.count, summary.total),
        ]);
    }
    out.push_str(&format!("{}\n\n", table));

    out.push_str(&format!("{}\n\n", heading("Cells")));
    let mut table = Table::new();
    table.load_preset(UTF8_BORDERS_ONLY);
    table.set_header(vec!["#", "First", "Second", "Items", "Unique tuples"]);
    for cell in &summary.cells {
        table.add_row(vec![
            cell.index.to_string(),
            cell.first.clone(),
            cell.second.clone(),
            cell.count.to_string(),
            cell.unique_tuples.to_string(),
        ]);
    }
    out.push_str(&format!("{}\n\n", table));

    for axis in &summary.axes {
        out.push_str(&format!(
            "{}\n\n",
            heading(&format!("{} ({}, floor {})", axis.axis, axis.scope, axis.floor))
        ));
        let mut table = Table::new();
        table.load_preset(UTF8_BORDERS_ONLY);
        table.set_header(vec!["Value", "Items"]);
        for row in &axis.counts {
            table.add_row(vec![row.value.clone(), row.count.to_string()]);
        }
        out.push_str(&format!("{}\n\n", table));
    }
    out
}

pub fn format_execution_summary_text(summary: &ExecutionSummary) -> String {
    let mut out = String::new();
    out.push_str(&format!("{}\n\n", heading("Generation")));
    let mut table = Table::new();
    table.load_preset(UTF8_BORDERS_ONLY);
    table.set_header(vec![
        "Batches",
        "Accepted",
        "Padded",
        "Retries",
        "Padded items",
        "Peak in flight",
    ]);
    table.add_row(vec![
        summary.batches.to_string(),
        summary.accepted.to_string(),
        summary.padded.to_string(),
        summary.retries.to_string(),
        summary.padded_items.to_string(),
        summary.peak_in_flight.to_string(),
    ]);
    out.push_str(&format!("{}\n", table));
    if summary.padded_items > 0 {
        out.push_str(&format!(
            "\n{} {} items carry the failure sentinel; re-run to replace them.\n",
            "warning:".yellow(),
            summary.padded_items
        ));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::planning::{AssignmentPlanner, PlannerSettings};
    use crate::taxonomy::telecoms_complaints;

    fn summary() -> PlanSummary {
        let taxonomy = telecoms_complaints();
        let plan = AssignmentPlanner::new(&taxonomy, PlannerSettings::default())
            .plan(225, 42)
            .unwrap();
        PlanSummary::from_plan(&plan, &taxonomy)
    }

    #[test]
    fn summary_counts_scoped_and_global_axes() {
        let summary = summary();
        let counts: Vec<usize> = summary.first_distribution.iter().map(|r| r.count).collect();
        assert_eq!(counts, vec![78, 90, 57]);

        // scenario: three urgency scopes, then one global entry per remaining axis
        assert_eq!(summary.axes.len(), 3 + 4);
        let low = &summary.axes[0];
        assert_eq!((low.axis.as_str(), low.scope.as_str()), ("scenario", "Low"));
        assert_eq!(low.counts.len(), 5);
        assert_eq!(low.floor, 78 / 5);
        assert!(low.counts.iter().all(|c| c.count >= low.floor));

        let style = &summary.axes[3];
        assert_eq!(style.scope, "global");
        assert_eq!(style.floor, 45);
        assert_eq!(style.counts.iter().map(|c| c.count).sum::<usize>(), 225);
    }

    #[test]
    fn text_summary_lists_sections() {
        let text = format_plan_summary_text(&summary());
        assert!(text.contains("Total: 225"));
        assert!(text.contains("Cells"));
        assert!(text.contains("34.7%"));
        assert!(text.contains("channel (global, floor 56)"));
    }

    #[test]
    fn execution_summary_warns_about_padding() {
        let summary = ExecutionSummary {
            batches: 18,
            accepted: 17,
            padded: 1,
            retries: 3,
            padded_items: 2,
            peak_in_flight: 10,
        };
        let text = format_execution_summary_text(&summary);
        assert!(text.contains("2 items carry the failure sentinel"));
    }
}
