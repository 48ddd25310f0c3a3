//! Post-build plan checks. Counts are re-derived from the finished plan, independent of
//! how the planner built it, and any violation is fatal.

use crate::error::PlanError;
use crate::planning::plan::Plan;
use crate::taxonomy::{Axis, PrimaryRole, Taxonomy};
use std::collections::HashMap;

pub fn validate_plan(plan: &Plan, taxonomy: &Taxonomy) -> Result<(), PlanError> {
    validate_totals(plan)?;
    validate_categories(plan, taxonomy)?;

    for (axis_idx, axis) in taxonomy.secondary.iter().enumerate() {
        match &axis.affinity {
            Some(affinity) => {
                let role = taxonomy.primary.role_of(&affinity.on).ok_or_else(|| {
                    PlanError::InvalidTaxonomy(format!(
                        "Axis '{}' affinity refers to unknown primary axis '{}'",
                        axis.name, affinity.on
                    ))
                })?;
                let primary_axis = taxonomy.primary.axis(role);

                for item in &plan.items {
                    let primary_value = match role {
                        PrimaryRole::First => &item.first,
                        PrimaryRole::Second => &item.second,
                    };
                    let value = &item.secondary[axis_idx];
                    if !affinity.is_legal(value, primary_value) {
                        return Err(PlanError::AffinityViolated {
                            axis: axis.name.clone(),
                            value: value.clone(),
                            primary_axis: primary_axis.name.clone(),
                            primary_value: primary_value.clone(),
                        });
                    }
                }

                for scope in &primary_axis.values {
                    let in_scope: Vec<&str> = plan
                        .items
                        .iter()
                        .filter(|item| match role {
                            PrimaryRole::First => &item.first == scope,
                            PrimaryRole::Second => &item.second == scope,
                        })
                        .map(|item| item.secondary[axis_idx].as_str())
                        .collect();
                    let legal = affinity.legal_for(axis, scope);
                    check_floor(axis, scope, &legal, &in_scope)?;
                }
            }
            None => {
                let observed: Vec<&str> = plan
                    .items
                    .iter()
                    .map(|item| item.secondary[axis_idx].as_str())
                    .collect();
                let legal: Vec<&str> = axis.values.iter().map(String::as_str).collect();
                check_floor(axis, "global", &legal, &observed)?;
            }
        }
    }
    Ok(())
}

fn validate_totals(plan: &Plan) -> Result<(), PlanError> {
    if plan.items.len() != plan.total {
        return Err(PlanError::TotalMismatch {
            expected: plan.total,
            actual: plan.items.len(),
        });
    }
    let allocated: usize = plan.cells.iter().map(|c| c.count).sum();
    if allocated != plan.total {
        return Err(PlanError::TotalMismatch {
            expected: plan.total,
            actual: allocated,
        });
    }
    for cell in &plan.cells {
        let misplaced = plan
            .cell_items(cell)
            .iter()
            .any(|item| item.cell_index != cell.index || item.first != cell.first || item.second != cell.second);
        if misplaced {
            return Err(PlanError::InvalidTaxonomy(format!(
                "Cell {} contains items from another cell",
                cell.index
            )));
        }
    }
    Ok(())
}

fn validate_categories(plan: &Plan, taxonomy: &Taxonomy) -> Result<(), PlanError> {
    let categories = taxonomy.category_count();
    if let Some(item) = plan
        .items
        .iter()
        .find(|item| item.category != item.cell_index % categories)
    {
        return Err(PlanError::InvalidTaxonomy(format!(
            "Item in cell {} has category {} (expected {})",
            item.cell_index,
            item.category,
            item.cell_index % categories
        )));
    }
    Ok(())
}

/// Every legal value must occur at least `observed.len() / legal.len()` times.
fn check_floor(axis: &Axis, scope: &str, legal: &[&str], observed: &[&str]) -> Result<(), PlanError> {
    if legal.is_empty() {
        return Ok(());
    }
    let required = observed.len() / legal.len();
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for value in observed {
        *counts.entry(value).or_insert(0) += 1;
    }
    for value in legal {
        let count = counts.get(value).copied().unwrap_or(0);
        if count < required {
            return Err(PlanError::FloorViolated {
                axis: axis.name.clone(),
                scope: scope.to_string(),
                value: value.to_string(),
                observed: count,
                required,
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::planning::{AssignmentPlanner, PlannerSettings};
    use crate::taxonomy::telecoms_complaints;

    fn plan() -> (Plan, Taxonomy) {
        let taxonomy = telecoms_complaints();
        let plan = AssignmentPlanner::new(&taxonomy, PlannerSettings::default())
            .plan(225, 42)
            .unwrap();
        (plan, taxonomy)
    }

    #[test]
    fn planner_output_validates() {
        let (plan, taxonomy) = plan();
        assert!(validate_plan(&plan, &taxonomy).is_ok());
    }

    #[test]
    fn detects_affinity_violation() {
        let (mut plan, taxonomy) = plan();
        let idx = plan.items.iter().position(|i| i.first == "Low").unwrap();
        plan.items[idx].secondary[0] = "Network outage / poor coverage".to_string();
        let err = validate_plan(&plan, &taxonomy).unwrap_err();
        assert!(matches!(err, PlanError::AffinityViolated { .. }));
    }

    #[test]
    fn detects_floor_violation() {
        let (mut plan, taxonomy) = plan();
        // style is global: 225 / 5 = 45 per value
        for item in plan.items.iter_mut() {
            item.secondary[1] = "Formal professional".to_string();
        }
        let err = validate_plan(&plan, &taxonomy).unwrap_err();
        match err {
            PlanError::FloorViolated {
                axis,
                observed,
                required,
                ..
            } => {
                assert_eq!(axis, "style");
                assert_eq!(observed, 0);
                assert_eq!(required, 45);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn detects_total_mismatch() {
        let (mut plan, taxonomy) = plan();
        plan.items.pop();
        assert!(matches!(
            validate_plan(&plan, &taxonomy),
            Err(PlanError::TotalMismatch { .. })
        ));
    }
}
