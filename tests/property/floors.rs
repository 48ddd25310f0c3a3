//! Property-based tests for per-value floors and affinity legality

use super::strategies::{planning_inputs, taxonomy};
use proptest::prelude::*;
use std::collections::HashMap;
use stratagen::planning::{AssignmentPlanner, PlannerSettings};

fn counts<'a>(values: impl Iterator<Item = &'a str>) -> HashMap<&'a str, usize> {
    let mut out = HashMap::new();
    for value in values {
        *out.entry(value).or_insert(0) += 1;
    }
    out
}

/// Unrestricted axes reach `total / |values|` for every value, whatever the weights
#[test]
fn test_global_floor_property() {
    let mut runner = proptest::test_runner::TestRunner::new(ProptestConfig::with_cases(64));

    runner
        .run(&planning_inputs(), |(seed, total, raw)| {
            let taxonomy = taxonomy(&raw);
            let plan = AssignmentPlanner::new(&taxonomy, PlannerSettings::default())
                .plan(total, seed)
                .unwrap();

            for (axis_idx, axis) in taxonomy.secondary.iter().enumerate() {
                if axis.is_restricted() {
                    continue;
                }
                let observed = counts(plan.items.iter().map(|i| i.secondary[axis_idx].as_str()));
                let floor = total / axis.values.len();
                for value in &axis.values {
                    prop_assert!(
                        observed.get(value.as_str()).copied().unwrap_or(0) >= floor,
                        "{} '{}' below floor {}",
                        axis.name,
                        value,
                        floor
                    );
                }
            }
            Ok(())
        })
        .unwrap();
}

/// Restricted values are always legal and meet the floor of their scope
#[test]
fn test_affinity_scope_property() {
    let mut runner = proptest::test_runner::TestRunner::new(ProptestConfig::with_cases(64));

    runner
        .run(&planning_inputs(), |(seed, total, raw)| {
            let taxonomy = taxonomy(&raw);
            let plan = AssignmentPlanner::new(&taxonomy, PlannerSettings::default())
                .plan(total, seed)
                .unwrap();
            let issue = &taxonomy.secondary[0];
            let affinity = issue.affinity.as_ref().unwrap();

            for urgency in &taxonomy.primary.first.values {
                let in_scope: Vec<&str> = plan
                    .items
                    .iter()
                    .filter(|i| &i.first == urgency)
                    .map(|i| i.secondary[0].as_str())
                    .collect();
                for value in &in_scope {
                    prop_assert!(affinity.is_legal(value, urgency));
                }
                let legal = affinity.legal_for(issue, urgency);
                let floor = in_scope.len() / legal.len();
                let observed = counts(in_scope.iter().copied());
                for value in legal {
                    prop_assert!(observed.get(value).copied().unwrap_or(0) >= floor);
                }
            }
            Ok(())
        })
        .unwrap();
}
