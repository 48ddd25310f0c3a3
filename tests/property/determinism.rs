//! Property-based tests for seeded determinism

use super::strategies::{planning_inputs, taxonomy};
use proptest::prelude::*;
use stratagen::planning::{AssignmentPlanner, PlannerSettings};

/// The same seed always reproduces the same plan
#[test]
fn test_plan_determinism_property() {
    let mut runner = proptest::test_runner::TestRunner::new(ProptestConfig::with_cases(64));

    runner
        .run(&planning_inputs(), |(seed, total, raw)| {
            let taxonomy = taxonomy(&raw);
            let planner = AssignmentPlanner::new(&taxonomy, PlannerSettings::default());
            let first = planner.plan(total, seed).unwrap();
            let second = planner.plan(total, seed).unwrap();
            prop_assert_eq!(first, second);
            Ok(())
        })
        .unwrap();
}

/// Cell counts always add up to the requested total, in grid order
#[test]
fn test_grid_total_property() {
    let mut runner = proptest::test_runner::TestRunner::new(ProptestConfig::with_cases(64));

    runner
        .run(&planning_inputs(), |(seed, total, raw)| {
            let taxonomy = taxonomy(&raw);
            let plan = AssignmentPlanner::new(&taxonomy, PlannerSettings::default())
                .plan(total, seed)
                .unwrap();

            prop_assert_eq!(plan.len(), total);
            prop_assert_eq!(plan.cells.iter().map(|c| c.count).sum::<usize>(), total);
            let mut start = 0;
            for cell in &plan.cells {
                prop_assert_eq!(cell.start, start);
                start += cell.count;
            }
            for item in &plan.items {
                prop_assert_eq!(item.category, item.cell_index % 2);
            }
            Ok(())
        })
        .unwrap();
}
