//! End-to-end planner scenarios against fixed taxonomies

use super::test_utils::{restricted_taxonomy, uniform_taxonomy, CHANNELS, TOPICS};
use std::collections::HashMap;
use stratagen::error::PlanError;
use stratagen::planning::{validate_plan, AssignmentPlanner, DuplicatePolicy, PlannerSettings};
use stratagen::taxonomy::telecoms_complaints;

fn count_values<'a>(values: impl Iterator<Item = &'a str>) -> HashMap<&'a str, usize> {
    let mut counts = HashMap::new();
    for value in values {
        *counts.entry(value).or_insert(0) += 1;
    }
    counts
}

#[test]
fn uniform_grid_of_225_meets_every_floor() {
    let taxonomy = uniform_taxonomy();
    let plan = AssignmentPlanner::new(&taxonomy, PlannerSettings::default())
        .plan(225, 42)
        .unwrap();

    assert_eq!(plan.len(), 225);
    assert_eq!(plan.cells.len(), 9);
    assert!(plan.cells.iter().all(|c| c.count == 25));

    let topics = count_values(plan.items.iter().map(|i| i.secondary[0].as_str()));
    assert_eq!(topics.len(), TOPICS);
    assert!(topics.values().all(|&n| n >= 225 / TOPICS), "{:?}", topics);
    assert_eq!(225 / TOPICS, 11);

    let channels = count_values(plan.items.iter().map(|i| i.secondary[1].as_str()));
    assert_eq!(channels.len(), CHANNELS);
    assert!(channels.values().all(|&n| n >= 56), "{:?}", channels);
}

#[test]
fn items_are_grouped_by_cell_in_grid_order() {
    let taxonomy = uniform_taxonomy();
    let plan = AssignmentPlanner::new(&taxonomy, PlannerSettings::default())
        .plan(225, 7)
        .unwrap();

    for cell in &plan.cells {
        for item in plan.cell_items(cell) {
            assert_eq!(item.cell_index, cell.index);
            assert_eq!(item.first, cell.first);
            assert_eq!(item.second, cell.second);
            assert_eq!(item.category, cell.index % 3);
        }
    }
    assert_eq!(plan.cells[0].first, "Low");
    assert_eq!(plan.cells[0].second, "Low");
    assert_eq!(plan.cells[8].first, "High");
    assert_eq!(plan.cells[8].second, "High");
}

#[test]
fn restricted_axis_stays_legal_and_meets_scoped_floors() {
    let taxonomy = restricted_taxonomy();
    let plan = AssignmentPlanner::new(&taxonomy, PlannerSettings::default())
        .plan(225, 11)
        .unwrap();
    let issue = taxonomy.secondary_axis("issue").unwrap();
    let affinity = issue.affinity.as_ref().unwrap();

    for urgency in ["Low", "Medium", "High"] {
        let in_scope: Vec<&str> = plan
            .items
            .iter()
            .filter(|i| i.first == urgency)
            .map(|i| i.secondary[0].as_str())
            .collect();
        assert_eq!(in_scope.len(), 75);
        assert!(in_scope.iter().all(|v| affinity.is_legal(v, urgency)));

        let legal = affinity.legal_for(issue, urgency);
        let counts = count_values(in_scope.into_iter());
        for value in legal.iter() {
            assert!(counts.get(value).copied().unwrap_or(0) >= 75 / legal.len());
        }
    }
}

#[test]
fn same_seed_same_plan_different_seed_different_plan() {
    let taxonomy = restricted_taxonomy();
    let planner = AssignmentPlanner::new(&taxonomy, PlannerSettings::default());
    let a = planner.plan(225, 42).unwrap();
    let b = planner.plan(225, 42).unwrap();
    let c = planner.plan(225, 43).unwrap();
    assert_eq!(a, b);
    assert_ne!(a.items, c.items);
}

#[test]
fn builtin_taxonomy_plans_and_validates() {
    let taxonomy = telecoms_complaints();
    let plan = AssignmentPlanner::new(&taxonomy, PlannerSettings::default())
        .plan(225, 42)
        .unwrap();
    assert_eq!(plan.len(), 225);
    assert!(validate_plan(&plan, &taxonomy).is_ok());
    assert_eq!(&plan.axis_names()[..2], &["urgency", "emotion"]);
}

#[test]
fn tiny_total_cannot_cover_every_topic() {
    let taxonomy = uniform_taxonomy();
    let result = AssignmentPlanner::new(
        &taxonomy,
        PlannerSettings {
            duplicate_attempts: 300,
            duplicate_policy: DuplicatePolicy::Accept,
        },
    )
    .plan(9, 1);
    assert!(matches!(result, Err(PlanError::PoolTooShort { .. })));
}
