//! Assignment planner: turns grid cells and pools into the ordered work-item plan.
//!
//! Restricted axes (those with an affinity table) get one pool per value of their
//! primary axis, sized to that value's subtotal, so every sliced value is legal by
//! construction. Unrestricted axes get one global pool sized to the total. Each pool
//! element is consumed exactly once, which is what keeps the per-value floors exact.

use crate::error::PlanError;
use crate::planning::grid::{build_grid, subtotals, Cell};
use crate::planning::plan::{Plan, PlanStats, WorkItem};
use crate::planning::pool::{sample_pool, Pool, Scope};
use crate::planning::validate::validate_plan;
use crate::taxonomy::{PrimaryRole, Taxonomy};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use tracing::{debug, info, warn};

/// What to do with a duplicate tuple that survives the attempt cap.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum DuplicatePolicy {
    /// Keep the duplicate, log a warning and count it in [`PlanStats`]
    #[default]
    Accept,
    /// Fail planning with [`PlanError::DuplicateResolutionExhausted`]
    Reject,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlannerSettings {
    pub duplicate_attempts: usize,
    pub duplicate_policy: DuplicatePolicy,
}

impl Default for PlannerSettings {
    fn default() -> Self {
        Self {
            duplicate_attempts: 300,
            duplicate_policy: DuplicatePolicy::Accept,
        }
    }
}

/// Pools backing one secondary axis
enum AxisPools {
    Global(Pool),
    Scoped {
        role: PrimaryRole,
        /// One pool per primary value, in that axis's declaration order
        pools: Vec<Pool>,
    },
}

pub struct AssignmentPlanner<'a> {
    taxonomy: &'a Taxonomy,
    settings: PlannerSettings,
}

impl<'a> AssignmentPlanner<'a> {
    pub fn new(taxonomy: &'a Taxonomy, settings: PlannerSettings) -> Self {
        Self { taxonomy, settings }
    }

    /// Plan `total` items, seeding a fresh generator from `seed`.
    pub fn plan(&self, total: usize, seed: u64) -> Result<Plan, PlanError> {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let mut plan = self.plan_with_rng(total, &mut rng)?;
        plan.seed = seed;
        Ok(plan)
    }

    /// Plan with a caller-owned generator. The plan is validated before it is returned.
    pub fn plan_with_rng<R: Rng + ?Sized>(
        &self,
        total: usize,
        rng: &mut R,
    ) -> Result<Plan, PlanError> {
        self.taxonomy.validate()?;
        let cells = build_grid(total, &self.taxonomy.primary)?;
        let pools = self.build_pools(&cells, total, rng)?;

        let unrestricted: Vec<usize> = pools
            .iter()
            .enumerate()
            .filter(|(_, p)| matches!(p, AxisPools::Global(_)))
            .map(|(idx, _)| idx)
            .collect();
        let categories = self.taxonomy.category_count();

        let mut items = Vec::with_capacity(total);
        let mut stats = PlanStats::default();
        let mut global_offset = 0usize;
        let mut scope_offsets: Vec<Vec<usize>> = pools
            .iter()
            .map(|p| match p {
                AxisPools::Global(_) => Vec::new(),
                AxisPools::Scoped { pools, .. } => vec![0; pools.len()],
            })
            .collect();

        for cell in &cells {
            let mut columns: Vec<Vec<String>> = Vec::with_capacity(pools.len());
            for (axis_idx, axis_pools) in pools.iter().enumerate() {
                let column = match axis_pools {
                    AxisPools::Global(pool) => pool.slice(global_offset, cell.count)?.0,
                    AxisPools::Scoped { role, pools } => {
                        let scope_idx = self.scope_index(*role, cell)?;
                        let offset = scope_offsets[axis_idx][scope_idx];
                        let (column, next) = pools[scope_idx].slice(offset, cell.count)?;
                        scope_offsets[axis_idx][scope_idx] = next;
                        column
                    }
                };
                columns.push(column.to_vec());
            }
            global_offset += cell.count;

            self.resolve_duplicates(cell, &mut columns, &unrestricted, rng, &mut stats)?;

            let category = cell.index % categories;
            for i in 0..cell.count {
                items.push(WorkItem {
                    cell_index: cell.index,
                    first: cell.first.clone(),
                    second: cell.second.clone(),
                    secondary: columns.iter().map(|column| column[i].clone()).collect(),
                    category,
                });
            }
        }

        let plan = Plan {
            total,
            seed: 0,
            first_axis: self.taxonomy.primary.first.name.clone(),
            second_axis: self.taxonomy.primary.second.name.clone(),
            secondary_axes: self
                .taxonomy
                .secondary
                .iter()
                .map(|a| a.name.clone())
                .collect(),
            cells,
            items,
            stats,
        };

        validate_plan(&plan, self.taxonomy)?;
        info!(
            total = plan.len(),
            cells = plan.cells.len(),
            duplicates_resolved = plan.stats.duplicates_resolved,
            residual_duplicates = plan.stats.residual_duplicates,
            "Plan built"
        );
        Ok(plan)
    }

    fn build_pools<R: Rng + ?Sized>(
        &self,
        cells: &[Cell],
        total: usize,
        rng: &mut R,
    ) -> Result<Vec<AxisPools>, PlanError> {
        let mut all = Vec::with_capacity(self.taxonomy.secondary.len());
        for axis in &self.taxonomy.secondary {
            match &axis.affinity {
                Some(affinity) => {
                    let role = self.taxonomy.primary.role_of(&affinity.on).ok_or_else(|| {
                        PlanError::InvalidTaxonomy(format!(
                            "Axis '{}' affinity refers to unknown primary axis '{}'",
                            axis.name, affinity.on
                        ))
                    })?;
                    let primary_axis = self.taxonomy.primary.axis(role);
                    let scope_totals = subtotals(
                        cells,
                        &primary_axis.values,
                        role == PrimaryRole::First,
                    );
                    let mut pools = Vec::with_capacity(scope_totals.len());
                    for (value, subtotal) in scope_totals {
                        let legal = affinity.legal_for(axis, value);
                        let pool = sample_pool(
                            axis,
                            Scope::Affinity(value.to_string()),
                            &legal,
                            subtotal,
                            rng,
                        )?;
                        debug!(
                            axis = %axis.name,
                            scope = value,
                            length = pool.len(),
                            floor = pool.floor(),
                            "Built scoped pool"
                        );
                        pools.push(pool);
                    }
                    all.push(AxisPools::Scoped { role, pools });
                }
                None => {
                    let legal: Vec<&str> = axis.values.iter().map(String::as_str).collect();
                    let pool = sample_pool(axis, Scope::Global, &legal, total, rng)?;
                    debug!(
                        axis = %axis.name,
                        length = pool.len(),
                        floor = pool.floor(),
                        "Built global pool"
                    );
                    all.push(AxisPools::Global(pool));
                }
            }
        }
        Ok(all)
    }

    fn scope_index(&self, role: PrimaryRole, cell: &Cell) -> Result<usize, PlanError> {
        let value = match role {
            PrimaryRole::First => &cell.first,
            PrimaryRole::Second => &cell.second,
        };
        self.taxonomy.primary.axis(role).position(value).ok_or_else(|| {
            PlanError::InvalidTaxonomy(format!("Cell value '{}' is not a primary value", value))
        })
    }

    /// Swap unrestricted values inside the cell until no tuple repeats, within the
    /// attempt cap. Swaps stay inside one column, so per-axis counts never change.
    fn resolve_duplicates<R: Rng + ?Sized>(
        &self,
        cell: &Cell,
        columns: &mut [Vec<String>],
        unrestricted: &[usize],
        rng: &mut R,
        stats: &mut PlanStats,
    ) -> Result<(), PlanError> {
        let count = cell.count;
        let mut seen = TupleSet::default();

        for i in 0..count {
            let collided = seen.contains(&tuple_at(columns, i));
            let mut attempts = 0usize;
            while attempts < self.settings.duplicate_attempts && seen.contains(&tuple_at(columns, i))
            {
                let j = rng.gen_range(0..count);
                if j != i && !unrestricted.is_empty() {
                    let axis = unrestricted[attempts % unrestricted.len()];
                    if j < i {
                        // j is already accepted: keep the swap only if j stays unique.
                        let before = tuple_at(columns, j);
                        columns[axis].swap(i, j);
                        let after = tuple_at(columns, j);
                        seen.remove(&before);
                        if seen.contains(&after) {
                            columns[axis].swap(i, j);
                            seen.insert(before);
                        } else {
                            seen.insert(after);
                            stats.swaps += 1;
                        }
                    } else {
                        columns[axis].swap(i, j);
                        stats.swaps += 1;
                    }
                }
                attempts += 1;
            }

            let tuple = tuple_at(columns, i);
            if seen.contains(&tuple) {
                match self.settings.duplicate_policy {
                    DuplicatePolicy::Accept => {
                        warn!(
                            cell = cell.index,
                            index = i,
                            attempts,
                            "Residual duplicate tuple accepted"
                        );
                    }
                    DuplicatePolicy::Reject => {
                        return Err(PlanError::DuplicateResolutionExhausted {
                            cell: cell.index,
                            index: i,
                            attempts,
                        });
                    }
                }
            } else if collided {
                stats.duplicates_resolved += 1;
            }
            seen.insert(tuple);
        }

        // Later swaps can make an earlier residual unique again, so count what is left.
        let distinct: HashSet<Vec<String>> = (0..count).map(|i| tuple_at(columns, i)).collect();
        stats.residual_duplicates += count - distinct.len();
        Ok(())
    }
}

fn tuple_at(columns: &[Vec<String>], i: usize) -> Vec<String> {
    columns.iter().map(|column| column[i].clone()).collect()
}

/// Multiset of tuples seen so far in one cell
#[derive(Default)]
struct TupleSet {
    counts: HashMap<Vec<String>, usize>,
}

impl TupleSet {
    fn contains(&self, tuple: &[String]) -> bool {
        self.counts.get(tuple).copied().unwrap_or(0) > 0
    }

    fn insert(&mut self, tuple: Vec<String>) {
        *self.counts.entry(tuple).or_insert(0) += 1;
    }

    fn remove(&mut self, tuple: &[String]) {
        if let Some(count) = self.counts.get_mut(tuple) {
            *count -= 1;
            if *count == 0 {
                self.counts.remove(tuple);
            }
        }
    }
}
