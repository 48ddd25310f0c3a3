//! Stratified assignment planning
//!
//! Builds the reproducible work-item plan: grid cells over the primary axes, pools over
//! the secondary axes, per-cell slicing with duplicate resolution, then validation.

pub mod grid;
pub mod plan;
pub mod planner;
pub mod pool;
pub mod validate;

pub use grid::{build_grid, Cell};
pub use plan::{Plan, PlanStats, WorkItem};
pub use planner::{AssignmentPlanner, DuplicatePolicy, PlannerSettings};
pub use pool::{sample_pool, Pool, Scope};
pub use validate::validate_plan;
