//! Pool sampler: shuffled value sequences with a per-value minimum.

use crate::error::PlanError;
use crate::taxonomy::Axis;
use rand::distributions::{Distribution, WeightedIndex};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// The slice of the plan a pool feeds.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Scope {
    /// Every item in the plan
    Global,
    /// Items whose affinity primary axis carries this value
    Affinity(String),
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scope::Global => write!(f, "global"),
            Scope::Affinity(value) => write!(f, "{}", value),
        }
    }
}

/// Immutable, shuffled sequence of one axis's values for one scope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pool {
    axis: String,
    scope: Scope,
    floor: usize,
    values: Vec<String>,
}

impl Pool {
    pub fn axis(&self) -> &str {
        &self.axis
    }

    pub fn scope(&self) -> &Scope {
        &self.scope
    }

    /// Minimum number of occurrences guaranteed for every legal value
    pub fn floor(&self) -> usize {
        self.floor
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn values(&self) -> &[String] {
        &self.values
    }

    /// Take `count` values starting at `offset`; returns them with the next offset.
    pub fn slice(&self, offset: usize, count: usize) -> Result<(&[String], usize), PlanError> {
        let end = offset + count;
        if end > self.values.len() {
            return Err(PlanError::PoolExhausted {
                axis: self.axis.clone(),
                scope: self.scope.to_string(),
                offset,
                needed: count,
            });
        }
        Ok((&self.values[offset..end], end))
    }

    pub fn counts(&self) -> BTreeMap<&str, usize> {
        let mut counts = BTreeMap::new();
        for value in &self.values {
            *counts.entry(value.as_str()).or_insert(0) += 1;
        }
        counts
    }
}

/// Build a pool of `length` values drawn from `legal`.
///
/// Every legal value is placed `length / legal.len()` times, the remainder is drawn by
/// weight (the axis's weights, uniform if it has none), then the pool is shuffled.
pub fn sample_pool<R: Rng + ?Sized>(
    axis: &Axis,
    scope: Scope,
    legal: &[&str],
    length: usize,
    rng: &mut R,
) -> Result<Pool, PlanError> {
    if legal.is_empty() {
        return Err(PlanError::InvalidTaxonomy(format!(
            "Axis '{}' has no legal values in scope '{}'",
            axis.name, scope
        )));
    }
    if length < legal.len() {
        return Err(PlanError::PoolTooShort {
            axis: axis.name.clone(),
            scope: scope.to_string(),
            length,
            values: legal.len(),
        });
    }

    let floor = length / legal.len();
    let mut values: Vec<String> = Vec::with_capacity(length);
    for _ in 0..floor {
        values.extend(legal.iter().map(|v| v.to_string()));
    }

    let remaining = length - values.len();
    if remaining > 0 {
        let weights: Vec<f64> = legal.iter().map(|v| axis.weight_of(v)).collect();
        let dist = WeightedIndex::new(&weights).map_err(|e| PlanError::InvalidWeights {
            axis: axis.name.clone(),
            reason: format!("cannot draw in scope '{}': {}", scope, e),
        })?;
        for _ in 0..remaining {
            values.push(legal[dist.sample(rng)].to_string());
        }
    }

    values.shuffle(rng);

    Ok(Pool {
        axis: axis.name.clone(),
        scope,
        floor,
        values,
    })
}
