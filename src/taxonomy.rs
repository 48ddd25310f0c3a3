//! Taxonomy: the axes a dataset is stratified over.
//!
//! Two primary axes form the grid of cells. Secondary axes describe individual items; a
//! secondary axis may carry an affinity table restricting each of its values to a subset
//! of one primary axis's values. Taxonomies load from TOML or come from [`builtin`].

use crate::error::{ApiError, PlanError};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::path::Path;

pub mod builtin;

pub use builtin::telecoms_complaints;

const WEIGHT_TOLERANCE: f64 = 1e-6;

/// A named categorical dimension with a fixed set of legal values.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Axis {
    pub name: String,
    pub values: Vec<String>,

    /// Human-readable definition per value, rendered into prompts
    #[serde(default)]
    pub descriptions: BTreeMap<String, String>,

    /// Draw weights aligned with `values`. Primary axes use them for the grid split,
    /// secondary axes for the remainder draw of their pools.
    #[serde(default)]
    pub weights: Option<Vec<f64>>,

    /// Values are ordered levels (e.g. Low < Medium < High)
    #[serde(default)]
    pub ordinal: bool,

    /// Restricts each value of this axis to a subset of one primary axis's values
    #[serde(default)]
    pub affinity: Option<Affinity>,
}

impl Axis {
    pub fn new<S: Into<String>>(name: S, values: &[&str]) -> Self {
        Self {
            name: name.into(),
            values: values.iter().map(|v| v.to_string()).collect(),
            descriptions: BTreeMap::new(),
            weights: None,
            ordinal: false,
            affinity: None,
        }
    }

    pub fn with_weights(mut self, weights: &[f64]) -> Self {
        self.weights = Some(weights.to_vec());
        self
    }

    pub fn ordinal(mut self) -> Self {
        self.ordinal = true;
        self
    }

    pub fn with_affinity(mut self, affinity: Affinity) -> Self {
        self.affinity = Some(affinity);
        self
    }

    pub fn with_description(mut self, value: &str, description: &str) -> Self {
        self.descriptions
            .insert(value.to_string(), description.to_string());
        self
    }

    pub fn position(&self, value: &str) -> Option<usize> {
        self.values.iter().position(|v| v == value)
    }

    pub fn contains(&self, value: &str) -> bool {
        self.position(value).is_some()
    }

    /// Weight for `value`; uniform when the axis declares no weights
    pub fn weight_of(&self, value: &str) -> f64 {
        match (&self.weights, self.position(value)) {
            (Some(weights), Some(idx)) => weights[idx],
            _ => 1.0,
        }
    }

    pub fn is_restricted(&self) -> bool {
        self.affinity.is_some()
    }

    pub(crate) fn validate_values(&self) -> Result<(), PlanError> {
        if self.name.trim().is_empty() {
            return Err(PlanError::InvalidTaxonomy(
                "Axis name cannot be empty".to_string(),
            ));
        }
        if self.values.is_empty() {
            return Err(PlanError::InvalidTaxonomy(format!(
                "Axis '{}' has no values",
                self.name
            )));
        }
        let mut seen = HashSet::new();
        for value in &self.values {
            if !seen.insert(value.as_str()) {
                return Err(PlanError::InvalidTaxonomy(format!(
                    "Axis '{}' declares value '{}' twice",
                    self.name, value
                )));
            }
        }
        if let Some(weights) = &self.weights {
            if weights.len() != self.values.len() {
                return Err(PlanError::InvalidWeights {
                    axis: self.name.clone(),
                    reason: format!(
                        "{} weights for {} values",
                        weights.len(),
                        self.values.len()
                    ),
                });
            }
            if weights.iter().any(|w| !w.is_finite() || *w < 0.0) {
                return Err(PlanError::InvalidWeights {
                    axis: self.name.clone(),
                    reason: "weights must be finite and non-negative".to_string(),
                });
            }
            if weights.iter().sum::<f64>() <= 0.0 {
                return Err(PlanError::InvalidWeights {
                    axis: self.name.clone(),
                    reason: "weights must not all be zero".to_string(),
                });
            }
        }
        Ok(())
    }

    /// Primary weights must be present (when required) and sum to 1.
    pub(crate) fn validate_distribution(&self, required: bool) -> Result<(), PlanError> {
        match &self.weights {
            None if required => Err(PlanError::InvalidWeights {
                axis: self.name.clone(),
                reason: "first primary axis requires a weight per value".to_string(),
            }),
            None => Ok(()),
            Some(weights) => {
                let sum: f64 = weights.iter().sum();
                if (sum - 1.0).abs() > WEIGHT_TOLERANCE {
                    return Err(PlanError::InvalidWeights {
                        axis: self.name.clone(),
                        reason: format!("weights sum to {}, expected 1", sum),
                    });
                }
                Ok(())
            }
        }
    }
}

/// Affinity table: for each value of the owning axis, the primary values it is legal at.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Affinity {
    /// Name of the primary axis the restriction refers to
    pub on: String,
    /// Owning-axis value -> legal primary values
    pub allowed: BTreeMap<String, Vec<String>>,
}

impl Affinity {
    pub fn new<S: Into<String>>(on: S) -> Self {
        Self {
            on: on.into(),
            allowed: BTreeMap::new(),
        }
    }

    pub fn allow(mut self, value: &str, primary_values: &[&str]) -> Self {
        self.allowed.insert(
            value.to_string(),
            primary_values.iter().map(|v| v.to_string()).collect(),
        );
        self
    }

    pub fn is_legal(&self, value: &str, primary_value: &str) -> bool {
        self.allowed
            .get(value)
            .map(|levels| levels.iter().any(|l| l == primary_value))
            .unwrap_or(false)
    }

    /// Legal values of `axis` at `primary_value`, in the axis's declaration order
    pub fn legal_for<'a>(&self, axis: &'a Axis, primary_value: &str) -> Vec<&'a str> {
        axis.values
            .iter()
            .filter(|v| self.is_legal(v, primary_value))
            .map(String::as_str)
            .collect()
    }
}

/// Which of the two primary axes a name refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrimaryRole {
    First,
    Second,
}

/// The two stratifying axes
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PrimaryAxes {
    pub first: Axis,
    pub second: Axis,
}

impl PrimaryAxes {
    pub fn role_of(&self, axis_name: &str) -> Option<PrimaryRole> {
        if self.first.name == axis_name {
            Some(PrimaryRole::First)
        } else if self.second.name == axis_name {
            Some(PrimaryRole::Second)
        } else {
            None
        }
    }

    pub fn axis(&self, role: PrimaryRole) -> &Axis {
        match role {
            PrimaryRole::First => &self.first,
            PrimaryRole::Second => &self.second,
        }
    }
}

/// Direction-specific notes added to prompts when two ordinal primary values diverge
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DivergenceNotes {
    /// Minimum level gap that triggers a note
    #[serde(default = "default_min_gap")]
    pub min_gap: usize,
    /// Used when the first primary value sits above the second
    pub first_higher: String,
    /// Used when the second primary value sits above the first
    pub second_higher: String,
}

fn default_min_gap() -> usize {
    2
}

/// Full dataset description: axes, affinity tables and the instruction variants
/// that the category selector rotates through.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Taxonomy {
    pub name: String,

    /// Plural noun used in prompts ("customer complaints")
    #[serde(default = "default_item_noun")]
    pub item_noun: String,

    pub primary: PrimaryAxes,

    #[serde(default)]
    pub secondary: Vec<Axis>,

    /// Interchangeable instruction variants; `K` is their count
    pub instructions: Vec<String>,

    /// Extra guidance lines appended to every prompt
    #[serde(default)]
    pub guidance: Vec<String>,

    #[serde(default)]
    pub divergence: Option<DivergenceNotes>,
}

fn default_item_noun() -> String {
    "items".to_string()
}

impl Taxonomy {
    /// Load a taxonomy from a TOML file and validate it
    pub fn load_from_file(path: &Path) -> Result<Self, ApiError> {
        let raw = std::fs::read_to_string(path).map_err(|e| {
            ApiError::ConfigError(format!("Failed to read taxonomy {:?}: {}", path, e))
        })?;
        let taxonomy: Taxonomy = toml::from_str(&raw).map_err(|e| {
            ApiError::ConfigError(format!("Failed to parse taxonomy {:?}: {}", path, e))
        })?;
        taxonomy.validate()?;
        Ok(taxonomy)
    }

    /// Number of instruction variants (`K` of the category selector)
    pub fn category_count(&self) -> usize {
        self.instructions.len()
    }

    /// Every axis name, primary axes first, then secondary axes in declaration order
    pub fn axis_names(&self) -> Vec<String> {
        let mut names = vec![
            self.primary.first.name.clone(),
            self.primary.second.name.clone(),
        ];
        names.extend(self.secondary.iter().map(|a| a.name.clone()));
        names
    }

    pub fn secondary_axis(&self, name: &str) -> Option<&Axis> {
        self.secondary.iter().find(|a| a.name == name)
    }

    pub fn validate(&self) -> Result<(), PlanError> {
        let primary = &self.primary;
        primary.first.validate_values()?;
        primary.second.validate_values()?;
        primary.first.validate_distribution(true)?;
        primary.second.validate_distribution(false)?;
        if primary.first.affinity.is_some() || primary.second.affinity.is_some() {
            return Err(PlanError::InvalidTaxonomy(
                "Primary axes cannot carry an affinity table".to_string(),
            ));
        }

        let mut names = HashSet::new();
        for name in self.axis_names() {
            if !names.insert(name.clone()) {
                return Err(PlanError::InvalidTaxonomy(format!(
                    "Axis name '{}' is used twice",
                    name
                )));
            }
        }

        for axis in &self.secondary {
            axis.validate_values()?;
            if let Some(affinity) = &axis.affinity {
                self.validate_affinity(axis, affinity)?;
            }
        }

        if self.instructions.is_empty() {
            return Err(PlanError::InvalidTaxonomy(
                "At least one instruction variant is required".to_string(),
            ));
        }
        if self.instructions.iter().any(|i| i.trim().is_empty()) {
            return Err(PlanError::InvalidTaxonomy(
                "Instruction variants cannot be empty".to_string(),
            ));
        }
        Ok(())
    }

    fn validate_affinity(&self, axis: &Axis, affinity: &Affinity) -> Result<(), PlanError> {
        let role = self.primary.role_of(&affinity.on).ok_or_else(|| {
            PlanError::InvalidTaxonomy(format!(
                "Axis '{}' affinity refers to unknown primary axis '{}'",
                axis.name, affinity.on
            ))
        })?;
        let primary_axis = self.primary.axis(role);

        for (value, levels) in &affinity.allowed {
            if !axis.contains(value) {
                return Err(PlanError::InvalidTaxonomy(format!(
                    "Axis '{}' affinity lists unknown value '{}'",
                    axis.name, value
                )));
            }
            if let Some(level) = levels.iter().find(|l| !primary_axis.contains(l)) {
                return Err(PlanError::InvalidTaxonomy(format!(
                    "Axis '{}' value '{}' allows unknown {} '{}'",
                    axis.name, value, primary_axis.name, level
                )));
            }
        }
        if let Some(value) = axis.values.iter().find(|v| !affinity.allowed.contains_key(*v)) {
            return Err(PlanError::InvalidTaxonomy(format!(
                "Axis '{}' value '{}' has no affinity entry",
                axis.name, value
            )));
        }
        for level in &primary_axis.values {
            if affinity.legal_for(axis, level).is_empty() {
                return Err(PlanError::InvalidTaxonomy(format!(
                    "Axis '{}' has no legal value at {} '{}'",
                    axis.name, primary_axis.name, level
                )));
            }
        }
        Ok(())
    }
}
