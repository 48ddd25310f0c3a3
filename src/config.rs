//! Configuration System
//!
//! Layered configuration: built-in defaults, then the global file, then workspace files,
//! then `STRATAGEN__SECTION__KEY` environment variables. CLI flags are applied on top
//! by the caller.

use crate::error::ApiError;
use crate::generation::ExecutorSettings;
use crate::logging::LoggingConfig;
use crate::planning::{DuplicatePolicy, PlannerSettings};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub use crate::provider::{ProviderConfig, ProviderType};

mod merge;
mod sources;

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StratagenConfig {
    #[serde(default)]
    pub run: RunConfig,

    #[serde(default)]
    pub provider: ProviderConfig,

    #[serde(default)]
    pub output: OutputConfig,

    #[serde(default)]
    pub logging: LoggingConfig,

    /// Taxonomy TOML file; the built-in taxonomy is used when absent.
    /// Relative paths resolve against the workspace root.
    #[serde(default)]
    pub taxonomy_path: Option<PathBuf>,
}

/// Planning and execution parameters
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunConfig {
    #[serde(default = "default_total")]
    pub total: usize,

    #[serde(default = "default_seed")]
    pub seed: u64,

    /// Maximum items per generation call
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    /// Maximum batches in flight
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,

    /// Retries after a short response
    #[serde(default = "default_retries")]
    pub retries: usize,

    #[serde(default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,

    #[serde(default = "default_duplicate_attempts")]
    pub duplicate_attempts: usize,

    #[serde(default)]
    pub duplicate_policy: DuplicatePolicy,
}

fn default_total() -> usize {
    225
}

fn default_seed() -> u64 {
    42
}

fn default_batch_size() -> usize {
    15
}

fn default_concurrency() -> usize {
    10
}

fn default_retries() -> usize {
    3
}

fn default_retry_delay_ms() -> u64 {
    500
}

fn default_duplicate_attempts() -> usize {
    300
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            total: default_total(),
            seed: default_seed(),
            batch_size: default_batch_size(),
            concurrency: default_concurrency(),
            retries: default_retries(),
            retry_delay_ms: default_retry_delay_ms(),
            duplicate_attempts: default_duplicate_attempts(),
            duplicate_policy: DuplicatePolicy::default(),
        }
    }
}

impl RunConfig {
    pub fn planner_settings(&self) -> PlannerSettings {
        PlannerSettings {
            duplicate_attempts: self.duplicate_attempts,
            duplicate_policy: self.duplicate_policy,
        }
    }

    pub fn executor_settings(&self, output: &OutputConfig) -> ExecutorSettings {
        ExecutorSettings {
            max_batch_size: self.batch_size,
            max_concurrency: self.concurrency,
            max_retries: self.retries,
            retry_delay: Duration::from_millis(self.retry_delay_ms),
            sentinel: output.sentinel.clone(),
        }
    }

    fn validate(&self) -> Result<(), String> {
        if self.total == 0 {
            return Err("total must be at least 1".to_string());
        }
        if self.batch_size == 0 {
            return Err("batch_size must be at least 1".to_string());
        }
        if self.concurrency == 0 {
            return Err("concurrency must be at least 1".to_string());
        }
        Ok(())
    }
}

/// Dataset output settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputConfig {
    #[serde(default = "default_output_path")]
    pub path: PathBuf,

    /// Prefix the CSV with a UTF-8 byte order mark
    #[serde(default = "default_bom")]
    pub bom: bool,

    /// Text written for items that could not be generated
    #[serde(default = "default_sentinel")]
    pub sentinel: String,
}

fn default_output_path() -> PathBuf {
    PathBuf::from("output/dataset.csv")
}

fn default_bom() -> bool {
    true
}

fn default_sentinel() -> String {
    crate::generation::DEFAULT_SENTINEL.to_string()
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            path: default_output_path(),
            bom: default_bom(),
            sentinel: default_sentinel(),
        }
    }
}

/// Configuration validation errors
#[derive(Debug, Clone)]
pub enum ValidationError {
    Run(String),
    Provider(String),
    Output(String),
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidationError::Run(msg) => write!(f, "Run: {}", msg),
            ValidationError::Provider(msg) => write!(f, "Provider: {}", msg),
            ValidationError::Output(msg) => write!(f, "Output: {}", msg),
        }
    }
}

impl std::error::Error for ValidationError {}

impl StratagenConfig {
    /// Validate the entire configuration
    pub fn validate(&self) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        if let Err(e) = self.run.validate() {
            errors.push(ValidationError::Run(e));
        }

        if self.provider.model.trim().is_empty() {
            errors.push(ValidationError::Provider("model cannot be empty".to_string()));
        }
        if self.provider.provider_type == ProviderType::LocalCustom
            && self.provider.endpoint.is_none()
        {
            errors.push(ValidationError::Provider(
                "local provider requires an endpoint".to_string(),
            ));
        }
        if let Some(t) = self.provider.temperature {
            if !(0.0..=2.0).contains(&t) {
                errors.push(ValidationError::Provider(format!(
                    "temperature {} is outside 0.0-2.0",
                    t
                )));
            }
        }

        if self.output.path.as_os_str().is_empty() {
            errors.push(ValidationError::Output("path cannot be empty".to_string()));
        }
        if self.output.sentinel.trim().is_empty() {
            errors.push(ValidationError::Output(
                "sentinel cannot be empty".to_string(),
            ));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Validate and fold every problem into one `ConfigError`
    pub fn validated(self) -> Result<Self, ApiError> {
        self.validate().map_err(|errors| {
            let error_msgs: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
            ApiError::ConfigError(format!(
                "Configuration validation failed:\n{}",
                error_msgs.join("\n")
            ))
        })?;
        Ok(self)
    }

    /// Taxonomy path resolved against `workspace_root`
    pub fn resolved_taxonomy_path(&self, workspace_root: &Path) -> Option<PathBuf> {
        self.taxonomy_path.as_ref().map(|p| {
            if p.is_absolute() {
                p.clone()
            } else {
                workspace_root.join(p)
            }
        })
    }
}

/// Builds a [`StratagenConfig`] from the layered sources
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load defaults, global file, workspace files and environment for `workspace_root`
    pub fn load(workspace_root: &Path) -> Result<StratagenConfig, ApiError> {
        let builder = merge::builder_with_defaults()?;
        let builder = sources::global_file::add_to_builder(builder)?;
        let builder = sources::workspace_file::add_to_builder(builder, workspace_root)?;
        let builder = sources::add_environment(builder);
        let config: StratagenConfig = builder.build()?.try_deserialize()?;
        Ok(config)
    }

    /// Load defaults plus exactly one file, ignoring every other source
    pub fn load_from_file(path: &Path) -> Result<StratagenConfig, ApiError> {
        if !path.exists() {
            return Err(ApiError::ConfigError(format!(
                "Config file not found: {}",
                path.display()
            )));
        }
        let config: StratagenConfig = merge::builder_with_defaults()?
            .add_source(config::File::from(path.to_path_buf()))
            .build()?
            .try_deserialize()?;
        Ok(config)
    }

    pub fn global_config_path() -> Option<PathBuf> {
        sources::global_file::global_config_path()
    }
}
