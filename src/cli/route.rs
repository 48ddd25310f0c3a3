//! CLI route: single route table and run context. Dispatches to the pipeline and report
//! formatters.

use crate::cli::parse::{Commands, OutputFormat};
use crate::config::{ConfigLoader, StratagenConfig};
use crate::error::ApiError;
use crate::generation::{PromptRenderer, ProviderGenerator};
use crate::provider::ProviderFactory;
use crate::report::{format_execution_summary_text, format_plan_summary_text, PlanSummary};
use crate::run::{load_taxonomy, run_generate, run_plan};
use crate::taxonomy::Taxonomy;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;

/// Runtime context for CLI execution: workspace, loaded configuration and taxonomy.
pub struct RunContext {
    workspace_root: PathBuf,
    config: StratagenConfig,
    taxonomy: Taxonomy,
}

impl RunContext {
    /// Load configuration (explicit file or layered sources) and the taxonomy.
    pub fn new(
        workspace_root: PathBuf,
        config_path: Option<PathBuf>,
        taxonomy_path: Option<PathBuf>,
    ) -> Result<Self, ApiError> {
        let mut config = match config_path {
            Some(ref cfg_path) => ConfigLoader::load_from_file(cfg_path)?,
            None => ConfigLoader::load(&workspace_root)?,
        };
        if taxonomy_path.is_some() {
            config.taxonomy_path = taxonomy_path;
        }
        let taxonomy = load_taxonomy(&config, &workspace_root)?;
        Ok(Self {
            workspace_root,
            config,
            taxonomy,
        })
    }

    pub fn config(&self) -> &StratagenConfig {
        &self.config
    }

    pub fn taxonomy(&self) -> &Taxonomy {
        &self.taxonomy
    }

    pub fn execute(&self, command: &Commands) -> Result<String, ApiError> {
        match command {
            Commands::Plan {
                total,
                seed,
                format,
            } => {
                let mut config = self.config.clone();
                apply(&mut config.run.total, total);
                apply(&mut config.run.seed, seed);
                let config = config.validated()?;
                self.handle_plan(&config, *format)
            }
            Commands::Generate {
                total,
                seed,
                batch_size,
                concurrency,
                retries,
                output,
            } => {
                let mut config = self.config.clone();
                apply(&mut config.run.total, total);
                apply(&mut config.run.seed, seed);
                apply(&mut config.run.batch_size, batch_size);
                apply(&mut config.run.concurrency, concurrency);
                apply(&mut config.run.retries, retries);
                apply(&mut config.output.path, output);
                let config = config.validated()?;
                self.handle_generate(&config)
            }
        }
    }

    fn handle_plan(&self, config: &StratagenConfig, format: OutputFormat) -> Result<String, ApiError> {
        let plan = run_plan(&self.taxonomy, config)?;
        let summary = PlanSummary::from_plan(&plan, &self.taxonomy);
        match format {
            OutputFormat::Text => Ok(format_plan_summary_text(&summary)),
            OutputFormat::Json => serde_json::to_string_pretty(&summary)
                .map_err(|e| ApiError::OutputError(format!("Failed to serialize plan: {}", e))),
        }
    }

    fn handle_generate(&self, config: &StratagenConfig) -> Result<String, ApiError> {
        let client = ProviderFactory::from_config(&config.provider)?;
        info!(
            provider = client.provider_name(),
            model = client.model_name(),
            "Provider client ready"
        );
        let generator = ProviderGenerator::new(
            client,
            PromptRenderer::new(Arc::new(self.taxonomy.clone())),
            config.provider.completion_options(),
        );
        let output_path = resolve(&self.workspace_root, &config.output.path);

        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| ApiError::ProviderError(format!("Failed to create runtime: {}", e)))?;
        let outcome = rt.block_on(run_generate(
            &self.taxonomy,
            config,
            &generator,
            Some(&output_path),
        ))?;

        let mut out = format_plan_summary_text(&PlanSummary::from_plan(
            &outcome.plan,
            &self.taxonomy,
        ));
        out.push_str(&format_execution_summary_text(&outcome.summary));
        out.push_str(&format!(
            "\nSaved {} records to {}",
            outcome.records.len(),
            output_path.display()
        ));
        Ok(out)
    }
}

fn apply<T: Clone>(target: &mut T, value: &Option<T>) {
    if let Some(value) = value {
        *target = value.clone();
    }
}

fn resolve(root: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        root.join(path)
    }
}
