//! The generation call boundary.
//!
//! The executor only knows [`Generator`]; [`ProviderGenerator`] adapts a
//! [`ModelProviderClient`] to it. Content is never inspected here beyond JSON shape:
//! count checks belong to the executor.

use crate::error::ApiError;
use crate::generation::batch::{Batch, BatchId};
use crate::generation::prompt::PromptRenderer;
use crate::planning::Plan;
use crate::provider::{ChatMessage, CompletionOptions, ModelProviderClient};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Per-item attributes handed to the generator
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemDescriptor {
    /// `(axis, value)` for every secondary axis, taxonomy order
    pub fields: Vec<(String, String)>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationRequest {
    pub batch: BatchId,
    /// 1-based attempt number
    pub attempt: usize,
    pub instruction: String,
    /// `(axis, value)` for both primary axes of the batch's cell
    pub primary: Vec<(String, String)>,
    pub items: Vec<ItemDescriptor>,
}

impl GenerationRequest {
    pub fn for_batch(plan: &Plan, batch: &Batch, instruction: &str, attempt: usize) -> Self {
        let items = &plan.items[batch.items.clone()];
        let primary = items
            .first()
            .map(|item| {
                vec![
                    (plan.first_axis.clone(), item.first.clone()),
                    (plan.second_axis.clone(), item.second.clone()),
                ]
            })
            .unwrap_or_default();
        Self {
            batch: batch.id,
            attempt,
            instruction: instruction.to_string(),
            primary,
            items: items
                .iter()
                .map(|item| ItemDescriptor {
                    fields: plan
                        .secondary_axes
                        .iter()
                        .cloned()
                        .zip(item.secondary.iter().cloned())
                        .collect(),
                })
                .collect(),
        }
    }

    pub fn expected(&self) -> usize {
        self.items.len()
    }
}

/// External text generation. Returns one string per requested item, ideally; the
/// executor handles short answers. Any `Err` aborts the run.
#[async_trait]
pub trait Generator: Send + Sync {
    async fn generate(&self, request: &GenerationRequest) -> Result<Vec<String>, ApiError>;
}

/// Generator backed by a chat-completion provider in JSON mode
pub struct ProviderGenerator {
    client: Box<dyn ModelProviderClient>,
    renderer: PromptRenderer,
    options: CompletionOptions,
}

impl ProviderGenerator {
    pub fn new(
        client: Box<dyn ModelProviderClient>,
        renderer: PromptRenderer,
        options: CompletionOptions,
    ) -> Self {
        Self {
            client,
            renderer,
            options,
        }
    }
}

#[async_trait]
impl Generator for ProviderGenerator {
    async fn generate(&self, request: &GenerationRequest) -> Result<Vec<String>, ApiError> {
        let messages = vec![
            ChatMessage::system(request.instruction.clone()),
            ChatMessage::user(self.renderer.render(request)),
        ];
        let response = self.client.complete(messages, self.options.clone()).await?;
        debug!(
            batch = %request.batch,
            provider = self.client.provider_name(),
            model = %response.model,
            completion_tokens = response.usage.completion_tokens,
            "Provider responded"
        );
        parse_items(&response.content)
    }
}

/// Parse `{"items": ["...", ...]}`
pub fn parse_items(content: &str) -> Result<Vec<String>, ApiError> {
    let value: serde_json::Value = serde_json::from_str(content)
        .map_err(|e| ApiError::MalformedResponse(format!("response is not JSON: {}", e)))?;
    let items = value
        .get("items")
        .ok_or_else(|| ApiError::MalformedResponse("missing key \"items\"".to_string()))?
        .as_array()
        .ok_or_else(|| ApiError::MalformedResponse("\"items\" is not a list".to_string()))?;
    items
        .iter()
        .enumerate()
        .map(|(idx, item)| {
            item.as_str().map(str::to_string).ok_or_else(|| {
                ApiError::MalformedResponse(format!("item {} is not a string", idx))
            })
        })
        .collect()
}
