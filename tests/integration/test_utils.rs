//! Shared fixtures for integration tests

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use stratagen::error::ApiError;
use stratagen::generation::{GenerationRequest, Generator};
use stratagen::taxonomy::{Affinity, Axis, PrimaryAxes, Taxonomy};

pub const TOPICS: usize = 20;
pub const CHANNELS: usize = 4;

/// 3x3 uniform grid with a 20-value and a 4-value unrestricted axis
pub fn uniform_taxonomy() -> Taxonomy {
    let third = 1.0 / 3.0;
    let topics: Vec<String> = (1..=TOPICS).map(|i| format!("topic-{:02}", i)).collect();
    let topic_refs: Vec<&str> = topics.iter().map(String::as_str).collect();
    Taxonomy {
        name: "uniform".to_string(),
        item_noun: "messages".to_string(),
        primary: PrimaryAxes {
            first: Axis::new("urgency", &["Low", "Medium", "High"])
                .with_weights(&[third, third, third])
                .ordinal(),
            second: Axis::new("emotion", &["Low", "Medium", "High"]).ordinal(),
        },
        secondary: vec![
            Axis::new("topic", &topic_refs),
            Axis::new("channel", &["Email", "Chat", "Phone", "Form"]),
        ],
        instructions: vec![
            "Write messages.".to_string(),
            "Act as customers.".to_string(),
            "Produce support messages.".to_string(),
        ],
        guidance: Vec::new(),
        divergence: None,
    }
}

/// Uniform taxonomy plus an affinity-restricted axis keyed on urgency
pub fn restricted_taxonomy() -> Taxonomy {
    let mut taxonomy = uniform_taxonomy();
    taxonomy.secondary.insert(
        0,
        Axis::new("issue", &["outage", "billing", "typo", "fraud"]).with_affinity(
            Affinity::new("urgency")
                .allow("outage", &["Medium", "High"])
                .allow("billing", &["Low", "Medium"])
                .allow("typo", &["Low"])
                .allow("fraud", &["High"]),
        ),
    );
    taxonomy
}

/// Text that encodes the labels a request carried for one item
pub fn echo_text(primary: &[(String, String)], fields: &[(String, String)]) -> String {
    primary
        .iter()
        .chain(fields.iter())
        .map(|(_, value)| value.as_str())
        .collect::<Vec<_>>()
        .join("|")
}

/// Answers every request with one labeled text per item, minus `short_by`
pub struct EchoGenerator {
    pub short_by: usize,
    pub calls: AtomicUsize,
}

impl EchoGenerator {
    pub fn new() -> Self {
        Self::short_by(0)
    }

    pub fn short_by(short_by: usize) -> Self {
        Self {
            short_by,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Generator for EchoGenerator {
    async fn generate(&self, request: &GenerationRequest) -> Result<Vec<String>, ApiError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let keep = request.expected().saturating_sub(self.short_by);
        Ok(request
            .items
            .iter()
            .take(keep)
            .map(|item| echo_text(&request.primary, &item.fields))
            .collect())
    }
}
