//! User prompt rendering for one batch.

use crate::generation::generator::GenerationRequest;
use crate::taxonomy::Taxonomy;
use std::sync::Arc;

/// Renders batch requests into user prompts using the taxonomy's value descriptions,
/// guidance lines and divergence notes.
#[derive(Debug, Clone)]
pub struct PromptRenderer {
    taxonomy: Arc<Taxonomy>,
}

impl PromptRenderer {
    pub fn new(taxonomy: Arc<Taxonomy>) -> Self {
        Self { taxonomy }
    }

    pub fn render(&self, request: &GenerationRequest) -> String {
        let n = request.items.len();
        let noun = &self.taxonomy.item_noun;
        let mut out = String::new();

        out.push_str(&format!("Generate exactly {} distinct {}.\n", n, noun));
        let shared: Vec<String> = request
            .primary
            .iter()
            .map(|(axis, _)| axis.to_string())
            .collect();
        out.push_str(&format!(
            "All of them share the same {}:\n\n",
            shared.join(" and ")
        ));
        for (axis, value) in &request.primary {
            match self.description(axis, value) {
                Some(description) => {
                    out.push_str(&format!("{}: {} - {}\n", title(axis), value, description))
                }
                None => out.push_str(&format!("{}: {}\n", title(axis), value)),
            }
        }
        out.push('\n');

        if let Some(note) = self.divergence_note(request) {
            out.push_str(&format!("IMPORTANT: {}\n\n", note));
        }

        out.push_str(
            "Each item below lists its own attributes. Make every one sound unique: vary \
             phrasing, length and details.\n\n",
        );

        if !self.taxonomy.guidance.is_empty() {
            out.push_str("For realism, include where appropriate:\n");
            for line in &self.taxonomy.guidance {
                out.push_str(&format!("- {}\n", line));
            }
            out.push('\n');
        }

        for (i, item) in request.items.iter().enumerate() {
            out.push_str(&format!("Item {}:\n", i + 1));
            for (axis, value) in &item.fields {
                out.push_str(&format!("  {}: {}\n", title(axis), value));
            }
        }

        out.push_str(&format!(
            "\nReturn a JSON object with a single key \"items\" containing a list of exactly {} \
             strings, one per item above, in the same order. Output only the text in each \
             string: no labels, metadata, or preamble.",
            n
        ));
        out
    }

    fn description(&self, axis: &str, value: &str) -> Option<&str> {
        let primary = &self.taxonomy.primary;
        let role = primary.role_of(axis)?;
        primary
            .axis(role)
            .descriptions
            .get(value)
            .map(String::as_str)
    }

    /// Note for ordinal primary values that sit at least `min_gap` levels apart
    fn divergence_note(&self, request: &GenerationRequest) -> Option<&str> {
        let notes = self.taxonomy.divergence.as_ref()?;
        let first = &self.taxonomy.primary.first;
        let second = &self.taxonomy.primary.second;
        if !(first.ordinal && second.ordinal) {
            return None;
        }
        let value_of = |name: &str| {
            request
                .primary
                .iter()
                .find(|(axis, _)| axis == name)
                .map(|(_, value)| value.as_str())
        };
        let a = first.position(value_of(&first.name)?)?;
        let b = second.position(value_of(&second.name)?)?;
        if a.abs_diff(b) < notes.min_gap {
            return None;
        }
        if a > b {
            Some(&notes.first_higher)
        } else {
            Some(&notes.second_higher)
        }
    }
}

fn title(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) => c.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generation::batch::BatchId;
    use crate::generation::generator::ItemDescriptor;
    use crate::taxonomy::telecoms_complaints;

    fn request(urgency: &str, emotion: &str, n: usize) -> GenerationRequest {
        GenerationRequest {
            batch: BatchId {
                sequence: 0,
                cell_index: 0,
                batch_index: 0,
            },
            attempt: 1,
            instruction: "system".to_string(),
            primary: vec![
                ("urgency".to_string(), urgency.to_string()),
                ("emotion".to_string(), emotion.to_string()),
            ],
            items: (0..n)
                .map(|i| ItemDescriptor {
                    fields: vec![
                        ("scenario".to_string(), format!("scenario {}", i)),
                        ("channel".to_string(), "Email".to_string()),
                    ],
                })
                .collect(),
        }
    }

    fn renderer() -> PromptRenderer {
        PromptRenderer::new(Arc::new(telecoms_complaints()))
    }

    #[test]
    fn prompt_lists_every_item_and_count() {
        let prompt = renderer().render(&request("Low", "Medium", 3));
        assert!(prompt.starts_with("Generate exactly 3 distinct customer complaints."));
        assert!(prompt.contains("Urgency: Low - Minor inconvenience"));
        assert!(prompt.contains("Emotion: Medium - Noticeably frustrated"));
        assert!(prompt.contains("Item 3:\n  Scenario: scenario 2\n  Channel: Email"));
        assert!(prompt.contains("list of exactly 3 strings"));
        assert!(prompt.contains("- Names of staff spoken to previously"));
        assert!(!prompt.contains("IMPORTANT"));
    }

    #[test]
    fn divergence_note_follows_direction() {
        let calm = renderer().render(&request("High", "Low", 1));
        assert!(calm.contains("IMPORTANT: The urgency and emotion levels are intentionally"));
        assert!(calm.contains("calm, composed"));

        let upset = renderer().render(&request("Low", "High", 1));
        assert!(upset.contains("highly emotional"));
    }

    #[test]
    fn adjacent_levels_have_no_note() {
        let prompt = renderer().render(&request("Medium", "High", 1));
        assert!(!prompt.contains("IMPORTANT"));
    }
}
