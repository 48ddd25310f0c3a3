//! Shared generators for planning properties

use proptest::prelude::*;
use stratagen::taxonomy::{Affinity, Axis, PrimaryAxes, Taxonomy};

/// Taxonomy whose first primary axis takes `raw` as unnormalized weights
pub fn taxonomy(raw: &[u32]) -> Taxonomy {
    let sum: u32 = raw.iter().sum();
    let weights: Vec<f64> = raw.iter().map(|w| *w as f64 / sum as f64).collect();
    Taxonomy {
        name: "property".to_string(),
        item_noun: "messages".to_string(),
        primary: PrimaryAxes {
            first: Axis::new("urgency", &["Low", "Medium", "High"]).with_weights(&weights),
            second: Axis::new("emotion", &["Low", "Medium", "High"]),
        },
        secondary: vec![
            Axis::new("issue", &["outage", "billing", "typo", "fraud"]).with_affinity(
                Affinity::new("urgency")
                    .allow("outage", &["Medium", "High"])
                    .allow("billing", &["Low", "Medium"])
                    .allow("typo", &["Low"])
                    .allow("fraud", &["High"]),
            ),
            Axis::new("tone", &["plain", "formal", "terse", "rambling", "sarcastic"])
                .with_weights(&[5.0, 1.0, 1.0, 1.0, 2.0]),
            Axis::new("channel", &["Email", "Chat", "Phone", "Form"]),
        ],
        instructions: vec!["Write.".to_string(), "Act.".to_string()],
        guidance: Vec::new(),
        divergence: None,
    }
}

/// (seed, total, first-axis weights)
pub fn planning_inputs() -> impl Strategy<Value = (u64, usize, Vec<u32>)> {
    (
        any::<u64>(),
        60usize..400,
        proptest::collection::vec(1u32..=4, 3),
    )
}
