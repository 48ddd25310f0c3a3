//! Plan, execute, assemble and write with a scripted generator

use super::test_utils::{uniform_taxonomy, EchoGenerator};
use stratagen::config::StratagenConfig;
use stratagen::generation::DEFAULT_SENTINEL;
use stratagen::run::run_generate;
use tempfile::TempDir;

fn config(total: usize, retries: usize) -> StratagenConfig {
    let mut config = StratagenConfig::default();
    config.run.total = total;
    config.run.retries = retries;
    config.run.retry_delay_ms = 0;
    config
}

#[tokio::test]
async fn records_follow_plan_order_and_land_in_csv() {
    let temp_dir = TempDir::new().unwrap();
    let output = temp_dir.path().join("out").join("dataset.csv");
    let taxonomy = uniform_taxonomy();
    let generator = EchoGenerator::new();

    let outcome = run_generate(&taxonomy, &config(90, 3), &generator, Some(&output))
        .await
        .unwrap();

    assert_eq!(outcome.records.len(), 90);
    assert_eq!(outcome.summary.batches, 9);
    assert_eq!(outcome.summary.padded_items, 0);
    assert_eq!(generator.calls(), 9);
    for (idx, (record, item)) in outcome.records.iter().zip(&outcome.plan.items).enumerate() {
        assert_eq!(record.id, idx + 1);
        assert!(!record.padded);
        let values: Vec<&str> = record.labels.iter().map(|(_, v)| v.as_str()).collect();
        assert_eq!(record.text, values.join("|"));
        assert_eq!(values[0], item.first);
        assert_eq!(values[1], item.second);
    }

    let bytes = std::fs::read(&output).unwrap();
    assert!(bytes.starts_with(b"\xEF\xBB\xBF"));
    let mut reader = csv::Reader::from_reader(&bytes[3..]);
    let headers = reader.headers().unwrap().clone();
    assert_eq!(
        headers.iter().collect::<Vec<_>>(),
        vec!["id", "text", "urgency", "emotion", "topic", "channel"]
    );
    let rows: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();
    assert_eq!(rows.len(), 90);
    assert_eq!(&rows[0][0], "1");
    assert_eq!(&rows[0][1], outcome.records[0].text.as_str());
    assert_eq!(&rows[89][0], "90");
}

#[tokio::test]
async fn short_batches_are_retried_then_padded() {
    let taxonomy = uniform_taxonomy();
    let generator = EchoGenerator::short_by(1);

    let outcome = run_generate(&taxonomy, &config(90, 2), &generator, None)
        .await
        .unwrap();

    assert_eq!(generator.calls(), 27);
    assert_eq!(outcome.summary.retries, 18);
    assert_eq!(outcome.summary.padded, 9);
    assert_eq!(outcome.summary.padded_items, 9);
    assert!(outcome.output_path.is_none());

    let padded: Vec<_> = outcome.records.iter().filter(|r| r.padded).collect();
    assert_eq!(padded.len(), 9);
    assert!(padded.iter().all(|r| r.text == DEFAULT_SENTINEL));
    // Each cell holds one batch of ten; the last slot is the one left unfilled
    assert!(padded.iter().all(|r| r.id % 10 == 0));
}
