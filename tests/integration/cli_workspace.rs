//! CLI run context against a workspace with its own config and taxonomy files

use stratagen::cli::{Commands, OutputFormat, RunContext};
use stratagen::error::ApiError;
use tempfile::TempDir;

const TAXONOMY: &str = r#"
name = "tickets"
item_noun = "support tickets"
instructions = ["Write support tickets.", "Act as customers."]

[primary.first]
name = "priority"
values = ["P1", "P2"]
weights = [0.25, 0.75]
ordinal = true

[primary.second]
name = "mood"
values = ["Calm", "Upset"]

[[secondary]]
name = "product"
values = ["Router", "Phone", "Modem"]

[secondary.affinity]
on = "priority"

[secondary.affinity.allowed]
Router = ["P1", "P2"]
Phone = ["P2"]
Modem = ["P1"]

[[secondary]]
name = "channel"
values = ["Email", "Chat"]
"#;

fn workspace(config: &str) -> TempDir {
    let temp_dir = TempDir::new().unwrap();
    std::fs::write(temp_dir.path().join("tickets.toml"), TAXONOMY).unwrap();
    std::fs::write(temp_dir.path().join("stratagen.toml"), config).unwrap();
    temp_dir
}

fn context(temp_dir: &TempDir) -> Result<RunContext, ApiError> {
    RunContext::new(
        temp_dir.path().to_path_buf(),
        Some(temp_dir.path().join("stratagen.toml")),
        None,
    )
}

#[test]
fn plan_uses_workspace_taxonomy() {
    let temp_dir = workspace("taxonomy_path = \"tickets.toml\"\n\n[run]\ntotal = 40\nseed = 5\n");
    let ctx = context(&temp_dir).unwrap();
    assert_eq!(ctx.taxonomy().name, "tickets");

    let output = ctx
        .execute(&Commands::Plan {
            total: None,
            seed: None,
            format: OutputFormat::Json,
        })
        .unwrap();
    let value: serde_json::Value = serde_json::from_str(&output).unwrap();
    assert_eq!(value["total"], 40);
    assert_eq!(value["seed"], 5);
    assert_eq!(value["first_axis"], "priority");
    assert_eq!(value["cells"].as_array().unwrap().len(), 4);
}

#[test]
fn plan_text_lists_axis_floors() {
    let temp_dir = workspace("taxonomy_path = \"tickets.toml\"\n");
    let output = context(&temp_dir)
        .unwrap()
        .execute(&Commands::Plan {
            total: Some(80),
            seed: Some(1),
            format: OutputFormat::Text,
        })
        .unwrap();
    assert!(output.contains("Total: 80"));
    assert!(output.contains("product"));
    assert!(output.contains("channel"));
}

#[test]
fn missing_taxonomy_file_is_a_config_error() {
    let temp_dir = workspace("taxonomy_path = \"absent.toml\"\n");
    assert!(matches!(context(&temp_dir), Err(ApiError::ConfigError(_))));
}

#[test]
fn explicit_taxonomy_flag_overrides_config() {
    let temp_dir = workspace("[run]\ntotal = 20\n");
    let ctx = RunContext::new(
        temp_dir.path().to_path_buf(),
        Some(temp_dir.path().join("stratagen.toml")),
        Some(temp_dir.path().join("tickets.toml")),
    )
    .unwrap();
    assert_eq!(ctx.taxonomy().name, "tickets");
    assert_eq!(ctx.config().run.total, 20);
}
