//! Integration tests for stratified planning and batch generation

mod cli_workspace;
mod generation_pipeline;
mod planner_scenarios;
mod test_utils;
