//! Stratagen: Stratified Synthetic Dataset Generation
//!
//! Plans a labeled dataset over a two-axis grid with secondary attributes drawn from
//! seeded, floor-guaranteed pools, then fills every planned item through a
//! bounded-concurrency batch executor backed by a chat-completion provider.

pub mod assemble;
pub mod cli;
pub mod config;
pub mod error;
pub mod generation;
pub mod logging;
pub mod output;
pub mod planning;
pub mod provider;
pub mod report;
pub mod run;
pub mod taxonomy;
