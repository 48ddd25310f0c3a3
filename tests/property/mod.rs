//! Property-based tests for planning guarantees

mod determinism;
mod floors;
mod strategies;
