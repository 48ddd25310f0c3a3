//! CLI output: error mapping from domain errors to stable CLI surface.

use crate::error::{ApiError, PlanError};

/// Map domain errors to a string for CLI output, with a hint where one helps.
pub fn map_error(e: &ApiError) -> String {
    match e {
        ApiError::Planning(PlanError::PoolTooShort { .. }) => format!(
            "{}\nhint: raise --total or narrow the affinity table for that scope",
            e
        ),
        ApiError::ProviderAuthFailed(_) => format!(
            "{}\nhint: set OPENAI_API_KEY in the environment or a .env file",
            e
        ),
        _ => e.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pool_too_short_gets_a_hint() {
        let err = ApiError::Planning(PlanError::PoolTooShort {
            axis: "scenario".to_string(),
            scope: "High".to_string(),
            length: 3,
            values: 6,
        });
        assert!(map_error(&err).contains("hint: raise --total"));
    }

    #[test]
    fn other_errors_pass_through() {
        let err = ApiError::OutputError("disk full".to_string());
        assert_eq!(map_error(&err), "Output error: disk full");
    }
}
