//! Exit code standardization for tfcost
//!
//! - `0` = Success
//! - `1` = User error (missing or malformed plan, invalid input)
//! - `2` = System error (terraform CLI failure, I/O, Bedrock)
//! - `3` = Configuration error (config parse error, invalid config values)

use crate::error::AnalyzerError;

/// Standard exit codes for tfcost
pub mod codes {
    /// User error (invalid input, malformed plan)
    pub const USER_ERROR: i32 = 1;
    /// System error (terraform CLI, I/O, network)
    pub const SYSTEM_ERROR: i32 = 2;
    /// Configuration error
    pub const CONFIG_ERROR: i32 = 3;
}

/// Map an AnalyzerError to an appropriate exit code
pub fn exit_code_for_error(error: &AnalyzerError) -> i32 {
    use AnalyzerError::*;
    match error {
        Config(_) => codes::CONFIG_ERROR,

        PlanNotFound(_) => codes::USER_ERROR,
        MalformedPlan { .. } => codes::USER_ERROR,
        Validation { .. } => codes::USER_ERROR,

        Terraform(_) => codes::SYSTEM_ERROR,
        Bedrock { .. } => codes::SYSTEM_ERROR,
        UnparseableResponse { .. } => codes::SYSTEM_ERROR,
        Retryable { .. } => codes::SYSTEM_ERROR,
        Io(_) => codes::SYSTEM_ERROR,
        Json(_) => codes::SYSTEM_ERROR,
    }
}

/// Exit code for an error surfaced through anyhow at the CLI boundary
pub fn exit_code_for_anyhow(error: &anyhow::Error) -> i32 {
    error
        .chain()
        .find_map(|cause| cause.downcast_ref::<AnalyzerError>())
        .map(exit_code_for_error)
        .unwrap_or(codes::SYSTEM_ERROR)
}
