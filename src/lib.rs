//! tfcost library
//!
//! Estimates the monthly AWS cost of a Terraform plan: the plan is loaded
//! (`plan`), planned resources are extracted (`extract`), each one is priced
//! by a `CostEstimator` (Bedrock in production), and the results are
//! aggregated with static hidden-cost rules (`analysis`, `hidden`) into a
//! report (`report`).

pub mod analysis;
pub mod bedrock;
pub mod config;
pub mod error;
pub mod estimator;
pub mod exit_codes;
pub mod extract;
pub mod hidden;
pub mod plan;
pub mod prompt;
pub mod report;
pub mod retry;
pub mod utils;
pub mod workflow;

// Re-export commonly used types
pub use analysis::CostAnalysis;
pub use estimator::{CostEstimate, CostEstimator};
pub use extract::{PlannedResources, ResourceChange};
