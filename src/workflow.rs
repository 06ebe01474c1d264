//! End-to-end analysis of a plan file
//!
//! Plan loading happens before any estimator is involved so that a bad plan
//! fails fast and never produces a partial report.

use crate::analysis::{analyze, CostAnalysis};
use crate::config::Config;
use crate::error::Result;
use crate::estimator::CostEstimator;
use crate::extract::{extract_resources, PlannedResources};
use crate::plan::load_plan;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::Path;
use tracing::info;

/// Load a plan and extract the resources to be costed
pub fn load_resources(plan_path: &Path, config: &Config) -> Result<PlannedResources> {
    let plan = load_plan(plan_path)?;
    let mut resources = extract_resources(&plan);

    let before = resources.billable().count();
    resources.retain_types(|t| config.analyzes_type(t));
    let skipped = before - resources.billable().count();
    if skipped > 0 {
        info!("Skipped {} resources not in analysis.resource_types", skipped);
    }

    info!(
        "Found {} resources ({} create, {} update, {} delete)",
        resources.len(),
        resources.create.len(),
        resources.update.len(),
        resources.delete.len()
    );
    Ok(resources)
}

/// Estimate the monthly cost of already extracted resources
pub async fn estimate_costs<E>(
    resources: &PlannedResources,
    estimator: &E,
    config: &Config,
    progress: &ProgressBar,
) -> CostAnalysis
where
    E: CostEstimator + ?Sized,
{
    analyze(resources, estimator, &config.analysis, progress).await
}

/// Spinner-style bar for the estimate fan-out, drawn on stderr
pub fn progress_bar() -> ProgressBar {
    let pb = ProgressBar::new(0);
    if let Ok(style) = ProgressStyle::default_bar()
        .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
    {
        pb.set_style(style.progress_chars("#>-"));
    }
    pb.set_message("Estimating resource costs...");
    pb
}
