//! Cost aggregation
//!
//! Fans estimate requests out over the billable resources of a plan, then
//! folds the results and the static hidden-cost rules into one
//! `CostAnalysis`. A resource whose estimate fails is kept as a zero-cost
//! placeholder so the rest of the report is still produced.

use crate::config::AnalysisConfig;
use crate::estimator::{CostEstimate, CostEstimator, CostItem};
use crate::extract::{PlannedResources, ResourceChange};
use crate::hidden::{hidden_costs_for, HiddenCost, HiddenCostSource};
use crate::utils::sum_cents;
use chrono::{DateTime, Utc};
use futures::stream::{self, StreamExt};
use indicatif::ProgressBar;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CostAnalysis {
    pub region: String,
    pub generated_at: DateTime<Utc>,
    /// One entry per billable resource, sorted by address
    pub estimates: Vec<CostEstimate>,
    pub hidden_costs: Vec<HiddenCost>,
    pub data_transfer_costs: Vec<HiddenCost>,
    pub recommendations: Vec<String>,
    pub deleted_resources: Vec<String>,
    pub resource_total: f64,
    pub hidden_total: f64,
    pub data_transfer_total: f64,
    /// `resource_total + hidden_total + data_transfer_total`
    pub total: f64,
}

impl CostAnalysis {
    pub fn failed(&self) -> impl Iterator<Item = &CostEstimate> {
        self.estimates.iter().filter(|e| e.is_failed())
    }
}

/// Estimate every billable resource and aggregate the results
pub async fn analyze<E>(
    resources: &PlannedResources,
    estimator: &E,
    settings: &AnalysisConfig,
    progress: &ProgressBar,
) -> CostAnalysis
where
    E: CostEstimator + ?Sized,
{
    let billable: Vec<&ResourceChange> = resources.billable().collect();
    info!(
        "Estimating {} resources with {} (concurrency {})",
        billable.len(),
        estimator.name(),
        settings.concurrency
    );
    progress.set_length(billable.len() as u64);

    let mut results: Vec<(&ResourceChange, CostEstimate)> = stream::iter(billable)
        .map(|resource| async move {
            let estimate = match estimator.estimate(resource).await {
                Ok(estimate) => estimate,
                Err(e) => {
                    warn!("Failed to analyze cost for {}: {}", resource.address, e);
                    CostEstimate::placeholder(resource, e.to_string())
                }
            };
            progress.inc(1);
            (resource, estimate)
        })
        .buffer_unordered(settings.concurrency.max(1))
        .collect()
        .await;
    progress.finish_and_clear();

    results.sort_by(|a, b| a.0.address.cmp(&b.0.address));

    let mut hidden_costs = Vec::new();
    let mut data_transfer_costs = Vec::new();
    let mut recommendations: Vec<String> = Vec::new();

    for (resource, estimate) in &results {
        if settings.include_hidden_costs {
            hidden_costs.extend(hidden_costs_for(resource));
            hidden_costs.extend(model_items(&estimate.hidden_costs, &resource.address));
        }
        if settings.include_data_transfer_costs {
            data_transfer_costs.extend(model_items(
                &estimate.data_transfer_costs,
                &resource.address,
            ));
        }
        if settings.include_recommendations {
            for rec in &estimate.recommendations {
                if !recommendations.contains(rec) {
                    recommendations.push(rec.clone());
                }
            }
        }
    }

    let estimates: Vec<CostEstimate> = results.into_iter().map(|(_, e)| e).collect();
    let resource_total = sum_cents(estimates.iter().map(|e| e.monthly_cost));
    let hidden_total = sum_cents(hidden_costs.iter().map(|c| c.monthly_cost));
    let data_transfer_total = sum_cents(data_transfer_costs.iter().map(|c| c.monthly_cost));

    CostAnalysis {
        region: settings.region.clone(),
        generated_at: Utc::now(),
        estimates,
        hidden_costs,
        data_transfer_costs,
        recommendations,
        deleted_resources: resources.delete.iter().map(|r| r.address.clone()).collect(),
        resource_total,
        hidden_total,
        data_transfer_total,
        total: sum_cents([resource_total, hidden_total, data_transfer_total]),
    }
}

fn model_items<'a>(
    items: &'a [CostItem],
    address: &'a str,
) -> impl Iterator<Item = HiddenCost> + 'a {
    items.iter().map(move |item| HiddenCost {
        resource_address: address.to_string(),
        kind: item.kind.clone(),
        description: item.description.clone(),
        monthly_cost: item.monthly_cost,
        source: HiddenCostSource::Model,
    })
}
