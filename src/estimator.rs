//! Per-resource cost estimates and the estimator abstraction
//!
//! A `CostEstimator` prices one `ResourceChange`. The production
//! implementation asks a Bedrock model (see `bedrock`); tests plug in fakes.

use crate::error::{AnalyzerError, Result};
use crate::extract::ResourceChange;
use crate::utils::{parse_amount, round_cents};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use tracing::debug;

/// Model's self-reported confidence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    High,
    Medium,
    Low,
}

impl Confidence {
    fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "high" => Some(Confidence::High),
            "medium" => Some(Confidence::Medium),
            "low" => Some(Confidence::Low),
            _ => None,
        }
    }
}

/// A costed line item reported by the model (hidden or data transfer cost)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostItem {
    pub kind: String,
    pub description: String,
    pub monthly_cost: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "lowercase")]
pub enum EstimateStatus {
    Estimated,
    Failed { reason: String },
}

/// Monthly cost estimate for one resource
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CostEstimate {
    pub resource_address: String,
    pub resource_type: String,
    pub monthly_cost: f64,
    pub breakdown: BTreeMap<String, f64>,
    pub hidden_costs: Vec<CostItem>,
    pub data_transfer_costs: Vec<CostItem>,
    pub recommendations: Vec<String>,
    pub confidence: Option<Confidence>,
    pub status: EstimateStatus,
}

impl CostEstimate {
    /// Zero-cost stand-in for a resource that could not be priced
    pub fn placeholder(resource: &ResourceChange, reason: impl Into<String>) -> Self {
        Self {
            resource_address: resource.address.clone(),
            resource_type: resource.resource_type.clone(),
            monthly_cost: 0.0,
            breakdown: BTreeMap::new(),
            hidden_costs: Vec::new(),
            data_transfer_costs: Vec::new(),
            recommendations: Vec::new(),
            confidence: None,
            status: EstimateStatus::Failed {
                reason: reason.into(),
            },
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self.status, EstimateStatus::Failed { .. })
    }
}

/// Prices a single planned resource
#[async_trait]
pub trait CostEstimator: Send + Sync {
    /// Short name used in logs
    fn name(&self) -> &str;

    async fn estimate(&self, resource: &ResourceChange) -> Result<CostEstimate>;
}

/// Parse the model's free-form answer into an estimate.
///
/// The answer is expected to embed one JSON object; everything between the
/// first `{` and the last `}` is parsed. `monthly_cost` and `cost_breakdown`
/// are required.
pub fn parse_estimate_response(response: &str, resource: &ResourceChange) -> Result<CostEstimate> {
    let unparseable = |reason: String| AnalyzerError::UnparseableResponse {
        address: resource.address.clone(),
        reason,
    };

    let (start, end) = match (response.find('{'), response.rfind('}')) {
        (Some(s), Some(e)) if e > s => (s, e),
        _ => return Err(unparseable("no JSON object in response".to_string())),
    };

    let data: Value = serde_json::from_str(&response[start..=end])
        .map_err(|e| unparseable(format!("invalid JSON: {}", e)))?;

    let monthly_cost = data
        .get("monthly_cost")
        .ok_or_else(|| unparseable("missing required field 'monthly_cost'".to_string()))
        .and_then(|v| {
            parse_amount(v).ok_or_else(|| {
                unparseable(format!("'monthly_cost' is not a usable amount: {}", v))
            })
        })?;

    let breakdown: BTreeMap<String, f64> = data
        .get("cost_breakdown")
        .and_then(Value::as_object)
        .ok_or_else(|| unparseable("missing required field 'cost_breakdown'".to_string()))?
        .iter()
        .filter_map(|(k, v)| parse_amount(v).map(|a| (k.clone(), round_cents(a))))
        .collect();

    let recommendations: Vec<String> = data
        .get("recommendations")
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default();

    let estimate = CostEstimate {
        resource_address: resource.address.clone(),
        resource_type: resource.resource_type.clone(),
        monthly_cost: round_cents(monthly_cost),
        breakdown,
        hidden_costs: cost_items(data.get("hidden_costs")),
        data_transfer_costs: cost_items(data.get("data_transfer_costs")),
        recommendations,
        confidence: data
            .get("confidence_level")
            .and_then(Value::as_str)
            .and_then(Confidence::parse),
        status: EstimateStatus::Estimated,
    };
    debug!(
        "{}: ${:.2}/month ({} hidden, {} transfer items)",
        estimate.resource_address,
        estimate.monthly_cost,
        estimate.hidden_costs.len(),
        estimate.data_transfer_costs.len()
    );
    Ok(estimate)
}

/// Items without a usable amount are skipped
fn cost_items(value: Option<&Value>) -> Vec<CostItem> {
    let Some(items) = value.and_then(Value::as_array) else {
        return Vec::new();
    };

    items
        .iter()
        .filter_map(|item| {
            let amount = item.get("estimated_monthly_cost").and_then(parse_amount)?;
            let text = |key: &str| {
                item.get(key)
                    .and_then(Value::as_str)
                    .unwrap_or_default()
                    .to_string()
            };
            Some(CostItem {
                kind: text("type"),
                description: text("description"),
                monthly_cost: round_cents(amount),
            })
        })
        .collect()
}
