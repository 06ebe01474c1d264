//! Shared helpers for integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tfcost::error::{AnalyzerError, Result};
use tfcost::estimator::{parse_estimate_response, CostEstimate, CostEstimator};
use tfcost::ResourceChange;

pub fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

/// Answers with canned model text per resource type, like Bedrock would
#[derive(Default)]
pub struct FakeEstimator {
    prices: HashMap<String, f64>,
    failing: HashSet<String>,
    delay: Option<Duration>,
    calls: AtomicUsize,
}

impl FakeEstimator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn price(mut self, resource_type: &str, monthly_cost: f64) -> Self {
        self.prices.insert(resource_type.to_string(), monthly_cost);
        self
    }

    /// Make every request for this address fail like a throttled call
    pub fn fail(mut self, address: &str) -> Self {
        self.failing.insert(address.to_string());
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CostEstimator for FakeEstimator {
    fn name(&self) -> &str {
        "fake"
    }

    async fn estimate(&self, resource: &ResourceChange) -> Result<CostEstimate> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if self.failing.contains(&resource.address) {
            return Err(AnalyzerError::Bedrock {
                message: "ThrottlingException: rate exceeded".to_string(),
                transient: true,
                source: None,
            });
        }

        let cost = self.prices.get(&resource.resource_type).copied().unwrap_or(0.0);
        let breakdown: BTreeMap<&str, f64> = BTreeMap::from([("compute", cost)]);
        let text = format!(
            "Here is the estimate:\n{}",
            serde_json::json!({
                "monthly_cost": cost,
                "cost_breakdown": breakdown,
                "recommendations": [format!("Review sizing of {}", resource.address)],
                "confidence_level": "high"
            })
        );
        parse_estimate_response(&text, resource)
    }
}
