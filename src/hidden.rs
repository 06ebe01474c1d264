//! Static hidden-cost rules
//!
//! Some costs never show up as a line item on the resource itself: data
//! processed by a NAT gateway, load balancer capacity units, snapshots.
//! Each rule attaches a flat monthly estimate to every planned resource of a
//! given type.

use crate::extract::ResourceChange;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HiddenCostCategory {
    DataTransfer,
    DataProcessing,
    Storage,
    Backup,
    Monitoring,
    Requests,
}

impl HiddenCostCategory {
    pub fn label(&self) -> &'static str {
        match self {
            HiddenCostCategory::DataTransfer => "Data transfer",
            HiddenCostCategory::DataProcessing => "Data processing",
            HiddenCostCategory::Storage => "Storage",
            HiddenCostCategory::Backup => "Backup",
            HiddenCostCategory::Monitoring => "Monitoring",
            HiddenCostCategory::Requests => "Requests",
        }
    }
}

/// Where a hidden cost line came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HiddenCostSource {
    Rule,
    Model,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HiddenCost {
    pub resource_address: String,
    pub kind: String,
    pub description: String,
    pub monthly_cost: f64,
    pub source: HiddenCostSource,
}

#[derive(Debug, Clone, Copy)]
pub struct HiddenCostRule {
    pub resource_type: &'static str,
    pub category: HiddenCostCategory,
    pub description: &'static str,
    pub monthly_cost: f64,
}

/// Flat estimates at us-east-1 on-demand rates for modest usage
pub const HIDDEN_COST_RULES: &[HiddenCostRule] = &[
    HiddenCostRule {
        resource_type: "aws_instance",
        category: HiddenCostCategory::DataTransfer,
        description: "Internet data transfer out (~10 GB at $0.09/GB)",
        monthly_cost: 0.90,
    },
    HiddenCostRule {
        resource_type: "aws_instance",
        category: HiddenCostCategory::Monitoring,
        description: "Detailed CloudWatch monitoring (7 metrics)",
        monthly_cost: 2.10,
    },
    HiddenCostRule {
        resource_type: "aws_nat_gateway",
        category: HiddenCostCategory::DataProcessing,
        description: "NAT gateway data processing (~100 GB at $0.045/GB)",
        monthly_cost: 4.50,
    },
    HiddenCostRule {
        resource_type: "aws_lb",
        category: HiddenCostCategory::DataProcessing,
        description: "Load balancer capacity units (~1 LCU average)",
        monthly_cost: 5.84,
    },
    HiddenCostRule {
        resource_type: "aws_alb",
        category: HiddenCostCategory::DataProcessing,
        description: "Load balancer capacity units (~1 LCU average)",
        monthly_cost: 5.84,
    },
    HiddenCostRule {
        resource_type: "aws_db_instance",
        category: HiddenCostCategory::Backup,
        description: "Backup storage beyond the free allocation (~20 GB)",
        monthly_cost: 1.90,
    },
    HiddenCostRule {
        resource_type: "aws_rds_cluster",
        category: HiddenCostCategory::Backup,
        description: "Backup storage beyond the free allocation (~20 GB)",
        monthly_cost: 1.90,
    },
    HiddenCostRule {
        resource_type: "aws_ebs_volume",
        category: HiddenCostCategory::Backup,
        description: "Snapshot storage (~20 GB at $0.05/GB)",
        monthly_cost: 1.00,
    },
    HiddenCostRule {
        resource_type: "aws_s3_bucket",
        category: HiddenCostCategory::Requests,
        description: "Request charges (~100k PUT and 1M GET requests)",
        monthly_cost: 0.90,
    },
    HiddenCostRule {
        resource_type: "aws_lambda_function",
        category: HiddenCostCategory::Monitoring,
        description: "CloudWatch Logs ingestion (~1 GB)",
        monthly_cost: 0.50,
    },
    HiddenCostRule {
        resource_type: "aws_cloudwatch_log_group",
        category: HiddenCostCategory::Storage,
        description: "Log storage (~10 GB at $0.03/GB)",
        monthly_cost: 0.30,
    },
    HiddenCostRule {
        resource_type: "aws_cloudfront_distribution",
        category: HiddenCostCategory::DataTransfer,
        description: "Edge data transfer out (~100 GB at $0.085/GB)",
        monthly_cost: 8.50,
    },
    HiddenCostRule {
        resource_type: "aws_vpc_endpoint",
        category: HiddenCostCategory::DataProcessing,
        description: "Interface endpoint data processing (~100 GB at $0.01/GB)",
        monthly_cost: 1.00,
    },
    HiddenCostRule {
        resource_type: "aws_eks_cluster",
        category: HiddenCostCategory::Monitoring,
        description: "Control plane logging to CloudWatch (~2 GB)",
        monthly_cost: 1.00,
    },
    HiddenCostRule {
        resource_type: "aws_elasticache_cluster",
        category: HiddenCostCategory::Backup,
        description: "Snapshot storage (~10 GB at $0.085/GB)",
        monthly_cost: 0.85,
    },
];

/// Hidden cost lines the static rules attach to a resource
pub fn hidden_costs_for(resource: &ResourceChange) -> Vec<HiddenCost> {
    HIDDEN_COST_RULES
        .iter()
        .filter(|rule| rule.resource_type == resource.resource_type)
        .map(|rule| HiddenCost {
            resource_address: resource.address.clone(),
            kind: rule.category.label().to_string(),
            description: rule.description.to_string(),
            monthly_cost: rule.monthly_cost,
            source: HiddenCostSource::Rule,
        })
        .collect()
}
