//! End-to-end tests of plan loading, estimation and aggregation
//!
//! Uses a fake estimator so no AWS credentials are needed.

mod common;

use common::{fixture, FakeEstimator};
use indicatif::ProgressBar;
use std::time::Duration;
use tempfile::TempDir;
use tfcost::config::Config;
use tfcost::error::AnalyzerError;
use tfcost::exit_codes::{codes, exit_code_for_error};
use tfcost::report::render_text;
use tfcost::workflow::{estimate_costs, load_resources};

fn no_hidden_costs() -> Config {
    let mut config = Config::default();
    config.analysis.include_hidden_costs = false;
    config.analysis.include_data_transfer_costs = false;
    config
}

#[tokio::test]
async fn test_plan_without_matching_changes_reports_zero() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("plan.json");
    std::fs::write(
        &path,
        r#"{"resource_changes":[
            {"address":"aws_iam_role.ci","type":"aws_iam_role","name":"ci",
             "change":{"actions":["no-op"],"after":{"name":"ci"}}}
        ]}"#,
    )
    .unwrap();

    let config = Config::default();
    let resources = load_resources(&path, &config).unwrap();
    assert_eq!(resources.billable().count(), 0);

    let estimator = FakeEstimator::new();
    let analysis = estimate_costs(&resources, &estimator, &config, &ProgressBar::hidden()).await;

    assert!(analysis.estimates.is_empty());
    assert_eq!(estimator.calls(), 0);
    assert!(render_text(&analysis).contains("Total Estimated Monthly Cost: $0.00"));
}

#[tokio::test]
async fn test_single_instance_produces_one_estimate() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("plan.json");
    std::fs::write(
        &path,
        r#"{"resource_changes":[
            {"address":"aws_instance.web","type":"aws_instance","name":"web",
             "change":{"actions":["create"],"after":{"instance_type":"t3.micro"}}}
        ]}"#,
    )
    .unwrap();

    let config = no_hidden_costs();
    let resources = load_resources(&path, &config).unwrap();
    let estimator = FakeEstimator::new().price("aws_instance", 7.59);
    let analysis = estimate_costs(&resources, &estimator, &config, &ProgressBar::hidden()).await;

    assert_eq!(analysis.estimates.len(), 1);
    assert_eq!(analysis.estimates[0].resource_address, "aws_instance.web");
    assert_eq!(analysis.total, 7.59);
    assert!(render_text(&analysis).contains("aws_instance.web: $7.59/month"));
}

#[tokio::test]
async fn test_total_is_resources_plus_hidden_costs() {
    let config = Config::default();
    let resources = load_resources(&fixture("web_stack.json"), &config).unwrap();
    assert_eq!(resources.create.len(), 2);
    assert_eq!(resources.update.len(), 1);
    assert_eq!(resources.delete.len(), 1);

    let estimator = FakeEstimator::new()
        .price("aws_instance", 30.37)
        .price("aws_nat_gateway", 32.85)
        .price("aws_s3_bucket", 0.23);
    let analysis = estimate_costs(&resources, &estimator, &config, &ProgressBar::hidden()).await;

    let resource_cents: i64 = analysis
        .estimates
        .iter()
        .map(|e| (e.monthly_cost * 100.0).round() as i64)
        .sum();
    let hidden_cents: i64 = analysis
        .hidden_costs
        .iter()
        .chain(analysis.data_transfer_costs.iter())
        .map(|c| (c.monthly_cost * 100.0).round() as i64)
        .sum();
    assert_eq!(resource_cents, 6345);
    // instance: 0.90 + 2.10, nat gateway: 4.50, s3 requests: 0.90
    assert_eq!(hidden_cents, 840);
    assert_eq!((analysis.total * 100.0).round() as i64, resource_cents + hidden_cents);

    let text = render_text(&analysis);
    assert!(text.contains("Total Estimated Monthly Cost: $71.85"));
    assert!(text.contains("Resources to be destroyed (not costed): 1"));
}

#[tokio::test]
async fn test_failures_do_not_block_other_estimates() {
    let config = no_hidden_costs();
    let resources = load_resources(&fixture("web_stack.json"), &config).unwrap();
    let estimator = FakeEstimator::new()
        .price("aws_instance", 30.37)
        .price("aws_nat_gateway", 32.85)
        .price("aws_s3_bucket", 0.23)
        .fail("aws_nat_gateway.main")
        .with_delay(Duration::from_millis(5));

    let analysis = estimate_costs(&resources, &estimator, &config, &ProgressBar::hidden()).await;

    assert_eq!(estimator.calls(), 3);
    assert_eq!(analysis.estimates.len(), 3);
    assert_eq!(analysis.failed().count(), 1);
    assert_eq!(format!("{:.2}", analysis.total), "30.60");

    let text = render_text(&analysis);
    assert!(text.contains("aws_nat_gateway.main: $0.00/month (estimate unavailable)"));
    assert!(text.contains("aws_instance.web: $30.37/month"));
}

#[tokio::test]
async fn test_absurd_model_amounts_fall_back_to_zero() {
    let config = no_hidden_costs();
    let resources = load_resources(&fixture("web_stack.json"), &config).unwrap();
    let estimator = FakeEstimator::new()
        .price("aws_instance", 1e17)
        .price("aws_nat_gateway", 1e17)
        .price("aws_s3_bucket", 0.23);

    let analysis = estimate_costs(&resources, &estimator, &config, &ProgressBar::hidden()).await;

    assert_eq!(analysis.estimates.len(), 3);
    assert_eq!(analysis.failed().count(), 2);
    assert_eq!(analysis.total, 0.23);
    assert!(render_text(&analysis).contains("Total Estimated Monthly Cost: $0.23"));
}

#[tokio::test]
async fn test_estimates_are_sorted_by_address() {
    let mut config = no_hidden_costs();
    config.analysis.concurrency = 3;
    let resources = load_resources(&fixture("web_stack.json"), &config).unwrap();
    let estimator = FakeEstimator::new().with_delay(Duration::from_millis(2));

    let analysis = estimate_costs(&resources, &estimator, &config, &ProgressBar::hidden()).await;
    let addresses: Vec<_> = analysis
        .estimates
        .iter()
        .map(|e| e.resource_address.as_str())
        .collect();
    assert_eq!(
        addresses,
        vec!["aws_instance.web", "aws_nat_gateway.main", "aws_s3_bucket.logs"]
    );
}

#[test]
fn test_resource_type_allowlist_filters_billable() {
    let mut config = Config::default();
    config.analysis.resource_types = vec!["aws_instance".to_string()];
    let resources = load_resources(&fixture("web_stack.json"), &config).unwrap();

    let types: Vec<_> = resources.billable().map(|r| r.resource_type.as_str()).collect();
    assert_eq!(types, vec!["aws_instance"]);
    assert_eq!(resources.delete.len(), 1);
}

#[test]
fn test_malformed_plan_is_fatal() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("plan.json");
    std::fs::write(&path, "resource \"aws_instance\" \"web\" {}").unwrap();

    let err = load_resources(&path, &Config::default()).unwrap_err();
    assert!(matches!(err, AnalyzerError::MalformedPlan { .. }));
    assert_eq!(exit_code_for_error(&err), codes::USER_ERROR);
}
