//! Report rendering and output

use crate::analysis::CostAnalysis;
use crate::error::Result;
use crate::hidden::HiddenCost;
use crate::utils::{format_usd, title_case};
use std::io::Write;
use std::path::Path;
use tracing::info;

/// Report output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum ReportFormat {
    Text,
    Json,
}

pub fn render(analysis: &CostAnalysis, format: ReportFormat) -> Result<String> {
    match format {
        ReportFormat::Text => Ok(render_text(analysis)),
        ReportFormat::Json => render_json(analysis),
    }
}

pub fn render_json(analysis: &CostAnalysis) -> Result<String> {
    Ok(serde_json::to_string_pretty(analysis)?)
}

pub fn render_text(analysis: &CostAnalysis) -> String {
    let mut out: Vec<String> = Vec::new();
    let rule = "-".repeat(40);

    out.push("=".repeat(80));
    out.push("AWS TERRAFORM COST ANALYSIS REPORT".to_string());
    out.push("=".repeat(80));
    out.push(format!(
        "Generated on: {}",
        analysis.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    out.push(format!("Region: {}", analysis.region));
    out.push(String::new());

    out.push("COST SUMMARY".to_string());
    out.push(rule.clone());
    out.push(format!(
        "Total Estimated Monthly Cost: {}",
        format_usd(analysis.total)
    ));
    out.push(format!("  Resources: {}", format_usd(analysis.resource_total)));
    if !analysis.hidden_costs.is_empty() {
        out.push(format!("  Hidden costs: {}", format_usd(analysis.hidden_total)));
    }
    if !analysis.data_transfer_costs.is_empty() {
        out.push(format!(
            "  Data transfer: {}",
            format_usd(analysis.data_transfer_total)
        ));
    }
    out.push(String::new());

    if !analysis.estimates.is_empty() {
        out.push("RESOURCE COST BREAKDOWN".to_string());
        out.push(rule.clone());
        for estimate in &analysis.estimates {
            let marker = if estimate.is_failed() { " (estimate unavailable)" } else { "" };
            out.push(format!(
                "{}: {}/month{}",
                estimate.resource_address,
                format_usd(estimate.monthly_cost),
                marker
            ));
            for (category, amount) in &estimate.breakdown {
                if *amount > 0.0 {
                    out.push(format!("  - {}: {}", title_case(category), format_usd(*amount)));
                }
            }
        }
        out.push(String::new());
    }

    push_cost_section(
        &mut out,
        "HIDDEN COSTS",
        "Total Hidden Costs",
        &analysis.hidden_costs,
        analysis.hidden_total,
    );
    push_cost_section(
        &mut out,
        "DATA TRANSFER COSTS",
        "Total Data Transfer Costs",
        &analysis.data_transfer_costs,
        analysis.data_transfer_total,
    );

    if !analysis.recommendations.is_empty() {
        out.push("COST OPTIMIZATION RECOMMENDATIONS".to_string());
        out.push(rule.clone());
        for (i, recommendation) in analysis.recommendations.iter().enumerate() {
            out.push(format!("{}. {}", i + 1, recommendation));
        }
        out.push(String::new());
    }

    let failed: Vec<_> = analysis.failed().collect();
    if !failed.is_empty() {
        out.push("ESTIMATES UNAVAILABLE".to_string());
        out.push(rule.clone());
        for estimate in failed {
            if let crate::estimator::EstimateStatus::Failed { reason } = &estimate.status {
                out.push(format!("• {}: {}", estimate.resource_address, reason));
            }
        }
        out.push("These resources are counted as $0.00.".to_string());
        out.push(String::new());
    }

    if !analysis.deleted_resources.is_empty() {
        out.push(format!(
            "Resources to be destroyed (not costed): {}",
            analysis.deleted_resources.len()
        ));
        out.push(String::new());
    }

    out.join("\n")
}

fn push_cost_section(
    out: &mut Vec<String>,
    title: &str,
    total_label: &str,
    costs: &[HiddenCost],
    total: f64,
) {
    if costs.is_empty() {
        return;
    }
    out.push(title.to_string());
    out.push("-".repeat(40));
    for cost in costs {
        out.push(format!(
            "• {} ({}): {}/month",
            cost.kind,
            cost.resource_address,
            format_usd(cost.monthly_cost)
        ));
        if !cost.description.is_empty() {
            out.push(format!("  {}", cost.description));
        }
    }
    out.push(format!("{}: {}/month", total_label, format_usd(total)));
    out.push(String::new());
}

/// Write the rendered report to `output`, or stdout when no path is given
pub fn write_report(report: &str, output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => {
            std::fs::write(path, report)?;
            info!("Cost report saved to: {}", path.display());
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            writeln!(stdout, "{}", report)?;
        }
    }
    Ok(())
}
