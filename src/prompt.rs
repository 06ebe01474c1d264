//! Cost analysis prompt construction

use crate::extract::ResourceChange;
use chrono::NaiveDate;

/// JSON shape the model is asked to answer with
const RESPONSE_SCHEMA: &str = r#"{
  "monthly_cost": <number>,
  "cost_breakdown": {
    "compute": <number>,
    "storage": <number>,
    "network": <number>,
    "other": <number>
  },
  "hidden_costs": [
    {
      "type": "<cost_type>",
      "description": "<description>",
      "estimated_monthly_cost": <number>
    }
  ],
  "data_transfer_costs": [
    {
      "type": "<transfer_type>",
      "description": "<description>",
      "estimated_monthly_cost": <number>
    }
  ],
  "recommendations": [
    "<recommendation_text>"
  ],
  "confidence_level": "<high|medium|low>"
}"#;

/// Build the prompt asking for a cost estimate of one resource
pub fn build_cost_prompt(resource: &ResourceChange, region: &str, date: NaiveDate) -> String {
    let config = serde_json::to_string_pretty(&resource.attributes)
        .unwrap_or_else(|_| "{}".to_string());

    let mut prompt = String::new();
    prompt.push_str(
        "You are an AWS cost analysis expert. Analyze the following AWS resource \
         and provide detailed cost estimates.\n\n",
    );
    prompt.push_str(&format!("Resource Type: {}\n", resource.resource_type));
    prompt.push_str(&format!("Resource Address: {}\n", resource.address));
    prompt.push_str(&format!("Configuration: {}\n", config));
    prompt.push_str(&format!("Region: {}\n", region));
    prompt.push_str(&format!("Analysis Date: {}\n\n", date.format("%Y-%m-%d")));

    let summary = describe_resource(resource);
    if !summary.is_empty() {
        prompt.push_str("Key attributes:\n");
        prompt.push_str(&summary);
        prompt.push('\n');
    }

    prompt.push_str(
        "Please provide a comprehensive cost analysis including:\n\n\
         1. MONTHLY COST ESTIMATE:\n\
         \x20  - Base monthly cost for the resource\n\
         \x20  - Include all pricing tiers and usage patterns\n\
         \x20  - Consider reserved instance discounts if applicable\n\n\
         2. HIDDEN COSTS:\n\
         \x20  - Data transfer costs (inbound/outbound)\n\
         \x20  - Storage costs (if applicable)\n\
         \x20  - Network costs (NAT Gateway, Load Balancer data processing)\n\
         \x20  - Backup and snapshot costs\n\
         \x20  - Monitoring and logging costs\n\n\
         3. VARIABLE COSTS:\n\
         \x20  - Usage-based pricing components\n\
         \x20  - Potential cost spikes during high usage\n\
         \x20  - Scaling cost implications\n\n\
         4. COST OPTIMIZATION RECOMMENDATIONS:\n\
         \x20  - Suggest cost-effective alternatives\n\
         \x20  - Reserved instance opportunities\n\
         \x20  - Right-sizing recommendations\n\n\
         Respond in JSON format:\n",
    );
    prompt.push_str(RESPONSE_SCHEMA);
    prompt.push('\n');
    prompt
}

/// One `- key: value` line per flattened attribute
pub fn describe_resource(resource: &ResourceChange) -> String {
    resource
        .flat_attributes()
        .into_iter()
        .map(|(k, v)| format!("- {}: {}\n", k, v))
        .collect()
}
