//! Resource extraction from a parsed plan
//!
//! Buckets `resource_changes` by action and keeps the planned (`after`)
//! attribute values of each resource.

use crate::plan::PlanDocument;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use tracing::{debug, warn};

/// Planned action for a resource
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeAction {
    Create,
    Update,
    Delete,
}

impl ChangeAction {
    /// Classify a Terraform `actions` list. Replacements count as creates;
    /// `no-op` and `read` yield `None`.
    pub fn from_actions(actions: &[&str]) -> Option<Self> {
        if actions.contains(&"create") {
            Some(ChangeAction::Create)
        } else if actions.contains(&"update") {
            Some(ChangeAction::Update)
        } else if actions.contains(&"delete") {
            Some(ChangeAction::Delete)
        } else {
            None
        }
    }
}

/// One planned resource change
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourceChange {
    pub address: String,
    pub resource_type: String,
    pub name: String,
    pub provider: String,
    pub action: ChangeAction,
    pub attributes: Map<String, Value>,
}

impl ResourceChange {
    fn from_plan_entry(entry: &Value, action: ChangeAction) -> Self {
        let text = |key: &str| {
            entry
                .get(key)
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string()
        };

        let attributes = entry
            .get("change")
            .and_then(|c| c.get("after"))
            .and_then(Value::as_object)
            .cloned()
            .unwrap_or_default();

        let provider = entry
            .get("provider_name")
            .and_then(Value::as_str)
            .unwrap_or("aws")
            .to_string();

        Self {
            address: text("address"),
            resource_type: text("type"),
            name: text("name"),
            provider,
            action,
            attributes,
        }
    }

    /// Planned attributes flattened to dotted keys
    pub fn flat_attributes(&self) -> BTreeMap<String, String> {
        flatten_attributes(&self.attributes)
    }
}

/// Plan resources bucketed by action
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PlannedResources {
    pub create: Vec<ResourceChange>,
    pub update: Vec<ResourceChange>,
    pub delete: Vec<ResourceChange>,
}

impl PlannedResources {
    pub fn len(&self) -> usize {
        self.create.len() + self.update.len() + self.delete.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Resources that add to the monthly bill: creates, then updates
    pub fn billable(&self) -> impl Iterator<Item = &ResourceChange> {
        self.create.iter().chain(self.update.iter())
    }

    /// Keep only resources whose type passes `keep`; deletions are left alone
    pub fn retain_types(&mut self, keep: impl Fn(&str) -> bool) {
        self.create.retain(|r| keep(&r.resource_type));
        self.update.retain(|r| keep(&r.resource_type));
    }
}

/// Bucket the plan's resource changes by action
pub fn extract_resources(plan: &PlanDocument) -> PlannedResources {
    let mut resources = PlannedResources::default();

    let Some(changes) = plan.resource_changes() else {
        warn!("No resource changes found in plan");
        return resources;
    };

    for entry in changes {
        let actions: Vec<&str> = entry
            .get("change")
            .and_then(|c| c.get("actions"))
            .and_then(Value::as_array)
            .map(|a| a.iter().filter_map(Value::as_str).collect())
            .unwrap_or_default();

        let Some(action) = ChangeAction::from_actions(&actions) else {
            continue;
        };

        let change = ResourceChange::from_plan_entry(entry, action);
        debug!("{} -> {:?}", change.address, action);
        match action {
            ChangeAction::Create => resources.create.push(change),
            ChangeAction::Update => resources.update.push(change),
            ChangeAction::Delete => resources.delete.push(change),
        }
    }

    resources
}

/// Flatten nested attribute values into `a.b[0].c` style keys.
/// Nulls and empty containers are dropped.
pub fn flatten_attributes(attributes: &Map<String, Value>) -> BTreeMap<String, String> {
    let mut out = BTreeMap::new();
    for (key, value) in attributes {
        flatten_into(key.clone(), value, &mut out);
    }
    out
}

fn flatten_into(prefix: String, value: &Value, out: &mut BTreeMap<String, String>) {
    match value {
        Value::Null => {}
        Value::Object(map) => {
            for (k, v) in map {
                flatten_into(format!("{}.{}", prefix, k), v, out);
            }
        }
        Value::Array(items) => {
            for (i, v) in items.iter().enumerate() {
                flatten_into(format!("{}[{}]", prefix, i), v, out);
            }
        }
        Value::String(s) => {
            out.insert(prefix, s.clone());
        }
        other => {
            out.insert(prefix, other.to_string());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::path::Path;

    fn plan(raw: Value) -> PlanDocument {
        PlanDocument::from_value(raw, Path::new("plan.json")).unwrap()
    }

    #[test]
    fn test_format_resource() {
        let p = plan(json!({
            "resource_changes": [{
                "type": "aws_instance",
                "name": "web_server",
                "address": "aws_instance.web_server",
                "provider_name": "registry.terraform.io/hashicorp/aws",
                "change": {
                    "actions": ["create"],
                    "after": {"instance_type": "t3.medium", "ami": "ami-12345"}
                }
            }]
        }));

        let resources = extract_resources(&p);
        assert_eq!(resources.create.len(), 1);
        let r = &resources.create[0];
        assert_eq!(r.resource_type, "aws_instance");
        assert_eq!(r.name, "web_server");
        assert_eq!(r.address, "aws_instance.web_server");
        assert_eq!(r.provider, "registry.terraform.io/hashicorp/aws");
        assert_eq!(r.attributes["instance_type"], "t3.medium");
    }

    #[test]
    fn test_actions_are_bucketed() {
        let p = plan(json!({
            "resource_changes": [
                {"address": "a.new", "type": "a", "change": {"actions": ["create"], "after": {}}},
                {"address": "a.mod", "type": "a", "change": {"actions": ["update"], "after": {}}},
                {"address": "a.gone", "type": "a", "change": {"actions": ["delete"], "after": null}},
                {"address": "a.same", "type": "a", "change": {"actions": ["no-op"], "after": {}}},
                {"address": "a.repl", "type": "a", "change": {"actions": ["delete", "create"], "after": {}}},
                {"address": "data.a.x", "type": "a", "change": {"actions": ["read"], "after": {}}}
            ]
        }));

        let resources = extract_resources(&p);
        let addrs: Vec<_> = resources.create.iter().map(|r| r.address.as_str()).collect();
        assert_eq!(addrs, vec!["a.new", "a.repl"]);
        assert_eq!(resources.update[0].address, "a.mod");
        assert_eq!(resources.delete[0].address, "a.gone");
        assert!(resources.delete[0].attributes.is_empty());
        assert_eq!(resources.billable().count(), 3);
        assert_eq!(resources.len(), 4);
    }

    #[test]
    fn test_missing_resource_changes_yields_empty() {
        let resources = extract_resources(&plan(json!({"format_version": "1.2"})));
        assert!(resources.is_empty());
        assert_eq!(resources.billable().count(), 0);
    }

    #[test]
    fn test_provider_defaults_to_aws() {
        let p = plan(json!({
            "resource_changes": [{"address": "x", "type": "aws_s3_bucket", "change": {"actions": ["create"]}}]
        }));
        let resources = extract_resources(&p);
        assert_eq!(resources.create[0].provider, "aws");
        assert!(resources.create[0].attributes.is_empty());
    }

    #[test]
    fn test_flatten_attributes() {
        let attrs = json!({
            "instance_type": "t3.micro",
            "monitoring": false,
            "root_block_device": [{"volume_size": 20, "volume_type": "gp3"}],
            "tags": {"Name": "web"},
            "user_data": null
        });
        let flat = flatten_attributes(attrs.as_object().unwrap());

        assert_eq!(flat["instance_type"], "t3.micro");
        assert_eq!(flat["monitoring"], "false");
        assert_eq!(flat["root_block_device[0].volume_size"], "20");
        assert_eq!(flat["root_block_device[0].volume_type"], "gp3");
        assert_eq!(flat["tags.Name"], "web");
        assert!(!flat.contains_key("user_data"));
    }

    #[test]
    fn test_retain_types_keeps_deletes() {
        let mut resources = PlannedResources::default();
        let mk = |t: &str, action| ResourceChange {
            address: format!("{}.x", t),
            resource_type: t.to_string(),
            name: "x".to_string(),
            provider: "aws".to_string(),
            action,
            attributes: Map::new(),
        };
        resources.create.push(mk("aws_instance", ChangeAction::Create));
        resources.create.push(mk("aws_iam_role", ChangeAction::Create));
        resources.delete.push(mk("aws_iam_role", ChangeAction::Delete));

        resources.retain_types(|t| t == "aws_instance");
        assert_eq!(resources.create.len(), 1);
        assert_eq!(resources.delete.len(), 1);
    }
}
