//! Terraform plan loading
//!
//! Accepts either the JSON produced by `terraform show -json` or a binary
//! `.tfplan` archive, which is converted by invoking the terraform CLI.

use crate::error::{AnalyzerError, Result};
use serde_json::Value;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::{debug, info};

const ZIP_MAGIC: &[u8] = b"PK\x03\x04";

/// A parsed Terraform plan
#[derive(Debug, Clone)]
pub struct PlanDocument {
    pub format_version: Option<String>,
    pub terraform_version: Option<String>,
    pub raw: Value,
}

impl PlanDocument {
    /// Validate the top-level shape of an already parsed plan
    pub fn from_value(raw: Value, path: &Path) -> Result<Self> {
        let obj = raw
            .as_object()
            .ok_or_else(|| AnalyzerError::malformed(path, "top-level value is not a JSON object"))?;

        if let Some(changes) = obj.get("resource_changes") {
            if !changes.is_array() && !changes.is_null() {
                return Err(AnalyzerError::malformed(
                    path,
                    "'resource_changes' must be an array",
                ));
            }
        }

        let field = |name: &str| obj.get(name).and_then(Value::as_str).map(str::to_string);
        let format_version = field("format_version");
        let terraform_version = field("terraform_version");
        Ok(Self {
            format_version,
            terraform_version,
            raw,
        })
    }

    /// Entries of `resource_changes`, or `None` when the plan has none
    pub fn resource_changes(&self) -> Option<&[Value]> {
        self.raw
            .get("resource_changes")
            .and_then(Value::as_array)
            .map(Vec::as_slice)
    }
}

/// Load a plan from disk
pub fn load_plan(path: &Path) -> Result<PlanDocument> {
    if !path.exists() {
        return Err(AnalyzerError::PlanNotFound(path.display().to_string()));
    }

    let bytes = std::fs::read(path)?;
    let raw = if is_binary_plan(&bytes) {
        debug!("{} is a binary plan, converting with terraform show", path.display());
        terraform_show_json(path)?
    } else {
        serde_json::from_slice(&bytes)
            .map_err(|e| AnalyzerError::malformed(path, format!("invalid JSON: {}", e)))?
    };

    let plan = PlanDocument::from_value(raw, path)?;
    info!(
        "Parsed Terraform plan {} (format {})",
        path.display(),
        plan.format_version.as_deref().unwrap_or("unknown")
    );
    Ok(plan)
}

/// Binary plans are zip archives
pub fn is_binary_plan(bytes: &[u8]) -> bool {
    bytes.starts_with(ZIP_MAGIC)
}

/// Run `terraform show -json` on a binary plan, from the plan's directory
pub fn terraform_show_json(path: &Path) -> Result<Value> {
    let terraform = find_terraform(std::env::var_os("PATH"))?;
    show_json(&terraform, path)
}

/// Locate the terraform binary in the given search path
fn find_terraform(search_path: Option<OsString>) -> Result<PathBuf> {
    let cwd = std::env::current_dir()?;
    which::which_in("terraform", search_path, cwd).map_err(|_| {
        AnalyzerError::Terraform(
            "terraform CLI not found on PATH; install Terraform or pass a JSON plan".to_string(),
        )
    })
}

fn show_json(terraform: &Path, path: &Path) -> Result<Value> {
    let abs = path.canonicalize()?;
    let dir = abs.parent().unwrap_or_else(|| Path::new("."));
    let file_name = abs
        .file_name()
        .ok_or_else(|| AnalyzerError::malformed(path, "plan path has no file name"))?;

    let output = Command::new(terraform)
        .arg("show")
        .arg("-json")
        .arg(file_name)
        .current_dir(dir)
        .output()?;

    if !output.status.success() {
        return Err(AnalyzerError::Terraform(format!(
            "terraform show failed: {}",
            String::from_utf8_lossy(&output.stderr).trim()
        )));
    }

    serde_json::from_slice(&output.stdout).map_err(|e| {
        AnalyzerError::malformed(path, format!("terraform show produced invalid JSON: {}", e))
    })
}
