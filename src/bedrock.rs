//! Bedrock-backed cost estimator
//!
//! Sends one Anthropic Messages request per resource through the Bedrock
//! runtime `InvokeModel` API and parses the model's answer.

use crate::config::{BedrockConfig, Config};
use crate::error::{AnalyzerError, Result};
use crate::estimator::{parse_estimate_response, CostEstimate, CostEstimator};
use crate::extract::ResourceChange;
use crate::prompt::build_cost_prompt;
use crate::retry::ExponentialBackoffPolicy;
use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_sdk_bedrockruntime::config::Region;
use aws_sdk_bedrockruntime::error::{DisplayErrorContext, ProvideErrorMetadata, SdkError};
use aws_sdk_bedrockruntime::operation::invoke_model::InvokeModelError;
use aws_sdk_bedrockruntime::primitives::Blob;
use aws_sdk_bedrockruntime::Client as BedrockClient;
use chrono::{NaiveDate, Utc};
use serde_json::{json, Value};
use tracing::debug;

const ANTHROPIC_VERSION: &str = "bedrock-2023-05-31";

/// Service error codes worth retrying
const TRANSIENT_CODES: &[&str] = &[
    "ThrottlingException",
    "ServiceUnavailableException",
    "InternalServerException",
    "ModelNotReadyException",
    "ModelTimeoutException",
];

pub struct BedrockEstimator {
    client: BedrockClient,
    settings: BedrockConfig,
    region: String,
    analysis_date: NaiveDate,
    retry: ExponentialBackoffPolicy,
}

impl BedrockEstimator {
    /// Build a client from the default AWS credential chain for the
    /// configured region
    pub async fn from_config(config: &Config) -> Self {
        let region = config.analysis.region.clone();
        let sdk_config = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(region.clone()))
            .load()
            .await;

        Self {
            client: BedrockClient::new(&sdk_config),
            settings: config.bedrock.clone(),
            region,
            analysis_date: Utc::now().date_naive(),
            retry: ExponentialBackoffPolicy::new(config.retry.max_attempts),
        }
    }

    async fn invoke(&self, prompt: &str) -> Result<String> {
        let body = serde_json::to_vec(&invoke_body(&self.settings, prompt))?;
        let body = &body;
        let client = &self.client;
        let model_id = self.settings.model_id.as_str();

        let output = self
            .retry
            .execute_with_retry(move || async move {
                client
                    .invoke_model()
                    .model_id(model_id)
                    .content_type("application/json")
                    .accept("application/json")
                    .body(Blob::new(body.clone()))
                    .send()
                    .await
                    .map_err(bedrock_error)
            })
            .await?;

        response_text(output.body().as_ref())
    }
}

#[async_trait]
impl CostEstimator for BedrockEstimator {
    fn name(&self) -> &str {
        "bedrock"
    }

    async fn estimate(&self, resource: &ResourceChange) -> Result<CostEstimate> {
        let prompt = build_cost_prompt(resource, &self.region, self.analysis_date);
        debug!(
            "Requesting estimate for {} ({} prompt bytes)",
            resource.address,
            prompt.len()
        );
        let text = self.invoke(&prompt).await?;
        parse_estimate_response(&text, resource)
    }
}

/// Anthropic Messages request body as Bedrock expects it
pub fn invoke_body(settings: &BedrockConfig, prompt: &str) -> Value {
    json!({
        "anthropic_version": ANTHROPIC_VERSION,
        "max_tokens": settings.max_tokens,
        "messages": [
            {"role": "user", "content": prompt}
        ],
        "temperature": settings.temperature,
        "top_p": settings.top_p,
    })
}

/// Text of the first content block of an Anthropic Messages response
pub fn response_text(body: &[u8]) -> Result<String> {
    let value: Value = serde_json::from_slice(body)?;
    value
        .get("content")
        .and_then(Value::as_array)
        .and_then(|blocks| blocks.first())
        .and_then(|block| block.get("text"))
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| AnalyzerError::Bedrock {
            message: "response has no text content".to_string(),
            transient: false,
            source: None,
        })
}

fn bedrock_error<R: std::fmt::Debug>(err: SdkError<InvokeModelError, R>) -> AnalyzerError {
    let transient = match &err {
        SdkError::ServiceError(service) => is_transient_service_error(service.err()),
        SdkError::TimeoutError(_) => true,
        SdkError::DispatchFailure(failure) => failure.is_io() || failure.is_timeout(),
        _ => false,
    };

    AnalyzerError::Bedrock {
        message: format!("{}", DisplayErrorContext(&err)),
        transient,
        source: None,
    }
}

fn is_transient_service_error(err: &InvokeModelError) -> bool {
    err.is_throttling_exception()
        || err.is_service_unavailable_exception()
        || err.is_internal_server_exception()
        || err.is_model_not_ready_exception()
        || err.is_model_timeout_exception()
        || err.code().is_some_and(|code| TRANSIENT_CODES.contains(&code))
}
