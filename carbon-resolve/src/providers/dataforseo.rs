//! DataForSEO live SERP client, used as the secondary (fallback) provider.
//!
//! Each call posts a single task for one key. The provider reports its own
//! status code in the body (`20000` family means success) in addition to
//! the HTTP status.

use serde::{Deserialize, Serialize};

use crate::config::ResolveConfig;
use crate::credentials::Credential;
use crate::error::ResolveError;
use crate::http;
use crate::provider::SecondaryProvider;
use crate::types::{Locale, ProviderPayload};

use super::locations::location_code;

/// Body status codes in this range mean the task succeeded.
const SUCCESS_STATUS: std::ops::RangeInclusive<u32> = 20000..=29999;

#[derive(Debug, Serialize)]
struct TaskRequest<'a> {
    keyword: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    location_code: Option<u32>,
    language_code: &'a str,
    depth: u32,
    device: &'static str,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct TaskResponse {
    status_code: u32,
    status_message: String,
    tasks: Vec<Task>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Task {
    result: Option<Vec<TaskResult>>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct TaskResult {
    items: Option<Vec<serde_json::Value>>,
}

/// Per-key DataForSEO client.
#[derive(Debug, Clone)]
pub struct DataForSeoProvider {
    client: reqwest::Client,
}

impl DataForSeoProvider {
    /// Creates a client using the timeout and User-Agent from `config`.
    ///
    /// # Errors
    ///
    /// Returns [`ResolveError::Http`] if the HTTP client cannot be built.
    pub fn new(config: &ResolveConfig) -> Result<Self, ResolveError> {
        Ok(Self {
            client: http::build_client(config)?,
        })
    }

    /// Creates a provider around an existing client.
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

impl SecondaryProvider for DataForSeoProvider {
    async fn resolve_one(
        &self,
        key: &str,
        locale: &Locale,
        depth: u32,
        credential: &Credential,
    ) -> Result<ProviderPayload, ResolveError> {
        tracing::trace!(key, "DataForSEO live query");

        let tasks = [TaskRequest {
            keyword: key,
            location_code: location_code(&locale.country),
            language_code: &locale.language,
            depth,
            device: "desktop",
        }];

        let request = self.client.post(&credential.endpoint).json(&tasks);
        let response = credential
            .authorize(request)
            .send()
            .await
            .map_err(|e| ResolveError::ProviderCallFailed(format!("DataForSEO request failed: {e}")))?;

        let decoded: TaskResponse = http::decode_json("DataForSEO", response).await?;
        parse_task_response(decoded)
    }

    fn name(&self) -> &'static str {
        "DataForSEO"
    }
}

fn parse_task_response(decoded: TaskResponse) -> Result<ProviderPayload, ResolveError> {
    if !SUCCESS_STATUS.contains(&decoded.status_code) {
        return Err(ResolveError::ProviderCallFailed(format!(
            "DataForSEO status {}: {}",
            decoded.status_code, decoded.status_message
        )));
    }

    let raw: Vec<serde_json::Value> = decoded
        .tasks
        .into_iter()
        .flat_map(|task| task.result.unwrap_or_default())
        .flat_map(|result| result.items.unwrap_or_default())
        .collect();

    Ok(ProviderPayload::from_raw(raw))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode(json: &str) -> Result<ProviderPayload, ResolveError> {
        let decoded: TaskResponse = serde_json::from_str(json).expect("deserialize");
        parse_task_response(decoded)
    }

    #[test]
    fn request_body_uses_location_code() {
        let tasks = [TaskRequest {
            keyword: "rust",
            location_code: location_code("tr"),
            language_code: "tr",
            depth: 20,
            device: "desktop",
        }];
        let json = serde_json::to_value(tasks).expect("serialize");
        assert_eq!(json[0]["keyword"], "rust");
        assert_eq!(json[0]["location_code"], 2792);
        assert_eq!(json[0]["language_code"], "tr");
        assert_eq!(json[0]["depth"], 20);
    }

    #[test]
    fn unknown_country_omits_location_code() {
        let task = TaskRequest {
            keyword: "rust",
            location_code: location_code("zz"),
            language_code: "en",
            depth: 3,
            device: "desktop",
        };
        let json = serde_json::to_value(task).expect("serialize");
        assert!(json.get("location_code").is_none());
    }

    #[test]
    fn parses_items_across_tasks() {
        let payload = decode(
            r#"{
                "status_code": 20000,
                "tasks": [{"result": [{"keyword": "rust", "items": [
                    {"type": "organic", "rank_group": 1, "title": "Rust", "description": "A language", "url": "https://www.rust-lang.org/"},
                    {"type": "people_also_ask", "title": "What is Rust?", "url": null}
                ]}]}]
            }"#,
        )
        .expect("success");
        assert_eq!(payload.entries.len(), 2);
        assert_eq!(payload.entries[0].rank, 1);
        assert_eq!(payload.entries[0].description, "A language");
        assert!(payload.entries[1].url.is_empty());
    }

    #[test]
    fn null_result_is_empty_payload() {
        let payload = decode(r#"{"status_code": 20000, "tasks": [{"result": null}]}"#)
            .expect("success");
        assert!(payload.is_empty());
    }

    #[test]
    fn body_status_outside_success_range_fails() {
        let err = decode(r#"{"status_code": 40501, "status_message": "Invalid Field", "tasks": []}"#)
            .unwrap_err();
        assert!(matches!(err, ResolveError::ProviderCallFailed(_)));
        assert!(err.to_string().contains("40501"));
    }
}
