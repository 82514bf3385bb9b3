//! Batched SERP API client, used as the primary provider.
//!
//! One POST carries every pending key. The response maps each key to a list
//! of result blocks whose `result.left` arrays hold the ranked entries.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::config::ResolveConfig;
use crate::credentials::Credential;
use crate::error::ResolveError;
use crate::http;
use crate::provider::PrimaryProvider;
use crate::types::{Locale, ProviderPayload};

/// Request body for one batched query.
#[derive(Debug, Serialize)]
struct SerpRequest<'a> {
    keyword: &'a [String],
    gl: &'a str,
    hl: &'a str,
    serp_limit: String,
    device: &'static str,
}

/// One result block for a key.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct SerpBlock {
    result: SerpResult,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct SerpResult {
    left: Vec<serde_json::Value>,
}

/// Batched SERP API client.
#[derive(Debug, Clone)]
pub struct SerpProvider {
    client: reqwest::Client,
}

impl SerpProvider {
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

impl PrimaryProvider for SerpProvider {
    async fn query(
        &self,
        keys: &[String],
        locale: &Locale,
        depth: u32,
        credential: &Credential,
    ) -> Result<HashMap<String, ProviderPayload>, ResolveError> {
        tracing::trace!(keys = keys.len(), "SERP API batched query");

        let body = SerpRequest {
            keyword: keys,
            gl: &locale.country,
            hl: &locale.language,
            serp_limit: depth.to_string(),
            device: "desktop",
        };

        let request = self.client.post(&credential.endpoint).json(&body);
        let response = credential
            .authorize(request)
            .send()
            .await
            .map_err(|e| ResolveError::Http(format!("SERP API request failed: {e}")))?;

        let decoded: HashMap<String, Vec<SerpBlock>> =
            http::decode_json("SERP API", response).await?;

        Ok(parse_serp_response(decoded))
    }

    fn name(&self) -> &'static str {
        "SERP API"
    }
}

/// Flatten every block for a key into one payload, keeping ranking order.
fn parse_serp_response(
    decoded: HashMap<String, Vec<SerpBlock>>,
) -> HashMap<String, ProviderPayload> {
    decoded
        .into_iter()
        .map(|(key, blocks)| {
            let raw: Vec<serde_json::Value> = blocks
                .into_iter()
                .flat_map(|block| block.result.left)
                .collect();
            (key, ProviderPayload::from_raw(raw))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode(json: &str) -> HashMap<String, ProviderPayload> {
        let decoded: HashMap<String, Vec<SerpBlock>> =
            serde_json::from_str(json).expect("deserialize");
        parse_serp_response(decoded)
    }

    #[test]
    fn request_body_shape() {
        let keys = vec!["example.com a b".to_string()];
        let body = SerpRequest {
            keyword: &keys,
            gl: "tr",
            hl: "tr",
            serp_limit: 3.to_string(),
            device: "desktop",
        };
        let json = serde_json::to_value(&body).expect("serialize");
        assert_eq!(json["keyword"][0], "example.com a b");
        assert_eq!(json["gl"], "tr");
        assert_eq!(json["hl"], "tr");
        assert_eq!(json["serp_limit"], "3");
        assert_eq!(json["device"], "desktop");
    }

    #[test]
    fn parses_left_entries_in_order() {
        let payloads = decode(
            r#"{
                "example.com a": [
                    {"result": {"left": [
                        {"rank": 1, "type": "organic", "title": "A", "url": "https://example.com/a"},
                        {"rank": 2, "type": "paid", "url": "https://ads.example/x"}
                    ]}}
                ]
            }"#,
        );
        let payload = &payloads["example.com a"];
        assert_eq!(payload.entries.len(), 2);
        assert_eq!(payload.entries[0].url, "https://example.com/a");
        assert_eq!(payload.entries[1].kind, "paid");
    }

    #[test]
    fn multiple_blocks_are_concatenated() {
        let payloads = decode(
            r#"{"k": [
                {"result": {"left": [{"type": "organic", "url": "https://one.com"}]}},
                {"result": {"left": [{"type": "organic", "url": "https://two.com"}]}}
            ]}"#,
        );
        let urls: Vec<&str> = payloads["k"].entries.iter().map(|e| e.url.as_str()).collect();
        assert_eq!(urls, vec!["https://one.com", "https://two.com"]);
    }

    #[test]
    fn missing_result_is_empty_payload() {
        let payloads = decode(r#"{"k": [{}], "j": []}"#);
        assert!(payloads["k"].is_empty());
        assert!(payloads["j"].is_empty());
    }
}
