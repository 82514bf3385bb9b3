//! Versioned request/response envelopes for the stdio host.

use serde::{Deserialize, Serialize};

use crate::request::{Request, Response, STATUS_BAD_REQUEST};

/// Contract version for host envelopes.
pub const ENVELOPE_VERSION: u32 = 1;

/// Request id used when the incoming line could not be parsed.
pub const PARSE_ERROR_ID: &str = "parse-error";

/// A versioned request envelope from caller -> host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestEnvelope {
    pub v: u32,
    pub request_id: String,
    pub request: Request,
}

impl RequestEnvelope {
    /// Build a v1 request envelope.
    #[must_use]
    pub fn new(request_id: impl Into<String>, request: Request) -> Self {
        Self {
            v: ENVELOPE_VERSION,
            request_id: request_id.into(),
            request,
        }
    }

    /// Validate envelope version and required identifiers.
    pub fn validate(&self) -> Result<(), String> {
        if self.v != ENVELOPE_VERSION {
            return Err(format!(
                "unsupported contract version {}; expected {}",
                self.v, ENVELOPE_VERSION
            ));
        }
        if self.request_id.trim().is_empty() {
            return Err("request_id cannot be empty".to_owned());
        }
        Ok(())
    }
}

/// A versioned response envelope from host -> caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseEnvelope {
    pub v: u32,
    pub request_id: String,
    pub response: Response,
}

impl ResponseEnvelope {
    /// Wrap a handler response.
    #[must_use]
    pub fn new(request_id: impl Into<String>, response: Response) -> Self {
        Self {
            v: ENVELOPE_VERSION,
            request_id: request_id.into(),
            response,
        }
    }

    /// A 400 envelope for input that never reached the handler.
    #[must_use]
    pub fn bad_request(request_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(request_id, Response::error(STATUS_BAD_REQUEST, message))
    }
}
