//! Stdin/stdout JSON bridge for report requests.
//!
//! Reads newline-delimited JSON [`RequestEnvelope`] messages, dispatches
//! each through a [`RequestHandler`], and writes one [`ResponseEnvelope`]
//! per line.
//!
//! Stdout is exclusively reserved for the JSON protocol; all diagnostic
//! output (tracing, logs) must be routed to stderr.

use std::future::Future;

use carbon_resolve::{PrimaryProvider, Resolver, SecondaryProvider};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader, BufWriter};

use crate::config::CarbonConfig;
use crate::error::{CarbonError, Result};
use crate::host::contract::{PARSE_ERROR_ID, RequestEnvelope, ResponseEnvelope};
use crate::request::{self, Request, Response};

/// Something that turns a request into a response.
pub trait RequestHandler: Send + Sync {
    fn handle(&self, request: &Request) -> impl Future<Output = Response> + Send;
}

/// Handles requests with the production providers.
#[derive(Debug, Clone)]
pub struct ConfigHandler {
    config: CarbonConfig,
}

impl ConfigHandler {
    pub fn new(config: CarbonConfig) -> Self {
        Self { config }
    }
}

impl RequestHandler for ConfigHandler {
    async fn handle(&self, request: &Request) -> Response {
        request::handle(request, &self.config).await
    }
}

/// Handles requests with an injected resolver.
#[derive(Debug)]
pub struct ResolverHandler<P, S> {
    config: CarbonConfig,
    resolver: Resolver<P, S>,
}

impl<P: PrimaryProvider, S: SecondaryProvider> ResolverHandler<P, S> {
    pub fn new(config: CarbonConfig, resolver: Resolver<P, S>) -> Self {
        Self { config, resolver }
    }
}

impl<P: PrimaryProvider, S: SecondaryProvider> RequestHandler for ResolverHandler<P, S> {
    async fn handle(&self, request: &Request) -> Response {
        request::handle_with(request, &self.config, &self.resolver).await
    }
}

/// Run the bridge over the process stdin/stdout until stdin closes.
pub async fn run_stdio_bridge<H: RequestHandler>(handler: H) -> Result<()> {
    let reader = BufReader::new(tokio::io::stdin());
    let writer = BufWriter::new(tokio::io::stdout());
    serve_lines(reader, writer, &handler).await
}

/// Serve newline-delimited envelopes from `reader` to `writer`.
///
/// Blank lines are skipped. Lines that are not valid envelopes get a 400
/// response with request id [`PARSE_ERROR_ID`] and do not stop the loop.
pub async fn serve_lines<R, W, H>(mut reader: R, mut writer: W, handler: &H) -> Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
    H: RequestHandler,
{
    let mut line = String::new();

    loop {
        line.clear();
        let bytes_read = reader
            .read_line(&mut line)
            .await
            .map_err(|e| CarbonError::Channel(format!("failed to read from stdin: {e}")))?;

        // EOF
        if bytes_read == 0 {
            tracing::info!("stdin closed (EOF); shutting down stdio bridge");
            break;
        }

        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        let response = match parse_envelope(trimmed) {
            Ok(envelope) => {
                tracing::debug!(request_id = %envelope.request_id, "dispatching request");
                let response = handler.handle(&envelope.request).await;
                ResponseEnvelope::new(envelope.request_id, response)
            }
            Err(response) => response,
        };

        let json = serde_json::to_string(&response).map_err(|e| {
            CarbonError::Channel(format!("failed to serialize response envelope: {e}"))
        })?;
        write_line(&mut writer, &json).await?;
    }

    Ok(())
}

fn parse_envelope(line: &str) -> std::result::Result<RequestEnvelope, ResponseEnvelope> {
    let envelope: RequestEnvelope = serde_json::from_str(line).map_err(|e| {
        tracing::warn!(error = %e, "failed to parse request envelope");
        ResponseEnvelope::bad_request(
            PARSE_ERROR_ID,
            format!("failed to parse request envelope: {e}"),
        )
    })?;
    envelope
        .validate()
        .map_err(|message| ResponseEnvelope::bad_request(envelope.request_id.clone(), message))?;
    Ok(envelope)
}

/// Write a single JSON line and flush.
async fn write_line<W: AsyncWrite + Unpin>(writer: &mut W, json: &str) -> Result<()> {
    writer
        .write_all(json.as_bytes())
        .await
        .map_err(|e| CarbonError::Channel(format!("failed to write to stdout: {e}")))?;
    writer
        .write_all(b"\n")
        .await
        .map_err(|e| CarbonError::Channel(format!("failed to write newline to stdout: {e}")))?;
    writer
        .flush()
        .await
        .map_err(|e| CarbonError::Channel(format!("failed to flush stdout: {e}")))?;
    Ok(())
}
