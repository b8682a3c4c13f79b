use crate::config::ProxyConfig;
use crate::error::{ProxyError, Result};
use crate::logging::SharedLogger;
use crate::resolver::{resolve_model, UpstreamProbe};
use crate::translate::nim_types::{NimErrorBody, NimRequest};
use crate::translate::openai_types::{ChatRequest, ChatResponse};
use crate::translate::request::openai_to_nim;
use crate::translate::response::{parse_nim_response, truncate};
use crate::translate::streaming::StreamReframer;

use bytes::Bytes;
use futures::stream::Stream;
use futures::StreamExt;
use std::fmt::Display;
use std::pin::Pin;

/// Outbound event-stream bytes, already framed.
pub type ByteStream =
    Pin<Box<dyn Stream<Item = std::result::Result<Bytes, std::io::Error>> + Send>>;

/// What a successfully proxied chat completion produced.
pub enum ProxyOutcome {
    Complete(ChatResponse),
    Stream(ByteStream),
}

/// Proxy one raw `/v1/chat/completions` body end to end.
pub async fn proxy_chat_completion(
    body: &[u8],
    config: &ProxyConfig,
    client: &reqwest::Client,
    logger: &SharedLogger,
) -> Result<ProxyOutcome> {
    // Checked before anything else so a missing key never reaches the network.
    config.require_api_key()?;

    let req: ChatRequest = serde_json::from_slice(body)
        .map_err(|e| ProxyError::invalid_request(format!("Invalid request body: {}", e)))?;

    logger.info(
        "server",
        format!(
            "Request: model={} streaming={} messages={}",
            req.model,
            req.is_streaming(),
            req.messages.len()
        ),
    );

    if req.is_streaming() {
        proxy_streaming(&req, config, client, logger)
            .await
            .map(ProxyOutcome::Stream)
    } else {
        proxy_non_streaming(&req, config, client, logger)
            .await
            .map(ProxyOutcome::Complete)
    }
}

/// Forward a non-streaming request and translate the complete response.
pub async fn proxy_non_streaming(
    req: &ChatRequest,
    config: &ProxyConfig,
    client: &reqwest::Client,
    logger: &SharedLogger,
) -> Result<ChatResponse> {
    let nim_req = prepare(req, config, client, logger).await?;
    let response = dispatch(&nim_req, config, client, logger).await?;

    let body = response.text().await?;
    logger.debug("proxy", format!("Response body_len={}", body.len()));

    let chat_resp = parse_nim_response(&body, &req.model)?;

    logger.info(
        "proxy",
        format!(
            "Completed: choices={} prompt={} completion={} tokens",
            chat_resp.choices.len(),
            chat_resp.usage["prompt_tokens"],
            chat_resp.usage["completion_tokens"]
        ),
    );

    Ok(chat_resp)
}

/// Forward a streaming request, returning the re-framed event stream.
pub async fn proxy_streaming(
    req: &ChatRequest,
    config: &ProxyConfig,
    client: &reqwest::Client,
    logger: &SharedLogger,
) -> Result<ByteStream> {
    let nim_req = prepare(req, config, client, logger).await?;
    let response = dispatch(&nim_req, config, client, logger).await?;

    Ok(Box::pin(reframe_stream(
        response.bytes_stream(),
        logger.clone(),
    )))
}

/// Resolve the model and build the upstream request.
async fn prepare(
    req: &ChatRequest,
    config: &ProxyConfig,
    client: &reqwest::Client,
    logger: &SharedLogger,
) -> Result<NimRequest> {
    let api_key = config.require_api_key()?;
    let probe = UpstreamProbe {
        client,
        url: config.chat_completions_url(),
        api_key,
    };

    let resolution = resolve_model(&req.model, &probe).await;
    tracing::info!(
        requested = %req.model,
        resolved = %resolution.model,
        source = resolution.source.as_str(),
        "model resolved"
    );
    logger.log_with_context(
        crate::logging::LogLevel::Info,
        "resolver",
        format!("{} -> {}", req.model, resolution.model),
        serde_json::json!({ "source": resolution.source.as_str() }),
    );

    Ok(openai_to_nim(req, &resolution.model))
}

/// Issue the single upstream call; any non-2xx becomes an error.
async fn dispatch(
    nim_req: &NimRequest,
    config: &ProxyConfig,
    client: &reqwest::Client,
    logger: &SharedLogger,
) -> Result<reqwest::Response> {
    let api_key = config.require_api_key()?;
    let url = config.chat_completions_url();

    logger.info(
        "proxy",
        format!(
            "POST {} model={}{}",
            url,
            nim_req.model,
            if nim_req.stream { " (streaming)" } else { "" }
        ),
    );

    let response = client
        .post(&url)
        .bearer_auth(api_key)
        .json(nim_req)
        .send()
        .await
        .map_err(|e| {
            logger.error("proxy", format!("Request failed: {}", e));
            ProxyError::Http(e)
        })?;

    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    logger.warn(
        "proxy",
        format!("Upstream error status={}: {}", status.as_u16(), truncate(&body, 300)),
    );

    Err(upstream_error(status.as_u16(), &body))
}

/// Classify a rejected upstream call, giving common statuses readable messages.
pub fn upstream_error(status: u16, body: &str) -> ProxyError {
    let message = match status {
        401 => {
            "Invalid NVIDIA API key. Please check your NIM_API_KEY in environment variables."
                .to_string()
        }
        429 => "Rate limit exceeded. Please try again in a moment.".to_string(),
        _ => serde_json::from_str::<NimErrorBody>(body)
            .ok()
            .and_then(|b| b.detail_message().map(str::to_string))
            .unwrap_or_else(|| format!("Request failed with status code {}", status)),
    };

    ProxyError::upstream(status, message)
}

/// Re-frame an upstream SSE byte stream for the caller.
///
/// Ends quietly on an upstream read error: the caller sees a truncated stream
/// because a JSON error envelope cannot follow partial event-stream output.
/// When the caller disconnects, the returned stream is dropped, which drops
/// `byte_stream` and with it the upstream connection.
pub fn reframe_stream<S, E>(
    byte_stream: S,
    logger: SharedLogger,
) -> impl Stream<Item = std::result::Result<Bytes, std::io::Error>> + Send + 'static
where
    S: Stream<Item = std::result::Result<Bytes, E>> + Send + 'static,
    E: Display + Send + 'static,
{
    async_stream::stream! {
        let mut reframer = StreamReframer::new();
        let mut frames = 0usize;
        let mut clean = true;

        tokio::pin!(byte_stream);

        while let Some(chunk_result) = byte_stream.next().await {
            let chunk = match chunk_result {
                Ok(c) => c,
                Err(e) => {
                    logger.error("stream", format!("Byte stream error: {}", e));
                    clean = false;
                    break;
                }
            };

            for frame in reframer.push(&chunk) {
                frames += 1;
                yield Ok(frame);
            }
        }

        if clean {
            if let Some(frame) = reframer.finish() {
                frames += 1;
                yield Ok(frame);
            }
            logger.info("stream", format!("Stream completed frames={}", frames));
        } else {
            logger.warn("stream", format!("Stream truncated after frames={}", frames));
        }
    }
}
