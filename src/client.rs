//! HTTP client for OpenAI-compatible chat completion endpoints.

use bytes::Bytes;
use futures::Stream;
use futures::stream::{self, StreamExt};
use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::{Client as ReqwestClient, Response, header};
use serde::Deserialize;
use std::env;
use std::time::Duration;

use crate::error::{Error, Result};
use crate::types::{ChatMessage, ChatOptions, ChatRequest, ModelInfo, ModelList, StreamChunk};

const DEFAULT_API_URL: &str = "https://api.openai.com/v1/";
const DEFAULT_MODEL: &str = "gpt-4o-mini";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);

/// Client for an OpenAI-compatible completion API.
///
/// The client carries the currently selected model identifier; the
/// session loop reconfigures it in place via [`Client::set_model`] and
/// releases the connection pool via [`Client::shutdown`] at process exit.
#[derive(Debug, Clone)]
pub struct Client {
    api_key: String,
    client: ReqwestClient,
    base_url: String,
    model: String,
    timeout: Duration,
}

impl Client {
    /// Create a new client.
    ///
    /// The API key can be provided directly or read from the
    /// PALAVER_API_KEY environment variable. The base URL defaults to
    /// the OpenAI endpoint and can be overridden with PALAVER_BASE_URL.
    pub fn new(api_key: Option<String>) -> Result<Self> {
        Self::with_options(api_key, env::var("PALAVER_BASE_URL").ok(), None)
    }

    /// Create a new client with custom settings.
    pub fn with_options(
        api_key: Option<String>,
        base_url: Option<String>,
        timeout: Option<Duration>,
    ) -> Result<Self> {
        let api_key = match api_key {
            Some(key) => key,
            None => env::var("PALAVER_API_KEY").map_err(|_| {
                Error::configuration(
                    "API key not provided and PALAVER_API_KEY environment variable not set",
                )
            })?,
        };

        let timeout = timeout.unwrap_or(DEFAULT_TIMEOUT);
        let client = ReqwestClient::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| {
                Error::http_client(
                    format!("Failed to build HTTP client: {}", e),
                    Some(Box::new(e)),
                )
            })?;

        Ok(Self {
            api_key,
            client,
            base_url: base_url.unwrap_or_else(|| DEFAULT_API_URL.to_string()),
            model: DEFAULT_MODEL.to_string(),
            timeout,
        })
    }

    /// Returns the currently selected model identifier.
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Reconfigures the client to target a different model.
    pub fn set_model(&mut self, model: impl Into<String>) {
        self.model = model.into();
    }

    /// Releases the connection pool.
    ///
    /// Called once on every exit path so the process can terminate
    /// without waiting on idle pooled connections.
    pub fn shutdown(self) {
        drop(self.client);
    }

    /// Create and return default headers for API requests.
    fn default_headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/json"),
        );
        headers.insert(header::ACCEPT, HeaderValue::from_static("application/json"));
        let bearer = format!("Bearer {}", self.api_key);
        headers.insert(
            header::AUTHORIZATION,
            HeaderValue::from_str(&bearer).expect("API key should be valid header text"),
        );
        headers
    }

    /// Process API response errors and convert to our Error type.
    async fn process_error_response(response: Response) -> Error {
        let status = response.status();
        let status_code = status.as_u16();

        let retry_after = response
            .headers()
            .get("retry-after")
            .and_then(|val| val.to_str().ok())
            .and_then(|val| val.parse::<u64>().ok());

        #[derive(Deserialize)]
        struct ErrorResponse {
            error: Option<ErrorDetail>,
        }

        #[derive(Deserialize)]
        struct ErrorDetail {
            #[serde(rename = "type")]
            error_type: Option<String>,
            message: Option<String>,
            param: Option<String>,
        }

        let error_body = match response.text().await {
            Ok(body) => body,
            Err(e) => {
                return Error::http_client(
                    format!("Failed to read error response: {}", e),
                    Some(Box::new(e)),
                );
            }
        };

        let parsed_error = serde_json::from_str::<ErrorResponse>(&error_body).ok();
        let error_type = parsed_error
            .as_ref()
            .and_then(|e| e.error.as_ref())
            .and_then(|e| e.error_type.clone());
        let error_message = parsed_error
            .as_ref()
            .and_then(|e| e.error.as_ref())
            .and_then(|e| e.message.clone())
            .unwrap_or_else(|| error_body.clone());
        let error_param = parsed_error
            .as_ref()
            .and_then(|e| e.error.as_ref())
            .and_then(|e| e.param.clone());

        match status_code {
            400 => Error::bad_request(error_message, error_param),
            401 => Error::authentication(error_message),
            408 => Error::timeout(error_message, None),
            429 => Error::rate_limit(error_message, retry_after),
            500 => Error::internal_server(error_message),
            502..=504 => Error::service_unavailable(error_message, retry_after),
            _ => Error::api(status_code, error_type, error_message),
        }
    }

    /// Convert a reqwest send error into our Error type.
    fn process_send_error(&self, e: reqwest::Error) -> Error {
        if e.is_timeout() {
            Error::timeout(
                format!("Request timed out: {}", e),
                Some(self.timeout.as_secs_f64()),
            )
        } else if e.is_connect() {
            Error::connection(format!("Connection error: {}", e), Some(Box::new(e)))
        } else {
            Error::http_client(format!("Request failed: {}", e), Some(Box::new(e)))
        }
    }

    /// Issue one streaming completion call against the selected model.
    ///
    /// Returns a stream of [`StreamChunk`] values that can be consumed
    /// incrementally. The stream ends when the server sends its
    /// `[DONE]` marker or closes the connection.
    pub async fn stream_chat(
        &self,
        messages: &[ChatMessage],
        options: ChatOptions,
    ) -> Result<impl Stream<Item = Result<StreamChunk>> + Unpin> {
        let params = ChatRequest::streaming(self.model.clone(), messages.to_vec())
            .with_options(options);

        let url = format!("{}chat/completions", self.base_url);
        tracing::debug!(model = %self.model, messages = messages.len(), "streaming completion request");

        let mut headers = self.default_headers();
        headers.insert(
            header::ACCEPT,
            HeaderValue::from_static("text/event-stream"),
        );

        let response = self
            .client
            .post(&url)
            .headers(headers)
            .json(&params)
            .send()
            .await
            .map_err(|e| self.process_send_error(e))?;

        if !response.status().is_success() {
            return Err(Self::process_error_response(response).await);
        }

        let stream = response.bytes_stream();

        Ok(Box::pin(process_sse(stream)))
    }

    /// List the models the endpoint offers.
    pub async fn list_models(&self) -> Result<Vec<ModelInfo>> {
        let url = format!("{}models", self.base_url);

        let response = self
            .client
            .get(&url)
            .headers(self.default_headers())
            .send()
            .await
            .map_err(|e| self.process_send_error(e))?;

        if !response.status().is_success() {
            return Err(Self::process_error_response(response).await);
        }

        let listing = response.json::<ModelList>().await.map_err(|e| {
            Error::serialization(
                format!("Failed to parse models listing: {}", e),
                Some(Box::new(e)),
            )
        })?;
        Ok(listing.data)
    }
}

/// One decoded SSE event.
enum SseEvent {
    /// A parsed (or unparseable) chunk.
    Chunk(Result<StreamChunk>),
    /// The `[DONE]` end-of-stream marker.
    Done,
    /// An event with no data field; skipped.
    Skip,
}

/// Process a stream of bytes into a stream of completion chunks.
fn process_sse<S>(byte_stream: S) -> impl Stream<Item = Result<StreamChunk>>
where
    S: Stream<Item = std::result::Result<Bytes, reqwest::Error>> + Unpin + 'static,
{
    // Convert reqwest errors to our error type
    let stream = byte_stream.map(|result| {
        result.map_err(|e| {
            Error::streaming(format!("Error in HTTP stream: {}", e), Some(Box::new(e)))
        })
    });

    // Use a state machine to process the SSE stream. Frames arrive on
    // byte boundaries, not character boundaries, so an undecoded tail
    // carries over between frames.
    let buffer = String::new();
    let tail: Vec<u8> = Vec::new();

    stream::unfold(
        (stream, buffer, tail),
        move |(mut stream, mut buffer, mut tail)| async move {
            loop {
                // First check if we have a complete event in the buffer
                if let Some((event, remaining)) = extract_event(&buffer) {
                    buffer = remaining;
                    match event {
                        SseEvent::Chunk(chunk) => return Some((chunk, (stream, buffer, tail))),
                        SseEvent::Done => return None,
                        SseEvent::Skip => continue,
                    }
                }

                // Read more data
                match stream.next().await {
                    Some(Ok(bytes)) => {
                        tail.extend_from_slice(&bytes);
                        match take_utf8_prefix(&mut tail) {
                            Ok(text) => buffer.push_str(&text),
                            Err(e) => {
                                tail.clear();
                                return Some((Err(e), (stream, buffer, tail)));
                            }
                        }
                    }
                    Some(Err(e)) => {
                        return Some((Err(e), (stream, buffer, tail)));
                    }
                    None => {
                        // End of stream
                        if !tail.is_empty() {
                            tail.clear();
                            return Some((
                                Err(Error::encoding(
                                    "Stream ended inside a UTF-8 sequence",
                                    None,
                                )),
                                (stream, buffer, tail),
                            ));
                        }
                        if !buffer.is_empty() {
                            if let Some((SseEvent::Chunk(chunk), _)) = extract_event(&buffer) {
                                buffer.clear();
                                return Some((chunk, (stream, buffer, tail)));
                            }
                        }
                        return None;
                    }
                }
            }
        },
    )
}

/// Drains the longest valid UTF-8 prefix of `bytes` as text.
///
/// A trailing incomplete multi-byte sequence is left in `bytes` so the
/// next frame can complete it; genuinely invalid bytes are an error.
fn take_utf8_prefix(bytes: &mut Vec<u8>) -> Result<String> {
    match std::str::from_utf8(bytes) {
        Ok(text) => {
            let text = text.to_string();
            bytes.clear();
            Ok(text)
        }
        Err(e) if e.error_len().is_none() => {
            let text = String::from_utf8_lossy(&bytes[..e.valid_up_to()]).into_owned();
            bytes.drain(..e.valid_up_to());
            Ok(text)
        }
        Err(e) => Err(Error::encoding(
            format!("Invalid UTF-8 in stream: {}", e),
            Some(Box::new(e)),
        )),
    }
}

/// Extract a complete SSE event from a buffer string.
fn extract_event(buffer: &str) -> Option<(SseEvent, String)> {
    // Each event is delimited by a blank line
    let parts: Vec<&str> = buffer.splitn(2, "\n\n").collect();
    if parts.len() != 2 {
        return None;
    }

    let event_text = parts[0];
    let rest = parts[1].to_string();

    let mut data = None;
    for line in event_text.lines() {
        if line.starts_with("data: ") {
            data = Some(line.trim_start_matches("data: "));
        }
    }

    match data {
        Some("[DONE]") => Some((SseEvent::Done, rest)),
        Some(json_str) => match serde_json::from_str::<StreamChunk>(json_str) {
            Ok(chunk) => Some((SseEvent::Chunk(Ok(chunk)), rest)),
            Err(e) => Some((
                SseEvent::Chunk(Err(Error::serialization(
                    format!("Failed to parse event JSON: {}", e),
                    Some(Box::new(e)),
                ))),
                rest,
            )),
        },
        None => Some((SseEvent::Skip, rest)),
    }
}
