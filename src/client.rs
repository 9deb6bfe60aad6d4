use std::env;
use std::time::{Duration, Instant};

use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::{Client as ReqwestClient, Response, StatusCode, header};
use serde::Serialize;
use serde_json::Value;
use url::Url;

use crate::error::{Error, Result};
use crate::observability::{CLIENT_REQUEST_DURATION, CLIENT_REQUEST_ERRORS, CLIENT_REQUESTS};
use crate::types::{ChatRequest, ChatResponse, EndRequest, StartRequest, StartResponse};

pub(crate) const DEFAULT_BASE_URL: &str = "http://127.0.0.1:5000/";
pub(crate) const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Environment variable consulted when no base URL is given.
pub const BASE_URL_ENV: &str = "PARLOR_BASE_URL";

/// The three round trips a chat service offers.
///
/// Each call is a single request and response; implementations do not retry.
#[async_trait::async_trait]
pub trait Backend: Send + Sync {
    /// Start a conversation.
    async fn start(&self, request: &StartRequest) -> Result<StartResponse>;

    /// Send one user message.
    async fn chat(&self, request: &ChatRequest) -> Result<ChatResponse>;

    /// End a conversation.  The acknowledgement carries no information.
    async fn end(&self, request: &EndRequest) -> Result<()>;
}

/// HTTP client for a chat service exposing `/start`, `/chat` and `/end`.
#[derive(Debug, Clone)]
pub struct ChatClient {
    client: ReqwestClient,
    base_url: Url,
    timeout: Duration,
}

impl ChatClient {
    /// Create a new client.
    ///
    /// The base URL can be provided directly or read from the
    /// `PARLOR_BASE_URL` environment variable, falling back to a local
    /// development server.
    pub fn new(base_url: Option<String>) -> Result<Self> {
        Self::with_options(base_url, None)
    }

    /// Create a new client with custom settings.
    pub fn with_options(base_url: Option<String>, timeout: Option<Duration>) -> Result<Self> {
        let base_url = base_url
            .or_else(|| env::var(BASE_URL_ENV).ok())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        let base_url = parse_base_url(&base_url)?;

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
            client,
            base_url,
            timeout,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Create and return default headers for requests.
    fn default_headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/json"),
        );
        headers.insert(header::ACCEPT, HeaderValue::from_static("application/json"));
        headers
    }

    fn endpoint(&self, name: &str) -> Result<Url> {
        self.base_url
            .join(name)
            .map_err(|e| Error::url(format!("Invalid endpoint {}: {}", name, e), Some(e)))
    }

    async fn post<T: Serialize + ?Sized>(&self, name: &str, body: &T) -> Result<Response> {
        let url = self.endpoint(name)?;
        tracing::debug!(%url, "POST");
        CLIENT_REQUESTS.click();
        let started = Instant::now();

        let result = self
            .client
            .post(url)
            .headers(self.default_headers())
            .json(body)
            .send()
            .await;
        CLIENT_REQUEST_DURATION.add(started.elapsed().as_secs_f64());

        result.map_err(|e| {
            CLIENT_REQUEST_ERRORS.click();
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
        })
    }

    /// Process error responses and convert to our Error type.
    async fn process_error_response(response: Response) -> Error {
        CLIENT_REQUEST_ERRORS.click();
        let status_code = response.status().as_u16();
        match read_text(response).await {
            Ok(body) => Error::api(status_code, error_message(&body)),
            Err(err) => err,
        }
    }
}

#[async_trait::async_trait]
impl Backend for ChatClient {
    async fn start(&self, request: &StartRequest) -> Result<StartResponse> {
        let response = self.post("start", request).await?;
        if !response.status().is_success() {
            return Err(Self::process_error_response(response).await);
        }
        let body = read_body(response).await?;
        Ok(StartResponse::from_value(&body))
    }

    async fn chat(&self, request: &ChatRequest) -> Result<ChatResponse> {
        let response = self.post("chat", request).await?;
        let status = response.status();
        if status.is_success() {
            let body = read_body(response).await?;
            return Ok(ChatResponse::from_value(&body));
        }
        if status == StatusCode::BAD_REQUEST {
            // A 400 carrying an `error` field is how services report that the
            // conversation no longer exists.
            let text = match read_text(response).await {
                Ok(text) => text,
                Err(err) => {
                    CLIENT_REQUEST_ERRORS.click();
                    return Err(err);
                }
            };
            if let Ok(body @ Value::Object(_)) = serde_json::from_str::<Value>(&text)
                && body.get("error").is_some()
            {
                return Ok(ChatResponse::from_value(&body));
            }
            CLIENT_REQUEST_ERRORS.click();
            return Err(Error::api(status.as_u16(), error_message(&text)));
        }
        Err(Self::process_error_response(response).await)
    }

    async fn end(&self, request: &EndRequest) -> Result<()> {
        let response = self.post("end", request).await?;
        if !response.status().is_success() {
            return Err(Self::process_error_response(response).await);
        }
        Ok(())
    }
}

/// Parse a base URL so that endpoint names join beneath its path.
pub(crate) fn parse_base_url(raw: &str) -> Result<Url> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(Error::validation(
            "base URL must not be empty",
            Some("base_url".to_string()),
        ));
    }
    let mut url = Url::parse(raw)?;
    if url.cannot_be_a_base() || !matches!(url.scheme(), "http" | "https") {
        return Err(Error::validation(
            format!("base URL must be http or https: {}", raw),
            Some("base_url".to_string()),
        ));
    }
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}

// A 2xx body that is not JSON is treated as a bare string reply.
async fn read_body(response: Response) -> Result<Value> {
    let text = read_text(response).await?;
    match serde_json::from_str::<Value>(&text) {
        Ok(body) => Ok(body),
        Err(e) => {
            tracing::warn!(error = %e, "response body is not JSON; treating it as text");
            Ok(Value::String(text))
        }
    }
}

async fn read_text(response: Response) -> Result<String> {
    Ok(response.text().await?)
}

fn error_message(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| v.get("error").and_then(Value::as_str).map(String::from))
        .unwrap_or_else(|| body.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_creation() {
        let client = ChatClient::new(Some("http://localhost:8080".to_string())).unwrap();
        assert_eq!(client.base_url().as_str(), "http://localhost:8080/");
        assert_eq!(client.timeout(), DEFAULT_TIMEOUT);

        let client = ChatClient::with_options(
            Some("https://chat.example.com/api".to_string()),
            Some(Duration::from_secs(5)),
        )
        .unwrap();
        assert_eq!(client.base_url().as_str(), "https://chat.example.com/api/");
        assert_eq!(client.timeout(), Duration::from_secs(5));
    }

    #[test]
    fn endpoints_join_under_prefix() {
        let client = ChatClient::new(Some("https://chat.example.com/api".to_string())).unwrap();
        assert_eq!(
            client.endpoint("start").unwrap().as_str(),
            "https://chat.example.com/api/start"
        );
        assert_eq!(
            client.endpoint("chat").unwrap().as_str(),
            "https://chat.example.com/api/chat"
        );
    }

    #[test]
    fn invalid_base_urls() {
        assert!(parse_base_url("").unwrap_err().is_validation());
        assert!(parse_base_url("mailto:someone@example.com").is_err());
        assert!(parse_base_url("ftp://example.com/").unwrap_err().is_validation());
        assert!(matches!(
            parse_base_url("not a url").unwrap_err(),
            Error::Url { .. }
        ));
    }

    #[test]
    fn error_message_prefers_json_error() {
        assert_eq!(
            error_message(r#"{"error": "Conversation not started"}"#),
            "Conversation not started"
        );
        assert_eq!(error_message("Bad Gateway"), "Bad Gateway");
        assert_eq!(error_message(r#"{"error": true}"#), r#"{"error": true}"#);
    }
}
