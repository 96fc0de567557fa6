//! Minimal JSON HTTP client with safe logging, retries, and token auth.
//!
//! - Request options: `Auth`, timeout, retries
//! - Never logs secret values; only the auth kind appears in events
//! - Retries 429/5xx with exponential backoff and `Retry-After` support
//!
//! Example (no_run):
//! ```rust
//! # async fn demo() -> Result<(), kassa_http::HttpError> {
//! let client = kassa_http::HttpClient::new("https://suggestions.example.com/api/")?;
//! let got: serde_json::Value = client
//!     .post_json("suggest/address", &serde_json::json!({"query": "Tver"}),
//!                kassa_http::RequestOpts::default())
//!     .await?;
//! # Ok(()) }
//! ```
//!
//! Security: `Auth::Token` values are sanitized before becoming a header,
//! and log events only ever include the auth kind (token/bearer/none).

use reqwest::header::{HeaderValue, AUTHORIZATION, RETRY_AFTER};
use reqwest::{Client, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;
use tokio::time::sleep;

#[derive(Debug, Error)]
pub enum HttpError {
    #[error("invalid URL: {0}")]
    Url(String),
    #[error("request build failed: {0}")]
    Build(String),
    #[error("network error: {0}")]
    Network(String),
    #[error("decode error: {0}, body_snippet: {1}")]
    Decode(String, String),
    #[error("server returned error {status}: {message}")]
    Api { status: StatusCode, message: String },
}

/// Authentication strategies supported by the client.
///
/// The suggestion service authenticates with `Authorization: Token <key>`;
/// `Bearer` is kept for services using the conventional scheme.
#[derive(Clone, Debug)]
pub enum Auth<'a> {
    /// Authorization: Token <key>
    Token(&'a str),
    /// Authorization: Bearer <key>
    Bearer(&'a str),
    None,
}

impl Auth<'_> {
    fn kind(&self) -> &'static str {
        match self {
            Auth::Token(_) => "token",
            Auth::Bearer(_) => "bearer",
            Auth::None => "none",
        }
    }
}

/// Per-request tuning knobs.
#[derive(Clone, Debug, Default)]
pub struct RequestOpts<'a> {
    pub timeout: Option<Duration>,
    pub retries: Option<usize>,
    pub auth: Option<Auth<'a>>,
}

#[derive(Clone)]
pub struct HttpClient {
    base: Url,
    inner: Client,
    pub default_timeout: Duration,
    pub max_retries: usize,
}

impl HttpClient {
    /// Construct a client anchored to a base URL.
    ///
    /// ```no_run
    /// use kassa_http::{HttpClient, HttpError};
    /// use std::time::Duration;
    ///
    /// let client = HttpClient::new("https://suggestions.example.com/api/")?;
    /// assert_eq!(client.default_timeout, Duration::from_secs(5));
    /// assert_eq!(client.max_retries, 2);
    /// # Ok::<(), HttpError>(())
    /// ```
    pub fn new(base: &str) -> Result<Self, HttpError> {
        let base = Url::parse(base).map_err(|e| HttpError::Url(e.to_string()))?;
        let inner = Client::builder()
            .connect_timeout(Duration::from_secs(5))
            .build()
            .map_err(|e| HttpError::Build(e.to_string()))?;
        Ok(Self {
            base,
            inner,
            default_timeout: Duration::from_secs(5),
            max_retries: 2,
        })
    }

    /// Override the default timeout returned by [`HttpClient::new`].
    pub fn with_timeout(mut self, dur: Duration) -> Self {
        self.default_timeout = dur;
        self
    }

    /// Override the default retry budget returned by [`HttpClient::new`].
    pub fn with_retries(mut self, n: usize) -> Self {
        self.max_retries = n;
        self
    }

    /// POST a JSON body and decode a JSON response, retrying transient failures.
    pub async fn post_json<B, T>(
        &self,
        path: &str,
        body: &B,
        opts: RequestOpts<'_>,
    ) -> Result<T, HttpError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = self
            .base
            .join(path)
            .map_err(|e| HttpError::Url(e.to_string()))?;

        let auth_header = build_auth_header(opts.auth.as_ref())?;
        let auth_kind = opts.auth.as_ref().map(Auth::kind).unwrap_or("none");
        let timeout = opts.timeout.unwrap_or(self.default_timeout);
        let max_retries = opts.retries.unwrap_or(self.max_retries);

        let mut attempt = 0usize;
        loop {
            let mut rb = self.inner.post(url.clone()).timeout(timeout).json(body);
            if let Some(h) = &auth_header {
                rb = rb.header(AUTHORIZATION, h.clone());
            }

            tracing::debug!(
                attempt = attempt + 1,
                max_retries,
                host_path = %format!("{}{}", url.domain().unwrap_or("-"), url.path()),
                timeout_ms = timeout.as_millis() as u64,
                auth_kind,
                "http.request.start"
            );

            let t0 = std::time::Instant::now();
            let resp = match rb.send().await {
                Ok(resp) => resp,
                Err(err) => {
                    let message = err.to_string();
                    if attempt < max_retries {
                        attempt += 1;
                        let delay = backoff_delay(attempt);
                        tracing::warn!(
                            attempt,
                            max_retries,
                            backoff_ms = delay.as_millis() as u64,
                            message = %message,
                            "http.retrying.network"
                        );
                        sleep(delay).await;
                        continue;
                    }
                    return Err(HttpError::Network(message));
                }
            };

            let status = resp.status();
            let headers = resp.headers().clone();
            let bytes = match resp.bytes().await {
                Ok(bytes) => bytes,
                Err(err) => {
                    let message = err.to_string();
                    if attempt < max_retries {
                        attempt += 1;
                        let delay = backoff_delay(attempt);
                        tracing::warn!(
                            attempt,
                            max_retries,
                            backoff_ms = delay.as_millis() as u64,
                            message = %message,
                            "http.retrying.body"
                        );
                        sleep(delay).await;
                        continue;
                    }
                    return Err(HttpError::Network(message));
                }
            };

            let snippet = snip_body(&bytes);
            tracing::debug!(
                %status,
                duration_ms = t0.elapsed().as_millis() as u64,
                body_len = bytes.len(),
                "http.response"
            );

            if status.is_success() {
                return serde_json::from_slice::<T>(&bytes).map_err(|e| {
                    tracing::warn!(
                        serde_err = %e,
                        body_snippet = %snippet,
                        "http.response.decode_error"
                    );
                    HttpError::Decode(e.to_string(), snippet)
                });
            }

            let message = extract_error_message(&bytes, &snippet);
            let is_429 = status == StatusCode::TOO_MANY_REQUESTS;
            if (is_429 || status.is_server_error()) && attempt < max_retries {
                attempt += 1;
                let delay = match retry_after_delay_secs(&headers) {
                    Some(secs) => Duration::from_secs(secs),
                    None => {
                        let exp = backoff_delay(attempt);
                        if is_429 {
                            // default floor for 429 when no Retry-After is present
                            exp.max(Duration::from_millis(1100))
                        } else {
                            exp
                        }
                    }
                };
                tracing::warn!(
                    %status,
                    attempt,
                    max_retries,
                    backoff_ms = delay.as_millis() as u64,
                    message = %message,
                    "http.retrying"
                );
                sleep(delay).await;
                continue;
            }

            tracing::warn!(%status, message = %message, body_snippet = %snippet, "http.error");
            return Err(HttpError::Api { status, message });
        }
    }
}

fn backoff_delay(attempt: usize) -> Duration {
    Duration::from_millis(200u64.saturating_mul(1 << (attempt - 1)))
}

fn build_auth_header(auth: Option<&Auth<'_>>) -> Result<Option<HeaderValue>, HttpError> {
    let (scheme, key) = match auth {
        Some(Auth::Token(k)) => ("Token", k),
        Some(Auth::Bearer(k)) => ("Bearer", k),
        Some(Auth::None) | None => return Ok(None),
    };
    let key = sanitize_api_key(key)?;
    let value = HeaderValue::from_str(&format!("{scheme} {key}"))
        .map_err(|e| HttpError::Build(format!("invalid Authorization header: {e}")))?;
    Ok(Some(value))
}

fn extract_error_message(body: &[u8], fallback: &str) -> String {
    // Generic: {"message":"..."} or {"detail":"..."} or {"error":"..."}
    #[derive(Deserialize)]
    struct Msg {
        #[serde(default)]
        message: String,
        #[serde(default)]
        detail: String,
        #[serde(default)]
        error: String,
    }

    if let Ok(m) = serde_json::from_slice::<Msg>(body) {
        if !m.message.is_empty() {
            return m.message;
        }
        if !m.detail.is_empty() {
            return m.detail;
        }
        if !m.error.is_empty() {
            return m.error;
        }
    }
    fallback.to_string()
}

fn retry_after_delay_secs(h: &reqwest::header::HeaderMap) -> Option<u64> {
    h.get(RETRY_AFTER)
        .and_then(|v| v.to_str().ok())?
        .parse()
        .ok()
}

fn snip_body(body: &[u8]) -> String {
    let mut snip = String::from_utf8_lossy(body).to_string();
    if snip.len() > 500 {
        snip.truncate(500);
        snip.push_str("...");
    }
    snip
}

fn sanitize_api_key(raw: &str) -> Result<String, HttpError> {
    // 1) Trim outer spaces/quotes
    let mut s = raw
        .trim()
        .trim_matches(|c| c == '"' || c == '\'')
        .to_string();

    // 2) Remove *all* ASCII whitespace (spaces, tabs, newlines, carriage returns)
    s.retain(|ch| !ch.is_ascii_whitespace());

    // 3) Ensure ASCII and no control chars
    if !s.is_ascii() {
        return Err(HttpError::Build("API key contains non-ASCII bytes".into()));
    }
    if s.bytes().any(|b| b < 0x20 || b == 0x7F) {
        return Err(HttpError::Build(
            "API key contains control characters".into(),
        ));
    }

    Ok(s)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitize_strips_quotes_and_whitespace() {
        let key = sanitize_api_key("  \"abc def\n\"  ").unwrap();
        assert_eq!(key, "abcdef");
    }

    #[test]
    fn sanitize_rejects_non_ascii() {
        assert!(matches!(
            sanitize_api_key("ключ"),
            Err(HttpError::Build(_))
        ));
    }

    #[test]
    fn token_auth_uses_token_scheme() {
        let h = build_auth_header(Some(&Auth::Token("abc123"))).unwrap().unwrap();
        assert_eq!(h.to_str().unwrap(), "Token abc123");
    }

    #[test]
    fn absent_auth_yields_no_header() {
        assert!(build_auth_header(None).unwrap().is_none());
        assert!(build_auth_header(Some(&Auth::None)).unwrap().is_none());
    }

    #[test]
    fn error_message_prefers_structured_fields() {
        let body = br#"{"message":"bad token"}"#;
        assert_eq!(extract_error_message(body, "raw"), "bad token");
        let body = br#"{"detail":"missing query"}"#;
        assert_eq!(extract_error_message(body, "raw"), "missing query");
        assert_eq!(extract_error_message(b"<html>", "raw"), "raw");
    }

    #[test]
    fn long_bodies_are_snipped() {
        let body = vec![b'x'; 600];
        let snip = snip_body(&body);
        assert!(snip.ends_with("..."));
        assert_eq!(snip.len(), 503);
    }
}
