//! HTTP client for the Bitbucket Server REST API
//!
//! One request per call, basic authentication, a fixed JSON content type
//! and a 10 second timeout. Each verb has its own set of accepted status
//! codes; anything else becomes [`ApiError::Status`]. There are no retries.

use reqwest::{Client, Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

use super::traits::ApiError;
use super::types::ApiErrors;
use crate::core::Credentials;

/// Content type sent with every request body
pub const CONTENT_TYPE: &str = "application/json;charset=UTF-8";
/// Request timeout in seconds
const REQUEST_TIMEOUT_SECS: u64 = 10;

/// Status codes accepted for each HTTP verb.
pub fn accepted_statuses(method: &Method) -> &'static [u16] {
    match *method {
        Method::GET | Method::PUT => &[200],
        Method::POST => &[200, 201, 204, 409],
        Method::DELETE => &[202, 204],
        _ => &[200],
    }
}

/// Canonical reason phrase for a status code.
pub fn reason_phrase(status: u16) -> String {
    StatusCode::from_u16(status)
        .ok()
        .and_then(|s| s.canonical_reason())
        .unwrap_or("Unknown Status Code")
        .to_string()
}

/// Status code and decoded body of an accepted response
#[derive(Debug, Clone)]
pub struct ApiResponse {
    pub status: u16,
    /// JSON body; `Null` when empty, `String` when the body is not JSON
    pub body: Value,
}

impl ApiResponse {
    /// Deserialize the body into a typed schema.
    pub fn json<T: DeserializeOwned>(&self, url: &str) -> Result<T, ApiError> {
        serde_json::from_value(self.body.clone()).map_err(|e| ApiError::Decode {
            url: url.to_string(),
            reason: e.to_string(),
        })
    }

    pub fn is_conflict(&self) -> bool {
        self.status == StatusCode::CONFLICT.as_u16()
    }

    /// First server-provided error message, if any.
    pub fn error_message(&self) -> Option<String> {
        server_message(&self.body)
    }

    /// Body rendered as plain text.
    pub fn text(&self) -> String {
        match &self.body {
            Value::String(s) => s.trim().to_string(),
            Value::Null => String::new(),
            other => other.to_string(),
        }
    }
}

fn server_message(body: &Value) -> Option<String> {
    serde_json::from_value::<ApiErrors>(body.clone())
        .ok()?
        .errors
        .into_iter()
        .next()
        .map(|e| e.message)
}

fn decode_body(text: &str) -> Value {
    if text.trim().is_empty() {
        return Value::Null;
    }
    serde_json::from_str(text).unwrap_or_else(|_| Value::String(text.to_string()))
}

/// Authenticated REST client
#[derive(Clone)]
pub struct HttpClient {
    client: Client,
    username: String,
    token: String,
}

impl HttpClient {
    pub fn new(credentials: &Credentials) -> Result<Self, ApiError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| ApiError::Client(e.to_string()))?;

        Ok(Self {
            client,
            username: credentials.username.clone(),
            token: credentials.token.clone(),
        })
    }

    pub async fn get(&self, url: &str) -> Result<ApiResponse, ApiError> {
        self.send(Method::GET, url, None).await
    }

    pub async fn post(&self, url: &str, body: &impl Serialize) -> Result<ApiResponse, ApiError> {
        self.send(Method::POST, url, Some(to_value(url, body)?)).await
    }

    pub async fn put(&self, url: &str, body: &impl Serialize) -> Result<ApiResponse, ApiError> {
        self.send(Method::PUT, url, Some(to_value(url, body)?)).await
    }

    pub async fn delete(
        &self,
        url: &str,
        body: Option<&Value>,
    ) -> Result<ApiResponse, ApiError> {
        self.send(Method::DELETE, url, body.cloned()).await
    }

    async fn send(
        &self,
        method: Method,
        url: &str,
        body: Option<Value>,
    ) -> Result<ApiResponse, ApiError> {
        debug!(target: "bbcli::http", %method, url, "request");

        let mut request = self
            .client
            .request(method.clone(), url)
            .basic_auth(&self.username, Some(&self.token))
            .header(reqwest::header::CONTENT_TYPE, CONTENT_TYPE);

        if let Some(b) = body {
            request = request.body(b.to_string());
        }

        let response = request
            .send()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;

        let status = response.status().as_u16();
        let text = response
            .text()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;
        debug!(target: "bbcli::http", %method, url, status, "response");

        let body = decode_body(&text);

        if !accepted_statuses(&method).contains(&status) {
            return Err(ApiError::Status {
                status,
                reason: reason_phrase(status),
                message: server_message(&body),
            });
        }

        Ok(ApiResponse { status, body })
    }
}

fn to_value(url: &str, body: &impl Serialize) -> Result<Value, ApiError> {
    serde_json::to_value(body).map_err(|e| ApiError::Decode {
        url: url.to_string(),
        reason: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_client_builds_for_credentials() {
        let credentials = Credentials::new("https://bb.example.com", "jdoe", "t0ken").unwrap();
        let client = HttpClient::new(&credentials).unwrap();
        assert_eq!(client.username, "jdoe");
        assert_eq!(client.token, "t0ken");
    }

    #[test]
    fn test_accepted_statuses() {
        assert_eq!(accepted_statuses(&Method::GET), &[200]);
        assert_eq!(accepted_statuses(&Method::PUT), &[200]);
        assert!(accepted_statuses(&Method::POST).contains(&409));
        assert!(!accepted_statuses(&Method::POST).contains(&400));
        assert!(accepted_statuses(&Method::DELETE).contains(&202));
        assert!(!accepted_statuses(&Method::DELETE).contains(&200));
    }

    #[test]
    fn test_reason_phrase() {
        assert_eq!(reason_phrase(404), "Not Found");
        assert_eq!(reason_phrase(401), "Unauthorized");
        assert_eq!(reason_phrase(599), "Unknown Status Code");
    }

    #[test]
    fn test_decode_body() {
        assert_eq!(decode_body(""), Value::Null);
        assert_eq!(decode_body("{\"a\":1}"), json!({"a": 1}));
        assert_eq!(decode_body("jdoe"), Value::String("jdoe".to_string()));
    }

    #[test]
    fn test_error_message() {
        let response = ApiResponse {
            status: 409,
            body: json!({"errors": [{"message": "Only one pull request may be open"}]}),
        };
        assert!(response.is_conflict());
        assert_eq!(
            response.error_message().as_deref(),
            Some("Only one pull request may be open")
        );
    }
}
