use std::collections::HashMap;
use std::fmt;
use std::sync::Mutex;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};
use serde_json::Value;

// ============================================================================
// Transport collaborator — the narrow HTTP contract the engine consumes
// ============================================================================

/// The fixed response envelope of the backing services.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiResponse {
    pub code: i64,
    pub message: String,
    #[serde(default)]
    pub data: Value,
    #[serde(default)]
    pub timestamp: u64,
}

impl ApiResponse {
    /// A successful envelope around `data`, timestamped now.
    pub fn ok(data: Value) -> Self {
        Self {
            code: 0,
            message: "ok".to_string(),
            data,
            timestamp: now_ms(),
        }
    }

    /// Whether the business-level status is a success.
    pub fn is_success(&self) -> bool {
        self.code == 0 || self.code == 200
    }
}

#[derive(Debug)]
pub enum TransportError {
    /// Connection / timeout failure after all retry attempts.
    Network {
        url: String,
        attempts: u32,
        source: reqwest::Error,
    },

    /// The response body did not match the `ApiResponse` envelope.
    Decode { url: String, source: reqwest::Error },

    /// The envelope arrived but carried a failure status.
    BusinessStatus {
        url: String,
        code: i64,
        message: String,
    },

    /// The HTTP method string is not one the transport supports.
    UnsupportedMethod { method: String },
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransportError::Network {
                url,
                attempts,
                source,
            } => {
                write!(f, "request to {} failed after {} attempts: {}", url, attempts, source)
            }
            TransportError::Decode { url, source } => {
                write!(f, "response from {} is not a valid envelope: {}", url, source)
            }
            TransportError::BusinessStatus { url, code, message } => {
                write!(f, "{} returned business status {}: {}", url, code, message)
            }
            TransportError::UnsupportedMethod { method } => {
                write!(f, "unsupported HTTP method '{}'", method)
            }
        }
    }
}

impl std::error::Error for TransportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            TransportError::Network { source, .. } => Some(source),
            TransportError::Decode { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// The transport seam. The engine core never constructs HTTP machinery
/// itself; data loading and `api` event actions go through this trait.
pub trait Transport {
    fn request(
        &self,
        url: &str,
        method: &str,
        body: Option<&Value>,
    ) -> Result<ApiResponse, TransportError>;
}

// ============================================================================
// Blocking HTTP transport with bounded retry
// ============================================================================

pub struct HttpTransport {
    client: reqwest::blocking::Client,
    max_retries: u32,
}

impl HttpTransport {
    pub fn new() -> Self {
        Self::with_retries(2)
    }

    pub fn with_retries(max_retries: u32) -> Self {
        Self {
            client: reqwest::blocking::Client::new(),
            max_retries,
        }
    }

    fn send_once(
        &self,
        url: &str,
        method: &str,
        body: Option<&Value>,
    ) -> Result<Result<ApiResponse, TransportError>, reqwest::Error> {
        let builder = match method.to_ascii_uppercase().as_str() {
            "GET" => self.client.get(url),
            "POST" => self.client.post(url),
            "PUT" => self.client.put(url),
            "DELETE" => self.client.delete(url),
            other => {
                return Ok(Err(TransportError::UnsupportedMethod {
                    method: other.to_string(),
                }))
            }
        };

        let builder = match body {
            Some(body) => builder.json(body),
            None => builder,
        };

        let response = builder.send()?;
        match response.json::<ApiResponse>() {
            Ok(envelope) => Ok(Ok(envelope)),
            Err(e) => Ok(Err(TransportError::Decode {
                url: url.to_string(),
                source: e,
            })),
        }
    }
}

impl Default for HttpTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl Transport for HttpTransport {
    fn request(
        &self,
        url: &str,
        method: &str,
        body: Option<&Value>,
    ) -> Result<ApiResponse, TransportError> {
        let attempts = self.max_retries + 1;
        let mut last_network_error = None;

        // Only connection-level failures are retried; a decoded envelope
        // (success or business failure) is final.
        for _ in 0..attempts {
            match self.send_once(url, method, body) {
                Ok(Ok(envelope)) => {
                    if envelope.is_success() {
                        return Ok(envelope);
                    }
                    return Err(TransportError::BusinessStatus {
                        url: url.to_string(),
                        code: envelope.code,
                        message: envelope.message,
                    });
                }
                Ok(Err(terminal)) => return Err(terminal),
                Err(network) => last_network_error = Some(network),
            }
        }

        match last_network_error {
            Some(source) => Err(TransportError::Network {
                url: url.to_string(),
                attempts,
                source,
            }),
            // Unreachable with attempts >= 1; kept total instead of panicking.
            None => Err(TransportError::UnsupportedMethod {
                method: method.to_string(),
            }),
        }
    }
}

// ============================================================================
// Mock transport for tests and offline diagnostics
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct RecordedRequest {
    pub url: String,
    pub method: String,
    pub body: Option<Value>,
}

enum CannedResponse {
    Success(ApiResponse),
    Failure(String),
}

/// Serves canned responses by URL and records every request it sees.
#[derive(Default)]
pub struct MockTransport {
    responses: Mutex<HashMap<String, CannedResponse>>,
    requests: Mutex<Vec<RecordedRequest>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self {
            responses: Mutex::new(HashMap::new()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn respond_with(&self, url: &str, response: ApiResponse) {
        if let Ok(mut responses) = self.responses.lock() {
            responses.insert(url.to_string(), CannedResponse::Success(response));
        }
    }

    pub fn fail_with(&self, url: &str, message: &str) {
        if let Ok(mut responses) = self.responses.lock() {
            responses.insert(url.to_string(), CannedResponse::Failure(message.to_string()));
        }
    }

    /// Every request seen so far, in order.
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests
            .lock()
            .map(|requests| requests.clone())
            .unwrap_or_default()
    }
}

impl Transport for MockTransport {
    fn request(
        &self,
        url: &str,
        method: &str,
        body: Option<&Value>,
    ) -> Result<ApiResponse, TransportError> {
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(RecordedRequest {
                url: url.to_string(),
                method: method.to_string(),
                body: body.cloned(),
            });
        }

        let responses = self.responses.lock().ok();
        match responses.as_ref().and_then(|r| r.get(url)) {
            Some(CannedResponse::Success(response)) => Ok(response.clone()),
            Some(CannedResponse::Failure(message)) => Err(TransportError::BusinessStatus {
                url: url.to_string(),
                code: -1,
                message: message.clone(),
            }),
            None => Err(TransportError::BusinessStatus {
                url: url.to_string(),
                code: -1,
                message: "no canned response for url".to_string(),
            }),
        }
    }
}

/// Milliseconds since the Unix epoch; 0 if the clock is somehow before it.
pub fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
