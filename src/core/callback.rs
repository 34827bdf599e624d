//! Callback payloads and their delivery to the bridge server.
//!
//! `HttpTransport` is the production transport: one blocking POST per
//! callback, JSON body, fixed 30 second timeout. The `CallbackTransport` trait
//! is the seam the dispatcher talks to.

use crate::error::{Error, Result};
use crate::step::StepId;
use reqwest::blocking::Client;
use reqwest::header::CONTENT_TYPE;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

pub const CALLBACK_TIMEOUT: Duration = Duration::from_secs(30);
const VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CallbackStatus {
    Running,
    Completed,
    Failed,
}

impl CallbackStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CallbackStatus::Running => "running",
            CallbackStatus::Completed => "completed",
            CallbackStatus::Failed => "failed",
        }
    }

    pub fn parse(s: &str) -> Result<Self> {
        match s {
            "running" => Ok(CallbackStatus::Running),
            "completed" => Ok(CallbackStatus::Completed),
            "failed" => Ok(CallbackStatus::Failed),
            other => Err(Error::validation_invalid_argument(
                "status",
                format!("Unknown callback status '{}'", other),
                Some(other.to_string()),
                Some(vec![
                    "running".to_string(),
                    "completed".to_string(),
                    "failed".to_string(),
                ]),
            )),
        }
    }
}

impl fmt::Display for CallbackStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Body of `POST /api/v1/infra/callback`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallbackPayload {
    pub deployment_id: i64,
    pub step_name: StepId,
    pub status: CallbackStatus,
    pub message: String,
}

/// What the bridge server answered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CallbackResponse {
    pub status: u16,
    pub body: String,
}

impl CallbackResponse {
    /// The bridge server answers 200 on success; anything else is a rejection.
    pub fn is_accepted(&self) -> bool {
        self.status == 200
    }
}

/// Delivers a single callback. `Err` means the request never produced an HTTP
/// response (connect failure, timeout, unreadable body).
pub trait CallbackTransport {
    fn post(&self, url: &str, payload: &CallbackPayload) -> Result<CallbackResponse>;
}

/// Blocking HTTP transport backed by `reqwest`.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    pub fn new() -> Result<Self> {
        Self::with_timeout(CALLBACK_TIMEOUT)
    }

    pub fn with_timeout(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .user_agent(format!("bridge-callback/{}", VERSION))
            .timeout(timeout)
            .build()
            .map_err(|e| {
                Error::internal_io(e.to_string(), Some("create HTTP client".to_string()))
            })?;

        Ok(Self { client })
    }
}

impl CallbackTransport for HttpTransport {
    fn post(&self, url: &str, payload: &CallbackPayload) -> Result<CallbackResponse> {
        let response = self
            .client
            .post(url)
            .header(CONTENT_TYPE, "application/json")
            .json(payload)
            .send()
            .map_err(|e| Error::callback_transport(url, &e))?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .map_err(|e| Error::callback_transport(url, &e))?;

        Ok(CallbackResponse { status, body })
    }
}

/// Send one callback and turn a non-200 answer into an error.
///
/// The dispatcher does not use this: it logs rejections instead of failing.
/// Direct callers (the `send` command) want the failure surfaced.
pub fn deliver<T: CallbackTransport>(
    transport: &T,
    url: &str,
    payload: &CallbackPayload,
) -> Result<CallbackResponse> {
    let response = transport.post(url, payload)?;
    if !response.is_accepted() {
        return Err(Error::callback_rejected(url, response.status, response.body));
    }
    Ok(response)
}
