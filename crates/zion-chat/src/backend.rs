//! Remote chat backends.
//!
//! Two endpoints receive user messages: a primary webhook and a backup REST
//! endpoint. Both answer with a JSON body carrying the reply text under one
//! of a few known field names.

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use zion_core::config::ChatConfig;
use zion_core::portal::PortalId;

use crate::error::ChatError;

/// Reply fields checked in order; the first non-empty string wins.
pub const REPLY_FIELDS: [&str; 3] = ["responseText", "message", "response"];

/// Context sent to the secondary endpoint when no portal is active.
pub const GENERAL_CONTEXT: &str = "general";

/// Where a dispatch attempt was delivered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DispatchTarget {
    Primary,
    Secondary,
    LocalFallback,
}

impl fmt::Display for DispatchTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DispatchTarget::Primary => write!(f, "primary"),
            DispatchTarget::Secondary => write!(f, "secondary"),
            DispatchTarget::LocalFallback => write!(f, "local_fallback"),
        }
    }
}

/// Context attached to a primary request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrimaryContext {
    /// Active portal, if any.
    pub module: Option<PortalId>,
    pub session_id: Uuid,
}

/// Body of a primary webhook request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrimaryRequest {
    pub message: String,
    pub user_id: String,
    pub platform: String,
    pub timestamp: DateTime<Utc>,
    pub context: PrimaryContext,
}

/// Body of a secondary endpoint request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SecondaryRequest {
    pub message: String,
    /// Active portal id, or `"general"`.
    pub context: String,
}

/// A request for one of the two remote endpoints.
#[derive(Debug, Clone, PartialEq)]
pub enum OutboundRequest {
    Primary(PrimaryRequest),
    Secondary(SecondaryRequest),
}

impl OutboundRequest {
    pub fn target(&self) -> DispatchTarget {
        match self {
            OutboundRequest::Primary(_) => DispatchTarget::Primary,
            OutboundRequest::Secondary(_) => DispatchTarget::Secondary,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            OutboundRequest::Primary(r) => &r.message,
            OutboundRequest::Secondary(r) => &r.message,
        }
    }
}

/// Delivers a request and returns the reply text.
#[async_trait]
pub trait ChatBackend: Send + Sync {
    /// Any failure (transport, status, unreadable body) is an error.
    async fn deliver(&self, request: &OutboundRequest) -> Result<String, ChatError>;
}

/// Extract the reply text from a response body.
///
/// Objects are searched for [`REPLY_FIELDS`]; an array is searched through its
/// first element (webhook runners often wrap the payload in a list).
pub fn extract_reply(body: &Value) -> Option<String> {
    let object = match body {
        Value::Array(items) => items.first()?.as_object()?,
        Value::Object(map) => map,
        _ => return None,
    };
    REPLY_FIELDS.iter().find_map(|field| {
        object
            .get(*field)
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    })
}

/// HTTP implementation of [`ChatBackend`].
#[derive(Debug, Clone)]
pub struct HttpBackend {
    client: Client,
    primary_url: String,
    secondary_url: String,
    timeout: Duration,
}

impl HttpBackend {
    pub fn new(
        primary_url: impl Into<String>,
        secondary_url: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, ChatError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ChatError::Setup(e.to_string()))?;
        Ok(Self {
            client,
            primary_url: primary_url.into(),
            secondary_url: secondary_url.into(),
            timeout,
        })
    }

    pub fn from_config(config: &ChatConfig) -> Result<Self, ChatError> {
        Self::new(
            config.primary_url.clone(),
            config.secondary_url.clone(),
            Duration::from_secs(config.request_timeout_secs),
        )
    }

    fn map_send_error(&self, err: reqwest::Error) -> ChatError {
        if err.is_timeout() {
            ChatError::Timeout(self.timeout.as_secs())
        } else {
            ChatError::Network(err.to_string())
        }
    }

    /// Only an undecodable body is a malformed reply; a stalled or cut
    /// transfer is a transport failure.
    fn map_body_error(&self, err: reqwest::Error) -> ChatError {
        if err.is_decode() && !err.is_timeout() {
            ChatError::MalformedReply(err.to_string())
        } else {
            self.map_send_error(err)
        }
    }
}

#[async_trait]
impl ChatBackend for HttpBackend {
    async fn deliver(&self, request: &OutboundRequest) -> Result<String, ChatError> {
        let builder = match request {
            OutboundRequest::Primary(body) => self.client.post(&self.primary_url).json(body),
            OutboundRequest::Secondary(body) => self.client.post(&self.secondary_url).json(body),
        };

        let response = builder
            .send()
            .await
            .map_err(|e| self.map_send_error(e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ChatError::Status(status.as_u16()));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| self.map_body_error(e))?;

        extract_reply(&body).ok_or_else(|| {
            ChatError::MalformedReply(format!(
                "none of {} present in reply",
                REPLY_FIELDS.join(", ")
            ))
        })
    }
}

// =============================================================================
// Tests
// =============================================================================
