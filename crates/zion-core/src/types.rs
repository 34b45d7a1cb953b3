use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

use crate::money::Money;

// =============================================================================
// Enums
// =============================================================================

/// Author of a conversation message.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    User,
    Assistant,
}

/// Where a message came from.
///
/// Lets a front-end render a local fallback differently from a real reply.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageOrigin {
    /// Typed or spoken by the user.
    User,
    /// Reply from the primary webhook.
    Primary,
    /// Reply from the secondary REST endpoint.
    Secondary,
    /// Canned reply used when both endpoints failed.
    LocalFallback,
    /// Generated locally by Zion itself (welcome, portal notices, task receipts).
    System,
}

impl fmt::Display for MessageOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MessageOrigin::User => write!(f, "user"),
            MessageOrigin::Primary => write!(f, "primary"),
            MessageOrigin::Secondary => write!(f, "secondary"),
            MessageOrigin::LocalFallback => write!(f, "local_fallback"),
            MessageOrigin::System => write!(f, "system"),
        }
    }
}

/// Connection status of the data feed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionStatus {
    #[default]
    Connecting,
    Connected,
    Error,
}

// =============================================================================
// Conversation
// =============================================================================

/// One entry of the conversation log. Immutable once created.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationMessage {
    id: Uuid,
    role: Role,
    text: String,
    sent_at: DateTime<Utc>,
    origin: MessageOrigin,
}

impl ConversationMessage {
    /// A message authored by the user.
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            role: Role::User,
            text: text.into(),
            sent_at: Utc::now(),
            origin: MessageOrigin::User,
        }
    }

    /// A message authored by the assistant.
    pub fn assistant(text: impl Into<String>, origin: MessageOrigin) -> Self {
        Self {
            id: Uuid::new_v4(),
            role: Role::Assistant,
            text: text.into(),
            sent_at: Utc::now(),
            origin,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn sent_at(&self) -> DateTime<Utc> {
        self.sent_at
    }

    pub fn origin(&self) -> MessageOrigin {
        self.origin
    }
}

// =============================================================================
// Business data
// =============================================================================

/// A recurring subscription.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subscription {
    #[serde(default)]
    pub name: String,
    /// Monthly price as delivered by the source, e.g. `"15.99"`.
    #[serde(default, deserialize_with = "text_or_number")]
    pub amount: String,
}

impl Subscription {
    pub fn new(name: impl Into<String>, amount: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            amount: amount.into(),
        }
    }

    /// The parsed amount; unparsable amounts count as zero.
    pub fn monthly_cost(&self) -> Money {
        Money::parse_or_zero(&self.amount)
    }
}

/// Business data shown by the portals.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct DataSnapshot {
    #[serde(default)]
    pub subscriptions: Vec<Subscription>,
    /// Task records are opaque to Zion.
    #[serde(default)]
    pub tasks: Vec<serde_json::Value>,
    #[serde(default)]
    pub resets: Option<serde_json::Value>,
}

impl DataSnapshot {
    /// Sum of all subscription amounts.
    pub fn monthly_cost(&self) -> Money {
        self.subscriptions.iter().map(Subscription::monthly_cost).sum()
    }
}

/// A data snapshot together with the moment it was captured.
///
/// Serializes flat as `{subscriptions, tasks, resets, lastUpdated}`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CachedSnapshot {
    #[serde(flatten)]
    pub data: DataSnapshot,
    #[serde(rename = "lastUpdated")]
    pub captured_at: DateTime<Utc>,
}

fn text_or_number<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::String(s) => s,
        serde_json::Value::Null => String::new(),
        serde_json::Value::Number(n) => n.to_string(),
        other => other.to_string(),
    })
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_and_assistant_constructors() {
        let user = ConversationMessage::user("hello");
        assert_eq!(user.role(), Role::User);
        assert_eq!(user.origin(), MessageOrigin::User);
        assert_eq!(user.text(), "hello");

        let reply = ConversationMessage::assistant("hi", MessageOrigin::Secondary);
        assert_eq!(reply.role(), Role::Assistant);
        assert_eq!(reply.origin(), MessageOrigin::Secondary);
        assert_ne!(user.id(), reply.id());
    }

    #[test]
    fn test_origin_serialization() {
        let json = serde_json::to_string(&MessageOrigin::LocalFallback).unwrap();
        assert_eq!(json, "\"local_fallback\"");
        assert_eq!(MessageOrigin::LocalFallback.to_string(), "local_fallback");
    }

    #[test]
    fn test_subscription_amount_accepts_numbers() {
        let sub: Subscription = serde_json::from_str(r#"{"name":"Figma","amount":12}"#).unwrap();
        assert_eq!(sub.amount, "12");
        assert_eq!(sub.monthly_cost(), Money::from_cents(1200));

        let sub: Subscription = serde_json::from_str(r#"{"name":"Odd","amount":null}"#).unwrap();
        assert_eq!(sub.monthly_cost(), Money::ZERO);
    }

    #[test]
    fn test_snapshot_monthly_cost_ignores_bad_amounts() {
        let snapshot = DataSnapshot {
            subscriptions: vec![
                Subscription::new("Netflix", "15.99"),
                Subscription::new("Broken", "bad"),
            ],
            ..DataSnapshot::default()
        };
        assert_eq!(snapshot.monthly_cost().to_string(), "15.99");
    }

    #[test]
    fn test_cached_snapshot_wire_shape() {
        let cached = CachedSnapshot {
            data: DataSnapshot {
                subscriptions: vec![Subscription::new("Spotify", "9.99")],
                tasks: vec![serde_json::json!({"title": "ship"})],
                resets: None,
            },
            captured_at: DateTime::parse_from_rfc3339("2026-01-02T03:04:05Z")
                .unwrap()
                .with_timezone(&Utc),
        };
        let value = serde_json::to_value(&cached).unwrap();
        assert_eq!(value["subscriptions"][0]["name"], "Spotify");
        assert_eq!(value["tasks"][0]["title"], "ship");
        assert!(value["resets"].is_null());
        assert!(value["lastUpdated"].as_str().unwrap().starts_with("2026-01-02T03:04:05"));
    }

    #[test]
    fn test_cached_snapshot_reads_browser_record() {
        let raw = r#"{
            "subscriptions": [{"name": "Netflix", "amount": "15.99"}],
            "tasks": [],
            "resets": null,
            "lastUpdated": "2026-03-01T10:00:00.000Z"
        }"#;
        let cached: CachedSnapshot = serde_json::from_str(raw).unwrap();
        assert_eq!(cached.data.subscriptions.len(), 1);
        assert_eq!(cached.captured_at.to_rfc3339(), "2026-03-01T10:00:00+00:00");
    }
}
