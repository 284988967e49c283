//! Notification data models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Notification type enum
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationType {
    Lead,
    LeadAssigned,
    LeadStatus,
    Property,
    Review,
    Location,
    System,
    /// Any kind this client doesn't know about yet.
    #[serde(other)]
    Other,
}

impl NotificationType {
    pub const ALL: [NotificationType; 8] = [
        NotificationType::Lead,
        NotificationType::LeadAssigned,
        NotificationType::LeadStatus,
        NotificationType::Property,
        NotificationType::Review,
        NotificationType::Location,
        NotificationType::System,
        NotificationType::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationType::Lead => "lead",
            NotificationType::LeadAssigned => "lead_assigned",
            NotificationType::LeadStatus => "lead_status",
            NotificationType::Property => "property",
            NotificationType::Review => "review",
            NotificationType::Location => "location",
            NotificationType::System => "system",
            NotificationType::Other => "other",
        }
    }
}

impl fmt::Display for NotificationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NotificationType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lowered = s.trim().to_ascii_lowercase();
        NotificationType::ALL
            .iter()
            .find(|t| t.as_str() == lowered)
            .copied()
            .ok_or_else(|| format!("Unknown notification type: {}", s))
    }
}

/// A notification as served by the CRM backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub id: String,
    #[serde(rename = "type")]
    pub notification_type: NotificationType,
    pub title: String,
    pub message: String,
    #[serde(default)]
    pub is_read: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Filter resolved by the server query itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MetaFilter {
    #[default]
    All,
    Unread,
}

impl MetaFilter {
    pub fn unread_only(&self) -> bool {
        matches!(self, MetaFilter::Unread)
    }
}

/// User facing feed filter.
///
/// `All` and `Unread` select the server query, `Type` narrows the all-items
/// sequence on the client without another request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FeedFilter {
    #[default]
    All,
    Unread,
    Type(NotificationType),
}

impl FeedFilter {
    pub fn meta(&self) -> MetaFilter {
        match self {
            FeedFilter::Unread => MetaFilter::Unread,
            FeedFilter::All | FeedFilter::Type(_) => MetaFilter::All,
        }
    }
}

impl fmt::Display for FeedFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FeedFilter::All => f.write_str("all"),
            FeedFilter::Unread => f.write_str("unread"),
            FeedFilter::Type(t) => write!(f, "type:{}", t),
        }
    }
}

impl FromStr for FeedFilter {
    type Err = String;

    /// Accepts `all`, `unread`, `type:<kind>` or a bare kind name.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        match s.to_ascii_lowercase().as_str() {
            "all" => Ok(FeedFilter::All),
            "unread" => Ok(FeedFilter::Unread),
            other => {
                let kind = other.strip_prefix("type:").unwrap_or(other);
                kind.parse::<NotificationType>()
                    .map(FeedFilter::Type)
                    .map_err(|_| format!("Invalid filter: {}", s))
            }
        }
    }
}

/// Narrow already fetched items by type.
///
/// Meta filters are resolved by the server, so `All` and `Unread` return the
/// items as they are.
pub fn apply_type_filter(items: &[Notification], filter: FeedFilter) -> Vec<Notification> {
    match filter {
        FeedFilter::All | FeedFilter::Unread => items.to_vec(),
        FeedFilter::Type(kind) => items
            .iter()
            .filter(|n| n.notification_type == kind)
            .cloned()
            .collect(),
    }
}

#[cfg(test)]
pub(crate) fn test_notification(id: &str, kind: NotificationType) -> Notification {
    Notification {
        id: id.to_string(),
        notification_type: kind,
        title: format!("Title {}", id),
        message: format!("Message {}", id),
        is_read: false,
        link: None,
        created_at: DateTime::from_timestamp(1_700_000_000, 0).unwrap(),
    }
}
