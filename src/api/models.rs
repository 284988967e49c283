//! Wire envelopes of the CRM notification endpoints.

use serde::{Deserialize, Serialize};

use crate::notifications::{Notification, NotificationPage};

/// `{ "data": ... }` wrapper used by every read endpoint.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DataEnvelope<T> {
    pub data: T,
}

/// Body of `GET /notifications`.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct NotificationListData {
    #[serde(default)]
    pub notifications: Vec<Notification>,
    #[serde(default)]
    pub total: usize,
}

impl From<NotificationListData> for NotificationPage {
    fn from(data: NotificationListData) -> Self {
        NotificationPage {
            notifications: data.notifications,
            total: data.total,
        }
    }
}

/// Body of `GET /notifications/unread-count`.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct UnreadCountData {
    pub count: u64,
}

/// Generic success envelope returned by mutations.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SuccessEnvelope {
    #[serde(default = "default_success")]
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

fn default_success() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_envelope_deserialization() {
        let json = serde_json::json!({
            "data": {
                "notifications": [{
                    "id": "n-1",
                    "type": "lead_assigned",
                    "title": "Lead assigned",
                    "message": "John Doe was assigned to you",
                    "isRead": false,
                    "createdAt": "2024-05-10T08:30:00Z"
                }],
                "total": 12
            }
        });

        let envelope: DataEnvelope<NotificationListData> = serde_json::from_value(json).unwrap();
        let page: NotificationPage = envelope.data.into();

        assert_eq!(page.total, 12);
        assert_eq!(page.notifications.len(), 1);
        assert_eq!(page.notifications[0].id, "n-1");
    }

    #[test]
    fn test_empty_list_envelope() {
        let json = serde_json::json!({ "data": {} });
        let envelope: DataEnvelope<NotificationListData> = serde_json::from_value(json).unwrap();

        assert!(envelope.data.notifications.is_empty());
        assert_eq!(envelope.data.total, 0);
    }

    #[test]
    fn test_success_envelope_defaults_to_success() {
        let envelope: SuccessEnvelope = serde_json::from_str("{}").unwrap();
        assert!(envelope.success);
        assert!(envelope.message.is_none());

        let envelope: SuccessEnvelope =
            serde_json::from_str(r#"{"success": false, "message": "Not yours"}"#).unwrap();
        assert!(!envelope.success);
        assert_eq!(envelope.message.as_deref(), Some("Not yours"));
    }
}
