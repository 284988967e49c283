//! Seeded notifications for the test backend

use chrono::{DateTime, Duration, Utc};
use crm_notification_feed::{Notification, NotificationType};

use super::constants::SEEDED_TOTAL;

const KINDS: [NotificationType; 7] = [
    NotificationType::Lead,
    NotificationType::LeadAssigned,
    NotificationType::LeadStatus,
    NotificationType::Property,
    NotificationType::Review,
    NotificationType::Location,
    NotificationType::System,
];

/// Newest first, as the backend sorts them.
///
/// `notif-01` is the newest. Kinds cycle through the known types, every third
/// entry is already read and lead notifications link to their lead.
pub fn seed_notifications() -> Vec<Notification> {
    let newest = DateTime::<Utc>::from_timestamp(1_700_000_000, 0).unwrap_or_default();
    (0..SEEDED_TOTAL)
        .map(|i| {
            let kind = KINDS[i % KINDS.len()];
            let n = i + 1;
            Notification {
                id: format!("notif-{:02}", n),
                notification_type: kind,
                title: format!("{} update #{}", kind, n),
                message: format!("Something happened to record {}", n),
                is_read: n % 3 == 0,
                link: (kind == NotificationType::Lead).then(|| format!("/leads/{}", n)),
                created_at: newest - Duration::minutes(i as i64),
            }
        })
        .collect()
}
