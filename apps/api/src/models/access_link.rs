use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct AccessLinkRow {
    pub id: Uuid,
    pub consultant_id: Uuid,
    pub token: String,
    pub expires_at: DateTime<Utc>,
    pub created_by_admin_id: Uuid,
    pub is_used: bool,
    pub last_accessed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl AccessLinkRow {
    /// A link whose expiry equals the current instant is already expired.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn link_expiring_at(expires_at: DateTime<Utc>) -> AccessLinkRow {
        AccessLinkRow {
            id: Uuid::new_v4(),
            consultant_id: Uuid::new_v4(),
            token: "t".to_string(),
            expires_at,
            created_by_admin_id: Uuid::new_v4(),
            is_used: false,
            last_accessed_at: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_expiry_exactly_now_is_expired() {
        let now = Utc::now();
        assert!(link_expiring_at(now).is_expired(now));
    }

    #[test]
    fn test_expiry_one_microsecond_ahead_is_valid() {
        let now = Utc::now();
        assert!(!link_expiring_at(now + Duration::microseconds(1)).is_expired(now));
    }

    #[test]
    fn test_past_expiry_is_expired() {
        let now = Utc::now();
        assert!(link_expiring_at(now - Duration::hours(1)).is_expired(now));
    }
}
