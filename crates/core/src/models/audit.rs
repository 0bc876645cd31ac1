//! Admin session and audit log models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// An authenticated console session.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AdminSession {
    pub token: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub ip_address: Option<String>,
}

/// One audit log row.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AuditEntry {
    pub id: i64,
    pub action: String,
    pub details: Option<String>,
    pub ip_address: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn session_round_trip() {
        let s = AdminSession {
            token: "abc123".into(),
            created_at: Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap(),
            expires_at: Utc.with_ymd_and_hms(2025, 6, 2, 12, 0, 0).unwrap(),
            ip_address: Some("10.0.0.1".into()),
        };
        let json = serde_json::to_string(&s).unwrap();
        let back: AdminSession = serde_json::from_str(&json).unwrap();
        assert_eq!(back, s);
    }

    #[test]
    fn session_expiry_comparison() {
        let s = AdminSession {
            token: "t".into(),
            created_at: Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap(),
            expires_at: Utc.with_ymd_and_hms(2025, 6, 2, 12, 0, 0).unwrap(),
            ip_address: None,
        };
        assert!(s.expires_at > s.created_at);
    }
}
