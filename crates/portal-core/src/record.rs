use crate::shortcode::ShortCode;
use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// A shortened URL as persisted in the durable store.
///
/// Records are created once and never updated. `expire_at` is advisory: an
/// expired record stays in the store and is classified at read time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShortUrl {
    /// The public identifier.
    pub id: ShortCode,
    /// The target URL.
    pub url: String,
    /// When the record stops resolving.
    pub expire_at: Timestamp,
}

impl ShortUrl {
    /// Returns `true` once `now` is at or past `expire_at`.
    pub fn is_expired_at(&self, now: Timestamp) -> bool {
        now >= self.expire_at
    }

    /// Remaining validity at `now`, or `None` if the record has expired.
    pub fn remaining_at(&self, now: Timestamp) -> Option<Duration> {
        if self.is_expired_at(now) {
            return None;
        }
        Duration::try_from(self.expire_at.duration_since(now)).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jiff::SignedDuration;

    fn record(expire_at: Timestamp) -> ShortUrl {
        ShortUrl {
            id: ShortCode::new_unchecked("abc123"),
            url: "https://example.com".to_string(),
            expire_at,
        }
    }

    #[test]
    fn expiry_boundary_is_inclusive() {
        let now = Timestamp::from_second(1_000).unwrap();
        assert!(record(now).is_expired_at(now));
        assert!(record(now - SignedDuration::from_secs(1)).is_expired_at(now));
        assert!(!record(now + SignedDuration::from_secs(1)).is_expired_at(now));
    }

    #[test]
    fn remaining_validity() {
        let now = Timestamp::from_second(1_000).unwrap();
        let live = record(now + SignedDuration::from_secs(90));
        assert_eq!(live.remaining_at(now), Some(Duration::from_secs(90)));
        assert_eq!(record(now).remaining_at(now), None);
    }

    #[test]
    fn serializes_camel_case() {
        let json = serde_json::to_value(record(Timestamp::from_second(0).unwrap())).unwrap();
        assert_eq!(json["id"], "abc123");
        assert!(json.get("expireAt").is_some());
    }
}
