use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::enums::ShareEventKind;

/// A named, time-boxed, passcode-protected bundle of record references.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SharePack {
    pub id: Uuid,
    pub person_id: Uuid,
    pub title: String,
    pub audience: String,
    pub passcode_hash: String,
    pub expires_at: DateTime<Utc>,
    pub revoked_at: Option<DateTime<Utc>>,
    pub views_count: i64,
    pub created_at: DateTime<Utc>,
}

/// Computed lifecycle state of a share pack. Revocation is explicit and
/// terminal; expiry is a time predicate, not a stored transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PackStatus {
    Active,
    Revoked,
    Expired,
}

impl SharePack {
    /// Revoked wins over expired: a pack that is both reports Revoked.
    pub fn status(&self, now: DateTime<Utc>) -> PackStatus {
        if self.revoked_at.is_some() {
            PackStatus::Revoked
        } else if self.expires_at < now {
            PackStatus::Expired
        } else {
            PackStatus::Active
        }
    }

    /// Whole seconds until expiry, floored at 1 so a cookie issued in the
    /// pack's final moments is still deliverable.
    pub fn remaining_seconds(&self, now: DateTime<Utc>) -> i64 {
        (self.expires_at - now).num_seconds().max(1)
    }
}

/// One entry in a pack: a document or an observation, never both.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PackItemRef {
    Document(Uuid),
    Observation(Uuid),
}

#[derive(Debug, Clone)]
pub struct SharePackItem {
    pub id: Uuid,
    pub pack_id: Uuid,
    pub position: i64,
    pub item: PackItemRef,
}

/// Append-only audit entry for pack access and revocation.
#[derive(Debug, Clone)]
pub struct ShareEvent {
    pub id: Uuid,
    pub pack_id: Uuid,
    pub kind: ShareEventKind,
    pub ip_hash: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn pack(expires_in: Duration, revoked: bool) -> SharePack {
        let now = Utc::now();
        SharePack {
            id: Uuid::new_v4(),
            person_id: Uuid::new_v4(),
            title: "Visit".into(),
            audience: "clinician".into(),
            passcode_hash: "deadbeef".into(),
            expires_at: now + expires_in,
            revoked_at: revoked.then_some(now),
            views_count: 0,
            created_at: now,
        }
    }

    #[test]
    fn fresh_pack_is_active() {
        let p = pack(Duration::days(7), false);
        assert_eq!(p.status(Utc::now()), PackStatus::Active);
    }

    #[test]
    fn past_expiry_is_expired() {
        let p = pack(Duration::seconds(-5), false);
        assert_eq!(p.status(Utc::now()), PackStatus::Expired);
    }

    #[test]
    fn revoked_wins_over_expired() {
        let p = pack(Duration::seconds(-5), true);
        assert_eq!(p.status(Utc::now()), PackStatus::Revoked);
    }

    #[test]
    fn remaining_seconds_floors_at_one() {
        let p = pack(Duration::milliseconds(10), false);
        assert_eq!(p.remaining_seconds(Utc::now()), 1);
        let p = pack(Duration::seconds(3600), false);
        assert!(p.remaining_seconds(Utc::now()) > 3500);
    }
}
