use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A record owner's subject (patient). Root of authorization: every
/// document, observation, and share pack belongs to exactly one person,
/// and ownership checks compare the caller's principal to `owner_id`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Person {
    pub id: Uuid,
    pub owner_id: String,
    pub full_name: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
}
