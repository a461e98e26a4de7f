pub mod document;
pub mod observation;
pub mod person;
pub mod share_pack;

pub use document::*;
pub use observation::*;
pub use person::*;
pub use share_pack::*;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::DatabaseError;

pub(crate) fn parse_uuid(field: &str, value: &str) -> Result<Uuid, DatabaseError> {
    Uuid::parse_str(value).map_err(|_| DatabaseError::InvalidValue {
        field: field.to_string(),
        value: value.to_string(),
    })
}

pub(crate) fn parse_ts(field: &str, value: &str) -> Result<DateTime<Utc>, DatabaseError> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| DatabaseError::InvalidValue {
            field: field.to_string(),
            value: value.to_string(),
        })
}

pub(crate) fn parse_opt_ts(
    field: &str,
    value: Option<String>,
) -> Result<Option<DateTime<Utc>>, DatabaseError> {
    value.map(|v| parse_ts(field, &v)).transpose()
}
