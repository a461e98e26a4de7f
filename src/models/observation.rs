use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A coded clinical value extracted from a document, e.g. a LOINC-coded
/// lab result. `source_doc_id` points back at the originating document.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Observation {
    pub id: Uuid,
    #[serde(skip_serializing)]
    pub person_id: Uuid,
    pub code: String,
    pub display: String,
    pub value_num: Option<f64>,
    pub unit: Option<String>,
    pub effective_at: Option<DateTime<Utc>>,
    pub ref_low: Option<f64>,
    pub ref_high: Option<f64>,
    pub source_doc_id: Option<Uuid>,
}
