//! Fixed response copy. These strings are part of the API contract:
//! clients and compliance tests match on them verbatim.

/// Refusal for prohibited clinical-action requests.
pub const REFUSAL_BANNED: &str =
    "I can't help with that. I don't provide diagnosis, dosing, emergency triage, or image interpretation.";

/// Escalation guidance for red-flag symptoms.
pub const ESCALATION_RED_FLAGS: &str =
    "If you have chest pain, trouble breathing, severe bleeding, or feel unsafe, seek emergency care immediately.";

/// Data-absence refusal: the question was allowed but nothing matched.
pub const NOT_IN_RECORDS: &str = "I don’t have that in your records.";

/// General product disclaimer appended to composed answers.
pub const MEDICAL_DISCLAIMER: &str =
    "EverMed explains your records to help you prepare. It doesn't diagnose or replace a clinician. If something feels urgent or unsafe, seek care immediately.";
