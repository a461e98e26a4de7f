//! Share pack lifecycle: create, verify, view, revoke.
//!
//! Verification hands out a scoped cookie rather than a token: the viewer
//! route only trusts `sp_<id>=ok` and the cookie dies with the pack's
//! remaining lifetime. Every view and revocation leaves an audit event.
//! Responses carry only the fields selected for sharing, never whole vault
//! records.

use axum::extract::{Path, State};
use axum::http::header::{COOKIE, SET_COOKIE};
use axum::http::HeaderMap;
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::{Duration, Utc};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::db::repository::{
    get_document, get_observation, get_person, get_share_pack, increment_views,
    insert_share_event, insert_share_pack, insert_share_pack_item, items_for_pack,
    revoke_share_pack,
};
use crate::models::{
    Observation, PackItemRef, PackStatus, ShareEvent, ShareEventKind, SharePack, SharePackItem,
};
use crate::passcode::{hash_passcode, verify_passcode};

use super::super::error::ApiError;
use super::super::types::ApiContext;

const DEFAULT_EXPIRY_DAYS: i64 = 7;
const MIN_PASSCODE_LENGTH: usize = 4;

/// An item reference in a create request. Clients send either a bare
/// document-id string or an explicit object naming the referenced entity.
#[derive(Deserialize)]
#[serde(untagged)]
pub enum ItemSpec {
    Id(String),
    Object {
        #[serde(rename = "documentId")]
        document_id: Option<String>,
        #[serde(rename = "observationId")]
        observation_id: Option<String>,
    },
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePackRequest {
    #[serde(default)]
    pub person_id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub audience: String,
    #[serde(default)]
    pub items: Vec<ItemSpec>,
    pub expiry_days: Option<i64>,
    #[serde(default)]
    pub passcode: String,
}

/// Shared-document summary. Storage internals (hash, owner, upload time)
/// stay out of share-pack responses.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentSummary {
    pub id: Uuid,
    pub filename: String,
    pub storage_path: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePackResponse {
    pub share_id: Uuid,
    pub id: Uuid,
    pub title: String,
    pub audience: String,
    pub expires_at: String,
    pub documents: Vec<DocumentSummary>,
    pub observations: Vec<Observation>,
}

pub async fn create_pack(
    State(ctx): State<ApiContext>,
    Json(req): Json<CreatePackRequest>,
) -> Result<Json<CreatePackResponse>, ApiError> {
    if req.person_id.trim().is_empty()
        || req.title.trim().is_empty()
        || req.audience.trim().is_empty()
    {
        return Err(ApiError::BadRequest(
            "personId, title, audience required".into(),
        ));
    }
    if req.passcode.len() < MIN_PASSCODE_LENGTH {
        return Err(ApiError::BadRequest("passcode must be at least 4 characters".into()));
    }
    let person_id = Uuid::parse_str(req.person_id.trim())
        .map_err(|_| ApiError::BadRequest("personId is not a valid id".into()))?;

    let pepper = ctx.pepper.as_deref().ok_or(ApiError::PepperMissing)?;

    let items = normalize_items(&req.items)?;

    let conn = ctx.db.open()?;
    if get_person(&conn, &person_id)?.is_none() {
        return Err(ApiError::NotFound);
    }

    let now = Utc::now();
    let expiry_days = req.expiry_days.unwrap_or(DEFAULT_EXPIRY_DAYS).max(1);
    let pack = SharePack {
        id: Uuid::new_v4(),
        person_id,
        title: req.title.trim().to_string(),
        audience: req.audience.trim().to_string(),
        passcode_hash: hash_passcode(&req.passcode, pepper)?,
        expires_at: now + Duration::days(expiry_days),
        revoked_at: None,
        views_count: 0,
        created_at: now,
    };
    insert_share_pack(&conn, &pack)?;

    for (position, item) in items.iter().enumerate() {
        insert_share_pack_item(
            &conn,
            &SharePackItem {
                id: Uuid::new_v4(),
                pack_id: pack.id,
                position: position as i64,
                item: item.clone(),
            },
        )?;
    }

    let (documents, observations) = resolve_items(&conn, &items)?;

    tracing::info!(pack_id = %pack.id, %person_id, "share pack created");

    Ok(Json(CreatePackResponse {
        share_id: pack.id,
        id: pack.id,
        title: pack.title,
        audience: pack.audience,
        expires_at: pack.expires_at.to_rfc3339(),
        documents,
        observations,
    }))
}

fn normalize_items(items: &[ItemSpec]) -> Result<Vec<PackItemRef>, ApiError> {
    let mut refs = Vec::with_capacity(items.len());
    for item in items {
        let parsed = match item {
            ItemSpec::Id(id) => PackItemRef::Document(parse_item_id(id)?),
            ItemSpec::Object {
                document_id: Some(id),
                observation_id: None,
            } => PackItemRef::Document(parse_item_id(id)?),
            ItemSpec::Object {
                document_id: None,
                observation_id: Some(id),
            } => PackItemRef::Observation(parse_item_id(id)?),
            ItemSpec::Object { .. } => {
                return Err(ApiError::BadRequest(
                    "each item must name exactly one of documentId or observationId".into(),
                ))
            }
        };
        refs.push(parsed);
    }
    Ok(refs)
}

/// Resolve item references into shareable summaries, in item order.
fn resolve_items(
    conn: &Connection,
    items: &[PackItemRef],
) -> Result<(Vec<DocumentSummary>, Vec<Observation>), ApiError> {
    let mut documents = Vec::new();
    let mut observations = Vec::new();
    for item in items {
        match item {
            PackItemRef::Document(id) => {
                if let Some(doc) = get_document(conn, id)? {
                    documents.push(DocumentSummary {
                        id: doc.id,
                        filename: doc.filename,
                        storage_path: doc.storage_path,
                    });
                }
            }
            PackItemRef::Observation(id) => {
                if let Some(obs) = get_observation(conn, id)? {
                    observations.push(obs);
                }
            }
        }
    }
    Ok((documents, observations))
}

fn parse_item_id(id: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(id.trim()).map_err(|_| ApiError::BadRequest("item id is not a valid id".into()))
}

#[derive(Deserialize)]
pub struct VerifyRequest {
    #[serde(default)]
    pub passcode: String,
}

pub async fn verify_pack(
    State(ctx): State<ApiContext>,
    Path(id): Path<String>,
    Json(req): Json<VerifyRequest>,
) -> Result<Response, ApiError> {
    let pack_id = parse_pack_id(&id)?;
    let conn = ctx.db.open()?;
    let pack = get_share_pack(&conn, &pack_id)?.ok_or(ApiError::NotFound)?;

    let now = Utc::now();
    check_pack_status(&pack, now)?;

    let pepper = ctx.pepper.as_deref().ok_or(ApiError::PepperMissing)?;
    if !verify_passcode(&req.passcode, &pack.passcode_hash, pepper)? {
        return Err(ApiError::InvalidPasscode);
    }

    let cookie = format!(
        "sp_{}=ok; Path=/; Max-Age={}; HttpOnly; Secure; SameSite=Lax",
        pack.id,
        pack.remaining_seconds(now),
    );
    let mut response = Json(serde_json::json!({"ok": true})).into_response();
    response.headers_mut().insert(
        SET_COOKIE,
        cookie.parse().map_err(|_| ApiError::Internal("cookie encoding".into()))?,
    );
    Ok(response)
}

/// Viewer-facing observation summary: the displayed value only, not the
/// full clinical record.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ObservationSummary {
    pub id: Uuid,
    pub code: String,
    pub display: String,
    pub value_num: Option<f64>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewPackResponse {
    pub id: Uuid,
    pub title: String,
    pub audience: String,
    pub expires_at: String,
    pub documents: Vec<DocumentSummary>,
    pub observations: Vec<ObservationSummary>,
}

/// Viewer access. Pack existence and state are evaluated before the cookie,
/// so an unknown pack is 404 and a dead one 403 even for unverified
/// callers. Every read is audited with a peppered hash of the client
/// address.
pub async fn view_pack(
    State(ctx): State<ApiContext>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Result<Json<ViewPackResponse>, ApiError> {
    let pack_id = parse_pack_id(&id)?;
    let conn = ctx.db.open()?;
    let pack = get_share_pack(&conn, &pack_id)?.ok_or(ApiError::NotFound)?;
    check_pack_status(&pack, Utc::now())?;

    if !has_verify_cookie(&headers, &pack_id) {
        return Err(ApiError::Unauthorized);
    }

    let mut documents = Vec::new();
    let mut observations = Vec::new();
    for item in items_for_pack(&conn, &pack_id)? {
        match item.item {
            PackItemRef::Document(doc_id) => {
                if let Some(doc) = get_document(&conn, &doc_id)? {
                    documents.push(DocumentSummary {
                        id: doc.id,
                        filename: doc.filename,
                        storage_path: doc.storage_path,
                    });
                }
            }
            PackItemRef::Observation(obs_id) => {
                if let Some(obs) = get_observation(&conn, &obs_id)? {
                    observations.push(ObservationSummary {
                        id: obs.id,
                        code: obs.code,
                        display: obs.display,
                        value_num: obs.value_num,
                    });
                }
            }
        }
    }

    insert_share_event(
        &conn,
        &ShareEvent {
            id: Uuid::new_v4(),
            pack_id,
            kind: ShareEventKind::View,
            ip_hash: client_ip_hash(&headers, ctx.pepper.as_deref()),
            created_at: Utc::now(),
        },
    )?;
    increment_views(&conn, &pack_id)?;

    Ok(Json(ViewPackResponse {
        id: pack.id,
        title: pack.title,
        audience: pack.audience,
        expires_at: pack.expires_at.to_rfc3339(),
        documents,
        observations,
    }))
}

pub async fn revoke_pack(
    State(ctx): State<ApiContext>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Result<Json<serde_json::Value>, ApiError> {
    let caller = headers
        .get("x-user-id")
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty())
        .ok_or(ApiError::Unauthorized)?;

    let pack_id = parse_pack_id(&id)?;
    let conn = ctx.db.open()?;
    let pack = get_share_pack(&conn, &pack_id)?.ok_or(ApiError::NotFound)?;

    // Ownership runs through the pack's Person. A pack the caller does not
    // own answers 403, which confirms the id exists.
    let person = get_person(&conn, &pack.person_id)?.ok_or(ApiError::NotFound)?;
    if person.owner_id != caller {
        return Err(ApiError::Forbidden);
    }

    let now = Utc::now();
    revoke_share_pack(&conn, &pack_id, now)?;
    insert_share_event(
        &conn,
        &ShareEvent {
            id: Uuid::new_v4(),
            pack_id,
            kind: ShareEventKind::Revoke,
            ip_hash: client_ip_hash(&headers, ctx.pepper.as_deref()),
            created_at: now,
        },
    )?;

    tracing::info!(pack_id = %pack_id, "share pack revoked");

    Ok(Json(serde_json::json!({
        "ok": true,
        "revokedAt": now.to_rfc3339(),
    })))
}

fn parse_pack_id(id: &str) -> Result<Uuid, ApiError> {
    // A non-uuid path segment can't name any pack.
    Uuid::parse_str(id).map_err(|_| ApiError::NotFound)
}

fn check_pack_status(pack: &SharePack, now: chrono::DateTime<Utc>) -> Result<(), ApiError> {
    match pack.status(now) {
        PackStatus::Revoked => Err(ApiError::Revoked),
        PackStatus::Expired => Err(ApiError::Expired),
        PackStatus::Active => Ok(()),
    }
}

fn has_verify_cookie(headers: &HeaderMap, pack_id: &Uuid) -> bool {
    let wanted = format!("sp_{pack_id}=ok");
    headers
        .get(COOKIE)
        .and_then(|v| v.to_str().ok())
        .map(|cookies| cookies.split(';').any(|c| c.trim() == wanted))
        .unwrap_or(false)
}

/// Peppered hash of the client address for audit rows. Without a pepper the
/// raw address is not stored at all.
fn client_ip_hash(headers: &HeaderMap, pepper: Option<&str>) -> Option<String> {
    let pepper = pepper?;
    let ip = headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .unwrap_or("unknown");

    let mut hasher = Sha256::new();
    hasher.update(pepper.as_bytes());
    hasher.update(ip.as_bytes());
    Some(hex::encode(hasher.finalize()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn item_specs_normalize_all_three_forms() {
        let doc = Uuid::new_v4();
        let obs = Uuid::new_v4();
        let items = vec![
            ItemSpec::Id(doc.to_string()),
            ItemSpec::Object {
                document_id: Some(doc.to_string()),
                observation_id: None,
            },
            ItemSpec::Object {
                document_id: None,
                observation_id: Some(obs.to_string()),
            },
        ];
        let refs = normalize_items(&items).unwrap();
        assert_eq!(refs[0], PackItemRef::Document(doc));
        assert_eq!(refs[1], PackItemRef::Document(doc));
        assert_eq!(refs[2], PackItemRef::Observation(obs));
    }

    #[test]
    fn ambiguous_item_spec_is_rejected() {
        let both = ItemSpec::Object {
            document_id: Some(Uuid::new_v4().to_string()),
            observation_id: Some(Uuid::new_v4().to_string()),
        };
        assert!(normalize_items(&[both]).is_err());

        let neither = ItemSpec::Object {
            document_id: None,
            observation_id: None,
        };
        assert!(normalize_items(&[neither]).is_err());
    }

    #[test]
    fn cookie_match_is_exact_per_pack() {
        let pack_id = Uuid::new_v4();
        let other = Uuid::new_v4();
        let mut headers = HeaderMap::new();
        headers.insert(COOKIE, format!("sp_{other}=ok; sp_{pack_id}=ok").parse().unwrap());
        assert!(has_verify_cookie(&headers, &pack_id));

        let mut wrong = HeaderMap::new();
        wrong.insert(COOKIE, format!("sp_{other}=ok").parse().unwrap());
        assert!(!has_verify_cookie(&wrong, &pack_id));
    }

    #[test]
    fn ip_hash_requires_pepper() {
        let mut headers = HeaderMap::new();
        headers.insert("x-forwarded-for", "203.0.113.9".parse().unwrap());
        assert!(client_ip_hash(&headers, None).is_none());

        let hashed = client_ip_hash(&headers, Some("pep")).unwrap();
        assert_eq!(hashed.len(), 64);
        assert!(!hashed.contains("203.0.113.9"));
    }
}
