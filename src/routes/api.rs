// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Leaderboard API routes.

use crate::error::{AppError, Result};
use crate::models::{Gender, NewRecord, PublicEntry, RankedRecord, Record, Statistics};
use crate::services::ranking;
use crate::time_utils::{format_date, format_utc_rfc3339};
use crate::AppState;
use axum::{
    body::Bytes,
    extract::{DefaultBodyLimit, Multipart, Path, State},
    http::header,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;
use validator::Validate;

const MAX_NAME_CHARS: u64 = 50;
const MAX_DISTANCE: f64 = 1_000_000.0;

/// Leaderboard routes. `max_upload_bytes` bounds submission bodies.
pub fn routes(max_upload_bytes: usize) -> Router<Arc<AppState>> {
    Router::new()
        .route(
            "/api/submit",
            post(submit).layer(DefaultBodyLimit::max(max_upload_bytes)),
        )
        .route("/api/rankings", get(get_rankings))
        .route("/api/my-record/{name}", get(get_my_record))
        .route("/api/statistics", get(get_statistics))
        .route("/api/backup", get(get_backup))
}

// ─── Submission ──────────────────────────────────────────────

/// Uploaded proof photo.
struct UploadedPhoto {
    file_name: String,
    bytes: Bytes,
}

/// Multipart fields as received, before parsing.
#[derive(Default)]
struct RawSubmission {
    name: Option<String>,
    gender: Option<String>,
    bike: Option<String>,
    treadmill: Option<String>,
    rowing: Option<String>,
    photo: Option<UploadedPhoto>,
}

impl RawSubmission {
    async fn from_multipart(multipart: &mut Multipart) -> Result<Self> {
        let mut raw = Self::default();

        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| AppError::BadRequest(format!("Malformed multipart body: {}", e)))?
        {
            let field_name = field.name().unwrap_or_default().to_string();
            let read_err =
                |e: axum::extract::multipart::MultipartError| AppError::BadRequest(e.to_string());

            match field_name.as_str() {
                "photo" => {
                    let file_name = field.file_name().unwrap_or_default().to_string();
                    let bytes = field.bytes().await.map_err(read_err)?;
                    raw.photo = Some(UploadedPhoto { file_name, bytes });
                }
                "name" => raw.name = Some(field.text().await.map_err(read_err)?),
                "gender" => raw.gender = Some(field.text().await.map_err(read_err)?),
                "bike" => raw.bike = Some(field.text().await.map_err(read_err)?),
                "treadmill" => raw.treadmill = Some(field.text().await.map_err(read_err)?),
                "rowing" => raw.rowing = Some(field.text().await.map_err(read_err)?),
                other => tracing::debug!(field = other, "Ignoring unknown multipart field"),
            }
        }

        Ok(raw)
    }
}

/// Parsed submission, checked with `validator` before anything is stored.
#[derive(Validate)]
struct SubmitForm {
    #[validate(length(min = 1, max = MAX_NAME_CHARS))]
    name: String,
    gender: Gender,
    #[validate(range(min = 0.0, max = MAX_DISTANCE))]
    bike: f64,
    #[validate(range(min = 0.0, max = MAX_DISTANCE))]
    treadmill: f64,
    #[validate(range(min = 0.0, max = MAX_DISTANCE))]
    rowing: f64,
    photo: UploadedPhoto,
}

impl TryFrom<RawSubmission> for SubmitForm {
    type Error = AppError;

    fn try_from(raw: RawSubmission) -> Result<Self> {
        let name = required("name", raw.name)?.trim().to_string();
        let gender = required("gender", raw.gender)?
            .parse::<Gender>()
            .map_err(|e: crate::models::record::InvalidGender| {
                AppError::BadRequest(e.to_string())
            })?;
        let photo = raw
            .photo
            .ok_or_else(|| AppError::BadRequest("Missing required field: photo".to_string()))?;

        Ok(Self {
            name,
            gender,
            bike: parse_distance("bike", raw.bike)?,
            treadmill: parse_distance("treadmill", raw.treadmill)?,
            rowing: parse_distance("rowing", raw.rowing)?,
            photo,
        })
    }
}

fn required(field: &str, value: Option<String>) -> Result<String> {
    value
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| AppError::BadRequest(format!("Missing required field: {}", field)))
}

fn parse_distance(field: &str, value: Option<String>) -> Result<f64> {
    let raw = required(field, value)?;
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| AppError::BadRequest(format!("Invalid number for {}: {:?}", field, raw)))
}

/// Submission result.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct SubmitResponse {
    pub success: bool,
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub id: u64,
    pub rank: usize,
    pub total_participants: usize,
    pub gender_participants: usize,
    pub gender_label: String,
}

/// Accept a submission: validate, store the photo, append the record.
///
/// Nothing is written when validation fails. If the record cannot be
/// appended, the already-saved photo is removed again.
async fn submit(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<Json<SubmitResponse>> {
    let form = SubmitForm::try_from(RawSubmission::from_multipart(&mut multipart).await?)?;
    form.validate()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    let photo = state
        .photos
        .save(&form.photo.file_name, &form.photo.bytes)
        .await?;

    let new = NewRecord {
        name: form.name,
        gender: form.gender,
        bike: form.bike,
        treadmill: form.treadmill,
        rowing: form.rowing,
        photo: photo.clone(),
    };

    let (record, snapshot) = match state.store.append_with_snapshot(new).await {
        Ok(appended) => appended,
        Err(e) => {
            if let Err(cleanup) = state.photos.remove(&photo).await {
                tracing::warn!(error = %cleanup, photo = %photo, "Failed to remove orphaned photo");
            }
            return Err(e.into());
        }
    };

    let ranked = ranking::rank(&snapshot.records, record.gender);
    let rank = ranked
        .iter()
        .find(|entry| entry.record.id == record.id)
        .map(|entry| entry.rank)
        .ok_or_else(|| anyhow::anyhow!("Record {} missing from its own partition", record.id))?;

    Ok(Json(SubmitResponse {
        success: true,
        id: record.id,
        rank,
        total_participants: snapshot.len(),
        gender_participants: ranked.len(),
        gender_label: record.gender.label().to_string(),
    }))
}

// ─── Rankings ────────────────────────────────────────────────

/// Unredacted leaders per gender (`null` when a partition is empty).
#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct FirstPlace {
    pub male: Option<RankedRecord>,
    pub female: Option<RankedRecord>,
}

/// Public leaderboard.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct RankingsResponse {
    pub male: Vec<PublicEntry>,
    pub female: Vec<PublicEntry>,
    pub male_count: usize,
    pub female_count: usize,
    pub first_place: FirstPlace,
}

/// Redacted rankings for both genders plus the unredacted leaders.
async fn get_rankings(State(state): State<Arc<AppState>>) -> Json<RankingsResponse> {
    let snapshot = state.store.read_or_empty().await;

    let male = ranking::rank(&snapshot.records, Gender::Male);
    let female = ranking::rank(&snapshot.records, Gender::Female);

    tracing::debug!(
        male = male.len(),
        female = female.len(),
        "Serving rankings"
    );

    Json(RankingsResponse {
        male: ranking::public_view(&male),
        female: ranking::public_view(&female),
        male_count: male.len(),
        female_count: female.len(),
        first_place: FirstPlace {
            male: ranking::first_place(&male),
            female: ranking::first_place(&female),
        },
    })
}

// ─── Personal Lookup ─────────────────────────────────────────

/// Personal record lookup result.
#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct MyRecordResponse {
    pub rank: usize,
    pub record: Record,
}

/// Latest record for a name, ranked within its gender.
async fn get_my_record(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
) -> Result<Json<MyRecordResponse>> {
    let name = name.trim();
    if name.is_empty() {
        return Err(AppError::BadRequest("Name must not be empty".to_string()));
    }

    let snapshot = state.store.read_or_empty().await;
    let found = ranking::my_record(&snapshot.records, name)
        .ok_or_else(|| AppError::NotFound(format!("No record for '{}'", name)))?;

    Ok(Json(MyRecordResponse {
        rank: found.rank,
        record: found.record,
    }))
}

// ─── Statistics ──────────────────────────────────────────────

async fn get_statistics(State(state): State<Arc<AppState>>) -> Json<Statistics> {
    let snapshot = state.store.read_or_empty().await;
    Json(ranking::statistics(&snapshot.records))
}

// ─── Backup ──────────────────────────────────────────────────

/// Full unredacted dump for download.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct BackupResponse {
    #[cfg_attr(feature = "binding-generation", ts(type = "string"))]
    pub generated_at: DateTime<Utc>,
    pub total_records: usize,
    pub records: Vec<Record>,
}

/// Download every record as a JSON attachment.
///
/// Unlike the views, a backup never substitutes an empty store: an unreadable
/// document is an error here.
async fn get_backup(State(state): State<Arc<AppState>>) -> Result<impl IntoResponse> {
    let snapshot = state.store.read().await?;
    let generated_at = Utc::now();

    tracing::info!(
        records = snapshot.len(),
        generated_at = %format_utc_rfc3339(generated_at),
        "Backup generated"
    );

    let disposition = format!(
        "attachment; filename=\"leaderboard-backup-{}.json\"",
        format_date(generated_at)
    );

    Ok((
        [(header::CONTENT_DISPOSITION, disposition)],
        Json(BackupResponse {
            generated_at,
            total_records: snapshot.len(),
            records: snapshot.records,
        }),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(name: &str, gender: &str, bike: &str) -> RawSubmission {
        RawSubmission {
            name: Some(name.to_string()),
            gender: Some(gender.to_string()),
            bike: Some(bike.to_string()),
            treadmill: Some("2".to_string()),
            rowing: Some("3.5".to_string()),
            photo: Some(UploadedPhoto {
                file_name: "proof.jpg".to_string(),
                bytes: Bytes::from_static(b"jpeg"),
            }),
        }
    }

    #[test]
    fn test_form_parses_and_trims() {
        let form = SubmitForm::try_from(raw("  Park  ", "female", "10.25")).unwrap();

        assert_eq!(form.name, "Park");
        assert_eq!(form.gender, Gender::Female);
        assert_eq!(form.bike, 10.25);
        assert!(form.validate().is_ok());
    }

    #[test]
    fn test_form_rejects_missing_and_invalid_fields() {
        assert!(SubmitForm::try_from(raw("   ", "male", "1")).is_err());
        assert!(SubmitForm::try_from(raw("Kim", "other", "1")).is_err());
        assert!(SubmitForm::try_from(raw("Kim", "male", "abc")).is_err());
        assert!(SubmitForm::try_from(raw("Kim", "male", "NaN")).is_err());
        assert!(SubmitForm::try_from(raw("Kim", "male", "inf")).is_err());

        let mut no_photo = raw("Kim", "male", "1");
        no_photo.photo = None;
        assert!(matches!(
            SubmitForm::try_from(no_photo),
            Err(AppError::BadRequest(_))
        ));
    }

    #[test]
    fn test_form_validation_bounds() {
        let negative = SubmitForm::try_from(raw("Kim", "male", "-1")).unwrap();
        assert!(negative.validate().is_err());

        let huge = SubmitForm::try_from(raw("Kim", "male", "1000001")).unwrap();
        assert!(huge.validate().is_err());

        let long_name = SubmitForm::try_from(raw(&"a".repeat(51), "male", "1")).unwrap();
        assert!(long_name.validate().is_err());
    }
}
