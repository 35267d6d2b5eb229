use axum::{
    Json,
    body::Body,
    extract::{Query, State},
    http::{HeaderMap, StatusCode, header},
    response::IntoResponse,
};
use chrono::{DateTime, NaiveDateTime, Utc};
use serde::Deserialize;
use tracing::{error, warn};
use uuid::Uuid;

use outreach_db::cohort::CohortFilter;
use outreach_db::models::{CohortRow, PromoMessageRow};
use outreach_types::api::{
    CohortMember, ErrorResponse, PromoDraft, PromoFormResponse, SubmitPromoRequest,
    SubmitPromoResponse,
};
use outreach_types::models::PromoMessage;

use crate::dispatch::{self, SubmitError};
use crate::export;
use crate::state::AppState;

/// Cohort preview page size.
const PER_PAGE: u32 = 25;

/// Saved messages returned by the index.
const INDEX_LIMIT: u32 = 100;

#[derive(Debug, Deserialize)]
pub struct CohortQuery {
    pub date_from: Option<String>,
    pub date_to: Option<String>,
    #[serde(default = "default_page")]
    pub page: u32,
}

fn default_page() -> u32 {
    1
}

/// GET /promo_messages/new — an empty draft plus a paginated preview of the
/// cohort the current bounds would select.
pub async fn new_form(
    State(state): State<AppState>,
    Query(query): Query<CohortQuery>,
) -> Result<impl IntoResponse, StatusCode> {
    let filter = CohortFilter::new(query.date_from.as_deref(), query.date_to.as_deref());
    let page = query.page.max(1);
    let offset = u64::from(page - 1) * u64::from(PER_PAGE);

    // Run blocking DB reads off the async runtime
    let db = state.clone();
    let (rows, total) = tokio::task::spawn_blocking(move || {
        let rows = db.db.cohort_page(&filter, PER_PAGE, offset)?;
        let total = db.db.cohort_count(&filter)?;
        Ok::<_, anyhow::Error>((rows, total))
    })
    .await
    .map_err(|e| {
        error!("spawn_blocking join error: {}", e);
        StatusCode::INTERNAL_SERVER_ERROR
    })?
    .map_err(|e| {
        error!("Cohort preview query failed: {}", e);
        StatusCode::INTERNAL_SERVER_ERROR
    })?;

    let users: Vec<CohortMember> = rows.into_iter().map(member_from_row).collect();

    Ok(Json(PromoFormResponse {
        message: PromoDraft {
            body: String::new(),
            date_from: query.date_from.unwrap_or_default(),
            date_to: query.date_to.unwrap_or_default(),
        },
        users,
        page,
        per_page: PER_PAGE,
        total,
    }))
}

/// POST /promo_messages — save the message and enqueue deliveries, or
/// redisplay the form errors.
pub async fn create(
    State(state): State<AppState>,
    Json(req): Json<SubmitPromoRequest>,
) -> Result<impl IntoResponse, StatusCode> {
    match dispatch::submit(state, req.body, req.date_from, req.date_to).await {
        Ok(submitted) => Ok((
            StatusCode::CREATED,
            Json(SubmitPromoResponse {
                message_id: submitted.message_id,
                notice: submitted.notice,
            }),
        )
            .into_response()),
        Err(SubmitError::Invalid(errors)) => Ok((
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(ErrorResponse {
                errors: errors.iter().map(ToString::to_string).collect(),
            }),
        )
            .into_response()),
        Err(SubmitError::Internal(e)) => {
            error!("Promo message submission failed: {}", e);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// GET /promo_messages — previously saved messages, newest first.
pub async fn index(State(state): State<AppState>) -> Result<impl IntoResponse, StatusCode> {
    let db = state.clone();
    let rows = tokio::task::spawn_blocking(move || db.db.list_promo_messages(INDEX_LIMIT))
        .await
        .map_err(|e| {
            error!("spawn_blocking join error: {}", e);
            StatusCode::INTERNAL_SERVER_ERROR
        })?
        .map_err(|e| {
            error!("Listing promo messages failed: {}", e);
            StatusCode::INTERNAL_SERVER_ERROR
        })?;

    let messages: Vec<PromoMessage> = rows.into_iter().map(message_from_row).collect();
    Ok(Json(messages))
}

/// GET /promo_messages/download_csv — stream the current cohort as a CSV
/// attachment named `promotion-users-<today>.csv`.
pub async fn download_csv(
    State(state): State<AppState>,
    Query(query): Query<CohortQuery>,
) -> Result<impl IntoResponse, StatusCode> {
    let filter = CohortFilter::new(query.date_from.as_deref(), query.date_to.as_deref());
    let filename = export::export_filename(Utc::now().date_naive());

    let body = Body::from_stream(export::cohort_csv_stream(state, filter));

    let mut headers = HeaderMap::new();
    headers.insert(header::CONTENT_TYPE, "text/csv; charset=utf-8".parse().unwrap());
    headers.insert(
        header::CONTENT_DISPOSITION,
        format!("attachment; filename=\"{}\"", filename).parse().unwrap(),
    );

    Ok((headers, body))
}

/// GET /health — liveness check (no auth).
pub async fn health() -> &'static str {
    "ok"
}

fn member_from_row(row: CohortRow) -> CohortMember {
    CohortMember {
        id: row.id.parse().unwrap_or_else(|e| {
            warn!("Corrupt user id '{}': {}", row.id, e);
            Uuid::default()
        }),
        created_at: parse_store_timestamp(&row.created_at).unwrap_or_else(|| {
            warn!("Corrupt created_at '{}' on user '{}'", row.created_at, row.id);
            DateTime::default()
        }),
        phone: row.phone,
        name: row.name,
    }
}

fn message_from_row(row: PromoMessageRow) -> PromoMessage {
    PromoMessage {
        id: row.id.parse().unwrap_or_else(|e| {
            warn!("Corrupt promo message id '{}': {}", row.id, e);
            Uuid::default()
        }),
        created_at: parse_store_timestamp(&row.created_at).unwrap_or_else(|| {
            warn!(
                "Corrupt created_at '{}' on promo message '{}'",
                row.created_at, row.id
            );
            DateTime::default()
        }),
        body: row.body,
        date_from: row.date_from,
        date_to: row.date_to,
    }
}

fn parse_store_timestamp(s: &str) -> Option<DateTime<Utc>> {
    s.parse::<DateTime<Utc>>().ok().or_else(|| {
        // SQLite stores timestamps as "YYYY-MM-DD HH:MM:SS" without timezone.
        // Parse as naive UTC and convert.
        NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S")
            .ok()
            .map(|ndt| ndt.and_utc())
    })
}
