use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// -- Promo submission --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SubmitPromoRequest {
    pub body: String,
    #[serde(default)]
    pub date_from: String,
    #[serde(default)]
    pub date_to: String,
}

#[derive(Debug, Serialize)]
pub struct SubmitPromoResponse {
    pub message_id: Uuid,
    pub notice: String,
}

/// Validation failures, redisplayed alongside the form.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub errors: Vec<String>,
}

// -- Form / cohort preview --

/// Empty draft echoed back by the form endpoint with the requested bounds.
#[derive(Debug, Serialize)]
pub struct PromoDraft {
    pub body: String,
    pub date_from: String,
    pub date_to: String,
}

/// One cohort member as shown in the preview and exported to CSV.
/// A fixed projection of the user record (id, phone, name), regardless of
/// what else the store keeps per user.
#[derive(Debug, Clone, Serialize)]
pub struct CohortMember {
    pub id: Uuid,
    pub phone: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct PromoFormResponse {
    pub message: PromoDraft,
    pub users: Vec<CohortMember>,
    pub page: u32,
    pub per_page: u32,
    pub total: u64,
}
