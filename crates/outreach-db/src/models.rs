/// Database row types — these map directly to SQLite rows.
/// Distinct from outreach-types API models to keep the DB layer independent.

pub struct CohortRow {
    pub id: String,
    pub phone: String,
    pub name: String,
    pub created_at: String,
}

pub struct PromoMessageRow {
    pub id: String,
    pub body: String,
    pub date_from: String,
    pub date_to: String,
    pub created_at: String,
}
