use anyhow::Result;
use rusqlite::Connection;
use tracing::info;

pub fn run(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS schema_version (version INTEGER NOT NULL);",
    )?;

    let version: i64 = conn.query_row(
        "SELECT COALESCE(MAX(version), 0) FROM schema_version",
        [],
        |r| r.get(0),
    )?;

    if version < 1 {
        info!("Running migration v1 (initial schema)");
        conn.execute_batch(
            "
            -- Users are created by the registration flow; this service only
            -- reads them. published_ads_count is maintained by the publish
            -- flow alongside the ads rows.
            CREATE TABLE users (
                id                  TEXT PRIMARY KEY,
                phone               TEXT NOT NULL,
                name                TEXT NOT NULL,
                created_at          TEXT NOT NULL DEFAULT (datetime('now')),
                published_ads_count INTEGER NOT NULL DEFAULT 0
            );

            CREATE INDEX idx_users_created ON users(created_at);

            -- published_at is NULL until the ad goes live.
            CREATE TABLE ads (
                id           TEXT PRIMARY KEY,
                user_id      TEXT NOT NULL REFERENCES users(id),
                status       TEXT NOT NULL DEFAULT 'draft',
                published_at TEXT
            );

            CREATE INDEX idx_ads_user ON ads(user_id);
            CREATE INDEX idx_ads_published ON ads(published_at);

            CREATE TABLE promo_messages (
                id         TEXT PRIMARY KEY,
                body       TEXT NOT NULL,
                date_from  TEXT NOT NULL,
                date_to    TEXT NOT NULL,
                created_at TEXT NOT NULL DEFAULT (datetime('now'))
            );

            INSERT INTO schema_version (version) VALUES (1);
            ",
        )?;
    }

    info!("Database migrations complete");
    Ok(())
}
