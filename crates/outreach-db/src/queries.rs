use crate::Database;
use crate::cohort::{COHORT_FROM, COHORT_ORDER, CohortFilter};
use crate::models::{CohortRow, PromoMessageRow};
use anyhow::Result;
use rusqlite::{Connection, OptionalExtension};

impl Database {
    // -- Promo messages --

    pub fn insert_promo_message(
        &self,
        id: &str,
        body: &str,
        date_from: &str,
        date_to: &str,
    ) -> Result<()> {
        self.with_conn_mut(|conn| {
            conn.execute(
                "INSERT INTO promo_messages (id, body, date_from, date_to) VALUES (?1, ?2, ?3, ?4)",
                rusqlite::params![id, body, date_from, date_to],
            )?;
            Ok(())
        })
    }

    pub fn get_promo_message(&self, id: &str) -> Result<Option<PromoMessageRow>> {
        self.with_conn(|conn| query_promo_message(conn, id))
    }

    /// Saved messages, newest first.
    pub fn list_promo_messages(&self, limit: u32) -> Result<Vec<PromoMessageRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, body, date_from, date_to, created_at
                 FROM promo_messages
                 ORDER BY created_at DESC, id DESC
                 LIMIT ?1",
            )?;

            let rows = stmt
                .query_map([limit], promo_message_from_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;

            Ok(rows)
        })
    }

    // -- Cohort --

    /// One page of the cohort in cohort order.
    pub fn cohort_page(
        &self,
        filter: &CohortFilter,
        limit: u32,
        offset: u64,
    ) -> Result<Vec<CohortRow>> {
        let Some((from, to)) = filter.bounds() else {
            return Ok(Vec::new());
        };

        self.with_conn(|conn| query_cohort_page(conn, &from, &to, limit, offset))
    }

    /// Total cohort size, for pagination.
    pub fn cohort_count(&self, filter: &CohortFilter) -> Result<u64> {
        let Some((from, to)) = filter.bounds() else {
            return Ok(0);
        };

        self.with_conn(|conn| {
            let sql = format!("SELECT COUNT(*) FROM (SELECT u.id{COHORT_FROM})");
            let count: i64 =
                conn.query_row(&sql, rusqlite::params![from, to], |r| r.get(0))?;
            Ok(count as u64)
        })
    }

    /// Recipient phone numbers, one per cohort member, in cohort order.
    pub fn cohort_phones(&self, filter: &CohortFilter) -> Result<Vec<String>> {
        let Some((from, to)) = filter.bounds() else {
            return Ok(Vec::new());
        };

        self.with_conn(|conn| {
            let sql = format!("SELECT u.phone{COHORT_FROM}{COHORT_ORDER}");
            let mut stmt = conn.prepare(&sql)?;

            let phones = stmt
                .query_map(rusqlite::params![from, to], |row| row.get(0))?
                .collect::<std::result::Result<Vec<String>, _>>()?;

            Ok(phones)
        })
    }
}

fn query_cohort_page(
    conn: &Connection,
    from: &str,
    to: &str,
    limit: u32,
    offset: u64,
) -> Result<Vec<CohortRow>> {
    let sql = format!(
        "SELECT u.id, u.phone, u.name, u.created_at{COHORT_FROM}{COHORT_ORDER} LIMIT ?3 OFFSET ?4"
    );
    let mut stmt = conn.prepare(&sql)?;

    let rows = stmt
        .query_map(
            rusqlite::params![from, to, limit, offset as i64],
            |row| {
                Ok(CohortRow {
                    id: row.get(0)?,
                    phone: row.get(1)?,
                    name: row.get(2)?,
                    created_at: row.get(3)?,
                })
            },
        )?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    Ok(rows)
}

fn query_promo_message(conn: &Connection, id: &str) -> Result<Option<PromoMessageRow>> {
    let mut stmt = conn.prepare(
        "SELECT id, body, date_from, date_to, created_at FROM promo_messages WHERE id = ?1",
    )?;

    let row = stmt.query_row([id], promo_message_from_row).optional()?;

    Ok(row)
}

fn promo_message_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<PromoMessageRow> {
    Ok(PromoMessageRow {
        id: row.get(0)?,
        body: row.get(1)?,
        date_from: row.get(2)?,
        date_to: row.get(3)?,
        created_at: row.get(4)?,
    })
}
