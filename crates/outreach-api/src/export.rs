use bytes::Bytes;
use chrono::NaiveDate;
use futures_util::Stream;
use tracing::warn;

use outreach_db::cohort::CohortFilter;
use outreach_db::models::CohortRow;

use crate::state::AppState;

/// Fixed export projection — the download contract, independent of the
/// full user column set.
pub const EXPORT_FIELDS: [&str; 3] = ["id", "phone", "name"];

/// Rows fetched from the store per batch while streaming.
const EXPORT_BATCH: u32 = 500;

/// Download filename: `promotion-users-<today>.csv`.
pub fn export_filename(today: NaiveDate) -> String {
    format!("promotion-users-{}.csv", today.format("%Y-%m-%d"))
}

/// Standard CSV quoting: a field containing a comma, quote, CR, or LF is
/// wrapped in quotes with inner quotes doubled. Everything else passes
/// through in its canonical string form.
fn csv_field(value: &str) -> String {
    if value.contains(['"', ',', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

fn csv_row(fields: &[&str]) -> String {
    let mut row = fields
        .iter()
        .map(|f| csv_field(f))
        .collect::<Vec<_>>()
        .join(",");
    row.push('\n');
    row
}

fn row_bytes(row: &CohortRow) -> Bytes {
    Bytes::from(csv_row(&[&row.id, &row.phone, &row.name]))
}

/// Lazily stream the cohort as CSV: header first, then rows read from the
/// store in fixed-size batches so a large cohort is never materialized in
/// memory as a whole.
pub fn cohort_csv_stream(
    state: AppState,
    filter: CohortFilter,
) -> impl Stream<Item = Result<Bytes, std::io::Error>> {
    async_stream::stream! {
        yield Ok(Bytes::from(csv_row(&EXPORT_FIELDS)));

        let mut offset: u64 = 0;
        loop {
            let db = state.clone();
            let batch = tokio::task::spawn_blocking(move || {
                db.db.cohort_page(&filter, EXPORT_BATCH, offset)
            })
            .await;

            let batch = match batch {
                Ok(Ok(batch)) => batch,
                Ok(Err(e)) => {
                    warn!("CSV export query failed at offset {}: {}", offset, e);
                    yield Err(std::io::Error::new(std::io::ErrorKind::Other, e));
                    return;
                }
                Err(e) => {
                    warn!("CSV export join error: {}", e);
                    yield Err(std::io::Error::new(std::io::ErrorKind::Other, e));
                    return;
                }
            };

            let done = (batch.len() as u32) < EXPORT_BATCH;
            for row in &batch {
                yield Ok(row_bytes(row));
            }
            if done {
                break;
            }
            offset += batch.len() as u64;
        }
    }
}
