use tracing::{info, warn};
use uuid::Uuid;

use outreach_db::cohort::CohortFilter;
use outreach_queue::{Job, TaskQueue};

use crate::state::AppState;

/// Human-readable validation failures, surfaced to the form as-is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Body can't be blank")]
    BodyBlank,
}

#[derive(Debug, thiserror::Error)]
pub enum SubmitError {
    #[error("validation failed")]
    Invalid(Vec<ValidationError>),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

#[derive(Debug)]
pub struct Submitted {
    pub message_id: Uuid,
    pub notice: String,
}

/// Save the message, resolve the cohort from the same bounds, enqueue one
/// delivery task per recipient phone.
///
/// Validation failure stops the workflow before anything is persisted or
/// enqueued. Enqueuing is best-effort per recipient: a failed enqueue is
/// logged, the rest of the cohort still gets its attempt, and the message
/// save is never rolled back.
pub async fn submit(
    state: AppState,
    body: String,
    date_from: String,
    date_to: String,
) -> Result<Submitted, SubmitError> {
    let errors = validate(&body);
    if !errors.is_empty() {
        return Err(SubmitError::Invalid(errors));
    }

    let message_id = Uuid::new_v4();

    // Persist the message. The audience is not snapshotted with it; the
    // bounds are stored and the cohort recomputed below and on export.
    let db = state.clone();
    let mid = message_id.to_string();
    let from = date_from.clone();
    let to = date_to.clone();
    tokio::task::spawn_blocking(move || db.db.insert_promo_message(&mid, &body, &from, &to))
        .await
        .map_err(|e| anyhow::anyhow!("spawn_blocking join error: {}", e))??;

    let filter = CohortFilter::new(Some(date_from.as_str()), Some(date_to.as_str()));
    let db = state.clone();
    let phones = tokio::task::spawn_blocking(move || db.db.cohort_phones(&filter))
        .await
        .map_err(|e| anyhow::anyhow!("spawn_blocking join error: {}", e))??;

    let total = phones.len();
    let mut failed = 0usize;
    for phone in phones {
        if let Err(e) = state.queue.enqueue(Job::send_promo_message(phone)) {
            // Retries, if any, belong to the queue layer.
            failed += 1;
            warn!("Failed to enqueue delivery task: {}", e);
        }
    }

    info!(
        "Promo message {} saved, {}/{} deliveries enqueued",
        message_id,
        total - failed,
        total
    );

    Ok(Submitted {
        message_id,
        notice: "Messages Sent Successfully!".to_string(),
    })
}

fn validate(body: &str) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    if body.trim().is_empty() {
        errors.push(ValidationError::BodyBlank);
    }
    errors
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::AppStateInner;
    use outreach_db::Database;
    use outreach_queue::LocalQueue;
    use std::sync::Arc;
    use tokio::sync::mpsc::UnboundedReceiver;

    fn seed_user(db: &Database, id: &str, phone: &str, created_at: &str) {
        db.with_conn_mut(|conn| {
            conn.execute(
                "INSERT INTO users (id, phone, name, created_at) VALUES (?1, ?2, ?3, ?4)",
                (id, phone, format!("User {}", id), created_at),
            )?;
            Ok(())
        })
        .unwrap();
    }

    fn seed_published_ad(db: &Database, id: &str, user_id: &str, published_at: &str) {
        db.with_conn_mut(|conn| {
            conn.execute(
                "INSERT INTO ads (id, user_id, status, published_at)
                 VALUES (?1, ?2, 'published', ?3)",
                (id, user_id, published_at),
            )?;
            Ok(())
        })
        .unwrap();
    }

    fn test_state() -> (AppState, UnboundedReceiver<Job>) {
        let (queue, rx) = LocalQueue::new();
        let state = Arc::new(AppStateInner {
            db: Database::open_in_memory().unwrap(),
            queue: Arc::new(queue),
        });
        (state, rx)
    }

    fn message_count(state: &AppState) -> i64 {
        state
            .db
            .with_conn(|conn| {
                let n: i64 =
                    conn.query_row("SELECT COUNT(*) FROM promo_messages", [], |r| r.get(0))?;
                Ok(n)
            })
            .unwrap()
    }

    #[tokio::test]
    async fn blank_body_saves_nothing_and_enqueues_nothing() {
        let (state, mut rx) = test_state();
        seed_user(&state.db, "u1", "+111", "2024-01-02 00:00:00");
        seed_published_ad(&state.db, "a1", "u1", "2024-01-05 10:00:00");

        let result = submit(
            state.clone(),
            "   ".to_string(),
            "2024-01-01".to_string(),
            "2024-01-10".to_string(),
        )
        .await;

        match result {
            Err(SubmitError::Invalid(errors)) => {
                assert_eq!(errors, vec![ValidationError::BodyBlank]);
            }
            other => panic!("expected validation failure, got {:?}", other),
        }
        assert_eq!(message_count(&state), 0);
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn valid_submission_saves_once_and_enqueues_per_recipient() {
        let (state, mut rx) = test_state();
        seed_user(&state.db, "u1", "+111", "2024-01-02 00:00:00");
        seed_published_ad(&state.db, "a1", "u1", "2024-01-05 10:00:00");
        seed_user(&state.db, "u2", "+222", "2024-01-03 00:00:00");
        seed_published_ad(&state.db, "a2", "u2", "2024-01-06 10:00:00");

        let submitted = submit(
            state.clone(),
            "Weekend sale!".to_string(),
            "2024-01-01".to_string(),
            "2024-01-10".to_string(),
        )
        .await
        .unwrap();

        assert_eq!(submitted.notice, "Messages Sent Successfully!");
        assert_eq!(message_count(&state), 1);

        let row = state
            .db
            .get_promo_message(&submitted.message_id.to_string())
            .unwrap()
            .unwrap();
        assert_eq!(row.body, "Weekend sale!");

        // Newest user first, one job per phone
        let jobs: Vec<Job> = [rx.try_recv().unwrap(), rx.try_recv().unwrap()].into();
        assert!(rx.try_recv().is_err());
        let phones: Vec<&str> = jobs.iter().map(|j| j.phone.as_str()).collect();
        assert_eq!(phones, vec!["+222", "+111"]);
        assert!(jobs.iter().all(|j| j.task == "send_promo_message"));
    }

    #[tokio::test]
    async fn bad_dates_still_save_but_reach_nobody() {
        let (state, mut rx) = test_state();
        seed_user(&state.db, "u1", "+111", "2024-01-02 00:00:00");
        seed_published_ad(&state.db, "a1", "u1", "2024-01-05 10:00:00");

        let submitted = submit(
            state.clone(),
            "Hello".to_string(),
            "not-a-date".to_string(),
            "2024-01-10".to_string(),
        )
        .await
        .unwrap();

        assert_eq!(message_count(&state), 1);
        assert!(rx.try_recv().is_err());
        assert!(!submitted.notice.is_empty());
    }

    #[tokio::test]
    async fn enqueue_failures_do_not_fail_the_submission() {
        let (state, rx) = test_state();
        seed_user(&state.db, "u1", "+111", "2024-01-02 00:00:00");
        seed_published_ad(&state.db, "a1", "u1", "2024-01-05 10:00:00");
        drop(rx); // every enqueue now fails

        let submitted = submit(
            state.clone(),
            "Hello".to_string(),
            "2024-01-01".to_string(),
            "2024-01-10".to_string(),
        )
        .await
        .unwrap();

        assert_eq!(submitted.notice, "Messages Sent Successfully!");
        assert_eq!(message_count(&state), 1);
    }
}
