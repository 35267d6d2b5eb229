use std::sync::Arc;

use outreach_db::Database;
use outreach_queue::TaskQueue;

pub type AppState = Arc<AppStateInner>;

pub struct AppStateInner {
    pub db: Database,
    pub queue: Arc<dyn TaskQueue>,
}
