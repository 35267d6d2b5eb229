use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A saved promotional message. The audience is recomputed from the stored
/// date bounds whenever it is needed; recipient lists are never snapshotted.
///
/// The bounds are kept verbatim as submitted; a bound that fails to parse
/// selects the empty cohort rather than erroring.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PromoMessage {
    pub id: Uuid,
    pub body: String,
    pub date_from: String,
    pub date_to: String,
    pub created_at: DateTime<Utc>,
}
