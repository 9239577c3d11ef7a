/// Row id (BIGSERIAL).
pub type DbId = i64;

/// Stored as TIMESTAMPTZ, handled in UTC. Local wall-clock time only
/// appears when rendering for an organisation's timezone.
pub type Timestamp = chrono::DateTime<chrono::Utc>;
