/// Row id of users and cards (`BIGSERIAL`).
pub type DbId = i64;

/// UTC instant, used for account and card timestamps and lockout bookkeeping.
pub type Timestamp = chrono::DateTime<chrono::Utc>;
