/// Primary key of webs, spaces, entities, messages and feedback rows.
pub type DbId = uuid::Uuid;

/// Identifier of the owning user, as issued by the auth provider (e.g. `user_2abc`).
pub type UserId = String;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;

/// Generate a new time-ordered primary key.
pub fn new_id() -> DbId {
    uuid::Uuid::now_v7()
}
