// Database schema for the user store
diesel::table! {
    users (id) {
        id -> Integer,
        name -> Text,
        level -> Integer,
    }
}

pub const CREATE_USERS_TABLE: &str = "CREATE TABLE IF NOT EXISTS users (
    id INTEGER PRIMARY KEY AUTOINCREMENT NOT NULL,
    name TEXT NOT NULL,
    level INTEGER NOT NULL DEFAULT 1 CHECK (level BETWEEN 1 AND 99)
)";
