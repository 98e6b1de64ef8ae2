//! Database schema SQL.

/// Users, message log, and stored triage analyses.
pub const SCHEMA_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS users (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    phone_number TEXT UNIQUE NOT NULL,
    name TEXT,
    created_at INTEGER NOT NULL,
    last_active INTEGER NOT NULL,
    total_messages INTEGER NOT NULL DEFAULT 0
);

CREATE TABLE IF NOT EXISTS messages (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    phone_number TEXT NOT NULL,
    message_body TEXT NOT NULL,
    message_type TEXT NOT NULL,
    timestamp INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS analyses (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    phone_number TEXT NOT NULL,
    original_message TEXT NOT NULL,
    symptoms_json TEXT NOT NULL,
    severity TEXT NOT NULL,
    urgency TEXT NOT NULL,
    confidence REAL NOT NULL,
    recommendations_json TEXT NOT NULL,
    potential_conditions_json TEXT NOT NULL,
    is_emergency INTEGER NOT NULL DEFAULT 0,
    timestamp INTEGER NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_messages_phone ON messages(phone_number);
CREATE INDEX IF NOT EXISTS idx_messages_timestamp ON messages(timestamp);
CREATE INDEX IF NOT EXISTS idx_analyses_phone ON analyses(phone_number);
CREATE INDEX IF NOT EXISTS idx_analyses_timestamp ON analyses(timestamp);
"#;
