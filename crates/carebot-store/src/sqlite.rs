//! SQLite-backed conversation and analysis store.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use carebot_core::{Error, Result};
use carebot_triage::{AnalysisRecorder, AnalysisResult, Severity, Urgency};
use parking_lot::Mutex;
use rusqlite::{params, Connection, OptionalExtension};
use tracing::{debug, info};

use crate::schema::SCHEMA_SQL;
use crate::types::*;

const DAY_MS: i64 = 24 * 60 * 60 * 1000;

/// SQLite store for users, their message log, and triage analyses.
pub struct SqliteStore {
    conn: Mutex<Connection>,
    db_path: PathBuf,
}

fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

fn db_err(e: rusqlite::Error) -> Error {
    Error::Database(e.to_string())
}

impl SqliteStore {
    /// Open or create the database file at `db_path`.
    pub fn open(db_path: impl AsRef<Path>) -> Result<Self> {
        let db_path = db_path.as_ref().to_path_buf();
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| Error::Storage(e.to_string()))?;
        }

        let conn = Connection::open(&db_path).map_err(db_err)?;
        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA synchronous = NORMAL;",
        )
        .map_err(db_err)?;

        let store = Self::with_connection(conn, db_path)?;
        let stats = store.get_statistics()?;
        info!(
            "SqliteStore initialized: {} users, {} messages, {} analyses, path={}",
            stats.total_users,
            stats.total_messages,
            stats.total_analyses,
            store.db_path.display()
        );
        Ok(store)
    }

    /// Throwaway in-memory database.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(db_err)?;
        Self::with_connection(conn, PathBuf::from(":memory:"))
    }

    fn with_connection(conn: Connection, db_path: PathBuf) -> Result<Self> {
        conn.execute_batch(SCHEMA_SQL)
            .map_err(|e| Error::Database(format!("Schema init failed: {}", e)))?;
        Ok(Self {
            conn: Mutex::new(conn),
            db_path,
        })
    }

    pub fn db_path(&self) -> &Path {
        &self.db_path
    }

    // ---------------------------------------------------------------
    // Users
    // ---------------------------------------------------------------

    /// Return the user's id, creating the row on first contact. Touches
    /// `last_active` for existing users.
    pub fn get_or_create_user(&self, phone_number: &str, name: Option<&str>) -> Result<i64> {
        let conn = self.conn.lock();
        Self::upsert_user(&conn, phone_number, name, now_millis())
    }

    fn upsert_user(
        conn: &Connection,
        phone_number: &str,
        name: Option<&str>,
        now: i64,
    ) -> Result<i64> {
        let existing: Option<i64> = conn
            .prepare_cached("SELECT id FROM users WHERE phone_number = ?1")
            .map_err(db_err)?
            .query_row(params![phone_number], |row| row.get(0))
            .optional()
            .map_err(db_err)?;

        match existing {
            Some(id) => {
                conn.execute(
                    "UPDATE users SET last_active = ?1 WHERE id = ?2",
                    params![now, id],
                )
                .map_err(db_err)?;
                Ok(id)
            }
            None => {
                let id = conn
                    .prepare_cached(
                        "INSERT INTO users (phone_number, name, created_at, last_active) \
                         VALUES (?1, ?2, ?3, ?3)",
                    )
                    .map_err(db_err)?
                    .insert(params![phone_number, name, now])
                    .map_err(db_err)?;
                info!("Created new user {}", id);
                Ok(id)
            }
        }
    }

    /// Set or replace the display name used in greetings.
    pub fn set_user_name(&self, phone_number: &str, name: &str) -> Result<bool> {
        let conn = self.conn.lock();
        let count = conn
            .execute(
                "UPDATE users SET name = ?1 WHERE phone_number = ?2",
                params![name, phone_number],
            )
            .map_err(db_err)?;
        Ok(count > 0)
    }

    pub fn get_user_info(&self, phone_number: &str) -> Result<Option<UserInfo>> {
        let conn = self.conn.lock();
        let row = conn
            .prepare_cached("SELECT * FROM users WHERE phone_number = ?1")
            .map_err(db_err)?
            .query_row(params![phone_number], |row| Ok(Self::row_to_user(row)))
            .optional()
            .map_err(db_err)?;
        Ok(row)
    }

    // ---------------------------------------------------------------
    // Messages
    // ---------------------------------------------------------------

    /// Log a message and bump the user's message counter.
    pub fn store_message(
        &self,
        phone_number: &str,
        message_body: &str,
        message_type: MessageType,
    ) -> Result<i64> {
        self.store_message_at(phone_number, message_body, message_type, now_millis())
    }

    /// Log a message with an explicit timestamp (Unix ms).
    pub fn store_message_at(
        &self,
        phone_number: &str,
        message_body: &str,
        message_type: MessageType,
        timestamp: i64,
    ) -> Result<i64> {
        let conn = self.conn.lock();
        let user_id = Self::upsert_user(&conn, phone_number, None, timestamp)?;

        let id = conn
            .prepare_cached(
                "INSERT INTO messages (phone_number, message_body, message_type, timestamp) \
                 VALUES (?1, ?2, ?3, ?4)",
            )
            .map_err(db_err)?
            .insert(params![phone_number, message_body, message_type.as_str(), timestamp])
            .map_err(db_err)?;

        conn.execute(
            "UPDATE users SET total_messages = total_messages + 1 WHERE id = ?1",
            params![user_id],
        )
        .map_err(db_err)?;

        debug!("Stored {} message {}", message_type.as_str(), id);
        Ok(id)
    }

    /// Most recent messages first.
    pub fn get_user_message_history(
        &self,
        phone_number: &str,
        limit: usize,
    ) -> Result<Vec<StoredMessage>> {
        let conn = self.conn.lock();
        let mut stmt = conn
            .prepare_cached(
                "SELECT * FROM messages WHERE phone_number = ?1 \
                 ORDER BY timestamp DESC, id DESC LIMIT ?2",
            )
            .map_err(db_err)?;
        let rows = stmt
            .query_map(params![phone_number, limit as i64], |row| {
                Ok(Self::row_to_message(row))
            })
            .map_err(db_err)?;
        Ok(rows.filter_map(|r| r.ok()).collect())
    }

    // ---------------------------------------------------------------
    // Analyses
    // ---------------------------------------------------------------

    /// Persist a triage analysis.
    pub fn store_analysis(
        &self,
        phone_number: &str,
        original_message: &str,
        analysis: &AnalysisResult,
    ) -> Result<i64> {
        self.store_analysis_at(phone_number, original_message, analysis, now_millis())
    }

    pub fn store_analysis_at(
        &self,
        phone_number: &str,
        original_message: &str,
        analysis: &AnalysisResult,
        timestamp: i64,
    ) -> Result<i64> {
        let symptoms = serde_json::to_string(&analysis.symptoms)?;
        let recommendations = serde_json::to_string(&analysis.recommendations)?;
        let conditions = serde_json::to_string(&analysis.potential_conditions)?;

        let conn = self.conn.lock();
        Self::upsert_user(&conn, phone_number, None, timestamp)?;

        let id = conn
            .prepare_cached(
                "INSERT INTO analyses (phone_number, original_message, symptoms_json, severity, \
                 urgency, confidence, recommendations_json, potential_conditions_json, \
                 is_emergency, timestamp) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
            )
            .map_err(db_err)?
            .insert(params![
                phone_number,
                original_message,
                symptoms,
                analysis.severity.as_str(),
                analysis.urgency.as_str(),
                analysis.confidence,
                recommendations,
                conditions,
                analysis.is_emergency,
                timestamp,
            ])
            .map_err(db_err)?;
        Ok(id)
    }

    /// Most recent analyses first.
    pub fn get_user_analyses(&self, phone_number: &str, limit: usize) -> Result<Vec<StoredAnalysis>> {
        let conn = self.conn.lock();
        let mut stmt = conn
            .prepare_cached(
                "SELECT * FROM analyses WHERE phone_number = ?1 \
                 ORDER BY timestamp DESC, id DESC LIMIT ?2",
            )
            .map_err(db_err)?;
        let rows = stmt
            .query_map(params![phone_number, limit as i64], |row| {
                Ok(Self::row_to_analysis(row))
            })
            .map_err(db_err)?;
        Ok(rows.filter_map(|r| r.ok()).collect())
    }

    // ---------------------------------------------------------------
    // Statistics & retention
    // ---------------------------------------------------------------

    pub fn get_statistics(&self) -> Result<StoreStats> {
        let conn = self.conn.lock();
        let count = |sql: &str| -> Result<i64> {
            conn.query_row(sql, [], |row| row.get(0)).map_err(db_err)
        };

        let total_users = count("SELECT COUNT(*) FROM users")?;
        let total_messages = count("SELECT COUNT(*) FROM messages")?;
        let total_analyses = count("SELECT COUNT(*) FROM analyses")?;
        let emergency_count = count("SELECT COUNT(*) FROM analyses WHERE is_emergency = 1")?;

        let week_ago = now_millis() - 7 * DAY_MS;
        let active_users_7d: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM users WHERE last_active >= ?1",
                params![week_ago],
                |row| row.get(0),
            )
            .map_err(db_err)?;

        let severity_distribution = Self::distribution(&conn, "severity")?;
        let urgency_distribution = Self::distribution(&conn, "urgency")?;
        drop(conn);

        let db_size = std::fs::metadata(&self.db_path)
            .map(|m| m.len())
            .unwrap_or(0);

        Ok(StoreStats {
            total_users,
            total_messages,
            total_analyses,
            active_users_7d,
            emergency_count,
            severity_distribution,
            urgency_distribution,
            db_path: self.db_path.to_string_lossy().to_string(),
            db_size_mb: db_size as f64 / (1024.0 * 1024.0),
            generated_at: chrono::Utc::now().to_rfc3339(),
        })
    }

    fn distribution(conn: &Connection, column: &str) -> Result<BTreeMap<String, i64>> {
        let sql = format!(
            "SELECT {0}, COUNT(*) FROM analyses GROUP BY {0}",
            column
        );
        let mut stmt = conn.prepare(&sql).map_err(db_err)?;
        let rows = stmt
            .query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?)))
            .map_err(db_err)?;
        Ok(rows.filter_map(|r| r.ok()).collect())
    }

    /// Delete messages and analyses older than `days`.
    pub fn cleanup_old_data(&self, days: u32) -> Result<CleanupReport> {
        self.cleanup_before(now_millis() - i64::from(days) * DAY_MS)
    }

    /// Delete messages and analyses with a timestamp before `cutoff` (Unix ms).
    pub fn cleanup_before(&self, cutoff: i64) -> Result<CleanupReport> {
        let conn = self.conn.lock();
        let messages_deleted = conn
            .execute("DELETE FROM messages WHERE timestamp < ?1", params![cutoff])
            .map_err(db_err)?;
        let analyses_deleted = conn
            .execute("DELETE FROM analyses WHERE timestamp < ?1", params![cutoff])
            .map_err(db_err)?;

        info!(
            "Retention cleanup: {} messages, {} analyses removed",
            messages_deleted, analyses_deleted
        );
        Ok(CleanupReport {
            messages_deleted,
            analyses_deleted,
        })
    }

    // ---------------------------------------------------------------
    // Data subject requests
    // ---------------------------------------------------------------

    /// Everything stored for one user, or `None` for an unknown number.
    pub fn export_user_data(&self, phone_number: &str) -> Result<Option<UserExport>> {
        let Some(user_info) = self.get_user_info(phone_number)? else {
            return Ok(None);
        };
        let messages = self.get_user_message_history(phone_number, 1000)?;
        let analyses = self.get_user_analyses(phone_number, 100)?;

        Ok(Some(UserExport {
            user_info,
            messages,
            analyses,
            exported_at: chrono::Utc::now().to_rfc3339(),
        }))
    }

    /// Remove a user and all their rows in one transaction. Returns whether
    /// the user existed.
    pub fn delete_user_data(&self, phone_number: &str) -> Result<bool> {
        let mut conn = self.conn.lock();
        let tx = conn.transaction().map_err(db_err)?;
        tx.execute("DELETE FROM messages WHERE phone_number = ?1", params![phone_number])
            .map_err(db_err)?;
        tx.execute("DELETE FROM analyses WHERE phone_number = ?1", params![phone_number])
            .map_err(db_err)?;
        let users = tx
            .execute("DELETE FROM users WHERE phone_number = ?1", params![phone_number])
            .map_err(db_err)?;
        tx.commit().map_err(db_err)?;

        if users > 0 {
            info!("Deleted all data for user");
        }
        Ok(users > 0)
    }

    // ---------------------------------------------------------------
    // Row mapping
    // ---------------------------------------------------------------

    fn row_to_user(row: &rusqlite::Row<'_>) -> UserInfo {
        UserInfo {
            id: row.get("id").unwrap_or(0),
            phone_number: row.get("phone_number").unwrap_or_default(),
            name: row.get("name").ok().flatten(),
            created_at: row.get("created_at").unwrap_or(0),
            last_active: row.get("last_active").unwrap_or(0),
            total_messages: row.get("total_messages").unwrap_or(0),
        }
    }

    fn row_to_message(row: &rusqlite::Row<'_>) -> StoredMessage {
        let kind: String = row.get("message_type").unwrap_or_default();
        StoredMessage {
            id: row.get("id").unwrap_or(0),
            phone_number: row.get("phone_number").unwrap_or_default(),
            message_body: row.get("message_body").unwrap_or_default(),
            message_type: MessageType::parse(&kind).unwrap_or(MessageType::Incoming),
            timestamp: row.get("timestamp").unwrap_or(0),
        }
    }

    fn row_to_analysis(row: &rusqlite::Row<'_>) -> StoredAnalysis {
        let json_list = |column: &str| -> Vec<String> {
            row.get::<_, String>(column)
                .ok()
                .and_then(|s| serde_json::from_str(&s).ok())
                .unwrap_or_default()
        };
        let severity: String = row.get("severity").unwrap_or_default();
        let urgency: String = row.get("urgency").unwrap_or_default();

        StoredAnalysis {
            id: row.get("id").unwrap_or(0),
            phone_number: row.get("phone_number").unwrap_or_default(),
            original_message: row.get("original_message").unwrap_or_default(),
            analysis: AnalysisResult {
                symptoms: json_list("symptoms_json"),
                severity: severity.parse().unwrap_or(Severity::Mild),
                urgency: urgency.parse().unwrap_or(Urgency::Low),
                confidence: row.get("confidence").unwrap_or(0.0),
                recommendations: json_list("recommendations_json"),
                potential_conditions: json_list("potential_conditions_json"),
                is_emergency: row.get("is_emergency").unwrap_or(false),
            },
            timestamp: row.get("timestamp").unwrap_or(0),
        }
    }
}

impl AnalysisRecorder for SqliteStore {
    fn record_analysis(
        &self,
        user_key: &str,
        original_message: &str,
        analysis: &AnalysisResult,
    ) -> Result<()> {
        self.store_analysis(user_key, original_message, analysis)
            .map(|_| ())
    }
}
