//! SQLite-backed store for observations, goals and the audit trail.

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use tracing::debug;

use super::{AuditStore, GoalStore, ObservationStore};
use crate::error::{CredoError, CredoResult};
use crate::types::{ActionExecutionRecord, Goal, GoalStatus, GoalType, Observation, OptimizationRecord};

/// Single-connection SQLite store implementing every storage trait.
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Open (or create) a store at the given path.
    pub fn new(path: impl AsRef<Path>) -> CredoResult<Self> {
        if let Some(parent) = path.as_ref().parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let conn = Connection::open(path.as_ref()).map_err(|e| CredoError::Database {
            message: format!("cannot open {}: {}", path.as_ref().display(), e),
            code: crate::error::ErrorCode::DbConnectionFailed,
            source: Some(Box::new(e)),
        })?;
        debug!(path = %path.as_ref().display(), "Opened SQLite store");

        let store = Self {
            conn: Mutex::new(conn),
        };
        store.init_schema()?;
        Ok(store)
    }

    /// Create an in-memory store (for testing)
    pub fn in_memory() -> CredoResult<Self> {
        let conn = Connection::open_in_memory()?;
        let store = Self {
            conn: Mutex::new(conn),
        };
        store.init_schema()?;
        Ok(store)
    }

    fn conn(&self) -> CredoResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| CredoError::database("store connection mutex poisoned"))
    }

    fn init_schema(&self) -> CredoResult<()> {
        let conn = self.conn()?;
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS beliefs (
                id TEXT PRIMARY KEY,
                content TEXT NOT NULL,
                source TEXT NOT NULL,
                confidence REAL NOT NULL DEFAULT 0.5,
                timestamp TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_beliefs_timestamp ON beliefs(timestamp);
            CREATE INDEX IF NOT EXISTS idx_beliefs_source ON beliefs(source);

            CREATE TABLE IF NOT EXISTS desires (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                type TEXT NOT NULL,
                target_value REAL NOT NULL,
                current_value REAL NOT NULL DEFAULT 0.0,
                priority REAL NOT NULL DEFAULT 0.5,
                weight REAL NOT NULL DEFAULT 1.0,
                status TEXT NOT NULL DEFAULT 'active',
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_desires_status ON desires(status);

            CREATE TABLE IF NOT EXISTS desire_optimizations (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                desires_snapshot TEXT NOT NULL,
                optimization_result TEXT NOT NULL,
                method TEXT NOT NULL,
                duration REAL NOT NULL,
                timestamp TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS action_executions (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                action_type TEXT NOT NULL,
                status TEXT NOT NULL,
                duration REAL NOT NULL,
                result_summary TEXT,
                timestamp TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_executions_time ON action_executions(timestamp);
        "#,
        )?;
        Ok(())
    }

    fn row_to_goal(row: &rusqlite::Row<'_>) -> CredoResult<Goal> {
        let status: String = row.get(7)?;
        let created_at: String = row.get(8)?;
        let updated_at: String = row.get(9)?;

        Ok(Goal {
            id: row.get(0)?,
            name: row.get(1)?,
            goal_type: GoalType::from(row.get::<_, String>(2)?),
            target_value: row.get(3)?,
            current_value: row.get(4)?,
            priority: row.get(5)?,
            weight: row.get(6)?,
            status: status
                .parse::<GoalStatus>()
                .map_err(|e| CredoError::parse(format!("invalid goal status '{}': {}", status, e)))?,
            created_at: parse_timestamp(&created_at)?,
            updated_at: parse_timestamp(&updated_at)?,
        })
    }
}

fn parse_timestamp(s: &str) -> CredoResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| CredoError::timestamp(format!("'{}': {}", s, e)))
}

const GOAL_COLUMNS: &str = "id, name, type, target_value, current_value, priority, weight, status, created_at, updated_at";

impl ObservationStore for SqliteStore {
    fn contains(&self, id: &str) -> CredoResult<bool> {
        let conn = self.conn()?;
        let found = conn
            .query_row("SELECT 1 FROM beliefs WHERE id = ?1", params![id], |_| Ok(()))
            .optional()?;
        Ok(found.is_some())
    }

    fn insert(&self, observation: &Observation) -> CredoResult<bool> {
        let conn = self.conn()?;
        let content = serde_json::to_string(&observation.content)?;
        let inserted = conn.execute(
            r#"INSERT OR IGNORE INTO beliefs (id, content, source, confidence, timestamp)
               VALUES (?1, ?2, ?3, ?4, ?5)"#,
            params![
                observation.id,
                content,
                observation.source,
                observation.confidence,
                observation.timestamp.to_rfc3339(),
            ],
        )?;
        Ok(inserted == 1)
    }

    fn count(&self) -> CredoResult<u64> {
        let conn = self.conn()?;
        let n: i64 = conn.query_row("SELECT COUNT(*) FROM beliefs", [], |row| row.get(0))?;
        Ok(n as u64)
    }
}

impl GoalStore for SqliteStore {
    fn upsert(&self, goal: &Goal) -> CredoResult<()> {
        let conn = self.conn()?;
        conn.execute(
            r#"INSERT INTO desires
               (id, name, type, target_value, current_value, priority, weight, status, created_at, updated_at)
               VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
               ON CONFLICT(id) DO UPDATE SET
                   name = excluded.name,
                   current_value = excluded.current_value,
                   priority = excluded.priority,
                   weight = excluded.weight,
                   status = excluded.status,
                   updated_at = excluded.updated_at"#,
            params![
                goal.id,
                goal.name,
                goal.goal_type.as_str(),
                goal.target_value,
                goal.current_value,
                goal.priority,
                goal.weight,
                goal.status.to_string(),
                goal.created_at.to_rfc3339(),
                goal.updated_at.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    fn get(&self, id: &str) -> CredoResult<Option<Goal>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!("SELECT {} FROM desires WHERE id = ?1", GOAL_COLUMNS))?;

        stmt.query_row(params![id], |row| Ok(Self::row_to_goal(row)))
            .optional()?
            .transpose()
    }

    fn list_active(&self) -> CredoResult<Vec<Goal>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM desires WHERE status = 'active' ORDER BY priority DESC, rowid ASC",
            GOAL_COLUMNS
        ))?;

        let results = stmt.query_map([], |row| Ok(Self::row_to_goal(row)))?;

        results
            .map(|r| r.map_err(|e| e.into()).and_then(|inner| inner))
            .collect()
    }

    fn count(&self) -> CredoResult<u64> {
        let conn = self.conn()?;
        let n: i64 = conn.query_row("SELECT COUNT(*) FROM desires", [], |row| row.get(0))?;
        Ok(n as u64)
    }
}

impl AuditStore for SqliteStore {
    fn record_optimization(&self, record: &OptimizationRecord) -> CredoResult<()> {
        let conn = self.conn()?;
        conn.execute(
            r#"INSERT INTO desire_optimizations (desires_snapshot, optimization_result, method, duration, timestamp)
               VALUES (?1, ?2, ?3, ?4, ?5)"#,
            params![
                serde_json::to_string(&record.goals_snapshot)?,
                serde_json::to_string(&record.result)?,
                record.method,
                record.duration,
                record.timestamp.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    fn record_execution(&self, record: &ActionExecutionRecord) -> CredoResult<()> {
        let conn = self.conn()?;
        conn.execute(
            r#"INSERT INTO action_executions (action_type, status, duration, result_summary, timestamp)
               VALUES (?1, ?2, ?3, ?4, ?5)"#,
            params![
                record.action_type,
                record.status,
                record.duration,
                serde_json::to_string(&record.result_summary)?,
                record.timestamp.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    fn recent_executions(&self, limit: usize) -> CredoResult<Vec<ActionExecutionRecord>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            r#"SELECT action_type, status, duration, result_summary, timestamp
               FROM action_executions
               ORDER BY id DESC
               LIMIT ?1"#,
        )?;

        let results = stmt.query_map(params![limit as i64], |row| {
            let action_type: String = row.get(0)?;
            let status: String = row.get(1)?;
            let duration: f64 = row.get(2)?;
            let result_summary: Option<String> = row.get(3)?;
            let timestamp: String = row.get(4)?;
            Ok((action_type, status, duration, result_summary, timestamp))
        })?;

        results
            .map(|r| -> CredoResult<ActionExecutionRecord> {
                let (action_type, status, duration, result_summary, timestamp) = r?;
                Ok(ActionExecutionRecord {
                    action_type,
                    status,
                    duration,
                    result_summary: match result_summary {
                        Some(s) => serde_json::from_str(&s)?,
                        None => serde_json::Value::Null,
                    },
                    timestamp: parse_timestamp(&timestamp)?,
                })
            })
            .collect()
    }

    fn optimization_count(&self) -> CredoResult<u64> {
        let conn = self.conn()?;
        let n: i64 = conn.query_row("SELECT COUNT(*) FROM desire_optimizations", [], |row| row.get(0))?;
        Ok(n as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::default_goals;
    use serde_json::json;

    #[test]
    fn test_observation_insert_is_idempotent() {
        let store = SqliteStore::in_memory().unwrap();
        let obs = Observation::new("file_system", json!({"free": 42}), 0.8).unwrap();

        assert!(store.insert(&obs).unwrap());
        assert!(!store.insert(&obs).unwrap());
        assert!(store.contains(&obs.id).unwrap());
        assert_eq!(ObservationStore::count(&store).unwrap(), 1);
    }

    #[test]
    fn test_goal_upsert_keeps_fixed_fields() {
        let store = SqliteStore::in_memory().unwrap();
        let goal = default_goals().remove(1);
        store.upsert(&goal).unwrap();

        let mut changed = goal.clone();
        changed.current_value = 81.0;
        changed.target_value = 10.0;
        changed.goal_type = GoalType::Quality;
        store.upsert(&changed).unwrap();

        let stored = store.get(&goal.id).unwrap().unwrap();
        assert_eq!(stored.current_value, 81.0);
        assert_eq!(stored.target_value, 95.0);
        assert_eq!(stored.goal_type, GoalType::Performance);
        assert_eq!(GoalStore::count(&store).unwrap(), 1);
    }

    #[test]
    fn test_list_active_orders_by_priority() {
        let store = SqliteStore::in_memory().unwrap();
        let mut goals = default_goals();
        goals.reverse();
        for goal in &goals {
            store.upsert(goal).unwrap();
        }
        let inactive = Goal::new("dormant", "Dormant", GoalType::Quality, 1.0, 0.0)
            .with_priority(1.0)
            .with_status(GoalStatus::Inactive);
        store.upsert(&inactive).unwrap();

        let active = store.list_active().unwrap();
        let ids: Vec<_> = active.iter().map(|g| g.id.as_str()).collect();
        assert_eq!(
            ids,
            vec!["revenue_generation", "system_efficiency", "user_satisfaction", "cost_optimization"]
        );
    }

    #[test]
    fn test_unknown_goal_type_round_trips() {
        let store = SqliteStore::in_memory().unwrap();
        let goal = Goal::new("engage", "Engagement", GoalType::from("engagement"), 10.0, 1.0);
        store.upsert(&goal).unwrap();

        let stored = store.get("engage").unwrap().unwrap();
        assert_eq!(stored.goal_type, GoalType::Other("engagement".to_string()));
    }

    #[test]
    fn test_audit_records() {
        let store = SqliteStore::in_memory().unwrap();
        store
            .record_optimization(&OptimizationRecord {
                goals_snapshot: default_goals(),
                result: json!({"ranked": []}),
                method: "lightweight_weighted_scoring".to_string(),
                duration: 0.01,
                timestamp: Utc::now(),
            })
            .unwrap();
        assert_eq!(store.optimization_count().unwrap(), 1);

        for status in ["success", "failed: command not found"] {
            store
                .record_execution(&ActionExecutionRecord {
                    action_type: "send_notification".to_string(),
                    status: status.to_string(),
                    duration: 0.2,
                    result_summary: json!({"goal_id": "revenue_generation"}),
                    timestamp: Utc::now(),
                })
                .unwrap();
        }

        let recent = store.recent_executions(10).unwrap();
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].status, "failed: command not found");
        assert_eq!(recent[1].result_summary["goal_id"], "revenue_generation");
    }

    #[test]
    fn test_file_backed_store_persists() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("credo.db");

        {
            let store = SqliteStore::new(&path).unwrap();
            store.upsert(&default_goals()[0]).unwrap();
        }

        let reopened = SqliteStore::new(&path).unwrap();
        assert!(reopened.get("revenue_generation").unwrap().is_some());
    }
}
