//! SQLite state management for tracked namespaces
//!
//! Each namespace is tracked under a user-chosen address. A row holds the
//! last known [`ResourceState`]: a namespace ID alone while unsynced, or the
//! full record after a Read.

use crate::resource::{NamespaceRecord, ResourceState};
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use cloudmap_common::KeyValueTags;
use cloudmap_common::defaults::{APP_NAME, STATE_DB_FILE};
use directories::ProjectDirs;
use rusqlite::{Connection, OptionalExtension, Row, params};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

const SCHEMA: &str = r#"
    CREATE TABLE IF NOT EXISTS namespaces (
        address TEXT PRIMARY KEY,
        namespace_id TEXT NOT NULL,
        name TEXT,
        description TEXT,
        arn TEXT,
        tags TEXT NOT NULL DEFAULT '{}',
        updated_at TEXT NOT NULL
    );

    CREATE INDEX IF NOT EXISTS idx_namespaces_id ON namespaces(namespace_id);
"#;

/// Get the default state database path
pub fn default_db_path() -> Result<PathBuf> {
    let proj_dirs =
        ProjectDirs::from("", "", APP_NAME).context("Failed to get project directories")?;

    Ok(proj_dirs.data_local_dir().join(STATE_DB_FILE))
}

/// A state row
#[derive(Debug, Clone, PartialEq)]
pub struct StoredNamespace {
    pub address: String,
    pub state: ResourceState,
    pub updated_at: DateTime<Utc>,
}

/// Local state database
pub struct StateStore {
    conn: Connection,
}

impl StateStore {
    /// Open the state database at `path`, creating it if needed
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir).context("Failed to create state directory")?;
        }
        let conn = Connection::open(path)
            .with_context(|| format!("Failed to open state database {}", path.display()))?;
        debug!(path = %path.display(), "Opened state database");
        Self::with_connection(conn)
    }

    /// Open the database in the platform data directory
    pub fn open_default() -> Result<Self> {
        Self::open(&default_db_path()?)
    }

    pub fn open_in_memory() -> Result<Self> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self> {
        conn.execute_batch(SCHEMA)
            .context("Failed to create tables")?;
        Ok(Self { conn })
    }

    pub fn get(&self, address: &str) -> Result<Option<StoredNamespace>> {
        self.conn
            .query_row(
                "SELECT address, namespace_id, name, description, arn, tags, updated_at
                 FROM namespaces WHERE address = ?1",
                params![address],
                row_to_raw,
            )
            .optional()
            .with_context(|| format!("Failed to load state for {address}"))?
            .map(RawRow::into_stored)
            .transpose()
    }

    /// Look up which address tracks a namespace ID
    pub fn find_by_id(&self, namespace_id: &str) -> Result<Option<String>> {
        let address = self
            .conn
            .query_row(
                "SELECT address FROM namespaces WHERE namespace_id = ?1",
                params![namespace_id],
                |row| row.get(0),
            )
            .optional()?;
        Ok(address)
    }

    /// Record a synced namespace under `address`
    pub fn upsert(&self, address: &str, record: &NamespaceRecord) -> Result<()> {
        let tags = serde_json::to_string(&record.tags)?;
        let now = Utc::now().to_rfc3339();

        self.conn
            .execute(
                "INSERT INTO namespaces (address, namespace_id, name, description, arn, tags, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
                 ON CONFLICT(address) DO UPDATE SET
                    namespace_id = excluded.namespace_id,
                    name = excluded.name,
                    description = excluded.description,
                    arn = excluded.arn,
                    tags = excluded.tags,
                    updated_at = excluded.updated_at",
                params![
                    address,
                    record.id,
                    record.name,
                    record.description,
                    record.arn,
                    tags,
                    now
                ],
            )
            .with_context(|| format!("Failed to save state for {address}"))?;

        Ok(())
    }

    /// Record an identity whose attributes have not been read yet
    pub fn upsert_unsynced(&self, address: &str, namespace_id: &str) -> Result<()> {
        let now = Utc::now().to_rfc3339();

        self.conn
            .execute(
                "INSERT INTO namespaces (address, namespace_id, name, description, arn, tags, updated_at)
                 VALUES (?1, ?2, NULL, NULL, NULL, '{}', ?3)
                 ON CONFLICT(address) DO UPDATE SET
                    namespace_id = excluded.namespace_id,
                    name = NULL,
                    description = NULL,
                    arn = NULL,
                    tags = '{}',
                    updated_at = excluded.updated_at",
                params![address, namespace_id, now],
            )
            .with_context(|| format!("Failed to save state for {address}"))?;

        Ok(())
    }

    /// Forget `address`; returns whether it was tracked
    pub fn remove(&self, address: &str) -> Result<bool> {
        let removed = self
            .conn
            .execute("DELETE FROM namespaces WHERE address = ?1", params![address])
            .with_context(|| format!("Failed to remove state for {address}"))?;
        Ok(removed > 0)
    }

    pub fn list(&self) -> Result<Vec<StoredNamespace>> {
        let mut stmt = self.conn.prepare(
            "SELECT address, namespace_id, name, description, arn, tags, updated_at
             FROM namespaces ORDER BY address",
        )?;

        let rows = stmt
            .query_map([], row_to_raw)?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        rows.into_iter().map(RawRow::into_stored).collect()
    }

    /// Persist the outcome of a lifecycle operation.
    ///
    /// `Synced` and `Unsynced` are saved; `Absent` removes the row.
    pub fn apply_state(&self, address: &str, state: &ResourceState) -> Result<()> {
        match state {
            ResourceState::Synced(record) => self.upsert(address, record),
            ResourceState::Unsynced { id } => self.upsert_unsynced(address, id),
            ResourceState::Absent => {
                if self.remove(address)? {
                    debug!(address = %address, "Removed absent namespace from state");
                }
                Ok(())
            }
        }
    }
}

struct RawRow {
    address: String,
    namespace_id: String,
    name: Option<String>,
    description: Option<String>,
    arn: Option<String>,
    tags: String,
    updated_at: String,
}

fn row_to_raw(row: &Row<'_>) -> rusqlite::Result<RawRow> {
    Ok(RawRow {
        address: row.get(0)?,
        namespace_id: row.get(1)?,
        name: row.get(2)?,
        description: row.get(3)?,
        arn: row.get(4)?,
        tags: row.get(5)?,
        updated_at: row.get(6)?,
    })
}

impl RawRow {
    fn into_stored(self) -> Result<StoredNamespace> {
        let updated_at = DateTime::parse_from_rfc3339(&self.updated_at)
            .with_context(|| format!("Invalid timestamp for {}", self.address))?
            .with_timezone(&Utc);

        let state = match (self.name, self.arn) {
            (Some(name), Some(arn)) => {
                let tags: KeyValueTags = serde_json::from_str(&self.tags)
                    .with_context(|| format!("Invalid tags for {}", self.address))?;
                ResourceState::Synced(NamespaceRecord {
                    id: self.namespace_id,
                    name,
                    description: self.description,
                    arn,
                    tags,
                })
            }
            _ => ResourceState::Unsynced {
                id: self.namespace_id,
            },
        };

        Ok(StoredNamespace {
            address: self.address,
            state,
            updated_at,
        })
    }
}
