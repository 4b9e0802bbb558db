use anyhow::{Context, Result, anyhow};
use chrono::{DateTime, SecondsFormat, Utc};
use log::{debug, info};
use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::params;
use serde::Serialize;
use uuid::Uuid;

use crate::network::common::interface::ParameterRepository;
use crate::network::model::{
    params::{ParameterRecord, ParameterSet, ParameterStore},
    topology::Topology,
};

const PRIOR: &str = "prior";
const POSTERIOR: &str = "posterior";

type RawSnapshot = (String, String, String, i64, i64);

/// Metadata for one persisted parameter store.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SnapshotInfo {
    pub id: String,
    pub label: String,
    pub created_at: DateTime<Utc>,
    pub prior_cases: usize,
    pub cases_observed: usize,
}

/// ParameterDatabase keeps parameter store snapshots in SQLite as plain
/// `(snapshot, node, row, kind) -> (alpha, beta)` records.
pub struct ParameterDatabase {
    /// Connection pool for SQLite
    pool: Pool<SqliteConnectionManager>,
}

impl ParameterDatabase {
    /// Create a parameter database backed by in-memory SQLite
    pub fn new_in_memory() -> Result<Self> {
        let manager = SqliteConnectionManager::memory();
        // every pooled connection would open its own private memory database
        let pool = Pool::builder()
            .max_size(1)
            .build(manager)
            .context("Failed to create connection pool")?;

        let db = Self { pool };
        db.initialize_schema()?;
        Ok(db)
    }

    /// Create a parameter database stored in a SQLite file
    pub fn new(path: &str) -> Result<Self> {
        let manager = SqliteConnectionManager::file(path);
        let pool = Pool::builder()
            .max_size(4)
            .build(manager)
            .context("Failed to create connection pool")?;

        let db = Self { pool };
        db.initialize_schema()?;
        info!("opened parameter database at {}", path);
        Ok(db)
    }

    fn initialize_schema(&self) -> Result<()> {
        let conn = self.pool.get().context("Failed to get connection from pool")?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS snapshots (
                id TEXT PRIMARY KEY,
                label TEXT NOT NULL,
                created_at TEXT NOT NULL,
                prior_cases INTEGER NOT NULL,
                cases_observed INTEGER NOT NULL
            )",
            [],
        )
        .context("Failed to create snapshots table")?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS parameters (
                snapshot_id TEXT NOT NULL,
                node TEXT NOT NULL,
                row_index INTEGER NOT NULL,
                kind TEXT NOT NULL,
                alpha REAL NOT NULL,
                beta REAL NOT NULL,
                PRIMARY KEY (snapshot_id, node, row_index, kind),
                FOREIGN KEY (snapshot_id) REFERENCES snapshots (id)
            )",
            [],
        )
        .context("Failed to create parameters table")?;

        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_snapshots_label ON snapshots (label)",
            [],
        )
        .context("Failed to create snapshot label index")?;

        // WAL only applies to file databases
        let _ = conn.pragma_update(None, "journal_mode", "WAL");

        conn.pragma_update(None, "foreign_keys", "ON")
            .context("Failed to enable foreign keys")?;

        Ok(())
    }

    /// Execute a function within a transaction
    ///
    /// The transaction is committed if the closure returns Ok and rolled back
    /// when it is dropped otherwise.
    pub fn with_transaction<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&rusqlite::Transaction) -> Result<T>,
    {
        let mut conn = self.pool.get().context("Failed to get connection from pool")?;

        let tx = conn.transaction()?;
        let value = f(&tx)?;
        tx.commit()?;
        Ok(value)
    }

    fn read_records(&self, id: &str, kind: &str) -> Result<Vec<ParameterRecord>> {
        let conn = self.pool.get().context("Failed to get connection from pool")?;
        let mut stmt = conn.prepare(
            "SELECT node, row_index, alpha, beta FROM parameters
             WHERE snapshot_id = ?1 AND kind = ?2",
        )?;
        let rows = stmt.query_map(params![id, kind], |row| {
            let row_index: i64 = row.get(1)?;
            Ok(ParameterRecord {
                node: row.get(0)?,
                row: row_index as usize,
                alpha: row.get(2)?,
                beta: row.get(3)?,
            })
        })?;

        let mut records = Vec::new();
        for record in rows {
            records.push(record.context("Failed to read parameter record")?);
        }
        Ok(records)
    }

    fn read_snapshot_info(row: &rusqlite::Row) -> rusqlite::Result<RawSnapshot> {
        Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?, row.get(4)?))
    }

    fn to_snapshot_info(raw: RawSnapshot) -> Result<SnapshotInfo> {
        let (id, label, created_at, prior_cases, cases_observed) = raw;
        let created_at = DateTime::parse_from_rfc3339(&created_at)
            .with_context(|| format!("Bad timestamp on snapshot {}", id))?
            .with_timezone(&Utc);
        Ok(SnapshotInfo {
            id,
            label,
            created_at,
            prior_cases: prior_cases as usize,
            cases_observed: cases_observed as usize,
        })
    }

    /// Deletes a snapshot and its records. Returns false if it did not exist.
    pub fn delete_snapshot(&self, id: &str) -> Result<bool> {
        self.with_transaction(|tx| {
            tx.execute("DELETE FROM parameters WHERE snapshot_id = ?1", params![id])
                .context("Failed to delete parameter records")?;
            let deleted = tx
                .execute("DELETE FROM snapshots WHERE id = ?1", params![id])
                .context("Failed to delete snapshot")?;
            Ok(deleted > 0)
        })
    }
}

impl ParameterRepository for ParameterDatabase {
    fn save_snapshot(
        &self,
        label: &str,
        topology: &Topology,
        store: &ParameterStore,
    ) -> Result<String> {
        let id = Uuid::new_v4().to_string();
        // fixed-width timestamps keep ORDER BY created_at chronological
        let created_at = Utc::now().to_rfc3339_opts(SecondsFormat::Nanos, true);
        let priors = store.priors().to_records(topology);
        let posteriors = store.posteriors().to_records(topology);

        self.with_transaction(|tx| {
            tx.execute(
                "INSERT INTO snapshots (id, label, created_at, prior_cases, cases_observed)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    id,
                    label,
                    created_at,
                    store.prior_cases() as i64,
                    store.cases_observed() as i64
                ],
            )
            .context("Failed to insert snapshot")?;

            let mut stmt = tx.prepare(
                "INSERT INTO parameters (snapshot_id, node, row_index, kind, alpha, beta)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            )?;
            for (kind, records) in [(PRIOR, &priors), (POSTERIOR, &posteriors)] {
                for record in records {
                    stmt.execute(params![
                        id,
                        record.node,
                        record.row as i64,
                        kind,
                        record.alpha,
                        record.beta
                    ])
                    .context("Failed to insert parameter record")?;
                }
            }
            Ok(())
        })?;

        debug!(
            "saved snapshot {} ({} records)",
            id,
            priors.len() + posteriors.len()
        );
        Ok(id)
    }

    fn load_snapshot(&self, id: &str, topology: &Topology) -> Result<ParameterStore> {
        let info = {
            let conn = self.pool.get().context("Failed to get connection from pool")?;
            let mut stmt = conn.prepare(
                "SELECT id, label, created_at, prior_cases, cases_observed FROM snapshots
                 WHERE id = ?1",
            )?;
            let mut rows = stmt.query(params![id])?;
            match rows.next()? {
                Some(row) => Self::to_snapshot_info(Self::read_snapshot_info(row)?)?,
                None => return Err(anyhow!("No parameter snapshot with id {}", id)),
            }
        };

        let priors = ParameterSet::from_records(topology, &self.read_records(id, PRIOR)?)
            .with_context(|| format!("Snapshot {} has unusable priors", id))?;
        let posteriors = ParameterSet::from_records(topology, &self.read_records(id, POSTERIOR)?)
            .with_context(|| format!("Snapshot {} has unusable posteriors", id))?;

        let store = ParameterStore::from_parts(
            topology,
            priors,
            posteriors,
            info.prior_cases,
            info.cases_observed,
        )?;
        debug!("loaded snapshot {} ({})", info.id, info.label);
        Ok(store)
    }

    fn latest_snapshot(&self, label: &str) -> Result<Option<SnapshotInfo>> {
        let conn = self.pool.get().context("Failed to get connection from pool")?;
        let mut stmt = conn.prepare(
            "SELECT id, label, created_at, prior_cases, cases_observed FROM snapshots
             WHERE label = ?1 ORDER BY created_at DESC, rowid DESC LIMIT 1",
        )?;
        let mut rows = stmt.query(params![label])?;
        match rows.next()? {
            Some(row) => Ok(Some(Self::to_snapshot_info(Self::read_snapshot_info(row)?)?)),
            None => Ok(None),
        }
    }

    fn list_snapshots(&self) -> Result<Vec<SnapshotInfo>> {
        let conn = self.pool.get().context("Failed to get connection from pool")?;
        let mut stmt = conn.prepare(
            "SELECT id, label, created_at, prior_cases, cases_observed FROM snapshots
             ORDER BY created_at, rowid",
        )?;
        let rows = stmt.query_map([], Self::read_snapshot_info)?;

        let mut snapshots = Vec::new();
        for raw in rows {
            snapshots.push(Self::to_snapshot_info(raw?)?);
        }
        Ok(snapshots)
    }
}
