use std::path::Path;
use std::sync::Mutex;

use anyhow::Result;
use rusqlite::{Connection, OptionalExtension, params};
use tracing::info;

use cosecha_types::models::Contract;

const CONTRACTS_SLOT: &str = "contracts";

/// Local durable mirror of the worker's contracts: a single named slot
/// holding a JSON array. The remote backend stays the source of truth; this
/// is only read when the remote fetch fails.
pub struct ContractCache {
    conn: Mutex<Connection>,
}

impl ContractCache {
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)?;
        conn.pragma_update(None, "journal_mode", "WAL")?;
        Self::init(&conn)?;
        info!("contract cache opened at {}", path.display());
        Ok(Self { conn: Mutex::new(conn) })
    }

    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Self::init(&conn)?;
        Ok(Self { conn: Mutex::new(conn) })
    }

    fn init(conn: &Connection) -> Result<()> {
        conn.execute(
            "CREATE TABLE IF NOT EXISTS slots (
                name  TEXT PRIMARY KEY,
                value TEXT NOT NULL
            )",
            [],
        )?;
        Ok(())
    }

    fn with_conn<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Connection) -> Result<T>,
    {
        let conn = self
            .conn
            .lock()
            .map_err(|e| anyhow::anyhow!("cache lock poisoned: {e}"))?;
        f(&conn)
    }

    fn read_slot(conn: &Connection) -> Result<Vec<Contract>> {
        let value: Option<String> = conn
            .query_row(
                "SELECT value FROM slots WHERE name = ?1",
                params![CONTRACTS_SLOT],
                |row| row.get(0),
            )
            .optional()?;
        match value {
            Some(json) => Ok(serde_json::from_str(&json)?),
            None => Ok(Vec::new()),
        }
    }

    /// Everything currently cached; an empty slot reads as an empty list.
    pub fn read_all(&self) -> Result<Vec<Contract>> {
        self.with_conn(Self::read_slot)
    }

    /// Append one record, preserving everything already cached. Read and
    /// write happen under one lock so concurrent appends cannot lose records.
    pub fn append(&self, contract: &Contract) -> Result<()> {
        self.with_conn(|conn| {
            let mut contracts = Self::read_slot(conn)?;
            contracts.push(contract.clone());
            let json = serde_json::to_string(&contracts)?;
            conn.execute(
                "INSERT INTO slots (name, value) VALUES (?1, ?2)
                 ON CONFLICT(name) DO UPDATE SET value = excluded.value",
                params![CONTRACTS_SLOT, json],
            )?;
            Ok(())
        })
    }
}
