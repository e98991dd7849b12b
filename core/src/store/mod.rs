//! SQLite persistence layer.
//!
//! RULE: Only the store talks to the database.
//! Resolver, pipeline and service call store methods and never
//! execute SQL directly.

use crate::error::AlertResult;
use rusqlite::{functions::FunctionFlags, Connection};
use std::time::Duration;

mod alert;
mod employee;

/// SQL name of the Unicode-aware lowercase used by name search.
/// SQLite's builtin `lower()` only folds ASCII.
pub(crate) const CASEFOLD_FN: &str = "casefold";

pub struct AlertStore {
    conn: Connection,
    /// Database file or URI, kept so `reopen` can dial the same database.
    /// Private in-memory stores have none.
    path: Option<String>,
}

impl AlertStore {
    pub fn open(path: &str) -> AlertResult<Self> {
        let conn = Connection::open_with_flags(
            path,
            rusqlite::OpenFlags::SQLITE_OPEN_READ_WRITE
                | rusqlite::OpenFlags::SQLITE_OPEN_CREATE
                | rusqlite::OpenFlags::SQLITE_OPEN_URI,
        )?;
        // Memory-backed URIs refuse WAL; they keep their default journal.
        let _ = conn.execute_batch("PRAGMA journal_mode=WAL;");
        Self::prepare(conn, Some(path.to_string()))
    }

    /// A private in-memory database.
    pub fn in_memory() -> AlertResult<Self> {
        Self::prepare(Connection::open(":memory:")?, None)
    }

    fn prepare(conn: Connection, path: Option<String>) -> AlertResult<Self> {
        conn.execute_batch("PRAGMA foreign_keys=ON;")?;
        conn.create_scalar_function(
            CASEFOLD_FN,
            1,
            FunctionFlags::SQLITE_UTF8 | FunctionFlags::SQLITE_DETERMINISTIC,
            |ctx| Ok(ctx.get::<Option<String>>(0)?.map(|s| s.to_lowercase())),
        )?;
        Ok(Self { conn, path })
    }

    /// A second connection to the same database, for use on another
    /// thread. A private in-memory store cannot be shared, so it yields a
    /// fresh empty one.
    pub fn reopen(&self) -> AlertResult<Self> {
        match &self.path {
            Some(p) => Self::open(p),
            None => Self::in_memory(),
        }
    }

    /// How long to wait on a lock held by another connection before
    /// failing with `SQLITE_BUSY`.
    pub fn set_busy_timeout(&self, timeout: Duration) -> AlertResult<()> {
        self.conn.busy_timeout(timeout)?;
        Ok(())
    }

    /// Run `f` inside one transaction, committing only if it succeeds.
    pub fn with_transaction<T>(&self, f: impl FnOnce(&Self) -> AlertResult<T>) -> AlertResult<T> {
        let tx = self.conn.unchecked_transaction()?;
        let out = f(self)?;
        tx.commit()?;
        Ok(out)
    }

    /// Apply all schema migrations in order. Safe to call repeatedly.
    pub fn migrate(&self) -> AlertResult<()> {
        self.conn
            .execute_batch(include_str!("../../../migrations/001_org_alerts.sql"))?;
        Ok(())
    }
}
