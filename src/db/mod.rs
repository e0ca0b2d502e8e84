pub mod queries;

use anyhow::Context;
use rusqlite::Connection;

const SCHEMA: &str = include_str!("schema.sql");

/// Opens the store from a connection string (file path or `:memory:`) and
/// applies the schema. A failure here is fatal: the process must not begin
/// serving without a working store.
pub fn init_db(path: &str) -> anyhow::Result<Connection> {
    let conn = Connection::open(path).context("failed to open database")?;

    conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA foreign_keys=ON;")
        .context("failed to set database pragmas")?;

    conn.execute_batch(SCHEMA)
        .context("failed to apply database schema")?;

    Ok(conn)
}
