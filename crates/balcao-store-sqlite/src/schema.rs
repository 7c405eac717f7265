//! SQL schema for the Balcão SQLite store.
//!
//! [`SCHEMA`] creates the base tables; [`MIGRATIONS`] adds the columns that
//! were introduced later. Both are safe to run on every open: tables use
//! `CREATE TABLE IF NOT EXISTS` and a migration that fails because its column
//! already exists counts as applied. Any other migration failure aborts and
//! rolls back every step of that run, leaving the file as it was.

use rusqlite::Connection;

use crate::{Error, Result};

pub const SCHEMA_VERSION: i64 = 2;

/// Connection settings. Journal mode cannot change inside a transaction.
pub const PRAGMAS: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;
";

/// Base DDL; idempotent thanks to `IF NOT EXISTS`.
pub const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS orders (
    id                   INTEGER PRIMARY KEY AUTOINCREMENT,
    sequence_no          INTEGER NOT NULL UNIQUE,
    created_at           TEXT    NOT NULL,   -- local time, 'YYYY-MM-DD HH:MM:SS'
    client_name          TEXT    NOT NULL,
    client_tax_id        TEXT    NOT NULL DEFAULT '',
    client_phone         TEXT    NOT NULL DEFAULT '',
    product_summary_text TEXT    NOT NULL DEFAULT '',
    product_value        REAL    NOT NULL DEFAULT 0,
    downpayment_value    REAL    NOT NULL DEFAULT 0,
    freight_value        REAL    NOT NULL DEFAULT 0,
    payment_method       TEXT    NOT NULL DEFAULT ''
);

-- Tax-id uniqueness is best-effort (checked on insert only).
CREATE TABLE IF NOT EXISTS clients (
    id                  INTEGER PRIMARY KEY AUTOINCREMENT,
    name                TEXT NOT NULL,
    tax_id              TEXT NOT NULL DEFAULT '',
    phone               TEXT NOT NULL DEFAULT '',
    address_street      TEXT NOT NULL DEFAULT '',
    address_number      TEXT NOT NULL DEFAULT '',
    address_district    TEXT NOT NULL DEFAULT '',
    address_city        TEXT NOT NULL DEFAULT '',
    address_state       TEXT NOT NULL DEFAULT '',
    address_postal_code TEXT NOT NULL DEFAULT ''
);

CREATE TABLE IF NOT EXISTS catalog_products (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    name        TEXT NOT NULL UNIQUE,
    code        TEXT,
    price       REAL NOT NULL DEFAULT 0,
    category    TEXT NOT NULL DEFAULT '',
    description TEXT NOT NULL DEFAULT ''
);

CREATE TABLE IF NOT EXISTS expenses (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    category    TEXT NOT NULL DEFAULT '',
    description TEXT NOT NULL DEFAULT '',
    value       REAL NOT NULL DEFAULT 0,
    date        TEXT NOT NULL             -- 'YYYY-MM-DD'
);

-- Sequence numbers of deleted orders; never handed out again.
CREATE TABLE IF NOT EXISTS retired_sequence_numbers (
    sequence_no INTEGER PRIMARY KEY
);

-- Small key/value table; holds the sequence-number high-water mark.
CREATE TABLE IF NOT EXISTS ledger_meta (
    key   TEXT PRIMARY KEY,
    value INTEGER NOT NULL
);

CREATE INDEX IF NOT EXISTS orders_created_idx ON orders(created_at);
CREATE INDEX IF NOT EXISTS orders_tax_id_idx  ON orders(client_tax_id);
CREATE INDEX IF NOT EXISTS clients_tax_id_idx ON clients(tax_id);
CREATE INDEX IF NOT EXISTS clients_name_idx   ON clients(name);
CREATE INDEX IF NOT EXISTS expenses_date_idx  ON expenses(date);
";

/// Additive column migrations, applied in order.
pub const MIGRATIONS: &[&str] = &[
  "ALTER TABLE orders ADD COLUMN lead_time_days INTEGER NOT NULL DEFAULT 0",
  "ALTER TABLE orders ADD COLUMN document_ref TEXT",
  "ALTER TABLE orders ADD COLUMN extensions_json TEXT NOT NULL DEFAULT '{}'",
  "ALTER TABLE orders ADD COLUMN extensions_rev INTEGER NOT NULL DEFAULT 0",
  "ALTER TABLE clients ADD COLUMN email TEXT NOT NULL DEFAULT ''",
];

fn is_duplicate_column(err: &rusqlite::Error) -> bool {
  matches!(
    err,
    rusqlite::Error::SqliteFailure(_, Some(msg)) if msg.contains("duplicate column name")
  )
}

/// Create missing tables and apply pending column migrations.
pub fn ensure_schema(conn: &mut Connection) -> Result<()> {
  conn.execute_batch(PRAGMAS).map_err(|source| Error::Migration {
    statement: "pragmas".into(),
    source,
  })?;
  apply(conn, MIGRATIONS)
}

/// Base DDL, `migrations` and the version stamp in one transaction.
fn apply(conn: &mut Connection, migrations: &[&str]) -> Result<()> {
  let migration_err = |statement: &str| {
    let statement = statement.to_owned();
    move |source: rusqlite::Error| Error::Migration { statement, source }
  };

  let tx = conn.transaction().map_err(migration_err("BEGIN"))?;
  tx.execute_batch(SCHEMA).map_err(migration_err("base schema"))?;

  for statement in migrations {
    match tx.execute(statement, []) {
      Ok(_) => tracing::debug!(statement, "applied migration"),
      Err(e) if is_duplicate_column(&e) => {}
      Err(source) => {
        // Dropping `tx` rolls back the steps already applied.
        return Err(Error::Migration {
          statement: (*statement).to_owned(),
          source,
        });
      }
    }
  }

  tx.pragma_update(None, "user_version", SCHEMA_VERSION)
    .map_err(migration_err("PRAGMA user_version"))?;
  tx.commit().map_err(migration_err("COMMIT"))?;
  Ok(())
}
