//! [`SqliteStore`]: the SQLite implementation of [`LedgerStore`].

use std::path::Path;

use balcao_core::{
  catalog::{CatalogProduct, NewCatalogProduct},
  client::{Client, NewClient, normalize_tax_id},
  expense::{Expense, NewExpense},
  order::{NewOrder, Order, OrderPatch},
  store::LedgerStore,
};
use chrono::{Local, NaiveDate};
use rusqlite::OptionalExtension as _;

use crate::{
  Error, Result,
  encode::{
    CLIENT_COLUMNS, EXPENSE_COLUMNS, ORDER_COLUMNS, PRODUCT_COLUMNS, RawExpense, RawOrder,
    client_from_row, decode_extensions, encode_date, encode_dt, encode_extensions, like_prefix,
    normalized_tax_id_sql, product_from_row,
  },
  schema,
};

const LAST_SEQUENCE_KEY: &str = "last_sequence_no";

// ─── Store ───────────────────────────────────────────────────────────────────

/// A Balcão ledger backed by a single SQLite file.
///
/// Cloning is cheap. The inner connection is reference-counted and every
/// clone talks to the same connection thread.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and bring its schema up to date.
  ///
  /// A migration failure is returned as [`Error::Migration`]; the caller
  /// must treat it as fatal.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let path = path.as_ref().to_path_buf();
    let conn = tokio_rusqlite::Connection::open(&path).await?;
    let store = Self { conn };
    store.ensure_schema().await?;
    tracing::info!(path = %path.display(), "opened ledger store");
    Ok(store)
  }

  /// Open an in-memory store, for tests.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.ensure_schema().await?;
    Ok(store)
  }

  /// Create missing tables and apply additive migrations. Idempotent.
  pub async fn ensure_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| Ok(schema::ensure_schema(conn)))
      .await?
  }

  /// Names of the columns currently present on `table`.
  pub async fn table_columns(&self, table: &'static str) -> Result<Vec<String>> {
    let columns = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!("PRAGMA table_info({table})"))?;
        let names = stmt
          .query_map([], |row| row.get::<_, String>(1))?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(names)
      })
      .await?;
    Ok(columns)
  }

  /// Run an order query and decode every row.
  async fn query_orders(
    &self,
    where_clause: &'static str,
    params: Vec<rusqlite::types::Value>,
  ) -> Result<Vec<Order>> {
    let sql = format!(
      "SELECT {ORDER_COLUMNS} FROM orders {where_clause} ORDER BY created_at DESC, id DESC"
    );
    self.query_orders_sql(sql, params).await
  }

  async fn query_orders_sql(
    &self,
    sql: String,
    params: Vec<rusqlite::types::Value>,
  ) -> Result<Vec<Order>> {
    let raws: Vec<RawOrder> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(rusqlite::params_from_iter(params), RawOrder::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawOrder::into_order).collect()
  }

  async fn query_one_order(
    &self,
    column: &'static str,
    value: i64,
  ) -> Result<Option<Order>> {
    let raw: Option<RawOrder> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!("SELECT {ORDER_COLUMNS} FROM orders WHERE {column} = ?1"),
              rusqlite::params![value],
              RawOrder::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawOrder::into_order).transpose()
  }

  async fn order_exists(&self, id: i64) -> Result<bool> {
    let exists = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row("SELECT 1 FROM orders WHERE id = ?1", rusqlite::params![id], |_| {
              Ok(true)
            })
            .optional()?
            .unwrap_or(false),
        )
      })
      .await?;
    Ok(exists)
  }

  /// Read the current Extensions blob and its revision.
  async fn read_extensions(&self, id: i64) -> Result<Option<(Option<String>, i64)>> {
    let current: Option<(Option<String>, i64)> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT extensions_json, extensions_rev FROM orders WHERE id = ?1",
              rusqlite::params![id],
              |r| Ok((r.get(0)?, r.get(1)?)),
            )
            .optional()?,
        )
      })
      .await?;
    Ok(current)
  }
}

// ─── LedgerStore impl ────────────────────────────────────────────────────────

impl LedgerStore for SqliteStore {
  type Error = Error;

  // ── Orders ────────────────────────────────────────────────────────────────

  async fn next_sequence_number(&self) -> Result<i64> {
    let next = self
      .conn
      .call(|conn| {
        Ok(conn.query_row(
          "SELECT max(
             COALESCE((SELECT value FROM ledger_meta WHERE key = ?1), 0),
             COALESCE((SELECT MAX(sequence_no) FROM orders), 0)
           ) + 1",
          rusqlite::params![LAST_SEQUENCE_KEY],
          |r| r.get::<_, i64>(0),
        )?)
      })
      .await?;
    Ok(next)
  }

  async fn create_order(&self, mut input: NewOrder) -> Result<i64> {
    input.validate()?;

    let sequence_no = input.sequence_no;
    let created_at = encode_dt(
      input
        .created_at
        .unwrap_or_else(|| Local::now().naive_local()),
    );
    let extensions_json = encode_extensions(&input.extensions)?;

    let id: Option<i64> = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;

        // Numbers of deleted orders stay retired.
        let taken = tx
          .query_row(
            "SELECT 1 FROM orders WHERE sequence_no = ?1
             UNION ALL
             SELECT 1 FROM retired_sequence_numbers WHERE sequence_no = ?1",
            rusqlite::params![sequence_no],
            |_| Ok(true),
          )
          .optional()?
          .unwrap_or(false);
        if taken {
          return Ok(None);
        }

        tx.execute(
          "INSERT INTO orders (
             sequence_no, created_at, client_name, client_tax_id, client_phone,
             product_summary_text, product_value, downpayment_value, freight_value,
             payment_method, lead_time_days, document_ref, extensions_json
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)",
          rusqlite::params![
            sequence_no,
            created_at,
            input.client_name,
            input.client_tax_id,
            input.client_phone,
            input.product_summary,
            input.product_value,
            input.downpayment_value,
            input.freight_value,
            input.payment_method,
            input.lead_time_days,
            input.document_ref,
            extensions_json,
          ],
        )?;
        let id = tx.last_insert_rowid();

        tx.execute(
          "INSERT INTO ledger_meta (key, value) VALUES (?1, ?2)
           ON CONFLICT(key) DO UPDATE SET value = max(value, excluded.value)",
          rusqlite::params![LAST_SEQUENCE_KEY, sequence_no],
        )?;

        tx.commit()?;
        Ok(Some(id))
      })
      .await?;

    let id = id.ok_or(balcao_core::Error::DuplicateSequence(sequence_no))?;
    tracing::debug!(id, sequence_no, "created order");
    Ok(id)
  }

  async fn get_order(&self, id: i64) -> Result<Option<Order>> {
    self.query_one_order("id", id).await
  }

  async fn get_order_by_sequence(&self, sequence_no: i64) -> Result<Option<Order>> {
    self.query_one_order("sequence_no", sequence_no).await
  }

  async fn list_recent_orders(&self, limit: usize) -> Result<Vec<Order>> {
    let limit = i64::try_from(limit).unwrap_or(i64::MAX);
    let sql = format!(
      "SELECT {ORDER_COLUMNS} FROM orders ORDER BY created_at DESC, id DESC LIMIT ?1"
    );
    self.query_orders_sql(sql, vec![limit.into()]).await
  }

  async fn list_all_orders(&self) -> Result<Vec<Order>> {
    self.query_orders("", Vec::new()).await
  }

  async fn list_orders_created_between(
    &self,
    start: NaiveDate,
    end: NaiveDate,
  ) -> Result<Vec<Order>> {
    self
      .query_orders(
        "WHERE substr(created_at, 1, 10) BETWEEN ?1 AND ?2",
        vec![encode_date(start).into(), encode_date(end).into()],
      )
      .await
  }

  async fn list_orders_by_tax_id(&self, tax_id: &str) -> Result<Vec<Order>> {
    let normalized = normalize_tax_id(tax_id);
    if normalized.is_empty() {
      return Ok(Vec::new());
    }
    let sql = format!(
      "SELECT {ORDER_COLUMNS} FROM orders WHERE {} = ?1 ORDER BY created_at DESC, id DESC",
      normalized_tax_id_sql("client_tax_id")
    );
    self.query_orders_sql(sql, vec![normalized.into()]).await
  }

  async fn update_order(&self, id: i64, mut patch: OrderPatch) -> Result<bool> {
    patch.validate()?;

    // Extensions are merged read → overlay → write. The write only lands if
    // the revision read here is still current.
    let (extensions_json, expected_rev) = if patch.touches_extensions() {
      let Some((raw, rev)) = self.read_extensions(id).await? else {
        return Ok(false);
      };
      let mut current = decode_extensions(id, raw.as_deref());
      current.merge(&patch.extensions);
      (Some(encode_extensions(&current)?), Some(rev))
    } else {
      (None, None)
    };

    let changed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "UPDATE orders SET
             client_name          = COALESCE(?2,  client_name),
             client_tax_id        = COALESCE(?3,  client_tax_id),
             client_phone         = COALESCE(?4,  client_phone),
             product_summary_text = COALESCE(?5,  product_summary_text),
             product_value        = COALESCE(?6,  product_value),
             downpayment_value    = COALESCE(?7,  downpayment_value),
             freight_value        = COALESCE(?8,  freight_value),
             payment_method       = COALESCE(?9,  payment_method),
             lead_time_days       = COALESCE(?10, lead_time_days),
             document_ref         = COALESCE(?11, document_ref),
             extensions_json      = COALESCE(?12, extensions_json),
             extensions_rev       = extensions_rev + (?12 IS NOT NULL)
           WHERE id = ?1 AND (?13 IS NULL OR extensions_rev = ?13)",
          rusqlite::params![
            id,
            patch.client_name,
            patch.client_tax_id,
            patch.client_phone,
            patch.product_summary,
            patch.product_value,
            patch.downpayment_value,
            patch.freight_value,
            patch.payment_method,
            patch.lead_time_days,
            patch.document_ref,
            extensions_json,
            expected_rev,
          ],
        )?)
      })
      .await?;

    if changed > 0 {
      return Ok(true);
    }
    if expected_rev.is_some() && self.order_exists(id).await? {
      tracing::warn!(order_id = id, "extensions changed between read and write");
      return Err(Error::ConcurrentModification(id));
    }
    Ok(false)
  }

  async fn set_document_ref(&self, id: i64, reference: String) -> Result<bool> {
    let changed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "UPDATE orders SET document_ref = ?2 WHERE id = ?1",
          rusqlite::params![id, reference],
        )?)
      })
      .await?;
    Ok(changed > 0)
  }

  async fn delete_order(&self, id: i64) -> Result<bool> {
    let changed = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        tx.execute(
          "INSERT OR IGNORE INTO retired_sequence_numbers (sequence_no)
           SELECT sequence_no FROM orders WHERE id = ?1",
          rusqlite::params![id],
        )?;
        let changed = tx.execute("DELETE FROM orders WHERE id = ?1", rusqlite::params![id])?;
        tx.commit()?;
        Ok(changed)
      })
      .await?;
    if changed > 0 {
      tracing::info!(order_id = id, "deleted order");
    }
    Ok(changed > 0)
  }

  // ── Clients ───────────────────────────────────────────────────────────────

  async fn upsert_client(&self, client: NewClient) -> Result<i64> {
    let name = client.name.trim().to_owned();
    if name.is_empty() {
      return Err(balcao_core::Error::Validation("client name is required".into()).into());
    }
    let tax_id = normalize_tax_id(&client.tax_id);

    let id = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        if !tax_id.is_empty() {
          let existing: Option<i64> = tx
            .query_row(
              &format!(
                "SELECT id FROM clients WHERE {} = ?1 ORDER BY id LIMIT 1",
                normalized_tax_id_sql("tax_id")
              ),
              rusqlite::params![tax_id],
              |r| r.get(0),
            )
            .optional()?;
          if let Some(id) = existing {
            return Ok(id);
          }
        }

        let a = &client.address;
        tx.execute(
          "INSERT INTO clients (
             name, tax_id, phone, email, address_street, address_number,
             address_district, address_city, address_state, address_postal_code
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
          rusqlite::params![
            name,
            tax_id,
            client.phone,
            client.email,
            a.street,
            a.number,
            a.district,
            a.city,
            a.state,
            a.postal_code,
          ],
        )?;
        let id = tx.last_insert_rowid();
        tx.commit()?;
        Ok(id)
      })
      .await?;
    Ok(id)
  }

  async fn get_client_by_tax_id(&self, tax_id: &str) -> Result<Option<Client>> {
    let tax_id = normalize_tax_id(tax_id);
    if tax_id.is_empty() {
      return Ok(None);
    }
    let client = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!(
                "SELECT {CLIENT_COLUMNS} FROM clients WHERE {} = ?1 ORDER BY id LIMIT 1",
                normalized_tax_id_sql("tax_id")
              ),
              rusqlite::params![tax_id],
              client_from_row,
            )
            .optional()?,
        )
      })
      .await?;
    Ok(client)
  }

  async fn search_clients(&self, prefix: &str, limit: usize) -> Result<Vec<Client>> {
    let pattern = like_prefix(prefix);
    let limit = i64::try_from(limit).unwrap_or(i64::MAX);
    let clients = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {CLIENT_COLUMNS} FROM clients
           WHERE name LIKE ?1 ESCAPE '\\'
           ORDER BY name COLLATE NOCASE LIMIT ?2"
        ))?;
        let rows = stmt
          .query_map(rusqlite::params![pattern, limit], client_from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;
    Ok(clients)
  }

  async fn list_clients(&self) -> Result<Vec<Client>> {
    let clients = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {CLIENT_COLUMNS} FROM clients ORDER BY name COLLATE NOCASE"
        ))?;
        let rows = stmt
          .query_map([], client_from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;
    Ok(clients)
  }

  async fn update_client(&self, id: i64, client: NewClient) -> Result<bool> {
    let name = client.name.trim().to_owned();
    if name.is_empty() {
      return Err(balcao_core::Error::Validation("client name is required".into()).into());
    }
    let tax_id = normalize_tax_id(&client.tax_id);

    let changed = self
      .conn
      .call(move |conn| {
        let a = &client.address;
        Ok(conn.execute(
          "UPDATE clients SET
             name = ?2, tax_id = ?3, phone = ?4, email = ?5,
             address_street = ?6, address_number = ?7, address_district = ?8,
             address_city = ?9, address_state = ?10, address_postal_code = ?11
           WHERE id = ?1",
          rusqlite::params![
            id,
            name,
            tax_id,
            client.phone,
            client.email,
            a.street,
            a.number,
            a.district,
            a.city,
            a.state,
            a.postal_code,
          ],
        )?)
      })
      .await?;
    Ok(changed > 0)
  }

  async fn delete_client(&self, id: i64) -> Result<bool> {
    let changed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute("DELETE FROM clients WHERE id = ?1", rusqlite::params![id])?)
      })
      .await?;
    Ok(changed > 0)
  }

  // ── Catalog ───────────────────────────────────────────────────────────────

  async fn upsert_product(&self, product: NewCatalogProduct) -> Result<i64> {
    let name = product.name.trim().to_owned();
    if name.is_empty() {
      return Err(balcao_core::Error::Validation("product name is required".into()).into());
    }

    let id = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        tx.execute(
          "INSERT INTO catalog_products (name, code, price, category, description)
           VALUES (?1, ?2, ?3, ?4, ?5)
           ON CONFLICT(name) DO UPDATE SET
             code        = excluded.code,
             price       = excluded.price,
             category    = excluded.category,
             description = excluded.description",
          rusqlite::params![
            name,
            product.code,
            product.price,
            product.category,
            product.description,
          ],
        )?;
        let id: i64 = tx.query_row(
          "SELECT id FROM catalog_products WHERE name = ?1",
          rusqlite::params![name],
          |r| r.get(0),
        )?;
        tx.commit()?;
        Ok(id)
      })
      .await?;
    Ok(id)
  }

  async fn get_product_by_name(&self, name: &str) -> Result<Option<CatalogProduct>> {
    let name = name.trim().to_owned();
    let product = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!("SELECT {PRODUCT_COLUMNS} FROM catalog_products WHERE name = ?1"),
              rusqlite::params![name],
              product_from_row,
            )
            .optional()?,
        )
      })
      .await?;
    Ok(product)
  }

  async fn search_products(&self, prefix: &str, limit: usize) -> Result<Vec<CatalogProduct>> {
    let pattern = like_prefix(prefix);
    let limit = i64::try_from(limit).unwrap_or(i64::MAX);
    let products = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {PRODUCT_COLUMNS} FROM catalog_products
           WHERE name LIKE ?1 ESCAPE '\\' OR code LIKE ?1 ESCAPE '\\'
           ORDER BY name COLLATE NOCASE LIMIT ?2"
        ))?;
        let rows = stmt
          .query_map(rusqlite::params![pattern, limit], product_from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;
    Ok(products)
  }

  async fn list_products(&self, category: Option<String>) -> Result<Vec<CatalogProduct>> {
    let products = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {PRODUCT_COLUMNS} FROM catalog_products
           WHERE ?1 IS NULL OR category = ?1
           ORDER BY category COLLATE NOCASE, name COLLATE NOCASE"
        ))?;
        let rows = stmt
          .query_map(rusqlite::params![category], product_from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;
    Ok(products)
  }

  async fn delete_product(&self, id: i64) -> Result<bool> {
    let changed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "DELETE FROM catalog_products WHERE id = ?1",
          rusqlite::params![id],
        )?)
      })
      .await?;
    Ok(changed > 0)
  }

  // ── Expenses ──────────────────────────────────────────────────────────────

  async fn add_expense(&self, expense: NewExpense) -> Result<i64> {
    if !expense.value.is_finite() {
      return Err(balcao_core::Error::Validation("expense value must be a number".into()).into());
    }
    let date = encode_date(expense.date);

    let id = self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO expenses (category, description, value, date) VALUES (?1, ?2, ?3, ?4)",
          rusqlite::params![
            expense.category.trim(),
            expense.description.trim(),
            expense.value,
            date,
          ],
        )?;
        Ok(conn.last_insert_rowid())
      })
      .await?;
    Ok(id)
  }

  async fn list_expenses(&self, start: NaiveDate, end: NaiveDate) -> Result<Vec<Expense>> {
    let (start, end) = (encode_date(start), encode_date(end));
    let raws: Vec<RawExpense> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {EXPENSE_COLUMNS} FROM expenses
           WHERE date BETWEEN ?1 AND ?2
           ORDER BY date DESC, id DESC"
        ))?;
        let rows = stmt
          .query_map(rusqlite::params![start, end], RawExpense::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawExpense::into_expense).collect()
  }

  async fn delete_expense(&self, id: i64) -> Result<bool> {
    let changed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute("DELETE FROM expenses WHERE id = ?1", rusqlite::params![id])?)
      })
      .await?;
    Ok(changed > 0)
  }

  async fn expense_total(&self, start: NaiveDate, end: NaiveDate) -> Result<f64> {
    let (start, end) = (encode_date(start), encode_date(end));
    let total = self
      .conn
      .call(move |conn| {
        Ok(conn.query_row(
          "SELECT COALESCE(SUM(value), 0.0) FROM expenses WHERE date BETWEEN ?1 AND ?2",
          rusqlite::params![start, end],
          |r| r.get::<_, f64>(0),
        )?)
      })
      .await?;
    Ok(total)
  }
}
