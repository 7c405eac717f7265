//! Encoding and decoding helpers between domain types and the plain
//! representations stored in SQLite columns.
//!
//! Timestamps are local naive date-times stored as `YYYY-MM-DD HH:MM:SS` so
//! they sort lexicographically and their first ten characters are the date.
//! The Extensions blob is compact JSON and is decoded leniently: a corrupted
//! payload is logged and read as empty.

use balcao_core::{
  catalog::CatalogProduct,
  client::{Address, Client},
  expense::Expense,
  extensions::Extensions,
  order::Order,
};
use chrono::{NaiveDate, NaiveDateTime};
use rusqlite::Row;

use crate::{Error, Result};

// ─── Dates ───────────────────────────────────────────────────────────────────

const DT_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
const DATE_FORMAT: &str = "%Y-%m-%d";

const DT_READ_FORMATS: &[&str] = &[
  "%Y-%m-%d %H:%M:%S%.f",
  "%Y-%m-%dT%H:%M:%S%.f",
  "%Y-%m-%d %H:%M",
];

pub fn encode_dt(dt: NaiveDateTime) -> String { dt.format(DT_FORMAT).to_string() }

/// Accepts the canonical format plus the ISO variants older rows may carry.
pub fn decode_dt(s: &str) -> Result<NaiveDateTime> {
  let s = s.trim();
  DT_READ_FORMATS
    .iter()
    .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
    .or_else(|| {
      NaiveDate::parse_from_str(s, DATE_FORMAT)
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
    })
    .ok_or_else(|| Error::DateParse(format!("unrecognised timestamp: {s:?}")))
}

pub fn encode_date(d: NaiveDate) -> String { d.format(DATE_FORMAT).to_string() }

pub fn decode_date(s: &str) -> Result<NaiveDate> {
  NaiveDate::parse_from_str(s.trim(), DATE_FORMAT)
    .map_err(|e| Error::DateParse(format!("{s:?}: {e}")))
}

// ─── Extensions ──────────────────────────────────────────────────────────────

pub fn encode_extensions(ext: &Extensions) -> Result<String> { Ok(ext.to_json_string()?) }

/// Never fails: a malformed blob is reported and treated as empty.
pub fn decode_extensions(order_id: i64, raw: Option<&str>) -> Extensions {
  Extensions::parse(raw).unwrap_or_else(|e| {
    tracing::warn!(order_id, error = %e, "malformed extensions; treating as empty");
    Extensions::default()
  })
}

// ─── Text helpers ────────────────────────────────────────────────────────────

/// A `LIKE` pattern matching strings that start with `prefix`. Wildcards in
/// the prefix are escaped with `\`.
pub fn like_prefix(prefix: &str) -> String {
  let mut pattern = String::with_capacity(prefix.len() + 1);
  for c in prefix.trim().chars() {
    if matches!(c, '%' | '_' | '\\') {
      pattern.push('\\');
    }
    pattern.push(c);
  }
  pattern.push('%');
  pattern
}

/// SQL expression that strips CPF/CNPJ punctuation from a column, so rows
/// written before tax ids were normalised still match.
pub fn normalized_tax_id_sql(column: &str) -> String {
  format!(
    "replace(replace(replace(replace({column}, '.', ''), '-', ''), '/', ''), ' ', '')"
  )
}

// ─── Orders ──────────────────────────────────────────────────────────────────

/// Column list shared by every order query; matches [`RawOrder::from_row`].
pub const ORDER_COLUMNS: &str = "id, sequence_no, created_at, client_name, client_tax_id, \
   client_phone, product_summary_text, product_value, downpayment_value, freight_value, \
   payment_method, lead_time_days, document_ref, extensions_json";

/// Raw values read directly from an `orders` row.
pub struct RawOrder {
  pub id:                i64,
  pub sequence_no:       i64,
  pub created_at:        String,
  pub client_name:       String,
  pub client_tax_id:     Option<String>,
  pub client_phone:      Option<String>,
  pub product_summary:   Option<String>,
  pub product_value:     Option<f64>,
  pub downpayment_value: Option<f64>,
  pub freight_value:     Option<f64>,
  pub payment_method:    Option<String>,
  pub lead_time_days:    Option<i64>,
  pub document_ref:      Option<String>,
  pub extensions_json:   Option<String>,
}

impl RawOrder {
  pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:                row.get(0)?,
      sequence_no:       row.get(1)?,
      created_at:        row.get(2)?,
      client_name:       row.get(3)?,
      client_tax_id:     row.get(4)?,
      client_phone:      row.get(5)?,
      product_summary:   row.get(6)?,
      product_value:     row.get(7)?,
      downpayment_value: row.get(8)?,
      freight_value:     row.get(9)?,
      payment_method:    row.get(10)?,
      lead_time_days:    row.get(11)?,
      document_ref:      row.get(12)?,
      extensions_json:   row.get(13)?,
    })
  }

  pub fn into_order(self) -> Result<Order> {
    Ok(Order {
      id:                self.id,
      sequence_no:       self.sequence_no,
      created_at:        decode_dt(&self.created_at)?,
      client_name:       self.client_name,
      client_tax_id:     self.client_tax_id.unwrap_or_default(),
      client_phone:      self.client_phone.unwrap_or_default(),
      product_summary:   self.product_summary.unwrap_or_default(),
      product_value:     self.product_value.unwrap_or_default(),
      downpayment_value: self.downpayment_value.unwrap_or_default(),
      freight_value:     self.freight_value.unwrap_or_default(),
      payment_method:    self.payment_method.unwrap_or_default(),
      lead_time_days:    self.lead_time_days.unwrap_or_default(),
      document_ref:      self.document_ref.filter(|r| !r.trim().is_empty()),
      extensions:        decode_extensions(self.id, self.extensions_json.as_deref()),
    })
  }
}

// ─── Clients ─────────────────────────────────────────────────────────────────

pub const CLIENT_COLUMNS: &str = "id, name, tax_id, phone, email, address_street, \
   address_number, address_district, address_city, address_state, address_postal_code";

pub fn client_from_row(row: &Row<'_>) -> rusqlite::Result<Client> {
  Ok(Client {
    id:      row.get(0)?,
    name:    row.get(1)?,
    tax_id:  row.get(2)?,
    phone:   row.get(3)?,
    email:   row.get(4)?,
    address: Address {
      street:      row.get(5)?,
      number:      row.get(6)?,
      district:    row.get(7)?,
      city:        row.get(8)?,
      state:       row.get(9)?,
      postal_code: row.get(10)?,
    },
  })
}

// ─── Catalog ─────────────────────────────────────────────────────────────────

pub const PRODUCT_COLUMNS: &str = "id, name, code, price, category, description";

pub fn product_from_row(row: &Row<'_>) -> rusqlite::Result<CatalogProduct> {
  Ok(CatalogProduct {
    id:          row.get(0)?,
    name:        row.get(1)?,
    code:        row.get(2)?,
    price:       row.get(3)?,
    category:    row.get(4)?,
    description: row.get(5)?,
  })
}

// ─── Expenses ────────────────────────────────────────────────────────────────

pub const EXPENSE_COLUMNS: &str = "id, category, description, value, date";

/// Raw values read directly from an `expenses` row.
pub struct RawExpense {
  pub id:          i64,
  pub category:    String,
  pub description: String,
  pub value:       f64,
  pub date:        String,
}

impl RawExpense {
  pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:          row.get(0)?,
      category:    row.get(1)?,
      description: row.get(2)?,
      value:       row.get(3)?,
      date:        row.get(4)?,
    })
  }

  pub fn into_expense(self) -> Result<Expense> {
    Ok(Expense {
      id:          self.id,
      category:    self.category,
      description: self.description,
      value:       self.value,
      date:        decode_date(&self.date)?,
    })
  }
}
