//! The typed Extensions side-channel attached to every order.
//!
//! On disk this is an open-ended JSON object (`extensions_json`). Inside the
//! ledger it is always an [`Extensions`] value: known keys become typed
//! fields, unknown keys are carried in [`Extensions::extra`] so that a
//! read-merge-write never drops data written by a newer version.
//!
//! Decoding is lenient per key. A numeric field stored as `"12,50"` is
//! coerced, a field of the wrong shape is ignored. Only a payload that is not
//! a JSON object at all is reported as malformed.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::{Error, Result, money::parse_br_number};

// ─── Keys ────────────────────────────────────────────────────────────────────

pub const KEY_STATUS: &str = "status";
pub const KEY_DISCOUNT: &str = "desconto";
pub const KEY_COLOR: &str = "cor";
pub const KEY_REINFORCEMENT: &str = "reforco";
pub const KEY_PRODUCTS: &str = "produtos";
pub const KEY_DELIVERY_DATE: &str = "data_entrega";

// ─── LineItem ────────────────────────────────────────────────────────────────

/// One product entry within an order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
  #[serde(rename = "descricao")]
  pub description: String,
  #[serde(rename = "valor")]
  pub unit_value:  f64,
  #[serde(rename = "quantidade", default = "default_quantity")]
  pub quantity:    u32,
}

fn default_quantity() -> u32 { 1 }

impl LineItem {
  pub fn new(description: impl Into<String>, unit_value: f64) -> Self {
    Self { description: description.into(), unit_value, quantity: 1 }
  }

  pub fn with_quantity(mut self, quantity: u32) -> Self {
    self.quantity = quantity;
    self
  }

  /// `unit_value × quantity`.
  pub fn subtotal(&self) -> f64 { self.unit_value * f64::from(self.quantity) }

  /// Build a line item from an arbitrary JSON value without failing.
  ///
  /// Objects are read by key (`descricao`/`nome`, `valor`/`preco`,
  /// `quantidade`/`qtd`); a bare string becomes a zero-value item.
  pub fn from_value_lenient(value: &Value) -> Self {
    match value {
      Value::Object(map) => {
        let description = first_key(map, &["descricao", "nome"])
          .map(|v| match v {
            Value::String(s) => s.trim().to_owned(),
            Value::Null => String::new(),
            other => other.to_string(),
          })
          .unwrap_or_default();
        let unit_value = first_key(map, &["valor", "preco"])
          .and_then(coerce_f64)
          .unwrap_or(0.0);
        let quantity = first_key(map, &["quantidade", "qtd"])
          .and_then(coerce_f64)
          .filter(|q| *q >= 0.0)
          .map(|q| q.round() as u32)
          .unwrap_or(1);
        Self { description, unit_value, quantity }
      }
      Value::String(s) => Self::new(s.trim(), 0.0),
      other => Self::new(other.to_string(), 0.0),
    }
  }
}

fn first_key<'a>(map: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a Value> {
  keys.iter().find_map(|k| map.get(*k))
}

/// Accept JSON numbers and numeric-looking strings.
fn coerce_f64(value: &Value) -> Option<f64> {
  match value {
    Value::Number(n) => n.as_f64(),
    Value::String(s) => parse_br_number(s),
    _ => None,
  }
}

fn coerce_bool(value: &Value) -> Option<bool> {
  match value {
    Value::Bool(b) => Some(*b),
    Value::Number(n) => n.as_f64().map(|f| f != 0.0),
    Value::String(s) => match s.trim().to_lowercase().as_str() {
      "sim" | "s" | "true" | "1" | "yes" => Some(true),
      "nao" | "não" | "n" | "false" | "0" | "no" | "" => Some(false),
      _ => None,
    },
    _ => None,
  }
}

fn coerce_string(value: &Value) -> Option<String> {
  match value {
    Value::String(s) => Some(s.clone()),
    Value::Number(n) => Some(n.to_string()),
    _ => None,
  }
}

// ─── Extensions ──────────────────────────────────────────────────────────────

/// Order attributes that are not promoted to relational columns.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Extensions {
  pub status:        Option<String>,
  pub discount:      Option<f64>,
  pub color:         Option<String>,
  pub reinforcement: Option<bool>,
  /// Structured line items. `None` marks a legacy order whose products live
  /// only in the free-text summary.
  pub products:      Option<Vec<LineItem>>,
  /// Explicit delivery date as typed by the user (ISO or `DD/MM/YYYY`).
  pub delivery_date: Option<String>,
  /// Keys this version does not know about, preserved verbatim.
  pub extra:         Map<String, Value>,
}

impl Extensions {
  /// Parse the raw `extensions_json` column.
  ///
  /// `None`, an empty string and JSON `null` all decode to the empty value.
  pub fn parse(raw: Option<&str>) -> Result<Self> {
    let raw = match raw.map(str::trim) {
      None | Some("") => return Ok(Self::default()),
      Some(r) => r,
    };
    match serde_json::from_str::<Value>(raw)? {
      Value::Object(map) => Ok(Self::from_map(map)),
      Value::Null => Ok(Self::default()),
      other => Err(Error::MalformedExtensions(format!(
        "expected a JSON object, found {}",
        json_kind(&other)
      ))),
    }
  }

  pub fn from_map(mut map: Map<String, Value>) -> Self {
    let status = map
      .remove(KEY_STATUS)
      .as_ref()
      .and_then(coerce_string)
      .map(|s| s.trim().to_owned())
      .filter(|s| !s.is_empty());
    let discount = map.remove(KEY_DISCOUNT).as_ref().and_then(coerce_f64);
    let color = map.remove(KEY_COLOR).as_ref().and_then(coerce_string);
    let reinforcement = map.remove(KEY_REINFORCEMENT).as_ref().and_then(coerce_bool);
    let products = match map.remove(KEY_PRODUCTS) {
      Some(Value::Array(items)) => {
        Some(items.iter().map(LineItem::from_value_lenient).collect())
      }
      _ => None,
    };
    let delivery_date = map
      .remove(KEY_DELIVERY_DATE)
      .as_ref()
      .and_then(coerce_string)
      .map(|s| s.trim().to_owned())
      .filter(|s| !s.is_empty());

    Self {
      status,
      discount,
      color,
      reinforcement,
      products,
      delivery_date,
      extra: map,
    }
  }

  /// The JSON object form; `None` fields are omitted.
  pub fn to_map(&self) -> Map<String, Value> {
    let mut map = self.extra.clone();
    if let Some(s) = &self.status {
      map.insert(KEY_STATUS.into(), Value::String(s.clone()));
    }
    if let Some(d) = self.discount {
      map.insert(KEY_DISCOUNT.into(), Value::from(d));
    }
    if let Some(c) = &self.color {
      map.insert(KEY_COLOR.into(), Value::String(c.clone()));
    }
    if let Some(r) = self.reinforcement {
      map.insert(KEY_REINFORCEMENT.into(), Value::Bool(r));
    }
    if let Some(items) = &self.products {
      let items = items
        .iter()
        .map(|item| {
          serde_json::json!({
            "descricao":  item.description,
            "valor":      item.unit_value,
            "quantidade": item.quantity,
          })
        })
        .collect();
      map.insert(KEY_PRODUCTS.into(), Value::Array(items));
    }
    if let Some(d) = &self.delivery_date {
      map.insert(KEY_DELIVERY_DATE.into(), Value::String(d.clone()));
    }
    map
  }

  pub fn to_json_string(&self) -> Result<String> {
    Ok(serde_json::to_string(&Value::Object(self.to_map()))?)
  }

  /// Overlay every key present in `patch` onto `self`. Absent keys keep their
  /// current value.
  pub fn merge(&mut self, patch: &Extensions) {
    let mut merged = self.to_map();
    for (key, value) in patch.to_map() {
      merged.insert(key, value);
    }
    *self = Self::from_map(merged);
  }

  /// Discount amount, zero when absent.
  pub fn discount_value(&self) -> f64 { self.discount.unwrap_or(0.0) }
}

fn json_kind(value: &Value) -> &'static str {
  match value {
    Value::Null => "null",
    Value::Bool(_) => "a boolean",
    Value::Number(_) => "a number",
    Value::String(_) => "a string",
    Value::Array(_) => "an array",
    Value::Object(_) => "an object",
  }
}
