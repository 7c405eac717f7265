//! Order records: fixed relational fields plus the typed [`Extensions`].

use chrono::NaiveDateTime;

use crate::{Error, Result, client::normalize_tax_id, extensions::Extensions};

/// A persisted order.
///
/// Client fields are a snapshot taken at creation time; later edits to the
/// client directory do not reach existing orders.
#[derive(Debug, Clone, PartialEq)]
pub struct Order {
  pub id:                i64,
  /// Business-facing order number. Unique and never reused.
  pub sequence_no:       i64,
  pub created_at:        NaiveDateTime,
  pub client_name:       String,
  /// Digits only.
  pub client_tax_id:     String,
  pub client_phone:      String,
  /// Legacy free-text product description, one product per line.
  pub product_summary:   String,
  /// Legacy cached product value. Only trusted when no line items exist.
  pub product_value:     f64,
  pub downpayment_value: f64,
  pub freight_value:     f64,
  pub payment_method:    String,
  pub lead_time_days:    i64,
  /// Reference to the last generated printable document, if any.
  pub document_ref:      Option<String>,
  pub extensions:        Extensions,
}

/// Input to [`crate::store::LedgerStore::create_order`].
#[derive(Debug, Clone, Default)]
pub struct NewOrder {
  pub sequence_no:       i64,
  /// Defaults to the current local time when `None`.
  pub created_at:        Option<NaiveDateTime>,
  pub client_name:       String,
  pub client_tax_id:     String,
  pub client_phone:      String,
  pub product_summary:   String,
  pub product_value:     f64,
  pub downpayment_value: f64,
  pub freight_value:     f64,
  pub payment_method:    String,
  pub lead_time_days:    i64,
  pub document_ref:      Option<String>,
  pub extensions:        Extensions,
}

impl NewOrder {
  pub fn new(sequence_no: i64, client_name: impl Into<String>) -> Self {
    Self {
      sequence_no,
      client_name: client_name.into(),
      ..Default::default()
    }
  }

  /// Check required fields and normalise the tax id in place.
  pub fn validate(&mut self) -> Result<()> {
    self.client_name = self.client_name.trim().to_owned();
    if self.client_name.is_empty() {
      return Err(Error::Validation("client name is required".into()));
    }
    if self.sequence_no <= 0 {
      return Err(Error::Validation(format!(
        "sequence number must be positive, got {}",
        self.sequence_no
      )));
    }
    self.client_tax_id = normalize_tax_id(&self.client_tax_id);
    Ok(())
  }
}

/// A partial update for [`crate::store::LedgerStore::update_order`].
///
/// Relational fields that are `Some` overwrite the stored column. Keys set
/// in `extensions` are merged into the stored blob; keys left `None` keep
/// their current value.
#[derive(Debug, Clone, Default)]
pub struct OrderPatch {
  pub client_name:       Option<String>,
  pub client_tax_id:     Option<String>,
  pub client_phone:      Option<String>,
  pub product_summary:   Option<String>,
  pub product_value:     Option<f64>,
  pub downpayment_value: Option<f64>,
  pub freight_value:     Option<f64>,
  pub payment_method:    Option<String>,
  pub lead_time_days:    Option<i64>,
  pub document_ref:      Option<String>,
  pub extensions:        Extensions,
}

impl OrderPatch {
  /// Validate and normalise the relational part of the patch.
  pub fn validate(&mut self) -> Result<()> {
    if let Some(name) = &mut self.client_name {
      *name = name.trim().to_owned();
      if name.is_empty() {
        return Err(Error::Validation("client name cannot be blank".into()));
      }
    }
    if let Some(tax_id) = &mut self.client_tax_id {
      *tax_id = normalize_tax_id(tax_id);
    }
    Ok(())
  }

  pub fn touches_extensions(&self) -> bool {
    !self.extensions.to_map().is_empty()
  }
}
