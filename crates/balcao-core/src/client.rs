//! Client directory records.

/// Strip everything but ASCII digits from a CPF/CNPJ.
pub fn normalize_tax_id(raw: &str) -> String {
  raw.chars().filter(char::is_ascii_digit).collect()
}

/// A structured postal address.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Address {
  pub street:      String,
  pub number:      String,
  pub district:    String,
  pub city:        String,
  pub state:       String,
  pub postal_code: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Client {
  pub id:      i64,
  pub name:    String,
  /// Digits only; may be empty for walk-in clients.
  pub tax_id:  String,
  pub phone:   String,
  pub email:   String,
  pub address: Address,
}

/// Input to [`crate::store::LedgerStore::upsert_client`] and
/// [`crate::store::LedgerStore::update_client`].
#[derive(Debug, Clone, Default)]
pub struct NewClient {
  pub name:    String,
  pub tax_id:  String,
  pub phone:   String,
  pub email:   String,
  pub address: Address,
}

impl NewClient {
  pub fn new(name: impl Into<String>, tax_id: impl AsRef<str>) -> Self {
    Self {
      name: name.into(),
      tax_id: normalize_tax_id(tax_id.as_ref()),
      ..Default::default()
    }
  }
}
