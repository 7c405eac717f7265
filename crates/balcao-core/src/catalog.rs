//! Catalog products, an autocomplete source for order entry.
//!
//! Orders copy description and price at creation time, so editing or deleting
//! a catalog entry never changes an existing order.

#[derive(Debug, Clone, PartialEq)]
pub struct CatalogProduct {
  pub id:          i64,
  /// Unique.
  pub name:        String,
  pub code:        Option<String>,
  pub price:       f64,
  pub category:    String,
  pub description: String,
}

#[derive(Debug, Clone, Default)]
pub struct NewCatalogProduct {
  pub name:        String,
  pub code:        Option<String>,
  pub price:       f64,
  pub category:    String,
  pub description: String,
}

impl NewCatalogProduct {
  pub fn new(name: impl Into<String>, price: f64) -> Self {
    Self { name: name.into(), price, ..Default::default() }
  }
}

impl From<&CatalogProduct> for crate::extensions::LineItem {
  fn from(product: &CatalogProduct) -> Self {
    crate::extensions::LineItem::new(product.name.clone(), product.price)
  }
}
