//! The `LedgerStore` trait.
//!
//! The trait is implemented by storage backends (e.g. `balcao-store-sqlite`).
//! The projector and the application context depend on this abstraction, not
//! on any concrete backend. A single store handle is opened at process start
//! and passed by reference to every caller.
//!
//! Lookups that find nothing return `Ok(None)` (or `Ok(false)` for deletes and
//! updates); errors are reserved for validation failures and an unusable
//! backing store.

use std::future::Future;

use chrono::NaiveDate;

use crate::{
  catalog::{CatalogProduct, NewCatalogProduct},
  client::{Client, NewClient},
  expense::{Expense, NewExpense},
  order::{NewOrder, Order, OrderPatch},
};

pub trait LedgerStore: Send + Sync {
  type Error: std::error::Error + From<crate::Error> + Send + Sync + 'static;

  // ── Orders ────────────────────────────────────────────────────────────

  /// The next unused business sequence number. Numbers are never handed out
  /// twice, even after the order that used one is deleted.
  fn next_sequence_number(
    &self,
  ) -> impl Future<Output = Result<i64, Self::Error>> + Send + '_;

  /// Validate and persist a new order, returning its surrogate id.
  ///
  /// Fails with a validation error when a required field is missing or the
  /// sequence number is already taken; nothing is written in that case.
  fn create_order(
    &self,
    order: NewOrder,
  ) -> impl Future<Output = Result<i64, Self::Error>> + Send + '_;

  fn get_order(
    &self,
    id: i64,
  ) -> impl Future<Output = Result<Option<Order>, Self::Error>> + Send + '_;

  fn get_order_by_sequence(
    &self,
    sequence_no: i64,
  ) -> impl Future<Output = Result<Option<Order>, Self::Error>> + Send + '_;

  /// The `limit` most recently created orders, newest first, regardless of
  /// status.
  fn list_recent_orders(
    &self,
    limit: usize,
  ) -> impl Future<Output = Result<Vec<Order>, Self::Error>> + Send + '_;

  /// Every order, newest first.
  fn list_all_orders(
    &self,
  ) -> impl Future<Output = Result<Vec<Order>, Self::Error>> + Send + '_;

  /// Orders whose creation date lies in `[start, end]`, newest first.
  fn list_orders_created_between(
    &self,
    start: NaiveDate,
    end: NaiveDate,
  ) -> impl Future<Output = Result<Vec<Order>, Self::Error>> + Send + '_;

  /// Orders whose client tax id matches once both sides are normalised,
  /// newest first.
  fn list_orders_by_tax_id<'a>(
    &'a self,
    tax_id: &'a str,
  ) -> impl Future<Output = Result<Vec<Order>, Self::Error>> + Send + 'a;

  /// Apply a partial update. Returns `false` if the order does not exist.
  fn update_order(
    &self,
    id: i64,
    patch: OrderPatch,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  /// Record the reference of a freshly generated document.
  fn set_document_ref(
    &self,
    id: i64,
    reference: String,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  /// Hard-delete an order. Returns `false` if it did not exist.
  fn delete_order(
    &self,
    id: i64,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  // ── Clients ───────────────────────────────────────────────────────────

  /// Insert a client unless one with the same tax id exists; either way,
  /// return the id of the stored client.
  fn upsert_client(
    &self,
    client: NewClient,
  ) -> impl Future<Output = Result<i64, Self::Error>> + Send + '_;

  fn get_client_by_tax_id<'a>(
    &'a self,
    tax_id: &'a str,
  ) -> impl Future<Output = Result<Option<Client>, Self::Error>> + Send + 'a;

  /// Clients whose name starts with `prefix` (case-insensitive), for
  /// autocomplete.
  fn search_clients<'a>(
    &'a self,
    prefix: &'a str,
    limit: usize,
  ) -> impl Future<Output = Result<Vec<Client>, Self::Error>> + Send + 'a;

  fn list_clients(
    &self,
  ) -> impl Future<Output = Result<Vec<Client>, Self::Error>> + Send + '_;

  fn update_client(
    &self,
    id: i64,
    client: NewClient,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  fn delete_client(
    &self,
    id: i64,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  // ── Catalog ───────────────────────────────────────────────────────────

  /// Insert a product, or update the existing product with the same name.
  fn upsert_product(
    &self,
    product: NewCatalogProduct,
  ) -> impl Future<Output = Result<i64, Self::Error>> + Send + '_;

  fn get_product_by_name<'a>(
    &'a self,
    name: &'a str,
  ) -> impl Future<Output = Result<Option<CatalogProduct>, Self::Error>> + Send + 'a;

  fn search_products<'a>(
    &'a self,
    prefix: &'a str,
    limit: usize,
  ) -> impl Future<Output = Result<Vec<CatalogProduct>, Self::Error>> + Send + 'a;

  fn list_products(
    &self,
    category: Option<String>,
  ) -> impl Future<Output = Result<Vec<CatalogProduct>, Self::Error>> + Send + '_;

  fn delete_product(
    &self,
    id: i64,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  // ── Expenses ──────────────────────────────────────────────────────────

  fn add_expense(
    &self,
    expense: NewExpense,
  ) -> impl Future<Output = Result<i64, Self::Error>> + Send + '_;

  /// Expenses dated within `[start, end]`, newest first.
  fn list_expenses(
    &self,
    start: NaiveDate,
    end: NaiveDate,
  ) -> impl Future<Output = Result<Vec<Expense>, Self::Error>> + Send + '_;

  fn delete_expense(
    &self,
    id: i64,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  /// Sum of expenses dated within `[start, end]`.
  fn expense_total(
    &self,
    start: NaiveDate,
    end: NaiveDate,
  ) -> impl Future<Output = Result<f64, Self::Error>> + Send + '_;
}
