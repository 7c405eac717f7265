//! [`AppContext`], the single handle the presentation layer talks to.

use std::{fs, path::Path};

use anyhow::Context as _;
use balcao_core::{
  order::{NewOrder, OrderPatch},
  projector::{self, PeriodSummary, ProfitSummary},
  reconcile::ReconciledOrder,
  status::{self, DEFAULT_CATEGORIES, DEFAULT_STATUSES, OrderRow, StatusFilter, Vocabulary},
  store::LedgerStore,
};
use balcao_store_sqlite::{Result, SqliteStore};
use chrono::{Local, NaiveDate};

use crate::{Settings, telemetry};

/// Everything the application needs at runtime, built once at start-up.
pub struct AppContext {
  store:      SqliteStore,
  settings:   Settings,
  statuses:   Vocabulary,
  categories: Vocabulary,
}

impl AppContext {
  /// Load settings from `config_path`, initialise tracing and open the
  /// ledger.
  pub async fn bootstrap(config_path: Option<&Path>) -> anyhow::Result<Self> {
    let settings = Settings::load(config_path).context("failed to load settings")?;
    telemetry::init_tracing(&settings.log_filter);
    Self::open(settings).await
  }

  /// Open the ledger described by `settings`, creating the data directory if
  /// needed.
  pub async fn open(settings: Settings) -> anyhow::Result<Self> {
    let data_dir = settings.data_dir();
    fs::create_dir_all(&data_dir)
      .with_context(|| format!("failed to create data directory {data_dir:?}"))?;

    let db_path = settings.database_path();
    let store = SqliteStore::open(&db_path)
      .await
      .with_context(|| format!("failed to open store at {db_path:?}"))?;

    let statuses = Vocabulary::load(&settings.status_path(), DEFAULT_STATUSES);
    let categories = Vocabulary::load(&settings.categories_path(), DEFAULT_CATEGORIES);

    tracing::info!(
      data_dir = %data_dir.display(),
      statuses = statuses.entries().len(),
      categories = categories.entries().len(),
      "application context ready"
    );

    Ok(Self { store, settings, statuses, categories })
  }

  pub fn store(&self) -> &SqliteStore { &self.store }

  pub fn settings(&self) -> &Settings { &self.settings }

  pub fn statuses(&self) -> &Vocabulary { &self.statuses }

  pub fn categories(&self) -> &Vocabulary { &self.categories }

  // ─── Vocabularies ──────────────────────────────────────────────────────────

  /// Re-read both side-car files, picking up external edits.
  pub fn refresh_vocabularies(&mut self) {
    self.statuses = Vocabulary::load(&self.settings.status_path(), DEFAULT_STATUSES);
    self.categories =
      Vocabulary::load(&self.settings.categories_path(), DEFAULT_CATEGORIES);
  }

  /// Replace the status vocabulary and persist it.
  pub fn save_statuses<I, S>(&mut self, entries: I) -> anyhow::Result<()>
  where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
  {
    let vocabulary = Vocabulary::new(entries, DEFAULT_STATUSES);
    let path = self.settings.status_path();
    vocabulary
      .save(&path)
      .with_context(|| format!("failed to write {path:?}"))?;
    self.statuses = vocabulary;
    Ok(())
  }

  /// Replace the category vocabulary and persist it.
  pub fn save_categories<I, S>(&mut self, entries: I) -> anyhow::Result<()>
  where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
  {
    let vocabulary = Vocabulary::new(entries, DEFAULT_CATEGORIES);
    let path = self.settings.categories_path();
    vocabulary
      .save(&path)
      .with_context(|| format!("failed to write {path:?}"))?;
    self.categories = vocabulary;
    Ok(())
  }

  // ─── Orders ────────────────────────────────────────────────────────────────

  /// Create an order. A zero sequence number is replaced by the next free
  /// one and a missing status by the first vocabulary entry.
  pub async fn create_order(&self, mut order: NewOrder) -> Result<i64> {
    if order.sequence_no == 0 {
      order.sequence_no = self.store.next_sequence_number().await?;
    }
    if order.extensions.status.is_none() {
      order.extensions.status = Some(self.statuses.default_entry().to_owned());
    }
    self.store.create_order(order).await
  }

  pub async fn update_order(&self, id: i64, patch: OrderPatch) -> Result<bool> {
    self.store.update_order(id, patch).await
  }

  /// Set only the status of an order. Any label is accepted.
  pub async fn set_status(&self, id: i64, status: &str) -> Result<bool> {
    if !self.statuses.contains(status) {
      tracing::debug!(order_id = id, status, "status is not in the vocabulary");
    }
    let mut patch = OrderPatch::default();
    patch.extensions.status = Some(status.trim().to_owned());
    self.store.update_order(id, patch).await
  }

  pub async fn delete_order(&self, id: i64) -> Result<bool> { self.store.delete_order(id).await }

  /// The order with its line items and totals derived, ready for the
  /// document generator.
  pub async fn reconciled_order(&self, id: i64) -> Result<Option<ReconciledOrder>> {
    Ok(self.store.get_order(id).await?.map(ReconciledOrder::new))
  }

  /// Record where the printable document for `id` was written.
  pub async fn record_document(&self, id: i64, reference: impl Into<String>) -> Result<bool> {
    self.store.set_document_ref(id, reference.into()).await
  }

  /// The order listing as of today, using the configured `hide_completed`.
  pub async fn list_view(&self, filter: &str) -> Result<Vec<OrderRow>> {
    self
      .list_view_on(filter, self.settings.hide_completed, Local::now().date_naive())
      .await
  }

  pub async fn list_view_on(
    &self,
    filter: &str,
    hide_completed: bool,
    today: NaiveDate,
  ) -> Result<Vec<OrderRow>> {
    let orders = self.store.list_all_orders().await?;
    Ok(status::list_view(
      orders,
      &self.statuses,
      &StatusFilter::parse(filter),
      hide_completed,
      today,
    ))
  }

  // ─── Reports ───────────────────────────────────────────────────────────────

  pub async fn period_summary(&self, start: NaiveDate, end: NaiveDate) -> Result<PeriodSummary> {
    projector::period_summary(&self.store, start, end).await
  }

  pub async fn monthly_summary(&self, year: i32, month: u32) -> Result<PeriodSummary> {
    projector::monthly_summary(&self.store, year, month).await
  }

  pub async fn annual_summary(&self, year: i32) -> Result<PeriodSummary> {
    projector::annual_summary(&self.store, year).await
  }

  pub async fn all_time_summary(&self) -> Result<PeriodSummary> {
    projector::all_time_summary(&self.store).await
  }

  pub async fn profit_summary(&self, start: NaiveDate, end: NaiveDate) -> Result<ProfitSummary> {
    projector::profit_summary(&self.store, start, end).await
  }

  /// A client's orders, newest first.
  pub async fn client_history(&self, tax_id: &str) -> Result<Vec<ReconciledOrder>> {
    let orders = projector::client_totals(&self.store, tax_id).await?;
    Ok(orders.into_iter().map(ReconciledOrder::new).collect())
  }
}
