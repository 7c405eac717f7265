//! Financial projections.
//!
//! Every figure is recomputed from reconciled line items on each call. The
//! cached `product_value` column is only consulted for legacy orders whose
//! text carries no readable price at all.

use chrono::NaiveDate;
use serde::Serialize;

use crate::{
  Error, Result,
  client::normalize_tax_id,
  order::Order,
  reconcile::{ItemSource, reconcile_items},
  store::LedgerStore,
};

// ─── Per-order ───────────────────────────────────────────────────────────────

/// Σ(unit value × quantity) over the canonical line items, with the legacy
/// scalar as a last resort.
pub fn product_subtotal(order: &Order) -> f64 {
  let rec = reconcile_items(order);
  let sum = || rec.items.iter().map(|item| item.subtotal()).sum::<f64>();
  match rec.source {
    ItemSource::Structured => sum(),
    ItemSource::Legacy { priced_lines } if priced_lines > 0 => sum(),
    ItemSource::Legacy { .. } => order.product_value,
  }
}

/// `product subtotal + freight − discount`.
pub fn total_value(order: &Order) -> f64 {
  product_subtotal(order) + order.freight_value - order.extensions.discount_value()
}

/// What the client still owes: `total value − down payment`.
pub fn outstanding_balance(order: &Order) -> f64 {
  total_value(order) - order.downpayment_value
}

// ─── Periods ─────────────────────────────────────────────────────────────────

/// An inclusive range of calendar dates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Period {
  pub start: NaiveDate,
  pub end:   NaiveDate,
}

impl Period {
  pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self> {
    if start > end {
      return Err(Error::InvalidPeriod { start, end });
    }
    Ok(Self { start, end })
  }

  /// The whole calendar month `month` (1–12) of `year`.
  pub fn month(year: i32, month: u32) -> Result<Self> {
    let start = NaiveDate::from_ymd_opt(year, month, 1)
      .ok_or_else(|| Error::Validation(format!("invalid month {year}-{month:02}")))?;
    let (next_year, next_month) = if month == 12 { (year + 1, 1) } else { (year, month + 1) };
    let end = NaiveDate::from_ymd_opt(next_year, next_month, 1)
      .and_then(|d| d.pred_opt())
      .ok_or_else(|| Error::Validation(format!("invalid month {year}-{month:02}")))?;
    Self::new(start, end)
  }

  /// The whole calendar year.
  pub fn year(year: i32) -> Result<Self> {
    let start = NaiveDate::from_ymd_opt(year, 1, 1)
      .ok_or_else(|| Error::Validation(format!("invalid year {year}")))?;
    let end = NaiveDate::from_ymd_opt(year, 12, 31)
      .ok_or_else(|| Error::Validation(format!("invalid year {year}")))?;
    Self::new(start, end)
  }
}

// ─── Summaries ───────────────────────────────────────────────────────────────

/// Aggregate over a set of orders.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct PeriodSummary {
  pub count:              usize,
  pub total_value:        f64,
  pub total_downpayments: f64,
  /// `total_value / count`, zero for an empty set.
  pub average_ticket:     f64,
}

/// Fold `orders` into a [`PeriodSummary`].
pub fn summarize<'a>(orders: impl IntoIterator<Item = &'a Order>) -> PeriodSummary {
  let mut summary = orders
    .into_iter()
    .fold(PeriodSummary::default(), |mut acc, order| {
      acc.count += 1;
      acc.total_value += total_value(order);
      acc.total_downpayments += order.downpayment_value;
      acc
    });
  if summary.count > 0 {
    summary.average_ticket = summary.total_value / summary.count as f64;
  }
  summary
}

/// Revenue from orders against the independent expense ledger.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct ProfitSummary {
  pub revenue:  f64,
  pub expenses: f64,
  pub profit:   f64,
}

// ─── Store-backed projections ────────────────────────────────────────────────

/// Summarise orders created within `[start, end]` inclusive.
pub async fn period_summary<S: LedgerStore>(
  store: &S,
  start: NaiveDate,
  end: NaiveDate,
) -> Result<PeriodSummary, S::Error> {
  let period = Period::new(start, end)?;
  let orders = store
    .list_orders_created_between(period.start, period.end)
    .await?;
  Ok(summarize(&orders))
}

pub async fn monthly_summary<S: LedgerStore>(
  store: &S,
  year: i32,
  month: u32,
) -> Result<PeriodSummary, S::Error> {
  let period = Period::month(year, month)?;
  period_summary(store, period.start, period.end).await
}

pub async fn annual_summary<S: LedgerStore>(
  store: &S,
  year: i32,
) -> Result<PeriodSummary, S::Error> {
  let period = Period::year(year)?;
  period_summary(store, period.start, period.end).await
}

pub async fn all_time_summary<S: LedgerStore>(store: &S) -> Result<PeriodSummary, S::Error> {
  let orders = store.list_all_orders().await?;
  Ok(summarize(&orders))
}

/// All orders of one client, newest first.
pub async fn client_totals<S: LedgerStore>(
  store: &S,
  tax_id: &str,
) -> Result<Vec<Order>, S::Error> {
  let normalized = normalize_tax_id(tax_id);
  if normalized.is_empty() {
    return Ok(Vec::new());
  }
  store.list_orders_by_tax_id(&normalized).await
}

pub async fn profit_summary<S: LedgerStore>(
  store: &S,
  start: NaiveDate,
  end: NaiveDate,
) -> Result<ProfitSummary, S::Error> {
  let revenue = period_summary(store, start, end).await?.total_value;
  let expenses = store.expense_total(start, end).await?;
  Ok(ProfitSummary { revenue, expenses, profit: revenue - expenses })
}
