//! Delivery scheduling: due dates and remaining days.
//!
//! A due date is either typed explicitly (`data_entrega` in the Extensions)
//! or derived as creation date + lead time. When neither is available the due
//! date is *undefined* and stays `None` all the way to the caller; it is never
//! coerced to zero days.

use chrono::{DateTime, Days, Local, NaiveDate, NaiveDateTime};

use crate::order::Order;

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%d/%m/%Y"];

const DATETIME_FORMATS: &[&str] = &[
  "%Y-%m-%dT%H:%M:%S%.f",
  "%Y-%m-%d %H:%M:%S%.f",
  "%Y-%m-%dT%H:%M",
  "%Y-%m-%d %H:%M",
  "%d/%m/%Y %H:%M:%S",
  "%d/%m/%Y %H:%M",
];

/// Parse an explicit delivery date: ISO date, ISO date-time (with or without
/// offset) or `DD/MM/YYYY`.
pub fn parse_delivery_date(raw: &str) -> Option<NaiveDate> {
  let raw = raw.trim();
  if raw.is_empty() {
    return None;
  }
  if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
    return Some(dt.date_naive());
  }
  DATE_FORMATS
    .iter()
    .find_map(|fmt| NaiveDate::parse_from_str(raw, fmt).ok())
    .or_else(|| {
      DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .map(|dt| dt.date())
    })
}

/// The date an order is due, if one can be determined.
pub fn due_date(order: &Order) -> Option<NaiveDate> {
  if let Some(raw) = order.extensions.delivery_date.as_deref() {
    match parse_delivery_date(raw) {
      Some(date) => return Some(date),
      None => tracing::warn!(
        order_id = order.id,
        value = raw,
        "unreadable delivery date; falling back to lead time"
      ),
    }
  }

  if order.lead_time_days > 0 {
    let days = Days::new(order.lead_time_days.unsigned_abs());
    return order.created_at.date().checked_add_days(days);
  }

  None
}

/// `due_date − today` in whole days. Positive is in the future, zero is due
/// today, negative is overdue.
pub fn days_remaining(order: &Order, today: NaiveDate) -> Option<i64> {
  due_date(order).map(|due| (due - today).num_days())
}

/// [`days_remaining`] against the local calendar date.
pub fn days_remaining_from_now(order: &Order) -> Option<i64> {
  days_remaining(order, Local::now().date_naive())
}

/// Presentation-level classification of [`days_remaining`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryState {
  NoDate,
  Upcoming(i64),
  DueToday,
  Overdue(i64),
}

impl DeliveryState {
  pub fn from_days(days: Option<i64>) -> Self {
    match days {
      None => Self::NoDate,
      Some(0) => Self::DueToday,
      Some(d) if d > 0 => Self::Upcoming(d),
      Some(d) => Self::Overdue(-d),
    }
  }

  pub fn label(&self) -> String {
    let plural = |n: i64| if n == 1 { "dia" } else { "dias" };
    match *self {
      Self::NoDate => "Sem data informada".to_owned(),
      Self::DueToday => "Entrega hoje".to_owned(),
      Self::Upcoming(n) => format!("Faltam {n} {}", plural(n)),
      Self::Overdue(n) => format!("Atrasado {n} {}", plural(n)),
    }
  }
}
