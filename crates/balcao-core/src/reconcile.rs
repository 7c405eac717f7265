//! Product reconciliation: the canonical line items of an order.
//!
//! Pipeline:
//!   Order
//!     ├─ extensions.products (non-empty)  → used as-is
//!     └─ product_summary (legacy text)
//!          └─ parse_legacy_summary()      → one item per qualifying line
//!
//! Both paths are total: they never fail and never drop an input line.

use chrono::NaiveDate;

use crate::{
  extensions::LineItem,
  money::parse_br_amount,
  order::Order,
  projector, schedule,
};

/// Separator between description and price in legacy summary lines.
pub const LEGACY_PRICE_SEPARATOR: &str = " - R$ ";

const BULLET: &str = "• ";

// ─── Legacy text ─────────────────────────────────────────────────────────────

/// One qualifying legacy line, before it is reduced to a [`LineItem`].
#[derive(Debug, Clone, PartialEq)]
struct LegacyLine {
  item:   LineItem,
  /// Whether a price could be read from the line.
  priced: bool,
}

fn qualifying_lines(text: &str) -> impl Iterator<Item = &str> {
  text
    .lines()
    .map(str::trim)
    .filter(|line| !line.is_empty() && !line.starts_with('-'))
}

fn strip_bullet(s: &str) -> &str {
  s.strip_prefix(BULLET)
    .or_else(|| s.strip_prefix('•'))
    .unwrap_or(s)
    .trim()
}

/// Read the leading number of `raw`, ignoring trailing annotations such as
/// `"12,50 (unid.)"`.
fn leading_amount(raw: &str) -> Option<f64> {
  let raw = raw.trim();
  parse_br_amount(raw).or_else(|| {
    let end = raw
      .char_indices()
      .find(|(_, c)| !(c.is_ascii_digit() || *c == '.' || *c == ','))
      .map_or(raw.len(), |(i, _)| i);
    parse_br_amount(raw[..end].trim_end_matches(['.', ',']))
  })
}

fn parse_legacy_line(line: &str) -> LegacyLine {
  // The rightmost separator wins so that descriptions may themselves
  // contain " - R$ ".
  let Some(idx) = line.rfind(LEGACY_PRICE_SEPARATOR) else {
    tracing::debug!(line, "legacy product line has no price separator");
    return LegacyLine {
      item:   LineItem::new(strip_bullet(line), 0.0),
      priced: false,
    };
  };

  let description = strip_bullet(&line[..idx]);
  let value_text = &line[idx + LEGACY_PRICE_SEPARATOR.len()..];
  match leading_amount(value_text) {
    Some(value) => LegacyLine {
      item:   LineItem::new(description, value),
      priced: true,
    },
    None => {
      tracing::debug!(line, "legacy product line has an unreadable price");
      LegacyLine {
        item:   LineItem::new(description, 0.0),
        priced: false,
      }
    }
  }
}

fn parse_legacy(text: &str) -> Vec<LegacyLine> {
  qualifying_lines(text).map(parse_legacy_line).collect()
}

/// Parse a legacy multi-line product summary.
///
/// Blank lines and lines starting with `-` are skipped; every other line
/// yields exactly one item with quantity 1.
pub fn parse_legacy_summary(text: &str) -> Vec<LineItem> {
  parse_legacy(text).into_iter().map(|l| l.item).collect()
}

// ─── Reconciliation ──────────────────────────────────────────────────────────

/// Where an order's canonical line items came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemSource {
  /// The structured `produtos` array in the Extensions.
  Structured,
  /// Parsed from the legacy free-text summary.
  Legacy {
    /// How many of the parsed lines carried a readable price.
    priced_lines: usize,
  },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Reconciliation {
  pub items:  Vec<LineItem>,
  pub source: ItemSource,
}

/// Derive the canonical line items for `order`.
pub fn reconcile_items(order: &Order) -> Reconciliation {
  if let Some(items) = order.extensions.products.as_ref().filter(|p| !p.is_empty()) {
    return Reconciliation {
      items:  items.clone(),
      source: ItemSource::Structured,
    };
  }

  let lines = parse_legacy(&order.product_summary);
  let priced_lines = lines.iter().filter(|l| l.priced).count();
  Reconciliation {
    items:  lines.into_iter().map(|l| l.item).collect(),
    source: ItemSource::Legacy { priced_lines },
  }
}

/// Shorthand for `reconcile_items(order).items`.
pub fn line_items(order: &Order) -> Vec<LineItem> { reconcile_items(order).items }

/// A fully derived order, as handed to the document generator.
#[derive(Debug, Clone, PartialEq)]
pub struct ReconciledOrder {
  pub order:            Order,
  pub items:            Vec<LineItem>,
  pub source:           ItemSource,
  pub product_subtotal: f64,
  pub total_value:      f64,
  /// Amount still owed after the down payment.
  pub balance_due:      f64,
  pub due_date:         Option<NaiveDate>,
}

impl ReconciledOrder {
  pub fn new(order: Order) -> Self {
    let Reconciliation { items, source } = reconcile_items(&order);
    let product_subtotal = projector::product_subtotal(&order);
    let total_value = projector::total_value(&order);
    let balance_due = projector::outstanding_balance(&order);
    let due_date = schedule::due_date(&order);
    Self {
      order,
      items,
      source,
      product_subtotal,
      total_value,
      balance_due,
      due_date,
    }
  }
}
