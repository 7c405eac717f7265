//! Status vocabulary and the filtered order listing.
//!
//! Status is a flat, unconstrained label: any string may be stored and any
//! label may follow any other. The vocabulary only decides what the
//! presentation layer offers and which label a status-less order shows.

use std::{fs, io, path::Path};

use chrono::NaiveDate;

use crate::{Result, order::Order, projector, schedule};

pub const DEFAULT_STATUSES: &[&str] =
  &["Pendente", "Em produção", "Pronto", "Entregue", "Cancelado"];

pub const DEFAULT_CATEGORIES: &[&str] =
  &["Caixas", "Embalagens", "Sacolas", "Personalizados", "Outros"];

/// Labels that all mean "handed over to the client".
const COMPLETED_SYNONYMS: &[&str] = &["entregue", "concluído", "concluido"];

// ─── Vocabulary ──────────────────────────────────────────────────────────────

/// An ordered, externally editable list of labels.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Vocabulary {
  entries: Vec<String>,
}

impl Vocabulary {
  /// Build a vocabulary from `entries`, trimming labels and dropping blanks
  /// and case-insensitive duplicates. Falls back to `defaults` if nothing
  /// remains.
  pub fn new<I, S>(entries: I, defaults: &[&str]) -> Self
  where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
  {
    let mut cleaned: Vec<String> = Vec::new();
    for entry in entries {
      let label = entry.as_ref().trim();
      if label.is_empty() || cleaned.iter().any(|e| eq_ignore_case(e, label)) {
        continue;
      }
      cleaned.push(label.to_owned());
    }
    if cleaned.is_empty() {
      cleaned = defaults.iter().map(|s| (*s).to_owned()).collect();
    }
    Self { entries: cleaned }
  }

  pub fn default_statuses() -> Self { Self::new(DEFAULT_STATUSES, DEFAULT_STATUSES) }

  pub fn default_categories() -> Self { Self::new(DEFAULT_CATEGORIES, DEFAULT_CATEGORIES) }

  /// Load a JSON array of strings from `path`. A missing, unreadable or
  /// malformed file yields `defaults`.
  pub fn load(path: &Path, defaults: &[&str]) -> Self {
    let raw = match fs::read_to_string(path) {
      Ok(raw) => raw,
      Err(e) if e.kind() == io::ErrorKind::NotFound => {
        tracing::debug!(path = %path.display(), "vocabulary file absent; using defaults");
        return Self::new(defaults, defaults);
      }
      Err(e) => {
        tracing::warn!(path = %path.display(), error = %e, "cannot read vocabulary file; using defaults");
        return Self::new(defaults, defaults);
      }
    };
    match serde_json::from_str::<Vec<String>>(&raw) {
      Ok(entries) => Self::new(entries, defaults),
      Err(e) => {
        tracing::warn!(path = %path.display(), error = %e, "malformed vocabulary file; using defaults");
        Self::new(defaults, defaults)
      }
    }
  }

  /// Write the vocabulary as a pretty-printed JSON array.
  pub fn save(&self, path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(&self.entries)?;
    if let Some(parent) = path.parent() {
      fs::create_dir_all(parent)?;
    }
    fs::write(path, json)?;
    Ok(())
  }

  pub fn entries(&self) -> &[String] { &self.entries }

  /// The first entry, used for rows that carry no status.
  pub fn default_entry(&self) -> &str {
    self.entries.first().map(String::as_str).unwrap_or_default()
  }

  pub fn contains(&self, label: &str) -> bool {
    self.entries.iter().any(|e| eq_ignore_case(e, label.trim()))
  }
}

fn eq_ignore_case(a: &str, b: &str) -> bool { a.to_lowercase() == b.to_lowercase() }

// ─── Status predicates ───────────────────────────────────────────────────────

/// The status an order shows: its stored label or the vocabulary default.
pub fn effective_status(order: &Order, vocabulary: &Vocabulary) -> String {
  order
    .extensions
    .status
    .as_deref()
    .map(str::trim)
    .filter(|s| !s.is_empty())
    .unwrap_or_else(|| vocabulary.default_entry())
    .to_owned()
}

/// `"entregue"` or anything containing `"conclu"`, case-insensitively.
pub fn is_completed(status: &str) -> bool {
  let lower = status.trim().to_lowercase();
  lower == "entregue" || lower.contains("conclu")
}

/// Whether `stored` satisfies a filter for `wanted`. Comparison is
/// case-insensitive and the completion synonyms match one another.
pub fn status_matches(stored: &str, wanted: &str) -> bool {
  let stored = stored.trim().to_lowercase();
  let wanted = wanted.trim().to_lowercase();
  stored == wanted
    || (COMPLETED_SYNONYMS.contains(&stored.as_str())
      && COMPLETED_SYNONYMS.contains(&wanted.as_str()))
}

// ─── Listing ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusFilter {
  All,
  Only(String),
}

impl StatusFilter {
  /// `"all"`/`"todos"` (any case) select every status; anything else is a
  /// specific label.
  pub fn parse(raw: &str) -> Self {
    let trimmed = raw.trim();
    let lower = trimmed.to_lowercase();
    if lower.is_empty() || lower == "all" || lower == "todos" {
      Self::All
    } else {
      Self::Only(trimmed.to_owned())
    }
  }
}

/// One line of the listing, with every derived value precomputed.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderRow {
  pub order:          Order,
  pub status:         String,
  pub total_value:    f64,
  pub due_date:       Option<NaiveDate>,
  pub days_remaining: Option<i64>,
}

/// Filter and sort `orders` for display.
///
/// With [`StatusFilter::All`] and `hide_completed`, delivered/concluded orders
/// are left out. Rows are sorted by days remaining, soonest first, with
/// undated orders last; ties keep sequence-number order.
pub fn list_view(
  orders: Vec<Order>,
  vocabulary: &Vocabulary,
  filter: &StatusFilter,
  hide_completed: bool,
  today: NaiveDate,
) -> Vec<OrderRow> {
  let mut rows: Vec<OrderRow> = orders
    .into_iter()
    .filter_map(|order| {
      let status = effective_status(&order, vocabulary);
      let keep = match filter {
        StatusFilter::All => !(hide_completed && is_completed(&status)),
        StatusFilter::Only(wanted) => status_matches(&status, wanted),
      };
      if !keep {
        return None;
      }
      let due_date = schedule::due_date(&order);
      Some(OrderRow {
        total_value: projector::total_value(&order),
        days_remaining: due_date.map(|due| (due - today).num_days()),
        due_date,
        status,
        order,
      })
    })
    .collect();

  rows.sort_by_key(|row| {
    (
      row.days_remaining.is_none(),
      row.days_remaining.unwrap_or_default(),
      row.order.sequence_no,
    )
  });
  rows
}
