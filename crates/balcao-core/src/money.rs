//! Brazilian number parsing and formatting.
//!
//! Amounts are plain `f64` everywhere inside the ledger. Conversion to and from
//! the `1.234,56` notation only happens at the edges: when reading hand-typed
//! text and when rendering values for display.

/// Parse a number written in Brazilian or plain notation.
///
/// - A comma that is the rightmost separator is the decimal mark; dots before
///   it are thousands separators (`"1.234,56"` → `1234.56`).
/// - A dot that follows a comma is the decimal mark; commas are thousands
///   separators (`"1,234.56"` → `1234.56`).
/// - Without any comma the text is parsed as a plain decimal (`"12.5"`).
///
/// A leading `R$` and surrounding whitespace are ignored. Returns `None` for
/// anything that is not a finite number.
pub fn parse_br_number(raw: &str) -> Option<f64> {
  let trimmed = raw.trim();
  let trimmed = trimmed.strip_prefix("R$").unwrap_or(trimmed);
  let cleaned: String = trimmed
    .chars()
    .filter(|c| !c.is_whitespace())
    .collect();
  if cleaned.is_empty() {
    return None;
  }

  let normalized = match (cleaned.rfind(','), cleaned.rfind('.')) {
    (Some(comma), Some(dot)) if dot > comma => cleaned.replace(',', ""),
    (Some(_), _) => cleaned.replace('.', "").replace(',', "."),
    (None, _) => cleaned,
  };

  normalized.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Parse a price typed in Brazilian notation, as found in legacy product
/// text.
///
/// Unlike [`parse_br_number`], dots without a comma are thousands separators
/// when every group after the first has exactly three digits
/// (`"1.500"` → `1500`). Anything else falls back to [`parse_br_number`].
pub fn parse_br_amount(raw: &str) -> Option<f64> {
  let trimmed = raw.trim();
  let trimmed = trimmed.strip_prefix("R$").unwrap_or(trimmed).trim();
  if !trimmed.contains(',') && is_dot_grouped(trimmed) {
    return trimmed.replace('.', "").parse::<f64>().ok();
  }
  parse_br_number(trimmed)
}

/// `1.234`, `12.345.678`: digit groups of three after a leading group of one
/// to three digits.
fn is_dot_grouped(s: &str) -> bool {
  let mut groups = s.split('.');
  let Some(head) = groups.next() else { return false };
  let mut rest = groups.peekable();
  rest.peek().is_some()
    && (1..=3).contains(&head.len())
    && head.chars().all(|c| c.is_ascii_digit())
    && rest.all(|g| g.len() == 3 && g.chars().all(|c| c.is_ascii_digit()))
}

/// Render `value` with two decimals, `.` for thousands and `,` for decimals.
///
/// ```
/// assert_eq!(balcao_core::money::format_decimal_br(1234.5), "1.234,50");
/// ```
pub fn format_decimal_br(value: f64) -> String {
  let fixed = format!("{:.2}", value.abs());
  let (int_part, frac_part) = fixed.split_once('.').unwrap_or((&fixed, "00"));

  let digits: Vec<char> = int_part.chars().collect();
  let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
  for (i, c) in digits.iter().enumerate() {
    if i > 0 && (digits.len() - i) % 3 == 0 {
      grouped.push('.');
    }
    grouped.push(*c);
  }

  let is_zero = int_part.chars().chain(frac_part.chars()).all(|c| c == '0');
  let sign = if value < 0.0 && !is_zero { "-" } else { "" };
  format!("{sign}{grouped},{frac_part}")
}

/// Render `value` as a currency string, e.g. `R$ 1.234,56`.
pub fn format_brl(value: f64) -> String {
  format!("R$ {}", format_decimal_br(value))
}
