//! Expense ledger records, aggregated independently from orders.

use chrono::NaiveDate;

#[derive(Debug, Clone, PartialEq)]
pub struct Expense {
  pub id:          i64,
  pub category:    String,
  pub description: String,
  pub value:       f64,
  pub date:        NaiveDate,
}

#[derive(Debug, Clone)]
pub struct NewExpense {
  pub category:    String,
  pub description: String,
  pub value:       f64,
  pub date:        NaiveDate,
}
