//! Integration tests for `SqliteStore` against in-memory and temporary
//! on-disk databases.

use balcao_core::{
  catalog::NewCatalogProduct,
  client::{Address, NewClient},
  expense::NewExpense,
  extensions::{Extensions, LineItem},
  order::{NewOrder, OrderPatch},
  projector,
  reconcile::{self, ReconciledOrder},
  store::LedgerStore,
};
use chrono::{NaiveDate, NaiveDateTime};
use serde_json::json;

use crate::SqliteStore;

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

fn at(s: &str) -> NaiveDateTime {
  NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").unwrap()
}

fn day(s: &str) -> NaiveDate { NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap() }

fn new_order(seq: i64, created: &str) -> NewOrder {
  NewOrder {
    created_at: Some(at(created)),
    ..NewOrder::new(seq, "Maria Souza")
  }
}

fn structured(seq: i64, created: &str, items: Vec<LineItem>) -> NewOrder {
  NewOrder {
    extensions: Extensions { products: Some(items), ..Default::default() },
    ..new_order(seq, created)
  }
}

// ─── Schema ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn ensure_schema_is_idempotent() {
  let s = store().await;
  let before = s.table_columns("orders").await.unwrap();

  s.ensure_schema().await.unwrap();
  s.ensure_schema().await.unwrap();

  let after = s.table_columns("orders").await.unwrap();
  assert_eq!(before, after);
  for column in ["lead_time_days", "document_ref", "extensions_json", "extensions_rev"] {
    assert!(after.iter().any(|c| c == column), "missing {column}");
  }
}

#[tokio::test]
async fn reopening_a_file_keeps_schema_and_data() {
  let dir = tempfile::tempdir().unwrap();
  let path = dir.path().join("ledger.db");

  let s = SqliteStore::open(&path).await.unwrap();
  let id = s.create_order(new_order(1, "2024-01-01 10:00:00")).await.unwrap();
  drop(s);

  let s = SqliteStore::open(&path).await.unwrap();
  assert!(s.get_order(id).await.unwrap().is_some());
}

#[tokio::test]
async fn migrates_a_legacy_database() {
  let dir = tempfile::tempdir().unwrap();
  let path = dir.path().join("legacy.db");

  {
    let conn = rusqlite::Connection::open(&path).unwrap();
    conn
      .execute_batch(
        "CREATE TABLE orders (
           id INTEGER PRIMARY KEY AUTOINCREMENT,
           sequence_no INTEGER NOT NULL UNIQUE,
           created_at TEXT NOT NULL,
           client_name TEXT NOT NULL,
           client_tax_id TEXT,
           client_phone TEXT,
           product_summary_text TEXT,
           product_value REAL,
           downpayment_value REAL,
           freight_value REAL,
           payment_method TEXT
         );
         INSERT INTO orders (sequence_no, created_at, client_name, client_tax_id,
                             product_summary_text, product_value, freight_value)
         VALUES (12, '2023-05-02T14:30:00', 'João', '123.456.789-09',
                 '• Caixa P - R$ 1.234,56\nCaixa G - R$ 99,90', 1334.46, 10);",
      )
      .unwrap();
  }

  let s = SqliteStore::open(&path).await.unwrap();
  let order = s.get_order_by_sequence(12).await.unwrap().unwrap();

  assert_eq!(order.created_at, at("2023-05-02 14:30:00"));
  assert_eq!(order.lead_time_days, 0);
  assert_eq!(order.extensions, Extensions::default());
  assert_eq!(
    reconcile::line_items(&order),
    vec![LineItem::new("Caixa P", 1234.56), LineItem::new("Caixa G", 99.90)]
  );
  assert!((projector::total_value(&order) - 1344.46).abs() < 1e-9);

  // Legacy tax ids with punctuation are still found.
  let history = projector::client_totals(&s, "12345678909").await.unwrap();
  assert_eq!(history.len(), 1);

  // The next number continues after the legacy sequence.
  assert_eq!(s.next_sequence_number().await.unwrap(), 13);
}

// ─── Create / read ───────────────────────────────────────────────────────────

#[tokio::test]
async fn structured_products_round_trip() {
  let s = store().await;
  let items = vec![
    LineItem::new("Caixa kraft 20x20", 12.5).with_quantity(10),
    LineItem::new("Fita cetim", 3.2),
    LineItem::new("Etiqueta", 0.35).with_quantity(100),
  ];
  let mut input = structured(1, "2024-03-01 09:00:00", items.clone());
  input.extensions.status = Some("Em produção".into());
  input.extensions.color = Some("verde".into());
  input.extensions.reinforcement = Some(true);
  input.extensions.discount = Some(2.5);

  let id = s.create_order(input).await.unwrap();
  let order = s.get_order(id).await.unwrap().unwrap();

  assert_eq!(order.extensions.products.as_ref(), Some(&items));
  assert_eq!(reconcile::line_items(&order), items);
  assert_eq!(order.extensions.status.as_deref(), Some("Em produção"));
  assert_eq!(order.extensions.color.as_deref(), Some("verde"));
  assert_eq!(order.extensions.reinforcement, Some(true));
  assert_eq!(order.extensions.discount, Some(2.5));
  assert_eq!(order.created_at, at("2024-03-01 09:00:00"));
}

#[tokio::test]
async fn get_by_sequence() {
  let s = store().await;
  let id = s.create_order(new_order(42, "2024-03-01 09:00:00")).await.unwrap();

  let order = s.get_order_by_sequence(42).await.unwrap().unwrap();
  assert_eq!(order.id, id);
  assert_eq!(order.client_name, "Maria Souza");
}

#[tokio::test]
async fn missing_orders_return_none() {
  let s = store().await;
  assert!(s.get_order(999).await.unwrap().is_none());
  assert!(s.get_order_by_sequence(999).await.unwrap().is_none());
}

#[tokio::test]
async fn duplicate_sequence_is_rejected_without_writing() {
  let s = store().await;
  s.create_order(new_order(5, "2024-01-01 10:00:00")).await.unwrap();

  let mut dup = new_order(5, "2024-01-02 10:00:00");
  dup.client_name = "Outro Cliente".into();
  let err = s.create_order(dup).await.unwrap_err();

  assert!(err.is_validation());
  assert!(matches!(
    err,
    crate::Error::Core(balcao_core::Error::DuplicateSequence(5))
  ));
  assert_eq!(s.list_all_orders().await.unwrap().len(), 1);
}

#[tokio::test]
async fn missing_client_name_is_rejected() {
  let s = store().await;
  let input = NewOrder { client_name: "  ".into(), ..new_order(1, "2024-01-01 10:00:00") };
  let err = s.create_order(input).await.unwrap_err();
  assert!(err.is_validation());
  assert!(s.list_all_orders().await.unwrap().is_empty());
}

#[tokio::test]
async fn tax_id_is_stored_as_digits() {
  let s = store().await;
  let mut input = new_order(1, "2024-01-01 10:00:00");
  input.client_tax_id = "12.345.678/0001-95".into();
  let id = s.create_order(input).await.unwrap();

  let order = s.get_order(id).await.unwrap().unwrap();
  assert_eq!(order.client_tax_id, "12345678000195");
}

#[tokio::test]
async fn created_at_defaults_to_now() {
  let s = store().await;
  let id = s.create_order(NewOrder::new(1, "Ana")).await.unwrap();
  let order = s.get_order(id).await.unwrap().unwrap();
  let now = chrono::Local::now().naive_local();
  assert!((now - order.created_at).num_seconds().abs() < 60);
}

// ─── Sequence numbers ────────────────────────────────────────────────────────

#[tokio::test]
async fn sequence_numbers_are_never_reused() {
  let s = store().await;
  assert_eq!(s.next_sequence_number().await.unwrap(), 1);

  let first = s.create_order(new_order(1, "2024-01-01 10:00:00")).await.unwrap();
  let second = s.create_order(new_order(2, "2024-01-01 11:00:00")).await.unwrap();
  assert_eq!(s.next_sequence_number().await.unwrap(), 3);

  assert!(s.delete_order(second).await.unwrap());
  assert!(s.delete_order(first).await.unwrap());
  assert_eq!(s.next_sequence_number().await.unwrap(), 3);
}

#[tokio::test]
async fn deleted_sequence_number_cannot_be_taken_again() {
  let s = store().await;
  let first = s.create_order(new_order(1, "2024-01-01 10:00:00")).await.unwrap();
  s.create_order(new_order(2, "2024-01-01 11:00:00")).await.unwrap();
  assert!(s.delete_order(first).await.unwrap());

  let err = s.create_order(new_order(1, "2024-01-02 10:00:00")).await.unwrap_err();
  assert!(matches!(
    err,
    crate::Error::Core(balcao_core::Error::DuplicateSequence(1))
  ));
  assert_eq!(s.list_all_orders().await.unwrap().len(), 1);

  // Numbers that were never issued are still accepted.
  s.create_order(new_order(10, "2024-01-03 10:00:00")).await.unwrap();
  s.create_order(new_order(7, "2024-01-04 10:00:00")).await.unwrap();
}

// ─── Listing ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn list_recent_is_newest_first_and_limited() {
  let s = store().await;
  s.create_order(new_order(1, "2024-01-01 10:00:00")).await.unwrap();
  s.create_order(new_order(2, "2024-01-03 10:00:00")).await.unwrap();
  s.create_order(new_order(3, "2024-01-02 10:00:00")).await.unwrap();

  let mut delivered = new_order(4, "2024-01-04 10:00:00");
  delivered.extensions.status = Some("Entregue".into());
  s.create_order(delivered).await.unwrap();

  let recent = s.list_recent_orders(3).await.unwrap();
  let seqs: Vec<_> = recent.iter().map(|o| o.sequence_no).collect();
  assert_eq!(seqs, [4, 2, 3]);
}

#[tokio::test]
async fn created_between_is_inclusive() {
  let s = store().await;
  s.create_order(new_order(1, "2024-01-31 23:59:59")).await.unwrap();
  s.create_order(new_order(2, "2024-02-01 00:00:00")).await.unwrap();
  s.create_order(new_order(3, "2024-02-29 18:00:00")).await.unwrap();
  s.create_order(new_order(4, "2024-03-01 00:00:00")).await.unwrap();

  let feb = s
    .list_orders_created_between(day("2024-02-01"), day("2024-02-29"))
    .await
    .unwrap();
  let seqs: Vec<_> = feb.iter().map(|o| o.sequence_no).collect();
  assert_eq!(seqs, [3, 2]);
}

// ─── Update / delete ─────────────────────────────────────────────────────────

#[tokio::test]
async fn update_overwrites_columns_and_merges_extensions() {
  let s = store().await;
  let mut input = structured(1, "2024-01-01 10:00:00", vec![LineItem::new("Caixa", 20.0)]);
  input.extensions.status = Some("Pendente".into());
  input.extensions.color = Some("azul".into());
  input.extensions.extra.insert("observacao".into(), json!("frágil"));
  let id = s.create_order(input).await.unwrap();

  let patch = OrderPatch {
    freight_value: Some(15.0),
    client_phone: Some("(11) 99999-0000".into()),
    extensions: Extensions { status: Some("Pronto".into()), ..Default::default() },
    ..Default::default()
  };
  assert!(s.update_order(id, patch).await.unwrap());

  let order = s.get_order(id).await.unwrap().unwrap();
  assert_eq!(order.freight_value, 15.0);
  assert_eq!(order.client_phone, "(11) 99999-0000");
  assert_eq!(order.client_name, "Maria Souza");
  assert_eq!(order.extensions.status.as_deref(), Some("Pronto"));
  assert_eq!(order.extensions.color.as_deref(), Some("azul"));
  assert_eq!(order.extensions.extra.get("observacao"), Some(&json!("frágil")));
  assert_eq!(
    order.extensions.products,
    Some(vec![LineItem::new("Caixa", 20.0)])
  );
}

#[tokio::test]
async fn edited_line_items_change_totals_on_next_read() {
  let s = store().await;
  let id = s
    .create_order(structured(1, "2024-01-01 10:00:00", vec![LineItem::new("A", 10.0)]))
    .await
    .unwrap();

  let patch = OrderPatch {
    extensions: Extensions {
      products: Some(vec![LineItem::new("A", 10.0), LineItem::new("B", 5.0).with_quantity(2)]),
      discount: Some(1.0),
      ..Default::default()
    },
    ..Default::default()
  };
  s.update_order(id, patch).await.unwrap();

  let order = s.get_order(id).await.unwrap().unwrap();
  assert_eq!(projector::total_value(&order), 19.0);
}

#[tokio::test]
async fn update_missing_order_returns_false() {
  let s = store().await;
  let relational = OrderPatch { freight_value: Some(1.0), ..Default::default() };
  assert!(!s.update_order(77, relational).await.unwrap());

  let ext = OrderPatch {
    extensions: Extensions { status: Some("Pronto".into()), ..Default::default() },
    ..Default::default()
  };
  assert!(!s.update_order(77, ext).await.unwrap());
}

#[tokio::test]
async fn update_rejects_blank_client_name() {
  let s = store().await;
  let id = s.create_order(new_order(1, "2024-01-01 10:00:00")).await.unwrap();
  let patch = OrderPatch { client_name: Some("  ".into()), ..Default::default() };
  assert!(s.update_order(id, patch).await.unwrap_err().is_validation());
}

#[tokio::test]
async fn set_document_ref_and_delete() {
  let s = store().await;
  let id = s.create_order(new_order(1, "2024-01-01 10:00:00")).await.unwrap();

  assert!(s.set_document_ref(id, "pedidos/0001.pdf".into()).await.unwrap());
  let order = s.get_order(id).await.unwrap().unwrap();
  assert_eq!(order.document_ref.as_deref(), Some("pedidos/0001.pdf"));

  assert!(s.delete_order(id).await.unwrap());
  assert!(!s.delete_order(id).await.unwrap());
  assert!(s.get_order(id).await.unwrap().is_none());
}

#[tokio::test]
async fn malformed_extensions_read_as_empty() {
  let dir = tempfile::tempdir().unwrap();
  let path = dir.path().join("ledger.db");
  let s = SqliteStore::open(&path).await.unwrap();

  let mut input = new_order(1, "2024-01-01 10:00:00");
  input.product_summary = "Caixa - R$ 30,00".into();
  input.freight_value = 5.0;
  input.extensions.status = Some("Pronto".into());
  let id = s.create_order(input).await.unwrap();

  {
    let raw = rusqlite::Connection::open(&path).unwrap();
    raw
      .execute(
        "UPDATE orders SET extensions_json = '{\"status\": \"Pro' WHERE id = ?1",
        [id],
      )
      .unwrap();
  }

  let order = s.get_order(id).await.unwrap().unwrap();
  assert_eq!(order.extensions, Extensions::default());
  assert_eq!(projector::total_value(&order), 35.0);

  // A merge onto a corrupted blob starts from empty.
  let patch = OrderPatch {
    extensions: Extensions { status: Some("Entregue".into()), ..Default::default() },
    ..Default::default()
  };
  assert!(s.update_order(id, patch).await.unwrap());
  let order = s.get_order(id).await.unwrap().unwrap();
  assert_eq!(order.extensions.status.as_deref(), Some("Entregue"));
}

// ─── Projections ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn period_summary_recomputes_from_line_items() {
  let s = store().await;

  let mut a = structured(
    1,
    "2024-01-05 10:00:00",
    vec![LineItem::new("A", 20.0), LineItem::new("B", 30.0)],
  );
  a.freight_value = 10.0;
  a.downpayment_value = 25.0;
  a.extensions.discount = Some(5.0);
  // Stale cached scalar that must be ignored.
  a.product_value = 999.0;
  s.create_order(a).await.unwrap();

  let mut b = new_order(2, "2024-01-31 18:00:00");
  b.product_summary = "Sacola - R$ 45,00".into();
  s.create_order(b).await.unwrap();

  let c = NewOrder {
    product_summary: "X - R$ 1.000,00".into(),
    ..new_order(3, "2024-02-01 08:00:00")
  };
  s.create_order(c).await.unwrap();

  let jan = projector::period_summary(&s, day("2024-01-01"), day("2024-01-31"))
    .await
    .unwrap();
  assert_eq!(jan.count, 2);
  assert_eq!(jan.total_value, 100.0);
  assert_eq!(jan.total_downpayments, 25.0);
  assert_eq!(jan.average_ticket, 50.0);

  assert_eq!(
    projector::monthly_summary(&s, 2024, 1).await.unwrap(),
    jan
  );
  assert_eq!(projector::annual_summary(&s, 2024).await.unwrap().count, 3);
  assert_eq!(projector::all_time_summary(&s).await.unwrap().total_value, 1100.0);
  assert_eq!(projector::annual_summary(&s, 2023).await.unwrap().count, 0);
}

#[tokio::test]
async fn inverted_period_is_an_error() {
  let s = store().await;
  let err = projector::period_summary(&s, day("2024-02-01"), day("2024-01-01"))
    .await
    .unwrap_err();
  assert!(matches!(
    err,
    crate::Error::Core(balcao_core::Error::InvalidPeriod { .. })
  ));
}

#[tokio::test]
async fn client_totals_match_normalized_tax_id() {
  let s = store().await;
  for (seq, created, tax_id) in [
    (1, "2024-01-01 10:00:00", "123.456.789-09"),
    (2, "2024-02-01 10:00:00", "12345678909"),
    (3, "2024-03-01 10:00:00", "98765432100"),
  ] {
    let mut o = new_order(seq, created);
    o.client_tax_id = tax_id.into();
    s.create_order(o).await.unwrap();
  }

  let history = projector::client_totals(&s, "123.456.789-09").await.unwrap();
  let seqs: Vec<_> = history.iter().map(|o| o.sequence_no).collect();
  assert_eq!(seqs, [2, 1]);

  assert!(projector::client_totals(&s, "---").await.unwrap().is_empty());
}

#[tokio::test]
async fn profit_combines_orders_and_expenses() {
  let s = store().await;
  s.create_order(structured(1, "2024-04-10 10:00:00", vec![LineItem::new("A", 300.0)]))
    .await
    .unwrap();
  s.add_expense(NewExpense {
    category:    "Material".into(),
    description: "Papelão".into(),
    value:       120.0,
    date:        day("2024-04-02"),
  })
  .await
  .unwrap();
  s.add_expense(NewExpense {
    category:    "Material".into(),
    description: "Fora do período".into(),
    value:       50.0,
    date:        day("2024-05-01"),
  })
  .await
  .unwrap();

  let profit = projector::profit_summary(&s, day("2024-04-01"), day("2024-04-30"))
    .await
    .unwrap();
  assert_eq!(profit.revenue, 300.0);
  assert_eq!(profit.expenses, 120.0);
  assert_eq!(profit.profit, 180.0);
}

#[tokio::test]
async fn reconciled_order_for_documents() {
  let s = store().await;
  let mut input = new_order(1, "2024-01-01 10:00:00");
  input.product_summary = "• Caixa P - R$ 10,00\nSem preço".into();
  input.lead_time_days = 30;
  input.downpayment_value = 4.0;
  let id = s.create_order(input).await.unwrap();

  let rec = ReconciledOrder::new(s.get_order(id).await.unwrap().unwrap());
  assert_eq!(rec.items.len(), 2);
  assert_eq!(rec.total_value, 10.0);
  assert_eq!(rec.balance_due, 6.0);
  assert_eq!(rec.due_date, Some(day("2024-01-31")));
}

// ─── Clients ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn upsert_client_is_insert_or_ignore() {
  let s = store().await;
  let first = s
    .upsert_client(NewClient {
      phone: "1111".into(),
      address: Address { city: "Campinas".into(), ..Default::default() },
      ..NewClient::new("Maria", "123.456.789-09")
    })
    .await
    .unwrap();
  let again = s
    .upsert_client(NewClient::new("Maria S.", "12345678909"))
    .await
    .unwrap();
  assert_eq!(first, again);

  let client = s.get_client_by_tax_id("123.456.789-09").await.unwrap().unwrap();
  assert_eq!(client.name, "Maria");
  assert_eq!(client.phone, "1111");
  assert_eq!(client.address.city, "Campinas");

  // Walk-in clients without a tax id are always inserted.
  let a = s.upsert_client(NewClient::new("Balcão", "")).await.unwrap();
  let b = s.upsert_client(NewClient::new("Balcão", "")).await.unwrap();
  assert_ne!(a, b);
  assert!(s.get_client_by_tax_id("").await.unwrap().is_none());
}

#[tokio::test]
async fn upsert_matches_punctuated_legacy_tax_ids() {
  let dir = tempfile::tempdir().unwrap();
  let path = dir.path().join("ledger.db");
  let s = SqliteStore::open(&path).await.unwrap();

  {
    let raw = rusqlite::Connection::open(&path).unwrap();
    raw
      .execute(
        "INSERT INTO clients (name, tax_id) VALUES ('Maria', '123.456.789-09')",
        [],
      )
      .unwrap();
  }
  let legacy = s.get_client_by_tax_id("12345678909").await.unwrap().unwrap();

  let id = s
    .upsert_client(NewClient::new("Maria Souza", "12345678909"))
    .await
    .unwrap();
  assert_eq!(id, legacy.id);
  assert_eq!(s.list_clients().await.unwrap().len(), 1);
}

#[tokio::test]
async fn search_update_and_delete_clients() {
  let s = store().await;
  let ana = s.upsert_client(NewClient::new("Ana Lima", "111")).await.unwrap();
  s.upsert_client(NewClient::new("André Costa", "222")).await.unwrap();
  s.upsert_client(NewClient::new("Bruno", "333")).await.unwrap();
  s.upsert_client(NewClient::new("100%_Real", "444")).await.unwrap();

  let found = s.search_clients("an", 10).await.unwrap();
  let names: Vec<_> = found.iter().map(|c| c.name.as_str()).collect();
  assert_eq!(names, ["Ana Lima", "André Costa"]);

  let found = s.search_clients("100%", 10).await.unwrap();
  assert_eq!(found.len(), 1);
  assert!(s.search_clients("10_", 10).await.unwrap().is_empty());

  let mut edited = NewClient::new("Ana Lima Souza", "111");
  edited.email = "ana@example.com".into();
  assert!(s.update_client(ana, edited).await.unwrap());
  let ana_row = s.get_client_by_tax_id("111").await.unwrap().unwrap();
  assert_eq!(ana_row.name, "Ana Lima Souza");
  assert_eq!(ana_row.email, "ana@example.com");

  assert!(s.delete_client(ana).await.unwrap());
  assert_eq!(s.list_clients().await.unwrap().len(), 3);
  assert!(!s.update_client(ana, NewClient::new("X", "")).await.unwrap());
}

// ─── Catalog ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn catalog_upsert_updates_by_name() {
  let s = store().await;
  let id = s
    .upsert_product(NewCatalogProduct {
      category: "Caixas".into(),
      ..NewCatalogProduct::new("Caixa P", 10.0)
    })
    .await
    .unwrap();
  let same = s
    .upsert_product(NewCatalogProduct {
      code: Some("CX-P".into()),
      category: "Caixas".into(),
      ..NewCatalogProduct::new("Caixa P", 12.0)
    })
    .await
    .unwrap();
  assert_eq!(id, same);

  let product = s.get_product_by_name("Caixa P").await.unwrap().unwrap();
  assert_eq!(product.price, 12.0);
  assert_eq!(product.code.as_deref(), Some("CX-P"));

  assert!(s.upsert_product(NewCatalogProduct::new("  ", 1.0)).await.unwrap_err().is_validation());
}

#[tokio::test]
async fn catalog_search_and_category_listing() {
  let s = store().await;
  for (name, category) in [("Caixa P", "Caixas"), ("Caixa G", "Caixas"), ("Sacola", "Sacolas")] {
    s.upsert_product(NewCatalogProduct {
      category: category.into(),
      ..NewCatalogProduct::new(name, 1.0)
    })
    .await
    .unwrap();
  }

  assert_eq!(s.search_products("caixa", 10).await.unwrap().len(), 2);
  assert_eq!(s.search_products("caixa", 1).await.unwrap().len(), 1);
  assert_eq!(s.list_products(Some("Sacolas".into())).await.unwrap().len(), 1);
  assert_eq!(s.list_products(None).await.unwrap().len(), 3);
}

#[tokio::test]
async fn catalog_changes_do_not_touch_orders() {
  let s = store().await;
  let pid = s.upsert_product(NewCatalogProduct::new("Caixa P", 10.0)).await.unwrap();
  let product = s.get_product_by_name("Caixa P").await.unwrap().unwrap();

  let id = s
    .create_order(structured(1, "2024-01-01 10:00:00", vec![LineItem::from(&product)]))
    .await
    .unwrap();

  s.upsert_product(NewCatalogProduct::new("Caixa P", 99.0)).await.unwrap();
  assert!(s.delete_product(pid).await.unwrap());

  let order = s.get_order(id).await.unwrap().unwrap();
  assert_eq!(projector::total_value(&order), 10.0);
}

// ─── Expenses ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn expenses_list_total_and_delete() {
  let s = store().await;
  let rent = s
    .add_expense(NewExpense {
      category:    "Aluguel".into(),
      description: "Março".into(),
      value:       800.0,
      date:        day("2024-03-05"),
    })
    .await
    .unwrap();
  s.add_expense(NewExpense {
    category:    "Energia".into(),
    description: "Conta de luz".into(),
    value:       150.5,
    date:        day("2024-03-20"),
  })
  .await
  .unwrap();

  let march = s.list_expenses(day("2024-03-01"), day("2024-03-31")).await.unwrap();
  assert_eq!(march.len(), 2);
  assert_eq!(march[0].description, "Conta de luz");
  assert_eq!(
    s.expense_total(day("2024-03-01"), day("2024-03-31")).await.unwrap(),
    950.5
  );

  assert!(s.delete_expense(rent).await.unwrap());
  assert_eq!(
    s.expense_total(day("2024-03-01"), day("2024-03-31")).await.unwrap(),
    150.5
  );
  assert_eq!(
    s.expense_total(day("2025-01-01"), day("2025-12-31")).await.unwrap(),
    0.0
  );
}
