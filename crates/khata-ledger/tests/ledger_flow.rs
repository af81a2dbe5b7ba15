//! End-to-end service tests over an in-memory database.
//!
//! Each test builds its own isolated database, commits documents through
//! the recorder, and checks what the read-side services reconstruct.

use chrono::{DateTime, Duration, Utc};

use khata_core::{
    AgingBucket, LedgerFilter, LineDraft, Product, PurchaseDraft, SaleDraft, TxKind,
    ValuationMethod,
};
use khata_db::repository::generate_id;
use khata_db::{Database, DbConfig};
use khata_ledger::{
    AgingClassifier, CogsCalculator, LedgerError, LedgerReconstructor, TransactionRecorder,
    ValuationEngine,
};

async fn setup() -> Database {
    Database::new(DbConfig::in_memory()).await.unwrap()
}

fn line(barcode: &str, mrp_paisa: i64, quantity: i64, rate_paisa: i64) -> LineDraft {
    LineDraft {
        barcode: Some(barcode.to_string()),
        name: "Tea 250g".to_string(),
        category: "Beverages".to_string(),
        mrp_paisa,
        quantity,
        rate_paisa,
        tax_paisa: 0,
    }
}

fn purchase(doc_date: DateTime<Utc>, lines: Vec<LineDraft>) -> PurchaseDraft {
    PurchaseDraft {
        supplier_name: "Mehta Traders".to_string(),
        doc_date,
        lines,
    }
}

fn sale(doc_date: DateTime<Utc>, lines: Vec<LineDraft>) -> SaleDraft {
    SaleDraft {
        customer_name: "Walk-in".to_string(),
        doc_date,
        lines,
    }
}

async fn only_product(db: &Database, barcode: &str) -> Product {
    let mut products = db.products().find_by_barcode(barcode).await.unwrap();
    assert_eq!(products.len(), 1);
    products.remove(0)
}

// =============================================================================
// Recorder + resolver
// =============================================================================

#[tokio::test]
async fn purchase_then_sale_nets_stock() {
    let db = setup().await;
    let recorder = TransactionRecorder::new(db.clone());
    let now = Utc::now();

    recorder
        .commit_purchase(&purchase(now, vec![line("8901", 1000, 10, 500)]))
        .await
        .unwrap();
    recorder
        .commit_sale(&sale(now, vec![line("8901", 1000, 4, 900)]))
        .await
        .unwrap();

    let product = only_product(&db, "8901").await;
    assert_eq!(product.quantity_on_hand, 6);
}

#[tokio::test]
async fn header_totals_aggregate_lines() {
    let db = setup().await;
    let recorder = TransactionRecorder::new(db.clone());

    let mut taxed = line("8902", 2000, 3, 1500);
    taxed.tax_paisa = 270;

    let committed = recorder
        .commit_purchase(&purchase(
            Utc::now(),
            vec![taxed, line("8903", 1000, 2, 800)],
        ))
        .await
        .unwrap();

    assert_eq!(committed.total_quantity, 5);
    assert_eq!(committed.taxable_paisa, 3 * 1500 + 2 * 800);
    assert_eq!(committed.tax_paisa, 270);
    assert_eq!(committed.total_paisa, 3 * 1500 + 270 + 2 * 800);

    let stored = db
        .purchases()
        .get_by_id(&committed.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.total_paisa, committed.total_paisa);
    assert_eq!(db.purchases().lines_for_document(&committed.id).await.unwrap().len(), 2);
}

#[tokio::test]
async fn mrp_within_tolerance_reuses_product() {
    let db = setup().await;
    let recorder = TransactionRecorder::new(db.clone());
    let now = Utc::now();

    recorder
        .commit_purchase(&purchase(now, vec![line("8904", 5000, 5, 4000)]))
        .await
        .unwrap();

    // One paisa off: same SKU.
    recorder
        .commit_purchase(&purchase(now, vec![line("8904", 5001, 5, 4100)]))
        .await
        .unwrap();

    let product = only_product(&db, "8904").await;
    assert_eq!(product.quantity_on_hand, 10);
    assert_eq!(product.mrp_paisa, 5000);
}

#[tokio::test]
async fn mrp_beyond_tolerance_creates_new_product() {
    let db = setup().await;
    let recorder = TransactionRecorder::new(db.clone());
    let now = Utc::now();

    recorder
        .commit_purchase(&purchase(now, vec![line("8905", 5000, 5, 4000)]))
        .await
        .unwrap();

    // Two paisa off: a distinct price point, a distinct SKU.
    recorder
        .commit_purchase(&purchase(now, vec![line("8905", 5002, 3, 4100)]))
        .await
        .unwrap();

    let products = db.products().find_by_barcode("8905").await.unwrap();
    assert_eq!(products.len(), 2);
}

#[tokio::test]
async fn empty_barcode_always_creates() {
    let db = setup().await;
    let recorder = TransactionRecorder::new(db.clone());
    let now = Utc::now();

    let mut loose = line("", 1000, 2, 800);
    loose.barcode = None;

    recorder
        .commit_purchase(&purchase(now, vec![loose.clone()]))
        .await
        .unwrap();
    recorder
        .commit_purchase(&purchase(now, vec![loose]))
        .await
        .unwrap();

    // Same name and MRP, no barcode: two separate products.
    assert_eq!(db.products().count().await.unwrap(), 2);
}

#[tokio::test]
async fn oversell_goes_negative_but_commits() {
    let db = setup().await;
    let recorder = TransactionRecorder::new(db.clone());
    let now = Utc::now();

    recorder
        .commit_purchase(&purchase(now, vec![line("8906", 1000, 2, 500)]))
        .await
        .unwrap();
    recorder
        .commit_sale(&sale(now, vec![line("8906", 1000, 5, 900)]))
        .await
        .unwrap();

    let product = only_product(&db, "8906").await;
    assert_eq!(product.quantity_on_hand, -3);
}

#[tokio::test]
async fn invalid_draft_rejected_before_any_write() {
    let db = setup().await;
    let recorder = TransactionRecorder::new(db.clone());

    let result = recorder
        .commit_sale(&sale(Utc::now(), vec![line("8907", 1000, 0, 900)]))
        .await;
    assert!(matches!(result, Err(LedgerError::Validation(_))));

    // Nothing was created: no product, no header.
    assert_eq!(db.products().count().await.unwrap(), 0);
}

// =============================================================================
// Ledger reconstruction
// =============================================================================

#[tokio::test]
async fn unfiltered_ledger_ends_at_quantity_on_hand() {
    let db = setup().await;
    let recorder = TransactionRecorder::new(db.clone());
    let now = Utc::now();

    recorder
        .commit_purchase(&purchase(now - Duration::days(3), vec![line("8908", 1000, 10, 500)]))
        .await
        .unwrap();
    recorder
        .commit_sale(&sale(now - Duration::days(2), vec![line("8908", 1000, 4, 900)]))
        .await
        .unwrap();
    recorder
        .commit_purchase(&purchase(now - Duration::days(1), vec![line("8908", 1000, 5, 600)]))
        .await
        .unwrap();

    let product = only_product(&db, "8908").await;
    assert_eq!(product.quantity_on_hand, 11);

    let ledger = LedgerReconstructor::new(db.clone())
        .product_ledger(&product.id, &LedgerFilter::unrestricted())
        .await
        .unwrap();

    // Newest-first output; chronologically last entry on top.
    assert_eq!(ledger.len(), 3);
    assert_eq!(ledger[0].running_balance, product.quantity_on_hand);
    assert_eq!(ledger[1].running_balance, 6);
    assert_eq!(ledger[2].running_balance, 10);
    assert_eq!(ledger[2].kind, TxKind::Purchase);
    assert_eq!(ledger[2].counterpart, "Mehta Traders");
}

#[tokio::test]
async fn filtered_ledger_back_derives_opening() {
    let db = setup().await;
    let recorder = TransactionRecorder::new(db.clone());
    let now = Utc::now();

    recorder
        .commit_purchase(&purchase(now - Duration::days(30), vec![line("8909", 1000, 10, 500)]))
        .await
        .unwrap();
    recorder
        .commit_sale(&sale(now - Duration::days(5), vec![line("8909", 1000, 4, 900)]))
        .await
        .unwrap();

    let product = only_product(&db, "8909").await;
    assert_eq!(product.quantity_on_hand, 6);

    // Window excludes the opening purchase.
    let filter = LedgerFilter {
        start: Some(now - Duration::days(10)),
        end: None,
        kind: None,
    };
    let ledger = LedgerReconstructor::new(db.clone())
        .product_ledger(&product.id, &filter)
        .await
        .unwrap();

    assert_eq!(ledger.len(), 1);
    // Opening back-derived to 10; after the -4 sale the balance is 6.
    assert_eq!(ledger[0].running_balance, 6);
    assert_eq!(ledger[0].quantity, -4);
}

#[tokio::test]
async fn kind_filter_restricts_entries() {
    let db = setup().await;
    let recorder = TransactionRecorder::new(db.clone());
    let now = Utc::now();

    recorder
        .commit_purchase(&purchase(now, vec![line("8910", 1000, 10, 500)]))
        .await
        .unwrap();
    recorder
        .commit_sale(&sale(now, vec![line("8910", 1000, 4, 900)]))
        .await
        .unwrap();

    let product = only_product(&db, "8910").await;
    let filter = LedgerFilter {
        start: None,
        end: None,
        kind: Some(TxKind::Sale),
    };
    let ledger = LedgerReconstructor::new(db.clone())
        .product_ledger(&product.id, &filter)
        .await
        .unwrap();

    assert_eq!(ledger.len(), 1);
    assert_eq!(ledger[0].kind, TxKind::Sale);
}

#[tokio::test]
async fn bad_date_range_rejected() {
    let db = setup().await;
    let now = Utc::now();

    let filter = LedgerFilter {
        start: Some(now),
        end: Some(now - Duration::days(1)),
        kind: None,
    };
    let result = LedgerReconstructor::new(db)
        .product_ledger("nonexistent", &filter)
        .await;

    // Rejected before the product lookup even runs.
    assert!(matches!(result, Err(LedgerError::Validation(_))));
}

// =============================================================================
// Valuation
// =============================================================================

#[tokio::test]
async fn valuation_methods_agree_with_lot_math() {
    let db = setup().await;
    let recorder = TransactionRecorder::new(db.clone());
    let now = Utc::now();

    // Lots: 10 @ 5.00 then 5 @ 8.00; sell 3 so qoh = 12.
    recorder
        .commit_purchase(&purchase(now - Duration::days(10), vec![line("8911", 1000, 10, 500)]))
        .await
        .unwrap();
    recorder
        .commit_purchase(&purchase(now - Duration::days(2), vec![line("8911", 1000, 5, 800)]))
        .await
        .unwrap();
    recorder
        .commit_sale(&sale(now - Duration::days(1), vec![line("8911", 1000, 3, 900)]))
        .await
        .unwrap();

    let fifo = ValuationEngine::new(db.clone())
        .value_inventory(ValuationMethod::Fifo)
        .await
        .unwrap();
    assert_eq!(fifo.rows.len(), 1);
    assert!((fifo.rows[0].valuation_rate_paisa - 550.0).abs() < 1e-9);
    assert_eq!(fifo.rows[0].inventory_value.paisa(), 6600);
    assert_eq!(fifo.total_inventory_value.paisa(), 6600);
    // 12 x 1000 MRP - 6600
    assert_eq!(fifo.rows[0].potential_profit.paisa(), 5400);

    let lifo = ValuationEngine::new(db.clone())
        .value_inventory(ValuationMethod::Lifo)
        .await
        .unwrap();
    assert!((lifo.rows[0].valuation_rate_paisa - 625.0).abs() < 1e-9);

    let wavg = ValuationEngine::new(db.clone())
        .value_inventory(ValuationMethod::WeightedAverage)
        .await
        .unwrap();
    assert!((wavg.rows[0].valuation_rate_paisa - 600.0).abs() < 1e-9);
}

#[tokio::test]
async fn valuation_falls_back_to_mrp_without_history() {
    let db = setup().await;

    // Stock on hand with no purchase history (opening balance import).
    let now = Utc::now();
    let product = Product {
        id: generate_id(),
        barcode: Some("8912".to_string()),
        name: "Imported Stock".to_string(),
        category: "Grocery".to_string(),
        mrp_paisa: 1250,
        sale_price_paisa: 1200,
        quantity_on_hand: 4,
        reorder_point: 0,
        is_active: true,
        created_at: now,
        updated_at: now,
    };
    db.products().insert(&product).await.unwrap();

    let report = ValuationEngine::new(db)
        .value_inventory(ValuationMethod::Fifo)
        .await
        .unwrap();

    assert!((report.rows[0].valuation_rate_paisa - 1250.0).abs() < 1e-9);
    assert_eq!(report.rows[0].inventory_value.paisa(), 5000);
    assert_eq!(report.rows[0].potential_profit.paisa(), 0);
}

#[tokio::test]
async fn valuation_of_empty_catalog_is_empty_dataset() {
    let db = setup().await;

    let result = ValuationEngine::new(db)
        .value_inventory(ValuationMethod::WeightedAverage)
        .await;

    assert!(matches!(result, Err(LedgerError::Core(_))));
}

// =============================================================================
// Aging
// =============================================================================

#[tokio::test]
async fn aging_buckets_by_oldest_purchase() {
    let db = setup().await;
    let recorder = TransactionRecorder::new(db.clone());
    let now = Utc::now();

    recorder
        .commit_purchase(&purchase(now - Duration::days(10), vec![line("8913", 1000, 10, 300)]))
        .await
        .unwrap();
    recorder
        .commit_purchase(&purchase(now - Duration::days(100), vec![line("8914", 2000, 5, 200)]))
        .await
        .unwrap();

    let report = AgingClassifier::new(db).classify(now).await.unwrap();

    // Oldest stock first.
    assert_eq!(report.rows.len(), 2);
    assert_eq!(report.rows[0].age_days, 100);
    assert_eq!(report.rows[0].bucket, AgingBucket::Days91To180);
    assert_eq!(report.rows[1].age_days, 10);
    assert_eq!(report.rows[1].bucket, AgingBucket::Days0To30);

    // All six bands present; value split 3000 / 1000.
    assert_eq!(report.buckets.len(), 6);
    assert_eq!(report.buckets[0].total_value.paisa(), 3000);
    assert!((report.buckets[0].pct_of_inventory_value - 75.0).abs() < 1e-9);
    assert_eq!(report.buckets[3].total_value.paisa(), 1000);
    assert_eq!(report.buckets[5].product_count, 0);
}

#[tokio::test]
async fn aging_of_empty_catalog_is_empty_dataset() {
    let db = setup().await;

    let result = AgingClassifier::new(db).classify(Utc::now()).await;
    assert!(matches!(result, Err(LedgerError::Core(_))));
}

// =============================================================================
// COGS
// =============================================================================

#[tokio::test]
async fn cogs_costs_sales_at_lifetime_average() {
    let db = setup().await;
    let recorder = TransactionRecorder::new(db.clone());
    let now = Utc::now();

    // Average cost 4.00; sell 3 at 6.00 => revenue 18.00, COGS 12.00.
    recorder
        .commit_purchase(&purchase(now - Duration::days(5), vec![line("8915", 1000, 10, 400)]))
        .await
        .unwrap();
    recorder
        .commit_sale(&sale(now - Duration::days(1), vec![line("8915", 1000, 3, 600)]))
        .await
        .unwrap();

    let summary = CogsCalculator::new(db)
        .report(now - Duration::days(3), now)
        .await
        .unwrap();

    assert_eq!(summary.rows.len(), 1);
    let row = &summary.rows[0];
    assert_eq!(row.quantity_sold, 3);
    assert_eq!(row.cogs.paisa(), 1200);
    assert_eq!(row.revenue.paisa(), 1800);
    assert_eq!(row.gross_profit.paisa(), 600);
    assert!((row.margin_pct - 100.0 / 3.0).abs() < 1e-6);

    assert_eq!(summary.total_cogs.paisa(), 1200);
    assert_eq!(summary.total_revenue.paisa(), 1800);
    assert!((summary.overall_margin_pct - 100.0 / 3.0).abs() < 1e-6);
    assert_eq!(summary.by_category.len(), 1);
    assert_eq!(summary.by_category[0].category, "Beverages");
}

#[tokio::test]
async fn cogs_window_excludes_outside_sales() {
    let db = setup().await;
    let recorder = TransactionRecorder::new(db.clone());
    let now = Utc::now();

    recorder
        .commit_purchase(&purchase(now - Duration::days(30), vec![line("8916", 1000, 10, 400)]))
        .await
        .unwrap();
    recorder
        .commit_sale(&sale(now - Duration::days(20), vec![line("8916", 1000, 2, 600)]))
        .await
        .unwrap();
    recorder
        .commit_sale(&sale(now - Duration::days(1), vec![line("8916", 1000, 3, 600)]))
        .await
        .unwrap();

    let summary = CogsCalculator::new(db)
        .report(now - Duration::days(7), now)
        .await
        .unwrap();

    // Only the in-window sale of 3 units counts.
    assert_eq!(summary.total_quantity_sold, 3);
    assert_eq!(summary.total_revenue.paisa(), 1800);
}

#[tokio::test]
async fn cogs_falls_back_to_mrp_without_history() {
    let db = setup().await;
    let now = Utc::now();

    // Imported stock, never purchased through the recorder.
    let product = Product {
        id: generate_id(),
        barcode: Some("8917".to_string()),
        name: "Imported Stock".to_string(),
        category: "Grocery".to_string(),
        mrp_paisa: 1000,
        sale_price_paisa: 900,
        quantity_on_hand: 10,
        reorder_point: 0,
        is_active: true,
        created_at: now,
        updated_at: now,
    };
    db.products().insert(&product).await.unwrap();

    let recorder = TransactionRecorder::new(db.clone());
    recorder
        .commit_sale(&sale(now - Duration::days(1), vec![line("8917", 1000, 3, 600)]))
        .await
        .unwrap();

    let summary = CogsCalculator::new(db)
        .report(now - Duration::days(3), now)
        .await
        .unwrap();

    // Costed at MRP (10.00/unit), selling below it: a loss, not pure profit.
    assert_eq!(summary.rows.len(), 1);
    let row = &summary.rows[0];
    assert_eq!(row.cogs.paisa(), 3000);
    assert_eq!(row.revenue.paisa(), 1800);
    assert_eq!(row.gross_profit.paisa(), -1200);
    assert!(row.margin_pct < 0.0);
}

#[tokio::test]
async fn cogs_empty_window_is_empty_summary() {
    let db = setup().await;
    let now = Utc::now();

    let summary = CogsCalculator::new(db)
        .report(now - Duration::days(7), now)
        .await
        .unwrap();

    assert!(summary.rows.is_empty());
    assert_eq!(summary.total_revenue.paisa(), 0);
}

#[tokio::test]
async fn cogs_rejects_inverted_range() {
    let db = setup().await;
    let now = Utc::now();

    let result = CogsCalculator::new(db)
        .report(now, now - Duration::days(1))
        .await;
    assert!(matches!(result, Err(LedgerError::Validation(_))));
}
