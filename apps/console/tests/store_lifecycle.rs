//! Product and bill stores through the pending / fulfilled / rejected
//! lifecycle: error recording, overlapping requests, cancellation.

mod support;

use bakery_client::{ClientError, MemoryTokenStore};
use bakery_console::commands::{bill, product};
use bakery_console::{ErrorCode, StateOptions};
use bakery_core::lifecycle::CANCELLED_MESSAGE;
use bakery_core::{
    BillLine, BillRequest, DateRange, Money, OpStatus, Operation, PaymentMethod, ProductDraft,
    StalePolicy, StockAdjustment,
};
use chrono::NaiveDate;
use futures_util::FutureExt;
use serde_json::json;
use support::*;

fn draft(name: &str) -> ProductDraft {
    ProductDraft {
        name: name.to_string(),
        category: "Bread".to_string(),
        cost_price: Money::from_paise(4_000),
        current_stock: 10,
        is_active: true,
    }
}

fn product_ids(h: &Harness) -> Vec<String> {
    h.state
        .products()
        .read(|s| s.products.iter().map(|p| p.id.clone()).collect())
}

async fn seed_products(h: &Harness, stock: i64) {
    h.api.ok(
        LIST_PRODUCTS,
        json!([product_json("p1", "Pav", stock), product_json("p2", "Rusk", 12)]),
    );
    product::fetch_products(&h.state).await.unwrap();
}

// =============================================================================
// Fulfilled / Rejected
// =============================================================================

#[tokio::test]
async fn test_rejection_keeps_previous_payload() {
    let h = Harness::new();
    seed_products(&h, 3).await;
    h.state.products().read(|s| {
        assert_eq!(s.ops.status(Operation::FetchProducts), OpStatus::Fulfilled);
        assert_eq!(s.ops.error(Operation::FetchProducts), None);
    });

    h.api
        .fail(LIST_PRODUCTS, ClientError::Transport("timed out".into()));
    let err = product::fetch_products(&h.state).await.unwrap_err();

    assert_eq!(err.code, ErrorCode::NetworkError);
    assert_eq!(err.message, "Failed to fetch products");
    assert_eq!(product_ids(&h), vec!["p1", "p2"]);
    h.state.products().read(|s| {
        assert_eq!(s.ops.status(Operation::FetchProducts), OpStatus::Rejected);
        assert_eq!(s.ops.error(Operation::FetchProducts), Some("Failed to fetch products"));
    });

    product::clear_error(&h.state, Operation::FetchProducts);
    h.state.products().read(|s| {
        assert_eq!(s.ops.status(Operation::FetchProducts), OpStatus::Idle);
        assert_eq!(s.ops.error(Operation::FetchProducts), None);
    });
}

#[tokio::test]
async fn test_server_rejection_message_is_recorded() {
    let h = Harness::new();
    seed_products(&h, 3).await;
    h.api.fail(CREATE_PRODUCT, rejected(400, "name required"));

    let err = product::create_product(&h.state, draft("Bun")).await.unwrap_err();

    assert_eq!(err.code, ErrorCode::ServerRejected);
    assert_eq!(err.message, "name required");
    assert_eq!(product_ids(&h), vec!["p1", "p2"]);
    h.state.products().read(|s| {
        assert!(!s.ops.is_loading(Operation::CreateProduct));
        assert_eq!(s.ops.error(Operation::CreateProduct), Some("name required"));
    });
}

#[tokio::test]
async fn test_create_product_appends() {
    let h = Harness::new();
    seed_products(&h, 3).await;
    h.api.ok(CREATE_PRODUCT, product_json("p3", "Bun", 10));

    let created = product::create_product(&h.state, draft("Bun")).await.unwrap();

    assert_eq!(created.id, "p3");
    assert_eq!(product_ids(&h), vec!["p1", "p2", "p3"]);
    assert!(h.state.products().read(|s| s.last_success));
}

#[tokio::test]
async fn test_invalid_draft_makes_no_request() {
    let h = Harness::new();

    let err = product::create_product(&h.state, draft("   ")).await.unwrap_err();

    assert_eq!(err.code, ErrorCode::ValidationError);
    assert_eq!(err.message, "name is required");
    assert_eq!(h.api.calls(CREATE_PRODUCT), 0);
    h.state.products().read(|s| {
        assert_eq!(s.ops.status(Operation::CreateProduct), OpStatus::Rejected);
    });
}

#[tokio::test]
async fn test_delete_missing_product() {
    let h = Harness::new();
    seed_products(&h, 3).await;
    h.api.fail(
        DELETE_PRODUCT,
        ClientError::NotFound {
            message: Some("No product with that id".to_string()),
        },
    );

    let err = product::delete_product(&h.state, "p9").await.unwrap_err();

    assert_eq!(err.code, ErrorCode::NotFound);
    assert_eq!(err.message, "Product not found");
    assert_eq!(product_ids(&h), vec!["p1", "p2"]);
}

#[tokio::test]
async fn test_delete_removes_product_and_selection() {
    let h = Harness::new();
    seed_products(&h, 3).await;
    assert!(product::select_product(&h.state, "p1").is_some());
    h.api.ok(DELETE_PRODUCT, json!(null));

    product::delete_product(&h.state, "p1").await.unwrap();

    assert_eq!(product_ids(&h), vec!["p2"]);
    assert!(h.state.products().read(|s| s.current_product.is_none()));
}

// =============================================================================
// Stock Corrections
// =============================================================================

#[tokio::test]
async fn test_remove_more_than_stocked_is_rejected_locally() {
    let h = Harness::new();
    seed_products(&h, 3).await;

    let err = product::adjust_stock(&h.state, "p1", StockAdjustment::remove(5))
        .await
        .unwrap_err();

    assert_eq!(err.code, ErrorCode::InsufficientStock);
    assert_eq!(h.api.calls(UPDATE_PRODUCT), 0);
    assert_eq!(
        h.state.products().read(|s| s.find("p1").map(|p| p.current_stock)),
        Some(3)
    );
}

#[tokio::test]
async fn test_oversized_stock_addition_is_rejected_locally() {
    let h = Harness::new();
    seed_products(&h, 5).await;

    let err = product::adjust_stock(&h.state, "p1", StockAdjustment::add(i64::MAX))
        .await
        .unwrap_err();

    assert_eq!(err.code, ErrorCode::ValidationError);
    assert_eq!(err.message, "quantity must be between 1 and 1000000");
    assert_eq!(h.api.calls(UPDATE_PRODUCT), 0);
    assert_eq!(
        h.state.products().read(|s| s.find("p1").map(|p| p.current_stock)),
        Some(5)
    );
}

#[tokio::test]
async fn test_add_stock_replaces_cached_product() {
    let h = Harness::new();
    seed_products(&h, 3).await;
    h.api.ok(UPDATE_PRODUCT, product_json("p1", "Pav", 5));

    let updated = product::adjust_stock(&h.state, "p1", StockAdjustment::add(2))
        .await
        .unwrap();

    assert_eq!(updated.current_stock, 5);
    assert_eq!(
        h.state.products().read(|s| s.find("p1").map(|p| p.current_stock)),
        Some(5)
    );
}

#[tokio::test]
async fn test_adjust_unknown_product() {
    let h = Harness::new();

    let err = product::adjust_stock(&h.state, "ghost", StockAdjustment::add(1))
        .await
        .unwrap_err();

    assert_eq!(err.code, ErrorCode::NotFound);
    assert_eq!(err.message, "Product not found");
    assert_eq!(h.api.total_calls(), 0);
}

// =============================================================================
// Overlapping Requests
// =============================================================================

/// Issues fetch A then fetch B, lets B finish first, then A.
async fn overlapping_fetches(h: &Harness) -> (Vec<String>, Vec<String>) {
    let release_a = h
        .api
        .gated(LIST_PRODUCTS, Reply::Ok(json!([product_json("old", "Old", 1)])));
    let release_b = h
        .api
        .gated(LIST_PRODUCTS, Reply::Ok(json!([product_json("new", "New", 1)])));

    let first = product::fetch_products(&h.state);
    let second = async {
        while h.api.calls(LIST_PRODUCTS) < 1 {
            tokio::task::yield_now().await;
        }
        product::fetch_products(&h.state).await
    };
    let driver = async {
        while h.api.calls(LIST_PRODUCTS) < 2 {
            tokio::task::yield_now().await;
        }
        release_b.send(()).unwrap();
        while h.state.products().read(|s| s.products.is_empty()) {
            tokio::task::yield_now().await;
        }
        release_a.send(()).unwrap();
    };

    let (a, b, ()) = tokio::join!(first, second, driver);
    let ids = |r: Vec<bakery_core::Product>| -> Vec<String> { r.into_iter().map(|p| p.id).collect() };
    (ids(a.unwrap()), ids(b.unwrap()))
}

#[tokio::test]
async fn test_last_completion_wins_by_default() {
    let h = Harness::new();

    let (a, b) = overlapping_fetches(&h).await;

    assert_eq!(a, vec!["old"]);
    assert_eq!(b, vec!["new"]);
    assert_eq!(product_ids(&h), vec!["old"]);
    h.state.products().read(|s| {
        assert_eq!(s.ops.status(Operation::FetchProducts), OpStatus::Fulfilled);
    });
}

#[tokio::test]
async fn test_latest_issued_wins_drops_stale_completion() {
    let h = Harness::build(
        MemoryTokenStore::new(),
        StateOptions {
            stale_policy: StalePolicy::LatestIssuedWins,
            ..StateOptions::default()
        },
    );

    let (a, _) = overlapping_fetches(&h).await;

    // the stale payload still reaches its caller
    assert_eq!(a, vec!["old"]);
    assert_eq!(product_ids(&h), vec!["new"]);
    h.state.products().read(|s| {
        assert_eq!(s.ops.status(Operation::FetchProducts), OpStatus::Fulfilled);
        assert_eq!(s.ops.error(Operation::FetchProducts), None);
    });
}

// =============================================================================
// Cancellation & Panics
// =============================================================================

#[tokio::test]
async fn test_dropped_fetch_never_stays_pending() {
    let h = Harness::new();
    let _release = h.api.gated(LIST_PRODUCTS, Reply::Ok(json!([])));

    assert!(product::fetch_products(&h.state).now_or_never().is_none());

    h.state.products().read(|s| {
        assert!(!s.ops.is_loading(Operation::FetchProducts));
        assert_eq!(s.ops.status(Operation::FetchProducts), OpStatus::Rejected);
        assert_eq!(s.ops.error(Operation::FetchProducts), Some(CANCELLED_MESSAGE));
    });
}

#[tokio::test]
async fn test_panicking_request_is_rejected() {
    let h = Harness::new();
    h.api.panic_on(LIST_BILLS);

    let err = bill::fetch_bills(&h.state).await.unwrap_err();

    assert_eq!(err.code, ErrorCode::Internal);
    assert_eq!(err.message, "Failed to fetch bills");
    h.state.bills().read(|s| {
        assert_eq!(s.ops.status(Operation::FetchBills), OpStatus::Rejected);
    });

    // the store is still usable afterwards
    h.api.ok(LIST_BILLS, json!([bill_json("b1", 80.0)]));
    let bills = bill::fetch_bills(&h.state).await.unwrap();
    assert_eq!(bills.len(), 1);
}

// =============================================================================
// Bills
// =============================================================================

fn bill_request() -> BillRequest {
    BillRequest {
        items: vec![BillLine {
            product_id: "p1".to_string(),
            quantity: 2,
        }],
        payment_method: PaymentMethod::Upi,
    }
}

#[tokio::test]
async fn test_generate_bill_refreshes_income() {
    let h = Harness::new();
    h.api
        .ok(GENERATE_BILL, bill_json("b1", 80.0))
        .ok(TODAY_INCOME, json!(1250.5));

    let generated = bill::generate_bill(&h.state, bill_request()).await.unwrap();

    assert_eq!(generated.id, "b1");
    assert_eq!(generated.total_cost, Money::from_paise(8_000));
    h.state.bills().read(|s| {
        assert_eq!(s.current_bill.as_ref().map(|b| b.id.as_str()), Some("b1"));
        assert_eq!(s.today_income, Money::from_paise(125_050));
    });
    assert_eq!(h.api.calls(TODAY_INCOME), 1);
}

#[tokio::test]
async fn test_income_refresh_failure_does_not_fail_bill() {
    let h = Harness::new();
    h.api
        .ok(GENERATE_BILL, bill_json("b1", 80.0))
        .fail(TODAY_INCOME, rejected(500, "aggregation failed"));

    bill::generate_bill(&h.state, bill_request()).await.unwrap();

    h.state.bills().read(|s| {
        assert_eq!(s.ops.status(Operation::GenerateBill), OpStatus::Fulfilled);
        assert_eq!(s.ops.status(Operation::FetchTodayIncome), OpStatus::Rejected);
        assert_eq!(s.ops.error(Operation::FetchTodayIncome), Some("aggregation failed"));
    });
}

#[tokio::test]
async fn test_empty_bill_is_rejected_locally() {
    let h = Harness::new();

    let err = bill::generate_bill(
        &h.state,
        BillRequest {
            items: Vec::new(),
            payment_method: PaymentMethod::Cash,
        },
    )
    .await
    .unwrap_err();

    assert_eq!(err.code, ErrorCode::ValidationError);
    assert_eq!(h.api.total_calls(), 0);
}

#[tokio::test]
async fn test_preview_uses_cached_prices() {
    let h = Harness::new();
    seed_products(&h, 3).await;

    let request = BillRequest {
        items: vec![
            BillLine {
                product_id: "p1".to_string(),
                quantity: 2,
            },
            BillLine {
                product_id: "gone".to_string(),
                quantity: 4,
            },
        ],
        payment_method: PaymentMethod::Cash,
    };

    assert_eq!(bill::preview_bill(&h.state, &request), Some(Money::from_paise(8_000)));

    let oversized = BillRequest {
        items: vec![BillLine {
            product_id: "p1".to_string(),
            quantity: i64::MAX / 2,
        }],
        payment_method: PaymentMethod::Cash,
    };
    assert_eq!(bill::preview_bill(&h.state, &oversized), None);
    let err = bill::generate_bill(&h.state, oversized).await.unwrap_err();
    assert_eq!(err.code, ErrorCode::ValidationError);
    assert_eq!(h.api.calls(GENERATE_BILL), 0);
}

#[tokio::test]
async fn test_negative_income_correction_is_rejected() {
    let h = Harness::new();

    let err = bill::update_today_income(&h.state, Money::from_paise(-100))
        .await
        .unwrap_err();

    assert_eq!(err.code, ErrorCode::ValidationError);
    assert_eq!(h.api.calls(UPDATE_TODAY_INCOME), 0);
}

// =============================================================================
// Dashboard Aggregates
// =============================================================================

#[tokio::test]
async fn test_income_stats_default_period() {
    let h = Harness::new();
    h.api
        .ok(INCOME_STATS, json!({ "period": "daily", "totalIncome": 900, "count": 3 }));

    let stats = product::fetch_income_stats(&h.state, None).await.unwrap();

    assert_eq!(stats.bill_count, 3);
    assert_eq!(
        h.state.products().read(|s| s.income_stats.as_ref().map(|i| i.total_income)),
        Some(Money::from_paise(90_000))
    );
}

#[tokio::test]
async fn test_reversed_date_range_makes_no_request() {
    let h = Harness::new();
    let range = DateRange {
        start: NaiveDate::from_ymd_opt(2026, 10, 16).unwrap(),
        end: NaiveDate::from_ymd_opt(2026, 10, 9).unwrap(),
    };

    let err = product::fetch_daily_income(&h.state, range).await.unwrap_err();

    assert_eq!(err.code, ErrorCode::ValidationError);
    assert_eq!(h.api.calls(DAILY_INCOME), 0);
}
