mod common;

use std::time::Duration;

use axum::http::Method;
use common::{MockBackend, Reply};
use parser_console::api::operations::{HistoryOperations, SearchOperations};
use parser_console::error::AppError;
use parser_console::search::{SearchFilters, SearchResults, SortOrder, SuggestionFeed};
use serde_json::json;

const TOKEN: &str = "operator-token";

async fn seller_database() -> MockBackend {
    MockBackend::start(|req| match (req.method.as_str(), req.path.as_str()) {
        ("GET", "/search") => Reply::json(json!([
            {"id": 1, "store_name": "Lotus"},
            {"id": 2, "store_name": "Lotus Home"}
        ])),
        ("GET", "/search/results") => Reply::json(json!({"data": [
            {"seller_id": 10, "store_name": "lotus", "saleCount": 3, "reg_date": "2020-01-01"},
            {"seller_id": 11, "store_name": "Aster", "saleCount": 90},
            {"seller_id": 12, "store_name": "Birch", "reg_date": "2023-05-05T00:00:00"}
        ]})),
        ("GET", "/search/distinct-categories") => Reply::json(json!(["Dresses", "Kitchen"])),
        ("GET", "/search/xlsx") => Reply::bytes(200, b"xlsx"),
        ("POST", "/wb/update_seller_data") if req.query == "seller_id=10" => {
            Reply::json(json!({"status": "ok", "saleItemQuantity": 250}))
        }
        ("POST", "/wb/update_seller_data") => Reply::json(json!({
            "status": "error", "detail": "saleItemQuantity not found"
        })),
        ("GET", "/parse-data") => Reply::json(json!([
            {"id": 2, "created_at": "2025-04-02T08:30:00", "total_contacts": 7, "params": {"pages": 2}}
        ])),
        _ => Reply::not_found(),
    })
    .await
}

#[tokio::test]
async fn blank_suggestion_input_sends_nothing() {
    let backend = seller_database().await;
    let client = backend.app_state().client;

    let found = SearchOperations::suggest(&client, TOKEN, &SearchFilters::with_text("  ")).await;
    assert!(found.is_empty());
    assert!(backend.requests().is_empty());

    let mut filters = SearchFilters::with_text("Lot");
    filters.region = Some("77".into());
    let found = SearchOperations::suggest(&client, TOKEN, &filters).await;
    assert_eq!(found.len(), 2);
    assert_eq!(backend.requests()[0].query, "q=Lot&region=77&limit=10");
}

#[tokio::test]
async fn results_sort_and_refresh() {
    let backend = seller_database().await;
    let client = backend.app_state().client;

    let mut filters = SearchFilters::with_text("a");
    filters.sales_from = Some(1);
    let rows = SearchOperations::results(&client, TOKEN, &filters).await.unwrap();
    assert_eq!(backend.requests()[0].query, "q=a&salesFrom=1");

    let mut results = SearchResults::new(rows);
    let names = |results: &SearchResults| -> Vec<String> {
        results
            .view()
            .iter()
            .map(|r| r.display_name().to_string())
            .collect()
    };
    assert_eq!(names(&results), vec!["Aster", "Birch", "lotus"]);
    results.set_order(SortOrder::NewFirst);
    assert_eq!(names(&results), vec!["Birch", "lotus", "Aster"]);

    let count = SearchOperations::refresh_sale_count(&client, TOKEN, 10).await.unwrap();
    assert_eq!(count, 250);
    assert!(results.apply_sale_count(10, count));
    results.set_order(SortOrder::ManySales);
    assert_eq!(names(&results), vec!["lotus", "Aster", "Birch"]);

    let err = SearchOperations::refresh_sale_count(&client, TOKEN, 11).await.unwrap_err();
    assert!(matches!(err, AppError::Http { ref message, .. } if message == "saleItemQuantity not found"));
}

#[tokio::test]
async fn categories_export_and_history() {
    let backend = seller_database().await;
    let client = backend.app_state().client;

    assert_eq!(
        SearchOperations::distinct_categories(&client, TOKEN).await,
        vec!["Dresses", "Kitchen"]
    );

    let dir = backend.dir().join("exports");
    let path = SearchOperations::export(&client, TOKEN, &SearchFilters::with_text("tea"), &dir)
        .await
        .unwrap();
    assert_eq!(path, dir.join("search_results.xlsx"));
    assert_eq!(std::fs::read(&path).unwrap(), b"xlsx");

    let history = HistoryOperations::list(&client, TOKEN).await.unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].record_count(), 7);
    assert_eq!(history[0].parameters(), vec![("pages".to_string(), "2".to_string())]);
}

#[tokio::test]
async fn suggestion_feed_queries_only_the_settled_text() {
    let backend = seller_database().await;
    let client = backend.app_state().client;
    let feed = SuggestionFeed::new(client, TOKEN.into(), Duration::from_millis(150));
    let mut suggestions = feed.subscribe();

    for text in ["L", "Lo", "Lot"] {
        feed.input(SearchFilters::with_text(text));
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    tokio::time::timeout(Duration::from_secs(5), suggestions.changed())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(suggestions.borrow().len(), 2);

    let searches: Vec<_> = backend
        .requests()
        .into_iter()
        .filter(|r| r.is(Method::GET, "/search"))
        .collect();
    assert_eq!(searches.len(), 1);
    assert_eq!(searches[0].query, "q=Lot&limit=10");
}
