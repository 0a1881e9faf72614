use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use scout_browser::mock::{MockElement, MockPage, MockSite};
use scout_core::{AppConfig, CatalogLocators, NO_RESULTS_MESSAGE};
use scout_scanner::{ScrapeOrchestrator, Session};
use scout_server::{create_router, AppState};
use serde_json::{json, Value};
use tower::ServiceExt;

const CATALOG: &str = "https://catalog.example.com/search";
const DETAIL: &str = "https://catalog.example.com/detail/1";
const BARCODE: &str = "8801234567890";

fn catalog_site() -> MockSite {
    let locators = CatalogLocators::default();
    let listing = MockPage::new()
        .element(locators.product_link.clone(), MockElement::link("새우깡", DETAIL))
        .element(locators.manufacturer.clone(), MockElement::text("농심"));
    let search = MockPage::new()
        .element(locators.search_box.clone(), MockElement::input())
        .element(locators.search_button.clone(), MockElement::submit())
        .on_search(BARCODE, listing);

    MockSite::builder()
        .page(CATALOG, search)
        .page(
            DETAIL,
            MockPage::new().element(locators.report_number, MockElement::text("해당없음")),
        )
        .build()
}

fn ready_app(site: &MockSite) -> Router {
    let mut config = AppConfig::default();
    config.sites.catalog.url = CATALOG.to_string();

    let sessions: Vec<Session> = (0..2).map(|_| Box::new(site.session()) as Session).collect();
    create_router(AppState::with_orchestrator(ScrapeOrchestrator::new(&config, sessions)))
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = if body.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&body).unwrap_or(Value::Null)
    };
    (status, json)
}

fn lookup(body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/api/v1/barcode")
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn health() -> Request<Body> {
    Request::builder().uri("/health").body(Body::empty()).unwrap()
}

#[tokio::test]
async fn test_health_before_initialization() {
    let (status, body) = send(create_router(AppState::new()), health()).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["scraper_status"], "not_initialized");
    assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
    assert!(chrono::DateTime::parse_from_rfc3339(body["timestamp"].as_str().unwrap()).is_ok());
}

#[tokio::test]
async fn test_health_when_ready() {
    let site = catalog_site();
    let (status, body) = send(ready_app(&site), health()).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["scraper_status"], "ready");
}

#[tokio::test]
async fn test_empty_barcode_list_is_rejected() {
    let site = catalog_site();
    let (status, body) = send(ready_app(&site), lookup(json!({ "barcodes": [] }))).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "EMPTY_BARCODE_LIST");
    assert!(site.navigations().is_empty());
}

#[tokio::test]
async fn test_lookup_before_initialization() {
    let app = create_router(AppState::new());
    let (status, body) = send(app, lookup(json!({ "barcodes": [BARCODE] }))).await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["code"], "SCRAPER_NOT_READY");
}

#[tokio::test]
async fn test_malformed_body_is_a_client_error() {
    let site = catalog_site();
    let (status, _) = send(ready_app(&site), lookup(json!({ "codes": [BARCODE] }))).await;

    assert!(status.is_client_error());
}

#[tokio::test(start_paused = true)]
async fn test_lookup_keeps_request_order() {
    let site = catalog_site();
    let request = lookup(json!({ "barcodes": [BARCODE, "   ", "0000000000000"] }));

    let (status, body) = send(ready_app(&site), request).await;

    assert_eq!(status, StatusCode::OK);
    let results = body.as_array().unwrap();
    assert_eq!(results.len(), 3);

    assert_eq!(results[0]["barcode"], BARCODE);
    assert_eq!(results[0]["success"], true);
    assert_eq!(results[0]["product_info"]["제품명"], "새우깡");
    assert_eq!(results[0]["product_info"]["카테고리"], "농심");
    assert_eq!(results[0]["product_info"]["품목보고번호"], "해당없음");
    assert_eq!(results[0]["product_info"]["소비기한"], "정보 없음");
    assert!(results[0].get("message").is_none());

    assert_eq!(results[1]["barcode"], "   ");
    assert_eq!(results[1]["success"], false);
    assert!(results[1]["message"].as_str().unwrap().starts_with("오류 발생: "));

    assert_eq!(results[2]["barcode"], "0000000000000");
    assert_eq!(results[2]["success"], false);
    assert_eq!(results[2]["message"], NO_RESULTS_MESSAGE);
    assert!(results[2].get("product_info").is_none());
}

#[tokio::test(start_paused = true)]
async fn test_repeat_lookup_is_served_from_cache() {
    let site = catalog_site();
    let app = ready_app(&site);

    let (_, first) = send(app.clone(), lookup(json!({ "barcodes": [BARCODE] }))).await;
    let navigations = site.navigations().len();
    let (_, second) = send(app, lookup(json!({ "barcodes": [BARCODE] }))).await;

    assert_eq!(first, second);
    assert_eq!(site.navigations().len(), navigations);
}

#[tokio::test(start_paused = true)]
async fn test_dead_browser_is_a_server_error() {
    let site = catalog_site();
    let app = ready_app(&site);
    site.crash();

    let (status, body) = send(app, lookup(json!({ "barcodes": [BARCODE] }))).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["code"], "INTERNAL_ERROR");
    assert!(body["message"].as_str().unwrap().contains("session"));
}
