//! End-to-end tests against a local stand-in for the scraped site and the
//! resolver companion service

use std::collections::HashMap;
use std::time::Duration;

use axum::Router;
use axum::body::Body;
use axum::extract::{Path, Query};
use axum::http::{Request, StatusCode};
use axum::response::{Html, IntoResponse, Json, Response};
use axum::routing::get;
use flatrate_search::{HttpFetcher, MediaSearchService, OfferListing, SourceConfig, WerStreamtEs};
use flatrate_web::build_router;
use serde_json::{Value, json};
use tower::util::ServiceExt;

const INCEPTION_PAGE: &str = r#"
<html><body>
  <div class="provider"><a class="left">Anbieter</a><span>Flatrate</span></div>
  <div class="provider" data-options='{"StreamProviderID": 12}'>
    <a class="left">Netflix
    netflix</a><i class="fi-check"></i>
  </div>
  <div class="provider" data-options='{"StreamProviderID": 40}'>
    <a class="left">Amazon Video</a><i class="fi-x"></i><span>4,99 EUR</span>
  </div>
  <div class="provider" data-options='{"StreamProviderID": 33}'>
    <a class="left">Sky Go
    sky</a><i class="fi-check"></i>
  </div>
  <div class="provider" data-options='{"StreamProviderID": 12}'>
    <a class="left">netflix</a><i class="fi-check"></i>
  </div>
</body></html>
"#;

const REMAKE_PAGE: &str = r#"
<html><body>
  <div class="provider"><a class="left">Anbieter</a></div>
  <div class="provider" data-options='{"StreamProviderID": 12}'>
    <a class="left">Netflix</a><i class="fi-check"></i>
  </div>
</body></html>
"#;

async fn suggest(Query(params): Query<HashMap<String, String>>) -> Json<Value> {
    if params.get("term").map(String::as_str) != Some("Inception") {
        return Json(json!([]));
    }

    Json(json!({
        "id-100": {"value": "Inception", "label": "Inception <span>Film, 2010</span>"},
        "id-200": {"value": "Inception: The Cobol Job", "label": "<span>Film, 2010</span>"},
        "id-300": {"value": "Inception Making-of", "label": "Inception Making-of"},
        "id-400": {"value": "Inception", "label": "<span>Film, 2011</span>"},
        "all": {"value": "Alle Ergebnisse", "label": "<span>Film</span>"}
    }))
}

async fn details(Path(id): Path<String>) -> Response {
    match id.as_str() {
        "100" => Html(INCEPTION_PAGE).into_response(),
        "400" => Html(REMAKE_PAGE).into_response(),
        _ => StatusCode::INTERNAL_SERVER_ERROR.into_response(),
    }
}

async fn catalog() -> Json<Value> {
    Json(json!({
        "data": [
            {
                "name": "Plex Server",
                "movies": [
                    {"title": "Inception", "year": 2010},
                    {"title": "Heat", "year": 1995}
                ],
                "error": null
            }
        ]
    }))
}

async fn spawn_upstream() -> String {
    let router = Router::new()
        .route("/suche/suggestTitle", get(suggest))
        .route("/film/details/{id}", get(details))
        .route("/movies", get(catalog));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let address = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });

    format!("http://{address}")
}

fn unused_url() -> String {
    let port = std::net::TcpListener::bind("127.0.0.1:0")
        .unwrap()
        .local_addr()
        .unwrap()
        .port();
    format!("http://127.0.0.1:{port}/movies")
}

fn config(base_url: &str, resolver_url: String) -> SourceConfig {
    SourceConfig {
        base_url: base_url.to_string(),
        resolver_url,
        request_timeout: Duration::from_secs(5),
        use_system_proxy: false,
        ..SourceConfig::default()
    }
}

fn app(base_url: &str, resolver_url: String) -> Router {
    let config = config(base_url, resolver_url);
    let fetcher = HttpFetcher::new(&config).unwrap();
    build_router(MediaSearchService::from_config(&config, fetcher))
}

fn json_request(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn extract_json(body: Body) -> Value {
    let bytes = axum::body::to_bytes(body, usize::MAX)
        .await
        .expect("Should read body");
    serde_json::from_slice(&bytes).expect("Should parse JSON")
}

fn group_names(body: &Value) -> Vec<String> {
    body["results"]
        .as_array()
        .unwrap()
        .iter()
        .map(|group| group["name"].as_str().unwrap().to_string())
        .collect()
}

#[tokio::test]
async fn test_search_aggregates_site_and_resolver() {
    let base = spawn_upstream().await;
    let app = app(&base, format!("{base}/movies"));

    let response = app
        .oneshot(json_request("/search", json!({"title": "Inception"})))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = extract_json(response.into_body()).await;
    assert_eq!(group_names(&body), vec!["Netflix", "Sky Go", "plex-Plex Server"]);

    let netflix = &body["results"][0]["movies"];
    assert_eq!(
        netflix,
        &json!([
            {"id": "100", "title": "Inception", "year": 2010, "type": "Film"},
            {"id": "400", "title": "Inception", "year": 2011, "type": "Film"}
        ])
    );

    let plex = &body["results"][2]["movies"];
    assert_eq!(
        plex,
        &json!([{"id": null, "title": "Inception", "year": 2010, "type": null}])
    );
}

#[tokio::test]
async fn test_search_year_filter_applies_to_every_source() {
    let base = spawn_upstream().await;
    let app = app(&base, format!("{base}/movies"));

    let response = app
        .oneshot(json_request("/search", json!({"title": "Inception", "year": 2011})))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = extract_json(response.into_body()).await;
    assert_eq!(group_names(&body), vec!["Netflix"]);
    for group in body["results"].as_array().unwrap() {
        for movie in group["movies"].as_array().unwrap() {
            assert_eq!(movie["year"], 2011);
        }
    }
}

#[tokio::test]
async fn test_search_without_resolver_uses_site_only() {
    let base = spawn_upstream().await;
    let app = app(&base, unused_url());

    let response = app
        .oneshot(json_request("/search", json!({"title": "Inception"})))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = extract_json(response.into_body()).await;
    assert_eq!(group_names(&body), vec!["Netflix", "Sky Go"]);
}

#[tokio::test]
async fn test_search_unknown_title_is_not_found() {
    let base = spawn_upstream().await;
    let app = app(&base, format!("{base}/movies"));

    let response = app
        .oneshot(json_request("/search", json!({"title": "xyz-no-relation"})))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = extract_json(response.into_body()).await;
    assert_eq!(body, json!({"detail": "Title not found"}));
}

#[tokio::test]
async fn test_lookup_returns_flatrate_services_only() {
    let base = spawn_upstream().await;
    let app = app(&base, format!("{base}/movies"));

    let response = app
        .oneshot(json_request(
            "/",
            json!({"werstreamtesLink": format!("{base}/film/details/100")}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = extract_json(response.into_body()).await;
    assert_eq!(
        body,
        json!({
            "werstreamt.es": [
                {"id": "12", "name": "Netflix"},
                {"id": "33", "name": "Sky Go"}
            ]
        })
    );
}

#[tokio::test]
async fn test_lookup_failed_fetch_is_null() {
    let base = spawn_upstream().await;
    let app = app(&base, format!("{base}/movies"));

    let response = app
        .oneshot(json_request(
            "/",
            json!({"werstreamtesLink": format!("{base}/film/details/200")}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = extract_json(response.into_body()).await;
    assert_eq!(body, json!({"werstreamt.es": null}));
}

#[tokio::test]
async fn test_list_services_by_id_matches_page_lookup() {
    let base = spawn_upstream().await;
    let config = config(&base, unused_url());
    let fetcher = HttpFetcher::new(&config).unwrap();
    let site = WerStreamtEs::new(config, fetcher);

    let by_id = site.list_services_by_id("100").await.unwrap();
    let by_page = site
        .list_services(&format!("{base}/film/details/100"))
        .await
        .unwrap();

    assert_eq!(by_id, by_page);
    let names: Vec<&str> = by_id.iter().map(|service| service.name.as_str()).collect();
    assert_eq!(names, vec!["Netflix", "Sky Go"]);
}
