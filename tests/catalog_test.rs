//! Integration tests for the catalog query

#[path = "common/mod.rs"]
mod common;

use common::*;
use sentinel_fetch::catalog::{odata_filter, CatalogQuery};
use sentinel_fetch::errors::AppError;
use wiremock::matchers::{method, path, query_param, query_param_is_missing};
use wiremock::{Mock, MockServer, ResponseTemplate};

const SCENARIO_FILTER: &str = "Collection/Name eq 'SENTINEL-1' and \
    OData.CSC.Intersects(area=geography'SRID=4326;POLYGON((119.76 -1.05,119.96 -1.05,119.96 -0.65,119.76 -0.65,119.76 -1.05))') and \
    contains(Name,'SLC') and \
    ContentDate/Start ge 2018-09-10T00:00:00.000Z and \
    ContentDate/Start lt 2018-09-22T00:00:00.000Z";

#[tokio::test]
async fn test_scenario_filter_and_three_results() {
    let server = MockServer::start().await;
    assert_eq!(odata_filter(&sentinel1_filter()), SCENARIO_FILTER);

    Mock::given(method("GET"))
        .and(path(CATALOG_PATH))
        .and(query_param("$filter", SCENARIO_FILTER))
        .and(query_param("$count", "True"))
        .and(query_param("$top", "100"))
        .respond_with(ResponseTemplate::new(200).set_body_json(listing(&["id-a", "id-b", "id-c"])))
        .expect(1)
        .mount(&server)
        .await;

    let config = mock_config(&server);
    let query = CatalogQuery::new(reqwest::Client::new(), &config);
    let ids = query.search_ids(&sentinel1_filter()).await.unwrap();

    assert_eq!(ids, vec!["id-a", "id-b", "id-c"]);
}

#[tokio::test]
async fn test_search_preserves_server_order_and_metadata() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(CATALOG_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(listing(&["z", "a", "m"])))
        .mount(&server)
        .await;

    let config = mock_config(&server);
    let items = CatalogQuery::new(reqwest::Client::new(), &config)
        .search(&sentinel1_filter())
        .await
        .unwrap();

    let ids: Vec<_> = items.iter().map(|i| i.id.as_str()).collect();
    assert_eq!(ids, vec!["z", "a", "m"]);
    assert!(items[0].name.contains("SLC"));
}

#[tokio::test]
async fn test_empty_listing_is_no_results_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(CATALOG_PATH))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({ "@odata.count": 0, "value": [] })),
        )
        .mount(&server)
        .await;

    let config = mock_config(&server);
    let result = CatalogQuery::new(reqwest::Client::new(), &config)
        .search_ids(&sentinel1_filter())
        .await;

    assert!(matches!(result, Err(AppError::NoResults)));
}

#[tokio::test]
async fn test_server_error_is_http_error_with_body() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(CATALOG_PATH))
        .respond_with(ResponseTemplate::new(400).set_body_string("Invalid filter expression"))
        .mount(&server)
        .await;

    let config = mock_config(&server);
    let result = CatalogQuery::new(reqwest::Client::new(), &config)
        .search(&sentinel1_filter())
        .await;

    match result {
        Err(AppError::Http { status, body, .. }) => {
            assert_eq!(status, 400);
            assert_eq!(body, "Invalid filter expression");
        }
        other => panic!("Expected Http error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_malformed_listing_is_parse_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(CATALOG_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"))
        .mount(&server)
        .await;

    let config = mock_config(&server);
    let result = CatalogQuery::new(reqwest::Client::new(), &config)
        .search(&sentinel1_filter())
        .await;

    assert!(matches!(result, Err(AppError::Parse(_))));
}

#[tokio::test]
async fn test_single_page_mode_ignores_next_link() {
    let server = MockServer::start().await;
    let mut first = listing(&["p1-a", "p1-b"]);
    first["@odata.count"] = serde_json::json!(4);
    first["@odata.nextLink"] =
        serde_json::json!(format!("{}{CATALOG_PATH}?$skip=2", server.uri()));

    Mock::given(method("GET"))
        .and(path(CATALOG_PATH))
        .and(query_param_is_missing("$skip"))
        .respond_with(ResponseTemplate::new(200).set_body_json(first))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(CATALOG_PATH))
        .and(query_param("$skip", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(listing(&["p2-a", "p2-b"])))
        .expect(0)
        .mount(&server)
        .await;

    let config = mock_config(&server);
    let ids = CatalogQuery::new(reqwest::Client::new(), &config)
        .search_ids(&sentinel1_filter())
        .await
        .unwrap();

    assert_eq!(ids, vec!["p1-a", "p1-b"]);
}

#[tokio::test]
async fn test_paginate_follows_next_link() {
    let server = MockServer::start().await;
    let mut first = listing(&["p1-a", "p1-b"]);
    first["@odata.count"] = serde_json::json!(3);
    first["@odata.nextLink"] =
        serde_json::json!(format!("{}{CATALOG_PATH}?$skip=2", server.uri()));

    Mock::given(method("GET"))
        .and(path(CATALOG_PATH))
        .and(query_param("$orderby", "ContentDate/Start asc"))
        .and(query_param_is_missing("$skip"))
        .respond_with(ResponseTemplate::new(200).set_body_json(first))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(CATALOG_PATH))
        .and(query_param("$skip", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(listing(&["p2-a"])))
        .expect(1)
        .mount(&server)
        .await;

    let mut config = mock_config(&server);
    config.paginate = true;
    let ids = CatalogQuery::new(reqwest::Client::new(), &config)
        .search_ids(&sentinel1_filter())
        .await
        .unwrap();

    assert_eq!(ids, vec!["p1-a", "p1-b", "p2-a"]);
}

#[tokio::test]
async fn test_paginate_stops_at_max_pages() {
    let server = MockServer::start().await;
    let mut page = listing(&["loop"]);
    page["@odata.nextLink"] = serde_json::json!(format!("{}{CATALOG_PATH}?$skip=1", server.uri()));

    Mock::given(method("GET"))
        .and(path(CATALOG_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(page))
        .expect(3)
        .mount(&server)
        .await;

    let mut config = mock_config(&server);
    config.paginate = true;
    config.max_pages = 3;
    let ids = CatalogQuery::new(reqwest::Client::new(), &config)
        .search_ids(&sentinel1_filter())
        .await
        .unwrap();

    assert_eq!(ids.len(), 3);
}
