//! Integration tests for the exporter
//!
//! These tests use wiremock to stand in for the catalog service and run
//! whole exports end-to-end into a temporary directory.

use exchange_export::catalog::AssetCoordinates;
use exchange_export::config::Config;
use exchange_export::crawler::Exporter;
use exchange_export::ExportError;
use serde_json::{json, Value};
use std::path::Path;
use tempfile::TempDir;
use wiremock::matchers::{body_string_contains, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const ASSET_BASE: &str = "/exchange/api/v2/assets/g1/a1/1.10.0";

/// Creates a test configuration pointing at the mock server
fn create_test_config(base_url: &str, output_dir: &Path) -> Config {
    let mut config = Config::default();
    config.exchange.base_url = base_url.to_string();
    config.exchange.organization_id = "org-1".to_string();
    config.exchange.client_id = Some("client".to_string());
    config.exchange.client_secret = Some("secret".to_string());
    config.export.output_dir = output_dir.display().to_string();
    config.export.request_delay_ms = 0;
    config
}

fn read_json(path: &Path) -> Value {
    let text = std::fs::read_to_string(path)
        .unwrap_or_else(|e| panic!("Failed to read {}: {}", path.display(), e));
    serde_json::from_str(&text).expect("Failed to parse JSON")
}

async fn mount_token(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/accounts/api/v2/oauth2/token"))
        .and(body_string_contains("grant_type=client_credentials"))
        .and(body_string_contains("client_id=client"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "tok",
            "token_type": "bearer"
        })))
        .mount(server)
        .await;
}

/// Mounts the portal of g1/a1:1.10.0: one HTML page with one image
async fn mount_portal(server: &MockServer) {
    let image_url = format!(
        "{}{}/portal/resources/img/Screen%20Shot.png",
        server.uri(),
        ASSET_BASE
    );
    let page = format!(
        r#"<h1>Guide</h1><p>Overview</p><p><img src="{}" alt="diagram"></p>"#,
        image_url
    );

    Mock::given(method("GET"))
        .and(path(format!("{}/portal", ASSET_BASE)))
        .and(header("authorization", "Bearer tok"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "portal-1"})))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path(format!("{}/portal/pages", ASSET_BASE)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"path": "9uv-lqc/Content Paged", "title": "Content Paged", "name": "content"}
        ])))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path(format!("{}/portal/pages/9uv-lqc/Content%20Paged", ASSET_BASE)))
        .respond_with(ResponseTemplate::new(200).set_body_raw(page, "text/html"))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path(format!("{}/portal/resources/img/Screen%20Shot.png", ASSET_BASE)))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"PNGDATA".to_vec()))
        .expect(1)
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_full_export() {
    let mock_server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    mount_token(&mock_server).await;
    mount_portal(&mock_server).await;

    Mock::given(method("GET"))
        .and(path("/exchange/api/v2/assets"))
        .and(query_param("organizationId", "org-1"))
        .and(query_param("limit", "100"))
        .and(header("authorization", "Bearer tok"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"groupId": "g1", "assetId": "a1", "version": "1.0.0"},
            {"groupId": "g1", "assetId": "a1", "version": "1.10.0", "name": "Orders"},
            {"groupId": "g1", "assetId": "a2", "version": "latest"},
            {"assetId": "broken"}
        ])))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path(ASSET_BASE))
        .and(query_param("organizationId", "org-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "name": "Orders",
            "categories": [
                {"key": "Domain", "value": ["Sales"], "displayName": "Business Domain"}
            ]
        })))
        .mount(&mock_server)
        .await;

    let config = create_test_config(&mock_server.uri(), dir.path());
    let exporter = Exporter::new(config, Some("abc".to_string())).unwrap();
    let summary = exporter.run().await.expect("Export failed");

    assert_eq!(summary.total_assets_found, 4);
    assert_eq!(summary.latest_assets_processed, 2);
    assert_eq!(summary.skipped_entries, 1);
    assert_eq!(summary.superseded_entries, 1);
    assert_eq!(summary.unique_categories, 1);
    assert_eq!(summary.config_hash.as_deref(), Some("abc"));

    let asset_dir = dir.path().join("g1_a1_1.10.0");
    assert!(!dir.path().join("g1_a1_1.0.0").exists());
    assert_eq!(read_json(&asset_dir.join("metadata.json"))["name"], "Orders");
    assert_eq!(read_json(&asset_dir.join("portal_info.json"))["id"], "portal-1");
    assert!(asset_dir.join("portal_pages.json").exists());
    assert!(asset_dir.join("pages/Content_Paged.json").exists());

    let record = read_json(&asset_dir.join("Content_Paged_content.json"));
    assert_eq!(record["path"], "9uv-lqc/Content Paged");
    assert_eq!(record["content_type"], "text/html");

    assert_eq!(
        std::fs::read(asset_dir.join("images/img/Screen_Shot.png")).unwrap(),
        b"PNGDATA"
    );

    let expected_docs = if cfg!(feature = "markdown") {
        let markdown = std::fs::read_to_string(asset_dir.join("Content_Paged.md")).unwrap();
        assert!(markdown.contains("images/img/Screen_Shot.png"));
        assert!(!markdown.contains("/portal/resources/"));
        5
    } else {
        4
    };
    assert_eq!(summary.docs_downloaded, expected_docs);

    assert_eq!(
        read_json(&dir.path().join("categories.json")),
        json!([{"tagKey": "Domain", "value": ["Sales"]}])
    );

    let written = read_json(&dir.path().join("download_summary.json"));
    assert_eq!(written["latest_assets_processed"], 2);
    assert_eq!(written["settings"]["include-docs"], true);
    assert_eq!(written["settings"]["group_id_filter"], Value::Null);
    assert_eq!(written["settings"]["asset_id_filter"], Value::Null);
}

#[tokio::test]
async fn test_catalog_filters_are_sent_and_recorded() {
    let mock_server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    mount_token(&mock_server).await;

    Mock::given(method("GET"))
        .and(path("/exchange/api/v2/assets"))
        .and(query_param("organizationId", "org-1"))
        .and(query_param("groupId", "g1"))
        .and(query_param("search", "orders"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"groupId": "g1", "assetId": "orders", "version": "1.0.0"}
        ])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let mut config = create_test_config(&mock_server.uri(), dir.path());
    config.exchange.group_id = Some("g1".to_string());
    config.exchange.asset_id = Some("orders".to_string());
    config.export.include_docs = false;
    config.export.include_metadata = false;

    let exporter = Exporter::new(config, None).unwrap();
    let summary = exporter.run().await.expect("Export failed");

    assert_eq!(summary.total_assets_found, 1);
    assert_eq!(summary.settings.group_id_filter.as_deref(), Some("g1"));

    let written = read_json(&dir.path().join("download_summary.json"));
    assert_eq!(written["settings"]["group_id_filter"], "g1");
    assert_eq!(written["settings"]["asset_id_filter"], "orders");
    assert_eq!(written["settings"]["output-dir"], dir.path().display().to_string());
}

#[tokio::test]
async fn test_authentication_failure_is_fatal() {
    let mock_server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    Mock::given(method("POST"))
        .and(path("/accounts/api/v2/oauth2/token"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&mock_server)
        .await;

    let config = create_test_config(&mock_server.uri(), dir.path());
    let exporter = Exporter::new(config, None).unwrap();
    let result = exporter.run().await;

    assert!(matches!(result, Err(ExportError::Auth(_))));
    assert!(!dir.path().join("download_summary.json").exists());
}

#[tokio::test]
async fn test_single_asset_extraction() {
    let mock_server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    mount_token(&mock_server).await;
    mount_portal(&mock_server).await;

    let config = create_test_config(&mock_server.uri(), dir.path());
    let exporter = Exporter::new(config, None).unwrap();
    let asset = AssetCoordinates::new("g1", "a1", "1.10.0");
    let summary = exporter.extract_asset(&asset).await.expect("Extraction failed");

    assert_eq!(summary.pages_listed, 1);
    assert_eq!(summary.images_saved, 1);
    assert_eq!(summary.images_failed, 0);

    let written = read_json(&dir.path().join("extraction_summary.json"));
    assert_eq!(written["asset_id"], "a1");
    assert_eq!(written["asset_version"], "1.10.0");
    assert!(dir
        .path()
        .join("g1_a1_1.10.0/images/img/Screen_Shot.png")
        .exists());
}

#[tokio::test]
async fn test_specification_files_download() {
    let mock_server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    mount_token(&mock_server).await;

    Mock::given(method("GET"))
        .and(path("/exchange/api/v2/assets"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "assets": [{"groupId": "g1", "assetId": "a3", "version": "2.0.0"}]
        })))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/exchange/api/v2/assets/g1/a3/2.0.0/files"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "files": [
                {"fileName": "orders-openapi.yaml", "downloadURL": format!("{}/blobs/spec", mock_server.uri())},
                {"fileName": "README.md", "downloadURL": format!("{}/blobs/readme", mock_server.uri())},
                {"fileName": "no-url.json"}
            ]
        })))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/blobs/spec"))
        .respond_with(ResponseTemplate::new(200).set_body_string("openapi: 3.0.0\n"))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/blobs/readme"))
        .respond_with(ResponseTemplate::new(200).set_body_string("# Readme\n"))
        .expect(0)
        .mount(&mock_server)
        .await;

    let mut config = create_test_config(&mock_server.uri(), dir.path());
    config.export.include_files = true;
    config.export.include_docs = false;
    config.export.include_metadata = false;

    let exporter = Exporter::new(config, None).unwrap();
    let summary = exporter.run().await.expect("Export failed");

    assert_eq!(summary.specs_downloaded, 1);
    assert_eq!(summary.docs_downloaded, 0);
    assert_eq!(
        std::fs::read_to_string(dir.path().join("g1_a3_2.0.0/files/orders-openapi.yaml")).unwrap(),
        "openapi: 3.0.0\n"
    );
    assert!(!dir.path().join("g1_a3_2.0.0/files/README.md").exists());
    assert!(!dir.path().join("categories.json").exists());
}
