//! Common test utilities for integration tests

use sentinel_fetch::config::ResolvedConfig;
use sentinel_fetch::models::{AreaOfInterest, Credentials, DateRange, SearchFilter};
use std::fs;
use std::io::{Cursor, Write};
use std::path::Path;
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[allow(dead_code)]
pub const TOKEN_PATH: &str = "/auth/realms/CDSE/protocol/openid-connect/token";
#[allow(dead_code)]
pub const CATALOG_PATH: &str = "/odata/v1/Products";

/// Configuration pointing every endpoint at the mock server
#[allow(dead_code)]
pub fn mock_config(server: &MockServer) -> ResolvedConfig {
    ResolvedConfig {
        identity_url: format!("{}{TOKEN_PATH}", server.uri()),
        catalog_url: format!("{}{CATALOG_PATH}", server.uri()),
        download_url: format!("{}/download/odata/v1/Products", server.uri()),
        ..ResolvedConfig::default()
    }
}

#[allow(dead_code)]
pub fn test_credentials() -> Credentials {
    Credentials::new("user@example.com", "correct-horse").unwrap()
}

/// The scenario used throughout the tests: SLC scenes over Palu, September 2018
#[allow(dead_code)]
pub fn sentinel1_filter() -> SearchFilter {
    SearchFilter::builder("SENTINEL-1")
        .name_contains("SLC")
        .area(AreaOfInterest::rectangle(119.76, -1.05, 119.96, -0.65).unwrap())
        .dates(DateRange::parse("2018-09-10", "2018-09-22").unwrap())
        .build()
        .unwrap()
}

/// Mounts a token endpoint answering every password grant with `token`
#[allow(dead_code)]
pub async fn mount_token(server: &MockServer, token: &str, expires_in: u64) {
    Mock::given(method("POST"))
        .and(path(TOKEN_PATH))
        .and(body_string_contains("grant_type=password"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "access_token": token,
            "expires_in": expires_in,
            "token_type": "Bearer",
        })))
        .mount(server)
        .await;
}

/// OData listing body with one product per id
#[allow(dead_code)]
pub fn listing(ids: &[&str]) -> serde_json::Value {
    let value: Vec<_> = ids
        .iter()
        .map(|id| {
            serde_json::json!({
                "Id": id,
                "Name": format!("S1A_IW_SLC__1SDV_{id}.SAFE"),
                "ContentType": "application/octet-stream",
            })
        })
        .collect();
    serde_json::json!({ "@odata.count": ids.len(), "value": value })
}

/// Helper function to build an in-memory ZIP with specified files
#[allow(dead_code)]
pub fn zip_bytes(files: &[(&str, &str)]) -> Vec<u8> {
    use zip::write::FileOptions;
    use zip::ZipWriter;

    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    let options = FileOptions::default().compression_method(zip::CompressionMethod::Stored);
    for (name, content) in files {
        zip.start_file(*name, options).unwrap();
        zip.write_all(content.as_bytes()).unwrap();
    }
    zip.finish().unwrap().into_inner()
}

/// Helper function to create a test ZIP file with specified files
#[allow(dead_code)]
pub fn create_test_zip(
    zip_path: &Path,
    files: &[(&str, &str)],
) -> Result<(), Box<dyn std::error::Error>> {
    fs::write(zip_path, zip_bytes(files))?;
    Ok(())
}
