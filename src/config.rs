use crate::constants::*;
use crate::errors::{AppError, AppResult};
use crate::models::{AreaOfInterest, Credentials, DateRange, SearchFilter};
use chrono::NaiveDate;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;

/// Resolved configuration with all values filled in (no Options).
///
/// This struct holds the endpoint and transport defaults and can be deserialized by the
/// TOML loader. All fields have concrete values, making it safe to access directly.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ResolvedConfig {
    /// Token endpoint of the identity provider
    pub identity_url: String,
    /// OAuth client id sent with the password grant
    pub client_id: String,
    /// OData products listing endpoint
    pub catalog_url: String,
    /// Base of the archive download endpoint; `(<id>)/$value` is appended
    pub download_url: String,
    /// Directory where archives are written
    pub download_dir: PathBuf,

    // Catalog
    /// Number of products requested per listing page (`$top`)
    pub page_size: usize,
    /// Follow `@odata.nextLink` instead of stopping after the first page
    pub paginate: bool,
    /// Upper bound on listing pages fetched when `paginate` is enabled
    pub max_pages: usize,

    // Transport
    /// Total request timeout in seconds, covering the whole archive download
    pub timeout_secs: u64,
    /// TCP connect timeout in seconds
    pub connect_timeout_secs: u64,
}

impl Default for ResolvedConfig {
    fn default() -> Self {
        Self {
            identity_url: IDENTITY_URL.to_string(),
            client_id: CLIENT_ID.to_string(),
            catalog_url: CATALOG_URL.to_string(),
            download_url: DOWNLOAD_URL.to_string(),
            download_dir: PathBuf::from("data"),
            page_size: PAGE_SIZE,
            paginate: false,
            max_pages: 50,
            timeout_secs: 300,
            connect_timeout_secs: 30,
        }
    }
}

impl ResolvedConfig {
    /// Checks endpoint URLs and numeric bounds that serde cannot express.
    pub fn validate(&self) -> AppResult<()> {
        for endpoint in [&self.identity_url, &self.catalog_url, &self.download_url] {
            Url::parse(endpoint)?;
        }
        if self.page_size == 0 || self.page_size > MAX_PAGE_SIZE {
            return Err(AppError::InvalidInput(format!(
                "Page size must be between 1 and {MAX_PAGE_SIZE}, got {}",
                self.page_size
            )));
        }
        if self.max_pages == 0 {
            return Err(AppError::InvalidInput(
                "Max pages must be greater than 0".into(),
            ));
        }
        if self.timeout_secs == 0 || self.connect_timeout_secs == 0 {
            return Err(AppError::InvalidInput(
                "Timeouts must be greater than 0".into(),
            ));
        }
        Ok(())
    }

    /// Builds the HTTP client shared by the authenticator, the catalog query and the fetcher.
    pub fn http_client(&self) -> AppResult<reqwest::Client> {
        reqwest::Client::builder()
            .timeout(Duration::from_secs(self.timeout_secs))
            .connect_timeout(Duration::from_secs(self.connect_timeout_secs))
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| AppError::Network(format!("Failed to build HTTP client: {e}")))
    }
}

/// Search run that can be loaded from a TOML file.
///
/// Deserializes the search parameters (collection, name filter, area, dates) and the
/// optional endpoint/transport overrides. Unknown keys are rejected to catch typos.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SearchConfigFile {
    /// Collection name, e.g. `"SENTINEL-1"`
    pub collection: String,
    /// Substring the product name (and archive filename) must contain
    pub name_contains: String,
    /// `[lon_min, lat_min, lon_max, lat_max]` in WGS-84 degrees
    pub aoi: [f64; 4],
    /// First acquisition date (inclusive)
    pub start: NaiveDate,
    /// Last acquisition date (exclusive)
    pub end: NaiveDate,
    /// Falls back to `CDSE_USERNAME` when absent
    pub username: Option<String>,
    /// Falls back to `CDSE_PASSWORD` when absent
    pub password: Option<String>,
    /// Whether to unpack downloaded archives (defaults to `false`)
    #[serde(default)]
    pub extract: bool,
    /// Flattened resolved configuration with endpoint defaults
    #[serde(flatten)]
    pub resolved: ResolvedConfig,
}

impl SearchConfigFile {
    /// Loads and validates a search run from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` if the TOML is malformed, required fields are missing,
    /// unknown keys are present, or a numeric setting is out of range. Returns `Io`
    /// if the file cannot be read.
    pub fn from_toml_file(path: &Path) -> AppResult<Self> {
        let contents = fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    pub fn from_toml_str(contents: &str) -> AppResult<Self> {
        let config: SearchConfigFile = toml::from_str(contents)
            .map_err(|e| AppError::InvalidInput(format!("Failed to parse config: {e}")))?;
        config.resolved.validate()?;
        Ok(config)
    }

    /// Builds the search filter described by this file.
    pub fn search_filter(&self) -> AppResult<SearchFilter> {
        let [lon_min, lat_min, lon_max, lat_max] = self.aoi;
        SearchFilter::builder(self.collection.as_str())
            .name_contains(self.name_contains.as_str())
            .area(AreaOfInterest::rectangle(lon_min, lat_min, lon_max, lat_max)?)
            .dates(DateRange::new(self.start, self.end)?)
            .build()
    }

    /// Resolves credentials; environment variables take precedence over file values.
    pub fn credentials(&self) -> AppResult<Credentials> {
        resolve_credentials(self.username.as_deref(), self.password.as_deref())
    }
}

/// Reads credentials from `CDSE_USERNAME` / `CDSE_PASSWORD`, falling back to the given values.
pub fn resolve_credentials(
    username: Option<&str>,
    password: Option<&str>,
) -> AppResult<Credentials> {
    let username = std::env::var(USERNAME_ENV)
        .ok()
        .or_else(|| username.map(str::to_string))
        .ok_or_else(|| AppError::InvalidInput(format!("Missing username (set {USERNAME_ENV})")))?;
    let password = std::env::var(PASSWORD_ENV)
        .ok()
        .or_else(|| password.map(str::to_string))
        .ok_or_else(|| AppError::InvalidInput(format!("Missing password (set {PASSWORD_ENV})")))?;
    Credentials::new(username, password)
}
