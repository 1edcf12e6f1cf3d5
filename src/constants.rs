// Copernicus Data Space endpoints
pub const IDENTITY_URL: &str =
    "https://identity.dataspace.copernicus.eu/auth/realms/CDSE/protocol/openid-connect/token";
pub const CATALOG_URL: &str = "https://catalogue.dataspace.copernicus.eu/odata/v1/Products";
pub const DOWNLOAD_URL: &str = "https://zipper.dataspace.copernicus.eu/odata/v1/Products";
pub const CLIENT_ID: &str = "cdse-public";

// Catalog query
pub const DEFAULT_COLLECTION: &str = "SENTINEL-1";
pub const PAGE_SIZE: usize = 100;
pub const MAX_PAGE_SIZE: usize = 1000;
pub const SRID: u32 = 4326;

// Archive handling
pub const ARCHIVE_MIME_TYPE: &str = "application/zip";
pub const ARCHIVE_EXTENSION: &str = "zip";
pub const CHUNK_SIZE: usize = 8192;

// Tokens are refreshed when they are this close to expiry
pub const TOKEN_EXPIRY_MARGIN_SECS: u64 = 30;

// Credential environment variables
pub const USERNAME_ENV: &str = "CDSE_USERNAME";
pub const PASSWORD_ENV: &str = "CDSE_PASSWORD";

// Date format used on the command line and in config files
pub const DATE_FORMAT: &str = "%Y-%m-%d";
