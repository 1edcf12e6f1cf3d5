//! sentinel-fetch library
//!
//! This crate provides the core functionality for the `sentinel-fetch` binary.
//! The crate root only declares modules; implementation and tests live in the modules.
//!
//! ## Overview
//!
//! The library follows the three steps of the Copernicus Data Space download protocol:
//!
//! - [`auth`] - Exchanges credentials for a bearer token and refreshes it before it expires
//! - [`catalog`] - Builds the OData filter and lists matching products
//! - [`downloader`] - Streams product archives to disk with the bearer token
//! - [`extractor`] - Unpacks the downloaded ZIP archives
//! - [`cli`] - Command-line interface orchestrating the workflow
//! - [`config`] - Endpoint, transport and search configuration
//! - [`models`] - Search filter, token and result types
//! - [`errors`] - Error types used throughout the application
//!
//! ## Example Usage
//!
//! ```no_run
//! use sentinel_fetch::auth::Authenticator;
//! use sentinel_fetch::catalog::CatalogQuery;
//! use sentinel_fetch::config::ResolvedConfig;
//! use sentinel_fetch::downloader::ArchiveFetcher;
//! use sentinel_fetch::errors::AppResult;
//! use sentinel_fetch::models::{AreaOfInterest, Credentials, DateRange, SearchFilter};
//!
//! # async fn example() -> AppResult<()> {
//! let config = ResolvedConfig::default();
//! let client = config.http_client()?;
//! let credentials = Credentials::new("user@example.com", "password")?;
//! let authenticator = Authenticator::login(client.clone(), &config, credentials).await?;
//!
//! let filter = SearchFilter::builder("SENTINEL-1")
//!     .name_contains("SLC")
//!     .area(AreaOfInterest::rectangle(119.76, -1.05, 119.96, -0.65)?)
//!     .dates(DateRange::parse("2018-09-10", "2018-09-22")?)
//!     .build()?;
//! let ids = CatalogQuery::new(client.clone(), &config).search_ids(&filter).await?;
//!
//! let mut fetcher = ArchiveFetcher::new(client, &config, authenticator);
//! let report = fetcher.fetch_all(&ids, &config.download_dir, "SLC").await?;
//! report.ensure_success()?;
//! # Ok(())
//! # }
//! ```

pub mod auth;
pub mod catalog;
pub mod cli;
pub mod config;
pub mod constants;
pub mod downloader;
pub mod errors;
pub mod extractor;
pub mod models;
pub mod ui;
