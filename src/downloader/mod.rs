//! Authenticated archive downloads.
//!
//! This module streams product archives from the download endpoint to disk. The main
//! entry points are [`ArchiveFetcher::fetch`] for a single product and
//! [`ArchiveFetcher::fetch_all`] for a batch.

mod archive_fetcher;
mod headers;

// Re-export public API
pub use archive_fetcher::{ArchiveFetcher, BatchReport};
pub use headers::{is_archive_content_type, parse_content_disposition};
