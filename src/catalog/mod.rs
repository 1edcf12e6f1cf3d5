//! Catalog search against the OData products listing.
//!
//! [`odata_filter`] turns a [`SearchFilter`](crate::models::SearchFilter) into the
//! `$filter` expression understood by the catalog, and [`CatalogQuery`] issues the
//! listing requests. The main entry point is [`CatalogQuery::search`].

mod filter;
mod query;

// Re-export public API
pub use filter::odata_filter;
pub use query::CatalogQuery;
