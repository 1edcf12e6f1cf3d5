use super::filter::odata_filter;
use crate::config::ResolvedConfig;
use crate::errors::{AppError, AppResult};
use crate::models::{CatalogItem, SearchFilter};
use serde::Deserialize;
use tracing::{debug, info, warn};

/// One page of the OData products listing.
#[derive(Debug, Deserialize)]
struct ProductPage {
    value: Vec<CatalogItem>,
    #[serde(rename = "@odata.count", default)]
    count: Option<u64>,
    #[serde(rename = "@odata.nextLink", default)]
    next_link: Option<String>,
}

/// Client for the catalog listing endpoint.
///
/// The listing is not deterministic across repeated calls when a filter matches more
/// products than fit in one page: a single page may silently leave out valid matches.
/// By default only the first page is requested. With `paginate` enabled the query
/// orders results by acquisition start and follows `@odata.nextLink` up to `max_pages`.
pub struct CatalogQuery {
    client: reqwest::Client,
    catalog_url: String,
    page_size: usize,
    paginate: bool,
    max_pages: usize,
}

impl CatalogQuery {
    pub fn new(client: reqwest::Client, config: &ResolvedConfig) -> Self {
        Self {
            client,
            catalog_url: config.catalog_url.clone(),
            page_size: config.page_size,
            paginate: config.paginate,
            max_pages: config.max_pages,
        }
    }

    /// Searches the catalog for products matching `filter`.
    ///
    /// Items are returned in the order the server listed them.
    ///
    /// # Errors
    ///
    /// Returns `NoResults` if nothing matches, `Http` on a non-success status and
    /// `Parse` if the listing body is not valid OData JSON.
    pub async fn search(&self, filter: &SearchFilter) -> AppResult<Vec<CatalogItem>> {
        let expr = odata_filter(filter);
        debug!(filter = %expr, "Querying catalog");

        let mut params = vec![
            ("$filter", expr),
            ("$count", "True".to_string()),
            ("$top", self.page_size.to_string()),
        ];
        if self.paginate {
            params.push(("$orderby", "ContentDate/Start asc".to_string()));
        }

        let request = self.client.get(&self.catalog_url).query(&params);
        let first = self.fetch_page(request, &self.catalog_url).await?;

        let total = first.count;
        let mut next_link = first.next_link;
        let mut items = first.value;
        let mut pages = 1;

        if self.paginate {
            while let Some(link) = next_link.take() {
                if pages >= self.max_pages {
                    warn!(
                        pages = pages,
                        collected = items.len(),
                        total = ?total,
                        "Reached page limit, listing is incomplete"
                    );
                    break;
                }
                let page = self.fetch_page(self.client.get(&link), &link).await?;
                pages += 1;
                items.extend(page.value);
                next_link = page.next_link;
            }
        } else if total.map_or(false, |t| t > items.len() as u64) {
            warn!(
                returned = items.len(),
                total = ?total,
                "Only the first page of results was fetched; enable pagination to list all products"
            );
        }

        if items.is_empty() {
            return Err(AppError::NoResults);
        }

        info!(
            collection = filter.collection(),
            found = items.len(),
            pages = pages,
            "Catalog query completed"
        );
        Ok(items)
    }

    /// Like [`search`](Self::search) but keeps only the product identifiers.
    pub async fn search_ids(&self, filter: &SearchFilter) -> AppResult<Vec<String>> {
        let items = self.search(filter).await?;
        Ok(items.into_iter().map(|item| item.id).collect())
    }

    async fn fetch_page(
        &self,
        request: reqwest::RequestBuilder,
        url: &str,
    ) -> AppResult<ProductPage> {
        let response = request
            .send()
            .await
            .map_err(|e| AppError::Network(format!("Catalog request to {url} failed: {e}")))?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(AppError::Http {
                status: status.as_u16(),
                url: url.to_string(),
                body,
            });
        }

        serde_json::from_str(&body)
            .map_err(|e| AppError::Parse(format!("Invalid catalog listing from {url}: {e}")))
    }
}
