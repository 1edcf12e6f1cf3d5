use super::headers::{is_archive_content_type, parse_content_disposition};
use crate::auth::Authenticator;
use crate::config::ResolvedConfig;
use crate::constants::CHUNK_SIZE;
use crate::errors::{AppError, AppResult};
use crate::models::FetchOutcome;
use crate::ui;
use futures::StreamExt;
use reqwest::header::{CONTENT_DISPOSITION, CONTENT_TYPE};
use reqwest::StatusCode;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::fs::File;
use tokio::io::{AsyncWriteExt, BufWriter};
use tracing::{debug, info, warn};

/// Summary of a batch of fetches.
#[derive(Debug, Default)]
pub struct BatchReport {
    /// Archives written to disk
    pub written: Vec<PathBuf>,
    /// Identifiers whose response was not an archive or did not match the name filter
    pub skipped: Vec<String>,
    /// Identifiers that failed, with the error message
    pub failed: Vec<(String, String)>,
}

impl BatchReport {
    /// Turns recorded failures into a single error.
    pub fn ensure_success(&self) -> AppResult<()> {
        if self.failed.is_empty() {
            return Ok(());
        }
        let details: Vec<String> = self
            .failed
            .iter()
            .map(|(id, error)| format!("{id}: {error}"))
            .collect();
        Err(AppError::Network(format!(
            "Failed to fetch {} product(s): {}",
            self.failed.len(),
            details.join("; ")
        )))
    }
}

/// Streams product archives from the download endpoint.
///
/// The fetcher owns the [`Authenticator`] so it can refresh the bearer token before
/// each request.
pub struct ArchiveFetcher {
    client: reqwest::Client,
    download_url: String,
    authenticator: Authenticator,
}

impl ArchiveFetcher {
    pub fn new(
        client: reqwest::Client,
        config: &ResolvedConfig,
        authenticator: Authenticator,
    ) -> Self {
        Self {
            client,
            download_url: config.download_url.trim_end_matches('/').to_string(),
            authenticator,
        }
    }

    /// URL of the binary content of a product.
    pub fn product_url(&self, id: &str) -> String {
        format!("{}({id})/$value", self.download_url)
    }

    /// Downloads one product archive into `destination_dir`.
    ///
    /// # Behavior
    ///
    /// - **Content type**: only `application/zip` responses are written; metadata
    ///   responses are skipped.
    /// - **Filename**: taken from the `Content-Disposition` header; the archive is
    ///   written only if that name contains `name_filter`.
    /// - **Streaming**: the body goes to disk chunk by chunk through an 8 KiB buffer.
    ///
    /// A failure mid-stream leaves a truncated file behind. There is no retry, resume
    /// or checksum verification.
    ///
    /// # Errors
    ///
    /// Returns `Unauthorized` on 401/403, `Http` on other non-success statuses,
    /// `Parse` if an archive response has no usable `Content-Disposition`, and
    /// `Network`/`Io` if streaming or writing fails.
    pub async fn fetch(
        &mut self,
        id: &str,
        destination_dir: &Path,
        name_filter: &str,
    ) -> AppResult<FetchOutcome> {
        let url = self.product_url(id);
        let token = self.authenticator.bearer().await?;

        let response = self
            .client
            .get(&url)
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| AppError::Network(format!("Failed to request product {id}: {e}")))?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(AppError::Unauthorized {
                status: status.as_u16(),
                url,
            });
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::Http {
                status: status.as_u16(),
                url,
                body,
            });
        }

        let content_type = header_str(&response, CONTENT_TYPE).unwrap_or_default();
        if !is_archive_content_type(&content_type) {
            debug!(
                product_id = id,
                content_type = %content_type,
                "Response is not an archive, skipping"
            );
            return Ok(FetchOutcome::SkippedContentType(content_type));
        }

        let disposition = header_str(&response, CONTENT_DISPOSITION).ok_or_else(|| {
            AppError::Parse(format!(
                "Archive response for {id} has no Content-Disposition header"
            ))
        })?;
        let filename = parse_content_disposition(&disposition).ok_or_else(|| {
            AppError::Parse(format!(
                "No filename in Content-Disposition for {id}: {disposition}"
            ))
        })?;

        if !filename.contains(name_filter) {
            debug!(
                product_id = id,
                filename = %filename,
                name_filter = name_filter,
                "Archive name does not match filter, skipping"
            );
            return Ok(FetchOutcome::SkippedName(filename));
        }

        fs::create_dir_all(destination_dir).await.map_err(|e| {
            AppError::Io(format!(
                "Failed to create directory {}: {}",
                destination_dir.display(),
                e
            ))
        })?;

        let path = destination_dir.join(&filename);
        info!(product_id = id, file = %path.display(), "Downloading archive");
        let bytes = write_body(response, &path).await?;
        info!(product_id = id, bytes = bytes, "Archive written");

        Ok(FetchOutcome::Written { path, bytes })
    }

    /// Fetches every identifier in order, one at a time.
    ///
    /// A failed fetch is logged and recorded in the report; the batch carries on with
    /// the next identifier. Call [`BatchReport::ensure_success`] to turn failures into
    /// an error.
    pub async fn fetch_all(
        &mut self,
        ids: &[String],
        destination_dir: &Path,
        name_filter: &str,
    ) -> AppResult<BatchReport> {
        let pb = ui::batch_progress(ids.len())?;
        let mut report = BatchReport::default();

        for id in ids {
            pb.set_message(ui::fetching_message(id));
            match self.fetch(id, destination_dir, name_filter).await {
                Ok(FetchOutcome::Written { path, .. }) => report.written.push(path),
                Ok(_) => report.skipped.push(id.clone()),
                Err(e) => {
                    warn!(product_id = %id, error = %e, "Failed to fetch product");
                    report.failed.push((id.clone(), e.to_string()));
                }
            }
            pb.inc(1);
        }

        ui::finish_batch(&pb, report.written.len(), report.failed.len());

        info!(
            written = report.written.len(),
            skipped = report.skipped.len(),
            failed = report.failed.len(),
            "Download completed"
        );
        Ok(report)
    }
}

fn header_str(response: &reqwest::Response, name: reqwest::header::HeaderName) -> Option<String> {
    response
        .headers()
        .get(name)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string)
}

async fn write_body(response: reqwest::Response, path: &Path) -> AppResult<u64> {
    let file = File::create(path).await.map_err(|e| {
        AppError::Io(format!("Failed to create file {}: {}", path.display(), e))
    })?;
    let mut writer = BufWriter::with_capacity(CHUNK_SIZE, file);
    let mut stream = response.bytes_stream();
    let mut written: u64 = 0;

    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(|e| {
            AppError::Network(format!(
                "Download interrupted while writing {}: {}",
                path.display(),
                e
            ))
        })?;
        if chunk.is_empty() {
            continue;
        }
        writer.write_all(&chunk).await.map_err(|e| {
            AppError::Io(format!("Failed to write to {}: {}", path.display(), e))
        })?;
        written += chunk.len() as u64;
    }

    writer
        .flush()
        .await
        .map_err(|e| AppError::Io(format!("Failed to flush {}: {}", path.display(), e)))?;

    Ok(written)
}
