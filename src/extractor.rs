use crate::constants::ARCHIVE_EXTENSION;
use crate::errors::{AppError, AppResult};
use std::fs::File;
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use zip::ZipArchive;

/// Extracts every ZIP archive found directly inside `dir` into `dir` itself.
///
/// # Behavior
///
/// - **Non-recursive**: only files at the top level of `dir` with a `.zip`
///   extension (any case) are considered, in file-name order.
/// - **Overwrite**: extracted files replace existing files with the same path.
/// - **Fail fast**: the first corrupt or unreadable archive aborts the run.
///
/// Returns the archives that were extracted.
///
/// # Errors
///
/// Returns `Io` if `dir` does not exist, and `Extraction` if an archive cannot
/// be read or unpacked.
///
/// # Example
///
/// ```no_run
/// use sentinel_fetch::extractor;
/// use std::path::Path;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let extracted = extractor::extract_all(Path::new("data")).await?;
/// println!("Extracted {} archive(s)", extracted.len());
/// # Ok(())
/// # }
/// ```
pub async fn extract_all(dir: &Path) -> AppResult<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Err(AppError::Io(format!(
            "Directory does not exist: {}",
            dir.display()
        )));
    }

    let archives = find_archives(dir)?;
    if archives.is_empty() {
        info!(dir = %dir.display(), "No archives to extract");
        return Ok(archives);
    }

    info!(total = archives.len(), dir = %dir.display(), "Starting extraction");

    let out_dir = dir.to_path_buf();
    let extracted = tokio::task::spawn_blocking(move || -> AppResult<Vec<PathBuf>> {
        for archive in &archives {
            let entries = extract_archive(archive, &out_dir)?;
            debug!(archive = %archive.display(), entries = entries, "Archive extracted");
        }
        Ok(archives)
    })
    .await
    .map_err(|e| AppError::Io(format!("Task join error: {e}")))??;

    info!(extracted = extracted.len(), "Extraction completed");
    Ok(extracted)
}

/// Lists the `.zip` files at the top level of `dir`, sorted by name.
pub(crate) fn find_archives(dir: &Path) -> AppResult<Vec<PathBuf>> {
    let mut archives = Vec::new();
    let walker = walkdir::WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name();
    for entry in walker {
        let entry = entry.map_err(|e| {
            AppError::Io(format!("Failed to list {}: {}", dir.display(), e))
        })?;
        if !entry.file_type().is_file() {
            continue;
        }
        let is_archive = entry
            .path()
            .extension()
            .and_then(|e| e.to_str())
            .map_or(false, |ext| ext.eq_ignore_ascii_case(ARCHIVE_EXTENSION));
        if is_archive {
            archives.push(entry.into_path());
        }
    }
    Ok(archives)
}

/// Unpacks one archive into `out_dir`, returning the number of files written.
fn extract_archive(zip_path: &Path, out_dir: &Path) -> AppResult<usize> {
    let file = File::open(zip_path).map_err(|e| {
        AppError::Extraction(format!(
            "Failed to open ZIP file {}: {}",
            zip_path.display(),
            e
        ))
    })?;

    let mut archive = ZipArchive::new(file).map_err(|e| {
        AppError::Extraction(format!(
            "Failed to read ZIP archive {}: {}",
            zip_path.display(),
            e
        ))
    })?;

    let mut written = 0;
    for i in 0..archive.len() {
        let mut entry = archive.by_index(i).map_err(|e| {
            AppError::Extraction(format!(
                "Failed to read entry {} from ZIP {}: {}",
                i,
                zip_path.display(),
                e
            ))
        })?;

        // Entries with absolute paths or `..` components are not unpacked
        let out_path = match entry.enclosed_name() {
            Some(path) => out_dir.join(path),
            None => continue,
        };

        if entry.is_dir() {
            std::fs::create_dir_all(&out_path).map_err(|e| {
                AppError::Extraction(format!(
                    "Failed to create directory {}: {}",
                    out_path.display(),
                    e
                ))
            })?;
            continue;
        }

        if let Some(parent) = out_path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                AppError::Extraction(format!(
                    "Failed to create directory {}: {}",
                    parent.display(),
                    e
                ))
            })?;
        }

        let mut out_file = File::create(&out_path).map_err(|e| {
            AppError::Extraction(format!(
                "Failed to create file {}: {}",
                out_path.display(),
                e
            ))
        })?;

        std::io::copy(&mut entry, &mut out_file).map_err(|e| {
            AppError::Extraction(format!(
                "Failed to copy file from ZIP {} to {}: {}",
                zip_path.display(),
                out_path.display(),
                e
            ))
        })?;
        written += 1;
    }

    Ok(written)
}
