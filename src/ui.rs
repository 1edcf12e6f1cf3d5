use crate::errors::{AppError, AppResult};
use indicatif::{ProgressBar, ProgressStyle};

const BATCH_TEMPLATE: &str =
    "{spinner:.green} [{elapsed_precise}] [{wide_bar:.cyan/blue}] {pos}/{len} products {msg}";

/// Progress bar for a batch of product fetches, one tick per product.
///
/// # Example
///
/// ```no_run
/// use sentinel_fetch::ui;
///
/// # fn main() -> Result<(), sentinel_fetch::errors::AppError> {
/// let pb = ui::batch_progress(3)?;
/// pb.set_message(ui::fetching_message("8f1c1f1e"));
/// pb.inc(1);
/// ui::finish_batch(&pb, 1, 0);
/// # Ok(())
/// # }
/// ```
pub fn batch_progress(products: usize) -> AppResult<ProgressBar> {
    let style = ProgressStyle::default_bar()
        .template(BATCH_TEMPLATE)
        .map_err(|e| AppError::Io(format!("Invalid progress template: {e}")))?
        .progress_chars("#>-");
    Ok(ProgressBar::new(products as u64).with_style(style))
}

pub fn fetching_message(product_id: &str) -> String {
    format!("fetching {product_id}")
}

/// Final line of the bar: archives written, plus failures when there were any.
pub fn summary(written: usize, failed: usize) -> String {
    match failed {
        0 => format!("downloaded {written} archive(s)"),
        _ => format!("downloaded {written} archive(s), {failed} failed"),
    }
}

pub fn finish_batch(pb: &ProgressBar, written: usize, failed: usize) {
    pb.finish_with_message(summary(written, failed));
}
