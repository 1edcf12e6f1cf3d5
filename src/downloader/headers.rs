use crate::constants::ARCHIVE_MIME_TYPE;
use std::path::Path;

/// Returns `true` if the `Content-Type` declares a zip archive.
///
/// Parameters such as `; charset=...` are ignored and the comparison is case-insensitive.
pub fn is_archive_content_type(content_type: &str) -> bool {
    content_type
        .split(';')
        .next()
        .map(|essence| essence.trim().eq_ignore_ascii_case(ARCHIVE_MIME_TYPE))
        .unwrap_or(false)
}

/// Parses a `Content-Disposition` header to extract a safe filename.
///
/// Handles:
/// - `attachment; filename="example.zip"`
/// - `attachment; filename=example.zip`
///
/// Only the final path component is kept so the name cannot escape the destination
/// directory. Returns `None` when no usable filename is present.
pub fn parse_content_disposition(header: &str) -> Option<String> {
    let raw = header.split(';').map(str::trim).find_map(|param| {
        let (key, value) = param.split_once('=')?;
        key.trim()
            .eq_ignore_ascii_case("filename")
            .then(|| value.trim())
    })?;

    let unquoted = raw
        .strip_prefix('"')
        .and_then(|v| v.strip_suffix('"'))
        .unwrap_or(raw);

    let last_segment = unquoted.rsplit(['/', '\\']).next()?;
    let name = Path::new(last_segment).file_name()?.to_str()?;
    if name.is_empty() || name == "." || name == ".." {
        return None;
    }
    Some(name.to_string())
}
