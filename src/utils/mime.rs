//! Content-type sniffing for attachments.

/// Magic-number match on the leading bytes.
fn sniff(bytes: &[u8]) -> Option<String> {
    infer::get(bytes).map(|kind| kind.mime_type().to_string())
}

/// Lookup by file extension; query strings and fragments are not stripped.
fn by_extension(path_or_url: &str) -> Option<String> {
    mime_guess::from_path(path_or_url)
        .first_raw()
        .map(str::to_string)
}

/// MIME type for an attachment: sniffed from `bytes` when possible, else
/// taken from the extension of `path_or_url`, else `fallback`.
pub fn guess_mime(bytes: Option<&[u8]>, path_or_url: Option<&str>, fallback: &str) -> String {
    bytes
        .and_then(sniff)
        .or_else(|| path_or_url.and_then(by_extension))
        .unwrap_or_else(|| fallback.to_string())
}
