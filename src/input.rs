//! Splitting input text into request chunks.

use crate::error::SgptError;

/// Reject a run with nothing to send.
///
/// Only a zero-length input counts as missing. Input made of blank lines is
/// accepted and simply produces no chunks.
pub fn ensure_input(input: &str, has_media: bool) -> Result<(), SgptError> {
    if input.is_empty() && !has_media {
        return Err(SgptError::config("no input provided"));
    }
    Ok(())
}

/// Split `input` on `separator` and trim each piece.
///
/// Empty pieces are dropped. When an attachment is configured and every
/// piece is empty, a single empty chunk is returned so the attachment is
/// still sent on its own. An empty separator yields the whole input as one
/// chunk.
pub fn split_chunks(input: &str, separator: &str, has_media: bool) -> Vec<String> {
    let pieces: Vec<&str> = if separator.is_empty() {
        vec![input]
    } else {
        input.split(separator).collect()
    };

    let chunks: Vec<String> = pieces
        .into_iter()
        .map(str::trim)
        .filter(|chunk| !chunk.is_empty())
        .map(str::to_string)
        .collect();

    if chunks.is_empty() && has_media {
        return vec![String::new()];
    }
    chunks
}
