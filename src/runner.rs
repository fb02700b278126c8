//! Sequential chunk processing.
//!
//! Chunks are sent one at a time, in order. The first error stops the run;
//! output already written for earlier chunks is kept.

use std::io::Write;

use crate::config::Config;
use crate::error::SgptError;
use crate::traits::LlmProvider;
use crate::types::Request;

/// Request for one chunk. Streaming follows the model's capability.
pub fn build_request(config: &Config, chunk: &str) -> Request {
    Request::new(config.model_id(), chunk)
        .with_instruction(config.instruction.clone())
        .with_temperature(config.temperature)
        .with_image(config.image_path.clone())
        .with_audio(config.audio_path.clone())
        .with_stream(config.model_capabilities.streaming)
}

/// Send each chunk through `provider`, writing results to `out`.
///
/// Returns the number of chunks processed.
pub async fn run(
    provider: &dyn LlmProvider,
    config: &Config,
    chunks: &[String],
    out: &mut (dyn Write + Send),
) -> Result<usize, SgptError> {
    for (index, chunk) in chunks.iter().enumerate() {
        let request = build_request(config, chunk);
        tracing::debug!(
            provider = provider.provider_name(),
            model = %request.model,
            chunk = index,
            stream = request.stream,
            "processing chunk"
        );

        if request.stream {
            provider.stream_complete(&request, out).await?;
        } else {
            let response = provider.complete(&request).await?;
            tracing::debug!(bytes = response.raw.len(), "received response");
            writeln!(out, "{}", response.text)?;
            out.flush()?;
        }
    }
    Ok(chunks.len())
}
