//! Provider capability trait

use std::io::Write;

use async_trait::async_trait;

use crate::error::SgptError;
use crate::types::{Request, Response};

/// Contract every vendor adapter implements.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Name used on the command line (`openai`, `anthropic`, `google`).
    fn provider_name(&self) -> &'static str;

    /// Send `request` and wait for the full reply.
    async fn complete(&self, request: &Request) -> Result<Response, SgptError>;

    /// Send `request` with incremental delivery, writing each text fragment
    /// to `out` as it arrives and a newline once the stream ends.
    ///
    /// Malformed events in the middle of the stream are logged and skipped;
    /// only handshake and transport failures are returned.
    async fn stream_complete(
        &self,
        request: &Request,
        out: &mut (dyn Write + Send),
    ) -> Result<(), SgptError>;
}
