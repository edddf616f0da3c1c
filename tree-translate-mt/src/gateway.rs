//! Translation gateway trait
//!
//! A gateway takes one newline-joined query and returns one translated line per
//! query line, in the same order. Chunking, pacing and mapping lines back to
//! strings happen in [`crate::batch`]; a gateway only performs a single call.
//!
//! # Example
//!
//! ```ignore
//! use tree_translate_mt::{ProxyGateway, TranslationGateway};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let gateway = ProxyGateway::from_env()?;
//!     let lines = gateway.translate_batch("Hello\nGoodbye", "en", "zh").await?;
//!     println!("{:?}", lines);
//!     Ok(())
//! }
//! ```

use crate::error::GatewayError;
use async_trait::async_trait;

/// A translation provider reachable with one request per chunk
#[async_trait]
pub trait TranslationGateway: Send + Sync {
    /// Translate the newline-separated lines of `query` from `from` to `to`.
    ///
    /// # Returns
    ///
    /// * `Ok(Vec<String>)` - One entry per translated line, in query order. Providers
    ///   may return fewer lines than were sent; callers must not assume equal length.
    /// * `Err(GatewayError)` - If the call failed or was rejected
    async fn translate_batch(
        &self,
        query: &str,
        from: &str,
        to: &str,
    ) -> Result<Vec<String>, GatewayError>;

    /// Name of this gateway, for logging
    fn provider_name(&self) -> &str;
}
