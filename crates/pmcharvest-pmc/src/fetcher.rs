use async_trait::async_trait;

use crate::error::Result;

/// Source of raw JATS XML, keyed by archive identifier.
#[async_trait]
pub trait DocumentFetcher: Send + Sync {
    /// Fetch the XML text for one identifier. Implementations own their
    /// retry policy; an `Err` means the item should be skipped.
    async fn fetch(&self, identifier: &str) -> Result<String>;
}
