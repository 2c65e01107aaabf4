use async_trait::async_trait;
use crate::types::SourceItemDraft;
use crate::Result;

#[async_trait]
pub trait SourceFetcher: Send + Sync {
    /// Name of the platform, used in logs
    fn platform(&self) -> &str;

    /// The name under which items fetched for `community` are recorded.
    ///
    /// Names the platform would reject fail with
    /// [`crate::Error::SourceUnavailable`]. The default only trims whitespace.
    fn canonical_community(&self, community: &str) -> Result<String> {
        Ok(community.trim().to_string())
    }

    /// Fetch up to `count` items from `community`, ordered by the platform's
    /// current popularity ranking.
    ///
    /// Implementations clamp `count` into the supported batch range and report
    /// every failure as [`crate::Error::SourceUnavailable`].
    async fn fetch(&self, community: &str, count: u32) -> Result<Vec<SourceItemDraft>>;
}
