use rb_core::{Error, Result};

pub mod reddit;

pub use reddit::{RedditConfig, RedditFetcher};

/// Longest community name Reddit accepts
const MAX_COMMUNITY_LEN: usize = 21;

/// Validates a community name and strips an optional `r/` or `/r/` prefix.
///
/// Invalid names are reported as [`Error::SourceUnavailable`] so callers see
/// the same failure kind as for a community the platform does not know.
pub fn normalize_community(community: &str) -> Result<&str> {
    let trimmed = community.trim();
    let name = trimmed
        .strip_prefix("/r/")
        .or_else(|| trimmed.strip_prefix("r/"))
        .unwrap_or(trimmed);

    if name.is_empty() {
        return Err(Error::SourceUnavailable("Community name is empty".to_string()));
    }
    if name.len() > MAX_COMMUNITY_LEN
        || !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
    {
        return Err(Error::SourceUnavailable(format!(
            "Invalid community name: {}",
            community
        )));
    }
    Ok(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_community() {
        assert_eq!(normalize_community("technology").unwrap(), "technology");
        assert_eq!(normalize_community(" r/rust ").unwrap(), "rust");
        assert_eq!(normalize_community("/r/Ask_Science").unwrap(), "Ask_Science");
    }

    #[test]
    fn test_invalid_community_names() {
        for name in ["", "   ", "r/", "no spaces", "../etc", "emoji🦀", "abcdefghijklmnopqrstuv"] {
            let err = normalize_community(name).unwrap_err();
            assert!(matches!(err, Error::SourceUnavailable(_)), "{:?} should be rejected", name);
        }
    }
}
