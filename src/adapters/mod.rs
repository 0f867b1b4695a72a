// Adapters layer: concrete fragment sources (local directory, http origin).

pub mod fs;
pub mod http;

pub use fs::FileSource;
pub use http::HttpSource;

use crate::domain::ports::FragmentSource;
use crate::utils::error::Result;
use async_trait::async_trait;

/// 依基底位置選擇來源：http(s) URL 走 HTTP，其餘視為本機目錄
#[derive(Debug, Clone)]
pub enum AnySource {
    File(FileSource),
    Http(HttpSource),
}

impl AnySource {
    pub fn from_base(base: &str) -> Result<Self> {
        if base.starts_with("http://") || base.starts_with("https://") {
            Ok(AnySource::Http(HttpSource::new(base)?))
        } else {
            Ok(AnySource::File(FileSource::new(base)))
        }
    }
}

#[async_trait]
impl FragmentSource for AnySource {
    async fn fetch(&self, location: &str) -> Result<String> {
        match self {
            AnySource::File(source) => source.fetch(location).await,
            AnySource::Http(source) => source.fetch(location).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_base_picks_source_kind() {
        assert!(matches!(AnySource::from_base("./public").unwrap(), AnySource::File(_)));
        assert!(matches!(
            AnySource::from_base("https://example.com/site/").unwrap(),
            AnySource::Http(_)
        ));
        assert!(AnySource::from_base("http://").is_err());
    }
}
