use crate::domain::ports::FragmentSource;
use crate::utils::error::{Result, SiteError};
use async_trait::async_trait;
use reqwest::Client;
use url::Url;

#[derive(Debug, Clone)]
pub struct HttpSource {
    base_url: Url,
    client: Client,
}

impl HttpSource {
    pub fn new(base: &str) -> Result<Self> {
        crate::utils::validation::validate_url("site.base", base)?;
        // 確保以 / 結尾，join 才會接在目錄之下
        let normalized = if base.ends_with('/') {
            base.to_string()
        } else {
            format!("{}/", base)
        };
        let base_url = Url::parse(&normalized).map_err(|e| SiteError::InvalidConfigValueError {
            field: "site.base".to_string(),
            value: base.to_string(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            base_url,
            client: Client::new(),
        })
    }

    /// Resolves `location` under the base URL. A leading `/` is relative to
    /// the base too, matching `FileSource`.
    pub fn resolve(&self, location: &str) -> Result<Url> {
        self.base_url
            .join(location.trim_start_matches('/'))
            .map_err(|e| SiteError::InvalidConfigValueError {
                field: "components".to_string(),
                value: location.to_string(),
                reason: e.to_string(),
            })
    }
}

#[async_trait]
impl FragmentSource for HttpSource {
    async fn fetch(&self, location: &str) -> Result<String> {
        let url = self.resolve(location)?;
        tracing::debug!("Making fragment request to: {}", url);
        let response = self.client.get(url.clone()).send().await?;

        tracing::debug!("Fragment response status: {}", response.status());
        if !response.status().is_success() {
            return Err(SiteError::HttpStatusError {
                url: url.to_string(),
                status: response.status().as_u16(),
            });
        }

        Ok(response.text().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;

    #[test]
    fn test_resolve_against_base_directory() {
        let source = HttpSource::new("https://example.com/site").unwrap();
        assert_eq!(
            source.resolve("components/hero.html").unwrap().as_str(),
            "https://example.com/site/components/hero.html"
        );
        assert_eq!(
            source.resolve("/components/hero.html").unwrap().as_str(),
            "https://example.com/site/components/hero.html"
        );
        assert_eq!(
            source.resolve("https://cdn.example.com/x.html").unwrap().as_str(),
            "https://cdn.example.com/x.html"
        );
    }

    #[tokio::test]
    async fn test_fetch_returns_body() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET).path("/components/hero.html");
            then.status(200).body("<section>{{title}}</section>");
        });

        let source = HttpSource::new(&server.base_url()).unwrap();
        let body = source.fetch("components/hero.html").await.unwrap();

        mock.assert();
        assert_eq!(body, "<section>{{title}}</section>");
    }

    #[tokio::test]
    async fn test_fetch_non_success_status_is_error() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/components/missing.html");
            then.status(404).body("not found");
        });

        let source = HttpSource::new(&server.base_url()).unwrap();
        let err = source.fetch("components/missing.html").await.unwrap_err();
        assert!(matches!(err, SiteError::HttpStatusError { status: 404, .. }));
    }
}
