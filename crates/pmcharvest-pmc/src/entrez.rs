//! NCBI E-utilities `efetch` client for PubMed Central full-text records.
//!
//! Endpoint used:
//!   efetch: {base_url}/efetch.fcgi?db=pmc&id=<PMCID>&rettype=xml&retmode=text

use async_trait::async_trait;
use pmcharvest_core::{EntrezConfig, MetadataRecord, parse_record};
use tracing::{debug, instrument};

use crate::error::{PmcError, Result};
use crate::fetcher::DocumentFetcher;
use crate::http::RateLimitedClient;

pub struct EntrezClient {
    client: RateLimitedClient,
    base_url: String,
    tool: String,
    email: Option<String>,
    api_key: Option<String>,
}

impl EntrezClient {
    pub fn new(config: &EntrezConfig) -> Result<Self> {
        let user_agent = format!("{}/{}", config.tool, env!("CARGO_PKG_VERSION"));
        let client = RateLimitedClient::new(
            config.request_interval(),
            config.max_attempts,
            config.retry_delay(),
            config.timeout(),
            &user_agent,
        )?;
        let non_empty = |value: &str| Some(value.trim().to_string()).filter(|v| !v.is_empty());

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            tool: config.tool.clone(),
            email: non_empty(&config.email),
            api_key: non_empty(&config.api_key),
        })
    }

    fn efetch_params(&self, id: &str) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("db", "pmc".to_string()),
            ("id", id.to_string()),
            ("rettype", "xml".to_string()),
            ("retmode", "text".to_string()),
            ("tool", self.tool.clone()),
        ];
        if let Some(email) = &self.email {
            params.push(("email", email.clone()));
        }
        if let Some(key) = &self.api_key {
            params.push(("api_key", key.clone()));
        }
        params
    }

    /// Fetch the JATS XML for one PMC identifier.
    #[instrument(skip(self))]
    pub async fn efetch_pmc(&self, id: &str) -> Result<String> {
        let url = format!("{}/efetch.fcgi", self.base_url);
        let xml = self.client.get_with_query(&url, &self.efetch_params(id)).await?;
        if xml.trim().is_empty() {
            return Err(PmcError::EmptyResponse(id.to_string()));
        }
        debug!(bytes = xml.len(), "efetch returned document");
        Ok(xml)
    }

    /// Fetch and extract a single record.
    pub async fn fetch_record(&self, id: &str) -> Result<MetadataRecord> {
        let xml = self.efetch_pmc(id).await?;
        Ok(parse_record(&xml)?)
    }
}

#[async_trait]
impl DocumentFetcher for EntrezClient {
    async fn fetch(&self, identifier: &str) -> Result<String> {
        self.efetch_pmc(identifier).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::{Matcher, Server};

    fn config(base_url: &str) -> EntrezConfig {
        EntrezConfig {
            base_url: format!("{base_url}/"),
            email: "curator@example.org".to_string(),
            request_interval_ms: 0,
            retry_delay_ms: 0,
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_fetch_record_sends_efetch_params() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/efetch.fcgi")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("db".to_string(), "pmc".to_string()),
                Matcher::UrlEncoded("id".to_string(), "PMC7096724".to_string()),
                Matcher::UrlEncoded("rettype".to_string(), "xml".to_string()),
                Matcher::UrlEncoded("retmode".to_string(), "text".to_string()),
                Matcher::UrlEncoded("tool".to_string(), "pmcharvest".to_string()),
                Matcher::UrlEncoded("email".to_string(), "curator@example.org".to_string()),
            ]))
            .with_status(200)
            .with_header("content-type", "text/xml")
            .with_body(
                r#"<?xml version="1.0" ?>
<pmc-articleset><article><front><article-meta>
  <article-id pub-id-type="pmid">32109013</article-id>
  <title-group><article-title>Clinical Characteristics</article-title></title-group>
</article-meta></front></article></pmc-articleset>"#,
            )
            .expect(1)
            .create_async()
            .await;

        let client = EntrezClient::new(&config(&server.url())).unwrap();
        let record = client.fetch_record("PMC7096724").await.unwrap();

        assert_eq!(record.pmid.as_deref(), Some("32109013"));
        assert_eq!(record.title.as_deref(), Some("Clinical Characteristics"));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_blank_body_is_empty_response() {
        let mut server = Server::new_async().await;
        let _m = server
            .mock("GET", "/efetch.fcgi")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body("  \n")
            .create_async()
            .await;

        let client = EntrezClient::new(&config(&server.url())).unwrap();
        let err = client.fetch("PMC1").await.unwrap_err();
        assert!(matches!(err, PmcError::EmptyResponse(ref id) if id == "PMC1"));
    }

    #[tokio::test]
    async fn test_malformed_body_is_core_error() {
        let mut server = Server::new_async().await;
        let _m = server
            .mock("GET", "/efetch.fcgi")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body("<article><title>")
            .create_async()
            .await;

        let client = EntrezClient::new(&config(&server.url())).unwrap();
        let err = client.fetch_record("PMC1").await.unwrap_err();
        assert!(matches!(err, PmcError::Core(_)));
    }
}
