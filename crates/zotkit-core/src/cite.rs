//! Remote citation-formatting client
//!
//! Citation-style rendering is delegated entirely to the reference
//! manager's web API: given an item key and a style name it returns
//! pre-rendered HTML. This client is the whole interface; no formatting
//! happens locally.

use serde::Deserialize;

use crate::config::CitationConfig;
use crate::error::CitationError;

/// Rendered citation text for one item
#[derive(Clone, Debug)]
pub struct Citation {
    /// In-text citation fragment
    pub citation_html: String,
    /// Full bibliography entry
    pub bibliography_html: String,
}

#[derive(Debug, Deserialize)]
struct ItemResponse {
    #[serde(default)]
    citation: String,
    #[serde(default)]
    bib: String,
}

/// Client for the formatting API
pub struct CitationClient {
    base: String,
    library_id: String,
    api_key: Option<String>,
    client: reqwest::blocking::Client,
}

impl CitationClient {
    pub fn from_config(config: &CitationConfig) -> Result<Self, CitationError> {
        let library_id = config
            .library_id
            .clone()
            .ok_or(CitationError::MissingCredentials)?;
        Ok(Self {
            base: config.api_base.trim_end_matches('/').to_string(),
            library_id,
            api_key: config.api_key.clone(),
            client: reqwest::blocking::Client::new(),
        })
    }

    /// Fetch the rendered citation and bibliography entry for one item
    pub fn cite(&self, key: &str, style: &str, locale: &str) -> Result<Citation, CitationError> {
        let url = format!("{}/users/{}/items/{}", self.base, self.library_id, key);
        let mut request = self.client.get(&url).query(&[
            ("format", "json"),
            ("include", "citation,bib"),
            ("style", style),
            ("locale", locale),
        ]);
        if let Some(api_key) = &self.api_key {
            request = request.header("Zotero-API-Key", api_key);
        }
        let response = request.send()?;
        let status = response.status();
        if !status.is_success() {
            return Err(CitationError::Status(status.as_u16()));
        }
        let body: ItemResponse = response.json()?;
        Ok(Citation {
            citation_html: body.citation,
            bibliography_html: body.bib,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_library_id_is_rejected() {
        let config = CitationConfig::default();
        assert!(matches!(
            CitationClient::from_config(&config),
            Err(CitationError::MissingCredentials)
        ));
    }

    #[test]
    fn test_base_url_trailing_slash_is_normalized() {
        let config = CitationConfig {
            api_base: "https://api.zotero.org/".into(),
            library_id: Some("12345".into()),
            ..Default::default()
        };
        let client = CitationClient::from_config(&config).unwrap();
        assert_eq!(client.base, "https://api.zotero.org");
    }
}
