//! Blocking client for the pokemontcg.io v2 API.

use crate::error::ProviderError;
use crate::provider::{ApiCard, ApiSet, CatalogProvider};
use serde::de::DeserializeOwned;
use serde::Deserialize;

pub const API_BASE: &str = "https://api.pokemontcg.io/v2";
const PAGE_SIZE: u32 = 250;

#[derive(Debug, Deserialize)]
struct ListResponse<T> {
    data: Vec<T>,
    #[serde(rename = "totalCount")]
    total_count: u32,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: Option<ErrorDetail>,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    message: Option<String>,
}

pub struct PokemonTcg {
    agent: ureq::Agent,
    base_url: String,
    api_key: Option<String>,
}

impl PokemonTcg {
    pub fn new(api_key: Option<String>) -> Self {
        Self {
            agent: ureq::AgentBuilder::new()
                .user_agent(concat!("packsim/", env!("CARGO_PKG_VERSION")))
                .build(),
            base_url: API_BASE.to_string(),
            api_key,
        }
    }

    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    /// Walks every page of a search. A 404 ends the walk with what was collected.
    fn search<T: DeserializeOwned>(
        &self,
        resource: &str,
        query: &str,
    ) -> Result<Vec<T>, ProviderError> {
        let url = format!("{}/{resource}", self.base_url);
        let mut out = Vec::new();
        let mut page = 1u32;
        loop {
            let params = [
                ("q", query.to_string()),
                ("page", page.to_string()),
                ("pageSize", PAGE_SIZE.to_string()),
            ];
            let Some(response) = self.fetch(&url, &params)? else {
                break;
            };
            let body: ListResponse<T> = response
                .into_json()
                .map_err(|err| ProviderError::Decode(err.to_string()))?;
            out.extend(body.data);
            if !has_next_page(page, body.total_count) {
                break;
            }
            page += 1;
        }
        Ok(out)
    }

    /// `Ok(None)` on 404.
    fn fetch(
        &self,
        url: &str,
        params: &[(&str, String)],
    ) -> Result<Option<ureq::Response>, ProviderError> {
        tracing::debug!(url, ?params, "catalog request");
        let mut request = self.agent.get(url).set("accept", "application/json");
        if let Some(key) = &self.api_key {
            request = request.set("X-Api-Key", key);
        }
        for (name, value) in params {
            request = request.query(name, value);
        }
        match request.call() {
            Ok(response) => Ok(Some(response)),
            Err(ureq::Error::Status(404, _)) => Ok(None),
            Err(ureq::Error::Status(status, response)) => {
                let body = response.into_string().unwrap_or_default();
                Err(status_error(status, &body))
            }
            Err(ureq::Error::Transport(err)) => Err(ProviderError::Transport(err.to_string())),
        }
    }
}

impl CatalogProvider for PokemonTcg {
    fn find_sets(&self, query: &str) -> Result<Vec<ApiSet>, ProviderError> {
        self.search("sets", query)
    }

    fn find_cards(&self, query: &str) -> Result<Vec<ApiCard>, ProviderError> {
        self.search("cards", query)
    }
}

fn has_next_page(page: u32, total_count: u32) -> bool {
    page.saturating_mul(PAGE_SIZE) < total_count
}

/// Error for a non-404 failure status.
fn status_error(status: u16, body: &str) -> ProviderError {
    match status {
        429 => ProviderError::RateLimited,
        _ => ProviderError::Remote(error_message(body)),
    }
}

fn error_message(body: &str) -> String {
    serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(|parsed| parsed.error)
        .and_then(|detail| detail.message)
        .unwrap_or_else(|| "Unknown error.".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_message_prefers_body() {
        let body = r#"{"error":{"code":400,"message":"Bad Request. Your query is invalid."}}"#;
        assert_eq!(error_message(body), "Bad Request. Your query is invalid.");
        assert_eq!(error_message("<html>oops</html>"), "Unknown error.");
        assert_eq!(error_message(r#"{"error":{"code":500}}"#), "Unknown error.");
    }

    #[test]
    fn paging_stops_once_total_is_covered() {
        assert!(!has_next_page(1, 0));
        assert!(!has_next_page(1, 250));
        assert!(has_next_page(1, 251));
        assert!(has_next_page(2, 501));
        assert!(!has_next_page(3, 501));
        assert!(!has_next_page(u32::MAX, u32::MAX));
    }

    #[test]
    fn statuses_map_to_distinct_errors() {
        assert!(matches!(status_error(429, ""), ProviderError::RateLimited));
        let body = r#"{"error":{"code":500,"message":"Internal Server Error"}}"#;
        assert!(matches!(
            status_error(500, body),
            ProviderError::Remote(ref message) if message == "Internal Server Error"
        ));
        assert!(matches!(
            status_error(403, "forbidden"),
            ProviderError::Remote(ref message) if message == "Unknown error."
        ));
    }

    #[test]
    fn list_response_reads_total_count() {
        let raw = r#"{"data":[{"id":"sv1","name":"Scarlet & Violet"}],
            "page":1,"pageSize":250,"count":1,"totalCount":1}"#;
        let parsed: ListResponse<ApiSet> = serde_json::from_str(raw).expect("parse");
        assert_eq!(parsed.total_count, 1);
        assert_eq!(parsed.data[0].id, "sv1");
    }

    #[test]
    fn base_url_drops_trailing_slash() {
        let client = PokemonTcg::new(None).with_base_url("http://localhost:9000/v2/");
        assert_eq!(client.base_url, "http://localhost:9000/v2");
    }
}
