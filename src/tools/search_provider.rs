//! Search backends for the web search tool

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use thiserror::Error;

pub const DEFAULT_TAVILY_ENDPOINT: &str = "https://api.tavily.com/search";

/// One search hit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    pub title: String,
    pub url: String,
    pub snippet: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchResponse {
    pub results: Vec<SearchHit>,
}

#[derive(Debug, Clone, Error)]
pub enum SearchError {
    #[error("search provider not configured: {0}")]
    NotConfigured(String),
    #[error("search request failed: {0}")]
    Request(String),
    #[error("search provider returned HTTP {status}")]
    Http { status: u16 },
    #[error("could not decode search response: {0}")]
    Decode(String),
}

/// A web search backend
#[async_trait]
pub trait SearchProvider: Send + Sync {
    fn name(&self) -> &'static str;

    async fn search(&self, query: &str, max_results: u32) -> Result<SearchResponse, SearchError>;
}

/// Tavily search API
#[derive(Debug, Clone)]
pub struct TavilySearchProvider {
    client: reqwest::Client,
    api_key: String,
    endpoint: String,
    topic: String,
    timeout: Duration,
}

impl TavilySearchProvider {
    pub fn new(
        client: reqwest::Client,
        api_key: Option<String>,
        endpoint: Option<String>,
        topic: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, SearchError> {
        let api_key = api_key
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| SearchError::NotConfigured("missing TAVILY_API_KEY".to_string()))?;
        Ok(Self {
            client,
            api_key,
            endpoint: endpoint.unwrap_or_else(|| DEFAULT_TAVILY_ENDPOINT.to_string()),
            topic: topic.into(),
            timeout,
        })
    }

    fn request_body(&self, query: &str, max_results: u32) -> serde_json::Value {
        serde_json::json!({
            "query": query,
            "max_results": max_results,
            "topic": self.topic,
            "include_answer": false,
            "include_raw_content": false,
            "search_depth": "basic",
        })
    }
}

#[derive(Debug, Deserialize)]
struct TavilySearchResponse {
    #[serde(default)]
    results: Vec<TavilyResult>,
}

#[derive(Debug, Deserialize)]
struct TavilyResult {
    url: String,
    title: Option<String>,
    content: Option<String>,
}

fn parse_tavily_response(body: &str) -> Result<SearchResponse, SearchError> {
    let parsed: TavilySearchResponse =
        serde_json::from_str(body).map_err(|e| SearchError::Decode(e.to_string()))?;
    Ok(SearchResponse {
        results: parsed
            .results
            .into_iter()
            .map(|r| SearchHit {
                title: r.title.unwrap_or_default(),
                url: r.url,
                snippet: r.content.unwrap_or_default(),
            })
            .collect(),
    })
}

#[async_trait]
impl SearchProvider for TavilySearchProvider {
    fn name(&self) -> &'static str {
        "tavily"
    }

    async fn search(&self, query: &str, max_results: u32) -> Result<SearchResponse, SearchError> {
        let t0 = Instant::now();

        let resp = self
            .client
            .post(&self.endpoint)
            .header(
                reqwest::header::AUTHORIZATION,
                format!("Bearer {}", self.api_key),
            )
            .json(&self.request_body(query, max_results))
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| SearchError::Request(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(SearchError::Http {
                status: status.as_u16(),
            });
        }

        let body = resp
            .text()
            .await
            .map_err(|e| SearchError::Request(e.to_string()))?;
        let parsed = parse_tavily_response(&body)?;

        tracing::debug!(
            provider = "tavily",
            results = parsed.results.len(),
            duration_ms = %t0.elapsed().as_millis(),
            "Search completed"
        );
        Ok(parsed)
    }
}
