//! Authenticated JSON requests against provider REST APIs

use chrono::{DateTime, Utc};
use reqwest::header::{HeaderMap, ACCEPT, AUTHORIZATION, USER_AGENT};
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use std::time::Duration;
use url::Url;

use super::provider_interface::ProviderError;

/// Default page size for listings
pub const PAGE_SIZE: usize = 100;

/// Upper bound on pages fetched for one listing
const MAX_PAGES: usize = 500;

/// How the token is presented to the API
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthScheme {
    /// `Authorization: Bearer <token>`
    Bearer,
    /// `Authorization: token <token>`
    Token,
    /// `PRIVATE-TOKEN: <token>`
    PrivateToken,
}

/// Thin reqwest wrapper shared by the provider adapters
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    token: Option<String>,
    auth: AuthScheme,
    page_size_param: &'static str,
    page_size: usize,
}

impl ApiClient {
    /// `base_url` is the API root, e.g. `https://api.github.com` or `https://host/api/v4`
    pub fn new(
        base_url: &str,
        token: Option<String>,
        auth: AuthScheme,
        timeout: Duration,
    ) -> Result<Self, ProviderError> {
        let base_url = base_url.trim_end_matches('/').to_string();
        Url::parse(&base_url)?;

        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ProviderError::config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url,
            token: token.filter(|t| !t.is_empty()),
            auth,
            page_size_param: "per_page",
            page_size: PAGE_SIZE,
        })
    }

    /// Override the page size query parameter and its value
    pub fn with_page_size(mut self, param: &'static str, size: usize) -> Self {
        self.page_size_param = param;
        self.page_size = size.max(1);
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn has_token(&self) -> bool {
        self.token.is_some()
    }

    fn url(&self, path: &str, query: &[(&str, String)]) -> Result<Url, ProviderError> {
        let mut url = Url::parse(&format!("{}{}", self.base_url, path))?;
        if !query.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in query {
                pairs.append_pair(key, value);
            }
        }
        Ok(url)
    }

    async fn send(&self, url: Url) -> Result<reqwest::Response, ProviderError> {
        tracing::debug!("GET {}", url);

        let mut request = self
            .client
            .get(url.clone())
            .header(ACCEPT, "application/json")
            .header(USER_AGENT, concat!("synclone/", env!("CARGO_PKG_VERSION")));

        if let Some(token) = &self.token {
            request = match self.auth {
                AuthScheme::Bearer => request.header(AUTHORIZATION, format!("Bearer {}", token)),
                AuthScheme::Token => request.header(AUTHORIZATION, format!("token {}", token)),
                AuthScheme::PrivateToken => request.header("PRIVATE-TOKEN", token.as_str()),
            };
        }

        let response = request.send().await?;
        let status = response.status();

        if status.is_success() {
            return Ok(response);
        }

        let headers = response.headers().clone();
        let body = response.text().await.unwrap_or_default();
        Err(classify_failure(status, &headers, url.path(), body))
    }

    /// GET `path` and decode the JSON body
    pub async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, ProviderError> {
        let url = self.url(path, query)?;
        let response = self.send(url).await?;
        response
            .json::<T>()
            .await
            .map_err(|e| ProviderError::api(200, format!("Invalid response body: {}", e)))
    }

    /// GET `path` page by page until a short page comes back
    pub async fn get_paginated<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<Vec<T>, ProviderError> {
        let mut items = Vec::new();

        for page in 1..=MAX_PAGES {
            let mut page_query = query.to_vec();
            page_query.push((self.page_size_param, self.page_size.to_string()));
            page_query.push(("page", page.to_string()));

            let batch: Vec<T> = self.get_json(path, &page_query).await?;
            let count = batch.len();
            items.extend(batch);

            if count < self.page_size {
                break;
            }
        }

        Ok(items)
    }

    /// Whether `path` answers with any non-5xx status
    pub async fn is_reachable(&self, path: &str) -> bool {
        let Ok(url) = self.url(path, &[]) else {
            return false;
        };

        match self.client.get(url).send().await {
            Ok(response) => !response.status().is_server_error(),
            Err(e) => {
                tracing::debug!("Health check failed: {}", e);
                false
            }
        }
    }
}

fn classify_failure(
    status: StatusCode,
    headers: &HeaderMap,
    resource: &str,
    body: String,
) -> ProviderError {
    let rate_limit_exhausted = header_value(headers, "x-ratelimit-remaining")
        .is_some_and(|remaining| remaining == "0");

    match status {
        StatusCode::TOO_MANY_REQUESTS => ProviderError::RateLimited {
            reset_at: rate_limit_reset(headers),
        },
        StatusCode::FORBIDDEN if rate_limit_exhausted => ProviderError::RateLimited {
            reset_at: rate_limit_reset(headers),
        },
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            ProviderError::auth(format!("{} ({})", resource, status))
        }
        StatusCode::NOT_FOUND => ProviderError::not_found(resource.to_string()),
        _ => ProviderError::api(status.as_u16(), body),
    }
}

fn header_value<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}

fn rate_limit_reset(headers: &HeaderMap) -> Option<DateTime<Utc>> {
    let epoch = header_value(headers, "x-ratelimit-reset")?.parse::<i64>().ok()?;
    DateTime::from_timestamp(epoch, 0)
}
