// SPDX-License-Identifier: AGPL-3.0-only
// Copyright (C) 2024 Jonathan Lee
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License version 3
// as published by the Free Software Foundation.
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.
// See the GNU Affero General Public License for more details.
// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see https://www.gnu.org/licenses/.

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

use crate::error::{FetchError, FetchResult};
use crate::payload::{IndicatorId, IndicatorPage, IndicatorPayload};

#[async_trait]
pub trait IndicatorSource: Send + Sync {
    async fn list_indicators(&self, limit: usize, offset: usize) -> FetchResult<IndicatorPage>;

    async fn fetch_indicator(&self, id: &IndicatorId) -> FetchResult<IndicatorPayload>;

    /// `query` is already encoded, see [`crate::query::encode`].
    async fn fetch_filtered(&self, id: &IndicatorId, query: &str)
        -> FetchResult<IndicatorPayload>;
}

#[async_trait]
pub trait GeographySource: Send + Sync {
    async fn fetch_geography(&self, code: &str) -> FetchResult<Value>;
}

/// Single-attempt HTTP client for the indicator and map endpoints.
#[derive(Debug, Clone)]
pub struct HttpBackend {
    client: Client,
    base_url: Url,
}

impl HttpBackend {
    pub fn new(base_url: &str, timeout: Option<Duration>) -> FetchResult<Self> {
        let mut parsed = Url::parse(base_url).map_err(|e| FetchError::InvalidUrl {
            url: base_url.to_string(),
            reason: e.to_string(),
        })?;
        if parsed.cannot_be_a_base() {
            return Err(FetchError::InvalidUrl {
                url: base_url.to_string(),
                reason: "URL cannot be used as a base".to_string(),
            });
        }
        if !parsed.path().ends_with('/') {
            let path = format!("{}/", parsed.path());
            parsed.set_path(&path);
        }

        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().map_err(|source| FetchError::Transport {
            url: base_url.to_string(),
            source,
        })?;

        Ok(Self {
            client,
            base_url: parsed,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, segments: &[&str]) -> FetchResult<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| FetchError::InvalidUrl {
                url: self.base_url.to_string(),
                reason: "URL cannot be used as a base".to_string(),
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> FetchResult<T> {
        debug!(url = %url, "Fetching from indicator backend");
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|source| FetchError::Transport {
                url: url.to_string(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(url = %url, status = status.as_u16(), "Backend returned an error status");
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
                body,
            });
        }

        response.json::<T>().await.map_err(|source| FetchError::Decode {
            url: url.to_string(),
            source,
        })
    }
}

#[async_trait]
impl IndicatorSource for HttpBackend {
    async fn list_indicators(&self, limit: usize, offset: usize) -> FetchResult<IndicatorPage> {
        let mut url = self.endpoint(&["indicators"])?;
        url.query_pairs_mut()
            .append_pair("limit", &limit.to_string())
            .append_pair("offset", &offset.to_string());
        self.get_json(url).await
    }

    async fn fetch_indicator(&self, id: &IndicatorId) -> FetchResult<IndicatorPayload> {
        let url = self.endpoint(&["indicators", &id.to_string()])?;
        self.get_json(url).await
    }

    async fn fetch_filtered(
        &self,
        id: &IndicatorId,
        query: &str,
    ) -> FetchResult<IndicatorPayload> {
        let mut url = self.endpoint(&["indicators", &id.to_string(), "filter"])?;
        if !query.is_empty() {
            url.set_query(Some(query));
        }
        self.get_json(url).await
    }
}

#[async_trait]
impl GeographySource for HttpBackend {
    async fn fetch_geography(&self, code: &str) -> FetchResult<Value> {
        let url = self.endpoint(&["maps", code])?;
        self.get_json(url).await
    }
}
