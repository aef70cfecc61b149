// Pagecraft - A block-based page editor built with Rust
// Copyright (C) 2025 Pagecraft Project Contributors
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as
// published by the Free Software Foundation, either version 3 of the
// License, or (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.

use anyhow::Context;
use async_trait::async_trait;
use pagecraft_core::insert_menu::{ContentGenerator, GenerationError};
use pagecraft_core::models::BlockType;
use reqwest::{Client, Url};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest<'a> {
    prompt: &'a str,
    block_type: BlockType,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    content: Option<Value>,
}

/// Content generator reached over HTTP.
///
/// POSTs `{"prompt", "blockType"}` and expects `{"content": ...}` back;
/// a `null` or missing `content` means nothing was generated.
#[derive(Debug, Clone)]
pub struct HttpContentGenerator {
    client: Client,
    endpoint: Url,
}

impl HttpContentGenerator {
    pub fn new(endpoint: Url, timeout: Duration) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self { client, endpoint })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

#[async_trait]
impl ContentGenerator for HttpContentGenerator {
    async fn generate(
        &self,
        prompt: &str,
        block_type: BlockType,
    ) -> Result<Option<Value>, GenerationError> {
        tracing::debug!(endpoint = %self.endpoint, block_type = %block_type, "Requesting content");

        let response = self
            .client
            .post(self.endpoint.clone())
            .json(&GenerateRequest { prompt, block_type })
            .send()
            .await
            .context("Failed to reach content generator")?;

        let status = response.status();
        if !status.is_success() {
            return Err(GenerationError::Backend(anyhow::anyhow!(
                "Content generator answered with status {}",
                status
            )));
        }

        let body: GenerateResponse = response
            .json()
            .await
            .context("Content generator sent an unreadable response")?;

        Ok(body.content.filter(|content| !content.is_null()))
    }
}
