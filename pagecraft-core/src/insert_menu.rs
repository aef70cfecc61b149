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

//! Insert menu: turns a template pick, typed text or a generation prompt
//! into a block payload. It never touches the page; the blocks container
//! turns the payload into a block.

use crate::error::{EditorError, EditorResult};
use crate::models::block::BlockType;
use crate::models::content::BlockContent;
use crate::registry::BlockRegistry;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum GenerationError {
    #[error("the generator returned no content")]
    Empty,

    #[error("content generation is not configured")]
    NotConfigured,

    #[error(transparent)]
    Backend(#[from] anyhow::Error),
}

/// Produces block content from a natural-language prompt
#[async_trait]
pub trait ContentGenerator: Send + Sync {
    /// `Ok(None)` means the generator had nothing to offer
    async fn generate(
        &self,
        prompt: &str,
        block_type: BlockType,
    ) -> Result<Option<Value>, GenerationError>;
}

/// How free-form text is interpreted
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FreeformFormat {
    /// JSON when the trimmed text starts with `{` or `[`, plain text otherwise
    #[default]
    Auto,
    Json,
    PlainText,
}

#[derive(Debug, Clone, PartialEq)]
pub enum BlockSource {
    Template(BlockType),
    Freeform {
        block_type: BlockType,
        text: String,
        format: FreeformFormat,
    },
    Generated {
        block_type: BlockType,
        prompt: String,
    },
}

/// What the menu hands to the container
#[derive(Debug, Clone, PartialEq)]
pub struct BlockPayload {
    pub block_type: BlockType,
    pub content: BlockContent,
}

/// A generation call the host is expected to run. The ticket must be
/// handed back to [`InsertMenu::finish_generation`] with the result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationRequest {
    pub ticket: u64,
    pub block_type: BlockType,
    pub prompt: String,
}

/// Interpret free-form text according to `format`
pub fn parse_freeform(text: &str, format: FreeformFormat) -> EditorResult<Value> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(EditorError::Validation("Content cannot be empty".to_string()));
    }

    let as_json = match format {
        FreeformFormat::Auto => trimmed.starts_with('{') || trimmed.starts_with('['),
        FreeformFormat::Json => true,
        FreeformFormat::PlainText => false,
    };

    if as_json {
        Ok(serde_json::from_str(trimmed)?)
    } else {
        Ok(Value::String(text.to_string()))
    }
}

pub struct InsertMenu {
    registry: Arc<BlockRegistry>,
    open: bool,
    error: Option<String>,
    generating: Option<GenerationRequest>,
    next_ticket: u64,
}

impl InsertMenu {
    pub fn new(registry: Arc<BlockRegistry>) -> Self {
        Self {
            registry,
            open: false,
            error: None,
            generating: None,
            next_ticket: 1,
        }
    }

    pub fn registry(&self) -> &BlockRegistry {
        &self.registry
    }

    pub fn open(&mut self) {
        self.open = true;
        self.error = None;
    }

    /// Close the dialog, dropping any error and any pending generation result
    pub fn close(&mut self) {
        self.open = false;
        self.error = None;
        self.generating = None;
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn is_generating(&self) -> bool {
        self.generating.is_some()
    }

    /// Produce a payload from any source, running the generator when needed.
    /// On success the dialog closes; on failure it stays open with the error.
    pub async fn submit(
        &mut self,
        source: BlockSource,
        generator: Option<&dyn ContentGenerator>,
    ) -> EditorResult<BlockPayload> {
        match source {
            BlockSource::Generated { block_type, prompt } => {
                let Some(generator) = generator else {
                    return self.fail(GenerationError::NotConfigured.into());
                };
                let request = self.begin_generation(block_type, &prompt)?;
                let outcome = generator.generate(&request.prompt, request.block_type).await;
                self.finish_generation(request.ticket, outcome)
            }
            other => {
                let result = self.produce_local(other);
                self.settle(result)
            }
        }
    }

    /// Validate a prompt and mark the menu busy. The caller runs the
    /// generator and reports back through [`InsertMenu::finish_generation`].
    pub fn begin_generation(
        &mut self,
        block_type: BlockType,
        prompt: &str,
    ) -> EditorResult<GenerationRequest> {
        self.ensure_open()?;
        if self.generating.is_some() {
            return Err(EditorError::Busy("Content generation"));
        }

        let prompt = prompt.trim();
        if prompt.is_empty() {
            return self.fail(EditorError::Validation(
                "Prompt cannot be empty".to_string(),
            ));
        }

        let request = GenerationRequest {
            ticket: self.next_ticket,
            block_type,
            prompt: prompt.to_string(),
        };
        tracing::debug!(block_type = %block_type, "Requesting generated block content");
        self.next_ticket += 1;
        self.generating = Some(request.clone());
        self.error = None;
        Ok(request)
    }

    /// Deliver the result for `ticket`. Results for a request that was
    /// dropped by [`InsertMenu::close`] are discarded without touching the
    /// dialog or whatever request is pending now.
    pub fn finish_generation(
        &mut self,
        ticket: u64,
        outcome: Result<Option<Value>, GenerationError>,
    ) -> EditorResult<BlockPayload> {
        let pending = self.generating.as_ref().map(|request| request.ticket);
        if pending != Some(ticket) {
            tracing::debug!(ticket, "Dropping stale generation result");
            return Err(EditorError::InvalidState(
                "The generation request is no longer pending".to_string(),
            ));
        }
        let Some(request) = self.generating.take() else {
            return Err(EditorError::InvalidState(
                "No content generation is pending".to_string(),
            ));
        };

        let result = match outcome {
            Ok(Some(value)) => BlockContent::try_from_value(request.block_type, value)
                .map(|content| BlockPayload {
                    block_type: request.block_type,
                    content,
                })
                .map_err(EditorError::from),
            Ok(None) => Err(GenerationError::Empty.into()),
            Err(e) => Err(e.into()),
        };
        self.settle(result)
    }

    fn produce_local(&self, source: BlockSource) -> EditorResult<BlockPayload> {
        self.ensure_open()?;
        match source {
            BlockSource::Template(block_type) => Ok(BlockPayload {
                block_type,
                content: self.registry.template(block_type),
            }),
            BlockSource::Freeform {
                block_type,
                text,
                format,
            } => {
                let value = parse_freeform(&text, format)?;
                let content = BlockContent::try_from_value(block_type, value)?;
                Ok(BlockPayload {
                    block_type,
                    content,
                })
            }
            BlockSource::Generated { .. } => Err(EditorError::InvalidState(
                "Generated content needs a generator".to_string(),
            )),
        }
    }

    fn ensure_open(&self) -> EditorResult<()> {
        if self.open {
            Ok(())
        } else {
            Err(EditorError::InvalidState(
                "The insert dialog is not open".to_string(),
            ))
        }
    }

    fn settle(&mut self, result: EditorResult<BlockPayload>) -> EditorResult<BlockPayload> {
        match result {
            Ok(payload) => {
                self.open = false;
                self.error = None;
                Ok(payload)
            }
            Err(e) => self.fail(e),
        }
    }

    fn fail<T>(&mut self, error: EditorError) -> EditorResult<T> {
        tracing::warn!(error = %error, "Block insert rejected");
        self.error = Some(error.to_string());
        Err(error)
    }
}
