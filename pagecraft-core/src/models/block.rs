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

use crate::models::content::BlockContent;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Errors raised while building model values from untrusted input
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ModelError {
    #[error("Unknown block type '{0}'")]
    UnknownBlockType(String),

    #[error("Unknown block layout '{0}'")]
    UnknownLayout(String),

    #[error("Invalid block size '{0}': expected a percentage such as 50% or a pixel length such as 320px")]
    InvalidSize(String),

    #[error("{block_type} block content has the wrong shape: {reason}")]
    InvalidContent { block_type: BlockType, reason: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BlockType {
    Text,
    Hero,
    Cta,
    Features,
    Testimonials,
    Faq,
    Pricing,
    Contact,
    Custom,
}

impl BlockType {
    pub const ALL: [BlockType; 9] = [
        BlockType::Text,
        BlockType::Hero,
        BlockType::Features,
        BlockType::Cta,
        BlockType::Testimonials,
        BlockType::Faq,
        BlockType::Pricing,
        BlockType::Contact,
        BlockType::Custom,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            BlockType::Text => "text",
            BlockType::Hero => "hero",
            BlockType::Cta => "cta",
            BlockType::Features => "features",
            BlockType::Testimonials => "testimonials",
            BlockType::Faq => "faq",
            BlockType::Pricing => "pricing",
            BlockType::Contact => "contact",
            BlockType::Custom => "custom",
        }
    }
}

impl fmt::Display for BlockType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BlockType {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        BlockType::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| ModelError::UnknownBlockType(s.to_string()))
    }
}

/// Arrangement of a composite block's items.
///
/// Stored names outside the known set are kept in `Other` and render like
/// a single column.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub enum BlockLayout {
    #[default]
    Column,
    Row,
    Grid2,
    Grid3,
    Grid4,
    Other(String),
}

impl BlockLayout {
    pub const ALL: [BlockLayout; 5] = [
        BlockLayout::Column,
        BlockLayout::Row,
        BlockLayout::Grid2,
        BlockLayout::Grid3,
        BlockLayout::Grid4,
    ];

    pub fn as_str(&self) -> &str {
        match self {
            BlockLayout::Column => "column",
            BlockLayout::Row => "row",
            BlockLayout::Grid2 => "grid-2",
            BlockLayout::Grid3 => "grid-3",
            BlockLayout::Grid4 => "grid-4",
            BlockLayout::Other(name) => name,
        }
    }

    /// Number of grid columns used when rendering items
    pub fn columns(&self) -> usize {
        match self {
            BlockLayout::Column | BlockLayout::Row | BlockLayout::Other(_) => 1,
            BlockLayout::Grid2 => 2,
            BlockLayout::Grid3 => 3,
            BlockLayout::Grid4 => 4,
        }
    }
}

impl fmt::Display for BlockLayout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for BlockLayout {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Unknown stored names are kept as `Other` so they are written back as read
impl<'de> Deserialize<'de> for BlockLayout {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        Ok(name.parse().unwrap_or(BlockLayout::Other(name)))
    }
}

/// Strict parse for user input: only the known layouts are accepted
impl FromStr for BlockLayout {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        BlockLayout::ALL
            .into_iter()
            .find(|l| l.as_str() == s)
            .ok_or_else(|| ModelError::UnknownLayout(s.to_string()))
    }
}

/// CSS-length-like box dimension, either `N%` (0 < N <= 100) or `Npx`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct BlockSize(String);

impl BlockSize {
    pub const PRESETS: [&'static str; 4] = ["25%", "50%", "75%", "100%"];

    pub fn parse(value: &str) -> Result<Self, ModelError> {
        let value = value.trim();
        let invalid = || ModelError::InvalidSize(value.to_string());

        if let Some(number) = value.strip_suffix('%') {
            let percent: f64 = number.parse().map_err(|_| invalid())?;
            if !percent.is_finite() || percent <= 0.0 || percent > 100.0 {
                return Err(invalid());
            }
        } else if let Some(number) = value.strip_suffix("px") {
            let pixels: f64 = number.parse().map_err(|_| invalid())?;
            if !pixels.is_finite() || pixels <= 0.0 {
                return Err(invalid());
            }
        } else {
            return Err(invalid());
        }

        Ok(Self(value.to_string()))
    }

    pub fn full() -> Self {
        Self("100%".to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for BlockSize {
    type Error = ModelError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<BlockSize> for String {
    fn from(size: BlockSize) -> Self {
        size.0
    }
}

impl fmt::Display for BlockSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One typed unit of page content.
///
/// The block type is carried by the `content` variant so the two can never
/// disagree. On the wire the block keeps its flat persisted shape:
/// `{id, type, content, order, isContainer, layout, width, height, tags}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawBlock", into = "RawBlock")]
pub struct PageBlock {
    pub id: String,
    pub content: BlockContent,
    pub order: u32,
    pub is_container: bool,
    pub layout: BlockLayout,
    pub width: Option<BlockSize>,
    pub height: Option<BlockSize>,
    pub tags: Vec<String>,
}

impl PageBlock {
    /// New container block with the default column layout. `order` is set by
    /// the owning list.
    pub fn new(id: impl Into<String>, content: BlockContent) -> Self {
        Self {
            id: id.into(),
            content,
            order: 0,
            is_container: true,
            layout: BlockLayout::default(),
            width: None,
            height: None,
            tags: Vec::new(),
        }
    }

    /// Declared type, `None` when the block carries an unrecognised payload
    pub fn block_type(&self) -> Option<BlockType> {
        self.content.block_type()
    }

    pub fn type_name(&self) -> &str {
        self.content.type_name()
    }

    /// Structural equality ignoring the position in the list
    pub fn same_content(&self, other: &Self) -> bool {
        self.id == other.id
            && self.content == other.content
            && self.is_container == other.is_container
            && self.layout == other.layout
            && self.width == other.width
            && self.height == other.height
            && self.tags == other.tags
    }
}

fn default_is_container() -> bool {
    true
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawBlock {
    id: String,
    #[serde(rename = "type")]
    block_type: String,
    #[serde(default)]
    content: Value,
    #[serde(default)]
    order: u32,
    #[serde(default = "default_is_container")]
    is_container: bool,
    #[serde(default)]
    layout: BlockLayout,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    width: Option<BlockSize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    height: Option<BlockSize>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    tags: Vec<String>,
}

impl From<RawBlock> for PageBlock {
    fn from(raw: RawBlock) -> Self {
        Self {
            id: raw.id,
            content: BlockContent::from_value(&raw.block_type, raw.content),
            order: raw.order,
            is_container: raw.is_container,
            layout: raw.layout,
            width: raw.width,
            height: raw.height,
            tags: raw.tags,
        }
    }
}

impl From<PageBlock> for RawBlock {
    fn from(block: PageBlock) -> Self {
        Self {
            block_type: block.content.type_name().to_string(),
            content: block.content.to_value(),
            id: block.id,
            order: block.order,
            is_container: block.is_container,
            layout: block.layout,
            width: block.width,
            height: block.height,
            tags: block.tags,
        }
    }
}
