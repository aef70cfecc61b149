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

use crate::models::block::PageBlock;
use crate::utils::slug::generate_slug_from_title;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PageStatus {
    #[default]
    Draft,
    Published,
    Archived,
}

impl fmt::Display for PageStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            PageStatus::Draft => "draft",
            PageStatus::Published => "published",
            PageStatus::Archived => "archived",
        })
    }
}

impl FromStr for PageStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "draft" => Ok(PageStatus::Draft),
            "published" => Ok(PageStatus::Published),
            "archived" => Ok(PageStatus::Archived),
            other => Err(format!("Unknown page status: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccessType {
    #[default]
    Public,
    Authenticated,
    Admin,
}

impl fmt::Display for AccessType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            AccessType::Public => "public",
            AccessType::Authenticated => "authenticated",
            AccessType::Admin => "admin",
        })
    }
}

impl FromStr for AccessType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "public" => Ok(AccessType::Public),
            "authenticated" => Ok(AccessType::Authenticated),
            "admin" => Ok(AccessType::Admin),
            other => Err(format!("Unknown access type: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PageContent {
    #[serde(default)]
    pub blocks: Vec<PageBlock>,
}

/// A content page: metadata plus its ordered blocks
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SitePage {
    pub id: String,
    pub title: String,
    pub slug: String,
    /// Named page template; metadata only
    #[serde(default = "default_layout")]
    pub layout: String,
    #[serde(default)]
    pub status: PageStatus,
    #[serde(rename = "accessType", default)]
    pub access_type: AccessType,
    #[serde(default)]
    pub meta_description: String,
    #[serde(default)]
    pub content: PageContent,
}

fn default_layout() -> String {
    "default".to_string()
}

impl SitePage {
    pub fn new(id: impl Into<String>, slug: String, title: String) -> Self {
        Self {
            id: id.into(),
            title,
            slug,
            layout: default_layout(),
            status: PageStatus::Draft,
            access_type: AccessType::Public,
            meta_description: String::new(),
            content: PageContent::default(),
        }
    }

    /// Create a new page with auto-generated slug from title
    pub fn new_with_title(id: impl Into<String>, title: String) -> Self {
        let slug = generate_slug_from_title(&title);
        Self::new(id, slug, title)
    }

    pub fn blocks(&self) -> &[PageBlock] {
        &self.content.blocks
    }

    pub fn find_block(&self, id: &str) -> Option<&PageBlock> {
        self.content.blocks.iter().find(|b| b.id == id)
    }

    pub fn validate_title(&self) -> Result<(), String> {
        if self.title.trim().is_empty() {
            return Err("Title cannot be empty".to_string());
        }

        if self.title.len() > 255 {
            return Err("Title cannot exceed 255 characters".to_string());
        }

        Ok(())
    }

    pub fn validate_slug(&self) -> Result<(), String> {
        if self.slug.is_empty() {
            return Err("Slug cannot be empty".to_string());
        }

        if self.slug.len() > 255 {
            return Err("Slug cannot exceed 255 characters".to_string());
        }

        let valid_chars =
            |c: char| c.is_alphanumeric() || c == '-' || c == '_' || c == '.' || c == '/';

        if !self.slug.chars().all(valid_chars) {
            return Err(
                "Slug can only contain letters, numbers, hyphens, underscores, dots, and slashes"
                    .to_string(),
            );
        }

        if self.slug.starts_with('/') || self.slug.ends_with('/') {
            return Err("Slug cannot start or end with a slash".to_string());
        }

        if self.slug.contains("//") {
            return Err("Slug cannot contain consecutive slashes".to_string());
        }

        Ok(())
    }

    pub fn validate_meta_description(&self) -> Result<(), String> {
        if self.meta_description.len() > 500 {
            return Err("Meta description cannot exceed 500 characters".to_string());
        }
        Ok(())
    }

    /// Block ids are unique and `order` matches list position
    pub fn validate_blocks(&self) -> Result<(), String> {
        let mut seen = HashSet::new();
        for (index, block) in self.content.blocks.iter().enumerate() {
            if block.id.is_empty() {
                return Err(format!("Block at position {} has no id", index + 1));
            }
            if !seen.insert(block.id.as_str()) {
                return Err(format!("Duplicate block id '{}'", block.id));
            }
            if block.order as usize != index + 1 {
                return Err(format!(
                    "Block '{}' has order {} but sits at position {}",
                    block.id,
                    block.order,
                    index + 1
                ));
            }
        }
        Ok(())
    }

    pub fn is_valid(&self) -> Result<(), String> {
        self.validate_title()?;
        self.validate_slug()?;
        self.validate_meta_description()?;
        self.validate_blocks()?;
        Ok(())
    }
}
