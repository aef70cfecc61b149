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

use clap::{Parser, Subcommand, ValueEnum};
use pagecraft_core::context::RoleView;
use pagecraft_core::insert_menu::FreeformFormat;
use pagecraft_core::models::{AccessType, BlockLayout, BlockSize, BlockType, ModelError};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "pagecraft")]
#[command(about = "Pagecraft command line page editor")]
pub struct Cli {
    /// Configuration file
    #[arg(long, global = true, default_value = "pagecraft.toml")]
    pub config: PathBuf,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Initialize the database (create tables)
    Init,

    /// Page management commands
    Page {
        #[command(subcommand)]
        command: PageCommands,
    },

    /// Block editing commands
    Block {
        #[command(subcommand)]
        command: BlockCommands,
    },

    /// Create demo pages: one per block template plus a landing page
    Seed,

    /// Role view preference
    View {
        #[command(subcommand)]
        command: ViewCommands,
    },
}

#[derive(Subcommand, Debug)]
pub enum PageCommands {
    /// Create an empty page
    Create {
        /// Page title
        title: String,
        /// URL slug (derived from the title when omitted)
        #[arg(long)]
        slug: Option<String>,
        /// Page id (random when omitted)
        #[arg(long)]
        id: Option<String>,
    },

    /// List all pages
    List,

    /// Show a page's blocks
    Show {
        id: String,
        /// Print the rendered HTML instead of the block list
        #[arg(long)]
        html: bool,
    },

    /// Change page settings
    Set {
        id: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        slug: Option<String>,
        /// Named page template
        #[arg(long)]
        layout: Option<String>,
        #[arg(long)]
        meta_description: Option<String>,
        /// public, authenticated or admin
        #[arg(long)]
        access: Option<AccessType>,
    },

    /// Delete a page and its publications
    Delete { id: String },

    /// Compare the saved page with its last publication
    Diff {
        id: String,
        /// Print both snapshots as JSON
        #[arg(long)]
        raw: bool,
        /// Print the side-by-side HTML preview
        #[arg(long)]
        html: bool,
    },

    /// Publish a page after reviewing its changes
    Publish {
        id: String,
        /// Confirm without asking
        #[arg(long)]
        yes: bool,
    },
}

#[derive(Subcommand, Debug)]
pub enum BlockCommands {
    /// Append a block from a template, typed content or a prompt
    Add {
        page: String,
        /// Block type
        #[arg(long = "type", default_value = "text")]
        block_type: BlockType,
        /// Content to use instead of the template
        #[arg(long, conflicts_with = "prompt")]
        content: Option<String>,
        /// How to read --content
        #[arg(long, value_enum, default_value_t = ContentFormat::Auto)]
        format: ContentFormat,
        /// Ask the content generator instead
        #[arg(long)]
        prompt: Option<String>,
    },

    /// Remove a block
    Remove { page: String, block: String },

    /// Copy a block right after itself
    Duplicate { page: String, block: String },

    /// Swap a block with the one above
    MoveUp { page: String, block: String },

    /// Swap a block with the one below
    MoveDown { page: String, block: String },

    /// Move a block to the position of another
    Reorder {
        page: String,
        from: String,
        to: String,
    },

    /// Set a block's width and/or height (25%, 50%, 320px, ...)
    Resize {
        page: String,
        block: String,
        #[arg(long, value_parser = parse_size)]
        width: Option<BlockSize>,
        #[arg(long, value_parser = parse_size)]
        height: Option<BlockSize>,
    },

    /// Set a block's layout (column, row, grid-2, grid-3, grid-4)
    Layout {
        page: String,
        block: String,
        layout: BlockLayout,
    },

    /// Replace a block's tags
    Tags {
        page: String,
        block: String,
        tags: Vec<String>,
    },
}

#[derive(Subcommand, Debug)]
pub enum ViewCommands {
    /// Print the stored role view
    Get,
    /// Store a role view (admin, instructor, student)
    Set { view: RoleView },
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentFormat {
    /// JSON when the content starts with { or [
    Auto,
    Json,
    Text,
}

impl From<ContentFormat> for FreeformFormat {
    fn from(format: ContentFormat) -> Self {
        match format {
            ContentFormat::Auto => FreeformFormat::Auto,
            ContentFormat::Json => FreeformFormat::Json,
            ContentFormat::Text => FreeformFormat::PlainText,
        }
    }
}

fn parse_size(value: &str) -> Result<BlockSize, ModelError> {
    BlockSize::parse(value)
}
