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

//! Block-based page editing core for Pagecraft
//!
//! Pages are ordered lists of typed blocks. The editor keeps a working copy
//! and a baseline copy of a page, applies block intents through the blocks
//! container and writes through a [`PagePersistence`] store.
//!
//! ```
//! use pagecraft_core::{BlockContent, BlockIntent, EditorConfig, PageEditor, SitePage};
//!
//! let page = SitePage::new_with_title("home", "Home".to_string());
//! let mut editor = PageEditor::new(page, None, EditorConfig::default());
//! editor
//!     .dispatch(BlockIntent::Insert {
//!         content: BlockContent::Text("Welcome".to_string()),
//!     })
//!     .unwrap();
//!
//! assert!(editor.is_dirty());
//! assert_eq!(editor.page().blocks()[0].order, 1);
//! ```

pub mod config;
pub mod container;
pub mod context;
pub mod diff;
pub mod draggable;
pub mod editor;
pub mod error;
pub mod insert_menu;
pub mod models;
pub mod persistence;
pub mod registry;
pub mod render;
pub mod utils;

pub use config::{EditorConfig, WritePolicy};
pub use container::{BlockEvent, BlockList};
pub use context::{AppContext, KeyValueStore, MemoryKeyValueStore, RoleView};
pub use diff::{diff_pages, PageDiff, PreviewDialog};
pub use draggable::{BlockIntent, DragSession, DraggableBlock, Point};
pub use editor::{EditorState, FeatureField, PageEditor, WriteRequest};
pub use error::{EditorError, EditorResult};
pub use insert_menu::{
    BlockPayload, BlockSource, ContentGenerator, FreeformFormat, GenerationError, InsertMenu,
};
pub use models::{
    AccessType, BlockContent, BlockLayout, BlockSize, BlockType, ModelError, PageBlock,
    PageStatus, SitePage,
};
pub use persistence::{MemoryPageStore, PagePersistence, PersistenceError, Revision};
pub use registry::{create_default_registry, BlockRegistry};
