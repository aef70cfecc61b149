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

use crate::draggable::BlockIntent;
use crate::models::block::{BlockLayout, BlockSize, PageBlock};
use crate::models::content::BlockContent;
use std::fmt;
use uuid::Uuid;

/// An accepted change to the block list
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlockEvent {
    Inserted { id: String },
    Removed { id: String },
    Duplicated { source: String, id: String },
    Moved { id: String, from: usize, to: usize },
    Resized { id: String },
    LayoutChanged { id: String, layout: BlockLayout },
    ContentEdited { id: String },
    TagsChanged { id: String },
}

impl BlockEvent {
    pub fn block_id(&self) -> &str {
        match self {
            BlockEvent::Inserted { id }
            | BlockEvent::Removed { id }
            | BlockEvent::Duplicated { id, .. }
            | BlockEvent::Moved { id, .. }
            | BlockEvent::Resized { id }
            | BlockEvent::LayoutChanged { id, .. }
            | BlockEvent::ContentEdited { id }
            | BlockEvent::TagsChanged { id } => id,
        }
    }
}

impl fmt::Display for BlockEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BlockEvent::Inserted { .. } => write!(f, "Block added"),
            BlockEvent::Removed { .. } => write!(f, "Block removed"),
            BlockEvent::Duplicated { .. } => write!(f, "Block duplicated"),
            BlockEvent::Moved { from, to, .. } => {
                write!(f, "Block moved from position {} to {}", from + 1, to + 1)
            }
            BlockEvent::Resized { .. } => write!(f, "Block resized"),
            BlockEvent::LayoutChanged { layout, .. } => write!(f, "Layout set to {}", layout),
            BlockEvent::ContentEdited { .. } => write!(f, "Block content updated"),
            BlockEvent::TagsChanged { .. } => write!(f, "Block tags updated"),
        }
    }
}

/// Ordered blocks of one page.
///
/// Every accepted mutation leaves `order == index + 1` on every block.
/// Operations naming an id that is not in the list do nothing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BlockList {
    blocks: Vec<PageBlock>,
}

impl BlockList {
    pub fn new(blocks: Vec<PageBlock>) -> Self {
        Self { blocks }
    }

    pub fn blocks(&self) -> &[PageBlock] {
        &self.blocks
    }

    pub fn into_blocks(self) -> Vec<PageBlock> {
        self.blocks
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn position(&self, id: &str) -> Option<usize> {
        self.blocks.iter().position(|b| b.id == id)
    }

    pub fn get(&self, id: &str) -> Option<&PageBlock> {
        self.blocks.iter().find(|b| b.id == id)
    }

    /// Apply an intent; `None` when it changed nothing
    pub fn apply(&mut self, intent: BlockIntent) -> Option<BlockEvent> {
        let event = match intent {
            BlockIntent::Insert { content } => Some(self.insert(content)),
            BlockIntent::Remove { id } => self.remove(&id),
            BlockIntent::Duplicate { id } => self.duplicate(&id),
            BlockIntent::MoveUp { id } => self.move_up(&id),
            BlockIntent::MoveDown { id } => self.move_down(&id),
            BlockIntent::Reorder { from, to } => self.reorder(&from, &to),
            BlockIntent::Resize { id, width, height } => self.resize(&id, width, height),
            BlockIntent::ChangeLayout { id, layout } => self.change_layout(&id, layout),
            BlockIntent::EditContent { id, content } => self.edit_content(&id, content),
            BlockIntent::SetTags { id, tags } => self.set_tags(&id, tags),
        };

        match &event {
            Some(event) => tracing::debug!(block_id = %event.block_id(), "{}", event),
            None => tracing::trace!("Block intent ignored"),
        }
        event
    }

    /// Append a new container block in the column layout
    pub fn insert(&mut self, content: BlockContent) -> BlockEvent {
        let id = Uuid::new_v4().to_string();
        self.blocks.push(PageBlock::new(id.clone(), content));
        self.normalize_orders();
        BlockEvent::Inserted { id }
    }

    pub fn remove(&mut self, id: &str) -> Option<BlockEvent> {
        let index = self.position(id)?;
        let removed = self.blocks.remove(index);
        self.normalize_orders();
        Some(BlockEvent::Removed { id: removed.id })
    }

    /// Copy a block under a new id right after the original
    pub fn duplicate(&mut self, id: &str) -> Option<BlockEvent> {
        let index = self.position(id)?;
        let mut copy = self.blocks[index].clone();
        copy.id = Uuid::new_v4().to_string();
        let new_id = copy.id.clone();
        self.blocks.insert(index + 1, copy);
        self.normalize_orders();
        Some(BlockEvent::Duplicated {
            source: id.to_string(),
            id: new_id,
        })
    }

    /// Take `from` out of the list and put it back at the index `to` held
    pub fn reorder(&mut self, from: &str, to: &str) -> Option<BlockEvent> {
        if from == to {
            return None;
        }
        let old_index = self.position(from)?;
        let new_index = self.position(to)?;

        let block = self.blocks.remove(old_index);
        self.blocks.insert(new_index, block);
        self.normalize_orders();
        Some(BlockEvent::Moved {
            id: from.to_string(),
            from: old_index,
            to: new_index,
        })
    }

    pub fn move_up(&mut self, id: &str) -> Option<BlockEvent> {
        let index = self.position(id)?;
        if index == 0 {
            return None;
        }
        self.swap(index, index - 1)
    }

    pub fn move_down(&mut self, id: &str) -> Option<BlockEvent> {
        let index = self.position(id)?;
        if index + 1 >= self.blocks.len() {
            return None;
        }
        self.swap(index, index + 1)
    }

    /// Set whichever dimensions are given, keeping the others
    pub fn resize(
        &mut self,
        id: &str,
        width: Option<BlockSize>,
        height: Option<BlockSize>,
    ) -> Option<BlockEvent> {
        if width.is_none() && height.is_none() {
            return None;
        }
        let block = self.block_mut(id)?;
        if let Some(width) = width {
            block.width = Some(width);
        }
        if let Some(height) = height {
            block.height = Some(height);
        }
        self.normalize_orders();
        Some(BlockEvent::Resized { id: id.to_string() })
    }

    pub fn change_layout(&mut self, id: &str, layout: BlockLayout) -> Option<BlockEvent> {
        self.block_mut(id)?.layout = layout.clone();
        self.normalize_orders();
        Some(BlockEvent::LayoutChanged {
            id: id.to_string(),
            layout,
        })
    }

    pub fn edit_content(&mut self, id: &str, content: BlockContent) -> Option<BlockEvent> {
        self.block_mut(id)?.content = content;
        self.normalize_orders();
        Some(BlockEvent::ContentEdited { id: id.to_string() })
    }

    pub fn set_tags(&mut self, id: &str, tags: Vec<String>) -> Option<BlockEvent> {
        let mut cleaned: Vec<String> = Vec::with_capacity(tags.len());
        for tag in tags {
            let tag = tag.trim().to_string();
            if !tag.is_empty() && !cleaned.contains(&tag) {
                cleaned.push(tag);
            }
        }
        self.block_mut(id)?.tags = cleaned;
        self.normalize_orders();
        Some(BlockEvent::TagsChanged { id: id.to_string() })
    }

    fn swap(&mut self, a: usize, b: usize) -> Option<BlockEvent> {
        self.blocks.swap(a, b);
        self.normalize_orders();
        Some(BlockEvent::Moved {
            id: self.blocks[b].id.clone(),
            from: a,
            to: b,
        })
    }

    fn block_mut(&mut self, id: &str) -> Option<&mut PageBlock> {
        self.blocks.iter_mut().find(|b| b.id == id)
    }

    fn normalize_orders(&mut self) {
        for (index, block) in self.blocks.iter_mut().enumerate() {
            block.order = index as u32 + 1;
        }
    }
}

impl From<BlockList> for Vec<PageBlock> {
    fn from(list: BlockList) -> Self {
        list.blocks
    }
}
