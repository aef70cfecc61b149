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

//! Per-block chrome and the pointer drag primitive.
//!
//! Nothing here mutates a block list. Gestures become [`BlockIntent`]s that
//! the container applies, and a drag only yields a reorder once it is dropped.

use crate::config::EditorConfig;
use crate::insert_menu::BlockPayload;
use crate::models::block::{BlockLayout, BlockSize, PageBlock};
use crate::models::content::BlockContent;
use crate::render::{block_style, escape_html};

/// A requested change to a page's block list
#[derive(Debug, Clone, PartialEq)]
pub enum BlockIntent {
    Insert {
        content: BlockContent,
    },
    Remove {
        id: String,
    },
    Duplicate {
        id: String,
    },
    MoveUp {
        id: String,
    },
    MoveDown {
        id: String,
    },
    /// Move `from` to the position currently held by `to`
    Reorder {
        from: String,
        to: String,
    },
    /// `None` leaves that dimension as it is
    Resize {
        id: String,
        width: Option<BlockSize>,
        height: Option<BlockSize>,
    },
    ChangeLayout {
        id: String,
        layout: BlockLayout,
    },
    EditContent {
        id: String,
        content: BlockContent,
    },
    SetTags {
        id: String,
        tags: Vec<String>,
    },
}

impl BlockIntent {
    /// Id of the block the intent targets; `None` for inserts
    pub fn target(&self) -> Option<&str> {
        match self {
            BlockIntent::Insert { .. } => None,
            BlockIntent::Reorder { from, .. } => Some(from),
            BlockIntent::Remove { id }
            | BlockIntent::Duplicate { id }
            | BlockIntent::MoveUp { id }
            | BlockIntent::MoveDown { id }
            | BlockIntent::Resize { id, .. }
            | BlockIntent::ChangeLayout { id, .. }
            | BlockIntent::EditContent { id, .. }
            | BlockIntent::SetTags { id, .. } => Some(id),
        }
    }
}

impl From<BlockPayload> for BlockIntent {
    fn from(payload: BlockPayload) -> Self {
        BlockIntent::Insert {
            content: payload.content,
        }
    }
}

/// Editing chrome around one block
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DraggableBlock {
    id: String,
    expanded: bool,
    previewing: bool,
}

impl DraggableBlock {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            expanded: true,
            previewing: false,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn is_expanded(&self) -> bool {
        self.expanded
    }

    pub fn toggle_expanded(&mut self) {
        self.expanded = !self.expanded;
    }

    pub fn is_previewing(&self) -> bool {
        self.previewing
    }

    pub fn set_previewing(&mut self, previewing: bool) {
        self.previewing = previewing;
    }

    pub fn remove(&self) -> BlockIntent {
        BlockIntent::Remove {
            id: self.id.clone(),
        }
    }

    pub fn duplicate(&self) -> BlockIntent {
        BlockIntent::Duplicate {
            id: self.id.clone(),
        }
    }

    pub fn move_up(&self) -> BlockIntent {
        BlockIntent::MoveUp {
            id: self.id.clone(),
        }
    }

    pub fn move_down(&self) -> BlockIntent {
        BlockIntent::MoveDown {
            id: self.id.clone(),
        }
    }

    pub fn edit(&self, content: BlockContent) -> BlockIntent {
        BlockIntent::EditContent {
            id: self.id.clone(),
            content,
        }
    }

    pub fn resize(&self, width: Option<BlockSize>, height: Option<BlockSize>) -> BlockIntent {
        BlockIntent::Resize {
            id: self.id.clone(),
            width,
            height,
        }
    }

    pub fn change_layout(&self, layout: BlockLayout) -> BlockIntent {
        BlockIntent::ChangeLayout {
            id: self.id.clone(),
            layout,
        }
    }

    pub fn set_tags(&self, tags: Vec<String>) -> BlockIntent {
        BlockIntent::SetTags {
            id: self.id.clone(),
            tags,
        }
    }

    /// Wrap `body_html` in the block's editing chrome. While previewing only
    /// the content is rendered; while collapsed the body is left out.
    pub fn render(&self, block: &PageBlock, body_html: &str) -> String {
        let style = block_style(block)
            .map(|s| format!(r#" style="{}""#, escape_html(&s)))
            .unwrap_or_default();
        let id = escape_html(&block.id);

        if self.previewing {
            return format!(
                r#"<div class="block-preview" data-block-id="{}"{}>{}</div>"#,
                id, style, body_html
            );
        }

        let mut html = format!(
            r#"<div class="draggable-block" data-block-id="{}"{}>
    <div class="block-toolbar">
        <span class="drag-handle" title="Drag to reorder">&#8942;&#8942;</span>
        <span class="badge badge-type">{}</span>"#,
            id,
            style,
            escape_html(block.type_name())
        );
        for tag in &block.tags {
            html.push_str(&format!(
                r#"
        <span class="badge badge-tag">{}</span>"#,
                escape_html(tag)
            ));
        }
        html.push_str(&format!(
            r#"
        <button class="toggle" data-action="toggle">{}</button>
        <div class="block-actions">
            <button data-action="edit">Edit</button>
            <button data-action="move-up">Move up</button>
            <button data-action="move-down">Move down</button>
            <button data-action="duplicate">Duplicate</button>
            <button data-action="remove">Remove</button>"#,
            if self.expanded { "Collapse" } else { "Expand" }
        ));
        for preset in BlockSize::PRESETS {
            html.push_str(&format!(
                r#"
            <button data-action="resize" data-width="{0}">{0}</button>"#,
                preset
            ));
        }
        html.push_str("\n        </div>\n    </div>");

        if self.expanded {
            html.push_str(&format!(
                r#"
    <div class="block-body">{}</div>"#,
                body_html
            ));
        }

        if block.is_container {
            html.push_str(
                r#"
    <div class="block-layout">"#,
            );
            for layout in BlockLayout::ALL {
                let selected = if layout == block.layout {
                    r#" class="selected""#
                } else {
                    ""
                };
                html.push_str(&format!(
                    r#"
        <button data-action="layout" data-layout="{0}"{1}>{0}</button>"#,
                    layout, selected
                ));
            }
            html.push_str("\n    </div>");
        }

        html.push_str("\n</div>");
        html
    }
}

/// Pointer position or offset, in pixels
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// One drag gesture from pointer press to drop
#[derive(Debug, Clone, PartialEq)]
pub struct DragSession {
    active_id: String,
    origin: Point,
    activation_distance: f64,
    transform: Option<Point>,
}

impl DragSession {
    pub fn begin(active_id: impl Into<String>, origin: Point, config: &EditorConfig) -> Self {
        Self {
            active_id: active_id.into(),
            origin,
            activation_distance: config.drag_activation_distance.max(0.0),
            transform: None,
        }
    }

    pub fn active_id(&self) -> &str {
        &self.active_id
    }

    /// True once the pointer travelled past the activation distance
    pub fn is_active(&self) -> bool {
        self.transform.is_some()
    }

    pub fn transform(&self) -> Option<Point> {
        self.transform
    }

    /// Track the pointer; returns the offset to draw the block at once the
    /// gesture is active
    pub fn pointer_moved(&mut self, position: Point) -> Option<Point> {
        let offset = Point::new(position.x - self.origin.x, position.y - self.origin.y);
        if self.transform.is_none() && offset.x.hypot(offset.y) < self.activation_distance {
            return None;
        }
        self.transform = Some(offset);
        self.transform
    }

    /// Settle the gesture over `over_id`. Only an active drag that ends on a
    /// different block produces a reorder.
    pub fn drop_over(self, over_id: Option<&str>) -> Option<BlockIntent> {
        if !self.is_active() {
            return None;
        }
        match over_id {
            Some(over) if over != self.active_id => Some(BlockIntent::Reorder {
                from: self.active_id,
                to: over.to_string(),
            }),
            _ => None,
        }
    }

    /// Abandon the gesture
    pub fn cancel(self) {
        tracing::trace!(block_id = %self.active_id, "Drag cancelled");
    }
}
