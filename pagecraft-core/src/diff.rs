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

//! Read-only comparison of two page snapshots, and the publish preview
//! dialog built on it.

use crate::models::block::PageBlock;
use crate::models::page::SitePage;
use crate::render::{escape_html, render_page};
use serde::Serialize;
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldChange {
    pub field: &'static str,
    pub old: String,
    pub new: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModifiedBlock {
    pub id: String,
    pub before: PageBlock,
    pub after: PageBlock,
}

/// A block kept on both sides whose place in the sequence changed
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MovedBlock {
    pub id: String,
    pub from: usize,
    pub to: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PageDiff {
    pub fields: Vec<FieldChange>,
    pub added: Vec<PageBlock>,
    pub removed: Vec<PageBlock>,
    pub modified: Vec<ModifiedBlock>,
    pub moved: Vec<MovedBlock>,
}

impl PageDiff {
    pub fn total_changes(&self) -> usize {
        self.fields.len()
            + self.added.len()
            + self.removed.len()
            + self.modified.len()
            + self.moved.len()
    }

    pub fn is_empty(&self) -> bool {
        self.total_changes() == 0
    }
}

/// Position of an id in the original and modified block lists
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct Positions {
    original: Option<usize>,
    modified: Option<usize>,
}

pub fn diff_pages(original: &SitePage, modified: &SitePage) -> PageDiff {
    let mut diff = PageDiff::default();

    let scalars = [
        ("title", original.title.clone(), modified.title.clone()),
        ("slug", original.slug.clone(), modified.slug.clone()),
        (
            "meta_description",
            original.meta_description.clone(),
            modified.meta_description.clone(),
        ),
        ("layout", original.layout.clone(), modified.layout.clone()),
        (
            "accessType",
            original.access_type.to_string(),
            modified.access_type.to_string(),
        ),
    ];
    for (field, old, new) in scalars {
        if old != new {
            diff.fields.push(FieldChange { field, old, new });
        }
    }

    let before = original.blocks();
    let after = modified.blocks();

    let mut positions: HashMap<&str, Positions> = HashMap::new();
    for (index, block) in before.iter().enumerate() {
        positions
            .entry(block.id.as_str())
            .or_default()
            .original
            .get_or_insert(index);
    }
    for (index, block) in after.iter().enumerate() {
        positions
            .entry(block.id.as_str())
            .or_default()
            .modified
            .get_or_insert(index);
    }

    for (index, block) in before.iter().enumerate() {
        let pos = positions[block.id.as_str()];
        if pos.original == Some(index) && pos.modified.is_none() {
            diff.removed.push(block.clone());
        }
    }

    // (original index, modified index) of ids kept on both sides, in modified order
    let mut kept = Vec::new();
    for (index, block) in after.iter().enumerate() {
        let pos = positions[block.id.as_str()];
        if pos.modified != Some(index) {
            continue;
        }
        match pos.original {
            None => diff.added.push(block.clone()),
            Some(original_index) => {
                let previous = &before[original_index];
                if !previous.same_content(block) {
                    diff.modified.push(ModifiedBlock {
                        id: block.id.clone(),
                        before: previous.clone(),
                        after: block.clone(),
                    });
                }
                kept.push((original_index, index));
            }
        }
    }

    let in_place = longest_increasing_run(&kept);
    for (i, &(from, to)) in kept.iter().enumerate() {
        if !in_place[i] {
            diff.moved.push(MovedBlock {
                id: after[to].id.clone(),
                from,
                to,
            });
        }
    }

    diff
}

/// Marks the largest set of kept blocks whose relative order is unchanged.
/// Everything left unmarked is what moved.
fn longest_increasing_run(kept: &[(usize, usize)]) -> Vec<bool> {
    let n = kept.len();
    let mut length = vec![1usize; n];
    let mut previous = vec![usize::MAX; n];

    for i in 0..n {
        for j in 0..i {
            if kept[j].0 < kept[i].0 && length[j] + 1 > length[i] {
                length[i] = length[j] + 1;
                previous[i] = j;
            }
        }
    }

    let mut marked = vec![false; n];
    let Some(mut cursor) = (0..n).max_by_key(|&i| (length[i], std::cmp::Reverse(i))) else {
        return marked;
    };
    loop {
        marked[cursor] = true;
        if previous[cursor] == usize::MAX {
            break;
        }
        cursor = previous[cursor];
    }
    marked
}

/// Publish confirmation dialog over a baseline and a working snapshot
#[derive(Debug, Clone, PartialEq)]
pub struct PreviewDialog {
    original: SitePage,
    modified: SitePage,
    diff: PageDiff,
}

impl PreviewDialog {
    pub fn new(original: SitePage, modified: SitePage) -> Self {
        let diff = diff_pages(&original, &modified);
        Self {
            original,
            modified,
            diff,
        }
    }

    pub fn original(&self) -> &SitePage {
        &self.original
    }

    pub fn modified(&self) -> &SitePage {
        &self.modified
    }

    pub fn changes(&self) -> &PageDiff {
        &self.diff
    }

    pub fn summary(&self) -> String {
        let diff = &self.diff;
        if diff.is_empty() {
            return "No changes".to_string();
        }
        let mut parts = Vec::new();
        for (count, label) in [
            (diff.fields.len(), "field"),
            (diff.added.len(), "added"),
            (diff.removed.len(), "removed"),
            (diff.modified.len(), "modified"),
            (diff.moved.len(), "moved"),
        ] {
            if count > 0 {
                let label = if label == "field" && count > 1 {
                    "fields"
                } else {
                    label
                };
                parts.push(format!("{} {}", count, label));
            }
        }
        let total = diff.total_changes();
        format!(
            "{} change{}: {}",
            total,
            if total == 1 { "" } else { "s" },
            parts.join(", ")
        )
    }

    pub fn render_side_by_side(&self) -> String {
        format!(
            r#"<div class="preview-compare">
<div class="preview-side preview-original">
<h2>Current version</h2>
{}
</div>
<div class="preview-side preview-modified">
<h2>New version</h2>
{}
</div>
</div>"#,
            render_page(&self.original),
            render_page(&self.modified)
        )
    }

    /// Categorised change list with raw payloads
    pub fn render_changes(&self) -> String {
        let diff = &self.diff;
        let mut html = format!(
            r#"<div class="preview-changes">
<p class="summary">{}</p>"#,
            escape_html(&self.summary())
        );

        if !diff.fields.is_empty() {
            html.push_str("\n<h3>Page settings</h3>\n<ul>");
            for change in &diff.fields {
                html.push_str(&format!(
                    r#"
<li><strong>{}</strong>: <del>{}</del> <ins>{}</ins></li>"#,
                    change.field,
                    escape_html(&change.old),
                    escape_html(&change.new)
                ));
            }
            html.push_str("\n</ul>");
        }

        for (heading, blocks) in [("Added blocks", &diff.added), ("Removed blocks", &diff.removed)]
        {
            if blocks.is_empty() {
                continue;
            }
            html.push_str(&format!("\n<h3>{}</h3>\n<ul>", heading));
            for block in blocks {
                html.push_str(&format!(
                    r#"
<li><code>{}</code> {} <pre>{}</pre></li>"#,
                    escape_html(&block.id),
                    escape_html(block.type_name()),
                    escape_html(&pretty(&block.content.to_value()))
                ));
            }
            html.push_str("\n</ul>");
        }

        if !diff.modified.is_empty() {
            html.push_str("\n<h3>Modified blocks</h3>\n<ul>");
            for change in &diff.modified {
                html.push_str(&format!(
                    r#"
<li><code>{}</code> <pre class="before">{}</pre> <pre class="after">{}</pre></li>"#,
                    escape_html(&change.id),
                    escape_html(&pretty(&change.before.content.to_value())),
                    escape_html(&pretty(&change.after.content.to_value()))
                ));
            }
            html.push_str("\n</ul>");
        }

        if !diff.moved.is_empty() {
            html.push_str("\n<h3>Moved blocks</h3>\n<ul>");
            for moved in &diff.moved {
                html.push_str(&format!(
                    r#"
<li><code>{}</code> position {} &rarr; {}</li>"#,
                    escape_html(&moved.id),
                    moved.from + 1,
                    moved.to + 1
                ));
            }
            html.push_str("\n</ul>");
        }

        html.push_str("\n</div>");
        html
    }

    /// Both snapshots, pretty-printed
    pub fn raw_dump(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(&RawDump {
            original: &self.original,
            modified: &self.modified,
        })
    }
}

#[derive(Serialize)]
struct RawDump<'a> {
    original: &'a SitePage,
    modified: &'a SitePage,
}

fn pretty(value: &serde_json::Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_default()
}
