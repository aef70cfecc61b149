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

use anyhow::Result;
use pagecraft_core::{
    create_default_registry, BlockContent, BlockIntent, BlockLayout, BlockSize, BlockType,
    EditorConfig, EditorState, PageBlock, PageEditor, PageStatus, SitePage, WritePolicy,
};
use pagecraft_db::{init_database, PageRepository};
use pretty_assertions::assert_eq;
use serde_json::json;

fn every_block_page() -> SitePage {
    let registry = create_default_registry();
    let mut page = SitePage::new_with_title("showcase", "Block Showcase".to_string());
    for (i, block_type) in BlockType::ALL.iter().enumerate() {
        let mut block = PageBlock::new(format!("b{}", i), registry.template(*block_type));
        block.order = i as u32 + 1;
        page.content.blocks.push(block);
    }
    let mut unknown = PageBlock::new(
        "legacy",
        BlockContent::from_value("gallery", json!({"images": ["a.png"]})),
    );
    unknown.order = page.content.blocks.len() as u32 + 1;
    unknown.width = Some(BlockSize::parse("75%").unwrap());
    unknown.layout = BlockLayout::Grid3;
    page.content.blocks.push(unknown);
    page
}

#[tokio::test]
async fn test_pages_survive_reopening_the_database() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let url = format!("sqlite://{}", dir.path().join("pages.db").display());
    let page = every_block_page();

    {
        let pool = init_database(&url).await?;
        PageRepository::new(pool.clone()).create(&page).await?;
        pool.close().await;
    }

    let pool = init_database(&url).await?;
    let (stored, _) = PageRepository::new(pool).find_by_id("showcase").await?.unwrap();
    assert_eq!(stored, page);
    assert_eq!(stored.blocks().last().unwrap().type_name(), "gallery");
    Ok(())
}

#[tokio::test]
async fn test_editor_saves_and_publishes_through_sqlite() -> Result<()> {
    let pool = init_database("sqlite::memory:").await?;
    let repo = PageRepository::new(pool);
    let revision = repo.create(&every_block_page()).await?;

    let (page, _) = repo.find_by_id("showcase").await?.unwrap();
    let config = EditorConfig {
        write_policy: WritePolicy::CheckRevision,
        ..Default::default()
    };
    let mut editor = PageEditor::new(page, Some(revision), config);

    editor.dispatch(BlockIntent::Reorder {
        from: "b8".to_string(),
        to: "b0".to_string(),
    })?;
    editor.dispatch(BlockIntent::Remove {
        id: "legacy".to_string(),
    })?;
    editor.save(&repo).await?;
    assert_eq!(editor.state(), EditorState::Clean);

    editor.set_title("Showcase");
    let summary = editor.request_publish()?.summary();
    assert_eq!(summary, "1 change: 1 field");
    editor.confirm_publish(&repo).await?;

    let (stored, stored_revision) = repo.find_by_id("showcase").await?.unwrap();
    assert_eq!(stored_revision, editor.revision().unwrap());
    assert_eq!(stored.status, PageStatus::Published);
    assert_eq!(stored.blocks()[0].id, "b8");
    assert_eq!(stored.blocks().len(), 9);

    let publication = repo.latest_publication("showcase").await?.unwrap();
    assert_eq!(publication.page, stored);
    Ok(())
}

#[tokio::test]
async fn test_second_editor_gets_conflict() -> Result<()> {
    let pool = init_database("sqlite::memory:").await?;
    let repo = PageRepository::new(pool);
    let revision = repo.create(&every_block_page()).await?;
    let (page, _) = repo.find_by_id("showcase").await?.unwrap();

    let config = EditorConfig {
        write_policy: WritePolicy::CheckRevision,
        ..Default::default()
    };
    let mut first = PageEditor::new(page.clone(), Some(revision), config.clone());
    let mut second = PageEditor::new(page, Some(revision), config);

    first.set_meta_description("First");
    first.save(&repo).await?;

    second.set_meta_description("Second");
    let err = second.save(&repo).await.unwrap_err();
    assert!(err.is_conflict());
    assert!(second.last_error().unwrap().contains("changed elsewhere"));
    Ok(())
}
