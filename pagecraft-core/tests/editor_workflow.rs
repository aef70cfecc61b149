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

use pagecraft_core::{
    diff_pages, BlockContent, BlockIntent, BlockList, BlockSource, BlockType, EditorConfig,
    EditorError, EditorState, FreeformFormat, InsertMenu, MemoryPageStore, PageBlock,
    PageEditor, PagePersistence, PersistenceError, Revision, SitePage, WritePolicy,
};
use pretty_assertions::assert_eq;
use std::sync::Arc;

fn text_block(id: &str, text: &str, order: u32) -> PageBlock {
    let mut block = PageBlock::new(id, BlockContent::Text(text.to_string()));
    block.order = order;
    block
}

fn page_with(ids: &[&str]) -> SitePage {
    let mut page = SitePage::new("landing", "landing".to_string(), "Landing".to_string());
    page.content.blocks = ids
        .iter()
        .enumerate()
        .map(|(i, id)| text_block(id, &id.to_uppercase(), i as u32 + 1))
        .collect();
    page
}

fn ids(page: &SitePage) -> Vec<String> {
    page.blocks().iter().map(|b| b.id.clone()).collect()
}

fn assert_dense(page: &SitePage) {
    let orders: Vec<u32> = page.blocks().iter().map(|b| b.order).collect();
    let expected: Vec<u32> = (1..=page.blocks().len() as u32).collect();
    assert_eq!(orders, expected);
}

#[test]
fn test_order_stays_dense_through_every_operation() {
    let mut editor = PageEditor::new(page_with(&["a", "b", "c"]), None, EditorConfig::default());
    let intents = vec![
        BlockIntent::Insert {
            content: BlockContent::Text("D".to_string()),
        },
        BlockIntent::Duplicate { id: "b".to_string() },
        BlockIntent::Remove { id: "a".to_string() },
        BlockIntent::Reorder {
            from: "c".to_string(),
            to: "b".to_string(),
        },
        BlockIntent::MoveUp { id: "b".to_string() },
        BlockIntent::MoveDown { id: "c".to_string() },
        BlockIntent::Remove { id: "stale".to_string() },
    ];

    for intent in intents {
        editor.dispatch(intent).unwrap();
        assert_dense(editor.page());
    }
    assert_eq!(editor.page().blocks().len(), 4);
    assert!(editor.page().is_valid().is_ok());
}

#[test]
fn test_reorder_moves_dragged_block_to_target_position() {
    let mut editor = PageEditor::new(page_with(&["a", "b", "c", "d"]), None, EditorConfig::default());
    editor
        .dispatch(BlockIntent::Reorder {
            from: "d".to_string(),
            to: "b".to_string(),
        })
        .unwrap();
    assert_eq!(ids(editor.page()), vec!["a", "d", "b", "c"]);
    assert_dense(editor.page());
}

#[test]
fn test_duplicate_is_placed_right_after_original() {
    let mut list = BlockList::new(page_with(&["a", "b", "c"]).content.blocks);
    list.apply(BlockIntent::Duplicate { id: "b".to_string() });

    let blocks = list.blocks();
    assert_eq!(blocks.len(), 4);
    assert_eq!(blocks[1].id, "b");
    assert_eq!(blocks[3].id, "c");
    let copy = &blocks[2];
    assert_ne!(copy.id, "b");
    assert_eq!(copy.content, blocks[1].content);
    assert_eq!(copy.layout, blocks[1].layout);
    assert_eq!(copy.is_container, blocks[1].is_container);
}

#[test]
fn test_discard_restores_baseline() {
    let original = page_with(&["a", "b"]);
    let mut editor = PageEditor::new(original.clone(), None, EditorConfig::default());
    editor.update_blocks(vec![text_block("z", "Z", 1)]);
    assert!(editor.is_dirty());

    editor.discard();
    assert_eq!(editor.page(), &original);
    assert!(!editor.is_dirty());
    assert_eq!(editor.state(), EditorState::Clean);
}

#[tokio::test]
async fn test_save_returns_to_clean_with_new_baseline() {
    let store = MemoryPageStore::new();
    let revision = store.insert(page_with(&["a"]));
    let mut editor = PageEditor::new(page_with(&["a"]), Some(revision), EditorConfig::default());

    editor.set_title("Landing page");
    assert_eq!(editor.state(), EditorState::Dirty);

    let saved = editor.save(&store).await.unwrap();
    assert_eq!(saved, Revision(2));
    assert_eq!(editor.state(), EditorState::Clean);
    assert_eq!(editor.baseline().title, "Landing page");
    assert_eq!(store.get("landing").unwrap().0, *editor.page());
}

#[test]
fn test_diff_of_identical_pages_is_empty() {
    let page = page_with(&["a", "b", "c"]);
    let diff = diff_pages(&page, &page.clone());
    assert_eq!(diff.total_changes(), 0);
    assert!(diff.fields.is_empty());
    assert!(diff.added.is_empty());
    assert!(diff.removed.is_empty());
    assert!(diff.modified.is_empty());
    assert!(diff.moved.is_empty());
}

#[test]
fn test_diff_reports_modified_and_added_blocks() {
    let original = page_with(&["1"]);
    let mut modified = original.clone();
    modified.content.blocks[0].content = BlockContent::Text("changed".to_string());
    modified.content.blocks.push(text_block("2", "new", 2));

    let diff = diff_pages(&original, &modified);
    assert_eq!(diff.modified.len(), 1);
    assert_eq!(diff.modified[0].id, "1");
    assert_eq!(diff.added.len(), 1);
    assert_eq!(diff.added[0].id, "2");
    assert_eq!(diff.removed.len(), 0);
}

#[tokio::test]
async fn test_malformed_json_leaves_list_and_dialog_untouched() {
    let mut editor = PageEditor::new(page_with(&["a"]), None, EditorConfig::default());
    let mut menu = InsertMenu::new(Arc::new(pagecraft_core::create_default_registry()));
    menu.open();

    let result = menu
        .submit(
            BlockSource::Freeform {
                block_type: BlockType::Custom,
                text: "{invalid".to_string(),
                format: FreeformFormat::Auto,
            },
            None,
        )
        .await;

    assert!(matches!(result, Err(EditorError::Parse(_))));
    assert!(menu.is_open());
    assert!(menu.error().is_some());
    assert_eq!(ids(editor.page()), vec!["a"]);

    let payload = menu
        .submit(BlockSource::Template(BlockType::Features), None)
        .await
        .unwrap();
    editor.dispatch(payload.into()).unwrap();
    assert_eq!(editor.page().blocks().len(), 2);
    assert_eq!(editor.page().blocks()[1].block_type(), Some(BlockType::Features));
}

#[test]
fn test_boundary_moves_change_nothing() {
    let page = page_with(&["a", "b", "c"]);
    let before = serde_json::to_string(&page).unwrap();
    let mut editor = PageEditor::new(page, None, EditorConfig::default());

    assert_eq!(editor.dispatch(BlockIntent::MoveUp { id: "a".to_string() }).unwrap(), None);
    assert_eq!(editor.dispatch(BlockIntent::MoveDown { id: "c".to_string() }).unwrap(), None);
    assert_eq!(serde_json::to_string(editor.page()).unwrap(), before);
    assert!(!editor.is_dirty());
}

#[tokio::test]
async fn test_concurrent_editors_conflict_under_revision_checks() {
    let store = MemoryPageStore::new();
    let revision = store.insert(page_with(&["a"]));
    let config = EditorConfig {
        write_policy: WritePolicy::CheckRevision,
        ..Default::default()
    };

    let mut first = PageEditor::new(page_with(&["a"]), Some(revision), config.clone());
    let mut second = PageEditor::new(page_with(&["a"]), Some(revision), config);

    first.set_title("First");
    first.save(&store).await.unwrap();

    second.set_title("Second");
    let err = second.save(&store).await.unwrap_err();
    assert!(err.is_conflict());
    assert_eq!(second.state(), EditorState::Dirty);
    assert_eq!(second.page().title, "Second");
    assert_eq!(store.get("landing").unwrap().0.title, "First");
}

#[tokio::test]
async fn test_last_write_wins_by_default() {
    let store = MemoryPageStore::new();
    let revision = store.insert(page_with(&["a"]));
    let mut first = PageEditor::new(page_with(&["a"]), Some(revision), EditorConfig::default());
    let mut second = PageEditor::new(page_with(&["a"]), Some(revision), EditorConfig::default());

    first.set_title("First");
    first.save(&store).await.unwrap();
    second.set_title("Second");
    second.save(&store).await.unwrap();

    assert_eq!(store.get("landing").unwrap().0.title, "Second");
}

struct FailingStore;

#[async_trait::async_trait]
impl PagePersistence for FailingStore {
    async fn save(
        &self,
        _page: &SitePage,
        _expected: Option<Revision>,
    ) -> Result<Revision, PersistenceError> {
        Err(PersistenceError::Backend(anyhow::anyhow!("connection reset")))
    }
}

#[tokio::test]
async fn test_failed_publish_keeps_editor_usable() {
    let mut editor = PageEditor::new(page_with(&["a"]), Some(Revision(1)), EditorConfig::default());
    editor.set_title("Launch");
    editor.request_publish().unwrap();

    let result = editor.confirm_publish(&FailingStore).await;
    assert!(result.is_err());
    assert!(editor.preview().is_none());
    assert_eq!(editor.state(), EditorState::Dirty);
    assert_eq!(editor.page().title, "Launch");

    // retry through a working store
    let store = MemoryPageStore::new();
    store.insert(page_with(&["a"]));
    editor.request_publish().unwrap();
    editor.confirm_publish(&store).await.unwrap();
    assert_eq!(editor.state(), EditorState::Clean);
}
