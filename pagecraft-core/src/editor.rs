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

//! Page editor: owns a working copy and a baseline copy of one page and the
//! save/publish lifecycle between them.
//!
//! Collaborator calls come in two forms. `save`/`confirm_publish` await the
//! store directly; `begin_*`/`finish_*` hand the write to the caller and take
//! the outcome back, for hosts that drive the call themselves.

use crate::config::{EditorConfig, WritePolicy};
use crate::container::{BlockEvent, BlockList};
use crate::diff::PreviewDialog;
use crate::draggable::{BlockIntent, DraggableBlock};
use crate::error::{EditorError, EditorResult};
use crate::models::block::PageBlock;
use crate::models::content::{BlockContent, FeatureItem};
use crate::models::page::{AccessType, PageStatus, SitePage};
use crate::persistence::{PagePersistence, PersistenceError, Revision};
use crate::render;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorState {
    Clean,
    Dirty,
    Saving,
    Reviewing,
    Publishing,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
enum Activity {
    #[default]
    Idle,
    Saving,
    Reviewing,
    Publishing,
}

/// Editable field of a features item
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeatureField {
    Title,
    Description,
}

/// A write the caller should send to the store
#[derive(Debug, Clone, PartialEq)]
pub struct WriteRequest {
    pub page: SitePage,
    pub expected: Option<Revision>,
}

#[derive(Debug)]
pub struct PageEditor {
    working: SitePage,
    baseline: SitePage,
    revision: Option<Revision>,
    activity: Activity,
    in_flight: Option<SitePage>,
    preview: Option<PreviewDialog>,
    last_error: Option<String>,
    config: EditorConfig,
}

impl PageEditor {
    /// Start editing `page`, as last loaded from the store at `revision`
    pub fn new(page: SitePage, revision: Option<Revision>, config: EditorConfig) -> Self {
        Self {
            baseline: page.clone(),
            working: page,
            revision,
            activity: Activity::Idle,
            in_flight: None,
            preview: None,
            last_error: None,
            config,
        }
    }

    /// The working copy
    pub fn page(&self) -> &SitePage {
        &self.working
    }

    pub fn baseline(&self) -> &SitePage {
        &self.baseline
    }

    pub fn revision(&self) -> Option<Revision> {
        self.revision
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn is_dirty(&self) -> bool {
        self.working != self.baseline
    }

    pub fn state(&self) -> EditorState {
        match self.activity {
            Activity::Saving => EditorState::Saving,
            Activity::Reviewing => EditorState::Reviewing,
            Activity::Publishing => EditorState::Publishing,
            Activity::Idle if self.is_dirty() => EditorState::Dirty,
            Activity::Idle => EditorState::Clean,
        }
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn preview(&self) -> Option<&PreviewDialog> {
        self.preview.as_ref()
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.working.title = title.into();
    }

    pub fn set_slug(&mut self, slug: impl Into<String>) {
        self.working.slug = slug.into();
    }

    pub fn set_layout(&mut self, layout: impl Into<String>) {
        self.working.layout = layout.into();
    }

    pub fn set_meta_description(&mut self, meta_description: impl Into<String>) {
        self.working.meta_description = meta_description.into();
    }

    pub fn set_access_type(&mut self, access_type: AccessType) {
        self.working.access_type = access_type;
    }

    /// Replace the working copy's blocks
    pub fn update_blocks(&mut self, blocks: Vec<PageBlock>) {
        self.working.content.blocks = blocks;
    }

    pub fn blocks(&self) -> BlockList {
        BlockList::new(self.working.content.blocks.clone())
    }

    /// Apply a block intent to the working copy; `Ok(None)` when it was a no-op
    pub fn dispatch(&mut self, intent: BlockIntent) -> EditorResult<Option<BlockEvent>> {
        if let BlockIntent::EditContent { id, content } = &intent {
            let known = self.working.content.blocks.iter().any(|block| &block.id == id);
            if known && content.is_empty() {
                return self.reject(EditorError::Validation(
                    "Block content cannot be empty".to_string(),
                ));
            }
        }

        let mut list = self.blocks();
        let event = list.apply(intent);
        if event.is_some() {
            self.update_blocks(list.into_blocks());
        }
        Ok(event)
    }

    /// Edit one field of one features item. Returns false when the block
    /// or item no longer exists.
    pub fn update_feature_item(
        &mut self,
        block_id: &str,
        index: usize,
        field: FeatureField,
        value: impl Into<String>,
    ) -> EditorResult<bool> {
        let value = value.into();
        self.edit_features(block_id, move |items| {
            let Some(item) = items.get_mut(index) else {
                return false;
            };
            match field {
                FeatureField::Title => item.title = value,
                FeatureField::Description => item.description = value,
            }
            true
        })
    }

    pub fn append_feature_item(&mut self, block_id: &str) -> EditorResult<bool> {
        self.edit_features(block_id, |items| {
            items.push(FeatureItem {
                title: "New feature".to_string(),
                description: "Describe this feature".to_string(),
                ..Default::default()
            });
            true
        })
    }

    fn edit_features<F>(&mut self, block_id: &str, edit: F) -> EditorResult<bool>
    where
        F: FnOnce(&mut Vec<FeatureItem>) -> bool,
    {
        let mut blocks = self.working.content.blocks.clone();
        let Some(block) = blocks.iter_mut().find(|b| b.id == block_id) else {
            return Ok(false);
        };
        let BlockContent::Features(features) = &mut block.content else {
            return self.reject(EditorError::InvalidState(format!(
                "Block '{}' is a {} block, not features",
                block_id,
                block.type_name()
            )));
        };

        if !edit(&mut features.items) {
            return Ok(false);
        }
        self.update_blocks(blocks);
        Ok(true)
    }

    /// Validate the working copy and mark a save in flight
    pub fn begin_save(&mut self) -> EditorResult<WriteRequest> {
        self.ensure_idle()?;
        if let Err(reason) = self.working.is_valid() {
            return self.reject(EditorError::Validation(reason));
        }

        let page = self.working.clone();
        self.in_flight = Some(page.clone());
        self.activity = Activity::Saving;
        self.last_error = None;
        tracing::info!(page_id = %page.id, "Saving page");
        Ok(WriteRequest {
            page,
            expected: self.expected_revision(),
        })
    }

    /// Take the outcome of the write started by [`PageEditor::begin_save`]
    pub fn finish_save(
        &mut self,
        result: Result<Revision, PersistenceError>,
    ) -> EditorResult<Revision> {
        if self.activity != Activity::Saving {
            return Err(EditorError::InvalidState("No save in progress".to_string()));
        }
        self.activity = Activity::Idle;
        let saved = self.in_flight.take();

        match (result, saved) {
            (Ok(revision), Some(saved)) => {
                tracing::info!(page_id = %saved.id, revision = %revision, "Page saved");
                self.baseline = saved;
                self.revision = Some(revision);
                Ok(revision)
            }
            (Ok(_), None) => Err(EditorError::InvalidState(
                "Saved snapshot missing".to_string(),
            )),
            (Err(e), _) => self.collaborator_failed("Save", e),
        }
    }

    pub async fn save(&mut self, store: &dyn PagePersistence) -> EditorResult<Revision> {
        let request = self.begin_save()?;
        let result = store.save(&request.page, request.expected).await;
        self.finish_save(result)
    }

    /// Open the publish preview over the baseline and the working copy
    pub fn request_publish(&mut self) -> EditorResult<&PreviewDialog> {
        self.ensure_idle()?;
        self.activity = Activity::Reviewing;
        self.last_error = None;
        let dialog: &PreviewDialog = self
            .preview
            .insert(PreviewDialog::new(self.baseline.clone(), self.working.clone()));
        Ok(dialog)
    }

    pub fn cancel_publish(&mut self) {
        if self.activity == Activity::Reviewing {
            self.activity = Activity::Idle;
        }
        self.preview = None;
    }

    /// Close the preview and mark a publish in flight. The page handed over
    /// already carries the published status.
    pub fn begin_publish(&mut self) -> EditorResult<WriteRequest> {
        match self.activity {
            Activity::Reviewing => {}
            Activity::Idle => {
                return Err(EditorError::InvalidState(
                    "Publishing needs a reviewed preview".to_string(),
                ))
            }
            Activity::Saving => return Err(EditorError::Busy("Save")),
            Activity::Publishing => return Err(EditorError::Busy("Publish")),
        }

        self.preview = None;
        self.activity = Activity::Idle;
        if let Err(reason) = self.working.is_valid() {
            return self.reject(EditorError::Validation(reason));
        }

        let mut page = self.working.clone();
        page.status = PageStatus::Published;
        self.in_flight = Some(page.clone());
        self.activity = Activity::Publishing;
        self.last_error = None;
        tracing::info!(page_id = %page.id, "Publishing page");
        Ok(WriteRequest {
            page,
            expected: self.expected_revision(),
        })
    }

    pub fn finish_publish(
        &mut self,
        result: Result<Revision, PersistenceError>,
    ) -> EditorResult<Revision> {
        if self.activity != Activity::Publishing {
            return Err(EditorError::InvalidState(
                "No publish in progress".to_string(),
            ));
        }
        self.activity = Activity::Idle;
        let published = self.in_flight.take();

        match (result, published) {
            (Ok(revision), Some(published)) => {
                tracing::info!(page_id = %published.id, revision = %revision, "Page published");
                self.working.status = PageStatus::Published;
                self.baseline = published;
                self.revision = Some(revision);
                Ok(revision)
            }
            (Ok(_), None) => Err(EditorError::InvalidState(
                "Published snapshot missing".to_string(),
            )),
            (Err(e), _) => self.collaborator_failed("Publish", e),
        }
    }

    pub async fn confirm_publish(&mut self, store: &dyn PagePersistence) -> EditorResult<Revision> {
        let request = self.begin_publish()?;
        let result = store.publish(&request.page, request.expected).await;
        self.finish_publish(result)
    }

    /// Throw away unsaved edits
    pub fn discard(&mut self) {
        tracing::debug!(page_id = %self.working.id, "Discarding unsaved changes");
        self.working = self.baseline.clone();
        self.cancel_publish();
        self.last_error = None;
    }

    /// Render one block's content, keyed on its type
    pub fn render_block(block: &PageBlock) -> String {
        render::render_block(block)
    }

    /// Render the working copy with editing chrome around every block
    pub fn render(&self) -> String {
        let mut html = String::from(r#"<div class="page-editor">"#);
        for block in self.working.blocks() {
            let body = render::render_content(&block.content, block.layout.columns());
            html.push('\n');
            html.push_str(&DraggableBlock::new(block.id.clone()).render(block, &body));
        }
        html.push_str("\n</div>");
        html
    }

    fn expected_revision(&self) -> Option<Revision> {
        match self.config.write_policy {
            WritePolicy::LastWriteWins => None,
            WritePolicy::CheckRevision => self.revision,
        }
    }

    fn ensure_idle(&self) -> EditorResult<()> {
        match self.activity {
            Activity::Idle => Ok(()),
            Activity::Saving => Err(EditorError::Busy("Save")),
            Activity::Publishing => Err(EditorError::Busy("Publish")),
            Activity::Reviewing => Err(EditorError::InvalidState(
                "Publish preview is open".to_string(),
            )),
        }
    }

    fn collaborator_failed<T>(
        &mut self,
        action: &str,
        error: PersistenceError,
    ) -> EditorResult<T> {
        let error = EditorError::from(error);
        tracing::warn!(page_id = %self.working.id, error = %error, "{} failed", action);
        self.last_error = Some(error.to_string());
        Err(error)
    }

    fn reject<T>(&mut self, error: EditorError) -> EditorResult<T> {
        tracing::debug!(error = %error, "Editor input rejected");
        self.last_error = Some(error.to_string());
        Err(error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::content::FeaturesContent;
    use crate::persistence::MemoryPageStore;
    use pretty_assertions::assert_eq;

    fn text_block(id: &str, text: &str, order: u32) -> PageBlock {
        let mut block = PageBlock::new(id, BlockContent::Text(text.to_string()));
        block.order = order;
        block
    }

    fn sample_page() -> SitePage {
        let mut page = SitePage::new("p1", "courses".to_string(), "Courses".to_string());
        page.content.blocks = vec![text_block("a", "Intro", 1), text_block("b", "Body", 2)];
        page
    }

    fn features_page() -> SitePage {
        let mut page = sample_page();
        let mut block = PageBlock::new("f", BlockContent::Features(FeaturesContent::default()));
        block.order = 3;
        page.content.blocks.push(block);
        page
    }

    fn editor(page: SitePage) -> PageEditor {
        PageEditor::new(page, Some(Revision(1)), EditorConfig::default())
    }

    #[test]
    fn test_new_editor_is_clean() {
        let editor = editor(sample_page());
        assert_eq!(editor.state(), EditorState::Clean);
        assert!(!editor.is_dirty());
    }

    #[test]
    fn test_field_edits_mark_dirty_and_back() {
        let mut editor = editor(sample_page());
        editor.set_title("Catalogue");
        assert_eq!(editor.state(), EditorState::Dirty);
        editor.set_title("Courses");
        assert_eq!(editor.state(), EditorState::Clean);
    }

    #[test]
    fn test_dispatch_noop_keeps_clean() {
        let mut editor = editor(sample_page());
        let event = editor
            .dispatch(BlockIntent::MoveUp { id: "a".to_string() })
            .unwrap();
        assert_eq!(event, None);
        assert!(!editor.is_dirty());
    }

    #[test]
    fn test_empty_content_edit_rejected() {
        let mut editor = editor(sample_page());
        let result = editor.dispatch(BlockIntent::EditContent {
            id: "a".to_string(),
            content: BlockContent::Text("  ".to_string()),
        });
        assert!(matches!(result, Err(EditorError::Validation(_))));
        assert!(editor.last_error().is_some());
        assert!(!editor.is_dirty());
    }

    #[test]
    fn test_empty_content_for_missing_block_is_noop() {
        let mut editor = editor(sample_page());
        let event = editor
            .dispatch(BlockIntent::EditContent {
                id: "gone".to_string(),
                content: BlockContent::Text(String::new()),
            })
            .unwrap();
        assert_eq!(event, None);
        assert!(editor.last_error().is_none());
        assert!(!editor.is_dirty());
    }

    #[test]
    fn test_feature_helpers() {
        let mut editor = editor(features_page());
        assert!(editor.append_feature_item("f").unwrap());
        assert!(editor
            .update_feature_item("f", 0, FeatureField::Title, "Mentoring")
            .unwrap());
        assert!(!editor
            .update_feature_item("f", 5, FeatureField::Title, "Nope")
            .unwrap());
        assert!(!editor.append_feature_item("missing").unwrap());
        assert!(matches!(
            editor.append_feature_item("a"),
            Err(EditorError::InvalidState(_))
        ));

        let BlockContent::Features(features) = &editor.page().find_block("f").unwrap().content
        else {
            panic!("expected features");
        };
        assert_eq!(features.items.len(), 1);
        assert_eq!(features.items[0].title, "Mentoring");
        assert_eq!(features.items[0].description, "Describe this feature");
        assert!(editor.is_dirty());
    }

    #[test]
    fn test_split_save_and_busy() {
        let mut editor = editor(sample_page());
        editor.set_title("Catalogue");

        let request = editor.begin_save().unwrap();
        assert_eq!(request.page.title, "Catalogue");
        assert_eq!(request.expected, None);
        assert_eq!(editor.state(), EditorState::Saving);
        assert!(matches!(editor.begin_save(), Err(EditorError::Busy("Save"))));
        assert!(matches!(
            editor.request_publish(),
            Err(EditorError::Busy("Save"))
        ));

        // edits made while the save is in flight stay dirty
        editor.set_meta_description("All courses");
        assert_eq!(editor.finish_save(Ok(Revision(2))).unwrap(), Revision(2));
        assert_eq!(editor.baseline().title, "Catalogue");
        assert_eq!(editor.state(), EditorState::Dirty);
        assert_eq!(editor.revision(), Some(Revision(2)));
    }

    #[test]
    fn test_failed_save_keeps_edits() {
        let mut editor = editor(sample_page());
        editor.set_title("Catalogue");
        editor.begin_save().unwrap();
        let result = editor.finish_save(Err(PersistenceError::Backend(anyhow::anyhow!("disk full"))));

        assert!(matches!(result, Err(EditorError::Persistence(_))));
        assert_eq!(editor.state(), EditorState::Dirty);
        assert_eq!(editor.page().title, "Catalogue");
        assert_eq!(editor.baseline().title, "Courses");
        assert!(editor.last_error().unwrap().contains("disk full"));
    }

    #[test]
    fn test_invalid_page_never_reaches_store() {
        let mut editor = editor(sample_page());
        editor.set_title("");
        assert!(matches!(editor.begin_save(), Err(EditorError::Validation(_))));
        assert_eq!(editor.state(), EditorState::Dirty);
    }

    #[test]
    fn test_check_revision_policy_sends_revision() {
        let config = EditorConfig {
            write_policy: WritePolicy::CheckRevision,
            ..Default::default()
        };
        let mut editor = PageEditor::new(sample_page(), Some(Revision(4)), config);
        assert_eq!(editor.begin_save().unwrap().expected, Some(Revision(4)));
    }

    #[test]
    fn test_publish_requires_review() {
        let mut editor = editor(sample_page());
        assert!(matches!(
            editor.begin_publish(),
            Err(EditorError::InvalidState(_))
        ));

        editor.set_title("Catalogue");
        let dialog = editor.request_publish().unwrap();
        assert_eq!(dialog.changes().total_changes(), 1);
        assert_eq!(editor.state(), EditorState::Reviewing);
        assert!(matches!(editor.begin_save(), Err(EditorError::InvalidState(_))));

        editor.cancel_publish();
        assert!(editor.preview().is_none());
        assert_eq!(editor.state(), EditorState::Dirty);
    }

    #[test]
    fn test_failed_publish_restores_previous_state() {
        let mut editor = editor(sample_page());
        editor.set_title("Catalogue");
        editor.request_publish().unwrap();
        let request = editor.begin_publish().unwrap();
        assert_eq!(request.page.status, PageStatus::Published);
        assert!(editor.preview().is_none());

        let result = editor.finish_publish(Err(PersistenceError::NotFound("p1".to_string())));
        assert!(result.is_err());
        assert_eq!(editor.state(), EditorState::Dirty);
        assert_eq!(editor.page().status, PageStatus::Draft);
        assert_eq!(editor.page().title, "Catalogue");
    }

    #[tokio::test]
    async fn test_publish_through_store() {
        let store = MemoryPageStore::new();
        let revision = store.insert(sample_page());
        let mut editor = PageEditor::new(sample_page(), Some(revision), EditorConfig::default());

        editor.set_title("Catalogue");
        editor.request_publish().unwrap();
        editor.confirm_publish(&store).await.unwrap();

        assert_eq!(editor.state(), EditorState::Clean);
        assert_eq!(editor.page().status, PageStatus::Published);
        assert_eq!(editor.baseline(), editor.page());
        let published = store.published("p1").unwrap();
        assert_eq!(published.title, "Catalogue");
        assert_eq!(published.status, PageStatus::Published);
    }

    #[test]
    fn test_discard_closes_preview() {
        let mut editor = editor(sample_page());
        editor.set_title("Catalogue");
        editor.request_publish().unwrap();
        editor.discard();
        assert_eq!(editor.state(), EditorState::Clean);
        assert!(editor.preview().is_none());
        assert_eq!(editor.page(), &sample_page());
    }

    #[test]
    fn test_render_wraps_blocks_in_chrome() {
        let editor = editor(sample_page());
        let html = editor.render();
        assert_eq!(html.matches(r#"class="draggable-block""#).count(), 2);
        assert!(html.contains(r#"<div class="text-block">Intro</div>"#));
        assert!(PageEditor::render_block(&text_block("x", "Solo", 1)).contains("Solo"));
    }
}
