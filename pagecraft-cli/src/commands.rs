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

//! Command implementations. Every edit goes through a [`PageEditor`] and is
//! saved back through the page repository.

use crate::cli::{BlockCommands, Commands, ContentFormat, PageCommands, ViewCommands};
use crate::config::Config;
use crate::generator::HttpContentGenerator;
use anyhow::{anyhow, Context, Result};
use pagecraft_core::container::{BlockEvent, BlockList};
use pagecraft_core::diff::PreviewDialog;
use pagecraft_core::draggable::{BlockIntent, DraggableBlock};
use pagecraft_core::editor::PageEditor;
use pagecraft_core::insert_menu::{BlockSource, ContentGenerator, InsertMenu};
use pagecraft_core::models::{BlockType, PageBlock, SitePage};
use pagecraft_core::persistence::Revision;
use pagecraft_core::registry::{create_default_registry, BlockRegistry};
use pagecraft_core::render;
use pagecraft_core::utils::slug::generate_slug_from_title;
use pagecraft_core::AppContext;
use pagecraft_db::{init_database, PageRepository, PreferenceRepository};
use sqlx::SqlitePool;
use std::io::Write;
use std::sync::Arc;

/// Blocks of the page `seed` creates alongside the per-template demos
const LANDING_BLOCKS: [BlockType; 7] = [
    BlockType::Hero,
    BlockType::Features,
    BlockType::Testimonials,
    BlockType::Pricing,
    BlockType::Faq,
    BlockType::Cta,
    BlockType::Contact,
];

pub struct App {
    pub config: Config,
    pub pages: PageRepository,
    pub context: AppContext,
    generator: Option<HttpContentGenerator>,
}

impl App {
    pub async fn connect(config: Config) -> Result<Self> {
        let pool = init_database(&config.database_url).await?;
        Self::with_pool(config, pool)
    }

    pub fn with_pool(config: Config, pool: SqlitePool) -> Result<Self> {
        let generator = match config.generator.endpoint_url()? {
            Some(endpoint) => Some(HttpContentGenerator::new(
                endpoint,
                config.generator.timeout(),
            )?),
            None => None,
        };
        let context = AppContext::new(
            Arc::new(PreferenceRepository::new(pool.clone())),
            config.editor.clone(),
        );

        Ok(Self {
            pages: PageRepository::new(pool),
            context,
            generator,
            config,
        })
    }

    /// Find a page by id, then by slug
    pub async fn find_page(&self, key: &str) -> Result<(SitePage, Revision)> {
        if let Some(found) = self.pages.find_by_id(key).await? {
            return Ok(found);
        }
        self.pages
            .find_by_slug(key)
            .await?
            .ok_or_else(|| anyhow!("Page not found: {}", key))
    }

    pub async fn open_editor(&self, key: &str) -> Result<PageEditor> {
        let (page, revision) = self.find_page(key).await?;
        Ok(PageEditor::new(page, Some(revision), self.config.editor.clone()))
    }

    fn generator(&self) -> Option<&dyn ContentGenerator> {
        self.generator
            .as_ref()
            .map(|generator| generator as &dyn ContentGenerator)
    }
}

pub async fn run(command: Commands, app: &App, out: &mut dyn Write) -> Result<()> {
    match command {
        Commands::Init => {
            writeln!(out, "Database ready at {}", app.config.database_url)?;
            Ok(())
        }
        Commands::Page { command } => handle_page_command(command, app, out).await,
        Commands::Block { command } => handle_block_command(command, app, out).await,
        Commands::Seed => seed(app, out).await,
        Commands::View { command } => handle_view_command(command, app, out).await,
    }
}

async fn handle_page_command(command: PageCommands, app: &App, out: &mut dyn Write) -> Result<()> {
    match command {
        PageCommands::Create { title, slug, id } => {
            let id = id.unwrap_or_else(|| uuid::Uuid::new_v4().to_string());
            let slug = slug.unwrap_or_else(|| generate_slug_from_title(&title));
            if app.pages.find_by_slug(&slug).await?.is_some() {
                anyhow::bail!("A page with slug '{}' already exists", slug);
            }

            let page = SitePage::new(id, slug, title);
            app.pages.create(&page).await?;
            writeln!(out, "Created page {} (/{})", page.id, page.slug)?;
        }

        PageCommands::List => {
            let pages = app.pages.list().await?;
            if pages.is_empty() {
                writeln!(out, "No pages")?;
            }
            for (page, revision) in pages {
                writeln!(
                    out,
                    "{}\t/{}\t{}\t{}\t{}\t{} blocks",
                    page.id,
                    page.slug,
                    page.title,
                    page.status,
                    revision,
                    page.blocks().len()
                )?;
            }
        }

        PageCommands::Show { id, html } => {
            let (page, revision) = app.find_page(&id).await?;
            if html {
                writeln!(out, "{}", render::render_page(&page))?;
            } else {
                write_page_details(out, &page, revision)?;
            }
        }

        PageCommands::Set {
            id,
            title,
            slug,
            layout,
            meta_description,
            access,
        } => {
            let mut editor = app.open_editor(&id).await?;
            if let Some(title) = title {
                editor.set_title(title);
            }
            if let Some(slug) = slug {
                editor.set_slug(slug);
            }
            if let Some(layout) = layout {
                editor.set_layout(layout);
            }
            if let Some(meta_description) = meta_description {
                editor.set_meta_description(meta_description);
            }
            if let Some(access) = access {
                editor.set_access_type(access);
            }

            if !editor.is_dirty() {
                writeln!(out, "Nothing changed")?;
                return Ok(());
            }
            let revision = editor.save(&app.pages).await?;
            writeln!(out, "Page saved ({})", revision)?;
        }

        PageCommands::Delete { id } => {
            let (page, _) = app.find_page(&id).await?;
            app.pages.delete(&page.id).await?;
            writeln!(out, "Deleted page {}", page.id)?;
        }

        PageCommands::Diff { id, raw, html } => {
            let (page, _) = app.find_page(&id).await?;
            let dialog = PreviewDialog::new(last_published(app, &page).await?, page);
            if raw {
                writeln!(out, "{}", dialog.raw_dump()?)?;
            } else if html {
                writeln!(out, "{}", dialog.render_side_by_side())?;
            } else {
                write_changes(out, &dialog)?;
            }
        }

        PageCommands::Publish { id, yes } => {
            let mut editor = app.open_editor(&id).await?;
            let dialog =
                PreviewDialog::new(last_published(app, editor.page()).await?, editor.page().clone());
            write_changes(out, &dialog)?;

            editor.request_publish()?;
            if !yes {
                editor.cancel_publish();
                writeln!(out, "Not published. Run again with --yes to publish.")?;
                return Ok(());
            }
            let revision = editor.confirm_publish(&app.pages).await?;
            writeln!(out, "Page published ({})", revision)?;
        }
    }

    Ok(())
}

async fn handle_block_command(
    command: BlockCommands,
    app: &App,
    out: &mut dyn Write,
) -> Result<()> {
    match command {
        BlockCommands::Add {
            page,
            block_type,
            content,
            format,
            prompt,
        } => add_block(app, &page, block_type, content, format, prompt, out).await,

        BlockCommands::Remove { page, block } => {
            edit_blocks(app, &page, &block, |handle| handle.remove(), out).await
        }
        BlockCommands::Duplicate { page, block } => {
            edit_blocks(app, &page, &block, |handle| handle.duplicate(), out).await
        }
        BlockCommands::MoveUp { page, block } => {
            edit_blocks(app, &page, &block, |handle| handle.move_up(), out).await
        }
        BlockCommands::MoveDown { page, block } => {
            edit_blocks(app, &page, &block, |handle| handle.move_down(), out).await
        }
        BlockCommands::Resize {
            page,
            block,
            width,
            height,
        } => edit_blocks(app, &page, &block, |handle| handle.resize(width, height), out).await,
        BlockCommands::Layout {
            page,
            block,
            layout,
        } => edit_blocks(app, &page, &block, |handle| handle.change_layout(layout), out).await,
        BlockCommands::Tags { page, block, tags } => {
            edit_blocks(app, &page, &block, |handle| handle.set_tags(tags), out).await
        }

        BlockCommands::Reorder { page, from, to } => {
            let mut editor = app.open_editor(&page).await?;
            let from = resolve_block(&editor, &from)?;
            let to = resolve_block(&editor, &to)?;
            dispatch_and_save(app, &mut editor, BlockIntent::Reorder { from, to }, out).await
        }
    }
}

async fn add_block(
    app: &App,
    page: &str,
    block_type: BlockType,
    content: Option<String>,
    format: ContentFormat,
    prompt: Option<String>,
    out: &mut dyn Write,
) -> Result<()> {
    let mut editor = app.open_editor(page).await?;

    let source = match (content, prompt) {
        (Some(text), _) => BlockSource::Freeform {
            block_type,
            text,
            format: format.into(),
        },
        (None, Some(prompt)) => BlockSource::Generated { block_type, prompt },
        (None, None) => BlockSource::Template(block_type),
    };

    let mut menu = InsertMenu::new(Arc::new(create_default_registry()));
    menu.open();
    let payload = menu.submit(source, app.generator()).await?;

    dispatch_and_save(app, &mut editor, payload.into(), out).await
}

/// Run one block action picked from the block's toolbar
async fn edit_blocks<F>(
    app: &App,
    page: &str,
    block: &str,
    action: F,
    out: &mut dyn Write,
) -> Result<()>
where
    F: FnOnce(&DraggableBlock) -> BlockIntent,
{
    let mut editor = app.open_editor(page).await?;
    let handle = DraggableBlock::new(resolve_block(&editor, block)?);
    dispatch_and_save(app, &mut editor, action(&handle), out).await
}

async fn dispatch_and_save(
    app: &App,
    editor: &mut PageEditor,
    intent: BlockIntent,
    out: &mut dyn Write,
) -> Result<()> {
    let Some(event) = editor.dispatch(intent)? else {
        writeln!(out, "Nothing changed")?;
        return Ok(());
    };

    let revision = editor.save(&app.pages).await?;
    writeln!(out, "{} ({})", event, revision)?;
    if let Some(id) = new_block_id(&event) {
        writeln!(out, "Block id: {}", id)?;
    }
    Ok(())
}

fn new_block_id(event: &BlockEvent) -> Option<&str> {
    match event {
        BlockEvent::Inserted { id } | BlockEvent::Duplicated { id, .. } => Some(id.as_str()),
        _ => None,
    }
}

/// Accept a block id or a 1-based position
fn resolve_block(editor: &PageEditor, key: &str) -> Result<String> {
    let blocks = editor.page().blocks();
    if blocks.iter().any(|block| block.id == key) {
        return Ok(key.to_string());
    }
    key.parse::<usize>()
        .ok()
        .filter(|position| (1..=blocks.len()).contains(position))
        .map(|position| blocks[position - 1].id.clone())
        .ok_or_else(|| anyhow!("Block not found: {}", key))
}

/// The page as last published, or the page with no blocks when never published
async fn last_published(app: &App, page: &SitePage) -> Result<SitePage> {
    match app.pages.latest_publication(&page.id).await? {
        Some(publication) => Ok(publication.page),
        None => {
            let mut blank = page.clone();
            blank.content.blocks.clear();
            Ok(blank)
        }
    }
}

fn write_page_details(out: &mut dyn Write, page: &SitePage, revision: Revision) -> Result<()> {
    writeln!(out, "{} (/{})", page.title, page.slug)?;
    writeln!(
        out,
        "id: {}  status: {}  access: {}  layout: {}  revision: {}",
        page.id, page.status, page.access_type, page.layout, revision
    )?;
    if !page.meta_description.is_empty() {
        writeln!(out, "description: {}", page.meta_description)?;
    }

    if page.blocks().is_empty() {
        writeln!(out, "No blocks")?;
        return Ok(());
    }
    for (position, block) in page.blocks().iter().enumerate() {
        let mut line = format!(
            "{:>3}. {} [{}] layout={}",
            position + 1,
            block.id,
            block.type_name(),
            block.layout
        );
        if let Some(width) = &block.width {
            line.push_str(&format!(" width={}", width));
        }
        if let Some(height) = &block.height {
            line.push_str(&format!(" height={}", height));
        }
        if !block.tags.is_empty() {
            line.push_str(&format!(" tags={}", block.tags.join(",")));
        }
        writeln!(out, "{}", line)?;
    }
    Ok(())
}

fn write_changes(out: &mut dyn Write, dialog: &PreviewDialog) -> Result<()> {
    writeln!(out, "{}", dialog.summary())?;
    let changes = dialog.changes();

    for field in &changes.fields {
        writeln!(out, "  ~ {}: {:?} -> {:?}", field.field, field.old, field.new)?;
    }
    for block in &changes.added {
        writeln!(out, "  + {} [{}]", block.id, block.type_name())?;
    }
    for block in &changes.removed {
        writeln!(out, "  - {} [{}]", block.id, block.type_name())?;
    }
    for block in &changes.modified {
        writeln!(out, "  * {} [{}]", block.id, block.after.type_name())?;
    }
    for block in &changes.moved {
        writeln!(
            out,
            "  > {} moved from position {} to {}",
            block.id,
            block.from + 1,
            block.to + 1
        )?;
    }
    Ok(())
}

/// One demo page per template plus a landing page; existing pages are kept
async fn seed(app: &App, out: &mut dyn Write) -> Result<()> {
    let registry = create_default_registry();
    let mut pages = Vec::new();

    for template in registry.catalog() {
        let id = format!("demo-{}", template.block_type);
        let mut page = SitePage::new(id.clone(), id, format!("{} demo", template.label));
        page.meta_description = template.description.to_string();
        page.content.blocks = blocks_from(&registry, &[template.block_type]);
        pages.push(page);
    }

    let mut landing = SitePage::new("landing", "landing".to_string(), "Landing page".to_string());
    landing.content.blocks = blocks_from(&registry, &LANDING_BLOCKS);
    pages.push(landing);

    let mut created = 0;
    for page in pages {
        if app.pages.find_by_id(&page.id).await?.is_some() {
            tracing::debug!(page_id = %page.id, "Seed page already exists");
            continue;
        }
        app.pages
            .create(&page)
            .await
            .with_context(|| format!("Failed to seed page {}", page.id))?;
        created += 1;
    }

    writeln!(out, "Seeded {} pages", created)?;
    Ok(())
}

fn blocks_from(registry: &BlockRegistry, types: &[BlockType]) -> Vec<PageBlock> {
    let mut list = BlockList::new(Vec::new());
    for block_type in types {
        list.insert(registry.template(*block_type));
    }
    list.into_blocks()
}

async fn handle_view_command(command: ViewCommands, app: &App, out: &mut dyn Write) -> Result<()> {
    match command {
        ViewCommands::Get => {
            writeln!(out, "{}", app.context.role_view().await?)?;
        }
        ViewCommands::Set { view } => {
            app.context.set_role_view(view).await?;
            writeln!(out, "Role view set to {}", view)?;
        }
    }
    Ok(())
}
