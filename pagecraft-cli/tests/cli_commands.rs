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
use clap::Parser;
use pagecraft_cli::{run, App, Cli, Config};
use pagecraft_core::models::{BlockLayout, BlockType, PageStatus};
use pagecraft_db::init_database;
use pretty_assertions::assert_eq;

async fn app() -> Result<App> {
    let pool = init_database("sqlite::memory:").await?;
    App::with_pool(Config::default(), pool)
}

async fn exec(app: &App, args: &[&str]) -> Result<String> {
    let cli = Cli::try_parse_from(std::iter::once("pagecraft").chain(args.iter().copied()))?;
    let mut out = Vec::new();
    run(cli.command, app, &mut out).await?;
    Ok(String::from_utf8(out)?)
}

#[tokio::test]
async fn test_create_and_list_pages() -> Result<()> {
    let app = app().await?;

    let output = exec(&app, &["page", "create", "About us", "--id", "about"]).await?;
    assert_eq!(output, "Created page about (/about-us)\n");

    let listing = exec(&app, &["page", "list"]).await?;
    assert_eq!(listing, "about\t/about-us\tAbout us\tdraft\tr1\t0 blocks\n");

    let duplicate = exec(&app, &["page", "create", "About", "--slug", "about-us"]).await;
    assert!(duplicate.is_err());
    Ok(())
}

#[tokio::test]
async fn test_block_editing_is_saved() -> Result<()> {
    let app = app().await?;
    exec(&app, &["page", "create", "Home", "--id", "home"]).await?;

    let output = exec(&app, &["block", "add", "home", "--type", "hero"]).await?;
    assert!(output.starts_with("Block added (r2)\nBlock id: "));
    exec(&app, &["block", "add", "home", "--content", "Welcome aboard"]).await?;
    exec(
        &app,
        &["block", "add", "home", "--type", "faq", "--content", r#"{"items": []}"#],
    )
    .await?;

    let output = exec(&app, &["block", "move-down", "home", "1"]).await?;
    assert_eq!(output, "Block moved from position 1 to 2 (r5)\n");
    exec(&app, &["block", "resize", "home", "3", "--width", "50%"]).await?;
    exec(&app, &["block", "layout", "home", "3", "grid-2"]).await?;
    exec(&app, &["block", "tags", "home", "1", "intro", " intro ", "welcome"]).await?;

    let (page, revision) = app.find_page("home").await?;
    assert_eq!(revision.0, 8);
    let types: Vec<_> = page.blocks().iter().map(|b| b.block_type()).collect();
    assert_eq!(
        types,
        vec![Some(BlockType::Text), Some(BlockType::Hero), Some(BlockType::Faq)]
    );
    let orders: Vec<u32> = page.blocks().iter().map(|b| b.order).collect();
    assert_eq!(orders, vec![1, 2, 3]);
    assert_eq!(page.blocks()[0].tags, vec!["intro", "welcome"]);
    assert_eq!(page.blocks()[2].layout, BlockLayout::Grid2);
    assert_eq!(
        page.blocks()[2].width.as_ref().map(|w| w.as_str()),
        Some("50%")
    );

    let details = exec(&app, &["page", "show", "home"]).await?;
    assert!(details.contains("[faq] layout=grid-2 width=50%"));
    assert!(details.contains("tags=intro,welcome"));
    Ok(())
}

#[tokio::test]
async fn test_noop_edits_are_not_saved() -> Result<()> {
    let app = app().await?;
    exec(&app, &["page", "create", "Home", "--id", "home"]).await?;
    exec(&app, &["block", "add", "home"]).await?;

    assert_eq!(exec(&app, &["block", "move-up", "home", "1"]).await?, "Nothing changed\n");
    assert_eq!(exec(&app, &["page", "set", "home"]).await?, "Nothing changed\n");

    let (_, revision) = app.find_page("home").await?;
    assert_eq!(revision.0, 2);
    Ok(())
}

#[tokio::test]
async fn test_unknown_block_is_rejected() -> Result<()> {
    let app = app().await?;
    exec(&app, &["page", "create", "Home", "--id", "home"]).await?;

    let err = exec(&app, &["block", "remove", "home", "7"]).await.unwrap_err();
    assert!(err.to_string().contains("Block not found"));
    Ok(())
}

#[tokio::test]
async fn test_invalid_settings_keep_the_stored_page() -> Result<()> {
    let app = app().await?;
    exec(&app, &["page", "create", "Home", "--id", "home"]).await?;

    assert!(exec(&app, &["page", "set", "home", "--title", "  "]).await.is_err());
    let output = exec(&app, &["page", "set", "home", "--title", "Welcome", "--access", "admin"]).await?;
    assert_eq!(output, "Page saved (r2)\n");

    let (page, _) = app.find_page("home").await?;
    assert_eq!(page.title, "Welcome");
    assert_eq!(page.access_type.to_string(), "admin");
    Ok(())
}

#[tokio::test]
async fn test_prompt_without_generator_fails() -> Result<()> {
    let app = app().await?;
    exec(&app, &["page", "create", "Home", "--id", "home"]).await?;

    let err = exec(&app, &["block", "add", "home", "--prompt", "An intro"])
        .await
        .unwrap_err();
    assert!(err.to_string().contains("not configured"));

    let (page, _) = app.find_page("home").await?;
    assert!(page.blocks().is_empty());
    Ok(())
}

#[tokio::test]
async fn test_publish_needs_confirmation() -> Result<()> {
    let app = app().await?;
    exec(&app, &["page", "create", "Home", "--id", "home"]).await?;
    exec(&app, &["block", "add", "home", "--type", "cta"]).await?;

    let preview = exec(&app, &["page", "publish", "home"]).await?;
    assert!(preview.starts_with("1 change: 1 added\n"));
    assert!(preview.ends_with("Not published. Run again with --yes to publish.\n"));
    let (page, _) = app.find_page("home").await?;
    assert_eq!(page.status, PageStatus::Draft);
    assert!(app.pages.latest_publication("home").await?.is_none());

    let output = exec(&app, &["page", "publish", "home", "--yes"]).await?;
    assert!(output.ends_with("Page published (r3)\n"));
    let (page, _) = app.find_page("home").await?;
    assert_eq!(page.status, PageStatus::Published);
    assert_eq!(exec(&app, &["page", "diff", "home"]).await?, "No changes\n");

    exec(&app, &["block", "add", "home", "--content", "News"]).await?;
    exec(&app, &["page", "set", "home", "--slug", "start"]).await?;
    let diff = exec(&app, &["page", "diff", "start"]).await?;
    assert!(diff.starts_with("2 changes: 1 field, 1 added\n"));
    assert!(diff.contains(r#"~ slug: "home" -> "start""#));

    let raw: serde_json::Value = serde_json::from_str(&exec(&app, &["page", "diff", "home", "--raw"]).await?)?;
    assert_eq!(raw["original"]["slug"], "home");
    assert_eq!(raw["modified"]["slug"], "start");
    Ok(())
}

#[tokio::test]
async fn test_seed_is_idempotent() -> Result<()> {
    let app = app().await?;

    assert_eq!(exec(&app, &["seed"]).await?, "Seeded 10 pages\n");
    assert_eq!(exec(&app, &["seed"]).await?, "Seeded 0 pages\n");

    let (landing, _) = app.find_page("landing").await?;
    assert_eq!(landing.blocks().len(), 7);
    let (demo, _) = app.find_page("demo-pricing").await?;
    assert_eq!(demo.blocks()[0].block_type(), Some(BlockType::Pricing));

    let html = exec(&app, &["page", "show", "landing", "--html"]).await?;
    assert!(html.contains("block-hero"));
    Ok(())
}

#[tokio::test]
async fn test_delete_page() -> Result<()> {
    let app = app().await?;
    exec(&app, &["page", "create", "Home", "--id", "home"]).await?;

    assert_eq!(exec(&app, &["page", "delete", "home"]).await?, "Deleted page home\n");
    assert!(exec(&app, &["page", "show", "home"]).await.is_err());
    Ok(())
}

#[tokio::test]
async fn test_role_view_preference() -> Result<()> {
    let app = app().await?;

    assert_eq!(exec(&app, &["view", "get"]).await?, "admin\n");
    exec(&app, &["view", "set", "student"]).await?;
    assert_eq!(exec(&app, &["view", "get"]).await?, "student\n");
    assert!(exec(&app, &["view", "set", "guest"]).await.is_err());
    Ok(())
}
