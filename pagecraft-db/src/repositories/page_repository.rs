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

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use pagecraft_core::models::{AccessType, PageBlock, PageContent, PageStatus, SitePage};
use pagecraft_core::persistence::{PagePersistence, PersistenceError, Revision};
use sqlx::SqlitePool;

type PageRow = (
    String,
    String,
    String,
    String,
    String,
    String,
    String,
    String,
    i64,
);

const PAGE_COLUMNS: &str =
    "id, title, slug, layout, status, access_type, meta_description, blocks_json, revision";

fn parse_page_row(row: PageRow) -> Result<(SitePage, Revision)> {
    let (id, title, slug, layout, status, access_type, meta_description, blocks_json, revision) =
        row;

    let status: PageStatus = status.parse().map_err(|e: String| anyhow::anyhow!(e))?;
    let access_type: AccessType = access_type
        .parse()
        .map_err(|e: String| anyhow::anyhow!(e))?;
    let blocks: Vec<PageBlock> = serde_json::from_str(&blocks_json)
        .with_context(|| format!("Failed to parse blocks of page {}", id))?;

    let page = SitePage {
        id,
        title,
        slug,
        layout,
        status,
        access_type,
        meta_description,
        content: PageContent { blocks },
    };
    Ok((page, Revision(revision as u64)))
}

fn parse_timestamp(value: &str) -> Result<DateTime<Utc>> {
    if value.contains('T') {
        Ok(DateTime::parse_from_rfc3339(value)
            .context("Failed to parse timestamp as RFC3339")?
            .with_timezone(&Utc))
    } else {
        Ok(
            chrono::NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S")
                .context("Failed to parse timestamp as SQLite format")?
                .and_utc(),
        )
    }
}

/// A published snapshot of a page
#[derive(Debug, Clone, PartialEq)]
pub struct PagePublication {
    pub page_id: String,
    pub number: i64,
    pub revision: Revision,
    pub page: SitePage,
    pub published_at: DateTime<Utc>,
}

#[derive(Clone)]
pub struct PageRepository {
    pool: SqlitePool,
}

impl PageRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, page: &SitePage) -> Result<Revision> {
        page.is_valid()
            .map_err(|e| anyhow::anyhow!("Invalid page: {}", e))?;

        let blocks_json =
            serde_json::to_string(&page.content.blocks).context("Failed to serialize blocks")?;

        sqlx::query(
            r#"
            INSERT INTO pages (id, title, slug, layout, status, access_type, meta_description, blocks_json, revision)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, 1)
            "#,
        )
        .bind(&page.id)
        .bind(&page.title)
        .bind(&page.slug)
        .bind(&page.layout)
        .bind(page.status.to_string())
        .bind(page.access_type.to_string())
        .bind(&page.meta_description)
        .bind(&blocks_json)
        .execute(&self.pool)
        .await
        .context("Failed to create page")?;

        tracing::info!(page_id = %page.id, "Page created");
        Ok(Revision(1))
    }

    pub async fn find_by_id(&self, id: &str) -> Result<Option<(SitePage, Revision)>> {
        let row = sqlx::query_as::<_, PageRow>(&format!(
            "SELECT {} FROM pages WHERE id = ?",
            PAGE_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to find page by id")?;

        row.map(parse_page_row).transpose()
    }

    pub async fn find_by_slug(&self, slug: &str) -> Result<Option<(SitePage, Revision)>> {
        let row = sqlx::query_as::<_, PageRow>(&format!(
            "SELECT {} FROM pages WHERE slug = ? ORDER BY created_at LIMIT 1",
            PAGE_COLUMNS
        ))
        .bind(slug)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to find page by slug")?;

        row.map(parse_page_row).transpose()
    }

    pub async fn list(&self) -> Result<Vec<(SitePage, Revision)>> {
        let rows = sqlx::query_as::<_, PageRow>(&format!(
            "SELECT {} FROM pages ORDER BY slug, id",
            PAGE_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await
        .context("Failed to list pages")?;

        rows.into_iter().map(parse_page_row).collect()
    }

    /// Delete a page with its publications; false when it did not exist
    pub async fn delete(&self, id: &str) -> Result<bool> {
        let mut tx = self
            .pool
            .begin()
            .await
            .context("Failed to start transaction")?;

        sqlx::query("DELETE FROM page_publications WHERE page_id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await
            .context("Failed to delete page publications")?;

        let result = sqlx::query("DELETE FROM pages WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await
            .context("Failed to delete page")?;

        tx.commit().await.context("Failed to commit transaction")?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn latest_publication(&self, page_id: &str) -> Result<Option<PagePublication>> {
        Ok(self.list_publications(page_id).await?.into_iter().next())
    }

    /// Publications of a page, newest first
    pub async fn list_publications(&self, page_id: &str) -> Result<Vec<PagePublication>> {
        let rows = sqlx::query_as::<_, (String, i64, i64, String, String)>(
            r#"
            SELECT page_id, publication_number, revision, page_json, published_at
            FROM page_publications
            WHERE page_id = ?
            ORDER BY publication_number DESC
            "#,
        )
        .bind(page_id)
        .fetch_all(&self.pool)
        .await
        .context("Failed to list page publications")?;

        let mut publications = Vec::with_capacity(rows.len());
        for (page_id, number, revision, page_json, published_at) in rows {
            let page: SitePage = serde_json::from_str(&page_json)
                .context("Failed to parse published page snapshot")?;
            publications.push(PagePublication {
                page_id,
                number,
                revision: Revision(revision as u64),
                page,
                published_at: parse_timestamp(&published_at)?,
            });
        }
        Ok(publications)
    }

    async fn write(
        &self,
        page: &SitePage,
        expected: Option<Revision>,
        publish: bool,
    ) -> std::result::Result<Revision, PersistenceError> {
        let blocks_json =
            serde_json::to_string(&page.content.blocks).context("Failed to serialize blocks")?;

        let mut tx = self
            .pool
            .begin()
            .await
            .context("Failed to start transaction")?;

        let current: Option<(i64,)> = sqlx::query_as("SELECT revision FROM pages WHERE id = ?")
            .bind(&page.id)
            .fetch_optional(&mut *tx)
            .await
            .context("Failed to read page revision")?;
        let current = current.map(|(r,)| Revision(r as u64));

        let revision = match (current, expected) {
            (Some(actual), Some(expected)) if actual != expected => {
                tracing::warn!(page_id = %page.id, %expected, %actual, "Rejecting stale write");
                return Err(PersistenceError::Conflict {
                    page_id: page.id.clone(),
                    expected,
                    actual,
                });
            }
            (None, Some(_)) => return Err(PersistenceError::NotFound(page.id.clone())),
            (Some(actual), _) => {
                let next = Revision(actual.0 + 1);
                let result = sqlx::query(
                    r#"
                    UPDATE pages
                    SET title = ?, slug = ?, layout = ?, status = ?, access_type = ?,
                        meta_description = ?, blocks_json = ?, revision = ?, updated_at = datetime('now')
                    WHERE id = ? AND revision = ?
                    "#,
                )
                .bind(&page.title)
                .bind(&page.slug)
                .bind(&page.layout)
                .bind(page.status.to_string())
                .bind(page.access_type.to_string())
                .bind(&page.meta_description)
                .bind(&blocks_json)
                .bind(next.0 as i64)
                .bind(&page.id)
                .bind(actual.0 as i64)
                .execute(&mut *tx)
                .await
                .context("Failed to update page")?;

                if result.rows_affected() == 0 {
                    return Err(PersistenceError::Backend(anyhow::anyhow!(
                        "Page {} changed during the write",
                        page.id
                    )));
                }
                next
            }
            (None, None) => {
                sqlx::query(
                    r#"
                    INSERT INTO pages (id, title, slug, layout, status, access_type, meta_description, blocks_json, revision)
                    VALUES (?, ?, ?, ?, ?, ?, ?, ?, 1)
                    "#,
                )
                .bind(&page.id)
                .bind(&page.title)
                .bind(&page.slug)
                .bind(&page.layout)
                .bind(page.status.to_string())
                .bind(page.access_type.to_string())
                .bind(&page.meta_description)
                .bind(&blocks_json)
                .execute(&mut *tx)
                .await
                .context("Failed to insert page")?;
                Revision(1)
            }
        };

        if publish {
            let page_json =
                serde_json::to_string(page).context("Failed to serialize page snapshot")?;
            sqlx::query(
                r#"
                INSERT INTO page_publications (page_id, publication_number, revision, page_json)
                VALUES (
                    ?,
                    (SELECT COALESCE(MAX(publication_number), 0) + 1 FROM page_publications WHERE page_id = ?),
                    ?,
                    ?
                )
                "#,
            )
            .bind(&page.id)
            .bind(&page.id)
            .bind(revision.0 as i64)
            .bind(&page_json)
            .execute(&mut *tx)
            .await
            .context("Failed to record publication")?;
        }

        tx.commit().await.context("Failed to commit transaction")?;
        tracing::info!(page_id = %page.id, %revision, publish, "Page written");
        Ok(revision)
    }
}

#[async_trait]
impl PagePersistence for PageRepository {
    async fn save(
        &self,
        page: &SitePage,
        expected: Option<Revision>,
    ) -> std::result::Result<Revision, PersistenceError> {
        self.write(page, expected, false).await
    }

    async fn publish(
        &self,
        page: &SitePage,
        expected: Option<Revision>,
    ) -> std::result::Result<Revision, PersistenceError> {
        self.write(page, expected, true).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::init::run_migrations;
    use pagecraft_core::models::BlockContent;
    use pretty_assertions::assert_eq;
    use sqlx::sqlite::SqlitePoolOptions;

    async fn setup_test_db() -> Result<SqlitePool> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await?;
        run_migrations(&pool).await?;
        Ok(pool)
    }

    fn sample_page() -> SitePage {
        let mut page = SitePage::new("p1", "courses".to_string(), "Courses".to_string());
        let mut block = PageBlock::new("b1", BlockContent::Text("Intro".to_string()));
        block.order = 1;
        block.tags = vec!["intro".to_string()];
        page.content.blocks.push(block);
        page.meta_description = "All courses".to_string();
        page
    }

    #[tokio::test]
    async fn test_create_and_find() -> Result<()> {
        let repo = PageRepository::new(setup_test_db().await?);
        assert_eq!(repo.create(&sample_page()).await?, Revision(1));

        let (page, revision) = repo.find_by_id("p1").await?.unwrap();
        assert_eq!(page, sample_page());
        assert_eq!(revision, Revision(1));
        assert!(repo.find_by_id("missing").await?.is_none());
        assert_eq!(repo.find_by_slug("courses").await?.unwrap().0.id, "p1");
        Ok(())
    }

    #[tokio::test]
    async fn test_create_rejects_invalid_page() -> Result<()> {
        let repo = PageRepository::new(setup_test_db().await?);
        let mut page = sample_page();
        page.title = String::new();
        assert!(repo.create(&page).await.is_err());
        assert!(repo.list().await?.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_save_bumps_revision() -> Result<()> {
        let repo = PageRepository::new(setup_test_db().await?);
        repo.create(&sample_page()).await?;

        let mut page = sample_page();
        page.title = "Catalogue".to_string();
        let revision = repo.save(&page, Some(Revision(1))).await?;
        assert_eq!(revision, Revision(2));

        let (stored, stored_revision) = repo.find_by_id("p1").await?.unwrap();
        assert_eq!(stored.title, "Catalogue");
        assert_eq!(stored_revision, Revision(2));
        Ok(())
    }

    #[tokio::test]
    async fn test_stale_save_conflicts() -> Result<()> {
        let repo = PageRepository::new(setup_test_db().await?);
        repo.create(&sample_page()).await?;
        repo.save(&sample_page(), None).await?;

        let err = repo.save(&sample_page(), Some(Revision(1))).await.unwrap_err();
        assert!(matches!(
            err,
            PersistenceError::Conflict {
                expected: Revision(1),
                actual: Revision(2),
                ..
            }
        ));
        Ok(())
    }

    #[tokio::test]
    async fn test_save_without_revision_upserts() -> Result<()> {
        let repo = PageRepository::new(setup_test_db().await?);
        assert_eq!(repo.save(&sample_page(), None).await?, Revision(1));
        assert!(matches!(
            repo.save(
                &SitePage::new("ghost", "ghost".to_string(), "Ghost".to_string()),
                Some(Revision(3))
            )
            .await,
            Err(PersistenceError::NotFound(_))
        ));
        Ok(())
    }

    #[tokio::test]
    async fn test_publish_records_numbered_snapshots() -> Result<()> {
        let repo = PageRepository::new(setup_test_db().await?);
        repo.create(&sample_page()).await?;
        assert!(repo.latest_publication("p1").await?.is_none());

        let mut page = sample_page();
        page.status = PageStatus::Published;
        repo.publish(&page, None).await?;
        page.title = "Catalogue".to_string();
        repo.publish(&page, None).await?;

        let latest = repo.latest_publication("p1").await?.unwrap();
        assert_eq!(latest.number, 2);
        assert_eq!(latest.revision, Revision(3));
        assert_eq!(latest.page.title, "Catalogue");
        assert_eq!(repo.list_publications("p1").await?.len(), 2);
        Ok(())
    }

    #[tokio::test]
    async fn test_delete_removes_publications() -> Result<()> {
        let repo = PageRepository::new(setup_test_db().await?);
        repo.create(&sample_page()).await?;
        repo.publish(&sample_page(), None).await?;

        assert!(repo.delete("p1").await?);
        assert!(!repo.delete("p1").await?);
        assert!(repo.find_by_id("p1").await?.is_none());
        assert!(repo.list_publications("p1").await?.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_list_orders_by_slug() -> Result<()> {
        let repo = PageRepository::new(setup_test_db().await?);
        repo.create(&SitePage::new("2", "zeta".to_string(), "Zeta".to_string()))
            .await?;
        repo.create(&SitePage::new("1", "alpha".to_string(), "Alpha".to_string()))
            .await?;

        let slugs: Vec<String> = repo.list().await?.into_iter().map(|(p, _)| p.slug).collect();
        assert_eq!(slugs, vec!["alpha", "zeta"]);
        Ok(())
    }

    #[test]
    fn test_parse_timestamp_formats() -> Result<()> {
        assert_eq!(
            parse_timestamp("2025-03-01 10:00:00")?,
            parse_timestamp("2025-03-01T10:00:00Z")?
        );
        assert!(parse_timestamp("yesterday").is_err());
        Ok(())
    }
}
