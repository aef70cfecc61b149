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

//! Contracts for the page store the editor saves through.

use crate::models::page::SitePage;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::Mutex;
use thiserror::Error;

/// Opaque version token handed out by the store on every successful write
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Revision(pub u64);

impl fmt::Display for Revision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "r{}", self.0)
    }
}

#[derive(Error, Debug)]
pub enum PersistenceError {
    #[error("Page '{page_id}' was changed elsewhere (expected {expected}, found {actual})")]
    Conflict {
        page_id: String,
        expected: Revision,
        actual: Revision,
    },

    #[error("Page not found: {0}")]
    NotFound(String),

    #[error(transparent)]
    Backend(#[from] anyhow::Error),
}

/// Where pages go when the editor saves or publishes them.
///
/// `expected` is `None` under last-write-wins; otherwise the store must
/// refuse the write with [`PersistenceError::Conflict`] when its current
/// revision differs.
#[async_trait]
pub trait PagePersistence: Send + Sync {
    async fn save(
        &self,
        page: &SitePage,
        expected: Option<Revision>,
    ) -> Result<Revision, PersistenceError>;

    /// Publish a page whose status is already `published`. Stores without a
    /// dedicated publish path just save it.
    async fn publish(
        &self,
        page: &SitePage,
        expected: Option<Revision>,
    ) -> Result<Revision, PersistenceError> {
        self.save(page, expected).await
    }
}

#[derive(Debug, Clone)]
struct StoredPage {
    page: SitePage,
    revision: Revision,
    published: Option<SitePage>,
}

/// Process-local store, used for dry runs and tests
#[derive(Debug, Default)]
pub struct MemoryPageStore {
    pages: Mutex<HashMap<String, StoredPage>>,
}

impl MemoryPageStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the store with a page at revision 1
    pub fn insert(&self, page: SitePage) -> Revision {
        let revision = Revision(1);
        self.lock().insert(
            page.id.clone(),
            StoredPage {
                page,
                revision,
                published: None,
            },
        );
        revision
    }

    pub fn get(&self, page_id: &str) -> Option<(SitePage, Revision)> {
        self.lock()
            .get(page_id)
            .map(|stored| (stored.page.clone(), stored.revision))
    }

    pub fn published(&self, page_id: &str) -> Option<SitePage> {
        self.lock()
            .get(page_id)
            .and_then(|stored| stored.published.clone())
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, StoredPage>> {
        // A poisoned map still holds consistent pages; every write replaces
        // a whole entry.
        self.pages.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn write(
        &self,
        page: &SitePage,
        expected: Option<Revision>,
        publish: bool,
    ) -> Result<Revision, PersistenceError> {
        let mut pages = self.lock();
        let current = pages.get(&page.id).map(|stored| stored.revision);

        if let (Some(expected), Some(actual)) = (expected, current) {
            if expected != actual {
                return Err(PersistenceError::Conflict {
                    page_id: page.id.clone(),
                    expected,
                    actual,
                });
            }
        }

        let revision = Revision(current.map(|r| r.0).unwrap_or(0) + 1);
        let published = if publish {
            Some(page.clone())
        } else {
            pages.get(&page.id).and_then(|stored| stored.published.clone())
        };
        pages.insert(
            page.id.clone(),
            StoredPage {
                page: page.clone(),
                revision,
                published,
            },
        );
        Ok(revision)
    }
}

#[async_trait]
impl PagePersistence for MemoryPageStore {
    async fn save(
        &self,
        page: &SitePage,
        expected: Option<Revision>,
    ) -> Result<Revision, PersistenceError> {
        self.write(page, expected, false)
    }

    async fn publish(
        &self,
        page: &SitePage,
        expected: Option<Revision>,
    ) -> Result<Revision, PersistenceError> {
        self.write(page, expected, true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::page::PageStatus;

    fn page() -> SitePage {
        SitePage::new("p1", "home".to_string(), "Home".to_string())
    }

    #[tokio::test]
    async fn test_save_increments_revision() {
        let store = MemoryPageStore::new();
        assert_eq!(store.insert(page()), Revision(1));

        let mut edited = page();
        edited.title = "Welcome".to_string();
        let revision = store.save(&edited, None).await.unwrap();
        assert_eq!(revision, Revision(2));

        let (stored, stored_revision) = store.get("p1").unwrap();
        assert_eq!(stored.title, "Welcome");
        assert_eq!(stored_revision, Revision(2));
    }

    #[tokio::test]
    async fn test_stale_revision_conflicts() {
        let store = MemoryPageStore::new();
        store.insert(page());
        store.save(&page(), Some(Revision(1))).await.unwrap();

        let err = store.save(&page(), Some(Revision(1))).await.unwrap_err();
        match err {
            PersistenceError::Conflict {
                expected, actual, ..
            } => {
                assert_eq!(expected, Revision(1));
                assert_eq!(actual, Revision(2));
            }
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_publish_keeps_snapshot() {
        let store = MemoryPageStore::new();
        store.insert(page());

        let mut published = page();
        published.status = PageStatus::Published;
        store.publish(&published, None).await.unwrap();

        let mut draft = published.clone();
        draft.title = "Draft edit".to_string();
        store.save(&draft, None).await.unwrap();

        assert_eq!(store.published("p1").unwrap().title, "Home");
        assert_eq!(store.get("p1").unwrap().0.title, "Draft edit");
    }

    struct SaveOnly(MemoryPageStore);

    #[async_trait]
    impl PagePersistence for SaveOnly {
        async fn save(
            &self,
            page: &SitePage,
            expected: Option<Revision>,
        ) -> Result<Revision, PersistenceError> {
            self.0.save(page, expected).await
        }
    }

    #[tokio::test]
    async fn test_default_publish_falls_back_to_save() {
        let store = SaveOnly(MemoryPageStore::new());
        let mut published = page();
        published.status = PageStatus::Published;

        let revision = store.publish(&published, None).await.unwrap();
        assert_eq!(revision, Revision(1));
        assert_eq!(store.0.get("p1").unwrap().0.status, PageStatus::Published);
        assert!(store.0.published("p1").is_none());
    }
}
