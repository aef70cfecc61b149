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

use crate::config::EditorConfig;
use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::{Arc, Mutex};

/// Small string preferences kept by the host
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>>;
    async fn set(&self, key: &str, value: &str) -> Result<()>;
    async fn remove(&self, key: &str) -> Result<()>;
}

#[derive(Debug, Default)]
pub struct MemoryKeyValueStore {
    values: Mutex<HashMap<String, String>>,
}

impl MemoryKeyValueStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, String>> {
        self.values.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[async_trait]
impl KeyValueStore for MemoryKeyValueStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.lock().get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        self.lock().insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<()> {
        self.lock().remove(key);
        Ok(())
    }
}

/// Which audience the navigation shell is showing
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoleView {
    #[default]
    Admin,
    Instructor,
    Student,
}

impl RoleView {
    pub fn as_str(&self) -> &'static str {
        match self {
            RoleView::Admin => "admin",
            RoleView::Instructor => "instructor",
            RoleView::Student => "student",
        }
    }
}

impl fmt::Display for RoleView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RoleView {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "admin" => Ok(RoleView::Admin),
            "instructor" => Ok(RoleView::Instructor),
            "student" => Ok(RoleView::Student),
            other => Err(format!("Unknown role view: {}", other)),
        }
    }
}

pub const ROLE_VIEW_KEY: &str = "role_view";

/// Services and settings shared by everything the host builds
#[derive(Clone)]
pub struct AppContext {
    preferences: Arc<dyn KeyValueStore>,
    config: EditorConfig,
}

impl AppContext {
    pub fn new(preferences: Arc<dyn KeyValueStore>, config: EditorConfig) -> Self {
        Self {
            preferences,
            config,
        }
    }

    /// Context backed by process memory only
    pub fn in_memory(config: EditorConfig) -> Self {
        Self::new(Arc::new(MemoryKeyValueStore::new()), config)
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn preferences(&self) -> &dyn KeyValueStore {
        self.preferences.as_ref()
    }

    /// Stored role view; the default when nothing usable is stored
    pub async fn role_view(&self) -> Result<RoleView> {
        let Some(stored) = self.preferences.get(ROLE_VIEW_KEY).await? else {
            return Ok(RoleView::default());
        };
        Ok(stored.parse().unwrap_or_else(|e| {
            tracing::warn!(value = %stored, "{}, using default", e);
            RoleView::default()
        }))
    }

    pub async fn set_role_view(&self, view: RoleView) -> Result<()> {
        tracing::debug!(view = %view, "Storing role view");
        self.preferences.set(ROLE_VIEW_KEY, view.as_str()).await
    }
}
