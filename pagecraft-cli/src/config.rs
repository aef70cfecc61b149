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
use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use pagecraft_core::config::EditorConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use url::Url;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_database_url")]
    pub database_url: String,

    #[serde(default)]
    pub editor: EditorConfig,

    #[serde(default)]
    pub generator: GeneratorConfig,
}

/// Where `block add --prompt` sends its requests
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratorConfig {
    #[serde(default)]
    pub endpoint: Option<String>,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_url: default_database_url(),
            editor: EditorConfig::default(),
            generator: GeneratorConfig::default(),
        }
    }
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            endpoint: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl Config {
    /// Read `pagecraft.toml` (or `path`) and `PAGECRAFT_*` variables
    pub fn load(path: &Path) -> Result<Self> {
        Self::from_figment(
            Figment::new()
                .merge(Toml::file(path))
                .merge(Env::prefixed("PAGECRAFT_").split("__")),
        )
    }

    pub fn from_figment(figment: Figment) -> Result<Self> {
        let config: Config = figment.extract().context("Invalid configuration")?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.database_url.trim().is_empty() {
            anyhow::bail!("database_url cannot be empty");
        }
        if self.editor.drag_activation_distance < 0.0 {
            anyhow::bail!("editor.drag_activation_distance cannot be negative");
        }
        self.generator.endpoint_url()?;
        Ok(())
    }
}

impl GeneratorConfig {
    pub fn endpoint_url(&self) -> Result<Option<Url>> {
        let Some(endpoint) = self.endpoint.as_deref().filter(|e| !e.trim().is_empty()) else {
            return Ok(None);
        };
        let url = Url::parse(endpoint)
            .with_context(|| format!("Invalid generator endpoint: {}", endpoint))?;
        if !matches!(url.scheme(), "http" | "https") {
            anyhow::bail!("Generator endpoint must be http or https: {}", endpoint);
        }
        Ok(Some(url))
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

fn default_database_url() -> String {
    "sqlite:pagecraft.db".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}
