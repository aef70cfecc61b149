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

use serde::{Deserialize, Serialize};

/// How saves interact with the store's revision counter
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WritePolicy {
    /// Never send the expected revision; the last save wins
    #[default]
    LastWriteWins,
    /// Send the revision the editor loaded; the store answers with a
    /// conflict when someone else saved in between
    CheckRevision,
}

/// Editor behaviour knobs, embedded in the host application's configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EditorConfig {
    /// Pointer travel (in pixels) before a press turns into a drag
    #[serde(default = "default_drag_activation_distance")]
    pub drag_activation_distance: f64,

    #[serde(default)]
    pub write_policy: WritePolicy,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            drag_activation_distance: default_drag_activation_distance(),
            write_policy: WritePolicy::default(),
        }
    }
}

fn default_drag_activation_distance() -> f64 {
    8.0
}
