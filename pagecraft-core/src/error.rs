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

//! Error types for the page editor

use crate::insert_menu::GenerationError;
use crate::models::block::ModelError;
use crate::persistence::PersistenceError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EditorError {
    /// Input rejected before any collaborator was called
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid JSON content: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid block content: {0}")]
    Model(#[from] ModelError),

    #[error("Content generation failed: {0}")]
    Generation(#[from] GenerationError),

    #[error("Store rejected the write: {0}")]
    Persistence(#[from] PersistenceError),

    #[error("{0} already in progress")]
    Busy(&'static str),

    #[error("Invalid editor state: {0}")]
    InvalidState(String),
}

impl EditorError {
    /// True for a revision conflict reported by the store
    pub fn is_conflict(&self) -> bool {
        matches!(
            self,
            EditorError::Persistence(PersistenceError::Conflict { .. })
        )
    }
}

pub type EditorResult<T> = Result<T, EditorError>;
