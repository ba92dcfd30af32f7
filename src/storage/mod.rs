//! Storage layer for notes and folders
//!
//! Persistence is an external collaborator; this module only fixes the
//! interface and ships a process-local implementation.

pub mod memory;

use crate::error::Result;
use crate::types::{Folder, FolderId, Note, NoteId};
use async_trait::async_trait;

pub use memory::InMemoryNoteStore;

/// Note/folder store trait defining all required operations
#[async_trait]
pub trait NoteStore: Send + Sync {
    /// Create a note, optionally inside a folder
    async fn create_note(
        &self,
        title: &str,
        content: &str,
        folder_id: Option<FolderId>,
    ) -> Result<Note>;

    /// Retrieve a note by ID
    async fn get_note(&self, id: NoteId) -> Result<Note>;

    /// Change a note's title
    async fn rename_note(&self, id: NoteId, title: &str) -> Result<Note>;

    /// Replace a note's content
    async fn update_note_content(&self, id: NoteId, content: &str) -> Result<Note>;

    /// Delete a note
    async fn delete_note(&self, id: NoteId) -> Result<()>;

    /// List notes, newest update first; `folder_id` filters to one folder
    async fn list_notes(&self, folder_id: Option<FolderId>) -> Result<Vec<Note>>;

    /// Create a folder
    async fn create_folder(&self, name: &str) -> Result<Folder>;

    /// Change a folder's name
    async fn rename_folder(&self, id: FolderId, name: &str) -> Result<Folder>;

    /// Delete a folder; its notes move to the root
    async fn delete_folder(&self, id: FolderId) -> Result<()>;

    /// List folders by name
    async fn list_folders(&self) -> Result<Vec<Folder>>;
}
