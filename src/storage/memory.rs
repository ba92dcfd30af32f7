//! Process-local note store

use super::NoteStore;
use crate::error::{NotewiseError, Result};
use crate::types::{Folder, FolderId, Note, NoteId};
use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::debug;

/// Note store held entirely in memory.
///
/// Operations touching both maps lock `folders` before `notes`.
#[derive(Default)]
pub struct InMemoryNoteStore {
    notes: RwLock<HashMap<NoteId, Note>>,
    folders: RwLock<HashMap<FolderId, Folder>>,
}

impl InMemoryNoteStore {
    pub fn new() -> Self {
        Self::default()
    }

    async fn modify_note<F>(&self, id: NoteId, change: F) -> Result<Note>
    where
        F: FnOnce(&mut Note) + Send,
    {
        let mut notes = self.notes.write().await;
        let note = notes
            .get_mut(&id)
            .ok_or_else(|| NotewiseError::NotFound(format!("note {}", id)))?;
        change(note);
        note.updated_at = Utc::now();
        Ok(note.clone())
    }
}

fn require_name(field: &str, value: &str) -> Result<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(NotewiseError::invalid(field, "must not be empty"));
    }
    Ok(trimmed.to_string())
}

#[async_trait]
impl NoteStore for InMemoryNoteStore {
    async fn create_note(
        &self,
        title: &str,
        content: &str,
        folder_id: Option<FolderId>,
    ) -> Result<Note> {
        let title = require_name("title", title)?;

        // Held until the note is in, so the folder cannot vanish meanwhile
        let folders = self.folders.read().await;
        if let Some(folder_id) = folder_id {
            if !folders.contains_key(&folder_id) {
                return Err(NotewiseError::NotFound(format!("folder {}", folder_id)));
            }
        }

        let now = Utc::now();
        let note = Note {
            id: NoteId::new(),
            folder_id,
            title,
            content: content.to_string(),
            created_at: now,
            updated_at: now,
        };
        debug!("Created note {}", note.id);
        self.notes.write().await.insert(note.id, note.clone());
        drop(folders);
        Ok(note)
    }

    async fn get_note(&self, id: NoteId) -> Result<Note> {
        self.notes
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or_else(|| NotewiseError::NotFound(format!("note {}", id)))
    }

    async fn rename_note(&self, id: NoteId, title: &str) -> Result<Note> {
        let title = require_name("title", title)?;
        self.modify_note(id, move |note| note.title = title).await
    }

    async fn update_note_content(&self, id: NoteId, content: &str) -> Result<Note> {
        let content = content.to_string();
        self.modify_note(id, move |note| note.content = content)
            .await
    }

    async fn delete_note(&self, id: NoteId) -> Result<()> {
        self.notes
            .write()
            .await
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| NotewiseError::NotFound(format!("note {}", id)))
    }

    async fn list_notes(&self, folder_id: Option<FolderId>) -> Result<Vec<Note>> {
        let notes = self.notes.read().await;
        let mut listed: Vec<Note> = notes
            .values()
            .filter(|note| folder_id.is_none() || note.folder_id == folder_id)
            .cloned()
            .collect();
        listed.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        Ok(listed)
    }

    async fn create_folder(&self, name: &str) -> Result<Folder> {
        let folder = Folder {
            id: FolderId::new(),
            name: require_name("name", name)?,
            created_at: Utc::now(),
        };
        self.folders.write().await.insert(folder.id, folder.clone());
        Ok(folder)
    }

    async fn rename_folder(&self, id: FolderId, name: &str) -> Result<Folder> {
        let name = require_name("name", name)?;
        let mut folders = self.folders.write().await;
        let folder = folders
            .get_mut(&id)
            .ok_or_else(|| NotewiseError::NotFound(format!("folder {}", id)))?;
        folder.name = name;
        Ok(folder.clone())
    }

    async fn delete_folder(&self, id: FolderId) -> Result<()> {
        let mut folders = self.folders.write().await;
        folders
            .remove(&id)
            .ok_or_else(|| NotewiseError::NotFound(format!("folder {}", id)))?;

        let mut notes = self.notes.write().await;
        for note in notes.values_mut().filter(|n| n.folder_id == Some(id)) {
            note.folder_id = None;
        }
        Ok(())
    }

    async fn list_folders(&self) -> Result<Vec<Folder>> {
        let mut folders: Vec<Folder> = self.folders.read().await.values().cloned().collect();
        folders.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(folders)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_note_lifecycle() {
        let store = InMemoryNoteStore::new();

        let note = store.create_note("Biology", "cells", None).await.unwrap();
        assert_eq!(store.get_note(note.id).await.unwrap().content, "cells");

        let renamed = store.rename_note(note.id, "  Bio 101 ").await.unwrap();
        assert_eq!(renamed.title, "Bio 101");

        let updated = store
            .update_note_content(note.id, "mitochondria")
            .await
            .unwrap();
        assert_eq!(updated.content, "mitochondria");
        assert!(updated.updated_at >= note.updated_at);

        store.delete_note(note.id).await.unwrap();
        assert!(matches!(
            store.get_note(note.id).await,
            Err(NotewiseError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_empty_title_rejected() {
        let store = InMemoryNoteStore::new();
        assert!(matches!(
            store.create_note("  ", "x", None).await,
            Err(NotewiseError::InvalidRequest { .. })
        ));
    }

    #[tokio::test]
    async fn test_note_in_unknown_folder_rejected() {
        let store = InMemoryNoteStore::new();
        assert!(matches!(
            store.create_note("t", "x", Some(FolderId::new())).await,
            Err(NotewiseError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_folder_delete_moves_notes_to_root() {
        let store = InMemoryNoteStore::new();
        let folder = store.create_folder("Chemistry").await.unwrap();
        let note = store
            .create_note("Bonds", "ionic", Some(folder.id))
            .await
            .unwrap();
        assert_eq!(store.list_notes(Some(folder.id)).await.unwrap().len(), 1);

        store.delete_folder(folder.id).await.unwrap();
        assert!(store.list_folders().await.unwrap().is_empty());
        assert_eq!(store.get_note(note.id).await.unwrap().folder_id, None);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_folder_delete_never_orphans_notes() {
        let store = std::sync::Arc::new(InMemoryNoteStore::new());

        for _ in 0..50 {
            let folder = store.create_folder("Physics").await.unwrap();

            let creator = {
                let store = store.clone();
                tokio::spawn(async move { store.create_note("Waves", "", Some(folder.id)).await })
            };
            let deleter = {
                let store = store.clone();
                tokio::spawn(async move { store.delete_folder(folder.id).await })
            };

            deleter.await.unwrap().unwrap();
            if let Ok(note) = creator.await.unwrap() {
                assert_eq!(store.get_note(note.id).await.unwrap().folder_id, None);
            }
        }
    }

    #[tokio::test]
    async fn test_folders_listed_by_name() {
        let store = InMemoryNoteStore::new();
        store.create_folder("b").await.unwrap();
        let a = store.create_folder("c").await.unwrap();
        store.rename_folder(a.id, "a").await.unwrap();

        let names: Vec<String> = store
            .list_folders()
            .await
            .unwrap()
            .into_iter()
            .map(|f| f.name)
            .collect();
        assert_eq!(names, vec!["a", "b"]);
    }
}
