//! In-memory document store keyed by 24-hex ids.

use std::fmt;
use std::marker::PhantomData;

use chrono::Utc;
use parking_lot::RwLock;

use super::models::{new_object_id, Document};

/// Repository errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RepositoryError {
    #[error("Duplicate document in {collection}: {reason}")]
    Conflict {
        collection: &'static str,
        reason: String,
    },
}

/// Names the collection a repository stores `T` documents in.
///
/// Registered as a plain value (`UserModelType`, `GameModelType`, ...) and
/// injected into the matching repository.
pub struct ModelType<T> {
    collection: &'static str,
    _marker: PhantomData<fn() -> T>,
}

impl<T> ModelType<T> {
    pub const fn new(collection: &'static str) -> Self {
        Self {
            collection,
            _marker: PhantomData,
        }
    }

    pub fn collection(&self) -> &'static str {
        self.collection
    }
}

impl<T> fmt::Debug for ModelType<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ModelType").field(&self.collection).finish()
    }
}

/// Documents of one collection, in insertion order.
///
/// # Examples
///
/// ```
/// use quarry::app::models::User;
/// use quarry::app::repository::{MemoryRepository, ModelType};
///
/// let users = MemoryRepository::new(&ModelType::<User>::new("users"));
/// let stored = users.insert(User::new("hunter", "hunter@example.com"));
///
/// assert_eq!(stored.id.len(), 24);
/// assert_eq!(users.get_by_id(&stored.id), Some(stored.clone()));
/// assert_eq!(users.delete(&stored.id), Some(stored));
/// assert!(users.get().is_empty());
/// ```
pub struct MemoryRepository<T> {
    collection: &'static str,
    documents: RwLock<Vec<T>>,
}

impl<T: Document> MemoryRepository<T> {
    pub fn new(model: &ModelType<T>) -> Self {
        Self {
            collection: model.collection(),
            documents: RwLock::new(Vec::new()),
        }
    }

    pub fn collection(&self) -> &'static str {
        self.collection
    }

    /// All documents.
    pub fn get(&self) -> Vec<T> {
        self.documents.read().clone()
    }

    pub fn get_by_id(&self, id: &str) -> Option<T> {
        self.documents.read().iter().find(|d| d.id() == id).cloned()
    }

    /// Stores `document` under a fresh id and returns the stored copy.
    pub fn insert(&self, mut document: T) -> T {
        document.assign(new_object_id(), Utc::now());
        self.documents.write().push(document.clone());
        tracing::trace!(collection = self.collection, id = document.id(), "document inserted");
        document
    }

    /// Like [`insert`](Self::insert) but fails when `conflicts` matches an
    /// existing document. The check and the insert happen under one lock.
    pub fn insert_unique<F>(&self, mut document: T, conflicts: F) -> Result<T, RepositoryError>
    where
        F: Fn(&T, &T) -> Option<String>,
    {
        let mut documents = self.documents.write();
        if let Some(reason) = documents.iter().find_map(|existing| conflicts(existing, &document)) {
            return Err(RepositoryError::Conflict {
                collection: self.collection,
                reason,
            });
        }
        document.assign(new_object_id(), Utc::now());
        documents.push(document.clone());
        Ok(document)
    }

    /// Applies `change` to the document with `id`; `None` when absent.
    pub fn update<F>(&self, id: &str, change: F) -> Option<T>
    where
        F: FnOnce(&mut T),
    {
        let mut documents = self.documents.write();
        let document = documents.iter_mut().find(|d| d.id() == id)?;
        change(document);
        document.touch(Utc::now());
        Some(document.clone())
    }

    /// Removes and returns the document with `id`.
    pub fn delete(&self, id: &str) -> Option<T> {
        let mut documents = self.documents.write();
        let position = documents.iter().position(|d| d.id() == id)?;
        Some(documents.remove(position))
    }

    pub fn len(&self) -> usize {
        self.documents.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.read().is_empty()
    }
}

impl<T> fmt::Debug for MemoryRepository<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoryRepository")
            .field("collection", &self.collection)
            .field("documents", &self.documents.read().len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::models::User;

    fn users() -> MemoryRepository<User> {
        MemoryRepository::new(&ModelType::new("users"))
    }

    #[test]
    fn test_update_touches_timestamp() {
        let repo = users();
        let stored = repo.insert(User::new("alice", "alice@example.com"));

        let updated = repo
            .update(&stored.id, |u| u.email = "new@example.com".to_string())
            .unwrap();

        assert_eq!(updated.email, "new@example.com");
        assert!(updated.updated_at >= stored.updated_at);
        assert_eq!(updated.created_at, stored.created_at);
        assert!(repo.update("000000000000000000000000", |_| {}).is_none());
    }

    #[test]
    fn test_insert_unique_rejects_conflicts() {
        let repo = users();
        let same_name = |a: &User, b: &User| (a.username == b.username).then(|| "username".to_string());

        repo.insert_unique(User::new("alice", "a@example.com"), same_name).unwrap();
        let err = repo
            .insert_unique(User::new("alice", "b@example.com"), same_name)
            .unwrap_err();

        assert_eq!(
            err,
            RepositoryError::Conflict {
                collection: "users",
                reason: "username".to_string()
            }
        );
        assert_eq!(repo.len(), 1);
    }

    #[test]
    fn test_get_preserves_insertion_order() {
        let repo = users();
        let a = repo.insert(User::new("a", "a@example.com"));
        let b = repo.insert(User::new("b", "b@example.com"));

        let all = repo.get();
        assert_eq!(all.iter().map(|u| u.id.clone()).collect::<Vec<_>>(), vec![a.id, b.id]);
    }
}
