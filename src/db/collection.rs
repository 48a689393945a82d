//! Whole-document storage primitives.
//!
//! A [`Collection`] is a JSON array under one key; a [`Singleton`] is a single JSON
//! object under one key. Mutations are read-modify-write of the whole value with no
//! version check: concurrent writers to the same key race and the last write wins.

use std::marker::PhantomData;
use std::sync::Arc;

use serde::{de::DeserializeOwned, Serialize};

use crate::errors::AppError;
use crate::models::Record;
use crate::store::DocumentStore;

/// An array of records stored under a single key.
pub struct Collection<T> {
    store: Arc<dyn DocumentStore>,
    key: String,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Collection<T>
where
    T: Record + Serialize + DeserializeOwned,
{
    pub fn new(store: Arc<dyn DocumentStore>, key: impl Into<String>) -> Self {
        Self {
            store,
            key: key.into(),
            _marker: PhantomData,
        }
    }

    /// Read the collection for a mutation. Absent key is an empty collection.
    pub async fn load(&self) -> Result<Vec<T>, AppError> {
        match self.store.get(&self.key).await? {
            None => Ok(Vec::new()),
            Some(value) => Ok(serde_json::from_value(value)?),
        }
    }

    /// Write the whole collection back.
    pub async fn save(&self, items: &[T]) -> Result<(), AppError> {
        let value = serde_json::to_value(items)?;
        self.store.set(&self.key, &value).await?;
        Ok(())
    }

    /// Read for display. Never fails: store or decode errors yield an empty list.
    pub async fn list_all(&self) -> Vec<T> {
        match self.load().await {
            Ok(items) => items,
            Err(e) => {
                tracing::warn!("Falling back to empty {}: {}", self.key, e);
                Vec::new()
            }
        }
    }

    /// Seed `defaults` when the key is absent or holds an empty collection.
    /// Returns whether anything was written.
    pub async fn initialize_defaults(&self, defaults: &[T]) -> Result<bool, AppError> {
        if !self.load().await?.is_empty() {
            return Ok(false);
        }
        self.save(defaults).await?;
        tracing::info!("Seeded {} with {} default records", self.key, defaults.len());
        Ok(true)
    }

    /// Remove the record with `id`. The collection is written back even when
    /// nothing matched. Returns whether a record was removed.
    pub async fn remove(&self, id: &str) -> Result<bool, AppError> {
        let mut items = self.load().await?;
        let before = items.len();
        items.retain(|item| item.id() != id);
        let removed = items.len() != before;
        self.save(&items).await?;
        Ok(removed)
    }
}

/// Position of the record with `id`, or a not-found error naming `what`.
pub fn position_of<T: Record>(items: &[T], id: &str, what: &str) -> Result<usize, AppError> {
    items
        .iter()
        .position(|item| item.id() == id)
        .ok_or_else(|| AppError::NotFound(format!("{} {} not found", what, id)))
}

/// A single object stored under one key.
pub struct Singleton<T> {
    store: Arc<dyn DocumentStore>,
    key: String,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Singleton<T>
where
    T: Serialize + DeserializeOwned,
{
    pub fn new(store: Arc<dyn DocumentStore>, key: impl Into<String>) -> Self {
        Self {
            store,
            key: key.into(),
            _marker: PhantomData,
        }
    }

    pub async fn get(&self) -> Result<Option<T>, AppError> {
        match self.store.get(&self.key).await? {
            None => Ok(None),
            Some(value) => Ok(Some(serde_json::from_value(value)?)),
        }
    }

    /// Read for display; absent or unreadable values yield `fallback`.
    pub async fn get_or(&self, fallback: T) -> T {
        match self.get().await {
            Ok(Some(value)) => value,
            Ok(None) => fallback,
            Err(e) => {
                tracing::warn!("Falling back to preset {}: {}", self.key, e);
                fallback
            }
        }
    }

    pub async fn set(&self, value: &T) -> Result<(), AppError> {
        let value = serde_json::to_value(value)?;
        self.store.set(&self.key, &value).await?;
        Ok(())
    }

    /// Write `default` only if the key is absent.
    pub async fn initialize(&self, default: &T) -> Result<bool, AppError> {
        if self.get().await?.is_some() {
            return Ok(false);
        }
        self.set(default).await?;
        tracing::info!("Seeded {}", self.key);
        Ok(true)
    }
}
