use crate::error::{Result, WebUiError};
use dashmap::DashMap;
use std::any::{Any, TypeId};
use std::sync::Arc;

/// Shared business services handed to the embedded server
///
/// Entries are keyed by type and carry the name the host registered them
/// under. Instances are stored as `Arc<T>` inside an `Arc<dyn Any>`, which
/// lets trait objects (`Arc<dyn MarketService>`) be registered and resolved
/// the same way as concrete types.
#[derive(Default)]
pub struct CollaboratorRegistry {
    entries: DashMap<TypeId, Entry>,
}

#[derive(Clone)]
struct Entry {
    name: String,
    instance: Arc<dyn Any + Send + Sync>,
}

impl CollaboratorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `instance` under `name`, replacing an earlier entry of the same type
    pub fn register<T>(&mut self, name: impl Into<String>, instance: Arc<T>) -> &mut Self
    where
        T: ?Sized + Send + Sync + 'static,
    {
        let name = name.into();
        let previous = self.entries.insert(
            TypeId::of::<T>(),
            Entry {
                name: name.clone(),
                instance: Arc::new(instance),
            },
        );
        if let Some(previous) = previous {
            tracing::warn!(
                "Collaborator '{}' replaced by '{}' ({})",
                previous.name,
                name,
                std::any::type_name::<T>()
            );
        }
        self
    }

    pub fn resolve<T>(&self) -> Result<Arc<T>>
    where
        T: ?Sized + Send + Sync + 'static,
    {
        let entry = self.entries.get(&TypeId::of::<T>()).ok_or_else(|| {
            WebUiError::DependencyNotFound {
                type_name: std::any::type_name::<T>().to_string(),
            }
        })?;
        entry
            .instance
            .downcast_ref::<Arc<T>>()
            .cloned()
            .ok_or_else(|| WebUiError::DowncastFailed {
                type_name: std::any::type_name::<T>().to_string(),
            })
    }

    pub fn contains<T: ?Sized + 'static>(&self) -> bool {
        self.entries.contains_key(&TypeId::of::<T>())
    }

    /// Registered names, sorted
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.entries.iter().map(|e| e.name.clone()).collect();
        names.sort();
        names
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
