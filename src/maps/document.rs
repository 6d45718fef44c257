use serde::Serialize;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use thiserror::Error;

static NEXT_BINDING_ID: AtomicU64 = AtomicU64::new(1);

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum HeadTagKind {
    Script,
    Stylesheet,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HeadTag {
    pub id: String,
    pub kind: HeadTagKind,
    pub src: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum BindError {
    #[error("the map container does not exist")]
    Missing,
    #[error("another map instance is bound to the container")]
    Occupied,
}

/// The page every map is rendered into: the shared `<head>` and the map containers.
#[derive(Default)]
pub struct Document {
    inner: Mutex<DocumentInner>,
}

#[derive(Default)]
struct DocumentInner {
    head: Vec<HeadTag>,
    /// Container id to the id of the binding that currently owns it, if any.
    containers: HashMap<String, Option<u64>>,
}

impl Document {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    fn inner(&self) -> MutexGuard<'_, DocumentInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Adds the tag unless a tag with the same id is already present.
    pub fn inject_once(&self, tag: HeadTag) -> bool {
        let mut inner = self.inner();
        if inner.head.iter().any(|existing| existing.id == tag.id) {
            return false;
        }
        tracing::debug!(tag_id = %tag.id, src = %tag.src, "Injected a head tag.");
        inner.head.push(tag);
        true
    }

    #[cfg(test)]
    pub fn head_tags(&self) -> Vec<HeadTag> {
        self.inner().head.clone()
    }

    pub fn add_container(&self, container_id: &str) {
        self.inner()
            .containers
            .entry(container_id.to_string())
            .or_insert(None);
    }

    pub fn remove_container(&self, container_id: &str) {
        self.inner().containers.remove(container_id);
    }

    #[cfg(test)]
    pub fn has_container(&self, container_id: &str) -> bool {
        self.inner().containers.contains_key(container_id)
    }

    #[cfg(test)]
    pub fn is_bound(&self, container_id: &str) -> bool {
        matches!(self.inner().containers.get(container_id), Some(Some(_)))
    }

    pub fn bound_containers(&self) -> usize {
        self.inner()
            .containers
            .values()
            .filter(|binding| binding.is_some())
            .count()
    }

    pub fn bind(self: &Arc<Self>, container_id: &str) -> Result<ContainerLease, BindError> {
        let mut inner = self.inner();
        let binding = inner
            .containers
            .get_mut(container_id)
            .ok_or(BindError::Missing)?;
        if binding.is_some() {
            return Err(BindError::Occupied);
        }
        let binding_id = NEXT_BINDING_ID.fetch_add(1, Ordering::Relaxed);
        *binding = Some(binding_id);
        Ok(ContainerLease {
            document: Arc::clone(self),
            container_id: container_id.to_string(),
            binding_id,
        })
    }

    fn release(&self, container_id: &str, binding_id: u64) {
        let mut inner = self.inner();
        if let Some(binding) = inner.containers.get_mut(container_id) {
            if *binding == Some(binding_id) {
                *binding = None;
            }
        }
    }
}

/// Exclusive claim on a map container. The container is freed when the lease is dropped.
pub struct ContainerLease {
    document: Arc<Document>,
    container_id: String,
    binding_id: u64,
}

impl Drop for ContainerLease {
    fn drop(&mut self) {
        self.document.release(&self.container_id, self.binding_id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn script(id: &str) -> HeadTag {
        HeadTag {
            id: id.to_string(),
            kind: HeadTagKind::Script,
            src: String::from("https://unpkg.com/leaflet.js"),
        }
    }

    #[test]
    fn tags_are_injected_once_per_id() {
        let document = Document::new();
        assert!(document.inject_once(script("leaflet-js")));
        assert!(!document.inject_once(script("leaflet-js")));
        assert_eq!(document.head_tags().len(), 1);
    }

    #[test]
    fn container_can_only_be_bound_once() {
        let document = Document::new();
        document.add_container("map");
        let lease = document.bind("map").expect("Fresh container must bind.");
        assert_eq!(document.bind("map").err(), Some(BindError::Occupied));
        drop(lease);
        assert!(!document.is_bound("map"));
        assert!(document.bind("map").is_ok());
    }

    #[test]
    fn missing_container_cannot_be_bound() {
        let document = Document::new();
        assert_eq!(document.bind("nowhere").err(), Some(BindError::Missing));
    }

    #[test]
    fn stale_lease_does_not_free_a_recreated_container() {
        let document = Document::new();
        document.add_container("map");
        let stale = document.bind("map").unwrap();
        document.remove_container("map");
        document.add_container("map");
        let fresh = document.bind("map").unwrap();
        drop(stale);
        assert!(document.is_bound("map"));
        drop(fresh);
        assert_eq!(document.bound_containers(), 0);
    }
}
