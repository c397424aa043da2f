//! Repository for the multi-parent category graph.
//!
//! `parent_ids` and `children_ids` are independent adjacency sets kept
//! consistent by a single write-lock section per edge mutation. A new
//! parent edge is rejected if it would create a cycle.

use crate::error::StoreError;
use crate::models::Category;
use std::collections::{HashMap, HashSet, VecDeque};
use tokio::sync::RwLock;
use uuid::Uuid;

struct Inner {
    categories: HashMap<Uuid, Category>,
    slugs: HashMap<String, Uuid>,
}

pub struct CategoryRepository {
    inner: RwLock<Inner>,
}

impl Default for CategoryRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl CategoryRepository {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(Inner {
                categories: HashMap::new(),
                slugs: HashMap::new(),
            }),
        }
    }

    pub async fn insert(&self, category: Category) -> Result<Category, StoreError> {
        category.validate().map_err(StoreError::InvalidInput)?;
        let mut inner = self.inner.write().await;
        if inner.slugs.contains_key(&category.slug) {
            return Err(StoreError::Duplicate(format!("slug '{}'", category.slug)));
        }
        inner.slugs.insert(category.slug.clone(), category.id);
        inner.categories.insert(category.id, category.clone());
        Ok(category)
    }

    pub async fn find_by_slug(&self, slug: &str) -> Option<Category> {
        let inner = self.inner.read().await;
        inner
            .slugs
            .get(slug)
            .and_then(|id| inner.categories.get(id))
            .cloned()
    }

    pub async fn find_by_id(&self, id: Uuid) -> Option<Category> {
        self.inner.read().await.categories.get(&id).cloned()
    }

    /// Add a parent edge; both adjacency sets mutate in one lock section.
    ///
    /// Rejected when the edge would create a cycle, that is when the child
    /// is already an ancestor of the proposed parent.
    pub async fn add_parent(&self, child_slug: &str, parent_id: Uuid) -> Result<Category, StoreError> {
        let mut inner = self.inner.write().await;
        let child_id = *inner
            .slugs
            .get(child_slug)
            .ok_or_else(|| StoreError::NotFound(format!("category '{}'", child_slug)))?;
        if !inner.categories.contains_key(&parent_id) {
            return Err(StoreError::NotFound(format!("category {}", parent_id)));
        }
        if child_id == parent_id {
            return Err(StoreError::InvalidInput(
                "a category cannot be its own parent".into(),
            ));
        }
        if ancestors_locked(&inner.categories, parent_id).contains(&child_id) {
            return Err(StoreError::InvalidInput(format!(
                "adding parent {} to '{}' would create a cycle",
                parent_id, child_slug
            )));
        }

        let child = inner
            .categories
            .get_mut(&child_id)
            .ok_or_else(|| StoreError::NotFound(format!("category {}", child_id)))?;
        if !child.parent_ids.contains(&parent_id) {
            child.parent_ids.push(parent_id);
        }
        let updated = child.clone();
        if let Some(parent) = inner.categories.get_mut(&parent_id) {
            if !parent.children_ids.contains(&child_id) {
                parent.children_ids.push(child_id);
            }
        }
        Ok(updated)
    }

    /// Remove a parent edge and its inverse in one lock section
    pub async fn remove_parent(
        &self,
        child_slug: &str,
        parent_id: Uuid,
    ) -> Result<Category, StoreError> {
        let mut inner = self.inner.write().await;
        let child_id = *inner
            .slugs
            .get(child_slug)
            .ok_or_else(|| StoreError::NotFound(format!("category '{}'", child_slug)))?;

        let child = inner
            .categories
            .get_mut(&child_id)
            .ok_or_else(|| StoreError::NotFound(format!("category {}", child_id)))?;
        child.parent_ids.retain(|id| *id != parent_id);
        let updated = child.clone();

        if let Some(parent) = inner.categories.get_mut(&parent_id) {
            parent.children_ids.retain(|id| *id != child_id);
        }
        Ok(updated)
    }

    /// One hop up
    pub async fn parents_of(&self, slug: &str) -> Result<Vec<Category>, StoreError> {
        let inner = self.inner.read().await;
        let category = resolve_locked(&inner, slug)?;
        Ok(category
            .parent_ids
            .iter()
            .filter_map(|id| inner.categories.get(id))
            .cloned()
            .collect())
    }

    /// One hop down
    pub async fn children_of(&self, slug: &str) -> Result<Vec<Category>, StoreError> {
        let inner = self.inner.read().await;
        let category = resolve_locked(&inner, slug)?;
        Ok(category
            .children_ids
            .iter()
            .filter_map(|id| inner.categories.get(id))
            .cloned()
            .collect())
    }

    /// Multi-hop ancestor walk, breadth-first, deduplicated, self excluded
    pub async fn hierarchy_of(&self, slug: &str) -> Result<Vec<Category>, StoreError> {
        let inner = self.inner.read().await;
        let category = resolve_locked(&inner, slug)?;
        let ancestors = ancestors_locked(&inner.categories, category.id);
        let mut result: Vec<Category> = ancestors
            .into_iter()
            .filter_map(|id| inner.categories.get(&id))
            .cloned()
            .collect();
        result.sort_by(|a, b| a.slug.cmp(&b.slug));
        Ok(result)
    }
}

fn resolve_locked<'a>(inner: &'a Inner, slug: &str) -> Result<&'a Category, StoreError> {
    inner
        .slugs
        .get(slug)
        .and_then(|id| inner.categories.get(id))
        .ok_or_else(|| StoreError::NotFound(format!("category '{}'", slug)))
}

/// All ancestors of `start`, excluding `start` itself
fn ancestors_locked(categories: &HashMap<Uuid, Category>, start: Uuid) -> HashSet<Uuid> {
    let mut seen = HashSet::new();
    let mut queue = VecDeque::new();
    queue.push_back(start);
    while let Some(id) = queue.pop_front() {
        if let Some(category) = categories.get(&id) {
            for parent in &category.parent_ids {
                if seen.insert(*parent) {
                    queue.push_back(*parent);
                }
            }
        }
    }
    seen
}
