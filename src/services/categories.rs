//! Category graph service: edge mutations and traversals

use crate::auth::Actor;
use crate::error::AppResult;
use crate::models::Category;
use crate::repositories::CategoryRepository;
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

pub struct CategoryService {
    category_repo: Arc<CategoryRepository>,
}

impl CategoryService {
    pub fn new(category_repo: Arc<CategoryRepository>) -> Self {
        Self { category_repo }
    }

    pub async fn create(&self, actor: Actor, slug: String, name: String) -> AppResult<Category> {
        actor.require_admin()?;
        let category = self.category_repo.insert(Category::new(slug, name)).await?;
        info!("Category created: {} ({})", category.slug, category.id);
        Ok(category)
    }

    pub async fn get(&self, slug: &str) -> AppResult<Category> {
        self.category_repo
            .find_by_slug(slug)
            .await
            .ok_or_else(|| crate::error::AppError::NotFound(format!("category '{}'", slug)))
    }

    pub async fn add_parent(
        &self,
        actor: Actor,
        child_slug: &str,
        parent_id: Uuid,
    ) -> AppResult<Category> {
        actor.require_admin()?;
        let updated = self.category_repo.add_parent(child_slug, parent_id).await?;
        info!("Category edge added: {} -> parent {}", child_slug, parent_id);
        Ok(updated)
    }

    pub async fn remove_parent(
        &self,
        actor: Actor,
        child_slug: &str,
        parent_id: Uuid,
    ) -> AppResult<Category> {
        actor.require_admin()?;
        let updated = self
            .category_repo
            .remove_parent(child_slug, parent_id)
            .await?;
        info!(
            "Category edge removed: {} -> parent {}",
            child_slug, parent_id
        );
        Ok(updated)
    }

    pub async fn parents(&self, slug: &str) -> AppResult<Vec<Category>> {
        Ok(self.category_repo.parents_of(slug).await?)
    }

    pub async fn children(&self, slug: &str) -> AppResult<Vec<Category>> {
        Ok(self.category_repo.children_of(slug).await?)
    }

    /// Full ancestor walk (multi-hop)
    pub async fn hierarchy(&self, slug: &str) -> AppResult<Vec<Category>> {
        Ok(self.category_repo.hierarchy_of(slug).await?)
    }
}
