use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Category node in the multi-parent category graph.
///
/// `parent_ids` and `children_ids` are two independently stored adjacency
/// sets; the store keeps them consistent within a single edge mutation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: Uuid,
    pub slug: String,
    pub name: String,
    pub parent_ids: Vec<Uuid>,
    pub children_ids: Vec<Uuid>,
    pub created_at: NaiveDateTime,
}

impl Category {
    /// Create a new root-level category
    pub fn new(slug: String, name: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            slug,
            name,
            parent_ids: Vec::new(),
            children_ids: Vec::new(),
            created_at: chrono::Utc::now().naive_utc(),
        }
    }

    /// Validate slug and name
    pub fn validate(&self) -> Result<(), String> {
        if self.slug.trim().is_empty() {
            return Err("Slug must not be empty".to_string());
        }
        if self.name.trim().is_empty() {
            return Err("Name must not be empty".to_string());
        }
        Ok(())
    }
}
