//! Service category entity

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::domain::document::{Collection, Document};
use crate::shared::validations::not_blank;

/// Document field names used in queries
pub mod fields {
    pub const NAME: &str = "name";
    pub const SERVICES: &str = "services";
}

/// Category grouping base services, with a back-reference list of its members
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceCategory {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    /// Base service ids in this category, without duplicates
    #[serde(default)]
    pub services: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ServiceCategory {
    pub fn new(input: NewCategory) -> Self {
        let now = Utc::now();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            name: input.name.trim().to_string(),
            description: input.description,
            image_url: input.image_url,
            services: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Returns `false` if the id was already a member.
    pub fn add_service(&mut self, base_service_id: &str) -> bool {
        if self.contains(base_service_id) {
            return false;
        }
        self.services.push(base_service_id.to_string());
        self.updated_at = Utc::now();
        true
    }

    /// Returns `false` if the id was not a member.
    pub fn remove_service(&mut self, base_service_id: &str) -> bool {
        let before = self.services.len();
        self.services.retain(|id| id != base_service_id);
        let removed = self.services.len() != before;
        if removed {
            self.updated_at = Utc::now();
        }
        removed
    }

    pub fn contains(&self, base_service_id: &str) -> bool {
        self.services.iter().any(|id| id == base_service_id)
    }

    pub fn has_services(&self) -> bool {
        !self.services.is_empty()
    }

    pub fn apply(&mut self, patch: CategoryPatch) {
        if let Some(name) = patch.name {
            self.name = name.trim().to_string();
        }
        if let Some(description) = patch.description {
            self.description = Some(description);
        }
        if let Some(image_url) = patch.image_url {
            self.image_url = Some(image_url);
        }
        self.updated_at = Utc::now();
    }
}

impl Document for ServiceCategory {
    const COLLECTION: Collection = Collection::Categories;
    const ENTITY: &'static str = "ServiceCategory";

    fn id(&self) -> &str {
        &self.id
    }
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NewCategory {
    #[validate(custom(function = "not_blank"))]
    pub name: String,
    pub description: Option<String>,
    #[validate(url(message = "must be a valid URL"))]
    pub image_url: Option<String>,
}

impl NewCategory {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CategoryPatch {
    #[validate(custom(function = "not_blank"))]
    pub name: Option<String>,
    pub description: Option<String>,
    #[validate(url(message = "must be a valid URL"))]
    pub image_url: Option<String>,
}
