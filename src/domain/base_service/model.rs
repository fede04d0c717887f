//! Base service entity (admin-owned canonical definition)

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::domain::document::{Collection, Document};
use crate::shared::validations::{all_urls, not_blank};

/// Shortest base duration an admin may define, in minutes
pub const MIN_BASE_DURATION: u32 = 15;

pub mod fields {
    pub const CATEGORY_ID: &str = "categoryId";
    pub const IS_PUBLISHED: &str = "isPublished";
    pub const NAME: &str = "name";
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BaseService {
    pub id: String,
    pub name: String,
    pub description: String,
    pub category_id: String,
    /// Price floor for every professional offering
    pub base_price: f64,
    /// Reference duration in minutes; offerings may range from half to double
    pub base_duration: u32,
    pub is_published: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default)]
    pub gallery_urls: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl BaseService {
    pub fn new(input: NewBaseService) -> Self {
        let now = Utc::now();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            name: input.name.trim().to_string(),
            description: input.description,
            category_id: input.category_id,
            base_price: input.base_price,
            base_duration: input.base_duration,
            is_published: input.is_published,
            image_url: input.image_url,
            gallery_urls: input.gallery_urls,
            created_at: now,
            updated_at: now,
        }
    }

    /// Apply a validated patch. The category move itself is handled by the
    /// catalog, which also rewrites both categories' membership lists.
    pub fn apply(&mut self, patch: BaseServicePatch) {
        if let Some(name) = patch.name {
            self.name = name.trim().to_string();
        }
        if let Some(description) = patch.description {
            self.description = description;
        }
        if let Some(category_id) = patch.category_id {
            self.category_id = category_id;
        }
        if let Some(base_price) = patch.base_price {
            self.base_price = base_price;
        }
        if let Some(base_duration) = patch.base_duration {
            self.base_duration = base_duration;
        }
        if let Some(is_published) = patch.is_published {
            self.is_published = is_published;
        }
        if let Some(image_url) = patch.image_url {
            self.image_url = Some(image_url);
        }
        if let Some(gallery_urls) = patch.gallery_urls {
            self.gallery_urls = gallery_urls;
        }
        self.updated_at = Utc::now();
    }
}

impl Document for BaseService {
    const COLLECTION: Collection = Collection::BaseServices;
    const ENTITY: &'static str = "BaseService";

    fn id(&self) -> &str {
        &self.id
    }
}

fn default_published() -> bool {
    true
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NewBaseService {
    #[validate(custom(function = "not_blank"))]
    pub category_id: String,
    #[validate(custom(function = "not_blank"))]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[validate(range(min = 0.0, message = "base price must not be negative"))]
    pub base_price: f64,
    #[validate(range(min = 15, message = "base duration must be at least 15 minutes"))]
    pub base_duration: u32,
    #[serde(default = "default_published")]
    pub is_published: bool,
    #[validate(url(message = "must be a valid URL"))]
    pub image_url: Option<String>,
    #[serde(default)]
    #[validate(custom(function = "all_urls"))]
    pub gallery_urls: Vec<String>,
}

impl NewBaseService {
    pub fn new(
        category_id: impl Into<String>,
        name: impl Into<String>,
        description: impl Into<String>,
        base_price: f64,
        base_duration: u32,
    ) -> Self {
        Self {
            category_id: category_id.into(),
            name: name.into(),
            description: description.into(),
            base_price,
            base_duration,
            is_published: true,
            image_url: None,
            gallery_urls: Vec::new(),
        }
    }
}

/// Partial update; `None` leaves a field untouched.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct BaseServicePatch {
    #[validate(custom(function = "not_blank"))]
    pub name: Option<String>,
    pub description: Option<String>,
    #[validate(custom(function = "not_blank"))]
    pub category_id: Option<String>,
    #[validate(range(min = 0.0, message = "base price must not be negative"))]
    pub base_price: Option<f64>,
    #[validate(range(min = 15, message = "base duration must be at least 15 minutes"))]
    pub base_duration: Option<u32>,
    pub is_published: Option<bool>,
    #[validate(url(message = "must be a valid URL"))]
    pub image_url: Option<String>,
    #[validate(custom(function = "all_urls"))]
    pub gallery_urls: Option<Vec<String>>,
}

impl BaseServicePatch {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.description.is_none()
            && self.category_id.is_none()
            && self.base_price.is_none()
            && self.base_duration.is_none()
            && self.is_published.is_none()
            && self.image_url.is_none()
            && self.gallery_urls.is_none()
    }
}
