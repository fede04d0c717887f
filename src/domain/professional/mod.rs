//! Professional profiles
//!
//! Profiles are written by the identity side of the marketplace. The
//! catalog only reads their display fields to denormalize them into
//! discovery aggregates.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::document::{Collection, Document};
use crate::shared::errors::DomainResult;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfessionalProfile {
    pub id: String,
    pub display_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photo_url: Option<String>,
}

impl ProfessionalProfile {
    pub fn new(id: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            display_name: display_name.into(),
            photo_url: None,
        }
    }

    pub fn with_photo(mut self, url: impl Into<String>) -> Self {
        self.photo_url = Some(url.into());
        self
    }

    pub fn display_info(&self) -> ProfessionalDisplayInfo {
        ProfessionalDisplayInfo {
            professional_id: self.id.clone(),
            display_name: self.display_name.clone(),
            photo_url: self.photo_url.clone(),
        }
    }
}

impl Document for ProfessionalProfile {
    const COLLECTION: Collection = Collection::Professionals;
    const ENTITY: &'static str = "Professional";

    fn id(&self) -> &str {
        &self.id
    }
}

/// Professional fields copied into discovery aggregates
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfessionalDisplayInfo {
    pub professional_id: String,
    pub display_name: String,
    pub photo_url: Option<String>,
}

impl ProfessionalDisplayInfo {
    /// Used when no profile exists yet; the aggregate is still written.
    pub fn anonymous(professional_id: impl Into<String>) -> Self {
        Self {
            professional_id: professional_id.into(),
            display_name: String::new(),
            photo_url: None,
        }
    }
}

/// Source of professional display data
#[async_trait]
pub trait ProfessionalDirectory: Send + Sync {
    async fn display_info(&self, professional_id: &str) -> DomainResult<Option<ProfessionalDisplayInfo>>;
}
