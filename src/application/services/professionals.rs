//! Professional directory backed by the `professionals` collection

use async_trait::async_trait;
use tracing::info;

use crate::application::repositories::DocumentRepository;
use crate::domain::{
    DomainError, DomainResult, ProfessionalDirectory, ProfessionalDisplayInfo, ProfessionalProfile,
};

#[derive(Clone)]
pub struct DocumentProfessionalDirectory {
    profiles: DocumentRepository<ProfessionalProfile>,
}

impl DocumentProfessionalDirectory {
    pub fn new(profiles: DocumentRepository<ProfessionalProfile>) -> Self {
        Self { profiles }
    }

    /// Create or replace a profile.
    ///
    /// Existing discovery aggregates pick up the new name on the
    /// professional's next offering write.
    pub async fn save_profile(&self, profile: &ProfessionalProfile) -> DomainResult<()> {
        if profile.id.trim().is_empty() {
            return Err(DomainError::Validation(
                "professional id must not be empty".to_string(),
            ));
        }
        self.profiles.save(profile).await?;
        info!(professional_id = %profile.id, "Professional profile saved");
        Ok(())
    }

    pub async fn get_profile(&self, professional_id: &str) -> DomainResult<Option<ProfessionalProfile>> {
        self.profiles.find_by_id(professional_id).await
    }
}

#[async_trait]
impl ProfessionalDirectory for DocumentProfessionalDirectory {
    async fn display_info(&self, professional_id: &str) -> DomainResult<Option<ProfessionalDisplayInfo>> {
        Ok(self
            .profiles
            .find_by_id(professional_id)
            .await?
            .map(|profile| profile.display_info()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::application::events::create_event_bus;
    use crate::infrastructure::storage::InMemoryDocumentStore;

    fn directory() -> DocumentProfessionalDirectory {
        let store = Arc::new(InMemoryDocumentStore::new(create_event_bus(8)));
        DocumentProfessionalDirectory::new(DocumentRepository::new(store))
    }

    #[tokio::test]
    async fn test_display_info_for_saved_profile() {
        let directory = directory();
        directory
            .save_profile(&ProfessionalProfile::new("pro-1", "Ana").with_photo("https://cdn/ana.jpg"))
            .await
            .unwrap();

        let info = directory.display_info("pro-1").await.unwrap().unwrap();
        assert_eq!(info.display_name, "Ana");
        assert_eq!(info.photo_url.as_deref(), Some("https://cdn/ana.jpg"));
        assert!(directory.display_info("pro-2").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_blank_id_rejected() {
        let err = directory()
            .save_profile(&ProfessionalProfile::new(" ", "Nobody"))
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }
}
