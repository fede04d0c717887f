//! Category registry
//!
//! Owns service categories and their membership lists. Membership is
//! only ever changed by the base service catalog, through
//! `add_base_service_ref` / `remove_base_service_ref`.

use tracing::{info, warn};

use crate::application::repositories::DocumentRepository;
use crate::domain::category::fields;
use crate::domain::document::OrderBy;
use crate::domain::{CategoryPatch, DomainError, DomainResult, NewCategory, ServiceCategory};
use crate::shared::validate_input;

pub struct CategoryRegistry {
    categories: DocumentRepository<ServiceCategory>,
}

impl CategoryRegistry {
    pub fn new(categories: DocumentRepository<ServiceCategory>) -> Self {
        Self { categories }
    }

    pub async fn create_category(&self, input: NewCategory) -> DomainResult<ServiceCategory> {
        validate_input(&input)?;
        let category = ServiceCategory::new(input);
        self.categories.save(&category).await?;

        info!(category_id = %category.id, name = %category.name, "Category created");
        Ok(category)
    }

    pub async fn get_category(&self, category_id: &str) -> DomainResult<ServiceCategory> {
        self.categories.get(category_id).await
    }

    /// All categories, by name.
    pub async fn list_categories(&self) -> DomainResult<Vec<ServiceCategory>> {
        let query = self.categories.query().order_by(OrderBy::asc(fields::NAME));
        self.categories.find(&query).await
    }

    pub async fn update_category(
        &self,
        category_id: &str,
        patch: CategoryPatch,
    ) -> DomainResult<ServiceCategory> {
        validate_input(&patch)?;
        let mut category = self.categories.get(category_id).await?;
        category.apply(patch);
        self.categories.save(&category).await?;

        info!(category_id, "Category updated");
        Ok(category)
    }

    /// Refused while any base service still belongs to the category.
    pub async fn delete_category(&self, category_id: &str) -> DomainResult<()> {
        let category = self.categories.get(category_id).await?;
        if category.has_services() {
            return Err(DomainError::Conflict(format!(
                "Category '{}' still contains {} base service(s); delete or move them first",
                category.name,
                category.services.len()
            )));
        }

        self.categories.delete(category_id).await?;
        info!(category_id, "Category deleted");
        Ok(())
    }

    /// Idempotent; the category must exist.
    pub async fn add_base_service_ref(
        &self,
        category_id: &str,
        base_service_id: &str,
    ) -> DomainResult<()> {
        let mut category = self.categories.get(category_id).await?;
        if category.add_service(base_service_id) {
            self.categories.save(&category).await?;
        }
        Ok(())
    }

    /// Idempotent; a missing category is treated as already clean.
    pub async fn remove_base_service_ref(
        &self,
        category_id: &str,
        base_service_id: &str,
    ) -> DomainResult<()> {
        let Some(mut category) = self.categories.find_by_id(category_id).await? else {
            warn!(category_id, base_service_id, "Category missing while removing reference");
            return Ok(());
        };
        if category.remove_service(base_service_id) {
            self.categories.save(&category).await?;
        }
        Ok(())
    }
}
