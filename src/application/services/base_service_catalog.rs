//! Base service catalog
//!
//! Admin-owned canonical services. Keeps every category's membership list
//! in step with the services that name it, and refuses deletes that would
//! orphan professional offerings.

use std::sync::Arc;

use tracing::{debug, info};

use crate::application::repositories::DocumentRepository;
use crate::application::services::CategoryRegistry;
use crate::domain::base_service::fields;
use crate::domain::document::OrderBy;
use crate::domain::offering::fields as offering_fields;
use crate::domain::{
    BaseService, BaseServicePatch, DomainError, DomainResult, NewBaseService, ProfessionalService,
};
use crate::shared::validate_input;

/// Narrowing for `list_base_services`
#[derive(Debug, Clone, Default)]
pub struct BaseServiceFilter {
    pub category_id: Option<String>,
    pub published_only: bool,
}

impl BaseServiceFilter {
    pub fn in_category(category_id: impl Into<String>) -> Self {
        Self {
            category_id: Some(category_id.into()),
            published_only: false,
        }
    }

    pub fn published(mut self) -> Self {
        self.published_only = true;
        self
    }
}

pub struct BaseServiceCatalog {
    base_services: DocumentRepository<BaseService>,
    offerings: DocumentRepository<ProfessionalService>,
    categories: Arc<CategoryRegistry>,
}

fn ensure_finite(base_price: Option<f64>) -> DomainResult<()> {
    match base_price {
        Some(price) if !price.is_finite() => Err(DomainError::Validation(
            "base_price: must be a number".to_string(),
        )),
        _ => Ok(()),
    }
}

impl BaseServiceCatalog {
    pub fn new(
        base_services: DocumentRepository<BaseService>,
        offerings: DocumentRepository<ProfessionalService>,
        categories: Arc<CategoryRegistry>,
    ) -> Self {
        Self {
            base_services,
            offerings,
            categories,
        }
    }

    pub async fn create_base_service(&self, input: NewBaseService) -> DomainResult<BaseService> {
        validate_input(&input)?;
        ensure_finite(Some(input.base_price))?;

        let service = BaseService::new(input);
        // membership first: a dangling id in a category is tolerated,
        // a service missing from its category is not
        self.categories
            .add_base_service_ref(&service.category_id, &service.id)
            .await?;
        self.base_services.save(&service).await?;

        info!(
            base_service_id = %service.id,
            category_id = %service.category_id,
            name = %service.name,
            "Base service created"
        );
        Ok(service)
    }

    pub async fn get_base_service(&self, base_service_id: &str) -> DomainResult<BaseService> {
        self.base_services.get(base_service_id).await
    }

    /// Base services by name, optionally narrowed to a category or to
    /// published services.
    pub async fn list_base_services(&self, filter: &BaseServiceFilter) -> DomainResult<Vec<BaseService>> {
        let mut query = self.base_services.query().order_by(OrderBy::asc(fields::NAME));
        if let Some(category_id) = &filter.category_id {
            query = query.where_eq(fields::CATEGORY_ID, category_id.as_str());
        }
        if filter.published_only {
            query = query.where_eq(fields::IS_PUBLISHED, true);
        }
        self.base_services.find(&query).await
    }

    /// Existing offerings are not re-validated against new bounds; they
    /// keep their price and duration until their owner edits them.
    pub async fn update_base_service(
        &self,
        base_service_id: &str,
        patch: BaseServicePatch,
    ) -> DomainResult<BaseService> {
        validate_input(&patch)?;
        ensure_finite(patch.base_price)?;

        let mut service = self.base_services.get(base_service_id).await?;
        if patch.is_empty() {
            return Ok(service);
        }

        let previous_category = service.category_id.clone();
        let moved_to = patch
            .category_id
            .clone()
            .filter(|category_id| *category_id != previous_category);
        if let Some(target) = &moved_to {
            self.categories
                .add_base_service_ref(target, base_service_id)
                .await?;
        }

        service.apply(patch);
        self.base_services.save(&service).await?;

        if let Some(target) = &moved_to {
            self.categories
                .remove_base_service_ref(&previous_category, base_service_id)
                .await?;
            info!(
                base_service_id,
                from = %previous_category,
                to = %target,
                "Base service moved to another category"
            );
        }

        debug!(base_service_id, "Base service updated");
        Ok(service)
    }

    /// Refused while any professional offering references the service.
    pub async fn delete_base_service(&self, base_service_id: &str) -> DomainResult<()> {
        let service = self.base_services.get(base_service_id).await?;

        let referencing = self
            .offerings
            .find(
                &self
                    .offerings
                    .query()
                    .where_eq(offering_fields::BASE_SERVICE_ID, base_service_id),
            )
            .await?;
        if !referencing.is_empty() {
            return Err(DomainError::Conflict(format!(
                "'{}' is still offered by {} professional(s); remove those offerings before deleting it",
                service.name,
                referencing.len()
            )));
        }

        self.base_services.delete(base_service_id).await?;
        self.categories
            .remove_base_service_ref(&service.category_id, base_service_id)
            .await?;

        info!(base_service_id, category_id = %service.category_id, "Base service deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::application::events::create_event_bus;
    use crate::application::repositories::Repositories;
    use crate::domain::{NewCategory, ServiceCategory};
    use crate::infrastructure::storage::InMemoryDocumentStore;

    struct Fixture {
        repos: Repositories,
        registry: Arc<CategoryRegistry>,
        catalog: BaseServiceCatalog,
    }

    fn fixture() -> Fixture {
        let store = Arc::new(InMemoryDocumentStore::new(create_event_bus(32)));
        let repos = Repositories::new(store);
        let registry = Arc::new(CategoryRegistry::new(repos.categories.clone()));
        let catalog = BaseServiceCatalog::new(
            repos.base_services.clone(),
            repos.offerings.clone(),
            registry.clone(),
        );
        Fixture {
            repos,
            registry,
            catalog,
        }
    }

    async fn category(f: &Fixture, name: &str) -> ServiceCategory {
        f.registry.create_category(NewCategory::named(name)).await.unwrap()
    }

    #[tokio::test]
    async fn test_create_adds_membership() {
        let f = fixture();
        let hair = category(&f, "Hair").await;
        let service = f
            .catalog
            .create_base_service(NewBaseService::new(&hair.id, "Balayage", "", 100.0, 120))
            .await
            .unwrap();

        let hair = f.registry.get_category(&hair.id).await.unwrap();
        assert_eq!(hair.services, vec![service.id.clone()]);
        assert!(service.is_published);
    }

    #[tokio::test]
    async fn test_create_in_missing_category_writes_nothing() {
        let f = fixture();
        let err = f
            .catalog
            .create_base_service(NewBaseService::new("nope", "Balayage", "", 100.0, 120))
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::NotFound { .. }));
        assert!(f
            .catalog
            .list_base_services(&BaseServiceFilter::default())
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn test_create_rejects_invalid_input() {
        let f = fixture();
        let hair = category(&f, "Hair").await;

        let err = f
            .catalog
            .create_base_service(NewBaseService::new(&hair.id, "Trim", "", 10.0, 10))
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));

        let err = f
            .catalog
            .create_base_service(NewBaseService::new(&hair.id, "Trim", "", f64::NAN, 30))
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[tokio::test]
    async fn test_move_between_categories() {
        let f = fixture();
        let hair = category(&f, "Hair").await;
        let nails = category(&f, "Nails").await;
        let service = f
            .catalog
            .create_base_service(NewBaseService::new(&hair.id, "Treatment", "", 40.0, 30))
            .await
            .unwrap();

        let moved = f
            .catalog
            .update_base_service(
                &service.id,
                BaseServicePatch {
                    category_id: Some(nails.id.clone()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(moved.category_id, nails.id);

        assert!(f.registry.get_category(&hair.id).await.unwrap().services.is_empty());
        assert_eq!(
            f.registry.get_category(&nails.id).await.unwrap().services,
            vec![service.id.clone()]
        );
    }

    #[tokio::test]
    async fn test_move_to_missing_category_changes_nothing() {
        let f = fixture();
        let hair = category(&f, "Hair").await;
        let service = f
            .catalog
            .create_base_service(NewBaseService::new(&hair.id, "Treatment", "", 40.0, 30))
            .await
            .unwrap();

        let err = f
            .catalog
            .update_base_service(
                &service.id,
                BaseServicePatch {
                    category_id: Some("nope".into()),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::NotFound { .. }));
        assert_eq!(
            f.catalog.get_base_service(&service.id).await.unwrap().category_id,
            hair.id
        );
    }

    #[tokio::test]
    async fn test_delete_refused_while_offered() {
        let f = fixture();
        let hair = category(&f, "Hair").await;
        let service = f
            .catalog
            .create_base_service(NewBaseService::new(&hair.id, "Balayage", "", 100.0, 120))
            .await
            .unwrap();
        let offering = ProfessionalService::new("pro-1", &service.id, 120.0, 90);
        f.repos.offerings.save(&offering).await.unwrap();

        let err = f.catalog.delete_base_service(&service.id).await.unwrap_err();
        assert!(matches!(err, DomainError::Conflict(msg) if msg.contains("Balayage")));

        f.repos.offerings.delete(&offering.id).await.unwrap();
        f.catalog.delete_base_service(&service.id).await.unwrap();
        assert!(f.registry.get_category(&hair.id).await.unwrap().services.is_empty());
    }

    #[tokio::test]
    async fn test_list_filters() {
        let f = fixture();
        let hair = category(&f, "Hair").await;
        let nails = category(&f, "Nails").await;
        let mut draft = NewBaseService::new(&hair.id, "Perm", "", 80.0, 90);
        draft.is_published = false;
        f.catalog.create_base_service(draft).await.unwrap();
        f.catalog
            .create_base_service(NewBaseService::new(&hair.id, "Cut", "", 30.0, 30))
            .await
            .unwrap();
        f.catalog
            .create_base_service(NewBaseService::new(&nails.id, "Gel", "", 25.0, 45))
            .await
            .unwrap();

        let names = |services: Vec<BaseService>| -> Vec<String> {
            services.into_iter().map(|s| s.name).collect()
        };
        let in_hair = f
            .catalog
            .list_base_services(&BaseServiceFilter::in_category(&hair.id))
            .await
            .unwrap();
        assert_eq!(names(in_hair), vec!["Cut", "Perm"]);

        let published = f
            .catalog
            .list_base_services(&BaseServiceFilter::in_category(&hair.id).published())
            .await
            .unwrap();
        assert_eq!(names(published), vec!["Cut"]);
    }
}
