//! Professional offerings
//!
//! Every write here is validated against the base service, persisted, and
//! then projected into the discovery collection. The offering write is the
//! source of truth: a failed projection is logged and counted, never
//! reported to the caller.

use std::sync::Arc;

use tracing::{info, warn};

use crate::application::repositories::DocumentRepository;
use crate::application::services::ProviderProjector;
use crate::domain::document::{Filter, FilterOp, SortDirection};
use crate::domain::offering::fields;
use crate::domain::offering::validation::{check_duration, check_price};
use crate::domain::{
    validate_offering, BaseService, CategoryDisplayInfo, DomainError, DomainResult, OfferingFilter,
    OfferingOrder, OfferingPatch, OfferingSortField, ProfessionalDirectory,
    ProfessionalDisplayInfo, ProfessionalService, ServiceCategory,
};

pub struct OfferingStore {
    offerings: DocumentRepository<ProfessionalService>,
    base_services: DocumentRepository<BaseService>,
    categories: DocumentRepository<ServiceCategory>,
    directory: Arc<dyn ProfessionalDirectory>,
    projector: ProviderProjector,
}

impl OfferingStore {
    pub fn new(
        offerings: DocumentRepository<ProfessionalService>,
        base_services: DocumentRepository<BaseService>,
        categories: DocumentRepository<ServiceCategory>,
        directory: Arc<dyn ProfessionalDirectory>,
        projector: ProviderProjector,
    ) -> Self {
        Self {
            offerings,
            base_services,
            categories,
            directory,
            projector,
        }
    }

    pub async fn create_offering(
        &self,
        professional_id: &str,
        base_service_id: &str,
        price: f64,
        duration: u32,
    ) -> DomainResult<ProfessionalService> {
        if professional_id.trim().is_empty() {
            return Err(DomainError::Validation(
                "professional id must not be empty".to_string(),
            ));
        }
        let base = self.base_services.get(base_service_id).await?;
        validate_offering(&base, price, duration)?;

        let existing = self
            .offerings
            .find(
                &self
                    .offerings
                    .query()
                    .where_eq(fields::PROFESSIONAL_ID, professional_id)
                    .where_eq(fields::BASE_SERVICE_ID, base_service_id)
                    .limit(1),
            )
            .await?;
        if !existing.is_empty() {
            return Err(DomainError::Conflict(format!(
                "You already offer '{}'; edit your existing offering instead",
                base.name
            )));
        }

        let offering = ProfessionalService::new(professional_id, base_service_id, price, duration);
        self.offerings.save(&offering).await?;
        metrics::counter!("catalog_offerings_created_total").increment(1);
        info!(
            offering_id = %offering.id,
            professional_id,
            base_service_id,
            price,
            duration,
            "Offering created"
        );

        self.project(&offering, Some(&base), "create").await;
        Ok(offering)
    }

    /// Apply a patch. Only a price or duration that differs from the stored
    /// one is re-checked against the base service, so resubmitting a
    /// grandfathered value is accepted.
    pub async fn update_offering(
        &self,
        offering_id: &str,
        patch: OfferingPatch,
    ) -> DomainResult<ProfessionalService> {
        let current = self.offerings.get(offering_id).await?;
        if patch.is_empty() {
            return Ok(current);
        }

        let base = self.base_services.get(&current.base_service_id).await?;
        if let Some(price) = patch.price.filter(|p| *p != current.price) {
            check_price(&base, price)?;
        }
        if let Some(duration) = patch.duration.filter(|d| *d != current.duration) {
            check_duration(&base, duration)?;
        }

        let mut updated = current.clone();
        if let Some(price) = patch.price {
            updated.price = price;
        }
        if let Some(duration) = patch.duration {
            updated.duration = duration;
        }
        if let Some(is_active) = patch.is_active {
            updated.is_active = is_active;
        }
        updated.updated_at = chrono::Utc::now();
        self.offerings.save(&updated).await?;
        info!(
            offering_id,
            price = updated.price,
            duration = updated.duration,
            is_active = updated.is_active,
            "Offering updated"
        );

        if updated.display_differs(&current) {
            self.project(&updated, Some(&base), "update").await;
        }
        Ok(updated)
    }

    pub async fn delete_offering(&self, offering_id: &str) -> DomainResult<()> {
        let offering = self.offerings.get(offering_id).await?;
        self.offerings.delete(offering_id).await?;
        info!(offering_id, professional_id = %offering.professional_id, "Offering deleted");

        if let Err(e) = self
            .projector
            .delete_aggregate(&offering.professional_id, &offering.base_service_id)
            .await
        {
            projection_failed(&offering, "delete", &e);
        }
        Ok(())
    }

    pub async fn get_offering(&self, offering_id: &str) -> DomainResult<ProfessionalService> {
        self.offerings.get(offering_id).await
    }

    /// A professional's offerings, newest first unless `order` says otherwise.
    pub async fn list_offerings(
        &self,
        professional_id: &str,
        filter: &OfferingFilter,
        order: Option<OfferingOrder>,
    ) -> DomainResult<Vec<ProfessionalService>> {
        let order = order
            .unwrap_or_else(|| OfferingOrder::new(OfferingSortField::CreatedAt, SortDirection::Desc));
        let mut query = self
            .offerings
            .query()
            .where_eq(fields::PROFESSIONAL_ID, professional_id)
            .order_by(order.to_order_by());

        if let Some(is_active) = filter.is_active {
            query = query.where_eq(fields::IS_ACTIVE, is_active);
        }
        if let Some(category_id) = &filter.category_id {
            let category = self.categories.get(category_id).await?;
            query = query.filter(Filter::new(
                fields::BASE_SERVICE_ID,
                FilterOp::In,
                category.services.clone(),
            ));
        }

        self.offerings.find(&query).await
    }

    /// Count a completed booking against the offering.
    pub async fn record_booking(&self, offering_id: &str, amount: f64) -> DomainResult<ProfessionalService> {
        if !amount.is_finite() || amount < 0.0 {
            return Err(DomainError::Validation(
                "Booking amount must be a non-negative number".to_string(),
            ));
        }
        let mut offering = self.offerings.get(offering_id).await?;
        offering.record_booking(amount);
        self.offerings.save(&offering).await?;
        info!(offering_id, amount, bookings = offering.bookings, "Booking recorded");
        Ok(offering)
    }

    /// Fold a 1..=5 rating into the running average and re-project.
    pub async fn record_review(&self, offering_id: &str, rating: u8) -> DomainResult<ProfessionalService> {
        if !(1..=5).contains(&rating) {
            return Err(DomainError::Validation(
                "Rating must be between 1 and 5".to_string(),
            ));
        }
        let mut offering = self.offerings.get(offering_id).await?;
        offering.record_review(rating);
        self.offerings.save(&offering).await?;
        info!(offering_id, rating, reviews = offering.reviews, "Review recorded");

        self.project(&offering, None, "review").await;
        Ok(offering)
    }

    async fn project(&self, offering: &ProfessionalService, base: Option<&BaseService>, operation: &'static str) {
        if let Err(e) = self.try_project(offering, base).await {
            projection_failed(offering, operation, &e);
        }
    }

    async fn try_project(&self, offering: &ProfessionalService, base: Option<&BaseService>) -> DomainResult<()> {
        if !offering.is_active {
            return self
                .projector
                .delete_aggregate(&offering.professional_id, &offering.base_service_id)
                .await;
        }

        let loaded;
        let base = match base {
            Some(base) => base,
            None => {
                loaded = self.base_services.get(&offering.base_service_id).await?;
                &loaded
            }
        };

        let category_name = match self.categories.find_by_id(&base.category_id).await? {
            Some(category) => category.name,
            None => {
                warn!(category_id = %base.category_id, "Category missing while projecting offering");
                String::new()
            }
        };
        let category = CategoryDisplayInfo {
            category_id: base.category_id.clone(),
            category_name,
            service_name: base.name.clone(),
        };

        let professional = self
            .directory
            .display_info(&offering.professional_id)
            .await?
            .unwrap_or_else(|| ProfessionalDisplayInfo::anonymous(&offering.professional_id));

        self.projector.sync(offering, &professional, &category).await
    }
}

fn projection_failed(offering: &ProfessionalService, operation: &'static str, error: &DomainError) {
    metrics::counter!("catalog_projection_failures_total", "operation" => operation).increment(1);
    warn!(
        offering_id = %offering.id,
        professional_id = %offering.professional_id,
        base_service_id = %offering.base_service_id,
        operation,
        error = %error,
        "Provider projection failed; offering write kept"
    );
}
