//! Provider projector
//!
//! Maintains the denormalized `service_providers` collection: one row per
//! active (professional, base service) offering. Rows are derived data and
//! may be rewritten at any time from their inputs.

use tracing::debug;

use crate::application::repositories::DocumentRepository;
use crate::domain::{
    CategoryDisplayInfo, DomainResult, ProfessionalDisplayInfo, ProfessionalService,
    ServiceProviderAggregate,
};

#[derive(Clone)]
pub struct ProviderProjector {
    providers: DocumentRepository<ServiceProviderAggregate>,
}

impl ProviderProjector {
    pub fn new(providers: DocumentRepository<ServiceProviderAggregate>) -> Self {
        Self { providers }
    }

    /// Write the aggregate for an offering, replacing any previous row.
    pub async fn upsert_aggregate(
        &self,
        offering: &ProfessionalService,
        professional: &ProfessionalDisplayInfo,
        category: &CategoryDisplayInfo,
    ) -> DomainResult<ServiceProviderAggregate> {
        let aggregate = ServiceProviderAggregate::project(offering, professional, category);
        self.providers.save(&aggregate).await?;
        debug!(aggregate_id = %aggregate.id, price = aggregate.price, "Provider aggregate upserted");
        Ok(aggregate)
    }

    /// Remove the aggregate; a missing row is not an error.
    pub async fn delete_aggregate(&self, professional_id: &str, base_service_id: &str) -> DomainResult<()> {
        let key = ServiceProviderAggregate::key(professional_id, base_service_id);
        if self.providers.delete(&key).await? {
            debug!(aggregate_id = %key, "Provider aggregate removed");
        }
        Ok(())
    }

    /// Active offerings are upserted, inactive ones removed.
    pub async fn sync(
        &self,
        offering: &ProfessionalService,
        professional: &ProfessionalDisplayInfo,
        category: &CategoryDisplayInfo,
    ) -> DomainResult<()> {
        if offering.is_active {
            self.upsert_aggregate(offering, professional, category).await?;
        } else {
            self.delete_aggregate(&offering.professional_id, &offering.base_service_id)
                .await?;
        }
        Ok(())
    }

    pub async fn get_aggregate(
        &self,
        professional_id: &str,
        base_service_id: &str,
    ) -> DomainResult<Option<ServiceProviderAggregate>> {
        self.providers
            .find_by_id(&ServiceProviderAggregate::key(professional_id, base_service_id))
            .await
    }
}
