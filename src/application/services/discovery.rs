//! Client-facing discovery reads over provider aggregates

use std::sync::Arc;

use crate::application::repositories::DocumentRepository;
use crate::application::subscriptions::{Subscription, SubscriptionHub};
use crate::domain::document::{Collection, OrderBy, Query};
use crate::domain::provider::fields;
use crate::domain::{DomainResult, ServiceProviderAggregate};

/// Providers of one base service, cheapest first
pub fn service_query(base_service_id: &str) -> Query {
    Query::collection(Collection::ServiceProviders)
        .where_eq(fields::BASE_SERVICE_ID, base_service_id)
        .order_by(OrderBy::asc(fields::PRICE))
}

/// Providers across a category, best rated first
pub fn category_query(category_id: &str) -> Query {
    Query::collection(Collection::ServiceProviders)
        .where_eq(fields::CATEGORY_ID, category_id)
        .order_by(OrderBy::desc(fields::AVERAGE_RATING))
}

pub struct Discovery {
    providers: DocumentRepository<ServiceProviderAggregate>,
    hub: Arc<SubscriptionHub>,
}

impl Discovery {
    pub fn new(providers: DocumentRepository<ServiceProviderAggregate>, hub: Arc<SubscriptionHub>) -> Self {
        Self { providers, hub }
    }

    pub async fn providers_for_service(&self, base_service_id: &str) -> DomainResult<Vec<ServiceProviderAggregate>> {
        self.providers.find(&service_query(base_service_id)).await
    }

    pub async fn providers_in_category(&self, category_id: &str) -> DomainResult<Vec<ServiceProviderAggregate>> {
        self.providers.find(&category_query(category_id)).await
    }

    pub async fn subscribe_providers_for_service<F>(
        &self,
        base_service_id: &str,
        on_change: F,
    ) -> DomainResult<Subscription>
    where
        F: Fn(Vec<ServiceProviderAggregate>) + Send + Sync + 'static,
    {
        self.hub.subscribe(service_query(base_service_id), on_change).await
    }

    pub async fn subscribe_providers_in_category<F>(
        &self,
        category_id: &str,
        on_change: F,
    ) -> DomainResult<Subscription>
    where
        F: Fn(Vec<ServiceProviderAggregate>) + Send + Sync + 'static,
    {
        self.hub.subscribe(category_query(category_id), on_change).await
    }
}
