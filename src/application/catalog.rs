//! Catalog facade
//!
//! Wires the services around one document store and one change feed and
//! exposes the public operation surface used by UIs and the admin CLI.

use std::sync::Arc;

use tracing::info;

use crate::application::events::{create_event_bus, SharedEventBus};
use crate::application::repositories::Repositories;
use crate::application::services::{
    BaseServiceCatalog, BaseServiceFilter, CategoryRegistry, Discovery,
    DocumentProfessionalDirectory, OfferingStore, ProviderProjector,
};
use crate::application::subscriptions::{Subscription, SubscriptionHub};
use crate::config::AppConfig;
use crate::domain::document::{OrderBy, Query, SharedDocumentStore};
use crate::domain::offering::{fields as offering_fields, DurationBounds};
use crate::domain::{
    category, validate_offering, BaseService, BaseServicePatch, CategoryPatch, Document,
    DomainResult, NewBaseService, NewCategory, OfferingFilter, OfferingOrder, OfferingPatch,
    ProfessionalProfile, ProfessionalService, ServiceCategory, ServiceProviderAggregate,
};
use crate::infrastructure::{open_store, InMemoryDocumentStore};

pub struct Catalog {
    store: SharedDocumentStore,
    event_bus: SharedEventBus,
    categories: Arc<CategoryRegistry>,
    base_services: BaseServiceCatalog,
    offerings: OfferingStore,
    projector: ProviderProjector,
    professionals: DocumentProfessionalDirectory,
    discovery: Discovery,
    hub: Arc<SubscriptionHub>,
}

impl Catalog {
    /// Build the catalog over `store`, whose writes must be published on
    /// `event_bus`. Starts the subscription hub, so a tokio runtime must be
    /// running.
    pub fn new(store: SharedDocumentStore, event_bus: SharedEventBus) -> Self {
        let repos = Repositories::new(store.clone());
        let categories = Arc::new(CategoryRegistry::new(repos.categories.clone()));
        let base_services = BaseServiceCatalog::new(
            repos.base_services.clone(),
            repos.offerings.clone(),
            categories.clone(),
        );
        let projector = ProviderProjector::new(repos.providers.clone());
        let professionals = DocumentProfessionalDirectory::new(repos.professionals.clone());
        let offerings = OfferingStore::new(
            repos.offerings.clone(),
            repos.base_services.clone(),
            repos.categories.clone(),
            Arc::new(professionals.clone()),
            projector.clone(),
        );
        let hub = SubscriptionHub::start(store.clone(), &event_bus);
        let discovery = Discovery::new(repos.providers, hub.clone());

        Self {
            store,
            event_bus,
            categories,
            base_services,
            offerings,
            projector,
            professionals,
            discovery,
            hub,
        }
    }

    /// Open the configured store (running migrations) and build the catalog.
    pub async fn open(config: &AppConfig) -> DomainResult<Self> {
        let event_bus = create_event_bus(config.store.change_feed_capacity);
        let store = open_store(&config.store, event_bus.clone(), true).await?;
        info!(backend = ?config.store.backend, "Catalog opened");
        Ok(Self::new(store, event_bus))
    }

    /// Catalog over a fresh in-memory store.
    pub fn in_memory() -> Self {
        let event_bus = create_event_bus(1024);
        let store = Arc::new(InMemoryDocumentStore::new(event_bus.clone()));
        Self::new(store, event_bus)
    }

    pub fn store(&self) -> &SharedDocumentStore {
        &self.store
    }

    pub fn event_bus(&self) -> &SharedEventBus {
        &self.event_bus
    }

    pub fn categories(&self) -> &CategoryRegistry {
        &self.categories
    }

    pub fn base_services(&self) -> &BaseServiceCatalog {
        &self.base_services
    }

    pub fn offerings(&self) -> &OfferingStore {
        &self.offerings
    }

    pub fn projector(&self) -> &ProviderProjector {
        &self.projector
    }

    pub fn professionals(&self) -> &DocumentProfessionalDirectory {
        &self.professionals
    }

    pub fn discovery(&self) -> &Discovery {
        &self.discovery
    }

    pub fn subscriptions(&self) -> &Arc<SubscriptionHub> {
        &self.hub
    }

    // Admin operations

    pub async fn create_category(&self, input: NewCategory) -> DomainResult<ServiceCategory> {
        self.categories.create_category(input).await
    }

    pub async fn update_category(&self, category_id: &str, patch: CategoryPatch) -> DomainResult<ServiceCategory> {
        self.categories.update_category(category_id, patch).await
    }

    pub async fn delete_category(&self, category_id: &str) -> DomainResult<()> {
        self.categories.delete_category(category_id).await
    }

    pub async fn list_categories(&self) -> DomainResult<Vec<ServiceCategory>> {
        self.categories.list_categories().await
    }

    pub async fn create_base_service(&self, input: NewBaseService) -> DomainResult<BaseService> {
        self.base_services.create_base_service(input).await
    }

    pub async fn update_base_service(
        &self,
        base_service_id: &str,
        patch: BaseServicePatch,
    ) -> DomainResult<BaseService> {
        self.base_services.update_base_service(base_service_id, patch).await
    }

    pub async fn delete_base_service(&self, base_service_id: &str) -> DomainResult<()> {
        self.base_services.delete_base_service(base_service_id).await
    }

    pub async fn list_base_services(&self, filter: &BaseServiceFilter) -> DomainResult<Vec<BaseService>> {
        self.base_services.list_base_services(filter).await
    }

    // Professional operations

    pub async fn create_offering(
        &self,
        professional_id: &str,
        base_service_id: &str,
        price: f64,
        duration: u32,
    ) -> DomainResult<ProfessionalService> {
        self.offerings
            .create_offering(professional_id, base_service_id, price, duration)
            .await
    }

    pub async fn update_offering(&self, offering_id: &str, patch: OfferingPatch) -> DomainResult<ProfessionalService> {
        self.offerings.update_offering(offering_id, patch).await
    }

    pub async fn delete_offering(&self, offering_id: &str) -> DomainResult<()> {
        self.offerings.delete_offering(offering_id).await
    }

    pub async fn list_offerings(
        &self,
        professional_id: &str,
        filter: &OfferingFilter,
        order: Option<OfferingOrder>,
    ) -> DomainResult<Vec<ProfessionalService>> {
        self.offerings.list_offerings(professional_id, filter, order).await
    }

    pub async fn save_profile(&self, profile: &ProfessionalProfile) -> DomainResult<()> {
        self.professionals.save_profile(profile).await
    }

    /// Pre-submit check of a price and duration, without writing anything.
    pub async fn check_offering(&self, base_service_id: &str, price: f64, duration: u32) -> DomainResult<()> {
        let base = self.base_services.get_base_service(base_service_id).await?;
        validate_offering(&base, price, duration)
    }

    /// Duration band a form should offer for `base_service_id`.
    pub async fn duration_bounds(&self, base_service_id: &str) -> DomainResult<DurationBounds> {
        let base = self.base_services.get_base_service(base_service_id).await?;
        Ok(DurationBounds::for_base(base.base_duration))
    }

    // Live queries

    pub async fn subscribe<T, F>(&self, query: Query, on_change: F) -> DomainResult<Subscription>
    where
        T: Document,
        F: Fn(Vec<T>) + Send + Sync + 'static,
    {
        self.hub.subscribe(query, on_change).await
    }

    pub async fn subscribe_categories<F>(&self, on_change: F) -> DomainResult<Subscription>
    where
        F: Fn(Vec<ServiceCategory>) + Send + Sync + 'static,
    {
        let query = Query::collection(ServiceCategory::COLLECTION).order_by(OrderBy::asc(category::fields::NAME));
        self.hub.subscribe(query, on_change).await
    }

    /// A professional's own offerings, newest first.
    pub async fn subscribe_offerings<F>(&self, professional_id: &str, on_change: F) -> DomainResult<Subscription>
    where
        F: Fn(Vec<ProfessionalService>) + Send + Sync + 'static,
    {
        let query = Query::collection(ProfessionalService::COLLECTION)
            .where_eq(offering_fields::PROFESSIONAL_ID, professional_id)
            .order_by(OrderBy::desc(offering_fields::CREATED_AT));
        self.hub.subscribe(query, on_change).await
    }

    pub async fn subscribe_providers_for_service<F>(
        &self,
        base_service_id: &str,
        on_change: F,
    ) -> DomainResult<Subscription>
    where
        F: Fn(Vec<ServiceProviderAggregate>) + Send + Sync + 'static,
    {
        self.discovery
            .subscribe_providers_for_service(base_service_id, on_change)
            .await
    }
}
