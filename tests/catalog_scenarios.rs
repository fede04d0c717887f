//! End-to-end catalog scenarios over the public API

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::mpsc;

use beautymarket_catalog::application::BaseServiceFilter;
use beautymarket_catalog::config::{AppConfig, StoreBackend};
use beautymarket_catalog::domain::document::{Collection, DocumentStore, Page, Query, StoredDocument};
use beautymarket_catalog::domain::{
    BaseServicePatch, NewBaseService, NewCategory, OfferingFilter, OfferingPatch,
    ProfessionalProfile, ProfessionalService, ServiceCategory, ServiceProviderAggregate,
};
use beautymarket_catalog::{create_event_bus, Catalog, DomainError, DomainResult, InMemoryDocumentStore};

struct Seeded {
    catalog: Catalog,
    category_id: String,
    base_service_id: String,
}

/// Hair category with a 100.00 / 60 minute base service.
async fn seeded(catalog: Catalog) -> Seeded {
    let category = catalog
        .create_category(NewCategory::named("Hair").with_description("Cuts and colour"))
        .await
        .unwrap();
    let base = catalog
        .create_base_service(NewBaseService::new(&category.id, "Haircut", "Wash and cut", 100.0, 60))
        .await
        .unwrap();
    catalog
        .save_profile(&ProfessionalProfile::new("pro-ana", "Ana"))
        .await
        .unwrap();
    catalog
        .save_profile(&ProfessionalProfile::new("pro-ben", "Ben"))
        .await
        .unwrap();
    Seeded {
        catalog,
        category_id: category.id,
        base_service_id: base.id,
    }
}

fn validation_message(result: DomainResult<()>) -> String {
    match result {
        Err(DomainError::Validation(msg)) => msg,
        other => panic!("expected validation error, got {:?}", other),
    }
}

type Snapshots<T> = mpsc::UnboundedReceiver<Vec<T>>;

fn snapshot_channel<T: Send + 'static>() -> (impl Fn(Vec<T>) + Send + Sync + 'static, Snapshots<T>) {
    let (tx, rx) = mpsc::unbounded_channel();
    (move |rows: Vec<T>| {
        let _ = tx.send(rows);
    }, rx)
}

/// Wait until a snapshot satisfies `accept`, skipping intermediate ones.
async fn wait_for<T>(rx: &mut Snapshots<T>, accept: impl Fn(&[T]) -> bool) -> Vec<T> {
    tokio::time::timeout(Duration::from_secs(3), async {
        loop {
            let rows = rx.recv().await.expect("subscription closed");
            if accept(rows.as_slice()) {
                return rows;
            }
        }
    })
    .await
    .expect("expected snapshot never arrived")
}

#[tokio::test]
async fn test_offering_bounds_follow_base_service() {
    let s = seeded(Catalog::in_memory()).await;
    let c = &s.catalog;

    let msg = validation_message(c.check_offering(&s.base_service_id, 99.0, 60).await);
    assert!(msg.contains("100"), "{}", msg);
    assert!(msg.contains("Haircut"), "{}", msg);

    let msg = validation_message(c.check_offering(&s.base_service_id, 120.0, 29).await);
    assert!(msg.contains("30"), "{}", msg);

    let msg = validation_message(c.check_offering(&s.base_service_id, 120.0, 121).await);
    assert!(msg.contains("120"), "{}", msg);

    // both ends of the band are allowed
    c.check_offering(&s.base_service_id, 100.0, 30).await.unwrap();
    c.check_offering(&s.base_service_id, 100.0, 120).await.unwrap();

    let bounds = c.duration_bounds(&s.base_service_id).await.unwrap();
    assert_eq!((bounds.min, bounds.max), (30.0, 120.0));

    let offering = c
        .create_offering("pro-ana", &s.base_service_id, 120.0, 90)
        .await
        .unwrap();
    assert!(offering.is_active);

    let err = c
        .create_offering("pro-ben", &s.base_service_id, 99.0, 90)
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::Validation(_)));
}

#[tokio::test]
async fn test_one_offering_per_professional_and_service() {
    let s = seeded(Catalog::in_memory()).await;
    let c = &s.catalog;

    c.create_offering("pro-ana", &s.base_service_id, 120.0, 90).await.unwrap();
    let err = c
        .create_offering("pro-ana", &s.base_service_id, 150.0, 60)
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::Conflict(_)));

    // an inactive offering still occupies the pair
    let offerings = c
        .list_offerings("pro-ana", &OfferingFilter::default(), None)
        .await
        .unwrap();
    c.update_offering(&offerings[0].id, OfferingPatch::deactivate())
        .await
        .unwrap();
    let err = c
        .create_offering("pro-ana", &s.base_service_id, 150.0, 60)
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::Conflict(_)));

    c.create_offering("pro-ben", &s.base_service_id, 150.0, 60).await.unwrap();
}

#[tokio::test]
async fn test_discovery_tracks_offering_lifecycle() {
    let s = seeded(Catalog::in_memory()).await;
    let c = &s.catalog;

    let (callback, mut rx) = snapshot_channel::<ServiceProviderAggregate>();
    let _sub = c
        .subscribe_providers_for_service(&s.base_service_id, callback)
        .await
        .unwrap();
    assert!(wait_for(&mut rx, |_| true).await.is_empty());

    let ana = c.create_offering("pro-ana", &s.base_service_id, 120.0, 90).await.unwrap();
    c.create_offering("pro-ben", &s.base_service_id, 110.0, 60).await.unwrap();

    let rows = wait_for(&mut rx, |rows| rows.len() == 2).await;
    // cheapest first
    assert_eq!(rows[0].professional_name, "Ben");
    assert_eq!(rows[1].professional_name, "Ana");
    assert_eq!(rows[1].id, format!("pro-ana_{}", s.base_service_id));
    assert_eq!(rows[1].category_name, "Hair");
    assert_eq!(rows[1].service_name, "Haircut");

    c.update_offering(
        &ana.id,
        OfferingPatch {
            price: Some(105.0),
            ..Default::default()
        },
    )
    .await
    .unwrap();
    let rows = wait_for(&mut rx, |rows| rows.first().is_some_and(|r| r.professional_name == "Ana")).await;
    assert_eq!(rows[0].price, 105.0);

    c.update_offering(&ana.id, OfferingPatch::deactivate()).await.unwrap();
    let rows = wait_for(&mut rx, |rows| rows.len() == 1).await;
    assert_eq!(rows[0].professional_name, "Ben");

    let direct = c.discovery().providers_for_service(&s.base_service_id).await.unwrap();
    assert_eq!(direct, rows);

    let in_category = c.discovery().providers_in_category(&s.category_id).await.unwrap();
    assert_eq!(in_category.len(), 1);
}

#[tokio::test]
async fn test_referential_deletes_are_refused() {
    let s = seeded(Catalog::in_memory()).await;
    let c = &s.catalog;
    let offering = c.create_offering("pro-ana", &s.base_service_id, 120.0, 90).await.unwrap();

    let err = c.delete_base_service(&s.base_service_id).await.unwrap_err();
    assert!(matches!(err, DomainError::Conflict(_)));
    let err = c.delete_category(&s.category_id).await.unwrap_err();
    assert!(matches!(err, DomainError::Conflict(_)));

    c.delete_offering(&offering.id).await.unwrap();
    assert!(c.discovery().providers_for_service(&s.base_service_id).await.unwrap().is_empty());

    c.delete_base_service(&s.base_service_id).await.unwrap();
    c.delete_category(&s.category_id).await.unwrap();
    assert!(c.list_categories().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_base_service_changes_keep_existing_offerings() {
    let s = seeded(Catalog::in_memory()).await;
    let c = &s.catalog;
    let offering = c.create_offering("pro-ana", &s.base_service_id, 120.0, 90).await.unwrap();

    c.update_base_service(
        &s.base_service_id,
        BaseServicePatch {
            base_price: Some(150.0),
            ..Default::default()
        },
    )
    .await
    .unwrap();

    let kept = c.offerings().get_offering(&offering.id).await.unwrap();
    assert_eq!(kept.price, 120.0);
    let row = c
        .projector()
        .get_aggregate("pro-ana", &s.base_service_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(row.price, 120.0);

    // new offerings must meet the raised floor
    let err = c
        .create_offering("pro-ben", &s.base_service_id, 120.0, 90)
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::Validation(msg) if msg.contains("150")));
}

#[tokio::test]
async fn test_membership_follows_create_move_delete() {
    let s = seeded(Catalog::in_memory()).await;
    let c = &s.catalog;
    let nails = c.create_category(NewCategory::named("Nails")).await.unwrap();

    c.update_base_service(
        &s.base_service_id,
        BaseServicePatch {
            category_id: Some(nails.id.clone()),
            ..Default::default()
        },
    )
    .await
    .unwrap();

    let hair = c.categories().get_category(&s.category_id).await.unwrap();
    let nails = c.categories().get_category(&nails.id).await.unwrap();
    assert!(hair.services.is_empty());
    assert_eq!(nails.services, vec![s.base_service_id.clone()]);

    let listed = c
        .list_base_services(&BaseServiceFilter::in_category(&nails.id))
        .await
        .unwrap();
    assert_eq!(listed.len(), 1);
}

#[tokio::test]
async fn test_category_subscription_follows_admin_edits() {
    let s = seeded(Catalog::in_memory()).await;
    let c = &s.catalog;

    let (callback, mut rx) = snapshot_channel::<ServiceCategory>();
    let _sub = c.subscribe_categories(callback).await.unwrap();
    let names = |rows: &[ServiceCategory]| rows.iter().map(|r| r.name.clone()).collect::<Vec<_>>();
    assert_eq!(names(&wait_for(&mut rx, |_| true).await), vec!["Hair"]);

    c.create_category(NewCategory::named("Brows")).await.unwrap();
    let rows = wait_for(&mut rx, |rows| rows.len() == 2).await;
    assert_eq!(names(&rows), vec!["Brows", "Hair"]);
}

#[tokio::test]
async fn test_offering_subscription_lists_newest_first() {
    let s = seeded(Catalog::in_memory()).await;
    let c = &s.catalog;
    let colour = c
        .create_base_service(NewBaseService::new(&s.category_id, "Colour", "", 80.0, 90))
        .await
        .unwrap();

    let (callback, mut rx) = snapshot_channel::<ProfessionalService>();
    let _sub = c.subscribe_offerings("pro-ana", callback).await.unwrap();
    assert!(wait_for(&mut rx, |_| true).await.is_empty());

    let first = c.create_offering("pro-ana", &s.base_service_id, 120.0, 90).await.unwrap();
    tokio::time::sleep(Duration::from_millis(5)).await;
    let second = c.create_offering("pro-ana", &colour.id, 85.0, 90).await.unwrap();
    c.create_offering("pro-ben", &colour.id, 90.0, 90).await.unwrap();

    let rows = wait_for(&mut rx, |rows| rows.len() == 2).await;
    let ids: Vec<&str> = rows.iter().map(|r| r.id.as_str()).collect();
    assert_eq!(ids, vec![second.id.as_str(), first.id.as_str()]);

    let listed = c
        .list_offerings("pro-ana", &OfferingFilter::default(), None)
        .await
        .unwrap();
    assert_eq!(listed, rows);
}

#[tokio::test]
async fn test_category_providers_ranked_by_rating() {
    let s = seeded(Catalog::in_memory()).await;
    let c = &s.catalog;

    let (callback, mut rx) = snapshot_channel::<ServiceProviderAggregate>();
    let _sub = c
        .discovery()
        .subscribe_providers_in_category(&s.category_id, callback)
        .await
        .unwrap();
    assert!(wait_for(&mut rx, |_| true).await.is_empty());

    let ana = c.create_offering("pro-ana", &s.base_service_id, 120.0, 90).await.unwrap();
    let ben = c.create_offering("pro-ben", &s.base_service_id, 110.0, 60).await.unwrap();
    wait_for(&mut rx, |rows| rows.len() == 2).await;

    c.offerings().record_review(&ana.id, 3).await.unwrap();
    c.offerings().record_review(&ben.id, 5).await.unwrap();
    let rows = wait_for(&mut rx, |rows| {
        rows.len() == 2 && rows[0].average_rating == 5.0 && rows[1].average_rating == 3.0
    })
    .await;
    assert_eq!(rows[0].professional_name, "Ben");
    assert_eq!(rows[1].professional_name, "Ana");
}

/// Store that refuses every write to the discovery collection.
struct ProjectionFailingStore {
    inner: InMemoryDocumentStore,
}

#[async_trait]
impl DocumentStore for ProjectionFailingStore {
    async fn get(&self, collection: Collection, id: &str) -> DomainResult<Option<StoredDocument>> {
        self.inner.get(collection, id).await
    }

    async fn query(&self, query: &Query) -> DomainResult<Page> {
        self.inner.query(query).await
    }

    async fn put(&self, collection: Collection, id: &str, body: Value) -> DomainResult<()> {
        if collection == Collection::ServiceProviders {
            return Err(DomainError::TransientStore("discovery writes unavailable".into()));
        }
        self.inner.put(collection, id, body).await
    }

    async fn delete(&self, collection: Collection, id: &str) -> DomainResult<bool> {
        self.inner.delete(collection, id).await
    }
}

#[tokio::test]
async fn test_projection_failure_does_not_fail_offering_write() {
    let bus = create_event_bus(64);
    let store = Arc::new(ProjectionFailingStore {
        inner: InMemoryDocumentStore::new(bus.clone()),
    });
    let s = seeded(Catalog::new(store, bus)).await;
    let c = &s.catalog;

    let offering = c.create_offering("pro-ana", &s.base_service_id, 120.0, 90).await.unwrap();
    assert_eq!(c.offerings().get_offering(&offering.id).await.unwrap(), offering);
    assert!(c.discovery().providers_for_service(&s.base_service_id).await.unwrap().is_empty());

    c.offerings().record_review(&offering.id, 4).await.unwrap();
}

#[tokio::test]
async fn test_sqlite_backed_catalog() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = AppConfig::default();
    config.store.backend = StoreBackend::Sqlite;
    config.store.database_url = format!("sqlite://{}?mode=rwc", dir.path().join("catalog.db").display());

    let s = seeded(Catalog::open(&config).await.unwrap()).await;
    let c = &s.catalog;

    let offering = c.create_offering("pro-ana", &s.base_service_id, 120.0, 90).await.unwrap();
    let rows = c.discovery().providers_for_service(&s.base_service_id).await.unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].offering_id, offering.id);

    let err = c.delete_category(&s.category_id).await.unwrap_err();
    assert!(matches!(err, DomainError::Conflict(_)));
}
