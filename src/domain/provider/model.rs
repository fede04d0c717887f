//! Discovery aggregate: one row per (professional, base service)

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::document::{Collection, Document};
use crate::domain::offering::ProfessionalService;
use crate::domain::professional::ProfessionalDisplayInfo;

pub mod fields {
    pub const PROFESSIONAL_ID: &str = "professionalId";
    pub const BASE_SERVICE_ID: &str = "baseServiceId";
    pub const CATEGORY_ID: &str = "categoryId";
    pub const PRICE: &str = "price";
    pub const AVERAGE_RATING: &str = "averageRating";
}

/// Base service and category names copied into discovery aggregates
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryDisplayInfo {
    pub category_id: String,
    pub category_name: String,
    pub service_name: String,
}

/// Join-free discovery record. Derived data: the projector may overwrite or
/// regenerate it at any time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceProviderAggregate {
    pub id: String,
    pub professional_id: String,
    pub base_service_id: String,
    pub offering_id: String,
    pub professional_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub professional_photo_url: Option<String>,
    pub category_id: String,
    pub category_name: String,
    pub service_name: String,
    pub price: f64,
    pub duration: u32,
    pub is_active: bool,
    pub reviews: u32,
    pub average_rating: f64,
    /// `updatedAt` of the offering this row was projected from
    pub synced_from: DateTime<Utc>,
}

impl ServiceProviderAggregate {
    pub fn key(professional_id: &str, base_service_id: &str) -> String {
        format!("{}_{}", professional_id, base_service_id)
    }

    /// Pure projection of its three inputs; equal inputs give equal rows.
    pub fn project(
        offering: &ProfessionalService,
        professional: &ProfessionalDisplayInfo,
        category: &CategoryDisplayInfo,
    ) -> Self {
        Self {
            id: Self::key(&offering.professional_id, &offering.base_service_id),
            professional_id: offering.professional_id.clone(),
            base_service_id: offering.base_service_id.clone(),
            offering_id: offering.id.clone(),
            professional_name: professional.display_name.clone(),
            professional_photo_url: professional.photo_url.clone(),
            category_id: category.category_id.clone(),
            category_name: category.category_name.clone(),
            service_name: category.service_name.clone(),
            price: offering.price,
            duration: offering.duration,
            is_active: offering.is_active,
            reviews: offering.reviews,
            average_rating: offering.average_rating,
            synced_from: offering.updated_at,
        }
    }
}

impl Document for ServiceProviderAggregate {
    const COLLECTION: Collection = Collection::ServiceProviders;
    const ENTITY: &'static str = "ServiceProvider";

    fn id(&self) -> &str {
        &self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn inputs() -> (ProfessionalService, ProfessionalDisplayInfo, CategoryDisplayInfo) {
        let offering = ProfessionalService::new("pro-1", "bs-1", 120.0, 90);
        let professional = ProfessionalDisplayInfo {
            professional_id: "pro-1".into(),
            display_name: "Ana".into(),
            photo_url: Some("https://cdn.example/ana.jpg".into()),
        };
        let category = CategoryDisplayInfo {
            category_id: "cat-1".into(),
            category_name: "Hair".into(),
            service_name: "Balayage".into(),
        };
        (offering, professional, category)
    }

    #[test]
    fn test_projection_is_deterministic() {
        let (offering, professional, category) = inputs();
        let a = ServiceProviderAggregate::project(&offering, &professional, &category);
        let b = ServiceProviderAggregate::project(&offering, &professional, &category);
        assert_eq!(a, b);
        assert_eq!(a.id, "pro-1_bs-1");
    }

    #[test]
    fn test_projection_copies_display_fields() {
        let (offering, professional, category) = inputs();
        let agg = ServiceProviderAggregate::project(&offering, &professional, &category);
        assert_eq!(agg.professional_name, "Ana");
        assert_eq!(agg.category_name, "Hair");
        assert_eq!(agg.service_name, "Balayage");
        assert_eq!(agg.price, 120.0);
        assert_eq!(agg.duration, 90);
        assert_eq!(agg.offering_id, offering.id);
        assert_eq!(agg.synced_from, offering.updated_at);
    }
}
