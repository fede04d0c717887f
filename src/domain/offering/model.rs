//! Professional offering entity

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::document::{Collection, Document, OrderBy, SortDirection};

pub mod fields {
    pub const PROFESSIONAL_ID: &str = "professionalId";
    pub const BASE_SERVICE_ID: &str = "baseServiceId";
    pub const IS_ACTIVE: &str = "isActive";
    pub const PRICE: &str = "price";
    pub const DURATION: &str = "duration";
    pub const BOOKINGS: &str = "bookings";
    pub const EARNINGS: &str = "earnings";
    pub const AVERAGE_RATING: &str = "averageRating";
    pub const CREATED_AT: &str = "createdAt";
}

/// A professional's priced instance of a base service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfessionalService {
    pub id: String,
    pub professional_id: String,
    pub base_service_id: String,
    pub price: f64,
    /// Minutes
    pub duration: u32,
    pub is_active: bool,
    pub bookings: u32,
    pub earnings: f64,
    pub reviews: u32,
    pub average_rating: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ProfessionalService {
    /// A fresh, active offering with zeroed statistics.
    pub fn new(professional_id: &str, base_service_id: &str, price: f64, duration: u32) -> Self {
        let now = Utc::now();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            professional_id: professional_id.to_string(),
            base_service_id: base_service_id.to_string(),
            price,
            duration,
            is_active: true,
            bookings: 0,
            earnings: 0.0,
            reviews: 0,
            average_rating: 0.0,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn record_booking(&mut self, amount: f64) {
        self.bookings += 1;
        self.earnings += amount;
        self.updated_at = Utc::now();
    }

    pub fn record_review(&mut self, rating: u8) {
        let total = self.average_rating * f64::from(self.reviews) + f64::from(rating);
        self.reviews += 1;
        self.average_rating = total / f64::from(self.reviews);
        self.updated_at = Utc::now();
    }

    /// Whether discovery shows something different for `other`.
    pub fn display_differs(&self, other: &ProfessionalService) -> bool {
        self.price != other.price
            || self.duration != other.duration
            || self.is_active != other.is_active
            || self.reviews != other.reviews
            || self.average_rating != other.average_rating
    }
}

impl Document for ProfessionalService {
    const COLLECTION: Collection = Collection::ProfessionalServices;
    const ENTITY: &'static str = "ProfessionalService";

    fn id(&self) -> &str {
        &self.id
    }
}

/// Partial update of an offering
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OfferingPatch {
    pub price: Option<f64>,
    pub duration: Option<u32>,
    pub is_active: Option<bool>,
}

impl OfferingPatch {
    pub fn deactivate() -> Self {
        Self {
            is_active: Some(false),
            ..Default::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.price.is_none() && self.duration.is_none() && self.is_active.is_none()
    }
}

#[derive(Debug, Clone, Default)]
pub struct OfferingFilter {
    /// Only offerings whose base service belongs to this category
    pub category_id: Option<String>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OfferingSortField {
    CreatedAt,
    Price,
    Duration,
    Bookings,
    Earnings,
    AverageRating,
}

impl OfferingSortField {
    pub fn field(&self) -> &'static str {
        match self {
            Self::CreatedAt => fields::CREATED_AT,
            Self::Price => fields::PRICE,
            Self::Duration => fields::DURATION,
            Self::Bookings => fields::BOOKINGS,
            Self::Earnings => fields::EARNINGS,
            Self::AverageRating => fields::AVERAGE_RATING,
        }
    }
}

impl std::str::FromStr for OfferingSortField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "createdAt" | "created_at" => Ok(Self::CreatedAt),
            "price" => Ok(Self::Price),
            "duration" => Ok(Self::Duration),
            "bookings" => Ok(Self::Bookings),
            "earnings" => Ok(Self::Earnings),
            "averageRating" | "average_rating" | "rating" => Ok(Self::AverageRating),
            other => Err(format!("unknown sort field: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OfferingOrder {
    pub field: OfferingSortField,
    pub direction: SortDirection,
}

impl OfferingOrder {
    pub fn new(field: OfferingSortField, direction: SortDirection) -> Self {
        Self { field, direction }
    }

    pub fn to_order_by(&self) -> OrderBy {
        OrderBy {
            field: self.field.field().to_string(),
            direction: self.direction,
        }
    }
}
