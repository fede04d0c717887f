//! Professional offering aggregate
//!
//! Contains the `ProfessionalService` entity and the pure validation engine
//! for offering price and duration.

pub mod model;
pub mod validation;

pub use model::{
    fields, OfferingFilter, OfferingOrder, OfferingPatch, OfferingSortField, ProfessionalService,
};
pub use validation::{validate_offering, DurationBounds};
