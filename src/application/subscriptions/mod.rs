//! Live queries over the document store

pub mod hub;

pub use hub::{Subscription, SubscriptionHub};
